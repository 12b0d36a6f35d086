//! Output seam for slow-query warnings.

/// Destination for slow-query warning blocks.
///
/// Emission is fire-and-forget: implementations must not block the caller,
/// and a sink that fails internally has to swallow the failure. A logging
/// problem never prevents a record from entering the history.
#[cfg_attr(test, mockall::automock)]
pub trait SlowQuerySink: Send + Sync {
    fn emit(&self, message: &str);
}

/// Production sink writing through the `tracing` warn channel.
pub struct TracingSink;

impl SlowQuerySink for TracingSink {
    fn emit(&self, message: &str) {
        tracing::warn!("{}", message);
    }
}
