pub mod pool;
pub mod url;

pub use pool::{MonitoredDb, create_pool};
pub use url::{SettingsError, build_connection_url};
