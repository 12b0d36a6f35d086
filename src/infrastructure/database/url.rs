//! Connection URL augmentation from resolved database settings.

use crate::config::DatabaseSettings;
use url::Url;

/// Errors raised while applying settings at startup.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The configured database URL could not be parsed. Fatal: startup
    /// aborts rather than running with a broken connection string.
    #[error("malformed database URL: {0}")]
    MalformedUrl(#[from] url::ParseError),
}

/// Query parameters this function owns; caller values for these are replaced.
const MANAGED_PARAMS: [&str; 5] = [
    "connection_limit",
    "pool_timeout",
    "pgbouncer",
    "connect_timeout",
    "socket_timeout",
];

/// Augment a base Postgres URL with pool sizing and operational parameters.
///
/// Sets `connection_limit` and `pool_timeout` from the settings, pins
/// `pgbouncer=true`, `connect_timeout=10`, and `socket_timeout=30`, and
/// defaults `schema=public` only when the caller did not already choose a
/// schema. Deterministic in the resulting parameter set; parameter order is
/// not part of the contract.
pub fn build_connection_url(
    base_url: &str,
    settings: &DatabaseSettings,
) -> Result<String, SettingsError> {
    let mut url = Url::parse(base_url)?;

    let existing: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let has_schema = existing.iter().any(|(k, _)| k == "schema");

    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (key, value) in &existing {
            if !MANAGED_PARAMS.contains(&key.as_str()) {
                pairs.append_pair(key, value);
            }
        }
        pairs.append_pair(
            "connection_limit",
            &settings.connection_limit.to_string(),
        );
        pairs.append_pair("pool_timeout", &settings.pool_timeout_seconds.to_string());
        if !has_schema {
            pairs.append_pair("schema", "public");
        }
        pairs.append_pair("pgbouncer", "true");
        pairs.append_pair("connect_timeout", "10");
        pairs.append_pair("socket_timeout", "30");
    }

    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings() -> DatabaseSettings {
        DatabaseSettings::resolve(&HashMap::new(), 4)
    }

    fn params(url: &str) -> HashMap<String, String> {
        Url::parse(url)
            .expect("augmented URL parses back")
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn pool_and_operational_parameters_are_set() {
        let url = build_connection_url("postgres://h/db", &settings()).unwrap();
        let params = params(&url);

        assert_eq!(params["connection_limit"], "9");
        assert_eq!(params["pool_timeout"], "20");
        assert_eq!(params["schema"], "public");
        assert_eq!(params["pgbouncer"], "true");
        assert_eq!(params["connect_timeout"], "10");
        assert_eq!(params["socket_timeout"], "30");
    }

    #[test]
    fn caller_schema_wins_over_default() {
        let url =
            build_connection_url("postgres://h/db?schema=league_ops", &settings()).unwrap();
        assert_eq!(params(&url)["schema"], "league_ops");
    }

    #[test]
    fn unmanaged_caller_parameters_survive() {
        let url = build_connection_url(
            "postgres://u:p@h:5432/db?sslmode=require&connection_limit=999",
            &settings(),
        )
        .unwrap();
        let params = params(&url);

        assert_eq!(params["sslmode"], "require");
        assert_eq!(params["connection_limit"], "9");
    }

    #[test]
    fn unparseable_base_url_is_fatal() {
        assert!(build_connection_url("not a url", &settings()).is_err());
    }
}
