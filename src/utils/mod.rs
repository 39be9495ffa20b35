use chrono::{DateTime, NaiveDateTime, Utc};

/// Name of the ledger table
pub const VERSION_TABLE: &str = "goose_db_version";

/// chrono format used for generated migration versions
pub const VERSION_LAYOUT: &str = "%Y%m%d%H%M%S";

/// Default directory holding `dbconf.yml` or `dbconf.json`
pub const DEFAULT_DB_PATH: &str = "db";

/// Default environment name
pub const DEFAULT_ENV: &str = "development";

/// Name of the YAML configuration file inside the db directory
pub const DBCONF_YAML_FILE: &str = "dbconf.yml";

/// Name of the JSON configuration file, read when no YAML file exists
pub const DBCONF_FILE: &str = "dbconf.json";

/// Format used by `status` for applied timestamps
pub const STATUS_TIME_LAYOUT: &str = "%a %b %e %H:%M:%S %Y";

/// Current version identifier for a new migration
pub fn new_version_stamp() -> String {
    Utc::now().format(VERSION_LAYOUT).to_string()
}

/// Parse a timestamp as SQLite writes it (`datetime('now')`), falling back to RFC 3339
pub fn parse_db_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_new_version_stamp_is_numeric() {
        let stamp = new_version_stamp();
        assert_eq!(stamp.len(), 14);
        assert!(stamp.parse::<i64>().is_ok());
    }

    #[test]
    fn test_parse_sqlite_timestamp() {
        let ts = parse_db_timestamp("2014-04-06 18:16:55").unwrap();
        assert_eq!(ts.year(), 2014);
        assert_eq!(ts.hour(), 18);
        assert_eq!(ts.second(), 55);
    }

    #[test]
    fn test_parse_rfc3339_timestamp() {
        assert!(parse_db_timestamp("2024-01-02T03:04:05+00:00").is_some());
        assert!(parse_db_timestamp("not a date").is_none());
    }
}
