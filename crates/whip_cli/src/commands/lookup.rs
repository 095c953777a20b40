//! Lookup command implementation.

use serde_json::{json, Number, Value};
use std::net::Ipv4Addr;
use std::path::Path;
use whip_core::{CoreResult, RangeStore};

/// Which version of a history to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Version {
    /// The newest version.
    Latest,
    /// The newest version at or before this timestamp.
    AsOf(String),
    /// Every version, newest first.
    All,
}

impl Version {
    /// Parses the `--datetime` argument.
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            None => Self::Latest,
            Some("all") => Self::All,
            Some(ts) => Self::AsOf(ts.to_string()),
        }
    }
}

/// Runs the lookup command.
pub fn run(path: &Path, ips: &[String], version: &Version) -> Result<(), Box<dyn std::error::Error>> {
    let store = RangeStore::open(path, false)?;

    for ip in ips {
        let Ok(address) = ip.parse::<Ipv4Addr>() else {
            println!("Invalid IP address");
            continue;
        };

        match lookup(&store, u32::from(address), version)? {
            Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
            None => println!("No hit found"),
        }
    }

    Ok(())
}

/// Looks up one address and renders the requested version as JSON.
pub fn lookup(store: &RangeStore, address: u32, version: &Version) -> CoreResult<Option<Value>> {
    let Some(history) = store.lookup_history(address)? else {
        return Ok(None);
    };
    let timestamp_key = &store.config().timestamp_key;

    Ok(match version {
        Version::Latest => Some(Value::from(history.latest().clone())),
        Version::AsOf(ts) => {
            let query = timestamp_query(ts, history.latest().get(timestamp_key));
            history.as_of(&query, timestamp_key).map(Value::from)
        }
        Version::All => {
            let versions: Vec<Value> = history.versions().map(Value::from).collect();
            Some(json!({ "history": versions }))
        }
    })
}

/// Reads a `--datetime` argument as the same JSON kind as the stored
/// timestamps: a number when they are numbers, a string otherwise.
fn timestamp_query(arg: &str, stored: Option<&Value>) -> Value {
    if let Some(Value::Number(_)) = stored {
        if let Ok(n) = arg.parse::<i64>() {
            return Value::from(n);
        }
        if let Some(n) = arg.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(n);
        }
    }
    Value::String(arg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use whip_core::{Range, Record};

    fn dated(datetime: &str, cc: &str) -> Record {
        match json!({"datetime": datetime, "cc": cc}) {
            Value::Object(map) => Record::from(map),
            _ => unreachable!(),
        }
    }

    fn store() -> RangeStore {
        let mut store = RangeStore::open_in_memory().unwrap();
        store
            .load_snapshots(vec![
                vec![(Range::new(10, 20).unwrap(), dated("2010", "NL"))],
                vec![(Range::new(10, 20).unwrap(), dated("2012", "BE"))],
            ])
            .unwrap();
        store
    }

    #[test]
    fn version_argument_parsing() {
        assert_eq!(Version::from_arg(None), Version::Latest);
        assert_eq!(Version::from_arg(Some("all")), Version::All);
        assert_eq!(
            Version::from_arg(Some("2011-01-01")),
            Version::AsOf("2011-01-01".to_string())
        );
    }

    #[test]
    fn latest_as_of_and_all() {
        let store = store();

        let latest = lookup(&store, 15, &Version::Latest).unwrap().unwrap();
        assert_eq!(latest["cc"], json!("BE"));

        let old = lookup(&store, 15, &Version::AsOf("2011".to_string()))
            .unwrap()
            .unwrap();
        assert_eq!(old["cc"], json!("NL"));

        assert!(lookup(&store, 15, &Version::AsOf("2000".to_string()))
            .unwrap()
            .is_none());

        let all = lookup(&store, 15, &Version::All).unwrap().unwrap();
        assert_eq!(all["history"].as_array().unwrap().len(), 2);
        assert_eq!(all["history"][0]["datetime"], json!("2012"));
    }

    #[test]
    fn miss_outside_ranges() {
        assert!(lookup(&store(), 21, &Version::Latest).unwrap().is_none());
    }

    #[test]
    fn numeric_timestamps_are_queried_as_numbers() {
        let at = |epoch: i64, cc: &str| match json!({"datetime": epoch, "cc": cc}) {
            Value::Object(map) => Record::from(map),
            _ => unreachable!(),
        };

        let mut store = RangeStore::open_in_memory().unwrap();
        store
            .load_snapshots(vec![
                vec![(Range::new(10, 20).unwrap(), at(1_262_304_000, "NL"))],
                vec![(Range::new(10, 20).unwrap(), at(1_356_998_400, "BE"))],
            ])
            .unwrap();

        let old = lookup(&store, 15, &Version::AsOf("1300000000".to_string()))
            .unwrap()
            .unwrap();
        assert_eq!(old["cc"], json!("NL"));

        assert!(lookup(&store, 15, &Version::AsOf("1000".to_string()))
            .unwrap()
            .is_none());
    }

    #[test]
    fn timestamp_query_follows_the_stored_kind() {
        assert_eq!(timestamp_query("2011", Some(&json!("2010"))), json!("2011"));
        assert_eq!(timestamp_query("2011", Some(&json!(2010))), json!(2011));
        assert_eq!(timestamp_query("2011.5", Some(&json!(2010))), json!(2011.5));
        assert_eq!(timestamp_query("soon", Some(&json!(2010))), json!("soon"));
        assert_eq!(timestamp_query("2011", None), json!("2011"));
    }
}
