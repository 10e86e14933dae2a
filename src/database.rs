//! Click counter storage and shared application state
//!
//! Product rows live in the remote data service. The only thing this process
//! persists itself is the WhatsApp click counters, kept in an embedded redb
//! file.

use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use crate::config::Config;
use crate::error::AppError;
use crate::remote::DataService;

/// Click counts per tracking key
///
/// Key: product id, or `name:<product name>` when the id was unknown
/// Value: number of recorded clicks
pub const TABLE_CLICKS: TableDefinition<&str, u64> = TableDefinition::new("clicks_v1");

/// Last product name seen for each tracking key
pub const TABLE_CLICK_NAMES: TableDefinition<&str, &str> = TableDefinition::new("click_names_v1");

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub data: Arc<dyn DataService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: Database, data: Arc<dyn DataService>, config: Config) -> Self {
        Self {
            db: Arc::new(db),
            data,
            config: Arc::new(config),
        }
    }
}

/// Creates or opens the counter database and makes sure its tables exist.
pub fn init_db(db_path: &str) -> Result<Database, redb::Error> {
    let db = Database::create(db_path)?;

    let write_txn = db.begin_write()?;
    {
        write_txn.open_table(TABLE_CLICKS)?;
        write_txn.open_table(TABLE_CLICK_NAMES)?;
    }
    write_txn.commit()?;

    Ok(db)
}

/// Adds one click for `key` and returns the new count.
pub fn record_click(db: &Database, key: &str, name: Option<&str>) -> Result<u64, AppError> {
    let write_txn = db.begin_write()?;
    let count = {
        let mut clicks = write_txn.open_table(TABLE_CLICKS)?;
        let count = clicks.get(key)?.map(|v| v.value()).unwrap_or(0) + 1;
        clicks.insert(key, count)?;

        if let Some(name) = name.filter(|n| !n.trim().is_empty()) {
            let mut names = write_txn.open_table(TABLE_CLICK_NAMES)?;
            names.insert(key, name.trim())?;
        }
        count
    };
    write_txn.commit()?;
    Ok(count)
}

/// Every counter as `(key, last known name, clicks)`.
pub fn read_clicks(db: &Database) -> Result<Vec<(String, Option<String>, u64)>, AppError> {
    let read_txn = db.begin_read()?;
    let clicks = read_txn.open_table(TABLE_CLICKS)?;
    let names = read_txn.open_table(TABLE_CLICK_NAMES)?;

    let mut rows = Vec::new();
    for entry in clicks.iter()? {
        let (key, count) = entry?;
        let key = key.value().to_string();
        let name = names.get(key.as_str())?.map(|v| v.value().to_string());
        rows.push((key, name, count.value()));
    }
    Ok(rows)
}
