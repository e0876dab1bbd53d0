//! Food Log Library
//!
//! An ordered, persisted log of food entries with running calorie and
//! protein totals, plus a barcode scan collaborator that produces entries.

pub mod config;
pub mod events;
pub mod food_log;
pub mod models;
pub mod scan;
pub mod storage;

pub use config::{Config, ConfigError, ConfigSource, ConfigValue};
pub use events::{LogChange, LogEvent, SubscriptionId};
pub use food_log::{FoodLog, STORAGE_KEY};
pub use models::{FoodEntry, Totals};
pub use scan::{parse_payload, scan_food, BarcodeScanner, ScannedFood, StubScanner};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
