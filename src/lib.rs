pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

pub use adapters::{Imovirtual, Olx, RestStore};
pub use config::CollectorConfig;
pub use core::collector::{Collector, CollectorSettings};
pub use core::upsert::{upsert, UpsertOutcome};
pub use domain::model::{FieldValue, Listing, ListingId};
pub use domain::ports::{DocumentStore, Provider};
pub use utils::error::{CollectorError, Result};
