pub mod checkpoint;
pub mod collector;
pub mod distributor;
pub mod pipeline;
pub mod upsert;

pub use crate::domain::model::{FieldValue, Listing, ListingId};
pub use crate::domain::ports::{DocumentStore, Provider};
pub use crate::utils::error::Result;
