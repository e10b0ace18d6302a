// Adapters: concrete implementations of the domain ports. Providers wrap
// external listing sites; the REST store speaks the document-store contract.

pub mod providers;
pub mod rest_store;

pub use providers::{Imovirtual, Olx};
pub use rest_store::RestStore;
