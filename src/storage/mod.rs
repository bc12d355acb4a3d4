//! Document storage.
//!
//! [`DocumentStore`] is the seam between search construction and execution.
//! [`InMemoryStore`] evaluates queries in process.

mod memory;
mod traits;

pub use memory::InMemoryStore;
pub use traits::{DocumentStore, FindOptions, StoreError};
