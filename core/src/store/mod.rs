//! Store adapters
//!
//! A store turns a [`Predicate`] into a native query and runs it. Two
//! adapters ship here: an in-memory JSON document store and a translator to
//! Mongo query documents.

mod error;
mod memory;
mod mongo;

use serde_json::Value;

use crate::filters::Predicate;

pub use error::StoreError;
pub use memory::{MemoryStore, matches};
pub use mongo::to_mongo;

/// Document store able to evaluate a compiled predicate
pub trait DocumentStore {
    /// Documents matching `predicate`, in store order
    fn find(&self, predicate: &Predicate) -> Vec<Value>;
}
