//! External collaborator seams.
//!
//! The query execution service and the admin record store are external
//! collaborators of the introspection engine; they are represented here as
//! traits with in-memory implementations backing tests and local runs.

pub mod query;
pub mod records;

pub use query::{MemoryQueryExecutor, QueryExecutor};
pub use records::{AdminRecord, MemoryRecordStore, RecordStore};
