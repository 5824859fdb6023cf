//! MongoDB access layer
//!
//! One `MongoClient` (and its internal connection pool) is created at startup
//! and shared by every request.

pub mod mongo;
pub mod schemas;

pub use mongo::{IntoIndexes, MongoClient, MongoCollection, MutMetadata};
