//! Quire - REST backend for users, categories and blogs
//!
//! Users own categories, categories own blogs. Every targeted read and every
//! mutation passes the ownership gate in [`validation`] before touching the
//! store.
//!
//! ## Layers
//!
//! - **Routes**: hyper http1 handlers returning JSON envelopes
//! - **Validation**: ObjectId format checks and the User → Category → Blog chain
//! - **Repository**: MongoDB in production, in-memory for dev mode and tests

pub mod auth;
pub mod config;
pub mod db;
pub mod repository;
pub mod routes;
pub mod server;
pub mod types;
pub mod validation;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{QuireError, Result};
