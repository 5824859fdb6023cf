//! Credential handling for quire
//!
//! Passwords are stored as Argon2id PHC strings and never returned by the API.

pub mod password;

pub use password::hash_password;
