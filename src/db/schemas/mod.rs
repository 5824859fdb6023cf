//! Database schemas for quire
//!
//! MongoDB document structures for users, categories and blogs. Categories
//! and blogs point at their owners through plain `ObjectId` references.

mod blog;
mod category;
mod metadata;
mod user;

pub use blog::{BlogDoc, BLOG_COLLECTION};
pub use category::{CategoryDoc, CATEGORY_COLLECTION};
pub use metadata::Metadata;
pub use user::{UserDoc, USER_COLLECTION};
