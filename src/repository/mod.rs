//! Persistence seam for the controllers
//!
//! `Repository` is the only thing route handlers talk to. Two implementations:
//! - [`MongoRepository`] for production, one collection per entity
//! - [`MemoryRepository`] for dev mode and tests

pub mod filter;
pub mod memory;
pub mod mongo;

use bson::oid::ObjectId;

use crate::db::schemas::{BlogDoc, CategoryDoc, UserDoc};
use crate::types::Result;

pub use filter::{BlogPatch, CategoryPatch, DateRange, ListFilter, PageRequest};
pub use memory::MemoryRepository;
pub use mongo::MongoRepository;

/// CRUD access to users, categories and blogs
///
/// Inserts return the stored document (id and timestamps filled in). Updates
/// and deletes return `None` when nothing matched.
#[async_trait::async_trait]
pub trait Repository: Send + Sync {
    /// Short backend name for logs and health output
    fn backend(&self) -> &'static str;

    /// Check the backing store is reachable
    async fn ping(&self) -> Result<()>;

    async fn list_users(&self, filter: &ListFilter, page: PageRequest) -> Result<Vec<UserDoc>>;
    async fn find_user(&self, id: ObjectId) -> Result<Option<UserDoc>>;
    async fn insert_user(&self, user: UserDoc) -> Result<UserDoc>;
    async fn rename_user(&self, id: ObjectId, username: &str) -> Result<Option<UserDoc>>;
    async fn delete_user(&self, id: ObjectId) -> Result<Option<UserDoc>>;

    async fn list_categories(
        &self,
        user: ObjectId,
        filter: &ListFilter,
        page: PageRequest,
    ) -> Result<Vec<CategoryDoc>>;
    async fn find_category(&self, id: ObjectId) -> Result<Option<CategoryDoc>>;
    async fn insert_category(&self, category: CategoryDoc) -> Result<CategoryDoc>;
    async fn update_category(
        &self,
        id: ObjectId,
        patch: &CategoryPatch,
    ) -> Result<Option<CategoryDoc>>;
    async fn delete_category(&self, id: ObjectId) -> Result<Option<CategoryDoc>>;

    async fn list_blogs(
        &self,
        user: ObjectId,
        category: ObjectId,
        filter: &ListFilter,
        page: PageRequest,
    ) -> Result<Vec<BlogDoc>>;
    async fn find_blog(&self, id: ObjectId) -> Result<Option<BlogDoc>>;
    async fn insert_blog(&self, blog: BlogDoc) -> Result<BlogDoc>;
    async fn update_blog(&self, id: ObjectId, patch: &BlogPatch) -> Result<Option<BlogDoc>>;
    async fn delete_blog(&self, id: ObjectId) -> Result<Option<BlogDoc>>;
}
