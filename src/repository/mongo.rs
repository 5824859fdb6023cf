//! MongoDB-backed repository

use bson::{doc, oid::ObjectId, Document};
use tracing::debug;

use crate::db::schemas::{
    BlogDoc, CategoryDoc, UserDoc, BLOG_COLLECTION, CATEGORY_COLLECTION, USER_COLLECTION,
};
use crate::db::{MongoClient, MongoCollection};
use crate::repository::{BlogPatch, CategoryPatch, ListFilter, PageRequest, Repository};
use crate::types::Result;

/// Repository over the `users`, `categories` and `blogs` collections
pub struct MongoRepository {
    mongo: MongoClient,
    users: MongoCollection<UserDoc>,
    categories: MongoCollection<CategoryDoc>,
    blogs: MongoCollection<BlogDoc>,
}

impl MongoRepository {
    /// Open the three collections (indexes are created here, once)
    pub async fn new(mongo: MongoClient) -> Result<Self> {
        let users = mongo.collection::<UserDoc>(USER_COLLECTION).await?;
        let categories = mongo.collection::<CategoryDoc>(CATEGORY_COLLECTION).await?;
        let blogs = mongo.collection::<BlogDoc>(BLOG_COLLECTION).await?;

        debug!(db = mongo.db_name(), "Collections ready");

        Ok(Self {
            mongo,
            users,
            categories,
            blogs,
        })
    }
}

fn by_id(id: ObjectId) -> Document {
    doc! { "_id": id }
}

fn page_bounds(page: PageRequest) -> (u64, i64) {
    (page.skip(), i64::from(page.limit))
}

#[async_trait::async_trait]
impl Repository for MongoRepository {
    fn backend(&self) -> &'static str {
        "mongodb"
    }

    async fn ping(&self) -> Result<()> {
        self.mongo.ping().await
    }

    async fn list_users(&self, filter: &ListFilter, page: PageRequest) -> Result<Vec<UserDoc>> {
        let query = filter.apply_to(Document::new(), &["username", "email"]);
        let (skip, limit) = page_bounds(page);
        self.users.find_page(query, skip, limit).await
    }

    async fn find_user(&self, id: ObjectId) -> Result<Option<UserDoc>> {
        self.users.find_one(by_id(id)).await
    }

    async fn insert_user(&self, mut user: UserDoc) -> Result<UserDoc> {
        let id = self.users.insert_one(&mut user).await?;
        user._id = Some(id);
        Ok(user)
    }

    async fn rename_user(&self, id: ObjectId, username: &str) -> Result<Option<UserDoc>> {
        self.users
            .update_one_returning(by_id(id), doc! { "username": username })
            .await
    }

    async fn delete_user(&self, id: ObjectId) -> Result<Option<UserDoc>> {
        self.users.delete_one_returning(by_id(id)).await
    }

    async fn list_categories(
        &self,
        user: ObjectId,
        filter: &ListFilter,
        page: PageRequest,
    ) -> Result<Vec<CategoryDoc>> {
        let query = filter.apply_to(doc! { "user": user }, &["title"]);
        let (skip, limit) = page_bounds(page);
        self.categories.find_page(query, skip, limit).await
    }

    async fn find_category(&self, id: ObjectId) -> Result<Option<CategoryDoc>> {
        self.categories.find_one(by_id(id)).await
    }

    async fn insert_category(&self, mut category: CategoryDoc) -> Result<CategoryDoc> {
        let id = self.categories.insert_one(&mut category).await?;
        category._id = Some(id);
        Ok(category)
    }

    async fn update_category(
        &self,
        id: ObjectId,
        patch: &CategoryPatch,
    ) -> Result<Option<CategoryDoc>> {
        if patch.is_empty() {
            return self.find_category(id).await;
        }
        self.categories
            .update_one_returning(by_id(id), patch.to_set())
            .await
    }

    async fn delete_category(&self, id: ObjectId) -> Result<Option<CategoryDoc>> {
        self.categories.delete_one_returning(by_id(id)).await
    }

    async fn list_blogs(
        &self,
        user: ObjectId,
        category: ObjectId,
        filter: &ListFilter,
        page: PageRequest,
    ) -> Result<Vec<BlogDoc>> {
        let query = filter.apply_to(
            doc! { "user": user, "category": category },
            &["title", "description"],
        );
        let (skip, limit) = page_bounds(page);
        self.blogs.find_page(query, skip, limit).await
    }

    async fn find_blog(&self, id: ObjectId) -> Result<Option<BlogDoc>> {
        self.blogs.find_one(by_id(id)).await
    }

    async fn insert_blog(&self, mut blog: BlogDoc) -> Result<BlogDoc> {
        let id = self.blogs.insert_one(&mut blog).await?;
        blog._id = Some(id);
        Ok(blog)
    }

    async fn update_blog(&self, id: ObjectId, patch: &BlogPatch) -> Result<Option<BlogDoc>> {
        if patch.is_empty() {
            return self.find_blog(id).await;
        }
        self.blogs.update_one_returning(by_id(id), patch.to_set()).await
    }

    async fn delete_blog(&self, id: ObjectId) -> Result<Option<BlogDoc>> {
        self.blogs.delete_one_returning(by_id(id)).await
    }
}
