//! Blog document schema
//!
//! A blog belongs to both a user and one of that user's categories.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for blogs
pub const BLOG_COLLECTION: &str = "blogs";

/// Blog document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct BlogDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub title: String,

    pub description: String,

    /// Owning user
    pub user: ObjectId,

    /// Owning category (must itself belong to `user`)
    pub category: ObjectId,
}

impl BlogDoc {
    pub fn new(title: String, description: String, user: ObjectId, category: ObjectId) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            title,
            description,
            user,
            category,
        }
    }
}

impl IntoIndexes for BlogDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Listing is always scoped to user + category, newest first
            (
                doc! { "user": 1, "category": 1, "metadata.created_at": -1 },
                Some(
                    IndexOptions::builder()
                        .name("owner_created_at_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for BlogDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
