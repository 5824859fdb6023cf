//! Category document schema

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for categories
pub const CATEGORY_COLLECTION: &str = "categories";

/// Category document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CategoryDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub title: String,

    /// Owning user
    pub user: ObjectId,
}

impl CategoryDoc {
    pub fn new(title: String, user: ObjectId) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            title,
            user,
        }
    }
}

impl IntoIndexes for CategoryDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "user": 1, "metadata.created_at": -1 },
            Some(
                IndexOptions::builder()
                    .name("user_created_at_index".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for CategoryDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
