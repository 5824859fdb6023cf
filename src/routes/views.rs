//! JSON renderings of stored documents
//!
//! Ids become hex strings and timestamps RFC 3339. The user password hash has
//! no field here, so it can never leak into a response.

use bson::{oid::ObjectId, DateTime};
use serde::Serialize;

use crate::db::schemas::{BlogDoc, CategoryDoc, Metadata, UserDoc};

fn hex(id: Option<ObjectId>) -> String {
    id.map(|id| id.to_hex()).unwrap_or_default()
}

fn timestamp(at: Option<DateTime>) -> Option<String> {
    at.and_then(|at| at.try_to_rfc3339_string().ok())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timestamps {
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<&Metadata> for Timestamps {
    fn from(metadata: &Metadata) -> Self {
        Self {
            created_at: timestamp(metadata.created_at),
            updated_at: timestamp(metadata.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserView {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl From<&UserDoc> for UserView {
    fn from(user: &UserDoc) -> Self {
        Self {
            id: hex(user._id),
            username: user.username.clone(),
            email: user.email.clone(),
            timestamps: Timestamps::from(&user.metadata),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryView {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub user: String,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl From<&CategoryDoc> for CategoryView {
    fn from(category: &CategoryDoc) -> Self {
        Self {
            id: hex(category._id),
            title: category.title.clone(),
            user: category.user.to_hex(),
            timestamps: Timestamps::from(&category.metadata),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BlogView {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub user: String,
    pub category: String,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl From<&BlogDoc> for BlogView {
    fn from(blog: &BlogDoc) -> Self {
        Self {
            id: hex(blog._id),
            title: blog.title.clone(),
            description: blog.description.clone(),
            user: blog.user.to_hex(),
            category: blog.category.to_hex(),
            timestamps: Timestamps::from(&blog.metadata),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_view_hides_password() {
        let mut user = UserDoc::new("ada".into(), "ada@example.com".into(), "secret-hash".into());
        user._id = Some(ObjectId::new());

        let value = serde_json::to_value(UserView::from(&user)).unwrap();
        assert_eq!(value["username"], "ada");
        assert_eq!(value["_id"], user._id.unwrap().to_hex());
        assert!(value.get("password").is_none());
        assert!(value["createdAt"].is_string());
    }

    #[test]
    fn test_blog_view_shape() {
        let user = ObjectId::new();
        let category = ObjectId::new();
        let blog = BlogDoc::new("t".into(), "d".into(), user, category);

        let value = serde_json::to_value(BlogView::from(&blog)).unwrap();
        assert_eq!(value["user"], user.to_hex());
        assert_eq!(value["category"], category.to_hex());
        assert_eq!(value["description"], "d");
        assert!(value.get("updatedAt").is_some());
        assert!(value.get("metadata").is_none());
    }
}
