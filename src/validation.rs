//! Identifier validation and the ownership gate
//!
//! Every targeted read and every mutation goes through [`OwnershipChain`]:
//!
//! 1. all supplied ids must be well-formed ObjectIds (400 otherwise),
//!    checked user → category → blog
//! 2. each entity must exist (404)
//! 3. each link must hold: category.user == user, blog.user == user and
//!    blog.category == category (404 naming the child entity)

use bson::oid::ObjectId;
use std::fmt;

use crate::db::schemas::{BlogDoc, CategoryDoc, UserDoc};
use crate::repository::Repository;
use crate::routes::error::ApiError;

/// Entity types taking part in the ownership chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    User,
    Category,
    Blog,
}

impl EntityKind {
    pub fn invalid_id_message(self) -> &'static str {
        match self {
            Self::User => "Invalid user id",
            Self::Category => "Invalid category id",
            Self::Blog => "Invalid blog id",
        }
    }

    pub fn not_found_message(self) -> &'static str {
        match self {
            Self::User => "User not found",
            Self::Category => "Category not found",
            Self::Blog => "Blog not found",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Category => write!(f, "category"),
            Self::Blog => write!(f, "blog"),
        }
    }
}

/// Parse a raw identifier; missing and malformed are the same failure
pub fn parse_object_id(kind: EntityKind, raw: Option<&str>) -> Result<ObjectId, ApiError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| ObjectId::parse_str(s).ok())
        .ok_or(ApiError::InvalidId(kind))
}

/// Caller-supplied ids describing User → Category → Blog
///
/// The user is always part of the chain; category and blog are only checked
/// when added with [`OwnershipChain::category`] / [`OwnershipChain::blog`].
#[derive(Debug, Clone, Copy)]
pub struct OwnershipChain<'a> {
    user: Option<&'a str>,
    category: Option<Option<&'a str>>,
    blog: Option<Option<&'a str>>,
}

/// Ids and documents resolved by a successful [`OwnershipChain::verify`]
#[derive(Debug, Clone)]
pub struct Owned {
    pub user_id: ObjectId,
    pub user: UserDoc,
    pub category_id: Option<ObjectId>,
    pub category: Option<CategoryDoc>,
    pub blog_id: Option<ObjectId>,
    pub blog: Option<BlogDoc>,
}

impl<'a> OwnershipChain<'a> {
    pub fn user(id: Option<&'a str>) -> Self {
        Self {
            user: id,
            category: None,
            blog: None,
        }
    }

    pub fn category(mut self, id: Option<&'a str>) -> Self {
        self.category = Some(id);
        self
    }

    pub fn blog(mut self, id: Option<&'a str>) -> Self {
        self.blog = Some(id);
        self
    }

    /// Run the gate: formats first, then existence and links in chain order
    pub async fn verify(&self, repo: &dyn Repository) -> Result<Owned, ApiError> {
        let user_id = parse_object_id(EntityKind::User, self.user)?;
        let category_id = self
            .category
            .map(|raw| parse_object_id(EntityKind::Category, raw))
            .transpose()?;
        let blog_id = self
            .blog
            .map(|raw| parse_object_id(EntityKind::Blog, raw))
            .transpose()?;

        let user = repo
            .find_user(user_id)
            .await?
            .ok_or(ApiError::NotFound(EntityKind::User))?;

        let category = match category_id {
            Some(id) => {
                let category = repo
                    .find_category(id)
                    .await?
                    .filter(|c| c.user == user_id)
                    .ok_or(ApiError::NotFound(EntityKind::Category))?;
                Some(category)
            }
            None => None,
        };

        let blog = match blog_id {
            Some(id) => {
                let blog = repo
                    .find_blog(id)
                    .await?
                    .filter(|b| b.user == user_id)
                    .filter(|b| category_id.map_or(true, |c| b.category == c))
                    .ok_or(ApiError::NotFound(EntityKind::Blog))?;
                Some(blog)
            }
            None => None,
        };

        Ok(Owned {
            user_id,
            user,
            category_id,
            category,
            blog_id,
            blog,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryRepository;
    use tokio_test::assert_ok;

    struct Fixture {
        repo: MemoryRepository,
        user: String,
        other_user: String,
        category: String,
        other_category: String,
        blog: String,
    }

    async fn fixture() -> Fixture {
        let repo = MemoryRepository::new();
        let user = repo
            .insert_user(UserDoc::new("ada".into(), "ada@example.com".into(), "h".into()))
            .await
            .unwrap();
        let other = repo
            .insert_user(UserDoc::new("bob".into(), "bob@example.com".into(), "h".into()))
            .await
            .unwrap();
        let uid = user._id.unwrap();
        let category = repo
            .insert_category(CategoryDoc::new("notes".into(), uid))
            .await
            .unwrap();
        let other_category = repo
            .insert_category(CategoryDoc::new("misc".into(), uid))
            .await
            .unwrap();
        let blog = repo
            .insert_blog(BlogDoc::new(
                "hello".into(),
                "world".into(),
                uid,
                category._id.unwrap(),
            ))
            .await
            .unwrap();

        Fixture {
            repo,
            user: uid.to_hex(),
            other_user: other._id.unwrap().to_hex(),
            category: category._id.unwrap().to_hex(),
            other_category: other_category._id.unwrap().to_hex(),
            blog: blog._id.unwrap().to_hex(),
        }
    }

    fn kind_of(err: ApiError) -> (u16, String) {
        (err.status().as_u16(), err.message())
    }

    #[test]
    fn test_parse_object_id() {
        assert!(parse_object_id(EntityKind::User, Some("507f1f77bcf86cd799439011")).is_ok());
        assert!(matches!(
            parse_object_id(EntityKind::User, Some("not-an-id")),
            Err(ApiError::InvalidId(EntityKind::User))
        ));
        assert!(matches!(
            parse_object_id(EntityKind::Blog, None),
            Err(ApiError::InvalidId(EntityKind::Blog))
        ));
        assert!(parse_object_id(EntityKind::Blog, Some("")).is_err());
    }

    #[tokio::test]
    async fn test_full_chain_resolves() {
        let f = fixture().await;
        let chain = OwnershipChain::user(Some(f.user.as_str()))
            .category(Some(f.category.as_str()))
            .blog(Some(f.blog.as_str()));

        let owned = assert_ok!(chain.verify(&f.repo).await);
        assert_eq!(owned.user.username, "ada");
        assert_eq!(owned.category.unwrap().title, "notes");
        assert_eq!(owned.blog.unwrap().title, "hello");
    }

    #[tokio::test]
    async fn test_format_checked_before_existence() {
        let f = fixture().await;
        let missing_user = ObjectId::new().to_hex();
        let chain = OwnershipChain::user(Some(missing_user.as_str()))
            .category(Some(f.category.as_str()))
            .blog(Some("zzz"));

        let err = chain.verify(&f.repo).await.unwrap_err();
        assert_eq!(kind_of(err), (400, "Invalid blog id".to_string()));
    }

    #[tokio::test]
    async fn test_invalid_category_id() {
        let f = fixture().await;
        let chain = OwnershipChain::user(Some(f.user.as_str()))
            .category(Some("123"))
            .blog(Some(f.blog.as_str()));

        let err = chain.verify(&f.repo).await.unwrap_err();
        assert_eq!(kind_of(err), (400, "Invalid category id".to_string()));
    }

    #[tokio::test]
    async fn test_missing_user() {
        let f = fixture().await;
        let missing = ObjectId::new().to_hex();
        let err = OwnershipChain::user(Some(missing.as_str()))
            .verify(&f.repo)
            .await
            .unwrap_err();
        assert_eq!(kind_of(err), (404, "User not found".to_string()));
    }

    #[tokio::test]
    async fn test_category_of_another_user_is_not_found() {
        let f = fixture().await;
        let err = OwnershipChain::user(Some(f.other_user.as_str()))
            .category(Some(f.category.as_str()))
            .verify(&f.repo)
            .await
            .unwrap_err();
        assert_eq!(kind_of(err), (404, "Category not found".to_string()));
    }

    #[tokio::test]
    async fn test_blog_in_unrelated_category_is_not_found() {
        let f = fixture().await;
        let err = OwnershipChain::user(Some(f.user.as_str()))
            .category(Some(f.other_category.as_str()))
            .blog(Some(f.blog.as_str()))
            .verify(&f.repo)
            .await
            .unwrap_err();
        assert_eq!(kind_of(err), (404, "Blog not found".to_string()));
    }

    #[tokio::test]
    async fn test_user_only_chain() {
        let f = fixture().await;
        let owned = OwnershipChain::user(Some(f.user.as_str()))
            .verify(&f.repo)
            .await
            .unwrap();
        assert!(owned.category.is_none());
        assert!(owned.blog_id.is_none());
        assert_eq!(owned.user_id.to_hex(), f.user);
    }
}
