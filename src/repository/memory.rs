//! In-memory repository
//!
//! Mirrors the MongoDB backend's semantics (unique usernames/emails, newest
//! first ordering, keyword and date filters) without persistence. Used in dev
//! mode when MongoDB is unreachable, and by tests.

use bson::{oid::ObjectId, DateTime};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::db::schemas::{BlogDoc, CategoryDoc, Metadata, UserDoc};
use crate::repository::{BlogPatch, CategoryPatch, ListFilter, PageRequest, Repository};
use crate::types::{QuireError, Result};

/// Unique username/email indexes are separate maps; a claim holds the entry
/// lock for the key, so check-and-insert is atomic. Locks are always taken
/// usernames before emails.
#[derive(Default)]
pub struct MemoryRepository {
    users: DashMap<ObjectId, UserDoc>,
    usernames: DashMap<String, ObjectId>,
    emails: DashMap<String, ObjectId>,
    categories: DashMap<ObjectId, CategoryDoc>,
    blogs: DashMap<ObjectId, BlogDoc>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Sort newest first, then cut out the requested page
fn paginate<T>(
    mut items: Vec<T>,
    page: PageRequest,
    key: impl Fn(&T) -> (Option<DateTime>, Option<ObjectId>),
) -> Vec<T> {
    items.sort_by(|a, b| key(b).cmp(&key(a)));

    let skip = usize::try_from(page.skip()).unwrap_or(usize::MAX);
    items
        .into_iter()
        .skip(skip)
        .take(page.limit as usize)
        .collect()
}

#[async_trait::async_trait]
impl Repository for MemoryRepository {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn list_users(&self, filter: &ListFilter, page: PageRequest) -> Result<Vec<UserDoc>> {
        let matcher = filter.matcher()?;
        let users = self
            .users
            .iter()
            .filter(|u| {
                matcher.matches(&[u.username.as_str(), u.email.as_str()], u.metadata.created_at)
            })
            .map(|u| u.value().clone())
            .collect();
        Ok(paginate(users, page, |u: &UserDoc| (u.metadata.created_at, u._id)))
    }

    async fn find_user(&self, id: ObjectId) -> Result<Option<UserDoc>> {
        Ok(self.users.get(&id).map(|u| u.value().clone()))
    }

    async fn insert_user(&self, mut user: UserDoc) -> Result<UserDoc> {
        let name_slot = match self.usernames.entry(user.username.clone()) {
            Entry::Occupied(_) => {
                return Err(QuireError::Duplicate(format!("username '{}'", user.username)))
            }
            Entry::Vacant(slot) => slot,
        };
        let email_slot = match self.emails.entry(user.email.clone()) {
            Entry::Occupied(_) => {
                return Err(QuireError::Duplicate(format!("email '{}'", user.email)))
            }
            Entry::Vacant(slot) => slot,
        };

        let id = ObjectId::new();
        user._id = Some(id);
        user.metadata = Metadata::new();
        self.users.insert(id, user.clone());
        email_slot.insert(id);
        name_slot.insert(id);
        Ok(user)
    }

    async fn rename_user(&self, id: ObjectId, username: &str) -> Result<Option<UserDoc>> {
        let Some(current) = self.users.get(&id).map(|u| u.username.clone()) else {
            return Ok(None);
        };

        if current != username {
            match self.usernames.entry(username.to_string()) {
                Entry::Occupied(_) => {
                    return Err(QuireError::Duplicate(format!("username '{}'", username)))
                }
                Entry::Vacant(slot) => {
                    slot.insert(id);
                }
            }
            self.usernames.remove(&current);
        }

        Ok(self.users.get_mut(&id).map(|mut u| {
            u.username = username.to_string();
            u.metadata.touch();
            u.value().clone()
        }))
    }

    async fn delete_user(&self, id: ObjectId) -> Result<Option<UserDoc>> {
        let removed = self.users.remove(&id).map(|(_, u)| u);
        if let Some(user) = &removed {
            self.usernames.remove(&user.username);
            self.emails.remove(&user.email);
        }
        Ok(removed)
    }

    async fn list_categories(
        &self,
        user: ObjectId,
        filter: &ListFilter,
        page: PageRequest,
    ) -> Result<Vec<CategoryDoc>> {
        let matcher = filter.matcher()?;
        let categories = self
            .categories
            .iter()
            .filter(|c| c.user == user)
            .filter(|c| matcher.matches(&[c.title.as_str()], c.metadata.created_at))
            .map(|c| c.value().clone())
            .collect();
        Ok(paginate(categories, page, |c: &CategoryDoc| (c.metadata.created_at, c._id)))
    }

    async fn find_category(&self, id: ObjectId) -> Result<Option<CategoryDoc>> {
        Ok(self.categories.get(&id).map(|c| c.value().clone()))
    }

    async fn insert_category(&self, mut category: CategoryDoc) -> Result<CategoryDoc> {
        let id = ObjectId::new();
        category._id = Some(id);
        category.metadata = Metadata::new();
        self.categories.insert(id, category.clone());
        Ok(category)
    }

    async fn update_category(
        &self,
        id: ObjectId,
        patch: &CategoryPatch,
    ) -> Result<Option<CategoryDoc>> {
        Ok(self.categories.get_mut(&id).map(|mut c| {
            if let Some(title) = &patch.title {
                c.title = title.clone();
            }
            if !patch.is_empty() {
                c.metadata.touch();
            }
            c.value().clone()
        }))
    }

    async fn delete_category(&self, id: ObjectId) -> Result<Option<CategoryDoc>> {
        Ok(self.categories.remove(&id).map(|(_, c)| c))
    }

    async fn list_blogs(
        &self,
        user: ObjectId,
        category: ObjectId,
        filter: &ListFilter,
        page: PageRequest,
    ) -> Result<Vec<BlogDoc>> {
        let matcher = filter.matcher()?;
        let blogs = self
            .blogs
            .iter()
            .filter(|b| b.user == user && b.category == category)
            .filter(|b| {
                matcher.matches(&[b.title.as_str(), b.description.as_str()], b.metadata.created_at)
            })
            .map(|b| b.value().clone())
            .collect();
        Ok(paginate(blogs, page, |b: &BlogDoc| (b.metadata.created_at, b._id)))
    }

    async fn find_blog(&self, id: ObjectId) -> Result<Option<BlogDoc>> {
        Ok(self.blogs.get(&id).map(|b| b.value().clone()))
    }

    async fn insert_blog(&self, mut blog: BlogDoc) -> Result<BlogDoc> {
        let id = ObjectId::new();
        blog._id = Some(id);
        blog.metadata = Metadata::new();
        self.blogs.insert(id, blog.clone());
        Ok(blog)
    }

    async fn update_blog(&self, id: ObjectId, patch: &BlogPatch) -> Result<Option<BlogDoc>> {
        Ok(self.blogs.get_mut(&id).map(|mut b| {
            if let Some(title) = &patch.title {
                b.title = title.clone();
            }
            if let Some(description) = &patch.description {
                b.description = description.clone();
            }
            if !patch.is_empty() {
                b.metadata.touch();
            }
            b.value().clone()
        }))
    }

    async fn delete_blog(&self, id: ObjectId) -> Result<Option<BlogDoc>> {
        Ok(self.blogs.remove(&id).map(|(_, b)| b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::DateRange;

    fn user(name: &str) -> UserDoc {
        UserDoc::new(name.to_string(), format!("{name}@example.com"), "hash".to_string())
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_timestamps() {
        let repo = MemoryRepository::new();
        let stored = repo.insert_user(user("ada")).await.unwrap();

        let id = stored._id.expect("id assigned");
        assert!(stored.metadata.created_at.is_some());
        assert_eq!(repo.find_user(id).await.unwrap().unwrap().username, "ada");
    }

    #[tokio::test]
    async fn test_duplicate_username_and_email_rejected() {
        let repo = MemoryRepository::new();
        repo.insert_user(user("ada")).await.unwrap();

        let same_name = UserDoc::new("ada".into(), "other@example.com".into(), "h".into());
        assert!(matches!(
            repo.insert_user(same_name).await,
            Err(QuireError::Duplicate(_))
        ));

        let same_email = UserDoc::new("bob".into(), "ada@example.com".into(), "h".into());
        assert!(matches!(
            repo.insert_user(same_email).await,
            Err(QuireError::Duplicate(_))
        ));
    }

    #[tokio::test]
    async fn test_rename_to_own_name_is_allowed() {
        let repo = MemoryRepository::new();
        let ada = repo.insert_user(user("ada")).await.unwrap();
        let bob = repo.insert_user(user("bob")).await.unwrap();

        let renamed = repo.rename_user(ada._id.unwrap(), "ada").await.unwrap();
        assert_eq!(renamed.unwrap().username, "ada");

        assert!(repo.rename_user(bob._id.unwrap(), "ada").await.is_err());
        assert!(repo.rename_user(ObjectId::new(), "zed").await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_registrations_keep_usernames_unique() {
        let repo = std::sync::Arc::new(MemoryRepository::new());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let repo = std::sync::Arc::clone(&repo);
                tokio::spawn(async move {
                    let doc = UserDoc::new("ada".into(), format!("ada{i}@example.com"), "h".into());
                    repo.insert_user(doc).await
                })
            })
            .collect();

        let mut stored = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => stored += 1,
                Err(e) => assert!(matches!(e, QuireError::Duplicate(_))),
            }
        }
        assert_eq!(stored, 1);
        assert_eq!(repo.users.len(), 1);
    }

    #[tokio::test]
    async fn test_names_released_on_delete_and_rename() {
        let repo = MemoryRepository::new();
        let ada = repo.insert_user(user("ada")).await.unwrap();
        let ada_id = ada._id.unwrap();

        repo.rename_user(ada_id, "ada2").await.unwrap();
        let reuse = UserDoc::new("ada".into(), "new@example.com".into(), "h".into());
        assert!(repo.insert_user(reuse).await.is_ok());

        repo.delete_user(ada_id).await.unwrap();
        let again = UserDoc::new("ada2".into(), "ada@example.com".into(), "h".into());
        assert!(repo.insert_user(again).await.is_ok());
    }

    #[tokio::test]
    async fn test_list_blogs_scoped_newest_first_and_paged() {
        let repo = MemoryRepository::new();
        let owner = ObjectId::new();
        let category = ObjectId::new();

        for i in 0..5 {
            repo.insert_blog(BlogDoc::new(format!("post {i}"), "body".into(), owner, category))
                .await
                .unwrap();
        }
        // Same owner, different category: never listed
        repo.insert_blog(BlogDoc::new("elsewhere".into(), "body".into(), owner, ObjectId::new()))
            .await
            .unwrap();

        let filter = ListFilter::default();
        let first = repo
            .list_blogs(owner, category, &filter, PageRequest::new(1, 2))
            .await
            .unwrap();
        let titles: Vec<_> = first.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["post 4", "post 3"]);

        let last = repo
            .list_blogs(owner, category, &filter, PageRequest::new(3, 2))
            .await
            .unwrap();
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].title, "post 0");
    }

    #[tokio::test]
    async fn test_list_blogs_keyword_matches_title_or_description() {
        let repo = MemoryRepository::new();
        let owner = ObjectId::new();
        let category = ObjectId::new();
        repo.insert_blog(BlogDoc::new("Rust tips".into(), "ownership".into(), owner, category))
            .await
            .unwrap();
        repo.insert_blog(BlogDoc::new("Cooking".into(), "rusty pans".into(), owner, category))
            .await
            .unwrap();
        repo.insert_blog(BlogDoc::new("Gardening".into(), "soil".into(), owner, category))
            .await
            .unwrap();

        let filter = ListFilter {
            keywords: Some("RUST".into()),
            ..Default::default()
        };
        let hits = repo
            .list_blogs(owner, category, &filter, PageRequest::new(1, 10))
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn test_list_categories_date_range() {
        let repo = MemoryRepository::new();
        let owner = ObjectId::new();
        repo.insert_category(CategoryDoc::new("today".into(), owner))
            .await
            .unwrap();

        let future = ListFilter {
            created: DateRange {
                start: Some(DateTime::from_millis(DateTime::now().timestamp_millis() + 60_000)),
                end: None,
            },
            ..Default::default()
        };
        let none = repo
            .list_categories(owner, &future, PageRequest::new(1, 10))
            .await
            .unwrap();
        assert!(none.is_empty());

        let past = ListFilter {
            created: DateRange {
                start: Some(DateTime::from_millis(0)),
                end: Some(DateTime::now()),
            },
            ..Default::default()
        };
        let some = repo
            .list_categories(owner, &past, PageRequest::new(1, 10))
            .await
            .unwrap();
        assert_eq!(some.len(), 1);
    }

    #[tokio::test]
    async fn test_update_and_delete_blog() {
        let repo = MemoryRepository::new();
        let blog = repo
            .insert_blog(BlogDoc::new("a".into(), "b".into(), ObjectId::new(), ObjectId::new()))
            .await
            .unwrap();
        let id = blog._id.unwrap();

        let patch = BlogPatch {
            title: Some("renamed".into()),
            description: None,
        };
        let updated = repo.update_blog(id, &patch).await.unwrap().unwrap();
        assert_eq!(updated.title, "renamed");
        assert_eq!(updated.description, "b");

        assert!(repo.delete_blog(id).await.unwrap().is_some());
        assert!(repo.find_blog(id).await.unwrap().is_none());
        assert!(repo.delete_blog(id).await.unwrap().is_none());
    }
}
