//! Blog routes
//!
//! Every blog route carries `userId` and `categoryId` query parameters; the
//! full User → Category → Blog chain is verified before anything is read or
//! written.

use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::db::schemas::BlogDoc;
use crate::repository::BlogPatch;
use crate::routes::query::list_options;
use crate::routes::views::BlogView;
use crate::routes::{optional, required, ApiError, ApiRequest, Reply};
use crate::server::AppState;
use crate::validation::{EntityKind, Owned, OwnershipChain};

const TITLE_REQUIRED: &str = "Title is required";
const DESCRIPTION_REQUIRED: &str = "Description is required";

#[derive(Debug, Deserialize)]
struct BlogBody {
    title: Option<String>,
    description: Option<String>,
}

fn owner_chain(req: &ApiRequest) -> OwnershipChain<'_> {
    OwnershipChain::user(req.param("userId")).category(req.param("categoryId"))
}

async fn verify_blog(
    state: &AppState,
    req: &ApiRequest,
    blog_id: &str,
) -> Result<Owned, ApiError> {
    owner_chain(req)
        .blog(Some(blog_id))
        .verify(state.repo.as_ref())
        .await
}

pub async fn list(state: &AppState, req: &ApiRequest) -> Result<Reply, ApiError> {
    let owned = owner_chain(req).verify(state.repo.as_ref()).await?;
    let category_id = owned
        .category_id
        .ok_or(ApiError::NotFound(EntityKind::Category))?;
    let (filter, page) = list_options(&req.params, (&state.args).into())?;

    let blogs = state
        .repo
        .list_blogs(owned.user_id, category_id, &filter, page)
        .await?;
    let blogs: Vec<BlogView> = blogs.iter().map(BlogView::from).collect();

    Ok(Reply::ok("Blog fetched successfully!", json!({ "blogs": blogs })))
}

pub async fn create(state: &AppState, req: &ApiRequest) -> Result<Reply, ApiError> {
    let owned = owner_chain(req).verify(state.repo.as_ref()).await?;
    let category_id = owned
        .category_id
        .ok_or(ApiError::NotFound(EntityKind::Category))?;

    let body: BlogBody = req.json()?;
    let title = required(body.title, TITLE_REQUIRED)?;
    let description = required(body.description, DESCRIPTION_REQUIRED)?;

    let blog = state
        .repo
        .insert_blog(BlogDoc::new(title, description, owned.user_id, category_id))
        .await?;

    info!(
        user_id = %owned.user_id,
        category_id = %category_id,
        title = %blog.title,
        "Blog created"
    );

    Ok(Reply::ok(
        "Blog created successfully!",
        json!({ "newBlog": BlogView::from(&blog) }),
    ))
}

pub async fn get(state: &AppState, req: &ApiRequest, blog_id: &str) -> Result<Reply, ApiError> {
    let owned = verify_blog(state, req, blog_id).await?;
    let blog = owned.blog.ok_or(ApiError::NotFound(EntityKind::Blog))?;

    Ok(Reply::ok(
        "Blog fetched successfully!",
        json!({ "blog": BlogView::from(&blog) }),
    ))
}

pub async fn update(state: &AppState, req: &ApiRequest, blog_id: &str) -> Result<Reply, ApiError> {
    let owned = verify_blog(state, req, blog_id).await?;
    let id = owned.blog_id.ok_or(ApiError::NotFound(EntityKind::Blog))?;

    let body: BlogBody = req.json()?;
    let patch = BlogPatch {
        title: optional(body.title, TITLE_REQUIRED)?,
        description: optional(body.description, DESCRIPTION_REQUIRED)?,
    };
    let blog = state
        .repo
        .update_blog(id, &patch)
        .await?
        .ok_or(ApiError::NotFound(EntityKind::Blog))?;

    Ok(Reply::ok(
        "Blog updated successfully!",
        json!({ "updatedBlog": BlogView::from(&blog) }),
    ))
}

pub async fn delete(state: &AppState, req: &ApiRequest, blog_id: &str) -> Result<Reply, ApiError> {
    let owned = verify_blog(state, req, blog_id).await?;
    let id = owned.blog_id.ok_or(ApiError::NotFound(EntityKind::Blog))?;

    state
        .repo
        .delete_blog(id)
        .await?
        .ok_or(ApiError::NotFound(EntityKind::Blog))?;

    info!(blog_id = %id, "Blog deleted");

    Ok(Reply::ok(
        "Blog deleted successfully!",
        json!({ "message": "Blog deleted successfully!" }),
    ))
}
