//! Category routes, all scoped to the owning `userId` query parameter

use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::db::schemas::CategoryDoc;
use crate::repository::CategoryPatch;
use crate::routes::query::list_options;
use crate::routes::views::CategoryView;
use crate::routes::{optional, required, ApiError, ApiRequest, Reply};
use crate::server::AppState;
use crate::validation::{EntityKind, OwnershipChain};

const TITLE_REQUIRED: &str = "Title is required";

#[derive(Debug, Deserialize)]
struct CategoryBody {
    title: Option<String>,
}

pub async fn list(state: &AppState, req: &ApiRequest) -> Result<Reply, ApiError> {
    let owned = OwnershipChain::user(req.param("userId"))
        .verify(state.repo.as_ref())
        .await?;
    let (filter, page) = list_options(&req.params, (&state.args).into())?;

    let categories = state
        .repo
        .list_categories(owned.user_id, &filter, page)
        .await?;
    let categories: Vec<CategoryView> = categories.iter().map(CategoryView::from).collect();

    Ok(Reply::ok("success", json!({ "categories": categories })))
}

pub async fn create(state: &AppState, req: &ApiRequest) -> Result<Reply, ApiError> {
    let owned = OwnershipChain::user(req.param("userId"))
        .verify(state.repo.as_ref())
        .await?;
    let body: CategoryBody = req.json()?;
    let title = required(body.title, TITLE_REQUIRED)?;

    let category = state
        .repo
        .insert_category(CategoryDoc::new(title, owned.user_id))
        .await?;

    info!(user_id = %owned.user_id, title = %category.title, "Category created");

    Ok(Reply::ok(
        "Category created successfully",
        json!({ "newCategory": CategoryView::from(&category) }),
    ))
}

pub async fn get(state: &AppState, req: &ApiRequest, category_id: &str) -> Result<Reply, ApiError> {
    let owned = OwnershipChain::user(req.param("userId"))
        .category(Some(category_id))
        .verify(state.repo.as_ref())
        .await?;
    let category = owned.category.ok_or(ApiError::NotFound(EntityKind::Category))?;

    Ok(Reply::ok(
        "Category fetched successfully",
        json!({ "category": CategoryView::from(&category) }),
    ))
}

pub async fn update(
    state: &AppState,
    req: &ApiRequest,
    category_id: &str,
) -> Result<Reply, ApiError> {
    let owned = OwnershipChain::user(req.param("userId"))
        .category(Some(category_id))
        .verify(state.repo.as_ref())
        .await?;
    let id = owned
        .category_id
        .ok_or(ApiError::NotFound(EntityKind::Category))?;

    let body: CategoryBody = req.json()?;
    let patch = CategoryPatch {
        title: optional(body.title, TITLE_REQUIRED)?,
    };
    let category = state
        .repo
        .update_category(id, &patch)
        .await?
        .ok_or(ApiError::NotFound(EntityKind::Category))?;

    Ok(Reply::ok(
        "Category updated successfully",
        json!({ "updatedCategory": CategoryView::from(&category) }),
    ))
}

pub async fn delete(
    state: &AppState,
    req: &ApiRequest,
    category_id: &str,
) -> Result<Reply, ApiError> {
    let owned = OwnershipChain::user(req.param("userId"))
        .category(Some(category_id))
        .verify(state.repo.as_ref())
        .await?;
    let id = owned
        .category_id
        .ok_or(ApiError::NotFound(EntityKind::Category))?;

    state
        .repo
        .delete_category(id)
        .await?
        .ok_or(ApiError::NotFound(EntityKind::Category))?;

    info!(category_id = %id, "Category deleted");

    Ok(Reply::ok(
        "Category deleted successfully",
        json!({ "message": "Category deleted successfully" }),
    ))
}
