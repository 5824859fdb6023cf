//! User routes
//!
//! - GET /users - list users
//! - POST /users - register a user
//! - PATCH /users - rename a user (`{userId, value}`)
//! - DELETE /users?userId= - delete a user
//! - GET /users/{user} - fetch one user

use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::auth::hash_password;
use crate::db::schemas::UserDoc;
use crate::routes::query::list_options;
use crate::routes::views::UserView;
use crate::routes::{required, required_raw, ApiError, ApiRequest, Reply};
use crate::server::AppState;
use crate::validation::{parse_object_id, EntityKind, OwnershipChain};

#[derive(Debug, Deserialize)]
struct RegisterBody {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenameBody {
    user_id: Option<String>,
    value: Option<String>,
}

pub async fn list(state: &AppState, req: &ApiRequest) -> Result<Reply, ApiError> {
    let (filter, page) = list_options(&req.params, (&state.args).into())?;
    let users = state.repo.list_users(&filter, page).await?;
    let users: Vec<UserView> = users.iter().map(UserView::from).collect();

    Ok(Reply::ok("Users Fetched Successfully", json!({ "users": users })))
}

pub async fn register(state: &AppState, req: &ApiRequest) -> Result<Reply, ApiError> {
    let body: RegisterBody = req.json()?;
    let username = required(body.username, "Invalid request")?;
    let email = required(body.email, "Invalid request")?;
    let password = required_raw(body.password, "Invalid request")?;

    if !email.contains('@') {
        return Err(ApiError::BadRequest("Invalid email"));
    }

    let password_hash = hash_password(&password)?;
    let user = state
        .repo
        .insert_user(UserDoc::new(username, email, password_hash))
        .await?;

    info!(username = %user.username, "User registered");

    Ok(Reply::ok(
        "User created successfully",
        json!({ "newUser": UserView::from(&user) }),
    ))
}

pub async fn rename(state: &AppState, req: &ApiRequest) -> Result<Reply, ApiError> {
    let body: RenameBody = req.json()?;
    let user_id = required(body.user_id, "Invalid request")?;
    let value = required(body.value, "Invalid request")?;
    let id = parse_object_id(EntityKind::User, Some(user_id.as_str()))?;

    let user = state
        .repo
        .rename_user(id, &value)
        .await?
        .ok_or(ApiError::NotFound(EntityKind::User))?;

    Ok(Reply::ok(
        "User updated successfully",
        json!({ "updatedUser": UserView::from(&user) }),
    ))
}

pub async fn delete(state: &AppState, req: &ApiRequest) -> Result<Reply, ApiError> {
    let user_id = req
        .param("userId")
        .filter(|id| !id.trim().is_empty())
        .ok_or(ApiError::BadRequest("Invalid request"))?;
    let id = parse_object_id(EntityKind::User, Some(user_id))?;

    let user = state
        .repo
        .delete_user(id)
        .await?
        .ok_or(ApiError::NotFound(EntityKind::User))?;

    info!(user_id = %id, "User deleted");

    Ok(Reply::ok(
        "User deleted successfully",
        json!({ "deletedUser": UserView::from(&user) }),
    ))
}

pub async fn get(state: &AppState, user_id: &str) -> Result<Reply, ApiError> {
    let owned = OwnershipChain::user(Some(user_id))
        .verify(state.repo.as_ref())
        .await?;

    Ok(Reply::ok(
        "User fetched successfully",
        json!({ "user": UserView::from(&owned.user) }),
    ))
}
