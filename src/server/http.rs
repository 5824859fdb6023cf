//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo for async handling, one task per connection.

use http_body_util::BodyExt;
use hyper::body::Body;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use std::fmt::Display;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::config::Args;
use crate::repository::Repository;
use crate::routes::{
    self, blogs, categories, method_not_allowed_response, not_found_response,
    preflight_response, respond, users, ApiError, ApiRequest, FullBody,
};
use crate::types::QuireError;

/// Shared application state, immutable after startup
pub struct AppState {
    pub args: Args,
    pub repo: Arc<dyn Repository>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(args: Args, repo: Arc<dyn Repository>) -> Self {
        Self {
            args,
            repo,
            started_at: Instant::now(),
        }
    }
}

/// Run the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<(), QuireError> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!(
        "quire listening on {} as node {} ({} store)",
        state.args.listen,
        state.args.node_id,
        state.repo.backend()
    );

    if state.args.dev_mode {
        warn!("Development mode enabled");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { Ok::<_, hyper::Error>(handle_request(state, addr, req).await) }
                    });

                    if let Err(err) = http1::Builder::new()
                        .preserve_header_case(true)
                        .title_case_headers(true)
                        .serve_connection(io, service)
                        .await
                    {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Read the body and route the request
pub async fn handle_request<B>(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<B>,
) -> Response<FullBody>
where
    B: Body,
    B::Error: Display,
{
    let started = Instant::now();
    let (parts, body) = req.into_parts();
    let path = parts.uri.path().to_string();

    debug!("[{}] {} {}", addr, parts.method, path);

    let response = match body.collect().await {
        Ok(collected) => {
            let request = ApiRequest::new(
                parts.method.clone(),
                &path,
                parts.uri.query(),
                collected.to_bytes(),
            );
            route(&state, &request).await
        }
        Err(e) => {
            warn!("[{}] Failed to read request body: {}", addr, e);
            ApiError::BadRequest("Invalid request body").into_response()
        }
    };

    info!(
        "[{}] {} {} -> {} ({} ms)",
        addr,
        parts.method,
        path,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );

    response
}

/// Path segments with an optional `/api` prefix and trailing slash removed
fn segments(path: &str) -> Vec<&str> {
    let path = path
        .strip_prefix("/api")
        .filter(|rest| rest.is_empty() || rest.starts_with('/'))
        .unwrap_or(path);
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Dispatch on method and path
pub async fn route(state: &AppState, req: &ApiRequest) -> Response<FullBody> {
    let segments = segments(&req.path);

    match (&req.method, segments.as_slice()) {
        // CORS preflight
        (&Method::OPTIONS, _) => preflight_response(),

        (&Method::GET, ["health"]) | (&Method::GET, ["healthz"]) => routes::health_check(state),
        (&Method::GET, ["ready"]) | (&Method::GET, ["readyz"]) => {
            routes::readiness_check(state).await
        }
        (&Method::GET, ["version"]) => routes::version_info(),

        // Users
        (&Method::GET, ["users"]) => {
            respond(users::list(state, req).await, "Error in fetching users")
        }
        (&Method::POST, ["users"]) => {
            respond(users::register(state, req).await, "Error in creating user")
        }
        (&Method::PATCH, ["users"]) => {
            respond(users::rename(state, req).await, "Error in updating user")
        }
        (&Method::DELETE, ["users"]) => {
            respond(users::delete(state, req).await, "Error in deleting user")
        }
        (&Method::GET, ["users", user]) => {
            respond(users::get(state, user).await, "Error in fetching user")
        }

        // Categories
        (&Method::GET, ["categories"]) => {
            respond(categories::list(state, req).await, "Error in fetching categories")
        }
        (&Method::POST, ["categories"]) => {
            respond(categories::create(state, req).await, "Error in creating category")
        }
        (&Method::GET, ["categories", category]) => respond(
            categories::get(state, req, category).await,
            "Error in fetching category",
        ),
        (&Method::PATCH, ["categories", category]) => respond(
            categories::update(state, req, category).await,
            "Error in updating category",
        ),
        (&Method::DELETE, ["categories", category]) => respond(
            categories::delete(state, req, category).await,
            "Error in deleting category",
        ),

        // Blogs
        (&Method::GET, ["blogs"]) => {
            respond(blogs::list(state, req).await, "Error in getting blogs")
        }
        (&Method::POST, ["blogs"]) => {
            respond(blogs::create(state, req).await, "Error in creating blog")
        }
        (&Method::GET, ["blogs", blog]) => {
            respond(blogs::get(state, req, blog).await, "Error in getting blog")
        }
        (&Method::PATCH, ["blogs", blog]) => respond(
            blogs::update(state, req, blog).await,
            "Error in updating a blog",
        ),
        (&Method::DELETE, ["blogs", blog]) => respond(
            blogs::delete(state, req, blog).await,
            "Error in deleting a blog",
        ),

        // Known resource, unsupported verb
        (_, ["users" | "categories" | "blogs"])
        | (_, ["users" | "categories" | "blogs", _])
        | (_, ["health" | "healthz" | "ready" | "readyz" | "version"]) => {
            method_not_allowed_response()
        }

        _ => not_found_response(&req.path),
    }
}
