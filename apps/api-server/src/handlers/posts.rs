//! Posts JSON API.

use actix_web::{HttpResponse, web};
use quire_core::DomainError;
use quire_core::domain::parse_post_id;
use quire_shared::{CreatePostRequest, DeletePostResponse, PostResponse, UpdatePostRequest};

use crate::middleware::{AppError, AppResult};
use crate::state::AppState;

fn post_id(raw: &str) -> AppResult<i32> {
    parse_post_id(raw).ok_or_else(AppError::invalid_id)
}

/// List every post, newest first.
///
/// GET /api/posts
pub async fn list_posts(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state
        .posts
        .list()
        .await
        .map_err(AppError::domain("Failed to fetch posts"))?;

    let body: Vec<PostResponse> = posts.into_iter().map(PostResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/posts/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = post_id(&path)?;

    let post = state
        .posts
        .get(id)
        .await
        .map_err(AppError::domain("Error fetching post"))?;

    Ok(HttpResponse::Ok().json(PostResponse::from(post)))
}

/// POST /api/posts
pub async fn create_post(
    state: web::Data<AppState>,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let post = state
        .posts
        .create(req.user_id, &req.title, &req.body)
        .await
        .map_err(AppError::domain("Failed to create post"))?;

    Ok(HttpResponse::Ok().json(PostResponse::from(post)))
}

/// Partial update, or create at `id` when the put mode is upsert.
///
/// PUT /api/posts/{id}
pub async fn put_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let id = post_id(&path)?;

    let post = state
        .posts
        .put(id, body.into_inner().into())
        .await
        .map_err(AppError::domain("Error updating or creating post"))?;

    Ok(HttpResponse::Ok().json(PostResponse::from(post)))
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = post_id(&path)?;

    state.posts.delete(id).await.map_err(|e| match e {
        DomainError::NotFound { .. } => {
            AppError::NotFound("Cannot delete post: not found in DB".to_string())
        }
        other => AppError::domain("Error deleting post")(other),
    })?;

    Ok(HttpResponse::Ok().json(DeletePostResponse::deleted()))
}
