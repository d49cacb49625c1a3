//! Public and admin page handlers.

use actix_web::{HttpResponse, http::StatusCode, http::header, web};
use quire_core::DomainError;
use quire_core::domain::{PostChanges, parse_post_id};
use serde::Deserialize;

use super::views::{
    AdminPostView, AdminTemplate, ErrorTemplate, FormKind, IndexTemplate, PostCardView,
    PostFormTemplate, PostTemplate, format_date, render, run_toolbar,
};
use crate::middleware::AppError;
use crate::observability::RequestId;
use crate::state::AppState;

const ADMIN_POST_LIMIT: usize = 100;

/// Fields submitted by the create and edit forms.
#[derive(Debug, Default, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    /// Toolbar button pressed instead of saving.
    pub command: Option<String>,
    pub block: Option<String>,
    #[serde(default)]
    pub url: String,
}

impl PostForm {
    fn block(&self) -> Option<usize> {
        self.block.as_deref().and_then(|b| b.trim().parse().ok())
    }
}

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

fn status_of(err: &AppError) -> StatusCode {
    actix_web::ResponseError::status_code(err)
}

/// Re-render the form with the toolbar button applied to the body. Nothing is saved.
fn toolbar_form(kind: FormKind, state: &AppState, form: &PostForm, key: &str) -> HttpResponse {
    let block = form.block();
    let limit = state.character_limit;
    match run_toolbar(&form.body, limit, block, key, &form.url) {
        Some(body) => {
            let page = PostFormTemplate::new(kind, &form.title, &body, limit)
                .with_selection(block, &form.url);
            render(&page, StatusCode::OK)
        }
        None => {
            let page = PostFormTemplate::new(kind, &form.title, &form.body, limit)
                .with_selection(block, &form.url)
                .with_error("That action is not available here.");
            render(&page, StatusCode::BAD_REQUEST)
        }
    }
}

fn error_page(err: &AppError, request_id: &RequestId) -> HttpResponse {
    let status = status_of(err);
    let template = ErrorTemplate {
        status: status.as_u16(),
        message: err.to_string(),
        request_id: Some(request_id.as_str().to_string()),
    };
    render(&template, status)
}

/// GET /
pub async fn index(state: web::Data<AppState>, request_id: RequestId) -> HttpResponse {
    match state.posts.list().await {
        Ok(posts) => {
            let template = IndexTemplate {
                posts: posts.iter().map(PostCardView::from).collect(),
            };
            render(&template, StatusCode::OK)
        }
        Err(e) => error_page(&AppError::domain("Error loading posts")(e), &request_id),
    }
}

/// GET /posts/{id}
pub async fn show_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
    request_id: RequestId,
) -> HttpResponse {
    let Some(id) = parse_post_id(&path) else {
        return error_page(&AppError::invalid_id(), &request_id);
    };

    match state.posts.get(id).await {
        Ok(post) => {
            let template = PostTemplate {
                published: format_date(&post.created_at),
                body_html: state.sanitizer.clean(&post.body),
                title: post.title,
            };
            render(&template, StatusCode::OK)
        }
        Err(e) => error_page(&AppError::domain("Error fetching post")(e), &request_id),
    }
}

async fn dashboard(state: &AppState, error: Option<AppError>) -> HttpResponse {
    let mut status = error.as_ref().map_or(StatusCode::OK, status_of);
    let mut error = error.map(|e| e.to_string());

    let posts = match state.posts.list().await {
        Ok(posts) => posts
            .into_iter()
            .take(ADMIN_POST_LIMIT)
            .map(|post| AdminPostView {
                id: post.id,
                preview_html: state.sanitizer.clean(&post.body),
                title: post.title,
            })
            .collect(),
        Err(e) => {
            let err = AppError::domain("Failed to fetch posts")(e);
            if error.is_none() {
                status = status_of(&err);
                error = Some(err.to_string());
            }
            Vec::new()
        }
    };

    render(&AdminTemplate { posts, error }, status)
}

/// GET /admin
pub async fn admin(state: web::Data<AppState>) -> HttpResponse {
    dashboard(&state, None).await
}

/// POST /admin/posts/{id}/delete
pub async fn delete_post(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let Some(id) = parse_post_id(&path) else {
        return dashboard(&state, Some(AppError::invalid_id())).await;
    };

    match state.posts.delete(id).await {
        Ok(()) => see_other("/admin"),
        Err(DomainError::NotFound { .. }) => {
            let err = AppError::NotFound("Cannot delete post: not found in DB".to_string());
            dashboard(&state, Some(err)).await
        }
        Err(e) => dashboard(&state, Some(AppError::domain("Failed to delete post")(e))).await,
    }
}

/// GET /admin/create-post
pub async fn new_post_form(state: web::Data<AppState>) -> HttpResponse {
    let form = PostFormTemplate::new(FormKind::Create, "", "", state.character_limit);
    render(&form, StatusCode::OK)
}

/// POST /admin/create-post
pub async fn create_post(
    state: web::Data<AppState>,
    form: web::Form<PostForm>,
) -> HttpResponse {
    let form = form.into_inner();
    if let Some(key) = form.command.as_deref() {
        return toolbar_form(FormKind::Create, &state, &form, key);
    }
    let PostForm { title, body, .. } = form;

    match state.posts.create(None, &title, &body).await {
        Ok(_) => see_other("/"),
        Err(e) => {
            let err = AppError::domain("Failed to create post")(e);
            let form = PostFormTemplate::new(FormKind::Create, &title, &body, state.character_limit)
                .with_error(err.to_string());
            render(&form, status_of(&err))
        }
    }
}

/// GET /admin/edit-post/{id}
pub async fn edit_post_form(
    state: web::Data<AppState>,
    path: web::Path<String>,
    request_id: RequestId,
) -> HttpResponse {
    let Some(id) = parse_post_id(&path) else {
        return error_page(&AppError::invalid_id(), &request_id);
    };

    match state.posts.get(id).await {
        Ok(post) => {
            let form = PostFormTemplate::new(
                FormKind::Edit(id),
                &post.title,
                &post.body,
                state.character_limit,
            );
            render(&form, StatusCode::OK)
        }
        Err(DomainError::NotFound { .. }) => {
            error_page(&AppError::NotFound("Post not found.".to_string()), &request_id)
        }
        Err(e) => error_page(&AppError::domain("Error fetching post")(e), &request_id),
    }
}

/// POST /admin/edit-post/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
    form: web::Form<PostForm>,
    request_id: RequestId,
) -> HttpResponse {
    let Some(id) = parse_post_id(&path) else {
        return error_page(&AppError::invalid_id(), &request_id);
    };
    let form = form.into_inner();
    if let Some(key) = form.command.as_deref() {
        return toolbar_form(FormKind::Edit(id), &state, &form, key);
    }
    let PostForm { title, body, .. } = form;

    let changes = PostChanges::default().title(title.as_str()).body(body.as_str());
    match state.posts.put(id, changes).await {
        Ok(_) => see_other("/"),
        Err(e) => {
            let err = AppError::domain("Failed to update post")(e);
            let form =
                PostFormTemplate::new(FormKind::Edit(id), &title, &body, state.character_limit)
                    .with_error(err.to_string());
            render(&form, status_of(&err))
        }
    }
}
