use actix_web::body::MessageBody;
use actix_web::dev::ServiceResponse;
use actix_web::{App, HttpServer, http::StatusCode, test};
use quire_client::{ClientError, PostsClient};
use quire_core::PutMode;
use quire_editor::DEFAULT_CHARACTER_LIMIT;
use quire_shared::{CreatePostRequest, ErrorResponse, PostResponse, UpdatePostRequest};
use serde_json::{Value, json};

use crate::configure_app;
use crate::observability::RequestIdMiddleware;
use crate::state::AppState;

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .wrap(RequestIdMiddleware)
                .configure(configure_app($state)),
        )
        .await
    };
}

fn upsert_state() -> AppState {
    AppState::in_memory(PutMode::Upsert, DEFAULT_CHARACTER_LIMIT)
}

fn create_request(title: &str, body: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/posts")
        .set_json(json!({ "title": title, "body": body }))
}

async fn body_text<B: MessageBody>(resp: ServiceResponse<B>) -> String {
    let bytes = test::read_body(resp).await;
    String::from_utf8(bytes.to_vec()).unwrap()
}

// Posts API

#[actix_web::test]
async fn create_then_get_returns_the_same_post() {
    let app = app!(upsert_state());

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(json!({ "title": "Hello", "body": "<p>World</p>", "userId": 7 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let created: PostResponse = test::read_body_json(resp).await;
    assert_eq!(created.title, "Hello");
    assert_eq!(created.body, "<p>World</p>");
    assert_eq!(created.user_id, Some(7));
    assert!(created.created_at.is_some());

    let uri = format!("/api/posts/{}", created.id);
    let first: PostResponse =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    let second: PostResponse =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(first, created);
    assert_eq!(first, second);
}

#[actix_web::test]
async fn list_is_newest_first() {
    let app = app!(upsert_state());

    for title in ["first", "second", "third"] {
        let resp = test::call_service(&app, create_request(title, "<p>b</p>").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let posts: Vec<PostResponse> =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/posts").to_request())
            .await;
    let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, ["third", "second", "first"]);
}

#[actix_web::test]
async fn partial_update_keeps_other_fields() {
    let app = app!(upsert_state());
    let created: PostResponse =
        test::call_and_read_body_json(&app, create_request("Old", "<p>Body</p>").to_request()).await;

    let req = test::TestRequest::put()
        .uri(&format!("/api/posts/{}", created.id))
        .set_json(json!({ "title": "New" }))
        .to_request();
    let updated: PostResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.title, "New");
    assert_eq!(updated.body, "<p>Body</p>");
}

#[actix_web::test]
async fn put_on_missing_id_creates_it_in_upsert_mode() {
    let app = app!(upsert_state());

    let req = test::TestRequest::put()
        .uri("/api/posts/42")
        .set_json(json!({ "title": "T", "body": "<p>B</p>" }))
        .to_request();
    let created: PostResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(created.id, 42);

    let fetched: PostResponse = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/posts/42").to_request(),
    )
    .await;
    assert_eq!(fetched.title, "T");
}

#[actix_web::test]
async fn put_creating_a_post_needs_both_fields() {
    let app = app!(upsert_state());

    let req = test::TestRequest::put()
        .uri("/api/posts/5")
        .set_json(json!({ "title": "Only a title" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/api/posts/5").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn put_on_missing_id_is_not_found_in_strict_mode() {
    let app = app!(AppState::in_memory(PutMode::Strict, DEFAULT_CHARACTER_LIMIT));

    let req = test::TestRequest::put()
        .uri("/api/posts/42")
        .set_json(json!({ "title": "T", "body": "<p>B</p>" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let err: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(err.error, "Post not found");
    assert_eq!(err.status, 404);
}

#[actix_web::test]
async fn deleted_posts_are_gone() {
    let app = app!(upsert_state());
    let created: PostResponse =
        test::call_and_read_body_json(&app, create_request("T", "<p>B</p>").to_request()).await;
    let uri = format!("/api/posts/{}", created.id);

    let resp = test::call_service(&app, test::TestRequest::delete().uri(&uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "message": "Post deleted successfully" }));

    let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = test::call_service(&app, test::TestRequest::delete().uri(&uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let err: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(err.error, "Cannot delete post: not found in DB");
}

#[actix_web::test]
async fn blank_fields_are_rejected_and_nothing_is_stored() {
    let app = app!(upsert_state());

    for (title, body) in [("", "<p>B</p>"), ("T", ""), ("   ", "<p>B</p>")] {
        let resp = test::call_service(&app, create_request(title, body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let err: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(err.error, "Title and body are required");
    }

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/posts")
            .set_json(json!({ "body": "<p>B</p>" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let posts: Vec<PostResponse> =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/posts").to_request())
            .await;
    assert!(posts.is_empty());
}

#[actix_web::test]
async fn malformed_ids_are_bad_requests() {
    let app = app!(upsert_state());

    for raw in ["abc", "0", "-3", "1.5", "7x"] {
        let uri = format!("/api/posts/{}", raw);
        let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "id {raw}");
        let err: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(err.error, "Invalid ID");
    }

    let resp =
        test::call_service(&app, test::TestRequest::delete().uri("/api/posts/abc").to_request())
            .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn malformed_json_is_a_bad_request() {
    let app = app!(upsert_state());

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"title\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let err: ErrorResponse = test::read_body_json(resp).await;
    assert!(err.error.starts_with("Invalid JSON body"));
}

#[actix_web::test]
async fn error_bodies_carry_the_request_id() {
    let app = app!(upsert_state());

    let req = test::TestRequest::get()
        .uri("/api/posts/999")
        .insert_header(("X-Request-ID", "req-123"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(resp.headers().get("x-request-id").unwrap(), "req-123");
    let err: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(err.request_id.as_deref(), Some("req-123"));

    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/api/posts/abc").to_request()).await;
    let header = resp.headers().get("x-request-id").unwrap().to_str().unwrap().to_string();
    let err: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(err.request_id, Some(header));
}

#[actix_web::test]
async fn bodies_are_sanitized_on_write() {
    let app = app!(upsert_state());

    let created: PostResponse = test::call_and_read_body_json(
        &app,
        create_request("T", r#"<p onclick="x()">Hi<script>alert(1)</script></p>"#).to_request(),
    )
    .await;
    assert_eq!(created.body, "<p>Hi</p>");
}

#[actix_web::test]
async fn script_only_bodies_are_rejected() {
    let app = app!(upsert_state());
    let script = "<script>alert(1)</script>";

    let resp = test::call_service(&app, create_request("T", script).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::put()
        .uri("/api/posts/3")
        .set_json(json!({ "title": "T", "body": script }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let posts: Vec<PostResponse> =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/posts").to_request())
            .await;
    assert!(posts.is_empty());

    let created: PostResponse =
        test::call_and_read_body_json(&app, create_request("T", "<p>Kept</p>").to_request()).await;
    let req = test::TestRequest::put()
        .uri(&format!("/api/posts/{}", created.id))
        .set_json(json!({ "body": script }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let fetched: PostResponse = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/posts/{}", created.id))
            .to_request(),
    )
    .await;
    assert_eq!(fetched.body, "<p>Kept</p>");
}

#[actix_web::test]
async fn health_reports_ok() {
    let app = app!(upsert_state());

    let body: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/health").to_request())
            .await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

// Pages

#[actix_web::test]
async fn index_shows_placeholder_when_empty() {
    let app = app!(upsert_state());

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("No posts available at the moment."));
}

#[actix_web::test]
async fn index_lists_posts_with_excerpts() {
    let state = upsert_state();
    let post = state
        .posts
        .create(None, "Rust & You", "<p>Hello <strong>world</strong></p>")
        .await
        .unwrap();
    let app = app!(state);

    let html = body_text(test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await).await;
    assert!(html.contains("Rust &#38; You"));
    assert!(html.contains("Hello world..."));
    assert!(html.contains(&format!("href=\"/posts/{}\"", post.id)));
}

#[actix_web::test]
async fn post_page_renders_sanitized_body() {
    let state = upsert_state();
    let post = state
        .posts
        .create(None, "Title", "<p>Body <em>text</em></p>")
        .await
        .unwrap();
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri(&format!("/posts/{}", post.id)).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("<h1>Title</h1>"));
    assert!(html.contains("<p>Body <em>text</em></p>"));
    assert!(html.contains("Published "));
}

#[actix_web::test]
async fn post_page_errors() {
    let app = app!(upsert_state());

    let resp = test::call_service(&app, test::TestRequest::get().uri("/posts/12").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_text(resp).await.contains("Post not found"));

    let resp = test::call_service(&app, test::TestRequest::get().uri("/posts/nope").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(resp).await.contains("Invalid ID"));
}

#[actix_web::test]
async fn create_form_shows_editor_state() {
    let app = app!(upsert_state());

    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/admin/create-post").to_request())
            .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("Create Post"));
    assert!(html.contains("0/5000 characters"));
    assert!(html.contains("Start typing here..."));
    assert!(html.contains("Saving..."));
}

#[actix_web::test]
async fn create_form_redirects_home_on_success() {
    let state = upsert_state();
    let app = app!(state.clone());

    let req = test::TestRequest::post()
        .uri("/admin/create-post")
        .set_form([("title", "From form"), ("body", "<p>Body</p>")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get("location").unwrap(), "/");

    let posts = state.posts.list().await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].title, "From form");
}

#[actix_web::test]
async fn create_form_keeps_input_on_failure() {
    let app = app!(upsert_state());

    let req = test::TestRequest::post()
        .uri("/admin/create-post")
        .set_form([("title", "Kept title"), ("body", "")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let html = body_text(resp).await;
    assert!(html.contains("Error: Title and body are required"));
    assert!(html.contains("value=\"Kept title\""));
}

#[actix_web::test]
async fn toolbar_buttons_rewrite_the_body_without_saving() {
    let state = upsert_state();
    let app = app!(state.clone());

    let req = test::TestRequest::post()
        .uri("/admin/create-post")
        .set_form([
            ("title", "Draft"),
            ("body", "<p>Hi</p>"),
            ("command", "bold"),
            ("block", "0"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains(r#"<div class="preview prose"><p><strong>Hi</strong></p></div>"#));
    assert!(html.contains(r#"name="command" value="bold""#));
    assert!(html.contains("value=\"Draft\""));
    assert!(state.posts.list().await.unwrap().is_empty());
}

#[actix_web::test]
async fn unavailable_toolbar_buttons_keep_the_body() {
    let state = upsert_state();
    let post = state.posts.create(None, "Draft", "<p>Old</p>").await.unwrap();
    let app = app!(state.clone());

    let req = test::TestRequest::post()
        .uri(&format!("/admin/edit-post/{}", post.id))
        .set_form([
            ("title", "Draft"),
            ("body", "<p>Changed</p>"),
            ("command", "add-row"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let html = body_text(resp).await;
    assert!(html.contains("Error: That action is not available here."));
    assert!(html.contains("<p>Changed</p>"));
    assert_eq!(state.posts.get(post.id).await.unwrap().body, "<p>Old</p>");
}

#[actix_web::test]
async fn edit_form_loads_and_updates_post() {
    let state = upsert_state();
    let post = state.posts.create(None, "Draft", "<p>Old</p>").await.unwrap();
    let app = app!(state.clone());
    let uri = format!("/admin/edit-post/{}", post.id);

    let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("Edit Post"));
    assert!(html.contains("value=\"Draft\""));
    assert!(html.contains("3/5000 characters"));

    let req = test::TestRequest::post()
        .uri(&uri)
        .set_form([("title", "Final"), ("body", "<p>New</p>")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let stored = state.posts.get(post.id).await.unwrap();
    assert_eq!(stored.title, "Final");
    assert_eq!(stored.body, "<p>New</p>");
}

#[actix_web::test]
async fn edit_form_for_missing_post() {
    let app = app!(upsert_state());

    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/admin/edit-post/77").to_request())
            .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_text(resp).await.contains("Post not found."));
}

#[actix_web::test]
async fn admin_delete_redirects_back_to_dashboard() {
    let state = upsert_state();
    let post = state.posts.create(None, "Doomed", "<p>x</p>").await.unwrap();
    let app = app!(state.clone());

    let req = test::TestRequest::post()
        .uri(&format!("/admin/posts/{}/delete", post.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get("location").unwrap(), "/admin");
    assert!(state.posts.list().await.unwrap().is_empty());

    let req = test::TestRequest::post()
        .uri(&format!("/admin/posts/{}/delete", post.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_text(resp).await.contains("Cannot delete post: not found in DB"));
}

#[actix_web::test]
async fn admin_shows_first_hundred_posts() {
    let state = upsert_state();
    for i in 0..105 {
        state
            .posts
            .create(None, &format!("Post {i}"), "<p>x</p>")
            .await
            .unwrap();
    }
    let app = app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/admin").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert_eq!(html.matches("/admin/edit-post/").count(), 100);
    assert!(html.contains("Deleting..."));
}

// Live server

#[actix_web::test]
async fn client_round_trip_against_live_server() {
    let state = upsert_state();
    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestIdMiddleware)
            .configure(configure_app(state.clone()))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();
    let addr = server.addrs()[0];
    let server = server.run();
    let handle = server.handle();
    actix_rt::spawn(server);

    let client = PostsClient::new(format!("http://{}", addr));

    let created = client
        .create_post(&CreatePostRequest {
            title: "Live".into(),
            body: "<p>Post</p>".into(),
            user_id: None,
        })
        .await
        .unwrap();
    assert_eq!(client.get_post(created.id).await.unwrap(), Some(created.clone()));

    let updated = client
        .update_post(
            created.id,
            &UpdatePostRequest {
                title: Some("Edited".into()),
                body: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.body, "<p>Post</p>");
    assert_eq!(client.list_posts().await.unwrap().len(), 1);

    let err = client
        .create_post(&CreatePostRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::Api { status: 400, ref message } if message == "Title and body are required"
    ));

    let deleted = client.delete_post(created.id).await.unwrap();
    assert_eq!(deleted.message, "Post deleted successfully");
    assert_eq!(client.get_post(created.id).await.unwrap(), None);

    let err = client.delete_post(created.id).await.unwrap_err();
    assert_eq!(err.status(), Some(404));

    handle.stop(true).await;
}
