//! Server-rendered public and admin pages.

mod handlers;
mod views;

use actix_web::web;

/// Configure the page routes.
pub fn configure_pages(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::index))
        .route("/posts/{id}", web::get().to(handlers::show_post))
        .route("/admin", web::get().to(handlers::admin))
        .route("/admin/posts/{id}/delete", web::post().to(handlers::delete_post))
        .service(
            web::resource("/admin/create-post")
                .route(web::get().to(handlers::new_post_form))
                .route(web::post().to(handlers::create_post)),
        )
        .service(
            web::resource("/admin/edit-post/{id}")
                .route(web::get().to(handlers::edit_post_form))
                .route(web::post().to(handlers::update_post)),
        );
}
