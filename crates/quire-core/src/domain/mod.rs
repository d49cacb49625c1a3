//! Domain entities - the core business objects.

mod post;

pub use post::{NewPost, Post, PostChanges, parse_post_id};
