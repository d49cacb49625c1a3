//! # Quire Shared
//!
//! Wire types shared by the API server and the API client.

pub mod dto;
pub mod response;

pub use dto::{CreatePostRequest, DeletePostResponse, PostResponse, UpdatePostRequest};
pub use response::ErrorResponse;
