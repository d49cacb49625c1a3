//! Application services built on the ports.

mod posts;

pub use posts::{PostService, PutMode};
