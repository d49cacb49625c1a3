//! In-memory store - used when no database is configured, and by tests.

mod posts;

pub use posts::InMemoryPostRepository;
