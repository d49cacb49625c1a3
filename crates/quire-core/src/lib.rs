//! # Quire Core
//!
//! The domain layer of Quire.
//! This crate contains the post model, the ports infrastructure must implement,
//! and the post service shared by the JSON API and the page views.
//! It has zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::DomainError;
pub use services::{PostService, PutMode};
