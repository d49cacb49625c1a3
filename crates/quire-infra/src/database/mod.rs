//! Database connection management and the SeaORM post store.

mod connections;

#[cfg(feature = "postgres")]
mod sea_orm_base;
#[cfg(feature = "postgres")]
pub mod sea_orm_repo;

#[cfg(feature = "postgres")]
pub mod entity;

pub use connections::DatabaseConfig;

#[cfg(feature = "postgres")]
pub use connections::connect;
#[cfg(feature = "postgres")]
pub use sea_orm_repo::SeaOrmPostRepository;
