//! Repositories for database operations

pub mod base;
pub mod user;

pub use base::BaseRepository;
pub use user::UserRepository;
