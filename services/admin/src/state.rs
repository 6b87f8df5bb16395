//! Application state shared across handlers

use sqlx::PgPool;
use std::sync::Arc;

use crate::{
    config::AdminConfig,
    hashing::CredentialHasher,
    models::{Language, Town, User, UserMeta},
    repositories::{BaseRepository, UserRepository},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: AdminConfig,
    pub user_repository: UserRepository,
    pub users: BaseRepository<User>,
    pub user_meta: BaseRepository<UserMeta>,
    pub towns: BaseRepository<Town>,
    pub languages: BaseRepository<Language>,
}

impl AppState {
    /// Wire every repository to the same pool
    pub fn new(config: AdminConfig, pool: PgPool, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self {
            config,
            user_repository: UserRepository::new(pool.clone(), hasher),
            users: BaseRepository::new(pool.clone()),
            user_meta: BaseRepository::new(pool.clone()),
            towns: BaseRepository::new(pool.clone()),
            languages: BaseRepository::new(pool),
        }
    }
}
