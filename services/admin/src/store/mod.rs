//! Persistence boundary used by the user upsert workflow
//!
//! The workflow only talks to storage through [`UserStore`], so the same code
//! runs against a PostgreSQL transaction in production and an in-memory store
//! in tests.

use std::future::Future;

use crate::error::AdminResult;
use crate::models::{Association, Town, User, UserFields, UserMeta};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgUserStore;

/// Storage operations over users and their dependent records
pub trait UserStore: Send {
    /// Find a user by id
    fn find_user(&mut self, id: i64) -> impl Future<Output = AdminResult<Option<User>>> + Send;

    /// Insert a new user row, returning it with its assigned id
    fn insert_user(
        &mut self,
        fields: &UserFields,
        password_hash: Option<&str>,
    ) -> impl Future<Output = AdminResult<User>> + Send;

    /// Persist every column of an existing user
    fn update_user(&mut self, user: &User) -> impl Future<Output = AdminResult<()>> + Send;

    /// Detach all roles of the user and attach exactly `role`
    fn replace_roles(
        &mut self,
        user_id: i64,
        role: i32,
    ) -> impl Future<Output = AdminResult<()>> + Send;

    /// Fetch the user's meta row, creating an empty one when missing
    fn first_or_create_meta(
        &mut self,
        user_id: i64,
    ) -> impl Future<Output = AdminResult<UserMeta>> + Send;

    fn save_meta(&mut self, meta: &UserMeta) -> impl Future<Output = AdminResult<()>> + Send;

    /// Target ids currently linked to the user through `association`
    fn edge_targets(
        &mut self,
        association: Association,
        user_id: i64,
    ) -> impl Future<Output = AdminResult<Vec<i64>>> + Send;

    /// Insert an edge unless it already exists
    fn first_or_create_edge(
        &mut self,
        association: Association,
        user_id: i64,
        target_id: i64,
    ) -> impl Future<Output = AdminResult<()>> + Send;

    /// Remove the listed edges, returning how many were deleted
    fn delete_edges(
        &mut self,
        association: Association,
        user_id: i64,
        target_ids: &[i64],
    ) -> impl Future<Output = AdminResult<u64>> + Send;

    /// Remove every edge of the user in `association`
    fn delete_all_edges(
        &mut self,
        association: Association,
        user_id: i64,
    ) -> impl Future<Output = AdminResult<u64>> + Send;

    fn create_town(&mut self, townname: &str) -> impl Future<Output = AdminResult<Town>> + Send;

    /// All users carrying the given `user_type`
    fn users_by_type(
        &mut self,
        user_type: i32,
    ) -> impl Future<Output = AdminResult<Vec<User>>> + Send;
}
