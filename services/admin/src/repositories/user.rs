//! User repository: admin create/update of accounts and their dependent records
//!
//! [`create_or_update`] applies a request in a fixed order:
//!
//! 1. copy profile columns (hashing a supplied password) and save the user
//! 2. replace the role assignment with `request.role`
//! 3. first-or-create the meta row and overwrite it
//! 4. diff-sync the translator blacklist
//! 5. diff-sync declared languages
//! 6. create a requested new town, then replace all town edges
//! 7. enable or disable the account when the status changed
//!
//! [`UserRepository::create_or_update`] runs all of it inside one transaction.

use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

use crate::error::{AdminError, AdminResult};
use crate::hashing::CredentialHasher;
use crate::models::{Association, TRANSLATOR_ROLE, User, UserFields, UserRequest, UserStatus};
use crate::store::{PgUserStore, UserStore};
use crate::sync::{SyncReport, sync_edges};

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
    hasher: Arc<dyn CredentialHasher>,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { pool, hasher }
    }

    /// Create a user when `id` is `None`, otherwise update it, atomically
    pub async fn create_or_update(&self, id: Option<i64>, request: &UserRequest) -> AdminResult<User> {
        match id {
            Some(id) => info!("Updating user {}", id),
            None => info!("Creating new user: {}", request.email),
        }

        let mut tx = self.pool.begin().await?;
        let user = {
            let mut store = PgUserStore::new(&mut *tx);
            create_or_update(&mut store, self.hasher.as_ref(), id, request).await?
        };
        tx.commit().await?;

        Ok(user)
    }

    /// Mark the account enabled
    pub async fn enable(&self, id: i64) -> AdminResult<User> {
        let mut conn = self.pool.acquire().await?;
        enable(&mut PgUserStore::new(&mut *conn), id).await
    }

    /// Mark the account disabled
    pub async fn disable(&self, id: i64) -> AdminResult<User> {
        let mut conn = self.pool.acquire().await?;
        disable(&mut PgUserStore::new(&mut *conn), id).await
    }

    /// Every translator account
    pub async fn get_translators(&self) -> AdminResult<Vec<User>> {
        let mut conn = self.pool.acquire().await?;
        get_translators(&mut PgUserStore::new(&mut *conn)).await
    }
}

/// Create or update a user and all its dependent records through `store`
pub async fn create_or_update<S: UserStore>(
    store: &mut S,
    hasher: &dyn CredentialHasher,
    id: Option<i64>,
    request: &UserRequest,
) -> AdminResult<User> {
    let existing = match id {
        Some(id) => Some(find_or_fail(store, id).await?),
        None => None,
    };

    let mut user = update_user_data(store, hasher, existing, request).await?;
    store.replace_roles(user.id, request.role).await?;
    update_meta(store, &user, request).await?;

    sync_edges(
        store,
        Association::Blacklist,
        user.id,
        &request.translator_ex,
        Association::Blacklist.strategy(),
    )
    .await?;
    sync_edges(
        store,
        Association::Languages,
        user.id,
        &request.user_language,
        Association::Languages.strategy(),
    )
    .await?;
    sync_towns(store, user.id, &request.user_towns_projects, request.new_town()).await?;

    if let Some(updated) = update_status(store, &user, request.status).await? {
        user = updated;
    }

    Ok(user)
}

/// Set status to enabled on a freshly fetched user
pub async fn enable<S: UserStore>(store: &mut S, id: i64) -> AdminResult<User> {
    set_status(store, id, UserStatus::Enabled).await
}

/// Set status to disabled on a freshly fetched user
pub async fn disable<S: UserStore>(store: &mut S, id: i64) -> AdminResult<User> {
    set_status(store, id, UserStatus::Disabled).await
}

pub async fn get_translators<S: UserStore>(store: &mut S) -> AdminResult<Vec<User>> {
    store.users_by_type(TRANSLATOR_ROLE).await
}

async fn find_or_fail<S: UserStore>(store: &mut S, id: i64) -> AdminResult<User> {
    store
        .find_user(id)
        .await?
        .ok_or_else(|| AdminError::not_found("User", id))
}

async fn update_user_data<S: UserStore>(
    store: &mut S,
    hasher: &dyn CredentialHasher,
    existing: Option<User>,
    request: &UserRequest,
) -> AdminResult<User> {
    let fields = UserFields::from_request(request);
    let password_hash = request.password().map(|p| hasher.hash(p)).transpose()?;

    match existing {
        Some(mut user) => {
            user.apply(fields);
            if let Some(hash) = password_hash {
                user.password = Some(hash);
            }
            store.update_user(&user).await?;
            Ok(user)
        }
        None => store.insert_user(&fields, password_hash.as_deref()).await,
    }
}

async fn update_meta<S: UserStore>(store: &mut S, user: &User, request: &UserRequest) -> AdminResult<()> {
    let mut meta = store.first_or_create_meta(user.id).await?;
    meta.apply(request);
    store.save_meta(&meta).await
}

async fn sync_towns<S: UserStore>(
    store: &mut S,
    user_id: i64,
    town_ids: &[i64],
    new_town: Option<&str>,
) -> AdminResult<SyncReport> {
    let mut town_ids = town_ids.to_vec();
    if let Some(name) = new_town {
        let town = store.create_town(name).await?;
        info!("Created town {} ({})", town.townname, town.id);
        town_ids.push(town.id);
    }

    sync_edges(
        store,
        Association::Towns,
        user_id,
        &town_ids,
        Association::Towns.strategy(),
    )
    .await
}

async fn update_status<S: UserStore>(
    store: &mut S,
    user: &User,
    status: UserStatus,
) -> AdminResult<Option<User>> {
    if user.status == status.as_str() {
        return Ok(None);
    }

    let updated = match status {
        UserStatus::Enabled => enable(store, user.id).await?,
        UserStatus::Disabled => disable(store, user.id).await?,
    };
    Ok(Some(updated))
}

async fn set_status<S: UserStore>(store: &mut S, id: i64, status: UserStatus) -> AdminResult<User> {
    let mut user = find_or_fail(store, id).await?;
    user.status = status.as_str().to_string();
    store.update_user(&user).await?;
    info!("User {} status set to {}", id, user.status);
    Ok(user)
}
