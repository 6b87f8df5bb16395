//! In-memory user store for exercising the upsert workflow in tests

use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::AdminResult;
use crate::models::{Association, Town, User, UserFields, UserMeta};
use crate::store::UserStore;

#[derive(Debug, Default)]
pub struct MemoryStore {
    pub users: BTreeMap<i64, User>,
    pub roles: BTreeMap<i64, BTreeSet<i32>>,
    pub metas: BTreeMap<i64, UserMeta>,
    pub edges: BTreeMap<Association, BTreeSet<(i64, i64)>>,
    pub towns: Vec<Town>,
    /// Number of `update_user` calls
    pub user_writes: usize,
    /// Number of edge rows actually inserted
    pub edge_inserts: usize,
    /// Number of edge rows actually removed
    pub edge_deletes: usize,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Seed a user row directly, bypassing the workflow
    pub fn seed_user(&mut self, name: &str, user_type: i32, status: &str) -> User {
        let id = self.next_id();
        let now = Utc::now();
        let user = User {
            id,
            user_type,
            name: name.to_string(),
            company_id: 0,
            department_id: 0,
            email: format!("{}@example.com", name.to_lowercase()),
            dob_or_orgid: None,
            phone: None,
            mobile: None,
            password: None,
            status: status.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.users.insert(id, user.clone());
        user
    }

    /// Seed an edge directly, bypassing the workflow
    pub fn seed_edge(&mut self, association: Association, user_id: i64, target_id: i64) {
        self.edges
            .entry(association)
            .or_default()
            .insert((user_id, target_id));
    }

    /// Sorted target ids linked to the user
    pub fn targets(&self, association: Association, user_id: i64) -> Vec<i64> {
        self.edges
            .get(&association)
            .map(|edges| {
                edges
                    .iter()
                    .filter(|(owner, _)| *owner == user_id)
                    .map(|(_, target)| *target)
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl UserStore for MemoryStore {
    async fn find_user(&mut self, id: i64) -> AdminResult<Option<User>> {
        Ok(self.users.get(&id).cloned())
    }

    async fn insert_user(
        &mut self,
        fields: &UserFields,
        password_hash: Option<&str>,
    ) -> AdminResult<User> {
        let id = self.next_id();
        let now = Utc::now();
        let mut user = User {
            id,
            user_type: 0,
            name: String::new(),
            company_id: 0,
            department_id: 0,
            email: String::new(),
            dob_or_orgid: None,
            phone: None,
            mobile: None,
            password: password_hash.map(str::to_string),
            status: "0".to_string(),
            created_at: now,
            updated_at: now,
        };
        user.apply(fields.clone());
        self.users.insert(id, user.clone());
        Ok(user)
    }

    async fn update_user(&mut self, user: &User) -> AdminResult<()> {
        self.user_writes += 1;
        let mut stored = user.clone();
        stored.updated_at = Utc::now();
        self.users.insert(user.id, stored);
        Ok(())
    }

    async fn replace_roles(&mut self, user_id: i64, role: i32) -> AdminResult<()> {
        self.roles.insert(user_id, BTreeSet::from([role]));
        Ok(())
    }

    async fn first_or_create_meta(&mut self, user_id: i64) -> AdminResult<UserMeta> {
        if let Some(meta) = self.metas.get(&user_id) {
            return Ok(meta.clone());
        }

        let meta = UserMeta {
            id: self.next_id(),
            user_id,
            ..Default::default()
        };
        self.metas.insert(user_id, meta.clone());
        Ok(meta)
    }

    async fn save_meta(&mut self, meta: &UserMeta) -> AdminResult<()> {
        self.metas.insert(meta.user_id, meta.clone());
        Ok(())
    }

    async fn edge_targets(&mut self, association: Association, user_id: i64) -> AdminResult<Vec<i64>> {
        Ok(self.targets(association, user_id))
    }

    async fn first_or_create_edge(
        &mut self,
        association: Association,
        user_id: i64,
        target_id: i64,
    ) -> AdminResult<()> {
        if self
            .edges
            .entry(association)
            .or_default()
            .insert((user_id, target_id))
        {
            self.edge_inserts += 1;
        }
        Ok(())
    }

    async fn delete_edges(
        &mut self,
        association: Association,
        user_id: i64,
        target_ids: &[i64],
    ) -> AdminResult<u64> {
        let edges = self.edges.entry(association).or_default();
        let before = edges.len();
        edges.retain(|(owner, target)| !(*owner == user_id && target_ids.contains(target)));
        let removed = before - edges.len();
        self.edge_deletes += removed;
        Ok(removed as u64)
    }

    async fn delete_all_edges(&mut self, association: Association, user_id: i64) -> AdminResult<u64> {
        let edges = self.edges.entry(association).or_default();
        let before = edges.len();
        edges.retain(|(owner, _)| *owner != user_id);
        let removed = before - edges.len();
        self.edge_deletes += removed;
        Ok(removed as u64)
    }

    async fn create_town(&mut self, townname: &str) -> AdminResult<Town> {
        let town = Town {
            id: 1000 + self.towns.len() as i64 + 1,
            townname: townname.to_string(),
        };
        self.towns.push(town.clone());
        Ok(town)
    }

    async fn users_by_type(&mut self, user_type: i32) -> AdminResult<Vec<User>> {
        Ok(self
            .users
            .values()
            .filter(|user| user.user_type == user_type)
            .cloned()
            .collect())
    }
}
