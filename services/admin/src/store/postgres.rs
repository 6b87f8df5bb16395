//! PostgreSQL implementation of the user store

use sqlx::PgConnection;
use tracing::debug;

use crate::error::AdminResult;
use crate::models::{Association, Town, User, UserFields, UserMeta};
use crate::repositories::base::Record;
use crate::store::UserStore;

/// User store bound to one connection, usually an open transaction
pub struct PgUserStore<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PgUserStore<'c> {
    /// Create a store over a borrowed connection
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }
}

impl UserStore for PgUserStore<'_> {
    async fn find_user(&mut self, id: i64) -> AdminResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", User::COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(user)
    }

    async fn insert_user(
        &mut self,
        fields: &UserFields,
        password_hash: Option<&str>,
    ) -> AdminResult<User> {
        debug!("Inserting user: {}", fields.email);

        let sql = format!(
            r#"
            INSERT INTO users (user_type, name, company_id, department_id, email,
                               dob_or_orgid, phone, mobile, password)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            User::COLUMNS
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(fields.user_type)
            .bind(&fields.name)
            .bind(fields.company_id)
            .bind(fields.department_id)
            .bind(&fields.email)
            .bind(&fields.dob_or_orgid)
            .bind(&fields.phone)
            .bind(&fields.mobile)
            .bind(password_hash)
            .fetch_one(&mut *self.conn)
            .await?;

        Ok(user)
    }

    async fn update_user(&mut self, user: &User) -> AdminResult<()> {
        debug!("Updating user: {}", user.id);

        sqlx::query(
            r#"
            UPDATE users
            SET user_type = $2, name = $3, company_id = $4, department_id = $5, email = $6,
                dob_or_orgid = $7, phone = $8, mobile = $9, password = $10, status = $11,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(user.user_type)
        .bind(&user.name)
        .bind(user.company_id)
        .bind(user.department_id)
        .bind(&user.email)
        .bind(&user.dob_or_orgid)
        .bind(&user.phone)
        .bind(&user.mobile)
        .bind(&user.password)
        .bind(&user.status)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    async fn replace_roles(&mut self, user_id: i64, role: i32) -> AdminResult<()> {
        sqlx::query("DELETE FROM role_user WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *self.conn)
            .await?;

        sqlx::query("INSERT INTO role_user (user_id, role_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(role)
            .execute(&mut *self.conn)
            .await?;

        Ok(())
    }

    async fn first_or_create_meta(&mut self, user_id: i64) -> AdminResult<UserMeta> {
        sqlx::query("INSERT INTO user_meta (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(&mut *self.conn)
            .await?;

        let sql = format!("SELECT {} FROM user_meta WHERE user_id = $1", UserMeta::COLUMNS);
        let meta = sqlx::query_as::<_, UserMeta>(&sql)
            .bind(user_id)
            .fetch_one(&mut *self.conn)
            .await?;

        Ok(meta)
    }

    async fn save_meta(&mut self, meta: &UserMeta) -> AdminResult<()> {
        sqlx::query(
            r#"
            UPDATE user_meta
            SET consumer_type = $2, customer_type = $3, username = $4, post_code = $5,
                address = $6, city = $7, town = $8, country = $9, reference = $10,
                additional_info = $11, cost_place = $12, fee = $13, time_to_charge = $14,
                time_to_pay = $15, charge_ob = $16, customer_id = $17, charge_km = $18,
                maximum_km = $19
            WHERE id = $1
            "#,
        )
        .bind(meta.id)
        .bind(&meta.consumer_type)
        .bind(&meta.customer_type)
        .bind(&meta.username)
        .bind(&meta.post_code)
        .bind(&meta.address)
        .bind(&meta.city)
        .bind(&meta.town)
        .bind(&meta.country)
        .bind(meta.reference)
        .bind(&meta.additional_info)
        .bind(&meta.cost_place)
        .bind(&meta.fee)
        .bind(&meta.time_to_charge)
        .bind(&meta.time_to_pay)
        .bind(&meta.charge_ob)
        .bind(&meta.customer_id)
        .bind(&meta.charge_km)
        .bind(&meta.maximum_km)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    async fn edge_targets(&mut self, association: Association, user_id: i64) -> AdminResult<Vec<i64>> {
        let sql = format!(
            "SELECT {column} FROM {table} WHERE user_id = $1 ORDER BY {column}",
            column = association.target_column(),
            table = association.table(),
        );

        let targets = sqlx::query_scalar::<_, i64>(&sql)
            .bind(user_id)
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(targets)
    }

    async fn first_or_create_edge(
        &mut self,
        association: Association,
        user_id: i64,
        target_id: i64,
    ) -> AdminResult<()> {
        let sql = format!(
            "INSERT INTO {table} (user_id, {column}) VALUES ($1, $2) \
             ON CONFLICT (user_id, {column}) DO NOTHING",
            column = association.target_column(),
            table = association.table(),
        );

        sqlx::query(&sql)
            .bind(user_id)
            .bind(target_id)
            .execute(&mut *self.conn)
            .await?;

        Ok(())
    }

    async fn delete_edges(
        &mut self,
        association: Association,
        user_id: i64,
        target_ids: &[i64],
    ) -> AdminResult<u64> {
        let sql = format!(
            "DELETE FROM {table} WHERE user_id = $1 AND {column} = ANY($2)",
            column = association.target_column(),
            table = association.table(),
        );

        let result = sqlx::query(&sql)
            .bind(user_id)
            .bind(target_ids)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_all_edges(&mut self, association: Association, user_id: i64) -> AdminResult<u64> {
        let sql = format!("DELETE FROM {} WHERE user_id = $1", association.table());

        let result = sqlx::query(&sql)
            .bind(user_id)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected())
    }

    async fn create_town(&mut self, townname: &str) -> AdminResult<Town> {
        let town = sqlx::query_as::<_, Town>(
            "INSERT INTO towns (townname) VALUES ($1) RETURNING id, townname",
        )
        .bind(townname)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(town)
    }

    async fn users_by_type(&mut self, user_type: i32) -> AdminResult<Vec<User>> {
        let sql = format!(
            "SELECT {} FROM users WHERE user_type = $1 ORDER BY id",
            User::COLUMNS
        );

        let users = sqlx::query_as::<_, User>(&sql)
            .bind(user_type)
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(users)
    }
}
