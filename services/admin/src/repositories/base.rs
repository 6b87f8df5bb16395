//! Generic repository shared by every record type
//!
//! Provides id and slug lookup, filtered queries, pagination, mass-assignment
//! create/update through a record's fillable columns, delete, and validation.

use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::postgres::PgRow;
use sqlx::{Encode, FromRow, PgPool, Postgres, Type};
use std::collections::HashMap;
use std::marker::PhantomData;
use tracing::info;

use crate::error::{AdminError, AdminResult};
use crate::validation::{RuleSet, Validator};

/// Default page size used by [`BaseRepository::paginate`]
pub const DEFAULT_PER_PAGE: u32 = 15;
/// Largest page size a caller may request
pub const MAX_PER_PAGE: u32 = 100;

/// A table-backed entity with a numeric `id` primary key
pub trait Record: for<'r> FromRow<'r, PgRow> + Send + Unpin + 'static {
    /// Name used in not-found errors
    const ENTITY: &'static str;
    const TABLE: &'static str;
    /// Comma-separated select list
    const COLUMNS: &'static str;
    /// Columns writable through generic create/update
    const FILLABLE: &'static [&'static str];
}

/// A record that can also be looked up by slug
pub trait Sluggable: Record {
    const SLUG_COLUMN: &'static str;
}

/// One page of records
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

/// Normalise paging input into `(page, per_page, offset)`
pub fn page_window(page: Option<u32>, per_page: Option<u32>) -> (u32, u32, i64) {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
    let offset = (page - 1) as i64 * per_page as i64;
    (page, per_page, offset)
}

/// Keep only the attributes the record allows to be mass-assigned
pub fn fillable_attributes<R: Record>(
    attributes: &Map<String, Value>,
) -> AdminResult<(Vec<&'static str>, Value)> {
    let mut columns = Vec::new();
    let mut filtered = Map::new();

    for column in R::FILLABLE {
        if let Some(value) = attributes.get(*column) {
            columns.push(*column);
            filtered.insert(column.to_string(), value.clone());
        }
    }

    if columns.is_empty() {
        return Err(AdminError::BadRequest(format!(
            "No fillable {} attributes provided",
            R::ENTITY
        )));
    }

    Ok((columns, Value::Object(filtered)))
}

/// Repository over a single record type
pub struct BaseRepository<R> {
    pool: PgPool,
    attribute_names: HashMap<String, String>,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for BaseRepository<R> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            attribute_names: self.attribute_names.clone(),
            _record: PhantomData,
        }
    }
}

impl<R: Record> BaseRepository<R> {
    /// Create a new repository
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            attribute_names: HashMap::new(),
            _record: PhantomData,
        }
    }

    /// Display names used by [`BaseRepository::validate`] messages
    pub fn with_attribute_names(mut self, attribute_names: HashMap<String, String>) -> Self {
        self.attribute_names = attribute_names;
        self
    }

    pub async fn all(&self) -> AdminResult<Vec<R>> {
        let sql = format!("SELECT {} FROM {} ORDER BY id", R::COLUMNS, R::TABLE);
        let rows = sqlx::query_as::<_, R>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn find(&self, id: i64) -> AdminResult<Option<R>> {
        let sql = format!("SELECT {} FROM {} WHERE id = $1", R::COLUMNS, R::TABLE);
        let row = sqlx::query_as::<_, R>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn find_or_fail(&self, id: i64) -> AdminResult<R> {
        self.find(id)
            .await?
            .ok_or_else(|| AdminError::not_found(R::ENTITY, id))
    }

    /// All rows whose `column` equals `value`
    pub async fn where_eq<V>(&self, column: &'static str, value: V) -> AdminResult<Vec<R>>
    where
        V: for<'q> Encode<'q, Postgres> + Type<Postgres> + Send + 'static,
    {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = $1 ORDER BY id",
            R::COLUMNS,
            R::TABLE,
            column
        );
        let rows = sqlx::query_as::<_, R>(&sql)
            .bind(value)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// First row whose `column` equals `value`
    pub async fn first_where<V>(&self, column: &'static str, value: V) -> AdminResult<Option<R>>
    where
        V: for<'q> Encode<'q, Postgres> + Type<Postgres> + Send + 'static,
    {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = $1 ORDER BY id LIMIT 1",
            R::COLUMNS,
            R::TABLE,
            column
        );
        let row = sqlx::query_as::<_, R>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn paginate(&self, page: Option<u32>, per_page: Option<u32>) -> AdminResult<Page<R>> {
        let (page, per_page, offset) = page_window(page, per_page);

        let sql = format!(
            "SELECT {} FROM {} ORDER BY id LIMIT $1 OFFSET $2",
            R::COLUMNS,
            R::TABLE
        );
        let items = sqlx::query_as::<_, R>(&sql)
            .bind(per_page as i64)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", R::TABLE))
            .fetch_one(&self.pool)
            .await?;

        Ok(Page {
            items,
            page,
            per_page,
            total,
        })
    }

    /// Insert a row from an attribute bag; non-fillable keys are ignored
    pub async fn create(&self, attributes: &Map<String, Value>) -> AdminResult<R> {
        let (columns, payload) = fillable_attributes::<R>(attributes)?;
        let columns = columns.join(", ");
        info!("Creating {} ({})", R::ENTITY, columns);

        let sql = format!(
            "INSERT INTO {table} ({columns}) \
             SELECT {columns} FROM jsonb_populate_record(NULL::{table}, $1) \
             RETURNING {returning}",
            table = R::TABLE,
            columns = columns,
            returning = R::COLUMNS,
        );

        let row = sqlx::query_as::<_, R>(&sql)
            .bind(payload)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    /// Update a row from an attribute bag; fails when the id is unknown
    pub async fn update(&self, id: i64, attributes: &Map<String, Value>) -> AdminResult<R> {
        let (columns, payload) = fillable_attributes::<R>(attributes)?;
        let columns = columns.join(", ");
        info!("Updating {} {} ({})", R::ENTITY, id, columns);

        let sql = format!(
            "UPDATE {table} SET ({columns}) = \
             (SELECT {columns} FROM jsonb_populate_record(NULL::{table}, $2)) \
             WHERE id = $1 RETURNING {returning}",
            table = R::TABLE,
            columns = columns,
            returning = R::COLUMNS,
        );

        sqlx::query_as::<_, R>(&sql)
            .bind(id)
            .bind(payload)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AdminError::not_found(R::ENTITY, id))
    }

    /// Delete a row, returning it; fails when the id is unknown
    pub async fn delete(&self, id: i64) -> AdminResult<R> {
        info!("Deleting {} {}", R::ENTITY, id);

        let sql = format!(
            "DELETE FROM {} WHERE id = $1 RETURNING {}",
            R::TABLE,
            R::COLUMNS
        );

        sqlx::query_as::<_, R>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AdminError::not_found(R::ENTITY, id))
    }

    /// Run `rules` against `data` using this repository's attribute names
    pub fn validate(&self, data: &Value, rules: RuleSet) -> AdminResult<()> {
        Validator::new(rules)
            .with_attribute_names(self.attribute_names.clone())
            .validate(data)
    }
}

impl<R: Sluggable> BaseRepository<R> {
    pub async fn find_by_slug(&self, slug: &str) -> AdminResult<R> {
        self.first_where(R::SLUG_COLUMN, slug.to_string())
            .await?
            .ok_or_else(|| AdminError::not_found(R::ENTITY, slug))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Town, User};
    use crate::validation::town_rules;
    use common::database::{DatabaseConfig, lazy_pool};
    use serde_json::json;

    #[test]
    fn test_page_window_defaults_and_clamps() {
        assert_eq!(page_window(None, None), (1, DEFAULT_PER_PAGE, 0));
        assert_eq!(page_window(Some(0), Some(0)), (1, 1, 0));
        assert_eq!(page_window(Some(3), Some(500)), (3, MAX_PER_PAGE, 200));
        assert_eq!(page_window(Some(2), Some(10)), (2, 10, 10));
    }

    #[test]
    fn test_fillable_attributes_drop_guarded_keys() {
        let attributes = json!({
            "name": "Anna",
            "password": "plaintext",
            "status": "1",
            "email": "anna@example.com",
        });

        let (columns, payload) =
            fillable_attributes::<User>(attributes.as_object().unwrap()).unwrap();

        assert_eq!(columns, vec!["name", "email"]);
        assert_eq!(payload, json!({ "name": "Anna", "email": "anna@example.com" }));
    }

    #[test]
    fn test_fillable_attributes_require_at_least_one_column() {
        let attributes = json!({ "id": 4 });
        let result = fillable_attributes::<Town>(attributes.as_object().unwrap());

        assert!(matches!(result, Err(AdminError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_validate_uses_attribute_names() {
        let pool = lazy_pool(&DatabaseConfig {
            database_url: "postgresql://nobody@127.0.0.1:1/void".to_string(),
            max_connections: 1,
            connection_timeout: 1,
        })
        .unwrap();
        let repository = BaseRepository::<Town>::new(pool).with_attribute_names(HashMap::from([(
            "townname".to_string(),
            "town name".to_string(),
        )]));

        match repository.validate(&json!({}), town_rules()) {
            Err(AdminError::Validation(errors)) => assert_eq!(
                errors.get("townname"),
                Some(&["The town name field is required.".to_string()][..])
            ),
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
