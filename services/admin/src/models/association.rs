//! Many-to-many user associations and their lookup tables

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::repositories::base::{Record, Sluggable};
use crate::sync::SyncStrategy;

/// Edge tables linking a user to other entities by id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Association {
    /// Translators the user has excluded
    Blacklist,
    /// Languages the user declares
    Languages,
    /// Towns the user works in
    Towns,
}

impl Association {
    pub fn table(self) -> &'static str {
        match self {
            Association::Blacklist => "users_blacklist",
            Association::Languages => "user_languages",
            Association::Towns => "user_towns",
        }
    }

    pub fn target_column(self) -> &'static str {
        match self {
            Association::Blacklist => "translator_id",
            Association::Languages => "lang_id",
            Association::Towns => "town_id",
        }
    }

    /// Reconciliation used when an upsert re-syncs this association.
    ///
    /// Towns are replaced wholesale while the other two only apply the delta.
    pub fn strategy(self) -> SyncStrategy {
        match self {
            Association::Blacklist | Association::Languages => SyncStrategy::ByDiff,
            Association::Towns => SyncStrategy::ByReplace,
        }
    }
}

/// Town entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Town {
    pub id: i64,
    pub townname: String,
}

impl Record for Town {
    const ENTITY: &'static str = "Town";
    const TABLE: &'static str = "towns";
    const COLUMNS: &'static str = "id, townname";
    const FILLABLE: &'static [&'static str] = &["townname"];
}

/// Language entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Language {
    pub id: i64,
    pub language: String,
    pub slug: String,
}

impl Record for Language {
    const ENTITY: &'static str = "Language";
    const TABLE: &'static str = "languages";
    const COLUMNS: &'static str = "id, language, slug";
    const FILLABLE: &'static [&'static str] = &["language", "slug"];
}

impl Sluggable for Language {
    const SLUG_COLUMN: &'static str = "slug";
}
