//! Book (catalog entry) model and staged storage changes.

use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row};
use utoipa::ToSchema;

/// A catalog entry.
///
/// Equality compares all five fields. Missing text fields deserialize to
/// empty strings and a missing `id` to 0, which lets storage assign one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct Book {
    /// Primary key, assigned by storage when 0 on creation
    pub id: i32,
    pub title: String,
    pub author: String,
    pub published_year: i32,
    pub genre: String,
}

/// A stored book together with the version marker it was read at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedBook {
    pub book: Book,
    pub version: i64,
}

impl TrackedBook {
    /// Overwrite every field from `source`, keeping the read version
    pub fn overwrite_from(&mut self, source: &Book) {
        self.book = source.clone();
    }
}

impl<'r> FromRow<'r, SqliteRow> for TrackedBook {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            book: Book::from_row(row)?,
            version: row.try_get("version")?,
        })
    }
}

/// A change staged against the book store, applied on commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookChange {
    Add(Book),
    Update(TrackedBook),
    Remove(TrackedBook),
}
