//! Domain types shared by the sync pipeline and the query tool

use crate::error::FideError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One player entry from the ratings feed
///
/// The feed encodes "no rating" as `0`, so every rating and game count is
/// required. Only `title` and `birthday` are optional; an absent value is
/// `None`, never an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: String,
    pub name: String,
    pub country: String,
    pub sex: String,
    pub title: Option<String>,
    pub rating: i64,
    pub games_played: i64,
    pub rapid_rating: i64,
    pub rapid_games: i64,
    pub blitz_rating: i64,
    pub blitz_games: i64,
    /// Kept verbatim; the feed mixes years and full dates
    pub birthday: Option<String>,
}

impl PlayerRecord {
    /// Project a single field out of the record
    pub fn value(&self, field: Field) -> FieldValue {
        match field {
            Field::Id => FieldValue::Text(self.id.clone()),
            Field::Name => FieldValue::Text(self.name.clone()),
            Field::Country => FieldValue::Text(self.country.clone()),
            Field::Sex => FieldValue::Text(self.sex.clone()),
            Field::Title => FieldValue::from(self.title.clone()),
            Field::Rating => FieldValue::Integer(self.rating),
            Field::GamesPlayed => FieldValue::Integer(self.games_played),
            Field::RapidRating => FieldValue::Integer(self.rapid_rating),
            Field::RapidGames => FieldValue::Integer(self.rapid_games),
            Field::BlitzRating => FieldValue::Integer(self.blitz_rating),
            Field::BlitzGames => FieldValue::Integer(self.blitz_games),
            Field::Birthday => FieldValue::from(self.birthday.clone()),
        }
    }

    /// Project the record onto an ordered field list
    pub fn project(&self, fields: &[Field]) -> Vec<FieldValue> {
        fields.iter().map(|field| self.value(*field)).collect()
    }
}

// ============================================================================
// Field Whitelist
// ============================================================================

/// The closed set of columns that may be projected
///
/// Field names coming from user input are only ever turned into SQL through
/// [`Field::column`], which returns a static identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Id,
    Name,
    Country,
    Sex,
    Title,
    Rating,
    GamesPlayed,
    RapidRating,
    RapidGames,
    BlitzRating,
    BlitzGames,
    Birthday,
}

impl Field {
    /// Every field, in table column order
    pub const ALL: [Field; 12] = [
        Field::Id,
        Field::Name,
        Field::Country,
        Field::Sex,
        Field::Title,
        Field::Rating,
        Field::GamesPlayed,
        Field::RapidRating,
        Field::RapidGames,
        Field::BlitzRating,
        Field::BlitzGames,
        Field::Birthday,
    ];

    /// Fields used by the query tool when none are requested
    pub const DEFAULT_PROJECTION: [Field; 4] =
        [Field::Id, Field::Name, Field::Country, Field::Rating];

    /// Column name in the dataset table
    pub fn column(self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Name => "name",
            Field::Country => "country",
            Field::Sex => "sex",
            Field::Title => "title",
            Field::Rating => "rating",
            Field::GamesPlayed => "games_played",
            Field::RapidRating => "rapid_rating",
            Field::RapidGames => "rapid_games",
            Field::BlitzRating => "blitz_rating",
            Field::BlitzGames => "blitz_games",
            Field::Birthday => "birthday",
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Field::Rating
                | Field::GamesPlayed
                | Field::RapidRating
                | Field::RapidGames
                | Field::BlitzRating
                | Field::BlitzGames
        )
    }

    /// Comma-separated list of every allowed name, for error messages
    pub fn allowed_names() -> String {
        Field::ALL
            .iter()
            .map(|field| field.column())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Field {
    type Err = FideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Field::ALL
            .iter()
            .copied()
            .find(|field| field.column() == name)
            .ok_or_else(|| FideError::InvalidField {
                name: name.to_string(),
                allowed: Field::allowed_names(),
            })
    }
}

// ============================================================================
// Projected Values
// ============================================================================

/// A single projected cell
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Integer(i64),
    Text(String),
}

impl FieldValue {
    /// Render for a delimited file: NULL becomes an empty cell
    pub fn to_csv_cell(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Integer(n) => n.to_string(),
            FieldValue::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => f.write_str("NULL"),
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(FieldValue::Null, FieldValue::Text)
    }
}

/// One result row, cells in requested field order
pub type ProjectedRow = Vec<FieldValue>;
