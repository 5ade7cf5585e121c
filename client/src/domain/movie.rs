//! Movie catalogue entries and personal ratings.
//!
//! Catalogue payloads use the upstream movie database's snake_case keys. A
//! saved movie is the catalogue entry plus the user's `userRating`, stored
//! under `users/<uid>/watched_movies/<movie id>`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation errors for movie values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovieValidationError {
    /// Rating outside `RATING_MIN..=RATING_MAX`.
    RatingOutOfRange {
        /// Rejected value.
        value: u8,
    },
    /// Search text was blank once trimmed.
    EmptyQuery,
}

impl fmt::Display for MovieValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RatingOutOfRange { value } => write!(
                f,
                "rating must be between {RATING_MIN} and {RATING_MAX}, got {value}"
            ),
            Self::EmptyQuery => write!(f, "search query must not be empty"),
        }
    }
}

impl std::error::Error for MovieValidationError {}

/// Catalogue identifier of a movie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(u64);

impl MovieId {
    /// Wrap a catalogue identifier.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw catalogue identifier.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lowest accepted rating.
pub const RATING_MIN: u8 = 1;
/// Highest accepted rating.
pub const RATING_MAX: u8 = 10;

/// Personal rating on a one-to-ten scale.
///
/// # Examples
/// ```
/// use client::domain::Rating;
///
/// assert_eq!(Rating::new(7).expect("in range").get(), 7);
/// assert!(Rating::new(0).is_err());
/// assert!(Rating::new(11).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Validate a rating.
    pub fn new(value: u8) -> Result<Self, MovieValidationError> {
        if (RATING_MIN..=RATING_MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(MovieValidationError::RatingOutOfRange { value })
        }
    }

    /// Numeric value.
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = MovieValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(value: Rating) -> Self {
        value.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{RATING_MAX}", self.0)
    }
}

/// Catalogue entry as returned by a movie search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    /// Catalogue identifier.
    pub id: MovieId,
    /// Localised title.
    pub title: String,
    /// Relative poster path, joined with the image base URL for display.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Release date as reported by the catalogue (`YYYY-MM-DD`).
    #[serde(default)]
    pub release_date: Option<String>,
    /// Community average on a ten-point scale.
    #[serde(default)]
    pub vote_average: f64,
    /// Number of community votes.
    #[serde(default)]
    pub vote_count: u64,
    /// Localised synopsis.
    #[serde(default)]
    pub overview: String,
}

impl Movie {
    /// Build a catalogue entry with only an id and title.
    pub fn new(id: MovieId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            poster_path: None,
            release_date: None,
            vote_average: 0.0,
            vote_count: 0,
            overview: String::new(),
        }
    }
}

/// Movie stored in the user's watched list together with their rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedMovie {
    /// Snapshot of the catalogue entry at save time.
    #[serde(flatten)]
    pub movie: Movie,
    /// Rating given when saving.
    #[serde(rename = "userRating")]
    pub user_rating: Rating,
}

/// Whether a movie is on the user's list, and with which rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SavedMovieStatus {
    /// The movie is on the list.
    pub saved: bool,
    /// Stored rating; `None` when not saved.
    pub rating: Option<Rating>,
}

impl SavedMovieStatus {
    /// Status of a movie that is not on the list.
    pub const fn not_saved() -> Self {
        Self {
            saved: false,
            rating: None,
        }
    }

    /// Status of a saved movie.
    pub const fn saved(rating: Rating) -> Self {
        Self {
            saved: true,
            rating: Some(rating),
        }
    }
}

/// Trimmed, non-empty search text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    /// Validate raw search box input.
    pub fn new(raw: &str) -> Result<Self, MovieValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(MovieValidationError::EmptyQuery);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Query text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for SearchQuery {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<SearchQuery> for String {
    fn from(value: SearchQuery) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(0, false)]
    #[case(1, true)]
    #[case(10, true)]
    #[case(11, false)]
    fn rating_bounds(#[case] value: u8, #[case] valid: bool) {
        assert_eq!(Rating::new(value).is_ok(), valid);
    }

    #[rstest]
    fn rating_displays_out_of_ten() {
        assert_eq!(Rating::new(8).expect("rating").to_string(), "8/10");
    }

    #[rstest]
    fn search_payload_decodes_with_missing_optional_fields() {
        let movie: Movie = serde_json::from_value(json!({
            "id": 603,
            "title": "Matrix",
            "poster_path": null,
            "vote_average": 8.2,
        }))
        .expect("decode movie");

        assert_eq!(movie.id, MovieId::new(603));
        assert!(movie.poster_path.is_none());
        assert!(movie.release_date.is_none());
        assert_eq!(movie.vote_count, 0);
    }

    #[rstest]
    fn saved_movie_flattens_catalogue_fields() {
        let mut movie = Movie::new(MovieId::new(603), "Matrix");
        movie.release_date = Some("1999-03-31".to_owned());
        let saved = SavedMovie {
            movie,
            user_rating: Rating::new(9).expect("rating"),
        };

        let value = serde_json::to_value(&saved).expect("encode");
        assert_eq!(value["id"], json!(603));
        assert_eq!(value["release_date"], json!("1999-03-31"));
        assert_eq!(value["userRating"], json!(9));
    }

    #[rstest]
    fn saved_movie_rejects_out_of_range_rating() {
        let result: Result<SavedMovie, _> = serde_json::from_value(json!({
            "id": 1,
            "title": "Zero",
            "userRating": 0,
        }));
        assert!(result.is_err());
    }

    #[rstest]
    #[case("  matrix ", Some("matrix"))]
    #[case("   ", None)]
    #[case("", None)]
    fn search_query_trims_input(#[case] raw: &str, #[case] expected: Option<&str>) {
        let query: Option<String> = SearchQuery::new(raw).ok().map(String::from);
        assert_eq!(query.as_deref(), expected);
    }
}
