//! Movie search for the search tab.

use std::sync::Arc;

use tracing::{debug, warn};
use url::Url;

use crate::domain::ports::MovieCatalogue;
use crate::domain::{Error, Movie, SearchQuery};

/// Language requested from the catalogue unless configured otherwise.
pub const DEFAULT_CATALOGUE_LANGUAGE: &str = "pt-BR";
/// Base URL poster paths are appended to unless configured otherwise.
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Catalogue search with localisation and poster URL resolution.
#[derive(Clone)]
pub struct MovieSearchService<C> {
    catalogue: Arc<C>,
    language: String,
    image_base_url: String,
}

impl<C> MovieSearchService<C> {
    /// Create a service with the default language and image host.
    pub fn new(catalogue: Arc<C>) -> Self {
        Self {
            catalogue,
            language: DEFAULT_CATALOGUE_LANGUAGE.to_owned(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_owned(),
        }
    }

    /// Request results in `language`.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Resolve posters against `base`.
    #[must_use]
    pub fn with_image_base_url(mut self, base: impl Into<String>) -> Self {
        self.image_base_url = base.into();
        self
    }

    /// Full poster URL for `movie`, when it has a poster.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use client::domain::{Movie, MovieId, MovieSearchService};
    /// use client::domain::ports::FixtureMovieCatalogue;
    ///
    /// let service = MovieSearchService::new(Arc::new(FixtureMovieCatalogue::default()));
    /// let mut movie = Movie::new(MovieId::new(603), "Matrix");
    /// assert!(service.poster_url(&movie).is_none());
    ///
    /// movie.poster_path = Some("/poster.jpg".to_owned());
    /// assert_eq!(
    ///     service.poster_url(&movie).map(String::from).as_deref(),
    ///     Some("https://image.tmdb.org/t/p/w500/poster.jpg"),
    /// );
    /// ```
    pub fn poster_url(&self, movie: &Movie) -> Option<Url> {
        let path = movie.poster_path.as_deref()?;
        let base = self.image_base_url.trim_end_matches('/');
        let joined = if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        };
        Url::parse(&joined).ok()
    }
}

impl<C> MovieSearchService<C>
where
    C: MovieCatalogue,
{
    /// Search the catalogue; blank input yields no results without a request.
    pub async fn search(&self, raw_query: &str) -> Result<Vec<Movie>, Error> {
        let Ok(query) = SearchQuery::new(raw_query) else {
            return Ok(Vec::new());
        };

        let movies = self
            .catalogue
            .search(&query, &self.language)
            .await
            .map_err(|error| {
                warn!(query = query.as_str(), error = %error, "movie search failed");
                Error::service_unavailable("failed to search movies")
            })?;
        debug!(query = query.as_str(), results = movies.len(), "movie search finished");
        Ok(movies)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::MovieId;
    use crate::domain::ports::{MockMovieCatalogue, MovieCatalogueError};
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[tokio::test]
    async fn blank_query_skips_the_catalogue(#[case] raw: &str) {
        let mut catalogue = MockMovieCatalogue::new();
        catalogue.expect_search().never();

        let movies = MovieSearchService::new(Arc::new(catalogue))
            .search(raw)
            .await
            .expect("empty result");
        assert!(movies.is_empty());
    }

    #[tokio::test]
    async fn query_is_trimmed_and_localised() {
        let mut catalogue = MockMovieCatalogue::new();
        catalogue
            .expect_search()
            .withf(|query, language| query.as_str() == "matrix" && language == "en-US")
            .times(1)
            .return_once(|_, _| Ok(vec![Movie::new(MovieId::new(603), "The Matrix")]));

        let movies = MovieSearchService::new(Arc::new(catalogue))
            .with_language("en-US")
            .search("  matrix ")
            .await
            .expect("results");
        assert_eq!(movies.len(), 1);
    }

    #[tokio::test]
    async fn catalogue_failure_is_service_unavailable() {
        let mut catalogue = MockMovieCatalogue::new();
        catalogue
            .expect_search()
            .return_once(|_, _| Err(MovieCatalogueError::unavailable("timeout")));

        let error = MovieSearchService::new(Arc::new(catalogue))
            .search("matrix")
            .await
            .expect_err("failure");
        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
        assert_eq!(error.message(), "failed to search movies");
    }

    #[rstest]
    #[case("https://img.example.com/w185/", "/a.jpg", "https://img.example.com/w185/a.jpg")]
    #[case("https://img.example.com/w185", "a.jpg", "https://img.example.com/w185/a.jpg")]
    fn poster_url_joins_base_and_path(#[case] base: &str, #[case] path: &str, #[case] expected: &str) {
        let service = MovieSearchService::new(Arc::new(MockMovieCatalogue::new()))
            .with_image_base_url(base);
        let mut movie = Movie::new(MovieId::new(1), "Any");
        movie.poster_path = Some(path.to_owned());

        assert_eq!(service.poster_url(&movie).map(String::from).as_deref(), Some(expected));
    }
}
