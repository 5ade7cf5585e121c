//! Driven port for the public movie catalogue.
//!
//! The catalogue is an unauthenticated search API. Only the contract lives
//! here; the fixture keeps search flows usable offline and in tests.

use async_trait::async_trait;

use crate::domain::{Movie, MovieId, SearchQuery};

use super::define_port_error;

define_port_error! {
    /// Errors raised by catalogue adapters.
    pub enum MovieCatalogueError {
        /// The catalogue could not be reached.
        Unavailable { message: String } => "movie catalogue unavailable: {message}",
        /// The catalogue answered with an unreadable payload.
        Decode { message: String } => "movie catalogue response invalid: {message}",
    }
}

/// Movie search.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MovieCatalogue: Send + Sync {
    /// Search titles matching `query`, localised to `language` (BCP 47).
    async fn search(
        &self,
        query: &SearchQuery,
        language: &str,
    ) -> Result<Vec<Movie>, MovieCatalogueError>;
}

/// Offline catalogue answering case-insensitive title substring matches.
#[derive(Debug, Clone)]
pub struct FixtureMovieCatalogue {
    movies: Vec<Movie>,
}

impl FixtureMovieCatalogue {
    /// Catalogue serving the given entries.
    pub fn new(movies: Vec<Movie>) -> Self {
        Self { movies }
    }
}

impl Default for FixtureMovieCatalogue {
    fn default() -> Self {
        let mut matrix = Movie::new(MovieId::new(603), "Matrix");
        matrix.poster_path = Some("/f89U3ADr1oiB1s9GkdPOEpXUk5H.jpg".to_owned());
        matrix.release_date = Some("1999-03-31".to_owned());
        matrix.vote_average = 8.2;
        matrix.vote_count = 26_000;
        matrix.overview = "Um hacker descobre a verdade sobre a sua realidade.".to_owned();

        let mut city = Movie::new(MovieId::new(598), "Cidade de Deus");
        city.poster_path = Some("/k7eYdWvhYQyRQoU2TB2A2Xu2TfD.jpg".to_owned());
        city.release_date = Some("2002-02-05".to_owned());
        city.vote_average = 8.4;
        city.vote_count = 7_500;

        let mut central = Movie::new(MovieId::new(666), "Central do Brasil");
        central.release_date = Some("1998-04-03".to_owned());
        central.vote_average = 7.9;
        central.vote_count = 900;

        Self::new(vec![matrix, city, central])
    }
}

#[async_trait]
impl MovieCatalogue for FixtureMovieCatalogue {
    async fn search(
        &self,
        query: &SearchQuery,
        _language: &str,
    ) -> Result<Vec<Movie>, MovieCatalogueError> {
        let needle = query.as_ref().to_lowercase();
        Ok(self
            .movies
            .iter()
            .filter(|movie| movie.title.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}
