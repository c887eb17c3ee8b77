//! Read-only catalog queries the UI consumes. The engine treats movies,
//! theatres and shows as foreign references it never writes.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

use crate::database::Database;
use crate::error::AppError;
use crate::models::{Movie, Show, Theatre};

/// Legacy spellings mapped to the canonical city name. Resolved once here,
/// at the catalog boundary, never per call site.
const CITY_ALIASES: &[(&str, &str)] = &[
    ("Bangalore", "Bengaluru"),
    ("Bombay", "Mumbai"),
    ("Calcutta", "Kolkata"),
    ("Madras", "Chennai"),
];

pub fn normalize_city(city: &str) -> &str {
    CITY_ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(city))
        .map(|(_, canonical)| *canonical)
        .unwrap_or(city)
}

#[derive(Debug, Clone, Serialize)]
pub struct ShowDetails {
    #[serde(flatten)]
    pub show: Show,
    pub movie: Movie,
    pub theatre: Theatre,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ShowListing {
    pub id: i64,
    pub show_date: NaiveDate,
    pub show_time: chrono::NaiveTime,
    pub price: f64,
    pub theatre_id: i64,
    pub theatre_name: String,
    pub theatre_city: String,
    pub theatre_address: Option<String>,
}

#[derive(Clone)]
pub struct CatalogService {
    db: Database,
}

impl CatalogService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// All movies, or only those with at least one show in the given city.
    pub async fn movies(&self, city: Option<&str>) -> Result<Vec<Movie>, AppError> {
        let movies = match city {
            Some(city) => {
                sqlx::query_as::<_, Movie>(
                    r#"
                    SELECT DISTINCT m.*
                    FROM movies m
                    JOIN shows s ON s.movie_id = m.id
                    JOIN theatres t ON t.id = s.theatre_id
                    WHERE t.city = $1
                    ORDER BY m.title
                    "#,
                )
                .bind(normalize_city(city))
                .fetch_all(&self.db.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Movie>("SELECT * FROM movies ORDER BY title")
                    .fetch_all(&self.db.pool)
                    .await?
            }
        };
        Ok(movies)
    }

    pub async fn movie(&self, movie_id: i64) -> Result<Movie, AppError> {
        sqlx::query_as::<_, Movie>("SELECT * FROM movies WHERE id = $1")
            .bind(movie_id)
            .fetch_optional(&self.db.pool)
            .await?
            .ok_or(AppError::NotFound("movie"))
    }

    pub async fn show(&self, show_id: i64) -> Result<ShowDetails, AppError> {
        let show = sqlx::query_as::<_, Show>("SELECT * FROM shows WHERE id = $1")
            .bind(show_id)
            .fetch_optional(&self.db.pool)
            .await?
            .ok_or(AppError::NotFound("show"))?;

        let movie = self.movie(show.movie_id).await?;

        let theatre = sqlx::query_as::<_, Theatre>("SELECT * FROM theatres WHERE id = $1")
            .bind(show.theatre_id)
            .fetch_optional(&self.db.pool)
            .await?
            .ok_or(AppError::NotFound("theatre"))?;

        Ok(ShowDetails {
            show,
            movie,
            theatre,
        })
    }

    /// Shows for a movie, optionally narrowed to a city and a date, ordered
    /// by date then start time.
    pub async fn shows_for_movie(
        &self,
        movie_id: i64,
        city: Option<&str>,
        date: Option<NaiveDate>,
    ) -> Result<Vec<ShowListing>, AppError> {
        let listings = sqlx::query_as::<_, ShowListing>(
            r#"
            SELECT s.id, s.show_date, s.show_time, s.price,
                   t.id AS theatre_id, t.name AS theatre_name,
                   t.city AS theatre_city, t.address AS theatre_address
            FROM shows s
            JOIN theatres t ON t.id = s.theatre_id
            WHERE s.movie_id = $1
              AND ($2::text IS NULL OR t.city = $2)
              AND ($3::date IS NULL OR s.show_date = $3)
            ORDER BY s.show_date, s.show_time
            "#,
        )
        .bind(movie_id)
        .bind(city.map(normalize_city))
        .bind(date)
        .fetch_all(&self.db.pool)
        .await?;

        Ok(listings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_to_canonical_names() {
        assert_eq!(normalize_city("Bangalore"), "Bengaluru");
        assert_eq!(normalize_city("bangalore"), "Bengaluru");
        assert_eq!(normalize_city("Bombay"), "Mumbai");
    }

    #[test]
    fn canonical_and_unknown_names_pass_through() {
        assert_eq!(normalize_city("Bengaluru"), "Bengaluru");
        assert_eq!(normalize_city("Pune"), "Pune");
    }
}
