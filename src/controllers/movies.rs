use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;

use crate::error::AppError;
use crate::models::Movie;
use crate::services::catalog::ShowListing;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/movies", get(list_movies))
        .route("/movies/{id}", get(get_movie))
        .route("/movies/{id}/shows", get(list_movie_shows))
}

#[derive(Debug, Deserialize)]
struct MoviesQuery {
    city: Option<String>,
}

// GET /api/movies?city=Bengaluru
async fn list_movies(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MoviesQuery>,
) -> Result<Json<Vec<Movie>>, AppError> {
    let movies = state.catalog.movies(params.city.as_deref()).await?;
    Ok(Json(movies))
}

// GET /api/movies/{id}
async fn get_movie(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<i64>,
) -> Result<Json<Movie>, AppError> {
    let movie = state.catalog.movie(movie_id).await?;
    Ok(Json(movie))
}

#[derive(Debug, Deserialize)]
struct MovieShowsQuery {
    city: Option<String>,
    date: Option<NaiveDate>,
}

// GET /api/movies/{id}/shows?city=&date=
async fn list_movie_shows(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<i64>,
    Query(params): Query<MovieShowsQuery>,
) -> Result<Json<Vec<ShowListing>>, AppError> {
    let shows = state
        .catalog
        .shows_for_movie(movie_id, params.city.as_deref(), params.date)
        .await?;
    Ok(Json(shows))
}
