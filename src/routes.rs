use axum::{
    extract::{Form, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::SignedCookieJar;
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    AppState,
    error::{AppError, AppResult},
    flash,
    forms::{AddMovieForm, FieldErrors, RatingForm},
    store::StoreError,
    templates,
};

/// Local record id. Kept as a string so a missing or garbled value ends in
/// the HTML not-found page instead of an extractor rejection.
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    id: Option<String>,
}

impl IdQuery {
    fn movie_id(&self) -> AppResult<i32> {
        let raw = self.id.as_deref().unwrap_or_default();
        raw.trim().parse().map_err(|_| AppError::BadId(raw.to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct SelectQuery {
    id: Option<String>,
}

pub async fn home(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> AppResult<(SignedCookieJar, Html<String>)> {
    let (jar, notice) = flash::take(jar);
    let movies = state.store.list_all().await?;
    Ok((jar, Html(templates::home_page(&movies, notice.as_deref()))))
}

pub async fn add_form() -> Html<String> {
    Html(templates::add_page("", &FieldErrors::default()))
}

pub async fn add(
    State(state): State<AppState>,
    Form(form): Form<AddMovieForm>,
) -> AppResult<Response> {
    let title = match form.validate() {
        Ok(title) => title,
        Err(errors) => {
            let body = templates::add_page(&form.title, &errors);
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(body)).into_response());
        },
    };

    let candidates = state.tmdb.search(&title).await?;
    info!(query = %title, hits = candidates.len(), "searched movie database");
    Ok(Html(templates::select_page(&title, &candidates)).into_response())
}

/// Without a usable external id there is nothing to add, so the user is sent
/// back to the search form.
pub async fn select(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Query(q): Query<SelectQuery>,
) -> AppResult<Response> {
    let Some(tmdb_id) = q.id.as_deref().and_then(|id| id.trim().parse::<i64>().ok()) else {
        return Ok(Redirect::to("/add").into_response());
    };

    let detail = state.tmdb.fetch_detail(tmdb_id).await?;
    let new_movie = state.tmdb.new_movie(detail)?;
    let title = new_movie.title.clone();

    match state.store.insert(new_movie).await {
        Ok(id) => {
            info!(movie_id = id, tmdb_id, title = %title, "added movie");
            let jar = flash::set(jar, &format!("Added \"{title}\". Give it a rating."));
            Ok((jar, Redirect::to(&format!("/edit?id={id}"))).into_response())
        },
        Err(err @ StoreError::Conflict(_)) => {
            warn!(tmdb_id, error = %err, "duplicate movie");
            let jar = flash::set(jar, &err.to_string());
            Ok((jar, Redirect::to("/")).into_response())
        },
        Err(err) => Err(err.into()),
    }
}

pub async fn edit_form(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Query(q): Query<IdQuery>,
) -> AppResult<(SignedCookieJar, Html<String>)> {
    let movie = state.store.get_by_id(q.movie_id()?).await?;
    let (jar, notice) = flash::take(jar);
    let form = RatingForm {
        rating: movie.rating.map(|r| r.to_string()).unwrap_or_default(),
        review: movie.review.clone().unwrap_or_default(),
    };
    let body = templates::edit_page(&movie, &form, &FieldErrors::default(), notice.as_deref());
    Ok((jar, Html(body)))
}

pub async fn edit(
    State(state): State<AppState>,
    Query(q): Query<IdQuery>,
    Form(form): Form<RatingForm>,
) -> AppResult<Response> {
    let movie = state.store.get_by_id(q.movie_id()?).await?;

    match form.validate() {
        Ok(update) => {
            state.store.update(movie.id, update.rating, &update.review).await?;
            info!(movie_id = movie.id, rating = update.rating, "rated movie");
            Ok(Redirect::to("/").into_response())
        },
        Err(errors) => {
            let body = templates::edit_page(&movie, &form, &errors, None);
            Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(body)).into_response())
        },
    }
}

pub async fn delete(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Query(q): Query<IdQuery>,
) -> AppResult<(SignedCookieJar, Redirect)> {
    let movie = state.store.get_by_id(q.movie_id()?).await?;
    state.store.delete(movie.id).await?;
    info!(movie_id = movie.id, title = %movie.title, "deleted movie");

    let jar = flash::set(jar, &format!("Removed \"{}\".", movie.title));
    Ok((jar, Redirect::to("/")))
}
