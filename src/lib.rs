pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod flash;
pub mod forms;
pub mod ranking;
pub mod routes;
pub mod store;
pub mod templates;
pub mod tmdb;

use std::{sync::Arc, time::Duration};

use axum::{Router, extract::FromRef, routing::get};
use axum_extra::extract::cookie::Key;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{config::Config, store::MovieStore, tmdb::TmdbClient};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: MovieStore,
    pub tmdb: Arc<TmdbClient>,
    pub cookie_key: Key,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

impl AppState {
    pub async fn from_config(config: Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("movielist/0.1")
            .timeout(Duration::from_secs(30))
            .build()?;

        let db = db::connect(&config.database_url).await?;

        let tmdb = TmdbClient::new(
            http,
            config.tmdb_api_key.clone(),
            config.tmdb_access_token.clone(),
            config.tmdb_base_url.clone(),
            config.tmdb_image_base_url.clone(),
            config.tmdb_rps,
        );

        Ok(Self {
            cookie_key: flash::cookie_key(&config.session_secret),
            config: Arc::new(config),
            store: MovieStore::new(db),
            tmdb: Arc::new(tmdb),
        })
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::home))
        .route("/add", get(routes::add_form).post(routes::add))
        .route("/select", get(routes::select))
        .route("/edit", get(routes::edit_form).post(routes::edit))
        .route("/delete", get(routes::delete))
        .with_state(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}
