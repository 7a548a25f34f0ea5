use std::{num::NonZeroU32, sync::Arc};

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use serde::Deserialize;
use tracing::debug;

use crate::store::NewMovie;

#[derive(Debug, thiserror::Error)]
pub enum TmdbError {
    #[error("movie database request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("movie database returned an unusable response: {0}")]
    Malformed(String),

    #[error("movie {0} was not found in the movie database")]
    UnknownMovie(i64),
}

/// One search hit, as listed on the selection page.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct MovieCandidate {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct MovieDetail {
    pub original_title: String,
    pub overview: String,
    pub release_date: String,
    pub poster_path: Option<String>,
}

impl MovieDetail {
    /// Unreleased films come back with an empty `release_date`; they have no
    /// year yet.
    pub fn year(&self) -> Result<Option<i32>, TmdbError> {
        let raw = self.release_date.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        let date: jiff::civil::Date = raw.parse().map_err(|_| {
            TmdbError::Malformed(format!("release_date {:?} is not a date", self.release_date))
        })?;
        Ok(Some(i32::from(date.year())))
    }
}

pub struct TmdbClient {
    client: reqwest::Client,
    api_key: String,
    access_token: String,
    base_url: String,
    image_base_url: String,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl TmdbClient {
    pub fn new(
        client: reqwest::Client,
        api_key: String,
        access_token: String,
        base_url: String,
        image_base_url: String,
        rps: u32,
    ) -> Self {
        if api_key.trim().is_empty() && access_token.trim().is_empty() {
            tracing::warn!("Using mock TMDB data - no TMDB_API_KEY or TMDB_ACCESS_TOKEN provided");
        }

        let rps = NonZeroU32::new(rps).unwrap_or(NonZeroU32::MIN);
        let limiter = Arc::new(RateLimiter::direct(Quota::per_second(rps)));
        Self { client, api_key, access_token, base_url, image_base_url, limiter }
    }

    fn is_mock(&self) -> bool {
        self.api_key.trim().is_empty() && self.access_token.trim().is_empty()
    }

    /// Title search. Request failures are returned to the caller, never retried.
    pub async fn search(&self, query: &str) -> Result<Vec<MovieCandidate>, TmdbError> {
        if self.is_mock() {
            return Ok(mock::search(query));
        }

        self.limiter.until_ready().await;

        let url = format!("{}/search/movie", self.base_url.trim_end_matches('/'));
        let mut req = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[("query", query)]);
        req = if self.access_token.trim().is_empty() {
            req.query(&[("api_key", &self.api_key)])
        } else {
            req.bearer_auth(&self.access_token)
        };

        let resp: SearchResponse = req.send().await?.error_for_status()?.json().await?;
        debug!(query, hits = resp.results.len(), "tmdb search");
        Ok(resp.results)
    }

    pub async fn fetch_detail(&self, tmdb_id: i64) -> Result<MovieDetail, TmdbError> {
        if self.is_mock() {
            return mock::detail(tmdb_id).ok_or(TmdbError::UnknownMovie(tmdb_id));
        }

        self.limiter.until_ready().await;

        let url = format!("{}/movie/{}", self.base_url.trim_end_matches('/'), tmdb_id);
        let mut req = self.client.get(url).query(&[("language", "en-US")]);
        req = if self.api_key.trim().is_empty() {
            req.bearer_auth(&self.access_token)
        } else {
            req.query(&[("api_key", &self.api_key)])
        };

        let detail: MovieDetail = req.send().await?.error_for_status()?.json().await?;
        debug!(tmdb_id, title = %detail.original_title, "tmdb detail");
        Ok(detail)
    }

    pub fn image_url(&self, poster_path: Option<&str>) -> String {
        match poster_path {
            Some(path) if !path.is_empty() => {
                format!("{}/{}", self.image_base_url.trim_end_matches('/'), path.trim_start_matches('/'))
            },
            _ => String::new(),
        }
    }

    /// Turns a detail response into the record that gets stored.
    pub fn new_movie(&self, detail: MovieDetail) -> Result<NewMovie, TmdbError> {
        let title = detail.original_title.trim().to_string();
        if title.is_empty() {
            return Err(TmdbError::Malformed("original_title is empty".to_string()));
        }
        Ok(NewMovie {
            year: detail.year()?,
            image_url: self.image_url(detail.poster_path.as_deref()),
            title,
            description: detail.overview,
        })
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<MovieCandidate>,
}

/// Canned catalogue served when no credentials are configured.
mod mock {
    use super::{MovieCandidate, MovieDetail};

    struct MockMovie {
        id: i64,
        title: &'static str,
        release_date: &'static str,
        overview: &'static str,
        poster_path: &'static str,
    }

    const MOVIES: &[MockMovie] = &[
        MockMovie {
            id: 27205,
            title: "Inception",
            release_date: "2010-07-15",
            overview: "Cobb, a skilled thief who commits corporate espionage by infiltrating \
                       the subconscious of his targets, is offered a chance to regain his old \
                       life as payment for a task considered to be impossible.",
            poster_path: "/oYuLEt3zVCKq57qu2F8dT7NIa6f.jpg",
        },
        MockMovie {
            id: 550,
            title: "Fight Club",
            release_date: "1999-10-15",
            overview: "A ticking-time-bomb insomniac and a slippery soap salesman channel \
                       primal male aggression into a shocking new form of therapy.",
            poster_path: "/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg",
        },
        MockMovie {
            id: 603,
            title: "The Matrix",
            release_date: "1999-03-30",
            overview: "Set in the 22nd century, The Matrix tells the story of a computer \
                       hacker who joins a group of underground insurgents fighting the vast \
                       and powerful computers who now rule the earth.",
            poster_path: "/f89U3ADr1oiB1s9GkdPOEpXUk5H.jpg",
        },
    ];

    pub fn search(query: &str) -> Vec<MovieCandidate> {
        let needle = query.trim().to_lowercase();
        MOVIES
            .iter()
            .filter(|m| m.title.to_lowercase().contains(&needle))
            .map(|m| MovieCandidate {
                id: m.id,
                title: m.title.to_string(),
                poster_path: Some(m.poster_path.to_string()),
                release_date: Some(m.release_date.to_string()),
            })
            .collect()
    }

    pub fn detail(id: i64) -> Option<MovieDetail> {
        MOVIES.iter().find(|m| m.id == id).map(|m| MovieDetail {
            original_title: m.title.to_string(),
            overview: m.overview.to_string(),
            release_date: m.release_date.to_string(),
            poster_path: Some(m.poster_path.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_client() -> TmdbClient {
        TmdbClient::new(
            reqwest::Client::new(),
            String::new(),
            String::new(),
            "https://api.themoviedb.org/3".to_string(),
            "https://image.tmdb.org/t/p/w500/".to_string(),
            4,
        )
    }

    #[tokio::test]
    async fn mock_search_matches_case_insensitively() {
        let client = offline_client();
        let hits = client.search("inception").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 27205);
        assert!(client.search("no such film").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn mock_detail_unknown_id() {
        let client = offline_client();
        assert!(matches!(client.fetch_detail(1).await, Err(TmdbError::UnknownMovie(1))));
    }

    #[tokio::test]
    async fn detail_becomes_new_movie() {
        let client = offline_client();
        let detail = client.fetch_detail(27205).await.unwrap();
        let movie = client.new_movie(detail).unwrap();
        assert_eq!(movie.title, "Inception");
        assert_eq!(movie.year, Some(2010));
        assert_eq!(movie.image_url, "https://image.tmdb.org/t/p/w500/oYuLEt3zVCKq57qu2F8dT7NIa6f.jpg");
    }

    #[test]
    fn search_payload_tolerates_missing_optional_fields() {
        let body = r#"{"page":1,"results":[
            {"id":27205,"title":"Inception","poster_path":null,"release_date":"2010-07-15"},
            {"id":1,"title":"Inception: The Cobol Job"}
        ],"total_results":2}"#;
        let resp: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.results.len(), 2);
        assert_eq!(resp.results[0].poster_path, None);
        assert_eq!(resp.results[1].release_date, None);
    }

    #[test]
    fn detail_with_missing_field_fails_to_decode() {
        let body = r#"{"original_title":"Inception","overview":"Dreams"}"#;
        assert!(serde_json::from_str::<MovieDetail>(body).is_err());
    }

    fn detail_released(release_date: &str) -> MovieDetail {
        MovieDetail {
            original_title: "Unreleased".to_string(),
            overview: String::new(),
            release_date: release_date.to_string(),
            poster_path: None,
        }
    }

    #[test]
    fn blank_release_date_has_no_year() {
        assert_eq!(detail_released("").year().unwrap(), None);
        assert_eq!(detail_released("  ").year().unwrap(), None);

        let movie = offline_client().new_movie(detail_released("")).unwrap();
        assert_eq!(movie.year, None);
    }

    #[test]
    fn garbage_release_date_is_malformed() {
        assert!(matches!(detail_released("soon").year(), Err(TmdbError::Malformed(_))));
    }

    #[test]
    fn missing_poster_gives_empty_image_url() {
        let client = offline_client();
        assert_eq!(client.image_url(None), "");
        assert_eq!(client.image_url(Some("")), "");
    }
}
