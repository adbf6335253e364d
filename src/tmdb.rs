// src/tmdb.rs — blocking TMDB gateway. Every call here runs on a worker
// thread; the UI thread only ever sees the decoded results via mpsc.

use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::app::types::{Genre, Movie, MovieDetail, Video};
use crate::config::AppConfig;

/// Slice size for client-side pagination of search results and favorites.
pub const PAGE_SIZE: usize = 20;
/// Typeahead dropdown cap.
pub const SUGGESTION_CAP: usize = 6;

const HTTP_TIMEOUT: Duration = Duration::from_secs(20);

fn default_total_pages() -> u32 {
    1
}

/// Paginated listing body. A missing `results` decodes as an empty page
/// rather than an error.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PageResponse {
    #[serde(default)]
    pub results: Vec<Movie>,
    #[serde(default = "default_total_pages")]
    pub total_pages: u32,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct ListResponse {
    #[serde(default)]
    results: Vec<Movie>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct GenreListResponse {
    #[serde(default)]
    genres: Vec<Genre>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct VideosResponse {
    #[serde(default)]
    results: Vec<Video>,
}

#[derive(Clone)]
pub struct CatalogClient {
    http: Arc<Client>,
    api_key: String,
    base_url: String,
    image_base_url: String,
    language: String,
}

impl CatalogClient {
    pub fn new(cfg: &AppConfig) -> Result<Self, String> {
        let http = Client::builder()
            .user_agent(concat!("marquee/", env!("CARGO_PKG_VERSION")))
            .timeout(HTTP_TIMEOUT)
            .pool_max_idle_per_host(8)
            .build()
            .map_err(|e| format!("http client build failed: {e}"))?;

        Ok(Self {
            http: Arc::new(http),
            api_key: cfg.api_key.clone(),
            base_url: cfg.base_url.clone(),
            image_base_url: cfg.image_base_url.clone(),
            language: cfg.language.clone(),
        })
    }

    /// Full image URL for a relative poster/backdrop path.
    pub fn image_url(&self, path: &str) -> String {
        format!("{}{}", self.image_base_url, path)
    }

    fn url(&self, endpoint: &str, extra: &str) -> String {
        let mut url = format!(
            "{}{}?api_key={}&language={}",
            self.base_url, endpoint, self.api_key, self.language
        );
        if !extra.is_empty() {
            url.push('&');
            url.push_str(extra);
        }
        url
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, String> {
        let resp = self
            .http
            .get(url)
            .send()
            .map_err(|e| format!("request failed: {e}"))?;

        let status = resp.status();
        if !status.is_success() && status.as_u16() != 404 {
            return Err(format!("http {status}"));
        }
        // 404 bodies still decode (the detail endpoint answers
        // `{"success": false}` there).
        let body = resp.text().map_err(|e| format!("read body: {e}"))?;
        serde_json::from_str(&body).map_err(|e| format!("decode failed: {e}"))
    }

    pub fn popular(&self, page: u32) -> Result<PageResponse, String> {
        self.get_json(&self.url("/movie/popular", &format!("page={page}")))
    }

    pub fn search(&self, query: &str) -> Result<Vec<Movie>, String> {
        let extra = format!("query={}", urlencoding::encode(query));
        let body: ListResponse = self.get_json(&self.url("/search/movie", &extra))?;
        Ok(body.results)
    }

    /// Discover by genre. Comma-joined ids give server-side OR semantics:
    /// a movie matches when it carries any of the requested genres.
    pub fn discover_by_genres(&self, genre_ids: &[u64]) -> Result<Vec<Movie>, String> {
        let joined = genre_ids
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let body: ListResponse =
            self.get_json(&self.url("/discover/movie", &format!("with_genres={joined}")))?;
        Ok(body.results)
    }

    pub fn genre_list(&self) -> Result<Vec<Genre>, String> {
        let body: GenreListResponse = self.get_json(&self.url("/genre/movie/list", ""))?;
        Ok(body.genres)
    }

    pub fn movie_detail(&self, id: u64) -> Result<MovieDetail, String> {
        self.get_json(&self.url(&format!("/movie/{id}"), ""))
    }

    pub fn movie_videos(&self, id: u64) -> Result<Vec<Video>, String> {
        let body: VideosResponse = self.get_json(&self.url(&format!("/movie/{id}/videos"), ""))?;
        Ok(body.results)
    }
}

/// The playable trailer is the first YouTube-hosted video of type "Trailer".
pub fn pick_trailer(videos: &[Video]) -> Option<&Video> {
    videos
        .iter()
        .find(|v| v.site == "YouTube" && v.kind == "Trailer")
}

pub fn trailer_url(key: &str) -> String {
    format!("https://www.youtube.com/watch?v={key}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_results_decodes_as_empty_page() {
        let page: PageResponse = serde_json::from_str(r#"{"total_pages": 3}"#).unwrap();
        assert!(page.results.is_empty());
        assert_eq!(page.total_pages, 3);

        let page: PageResponse = serde_json::from_str("{}").unwrap();
        assert!(page.results.is_empty());
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn list_payload_decodes() {
        let body: ListResponse = serde_json::from_str(
            r#"{"results": [
                {"id": 1, "title": "A", "genre_ids": [28]},
                {"id": 2, "title": "B", "poster_path": "/b.jpg", "vote_average": 7.1}
            ]}"#,
        )
        .unwrap();
        assert_eq!(body.results.len(), 2);
        assert_eq!(body.results[0].genre_ids, vec![28]);
        assert_eq!(body.results[1].poster_path.as_deref(), Some("/b.jpg"));
    }

    #[test]
    fn trailer_is_first_youtube_trailer() {
        let videos: VideosResponse = serde_json::from_str(
            r#"{"results": [
                {"site": "Vimeo", "type": "Trailer", "key": "v1"},
                {"site": "YouTube", "type": "Featurette", "key": "v2"},
                {"site": "YouTube", "type": "Trailer", "key": "v3"},
                {"site": "YouTube", "type": "Trailer", "key": "v4"}
            ]}"#,
        )
        .unwrap();
        let trailer = pick_trailer(&videos.results).unwrap();
        assert_eq!(trailer.key, "v3");
    }

    #[test]
    fn no_trailer_when_nothing_matches() {
        let videos: VideosResponse = serde_json::from_str(r#"{"results": []}"#).unwrap();
        assert!(pick_trailer(&videos.results).is_none());
    }
}
