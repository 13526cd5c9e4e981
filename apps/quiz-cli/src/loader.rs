//! Loading quiz pages and deck fragments over HTTP or from disk.

use std::path::{Path, PathBuf};

use quiz_core::{FetchError, FragmentLoader};
use reqwest::header::CACHE_CONTROL;
use reqwest::{Client, Url};

/// Where a page or fragment lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Remote(Url),
    Local(PathBuf),
}

impl Location {
    /// `http(s)://` and `file://` URLs are taken as URLs, anything else as a path.
    pub fn parse(arg: &str) -> Self {
        match Url::parse(arg) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Self::Remote(url),
            Ok(url) if url.scheme() == "file" => match url.to_file_path() {
                Ok(path) => Self::Local(path),
                Err(()) => Self::Local(PathBuf::from(arg)),
            },
            _ => Self::Local(PathBuf::from(arg)),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote(url) => write!(f, "{url}"),
            Self::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Loads the page and its `data-src` fragments, never from cache.
pub struct FragmentFetcher {
    client: Client,
    page: Location,
    base_url: Option<Url>,
}

impl FragmentFetcher {
    pub fn new(page: Location, base_url: Option<Url>) -> Self {
        Self {
            client: Client::new(),
            page,
            base_url,
        }
    }

    pub fn page(&self) -> &Location {
        &self.page
    }

    /// Fetch the page document itself.
    pub async fn load_page(&self) -> Result<String, FetchError> {
        self.fetch(&self.page).await
    }

    /// Resolve a `data-src` entry against the page (or the configured base URL).
    pub fn resolve(&self, src: &str) -> Result<Location, FetchError> {
        let absolute = Location::parse(src);
        if matches!(absolute, Location::Remote(_)) {
            return Ok(absolute);
        }

        let join = |base: &Url| {
            base.join(src).map_err(|e| FetchError::InvalidUrl {
                url: src.to_string(),
                message: e.to_string(),
            })
        };

        match (&self.page, &self.base_url) {
            (Location::Remote(page), _) => join(page).map(Location::Remote),
            (Location::Local(_), Some(base)) => join(base).map(Location::Remote),
            (Location::Local(page), None) => Ok(Location::Local(relative_to(page, src))),
        }
    }

    async fn fetch(&self, location: &Location) -> Result<String, FetchError> {
        match location {
            Location::Remote(url) => self.get(url).await,
            Location::Local(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|source| FetchError::Io {
                    path: path.display().to_string(),
                    source,
                }),
        }
    }

    async fn get(&self, url: &Url) -> Result<String, FetchError> {
        let network = |e: reqwest::Error| FetchError::Network {
            url: url.to_string(),
            message: e.to_string(),
        };

        let resp = self
            .client
            .get(url.clone())
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(network)?;

        if !resp.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: resp.status().as_u16(),
            });
        }

        resp.text().await.map_err(network)
    }
}

impl FragmentLoader for FragmentFetcher {
    async fn load(&self, url: &str) -> Result<String, FetchError> {
        let location = self.resolve(url)?;
        tracing::debug!(%location, "loading quiz fragment");
        self.fetch(&location).await
    }
}

/// Path of `src` next to the page file.
fn relative_to(page: &Path, src: &str) -> PathBuf {
    let src = Path::new(src);
    if src.is_absolute() {
        return src.to_path_buf();
    }
    page.parent().unwrap_or_else(|| Path::new("")).join(src)
}
