use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Collection;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} {reason} from {endpoint}")]
    Status {
        endpoint: String,
        status: u16,
        reason: String,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON from {endpoint}: {source}")]
    Parse {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid endpoint '{endpoint}': {message}")]
    InvalidEndpoint { endpoint: String, message: String },

    #[error("no payload available for {collection}")]
    Unavailable { collection: Collection },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    Static,
    Documents,
}

impl Backend {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "static" | "json" | "file" => Some(Self::Static),
            "documents" | "document" | "store" | "firestore" => Some(Self::Documents),
            _ => None,
        }
    }
}

/// One document from a remote collection read.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    #[serde(default, alias = "data")]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// What a backend hands to the normalizer, tagged by backend. Only
/// `normalize` looks inside.
#[derive(Clone, Debug, PartialEq)]
pub enum RawPayload {
    Json(serde_json::Value),
    /// A document-store reply: `{"documents": [...]}` or a bare array of
    /// [`StoredDocument`]s.
    Documents(serde_json::Value),
}

/// Per-collection locations: file paths / URLs for the static backend,
/// collection paths for the document store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    pub projects: String,
    pub certificates: String,
}

impl Endpoints {
    pub fn static_defaults() -> Self {
        Self {
            projects: "json/projects.json".to_string(),
            certificates: "json/certificates.json".to_string(),
        }
    }

    pub fn document_defaults() -> Self {
        Self {
            projects: "projects".to_string(),
            certificates: "certificates".to_string(),
        }
    }

    pub fn get(&self, collection: Collection) -> &str {
        match collection {
            Collection::Projects => &self.projects,
            Collection::Certificates => &self.certificates,
        }
    }
}

#[async_trait]
pub trait DataSource: Send + Sync {
    /// Issues exactly one request for `collection`. Never retries or caches.
    async fn fetch(&self, collection: Collection) -> Result<RawPayload, FetchError>;

    fn describe(&self, collection: Collection) -> String;
}

fn is_remote(location: &str) -> bool {
    let lower = location.trim().to_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

async fn get_bytes(
    client: &reqwest::Client,
    url: &str,
    bearer: Option<&str>,
) -> Result<Vec<u8>, FetchError> {
    let mut request = client.get(url);
    if let Some(token) = bearer.filter(|t| !t.trim().is_empty()) {
        request = request.bearer_auth(token.trim());
    }
    let response = request.send().await.map_err(|e| FetchError::Transport {
        endpoint: url.to_string(),
        source: e,
    })?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            endpoint: url.to_string(),
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
        });
    }
    let body = response.bytes().await.map_err(|e| FetchError::Transport {
        endpoint: url.to_string(),
        source: e,
    })?;
    Ok(body.to_vec())
}

/// Where relative static endpoints are resolved from.
#[derive(Clone, Debug)]
pub enum StaticBase {
    Dir(PathBuf),
    Url(reqwest::Url),
}

impl StaticBase {
    pub fn parse(value: &str) -> Result<Self, FetchError> {
        if is_remote(value) {
            let mut url = reqwest::Url::parse(value.trim()).map_err(|e| {
                FetchError::InvalidEndpoint {
                    endpoint: value.to_string(),
                    message: e.to_string(),
                }
            })?;
            if !url.path().ends_with('/') {
                let path = format!("{}/", url.path());
                url.set_path(&path);
            }
            return Ok(Self::Url(url));
        }
        Ok(Self::Dir(crate::config::expand_tilde(value.trim())))
    }
}

enum Location {
    Remote(String),
    File(PathBuf),
}

/// Static JSON documents, either on disk or behind plain HTTP GETs.
#[derive(Clone, Debug)]
pub struct StaticJsonSource {
    client: reqwest::Client,
    endpoints: Endpoints,
    base: StaticBase,
}

impl StaticJsonSource {
    pub fn new(client: reqwest::Client, endpoints: Endpoints, base: StaticBase) -> Self {
        Self {
            client,
            endpoints,
            base,
        }
    }

    fn locate(&self, collection: Collection) -> Result<Location, FetchError> {
        let endpoint = self.endpoints.get(collection).trim();
        if is_remote(endpoint) {
            return Ok(Location::Remote(endpoint.to_string()));
        }
        match &self.base {
            StaticBase::Url(base) => base
                .join(endpoint)
                .map(|u| Location::Remote(u.to_string()))
                .map_err(|e| FetchError::InvalidEndpoint {
                    endpoint: endpoint.to_string(),
                    message: e.to_string(),
                }),
            StaticBase::Dir(dir) => {
                let path = Path::new(endpoint);
                if path.is_absolute() {
                    Ok(Location::File(path.to_path_buf()))
                } else {
                    Ok(Location::File(dir.join(path)))
                }
            }
        }
    }
}

#[async_trait]
impl DataSource for StaticJsonSource {
    async fn fetch(&self, collection: Collection) -> Result<RawPayload, FetchError> {
        let (endpoint, body) = match self.locate(collection)? {
            Location::Remote(url) => {
                let body = get_bytes(&self.client, &url, None).await?;
                (url, body)
            }
            Location::File(path) => {
                let display = path.display().to_string();
                let body = tokio::fs::read(&path).await.map_err(|e| FetchError::Io {
                    path: display.clone(),
                    source: e,
                })?;
                (display, body)
            }
        };
        let value = serde_json::from_slice(&body)
            .map_err(|e| FetchError::Parse { endpoint, source: e })?;
        Ok(RawPayload::Json(value))
    }

    fn describe(&self, collection: Collection) -> String {
        match self.locate(collection) {
            Ok(Location::Remote(url)) => url,
            Ok(Location::File(path)) => path.display().to_string(),
            Err(_) => self.endpoints.get(collection).to_string(),
        }
    }
}

/// Remote document collections read over HTTP: `GET {store_url}/{path}`.
#[derive(Clone, Debug)]
pub struct DocumentStoreSource {
    client: reqwest::Client,
    store_url: String,
    paths: Endpoints,
    token: Option<String>,
}

impl DocumentStoreSource {
    pub fn new(
        client: reqwest::Client,
        store_url: &str,
        paths: Endpoints,
        token: Option<String>,
    ) -> Self {
        Self {
            client,
            store_url: store_url.trim().trim_end_matches('/').to_string(),
            paths,
            token,
        }
    }

    fn url(&self, collection: Collection) -> String {
        format!(
            "{}/{}",
            self.store_url,
            self.paths.get(collection).trim().trim_start_matches('/')
        )
    }
}

#[async_trait]
impl DataSource for DocumentStoreSource {
    async fn fetch(&self, collection: Collection) -> Result<RawPayload, FetchError> {
        let url = self.url(collection);
        let body = get_bytes(&self.client, &url, self.token.as_deref()).await?;
        let value = serde_json::from_slice(&body).map_err(|e| FetchError::Parse {
            endpoint: url.clone(),
            source: e,
        })?;
        Ok(RawPayload::Documents(value))
    }

    fn describe(&self, collection: Collection) -> String {
        self.url(collection)
    }
}

/// Payloads held in memory, keyed by collection.
#[derive(Clone, Debug, Default)]
pub struct InlineSource {
    payloads: BTreeMap<Collection, serde_json::Value>,
}

impl InlineSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, collection: Collection, payload: serde_json::Value) -> Self {
        self.payloads.insert(collection, payload);
        self
    }
}

#[async_trait]
impl DataSource for InlineSource {
    async fn fetch(&self, collection: Collection) -> Result<RawPayload, FetchError> {
        self.payloads
            .get(&collection)
            .cloned()
            .map(RawPayload::Json)
            .ok_or(FetchError::Unavailable { collection })
    }

    fn describe(&self, collection: Collection) -> String {
        format!("inline:{collection}")
    }
}
