use std::cell::RefCell;
use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::filter::{derive_buttons, Arranger, ClassFilterLayout, FilterController};
use crate::model::Collection;
use crate::normalize::{self, SchemaError};
use crate::page::{Document, Selectors};
use crate::render::{CardRenderer, RenderError, RenderOptions};
use crate::report::ErrorReporter;
use crate::source::{
    DataSource, DocumentStoreSource, Endpoints, FetchError, StaticBase, StaticJsonSource,
};

#[derive(Clone, Debug)]
pub enum SourceConfig {
    Static {
        base: String,
        endpoints: Endpoints,
    },
    Documents {
        store_url: String,
        paths: Endpoints,
        token: Option<String>,
    },
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::Static {
            base: ".".to_string(),
            endpoints: Endpoints::static_defaults(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct HttpOptions {
    pub timeout_seconds: usize,
    pub proxy: Option<String>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 10,
            proxy: None,
        }
    }
}

/// Everything a load needs, fixed at startup.
#[derive(Clone, Debug, Default)]
pub struct PortfolioConfig {
    pub source: SourceConfig,
    pub http: HttpOptions,
    pub selectors: Selectors,
    pub render: RenderOptions,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("selector for {name} is empty")]
    EmptySelector { name: &'static str },

    #[error("document store backend requires a store URL")]
    MissingStoreUrl,

    #[error("invalid timeout {value}, expected positive integer")]
    InvalidTimeout { value: usize },

    #[error("invalid static base '{base}': {source}")]
    InvalidBase {
        base: String,
        #[source]
        source: FetchError,
    },

    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to setup proxy: {proxy}: {source}")]
    ProxySetup {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },
}

/// A failure in one collection's pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Fetch,
    Schema,
    Render,
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Fetch(_) => ErrorKind::Fetch,
            Self::Schema(_) => ErrorKind::Schema,
            Self::Render(_) => ErrorKind::Render,
        }
    }
}

/// Per collection, per load: `Idle -> Loading -> Rendered | Failed`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum CollectionState {
    Idle,
    Loading,
    Rendered { cards: usize },
    Failed { kind: ErrorKind, message: String },
}

impl CollectionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rendered { .. } | Self::Failed { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Rendered { .. } => "rendered",
            Self::Failed { .. } => "failed",
        }
    }

    fn advance(self, collection: Collection, next: CollectionState) -> CollectionState {
        if self.is_terminal() {
            debug!(collection = %collection, state = self.label(), "ignoring transition out of terminal state");
            return self;
        }
        debug!(collection = %collection, from = self.label(), to = next.label(), "state");
        next
    }
}

#[derive(Debug)]
pub struct LoadReport<A> {
    pub started_at: Instant,
    pub elapsed: Duration,
    pub states: BTreeMap<Collection, CollectionState>,
    pub filters: Option<FilterController<A>>,
}

impl<A> LoadReport<A> {
    pub fn state(&self, collection: Collection) -> &CollectionState {
        self.states
            .get(&collection)
            .unwrap_or(&CollectionState::Idle)
    }

    pub fn is_rendered(&self, collection: Collection) -> bool {
        matches!(self.state(collection), CollectionState::Rendered { .. })
    }
}

#[derive(Clone, Debug)]
pub struct Runner {
    config: PortfolioConfig,
    renderer: CardRenderer,
    reporter: ErrorReporter,
}

impl Runner {
    pub fn new(config: PortfolioConfig) -> Result<Self, RunnerError> {
        let selectors = &config.selectors;
        for (name, value) in [
            ("projects", selectors.projects.as_str()),
            ("certificates", selectors.certificates.as_str()),
            ("grid", selectors.grid.as_str()),
            ("filter_buttons", selectors.filter_buttons.as_str()),
        ] {
            if value.trim().is_empty() {
                return Err(RunnerError::EmptySelector { name });
            }
        }
        if config.http.timeout_seconds == 0 {
            return Err(RunnerError::InvalidTimeout {
                value: config.http.timeout_seconds,
            });
        }
        if let SourceConfig::Documents { store_url, .. } = &config.source {
            if store_url.trim().is_empty() {
                return Err(RunnerError::MissingStoreUrl);
            }
        }
        Ok(Self {
            renderer: CardRenderer::new(config.render.clone()),
            reporter: ErrorReporter::new(config.selectors.clone()),
            config,
        })
    }

    pub fn config(&self) -> &PortfolioConfig {
        &self.config
    }

    /// Builds the data source the configuration names.
    pub fn source(&self) -> Result<Box<dyn DataSource>, RunnerError> {
        let client = build_http_client(&self.config.http)?;
        Ok(match &self.config.source {
            SourceConfig::Static { base, endpoints } => {
                let base = StaticBase::parse(base).map_err(|e| RunnerError::InvalidBase {
                    base: base.clone(),
                    source: e,
                })?;
                Box::new(StaticJsonSource::new(client, endpoints.clone(), base))
            }
            SourceConfig::Documents {
                store_url,
                paths,
                token,
            } => Box::new(DocumentStoreSource::new(
                client,
                store_url,
                paths.clone(),
                token.clone(),
            )),
        })
    }

    /// Loads with the configured source and the class-based grid layout.
    pub async fn run<D>(&self, doc: &mut D) -> Result<LoadReport<ClassFilterLayout>, RunnerError>
    where
        D: Document + ?Sized,
    {
        let source = self.source()?;
        Ok(self
            .load(doc, source.as_ref(), ClassFilterLayout::from_grid::<D>)
            .await)
    }

    /// Runs both collection pipelines concurrently, then binds filtering
    /// over the projects grid. An empty filter bar is first filled from the
    /// rendered categories. Never fails as a whole: each collection ends
    /// either rendered or replaced by an error notice.
    pub async fn load<D, S, A, F>(&self, doc: &mut D, source: &S, arranger: F) -> LoadReport<A>
    where
        D: Document + ?Sized,
        S: DataSource + ?Sized,
        A: Arranger,
        F: FnOnce(&D, &str) -> Option<A>,
    {
        let started_at = Instant::now();
        let page = RefCell::new(doc);

        let (projects, certificates) = tokio::join!(
            self.load_collection(&page, source, Collection::Projects),
            self.load_collection(&page, source, Collection::Certificates),
        );

        let doc = page.into_inner();
        let filters = if matches!(projects, CollectionState::Rendered { .. }) {
            let selectors = &self.config.selectors;
            let grid = selectors.grid.as_str();
            let has_buttons = doc
                .filter_buttons(&selectors.filter_buttons)
                .is_some_and(|buttons| !buttons.is_empty());
            if !has_buttons {
                let buttons = derive_buttons(&*doc, grid, &self.config.render.default_category);
                debug!(buttons = buttons.len(), "filter bar derived from categories");
                doc.replace_filter_buttons(&selectors.filter_buttons, buttons);
            }
            let layout = arranger(&*doc, grid);
            FilterController::attach(&*doc, grid, &selectors.filter_buttons, layout)
        } else {
            debug!("projects not rendered, filters not attached");
            None
        };

        let mut states = BTreeMap::new();
        states.insert(Collection::Projects, projects);
        states.insert(Collection::Certificates, certificates);

        let elapsed = started_at.elapsed();
        info!(elapsed_ms = elapsed.as_millis() as u64, "portfolio loaded");
        LoadReport {
            started_at,
            elapsed,
            states,
            filters,
        }
    }

    async fn load_collection<D, S>(
        &self,
        page: &RefCell<&mut D>,
        source: &S,
        collection: Collection,
    ) -> CollectionState
    where
        D: Document + ?Sized,
        S: DataSource + ?Sized,
    {
        let state = CollectionState::Idle.advance(collection, CollectionState::Loading);
        debug!(collection = %collection, source = %source.describe(collection), "fetching");
        match self.run_pipeline(page, source, collection).await {
            Ok(cards) => {
                info!(collection = %collection, cards, "rendered");
                state.advance(collection, CollectionState::Rendered { cards })
            }
            Err(err) => {
                let mut doc = page.borrow_mut();
                self.reporter.report(&mut **doc, collection, &err);
                state.advance(
                    collection,
                    CollectionState::Failed {
                        kind: err.kind(),
                        message: err.to_string(),
                    },
                )
            }
        }
    }

    async fn run_pipeline<D, S>(
        &self,
        page: &RefCell<&mut D>,
        source: &S,
        collection: Collection,
    ) -> Result<usize, PipelineError>
    where
        D: Document + ?Sized,
        S: DataSource + ?Sized,
    {
        let payload = source.fetch(collection).await?;
        let records = normalize::normalize(payload, collection)?;
        let selector = self.config.selectors.container(collection);
        let mut doc = page.borrow_mut();
        let cards = self
            .renderer
            .render(&mut **doc, selector, collection, &records)?;
        Ok(cards)
    }
}

pub fn build_http_client(http: &HttpOptions) -> Result<reqwest::Client, RunnerError> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_static(concat!(
            "portfolio-cards/",
            env!("CARGO_PKG_VERSION")
        )),
    );
    headers.insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static("application/json"),
    );

    let timeout = Duration::from_secs(http.timeout_seconds.try_into().unwrap_or(10));
    let mut builder = reqwest::Client::builder()
        .default_headers(headers)
        .timeout(timeout);

    if let Some(proxy) = http.proxy.as_deref().filter(|p| !p.trim().is_empty()) {
        let proxy = reqwest::Proxy::all(proxy).map_err(|e| RunnerError::ProxySetup {
            proxy: proxy.to_string(),
            source: e,
        })?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| RunnerError::HttpClientBuild { source: e })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_selector() {
        let mut config = PortfolioConfig::default();
        config.selectors.grid = "  ".to_string();
        assert!(matches!(
            Runner::new(config),
            Err(RunnerError::EmptySelector { name: "grid" })
        ));
    }

    #[test]
    fn rejects_document_store_without_url() {
        let config = PortfolioConfig {
            source: SourceConfig::Documents {
                store_url: String::new(),
                paths: Endpoints::document_defaults(),
                token: None,
            },
            ..PortfolioConfig::default()
        };
        assert!(matches!(Runner::new(config), Err(RunnerError::MissingStoreUrl)));
    }

    #[test]
    fn rejects_zero_timeout() {
        let config = PortfolioConfig {
            http: HttpOptions {
                timeout_seconds: 0,
                proxy: None,
            },
            ..PortfolioConfig::default()
        };
        assert!(matches!(
            Runner::new(config),
            Err(RunnerError::InvalidTimeout { value: 0 })
        ));
    }

    #[test]
    fn terminal_states_do_not_move() {
        let rendered = CollectionState::Rendered { cards: 2 };
        let next = rendered
            .clone()
            .advance(Collection::Projects, CollectionState::Loading);
        assert_eq!(next, rendered);
        assert_eq!(
            CollectionState::Idle.advance(Collection::Projects, CollectionState::Loading),
            CollectionState::Loading
        );
    }

    #[test]
    fn bad_proxy_is_reported() {
        let http = HttpOptions {
            timeout_seconds: 5,
            proxy: Some("::not a proxy::".to_string()),
        };
        assert!(matches!(
            build_http_client(&http),
            Err(RunnerError::ProxySetup { .. })
        ));
    }
}
