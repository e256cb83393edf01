use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::auth::{ClaimsVerifier, HttpKeySource, KeySource};
use crate::config::AppConfig;
use crate::services::{HttpPdfRenderer, PdfRenderer, ReservationFeed, SignetFeed};

/// Shared, cheaply cloneable state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    pub verifier: Arc<ClaimsVerifier>,
    pub feed: Arc<dyn ReservationFeed>,
    pub renderer: Arc<dyn PdfRenderer>,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        config: AppConfig,
        keys: Arc<dyn KeySource>,
        feed: Arc<dyn ReservationFeed>,
        renderer: Arc<dyn PdfRenderer>,
    ) -> Self {
        let verifier = Arc::new(ClaimsVerifier::new(&config.auth, keys));
        Self {
            pool,
            config: Arc::new(config),
            verifier,
            feed,
            renderer,
        }
    }

    /// Wire the production collaborators: JWKS over HTTP, the Signet feed and
    /// the HTTP PDF renderer, sharing one outbound client.
    pub fn from_config(pool: PgPool, config: AppConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let keys = Arc::new(HttpKeySource::new(client.clone(), config.auth.jwks_url.clone()));
        let feed = Arc::new(SignetFeed::new(client.clone(), &config.feed));
        let renderer = Arc::new(HttpPdfRenderer::new(client, &config.pdf));

        Ok(Self::new(pool, config, keys, feed, renderer))
    }
}
