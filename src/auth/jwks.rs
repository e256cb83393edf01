use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::DecodingKey;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::AuthError;

/// Where the issuer's signing keys come from.
#[async_trait]
pub trait KeySource: Send + Sync {
    async fn fetch(&self) -> Result<JwkSet, AuthError>;
}

/// Fetches the JWKS document from the issuer's discovery endpoint.
pub struct HttpKeySource {
    client: reqwest::Client,
    url: String,
}

impl HttpKeySource {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self { client, url: url.into() }
    }
}

#[async_trait]
impl KeySource for HttpKeySource {
    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| AuthError::KeyDiscovery(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::KeyDiscovery(format!(
                "{} returned {}",
                self.url,
                response.status()
            )));
        }

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| AuthError::KeyDiscovery(e.to_string()))
    }
}

/// Fixed key set, for deployments with pinned keys and for tests.
pub struct StaticKeySource(pub JwkSet);

#[async_trait]
impl KeySource for StaticKeySource {
    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        Ok(self.0.clone())
    }
}

/// Floor between two fetches of the key set, however many unknown `kid`s arrive
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

struct CachedKey {
    key: DecodingKey,
    fetched_at: Instant,
}

/// Decoding keys indexed by `kid`. A miss or an entry older than `ttl`
/// triggers one refresh of the whole key set, at most once per
/// `min_refresh`; concurrent misses share a single fetch.
pub struct JwksCache {
    source: Arc<dyn KeySource>,
    ttl: Duration,
    min_refresh: Duration,
    keys: RwLock<HashMap<String, CachedKey>>,
    last_refresh: Mutex<Option<Instant>>,
}

impl JwksCache {
    pub fn new(source: Arc<dyn KeySource>, ttl: Duration) -> Self {
        Self::with_min_refresh(source, ttl, MIN_REFRESH_INTERVAL)
    }

    pub fn with_min_refresh(source: Arc<dyn KeySource>, ttl: Duration, min_refresh: Duration) -> Self {
        Self {
            source,
            ttl,
            min_refresh,
            keys: RwLock::new(HashMap::new()),
            last_refresh: Mutex::new(None),
        }
    }

    pub async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        if let Some(key) = self.fresh_key(kid).await {
            return Ok(key);
        }

        {
            let mut last_refresh = self.last_refresh.lock().await;

            // Another caller may have refreshed while this one waited
            if let Some(key) = self.fresh_key(kid).await {
                return Ok(key);
            }

            match *last_refresh {
                Some(at) if at.elapsed() < self.min_refresh => {
                    debug!("Signing key refresh for kid '{}' throttled; last fetch {:?} ago", kid, at.elapsed());
                }
                _ => {
                    // A failed fetch also starts the interval
                    *last_refresh = Some(Instant::now());
                    self.refresh().await?;
                }
            }
        }

        // Stale entries still serve while a refresh is throttled
        let keys = self.keys.read().await;
        keys.get(kid)
            .map(|cached| cached.key.clone())
            .ok_or_else(|| AuthError::InvalidSignatureOrClaims(format!("no signing key with kid '{}'", kid)))
    }

    async fn fresh_key(&self, kid: &str) -> Option<DecodingKey> {
        let keys = self.keys.read().await;
        keys.get(kid)
            .filter(|cached| cached.fetched_at.elapsed() < self.ttl)
            .map(|cached| cached.key.clone())
    }

    async fn refresh(&self) -> Result<(), AuthError> {
        let set = self.source.fetch().await?;
        let fetched_at = Instant::now();

        let mut fresh = HashMap::with_capacity(set.keys.len());
        for jwk in &set.keys {
            let Some(kid) = jwk.common.key_id.clone() else {
                debug!("Skipping signing key without kid");
                continue;
            };
            match DecodingKey::from_jwk(jwk) {
                Ok(key) => {
                    fresh.insert(kid, CachedKey { key, fetched_at });
                }
                Err(e) => warn!("Skipping unusable signing key '{}': {}", kid, e),
            }
        }

        info!("Refreshed signing keys: {} usable", fresh.len());
        *self.keys.write().await = fresh;
        Ok(())
    }
}
