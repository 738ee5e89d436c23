//! Share service
//!
//! Issuance and resolution of shareable note links. Shared by the HTTP
//! handlers and the CLI.
//!
//! Note content is never logged; log lines carry slug, byte size and expiry
//! preset only.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, SubsecRound, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::rate_limiter::{RateLimitDecision, RateLimiter};
use super::slug::{RandomSlugGenerator, SlugGenerator};
use crate::config::ShareConfig;
use crate::errors::{ResolveError, ShareError};
use crate::storage::{ExpiryPreset, KvStore, StoredNote, note_key};
use crate::utils::is_valid_slug;

/// Whitespace-only content, counting the byte order mark as whitespace
fn is_blank(content: &str) -> bool {
    content
        .trim_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}')
        .is_empty()
}

/// Limits and presentation settings for share links
#[derive(Debug, Clone)]
pub struct ShareSettings {
    /// Origin used to build `<base_url>/s/<slug>`, without trailing slash
    pub base_url: String,
    pub max_content_bytes: usize,
    pub rate_limit_max: u64,
    pub rate_limit_window: Duration,
    pub slug_length: usize,
    pub max_slug_retries: u32,
    pub default_expiry: ExpiryPreset,
}

impl ShareSettings {
    pub fn from_config(config: &ShareConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_content_bytes: config.max_content_bytes,
            rate_limit_max: config.rate_limit_max,
            rate_limit_window: Duration::from_secs(config.rate_limit_window_secs),
            slug_length: config.slug_length,
            max_slug_retries: config.max_slug_retries,
            default_expiry: config.default_expiry,
        }
    }

    pub fn share_url(&self, slug: &str) -> String {
        format!("{}/s/{}", self.base_url, slug)
    }
}

impl Default for ShareSettings {
    fn default() -> Self {
        Self::from_config(&ShareConfig::default())
    }
}

/// Successful issuance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedLink {
    pub url: String,
    pub slug: String,
    #[serde(with = "crate::storage::models::iso_millis_opt")]
    pub expires_at: Option<DateTime<Utc>>,
}

pub struct ShareService {
    store: Arc<dyn KvStore>,
    limiter: RateLimiter,
    slugs: Arc<dyn SlugGenerator>,
    settings: ShareSettings,
}

impl ShareService {
    pub fn new(store: Arc<dyn KvStore>, settings: ShareSettings) -> Self {
        let slugs = Arc::new(RandomSlugGenerator::new(settings.slug_length));
        Self::with_slug_generator(store, settings, slugs)
    }

    pub fn with_slug_generator(
        store: Arc<dyn KvStore>,
        settings: ShareSettings,
        slugs: Arc<dyn SlugGenerator>,
    ) -> Self {
        let limiter = RateLimiter::new(
            store.clone(),
            settings.rate_limit_max,
            settings.rate_limit_window,
        );
        Self {
            store,
            limiter,
            slugs,
            settings,
        }
    }

    pub fn settings(&self) -> &ShareSettings {
        &self.settings
    }

    pub fn store(&self) -> &Arc<dyn KvStore> {
        &self.store
    }

    /// Validate, rate limit and persist a note, returning its public link
    ///
    /// Checks run in order: empty content, size limit, rate limit, slug
    /// reservation. Nothing is written unless every check passes.
    pub async fn issue(
        &self,
        content: &str,
        expires_in: ExpiryPreset,
        client_address: &str,
    ) -> Result<IssuedLink, ShareError> {
        if is_blank(content) {
            return Err(ShareError::EmptyContent);
        }

        let content_size = content.len();
        if content_size > self.settings.max_content_bytes {
            debug!(
                "Rejected share of {} bytes (limit {})",
                content_size, self.settings.max_content_bytes
            );
            return Err(ShareError::ContentTooLarge {
                limit: self.settings.max_content_bytes,
            });
        }

        match self.limiter.check(client_address).await {
            Ok(RateLimitDecision::Allowed { .. }) => {}
            Ok(RateLimitDecision::Limited { .. }) => return Err(ShareError::RateLimited),
            Err(e) => {
                error!("Rate limit check failed: {}", e);
                return Err(e.into());
            }
        }

        // 毫秒精度，保证序列化后 expiresAt - createdAt 恰好等于预设时长
        let now = Utc::now().trunc_subsecs(3);
        let note = StoredNote::new(content.to_string(), now, expires_in);
        let payload = serde_json::to_string(&note).map_err(|e| {
            error!("Failed to serialize note: {}", e);
            ShareError::Internal(e.to_string())
        })?;

        let slug = self.reserve_slug(payload, expires_in.ttl()).await?;

        info!(
            "Created note slug={} size={} expires={}",
            slug, content_size, expires_in
        );

        Ok(IssuedLink {
            url: self.settings.share_url(&slug),
            slug,
            expires_at: note.expires_at,
        })
    }

    /// Write `payload` under a fresh slug with set-if-not-exists
    async fn reserve_slug(
        &self,
        payload: String,
        ttl: Option<Duration>,
    ) -> Result<String, ShareError> {
        for attempt in 1..=self.settings.max_slug_retries {
            let slug = self.slugs.generate();
            let written = self
                .store
                .set_nx(&note_key(&slug), payload.clone(), ttl)
                .await
                .map_err(|e| {
                    error!("Failed to store note slug={}: {}", slug, e);
                    ShareError::from(e)
                })?;

            if written {
                return Ok(slug);
            }
            warn!(
                "Slug collision on attempt {}/{}: {}",
                attempt, self.settings.max_slug_retries, slug
            );
        }

        error!(
            "Failed to generate a unique slug after {} attempts",
            self.settings.max_slug_retries
        );
        Err(ShareError::SlugExhausted)
    }

    /// Look up a note by slug
    ///
    /// Never-issued, expired and unreadable notes are all `NotFound`.
    pub async fn resolve(&self, slug: &str) -> Result<StoredNote, ResolveError> {
        if slug.is_empty() {
            return Err(ResolveError::EmptySlug);
        }
        if !is_valid_slug(slug) {
            debug!("Rejected malformed slug lookup");
            return Err(ResolveError::NotFound);
        }

        let raw = self.store.get(&note_key(slug)).await.map_err(|e| {
            error!("Failed to fetch note slug={}: {}", slug, e);
            ResolveError::Store(e)
        })?;

        let Some(raw) = raw else {
            debug!("Note not found: {}", slug);
            return Err(ResolveError::NotFound);
        };

        serde_json::from_str::<StoredNote>(&raw).map_err(|e| {
            warn!("Stored note slug={} is unreadable: {}", slug, e);
            ResolveError::NotFound
        })
    }
}
