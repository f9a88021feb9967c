//! Link creation and resolution service.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{debug, warn};

use crate::domain::clock::Clock;
use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::code_generator::{generate_code, is_reserved, validate_custom_code};
use crate::utils::url_validator::validate_destination;

/// Attempts made to find a free random code before giving up.
pub const MAX_GENERATION_ATTEMPTS: usize = 5;

/// Input for [`LinkService::create_short_link`].
#[derive(Debug, Clone, PartialEq)]
pub struct CreateLink {
    pub destination: String,
    pub custom_code: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub owner_identity: String,
}

/// Service for creating and resolving short links.
///
/// Creation validates the destination, then claims either the requested
/// custom code or a random one. Resolution reads through the optional cache
/// and always applies the expiry check to whatever it found.
pub struct LinkService<L: LinkRepository> {
    link_repository: Arc<L>,
    cache: Arc<dyn CacheService>,
    clock: Arc<dyn Clock>,
    base_url: Option<String>,
    generator: fn() -> String,
}

impl<L: LinkRepository> LinkService<L> {
    /// Creates a new link service.
    pub fn new(
        link_repository: Arc<L>,
        cache: Arc<dyn CacheService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            link_repository,
            cache,
            clock,
            base_url: None,
            generator: generate_code,
        }
    }

    /// Uses `base_url` instead of the request's `Host` when building short URLs.
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty());
        self
    }

    #[cfg(test)]
    fn with_generator(mut self, generator: fn() -> String) -> Self {
        self.generator = generator;
        self
    }

    /// Creates a short link.
    ///
    /// # Code Selection
    ///
    /// - With `custom_code`: the code is validated, probed and inserted. Losing
    ///   a race to a concurrent insert of the same code is reported as a
    ///   conflict too.
    /// - Without: up to [`MAX_GENERATION_ATTEMPTS`] random 6-character codes
    ///   are tried. A reserved draw, a probe hit or a duplicate insert each
    ///   use up an attempt.
    ///
    /// An `expires_at` in the past is accepted; the link will simply never resolve.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the destination URL is invalid.
    /// Returns [`AppError::InvalidCustomCode`] if the custom code breaks the length or charset rules.
    /// Returns [`AppError::CodeConflict`] if the custom code is taken.
    /// Returns [`AppError::GenerationExhausted`] if no free random code was found.
    pub async fn create_short_link(&self, input: CreateLink) -> Result<Link, AppError> {
        validate_destination(&input.destination)
            .map_err(|e| AppError::bad_request(e.to_string(), json!({ "field": "originalUrl" })))?;

        let created_at = self.clock.now();

        match input.custom_code.filter(|c| !c.is_empty()) {
            Some(custom) => {
                validate_custom_code(&custom)?;

                if self.link_repository.exists(&custom).await? {
                    return Err(AppError::CodeConflict { code: custom });
                }

                let new_link = NewLink {
                    code: custom,
                    destination: input.destination,
                    created_at,
                    expires_at: input.expires_at,
                    owner_identity: input.owner_identity,
                    is_custom: true,
                };

                self.link_repository
                    .insert(new_link)
                    .await
                    .map_err(|e| match e {
                        AppError::DuplicateCode { code } => AppError::CodeConflict { code },
                        other => other,
                    })
            }
            None => {
                for attempt in 1..=MAX_GENERATION_ATTEMPTS {
                    let code = (self.generator)();

                    if is_reserved(&code) {
                        debug!(attempt, %code, "Generated code is reserved");
                        continue;
                    }

                    if self.link_repository.exists(&code).await? {
                        debug!(attempt, "Generated code collided with an existing link");
                        continue;
                    }

                    let new_link = NewLink {
                        code,
                        destination: input.destination.clone(),
                        created_at,
                        expires_at: input.expires_at,
                        owner_identity: input.owner_identity.clone(),
                        is_custom: false,
                    };

                    match self.link_repository.insert(new_link).await {
                        Ok(link) => return Ok(link),
                        Err(AppError::DuplicateCode { code }) => {
                            debug!(attempt, %code, "Generated code was claimed concurrently");
                        }
                        Err(e) => return Err(e),
                    }
                }

                Err(AppError::GenerationExhausted {
                    attempts: MAX_GENERATION_ATTEMPTS,
                })
            }
        }
    }

    /// Resolves a short code to a live link.
    ///
    /// Never touches `click_count`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::LinkNotFound`] if no link uses `code`.
    /// Returns [`AppError::LinkExpired`] if the link's expiry is strictly in the past.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn resolve(&self, code: &str) -> Result<Link, AppError> {
        let (link, from_cache) = match self.cache.get_link(code).await {
            Ok(Some(link)) => (link, true),
            Ok(None) => (self.load(code).await?, false),
            Err(e) => {
                warn!("Cache error for {}: {}", code, e);
                (self.load(code).await?, false)
            }
        };

        let now = self.clock.now();
        if link.is_expired_at(now) {
            return Err(AppError::LinkExpired {
                code: code.to_string(),
            });
        }

        if !from_cache {
            self.populate_cache(&link, now);
        }

        Ok(link)
    }

    /// Lists links created by `owner_identity`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn list_by_owner(&self, owner_identity: &str) -> Result<Vec<Link>, AppError> {
        self.link_repository.list_by_owner(owner_identity).await
    }

    /// Builds the public short URL for `code`.
    ///
    /// Uses the configured base URL when present, otherwise `http://{host}`.
    pub fn short_url(&self, host: Option<&str>, code: &str) -> String {
        match (&self.base_url, host) {
            (Some(base), _) => format!("{}/{}", base, code),
            (None, Some(host)) => format!("http://{}/{}", host, code),
            (None, None) => format!("/{}", code),
        }
    }

    /// Checks that the link store is reachable.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.link_repository.ping().await
    }

    async fn load(&self, code: &str) -> Result<Link, AppError> {
        self.link_repository
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::LinkNotFound {
                code: code.to_string(),
            })
    }

    /// Stores `link` in the cache in the background, never past its expiry.
    fn populate_cache(&self, link: &Link, now: DateTime<Utc>) {
        let ttl = match link.expires_at {
            Some(expires_at) => {
                let remaining = (expires_at - now).num_seconds();
                if remaining <= 0 {
                    return;
                }
                Some(remaining as u64)
            }
            None => None,
        };

        let cache = self.cache.clone();
        let link = link.clone();
        tokio::spawn(async move {
            if let Err(e) = cache.set_link(&link, ttl).await {
                warn!("Failed to cache link {}: {}", link.code, e);
            }
        });
    }
}
