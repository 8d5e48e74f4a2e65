//! Service account token issuance
//!
//! ```text
//! sign_assertion (RS256, PKCS8 key)
//!     |
//!     v
//! TokenExchanger (jwt-bearer grant)  --> AccessToken
//!     ^
//!     |
//! ServiceAccountTokenSource (optional TokenCache in front)
//! ```

pub mod assertion;
pub mod cache;
pub mod exchange;

use async_trait::async_trait;
use chrono::Utc;
use secrecy::SecretString;
use tracing::debug;

use crate::core::config::Config;
use crate::core::error::Result;

pub use assertion::sign_assertion;
pub use cache::TokenCache;
pub use exchange::TokenExchanger;

/// Bearer token with the Unix time it stops being valid
#[derive(Debug, Clone)]
pub struct AccessToken {
    secret: SecretString,
    expires_at: i64,
}

impl AccessToken {
    pub fn new(secret: SecretString, expires_at: i64) -> Self {
        Self { secret, expires_at }
    }

    pub fn secret(&self) -> &SecretString {
        &self.secret
    }

    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    /// Still valid for at least `margin_secs` after `now`
    pub fn is_fresh(&self, now: i64, margin_secs: i64) -> bool {
        now + margin_secs < self.expires_at
    }
}

/// Anything that can hand out a bearer token for the calendar API
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<AccessToken>;
}

/// Sign a fresh assertion and exchange it for a bearer token
pub async fn issue_token(
    exchanger: &TokenExchanger,
    issuer: &str,
    scope: &str,
    audience: &str,
    private_key_pem: &SecretString,
) -> Result<AccessToken> {
    let now = Utc::now().timestamp();
    let assertion = sign_assertion(issuer, scope, audience, now, private_key_pem)?;
    exchanger.exchange(&assertion, now).await
}

/// Mints tokens for one service account identity
pub struct ServiceAccountTokenSource {
    issuer: String,
    scope: String,
    audience: String,
    private_key: SecretString,
    exchanger: TokenExchanger,
    cache: Option<TokenCache>,
}

impl ServiceAccountTokenSource {
    pub fn new(
        issuer: String,
        scope: String,
        private_key: SecretString,
        exchanger: TokenExchanger,
    ) -> Self {
        let audience = exchanger.token_uri().to_string();
        Self {
            issuer,
            scope,
            audience,
            private_key,
            exchanger,
            cache: None,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let exchanger = TokenExchanger::new(config.token_uri.clone(), config.http_timeout)?;
        let source = Self::new(
            config.service_account_email.clone(),
            config.scope.clone(),
            config.private_key.clone(),
            exchanger,
        );
        Ok(if config.cache_tokens {
            source.with_cache()
        } else {
            source
        })
    }

    /// Reuse tokens until shortly before expiry instead of minting per call
    pub fn with_cache(mut self) -> Self {
        self.cache = Some(TokenCache::new());
        self
    }
}

#[async_trait]
impl TokenSource for ServiceAccountTokenSource {
    async fn access_token(&self) -> Result<AccessToken> {
        if let Some(cache) = &self.cache {
            if let Some(token) = cache.get(&self.issuer, &self.scope, Utc::now().timestamp()) {
                debug!(issuer = %self.issuer, "reusing cached token");
                return Ok(token);
            }
        }

        let token = issue_token(
            &self.exchanger,
            &self.issuer,
            &self.scope,
            &self.audience,
            &self.private_key,
        )
        .await?;

        if let Some(cache) = &self.cache {
            cache.insert(&self.issuer, &self.scope, token.clone());
        }
        Ok(token)
    }
}
