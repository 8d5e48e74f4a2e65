//! OAuth2 JWT-bearer grant against the token endpoint

use std::time::Duration;

use reqwest::Client;
use secrecy::SecretString;
use serde::Deserialize;
use tracing::debug;

use crate::auth::AccessToken;
use crate::core::error::{DispatchError, Result};

pub const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Trades signed assertions for bearer tokens
pub struct TokenExchanger {
    client: Client,
    token_uri: String,
}

impl TokenExchanger {
    pub fn new(token_uri: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DispatchError::Transport(e.to_string()))?;
        Ok(Self { client, token_uri })
    }

    pub fn token_uri(&self) -> &str {
        &self.token_uri
    }

    /// Exchange `assertion` for an access token
    ///
    /// `issued_at` is the assertion's `iat`; the returned token never claims
    /// to outlive the assertion's validity window.
    pub async fn exchange(&self, assertion: &str, issued_at: i64) -> Result<AccessToken> {
        let form = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion)];

        let response = self
            .client
            .post(&self.token_uri)
            .form(&form)
            .send()
            .await
            .map_err(|e| DispatchError::TokenExchange {
                status: None,
                detail: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| DispatchError::TokenExchange {
                status: Some(status),
                detail: e.to_string(),
            })?;

        if !(200..300).contains(&status) {
            return Err(DispatchError::TokenExchange {
                status: Some(status),
                detail: body,
            });
        }

        let parsed: TokenResponse =
            serde_json::from_str(&body).map_err(|e| DispatchError::TokenExchange {
                status: Some(status),
                detail: format!("unparseable token response: {}", e),
            })?;

        let token = parsed
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| DispatchError::TokenExchange {
                status: Some(status),
                detail: "response carried no access_token".into(),
            })?;

        let mut expires_at = issued_at + crate::auth::assertion::ASSERTION_LIFETIME_SECS;
        if let Some(expires_in) = parsed.expires_in {
            expires_at = expires_at.min(issued_at + expires_in);
        }

        debug!(
            token_type = parsed.token_type.as_deref().unwrap_or("unknown"),
            expires_at, "token exchanged"
        );

        Ok(AccessToken::new(SecretString::from(token), expires_at))
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<i64>,
    token_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn exchanger(server: &MockServer) -> TokenExchanger {
        TokenExchanger::new(format!("{}/token", server.uri()), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_exchange_posts_jwt_bearer_form() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains(
                "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer",
            ))
            .and(body_string_contains("assertion=aaa.bbb.ccc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "ya29.token",
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let token = exchanger(&server).exchange("aaa.bbb.ccc", 1_000).await.unwrap();
        assert_eq!(token.secret().expose_secret(), "ya29.token");
        assert_eq!(token.expires_at(), 1_000 + 3599);
    }

    #[tokio::test]
    async fn test_expiry_capped_by_assertion_window() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "t",
                "expires_in": 86400
            })))
            .mount(&server)
            .await;

        let token = exchanger(&server).exchange("a.b.c", 50).await.unwrap();
        assert_eq!(token.expires_at(), 50 + 3600);
    }

    #[tokio::test]
    async fn test_rejected_assertion_carries_status_and_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(r#"{"error":"invalid_grant","error_description":"Invalid JWT Signature."}"#),
            )
            .mount(&server)
            .await;

        let err = exchanger(&server).exchange("a.b.c", 0).await.unwrap_err();
        match err {
            DispatchError::TokenExchange { status, detail } => {
                assert_eq!(status, Some(400));
                assert!(detail.contains("invalid_grant"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_access_token_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token_type": "Bearer"})))
            .mount(&server)
            .await;

        let err = exchanger(&server).exchange("a.b.c", 0).await.unwrap_err();
        assert!(matches!(
            err,
            DispatchError::TokenExchange {
                status: Some(200),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_unparseable_body_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = exchanger(&server).exchange("a.b.c", 0).await.unwrap_err();
        assert!(err.to_string().starts_with("token error: 200"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let exchanger =
            TokenExchanger::new("http://127.0.0.1:1/token".into(), Duration::from_secs(2)).unwrap();
        let err = exchanger.exchange("a.b.c", 0).await.unwrap_err();
        assert!(matches!(err, DispatchError::TokenExchange { status: None, .. }));
    }
}
