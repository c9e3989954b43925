use std::sync::Arc;
use std::time::Duration as StdDuration;

use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use relay_core::AuthProfile;

use crate::error::DeliveryError;

type HmacSha256 = Hmac<Sha256>;

/// Resolves an `Authorization` header value for an outbound delivery
/// request, per auth profile (spec §6). OAuth2 tokens are cached per
/// subscriber until near-expiry by the caller-supplied [`TokenCache`].
pub async fn authorization_header(
    auth: &AuthProfile,
    token_cache: &TokenCache,
    http_client: &reqwest::Client,
) -> Result<Option<String>, DeliveryError> {
    match auth {
        AuthProfile::NoAuth => Ok(None),
        AuthProfile::ApiKey { header_value } => Ok(Some(header_value.clone())),
        AuthProfile::Zgw {
            client_id,
            secret,
            user_id,
            user_representation,
        } => {
            let jwt = mint_zgw_jwt(client_id, secret, user_id, user_representation)?;
            Ok(Some(format!("Bearer {jwt}")))
        }
        AuthProfile::OAuth2ClientCredentials {
            token_url,
            client_id,
            secret,
            scope,
        } => {
            let token = token_cache
                .get_or_fetch(token_url, client_id, secret, scope.as_deref(), http_client)
                .await?;
            Ok(Some(format!("Bearer {token}")))
        }
    }
}

#[derive(Serialize)]
struct ZgwClaims<'a> {
    iss: &'a str,
    iat: i64,
    client_id: &'a str,
    user_id: &'a str,
    user_representation: &'a str,
}

/// Mints an HS256 JWT with claims `{iss, iat, client_id, user_id,
/// user_representation}`. `iss` is the subscriber's own `client_id`, per the
/// self-asserting-client convention of the auth scheme this emulates.
fn mint_zgw_jwt(
    client_id: &str,
    secret: &str,
    user_id: &str,
    user_representation: &str,
) -> Result<String, DeliveryError> {
    let header = serde_json::json!({"typ": "JWT", "alg": "HS256"});
    let claims = ZgwClaims {
        iss: client_id,
        iat: OffsetDateTime::now_utc().unix_timestamp(),
        client_id,
        user_id,
        user_representation,
    };

    let header_b64 = base64_url_encode(
        &serde_json::to_vec(&header).map_err(|e| DeliveryError::Serialization(e.to_string()))?,
    );
    let claims_b64 = base64_url_encode(
        &serde_json::to_vec(&claims).map_err(|e| DeliveryError::Serialization(e.to_string()))?,
    );
    let signing_input = format!("{header_b64}.{claims_b64}");

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| DeliveryError::Auth(e.to_string()))?;
    mac.update(signing_input.as_bytes());
    let signature_b64 = base64_url_encode(&mac.finalize().into_bytes());

    Ok(format!("{signing_input}.{signature_b64}"))
}

fn base64_url_encode(bytes: &[u8]) -> String {
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

struct CachedToken {
    access_token: String,
    expires_at: OffsetDateTime,
}

/// Caches OAuth2 client-credentials tokens per `token_url`+`client_id`,
/// refreshing a fixed window before expiry.
#[derive(Default)]
pub struct TokenCache {
    entries: RwLock<std::collections::HashMap<String, Arc<CachedToken>>>,
}

const EXPIRY_SAFETY_WINDOW: StdDuration = StdDuration::from_secs(30);

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    async fn get_or_fetch(
        &self,
        token_url: &str,
        client_id: &str,
        secret: &str,
        scope: Option<&str>,
        http_client: &reqwest::Client,
    ) -> Result<String, DeliveryError> {
        let cache_key = format!("{token_url}|{client_id}");

        if let Some(cached) = self.entries.read().await.get(&cache_key) {
            if cached.expires_at > OffsetDateTime::now_utc() {
                return Ok(cached.access_token.clone());
            }
        }

        let mut form = vec![
            ("grant_type", "client_credentials"),
            ("client_id", client_id),
            ("client_secret", secret),
        ];
        if let Some(scope) = scope {
            form.push(("scope", scope));
        }

        let response = http_client
            .post(token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| DeliveryError::Auth(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DeliveryError::Auth(format!(
                "token endpoint returned {}",
                response.status()
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| DeliveryError::Auth(e.to_string()))?;

        let ttl = body.expires_in.unwrap_or(3600);
        let expires_at = OffsetDateTime::now_utc()
            + time::Duration::seconds(ttl as i64)
            - time::Duration::seconds(EXPIRY_SAFETY_WINDOW.as_secs() as i64);

        let cached = Arc::new(CachedToken {
            access_token: body.access_token.clone(),
            expires_at,
        });
        self.entries.write().await.insert(cache_key, cached);

        Ok(body.access_token)
    }

    /// Drops any cached token tied to a subscriber being deleted.
    pub async fn evict(&self, token_url: &str, client_id: &str) {
        self.entries
            .write()
            .await
            .remove(&format!("{token_url}|{client_id}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zgw_jwt_has_three_segments() {
        let jwt = mint_zgw_jwt("client-a", "s3cr3t", "user-1", "User One").unwrap();
        assert_eq!(jwt.split('.').count(), 3);
    }

    #[test]
    fn zgw_jwt_is_deterministic_per_second() {
        let a = mint_zgw_jwt("client-a", "s3cr3t", "user-1", "User One").unwrap();
        let b = mint_zgw_jwt("client-a", "s3cr3t", "user-1", "User One").unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn no_auth_yields_no_header() {
        let cache = TokenCache::new();
        let client = reqwest::Client::new();
        let header = authorization_header(&AuthProfile::NoAuth, &cache, &client)
            .await
            .unwrap();
        assert!(header.is_none());
    }

    #[tokio::test]
    async fn api_key_is_passed_through_verbatim() {
        let cache = TokenCache::new();
        let client = reqwest::Client::new();
        let header = authorization_header(
            &AuthProfile::ApiKey {
                header_value: "Bearer abc123".into(),
            },
            &cache,
            &client,
        )
        .await
        .unwrap();
        assert_eq!(header, Some("Bearer abc123".to_string()));
    }
}
