use relay_core::AuthProfile;
use relay_delivery::{authorization_header, DeliveryError, TokenCache};

/// Domains known to require no auth check, because they're disposable
/// inspection endpoints rather than real subscriber callbacks.
const AUTH_CHECK_WHITELIST: &[&str] = &["webhook.site"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResult {
    /// True iff POSTing the synthetic payload with the candidate auth
    /// returned a status in `[200, 210)`.
    pub reachable: bool,
    /// `Some(true)` if an unauthenticated POST was correctly rejected with
    /// 401/403; `None` if the check was skipped (whitelisted domain, or
    /// `test_callback_auth` disabled).
    pub rejects_without_auth: Option<bool>,
}

/// Probes a candidate callback URL before accepting a new subscription
/// (spec §4.8). This is the only outbound HTTP call allowed on a synchronous
/// request path, and only admin tooling calls it.
pub async fn probe_callback_url(
    http: &reqwest::Client,
    token_cache: &TokenCache,
    url: &str,
    auth: &AuthProfile,
    test_callback_auth: bool,
) -> Result<ProbeResult, DeliveryError> {
    let payload = serde_json::json!({"kanaal": "test", "probe": true});

    let auth_header = authorization_header(auth, token_cache, http).await?;
    let mut request = http.post(url).json(&payload);
    if let Some(header) = &auth_header {
        request = request.header("Authorization", header.clone());
    }
    let reachable = request
        .send()
        .await
        .map(|r| (200..210).contains(&r.status().as_u16()))
        .unwrap_or(false);

    let rejects_without_auth = if !test_callback_auth || is_whitelisted(url) {
        None
    } else {
        let status = http
            .post(url)
            .json(&payload)
            .send()
            .await
            .map(|r| r.status().as_u16());
        Some(matches!(status, Ok(401) | Ok(403)))
    };

    Ok(ProbeResult {
        reachable,
        rejects_without_auth,
    })
}

fn is_whitelisted(url: &str) -> bool {
    AUTH_CHECK_WHITELIST.iter().any(|domain| url.contains(domain))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header_exists, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn reachable_on_2xx() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).mount(&server).await;

        let http = reqwest::Client::new();
        let cache = TokenCache::new();
        let result = probe_callback_url(&http, &cache, &server.uri(), &AuthProfile::NoAuth, false)
            .await
            .unwrap();
        assert!(result.reachable);
        assert_eq!(result.rejects_without_auth, None);
    }

    #[tokio::test]
    async fn auth_check_confirms_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header_exists("Authorization"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("POST")).respond_with(ResponseTemplate::new(401)).mount(&server).await;

        let http = reqwest::Client::new();
        let cache = TokenCache::new();
        let auth = AuthProfile::ApiKey { header_value: "Bearer x".into() };
        let result = probe_callback_url(&http, &cache, &server.uri(), &auth, true)
            .await
            .unwrap();
        assert!(result.reachable);
        assert_eq!(result.rejects_without_auth, Some(true));
    }

    #[tokio::test]
    async fn whitelisted_domain_skips_auth_check() {
        let http = reqwest::Client::new();
        let cache = TokenCache::new();
        let result = probe_callback_url(
            &http,
            &cache,
            "https://webhook.site/abc-123",
            &AuthProfile::NoAuth,
            true,
        )
        .await
        .unwrap();
        assert_eq!(result.rejects_without_auth, None);
    }
}
