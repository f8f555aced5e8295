//! Fetch adapter for the REST backend.
//!
//! Attaches the session's bearer token, issues the request, decodes the JSON
//! body and normalizes every failure into an [`ApiError`]. Each normalized
//! error is also handed to the configured [`Notifier`] unless the request is
//! marked silent.

use std::sync::Arc;

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::{debug, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, FetchFailure};
use crate::notify::{Notification, Notifier};
use crate::session::Session;

/// Per-request options.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<serde_json::Value>,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    /// Skip the failure notification.
    pub silent: bool,
}

impl RequestOptions {
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Add a header. Caller headers override `Content-Type` but never the
    /// session's `Authorization`.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub const fn silent(mut self) -> Self {
        self.silent = true;
        self
    }
}

// =============================================================================
// BackendClient
// =============================================================================

/// Client for the REST backend.
///
/// Cloning is cheap; clones share the HTTP connection pool, the session and
/// the notifier.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: String,
    session: Session,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        config: &ClientConfig,
        session: Session,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                base_url: config.backend_url.clone(),
                session,
                notifier,
            }),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    /// Issue a request and decode the JSON response.
    ///
    /// An empty body decodes as JSON `null`, so `()` and `Option<T>` work for
    /// endpoints that answer 204.
    ///
    /// # Errors
    ///
    /// Returns the normalized `ApiError` for any non-2xx response, network
    /// failure or undecodable body.
    #[instrument(skip(self, options), fields(method = %options.method))]
    pub async fn call<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let silent = options.silent;
        self.execute(endpoint, options)
            .await
            .map_err(|failure| self.report(failure, silent))
    }

    /// Normalize a failure and notify about it unless the request is silent.
    fn report(&self, failure: FetchFailure, silent: bool) -> ApiError {
        let error = failure.normalize();
        if !silent {
            self.inner
                .notifier
                .notify(Notification::from_error(&error));
        }
        error
    }

    /// `GET` an endpoint.
    ///
    /// # Errors
    ///
    /// See [`BackendClient::call`].
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.call(endpoint, RequestOptions::new(Method::GET)).await
    }

    /// `POST` a JSON body.
    ///
    /// # Errors
    ///
    /// See [`BackendClient::call`].
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send_json(Method::POST, endpoint, body).await
    }

    /// `PUT` a JSON body.
    ///
    /// # Errors
    ///
    /// See [`BackendClient::call`].
    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send_json(Method::PUT, endpoint, body).await
    }

    /// `PATCH` an endpoint without a body.
    ///
    /// # Errors
    ///
    /// See [`BackendClient::call`].
    pub async fn patch<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.call(endpoint, RequestOptions::new(Method::PATCH)).await
    }

    /// `DELETE` an endpoint. Any response body is ignored.
    ///
    /// # Errors
    ///
    /// See [`BackendClient::call`].
    pub async fn delete(&self, endpoint: &str) -> Result<(), ApiError> {
        self.call::<IgnoredAny>(endpoint, RequestOptions::new(Method::DELETE))
            .await
            .map(|_| ())
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body).map_err(|e| {
            let failure = FetchFailure::other(format!("Failed to encode request body: {e}"));
            self.report(failure, false)
        })?;
        self.call(endpoint, RequestOptions::new(method).body(body))
            .await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, FetchFailure> {
        let url = self.url(endpoint, &options.query);
        let headers = self.headers(&options.headers).await?;

        let mut request = self
            .inner
            .client
            .request(options.method, &url)
            .headers(headers);
        if let Some(body) = &options.body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!(url = %url, status = status.as_u16(), "Backend responded");

        if !status.is_success() {
            warn!(
                url = %url,
                status = status.as_u16(),
                body = %text.chars().take(500).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(FetchFailure::http(status.as_u16(), &text));
        }

        let payload = if text.trim().is_empty() { "null" } else { &text };
        serde_json::from_str(payload).map_err(|e| {
            warn!(
                url = %url,
                error = %e,
                body = %text.chars().take(500).collect::<String>(),
                "Failed to decode backend response"
            );
            FetchFailure::Decode(e.to_string())
        })
    }

    /// Merge headers: JSON content type, then caller headers, then the
    /// session token.
    async fn headers(&self, extra: &[(String, String)]) -> Result<HeaderMap, FetchFailure> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        for (name, value) in extra {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| FetchFailure::other(format!("Invalid header name {name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| FetchFailure::other(format!("Invalid header value: {e}")))?;
            headers.insert(name, value);
        }

        if let Some(token) = self.inner.session.bearer().await {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| FetchFailure::other(format!("Invalid session token: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        } else {
            debug!("No session token; sending unauthenticated request");
        }

        Ok(headers)
    }

    fn url(&self, endpoint: &str, query: &[(String, String)]) -> String {
        let mut url = format!("{}{endpoint}", self.inner.base_url);
        if !query.is_empty() {
            let encoded = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(query)
                .finish();
            url.push(if endpoint.contains('?') { '&' } else { '?' });
            url.push_str(&encoded);
        }
        url
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::notify::{BroadcastNotifier, LogNotifier};

    fn client() -> BackendClient {
        let config = ClientConfig::for_backend("http://localhost:8080/").unwrap();
        BackendClient::new(&config, Session::new(), Arc::new(LogNotifier)).unwrap()
    }

    #[test]
    fn test_url_joins_base_and_endpoint() {
        assert_eq!(client().url("/products", &[]), "http://localhost:8080/products");
    }

    #[test]
    fn test_url_encodes_query() {
        let query = vec![("status".to_string(), "picked_up".to_string())];
        assert_eq!(
            client().url("/orders/4/status", &query),
            "http://localhost:8080/orders/4/status?status=picked_up"
        );

        let query = vec![("role".to_string(), "admin".to_string())];
        assert_eq!(
            client().url("/users?search=ana+souza", &query),
            "http://localhost:8080/users?search=ana+souza&role=admin"
        );
    }

    #[tokio::test]
    async fn test_headers_order() {
        let client = client();
        let headers = client
            .headers(&[("Content-Type".to_string(), "text/plain".to_string())])
            .await
            .unwrap();
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "text/plain");
        assert!(headers.get(AUTHORIZATION).is_none());

        client
            .session()
            .set_token(Some(secrecy::SecretString::from("tok")))
            .await;
        let headers = client
            .headers(&[("Authorization".to_string(), "Basic xyz".to_string())])
            .await
            .unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer tok");
    }

    #[tokio::test]
    async fn test_invalid_header_is_a_failure() {
        let err = client()
            .headers(&[("bad header".to_string(), "x".to_string())])
            .await
            .unwrap_err();
        assert!(matches!(err, FetchFailure::Other { .. }));
    }

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("refused"))
        }
    }

    #[tokio::test]
    async fn test_body_encoding_failure_is_notified() {
        let notifier = Arc::new(BroadcastNotifier::default());
        let mut notifications = notifier.subscribe();
        let config = ClientConfig::for_backend("http://localhost:8080/").unwrap();
        let client = BackendClient::new(&config, Session::new(), notifier).unwrap();

        let error = client
            .post::<_, serde_json::Value>("/products", &Unencodable)
            .await
            .unwrap_err();
        assert_eq!(error.status, None);

        let notification = notifications.try_recv().unwrap();
        assert_eq!(notification, Notification::from_error(&error));
    }
}
