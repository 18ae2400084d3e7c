//! Remote Resource Gateway: list/get/create/update/delete against one
//! collection endpoint. Holds no state besides the HTTP client.

use std::{future::Future, marker::PhantomData, sync::Arc, time::Duration};

use reqwest::{Method, Url};
use serde::{Deserialize, de::IgnoredAny};
use serde_json::{Map, Value};

use api_types::{RecordId, reference::Reference};

use crate::{
    draft::Fields,
    envelope,
    error::GatewayError,
    resource::{Endpoints, Resource},
    schema::ReferenceKind,
    session::TokenSource,
};

pub trait Gateway<R: Resource>: Clone + Send + Sync + 'static {
    /// Records in server order.
    fn list(&self) -> impl Future<Output = Result<Vec<R>, GatewayError>> + Send;

    fn get(&self, id: RecordId) -> impl Future<Output = Result<R, GatewayError>> + Send;

    /// Returns the persisted record, including its assigned id.
    fn create(&self, fields: Fields) -> impl Future<Output = Result<R, GatewayError>> + Send;

    /// Partial update: fields left out keep their server value.
    fn update(
        &self,
        id: RecordId,
        fields: Fields,
    ) -> impl Future<Output = Result<R, GatewayError>> + Send;

    fn delete(&self, id: RecordId) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Options for a reference field or filter.
    fn references(
        &self,
        kind: ReferenceKind,
    ) -> impl Future<Output = Result<Vec<Reference>, GatewayError>> + Send;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
    errors: Option<Map<String, Value>>,
}

impl ErrorBody {
    /// First field error if any, then the top-level message.
    fn into_message(self) -> Option<String> {
        let detail = self.errors.and_then(|errors| {
            errors.into_iter().find_map(|(_, value)| match value {
                Value::String(s) => Some(s),
                Value::Array(items) => items.into_iter().find_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                }),
                _ => None,
            })
        });
        detail.or(self.message).or(self.error)
    }
}

/// Authenticated JSON client shared by every resource gateway.
#[derive(Clone)]
pub struct ApiClient {
    base_url: Url,
    http: reqwest::Client,
    tokens: Arc<dyn TokenSource>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        tokens: Arc<dyn TokenSource>,
    ) -> Result<Self, GatewayError> {
        // `Url::join` replaces the last segment unless the base ends with '/'.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized)
            .map_err(|err| GatewayError::Transport(format!("invalid base_url: {err}")))?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url,
            http,
            tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Fields>,
    ) -> Result<Value, GatewayError> {
        let Some(token) = self.tokens.bearer_token() else {
            tracing::warn!("{method} {path} skipped: no bearer token");
            return Err(GatewayError::Auth);
        };

        let endpoint = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| GatewayError::Transport(format!("invalid path {path}: {err}")))?;

        tracing::debug!("{method} {endpoint}");
        let mut req = self
            .http
            .request(method.clone(), endpoint)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(body) = body {
            req = req.json(body);
        }

        let res = req.send().await.map_err(|err| {
            tracing::warn!("{method} {path} failed: {err}");
            GatewayError::from(err)
        })?;

        let status = res.status();
        let bytes = res.bytes().await?;

        if status.is_success() {
            if bytes.iter().all(u8::is_ascii_whitespace) {
                return Ok(Value::Null);
            }
            return serde_json::from_slice(&bytes)
                .map_err(|err| GatewayError::Server(format!("invalid json: {err}")));
        }

        let message = serde_json::from_slice::<ErrorBody>(&bytes)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or_else(|| "unknown error".to_string());
        tracing::warn!("{method} {path} -> {status}: {message}");

        let err = match status.as_u16() {
            401 | 403 => GatewayError::Auth,
            404 => GatewayError::NotFound,
            400 | 409 | 422 => GatewayError::Validation(message),
            _ => GatewayError::Server(message),
        };
        Err(err)
    }

    pub async fn references(&self, kind: ReferenceKind) -> Result<Vec<Reference>, GatewayError> {
        let body = self.send(Method::GET, kind.list_path(), None).await?;
        envelope::normalize(body)
    }
}

/// HTTP gateway for one resource kind.
pub struct HttpGateway<R> {
    client: ApiClient,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for HttpGateway<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> HttpGateway<R> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            _resource: PhantomData,
        }
    }

    fn endpoints(&self) -> Endpoints {
        R::ENDPOINTS
    }
}

impl<R: Resource> Gateway<R> for HttpGateway<R> {
    async fn list(&self) -> Result<Vec<R>, GatewayError> {
        let body = self
            .client
            .send(Method::GET, self.endpoints().list, None)
            .await?;
        envelope::normalize(body)
    }

    async fn get(&self, id: RecordId) -> Result<R, GatewayError> {
        let Some(template) = self.endpoints().get else {
            // No single-record read: look it up in a fresh list.
            return self
                .list()
                .await?
                .into_iter()
                .find(|record| record.id() == id)
                .ok_or(GatewayError::NotFound);
        };
        let path = Endpoints::with_id(template, id);
        let body = self.client.send(Method::GET, &path, None).await?;
        envelope::normalize(body)
    }

    async fn create(&self, fields: Fields) -> Result<R, GatewayError> {
        let body = self
            .client
            .send(Method::POST, self.endpoints().create, Some(&fields))
            .await?;
        let record: R = envelope::normalize(body)?;
        tracing::info!("created {} {}", R::schema().title, record.id());
        Ok(record)
    }

    async fn update(&self, id: RecordId, fields: Fields) -> Result<R, GatewayError> {
        let path = Endpoints::with_id(self.endpoints().update, id);
        let body = self.client.send(Method::PUT, &path, Some(&fields)).await?;
        let record = envelope::normalize(body)?;
        tracing::info!("updated {} {id}", R::schema().title);
        Ok(record)
    }

    async fn delete(&self, id: RecordId) -> Result<(), GatewayError> {
        let path = Endpoints::with_id(self.endpoints().delete, id);
        let body = self.client.send(Method::DELETE, &path, None).await?;
        envelope::normalize::<IgnoredAny>(body)?;
        tracing::info!("deleted {} {id}", R::schema().title);
        Ok(())
    }

    async fn references(&self, kind: ReferenceKind) -> Result<Vec<Reference>, GatewayError> {
        self.client.references(kind).await
    }
}
