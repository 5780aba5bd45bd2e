//! HTTP client for the project-management backend.
//!
//! Every network call goes through [`Client`]: it attaches the bearer token,
//! unwraps the `{ success, data, ... }` envelope, and turns failures into
//! [`Error`] values.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{multipart::Form, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::{
    errors::{FieldErrors, DEFAULT_ERROR_MESSAGE},
    query::{decode, Query, RawList, WireQueryParams},
    session::{CredentialStore, Navigator, TOKEN_KEY, USER_KEY},
    types::{field_errors_of, message_of, ApiResponse, Credentials, ResponseBody, Session, TableResponse},
    Error,
};

const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
const DEFAULT_LOGIN_PATH: &str = "/login";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    /// Applies to the whole request, body included.
    pub timeout: Duration,
    /// Route the user is sent to after a 401.
    pub login_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
        }
    }
}

impl ClientConfig {
    /// Reads `PROJECTDESK_API_URL`, `PROJECTDESK_TIMEOUT_SECS` and
    /// `PROJECTDESK_LOGIN_PATH`, keeping defaults for unset or invalid values.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env_string("PROJECTDESK_API_URL").unwrap_or(defaults.base_url),
            timeout: env_string("PROJECTDESK_TIMEOUT_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            login_path: env_string("PROJECTDESK_LOGIN_PATH").unwrap_or(defaults.login_path),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_login_path(mut self, login_path: &str) -> Self {
        self.login_path = login_path.to_string();
        self
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Outgoing request body.
///
/// Multipart bodies get their `content-type` (with boundary) from the
/// transport; the client never sets one by hand.
#[derive(Debug)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(Form),
}

/// HTTP client for the backend API.
pub struct Client {
    http: reqwest::Client,
    base_api_url: String,
    login_path: String,
    credentials: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
}

impl Client {
    pub fn new(
        config: ClientConfig,
        credentials: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::InvalidRequest(e.to_string())
            })?;
        Ok(Self {
            http,
            base_api_url: config.base_url.trim_end_matches('/').to_string(),
            login_path: config.login_path,
            credentials,
            navigator,
        })
    }

    /// Creates a client with default settings and a custom base URL. Used for testing with wiremock.
    pub fn with_base_url(
        base_url: &str,
        credentials: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, Error> {
        Self::new(
            ClientConfig::default().with_base_url(base_url),
            credentials,
            navigator,
        )
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    fn get_url<Q: Query>(&self, path: &str, query: Option<&Q>) -> Result<Url, Error> {
        let url = Url::parse(format!("{}{}", &self.base_api_url, path).as_str()).map_err(|e| {
            tracing::error!("Invalid URL constructed: {}", e);
            Error::InvalidRequest(e.to_string())
        })?;
        Ok(match query {
            Some(query) => query.add_to_url(&url),
            None => url,
        })
    }

    /// Sends a request and returns the response only if it is a 2xx.
    async fn execute<Q: Query>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Q>,
        body: RequestBody,
    ) -> Result<reqwest::Response, Error> {
        let url = self.get_url(path, query)?;
        let mut req = self
            .http
            .request(method, url)
            .header(ACCEPT, "application/json, text/plain, */*");
        if let Some(token) = self.credentials.token() {
            req = req.bearer_auth(token);
        }
        req = match body {
            RequestBody::Empty => req,
            RequestBody::Json(value) => req.json(&value),
            RequestBody::Multipart(form) => req.multipart(form),
        };

        let resp = req.send().await.map_err(|e| {
            tracing::error!("Failed to get resource {}: {}", path, e);
            transport_error(e)
        })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        tracing::error!(
            "Request to {} failed with status {}: {}",
            path,
            status,
            truncate_body(&body)
        );
        Err(self.reject(status, &body))
    }

    fn reject(&self, status: StatusCode, body: &str) -> Error {
        let (server_message, errors) = match serde_json::from_str::<Value>(body) {
            Ok(value) => (message_of(&value["message"]), field_errors_of(&value["errors"])),
            Err(_) => (None, FieldErrors::new()),
        };
        let message = server_message
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string());
        if status == StatusCode::UNAUTHORIZED {
            self.end_session();
        }
        Error::from_status(status.as_u16(), message, errors)
    }

    /// Drops the stored credentials and sends the user to the login route,
    /// unless they are already there.
    fn end_session(&self) {
        self.credentials.remove(TOKEN_KEY);
        self.credentials.remove(USER_KEY);
        if self.navigator.current_path() != self.login_path {
            tracing::warn!("Session rejected, redirecting to {}", self.login_path);
            self.navigator.navigate(&self.login_path);
        }
    }

    async fn request_value<Q: Query>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Q>,
        body: RequestBody,
    ) -> Result<ApiResponse<Value>, Error> {
        let resp = self.execute(method, path, query, body).await?;
        let text = resp.text().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::network()
        })?;
        if text.trim().is_empty() {
            return Ok(ApiResponse {
                data: Value::Null,
                message: None,
                pagination: None,
            });
        }
        // Non-JSON bodies pass through as a bare string.
        let body = serde_json::from_str::<ResponseBody>(&text).unwrap_or_else(|e| {
            tracing::debug!("Non-JSON response body: {} | body: {}", e, truncate_body(&text));
            ResponseBody::Bare(Value::String(text))
        });
        Ok(body.into())
    }

    /// Sends a JSON request and deserializes the envelope's `data` into `T`.
    ///
    /// A `null` payload is a valid result: use `Option<_>` (or `Value`) for
    /// endpoints that may return one.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: Option<&WireQueryParams>,
        body: RequestBody,
    ) -> Result<ApiResponse<T>, Error> {
        let resp = self.request_value(method, path, query, body).await?;
        let data = serde_json::from_value::<T>(resp.data).map_err(|e| {
            tracing::error!("Failed to parse resource {}: {}", path, e);
            Error::Decode(e.to_string())
        })?;
        Ok(ApiResponse {
            data,
            message: resp.message,
            pagination: resp.pagination,
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>, Error> {
        self.request(Method::GET, path, None, RequestBody::Empty)
            .await
    }

    /// Fetches a list endpoint and normalizes it into a [`TableResponse`].
    pub async fn get_list<T: DeserializeOwned + Clone>(
        &self,
        path: &str,
        params: &WireQueryParams,
    ) -> Result<TableResponse<T>, Error> {
        let resp = self
            .request_value(Method::GET, path, Some(params), RequestBody::Empty)
            .await?;
        let raw = RawList::<T>::from_parts(resp.data, resp.pagination)?;
        Ok(decode(&raw))
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<ApiResponse<T>, Error> {
        self.request(Method::POST, path, None, json_body(body)?)
            .await
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<ApiResponse<T>, Error> {
        self.request(Method::PUT, path, None, json_body(body)?)
            .await
    }

    pub async fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<ApiResponse<T>, Error> {
        self.request(Method::PATCH, path, None, json_body(body)?)
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>, Error> {
        self.request(Method::DELETE, path, None, RequestBody::Empty)
            .await
    }

    /// Posts a multipart form (file uploads).
    pub async fn upload<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<ApiResponse<T>, Error> {
        self.request(Method::POST, path, None, RequestBody::Multipart(form))
            .await
    }

    /// Fetches a binary resource. The body is returned as-is, without
    /// envelope handling.
    pub async fn download(&self, path: &str) -> Result<Vec<u8>, Error> {
        let resp = self
            .execute(Method::GET, path, None::<&WireQueryParams>, RequestBody::Empty)
            .await?;
        let bytes = resp.bytes().await.map_err(|e| {
            tracing::error!("Failed to read download body: {}", e);
            Error::network()
        })?;
        Ok(bytes.to_vec())
    }

    /// Logs in and stores the returned token and user profile.
    pub async fn login(&self, credentials: &Credentials) -> Result<Session, Error> {
        let resp = self.post::<Session>("/auth/login", credentials).await?;
        let session = resp.data;
        self.credentials.set(TOKEN_KEY, session.token.clone());
        self.credentials.set(USER_KEY, session.user.to_string());
        tracing::info!("Logged in");
        Ok(session)
    }

    /// Forgets the stored credentials.
    pub fn logout(&self) {
        self.credentials.remove(TOKEN_KEY);
        self.credentials.remove(USER_KEY);
    }

    /// The stored user profile, if any.
    pub fn current_user(&self) -> Option<Value> {
        self.credentials
            .get(USER_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .filter(|user: &Value| !user.is_null())
    }
}

fn json_body(body: &impl Serialize) -> Result<RequestBody, Error> {
    serde_json::to_value(body)
        .map(RequestBody::Json)
        .map_err(|e| Error::InvalidRequest(e.to_string()))
}

/// Connect failures and timeouts look the same to callers.
fn transport_error(e: reqwest::Error) -> Error {
    if e.is_builder() {
        Error::InvalidRequest(e.to_string())
    } else {
        Error::network()
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...[truncated]", &body[..end])
    }
}
