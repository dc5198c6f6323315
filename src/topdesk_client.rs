//! HTTP client for the TOPdesk REST API.
//!
//! This module provides `TopdeskClient`, the production [`TopdeskApi`]
//! implementation. It authenticates every request with HTTP Basic auth using
//! an operator login name and application password.
//!
//! # Identifiers
//!
//! Incident endpoints accept either a UUID or an incident number. The client
//! routes UUIDs to `/incidents/id/{id}` and everything else to
//! `/incidents/number/{number}`.
//!
//! # Pagination
//!
//! List endpoints answer `206 Partial Content` while more results remain.
//! The client keeps requesting pages until a page comes back with any other
//! success status or empty, up to `MAX_PAGES`.
//!
//! Failures are returned as-is. Nothing is retried.
//!
//! # Security
//!
//! The password is never logged. Error bodies are sanitized before they are
//! stored in an error.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::{FieldMap, OperatorGroupQuery, TopdeskApi};
use crate::config::Config;
use crate::error::TopdeskError;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Path of the REST API below the instance URL.
const API_PATH: &str = "/tas/api";

/// Number of records requested per page when listing.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Upper bound on pages fetched for a single list call.
const MAX_PAGES: u32 = 100;

/// Maximum length for HTTP error response bodies kept in errors.
const MAX_ERROR_BODY_LEN: usize = 500;

/// Query parameter names used by the different list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Paging {
    /// `/incidents` uses `pageStart` / `pageSize`.
    Incidents,
    /// Persons and operators use `start` / `page_size`.
    Standard,
}

impl Paging {
    fn params(self, start: u32, size: u32) -> [(&'static str, String); 2] {
        match self {
            Paging::Incidents => [("pageStart", start.to_string()), ("pageSize", size.to_string())],
            Paging::Standard => [("start", start.to_string()), ("page_size", size.to_string())],
        }
    }
}

/// HTTP client for the TOPdesk API.
///
/// Cloning is cheap; the underlying `reqwest::Client` is shared and safe to
/// use from concurrent tool calls.
///
/// # Example
///
/// ```ignore
/// let config = Config::from_env()?;
/// let client = TopdeskClient::new(&config)?;
///
/// let incident = client.get_incident("I 2403 012").await?;
/// ```
#[derive(Clone)]
pub struct TopdeskClient {
    /// The underlying HTTP client.
    http: Client,

    /// API root (e.g., `https://company.topdesk.net/tas/api`).
    base_url: String,

    /// Operator login name.
    username: String,

    /// Application password.
    /// SECURITY: Never log this value!
    password: String,

    /// Records requested per page for list calls.
    page_size: u32,
}

impl TopdeskClient {
    /// Creates a new TOPdesk client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `TopdeskError::HttpClient` if the HTTP client fails to initialize.
    pub fn new(config: &Config) -> Result<Self, TopdeskError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(TopdeskError::HttpClient)?;

        Ok(Self {
            http,
            base_url: Self::normalize_base_url(&config.base_url),
            username: config.username.clone(),
            password: config.password.clone(),
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    /// Overrides the number of records requested per page.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Normalizes the base URL to ensure it includes the API path.
    fn normalize_base_url(url: &str) -> String {
        let url = url.trim_end_matches('/');
        if url.ends_with(API_PATH) {
            url.to_string()
        } else {
            format!("{}{}", url, API_PATH)
        }
    }

    /// The API root requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the password for sanitizing error messages.
    ///
    /// This should ONLY be used for sanitization, never for logging.
    pub fn password_for_sanitization(&self) -> &str {
        &self.password
    }

    /// Returns the API path of an incident given its UUID or incident number.
    pub fn incident_path(incident_id: &str) -> String {
        if Uuid::parse_str(incident_id).is_ok() {
            format!("/incidents/id/{}", incident_id)
        } else {
            format!("/incidents/number/{}", urlencoding::encode(incident_id))
        }
    }

    /// Rejects empty identifiers before they are interpolated into a path.
    fn require_id(id: &str, field_name: &str) -> Result<(), TopdeskError> {
        if id.trim().is_empty() {
            return Err(TopdeskError::validation(format!(
                "{} must not be empty",
                field_name
            )));
        }
        Ok(())
    }

    /// Checks that the instance is reachable and the credentials work.
    ///
    /// Returns the TOPdesk version reported by the server.
    pub async fn test_connection(&self) -> Result<String, TopdeskError> {
        tracing::debug!("Testing connection to TOPdesk");

        let (_, body) = self.send(Method::GET, "/version", &[], None).await?;
        let version = body
            .get("version")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();

        tracing::info!(version = %version, "Connection test successful");
        Ok(version)
    }

    /// Makes a request to the TOPdesk API.
    ///
    /// An empty response body decodes to `Value::Null`.
    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<(StatusCode, Value), TopdeskError> {
        let url = format!("{}{}", self.base_url, path);

        tracing::debug!(method = %method, path = %path, "Making TOPdesk API request");

        let mut req = self
            .http
            .request(method.clone(), &url)
            .basic_auth(&self.username, Some(&self.password))
            .header("Accept", "application/json");

        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                return TopdeskError::timeout(
                    Duration::from_secs(DEFAULT_TIMEOUT_SECS),
                    format!("{} {}", method, path),
                );
            }
            TopdeskError::Http(e)
        })?;
        let status = response.status();

        if !status.is_success() {
            return Err(self.handle_http_error(status, path, response).await);
        }

        let text = response.text().await.map_err(TopdeskError::Http)?;

        tracing::trace!(status = %status, body = %text, "TOPdesk API response");

        let value = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text)?
        };

        Ok((status, value))
    }

    /// Converts a non-success response into a `TopdeskError`.
    async fn handle_http_error(
        &self,
        status: StatusCode,
        path: &str,
        response: reqwest::Response,
    ) -> TopdeskError {
        let body = response.text().await.unwrap_or_default();
        let body = TopdeskError::sanitize_message(&body, &self.password);
        let body = truncate_body(body);

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => TopdeskError::Authentication,
            StatusCode::NOT_FOUND => TopdeskError::not_found(path),
            _ => {
                tracing::debug!(status = %status, path = %path, "TOPdesk returned an error status");
                TopdeskError::HttpStatus { status, body }
            }
        }
    }

    async fn get_record(&self, path: &str) -> Result<Value, TopdeskError> {
        let (_, value) = self.send(Method::GET, path, &[], None).await?;
        Ok(value)
    }

    async fn get_list(&self, path: &str) -> Result<Vec<Value>, TopdeskError> {
        let (_, value) = self.send(Method::GET, path, &[], None).await?;
        into_list(value)
    }

    async fn write(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, TopdeskError> {
        let (_, value) = self.send(method, path, &[], body.as_ref()).await?;
        Ok(value)
    }

    /// Fetches every page of a FIQL search.
    ///
    /// After `MAX_PAGES` pages the records gathered so far are returned and a
    /// warning is logged.
    async fn get_all_pages(
        &self,
        path: &str,
        paging: Paging,
        query: &str,
    ) -> Result<Vec<Value>, TopdeskError> {
        let mut results = Vec::new();
        let mut start = 0u32;

        for page in 0..MAX_PAGES {
            let mut params = paging.params(start, self.page_size).to_vec();
            params.push(("query", query.to_string()));

            let (status, value) = self.send(Method::GET, path, &params, None).await?;
            let items = into_list(value)?;
            let count = items.len();
            results.extend(items);

            if status != StatusCode::PARTIAL_CONTENT || count == 0 {
                return Ok(results);
            }

            start += count as u32;
            tracing::debug!(path = %path, page = page + 1, fetched = results.len(), "Fetching next page");
        }

        tracing::warn!(path = %path, max_pages = MAX_PAGES, "Stopped listing at page limit");
        Ok(results)
    }
}

/// Interprets a response body as a list; no content means no results.
fn into_list(value: Value) -> Result<Vec<Value>, TopdeskError> {
    match value {
        Value::Null => Ok(Vec::new()),
        other => Ok(serde_json::from_value(other)?),
    }
}

/// Truncates an error body at a character boundary.
fn truncate_body(body: String) -> String {
    if body.len() <= MAX_ERROR_BODY_LEN {
        return body;
    }
    let mut end = MAX_ERROR_BODY_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[truncated]", &body[..end])
}

#[async_trait]
impl TopdeskApi for TopdeskClient {
    async fn get_incident(&self, incident_id: &str) -> Result<Value, TopdeskError> {
        Self::require_id(incident_id, "incident_id")?;
        self.get_record(&Self::incident_path(incident_id)).await
    }

    async fn list_incidents(&self, query: &str) -> Result<Vec<Value>, TopdeskError> {
        self.get_all_pages("/incidents", Paging::Incidents, query)
            .await
    }

    async fn list_incident_requests(&self, incident_id: &str) -> Result<Vec<Value>, TopdeskError> {
        Self::require_id(incident_id, "incident_id")?;
        let path = format!("{}/requests", Self::incident_path(incident_id));
        self.get_list(&path).await
    }

    async fn create_incident(&self, caller: &str, fields: FieldMap) -> Result<Value, TopdeskError> {
        let mut body = fields;
        if body.contains_key("callerLookup") {
            tracing::debug!("Replacing callerLookup in incident fields with caller_id");
        }
        body.insert("callerLookup".to_string(), json!({ "id": caller }));
        self.write(Method::POST, "/incidents", Some(Value::Object(body)))
            .await
    }

    async fn archive_incident(&self, incident_id: &str) -> Result<Value, TopdeskError> {
        Self::require_id(incident_id, "incident_id")?;
        let path = format!("{}/archive", Self::incident_path(incident_id));
        self.write(Method::PUT, &path, None).await
    }

    async fn unarchive_incident(&self, incident_id: &str) -> Result<Value, TopdeskError> {
        Self::require_id(incident_id, "incident_id")?;
        let path = format!("{}/unarchive", Self::incident_path(incident_id));
        self.write(Method::PUT, &path, None).await
    }

    async fn list_time_spent(&self, incident_id: &str) -> Result<Vec<Value>, TopdeskError> {
        Self::require_id(incident_id, "incident_id")?;
        let path = format!("{}/timespent", Self::incident_path(incident_id));
        self.get_list(&path).await
    }

    async fn register_time_spent(
        &self,
        incident_id: &str,
        time_spent: i64,
    ) -> Result<Value, TopdeskError> {
        Self::require_id(incident_id, "incident_id")?;
        let path = format!("{}/timespent", Self::incident_path(incident_id));
        self.write(Method::POST, &path, Some(json!({ "timeSpent": time_spent })))
            .await
    }

    async fn escalate_incident(
        &self,
        incident_id: &str,
        reason_id: &str,
    ) -> Result<Value, TopdeskError> {
        Self::require_id(incident_id, "incident_id")?;
        let path = format!("{}/escalate", Self::incident_path(incident_id));
        let body = json!({ "escalationReason": { "id": reason_id } });
        self.write(Method::PUT, &path, Some(body)).await
    }

    async fn deescalate_incident(
        &self,
        incident_id: &str,
        reason_id: &str,
    ) -> Result<Value, TopdeskError> {
        Self::require_id(incident_id, "incident_id")?;
        let path = format!("{}/deescalate", Self::incident_path(incident_id));
        let body = json!({ "deEscalationReason": { "id": reason_id } });
        self.write(Method::PUT, &path, Some(body)).await
    }

    async fn escalation_reasons(&self) -> Result<Vec<Value>, TopdeskError> {
        self.get_list("/incidents/escalation-reasons").await
    }

    async fn deescalation_reasons(&self) -> Result<Vec<Value>, TopdeskError> {
        self.get_list("/incidents/deescalation-reasons").await
    }

    async fn progress_trail(&self, incident_id: &str) -> Result<Vec<Value>, TopdeskError> {
        Self::require_id(incident_id, "incident_id")?;
        let path = format!("{}/progresstrail", Self::incident_path(incident_id));
        self.get_list(&path).await
    }

    async fn list_operator_groups(
        &self,
        params: OperatorGroupQuery,
    ) -> Result<Vec<Value>, TopdeskError> {
        let archived = format!("archived=={}", params.archived);
        let query = match params.query.as_deref().filter(|q| !q.trim().is_empty()) {
            Some(q) => format!("({});{}", q, archived),
            None => archived,
        };

        let query_params = [
            ("start", "0".to_string()),
            ("page_size", params.page_size.to_string()),
            ("query", query),
        ];
        let (_, value) = self
            .send(Method::GET, "/operatorgroups", &query_params, None)
            .await?;
        into_list(value)
    }

    async fn get_operator(&self, operator_id: &str) -> Result<Value, TopdeskError> {
        Self::require_id(operator_id, "operator_id")?;
        let path = format!("/operators/id/{}", urlencoding::encode(operator_id));
        self.get_record(&path).await
    }

    async fn list_operators(&self, query: &str) -> Result<Vec<Value>, TopdeskError> {
        self.get_all_pages("/operators", Paging::Standard, query)
            .await
    }

    async fn patch_incident(
        &self,
        incident_id: &str,
        fields: FieldMap,
    ) -> Result<Value, TopdeskError> {
        Self::require_id(incident_id, "incident_id")?;
        self.write(
            Method::PATCH,
            &Self::incident_path(incident_id),
            Some(Value::Object(fields)),
        )
        .await
    }

    async fn list_incident_actions(&self, incident_id: &str) -> Result<Vec<Value>, TopdeskError> {
        Self::require_id(incident_id, "incident_id")?;
        let path = format!("{}/actions", Self::incident_path(incident_id));
        self.get_list(&path).await
    }

    async fn delete_incident_action(
        &self,
        incident_id: &str,
        action_id: &str,
    ) -> Result<Value, TopdeskError> {
        Self::require_id(incident_id, "incident_id")?;
        Self::require_id(action_id, "action_id")?;
        let path = format!(
            "{}/actions/{}",
            Self::incident_path(incident_id),
            urlencoding::encode(action_id)
        );

        match self.write(Method::DELETE, &path, None).await? {
            Value::Null => Ok(json!({ "deleted": true, "actionId": action_id })),
            other => Ok(other),
        }
    }

    async fn list_persons(&self, query: &str) -> Result<Vec<Value>, TopdeskError> {
        self.get_all_pages("/persons", Paging::Standard, query).await
    }

    async fn get_person(&self, person_id: &str) -> Result<Value, TopdeskError> {
        Self::require_id(person_id, "person_id")?;
        let path = format!("/persons/id/{}", urlencoding::encode(person_id));
        self.get_record(&path).await
    }

    async fn create_person(&self, fields: FieldMap) -> Result<Value, TopdeskError> {
        self.write(Method::POST, "/persons", Some(Value::Object(fields)))
            .await
    }

    async fn update_person(
        &self,
        person_id: &str,
        fields: FieldMap,
    ) -> Result<Value, TopdeskError> {
        Self::require_id(person_id, "person_id")?;
        let path = format!("/persons/id/{}", urlencoding::encode(person_id));
        self.write(Method::PATCH, &path, Some(Value::Object(fields)))
            .await
    }

    async fn archive_person(
        &self,
        person_id: &str,
        reason_id: Option<&str>,
    ) -> Result<Value, TopdeskError> {
        Self::require_id(person_id, "person_id")?;
        let path = format!("/persons/id/{}/archive", urlencoding::encode(person_id));
        let body = reason_id.map(|id| json!({ "id": id }));
        self.write(Method::PATCH, &path, body).await
    }

    async fn unarchive_person(&self, person_id: &str) -> Result<Value, TopdeskError> {
        Self::require_id(person_id, "person_id")?;
        let path = format!("/persons/id/{}/unarchive", urlencoding::encode(person_id));
        self.write(Method::PATCH, &path, None).await
    }
}
