//! Blocking store client over the Dataverse Web API.
//!
//! One request at a time, no automatic retries: a failed call surfaces as a
//! `StoreError` and retrying is an explicit caller decision.

use std::fmt;
use std::time::Duration;

use serde_json::Value;
use url::Url;

use obstrack_core::{ClientUpdate, Document, Observation, TrackerError};

use crate::wire;

const OBSERVATIONS_PATH: &str = "/_api/cr650_ia_observations";
const UPDATES_PATH: &str = "/_api/cr650_iaclientupdates";
const DOCUMENTS_PATH: &str = "/_api/cr650_ia_documentses";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Error taxonomy of the store layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("transport error: {0}")]
    Http(String),
    #[error("request failed with HTTP {code}")]
    Status { code: u16 },
    #[error("no observation matches '{0}'")]
    NotFound(String),
    #[error("could not read response: {0}")]
    Parse(String),
}

impl From<ureq::Error> for StoreError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, _) => StoreError::Status { code },
            ureq::Error::Transport(transport) => StoreError::Http(transport.to_string()),
        }
    }
}

impl From<TrackerError> for StoreError {
    fn from(err: TrackerError) -> Self {
        StoreError::Parse(err.to_string())
    }
}

/// Provider of the portal anti-forgery token.
///
/// The token is attached as `__RequestVerificationToken` on mutating calls.
/// Implementations should give up within about five seconds; returning
/// `None` never blocks the request, the server decides whether to accept it.
pub trait TokenSource {
    fn token(&self) -> Option<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => write!(f, "asc"),
            SortDirection::Descending => write!(f, "desc"),
        }
    }
}

/// OData list query: conjunctive `$filter` expressions plus `$orderby`
/// and `$top`.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    filters: Vec<String>,
    order_by: Option<(String, SortDirection)>,
    top: Option<u32>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, expression: impl Into<String>) -> Self {
        self.filters.push(expression.into());
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by = Some((field.into(), direction));
        self
    }

    pub fn top(mut self, count: u32) -> Self {
        self.top = Some(count);
        self
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if !self.filters.is_empty() {
            pairs.push(("$filter", self.filters.join(" and ")));
        }
        if let Some((field, direction)) = &self.order_by {
            pairs.push(("$orderby", format!("{field} {direction}")));
        }
        if let Some(top) = self.top {
            pairs.push(("$top", top.to_string()));
        }
        pairs
    }
}

/// Client for the observation, client-update and document tables.
pub struct ObservationStore {
    base: Url,
    agent: ureq::Agent,
    token_source: Option<Box<dyn TokenSource + Send + Sync>>,
}

impl ObservationStore {
    pub fn new(base_url: &str) -> Result<Self, StoreError> {
        let base = Url::parse(base_url).map_err(|err| StoreError::Parse(err.to_string()))?;
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        Ok(Self {
            base,
            agent,
            token_source: None,
        })
    }

    pub fn with_token_source(
        mut self,
        source: Box<dyn TokenSource + Send + Sync>,
    ) -> Self {
        self.token_source = Some(source);
        self
    }

    /// List observations matching the query, in server order.
    pub fn list(&self, query: &ListQuery) -> Result<Vec<Observation>, StoreError> {
        let envelope = self.get_json(OBSERVATIONS_PATH, &query.query_pairs())?;
        Ok(wire::list_from_value(&envelope, wire::observation_from_value)?)
    }

    /// Fetch one observation by GUID or by its human-readable reference.
    /// A reference with no matching row is reported as `NotFound`, distinct
    /// from transport or server failures.
    pub fn get(&self, id_or_reference: &str) -> Result<Observation, StoreError> {
        if is_guid(id_or_reference) {
            let path = format!("{OBSERVATIONS_PATH}({id_or_reference})");
            let row = self.get_json(&path, &[])?;
            return Ok(wire::observation_from_value(&row)?);
        }

        let query = ListQuery::new()
            .filter(format!("cr650_name eq '{}'", escape_odata(id_or_reference)))
            .top(1);
        let mut rows = self.list(&query)?;
        match rows.pop() {
            Some(observation) => Ok(observation),
            None => Err(StoreError::NotFound(id_or_reference.to_string())),
        }
    }

    pub fn create(&self, observation: &Observation) -> Result<(), StoreError> {
        let body = wire::observation_to_value(observation);
        self.send_mutation("POST", OBSERVATIONS_PATH, Some(&body))
    }

    /// PATCH a partial column set onto an existing row.
    pub fn update(&self, id: &str, patch: &Value) -> Result<(), StoreError> {
        let path = format!("{OBSERVATIONS_PATH}({id})");
        self.send_mutation("PATCH", &path, Some(patch))
    }

    pub fn delete(&self, id: &str) -> Result<(), StoreError> {
        let path = format!("{OBSERVATIONS_PATH}({id})");
        self.send_mutation("DELETE", &path, None)
    }

    pub fn create_client_update(&self, update: &ClientUpdate) -> Result<(), StoreError> {
        let body = wire::client_update_to_value(update);
        self.send_mutation("POST", UPDATES_PATH, Some(&body))
    }

    /// All updates for an observation, newest first.
    pub fn client_updates_for(
        &self,
        observation_id: &str,
    ) -> Result<Vec<ClientUpdate>, StoreError> {
        let pairs = [
            ("$filter", observation_filter(observation_id)),
            ("$orderby", "cr650_submitteddate desc".to_string()),
        ];
        let envelope = self.get_json(UPDATES_PATH, &pairs)?;
        Ok(wire::list_from_value(
            &envelope,
            wire::client_update_from_value,
        )?)
    }

    pub fn latest_client_update(
        &self,
        observation_id: &str,
    ) -> Result<Option<ClientUpdate>, StoreError> {
        let pairs = [
            ("$filter", observation_filter(observation_id)),
            ("$orderby", "cr650_submitteddate desc".to_string()),
            ("$top", "1".to_string()),
        ];
        let envelope = self.get_json(UPDATES_PATH, &pairs)?;
        let mut rows = wire::list_from_value(&envelope, wire::client_update_from_value)?;
        let first = rows.drain(..).next();
        Ok(first)
    }

    pub fn documents_for(&self, observation_id: &str) -> Result<Vec<Document>, StoreError> {
        let pairs = [("$filter", observation_filter(observation_id))];
        let envelope = self.get_json(DOCUMENTS_PATH, &pairs)?;
        Ok(wire::list_from_value(&envelope, wire::document_from_value)?)
    }

    fn get_json(
        &self,
        path: &str,
        pairs: &[(&str, String)],
    ) -> Result<Value, StoreError> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, "dataverse GET");

        let mut request = self
            .agent
            .get(url.as_str())
            .set("Accept", "application/json");
        for (key, value) in pairs {
            request = request.query(key, value);
        }

        let response = request.call().map_err(log_request_error)?;
        response
            .into_json()
            .map_err(|err| StoreError::Parse(err.to_string()))
    }

    fn send_mutation(
        &self,
        method: &str,
        path: &str,
        body: Option<&Value>,
    ) -> Result<(), StoreError> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, method, "dataverse mutation");

        let mut request = self
            .agent
            .request(method, url.as_str())
            .set("Accept", "application/json");
        if let Some(token) = self.token_source.as_ref().and_then(|source| source.token()) {
            request = request.set("__RequestVerificationToken", &token);
        }

        let result = match body {
            Some(body) => request.send_json(body),
            None => request.call(),
        };

        // 200/201 with a body and 204 without one are all success; the
        // response body is not needed here.
        result.map_err(log_request_error)?;
        Ok(())
    }

    fn endpoint(&self, path: &str) -> Result<Url, StoreError> {
        self.base
            .join(path)
            .map_err(|err| StoreError::Parse(err.to_string()))
    }
}

fn log_request_error(err: ureq::Error) -> StoreError {
    let store_err = StoreError::from(err);
    tracing::warn!(error = %store_err, "dataverse request failed");
    store_err
}

/// Escape a literal for use inside an OData `$filter` string: single
/// quotes are doubled. Applied to every interpolated value, GUID or not.
fn escape_odata(value: &str) -> String {
    value.replace('\'', "''")
}

fn observation_filter(observation_id: &str) -> String {
    format!(
        "_cr650_observation_value eq '{}'",
        escape_odata(observation_id)
    )
}

/// Dataverse primary keys are GUIDs; anything else is treated as a
/// human-readable reference.
fn is_guid(value: &str) -> bool {
    let segments: Vec<&str> = value.split('-').collect();
    segments.len() == 5
        && [8, 4, 4, 4, 12]
            .iter()
            .zip(&segments)
            .all(|(len, segment)| {
                segment.len() == *len && segment.chars().all(|c| c.is_ascii_hexdigit())
            })
}
