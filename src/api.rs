//! The boundary between the tool registry and TOPdesk.
//!
//! [`TopdeskApi`] has one method per MCP tool that talks to the platform.
//! The server holds it as `Arc<dyn TopdeskApi>`, so the production
//! [`TopdeskClient`](crate::topdesk_client::TopdeskClient) and test fakes are
//! interchangeable.
//!
//! Records and lists are passed around as raw [`serde_json::Value`]s. TOPdesk
//! owns every entity; nothing here interprets them.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TopdeskError;

/// An open-ended, ordered map of TOPdesk field names to values.
///
/// Forwarded verbatim; the TOPdesk API is the only validator of its keys.
pub type FieldMap = serde_json::Map<String, Value>;

/// Default page size for operator group searches.
pub const DEFAULT_OPERATOR_GROUP_PAGE_SIZE: u32 = 100;

/// Search parameters for operator groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorGroupQuery {
    /// Whether to return archived groups instead of active ones.
    pub archived: bool,
    /// Maximum number of groups to return.
    pub page_size: u32,
    /// Optional FIQL filter.
    pub query: Option<String>,
}

impl Default for OperatorGroupQuery {
    fn default() -> Self {
        Self {
            archived: false,
            page_size: DEFAULT_OPERATOR_GROUP_PAGE_SIZE,
            query: None,
        }
    }
}

/// Operations the MCP tools forward to TOPdesk.
///
/// Incident identifiers may be a UUID or an incident number; interpreting
/// the format is the implementation's job.
#[async_trait]
pub trait TopdeskApi: Send + Sync {
    /// Fetches a single incident.
    async fn get_incident(&self, incident_id: &str) -> Result<Value, TopdeskError>;

    /// Searches incidents with a FIQL query.
    async fn list_incidents(&self, query: &str) -> Result<Vec<Value>, TopdeskError>;

    /// Lists the user requests attached to an incident.
    async fn list_incident_requests(&self, incident_id: &str) -> Result<Vec<Value>, TopdeskError>;

    /// Creates an incident for `caller` with the given fields.
    ///
    /// Every key in `fields` is sent as given, except `callerLookup`: the
    /// caller argument always takes precedence over a `callerLookup` entry.
    async fn create_incident(&self, caller: &str, fields: FieldMap) -> Result<Value, TopdeskError>;

    /// Archives an incident.
    async fn archive_incident(&self, incident_id: &str) -> Result<Value, TopdeskError>;

    /// Unarchives an incident.
    async fn unarchive_incident(&self, incident_id: &str) -> Result<Value, TopdeskError>;

    /// Lists time spent entries on an incident.
    async fn list_time_spent(&self, incident_id: &str) -> Result<Vec<Value>, TopdeskError>;

    /// Registers time spent (in minutes) on an incident.
    async fn register_time_spent(
        &self,
        incident_id: &str,
        time_spent: i64,
    ) -> Result<Value, TopdeskError>;

    /// Escalates an incident with the given escalation reason.
    async fn escalate_incident(
        &self,
        incident_id: &str,
        reason_id: &str,
    ) -> Result<Value, TopdeskError>;

    /// De-escalates an incident with the given de-escalation reason.
    async fn deescalate_incident(
        &self,
        incident_id: &str,
        reason_id: &str,
    ) -> Result<Value, TopdeskError>;

    /// Lists the configured escalation reasons.
    async fn escalation_reasons(&self) -> Result<Vec<Value>, TopdeskError>;

    /// Lists the configured de-escalation reasons.
    async fn deescalation_reasons(&self) -> Result<Vec<Value>, TopdeskError>;

    /// Lists the progress trail of an incident.
    async fn progress_trail(&self, incident_id: &str) -> Result<Vec<Value>, TopdeskError>;

    /// Searches operator groups.
    async fn list_operator_groups(
        &self,
        params: OperatorGroupQuery,
    ) -> Result<Vec<Value>, TopdeskError>;

    /// Fetches a single operator.
    async fn get_operator(&self, operator_id: &str) -> Result<Value, TopdeskError>;

    /// Searches operators with a FIQL query.
    async fn list_operators(&self, query: &str) -> Result<Vec<Value>, TopdeskError>;

    /// Partially updates an incident.
    async fn patch_incident(
        &self,
        incident_id: &str,
        fields: FieldMap,
    ) -> Result<Value, TopdeskError>;

    /// Lists the actions (replies/comments) on an incident.
    async fn list_incident_actions(&self, incident_id: &str) -> Result<Vec<Value>, TopdeskError>;

    /// Deletes one action from an incident.
    async fn delete_incident_action(
        &self,
        incident_id: &str,
        action_id: &str,
    ) -> Result<Value, TopdeskError>;

    /// Searches persons with a FIQL query.
    async fn list_persons(&self, query: &str) -> Result<Vec<Value>, TopdeskError>;

    /// Fetches a single person.
    async fn get_person(&self, person_id: &str) -> Result<Value, TopdeskError>;

    /// Creates a person.
    async fn create_person(&self, fields: FieldMap) -> Result<Value, TopdeskError>;

    /// Partially updates a person.
    async fn update_person(&self, person_id: &str, fields: FieldMap)
        -> Result<Value, TopdeskError>;

    /// Archives a person, optionally with an archiving reason.
    async fn archive_person(
        &self,
        person_id: &str,
        reason_id: Option<&str>,
    ) -> Result<Value, TopdeskError>;

    /// Unarchives a person.
    async fn unarchive_person(&self, person_id: &str) -> Result<Value, TopdeskError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_group_query_defaults() {
        let params = OperatorGroupQuery::default();
        assert!(!params.archived);
        assert_eq!(params.page_size, 100);
        assert!(params.query.is_none());
    }

    #[test]
    fn test_field_map_preserves_insertion_order() {
        let mut fields = FieldMap::new();
        fields.insert("surName".to_string(), Value::from("Jansen"));
        fields.insert("firstName".to_string(), Value::from("Anna"));
        fields.insert("email".to_string(), Value::from("anna@example.com"));
        let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
        assert_eq!(keys, ["surName", "firstName", "email"]);
    }
}
