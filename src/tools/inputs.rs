//! Tool input parameter structs for MCP tools.
//!
//! This module defines the input types for each MCP tool, with
//! JSON Schema derivation for MCP tool discovery. Inputs are forwarded to
//! TOPdesk exactly as received: no trimming, no defaulting beyond what the
//! schema declares.

use rmcp::schemars::{self, JsonSchema};
use serde::Deserialize;

use crate::api::{FieldMap, OperatorGroupQuery, DEFAULT_OPERATOR_GROUP_PAGE_SIZE};

fn default_page_size() -> u32 {
    DEFAULT_OPERATOR_GROUP_PAGE_SIZE
}

/// Input for tools that act on a single incident.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct IncidentIdInput {
    /// Incident UUID or incident number (e.g., "I-230101-001").
    pub incident_id: String,
}

/// Input for FIQL search tools.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FiqlQueryInput {
    /// FIQL query string (see get_fiql_query_howto), e.g. "closed==false;status==firstLine".
    pub query: String,
}

/// Input parameters for the create_incident tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateIncidentInput {
    /// ID of the person reporting the incident.
    pub caller_id: String,

    /// Incident fields as TOPdesk names them (e.g., {"briefDescription": "..."}).
    /// See get_object_schemas. Passed to TOPdesk unchanged.
    pub incident_fields: FieldMap,
}

/// Input parameters for the register_timespent_on_incident tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RegisterTimeSpentInput {
    /// Incident UUID or incident number.
    pub incident_id: String,

    /// Time spent in minutes.
    pub time_spent: i64,
}

/// Input for escalate_incident and deescalate_incident.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct EscalationInput {
    /// Incident UUID or incident number.
    pub incident_id: String,

    /// ID of the (de-)escalation reason; list them with get_available_escalation_reasons
    /// or get_available_deescalation_reasons.
    pub reason_id: String,
}

/// Input parameters for the get_operatorgroups tool.
///
/// All fields are optional.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct OperatorGroupsInput {
    /// Return archived groups instead of active ones (default: false).
    #[serde(default)]
    pub archived: bool,

    /// Maximum number of groups to return (default: 100).
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Optional FIQL query; leave empty to return all groups.
    #[serde(default)]
    pub query: Option<String>,
}

impl From<OperatorGroupsInput> for OperatorGroupQuery {
    fn from(input: OperatorGroupsInput) -> Self {
        Self {
            archived: input.archived,
            page_size: input.page_size,
            query: input.query,
        }
    }
}

/// Input for the get_operator tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct OperatorIdInput {
    /// Operator UUID.
    pub operator_id: String,
}

/// Input parameters for the add_action_to_incident tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AddActionInput {
    /// Incident UUID or incident number.
    pub incident_id: String,

    /// The action text (reply/comment). HTML is allowed.
    pub text: String,
}

/// Input parameters for the delete_incident_action tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct IncidentActionInput {
    /// Incident UUID or incident number.
    pub incident_id: String,

    /// ID of the action to delete (see get_incident_actions).
    pub action_id: String,
}

/// Input for tools that act on a single person.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct PersonIdInput {
    /// Person UUID.
    pub person_id: String,
}

/// Input parameters for the create_person tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreatePersonInput {
    /// Person fields as TOPdesk names them (e.g., {"surName": "Jansen", "branch": {"id": "..."}}).
    pub person: FieldMap,
}

/// Input parameters for the update_person tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UpdatePersonInput {
    /// Person UUID.
    pub person_id: String,

    /// Fields to change, as TOPdesk names them. Passed to TOPdesk unchanged.
    pub updated_fields: FieldMap,
}

/// Input parameters for the archive_person tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ArchivePersonInput {
    /// Person UUID.
    pub person_id: String,

    /// Optional archiving reason ID.
    #[serde(default)]
    pub reason_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incident_id_input_is_not_trimmed() {
        let json = r#"{"incident_id": " I-230101-001 "}"#;
        let input: IncidentIdInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.incident_id, " I-230101-001 ");
    }

    #[test]
    fn test_create_incident_input_keeps_field_order() {
        let json = r#"{
            "caller_id": "caller-123",
            "incident_fields": {
                "briefDescription": "printer jam",
                "request": "Paper stuck in tray 2",
                "category": {"name": "Hardware"}
            }
        }"#;
        let input: CreateIncidentInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.caller_id, "caller-123");
        let keys: Vec<&str> = input.incident_fields.keys().map(String::as_str).collect();
        assert_eq!(keys, ["briefDescription", "request", "category"]);
    }

    #[test]
    fn test_create_incident_input_requires_fields() {
        let json = r#"{"caller_id": "caller-123"}"#;
        assert!(serde_json::from_str::<CreateIncidentInput>(json).is_err());

        let json = r#"{"caller_id": "caller-123", "incident_fields": {}}"#;
        let input: CreateIncidentInput = serde_json::from_str(json).unwrap();
        assert!(input.incident_fields.is_empty());
    }

    #[test]
    fn test_create_incident_schema_marks_fields_required() {
        let schema = schemars::schema_for!(CreateIncidentInput);
        let schema = serde_json::to_value(&schema).unwrap();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert!(required.contains(&"caller_id"));
        assert!(required.contains(&"incident_fields"));
    }

    #[test]
    fn test_register_time_spent_requires_integer() {
        let json = r#"{"incident_id": "I-1", "time_spent": "ten"}"#;
        assert!(serde_json::from_str::<RegisterTimeSpentInput>(json).is_err());

        let json = r#"{"incident_id": "I-1", "time_spent": 10}"#;
        let input: RegisterTimeSpentInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.time_spent, 10);
    }

    #[test]
    fn test_operator_groups_input_defaults() {
        let input: OperatorGroupsInput = serde_json::from_str("{}").unwrap();
        assert!(!input.archived);
        assert_eq!(input.page_size, 100);
        assert!(input.query.is_none());

        let params = OperatorGroupQuery::from(input);
        assert_eq!(params, OperatorGroupQuery::default());
    }

    #[test]
    fn test_operator_groups_input_explicit() {
        let json = r#"{"archived": true, "page_size": 10, "query": "groupName==Network"}"#;
        let input: OperatorGroupsInput = serde_json::from_str(json).unwrap();
        let params = OperatorGroupQuery::from(input);
        assert!(params.archived);
        assert_eq!(params.page_size, 10);
        assert_eq!(params.query.as_deref(), Some("groupName==Network"));
    }

    #[test]
    fn test_archive_person_reason_optional() {
        let input: ArchivePersonInput = serde_json::from_str(r#"{"person_id": "p-1"}"#).unwrap();
        assert!(input.reason_id.is_none());

        let json = r#"{"person_id": "p-1", "reason_id": "r-7"}"#;
        let input: ArchivePersonInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.reason_id.as_deref(), Some("r-7"));
    }

    #[test]
    fn test_update_person_requires_field_map() {
        let json = r#"{"person_id": "p-1", "updated_fields": "surName=Jansen"}"#;
        assert!(serde_json::from_str::<UpdatePersonInput>(json).is_err());
    }

    #[test]
    fn test_field_map_schema_is_object() {
        let schema = schemars::schema_for!(CreatePersonInput);
        let schema = serde_json::to_value(&schema).unwrap();
        assert_eq!(schema["properties"]["person"]["type"], "object");
    }
}
