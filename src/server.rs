//! MCP server implementation for TOPdesk.
//!
//! This module defines the `TopdeskServer` struct that implements the MCP
//! `ServerHandler` trait, exposing TOPdesk operations as tools.
//!
//! Every tool except the two documentation tools hands its arguments straight
//! to the [`TopdeskApi`] and returns the result as JSON text. Failures from
//! the API come back as tool errors carrying the error message. The
//! documentation tools never fail; a missing document becomes an error string.

use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ServerHandler,
};
use serde::Serialize;
use serde_json::Value;

use crate::api::{FieldMap, TopdeskApi};
use crate::error::TopdeskError;
use crate::resources::ResourceStore;
use crate::tools::{
    AddActionInput, ArchivePersonInput, CreateIncidentInput, CreatePersonInput, EscalationInput,
    FiqlQueryInput, IncidentActionInput, IncidentIdInput, OperatorGroupsInput, OperatorIdInput,
    PersonIdInput, RegisterTimeSpentInput, UpdatePersonInput,
};

/// The TOPdesk MCP server.
#[derive(Clone)]
pub struct TopdeskServer {
    /// TOPdesk API used by every forwarding tool.
    client: Arc<dyn TopdeskApi>,
    /// Bundled documentation.
    resources: ResourceStore,
    /// Value redacted from error messages (the TOPdesk password).
    secret: Arc<str>,
    /// Tool router for MCP tool dispatch.
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl TopdeskServer {
    /// Creates a new server forwarding to `client`.
    pub fn new(client: Arc<dyn TopdeskApi>, resources: ResourceStore) -> Self {
        Self {
            client,
            resources,
            secret: Arc::from(""),
            tool_router: Self::tool_router(),
        }
    }

    /// Sets a value that must be redacted from every error message.
    #[must_use]
    pub fn with_secret(mut self, secret: impl AsRef<str>) -> Self {
        self.secret = Arc::from(secret.as_ref());
        self
    }

    // ========================================================================
    // Hints and schemas
    // ========================================================================

    #[tool(description = "Get a hint on how to construct FIQL queries, with examples.")]
    fn get_fiql_query_howto(&self) -> String {
        tracing::debug!("get_fiql_query_howto tool called");
        self.resources.fiql_query_howto()
    }

    #[tool(description = "Get the full object schemas for TOPdesk incidents and all their subfields.")]
    fn get_object_schemas(&self) -> String {
        tracing::debug!("get_object_schemas tool called");
        self.resources.object_schemas()
    }

    // ========================================================================
    // Incidents
    // ========================================================================

    #[tool(description = "Get a TOPdesk incident by UUID or by Incident Number (I-xxxxxx-xxx). Both formats are accepted.")]
    async fn get_incident(
        &self,
        Parameters(input): Parameters<IncidentIdInput>,
    ) -> Result<String, String> {
        tracing::debug!(incident_id = %input.incident_id, "get_incident tool called");
        let result = self.client.get_incident(&input.incident_id).await;
        self.respond("get_incident", result)
    }

    #[tool(description = "Get TOPdesk incidents by FIQL query.")]
    async fn get_incidents_by_fiql_query(
        &self,
        Parameters(input): Parameters<FiqlQueryInput>,
    ) -> Result<String, String> {
        tracing::debug!(query = %input.query, "get_incidents_by_fiql_query tool called");
        let result = self.client.list_incidents(&input.query).await;
        self.respond("get_incidents_by_fiql_query", result)
    }

    #[tool(description = "Get all user requests on a TOPdesk incident.")]
    async fn get_incident_user_requests(
        &self,
        Parameters(input): Parameters<IncidentIdInput>,
    ) -> Result<String, String> {
        tracing::debug!(incident_id = %input.incident_id, "get_incident_user_requests tool called");
        let result = self.client.list_incident_requests(&input.incident_id).await;
        self.respond("get_incident_user_requests", result)
    }

    #[tool(description = "Create a new TOPdesk incident.")]
    async fn create_incident(
        &self,
        Parameters(input): Parameters<CreateIncidentInput>,
    ) -> Result<String, String> {
        tracing::debug!(
            caller_id = %input.caller_id,
            fields = input.incident_fields.len(),
            "create_incident tool called"
        );
        let result = self
            .client
            .create_incident(&input.caller_id, input.incident_fields)
            .await;
        self.respond("create_incident", result)
    }

    #[tool(description = "Archive a TOPdesk incident.")]
    async fn archive_incident(
        &self,
        Parameters(input): Parameters<IncidentIdInput>,
    ) -> Result<String, String> {
        tracing::debug!(incident_id = %input.incident_id, "archive_incident tool called");
        let result = self.client.archive_incident(&input.incident_id).await;
        self.respond("archive_incident", result)
    }

    #[tool(description = "Unarchive a TOPdesk incident.")]
    async fn unarchive_incident(
        &self,
        Parameters(input): Parameters<IncidentIdInput>,
    ) -> Result<String, String> {
        tracing::debug!(incident_id = %input.incident_id, "unarchive_incident tool called");
        let result = self.client.unarchive_incident(&input.incident_id).await;
        self.respond("unarchive_incident", result)
    }

    #[tool(description = "Get all time spent entries for a TOPdesk incident.")]
    async fn get_timespent_on_incident(
        &self,
        Parameters(input): Parameters<IncidentIdInput>,
    ) -> Result<String, String> {
        tracing::debug!(incident_id = %input.incident_id, "get_timespent_on_incident tool called");
        let result = self.client.list_time_spent(&input.incident_id).await;
        self.respond("get_timespent_on_incident", result)
    }

    #[tool(description = "Register time spent on a TOPdesk incident.")]
    async fn register_timespent_on_incident(
        &self,
        Parameters(input): Parameters<RegisterTimeSpentInput>,
    ) -> Result<String, String> {
        tracing::debug!(
            incident_id = %input.incident_id,
            time_spent = input.time_spent,
            "register_timespent_on_incident tool called"
        );
        let result = self
            .client
            .register_time_spent(&input.incident_id, input.time_spent)
            .await;
        self.respond("register_timespent_on_incident", result)
    }

    #[tool(description = "Escalate a TOPdesk incident.")]
    async fn escalate_incident(
        &self,
        Parameters(input): Parameters<EscalationInput>,
    ) -> Result<String, String> {
        tracing::debug!(incident_id = %input.incident_id, "escalate_incident tool called");
        let result = self
            .client
            .escalate_incident(&input.incident_id, &input.reason_id)
            .await;
        self.respond("escalate_incident", result)
    }

    #[tool(description = "Get all available escalation reasons for a TOPdesk incident.")]
    async fn get_available_escalation_reasons(&self) -> Result<String, String> {
        tracing::debug!("get_available_escalation_reasons tool called");
        let result = self.client.escalation_reasons().await;
        self.respond("get_available_escalation_reasons", result)
    }

    #[tool(description = "Get all available de-escalation reasons for a TOPdesk incident.")]
    async fn get_available_deescalation_reasons(&self) -> Result<String, String> {
        tracing::debug!("get_available_deescalation_reasons tool called");
        let result = self.client.deescalation_reasons().await;
        self.respond("get_available_deescalation_reasons", result)
    }

    #[tool(description = "De-escalate a TOPdesk incident.")]
    async fn deescalate_incident(
        &self,
        Parameters(input): Parameters<EscalationInput>,
    ) -> Result<String, String> {
        tracing::debug!(incident_id = %input.incident_id, "deescalate_incident tool called");
        let result = self
            .client
            .deescalate_incident(&input.incident_id, &input.reason_id)
            .await;
        self.respond("deescalate_incident", result)
    }

    #[tool(description = "Get the progress trail for a TOPdesk incident.")]
    async fn get_progress_trail(
        &self,
        Parameters(input): Parameters<IncidentIdInput>,
    ) -> Result<String, String> {
        tracing::debug!(incident_id = %input.incident_id, "get_progress_trail tool called");
        let result = self.client.progress_trail(&input.incident_id).await;
        self.respond("get_progress_trail", result)
    }

    // ========================================================================
    // Operators
    // ========================================================================

    #[tool(description = "Get a list of TOPdesk operator groups, optionally by FIQL query or leave blank to return all groups.")]
    async fn get_operatorgroups(
        &self,
        Parameters(input): Parameters<OperatorGroupsInput>,
    ) -> Result<String, String> {
        tracing::debug!(?input, "get_operatorgroups tool called");
        let result = self.client.list_operator_groups(input.into()).await;
        self.respond("get_operatorgroups", result)
    }

    #[tool(description = "Get a TOPdesk operator by ID.")]
    async fn get_operator(
        &self,
        Parameters(input): Parameters<OperatorIdInput>,
    ) -> Result<String, String> {
        tracing::debug!(operator_id = %input.operator_id, "get_operator tool called");
        let result = self.client.get_operator(&input.operator_id).await;
        self.respond("get_operator", result)
    }

    #[tool(description = "Get TOPdesk operators by FIQL query.")]
    async fn get_operators_by_fiql_query(
        &self,
        Parameters(input): Parameters<FiqlQueryInput>,
    ) -> Result<String, String> {
        tracing::debug!(query = %input.query, "get_operators_by_fiql_query tool called");
        let result = self.client.list_operators(&input.query).await;
        self.respond("get_operators_by_fiql_query", result)
    }

    // ========================================================================
    // Actions
    // ========================================================================

    #[tool(description = "Add an action (ie, reply/comment) to a TOPdesk incident.")]
    async fn add_action_to_incident(
        &self,
        Parameters(input): Parameters<AddActionInput>,
    ) -> Result<String, String> {
        tracing::debug!(incident_id = %input.incident_id, "add_action_to_incident tool called");
        let mut fields = FieldMap::new();
        fields.insert("action".to_string(), Value::String(input.text));
        let result = self.client.patch_incident(&input.incident_id, fields).await;
        self.respond("add_action_to_incident", result)
    }

    #[tool(description = "Get all actions (ie, replies/comments) for a TOPdesk incident.")]
    async fn get_incident_actions(
        &self,
        Parameters(input): Parameters<IncidentIdInput>,
    ) -> Result<String, String> {
        tracing::debug!(incident_id = %input.incident_id, "get_incident_actions tool called");
        let result = self.client.list_incident_actions(&input.incident_id).await;
        self.respond("get_incident_actions", result)
    }

    #[tool(description = "Delete a specific action (ie, reply/comment) for a TOPdesk incident.")]
    async fn delete_incident_action(
        &self,
        Parameters(input): Parameters<IncidentActionInput>,
    ) -> Result<String, String> {
        tracing::debug!(
            incident_id = %input.incident_id,
            action_id = %input.action_id,
            "delete_incident_action tool called"
        );
        let result = self
            .client
            .delete_incident_action(&input.incident_id, &input.action_id)
            .await;
        self.respond("delete_incident_action", result)
    }

    // ========================================================================
    // Persons
    // ========================================================================

    #[tool(description = "Get TOPdesk persons by FIQL query.")]
    async fn get_person_by_query(
        &self,
        Parameters(input): Parameters<FiqlQueryInput>,
    ) -> Result<String, String> {
        tracing::debug!(query = %input.query, "get_person_by_query tool called");
        let result = self.client.list_persons(&input.query).await;
        self.respond("get_person_by_query", result)
    }

    #[tool(description = "Get a TOPdesk person by ID.")]
    async fn get_person(
        &self,
        Parameters(input): Parameters<PersonIdInput>,
    ) -> Result<String, String> {
        tracing::debug!(person_id = %input.person_id, "get_person tool called");
        let result = self.client.get_person(&input.person_id).await;
        self.respond("get_person", result)
    }

    #[tool(description = "Create a new TOPdesk person.")]
    async fn create_person(
        &self,
        Parameters(input): Parameters<CreatePersonInput>,
    ) -> Result<String, String> {
        tracing::debug!(fields = input.person.len(), "create_person tool called");
        let result = self.client.create_person(input.person).await;
        self.respond("create_person", result)
    }

    #[tool(description = "Update an existing TOPdesk person.")]
    async fn update_person(
        &self,
        Parameters(input): Parameters<UpdatePersonInput>,
    ) -> Result<String, String> {
        tracing::debug!(person_id = %input.person_id, "update_person tool called");
        let result = self
            .client
            .update_person(&input.person_id, input.updated_fields)
            .await;
        self.respond("update_person", result)
    }

    #[tool(description = "Archive a TOPdesk person.")]
    async fn archive_person(
        &self,
        Parameters(input): Parameters<ArchivePersonInput>,
    ) -> Result<String, String> {
        tracing::debug!(person_id = %input.person_id, "archive_person tool called");
        let result = self
            .client
            .archive_person(&input.person_id, input.reason_id.as_deref())
            .await;
        self.respond("archive_person", result)
    }

    #[tool(description = "Unarchive a TOPdesk person.")]
    async fn unarchive_person(
        &self,
        Parameters(input): Parameters<PersonIdInput>,
    ) -> Result<String, String> {
        tracing::debug!(person_id = %input.person_id, "unarchive_person tool called");
        let result = self.client.unarchive_person(&input.person_id).await;
        self.respond("unarchive_person", result)
    }

    /// Turns a client result into tool output.
    ///
    /// Values are rendered as pretty JSON. Errors keep their message, with the
    /// secret redacted.
    fn respond<T: Serialize>(
        &self,
        tool: &str,
        result: Result<T, TopdeskError>,
    ) -> Result<String, String> {
        match result {
            Ok(value) => serde_json::to_string_pretty(&value)
                .map_err(|e| TopdeskError::from(e).to_string()),
            Err(e) => {
                let message = e.sanitized_display(&self.secret);
                tracing::error!(tool = tool, error = %message, "TOPdesk call failed");
                Err(message)
            }
        }
    }
}

#[tool_handler]
impl ServerHandler for TopdeskServer {
    /// Returns server information for the MCP initialize handshake.
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "This server gives access to a TOPdesk instance. \
                 Call get_fiql_query_howto before writing FIQL queries for the \
                 *_by_fiql_query and get_person_by_query tools, and \
                 get_object_schemas before building incident_fields, person or \
                 updated_fields maps. Incidents can be addressed by UUID or \
                 incident number."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
