//! MCP tool inputs for the TOPdesk server.
//!
//! This module contains the parameter types of the MCP tools that expose
//! TOPdesk operations.

mod inputs;

pub use inputs::*;
