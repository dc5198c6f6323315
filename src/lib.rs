//! # topdesk-mcp
//!
//! An MCP (Model Context Protocol) server for the TOPdesk service management
//! REST API.
//!
//! It exposes TOPdesk incidents, operators, operator groups, and persons as
//! MCP tools, so AI assistants can work with TOPdesk tickets through natural
//! language.
//!
//! ## Features
//!
//! - **Incidents**: Fetch by UUID or incident number, FIQL search, create,
//!   archive, escalate, register time spent, and read the progress trail
//! - **Actions**: Add, list, and delete replies on an incident
//! - **Operators and persons**: Search, fetch, create, update, and archive
//! - **Guides**: A FIQL query guide and object schemas for the assistant
//! - **Security**: The TOPdesk password is never logged or exposed in error messages
//!
//! ## Architecture
//!
//! - [`config`] - Configuration loading from environment variables
//! - [`error`] - Error types with message sanitization
//! - [`api`] - The `TopdeskApi` trait the tools forward to
//! - [`topdesk_client`] - HTTP implementation of `TopdeskApi`
//! - [`resources`] - Bundled documentation served by the guide tools
//! - [`server`] - MCP server implementation with tool routing
//! - [`tools`] - Tool input parameter structs
//!
//! ## Configuration
//!
//! Required:
//! - `TOPDESK_URL`: Base URL of your TOPdesk instance
//! - `TOPDESK_USERNAME`: Operator login name
//! - `TOPDESK_PASSWORD`: Application password for that operator
//!
//! Optional:
//! - `TOPDESK_RESOURCES_DIR`: Directory holding the guide documents
//! - `RUST_LOG`: Log level (e.g., `topdesk_mcp=debug`)
//!
//! ## Example
//!
//! Using the [`TopdeskClient`](topdesk_client::TopdeskClient) directly:
//!
//! ```ignore
//! use topdesk_mcp::api::TopdeskApi;
//! use topdesk_mcp::config::Config;
//! use topdesk_mcp::topdesk_client::TopdeskClient;
//!
//! async fn example() -> Result<(), topdesk_mcp::error::TopdeskError> {
//!     let config = Config::from_env()?;
//!     let client = TopdeskClient::new(&config)?;
//!
//!     let open = client.list_incidents("closed==false").await?;
//!     println!("{} open incidents", open.len());
//!
//!     let incident = client.get_incident("I 2403 012").await?;
//!     println!("{}", incident["briefDescription"]);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod api;
pub mod config;
pub mod error;
pub mod resources;
pub mod server;
pub mod tools;
pub mod topdesk_client;
