//! Startup KPI dashboard: business metrics over HTTP and MCP.
//!
//! The core is an immutable in-memory metrics table plus pure query and
//! analytics functions. Two thin transport adapters sit on top:
//!
//! 1. **HTTP API** (`server` module) - serves the dataset, single metrics,
//!    and derived trend insights.
//!
//! 2. **MCP server** (`mcp` module) - exposes the same data as callable
//!    tools for an LLM agent, querying the HTTP API with a local fallback
//!    dataset when it is unreachable.
//!
//! ## Usage
//!
//! Run the HTTP API:
//!
//! ```bash
//! kpi-dashboard --port 8000
//! ```
//!
//! Run the MCP server (stdio transport):
//!
//! ```bash
//! mcp-kpi-server --api-url http://127.0.0.1:8000
//! ```

pub mod analytics;
pub mod error;
pub mod mcp;
pub mod query;
pub mod server;
pub mod store;
