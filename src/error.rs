//! Error kinds shared by the query service and transport adapters.

/// Error types for query operations.
///
/// An unknown metric identifier is a caller error: the HTTP adapter maps
/// it to 404 and the MCP adapter to a tool error payload. Nothing here is
/// fatal to the process.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Metric '{metric}' not found")]
    MetricNotFound { metric: String },
}
