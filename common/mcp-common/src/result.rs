//! Result helpers for MCP tool responses
//!
//! Tools in this workspace report rejections as error *results* rather than
//! protocol errors, so both helpers build a single text content item.

use rmcp::model::{CallToolResult, Content};

/// Create a successful plain text response
///
/// # Example
///
/// ```rust,ignore
/// use mcp_common::text_success;
///
/// fn my_tool(&self) -> CallToolResult {
///     text_success("Operation completed successfully")
/// }
/// ```
pub fn text_success(text: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text.into())])
}

/// Create a plain text response flagged with `is_error`
///
/// Use this when the tool ran but refused or failed the request. The caller
/// gets a readable reason instead of a transport-level fault.
pub fn text_error(text: impl Into<String>) -> CallToolResult {
    CallToolResult::error(vec![Content::text(text.into())])
}
