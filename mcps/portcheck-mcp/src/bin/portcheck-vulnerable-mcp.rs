//! Port Check MCP (vulnerable) - negative control for injection demos
//!
//! Interpolates raw tool arguments into shell command lines. Never deploy it.

use portcheck_mcp::VulnerablePortCheckMcpServer;

mcp_common::serve_stdio!(VulnerablePortCheckMcpServer, "portcheck_mcp");
