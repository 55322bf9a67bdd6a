//! Port Check MCP - hardened port-owner lookup over stdio
//!
//! Ports are validated before any process starts, and lookups run as
//! argument vectors without a shell.

use portcheck_mcp::PortCheckMcpServer;

mcp_common::serve_stdio!(PortCheckMcpServer, "portcheck_mcp");
