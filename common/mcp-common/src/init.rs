//! Server initialization utilities
//!
//! Provides standardized tracing setup and the `serve_stdio!` macro
//! for consistent MCP server initialization across all servers.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging for MCP servers
///
/// Logs go to stderr (stdout is reserved for MCP protocol). Environment:
///
/// - `RUST_LOG`: extra filter directives
/// - `LOG_LEVEL`: level for `crate_name` (default `info`)
/// - `LOG_FORMAT=json`: JSON lines on stderr instead of plain text
/// - `LOG_FILE`: also append JSON lines to this file
///
/// # Example
///
/// ```rust,ignore
/// mcp_common::init_tracing("portcheck_mcp")?;
/// ```
pub fn init_tracing(crate_name: &str) -> anyhow::Result<()> {
    let level = std::env::var("LOG_LEVEL").ok();
    let filter = build_filter(crate_name, level.as_deref())?;

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let file_layer = match std::env::var("LOG_FILE") {
        Ok(path) => {
            let file = open_log_file(Path::new(&path))?;
            Some(fmt::layer().json().with_writer(Mutex::new(file)))
        }
        Err(_) => None,
    };

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);

    if use_json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr).with_ansi(false))
            .init();
    }

    Ok(())
}

/// `RUST_LOG` directives plus `crate_name=<level>`, level defaulting to `info`
fn build_filter(crate_name: &str, level: Option<&str>) -> anyhow::Result<EnvFilter> {
    let directive = format!("{}={}", crate_name, level.unwrap_or("info"));
    let directive: Directive = directive
        .parse()
        .with_context(|| format!("invalid LOG_LEVEL directive {}", directive))?;
    Ok(EnvFilter::from_default_env().add_directive(directive))
}

/// Open `path` for appending, creating missing parent directories
fn open_log_file(path: &Path) -> anyhow::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening LOG_FILE {}", path.display()))
}

/// Macro for standardized MCP server initialization
///
/// Expands to a `#[tokio::main] async fn main()` that:
/// 1. Initializes tracing to stderr
/// 2. Creates the server with `::new()`
/// 3. Serves via stdio transport
/// 4. Waits for shutdown
///
/// # Example
///
/// ```rust,ignore
/// use portcheck_mcp::PortCheckMcpServer;
///
/// mcp_common::serve_stdio!(PortCheckMcpServer, "portcheck_mcp");
/// ```
#[macro_export]
macro_rules! serve_stdio {
    ($server_type:ty, $crate_name:expr) => {
        #[tokio::main]
        async fn main() -> anyhow::Result<()> {
            use rmcp::ServiceExt;

            $crate::init_tracing($crate_name)?;

            tracing::info!(server = stringify!($server_type), "Starting MCP server");

            let server = <$server_type>::new();
            let service = server.serve(rmcp::transport::stdio()).await?;

            tracing::info!("Server running, waiting for requests...");

            service.waiting().await?;

            tracing::info!("Server shutting down");
            Ok(())
        }
    };
}
