use mcp_tool_server::{build_app, config::Config, logging, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging();

    let config = Config::from_env()?;
    let state = AppState::with_builtin_tools(config.tool_timeout)?;
    let tool_count = state.tools.len();
    let bind_socket = config.bind_socket()?;
    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(bind_socket).await?;

    info!(
        bind_addr = %config.bind_addr,
        bind_port = config.bind_port,
        tools = tool_count,
        tool_timeout_secs = config.tool_timeout.map(|limit| limit.as_secs()),
        "server starting"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
