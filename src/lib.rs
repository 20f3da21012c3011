use std::{sync::Arc, time::Duration};

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

pub mod config;
pub mod connections;
pub mod domain;
pub mod errors;
pub mod http;
pub mod logging;
pub mod mcp;

use connections::ConnectionRegistry;
use domain::registry::{RegistryError, ToolRegistry};

#[derive(Clone)]
pub struct AppState {
    pub tools: Arc<ToolRegistry>,
    pub connections: ConnectionRegistry,
    pub tool_timeout: Option<Duration>,
}

impl AppState {
    pub fn new(tools: Arc<ToolRegistry>, tool_timeout: Option<Duration>) -> Self {
        Self {
            tools,
            connections: ConnectionRegistry::new(),
            tool_timeout,
        }
    }

    pub fn with_builtin_tools(tool_timeout: Option<Duration>) -> Result<Self, RegistryError> {
        let http_client = domain::tools::web::http_client()
            .map_err(|err| RegistryError::HttpClient(err.to_string()))?;
        let registry = ToolRegistry::with_builtin_tools(http_client)?;
        Ok(Self::new(Arc::new(registry), tool_timeout))
    }
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(http::handlers::discovery))
        .route("/health", get(http::handlers::health))
        .route("/connections", get(http::handlers::connections))
        .route("/tools", get(http::handlers::list_tools))
        .route("/tools/call", post(http::handlers::call_tool))
        .route(
            "/mcp",
            get(http::handlers::mcp_websocket).post(http::handlers::mcp_endpoint),
        )
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(logging::request_logging_middleware))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use futures_util::{SinkExt, StreamExt};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tokio_tungstenite::{connect_async, tungstenite::Message};
    use tower::ServiceExt;

    use super::*;

    fn state() -> AppState {
        AppState::with_builtin_tools(None).expect("builtin tools register")
    }

    fn app() -> Router {
        build_app(state())
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let body = response
            .into_body()
            .collect()
            .await
            .expect("collect body")
            .to_bytes();
        serde_json::from_slice(&body).expect("valid json response")
    }

    async fn post_json(uri: &str, body: &str) -> axum::response::Response {
        app()
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .method("POST")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request build"),
            )
            .await
            .expect("request execution")
    }

    async fn get_request(uri: &str) -> axum::response::Response {
        app()
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .method("GET")
                    .body(Body::empty())
                    .expect("request build"),
            )
            .await
            .expect("request execution")
    }

    #[tokio::test]
    async fn health_reports_connection_count() {
        let response = get_request("/health").await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = response
            .into_body()
            .collect()
            .await
            .expect("collect body")
            .to_bytes();
        assert_eq!(body, "{\"status\":\"healthy\",\"active_connections\":0}");
    }

    #[tokio::test]
    async fn discovery_is_served_at_root() {
        let response = get_request("/").await;

        assert_eq!(response.status(), StatusCode::OK);
        let body_json = body_json(response).await;
        assert_eq!(body_json["mcp_endpoint"], "/mcp");
        assert_eq!(body_json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn tools_route_lists_registry() {
        let response = get_request("/tools").await;

        assert_eq!(response.status(), StatusCode::OK);
        let body_json = body_json(response).await;
        let tools = body_json["tools"].as_array().expect("tools array");
        assert_eq!(tools.len(), 21);
        assert_eq!(tools[0]["name"], "echo");
        assert_eq!(tools[20]["name"], "make_request");
        assert_eq!(
            tools[20]["inputSchema"]["properties"]["method"]["default"],
            "GET"
        );
    }

    #[tokio::test]
    async fn stateless_call_returns_raw_result() {
        let response = post_json(
            "/tools/call",
            r#"{"name":"list_directory","arguments":{"path":"src"}}"#,
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body_json = body_json(response).await;
        assert_eq!(body_json["result"]["path"], "src");
        assert!(body_json["result"]["items"]
            .as_array()
            .expect("items array")
            .contains(&json!("lib.rs")));
    }

    #[tokio::test]
    async fn stateless_call_without_arguments_uses_defaults() {
        let response = post_json("/tools/call", r#"{"name":"add"}"#).await;

        let body_json = body_json(response).await;
        assert_eq!(body_json, json!({"result": 0}));
    }

    #[tokio::test]
    async fn stateless_call_reports_unknown_tool() {
        let response = post_json("/tools/call", r#"{"name":"nonexistent"}"#).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body_json = body_json(response).await;
        assert_eq!(body_json, json!({"error": "Tool 'nonexistent' not found"}));
    }

    #[tokio::test]
    async fn stateless_call_reports_tool_failure() {
        let response = post_json(
            "/tools/call",
            r#"{"name":"sqrt","arguments":{"number":-4}}"#,
        )
        .await;

        let body_json = body_json(response).await;
        assert_eq!(
            body_json,
            json!({"error": "Cannot calculate square root of negative number"})
        );
    }

    #[tokio::test]
    async fn stateless_call_rejects_malformed_body() {
        let response = post_json("/tools/call", r#"{"arguments":{}}"#).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body_json = body_json(response).await;
        assert_eq!(body_json["code"], "invalid_tool_call");
    }

    #[tokio::test]
    async fn mcp_post_dispatches_json_rpc() {
        let response = post_json(
            "/mcp",
            r#"{"jsonrpc":"2.0","id":"1","method":"tools/call","params":{"name":"add","arguments":{"a":2,"b":3}}}"#,
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body_json = body_json(response).await;
        assert_eq!(
            body_json,
            json!({"jsonrpc":"2.0","id":"1","result":{"content":[{"type":"text","text":"5"}]}})
        );
    }

    #[tokio::test]
    async fn mcp_post_reports_parse_errors() {
        let response = post_json("/mcp", "not json at all").await;

        let body_json = body_json(response).await;
        assert_eq!(body_json["id"], "unknown");
        assert_eq!(body_json["error"]["code"], -32700);
    }

    #[tokio::test]
    async fn mcp_post_rejects_invalid_utf8() {
        let mut body = br#"{"jsonrpc":"2.0","id":""#.to_vec();
        body.push(0xff);
        body.extend_from_slice(br#"","method":"tools/list"}"#);

        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/mcp")
                    .method("POST")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .expect("request build"),
            )
            .await
            .expect("request execution");

        assert_eq!(response.status(), StatusCode::OK);
        let body_json = body_json(response).await;
        assert_eq!(body_json["id"], "unknown");
        assert_eq!(body_json["error"]["code"], -32700);
        assert!(body_json.get("result").is_none());
    }

    #[tokio::test]
    async fn connections_route_starts_empty() {
        let response = get_request("/connections").await;

        assert_eq!(response.status(), StatusCode::OK);
        let body_json = body_json(response).await;
        assert_eq!(body_json, json!({"count": 0, "connections": []}));
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let response = get_request("/services").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    async fn serve(state: AppState) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let app = build_app(state);
        tokio::spawn(async move {
            axum::serve(listener, app.into_make_service())
                .await
                .expect("server runs");
        });
        addr
    }

    type Client = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    async fn exchange(socket: &mut Client, frame: &str) -> Value {
        socket
            .send(Message::Text(frame.to_string()))
            .await
            .expect("send frame");
        loop {
            match socket.next().await.expect("open socket").expect("frame") {
                Message::Text(text) => {
                    return serde_json::from_str(&text).expect("json response")
                }
                Message::Ping(_) | Message::Pong(_) => continue,
                other => panic!("unexpected frame: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn websocket_sessions_are_independent_and_tracked() {
        let state = state();
        let addr = serve(state.clone()).await;
        let url = format!("ws://{addr}/mcp");

        let (mut first, _) = connect_async(url.as_str()).await.expect("first connect");
        let (mut second, _) = connect_async(url.as_str()).await.expect("second connect");

        let list = r#"{"jsonrpc":"2.0","id":"list","method":"tools/list"}"#;
        let (first_list, second_list) =
            tokio::join!(exchange(&mut first, list), exchange(&mut second, list));
        assert_eq!(first_list, second_list);
        assert_eq!(
            first_list["result"]["tools"]
                .as_array()
                .expect("tools array")
                .len(),
            21
        );
        assert_eq!(state.connections.len(), 2);

        let listed = body_json(
            build_app(state.clone())
                .oneshot(
                    Request::builder()
                        .uri("/connections")
                        .body(Body::empty())
                        .expect("request build"),
                )
                .await
                .expect("request execution"),
        )
        .await;
        assert_eq!(listed["count"], 2);
        let ids = listed["connections"]
            .as_array()
            .expect("connections array")
            .iter()
            .map(|entry| entry["id"].as_str().expect("id string").to_string())
            .collect::<Vec<_>>();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);

        let parse_error = exchange(&mut first, "{broken").await;
        assert_eq!(parse_error["id"], "unknown");
        assert_eq!(parse_error["error"]["code"], -32700);

        let sum = exchange(
            &mut first,
            r#"{"jsonrpc":"2.0","id":"1","method":"tools/call","params":{"name":"add","arguments":{"a":2,"b":3}}}"#,
        )
        .await;
        assert_eq!(
            sum,
            json!({"jsonrpc":"2.0","id":"1","result":{"content":[{"type":"text","text":"5"}]}})
        );

        first.close(None).await.expect("close first");
        second.close(None).await.expect("close second");

        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while !state.connections.is_empty() {
            assert!(
                tokio::time::Instant::now() < deadline,
                "sessions were not unregistered"
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}
