//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all gateway handler
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Short-circuit CORS preflight requests
//! - Resolve identity and route, soft-validate, build the envelope
//! - Invoke the backend function once and translate its reply
//! - Fall back to a fixed 502 when no usable reply comes back

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::contract::params::decode_path_value;
use crate::contract::{ContractStore, RequestView};
use crate::http::{cors, request};
use crate::identity::{IdentityResolver, MockIdentity};
use crate::integration::{BackendInvoker, InboundRequest, InvocationEnvelope, InvocationResponse};
use crate::lifecycle::shutdown::wait_for_shutdown;
use crate::observability::metrics;

/// Application state injected into handlers. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub contract: Arc<ContractStore>,
    pub identity: Arc<dyn IdentityResolver>,
    pub invoker: BackendInvoker,
    pub max_body_bytes: usize,
}

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Create a server using the configured mock identity table.
    pub fn new(config: GatewayConfig, contract: ContractStore) -> Result<Self, reqwest::Error> {
        let identity = Arc::new(MockIdentity::new(&config.identity));
        Self::with_identity(config, contract, identity)
    }

    /// Create a server with a custom identity resolver.
    pub fn with_identity(
        config: GatewayConfig,
        contract: ContractStore,
        identity: Arc<dyn IdentityResolver>,
    ) -> Result<Self, reqwest::Error> {
        let invoker = BackendInvoker::new(&config.backend)?;
        tracing::info!(url = %invoker.url(), "Backend function configured");

        let state = AppState {
            contract: Arc::new(contract),
            identity,
            invoker,
            max_body_bytes: config.listener.max_body_bytes,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        // The limit layer must wrap the timeout layer: the timeout builds
        // its own response body and needs one with a Default impl.
        let layers = ServiceBuilder::new()
            .layer(middleware::from_fn(request::mark_generated_request_id))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(RequestBodyLimitLayer::new(config.listener.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.listener.request_timeout_secs,
            )));

        Router::new()
            .route("/{*path}", any(gateway_handler))
            .route("/", any(gateway_handler))
            .with_state(state)
            .layer(layers)
    }

    /// Run the server until the shutdown receiver fires or the process is
    /// signalled, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for_shutdown(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Catch-all handler: one inbound request, at most one backend invocation.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let method_str = method.to_string();

    if method == Method::OPTIONS {
        metrics::record_request(&method_str, StatusCode::OK.as_u16(), start_time);
        return cors::preflight_response();
    }

    let (mut parts, body) = request.into_parts();
    let request_id = request::request_id(&parts.headers);
    if parts.extensions.get::<request::GeneratedRequestId>().is_some() {
        parts.headers.remove(request::X_REQUEST_ID);
    }
    let path = decode_path_value(parts.uri.path());

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Dispatching request"
    );

    let claim = state.identity.resolve(&parts.headers);

    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Failed to read request body");
            metrics::record_request(&method_str, StatusCode::PAYLOAD_TOO_LARGE.as_u16(), start_time);
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
    };

    let route = state.contract.route(&path, parts.uri.query());
    let headers = request::header_parameters(&parts.headers);
    let url = request::request_url(&parts.headers, &path);

    let violations = state.contract.validate(
        &route,
        RequestView {
            method: &method_str,
            url: url.as_deref(),
            headers: &headers,
        },
    );
    for violation in &violations {
        tracing::warn!(
            request_id = %request_id,
            resource = %route.resource,
            violation = %violation,
            "Request does not conform to contract"
        );
    }
    metrics::record_contract_violations(violations.len());

    let inbound = InboundRequest {
        path,
        method: method_str.clone(),
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    };
    let envelope = InvocationEnvelope::build(&route, &inbound, claim);

    let response = match state.invoker.invoke(&envelope).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(
                request_id = %request_id,
                reason = e.reason(),
                error = %e,
                "Invalid response received from backend function, returning 502"
            );
            metrics::record_backend_failure(e.reason());
            InvocationResponse::bad_gateway()
        }
    };

    tracing::debug!(
        request_id = %request_id,
        resource = %route.resource,
        status = response.status_code,
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "Request completed"
    );
    metrics::record_request(&method_str, response.status_code, start_time);

    response.into_response()
}
