//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, limits)
//!     → OPTIONS? → cors.rs (fixed preflight reply, nothing else runs)
//!     → request.rs (request ID, canonical headers, request URL)
//!     → identity + contract route + soft validation
//!     → integration (envelope → backend function → normalized reply)
//!     → response.rs (status, merged headers, body)
//!     → Send to client
//! ```

pub mod cors;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, GatewayServer};
