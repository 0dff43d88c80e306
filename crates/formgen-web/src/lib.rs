//! HTTP endpoint for formgen.
//!
//! `formgen-web` exposes a single axum route, `POST /generate-form`, that
//! turns `{"prompt": "..."}` into a form schema using a
//! [`FormGenerator`](formgen::FormGenerator). CORS is fully open so a browser
//! frontend on any origin can call it.
//!
//! # Quick start
//!
//! ```ignore
//! use formgen::{FormGenerator, GeminiClient, ModelConfig};
//! use formgen_web::{WebConfig, spawn_web};
//!
//! let client = GeminiClient::new(ModelConfig::from_env()?)?;
//! let addr = spawn_web(FormGenerator::new(client), WebConfig::default()).await?;
//! println!("POST http://{addr}/generate-form");
//! ```
//!
//! # Responses
//!
//! | Outcome | Status | Body |
//! |---------|--------|------|
//! | Model answered (any text) | 200 | `{"title": ..., "fields": [...]}` |
//! | Body missing `prompt` | 4xx | axum JSON rejection |
//! | Model unreachable / API error | 502 | `{"error": ..., "kind": ...}` |
//! | Model rate limited | 503 | `{"error": ..., "kind": "rate_limited"}` |
//! | Model timed out | 504 | `{"error": ..., "kind": "timeout"}` |

mod api;
mod server;

pub use api::{ErrorBody, PromptRequest};
pub use server::{build_router, run_server, start_server};

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use formgen::FormGenerator;

/// Configuration for the web server.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Address to bind to. Default: `127.0.0.1:8000`.
    pub bind_addr: SocketAddr,
    /// Directory with a built frontend to serve for non-API paths.
    ///
    /// If `None`, only `/generate-form` is served.
    pub static_dir: Option<PathBuf>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            static_dir: None,
        }
    }
}

/// Spawn the web server on a Tokio task and return the bound address.
///
/// The server runs until the Tokio runtime shuts down.
pub async fn spawn_web(generator: FormGenerator, config: WebConfig) -> io::Result<SocketAddr> {
    let router = build_router(generator, config.static_dir);
    start_server(router, config.bind_addr).await
}
