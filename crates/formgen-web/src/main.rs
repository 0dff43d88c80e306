//! Form generation server.
//!
//! # Usage
//!
//! ```bash
//! GEMINI_API_KEY=... cargo run -p formgen-web
//! GEMINI_API_KEY=... cargo run -p formgen-web -- --port 8080 --strip-fences
//! GEMINI_API_KEY=... cargo run -p formgen-web -- --static-dir frontend/dist
//! ```
//!
//! The key may also live in a `.env` file in the working directory.
//!
//! ```bash
//! curl -s localhost:8000/generate-form \
//!   -H 'content-type: application/json' \
//!   -d '{"prompt": "A contact form with name, email and message"}'
//! ```

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;
use formgen::{FormGenerator, GeminiClient, ModelConfig, Normalizer};
use formgen_web::{WebConfig, build_router, run_server};
use tracing::info;

/// Serve `POST /generate-form` backed by Gemini.
#[derive(Parser)]
#[command(about = "HTTP endpoint that turns prompts into web form schemas")]
struct Args {
    /// Interface to bind.
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to listen on.
    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// Gemini model id (overrides GEMINI_MODEL).
    #[arg(long)]
    model: Option<String>,

    /// Model request timeout in seconds (overrides GEMINI_TIMEOUT_SECONDS).
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Ask the model for application/json output.
    #[arg(long)]
    json_mode: bool,

    /// Strip a markdown code fence around model replies before parsing.
    #[arg(long)]
    strip_fences: bool,

    /// Serve a built frontend from this directory.
    #[arg(long)]
    static_dir: Option<PathBuf>,
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let _ = dotenvy::dotenv();
    formgen::init_tracing();

    let args = Args::parse();

    // 1. Load the model credential. A missing key is fatal at startup.
    let mut model_config = ModelConfig::from_env().map_err(|e| e.to_string())?;
    if let Some(model) = args.model {
        model_config = model_config.with_model(model);
    }
    if let Some(secs) = args.timeout_secs {
        model_config = model_config.with_timeout(secs);
    }
    model_config = model_config.with_json_mode(args.json_mode);
    info!(
        model = %model_config.model,
        timeout_seconds = model_config.timeout_seconds,
        json_mode = model_config.json_mode,
        strip_fences = args.strip_fences,
        "model configured"
    );

    // 2. Build the generator shared by every request.
    let client = GeminiClient::new(model_config).map_err(|e| e.to_string())?;
    let generator = FormGenerator::new(client)
        .with_normalizer(Normalizer::new().with_fence_stripping(args.strip_fences));

    // 3. Serve until Ctrl-C.
    let web_config = WebConfig {
        bind_addr: (args.host, args.port).into(),
        static_dir: args.static_dir,
    };
    let router = build_router(generator, web_config.static_dir);
    run_server(router, web_config.bind_addr, shutdown_signal())
        .await
        .map_err(|e| format!("server error: {e}"))
}
