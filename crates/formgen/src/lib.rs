//! Generate web form schemas from natural-language requests.
//!
//! `formgen` asks a generative model (Google Gemini by default) to describe a
//! form as JSON and then coerces whatever the model actually returned into
//! the canonical shape:
//!
//! ```json
//! {
//!   "title": "Contact",
//!   "fields": [
//!     {"label": "Email", "name": "email", "type": "email", "required": true, "meta": []}
//!   ]
//! }
//! ```
//!
//! The model is not trusted to follow instructions. Replies are sorted into a
//! handful of shapes by the [`Normalizer`] and every shape yields a
//! well-formed [`FormSchema`]. The only error a caller can see is an
//! [`UpstreamError`] from invoking the model itself.
//!
//! # Getting started
//!
//! ```ignore
//! use formgen::{FormGenerator, GeminiClient, ModelConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), String> {
//!     let _ = dotenvy::dotenv();
//!     let config = ModelConfig::from_env().map_err(|e| e.to_string())?;
//!     let client = GeminiClient::new(config).map_err(|e| e.to_string())?;
//!
//!     let form = FormGenerator::new(client)
//!         .generate("A job application form with a cover letter")
//!         .await
//!         .map_err(|e| e.to_string())?;
//!
//!     println!("{}", serde_json::to_string_pretty(&form).unwrap());
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`prompt`] | Instruction template wrapped around the caller's text |
//! | [`form`] | [`FormSchema`], [`FieldDescriptor`], and reply normalization |
//! | [`model`] | [`FormModel`] trait, [`FnModel`], [`FormGenerator`] |
//! | [`gemini`] | [`GeminiClient`] for the `generateContent` API |
//! | [`config`] | [`ModelConfig`] loaded from the environment |
//! | [`error`] | [`UpstreamError`] and [`ConfigError`] |

pub mod config;
pub mod error;
pub mod form;
pub mod gemini;
pub mod model;
pub mod prompt;

pub use config::ModelConfig;
pub use error::{ConfigError, UpstreamError};
pub use form::{
    DEFAULT_TITLE, FieldDescriptor, FieldType, FormSchema, Normalizer, ReplyShape, normalize,
};
pub use gemini::GeminiClient;
pub use model::{FnModel, FormGenerator, FormModel, ModelFuture};
pub use prompt::build_form_prompt;

/// Install the `tracing` subscriber used by the binaries.
///
/// Log level comes from `RUST_LOG`, defaulting to `info`. Output goes to
/// stderr so stdout stays clean for JSON.
pub fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
