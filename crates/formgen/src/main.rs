//! Generate a form schema from the command line and print it as JSON.
//!
//! Reads the API key from `GEMINI_API_KEY` (a `.env` file in the working
//! directory is honoured).
//!
//! # Examples
//!
//! ```sh
//! # Ask the model
//! formgen --prompt "A conference registration form with dietary needs"
//!
//! # Pipe the request from stdin, print a readable summary
//! echo "Bug report form" | formgen --stdin --summary
//!
//! # Skip the model: normalize a reply you already have
//! formgen --raw-reply reply.txt --strip-fences
//! cat reply.txt | formgen --raw-reply -
//! ```

use std::io::{self, Read};
use std::process;

use clap::Parser;
use formgen::{FnModel, FormGenerator, FormSchema, GeminiClient, ModelConfig, Normalizer};

/// Generate a web form schema from a natural-language request.
#[derive(Parser)]
#[command(name = "formgen")]
struct Cli {
    // ── Input ──────────────────────────────────────────────────
    /// Form request to send to the model
    #[arg(long)]
    prompt: Option<String>,

    /// Read the form request from stdin
    #[arg(long)]
    stdin: bool,

    /// Normalize an existing model reply instead of calling the model
    /// (file path, or `-` for stdin)
    #[arg(long, value_name = "PATH", conflicts_with_all = ["prompt", "stdin"])]
    raw_reply: Option<String>,

    // ── Model ──────────────────────────────────────────────────
    /// Gemini model id (overrides GEMINI_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Request timeout in seconds (overrides GEMINI_TIMEOUT_SECONDS)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Ask the model for application/json output
    #[arg(long)]
    json_mode: bool,

    // ── Normalization / output ─────────────────────────────────
    /// Strip a markdown code fence around the reply before parsing
    #[arg(long)]
    strip_fences: bool,

    /// Print a human-readable field list instead of JSON
    #[arg(long)]
    summary: bool,

    /// Print compact JSON
    #[arg(long, conflicts_with = "summary")]
    compact: bool,
}

fn read_stdin_content() -> Result<String, String> {
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .map_err(|e| format!("failed to read stdin: {e}"))?;
    Ok(buf)
}

fn build_user_prompt(cli: &Cli) -> Result<String, String> {
    let stdin_text = if cli.stdin {
        Some(read_stdin_content()?)
    } else {
        None
    };

    match (&cli.prompt, stdin_text) {
        (Some(msg), Some(piped)) => Ok(format!("{msg}\n\n{piped}")),
        (Some(msg), None) => Ok(msg.clone()),
        (None, Some(piped)) => Ok(piped),
        (None, None) => Err("provide --prompt, --stdin, or --raw-reply".to_string()),
    }
}

fn read_raw_reply(path: &str) -> Result<String, String> {
    if path == "-" {
        read_stdin_content()
    } else {
        std::fs::read_to_string(path).map_err(|e| format!("failed to read '{path}': {e}"))
    }
}

fn build_generator(cli: &Cli) -> Result<(FormGenerator, String), String> {
    let normalizer = Normalizer::new().with_fence_stripping(cli.strip_fences);

    if let Some(path) = &cli.raw_reply {
        let reply = read_raw_reply(path)?;
        let generator = FormGenerator::new(FnModel::constant(reply)).with_normalizer(normalizer);
        return Ok((generator, String::new()));
    }

    let user_prompt = build_user_prompt(cli)?;

    let mut config = ModelConfig::from_env().map_err(|e| e.to_string())?;
    if let Some(model) = &cli.model {
        config = config.with_model(model);
    }
    if let Some(secs) = cli.timeout_secs {
        config = config.with_timeout(secs);
    }
    config = config.with_json_mode(cli.json_mode);

    let client = GeminiClient::new(config).map_err(|e| e.to_string())?;
    Ok((
        FormGenerator::new(client).with_normalizer(normalizer),
        user_prompt,
    ))
}

fn render_summary(form: &FormSchema) -> String {
    let mut out = format!("{}\n", form.display_title());
    let fields = form.descriptors();
    if fields.is_empty() {
        out.push_str("  (no fields)\n");
    }
    for field in fields {
        let required = if field.required { " *" } else { "" };
        out.push_str(&format!(
            "  - {} [{}] ({}){required}\n",
            field.label, field.name, field.field_type
        ));
        if !field.meta.is_empty() {
            out.push_str(&format!("      {}\n", field.meta.join("; ")));
        }
    }
    out
}

async fn run(cli: &Cli) -> Result<String, String> {
    let (generator, user_prompt) = build_generator(cli)?;

    let form = generator
        .generate(&user_prompt)
        .await
        .map_err(|e| e.to_string())?;

    if cli.summary {
        return Ok(render_summary(&form));
    }

    let json = if cli.compact {
        serde_json::to_string(&form)
    } else {
        serde_json::to_string_pretty(&form)
    };
    json.map(|s| format!("{s}\n"))
        .map_err(|e| format!("failed to serialize form: {e}"))
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    formgen::init_tracing();

    let cli = Cli::parse();

    match run(&cli).await {
        Ok(output) => print!("{output}"),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
