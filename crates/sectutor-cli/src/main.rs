//! sectutor CLI — interactive cybersecurity study assistant.

use std::io::{self, Write};
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use sectutor_core::progress::ProgressStore;
use sectutor_core::session::{write_banner, StudySession};
use sectutor_providers::{create_provider, load_config, SectutorConfig};

#[derive(Parser)]
#[command(
    name = "sectutor",
    version,
    about = "Cybersecurity study assistant: explanations, quizzes, and progress tracking"
)]
struct Cli {}

/// Logs share the terminal with the session, so only errors show unless
/// `RUST_LOG` asks for more.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn build_session() -> anyhow::Result<StudySession> {
    let config: SectutorConfig = load_config()?;
    tracing::debug!(?config, "configuration loaded");

    let provider = create_provider(&config)?;
    let store = ProgressStore::load(&config.progress_file);
    tracing::debug!(path = %store.path().display(), "progress loaded");

    Ok(StudySession::new(
        provider,
        config.generation_settings(),
        config.questions_per_quiz,
        store,
    ))
}

fn report_configuration_error(e: &anyhow::Error) {
    eprintln!("\n❌ Configuration Error: {e:#}");
    eprintln!("\nPlease check:");
    eprintln!("  1. GOOGLE_API_KEY is set in your shell or a .env file (or api_key in sectutor.toml)");
    eprintln!("  2. sectutor.toml, if present, is valid TOML");
    eprintln!("  3. The API key is valid (get one at: https://aistudio.google.com/app/apikey)");
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();
    let _cli = Cli::parse();

    let mut session = match build_session() {
        Ok(session) => session,
        Err(e) => {
            report_configuration_error(&e);
            process::exit(1);
        }
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut input = stdin.lock();
    let mut output = stdout.lock();

    let result = match write_banner(&mut output) {
        Ok(()) => session.run(&mut input, &mut output).await,
        Err(e) => Err(e),
    };
    let _ = output.flush();

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
