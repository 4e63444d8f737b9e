use clap::Parser;
use review_sentiment::{
    config::{Config, CONFIG_PATH_ENV},
    ml::persistence::ArtifactStore,
    observability,
    shell::InferenceShell,
    Result,
};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sentiment-cli")]
#[command(about = "Classify movie reviews with a trained sentiment model", long_about = None)]
struct Cli {
    /// Configuration file layered over the built-in defaults
    #[arg(short, long, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,

    /// Directory holding tfidf_vectorizer.bin and sentiment_model.bin
    #[arg(short, long)]
    models_dir: Option<PathBuf>,

    /// Classify this review once and print the result as JSON
    #[arg(short, long)]
    text: Option<String>,
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.models_dir {
        config.paths.models_dir = dir;
    }

    observability::init_tracing(&config.observability)?;

    let store = ArtifactStore::new(&config.paths.models_dir);

    if let Some(text) = cli.text {
        let pipeline = store.load_pipeline()?;
        let prediction = pipeline.predict(&text)?;
        println!("{}", serde_json::to_string_pretty(&prediction)?);
        return Ok(());
    }

    println!("Loading model and vectorizer...");
    let pipeline = store.load_pipeline()?;
    println!("✓ Model loaded successfully!\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let summary = InferenceShell::new(&pipeline).run(stdin.lock(), &mut stdout)?;
    tracing::debug!(predictions = summary.predictions.len(), "Shell session finished");

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!(code = e.error_code(), "{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
