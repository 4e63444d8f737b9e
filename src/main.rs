use clap::Parser;
use review_sentiment::{
    config::{Config, CONFIG_PATH_ENV},
    error::AppError,
    observability,
    training::{report::format_sample_prediction, TrainingOrchestrator},
    Result,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sentiment-train")]
#[command(about = "Train the review sentiment classifier", long_about = None)]
struct Cli {
    /// Configuration file layered over the built-in defaults
    #[arg(short, long, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,

    /// aclImdb directory tree (train/ and test/ with pos/ and neg/)
    #[arg(short, long, conflicts_with_all = ["train_file", "test_file"])]
    dataset_dir: Option<PathBuf>,

    /// JSON-lines training split
    #[arg(long, requires = "test_file")]
    train_file: Option<PathBuf>,

    /// JSON-lines test split
    #[arg(long, requires = "train_file")]
    test_file: Option<PathBuf>,

    /// Output directory for the fitted artifacts
    #[arg(short, long)]
    models_dir: Option<PathBuf>,

    /// Output directory for the reports
    #[arg(short, long)]
    results_dir: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    /// Command-line flags win over loaded configuration
    fn apply(self, config: &mut Config) {
        if let Some(dir) = self.dataset_dir {
            config.dataset.dir = Some(dir);
            config.dataset.train_file = None;
            config.dataset.test_file = None;
        }
        if let (Some(train), Some(test)) = (self.train_file, self.test_file) {
            config.dataset.dir = None;
            config.dataset.train_file = Some(train);
            config.dataset.test_file = Some(test);
        }
        if let Some(dir) = self.models_dir {
            config.paths.models_dir = dir;
        }
        if let Some(dir) = self.results_dir {
            config.paths.results_dir = dir;
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    let print_config = cli.print_config;
    cli.apply(&mut config);

    if print_config {
        let rendered = toml::to_string_pretty(&config)
            .map_err(|e| AppError::Serialization(e.to_string()))?;
        print!("{}", rendered);
        return Ok(());
    }

    observability::init_tracing(&config.observability)?;
    tracing::info!("Starting sentiment-train v{}", env!("CARGO_PKG_VERSION"));

    let rule = "=".repeat(80);
    println!("{rule}");
    println!("{} Sentiment Analysis Model Training", config.dataset.title);
    println!("{rule}");

    let source = config.dataset.source()?;
    let mut orchestrator = TrainingOrchestrator::from_config(config, source);
    let outcome = orchestrator.run()?;

    println!("\n{}", outcome.report.summary());
    println!("✓ Model saved to: {}", outcome.artifacts.model.display());
    println!("✓ Vectorizer saved to: {}", outcome.artifacts.vectorizer.display());
    println!("✓ Results saved to: {}", outcome.results_path.display());
    println!(
        "✓ Classification report saved to: {}",
        outcome.classification_report_path.display()
    );

    let rule50 = "=".repeat(50);
    println!("\n{rule50}\nSAMPLE PREDICTIONS\n{rule50}");
    for (i, prediction) in outcome.sample_predictions.iter().enumerate() {
        println!("\n{}", format_sample_prediction(i + 1, prediction));
    }

    println!("\n{rule}");
    println!("✓ Training pipeline completed successfully!");
    println!("{rule}\n");

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
