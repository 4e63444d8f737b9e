//! Interactive inference loop.
//!
//! The shell reads one review per line, classifies it with a loaded
//! [`SentimentPipeline`] and prints the sentiment with its probabilities.
//! It works over any `BufRead`/`Write` pair so it can be driven from tests.

use std::io::{BufRead, Write};

use tracing::debug;

use crate::error::Result;
use crate::ml::models::PredictionResult;
use crate::ml::pipeline::SentimentPipeline;

const EXIT_COMMANDS: [&str; 3] = ["quit", "exit", "q"];

/// Lifecycle of a shell session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellState {
    /// Artifacts loaded, loop not started
    Ready,
    /// Waiting for the next line
    AwaitingInput,
    /// Exit command or end of input seen
    Terminated,
}

/// Meaning of one input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellInput<'a> {
    Exit,
    Empty,
    Review(&'a str),
}

/// Trim the line and recognize exit commands case-insensitively
pub fn classify_input(line: &str) -> ShellInput<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        ShellInput::Empty
    } else if EXIT_COMMANDS
        .iter()
        .any(|cmd| trimmed.eq_ignore_ascii_case(cmd))
    {
        ShellInput::Exit
    } else {
        ShellInput::Review(trimmed)
    }
}

/// Result block printed after each review
pub fn format_prediction(prediction: &PredictionResult) -> String {
    format!(
        "Sentiment: {}\nConfidence: {:.2}%\nProbabilities: Negative={:.2}%, Positive={:.2}%",
        prediction.sentiment.to_string().to_uppercase(),
        prediction.confidence * 100.0,
        prediction.probabilities.negative * 100.0,
        prediction.probabilities.positive * 100.0
    )
}

/// What a finished session produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShellSummary {
    pub predictions: Vec<PredictionResult>,
}

pub struct InferenceShell<'p> {
    pipeline: &'p SentimentPipeline,
    state: ShellState,
}

impl<'p> InferenceShell<'p> {
    pub fn new(pipeline: &'p SentimentPipeline) -> Self {
        Self {
            pipeline,
            state: ShellState::Ready,
        }
    }

    pub fn state(&self) -> ShellState {
        self.state
    }

    /// Run until an exit command or end of input
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, output: &mut W) -> Result<ShellSummary> {
        let rule = "=".repeat(60);
        writeln!(output, "{rule}")?;
        writeln!(output, "Sentiment Analysis - Interactive Testing")?;
        writeln!(output, "{rule}")?;
        writeln!(output, "Enter movie reviews to analyze (type 'quit' to exit)\n")?;

        let mut summary = ShellSummary::default();
        self.state = ShellState::AwaitingInput;

        let mut buf = Vec::new();
        while self.state == ShellState::AwaitingInput {
            write!(output, "\nEnter review: ")?;
            output.flush()?;

            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                debug!("End of input");
                writeln!(output)?;
                self.state = ShellState::Terminated;
                break;
            }

            // Undecodable lines are dropped like blank ones
            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line,
                Err(e) => {
                    debug!(error = %e, "Skipping line that is not valid UTF-8");
                    continue;
                }
            };

            match classify_input(line) {
                ShellInput::Exit => {
                    writeln!(output, "\nGoodbye!")?;
                    self.state = ShellState::Terminated;
                }
                ShellInput::Empty => continue,
                ShellInput::Review(text) => {
                    let prediction = self.pipeline.predict(text)?;
                    writeln!(output, "\n{}", format_prediction(&prediction))?;
                    debug!(
                        sentiment = %prediction.sentiment,
                        confidence = prediction.confidence,
                        "Classified review"
                    );
                    summary.predictions.push(prediction);
                }
            }
        }

        output.flush()?;
        Ok(summary)
    }
}
