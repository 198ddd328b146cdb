//! Ask command handler.
//!
//! Answers one question, or every line of a question file, through the
//! coaching pipeline.

use clap::Args;
use coach_core::{config::AppConfig, AppError, AppResult};
use coach_knowledge::{AnswerOutcome, CoachPipeline, SourceKind};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shown before answers that come from the web fallback.
const WEB_FALLBACK_NOTICE: &str =
    "Konu hakkında yeterince bilgim yok. Google'dan sizin için bunları buldum.";

/// Ask a leadership-coaching question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: Option<String>,

    /// Read questions from a file, one per line
    #[arg(short, long, conflicts_with = "question")]
    pub file: Option<PathBuf>,

    /// Questions answered at once when reading from a file
    #[arg(long, default_value_t = 1)]
    pub concurrency: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let questions = self.questions()?;

        config.validate()?;
        let pipeline = Arc::new(CoachPipeline::from_config(config).await?);

        if self.file.is_none() {
            let question = &questions[0];
            let outcome = pipeline.answer(question).await?;
            return self.print_single(&outcome);
        }

        self.answer_batch(pipeline, questions).await
    }

    /// Answer many questions against one pipeline, printing in input order.
    async fn answer_batch(
        &self,
        pipeline: Arc<CoachPipeline>,
        questions: Vec<String>,
    ) -> AppResult<()> {
        let total = questions.len();
        tracing::info!(
            "Answering {} questions (concurrency: {})",
            total,
            self.concurrency.max(1)
        );

        let results: Vec<(String, AppResult<AnswerOutcome>)> = futures::stream::iter(questions)
            .map(|question| {
                let pipeline = Arc::clone(&pipeline);
                async move {
                    let result = pipeline.answer(&question).await;
                    (question, result)
                }
            })
            .buffered(self.concurrency.max(1))
            .collect()
            .await;

        let failed = results.iter().filter(|(_, r)| r.is_err()).count();

        if self.json {
            let entries: Vec<serde_json::Value> = results
                .iter()
                .map(|(question, result)| match result {
                    Ok(outcome) => serde_json::json!({
                        "question": question,
                        "outcome": outcome,
                    }),
                    Err(e) => serde_json::json!({
                        "question": question,
                        "error": e.to_string(),
                    }),
                })
                .collect();

            let json = serde_json::to_string_pretty(&entries)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            for (i, (question, result)) in results.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                println!("Soru: {}", question);
                match result {
                    Ok(outcome) => print_outcome(outcome),
                    Err(e) => eprintln!("Hata: {}", e),
                }
            }
        }

        if failed > 0 {
            return Err(AppError::Other(format!(
                "{} of {} questions failed",
                failed, total
            )));
        }

        Ok(())
    }

    fn print_single(&self, outcome: &AnswerOutcome) -> AppResult<()> {
        if self.json {
            let json = serde_json::to_string_pretty(outcome)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            print_outcome(outcome);
        }
        Ok(())
    }

    /// Collect the questions to answer from the argument or the file.
    fn questions(&self) -> AppResult<Vec<String>> {
        if let Some(ref path) = self.file {
            return read_questions(path);
        }

        match self.question.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => Ok(vec![q.to_string()]),
            _ => Err(AppError::Input(
                "No question provided (pass a question or --file)".to_string(),
            )),
        }
    }
}

/// Read non-empty, trimmed lines from a question file.
fn read_questions(path: &Path) -> AppResult<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        AppError::Input(format!(
            "Failed to read question file {}: {}",
            path.display(),
            e
        ))
    })?;

    let questions: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    if questions.is_empty() {
        return Err(AppError::Input(format!(
            "Question file {} contains no questions",
            path.display()
        )));
    }

    Ok(questions)
}

fn print_outcome(outcome: &AnswerOutcome) {
    if outcome.source_kind == SourceKind::Web {
        eprintln!("{}", WEB_FALLBACK_NOTICE);
    }

    println!("{}", outcome.answer);

    if !outcome.sources.is_empty() {
        println!();
        println!("Kaynaklar:");
        for (i, source) in outcome.sources.iter().enumerate() {
            println!("  {}. {}", i + 1, source);
        }
    }
}
