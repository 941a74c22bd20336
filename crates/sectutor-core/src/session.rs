//! The interactive study session: command routing and handlers.
//!
//! A session owns the provider, the generation settings and the progress
//! store. Each input line is parsed into a [`Command`] and handled to
//! completion before the next line is read.

use std::io::{self, BufRead, Write};

use chrono::{Local, NaiveDateTime};
use tracing::instrument;

use crate::error::ModelCallError;
use crate::model::QuizQuestion;
use crate::parser::extract_quiz;
use crate::progress::ProgressStore;
use crate::prompts::{explain_prompt, quiz_prompt};
use crate::quiz::{QuizOutcome, QuizRunner};
use crate::report::render_progress;
use crate::traits::{GenerationSettings, LlmProvider};

const RULE_WIDTH: usize = 60;

/// A parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Explain(String),
    Quiz(String),
    Progress,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    /// Parse an input line. Matching is case-insensitive and the topic is
    /// kept lower-cased.
    pub fn parse(line: &str) -> Self {
        let input = line.trim().to_lowercase();
        if let Some(topic) = input.strip_prefix("explain ") {
            return Command::Explain(topic.trim().to_string());
        }
        if let Some(topic) = input.strip_prefix("quiz ") {
            return Command::Quiz(topic.trim().to_string());
        }
        match input.as_str() {
            "progress" => Command::Progress,
            "help" => Command::Help,
            "quit" => Command::Quit,
            _ => Command::Unknown(input),
        }
    }
}

/// Whether the read loop should keep going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Clone, Copy)]
enum Activity {
    Explanation,
    Quiz,
}

/// User-facing text for a failed model call.
fn model_error_message(err: &ModelCallError, activity: Activity) -> String {
    match (err, activity) {
        (ModelCallError::RateLimited, Activity::Explanation) => "⚠️ API rate limit reached. Please wait a minute and try again, or check your API quota at https://ai.dev/usage".to_string(),
        (ModelCallError::RateLimited, Activity::Quiz) => {
            "⚠️ API rate limit reached. Please wait a minute and try again.".to_string()
        }
        (ModelCallError::PermissionDenied, Activity::Explanation) => {
            "⚠️ API access denied. Please check your API key is valid and has proper permissions."
                .to_string()
        }
        (ModelCallError::PermissionDenied, Activity::Quiz) => {
            "⚠️ API access denied. Please check your API key.".to_string()
        }
        (ModelCallError::Other(msg), Activity::Explanation) => {
            format!("⚠️ Error generating explanation: {msg}")
        }
        (ModelCallError::Other(msg), Activity::Quiz) => format!("⚠️ Error generating quiz: {msg}"),
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// One user's study session.
pub struct StudySession {
    provider: Box<dyn LlmProvider>,
    settings: GenerationSettings,
    questions_per_quiz: u32,
    store: ProgressStore,
}

impl StudySession {
    pub fn new(
        provider: Box<dyn LlmProvider>,
        settings: GenerationSettings,
        questions_per_quiz: u32,
        store: ProgressStore,
    ) -> Self {
        Self {
            provider,
            settings,
            questions_per_quiz,
            store,
        }
    }

    pub fn store(&self) -> &ProgressStore {
        &self.store
    }

    async fn generate(&self, prompt: String) -> Result<String, ModelCallError> {
        let request = self.settings.request(prompt);
        match self.provider.generate(&request).await {
            Ok(response) => {
                tracing::debug!(
                    provider = self.provider.name(),
                    model = %response.model,
                    latency_ms = response.latency_ms,
                    tokens = response.token_usage.total_tokens,
                    "model call complete"
                );
                Ok(response.content)
            }
            Err(e) => {
                tracing::debug!(provider = self.provider.name(), "model call failed: {e:#}");
                Err(ModelCallError::classify(&e))
            }
        }
    }

    /// Ask the model to explain `topic` and note the topic as studied.
    #[instrument(skip(self))]
    pub async fn explain(&mut self, topic: &str) -> Result<String, ModelCallError> {
        let explanation = self.generate(explain_prompt(topic)).await?;
        if let Err(e) = self.store.record_topic(topic, now()) {
            tracing::warn!("failed to save progress: {e:#}");
        }
        Ok(explanation)
    }

    /// Ask the model for a quiz on `topic`. An unusable response is an empty quiz.
    #[instrument(skip(self))]
    pub async fn generate_quiz(&self, topic: &str) -> Result<Vec<QuizQuestion>, ModelCallError> {
        let text = self
            .generate(quiz_prompt(topic, self.questions_per_quiz))
            .await?;
        Ok(extract_quiz(&text))
    }

    /// Fold a finished quiz into the progress record and persist it.
    pub fn record_quiz(&mut self, outcome: QuizOutcome) {
        if let Err(e) = self.store.record_quiz(outcome.score, outcome.total, now()) {
            tracing::warn!("failed to save progress: {e:#}");
        }
    }

    /// Run one command to completion.
    pub async fn handle<R: BufRead, W: Write>(
        &mut self,
        command: Command,
        input: &mut R,
        output: &mut W,
    ) -> io::Result<Flow> {
        match command {
            Command::Quit => {
                writeln!(output, "\n👋 Happy studying! Keep learning cybersecurity!")?;
                return Ok(Flow::Quit);
            }
            Command::Help => write_commands(output)?,
            Command::Progress => write!(output, "{}", render_progress(self.store.record()))?,
            Command::Explain(topic) => {
                writeln!(output, "\n🤖 Agent: Let me explain {topic}...\n")?;
                output.flush()?;
                match self.explain(&topic).await {
                    Ok(text) => writeln!(output, "{}", text.trim_end())?,
                    Err(e) => writeln!(output, "{}", model_error_message(&e, Activity::Explanation))?,
                }
                writeln!(output, "\n💡 Want to test your knowledge? Try: quiz {topic}")?;
            }
            Command::Quiz(topic) => {
                writeln!(output, "\n🤖 Agent: Generating quiz on {topic}...\n")?;
                output.flush()?;
                let questions = match self.generate_quiz(&topic).await {
                    Ok(questions) => questions,
                    Err(e) => {
                        writeln!(output, "{}", model_error_message(&e, Activity::Quiz))?;
                        Vec::new()
                    }
                };
                if questions.is_empty() {
                    writeln!(output, "❌ Sorry, couldn't generate quiz. Try another topic!")?;
                } else {
                    let outcome = QuizRunner::new(input, output).run(&questions)?;
                    self.record_quiz(outcome);
                    writeln!(output, "\n{}", "=".repeat(RULE_WIDTH))?;
                    writeln!(output, "🎯 Final Score: {outcome}")?;
                    writeln!(output, "{}", outcome.verdict().message(&topic))?;
                }
            }
            Command::Unknown(_) => {
                writeln!(output, "\n❓ I didn't understand that command.")?;
                writeln!(output, "Try: 'explain phishing', 'quiz passwords', or 'progress'")?;
            }
        }
        Ok(Flow::Continue)
    }

    /// Read commands from `input` until `quit` or end of input.
    pub async fn run<R: BufRead, W: Write>(&mut self, input: &mut R, output: &mut W) -> io::Result<()> {
        loop {
            writeln!(output, "\n{}", "-".repeat(RULE_WIDTH))?;
            write!(output, "\nYou: ")?;
            output.flush()?;

            let mut line = String::new();
            let command = if input.read_line(&mut line)? == 0 {
                writeln!(output)?;
                Command::Quit
            } else {
                Command::parse(&line)
            };

            tracing::debug!(?command, "dispatching");
            if self.handle(command, input, output).await? == Flow::Quit {
                return Ok(());
            }
        }
    }
}

fn write_commands<W: Write>(output: &mut W) -> io::Result<()> {
    writeln!(output, "\nCommands:")?;
    writeln!(output, "  explain [topic] - Learn about any security topic")?;
    writeln!(output, "  quiz [topic]    - Test your knowledge with a quiz")?;
    writeln!(output, "  progress        - View your learning statistics")?;
    writeln!(output, "  help            - Show this message")?;
    writeln!(output, "  quit            - Exit")
}

/// The greeting printed once when the session starts.
pub fn write_banner<W: Write>(output: &mut W) -> io::Result<()> {
    let rule = "=".repeat(RULE_WIDTH);
    writeln!(output, "\n{rule}\n🔐 CYBERSECURITY STUDY ASSISTANT\n{rule}")?;
    writeln!(output, "\nI'm your AI tutor for learning cybersecurity!")?;
    writeln!(output, "\nWhat I can do:")?;
    writeln!(output, "  📖 Explain security concepts in simple terms")?;
    writeln!(output, "  📝 Generate practice quiz questions")?;
    writeln!(output, "  📊 Track your learning progress")?;
    write_commands(output)?;
    writeln!(output, "\n💡 Popular topics: phishing, passwords, malware, firewalls, encryption")
}
