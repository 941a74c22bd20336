//! Interactive quiz runner and scoring.

use std::fmt;
use std::io::{self, BufRead, Write};

use crate::model::{accuracy, AnswerChoice, QuizQuestion};

const RULE_WIDTH: usize = 60;

/// Final tally of a completed quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizOutcome {
    pub score: u32,
    pub total: u32,
}

impl QuizOutcome {
    pub fn accuracy(&self) -> f64 {
        accuracy(self.score, self.total)
    }

    pub fn verdict(&self) -> Verdict {
        Verdict::for_score(self.score, self.total)
    }
}

impl fmt::Display for QuizOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({:.1}%)", self.score, self.total, self.accuracy())
    }
}

/// Feedback band for a finished quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Perfect,
    Great,
    Good,
    KeepStudying,
}

impl Verdict {
    pub fn for_score(score: u32, total: u32) -> Self {
        let ratio = if total == 0 {
            0.0
        } else {
            score as f64 / total as f64
        };
        if total > 0 && score >= total {
            Verdict::Perfect
        } else if ratio >= 0.8 {
            Verdict::Great
        } else if ratio >= 0.6 {
            Verdict::Good
        } else {
            Verdict::KeepStudying
        }
    }

    /// The line shown under the final score.
    pub fn message(&self, topic: &str) -> String {
        match self {
            Verdict::Perfect => "🌟 Perfect score! You mastered this topic!".to_string(),
            Verdict::Great => "🎉 Great job! You understand this well!".to_string(),
            Verdict::Good => "👍 Good work! Review and try again for higher score.".to_string(),
            Verdict::KeepStudying => {
                format!("📚 Keep studying! Try 'explain {topic}' to review.")
            }
        }
    }
}

/// Presents questions one at a time and scores the answers read from `input`.
pub struct QuizRunner<'a, R, W> {
    input: &'a mut R,
    output: &'a mut W,
}

impl<'a, R: BufRead, W: Write> QuizRunner<'a, R, W> {
    pub fn new(input: &'a mut R, output: &'a mut W) -> Self {
        Self { input, output }
    }

    /// Ask every question once. An answer that is not A–D counts as wrong;
    /// end of input counts as wrong for every remaining question.
    pub fn run(&mut self, questions: &[QuizQuestion]) -> io::Result<QuizOutcome> {
        let mut score = 0u32;

        for (i, q) in questions.iter().enumerate() {
            writeln!(self.output, "\n{}", "=".repeat(RULE_WIDTH))?;
            writeln!(self.output, "Question {}: {}", i + 1, q.question)?;
            writeln!(self.output)?;
            for (letter, option) in AnswerChoice::ALL.iter().zip(q.options.iter()) {
                writeln!(self.output, "  {}", label_option(*letter, option))?;
            }

            write!(self.output, "\nYour answer (A/B/C/D): ")?;
            self.output.flush()?;
            let answer = self.read_answer()?;

            if answer == Some(q.correct) {
                writeln!(self.output, "✓ Correct!")?;
                score += 1;
            } else {
                writeln!(self.output, "✗ Wrong. Correct answer: {}", q.correct)?;
            }
            writeln!(self.output, "Explanation: {}", q.explanation)?;
        }

        Ok(QuizOutcome {
            score,
            total: questions.len() as u32,
        })
    }

    fn read_answer(&mut self) -> io::Result<Option<AnswerChoice>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(line.trim().parse().ok())
    }
}

/// Prefix an option with its letter unless the model already did.
fn label_option(letter: AnswerChoice, option: &str) -> String {
    let prefix = letter.to_string();
    let already_labelled = option
        .trim_start()
        .strip_prefix(prefix.as_str())
        .is_some_and(|rest| rest.starts_with(')') || rest.starts_with('.'));
    if already_labelled {
        option.to_string()
    } else {
        format!("{letter}) {option}")
    }
}
