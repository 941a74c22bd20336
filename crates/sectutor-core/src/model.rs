//! Core data model types for sectutor.
//!
//! `ProgressRecord` is the persisted study history; `QuizQuestion` is the
//! transient shape a quiz takes after it is parsed out of model output.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One of the four answer letters of a multiple-choice question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AnswerChoice {
    A,
    B,
    C,
    D,
}

impl AnswerChoice {
    pub const ALL: [AnswerChoice; 4] = [
        AnswerChoice::A,
        AnswerChoice::B,
        AnswerChoice::C,
        AnswerChoice::D,
    ];
}

impl fmt::Display for AnswerChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerChoice::A => write!(f, "A"),
            AnswerChoice::B => write!(f, "B"),
            AnswerChoice::C => write!(f, "C"),
            AnswerChoice::D => write!(f, "D"),
        }
    }
}

impl FromStr for AnswerChoice {
    type Err = String;

    /// Accepts `a`, `B`, ` c ` and also the `"A)"` form models sometimes emit.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches(&[')', '.', ':'][..]);
        match trimmed.to_uppercase().as_str() {
            "A" => Ok(AnswerChoice::A),
            "B" => Ok(AnswerChoice::B),
            "C" => Ok(AnswerChoice::C),
            "D" => Ok(AnswerChoice::D),
            _ => Err(format!("invalid answer choice: {s:?}")),
        }
    }
}

impl TryFrom<String> for AnswerChoice {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AnswerChoice> for String {
    fn from(choice: AnswerChoice) -> Self {
        choice.to_string()
    }
}

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    /// Exactly four options, in A..D order.
    pub options: [String; 4],
    pub correct: AnswerChoice,
    #[serde(default)]
    pub explanation: String,
}

/// A topic the user asked to have explained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicEntry {
    pub topic: String,
    pub date: NaiveDateTime,
}

/// The outcome of one completed quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizScore {
    pub date: NaiveDateTime,
    pub score: u32,
    pub total: u32,
    /// Percentage, fixed when the score is recorded.
    pub accuracy: f64,
}

/// Everything the user has studied so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    #[serde(default)]
    pub topics_studied: Vec<TopicEntry>,
    #[serde(default)]
    pub quiz_scores: Vec<QuizScore>,
    #[serde(default)]
    pub total_questions: u32,
    #[serde(default)]
    pub correct_answers: u32,
}

/// Percentage of `score` out of `total`, 0.0 for an empty total.
pub fn accuracy(score: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    score as f64 / total as f64 * 100.0
}

impl ProgressRecord {
    pub fn has_studied(&self, topic: &str) -> bool {
        self.topics_studied.iter().any(|t| t.topic == topic)
    }

    /// Append `topic` unless it is already recorded. Returns whether it was added.
    pub fn record_topic(&mut self, topic: &str, date: NaiveDateTime) -> bool {
        if self.has_studied(topic) {
            return false;
        }
        self.topics_studied.push(TopicEntry {
            topic: topic.to_string(),
            date,
        });
        true
    }

    /// Append a quiz result and fold it into the running totals.
    pub fn record_quiz(&mut self, score: u32, total: u32, date: NaiveDateTime) -> &QuizScore {
        let score = score.min(total);
        self.total_questions += total;
        self.correct_answers += score;
        self.quiz_scores.push(QuizScore {
            date,
            score,
            total,
            accuracy: accuracy(score, total),
        });
        &self.quiz_scores[self.quiz_scores.len() - 1]
    }

    /// Accuracy across every question ever answered.
    pub fn overall_accuracy(&self) -> Option<f64> {
        (self.total_questions > 0).then(|| accuracy(self.correct_answers, self.total_questions))
    }

    /// Mean of the per-quiz accuracies.
    pub fn average_quiz_accuracy(&self) -> Option<f64> {
        if self.quiz_scores.is_empty() {
            return None;
        }
        let sum: f64 = self.quiz_scores.iter().map(|q| q.accuracy).sum();
        Some(sum / self.quiz_scores.len() as f64)
    }

    pub fn recent_topics(&self, n: usize) -> &[TopicEntry] {
        let start = self.topics_studied.len().saturating_sub(n);
        &self.topics_studied[start..]
    }

    pub fn recent_scores(&self, n: usize) -> &[QuizScore] {
        let start = self.quiz_scores.len().saturating_sub(n);
        &self.quiz_scores[start..]
    }
}
