//! Human-readable progress report and study recommendations.

use comfy_table::{Cell, Table};

use crate::model::ProgressRecord;

const RECENT_TOPICS: usize = 5;
const RECENT_QUIZZES: usize = 3;
/// Mean quiz accuracy below which the report suggests reviewing.
const REVIEW_THRESHOLD: f64 = 70.0;

/// What the report suggests doing next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    /// No quizzes taken yet.
    GetStarted,
    /// Average quiz accuracy is below the review threshold.
    Review,
    /// Doing well; move on to harder material.
    Advance,
}

impl Recommendation {
    pub fn for_record(record: &ProgressRecord) -> Self {
        match record.average_quiz_accuracy() {
            None => Recommendation::GetStarted,
            Some(avg) if avg < REVIEW_THRESHOLD => Recommendation::Review,
            Some(_) => Recommendation::Advance,
        }
    }

    pub fn lines(&self) -> &'static [&'static str] {
        match self {
            Recommendation::GetStarted => &[
                "Start with basic topics: phishing, passwords, malware",
                "Take quizzes to test your knowledge",
            ],
            Recommendation::Review => &[
                "Review topics where you scored low",
                "Take more practice quizzes",
                "Ask for explanations: 'explain [topic]'",
            ],
            Recommendation::Advance => &[
                "Great job! Try more advanced topics",
                "Help others learn what you know",
            ],
        }
    }
}

/// Render the full progress report shown by the `progress` command.
pub fn render_progress(record: &ProgressRecord) -> String {
    let rule = "=".repeat(60);
    let mut out = String::new();

    out.push_str(&format!("\n{rule}\n📊 YOUR LEARNING PROGRESS\n{rule}\n"));

    out.push_str(&format!(
        "\n📚 Topics Studied: {}\n",
        record.topics_studied.len()
    ));
    if !record.topics_studied.is_empty() {
        out.push_str("\nRecent topics:\n");
        for entry in record.recent_topics(RECENT_TOPICS) {
            out.push_str(&format!("  - {}\n", entry.topic));
        }
    }

    match record.overall_accuracy() {
        Some(overall) if !record.quiz_scores.is_empty() => {
            out.push_str("\n🎯 Quiz Performance:\n");
            out.push_str(&format!(
                "  Total Questions Attempted: {}\n",
                record.total_questions
            ));
            out.push_str(&format!("  Correct Answers: {}\n", record.correct_answers));
            out.push_str(&format!("  Overall Accuracy: {overall:.1}%\n"));
            out.push_str("\n  Recent Quiz Scores:\n");
            out.push_str(&recent_scores_table(record));
            out.push('\n');
        }
        _ => {
            out.push_str("\n🎯 No quizzes taken yet!\n");
            out.push_str("  Try: 'quiz phishing' to get started\n");
        }
    }

    out.push_str("\n💡 Recommendations:\n");
    for line in Recommendation::for_record(record).lines() {
        out.push_str(&format!("  - {line}\n"));
    }

    out
}

fn recent_scores_table(record: &ProgressRecord) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Date", "Score", "Accuracy"]);
    for quiz in record.recent_scores(RECENT_QUIZZES) {
        table.add_row(vec![
            Cell::new(quiz.date.format("%Y-%m-%d %H:%M")),
            Cell::new(format!("{}/{}", quiz.score, quiz.total)),
            Cell::new(format!("{:.1}%", quiz.accuracy)),
        ]);
    }
    table.to_string()
}
