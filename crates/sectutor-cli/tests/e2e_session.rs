//! End-to-end session tests with the mock provider.
//!
//! These drive `StudySession::run` with scripted input and check both the
//! transcript and the progress file left behind.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

use sectutor_core::model::ProgressRecord;
use sectutor_core::progress::ProgressStore;
use sectutor_core::session::StudySession;
use sectutor_core::traits::GenerationSettings;
use sectutor_providers::mock::MockProvider;

const ONE_QUESTION_QUIZ: &str = r#"Here's your quiz!
```json
[
  {
    "question": "What is phishing?",
    "options": ["A) A type of firewall", "B) A deceptive attempt to steal information", "C) An encryption method", "D) A backup strategy"],
    "correct": "B",
    "explanation": "Phishing uses deception to trick people into revealing sensitive data."
  }
]
```"#;

fn settings() -> GenerationSettings {
    GenerationSettings {
        model: "mock-model".into(),
        max_tokens: 512,
        temperature: 0.0,
    }
}

fn session(provider: MockProvider, progress: &Path) -> StudySession {
    StudySession::new(
        Box::new(provider),
        settings(),
        5,
        ProgressStore::load(progress),
    )
}

async fn run_script(session: &mut StudySession, script: &str) -> String {
    let mut input = Cursor::new(script.as_bytes().to_vec());
    let mut output = Vec::new();
    session.run(&mut input, &mut output).await.unwrap();
    String::from_utf8(output).unwrap()
}

fn read_progress(path: &Path) -> ProgressRecord {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn quiz_scenario_records_perfect_score() {
    let dir = tempfile::tempdir().unwrap();
    let progress = dir.path().join("study_progress.json");

    let mut s = session(MockProvider::with_fixed_response(ONE_QUESTION_QUIZ), &progress);
    let out = run_script(&mut s, "quiz phishing\nb\nquit\n").await;

    assert!(out.contains("Generating quiz on phishing"));
    assert!(out.contains("Question 1: What is phishing?"));
    assert!(out.contains("✓ Correct!"));
    assert!(out.contains("Final Score: 1/1 (100.0%)"));
    assert!(out.contains("Perfect score!"));

    let record = read_progress(&progress);
    assert_eq!(record.total_questions, 1);
    assert_eq!(record.correct_answers, 1);
    assert_eq!(record.quiz_scores.len(), 1);
    assert_eq!(record.quiz_scores[0].accuracy, 100.0);
    assert!(record.topics_studied.is_empty());
}

#[tokio::test]
async fn wrong_answer_is_scored_and_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let progress = dir.path().join("study_progress.json");

    let mut s = session(MockProvider::with_fixed_response(ONE_QUESTION_QUIZ), &progress);
    let out = run_script(&mut s, "quiz phishing\nd\nquit\n").await;

    assert!(out.contains("✗ Wrong. Correct answer: B"));
    assert!(out.contains("Final Score: 0/1 (0.0%)"));
    assert!(out.contains("Try 'explain phishing' to review."));

    let record = read_progress(&progress);
    assert_eq!(record.total_questions, 1);
    assert_eq!(record.correct_answers, 0);
}

#[tokio::test]
async fn quizzes_accumulate_totals() {
    let dir = tempfile::tempdir().unwrap();
    let progress = dir.path().join("study_progress.json");

    let mut s = session(MockProvider::with_fixed_response(ONE_QUESTION_QUIZ), &progress);
    run_script(&mut s, "quiz phishing\nB\nquiz phishing\nA\nquiz phishing\nb\n").await;

    let record = read_progress(&progress);
    assert_eq!(record.total_questions, 3);
    assert_eq!(record.correct_answers, 2);
    assert_eq!(record.quiz_scores.len(), 3);
    assert_eq!(s.store().record(), &record);
}

#[tokio::test]
async fn explain_twice_records_topic_once() {
    let dir = tempfile::tempdir().unwrap();
    let progress = dir.path().join("study_progress.json");

    let mut s = session(
        MockProvider::with_fixed_response("Malware is malicious software."),
        &progress,
    );
    let out = run_script(&mut s, "explain malware\nexplain Malware\nquit\n").await;

    assert_eq!(out.matches("Malware is malicious software.").count(), 2);
    assert!(out.contains("Try: quiz malware"));

    let record = read_progress(&progress);
    assert_eq!(record.topics_studied.len(), 1);
    assert_eq!(record.topics_studied[0].topic, "malware");
}

#[tokio::test]
async fn explain_and_quiz_use_their_prompts() {
    let dir = tempfile::tempdir().unwrap();
    let progress = dir.path().join("study_progress.json");

    let mut responses = HashMap::new();
    responses.insert(
        "Explain firewalls".to_string(),
        "A firewall filters traffic.".to_string(),
    );
    responses.insert(
        "quiz questions about firewalls".to_string(),
        "Sorry, no quiz today.".to_string(),
    );

    let mut s = session(MockProvider::new(responses), &progress);
    let out = run_script(&mut s, "explain firewalls\nquiz firewalls\nprogress\nquit\n").await;

    assert!(out.contains("A firewall filters traffic."));
    assert!(out.contains("Sorry, couldn't generate quiz. Try another topic!"));
    assert!(out.contains("Topics Studied: 1"));
    assert!(out.contains("  - firewalls"));
}

#[tokio::test]
async fn rate_limit_is_reported_and_session_continues() {
    let dir = tempfile::tempdir().unwrap();
    let progress = dir.path().join("study_progress.json");

    let mut s = session(
        MockProvider::failing_with_status(429, "quota exceeded"),
        &progress,
    );
    let out = run_script(&mut s, "explain xss\nquiz xss\nhelp\nquit\n").await;

    assert!(out.contains("API rate limit reached. Please wait a minute and try again, or check"));
    assert!(out.contains("Sorry, couldn't generate quiz."));
    assert!(out.contains("Commands:"));
    assert!(out.contains("Happy studying!"));
    assert!(!progress.exists(), "failed calls must not touch progress");
}

#[tokio::test]
async fn permission_problem_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let progress = dir.path().join("study_progress.json");

    let mut s = session(
        MockProvider::failing_with_message("request failed: 403 Forbidden"),
        &progress,
    );
    let out = run_script(&mut s, "explain csrf\nquit\n").await;

    assert!(out.contains("API access denied. Please check your API key is valid"));
    assert!(ProgressStore::load(&progress).record().topics_studied.is_empty());
}

#[tokio::test]
async fn other_errors_are_truncated() {
    let dir = tempfile::tempdir().unwrap();
    let progress = dir.path().join("study_progress.json");

    let long = format!("backend exploded: {}", "x".repeat(300));
    let mut s = session(MockProvider::failing_with_message(&long), &progress);
    let out = run_script(&mut s, "quiz dns\nquit\n").await;

    let line = out
        .lines()
        .find(|l| l.starts_with("⚠️ Error generating quiz: "))
        .expect("error line present");
    let detail = line.trim_start_matches("⚠️ Error generating quiz: ");
    assert_eq!(detail.chars().count(), 100);
}

#[tokio::test]
async fn existing_progress_is_extended() {
    let dir = tempfile::tempdir().unwrap();
    let progress = dir.path().join("study_progress.json");
    std::fs::write(
        &progress,
        r#"{"topics_studied": [{"topic": "phishing", "date": "2025-01-01T08:00:00"}],
            "quiz_scores": [{"date": "2025-01-01T09:00:00", "score": 3, "total": 5, "accuracy": 60.0}],
            "total_questions": 5, "correct_answers": 3}"#,
    )
    .unwrap();

    let mut s = session(MockProvider::with_fixed_response(ONE_QUESTION_QUIZ), &progress);
    run_script(&mut s, "explain phishing\nquiz phishing\nb\nquit\n").await;

    let record = read_progress(&progress);
    assert_eq!(record.topics_studied.len(), 1);
    assert_eq!(record.total_questions, 6);
    assert_eq!(record.correct_answers, 4);
    assert_eq!(record.quiz_scores[0].accuracy, 60.0);
    assert_eq!(record.quiz_scores[1].accuracy, 100.0);
}
