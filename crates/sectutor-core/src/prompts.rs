//! Prompt templates sent to the model.

/// Default number of questions per generated quiz.
pub const DEFAULT_QUESTIONS_PER_QUIZ: u32 = 5;

/// Prompt asking for a short beginner-level explanation of `topic`.
pub fn explain_prompt(topic: &str) -> String {
    format!(
        "You are a cybersecurity tutor for beginners.
Explain {topic} in simple terms with:
1. Simple definition (1 sentence)
2. Real-world example
3. Why it matters in cybersecurity

Keep it under 200 words and use beginner-friendly language."
    )
}

/// Prompt asking for `count` multiple-choice questions as a JSON array.
pub fn quiz_prompt(topic: &str, count: u32) -> String {
    format!(
        r#"Create {count} multiple-choice quiz questions about {topic}.

Format as JSON array:
[
  {{
    "question": "What is the main purpose of...?",
    "options": ["A) Option 1", "B) Option 2", "C) Option 3", "D) Option 4"],
    "correct": "A",
    "explanation": "Brief explanation why this is correct"
  }}
]

Each question must have exactly four options and "correct" must be one of "A", "B", "C", "D".
Make questions appropriate for beginners learning cybersecurity."#
    )
}
