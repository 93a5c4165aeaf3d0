use quiz_core::model::{Difficulty, Question, QuestionError, QuestionId};

type Sample = (u32, &'static str, [&'static str; 4], usize, Difficulty, &'static str);

const SAMPLES: [Sample; 5] = [
    (
        1,
        "What does HTML stand for?",
        [
            "Hyper Text Markup Language",
            "High Tech Modern Language",
            "Hyper Transfer Markup Language",
            "Home Tool Markup Language",
        ],
        0,
        Difficulty::Easy,
        "HTML stands for Hyper Text Markup Language, the standard markup language for web pages.",
    ),
    (
        2,
        "Which planet is known as the Red Planet?",
        ["Venus", "Mars", "Jupiter", "Saturn"],
        1,
        Difficulty::Easy,
        "Mars is often called the Red Planet due to its reddish appearance.",
    ),
    (
        3,
        "What is the capital of France?",
        ["London", "Berlin", "Paris", "Madrid"],
        2,
        Difficulty::Easy,
        "Paris is the capital and most populous city of France.",
    ),
    (
        4,
        "What is the largest mammal in the world?",
        ["Elephant", "Blue Whale", "Giraffe", "Hippopotamus"],
        1,
        Difficulty::Medium,
        "The blue whale is the largest mammal and the largest animal ever known to have lived on Earth.",
    ),
    (
        5,
        "Which element has the chemical symbol 'O'?",
        ["Gold", "Oxygen", "Osmium", "Oganesson"],
        1,
        Difficulty::Medium,
        "Oxygen has the chemical symbol 'O' and is essential for life on Earth.",
    ),
];

/// Built-in questions used when neither the cache nor the network delivers.
///
/// # Errors
///
/// Returns `QuestionError` if a built-in record is malformed.
pub fn builtin_questions() -> Result<Vec<Question>, QuestionError> {
    SAMPLES
        .iter()
        .map(|(id, text, options, correct, difficulty, explanation)| {
            Question::new(
                QuestionId::new(*id),
                *text,
                options.iter().map(|o| (*o).to_owned()).collect(),
                *correct,
                *difficulty,
                *explanation,
            )
        })
        .collect()
}

/// Repeat `questions` in order until there are at least `count` of them.
#[must_use]
pub fn cycle_to(questions: &[Question], count: usize) -> Vec<Question> {
    if questions.is_empty() {
        return Vec::new();
    }
    questions
        .iter()
        .cycle()
        .take(count.max(questions.len()))
        .cloned()
        .collect()
}
