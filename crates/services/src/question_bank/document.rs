use quiz_core::model::{Category, Difficulty, Question, QuestionId};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::DocumentError;

/// One question as it appears in a category document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionRecord {
    id: u32,
    question: String,
    options: Vec<String>,
    correct_answer: usize,
    difficulty: Difficulty,
    #[serde(default)]
    explanation: String,
}

/// Parse a category document into validated questions.
///
/// The list is read from the entry keyed by the category. If that key is
/// missing, the first array-valued entry is used instead. Records that fail
/// validation are dropped.
///
/// # Errors
///
/// Returns `DocumentError` if the JSON is malformed, holds no list, or no
/// record survives validation.
pub fn parse_document(raw: &str, category: Category) -> Result<Vec<Question>, DocumentError> {
    let document: Value = serde_json::from_str(raw)?;
    let list = question_list(&document, category).ok_or(DocumentError::NoQuestionList)?;

    let mut questions = Vec::with_capacity(list.len());
    for value in list {
        match to_question(value) {
            Ok(question) => questions.push(question),
            Err(reason) => warn!(%category, %reason, "skipping invalid question record"),
        }
    }

    if questions.is_empty() {
        return Err(DocumentError::NoValidQuestions);
    }
    Ok(questions)
}

fn question_list(document: &Value, category: Category) -> Option<&Vec<Value>> {
    let object = document.as_object()?;
    if let Some(list) = object.get(category.key()).and_then(Value::as_array) {
        return Some(list);
    }
    let (key, list) = object
        .iter()
        .find_map(|(key, value)| value.as_array().map(|list| (key, list)))?;
    debug!(%category, key = %key, "category key missing, using first question list");
    Some(list)
}

fn to_question(value: &Value) -> Result<Question, String> {
    let record = QuestionRecord::deserialize(value).map_err(|e| e.to_string())?;
    Question::new(
        QuestionId::new(record.id),
        record.question,
        record.options,
        record.correct_answer,
        record.difficulty,
        record.explanation,
    )
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCIENCE: &str = r#"{
        "science": [
            {"id": 1, "question": "H2O is?", "options": ["Water", "Salt", "Air", "Gold"],
             "correctAnswer": 0, "difficulty": "easy", "explanation": "Two hydrogens, one oxygen."},
            {"id": 2, "question": "Broken", "options": ["a", "b"], "correctAnswer": 0, "difficulty": "hard"},
            {"id": 3, "question": "Out of range", "options": ["a", "b", "c", "d"], "correctAnswer": 4, "difficulty": "hard"},
            {"id": 4, "question": "Speed of light?", "options": ["slow", "c", "fast", "none"],
             "correctAnswer": 1, "difficulty": "hard"}
        ]
    }"#;

    #[test]
    fn reads_category_list_and_drops_invalid_records() {
        let questions = parse_document(SCIENCE, Category::Science).unwrap();
        let ids: Vec<u32> = questions.iter().map(|q| q.id().value()).collect();
        assert_eq!(ids, vec![1, 4]);
        assert_eq!(questions[0].explanation(), "Two hydrogens, one oxygen.");
        assert_eq!(questions[1].explanation(), "");
        assert_eq!(questions[1].correct_option(), "c");
    }

    #[test]
    fn falls_back_to_first_list_when_key_missing() {
        let questions = parse_document(SCIENCE, Category::Math).unwrap();
        assert_eq!(questions.len(), 2);
    }

    #[test]
    fn rejects_unusable_documents() {
        assert!(matches!(
            parse_document("{not json", Category::Math),
            Err(DocumentError::Json(_))
        ));
        assert!(matches!(
            parse_document(r#"{"math": "nope"}"#, Category::Math),
            Err(DocumentError::NoQuestionList)
        ));
        assert!(matches!(
            parse_document(r#"{"math": []}"#, Category::Math),
            Err(DocumentError::NoValidQuestions)
        ));
        assert!(matches!(
            parse_document("[]", Category::Math),
            Err(DocumentError::NoQuestionList)
        ));
    }
}
