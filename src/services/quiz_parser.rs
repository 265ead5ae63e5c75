use serde_json::{Map, Value};

use crate::{
    errors::QuizFormatError,
    models::domain::{quiz::OPTIONS_PER_QUESTION, OptionLetter, Question, Quiz},
    services::json_repair::repair_json,
};

/// Turns free-form model output into a validated [`Quiz`].
///
/// Model replies often wrap the JSON in prose or markdown, so the payload is
/// located by bracket scanning, parsed strictly, repaired and re-parsed when
/// strict parsing fails, unwrapped when it arrives inside a list, and finally
/// checked field by field. Nothing invalid is dropped or coerced: the first
/// bad field fails the whole parse.
pub fn parse_quiz(raw: &str) -> Result<Quiz, QuizFormatError> {
    let candidate = locate_json(raw).ok_or(QuizFormatError::NoJsonStructure)?;

    let value = match serde_json::from_str::<Value>(candidate) {
        Ok(value) => value,
        Err(strict_err) => {
            log::warn!(
                "Model response is not strict JSON ({}), attempting repair",
                strict_err
            );
            let repaired = repair_json(candidate);
            serde_json::from_str::<Value>(&repaired)
                .map_err(|e| QuizFormatError::UnrecoverableJson(e.to_string()))?
        }
    };

    let object = unwrap_quiz_object(value)?;
    validate_quiz(&object)
}

/// Returns the text from the first `{` or `[` to the last `}` or `]`.
///
/// When nothing closes after the opening bracket the rest of the text is
/// returned so the repair pass can close a truncated reply.
pub fn locate_json(raw: &str) -> Option<&str> {
    let start = raw.find(['{', '['])?;
    let end = raw
        .rfind(['}', ']'])
        .filter(|&end| end > start)
        .map(|end| end + 1)
        .unwrap_or(raw.len());
    Some(&raw[start..end])
}

fn unwrap_quiz_object(value: Value) -> Result<Map<String, Value>, QuizFormatError> {
    let value = match value {
        Value::Array(items) => items
            .into_iter()
            .next()
            .ok_or(QuizFormatError::EmptyArray)?,
        other => other,
    };

    match value {
        Value::Object(map) => Ok(map),
        other => Err(QuizFormatError::NotAnObject(json_kind(&other).to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn required_text(
    map: &Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<String, QuizFormatError> {
    match map.get(key) {
        None => Err(QuizFormatError::invalid(path, "missing")),
        Some(Value::String(text)) if text.trim().is_empty() => {
            Err(QuizFormatError::invalid(path, "must not be blank"))
        }
        Some(Value::String(text)) => Ok(text.clone()),
        Some(other) => Err(QuizFormatError::invalid(
            path,
            format!("expected a string, found {}", json_kind(other)),
        )),
    }
}

fn validate_quiz(map: &Map<String, Value>) -> Result<Quiz, QuizFormatError> {
    let topic = required_text(map, "topic", "topic")?;
    let category = required_text(map, "category", "category")?;
    let subcategory = required_text(map, "subcategory", "subcategory")?;

    let questions = match map.get("questions") {
        None => return Err(QuizFormatError::invalid("questions", "missing")),
        Some(Value::Array(items)) if items.is_empty() => {
            return Err(QuizFormatError::invalid("questions", "must not be empty"))
        }
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(QuizFormatError::invalid(
                "questions",
                format!("expected an array, found {}", json_kind(other)),
            ))
        }
    };

    let questions = questions
        .iter()
        .enumerate()
        .map(|(index, item)| validate_question(index, item))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Quiz {
        topic,
        category,
        subcategory,
        questions,
    })
}

fn validate_question(index: usize, item: &Value) -> Result<Question, QuizFormatError> {
    let path = format!("questions[{}]", index);
    let Value::Object(map) = item else {
        return Err(QuizFormatError::invalid(
            path,
            format!("expected an object, found {}", json_kind(item)),
        ));
    };

    let text = required_text(map, "question", &format!("{}.question", path))?;

    let options_path = format!("{}.options", path);
    let options = match map.get("options") {
        None => return Err(QuizFormatError::invalid(options_path, "missing")),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(QuizFormatError::invalid(
                options_path,
                format!("expected an array, found {}", json_kind(other)),
            ))
        }
    };
    if options.len() != OPTIONS_PER_QUESTION {
        return Err(QuizFormatError::invalid(
            options_path,
            format!(
                "expected exactly {} options, found {}",
                OPTIONS_PER_QUESTION,
                options.len()
            ),
        ));
    }
    let options = options
        .iter()
        .enumerate()
        .map(|(i, option)| match option {
            Value::String(text) if !text.trim().is_empty() => Ok(text.clone()),
            Value::String(_) => Err(QuizFormatError::invalid(
                format!("{}[{}]", options_path, i),
                "must not be blank",
            )),
            other => Err(QuizFormatError::invalid(
                format!("{}[{}]", options_path, i),
                format!("expected a string, found {}", json_kind(other)),
            )),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let right_path = format!("{}.right_option", path);
    let right_option = match map.get("right_option") {
        None => return Err(QuizFormatError::invalid(right_path, "missing")),
        Some(Value::String(letter)) => OptionLetter::parse(letter).ok_or_else(|| {
            QuizFormatError::invalid(
                right_path.clone(),
                format!("expected one of a, b, c, d, found '{}'", letter),
            )
        })?,
        Some(other) => {
            return Err(QuizFormatError::invalid(
                right_path,
                format!("expected a string, found {}", json_kind(other)),
            ))
        }
    };

    let question = Question {
        text,
        options,
        right_option,
    };
    if !question.answer_label_matches() {
        log::debug!(
            "{} answer '{}' does not point at an option labelled '{}.'",
            path,
            question.right_option,
            question.right_option
        );
    }
    Ok(question)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures::{sample_quiz, sample_quiz_json};

    fn expect_invalid_field(raw: &str, expected_field: &str) {
        match parse_quiz(raw) {
            Err(QuizFormatError::InvalidField { field, .. }) => assert_eq!(field, expected_field),
            other => panic!("expected invalid `{}`, got {:?}", expected_field, other),
        }
    }

    #[test]
    fn recovers_quiz_wrapped_in_prose() {
        let raw = "Sure! Here's the quiz: {\"topic\":\"X\",\"category\":\"C\",\"subcategory\":\"S\",\"questions\":[{\"question\":\"Q1\",\"options\":[\"a. 1\",\"b. 2\",\"c. 3\",\"d. 4\"],\"right_option\":\"b\"}]} Hope that helps!";

        let quiz = parse_quiz(raw).expect("quiz should parse");

        assert_eq!(
            quiz,
            Quiz {
                topic: "X".to_string(),
                category: "C".to_string(),
                subcategory: "S".to_string(),
                questions: vec![Question {
                    text: "Q1".to_string(),
                    options: vec![
                        "a. 1".to_string(),
                        "b. 2".to_string(),
                        "c. 3".to_string(),
                        "d. 4".to_string()
                    ],
                    right_option: OptionLetter::B,
                }],
            }
        );
    }

    #[test]
    fn fails_without_any_brackets() {
        assert_eq!(
            parse_quiz("I cannot generate a quiz for this content."),
            Err(QuizFormatError::NoJsonStructure)
        );
    }

    #[test]
    fn is_idempotent_on_serialized_quiz() {
        let quiz = sample_quiz();
        let serialized = serde_json::to_string(&quiz).unwrap();

        assert_eq!(parse_quiz(&serialized).unwrap(), quiz);
    }

    #[test]
    fn unwraps_top_level_array() {
        let object = sample_quiz_json();
        let wrapped = format!("[{}]", object);

        assert_eq!(parse_quiz(&wrapped).unwrap(), parse_quiz(&object).unwrap());
    }

    #[test]
    fn rejects_empty_top_level_array() {
        assert_eq!(parse_quiz("[]"), Err(QuizFormatError::EmptyArray));
    }

    #[test]
    fn rejects_non_object_payload() {
        assert!(matches!(
            parse_quiz("[\"just a string\"]"),
            Err(QuizFormatError::NotAnObject(_))
        ));
    }

    #[test]
    fn rejects_question_with_three_options() {
        let raw = r#"{"topic":"X","category":"C","subcategory":"S","questions":[
            {"question":"Q1","options":["a. 1","b. 2","c. 3"],"right_option":"a"}]}"#;

        expect_invalid_field(raw, "questions[0].options");
    }

    #[test]
    fn rejects_invalid_right_option() {
        let raw = r#"{"topic":"X","category":"C","subcategory":"S","questions":[
            {"question":"Q1","options":["a. 1","b. 2","c. 3","d. 4"],"right_option":"a"},
            {"question":"Q2","options":["a. 1","b. 2","c. 3","d. 4"],"right_option":"e"}]}"#;

        expect_invalid_field(raw, "questions[1].right_option");
    }

    #[test]
    fn rejects_missing_and_mistyped_top_level_fields() {
        expect_invalid_field(
            r#"{"category":"C","subcategory":"S","questions":[]}"#,
            "topic",
        );
        expect_invalid_field(
            r#"{"topic":"X","category":7,"subcategory":"S","questions":[]}"#,
            "category",
        );
        expect_invalid_field(
            r#"{"topic":"X","category":"C","subcategory":"S","questions":[]}"#,
            "questions",
        );
        expect_invalid_field(
            r#"{"topic":"X","category":"C","subcategory":"S","questions":{"q":1}}"#,
            "questions",
        );
    }

    #[test]
    fn rejects_non_string_option() {
        let raw = r#"{"topic":"X","category":"C","subcategory":"S","questions":[
            {"question":"Q1","options":["a. 1","b. 2",3,"d. 4"],"right_option":"a"}]}"#;

        expect_invalid_field(raw, "questions[0].options[2]");
    }

    #[test]
    fn repairs_trailing_commas_and_comments() {
        let raw = r#"```json
{"topic": "Volcanoes", "category": "Science & Nature", "subcategory": "Chemistry & Physics",
 "questions": [
    {
      "question": "What is magma called once it reaches the surface of a volcano?",
      "options": ["a. Lava", "b. Ash", "c. Basalt", "d. Pumice",],
      "right_option": "a"  # letter of the right option
    },
 ]}
```"#;

        let quiz = parse_quiz(raw).expect("repairable quiz should parse");
        assert_eq!(quiz.topic, "Volcanoes");
        assert_eq!(quiz.questions.len(), 1);
        assert_eq!(quiz.questions[0].right_option, OptionLetter::A);
    }

    #[test]
    fn truncated_reply_keeps_complete_questions() {
        let raw = r#"{"topic": "Rome", "category": "History", "subcategory": "Ancient Civilizations",
 "questions": [{"question": "Who founded Rome?", "options": ["a. Romulus", "b. Caesar", "c. Nero", "d. Augustus"], "right_option": "a"}, {"question": "When did"#;

        let quiz = parse_quiz(raw).expect("truncated reply should be repaired");
        assert_eq!(quiz.topic, "Rome");
        assert_eq!(quiz.questions.len(), 1);
        assert_eq!(quiz.questions[0].text, "Who founded Rome?");
    }

    #[test]
    fn truncated_question_without_closer_fails_validation() {
        let raw = r#"{"topic": "Rome", "category": "History", "subcategory": "Ancient Civilizations",
 "questions": [{"question": "Who founded Rome?", "options": ["a. Romulus", "b. Caesar"#;

        expect_invalid_field(raw, "questions[0].options");
    }

    #[test]
    fn extra_fields_are_ignored() {
        let raw = r#"{"topic":"X","category":"C","subcategory":"S","difficulty":"easy","questions":[
            {"question":"Q1","options":["a. 1","b. 2","c. 3","d. 4"],"right_option":"d","explanation":"because"}]}"#;

        let quiz = parse_quiz(raw).unwrap();
        assert_eq!(quiz.questions[0].right_option, OptionLetter::D);
    }

    #[test]
    fn mislabelled_answer_is_accepted() {
        let raw = r#"{"topic":"X","category":"C","subcategory":"S","questions":[
            {"question":"Q1","options":["1","2","3","4"],"right_option":"b"}]}"#;

        let quiz = parse_quiz(raw).unwrap();
        assert_eq!(quiz.questions[0].right_option, OptionLetter::B);
        assert!(!quiz.questions[0].answer_label_matches());
    }

    #[test]
    fn locate_json_spans_first_open_to_last_close() {
        assert_eq!(locate_json("pre {\"a\": [1]} post"), Some("{\"a\": [1]}"));
        assert_eq!(locate_json("x [1, {\"a\": 2}] y"), Some("[1, {\"a\": 2}]"));
        assert_eq!(locate_json("cut {\"a\": [1"), Some("{\"a\": [1"));
        assert_eq!(locate_json("none here"), None);
    }
}
