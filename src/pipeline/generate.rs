//! Quiz Request Builder: request assembly and reply validation.
//!
//! ```text
//! GenerationRequest ──▶ ContentRequest ──▶ QuizService ──▶ text ──▶ cleanup ──▶ Quiz
//!                      (schema + prompt)    (one call)                (JSON + checks)
//! ```
//!
//! A failure at any step surfaces immediately; there is no retry here.

use crate::config::QuizConfig;
use crate::error::{GenerationError, QuizError};
use crate::pipeline::cleanup::clean_model_text;
use crate::prompts::{quiz_instruction, quiz_response_schema, DEFAULT_QUIZ_PROMPT};
use crate::quiz::{GenerationRequest, Quiz};
use crate::service::{ContentRequest, QuizService};
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Generate a quiz for one encoded file.
///
/// Returns [`QuizError::NoQuestionsRequested`] without calling the service
/// when both counts are zero.
pub async fn generate_quiz(
    service: &dyn QuizService,
    request: &GenerationRequest,
    config: &QuizConfig,
) -> Result<Quiz, QuizError> {
    if request.counts.is_empty() {
        return Err(QuizError::NoQuestionsRequested);
    }

    let content = build_content_request(request, config);
    info!(
        "Requesting {} MCQ + {} true/false from {} ({}, {})",
        request.counts.mcq,
        request.counts.true_false,
        service.name(),
        content.model,
        request.file.mime_type
    );

    if let Some(cb) = &config.progress_callback {
        cb.on_generation_start(&request.file.name, request.counts);
    }

    let start = Instant::now();
    let result = match service.generate_content(&content).await {
        Ok(text) => parse_quiz_response(&text),
        Err(e) => Err(e),
    };
    let duration_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(quiz) => {
            check_counts(&quiz, request);
            info!(
                "Quiz ready: {} MCQ, {} true/false in {}ms",
                quiz.mcqs.len(),
                quiz.true_false.len(),
                duration_ms
            );
            if let Some(cb) = &config.progress_callback {
                cb.on_generation_complete(quiz.mcqs.len(), quiz.true_false.len(), duration_ms);
            }
            Ok(quiz)
        }
        Err(e) => {
            warn!("Quiz generation failed after {}ms: {}", duration_ms, e);
            if let Some(cb) = &config.progress_callback {
                cb.on_generation_error(&e.to_string());
            }
            Err(e.into())
        }
    }
}

/// Assemble the provider-neutral request: inline file, instruction, schema.
pub fn build_content_request(request: &GenerationRequest, config: &QuizConfig) -> ContentRequest {
    let template = config
        .prompt_template
        .as_deref()
        .unwrap_or(DEFAULT_QUIZ_PROMPT);

    ContentRequest {
        model: config.model.clone(),
        file: request.file.clone(),
        instruction: quiz_instruction(template, request.counts),
        response_schema: quiz_response_schema(),
        response_mime_type: "application/json".to_string(),
        temperature: config.temperature,
    }
}

/// Parse and validate the model's reply text.
///
/// Fails when the text is not JSON, is not an object, has wrongly shaped
/// items, or has neither `mcqs` nor `trueFalse` (a `null` section counts as
/// absent). A single absent or `null` section becomes an empty list.
pub fn parse_quiz_response(text: &str) -> Result<Quiz, GenerationError> {
    let cleaned = clean_model_text(text);
    let value: Value =
        serde_json::from_str(&cleaned).map_err(|e| GenerationError::MalformedJson {
            detail: e.to_string(),
        })?;

    let Some(object) = value.as_object() else {
        return Err(GenerationError::SchemaMismatch {
            detail: format!("expected a JSON object, got {}", json_type_name(&value)),
        });
    };

    let present = |key: &str| object.get(key).is_some_and(|v| !v.is_null());
    if !present("mcqs") && !present("trueFalse") {
        return Err(GenerationError::MissingSections);
    }
    for key in ["mcqs", "trueFalse"] {
        if !present(key) {
            debug!("Reply has no '{}' section; using an empty list", key);
        }
    }

    serde_json::from_value(value).map_err(|e| GenerationError::SchemaMismatch {
        detail: e.to_string(),
    })
}

/// Log, but do not reject, deviations from what was asked for.
fn check_counts(quiz: &Quiz, request: &GenerationRequest) {
    if quiz.mcqs.len() != request.counts.mcq as usize {
        warn!(
            "Requested {} MCQ, model returned {}",
            request.counts.mcq,
            quiz.mcqs.len()
        );
    }
    if quiz.true_false.len() != request.counts.true_false as usize {
        warn!(
            "Requested {} true/false, model returned {}",
            request.counts.true_false,
            quiz.true_false.len()
        );
    }
    for (i, mcq) in quiz.mcqs.iter().enumerate() {
        if !mcq.answer_in_options() {
            warn!("MCQ {}: stated answer is not one of its options", i + 1);
        }
    }
}

fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::{EncodedFile, QuestionCounts};
    use crate::service::QuizService;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CannedService {
        reply: Result<String, GenerationError>,
        calls: AtomicUsize,
    }

    impl CannedService {
        fn ok(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl QuizService for CannedService {
        fn name(&self) -> &str {
            "canned"
        }

        async fn generate_content(&self, _req: &ContentRequest) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone()
        }
    }

    fn request(mcq: u32, tf: u32) -> GenerationRequest {
        GenerationRequest {
            file: EncodedFile {
                name: "notes.pdf".into(),
                mime_type: "application/pdf".into(),
                data_base64: "JVBERi0=".into(),
            },
            counts: QuestionCounts::new(mcq, tf),
        }
    }

    #[test]
    fn zero_counts_make_no_call() {
        let svc = CannedService::ok("{}");
        let err = tokio_test::block_on(generate_quiz(&svc, &request(0, 0), &QuizConfig::default()))
            .unwrap_err();
        assert!(matches!(err, QuizError::NoQuestionsRequested));
        assert_eq!(svc.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn service_failure_is_generation_error() {
        let svc = CannedService {
            reply: Err(GenerationError::Transport {
                service: "canned".into(),
                detail: "connection reset".into(),
            }),
            calls: AtomicUsize::new(0),
        };
        let err = tokio_test::block_on(generate_quiz(&svc, &request(1, 1), &QuizConfig::default()))
            .unwrap_err();
        assert!(matches!(err, QuizError::Generation(GenerationError::Transport { .. })));
        assert_eq!(svc.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn content_request_carries_counts_schema_and_file() {
        let config = QuizConfig::builder().temperature(0.2).build().unwrap();
        let req = build_content_request(&request(3, 2), &config);
        assert!(req.instruction.contains("Create 3 multiple-choice"));
        assert!(req.instruction.contains("2 true/false"));
        assert_eq!(req.response_mime_type, "application/json");
        assert_eq!(req.response_schema["required"][1], "trueFalse");
        assert_eq!(req.file.mime_type, "application/pdf");
        assert_eq!(req.model, "gemini-2.5-flash");
        assert_eq!(req.temperature, Some(0.2));
    }

    #[test]
    fn custom_prompt_template_is_used() {
        let config = QuizConfig::builder()
            .prompt_template("Quiz me: {mcq_count}/{true_false_count}")
            .build()
            .unwrap();
        let req = build_content_request(&request(4, 1), &config);
        assert_eq!(req.instruction, "Quiz me: 4/1");
    }

    #[test]
    fn parses_full_reply() {
        let quiz = parse_quiz_response(
            r#"{"mcqs":[{"question":"2+2?","options":["3","4","5","6"],"answer":"4"}],
                "trueFalse":[{"question":"The sky is green.","answer":false}]}"#,
        )
        .unwrap();
        assert_eq!(quiz.mcqs.len(), 1);
        assert_eq!(quiz.mcqs[0].answer, "4");
        assert!(!quiz.true_false[0].answer);
    }

    #[test]
    fn missing_true_false_becomes_empty() {
        let quiz = parse_quiz_response(
            r#"{"mcqs":[{"question":"Q","options":["a","b","c","d"],"answer":"a"}]}"#,
        )
        .unwrap();
        assert_eq!(quiz.mcqs.len(), 1);
        assert!(quiz.true_false.is_empty());
    }

    #[test]
    fn null_mcqs_becomes_empty() {
        let quiz = parse_quiz_response(r#"{"mcqs":null,"trueFalse":[{"question":"Q","answer":true}]}"#)
            .unwrap();
        assert!(quiz.mcqs.is_empty());
        assert_eq!(quiz.true_false.len(), 1);
    }

    #[test]
    fn malformed_json_fails() {
        let err = parse_quiz_response(r#"{"mcqs": [ "#).unwrap_err();
        assert!(matches!(err, GenerationError::MalformedJson { .. }));
    }

    #[test]
    fn both_sections_missing_fails() {
        assert_eq!(
            parse_quiz_response(r#"{"questions": []}"#).unwrap_err(),
            GenerationError::MissingSections
        );
        assert_eq!(
            parse_quiz_response(r#"{"mcqs": null, "trueFalse": null}"#).unwrap_err(),
            GenerationError::MissingSections
        );
        assert_eq!(
            parse_quiz_response(r#"{"mcqs": null}"#).unwrap_err(),
            GenerationError::MissingSections
        );
    }

    #[test]
    fn non_object_fails() {
        let err = parse_quiz_response("[1, 2, 3]").unwrap_err();
        match err {
            GenerationError::SchemaMismatch { detail } => assert!(detail.contains("an array")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn wrong_item_shape_fails() {
        let err = parse_quiz_response(r#"{"trueFalse":[{"question":"Q","answer":"yes"}]}"#)
            .unwrap_err();
        assert!(matches!(err, GenerationError::SchemaMismatch { .. }));
    }

    #[test]
    fn fenced_reply_is_accepted() {
        let quiz = parse_quiz_response("```json\n{\"mcqs\":[],\"trueFalse\":[]}\n```").unwrap();
        assert!(quiz.is_empty());
    }

    #[test]
    fn mismatched_answer_is_kept_verbatim() {
        let quiz = parse_quiz_response(
            r#"{"mcqs":[{"question":"Q","options":["a","b"],"answer":"z"}],"trueFalse":[]}"#,
        )
        .unwrap();
        assert_eq!(quiz.mcqs[0].answer, "z");
    }
}
