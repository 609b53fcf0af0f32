//! Instruction text and structured-output schema for quiz generation.
//!
//! Callers can override the instruction via
//! [`crate::config::QuizConfig::prompt_template`]; the schema is fixed
//! because the response parser depends on its shape.

use crate::quiz::QuestionCounts;
use serde_json::{json, Value};

/// Default instruction. `{mcq_count}` and `{true_false_count}` are substituted.
pub const DEFAULT_QUIZ_PROMPT: &str = "Analyze the content of this document and generate a quiz. \
Create {mcq_count} multiple-choice questions and {true_false_count} true/false questions based on \
the key information presented. Ensure the questions cover a range of topics from the document.";

/// Fill the count placeholders of `template`.
pub fn quiz_instruction(template: &str, counts: QuestionCounts) -> String {
    template
        .replace("{mcq_count}", &counts.mcq.to_string())
        .replace("{true_false_count}", &counts.true_false.to_string())
}

/// The response schema the service must honour.
///
/// Uses the Gemini OpenAPI-subset type names (`OBJECT`, `ARRAY`, ...).
pub fn quiz_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "mcqs": {
                "type": "ARRAY",
                "description": "A list of multiple choice questions.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "question": {
                            "type": "STRING",
                            "description": "The question text."
                        },
                        "options": {
                            "type": "ARRAY",
                            "description": "An array of 4 possible answers.",
                            "items": { "type": "STRING" }
                        },
                        "answer": {
                            "type": "STRING",
                            "description": "The correct answer, which must be one of the provided options."
                        }
                    },
                    "required": ["question", "options", "answer"]
                }
            },
            "trueFalse": {
                "type": "ARRAY",
                "description": "A list of true or false questions.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "question": {
                            "type": "STRING",
                            "description": "The statement for the true/false question."
                        },
                        "answer": {
                            "type": "BOOLEAN",
                            "description": "The correct answer, true or false."
                        }
                    },
                    "required": ["question", "answer"]
                }
            }
        },
        "required": ["mcqs", "trueFalse"]
    })
}
