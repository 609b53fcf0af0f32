//! Quiz data model.
//!
//! Field names on the wire follow the model's response schema (`mcqs`,
//! `trueFalse`), so a `Quiz` round-trips through the same JSON the service
//! returns and the CLI's `--json` output can be fed back with `--from-json`.

use serde::{Deserialize, Deserializer, Serialize};

/// A generated quiz. Both sections are always present, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub mcqs: Vec<McqItem>,
    #[serde(rename = "trueFalse", default, deserialize_with = "null_as_empty")]
    pub true_false: Vec<TrueFalseItem>,
}

impl Quiz {
    pub fn question_count(&self) -> usize {
        self.mcqs.len() + self.true_false.len()
    }

    pub fn is_empty(&self) -> bool {
        self.question_count() == 0
    }
}

/// A multiple-choice question. `options` is expected to hold four entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McqItem {
    pub question: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub options: Vec<String>,
    pub answer: String,
}

impl McqItem {
    /// Whether `answer` is literally one of `options`.
    ///
    /// Diagnostic only: the model's stated answer is displayed verbatim
    /// either way.
    pub fn answer_in_options(&self) -> bool {
        self.options.iter().any(|o| o == &self.answer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrueFalseItem {
    pub question: String,
    pub answer: bool,
}

/// How many questions of each type to ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionCounts {
    pub mcq: u32,
    pub true_false: u32,
}

impl QuestionCounts {
    pub fn new(mcq: u32, true_false: u32) -> Self {
        Self { mcq, true_false }
    }

    /// True when nothing would be generated.
    pub fn is_empty(&self) -> bool {
        self.mcq == 0 && self.true_false == 0
    }
}

impl Default for QuestionCounts {
    fn default() -> Self {
        Self {
            mcq: 5,
            true_false: 5,
        }
    }
}

/// A file ready to be sent inline: base64 payload plus its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFile {
    pub name: String,
    pub mime_type: String,
    pub data_base64: String,
}

/// Everything one generation call needs. Lives only for the call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub file: EncodedFile,
    pub counts: QuestionCounts,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
