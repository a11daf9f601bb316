//! Decoding of the two answer wire encodings into an [`AnswerSet`].
//!
//! The structured form (v1) carries `{question_id, answer}` objects with arbitrary JSON
//! answers. The compact form (v2) carries `"question_id:value"` strings split on the first
//! `:`, so a value may itself contain `:`. Either way each value is coerced into the shape
//! named by the question's [`AnswerType`] in the customer's specification, and a JSON string
//! in the structured form is read exactly like the raw compact value.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::answer::{AnswerSet, AnswerValue};
use super::specification::{AnswerType, Specification, TemplateEntry};

const COMPACT_DELIMITER: char = ':';
const SELECTION_DELIMITER: char = ',';

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("entry '{entry}' must have the form '<question_id>:<answer>'")]
    MalformedEntry { entry: String },
    #[error("question '{question_id}' is not part of KYC version {version}")]
    UnknownQuestion { question_id: String, version: u32 },
    #[error("answer for '{question_id}' must be {expected}")]
    AnswerTypeMismatch {
        question_id: String,
        expected: AnswerType,
    },
}

/// Wire payload that can be normalized against a specification.
pub trait AnswerPayload {
    fn decode(self, specification: &Specification) -> Result<AnswerSet, CodecError>;
}

/// Structured (v1) answer item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredAnswer {
    pub question_id: String,
    pub answer: Value,
}

/// Structured (v1) answer list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructuredAnswers(pub Vec<StructuredAnswer>);

/// Compact (v2) answer list of `"question_id:value"` strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompactAnswers(pub Vec<String>);

impl AnswerPayload for StructuredAnswers {
    fn decode(self, specification: &Specification) -> Result<AnswerSet, CodecError> {
        let mut answers = AnswerSet::new();
        for item in self.0 {
            let entry = lookup(specification, &item.question_id)?;
            let value = coerce_json(entry, item.answer)?;
            answers.insert(item.question_id, value);
        }
        Ok(answers)
    }
}

impl AnswerPayload for CompactAnswers {
    fn decode(self, specification: &Specification) -> Result<AnswerSet, CodecError> {
        let mut answers = AnswerSet::new();
        for raw in self.0 {
            let (question_id, value) = split_compact(&raw)?;
            let entry = lookup(specification, question_id)?;
            let value = coerce_str(entry, value)?;
            answers.insert(question_id, value);
        }
        Ok(answers)
    }
}

/// Splits on the first delimiter. Entries without one, or with an empty question id, are
/// rejected rather than guessed at.
pub fn split_compact(entry: &str) -> Result<(&str, &str), CodecError> {
    match entry.split_once(COMPACT_DELIMITER) {
        Some((question_id, value)) if !question_id.is_empty() => Ok((question_id, value)),
        _ => Err(CodecError::MalformedEntry {
            entry: entry.to_string(),
        }),
    }
}

fn lookup<'a>(
    specification: &'a Specification,
    question_id: &str,
) -> Result<&'a TemplateEntry, CodecError> {
    specification
        .entry(question_id)
        .ok_or_else(|| CodecError::UnknownQuestion {
            question_id: question_id.to_string(),
            version: specification.version,
        })
}

fn coerce_json(entry: &TemplateEntry, value: Value) -> Result<AnswerValue, CodecError> {
    match (entry.answer_type, value) {
        (_, Value::String(raw)) => coerce_str(entry, &raw),
        (AnswerType::Boolean, Value::Bool(flag)) => Ok(AnswerValue::Boolean(flag)),
        (AnswerType::MultiSelection, Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::String(choice) => Ok(choice),
                _ => Err(mismatch(entry)),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(AnswerValue::MultiSelection),
        _ => Err(mismatch(entry)),
    }
}

fn coerce_str(entry: &TemplateEntry, raw: &str) -> Result<AnswerValue, CodecError> {
    match entry.answer_type {
        AnswerType::Text => Ok(AnswerValue::Text(raw.to_string())),
        AnswerType::Boolean => parse_bool(entry, raw),
        AnswerType::MultiSelection => Ok(AnswerValue::MultiSelection(
            raw.split(SELECTION_DELIMITER)
                .map(str::trim)
                .filter(|choice| !choice.is_empty())
                .map(str::to_string)
                .collect(),
        )),
    }
}

fn parse_bool(entry: &TemplateEntry, raw: &str) -> Result<AnswerValue, CodecError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(AnswerValue::Boolean(true)),
        "false" => Ok(AnswerValue::Boolean(false)),
        _ => Err(mismatch(entry)),
    }
}

fn mismatch(entry: &TemplateEntry) -> CodecError {
    CodecError::AnswerTypeMismatch {
        question_id: entry.question_id.clone(),
        expected: entry.answer_type,
    }
}
