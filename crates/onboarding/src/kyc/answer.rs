use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::specification::AnswerType;

/// Typed answer payload, resolved from the question's [`AnswerType`] when decoded.
///
/// Serializes as the bare JSON value so clients see `"Acme"`, `true` or `["a", "b"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Text(String),
    Boolean(bool),
    MultiSelection(Vec<String>),
}

impl AnswerValue {
    pub fn answer_type(&self) -> AnswerType {
        match self {
            AnswerValue::Text(_) => AnswerType::Text,
            AnswerValue::Boolean(_) => AnswerType::Boolean,
            AnswerValue::MultiSelection(_) => AnswerType::MultiSelection,
        }
    }

    /// Whitespace-only text and empty selections carry no answer.
    pub fn is_blank(&self) -> bool {
        match self {
            AnswerValue::Text(text) => text.trim().is_empty(),
            AnswerValue::Boolean(_) => false,
            AnswerValue::MultiSelection(choices) => choices.is_empty(),
        }
    }
}

/// Single `(question_id, answer)` pair as exchanged with clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    pub answer: AnswerValue,
}

/// A customer's answers keyed by question id, so each question holds at most one answer.
///
/// Iteration happens to follow question id order; callers should not depend on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSet {
    answers: BTreeMap<String, AnswerValue>,
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `value` for `question_id`, returning the answer it replaced.
    pub fn insert(
        &mut self,
        question_id: impl Into<String>,
        value: AnswerValue,
    ) -> Option<AnswerValue> {
        self.answers.insert(question_id.into(), value)
    }

    pub fn get(&self, question_id: &str) -> Option<&AnswerValue> {
        self.answers.get(question_id)
    }

    pub fn contains(&self, question_id: &str) -> bool {
        self.answers.contains_key(question_id)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnswerValue)> {
        self.answers
            .iter()
            .map(|(question_id, value)| (question_id.as_str(), value))
    }

    pub fn to_answers(&self) -> Vec<Answer> {
        self.iter()
            .map(|(question_id, answer)| Answer {
                question_id: question_id.to_string(),
                answer: answer.clone(),
            })
            .collect()
    }
}

impl FromIterator<Answer> for AnswerSet {
    /// Later answers for a repeated question id replace earlier ones.
    fn from_iter<I: IntoIterator<Item = Answer>>(iter: I) -> Self {
        let mut set = AnswerSet::new();
        for answer in iter {
            set.insert(answer.question_id, answer.answer);
        }
        set
    }
}

impl Serialize for AnswerSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_answers().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AnswerSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let answers = Vec::<Answer>::deserialize(deserializer)?;
        Ok(answers.into_iter().collect())
    }
}

/// Overlays `incoming` on `existing`.
///
/// Incoming answers replace stored ones with the same question id and new ids are added.
/// Nothing in `existing` is dropped unless `incoming` supplies a replacement.
pub fn merge(existing: &AnswerSet, incoming: AnswerSet) -> AnswerSet {
    let mut merged = existing.clone();
    merged.answers.extend(incoming.answers);
    merged
}
