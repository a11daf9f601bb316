use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Shape an answer must take for a given question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerType {
    Text,
    Boolean,
    MultiSelection,
}

impl AnswerType {
    pub const fn label(self) -> &'static str {
        match self {
            AnswerType::Text => "text",
            AnswerType::Boolean => "boolean",
            AnswerType::MultiSelection => "multi_selection",
        }
    }
}

impl fmt::Display for AnswerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One question of a published specification.
///
/// `depends_on` lists question ids that must be answered before this entry applies. The
/// references are carried for clients but neither enforced nor checked for existence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateEntry {
    pub question_id: String,
    pub answer_type: AnswerType,
    pub mandatory: bool,
    pub depends_on: Vec<String>,
}

impl TemplateEntry {
    fn new(
        question_id: &str,
        answer_type: AnswerType,
        mandatory: bool,
        depends_on: &[&str],
    ) -> Self {
        Self {
            question_id: question_id.to_string(),
            answer_type,
            mandatory,
            depends_on: depends_on.iter().map(|id| id.to_string()).collect(),
        }
    }
}

/// Immutable, versioned question template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specification {
    pub version: u32,
    pub template: Vec<TemplateEntry>,
}

impl Specification {
    /// Version 1 of the business questionnaire.
    pub fn business_v1() -> Self {
        Self {
            version: 1,
            template: vec![
                TemplateEntry::new("external_id_question_1", AnswerType::Text, true, &[]),
                TemplateEntry::new("external_id_question_2", AnswerType::Boolean, false, &[]),
                TemplateEntry::new(
                    "external_id_question_3",
                    AnswerType::MultiSelection,
                    true,
                    &["external_id_question_1"],
                ),
            ],
        }
    }

    pub fn entry(&self, question_id: &str) -> Option<&TemplateEntry> {
        self.template
            .iter()
            .find(|entry| entry.question_id == question_id)
    }

    /// Mandatory question ids for which `is_answered` returns false, in template order.
    pub fn missing_mandatory<F>(&self, is_answered: F) -> Vec<String>
    where
        F: Fn(&str) -> bool,
    {
        self.template
            .iter()
            .filter(|entry| entry.mandatory && !is_answered(&entry.question_id))
            .map(|entry| entry.question_id.clone())
            .collect()
    }
}

/// Field of the classification request that failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationField {
    Kind,
    Entity,
}

impl fmt::Display for ClassificationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassificationField::Kind => f.write_str("customer kind"),
            ClassificationField::Entity => f.write_str("entity"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("'{value}' not supported as {field}")]
    ClassificationNotSupported {
        field: ClassificationField,
        value: String,
    },
}

/// Lookup table from `(classification, entity)` to the specification that applies.
///
/// Keys are stored lowercased so resolution ignores case. Published specifications are shared
/// behind `Arc` and never mutated.
#[derive(Debug, Default, Clone)]
pub struct SpecificationCatalog {
    by_classification: HashMap<(String, String), Arc<Specification>>,
    by_version: HashMap<u32, Arc<Specification>>,
}

impl SpecificationCatalog {
    /// Catalog with the combinations the service supports out of the box.
    pub fn standard() -> Self {
        let mut catalog = Self::default();
        catalog.register("business", "anchorage hold", Specification::business_v1());
        catalog
    }

    /// Publishes `specification` for a classification pair. A version already published is
    /// reused so every pair bound to it resolves to the same instance.
    pub fn register(&mut self, classification: &str, entity: &str, specification: Specification) {
        let shared = self
            .by_version
            .entry(specification.version)
            .or_insert_with(|| Arc::new(specification))
            .clone();
        self.by_classification
            .insert((normalize(classification), normalize(entity)), shared);
    }

    pub fn resolve(
        &self,
        classification: &str,
        entity: &str,
    ) -> Result<Arc<Specification>, ResolveError> {
        let classification_key = normalize(classification);
        let entity_key = normalize(entity);

        if let Some(specification) = self
            .by_classification
            .get(&(classification_key.clone(), entity_key))
        {
            return Ok(Arc::clone(specification));
        }

        let known_classification = self
            .by_classification
            .keys()
            .any(|(kind, _)| *kind == classification_key);
        let (field, value) = if known_classification {
            (ClassificationField::Entity, entity)
        } else {
            (ClassificationField::Kind, classification)
        };

        Err(ResolveError::ClassificationNotSupported {
            field,
            value: value.to_string(),
        })
    }

    pub fn by_version(&self, version: u32) -> Option<Arc<Specification>> {
        self.by_version.get(&version).cloned()
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}
