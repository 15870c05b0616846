use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::app::{PagesiftError, Result};
use crate::domain::{null_as_default, Document, TemplateType};
use crate::query::{CompiledQuery, QueryDialect};

/// One extraction rule as written in a template file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RuleSpec {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(alias = "xPath", alias = "xpath", deserialize_with = "null_as_default")]
    pub query: String,
    #[serde(alias = "outputFormat", deserialize_with = "null_as_default")]
    pub output_format: String,
}

impl RuleSpec {
    pub fn new(name: &str, query: &str, output_format: &str) -> Self {
        Self {
            name: name.to_string(),
            query: query.to_string(),
            output_format: output_format.to_string(),
        }
    }
}

/// Cardinality hint carried by a rule.
///
/// Extraction joins every match with `", "` for both kinds; the hint is
/// kept for consumers of the compiled template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    ListText,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 2] = [OutputFormat::Text, OutputFormat::ListText];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::ListText => "LIST_TEXT",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = PagesiftError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                PagesiftError::Validation(format!(
                    "output_format `{}` must be one of {{TEXT, LIST_TEXT}}",
                    s
                ))
            })
    }
}

/// A validated rule with its query compiled.
pub struct CompiledRule {
    name: String,
    output_format: OutputFormat,
    query: Box<dyn CompiledQuery>,
}

impl CompiledRule {
    /// Validate `spec` against `vocabulary` and compile its query once.
    pub fn compile(
        spec: RuleSpec,
        vocabulary: TemplateType,
        dialect: &dyn QueryDialect,
    ) -> Result<Self> {
        if spec.name.is_empty() {
            return Err(PagesiftError::Validation("rule name must be non-empty".into()));
        }
        if spec.query.is_empty() {
            return Err(PagesiftError::Validation(format!(
                "query of rule `{}` must be non-empty",
                spec.name
            )));
        }
        if spec.output_format.is_empty() {
            return Err(PagesiftError::Validation(format!(
                "output_format of rule `{}` must be non-empty",
                spec.name
            )));
        }
        if !vocabulary.permits(&spec.name) {
            return Err(PagesiftError::Validation(format!(
                "rule name `{}` is not valid for {} templates; must be one of {{{}}}",
                spec.name,
                vocabulary,
                vocabulary.names().join(", ")
            )));
        }
        let output_format = spec.output_format.parse::<OutputFormat>()?;

        let query = dialect
            .compile(&spec.query)
            .map_err(|source| PagesiftError::Query {
                rule: spec.name.clone(),
                query: spec.query.clone(),
                source,
            })?;

        Ok(Self {
            name: spec.name,
            output_format,
            query,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    pub fn query(&self) -> &dyn CompiledQuery {
        self.query.as_ref()
    }

    /// Run the compiled query against `document`.
    pub fn evaluate(&self, document: &Document) -> Vec<String> {
        self.query.evaluate(document)
    }
}

impl fmt::Debug for CompiledRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledRule")
            .field("name", &self.name)
            .field("output_format", &self.output_format)
            .field("query", &self.query.expression())
            .finish()
    }
}
