pub mod document;
pub mod rule;
pub mod template;
pub mod vocabulary;

pub use document::Document;
pub use rule::{CompiledRule, OutputFormat, RuleSpec};
pub use template::{CompiledTemplate, TemplateFormat, TemplateSpec};
pub use vocabulary::TemplateType;

use serde::{Deserialize, Deserializer};

/// Read an explicit null (`domain:` with no value in YAML) as the default,
/// so it fails validation the same way an empty value does.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
