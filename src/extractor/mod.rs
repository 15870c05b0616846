//! Applies a compiled template to a parsed page.

use crate::domain::{CompiledTemplate, Document};

/// Separator placed between the values of a rule that matched several nodes.
pub const FIELD_SEPARATOR: &str = ", ";

/// Column name of the leading url column.
pub const URL_COLUMN: &str = "url";

/// Header row for `template`: `url` followed by the rule names in rule order.
pub fn header(template: &CompiledTemplate) -> Vec<String> {
    std::iter::once(URL_COLUMN.to_string())
        .chain(template.rules().iter().map(|rule| rule.name().to_string()))
        .collect()
}

/// Evaluate `template` against `document` fetched from `url`.
///
/// Returns `None` without running any rule when the url does not match the
/// template's pattern. Otherwise returns `url` followed by one value per
/// rule: the rule's results joined with [`FIELD_SEPARATOR`], or an empty
/// string when the query selected nothing. `TEXT` and `LIST_TEXT` rules are
/// joined the same way.
pub fn evaluate(url: &str, template: &CompiledTemplate, document: &Document) -> Option<Vec<String>> {
    if !template.matches(url) {
        return None;
    }

    let mut row = Vec::with_capacity(template.rules().len() + 1);
    row.push(url.to_string());
    row.extend(
        template
            .evaluate_rules(document)
            .into_iter()
            .map(|values| values.join(FIELD_SEPARATOR)),
    );
    Some(row)
}
