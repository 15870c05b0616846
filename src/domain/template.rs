use std::fmt;
use std::fs;
use std::path::Path;

use figment::providers::{Format, Json, Toml, Yaml};
use figment::Figment;
use regex::Regex;
use serde::Deserialize;

use crate::app::{PagesiftError, Result};
use crate::domain::{null_as_default, CompiledRule, Document, RuleSpec, TemplateType};
use crate::query::QueryDialect;

/// A template as written in a template file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TemplateSpec {
    #[serde(deserialize_with = "null_as_default")]
    pub pattern: String,
    #[serde(deserialize_with = "null_as_default")]
    pub domain: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub template_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub rules: Vec<RuleSpec>,
}

/// On-disk encodings accepted for template files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateFormat {
    Yaml,
    Toml,
    Json,
}

impl TemplateFormat {
    /// Pick the format from the file extension. Anything that is not
    /// `.toml` or `.json` is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("toml") => Self::Toml,
            Some("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

impl TemplateSpec {
    pub fn parse(content: &str, format: TemplateFormat) -> std::result::Result<Self, figment::Error> {
        let figment = match format {
            TemplateFormat::Yaml => Figment::from(Yaml::string(content)),
            TemplateFormat::Toml => Figment::from(Toml::string(content)),
            TemplateFormat::Json => Figment::from(Json::string(content)),
        };
        figment.extract()
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content, TemplateFormat::from_path(path)).map_err(|e| {
            PagesiftError::TemplateParse {
                path: path.to_path_buf(),
                source: Box::new(e),
            }
        })
    }
}

/// A validated template, ready to be applied to any number of pages.
pub struct CompiledTemplate {
    url_match: Regex,
    domain: String,
    name: String,
    template_type: TemplateType,
    rules: Vec<CompiledRule>,
}

impl CompiledTemplate {
    pub fn compile(spec: TemplateSpec, dialect: &dyn QueryDialect) -> Result<Self> {
        if spec.pattern.is_empty() {
            return Err(PagesiftError::Validation("pattern must be non-empty".into()));
        }
        if spec.domain.is_empty() {
            return Err(PagesiftError::Validation("domain must be non-empty".into()));
        }
        if spec.name.is_empty() {
            return Err(PagesiftError::Validation("name must be non-empty".into()));
        }
        if spec.rules.is_empty() {
            return Err(PagesiftError::Validation(
                "at least one rule must be specified".into(),
            ));
        }

        let url_match = Regex::new(&spec.pattern).map_err(|source| PagesiftError::Pattern {
            pattern: spec.pattern.clone(),
            source,
        })?;

        // Patterns usually escape the dots of the domain, so accept either spelling.
        if !spec.pattern.contains(&spec.domain)
            && !spec.pattern.contains(&regex::escape(&spec.domain))
        {
            return Err(PagesiftError::Validation(format!(
                "pattern `{}` should contain the domain `{}`",
                spec.pattern, spec.domain
            )));
        }

        let template_type = spec.template_type.parse::<TemplateType>()?;

        let rules = spec
            .rules
            .into_iter()
            .map(|rule| CompiledRule::compile(rule, template_type, dialect))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            "Compiled template {} ({} rules, {} dialect)",
            spec.name,
            rules.len(),
            dialect.name()
        );

        Ok(Self {
            url_match,
            domain: spec.domain,
            name: spec.name,
            template_type,
            rules,
        })
    }

    /// Read, validate and compile the template stored at `path`.
    pub fn load(path: &Path, dialect: &dyn QueryDialect) -> Result<Self> {
        Self::compile(TemplateSpec::from_file(path)?, dialect)
    }

    /// Whether the url pattern matches anywhere in `url`.
    pub fn matches(&self, url: &str) -> bool {
        self.url_match.is_match(url)
    }

    pub fn pattern(&self) -> &str {
        self.url_match.as_str()
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template_type(&self) -> TemplateType {
        self.template_type
    }

    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    /// Run every rule against `document`, in rule order. Urls are not
    /// checked here; see [`CompiledTemplate::matches`].
    pub fn evaluate_rules(&self, document: &Document) -> Vec<Vec<String>> {
        self.rules.iter().map(|rule| rule.evaluate(document)).collect()
    }
}

impl fmt::Debug for CompiledTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledTemplate")
            .field("pattern", &self.pattern())
            .field("domain", &self.domain)
            .field("name", &self.name)
            .field("template_type", &self.template_type)
            .field("rules", &self.rules)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::XPathDialect;
    use std::io::Write;

    fn product_spec() -> TemplateSpec {
        TemplateSpec {
            pattern: r"example\.com/product/.*".into(),
            domain: "example.com".into(),
            name: "example products".into(),
            template_type: "product".into(),
            rules: vec![
                RuleSpec::new("title", "//h1", "TEXT"),
                RuleSpec::new("price", "//span[@itemprop='price']", "TEXT"),
            ],
        }
    }

    fn compile(spec: TemplateSpec) -> Result<CompiledTemplate> {
        CompiledTemplate::compile(spec, &XPathDialect)
    }

    #[test]
    fn test_compiles_valid_template() {
        let template = compile(product_spec()).unwrap();
        assert_eq!(template.name(), "example products");
        assert_eq!(template.domain(), "example.com");
        assert_eq!(template.template_type(), TemplateType::Product);
        let names: Vec<_> = template.rules().iter().map(CompiledRule::name).collect();
        assert_eq!(names, vec!["title", "price"]);
    }

    #[test]
    fn test_url_match_is_unanchored_search() {
        let template = compile(product_spec()).unwrap();
        assert!(template.matches("https://example.com/product/42"));
        assert!(template.matches("https://www.example.com/product/shoe?color=red"));
        assert!(!template.matches("https://other.com/x"));
        assert!(!template.matches("https://example.com/category/shoes"));
    }

    #[test]
    fn test_empty_fields_rejected() {
        let mut specs = Vec::new();
        for field in ["pattern", "domain", "name"] {
            let mut spec = product_spec();
            match field {
                "pattern" => spec.pattern.clear(),
                "domain" => spec.domain.clear(),
                _ => spec.name.clear(),
            }
            specs.push(spec);
        }
        let mut no_rules = product_spec();
        no_rules.rules.clear();
        specs.push(no_rules);

        for spec in specs {
            let err = compile(spec).unwrap_err();
            assert!(err.is_validation(), "unexpected error: {err}");
        }
    }

    #[test]
    fn test_domain_must_appear_in_pattern() {
        let mut spec = product_spec();
        spec.domain = "example.org".into();
        let err = compile(spec).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("example.org"));
    }

    #[test]
    fn test_domain_may_appear_unescaped() {
        let mut spec = product_spec();
        spec.pattern = "shop.example.com/p/".into();
        spec.domain = "example.com".into();
        assert!(compile(spec).is_ok());
    }

    #[test]
    fn test_invalid_pattern_is_compile_error() {
        let mut spec = product_spec();
        spec.pattern = r"example\.com/(product".into();
        let err = compile(spec).unwrap_err();
        assert!(err.is_compile());
        assert!(matches!(err, PagesiftError::Pattern { .. }));
    }

    #[test]
    fn test_unknown_type_rejected() {
        for kind in ["", "article"] {
            let mut spec = product_spec();
            spec.template_type = kind.into();
            assert!(compile(spec).unwrap_err().is_validation());
        }
    }

    #[test]
    fn test_type_selects_vocabulary() {
        let mut spec = product_spec();
        spec.template_type = "General".into();
        spec.rules = vec![RuleSpec::new("publish_datetime", "//time/@datetime", "TEXT")];
        assert_eq!(compile(spec).unwrap().template_type(), TemplateType::General);
    }

    #[test]
    fn test_first_failing_rule_aborts() {
        let mut spec = product_spec();
        spec.rules.push(RuleSpec::new("brand", "//span[", "TEXT"));
        spec.rules.push(RuleSpec::new("nonsense", "//p", "TEXT"));
        match compile(spec).unwrap_err() {
            PagesiftError::Query { rule, .. } => assert_eq!(rule, "brand"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_compilation_is_deterministic() {
        let document = Document::parse(
            "<html><body><h1>Shoe</h1><span itemprop='price'>42</span></body></html>",
        );
        let first = compile(product_spec()).unwrap();
        let second = compile(product_spec()).unwrap();
        assert_eq!(first.pattern(), second.pattern());
        assert_eq!(first.evaluate_rules(&document), second.evaluate_rules(&document));
        assert_eq!(
            first.evaluate_rules(&document),
            vec![vec!["Shoe".to_string()], vec!["42".to_string()]]
        );
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(TemplateFormat::from_path(Path::new("t.toml")), TemplateFormat::Toml);
        assert_eq!(TemplateFormat::from_path(Path::new("t.JSON")), TemplateFormat::Json);
        assert_eq!(TemplateFormat::from_path(Path::new("t.yml")), TemplateFormat::Yaml);
        assert_eq!(TemplateFormat::from_path(Path::new("template")), TemplateFormat::Yaml);
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
pattern: "example\\.com/product/.*"
domain: example.com
name: example products
type: product
rules:
  - name: title
    xPath: //h1
    output_format: TEXT
  - name: image_urls
    xPath: //img/@src
    output_format: LIST_TEXT
"#;
        let spec = TemplateSpec::parse(yaml, TemplateFormat::Yaml).unwrap();
        assert_eq!(spec.pattern, r"example\.com/product/.*");
        assert_eq!(spec.template_type, "product");
        assert_eq!(spec.rules.len(), 2);
        assert_eq!(spec.rules[1], RuleSpec::new("image_urls", "//img/@src", "LIST_TEXT"));
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
pattern = 'example\.com/product/.*'
domain = "example.com"
name = "example products"
type = "product"

[[rules]]
name = "title"
query = "//h1"
output_format = "TEXT"
"#;
        let spec = TemplateSpec::parse(toml, TemplateFormat::Toml).unwrap();
        assert_eq!(spec.rules, vec![RuleSpec::new("title", "//h1", "TEXT")]);
        assert!(compile(spec).is_ok());
    }

    #[test]
    fn test_missing_keys_become_validation_errors() {
        let spec = TemplateSpec::parse("name: partial\n", TemplateFormat::Yaml).unwrap();
        assert!(spec.rules.is_empty());
        assert!(compile(spec).unwrap_err().is_validation());
    }

    #[test]
    fn test_null_values_become_validation_errors() {
        let yaml = r#"
pattern: "example\\.com/product/.*"
domain:
name: example products
type: product
rules:
  - name: title
    xPath: //h1
    output_format: TEXT
"#;
        let spec = TemplateSpec::parse(yaml, TemplateFormat::Yaml).unwrap();
        assert_eq!(spec.domain, "");
        let err = compile(spec).unwrap_err();
        assert!(err.is_validation(), "unexpected error: {err}");
        assert!(err.to_string().contains("domain"));

        let spec = TemplateSpec::parse(
            "pattern: a\ndomain: a\nname: a\ntype: product\nrules:\n",
            TemplateFormat::Yaml,
        )
        .unwrap();
        assert!(spec.rules.is_empty());
        assert!(compile(spec).unwrap_err().is_validation());
    }

    #[test]
    fn test_null_rule_values_become_validation_errors() {
        let yaml = r#"
pattern: "example\\.com/product/.*"
domain: example.com
name: example products
type: product
rules:
  - name: title
    xPath:
    output_format: TEXT
"#;
        let spec = TemplateSpec::parse(yaml, TemplateFormat::Yaml).unwrap();
        assert_eq!(spec.rules[0], RuleSpec::new("title", "", "TEXT"));
        assert!(compile(spec).unwrap_err().is_validation());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.json");
        let mut file = fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{"pattern":"example\\.com/product/.*","domain":"example.com","name":"p","type":"product","rules":[{{"name":"title","xPath":"//h1","output_format":"TEXT"}}]}}"#
        )
        .unwrap();

        let template = CompiledTemplate::load(&path, &XPathDialect).unwrap();
        assert_eq!(template.rules().len(), 1);
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        fs::write(&path, "rules: [unclosed\n").unwrap();

        let err = CompiledTemplate::load(&path, &XPathDialect).unwrap_err();
        assert!(matches!(err, PagesiftError::TemplateParse { .. }));
        assert!(err.to_string().contains("broken.yaml"));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CompiledTemplate::load(&dir.path().join("missing.yaml"), &XPathDialect)
            .unwrap_err();
        assert!(matches!(err, PagesiftError::Io(_)));
    }
}
