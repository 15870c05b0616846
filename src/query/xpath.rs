//! XPath subset compiled onto CSS selectors.
//!
//! A location path is translated step by step into one `scraper` selector,
//! so evaluation is a single walk over the document in document order. The
//! last step may be followed by a value selection that decides which
//! strings each matched element contributes:
//!
//! | expression          | values per matched element               |
//! |---------------------|------------------------------------------|
//! | `//h1`              | descendant text, trimmed                 |
//! | `//p/text()`        | each direct, non-blank text node         |
//! | `//p//text()`       | each descendant, non-blank text node     |
//! | `//p/allText()`     | descendant text, trimmed                 |
//! | `//p/tidyText()`    | descendant text, whitespace collapsed    |
//! | `//div/html()`      | inner HTML                               |
//! | `//div/outerHtml()` | outer HTML                               |
//! | `//a/@href`         | attribute value, when present            |
//!
//! Supported predicates are `[@a]`, `[@a='v']`, `[@a!='v']`,
//! `[contains(@a,'v')]`, `[starts-with(@a,'v')]`, `[ends-with(@a,'v')]`,
//! `[n]` and `[last()]`, combined with `and` or stacked. A positional
//! predicate must come before any attribute filter on the same step, since
//! CSS cannot count among filtered siblings.

use scraper::{ElementRef, Selector};

use crate::domain::Document;
use crate::query::{CompiledQuery, QueryDialect, QueryError};

#[derive(Debug, Clone, Copy, Default)]
pub struct XPathDialect;

impl QueryDialect for XPathDialect {
    fn name(&self) -> &str {
        "xpath"
    }

    fn compile(&self, expression: &str) -> Result<Box<dyn CompiledQuery>, QueryError> {
        Ok(Box::new(XPathQuery::compile(expression)?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Selection {
    Element,
    OwnText,
    DescendantText,
    AllText,
    TidyText,
    InnerHtml,
    OuterHtml,
    Attribute(String),
}

impl Selection {
    fn collect_into(&self, element: ElementRef<'_>, values: &mut Vec<String>) {
        match self {
            Self::Element | Self::AllText => {
                values.push(element.text().collect::<String>().trim().to_string());
            }
            Self::OwnText => values.extend(
                element
                    .children()
                    .filter_map(|node| node.value().as_text())
                    .map(|text| text.trim())
                    .filter(|text| !text.is_empty())
                    .map(String::from),
            ),
            Self::DescendantText => values.extend(
                element
                    .text()
                    .map(str::trim)
                    .filter(|text| !text.is_empty())
                    .map(String::from),
            ),
            Self::TidyText => {
                let text = element.text().collect::<String>();
                values.push(text.split_whitespace().collect::<Vec<_>>().join(" "));
            }
            Self::InnerHtml => values.push(element.inner_html()),
            Self::OuterHtml => values.push(element.html()),
            Self::Attribute(name) => {
                if let Some(value) = element.value().attr(name) {
                    values.push(value.to_string());
                }
            }
        }
    }
}

/// A compiled XPath expression.
#[derive(Debug)]
pub struct XPathQuery {
    expression: String,
    css: String,
    selector: Selector,
    selection: Selection,
}

impl XPathQuery {
    pub fn compile(expression: &str) -> Result<Self, QueryError> {
        let expression = expression.trim();
        if expression.is_empty() {
            return Err(QueryError::Empty);
        }

        let branches = Parser::new(expression).union()?;
        let selection = branches[0].selection.clone();
        if branches.iter().any(|branch| branch.selection != selection) {
            return Err(QueryError::Unsupported(
                "union branches that select different kinds of values".into(),
            ));
        }

        let css = branches
            .iter()
            .map(|branch| branch.css.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let selector = Selector::parse(&css).map_err(|e| QueryError::Selector {
            css: css.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            expression: expression.to_string(),
            css,
            selector,
            selection,
        })
    }

    /// The CSS selector the location path was translated into.
    pub fn css(&self) -> &str {
        &self.css
    }
}

impl CompiledQuery for XPathQuery {
    fn expression(&self) -> &str {
        &self.expression
    }

    fn evaluate(&self, document: &Document) -> Vec<String> {
        let mut values = Vec::new();
        for element in document.html().select(&self.selector) {
            self.selection.collect_into(element, &mut values);
        }
        values
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
}

enum Position {
    Nth(usize),
    Last,
}

struct Branch {
    css: String,
    selection: Selection,
}

struct Step {
    element: Option<String>,
    filters: String,
}

impl Step {
    fn css(&self) -> String {
        format!("{}{}", self.element.as_deref().unwrap_or("*"), self.filters)
    }

    fn rooted(&self) -> String {
        format!("{}:root{}", self.element.as_deref().unwrap_or("*"), self.filters)
    }
}

struct Parser<'a> {
    source: &'a str,
    position: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            position: 0,
        }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.position..]
    }

    fn at_end(&self) -> bool {
        self.position >= self.source.len()
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.rest().trim_start();
        self.position = self.source.len() - trimmed.len();
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.position += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> Result<(), QueryError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn unexpected(&self) -> QueryError {
        let found = match self.rest().chars().next() {
            Some(c) => format!("`{c}`"),
            None => "end of query".to_string(),
        };
        QueryError::Unexpected {
            position: self.position,
            found,
        }
    }

    fn union(&mut self) -> Result<Vec<Branch>, QueryError> {
        let mut branches = vec![self.path()?];
        loop {
            self.skip_whitespace();
            if self.at_end() {
                return Ok(branches);
            }
            self.expect("|")?;
            branches.push(self.path()?);
        }
    }

    fn axis(&mut self) -> Option<Axis> {
        self.skip_whitespace();
        if self.eat("//") {
            Some(Axis::Descendant)
        } else if self.eat("/") {
            Some(Axis::Child)
        } else {
            None
        }
    }

    fn path(&mut self) -> Result<Branch, QueryError> {
        // A relative path starts at the document node, like an absolute one.
        let mut axis = self.axis().unwrap_or(Axis::Child);
        let mut css = String::new();

        loop {
            self.skip_whitespace();
            if let Some(selection) = self.selection(axis)? {
                if css.is_empty() {
                    return Err(QueryError::Unsupported(
                        "value selection without a location step".into(),
                    ));
                }
                return Ok(Branch { css, selection });
            }

            let step = self.step()?;
            if css.is_empty() {
                css = match axis {
                    Axis::Child => step.rooted(),
                    Axis::Descendant => step.css(),
                };
            } else {
                css.push_str(match axis {
                    Axis::Child => " > ",
                    Axis::Descendant => " ",
                });
                css.push_str(&step.css());
            }

            match self.axis() {
                Some(next) => axis = next,
                None => {
                    return Ok(Branch {
                        css,
                        selection: Selection::Element,
                    })
                }
            }
        }
    }

    fn selection(&mut self, axis: Axis) -> Result<Option<Selection>, QueryError> {
        let start = self.position;
        let selection = if self.eat("text()") {
            match axis {
                Axis::Child => Selection::OwnText,
                Axis::Descendant => Selection::DescendantText,
            }
        } else if self.eat("allText()") || self.eat("string()") {
            Selection::AllText
        } else if self.eat("tidyText()") {
            Selection::TidyText
        } else if self.eat("html()") {
            Selection::InnerHtml
        } else if self.eat("outerHtml()") {
            Selection::OuterHtml
        } else if self.eat("@") {
            Selection::Attribute(self.name()?)
        } else {
            return Ok(None);
        };

        if axis == Axis::Descendant && selection != Selection::DescendantText {
            return Err(QueryError::Unsupported(format!(
                "`//` before `{}`",
                &self.source[start..self.position]
            )));
        }
        Ok(Some(selection))
    }

    fn step(&mut self) -> Result<Step, QueryError> {
        let element = if self.eat("*") {
            None
        } else {
            Some(self.name()?)
        };
        let mut step = Step {
            element,
            filters: String::new(),
        };
        while self.eat("[") {
            self.predicate(&mut step)?;
        }
        Ok(step)
    }

    fn name(&mut self) -> Result<String, QueryError> {
        let rest = self.rest();
        let len = rest
            .char_indices()
            .take_while(|&(i, c)| {
                c.is_ascii_alphabetic() || c == '_' || (i > 0 && (c.is_ascii_digit() || c == '-'))
            })
            .count();
        if len == 0 {
            return Err(self.unexpected());
        }
        self.position += len;
        Ok(rest[..len].to_ascii_lowercase())
    }

    fn literal(&mut self) -> Result<String, QueryError> {
        let quote = match self.rest().chars().next() {
            Some(quote @ ('\'' | '"')) => quote,
            _ => return Err(self.unexpected()),
        };
        let body = &self.rest()[1..];
        let Some(end) = body.find(quote) else {
            return Err(QueryError::Unexpected {
                position: self.position,
                found: "unterminated string literal".into(),
            });
        };
        let value = body[..end].to_string();
        self.position += end + 2;
        Ok(value)
    }

    fn position(&mut self) -> Result<Option<Position>, QueryError> {
        if self.eat("last()") {
            return Ok(Some(Position::Last));
        }
        let digits = self.rest().bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return Ok(None);
        }
        let start = self.position;
        let index: usize = self.rest()[..digits]
            .parse()
            .map_err(|_| QueryError::Unexpected {
                position: start,
                found: "oversized position".into(),
            })?;
        self.position += digits;
        if index == 0 {
            return Err(QueryError::Unsupported("position 0 (positions start at 1)".into()));
        }
        Ok(Some(Position::Nth(index)))
    }

    fn predicate(&mut self, step: &mut Step) -> Result<(), QueryError> {
        self.skip_whitespace();
        if let Some(position) = self.position()? {
            if !step.filters.is_empty() {
                return Err(QueryError::Unsupported(
                    "positional predicate after another predicate".into(),
                ));
            }
            let pseudo = match (position, step.element.is_some()) {
                (Position::Nth(n), true) => format!(":nth-of-type({n})"),
                (Position::Nth(n), false) => format!(":nth-child({n})"),
                (Position::Last, true) => ":last-of-type".to_string(),
                (Position::Last, false) => ":last-child".to_string(),
            };
            step.filters.push_str(&pseudo);
        } else {
            loop {
                self.condition(step)?;
                self.skip_whitespace();
                if !self.eat("and") {
                    break;
                }
                self.skip_whitespace();
            }
        }
        self.skip_whitespace();
        self.expect("]")
    }

    fn condition(&mut self, step: &mut Step) -> Result<(), QueryError> {
        if self.eat("@") {
            let name = self.name()?;
            self.skip_whitespace();
            let filter = if self.eat("!=") {
                self.skip_whitespace();
                // A missing attribute never compares unequal.
                format!("[{name}]:not([{name}=\"{}\"])", escape(&self.literal()?))
            } else if self.eat("=") {
                self.skip_whitespace();
                format!("[{name}=\"{}\"]", escape(&self.literal()?))
            } else {
                format!("[{name}]")
            };
            step.filters.push_str(&filter);
            return Ok(());
        }

        let operator = if self.eat("contains(") {
            "*="
        } else if self.eat("starts-with(") {
            "^="
        } else if self.eat("ends-with(") {
            "$="
        } else {
            return Err(self.unexpected());
        };
        self.skip_whitespace();
        self.expect("@")?;
        let name = self.name()?;
        self.skip_whitespace();
        self.expect(",")?;
        self.skip_whitespace();
        let value = self.literal()?;
        self.skip_whitespace();
        self.expect(")")?;

        // Every string contains the empty string; CSS substring matchers
        // never match an empty value, so fall back to a presence test.
        if value.is_empty() {
            step.filters.push_str(&format!("[{name}]"));
        } else {
            step.filters
                .push_str(&format!("[{name}{operator}\"{}\"]", escape(&value)));
        }
        Ok(())
    }
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' | '\\' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '\n' => escaped.push_str("\\a "),
            _ => escaped.push(c),
        }
    }
    escaped
}
