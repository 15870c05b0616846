use scraper::Html;

/// A fetched page: the raw markup exactly as received plus its parsed tree.
///
/// Parsing follows HTML5 error recovery and never fails. The raw source is
/// kept so the page can be written to the cache unchanged.
#[derive(Debug, Clone)]
pub struct Document {
    source: String,
    html: Html,
}

impl Document {
    pub fn parse(source: impl Into<String>) -> Self {
        let source = source.into();
        let html = Html::parse_document(&source);
        Self { source, html }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn html(&self) -> &Html {
        &self.html
    }
}
