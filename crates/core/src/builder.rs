//! Assembling a search index the way a documentation generator emits it.
//!
//! Pages are opened in order; each page contributes paragraph records at the
//! page location, section records at heading anchors and method records for
//! docstrings. Anchored locations are checked for collisions as they are
//! added, so a finished index always passes [`crate::validate::validate`]'s
//! error checks.

use std::collections::HashSet;

use docindex_common::{Category, DEFAULT_VAR_NAME, Error, Result, SearchIndex, SearchRecord};

use crate::slug::slugify;

#[derive(Debug, Clone)]
struct OpenPage {
    path: String,
    title: String,
}

/// Incremental producer of a [`SearchIndex`].
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    var_name: String,
    records: Vec<SearchRecord>,
    anchors: HashSet<(String, Category)>,
    current: Option<OpenPage>,
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexBuilder {
    /// Empty builder bound to the Documenter variable name.
    pub fn new() -> Self {
        Self {
            var_name: DEFAULT_VAR_NAME.to_string(),
            records: Vec::new(),
            anchors: HashSet::new(),
            current: None,
        }
    }

    /// Use a different variable name for the emitted index.
    pub fn with_var_name(mut self, var_name: impl Into<String>) -> Self {
        self.var_name = var_name.into();
        self
    }

    /// Start a page. Following records belong to it until the next call.
    ///
    /// `path` is the page's URL path relative to the site root (empty for the
    /// home page), `title` its human-readable name.
    pub fn page(&mut self, path: impl Into<String>, title: impl Into<String>) -> &mut Self {
        self.current = Some(OpenPage {
            path: path.into(),
            title: title.into(),
        });
        self
    }

    /// Add a body paragraph to the current page.
    pub fn paragraph(&mut self, text: impl Into<String>) -> Result<&mut Self> {
        let page = self.open_page()?;
        let record = SearchRecord::new(
            page.path.clone(),
            page.title.clone(),
            page.title.clone(),
            text,
            Category::Page,
        );
        self.push(record)
    }

    /// Add a heading of the current page; its anchor is the slug of `title`.
    pub fn section(&mut self, title: impl Into<String>) -> Result<&mut Self> {
        let title = title.into();
        let page = self.open_page()?;
        let record = SearchRecord::new(
            format!("{}#{}", page.path, slugify(&title)?),
            page.title.clone(),
            title,
            "",
            Category::Section,
        );
        self.push(record)
    }

    /// Add a rendered docstring under an explicit anchor of the current page.
    pub fn method(
        &mut self,
        title: impl Into<String>,
        anchor: &str,
        docstring: impl Into<String>,
    ) -> Result<&mut Self> {
        let page = self.open_page()?;
        let record = SearchRecord::new(
            format!("{}#{}", page.path, anchor),
            page.title.clone(),
            title,
            docstring,
            Category::Method,
        );
        self.push(record)
    }

    /// Add a prepared record, subject to the same checks.
    pub fn push(&mut self, record: SearchRecord) -> Result<&mut Self> {
        if record.category == Category::Method && record.text.trim().is_empty() {
            return Err(Error::EmptyDocstring {
                location: record.location,
            });
        }
        if record.category.is_anchored()
            && !self
                .anchors
                .insert((record.location.clone(), record.category))
        {
            return Err(Error::DuplicateAnchor {
                location: record.location,
            });
        }
        self.records.push(record);
        Ok(self)
    }

    /// Records added so far.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True before any record has been added.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Finish and hand over the index.
    pub fn finish(self) -> SearchIndex {
        tracing::debug!("IndexBuilder: finished with {} records", self.records.len());
        SearchIndex::new(self.records).with_var_name(self.var_name)
    }

    fn open_page(&self) -> Result<OpenPage> {
        self.current
            .clone()
            .ok_or_else(|| Error::Builder("no page started".to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::validate::validate;

    #[test]
    fn test_build_reproduces_documenter_records() {
        let mut builder = IndexBuilder::new();
        builder
            .page("apireference/", "API Reference")
            .section("Documentation")
            .unwrap()
            .paragraph("Modules = [QuanticsTCI]")
            .unwrap()
            .method(
                "QuanticsTCI.quanticsfouriermpo",
                "QuanticsTCI.quanticsfouriermpo-Tuple{Int64}",
                "function quanticsfouriermpo(R::Int)",
            )
            .unwrap();
        builder
            .page("", "Home")
            .section("QuanticsTCI.jl user guide")
            .unwrap()
            .paragraph("CurrentModule = QuanticsTCI")
            .unwrap();

        let index = builder.finish();
        assert_eq!(index.var_name, DEFAULT_VAR_NAME);
        assert_eq!(index.len(), 5);
        assert_eq!(
            index.records[0],
            SearchRecord::new("apireference/#Documentation", "API Reference", "Documentation", "", Category::Section)
        );
        assert_eq!(
            index.records[1],
            SearchRecord::new("apireference/", "API Reference", "API Reference", "Modules = [QuanticsTCI]", Category::Page)
        );
        assert_eq!(
            index.records[2].location,
            "apireference/#QuanticsTCI.quanticsfouriermpo-Tuple{Int64}"
        );
        assert_eq!(index.records[3].location, "#QuanticsTCI.jl-user-guide");
        assert_eq!(index.records[4].location, "");
        assert!(validate(&index.records).is_conformant());
    }

    #[test]
    fn test_section_anchor_keeps_unicode_dash() {
        let mut builder = IndexBuilder::new();
        builder.page("guide/", "Guide").section("Grids – overview").unwrap();
        assert_eq!(builder.finish().records[0].location, "guide/#Grids-–-overview");
    }

    #[test]
    fn test_requires_open_page() {
        let mut builder = IndexBuilder::new();
        assert!(matches!(builder.paragraph("text"), Err(Error::Builder(_))));
        assert!(builder.is_empty());
    }

    #[test]
    fn test_rejects_duplicate_anchor() {
        let mut builder = IndexBuilder::new();
        builder.page("guide/", "Guide").section("Setup").unwrap();
        let err = builder.section("Setup").unwrap_err();
        assert!(matches!(err, Error::DuplicateAnchor { ref location } if location == "guide/#Setup"));
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn test_allows_repeated_paragraphs() {
        let mut builder = IndexBuilder::new();
        builder
            .page("", "Home")
            .paragraph("one")
            .unwrap()
            .paragraph("two")
            .unwrap();
        assert_eq!(builder.len(), 2);
    }

    #[test]
    fn test_rejects_empty_docstring() {
        let mut builder = IndexBuilder::new().with_var_name("customIndex");
        builder.page("api/", "API");
        let err = builder.method("foo", "foo", "   ").unwrap_err();
        assert!(matches!(err, Error::EmptyDocstring { .. }));
        assert_eq!(builder.finish().var_name, "customIndex");
    }
}
