//! Search record model.
//!
//! A search index is a flat array of records. Each record points at a page
//! (and optionally an anchor inside it) and carries the text a search box
//! matches against.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::DEFAULT_VAR_NAME;

/// Structural role of a record in the source documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Category {
    /// A heading inside a page.
    Section,
    /// A page title or a body paragraph of a page.
    Page,
    /// A rendered docstring.
    Method,
}

impl Category {
    /// All categories in declaration order.
    pub const ALL: [Category; 3] = [Category::Section, Category::Page, Category::Method];

    /// Wire name of the category.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Section => "section",
            Category::Page => "page",
            Category::Method => "method",
        }
    }

    /// Whether records of this category name a unique anchor.
    ///
    /// `page` records are paragraphs and repeat the page location freely.
    pub fn is_anchored(self) -> bool {
        matches!(self, Category::Section | Category::Method)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "section" => Ok(Category::Section),
            "page" => Ok(Category::Page),
            "method" => Ok(Category::Method),
            other => Err(Error::UnknownCategory(other.to_string())),
        }
    }
}

impl TryFrom<String> for Category {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.as_str().to_string()
    }
}

/// One entry of the search index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchRecord {
    /// URL fragment: page path plus optional `#anchor`.
    pub location: String,
    /// Human-readable page title used for grouping.
    pub page: String,
    /// Section or symbol title.
    pub title: String,
    /// Body text or docstring, may be empty.
    pub text: String,
    /// Structural role.
    pub category: Category,
}

impl SearchRecord {
    /// Create a record from its parts.
    pub fn new(
        location: impl Into<String>,
        page: impl Into<String>,
        title: impl Into<String>,
        text: impl Into<String>,
        category: Category,
    ) -> Self {
        Self {
            location: location.into(),
            page: page.into(),
            title: title.into(),
            text: text.into(),
            category,
        }
    }

    /// Page path, i.e. the location without its anchor.
    pub fn path(&self) -> &str {
        match self.location.split_once('#') {
            Some((path, _)) => path,
            None => &self.location,
        }
    }

    /// Anchor part of the location, if any.
    pub fn anchor(&self) -> Option<&str> {
        self.location.split_once('#').map(|(_, anchor)| anchor)
    }

    /// Records without text only serve as navigation headers.
    pub fn is_header(&self) -> bool {
        self.text.is_empty()
    }
}

/// A complete search index: the variable it is bound to and its records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchIndex {
    /// Name of the JS variable holding the index.
    pub var_name: String,
    /// Records in document order.
    pub records: Vec<SearchRecord>,
}

impl Default for SearchIndex {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl SearchIndex {
    /// Index bound to the default Documenter variable name.
    pub fn new(records: Vec<SearchRecord>) -> Self {
        Self {
            var_name: DEFAULT_VAR_NAME.to_string(),
            records,
        }
    }

    /// Replace the variable name.
    pub fn with_var_name(mut self, var_name: impl Into<String>) -> Self {
        self.var_name = var_name.into();
        self
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when there are no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over the records in document order.
    pub fn iter(&self) -> std::slice::Iter<'_, SearchRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a SearchIndex {
    type Item = &'a SearchRecord;
    type IntoIter = std::slice::Iter<'a, SearchRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
