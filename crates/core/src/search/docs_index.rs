//! Lookup structure built once over an immutable index.

use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Bound;
use std::path::Path;

use docindex_common::{Category, Result, SearchIndex, SearchRecord};

use super::tokenize::{query_terms, token_set};
use crate::codec::{self, ParseMode};
use crate::common::Timer;

/// Hits returned when no limit is given.
pub const DEFAULT_LIMIT: usize = 10;
/// Weight of a title match relative to a text match.
pub const DEFAULT_TITLE_BOOST: f64 = 2.0;
/// Share of the score a prefix match earns compared to an exact token.
const PREFIX_FACTOR: f64 = 0.5;

/// How query text is matched against records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Token match with optional prefix expansion.
    #[default]
    Token,
    /// Case-insensitive substring match of the whole query.
    Substring,
}

/// How multiple query terms combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Combine {
    /// Every term must match.
    #[default]
    All,
    /// At least one term must match.
    Any,
}

/// Knobs for [`DocIndex::search`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    /// Matching strategy.
    pub mode: SearchMode,
    /// Term combination, token mode only.
    pub combine: Combine,
    /// Let a term match tokens it is a prefix of.
    pub prefix: bool,
    /// Title weight; text weighs 1.0.
    pub title_boost: f64,
    /// Maximum number of hits, 0 for all.
    pub limit: usize,
    /// Only return these categories; empty means all.
    pub categories: Vec<Category>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            mode: SearchMode::default(),
            combine: Combine::default(),
            prefix: true,
            title_boost: DEFAULT_TITLE_BOOST,
            limit: DEFAULT_LIMIT,
            categories: Vec::new(),
        }
    }
}

impl SearchOptions {
    fn accepts(&self, category: Category) -> bool {
        self.categories.is_empty() || self.categories.contains(&category)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Text,
}

/// A ranked search result.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit<'a> {
    /// Position of the record in the index.
    pub position: usize,
    /// Relevance, higher is better.
    pub score: f64,
    /// Query terms that matched this record.
    pub matched_terms: Vec<String>,
    /// The record.
    pub record: &'a SearchRecord,
}

/// Records grouped under one `page` value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSummary {
    /// Page title.
    pub page: String,
    /// Path of the first record of the page.
    pub path: String,
    /// Total records.
    pub records: usize,
    /// `section` records.
    pub sections: usize,
    /// `method` records.
    pub methods: usize,
    /// `page` records.
    pub paragraphs: usize,
}

/// Summary numbers for an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    /// Variable the index is bound to.
    pub var_name: String,
    /// Total records.
    pub records: usize,
    /// Distinct pages.
    pub pages: usize,
    /// `section` records.
    pub sections: usize,
    /// `method` records.
    pub methods: usize,
    /// `page` records.
    pub paragraphs: usize,
    /// Records with empty text.
    pub headers: usize,
    /// Distinct searchable tokens.
    pub tokens: usize,
    /// Content digest, see [`codec::digest`].
    pub digest: String,
}

/// Read-only lookup and search over a [`SearchIndex`].
#[derive(Debug)]
pub struct DocIndex {
    index: SearchIndex,
    by_location: HashMap<String, Vec<usize>>,
    pages: Vec<String>,
    by_page: HashMap<String, Vec<usize>>,
    postings: BTreeMap<String, Vec<(usize, Field)>>,
    doc_freq: HashMap<String, usize>,
    lowered: Vec<(String, String)>,
}

impl DocIndex {
    /// Build the lookup tables for `index`.
    pub fn new(index: SearchIndex) -> Self {
        let timer = Timer::start("build_doc_index");

        let token_sets: Vec<(HashSet<String>, HashSet<String>)> = index
            .records
            .par_iter()
            .map(|record| (token_set(&record.title), token_set(&record.text)))
            .collect();
        let lowered: Vec<(String, String)> = index
            .records
            .par_iter()
            .map(|record| (record.title.to_lowercase(), record.text.to_lowercase()))
            .collect();
        timer.lap(&format!("Tokenized {} records", index.len()));

        let mut by_location: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_page: HashMap<String, Vec<usize>> = HashMap::new();
        let mut pages = Vec::new();

        for (position, record) in index.records.iter().enumerate() {
            by_location
                .entry(record.location.clone())
                .or_default()
                .push(position);

            if !by_page.contains_key(&record.page) {
                pages.push(record.page.clone());
            }
            by_page.entry(record.page.clone()).or_default().push(position);
        }

        let mut postings: BTreeMap<String, Vec<(usize, Field)>> = BTreeMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for (position, (title, text)) in token_sets.into_iter().enumerate() {
            for token in title.union(&text) {
                *doc_freq.entry(token.clone()).or_default() += 1;
            }
            for token in title {
                postings.entry(token).or_default().push((position, Field::Title));
            }
            for token in text {
                postings.entry(token).or_default().push((position, Field::Text));
            }
        }

        timer.lap(&format!("Indexed {} distinct tokens", postings.len()));
        timer.finish();

        Self {
            index,
            by_location,
            pages,
            by_page,
            postings,
            doc_freq,
            lowered,
        }
    }

    /// Read an artifact from disk and index it.
    pub fn load(path: &Path, mode: ParseMode) -> Result<Self> {
        let outcome = codec::read_file(path, mode)?;
        if !outcome.dropped.is_empty() {
            tracing::warn!(
                "{} malformed records were dropped from {}",
                outcome.dropped.len(),
                path.display()
            );
        }
        Ok(Self::new(outcome.index))
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True when the index has no records.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// All records at exactly `location`, in document order.
    pub fn lookup(&self, location: &str) -> Vec<&SearchRecord> {
        self.by_location
            .get(location)
            .map(|positions| positions.iter().map(|&p| &self.index.records[p]).collect())
            .unwrap_or_default()
    }

    /// First record at `location` with the given category.
    pub fn get(&self, location: &str, category: Category) -> Option<&SearchRecord> {
        self.lookup(location)
            .into_iter()
            .find(|record| record.category == category)
    }

    /// Distinct pages in first-appearance order.
    pub fn pages(&self) -> Vec<PageSummary> {
        self.pages
            .iter()
            .map(|page| {
                let records = self.page_records(page);
                let count = |category| records.iter().filter(|r| r.category == category).count();
                PageSummary {
                    page: page.clone(),
                    path: records
                        .first()
                        .map(|r| r.path().to_string())
                        .unwrap_or_default(),
                    records: records.len(),
                    sections: count(Category::Section),
                    methods: count(Category::Method),
                    paragraphs: count(Category::Page),
                }
            })
            .collect()
    }

    /// Records grouped under `page`.
    pub fn page_records(&self, page: &str) -> Vec<&SearchRecord> {
        self.by_page
            .get(page)
            .map(|positions| positions.iter().map(|&p| &self.index.records[p]).collect())
            .unwrap_or_default()
    }

    /// Summary numbers, including the content digest.
    pub fn stats(&self) -> Result<IndexStats> {
        let count = |category| {
            self.index
                .records
                .iter()
                .filter(|r| r.category == category)
                .count()
        };
        Ok(IndexStats {
            var_name: self.index.var_name.clone(),
            records: self.len(),
            pages: self.pages.len(),
            sections: count(Category::Section),
            methods: count(Category::Method),
            paragraphs: count(Category::Page),
            headers: self.index.records.iter().filter(|r| r.is_header()).count(),
            tokens: self.postings.len(),
            digest: codec::digest(&self.index)?,
        })
    }

    /// Ranked search over titles and text.
    pub fn search(&self, query: &str, options: &SearchOptions) -> Vec<SearchHit<'_>> {
        let hits = match options.mode {
            SearchMode::Token => self.search_tokens(query, options),
            SearchMode::Substring => self.search_substring(query, options),
        };
        let hits = rank(hits, options.limit);
        tracing::debug!("search for '{}': {} results", query, hits.len());
        hits
    }

    fn search_tokens(&self, query: &str, options: &SearchOptions) -> Vec<SearchHit<'_>> {
        let terms = query_terms(query);
        if terms.is_empty() {
            return Vec::new();
        }

        let total = self.len() as f64;
        // Best score per (record, term)
        let mut per_record: HashMap<usize, Vec<Option<f64>>> = HashMap::new();

        for (term_index, term) in terms.iter().enumerate() {
            for (token, postings) in self.candidates(term, options.prefix) {
                let factor = if token == term.as_str() { 1.0 } else { PREFIX_FACTOR };
                let idf = self.idf(token, total);

                for &(position, field) in postings {
                    if !options.accepts(self.index.records[position].category) {
                        continue;
                    }
                    let weight = match field {
                        Field::Title => options.title_boost,
                        Field::Text => 1.0,
                    };
                    let score = weight * idf * factor;
                    let slot = &mut per_record
                        .entry(position)
                        .or_insert_with(|| vec![None; terms.len()])[term_index];
                    if slot.is_none_or(|current| score > current) {
                        *slot = Some(score);
                    }
                }
            }
        }

        per_record
            .into_iter()
            .filter_map(|(position, slots)| {
                let matched_terms: Vec<String> = terms
                    .iter()
                    .zip(&slots)
                    .filter(|(_, slot)| slot.is_some())
                    .map(|(term, _)| term.clone())
                    .collect();
                if options.combine == Combine::All && matched_terms.len() < terms.len() {
                    return None;
                }
                Some(SearchHit {
                    position,
                    score: slots.iter().flatten().sum(),
                    matched_terms,
                    record: &self.index.records[position],
                })
            })
            .collect()
    }

    fn search_substring(&self, query: &str, options: &SearchOptions) -> Vec<SearchHit<'_>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        self.lowered
            .iter()
            .enumerate()
            .filter(|(position, _)| options.accepts(self.index.records[*position].category))
            .filter_map(|(position, (title, text))| {
                let mut score = 0.0;
                if title.contains(&needle) {
                    score += options.title_boost;
                }
                if text.contains(&needle) {
                    score += 1.0;
                }
                (score > 0.0).then(|| SearchHit {
                    position,
                    score,
                    matched_terms: vec![needle.clone()],
                    record: &self.index.records[position],
                })
            })
            .collect()
    }

    /// Vocabulary entries `term` matches: itself and, with `prefix`, every
    /// token it starts.
    fn candidates(&self, term: &str, prefix: bool) -> Vec<(&str, &[(usize, Field)])> {
        if prefix {
            self.postings
                .range::<str, _>((Bound::Included(term), Bound::Unbounded))
                .take_while(|(token, _)| token.starts_with(term))
                .map(|(token, postings)| (token.as_str(), postings.as_slice()))
                .collect()
        } else {
            self.postings
                .get_key_value(term)
                .map(|(token, postings)| (token.as_str(), postings.as_slice()))
                .into_iter()
                .collect()
        }
    }

    fn idf(&self, token: &str, total: f64) -> f64 {
        let df = self.doc_freq.get(token).copied().unwrap_or(1).max(1) as f64;
        (1.0 + total / df).ln()
    }
}

/// Order by descending score, document order on ties, then apply `limit`.
fn rank(mut hits: Vec<SearchHit<'_>>, limit: usize) -> Vec<SearchHit<'_>> {
    hits.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.position.cmp(&b.position))
    });
    if limit > 0 {
        hits.truncate(limit);
    }
    hits
}
