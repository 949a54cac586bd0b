//! Anchor slugs compatible with Documenter.jl heading anchors.

use regex::Regex;
use std::sync::LazyLock;

use docindex_common::{Error, Result};

struct SlugRules {
    whitespace: Regex,
    disallowed: Regex,
    dashes: Regex,
}

impl SlugRules {
    fn compile() -> std::result::Result<Self, regex::Error> {
        Ok(Self {
            whitespace: Regex::new(r"\s+")?,
            // `\d` is Unicode decimal digits (Nd) only
            disallowed: Regex::new(r"[^\p{L}\p{P}\d\-]+")?,
            dashes: Regex::new(r"--+")?,
        })
    }
}

static RULES: LazyLock<std::result::Result<SlugRules, regex::Error>> =
    LazyLock::new(SlugRules::compile);

/// Turn a heading into the anchor Documenter generates for it.
///
/// Whitespace runs become `-`, `&` becomes `-and-`, anything that is not a
/// letter (`L`), decimal digit (`Nd`), punctuation (`P`) or `-` is dropped,
/// repeated dashes collapse and leading/trailing dashes are trimmed.
pub fn slugify(title: &str) -> Result<String> {
    let rules = RULES
        .as_ref()
        .map_err(|e| Error::Builder(format!("Invalid slug pattern: {e}")))?;

    let slug = rules.whitespace.replace_all(title, "-");
    let slug = slug.replace('&', "-and-");
    let slug = rules.disallowed.replace_all(&slug, "");
    let slug = rules.dashes.replace_all(&slug, "-");
    Ok(slug.trim_matches('-').to_string())
}
