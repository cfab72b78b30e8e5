//! The content-safety scanner.
//!
//! Two independent passes over outbound user text:
//! - `sanitize` rewrites the text into a safe form (NFKC, control-char
//!   stripping, markup scrubbing, angle-bracket escaping, spam collapse)
//! - risk scoring runs a fixed rule set against the ORIGINAL text and
//!   sums fixed weights per hit
//!
//! `scan` combines both and accepts the input when the risk score stays
//! under the configured threshold. Deterministic by construction.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Weight added per suspect-pattern hit.
const RULE_WEIGHT: u32 = 10;
/// Cap on the link-count and angle-bracket contributions.
const EXTRA_WEIGHT_CAP: u32 = 10;
/// At most this many rule names are reported back on rejection.
const MAX_REPORTED_RULES: usize = 6;

static ON_ATTR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bon\w+\s*=").unwrap());
static TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?[a-z][a-z0-9]*\b[^>]*>").unwrap());
static IMPORT_AT_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)@import\s+['"]?[^'"]+['"]?"#).unwrap());
static CSS_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)url\(\s*['"]?([^)'"]*)['"]?\s*\)"#).unwrap());
static DANGEROUS_PROTOCOLS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:javascript|vbscript|file|data):").unwrap());
static LINKS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bhttps?://").unwrap());

/// The fixed risk rule set, evaluated against the lowercased original text.
static SUSPECT_RULES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("script_tag", r"<script"),
        ("script_close", r"</script"),
        ("iframe_tag", r"<iframe"),
        ("object_tag", r"<object"),
        ("embed_tag", r"<embed"),
        ("svg_tag", r"<svg"),
        ("xlink_href", r"xlink:href"),
        ("onerror_attr", r"onerror\s*="),
        ("onload_attr", r"onload\s*="),
        ("path_traversal", r"\.\./"),
        (
            "sql_keywords",
            r"\b(?:select|union|insert|update|delete|drop)\b.*\bfrom\b",
        ),
        ("external_url", r"\b(?:https?|ftp)://[^\s]{2,}"),
    ]
    .into_iter()
    .map(|(code, pattern)| (code, Regex::new(pattern).unwrap()))
    .collect()
});

/// Options for a scan pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOptions {
    /// Maximum sanitized length in characters.
    pub max_len: usize,
    /// Risk scores at or above this value reject the input.
    pub risk_threshold: u32,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_len: 4000,
            risk_threshold: 12,
        }
    }
}

/// The verdict for one piece of text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOutcome {
    /// Whether the text may proceed to a resolution attempt.
    pub accepted: bool,
    /// Safe rewrite of the text, usable regardless of acceptance.
    pub sanitized: String,
    /// Summed rule weights plus bounded link/bracket contributions.
    pub risk_score: u32,
    /// Rule codes behind a rejection (empty when accepted).
    pub triggered_rules: Vec<String>,
}

/// Scan and sanitize `text`. Never fails.
pub fn scan(text: &str, options: &ScanOptions) -> ScanOutcome {
    let sanitized = sanitize(text, options.max_len);
    let (risk_score, hits) = risk_score(text);
    let accepted = risk_score < options.risk_threshold;

    let triggered_rules = if accepted {
        Vec::new()
    } else {
        hits.into_iter()
            .take(MAX_REPORTED_RULES)
            .map(String::from)
            .collect()
    };

    if !accepted {
        tracing::warn!(risk_score, rules = ?triggered_rules, "input rejected by shield");
    }

    ScanOutcome {
        accepted,
        sanitized,
        risk_score,
        triggered_rules,
    }
}

/// Rewrite `text` into a safe form, capped at `max_len` characters.
pub fn sanitize(text: &str, max_len: usize) -> String {
    let normalized: String = text.nfkc().collect();
    let stripped: String = normalized
        .chars()
        .filter(|c| !is_bidi_or_zero_width(*c) && *c != '\0')
        .collect();
    let truncated: String = stripped.chars().take(max_len).collect();
    let scrubbed = scrub_markup(&truncated);
    collapse_repeats(&scrubbed).trim().to_string()
}

fn is_bidi_or_zero_width(c: char) -> bool {
    matches!(
        c,
        '\u{202A}'..='\u{202E}'
            | '\u{2066}'..='\u{2069}'
            | '\u{200B}'..='\u{200D}'
            | '\u{200E}'
            | '\u{200F}'
            | '\u{061C}'
            | '\u{FEFF}'
    )
}

/// Remove inline handlers, tag-like markup, and `@import` rules, then
/// neutralize dangerous references and escape residual angle brackets.
fn scrub_markup(text: &str) -> String {
    let out = ON_ATTR.replace_all(text, "");
    let out = TAGS.replace_all(&out, "");
    let out = IMPORT_AT_RULE.replace_all(&out, "");

    // url(...) bodies pointing at a dangerous scheme become inert.
    let out = CSS_URL.replace_all(&out, |caps: &regex_lite::Captures<'_>| {
        let body: String = caps[1].chars().filter(|c| !c.is_whitespace()).collect();
        if DANGEROUS_PROTOCOLS.is_match(&body) {
            "url(about:blank)".to_string()
        } else {
            caps[0].to_string()
        }
    });

    let out = DANGEROUS_PROTOCOLS.replace_all(&out, "about:blank:");
    out.replace('<', "&lt;").replace('>', "&gt;")
}

/// Collapse runs of 3+ identical non-whitespace characters to 2.
fn collapse_repeats(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev: Option<char> = None;
    let mut run = 0usize;

    for c in text.chars() {
        if Some(c) == prev && !c.is_whitespace() {
            run += 1;
            if run >= 3 {
                continue;
            }
        } else {
            prev = Some(c);
            run = 1;
        }
        out.push(c);
    }
    out
}

/// Score the original text against the fixed rule set.
fn risk_score(text: &str) -> (u32, Vec<&'static str>) {
    let lowered = text.to_lowercase();
    let mut score = 0u32;
    let mut hits = Vec::new();

    for (code, rule) in SUSPECT_RULES.iter() {
        if rule.is_match(&lowered) {
            score += RULE_WEIGHT;
            hits.push(*code);
        }
    }

    let link_count = LINKS.find_iter(&lowered).count() as u32;
    score += (link_count * 2).min(EXTRA_WEIGHT_CAP);

    let angle_count = text.chars().filter(|c| *c == '<' || *c == '>').count() as u32;
    score += angle_count.min(EXTRA_WEIGHT_CAP);

    (score, hits)
}
