use crate::ir::NotationTag;
use once_cell::sync::Lazy;
use regex::Regex;

static SVG_ROOT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)^\s*(?:<\?xml[^>]*\?>\s*)?<svg[\s>]").unwrap());
static SVG_DIRECTIVE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^svg\b").unwrap());
static PLOT_DIRECTIVE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:plot|math)\b").unwrap());
static CHEM_DIRECTIVE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:chem|chemistry|smiles)\b").unwrap());
static VECTOR_DIRECTIVE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^vector\b").unwrap());
static FORMULA_CHARSET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9@+\-#=()\\/\[\]]+$").unwrap());
static FORMULA_MARKER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[cCnNOPSFI0-9=()]").unwrap());

const MAX_FORMULA_LEN: usize = 200;

/// Decides which notation `input` is written in. Never fails: anything
/// unrecognised is treated as a node-link diagram.
pub fn classify(input: &str) -> NotationTag {
    let tag = classify_inner(input);
    tracing::debug!(notation = tag.as_str(), "classified diagram source");
    tag
}

fn classify_inner(input: &str) -> NotationTag {
    if SVG_ROOT_RE.is_match(input) {
        return NotationTag::RawMarkup;
    }
    let Some(header) = header_line(input) else {
        return NotationTag::NodeLink;
    };

    if SVG_DIRECTIVE_RE.is_match(&header) {
        return NotationTag::RawMarkup;
    }
    if header.contains("graph") || header.contains("flowchart") {
        return NotationTag::NodeLink;
    }
    if header.contains("sequence") {
        return NotationTag::Sequence;
    }
    if header.contains("class") {
        return NotationTag::Class;
    }
    if header.contains("pie") {
        return NotationTag::Pie;
    }
    if PLOT_DIRECTIVE_RE.is_match(&header) {
        return NotationTag::Plot;
    }
    if CHEM_DIRECTIVE_RE.is_match(&header) {
        return NotationTag::Chemistry;
    }
    if VECTOR_DIRECTIVE_RE.is_match(&header) {
        return NotationTag::VectorField;
    }
    if looks_like_formula(input) {
        return NotationTag::Chemistry;
    }
    NotationTag::NodeLink
}

/// First non-blank, non-comment line, trimmed and lower-cased.
pub(crate) fn header_line(input: &str) -> Option<String> {
    input
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with("%%"))
        .map(str::to_ascii_lowercase)
}

fn looks_like_formula(input: &str) -> bool {
    let raw = input.trim();
    !raw.contains('\n')
        && raw.len() <= MAX_FORMULA_LEN
        && FORMULA_CHARSET_RE.is_match(raw)
        && FORMULA_MARKER_RE.is_match(raw)
}
