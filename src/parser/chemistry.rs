use super::{preprocess_input, starts_with_word};
use crate::ir::{ChemistryQuery, QueryKind};
use once_cell::sync::Lazy;
use regex::Regex;

static PREFIXED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?P<kind>name|formula|smiles)\s*:\s*(?P<query>.*)$").unwrap());
static HASH_COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|\s)#.*$").unwrap());
static TRAILING_REMARK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+\([^)]*\)$").unwrap());

/// Parses a chemistry block into the query handed to the depiction service.
///
/// A `name:`, `formula:` or `smiles:` line wins over bare text; otherwise the
/// first line after the header is used as-is.
pub fn parse_chemistry(input: &str) -> ChemistryQuery {
    let mut fallback: Option<String> = None;

    for line in preprocess_input(input) {
        let lower = line.to_ascii_lowercase();
        if starts_with_word(&lower, "chem")
            || starts_with_word(&lower, "chemistry")
            || lower == "smiles"
        {
            continue;
        }
        let cleaned = clean_line(&line);
        if cleaned.is_empty() {
            continue;
        }
        if let Some(caps) = PREFIXED_RE.captures(&cleaned) {
            let kind = match caps["kind"].to_ascii_lowercase().as_str() {
                "name" => QueryKind::Name,
                "formula" => QueryKind::Formula,
                _ => QueryKind::Smiles,
            };
            return ChemistryQuery {
                query: unquote(&caps["query"]),
                kind,
            };
        }
        if fallback.is_none() {
            fallback = Some(unquote(&cleaned));
        }
    }

    ChemistryQuery {
        query: fallback.unwrap_or_default(),
        kind: QueryKind::Unspecified,
    }
}

fn clean_line(line: &str) -> String {
    let without_comment = HASH_COMMENT_RE.replace(line, "");
    TRAILING_REMARK_RE
        .replace(without_comment.trim(), "")
        .trim()
        .to_string()
}

fn unquote(text: &str) -> String {
    text.trim()
        .trim_start_matches(['"', '\''])
        .trim_end_matches(['"', '\''])
        .trim()
        .to_string()
}
