use crate::ir::Markup;
use once_cell::sync::Lazy;
use regex::Regex;

pub const VIEWPORT_WIDTH: u32 = 800;
pub const VIEWPORT_HEIGHT: u32 = 480;

static SVG_DIRECTIVE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^svg\b").unwrap());
static SVG_ROOT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)^(?:<\?xml[^>]*\?>\s*)?<svg[\s>/]").unwrap());

/// Extracts raw vector markup. A leading `svg` directive line is dropped and
/// fragments without an `<svg>` root are wrapped in the default viewport.
/// The markup is not sanitized here.
pub fn parse_markup(input: &str) -> Markup {
    let mut lines = input.lines().skip_while(|line| line.trim().is_empty()).peekable();
    if lines
        .peek()
        .is_some_and(|first| SVG_DIRECTIVE_RE.is_match(first.trim()))
    {
        lines.next();
    }
    let body = lines.collect::<Vec<_>>().join("\n");
    let body = body.trim();

    let markup = if SVG_ROOT_RE.is_match(body) {
        body.to_string()
    } else {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {w} {h}\" width=\"{w}\" height=\"{h}\">\n{body}\n</svg>",
            w = VIEWPORT_WIDTH,
            h = VIEWPORT_HEIGHT,
        )
    };

    Markup { markup }
}
