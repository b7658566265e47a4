//! Allow-list sanitizer for vector markup.
//!
//! Elements outside the allow-list are unwrapped (their children survive),
//! except for the executable or embedding elements in [`FORBID_CONTENT`],
//! which are removed together with everything inside them. Attributes outside
//! the allow-list, event handlers and values that could run script or fetch
//! remote resources are dropped. Comments, processing instructions, doctypes
//! and CDATA sections never reach the output. Unclosed elements are closed at
//! the end of input, so the result is always well formed.

use crate::render::escape_xml;

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

const ALLOWED_ELEMENTS: &[&str] = &[
    "svg",
    "g",
    "path",
    "defs",
    "marker",
    "polygon",
    "polyline",
    "line",
    "rect",
    "circle",
    "ellipse",
    "text",
    "tspan",
    "clipPath",
    "title",
    "desc",
    "pattern",
    "linearGradient",
    "radialGradient",
    "stop",
    "mask",
    "symbol",
    "use",
    "image",
];

const ALLOWED_ATTRIBUTES: &[&str] = &[
    "style",
    "class",
    "id",
    "width",
    "height",
    "viewBox",
    "xmlns",
    "xmlns:xlink",
    "version",
    "preserveAspectRatio",
    "x",
    "y",
    "dx",
    "dy",
    "cx",
    "cy",
    "r",
    "rx",
    "ry",
    "fx",
    "fy",
    "points",
    "x1",
    "x2",
    "y1",
    "y2",
    "d",
    "transform",
    "opacity",
    "visibility",
    "display",
    "fill",
    "fill-opacity",
    "fill-rule",
    "stroke",
    "stroke-width",
    "stroke-linecap",
    "stroke-linejoin",
    "stroke-dasharray",
    "stroke-dashoffset",
    "stroke-miterlimit",
    "stroke-opacity",
    "vector-effect",
    "paint-order",
    "clip-path",
    "clip-rule",
    "clipPathUnits",
    "mask",
    "maskUnits",
    "maskContentUnits",
    "marker-end",
    "marker-start",
    "marker-mid",
    "markerWidth",
    "markerHeight",
    "markerUnits",
    "refX",
    "refY",
    "orient",
    "offset",
    "stop-color",
    "stop-opacity",
    "gradientUnits",
    "gradientTransform",
    "spreadMethod",
    "patternUnits",
    "patternContentUnits",
    "patternTransform",
    "font-family",
    "font-size",
    "font-style",
    "font-weight",
    "text-anchor",
    "dominant-baseline",
    "alignment-baseline",
    "letter-spacing",
    "href",
    "xlink:href",
];

/// Elements dropped together with their whole subtree.
pub const FORBID_CONTENT: &[&str] = &[
    "script",
    "style",
    "foreignobject",
    "iframe",
    "object",
    "embed",
    "noscript",
    "template",
    "audio",
    "video",
    "canvas",
    "frame",
    "frameset",
    "applet",
    "handler",
    "listener",
    "base",
    "link",
    "meta",
];

/// Elements whose content is raw text up to the matching end tag.
const RAW_TEXT: &[&str] = &[
    "script", "style", "iframe", "noscript", "noembed", "noframes", "xmp", "textarea",
];

const DANGEROUS_VALUE_FRAGMENTS: &[&str] = &[
    "javascript:",
    "vbscript:",
    "livescript:",
    "expression(",
    "@import",
    "behavior:",
    "-moz-binding",
    "&#",
];

const DATA_IMAGE_PREFIXES: &[&str] = &[
    "data:image/png;",
    "data:image/jpeg;",
    "data:image/jpg;",
    "data:image/gif;",
    "data:image/webp;",
];

/// Returns `markup` with everything outside the allow-list removed.
pub fn sanitize_svg(markup: &str) -> String {
    let mut sanitizer = Sanitizer::new(markup);
    sanitizer.run();
    tracing::debug!(
        removed_elements = sanitizer.removed_elements,
        removed_attributes = sanitizer.removed_attributes,
        "sanitized markup"
    );
    sanitizer.out
}

struct Tag {
    name: String,
    attrs: Vec<(String, String)>,
    self_closing: bool,
}

struct Frame {
    name: String,
    emitted: Option<&'static str>,
}

struct Sanitizer<'a> {
    src: &'a str,
    lower: String,
    pos: usize,
    out: String,
    stack: Vec<Frame>,
    skip_depth: usize,
    removed_elements: usize,
    removed_attributes: usize,
}

impl<'a> Sanitizer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            lower: src.to_ascii_lowercase(),
            pos: 0,
            out: String::with_capacity(src.len()),
            stack: Vec::new(),
            skip_depth: 0,
            removed_elements: 0,
            removed_attributes: 0,
        }
    }

    fn run(&mut self) {
        let src = self.src;
        while self.pos < src.len() {
            let rest = &src[self.pos..];
            let Some(lt) = rest.find('<') else {
                self.text(rest);
                self.pos = src.len();
                break;
            };
            if lt > 0 {
                self.text(&rest[..lt]);
                self.pos += lt;
            }
            self.markup();
        }
        while let Some(frame) = self.stack.pop() {
            if let Some(name) = frame.emitted {
                self.out.push_str(&format!("</{name}>"));
            }
        }
    }

    fn text(&mut self, text: &str) {
        if self.skip_depth == 0 {
            self.out.push_str(&escape_xml(&decode_entities(text)));
        }
    }

    fn markup(&mut self) {
        let rest = &self.lower[self.pos..];
        if rest.starts_with("<!--") {
            self.skip_past("-->", 4);
        } else if rest.starts_with("<![cdata[") {
            self.skip_past("]]>", 9);
        } else if rest.starts_with("<!") || rest.starts_with("<?") {
            self.skip_past(">", 2);
        } else if rest.starts_with("</") {
            let name_start = self.pos + 2;
            match self.src[name_start..].find('>') {
                Some(offset) => {
                    let name = self.src[name_start..name_start + offset]
                        .trim()
                        .to_ascii_lowercase();
                    self.pos = name_start + offset + 1;
                    self.end_tag(&name);
                }
                None => self.pos = self.src.len(),
            }
        } else if rest[1..].starts_with(|ch: char| ch.is_ascii_alphabetic()) {
            match self.parse_tag() {
                Some(tag) => self.start_tag(tag),
                None => self.pos = self.src.len(),
            }
        } else {
            if self.skip_depth == 0 {
                self.out.push_str("&lt;");
            }
            self.pos += 1;
        }
    }

    fn skip_past(&mut self, needle: &str, prefix_len: usize) {
        let from = (self.pos + prefix_len).min(self.src.len());
        self.pos = match self.lower[from..].find(needle) {
            Some(offset) => from + offset + needle.len(),
            None => self.src.len(),
        };
    }

    fn skip_raw_text(&mut self, name: &str) {
        let closing = format!("</{name}");
        self.pos = match self.lower[self.pos..].find(&closing) {
            Some(offset) => {
                let after = self.pos + offset + closing.len();
                match self.src[after..].find('>') {
                    Some(end) => after + end + 1,
                    None => self.src.len(),
                }
            }
            None => self.src.len(),
        };
    }

    /// Parses the start tag at `self.pos` and moves past it. `None` when the
    /// tag is never terminated.
    fn parse_tag(&mut self) -> Option<Tag> {
        let src = self.src;
        let bytes = src.as_bytes();
        let len = bytes.len();
        let mut i = self.pos + 1;

        let name_start = i;
        while i < len && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' && bytes[i] != b'/' {
            i += 1;
        }
        let mut tag = Tag {
            name: src[name_start..i].to_string(),
            attrs: Vec::new(),
            self_closing: false,
        };

        loop {
            while i < len && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i >= len {
                return None;
            }
            match bytes[i] {
                b'>' => {
                    self.pos = i + 1;
                    return Some(tag);
                }
                b'/' => {
                    if bytes.get(i + 1) == Some(&b'>') {
                        tag.self_closing = true;
                        self.pos = i + 2;
                        return Some(tag);
                    }
                    i += 1;
                    continue;
                }
                _ => {}
            }

            let attr_start = i;
            while i < len
                && !bytes[i].is_ascii_whitespace()
                && !matches!(bytes[i], b'=' | b'>' | b'/')
            {
                i += 1;
            }
            let attr_name = &src[attr_start..i];
            while i < len && bytes[i].is_ascii_whitespace() {
                i += 1;
            }

            let mut value = "";
            if i < len && bytes[i] == b'=' {
                i += 1;
                while i < len && bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                if i < len && (bytes[i] == b'"' || bytes[i] == b'\'') {
                    let quote = bytes[i] as char;
                    let value_start = i + 1;
                    let end = value_start + src[value_start..].find(quote)?;
                    value = &src[value_start..end];
                    i = end + 1;
                } else {
                    let value_start = i;
                    while i < len && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                        i += 1;
                    }
                    value = &src[value_start..i];
                }
            }

            if !attr_name.is_empty() {
                tag.attrs.push((attr_name.to_string(), value.to_string()));
            }
        }
    }

    fn start_tag(&mut self, tag: Tag) {
        let name = tag.name.to_ascii_lowercase();
        let raw_text = RAW_TEXT.contains(&name.as_str());

        if self.skip_depth > 0 {
            if !tag.self_closing {
                if raw_text {
                    self.skip_raw_text(&name);
                } else {
                    self.skip_depth += 1;
                }
            }
            return;
        }

        if FORBID_CONTENT.contains(&name.as_str()) || raw_text {
            self.removed_elements += 1;
            if !tag.self_closing {
                if raw_text {
                    self.skip_raw_text(&name);
                } else {
                    self.skip_depth = 1;
                }
            }
            return;
        }

        let Some(element) = canonical(ALLOWED_ELEMENTS, &name) else {
            self.removed_elements += 1;
            if !tag.self_closing {
                self.stack.push(Frame {
                    name,
                    emitted: None,
                });
            }
            return;
        };

        self.out.push('<');
        self.out.push_str(element);
        let mut emitted: Vec<&'static str> = Vec::new();
        for (attr_name, raw_value) in &tag.attrs {
            let lower = attr_name.to_ascii_lowercase();
            let allowed = if lower.starts_with("on") {
                None
            } else {
                canonical(ALLOWED_ATTRIBUTES, &lower)
            };
            let Some(attr) = allowed.filter(|attr| !emitted.contains(attr)) else {
                self.removed_attributes += 1;
                continue;
            };
            let value = decode_entities(raw_value);
            if !is_safe_value(&lower, &value) {
                self.removed_attributes += 1;
                continue;
            }
            self.out
                .push_str(&format!(" {attr}=\"{}\"", escape_xml(&value)));
            emitted.push(attr);
        }
        if element == "svg" && !emitted.contains(&"xmlns") {
            self.out.push_str(&format!(" xmlns=\"{SVG_NAMESPACE}\""));
        }

        if tag.self_closing {
            self.out.push_str("/>");
        } else {
            self.out.push('>');
            self.stack.push(Frame {
                name,
                emitted: Some(element),
            });
        }
    }

    fn end_tag(&mut self, name: &str) {
        if self.skip_depth > 0 {
            self.skip_depth -= 1;
            return;
        }
        let Some(idx) = self.stack.iter().rposition(|frame| frame.name == name) else {
            return;
        };
        while self.stack.len() > idx {
            if let Some(Frame {
                emitted: Some(element),
                ..
            }) = self.stack.pop()
            {
                self.out.push_str(&format!("</{element}>"));
            }
        }
    }
}

fn canonical(list: &[&'static str], lower: &str) -> Option<&'static str> {
    list.iter()
        .copied()
        .find(|candidate| candidate.eq_ignore_ascii_case(lower))
}

fn is_safe_value(attr: &str, value: &str) -> bool {
    let compact: String = value
        .chars()
        .filter(|ch| !ch.is_whitespace() && !ch.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    if DANGEROUS_VALUE_FRAGMENTS
        .iter()
        .any(|fragment| compact.contains(fragment))
    {
        return false;
    }

    let urls_are_local = compact.match_indices("url(").all(|(idx, _)| {
        compact[idx + 4..]
            .trim_start_matches(['"', '\''])
            .starts_with('#')
    });
    if !urls_are_local {
        return false;
    }

    if attr == "href" || attr == "xlink:href" {
        return compact.starts_with('#')
            || DATA_IMAGE_PREFIXES
                .iter()
                .any(|prefix| compact.starts_with(prefix));
    }
    true
}

fn decode_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .filter(|semi| *semi <= 12)
            .and_then(|semi| decode_entity(&tail[1..semi]).map(|ch| (ch, semi)));
        match decoded {
            Some((ch, semi)) => {
                out.push(ch);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        "colon" => Some(':'),
        "lpar" => Some('('),
        "rpar" => Some(')'),
        "Tab" => Some('\t'),
        "NewLine" => Some('\n'),
        _ => {
            let numeric = entity.strip_prefix('#')?;
            let code = match numeric.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => numeric.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_elements_are_removed_with_their_content() {
        let clean = sanitize_svg("<svg><script>alert('<b>')</script><rect width=\"1\"/></svg>");
        assert_eq!(
            clean,
            "<svg xmlns=\"http://www.w3.org/2000/svg\"><rect width=\"1\"/></svg>"
        );

        let clean = sanitize_svg("<svg><SCRIPT type=\"x\">boom()</Script ><g/></svg>");
        assert!(!clean.to_ascii_lowercase().contains("script"));
        assert!(!clean.contains("boom"));
        assert!(clean.contains("<g/>"));
    }

    #[test]
    fn event_handlers_are_removed() {
        let clean = sanitize_svg(
            "<svg onload=\"steal()\"><circle r=\"2\" onClick='x()' fill=\"red\"/></svg>",
        );
        assert!(!clean.to_ascii_lowercase().contains("onload"));
        assert!(!clean.to_ascii_lowercase().contains("onclick"));
        assert!(clean.contains("<circle r=\"2\" fill=\"red\"/>"));
    }

    #[test]
    fn script_urls_are_removed_even_when_encoded() {
        let clean = sanitize_svg(
            "<svg><use href=\"javascript:alert(1)\"/><use xlink:href=\"&#106;avascript:alert(1)\"/><use href=\"#dot\"/></svg>",
        );
        assert!(!clean.contains("javascript"));
        assert!(clean.contains("<use/><use/><use href=\"#dot\"/>"));
    }

    #[test]
    fn remote_references_are_removed() {
        let clean = sanitize_svg(
            "<svg><rect fill=\"url(https://evil.test/x)\" stroke=\"url(#grad)\"/><image href=\"https://evil.test/p.png\"/></svg>",
        );
        assert!(!clean.contains("evil.test"));
        assert!(clean.contains("stroke=\"url(#grad)\""));
        assert!(clean.contains("<image/>"));
    }

    #[test]
    fn unknown_elements_are_unwrapped_and_embedding_ones_dropped() {
        let clean = sanitize_svg(
            "<svg><a href=\"#x\"><rect/></a><foreignObject><div>html<p>text</p></div></foreignObject><circle/></svg>",
        );
        assert_eq!(
            clean,
            "<svg xmlns=\"http://www.w3.org/2000/svg\"><rect/><circle/></svg>"
        );
    }

    #[test]
    fn comments_and_declarations_are_dropped() {
        let clean = sanitize_svg(
            "<?xml version=\"1.0\"?><!DOCTYPE svg><svg><!-- note --><text x=\"1\">a &amp; b < c</text><![CDATA[raw]]></svg>",
        );
        assert_eq!(
            clean,
            "<svg xmlns=\"http://www.w3.org/2000/svg\"><text x=\"1\">a &amp; b &lt; c</text></svg>"
        );
    }

    #[test]
    fn names_are_canonicalized_and_open_elements_closed() {
        let clean = sanitize_svg("<SVG VIEWBOX=\"0 0 4 4\" xmlns=\"http://www.w3.org/2000/svg\"><g><LinearGradient id=\"g\">");
        assert_eq!(
            clean,
            "<svg viewBox=\"0 0 4 4\" xmlns=\"http://www.w3.org/2000/svg\"><g><linearGradient id=\"g\"></linearGradient></g></svg>"
        );
    }

    #[test]
    fn style_attribute_is_checked() {
        let clean = sanitize_svg(
            "<svg><rect style=\"fill: red\"/><rect style=\"background: url(http://x)\"/><rect style=\"width: expression(alert(1))\"/></svg>",
        );
        assert!(clean.contains("<rect style=\"fill: red\"/>"));
        assert_eq!(clean.matches("style=").count(), 1);
    }

    #[test]
    fn unterminated_tag_is_dropped() {
        let clean = sanitize_svg("<svg><rect width=\"1");
        assert_eq!(clean, "<svg xmlns=\"http://www.w3.org/2000/svg\"></svg>");
    }
}
