//! Diagram blocks embedded in editor markdown.

/// Fence labels that always mark a diagram block.
const DIAGRAM_LABELS: &[&str] = &[
    "mermaid", "dot", "graphviz", "plot", "math", "chem", "vector", "svg",
];

/// Leading words that mark an unlabeled fence as a diagram.
const DIAGRAM_KEYWORDS: &[&str] = &[
    "graph",
    "flowchart",
    "sequencediagram",
    "classdiagram",
    "pie",
    "plot",
    "math",
    "chem",
    "chemistry",
    "vector",
    "svg",
];

const FENCES: &[&str] = &["```", "~~~", ":::"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramBlock {
    /// Fence label, lowercased; `None` for unlabeled fences.
    pub language: Option<String>,
    pub body: String,
}

/// Finds every fenced diagram block in `input`, in document order. Fences
/// labeled with another language are skipped whole.
pub fn extract_diagram_blocks(input: &str) -> Vec<DiagramBlock> {
    let mut blocks = Vec::new();
    let mut open: Option<(&'static str, Option<String>)> = None;
    let mut current = Vec::new();

    for line in input.lines() {
        let trimmed = line.trim();
        let Some(fence) = open.as_ref().map(|(fence, _)| *fence) else {
            open = detect_fence(trimmed);
            continue;
        };
        if !is_fence_end(trimmed, fence) {
            current.push(line);
            continue;
        }
        if let Some((_, language)) = open.take() {
            let body = current.join("\n");
            if is_diagram(language.as_deref(), &body) {
                blocks.push(DiagramBlock { language, body });
            }
        }
        current.clear();
    }

    blocks
}

fn detect_fence(line: &str) -> Option<(&'static str, Option<String>)> {
    let fence = *FENCES.iter().find(|fence| line.starts_with(**fence))?;
    let marker = fence.chars().next()?;
    let label = line
        .trim_start_matches(marker)
        .split_whitespace()
        .next()
        .map(|label| label.trim_matches(|c: char| c == '{' || c == '}').to_ascii_lowercase())
        .filter(|label| !label.is_empty());
    Some((fence, label))
}

fn is_fence_end(line: &str, fence: &str) -> bool {
    if !line.starts_with(fence) {
        return false;
    }
    line[fence.len()..].trim().is_empty()
}

fn is_diagram(language: Option<&str>, body: &str) -> bool {
    if let Some(language) = language {
        return DIAGRAM_LABELS.contains(&language);
    }
    let Some(first) = body.lines().map(str::trim).find(|line| !line.is_empty()) else {
        return false;
    };
    if first.to_ascii_lowercase().starts_with("<svg") {
        return true;
    }
    let word = first
        .split(|c: char| !c.is_ascii_alphanumeric())
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    DIAGRAM_KEYWORDS.contains(&word.as_str())
}
