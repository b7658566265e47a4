use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub primary_color: String,
    pub primary_text_color: String,
    pub primary_border_color: String,
    pub line_color: String,
    pub edge_label_background: String,
    pub muted_text_color: String,
    pub axis_color: String,
    pub accent_color: String,
    pub error_color: String,
    pub background: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

impl Theme {
    /// The editor's white-and-grey palette.
    pub fn classic() -> Self {
        Self {
            font_family: "system-ui, -apple-system, \"Segoe UI\", sans-serif".to_string(),
            font_size: 12.0,
            primary_color: "#FFFFFF".to_string(),
            primary_text_color: "#333333".to_string(),
            primary_border_color: "#333333".to_string(),
            line_color: "#999999".to_string(),
            edge_label_background: "#FFFFFF".to_string(),
            muted_text_color: "#666666".to_string(),
            axis_color: "#333333".to_string(),
            accent_color: "#CC3333".to_string(),
            error_color: "#CC3333".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            primary_color: "#F8FAFF".to_string(),
            primary_text_color: "#1C2430".to_string(),
            primary_border_color: "#C7D2E5".to_string(),
            line_color: "#7A8AA6".to_string(),
            edge_label_background: "#FFFFFF".to_string(),
            muted_text_color: "#5B677A".to_string(),
            axis_color: "#7A8AA6".to_string(),
            accent_color: "#D9485F".to_string(),
            error_color: "#B42318".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    /// Looks up a built-in theme by name.
    pub fn named(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "classic" | "default" | "base" => Some(Self::classic()),
            "modern" => Some(Self::modern()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_themes() {
        assert_eq!(Theme::named("Modern"), Some(Theme::modern()));
        assert_eq!(Theme::named("default"), Some(Theme::classic()));
        assert_eq!(Theme::named("neon"), None);
    }
}
