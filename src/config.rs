use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

const PIE_PALETTE: [&str; 8] = [
    "#FF6384", "#36A2EB", "#FFCE56", "#4BC0C0", "#9966FF", "#FF9F40", "#FF6384", "#C9CBCF",
];

const PLOT_COLORS: [&str; 6] = [
    "#4682B4", "#CC3333", "#2E8B57", "#9966FF", "#FF9F40", "#36A2EB",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 480.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeLinkConfig {
    pub node_width: f32,
    pub node_height: f32,
    pub corner_radius: f32,
    pub node_stroke_width: f32,
    pub edge_stroke_width: f32,
    pub thick_edge_stroke_width: f32,
    pub dotted_dasharray: String,
    pub placeholder_text: String,
}

impl Default for NodeLinkConfig {
    fn default() -> Self {
        Self {
            node_width: 80.0,
            node_height: 40.0,
            corner_radius: 5.0,
            node_stroke_width: 2.0,
            edge_stroke_width: 2.0,
            thick_edge_stroke_width: 3.5,
            dotted_dasharray: "5 4".to_string(),
            placeholder_text: "No nodes detected in diagram".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PieConfig {
    pub palette: Vec<String>,
    /// Inner radius as a fraction of the outer radius; 0 draws a full pie.
    pub inner_radius_ratio: f32,
    pub margin: f32,
    pub legend_rect_size: f32,
    pub legend_spacing: f32,
    pub slice_stroke: String,
    pub estimated_marker: String,
    pub empty_text: String,
}

impl Default for PieConfig {
    fn default() -> Self {
        Self {
            palette: PIE_PALETTE.iter().map(|c| c.to_string()).collect(),
            inner_radius_ratio: 0.5,
            margin: 40.0,
            legend_rect_size: 14.0,
            legend_spacing: 8.0,
            slice_stroke: "#FFFFFF".to_string(),
            estimated_marker: "(est.)".to_string(),
            empty_text: "No data to chart".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub samples: usize,
    pub padding: f32,
    pub stroke_width: f32,
    pub colors: Vec<String>,
    pub tick_count: usize,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            samples: 400,
            padding: 30.0,
            stroke_width: 2.0,
            colors: PLOT_COLORS.iter().map(|c| c.to_string()).collect(),
            tick_count: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorConfig {
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub stroke_width: f32,
    pub label_offset: f32,
    pub tick_count: usize,
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            margin_left: 50.0,
            margin_right: 20.0,
            margin_top: 20.0,
            margin_bottom: 30.0,
            stroke_width: 2.0,
            label_offset: 5.0,
            tick_count: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChemistryConfig {
    /// Base of the structure-image service; requests go to
    /// `{service_url}/{query}/image?format={svg|png}`.
    pub service_url: String,
    /// Base of the link shown when no depiction could be fetched.
    pub lookup_url: String,
    pub timeout_ms: Option<u64>,
}

impl Default for ChemistryConfig {
    fn default() -> Self {
        Self {
            service_url: "https://cactus.nci.nih.gov/chemical/structure".to_string(),
            lookup_url: "https://pubchem.ncbi.nlm.nih.gov/compound".to_string(),
            timeout_ms: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: Theme,
    pub canvas: CanvasConfig,
    pub node_link: NodeLinkConfig,
    pub pie: PieConfig,
    pub plot: PlotConfig,
    pub vector: VectorConfig,
    pub chemistry: ChemistryConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<NumberOrString>,
    primary_color: Option<String>,
    primary_text_color: Option<String>,
    primary_border_color: Option<String>,
    line_color: Option<String>,
    edge_label_background: Option<String>,
    muted_text_color: Option<String>,
    axis_color: Option<String>,
    accent_color: Option<String>,
    error_color: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f32),
    String(String),
}

impl NumberOrString {
    fn as_f32(&self) -> Option<f32> {
        match self {
            NumberOrString::Number(val) => Some(*val),
            NumberOrString::String(val) => val.trim().trim_end_matches("px").parse::<f32>().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CanvasConfigFile {
    width: Option<f32>,
    height: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PieConfigFile {
    palette: Option<Vec<String>>,
    inner_radius_ratio: Option<f32>,
    estimated_marker: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlotConfigFile {
    samples: Option<usize>,
    colors: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChemistryConfigFile {
    service_url: Option<String>,
    lookup_url: Option<String>,
    timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    canvas: Option<CanvasConfigFile>,
    pie: Option<PieConfigFile>,
    plot: Option<PlotConfigFile>,
    chemistry: Option<ChemistryConfigFile>,
}

/// Loads overrides from a JSON or JSON5 file on top of the defaults. `None`
/// yields the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(_) => json5::from_str(contents)?,
    };

    let mut config = Config::default();

    if let Some(theme_name) = parsed.theme.as_deref() {
        match Theme::named(theme_name) {
            Some(theme) => config.theme = theme,
            None => anyhow::bail!("unknown theme '{theme_name}'"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        let theme = &mut config.theme;
        if let Some(v) = vars.font_family {
            theme.font_family = v;
        }
        if let Some(v) = vars.font_size.as_ref().and_then(NumberOrString::as_f32) {
            theme.font_size = v;
        }
        if let Some(v) = vars.primary_color {
            theme.primary_color = v;
        }
        if let Some(v) = vars.primary_text_color {
            theme.primary_text_color = v;
        }
        if let Some(v) = vars.primary_border_color {
            theme.primary_border_color = v;
        }
        if let Some(v) = vars.line_color {
            theme.line_color = v;
        }
        if let Some(v) = vars.edge_label_background {
            theme.edge_label_background = v;
        }
        if let Some(v) = vars.muted_text_color {
            theme.muted_text_color = v;
        }
        if let Some(v) = vars.axis_color {
            theme.axis_color = v;
        }
        if let Some(v) = vars.accent_color {
            theme.accent_color = v;
        }
        if let Some(v) = vars.error_color {
            theme.error_color = v;
        }
        if let Some(v) = vars.background {
            theme.background = v;
        }
    }

    if let Some(canvas) = parsed.canvas {
        if let Some(v) = canvas.width.filter(|v| *v > 0.0) {
            config.canvas.width = v;
        }
        if let Some(v) = canvas.height.filter(|v| *v > 0.0) {
            config.canvas.height = v;
        }
    }

    if let Some(pie) = parsed.pie {
        if let Some(v) = pie.palette.filter(|palette| !palette.is_empty()) {
            config.pie.palette = v;
        }
        if let Some(v) = pie.inner_radius_ratio {
            config.pie.inner_radius_ratio = v.clamp(0.0, 0.95);
        }
        if let Some(v) = pie.estimated_marker {
            config.pie.estimated_marker = v;
        }
    }

    if let Some(plot) = parsed.plot {
        if let Some(v) = plot.samples {
            config.plot.samples = v.max(2);
        }
        if let Some(v) = plot.colors.filter(|colors| !colors.is_empty()) {
            config.plot.colors = v;
        }
    }

    if let Some(chemistry) = parsed.chemistry {
        if let Some(v) = chemistry.service_url {
            config.chemistry.service_url = v;
        }
        if let Some(v) = chemistry.lookup_url {
            config.chemistry.lookup_url = v;
        }
        if chemistry.timeout_ms.is_some() {
            config.chemistry.timeout_ms = chemistry.timeout_ms;
        }
    }

    Ok(config)
}
