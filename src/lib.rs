pub mod blocks;
pub mod classify;
pub mod config;
pub mod depiction;
pub mod expr;
pub mod host;
pub mod ir;
pub mod layout;
pub mod model_dump;
pub mod parser;
pub mod pipeline;
pub mod render;
pub mod sanitize;
#[cfg(feature = "png")]
pub mod snapshot;
pub mod surface;
pub mod theme;

pub use classify::classify;
pub use config::{Config, load_config};
pub use host::{BlockRender, DiagramHost};
pub use ir::{DiagramModel, NotationTag};
pub use parser::parse_diagram;
pub use pipeline::{DiagramRenderer, RenderError, RenderOutcome};
pub use surface::{RenderSurface, SurfaceContent, SurfaceId, SurfaceRegistry};

/// Classifies, parses and renders `source` without a surface. Chemistry
/// sources need the asynchronous pipeline and fail with
/// [`RenderError::DepictionRequired`].
pub fn render_diagram_svg(source: &str, config: &Config) -> Result<String, RenderError> {
    let mut model = parse_diagram(source);
    render::render_svg(&mut model, config, "diagram")
}
