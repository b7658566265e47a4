//! The classify → parse → render entry point.
//!
//! [`DiagramRenderer::render`] takes a ticket from the surface before doing
//! anything else and commits through it at the end, so the surface only ever
//! shows the output of its most recent render. Every failure below this point
//! ends up on the surface as an inline error; nothing is returned to the
//! caller except whether the render completed or was overtaken.

use crate::config::Config;
use crate::depiction::{DepictionError, DepictionService, HttpDepictionService};
use crate::ir::DiagramModel;
use crate::parser::parse_diagram;
use crate::render::{render_chemistry, render_svg};
use crate::surface::{RenderSurface, RenderTicket, SurfaceContent};
use std::sync::Arc;
use tracing::{debug, warn};

pub use crate::render::RenderError;

/// How a call to [`DiagramRenderer::render`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The surface shows this render's result (possibly an inline error).
    Completed,
    /// A newer render started on the surface; this one left it untouched.
    Superseded,
}

#[derive(Clone)]
pub struct DiagramRenderer {
    config: Config,
    depiction: Arc<dyn DepictionService>,
}

impl DiagramRenderer {
    /// Renderer backed by the HTTP depiction service from `config`.
    pub fn new(config: Config) -> Result<Self, DepictionError> {
        let depiction = HttpDepictionService::new(&config.chemistry)?;
        Ok(Self::with_depiction_service(config, Arc::new(depiction)))
    }

    pub fn with_depiction_service(config: Config, depiction: Arc<dyn DepictionService>) -> Self {
        Self { config, depiction }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Renders `source` into `surface`. `on_complete` runs once the surface
    /// holds this render's result and is dropped unrun if the render is
    /// superseded.
    pub async fn render<F: FnOnce()>(
        &self,
        surface: &RenderSurface,
        source: &str,
        on_complete: Option<F>,
    ) -> RenderOutcome {
        let ticket = surface.begin();
        let mut model = parse_diagram(source);

        let rendered = self.render_model(&mut model, surface, &ticket).await;
        let content = match rendered {
            Ok(content) => content,
            Err(RenderError::Superseded) => {
                debug!(surface = %ticket.surface(), sequence = ticket.sequence(), "render superseded");
                return RenderOutcome::Superseded;
            }
            Err(err) => {
                warn!(
                    surface = %ticket.surface(),
                    notation = model.tag().as_str(),
                    error = %err,
                    "diagram render failed"
                );
                SurfaceContent::Error {
                    message: err.to_string(),
                    source: source.to_string(),
                }
            }
        };

        if !surface.commit(&ticket, content) {
            debug!(surface = %ticket.surface(), sequence = ticket.sequence(), "dropping stale render");
            return RenderOutcome::Superseded;
        }
        if let Some(callback) = on_complete {
            callback();
        }
        RenderOutcome::Completed
    }

    async fn render_model(
        &self,
        model: &mut DiagramModel,
        surface: &RenderSurface,
        ticket: &RenderTicket,
    ) -> Result<SurfaceContent, RenderError> {
        match model {
            DiagramModel::Chemistry(query) => {
                render_chemistry(query, self.depiction.as_ref(), &self.config, surface, ticket).await
            }
            _ => {
                let id_prefix = format!("{}-{}", ticket.surface(), ticket.sequence());
                render_svg(model, &self.config, &id_prefix).map(SurfaceContent::Svg)
            }
        }
    }
}
