use super::RenderError;
use crate::config::Config;
use crate::depiction::{DepictionService, ImageFormat, lookup_link};
use crate::ir::ChemistryQuery;
use crate::sanitize::sanitize_svg;
use crate::surface::{RenderSurface, RenderTicket, SurfaceContent};
use tracing::warn;

/// Fetches a depiction of `query`: vector first, then raster, then a notice
/// linking to a lookup page. A render overtaken on `surface` between the two
/// requests stops with [`RenderError::Superseded`] instead of issuing the
/// second one.
pub async fn render_chemistry(
    query: &ChemistryQuery,
    service: &dyn DepictionService,
    config: &Config,
    surface: &RenderSurface,
    ticket: &RenderTicket,
) -> Result<SurfaceContent, RenderError> {
    let text = query.query.trim();
    if text.is_empty() {
        return Err(RenderError::EmptyQuery);
    }

    match service.depict(text, ImageFormat::Svg).await {
        Ok(depiction) => {
            let markup = String::from_utf8_lossy(&depiction.bytes);
            return Ok(SurfaceContent::Svg(sanitize_svg(&markup)));
        }
        Err(err) => warn!(query = text, error = %err, "vector depiction failed"),
    }

    if !surface.is_current(ticket) {
        return Err(RenderError::Superseded);
    }

    match service.depict(text, ImageFormat::Png).await {
        Ok(depiction) => {
            return Ok(SurfaceContent::Image {
                format: depiction.format,
                bytes: depiction.bytes,
            });
        }
        Err(err) => warn!(query = text, error = %err, "raster depiction failed"),
    }

    Ok(SurfaceContent::Notice {
        text: format!("No structure image is available for \"{text}\"."),
        link: lookup_link(&config.chemistry, text),
    })
}
