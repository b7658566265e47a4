//! The surface owner: mounts surfaces and feeds diagram blocks to the
//! renderer.

use crate::pipeline::{DiagramRenderer, RenderOutcome};
use crate::surface::{RenderSurface, SurfaceId, SurfaceRegistry};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

#[derive(Debug, Default)]
struct HostState {
    surfaces: SurfaceRegistry,
    /// Source of the last render started on each surface.
    sources: HashMap<SurfaceId, String>,
}

/// Owns the mounted surfaces and the renderer that fills them.
pub struct DiagramHost {
    renderer: DiagramRenderer,
    state: Mutex<HostState>,
}

/// What [`DiagramHost::render_block`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRender {
    Rendered(RenderOutcome),
    /// The source matches the last render and the surface still shows it.
    Unchanged,
}

impl DiagramHost {
    pub fn new(renderer: DiagramRenderer) -> Self {
        Self {
            renderer,
            state: Mutex::new(HostState::default()),
        }
    }

    pub fn renderer(&self) -> &DiagramRenderer {
        &self.renderer
    }

    fn lock(&self) -> MutexGuard<'_, HostState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn mount(&self, id: SurfaceId) -> Arc<RenderSurface> {
        self.lock().surfaces.mount(id)
    }

    pub fn surface(&self, id: SurfaceId) -> Option<Arc<RenderSurface>> {
        self.lock().surfaces.get(id)
    }

    /// Renders `source` into the surface `id`, mounting it on first use.
    pub async fn render_block<F: FnOnce()>(
        &self,
        id: SurfaceId,
        source: &str,
        on_complete: Option<F>,
    ) -> BlockRender {
        let surface = {
            let mut state = self.lock();
            let surface = state.surfaces.mount(id);
            if state.sources.get(&id).map(String::as_str) == Some(source) && surface.has_content() {
                debug!(surface = %id, "source unchanged, skipping render");
                return BlockRender::Unchanged;
            }
            state.sources.insert(id, source.to_string());
            surface
        };

        BlockRender::Rendered(self.renderer.render(&surface, source, on_complete).await)
    }

    /// Drops the surface and its remembered source. Returns whether it was
    /// mounted.
    pub fn unmount(&self, id: SurfaceId) -> bool {
        let mut state = self.lock();
        state.sources.remove(&id);
        state.surfaces.unmount(id)
    }

    pub fn mounted(&self) -> usize {
        self.lock().surfaces.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::depiction::{Depiction, DepictionError, DepictionService, ImageFormat};
    use async_trait::async_trait;

    struct Offline;

    #[async_trait]
    impl DepictionService for Offline {
        async fn depict(&self, _query: &str, _format: ImageFormat) -> Result<Depiction, DepictionError> {
            Err(DepictionError::Status { status: 503 })
        }
    }

    fn host() -> DiagramHost {
        DiagramHost::new(DiagramRenderer::with_depiction_service(
            Config::default(),
            Arc::new(Offline),
        ))
    }

    #[tokio::test]
    async fn same_length_edit_past_the_header_rerenders() {
        let host = host();
        let id = SurfaceId::new(1);
        let before = "pie title Fruit basket for today\nApples: 10\nBananas: 5";
        let after = "pie title Fruit basket for today\nApples: 10\nBananas: 9";
        assert_eq!(before.len(), after.len());

        let first = host.render_block(id, before, None::<fn()>).await;
        assert_eq!(first, BlockRender::Rendered(RenderOutcome::Completed));
        let shown = host.surface(id).unwrap().content();
        assert!(shown.as_svg().unwrap().contains("Bananas"));

        let second = host.render_block(id, after, None::<fn()>).await;
        assert_eq!(second, BlockRender::Rendered(RenderOutcome::Completed));
        assert_eq!(host.surface(id).unwrap().sequence(), 2);

        let third = host.render_block(id, after, None::<fn()>).await;
        assert_eq!(third, BlockRender::Unchanged);
        assert_eq!(host.surface(id).unwrap().sequence(), 2);
    }
}
