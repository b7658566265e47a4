//! Render surfaces and their owner-side registry.
//!
//! A [`RenderSurface`] pairs the displayed content with a render sequence
//! counter. Every render calls [`RenderSurface::begin`] to take a
//! [`RenderTicket`] and may only write through [`RenderSurface::commit`],
//! which checks the ticket against the current sequence under the same lock
//! that guards the content. A superseded render therefore cannot touch the
//! surface, whatever order the renders finish in.

use crate::depiction::ImageFormat;
use crate::render::escape_xml;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(u64);

impl SurfaceId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for SurfaceId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface-{}", self.0)
    }
}

/// What a surface currently shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SurfaceContent {
    #[default]
    Empty,
    Svg(String),
    Image {
        format: ImageFormat,
        bytes: Vec<u8>,
    },
    /// Explanatory text, optionally with a link for the reader to follow.
    Notice {
        text: String,
        link: Option<String>,
    },
    /// Inline error state; keeps the diagram source for display.
    Error {
        message: String,
        source: String,
    },
}

impl SurfaceContent {
    pub fn is_empty(&self) -> bool {
        matches!(self, SurfaceContent::Empty)
    }

    pub fn as_svg(&self) -> Option<&str> {
        match self {
            SurfaceContent::Svg(svg) => Some(svg),
            _ => None,
        }
    }

    /// Markup for embedding the content in an HTML document.
    pub fn to_html(&self) -> String {
        match self {
            SurfaceContent::Empty => String::new(),
            SurfaceContent::Svg(svg) => svg.clone(),
            SurfaceContent::Image { format, bytes } => format!(
                "<img class=\"diagram-image\" alt=\"diagram\" src=\"data:{};base64,{}\"/>",
                format.mime_type(),
                STANDARD.encode(bytes)
            ),
            SurfaceContent::Notice { text, link } => {
                let mut html = format!(
                    "<div class=\"diagram-notice\"><p>{}</p>",
                    escape_xml(text)
                );
                if let Some(link) = link {
                    let link = escape_xml(link);
                    html.push_str(&format!(
                        "<a href=\"{link}\" target=\"_blank\" rel=\"noopener noreferrer\">{link}</a>"
                    ));
                }
                html.push_str("</div>");
                html
            }
            SurfaceContent::Error { message, source } => format!(
                "<div class=\"diagram-error\"><h4>Graph Rendering Failed</h4><p>{}</p><details><summary>Source</summary><pre><code>{}</code></pre></details></div>",
                escape_xml(message),
                escape_xml(source)
            ),
        }
    }
}

/// Proof that a render started at a given sequence on a given surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTicket {
    surface: SurfaceId,
    sequence: u64,
}

impl RenderTicket {
    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

#[derive(Debug, Default)]
struct SurfaceState {
    sequence: u64,
    content: SurfaceContent,
}

#[derive(Debug)]
pub struct RenderSurface {
    id: SurfaceId,
    state: Mutex<SurfaceState>,
}

impl RenderSurface {
    pub fn new(id: SurfaceId) -> Self {
        Self {
            id,
            state: Mutex::new(SurfaceState::default()),
        }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    // Nothing panics while the lock is held, so a poisoned guard still
    // holds consistent state.
    fn lock(&self) -> MutexGuard<'_, SurfaceState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Starts a render: bumps the sequence, clears the content and returns
    /// the ticket the render must present when committing.
    pub fn begin(&self) -> RenderTicket {
        let mut state = self.lock();
        state.sequence += 1;
        state.content = SurfaceContent::Empty;
        RenderTicket {
            surface: self.id,
            sequence: state.sequence,
        }
    }

    pub fn is_current(&self, ticket: &RenderTicket) -> bool {
        ticket.surface == self.id && self.lock().sequence == ticket.sequence
    }

    /// Replaces the content if `ticket` is still current. Returns whether the
    /// write happened.
    pub fn commit(&self, ticket: &RenderTicket, content: SurfaceContent) -> bool {
        if ticket.surface != self.id {
            return false;
        }
        let mut state = self.lock();
        if state.sequence != ticket.sequence {
            return false;
        }
        state.content = content;
        true
    }

    pub fn sequence(&self) -> u64 {
        self.lock().sequence
    }

    pub fn content(&self) -> SurfaceContent {
        self.lock().content.clone()
    }

    pub fn has_content(&self) -> bool {
        !self.lock().content.is_empty()
    }
}

/// Surfaces keyed by identity, created on first mount and dropped on unmount.
#[derive(Debug, Default)]
pub struct SurfaceRegistry {
    surfaces: HashMap<SurfaceId, Arc<RenderSurface>>,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the surface for `id`, creating it if needed.
    pub fn mount(&mut self, id: SurfaceId) -> Arc<RenderSurface> {
        self.surfaces
            .entry(id)
            .or_insert_with(|| {
                info!(%id, "mounted render surface");
                Arc::new(RenderSurface::new(id))
            })
            .clone()
    }

    pub fn get(&self, id: SurfaceId) -> Option<Arc<RenderSurface>> {
        self.surfaces.get(&id).cloned()
    }

    /// Forgets the surface. Renders still holding it finish against the
    /// detached surface and are never shown.
    pub fn unmount(&mut self, id: SurfaceId) -> bool {
        let removed = self.surfaces.remove(&id).is_some();
        if removed {
            info!(%id, "unmounted render surface");
        }
        removed
    }

    pub fn contains(&self, id: SurfaceId) -> bool {
        self.surfaces.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}
