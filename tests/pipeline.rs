use async_trait::async_trait;
use diagram_renderer::depiction::{Depiction, DepictionError, DepictionService, ImageFormat};
use diagram_renderer::ir::DiagramModel;
use diagram_renderer::{
    BlockRender, Config, DiagramHost, DiagramRenderer, RenderOutcome, RenderSurface,
    SurfaceContent, SurfaceId, parse_diagram,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Depiction service that answers every request with a fixed SVG after an
/// optional delay and remembers what it was asked for.
#[derive(Default)]
struct RecordingService {
    delay: Option<Duration>,
    requests: Mutex<Vec<(String, ImageFormat)>>,
}

impl RecordingService {
    fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    fn requests(&self) -> Vec<(String, ImageFormat)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl DepictionService for RecordingService {
    async fn depict(&self, query: &str, format: ImageFormat) -> Result<Depiction, DepictionError> {
        self.requests.lock().unwrap().push((query.to_string(), format));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(Depiction {
            format,
            bytes: b"<svg><circle r=\"4\"/></svg>".to_vec(),
        })
    }
}

fn renderer_with(service: Arc<RecordingService>) -> DiagramRenderer {
    DiagramRenderer::with_depiction_service(Config::default(), service)
}

#[test]
fn flowchart_source_becomes_two_boxes_and_an_arrow() {
    let model = parse_diagram("graph LR\nA[Start] --> B[End]");
    let DiagramModel::NodeLink(diagram) = &model else {
        panic!("expected node-link model, got {model:?}");
    };
    let labels: Vec<_> = diagram
        .nodes()
        .iter()
        .map(|node| (node.id.as_str(), node.label.as_str()))
        .collect();
    assert_eq!(labels, vec![("A", "Start"), ("B", "End")]);
    assert_eq!(diagram.edges().len(), 1);
    assert_eq!(diagram.edges()[0].from, "A");
    assert_eq!(diagram.edges()[0].to, "B");

    let svg = diagram_renderer::render_diagram_svg("graph LR\nA[Start] --> B[End]", &Config::default())
        .unwrap();
    assert_eq!(svg.matches("<g class=\"node\"").count(), 2);
    assert_eq!(svg.matches("class=\"edge\"").count(), 1);
}

#[test]
fn pie_slices_keep_their_ratio() {
    let DiagramModel::Pie(chart) = parse_diagram("pie\nApples: 10\nBananas: 5") else {
        panic!("expected pie model");
    };
    assert_eq!(chart.slices.len(), 2);
    assert_eq!(chart.slices[0].label, "Apples");
    assert_eq!(chart.slices[0].value, 10.0);
    assert_eq!(chart.slices[1].label, "Bananas");
    assert_eq!(chart.slices[1].value, 5.0);
    assert_eq!(chart.slices[0].value / chart.slices[1].value, 2.0);
}

#[test]
fn plot_source_yields_expression_and_domain() {
    let DiagramModel::Plot(plot) = parse_diagram("plot\nf(x) = sin(x)\ndomain: -6.28..6.28") else {
        panic!("expected plot model");
    };
    assert_eq!(plot.expressions, vec!["sin(x)".to_string()]);
    assert_eq!(plot.domain, (-6.28, 6.28));
}

#[test]
fn vector_source_yields_labeled_vector() {
    let DiagramModel::VectorField(field) =
        parse_diagram("vector\naxes: -5..5 x -5..5\nvec (0,0) -> (3,4) label: v")
    else {
        panic!("expected vector model");
    };
    assert_eq!(field.vectors.len(), 1);
    assert_eq!(field.vectors[0].from, (0.0, 0.0));
    assert_eq!(field.vectors[0].to, (3.0, 4.0));
    assert_eq!(field.vectors[0].label.as_deref(), Some("v"));
}

#[tokio::test]
async fn chemistry_query_goes_to_the_depiction_service() {
    let service = Arc::new(RecordingService::default());
    let renderer = renderer_with(service.clone());
    let surface = RenderSurface::new(SurfaceId::new(1));

    let outcome = renderer.render(&surface, "chem\nbenzene", None::<fn()>).await;

    assert_eq!(outcome, RenderOutcome::Completed);
    assert_eq!(service.requests(), vec![("benzene".to_string(), ImageFormat::Svg)]);
    let content = surface.content();
    let svg = content.as_svg().expect("sanitized depiction");
    assert!(svg.contains("<circle r=\"4\"/>"));
}

#[tokio::test]
async fn slow_depiction_never_overwrites_a_newer_render() {
    let service = Arc::new(RecordingService::slow(Duration::from_millis(50)));
    let renderer = renderer_with(service.clone());
    let surface = Arc::new(RenderSurface::new(SurfaceId::new(3)));
    let completed = Arc::new(AtomicUsize::new(0));

    let slow_done = completed.clone();
    let fast_done = completed.clone();
    let (slow, fast) = tokio::join!(
        renderer.render(
            &surface,
            "chem\ncaffeine",
            Some(move || {
                slow_done.fetch_add(10, Ordering::SeqCst);
            })
        ),
        renderer.render(
            &surface,
            "graph TD\nX --> Y",
            Some(move || {
                fast_done.fetch_add(1, Ordering::SeqCst);
            })
        ),
    );

    assert_eq!(slow, RenderOutcome::Superseded);
    assert_eq!(fast, RenderOutcome::Completed);
    assert_eq!(completed.load(Ordering::SeqCst), 1);
    assert_eq!(surface.sequence(), 2);
    let content = surface.content();
    let svg = content.as_svg().expect("node-link diagram");
    assert!(svg.contains(">X</text>"));
    assert!(!svg.contains("<circle r=\"4\"/>"));
    assert_eq!(service.requests().len(), 1);
}

#[tokio::test]
async fn failed_render_keeps_the_source_on_the_surface() {
    let renderer = renderer_with(Arc::new(RecordingService::default()));
    let surface = RenderSurface::new(SurfaceId::new(4));
    let source = "chem\n# nothing here";

    let outcome = renderer.render(&surface, source, None::<fn()>).await;

    assert_eq!(outcome, RenderOutcome::Completed);
    let SurfaceContent::Error { message, source: kept } = surface.content() else {
        panic!("expected inline error");
    };
    assert_eq!(kept, source);
    assert!(message.contains("no chemical structure"));
    assert!(surface.content().to_html().contains("Graph Rendering Failed"));
}

#[tokio::test]
async fn host_skips_unchanged_blocks() {
    let service = Arc::new(RecordingService::default());
    let host = DiagramHost::new(renderer_with(service.clone()));
    let id = SurfaceId::new(9);

    let first = host.render_block(id, "chem\nwater", None::<fn()>).await;
    assert_eq!(first, BlockRender::Rendered(RenderOutcome::Completed));
    let second = host.render_block(id, "chem\nwater", None::<fn()>).await;
    assert_eq!(second, BlockRender::Unchanged);
    assert_eq!(service.requests().len(), 1);

    let edited = host.render_block(id, "chem\nethanol", None::<fn()>).await;
    assert_eq!(edited, BlockRender::Rendered(RenderOutcome::Completed));
    assert_eq!(service.requests().len(), 2);
    assert_eq!(host.mounted(), 1);

    assert!(host.unmount(id));
    assert_eq!(host.mounted(), 0);
    assert!(host.surface(id).is_none());

    let remounted = host.render_block(id, "chem\nethanol", None::<fn()>).await;
    assert_eq!(remounted, BlockRender::Rendered(RenderOutcome::Completed));
    assert_eq!(service.requests().len(), 3);
}
