use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use diagram_renderer::classify;
use diagram_renderer::config::Config;
use diagram_renderer::parser::parse_diagram;
use diagram_renderer::render::render_svg;
use diagram_renderer::sanitize::sanitize_svg;
use std::hint::black_box;

fn dense_flowchart_source(nodes: usize, extra_edges: usize) -> String {
    let mut out = String::from("graph TD\n");
    if nodes == 0 {
        return out;
    }
    for i in 0..nodes {
        out.push_str(&format!("  N{}[Node {}]\n", i, i));
    }
    for i in 0..nodes.saturating_sub(1) {
        out.push_str(&format!("  N{} --> N{}\n", i, i + 1));
    }
    let mut count = 0usize;
    for i in 0..nodes {
        for j in (i + 2)..nodes {
            if count >= extra_edges {
                break;
            }
            out.push_str(&format!("  N{} -.-> N{}\n", i, j));
            count += 1;
        }
        if count >= extra_edges {
            break;
        }
    }
    out
}

fn fixture(name: &str) -> &'static str {
    match name {
        "flowchart_small" => "graph LR\n  A[Start] --> B{Decide}\n  B -->|yes| C(Done)\n  B -.->|no| A\n",
        "sequence_small" => {
            "sequenceDiagram\n  Alice->>Bob: Hello\n  Bob-->>Alice: Hi\n  Alice->>Carol: Ping\n"
        }
        "class_small" => {
            "classDiagram\n  Animal <|-- Dog\n  Animal <|-- Cat\n  Dog : +bark()\n"
        }
        "pie_small" => "pie title Pets\n  \"Dogs\": 386\n  \"Cats\": 85\n  \"Rats\": 15\n",
        "plot_small" => "plot\nf(x) = sin(x) * x\ng(x) = x^2 / 10\ndomain: -6.28..6.28\n",
        "vector_small" => {
            "vector\naxes: -5..5 x -5..5\nvec (0,0) -> (3,4) label: v\nvec (0,0) -> (-2,1) label: w\n"
        }
        "markup_small" => {
            "<svg viewBox=\"0 0 10 10\"><circle cx=\"5\" cy=\"5\" r=\"4\" onclick=\"x()\"/><script>alert(1)</script></svg>"
        }
        _ => panic!("unknown fixture"),
    }
}

const FIXTURES: &[&str] = &[
    "flowchart_small",
    "sequence_small",
    "class_small",
    "pie_small",
    "plot_small",
    "vector_small",
    "markup_small",
];

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");
    for name in FIXTURES {
        let input = fixture(name);
        group.bench_with_input(BenchmarkId::from_parameter(name), input, |b, data| {
            b.iter(|| black_box(classify(black_box(data))));
        });
    }
    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for name in FIXTURES {
        let input = fixture(name);
        group.bench_with_input(BenchmarkId::from_parameter(name), input, |b, data| {
            b.iter(|| black_box(parse_diagram(black_box(data))));
        });
    }
    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("end_to_end");
    let config = Config::default();
    for name in FIXTURES {
        let input = fixture(name);
        group.bench_with_input(BenchmarkId::from_parameter(name), input, |b, data| {
            b.iter(|| {
                let mut model = parse_diagram(black_box(data));
                let svg = render_svg(&mut model, &config, "bench").expect("render failed");
                black_box(svg.len());
            });
        });
    }
    group.finish();
}

fn bench_dense_flowchart(c: &mut Criterion) {
    let mut group = c.benchmark_group("dense_flowchart");
    let config = Config::default();
    for (nodes, extra_edges) in [(40usize, 80usize), (60, 180), (80, 320)] {
        let name = format!("dense_{}_{}", nodes, extra_edges);
        let input = dense_flowchart_source(nodes, extra_edges);
        group.bench_with_input(BenchmarkId::from_parameter(name), &input, |b, data| {
            b.iter(|| {
                let mut model = parse_diagram(black_box(data));
                let svg = render_svg(&mut model, &config, "bench").expect("render failed");
                black_box(svg.len());
            });
        });
    }
    group.finish();
}

fn bench_sanitize(c: &mut Criterion) {
    let mut group = c.benchmark_group("sanitize");
    let config = Config::default();
    let mut model = parse_diagram(&dense_flowchart_source(60, 180));
    let rendered = render_svg(&mut model, &config, "bench").expect("render failed");
    group.bench_function("rendered_flowchart", |b| {
        b.iter(|| black_box(sanitize_svg(black_box(&rendered))));
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_classify,
    bench_parse,
    bench_end_to_end,
    bench_dense_flowchart,
    bench_sanitize
);
criterion_main!(benches);
