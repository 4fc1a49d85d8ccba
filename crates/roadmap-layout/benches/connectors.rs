use criterion::{black_box, criterion_group, criterion_main, Criterion};
use roadmap_layout::{build_connectors, ConnectorStyle, LayoutEngine, Rect, StaticPlatform, Trigger};
use roadmap_model::StepId;
use roadmap_test_utils::{grid_rect, FakeElement};

fn measure_and_build(c: &mut Criterion) {
    let ids: Vec<StepId> = (0..500).map(|i| StepId::new(format!("step-{i}"))).collect();
    let mut engine = LayoutEngine::new(StaticPlatform::new(1280.0));
    engine.mount_container(Some(FakeElement::new(Rect::new(0.0, 0.0, 1200.0, 80_000.0))));
    for (i, id) in ids.iter().enumerate() {
        engine.register(id.clone(), Some(FakeElement::new(grid_rect(i, 1200.0, 140.0))));
    }
    engine.sync(&ids, &Trigger::Mount);
    let style = ConnectorStyle::default();

    c.bench_function("measure_500_cards", |b| {
        b.iter(|| black_box(engine.measure()));
    });

    let snapshot = engine.snapshot();
    c.bench_function("build_500_connectors", |b| {
        b.iter(|| black_box(build_connectors(&snapshot, &ids, &style)));
    });
}

criterion_group!(benches, measure_and_build);
criterion_main!(benches);
