use criterion::{Criterion, criterion_group, criterion_main};
use runscope::api::{PlotSurface, PlotSurfaceConfig};
use runscope::core::{BarOptions, Frame, LinearScale, Record, Row, ValueAccessor, Viewport};
use runscope::render::NullRenderer;
use std::hint::black_box;

fn segments(count: usize) -> Frame<Row> {
    (0..count)
        .map(|i| {
            let t = i as f64;
            Row::new()
                .with("run", format!("run-{}", i % 6))
                .with("start", t * 0.5)
                .with("duration", 2.0)
                .with("bitrate", 1_000.0 + (i % 7) as f64 * 250.0)
        })
        .collect()
}

fn slot() -> ValueAccessor<Row> {
    ValueAccessor::number(|row: &Row| {
        let start = row.field("start").as_f64().unwrap_or(f64::NAN);
        let duration = row.field("duration").as_f64().unwrap_or(f64::NAN);
        (start / duration).floor()
    })
}

fn bench_linear_scale_round_trip(c: &mut Criterion) {
    let scale = LinearScale::new((0.0, 10_000.0), (0.0, 1_920.0)).expect("valid scale");

    c.bench_function("linear_scale_round_trip", |b| {
        b.iter(|| {
            let px = scale.to_pixel(black_box(4_321.123)).expect("to pixel");
            let _ = scale.to_domain(px).expect("to domain");
        })
    });
}

fn bench_group_reduce_10k(c: &mut Criterion) {
    let frame = segments(10_000);
    let bitrate = ValueAccessor::<Row>::field("bitrate");

    c.bench_function("group_reduce_10k", |b| {
        b.iter(|| {
            let groups = black_box(&frame)
                .group_by(|row| row.field("run"))
                .extend(&[("slot", slot())])
                .reduce("slot", |slot, bucket| {
                    Row::new()
                        .with("slot", slot.to_value())
                        .with("bitrate", bucket.avg_field(&bitrate))
                });
            black_box(groups.len())
        })
    });
}

fn bench_bar_draw_2k(c: &mut Criterion) {
    let bitrate = ValueAccessor::<Row>::field("bitrate");
    let groups = segments(2_000)
        .group_by(|row| row.field("run"))
        .extend(&[("slot", slot())])
        .reduce("slot", |slot, bucket| {
            Row::new()
                .with("slot", slot.to_value())
                .with("bitrate", bucket.avg_field(&bitrate))
        })
        .col("bitrate");

    let config = PlotSurfaceConfig::new(Viewport::new(1600, 900)).with_transition_ms(0.0);
    let mut surface = PlotSurface::new(NullRenderer::default(), config).expect("surface");
    groups
        .plot_bar(surface.series_list_mut(), BarOptions::default())
        .expect("bar series");

    c.bench_function("bar_draw_2k", |b| {
        b.iter(|| {
            let _ = surface.draw().expect("draw should succeed");
        })
    });
}

criterion_group!(
    benches,
    bench_linear_scale_round_trip,
    bench_group_reduce_10k,
    bench_bar_draw_2k
);
criterion_main!(benches);
