use proptest::prelude::*;
use runscope::api::{PlotSurface, PlotSurfaceConfig};
use runscope::core::{Frame, FrameGroup, LineOptions, Record, Row, Value, ValueAccessor, Viewport};
use runscope::render::NullRenderer;

fn key_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u16..500).prop_map(|n| n.to_string()),
        "[a-z]{1,3}".prop_map(|s| format!("k{s}")),
    ]
}

proptest! {
    #[test]
    fn filter_then_map_preserves_relative_order(values in prop::collection::vec(-100i32..100, 0..60)) {
        let frame: Frame<Row> = values
            .iter()
            .enumerate()
            .map(|(seq, value)| Row::new().with("seq", seq).with("v", f64::from(*value)))
            .collect();
        let kept = frame
            .filter(|row| row.field("v").as_f64().is_some_and(|v| v >= 0.0))
            .map(Clone::clone);
        let seqs: Vec<f64> = kept.iter().filter_map(|row| row.field("seq").as_f64()).collect();
        prop_assert!(seqs.windows(2).all(|pair| pair[0] < pair[1]));
        prop_assert_eq!(seqs.len(), values.iter().filter(|v| **v >= 0).count());
    }

    #[test]
    fn aggregates_of_all_na_frames_are_zero(len in 0usize..20) {
        let frame: Frame<Row> = (0..len).map(|_| Row::new().with("v", Value::Missing)).collect();
        let accessor = ValueAccessor::<Row>::field("v");
        prop_assert_eq!(frame.avg_field(&accessor), 0.0);
        prop_assert_eq!(frame.std(&accessor), 0.0);
    }

    #[test]
    fn reduce_then_sort_orders_numeric_keys_first(keys in prop::collection::vec(key_strategy(), 0..40)) {
        let frame: Frame<Row> = keys.iter().map(|key| Row::new().with("k", key.as_str())).collect();
        let sorted = frame
            .reduce("k", |key, bucket| Row::new().with("k", key.to_value()).with("n", bucket.len()))
            .sort_numerical("k");
        let fields: Vec<Value> = sorted.iter().map(|row| row.field("k")).collect();

        let split = fields.iter().position(|value| value.as_f64().is_none()).unwrap_or(fields.len());
        let numeric: Vec<f64> = fields[..split].iter().filter_map(Value::as_f64).collect();
        prop_assert_eq!(numeric.len(), split);
        prop_assert!(numeric.windows(2).all(|pair| pair[0] <= pair[1]));
        prop_assert!(fields[split..].iter().all(|value| value.as_f64().is_none()));

        let mut first_seen: Vec<&str> = Vec::new();
        for key in keys.iter().filter(|key| key.starts_with('k')) {
            if !first_seen.contains(&key.as_str()) {
                first_seen.push(key);
            }
        }
        let textual: Vec<String> = fields[split..]
            .iter()
            .filter_map(|value| value.as_str().map(str::to_owned))
            .collect();
        prop_assert_eq!(textual, first_seen);
    }

    #[test]
    fn step_conversion_holds_each_value_until_the_next_sample(
        samples in prop::collection::vec((0.1f64..10.0, -50.0f64..50.0), 2..30),
        fraction in 0.0f64..0.99,
    ) {
        let mut time = 0.0;
        let mut rows = Vec::with_capacity(samples.len());
        for (gap, value) in &samples {
            rows.push(Row::new().with("time", time).with("bw", *value));
            time += gap;
        }
        let times: Vec<f64> = rows.iter().filter_map(|row| row.field("time").as_f64()).collect();
        let stepped = Frame::new(rows.clone()).to_step("time");
        prop_assert_eq!(stepped.len(), 2 * rows.len() - 1);

        for i in 0..rows.len() - 1 {
            let t = times[i] + (times[i + 1] - times[i]) * fraction;
            prop_assert_eq!(stepped.sample_step("time", "bw", t), rows[i].field("bw"));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn rectangular_zoom_then_reset_restores_ranges(
        x0 in 0.0f64..640.0,
        dx in 1.0f64..320.0,
        y0 in 0.0f64..460.0,
        dy in 1.0f64..230.0,
    ) {
        let config = PlotSurfaceConfig::new(Viewport::new(800, 600)).with_transition_ms(0.0);
        let mut surface = PlotSurface::new(NullRenderer::default(), config).expect("surface");
        let rows: Vec<Row> = (0..6)
            .map(|t| Row::new().with("t", f64::from(t)).with("v", f64::from(t * t)))
            .collect();
        FrameGroup::from_groups([("run", rows)], "t")
            .col("v")
            .plot_line(surface.series_list_mut(), LineOptions::default())
            .expect("line");
        surface.draw().expect("draw");
        let x_before = surface.x_scale().expect("x").range();
        let y_before = surface.y_scale(0).expect("y").range();

        surface.zoom_to_rect(x0, y0, x0 + dx, y0 + dy).expect("zoom");
        prop_assert!(surface.is_zoomed());
        surface.reset_zoom().expect("reset");

        prop_assert_eq!(surface.x_scale().expect("x").range(), x_before);
        prop_assert_eq!(surface.y_scale(0).expect("y").range(), y_before);
        prop_assert_eq!(surface.y_scale(0).expect("y").domain().0, 0.0);
    }
}
