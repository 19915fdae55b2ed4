//! "Nice" tick generation for linear domains.
//!
//! Steps are powers of ten multiplied by 1, 2 or 5, chosen so that roughly
//! `count` ticks cover the domain.

const E10: f64 = 7.071_067_811_865_476; // sqrt(50)
const E5: f64 = 3.162_277_660_168_379_5; // sqrt(10)
const E2: f64 = 1.414_213_562_373_095_1; // sqrt(2)
const MAX_TICKS: usize = 1_000;

/// Step size between nice ticks covering `[start, stop]` with about `count` ticks.
#[must_use]
pub fn tick_step(start: f64, stop: f64, count: usize) -> Option<f64> {
    if count == 0 || !start.is_finite() || !stop.is_finite() || start == stop {
        return None;
    }
    let raw = (stop - start).abs() / count as f64;
    let power = raw.log10().floor();
    let magnitude = 10_f64.powf(power);
    let error = raw / magnitude;
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };
    let step = factor * magnitude;
    (step.is_finite() && step > 0.0).then_some(step)
}

/// Nice tick values inside `[min(start, stop), max(start, stop)]`, ascending.
#[must_use]
pub fn nice_ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    let (low, high) = if start <= stop {
        (start, stop)
    } else {
        (stop, start)
    };
    let Some(step) = tick_step(low, high, count) else {
        return if low.is_finite() && low == high {
            vec![low]
        } else {
            Vec::new()
        };
    };
    let first = (low / step).ceil();
    let last = (high / step).floor();
    if last < first {
        return Vec::new();
    }
    let n = ((last - first) as usize + 1).min(MAX_TICKS);
    (0..n)
        .map(|i| {
            let value = (first + i as f64) * step;
            // Snap away binary noise such as 0.30000000000000004.
            let digits = (-step.log10().floor()).max(0.0) as i32 + 1;
            let scale = 10_f64.powi(digits);
            (value * scale).round() / scale
        })
        .collect()
}

/// Tick count used for a Y axis: the span itself for short spans, else 10.
#[must_use]
pub fn axis_tick_count(min: f64, max: f64, default_count: usize) -> usize {
    let span = (max - min).abs();
    if span.is_finite() && span < 25.0 {
        (span.round() as usize).max(1)
    } else {
        default_count
    }
}
