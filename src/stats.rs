//! Null-aware numeric helpers used by the imputer and the KPI aggregator.

/// Arithmetic mean of the present values. Returns `None` when nothing is present.
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Median of the present values. Even-length inputs average the two middle
/// values. Returns `None` when nothing is present.
pub fn median<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut present: Vec<f64> = values.into_iter().flatten().collect();
    if present.is_empty() {
        return None;
    }

    present.sort_by(f64::total_cmp);
    let mid = present.len() / 2;
    if present.len() % 2 == 0 {
        Some((present[mid - 1] + present[mid]) / 2.0)
    } else {
        Some(present[mid])
    }
}

/// Trailing rolling mean with a minimum of one observation.
///
/// Each output averages the present values among the last `window` inputs
/// (fewer at the start of the series). An output is `None` only when its
/// window holds no present value.
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let window = window.max(1);
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            mean(values[start..=i].iter().copied())
        })
        .collect()
}

/// First difference of a series. The first element, and any element whose
/// operands include a gap, is `0.0`.
pub fn first_difference(values: &[Option<f64>]) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let mut previous: Option<Option<f64>> = None;

    for &current in values {
        let delta = match (previous, current) {
            (Some(Some(prev)), Some(cur)) => cur - prev,
            _ => 0.0,
        };
        out.push(delta);
        previous = Some(current);
    }

    out
}

/// Rounds to one decimal place, halves away from zero.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
