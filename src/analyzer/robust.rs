//! Robust order statistics over normalised intensities

/// Returns an ascending copy of the values
pub fn sorted(values: &[f32]) -> Vec<f32> {
    let mut out = values.to_vec();
    out.sort_unstable_by(|a, b| a.total_cmp(b));
    out
}

/// Linear-interpolated percentile of an ascending slice, `q` in [0, 100]
pub fn percentile_sorted(sorted: &[f32], q: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0] as f64,
        n => {
            let rank = (q.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            let lo_v = sorted[lo] as f64;
            let hi_v = sorted[hi] as f64;
            lo_v + (hi_v - lo_v) * (rank - lo as f64)
        }
    }
}

pub fn median(values: &[f32]) -> f64 {
    percentile_sorted(&sorted(values), 50.0)
}

/// Median absolute deviation around `center`
pub fn mad(values: &[f32], center: f64) -> f64 {
    let deviations: Vec<f32> = values
        .iter()
        .map(|v| (*v as f64 - center).abs() as f32)
        .collect();
    median(&deviations)
}

/// Fraction of values strictly above `threshold`
pub fn fraction_above(values: &[f32], threshold: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let count = values.iter().filter(|v| **v as f64 > threshold).count();
    count as f64 / values.len() as f64
}
