// Series synthesis - derived series built from a raw primary series

/// Window sizes of the smoothed load approximations.
pub const LOAD_WINDOWS: [usize; 2] = [5, 15];

/// Round to the 2-decimal precision every synthesized value carries.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Causal moving average. Index `i` averages `[max(0, i - (window - 1)), i]`,
/// so the first samples use a shrinking window instead of padding.
pub fn trailing_average(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    (0..values.len())
        .map(|i| {
            let slice = &values[(i + 1).saturating_sub(window)..=i];
            round2(slice.iter().sum::<f64>() / slice.len() as f64)
        })
        .collect()
}

/// Load chart series: raw values plus the 5 and 15 sample averages.
/// Every series is its own allocation.
pub fn load_series(cpu: &[f64]) -> [Vec<f64>; 3] {
    [
        cpu.to_vec(),
        trailing_average(cpu, LOAD_WINDOWS[0]),
        trailing_average(cpu, LOAD_WINDOWS[1]),
    ]
}
