//! Bracketing and linear interpolation over time-ordered samples.
//!
//! Both statistics series and entity paths are assumed to be sorted by
//! time already. Nothing here sorts or extrapolates.

/// Find the first adjacent pair `(a, b)` with `time(a) <= t <= time(b)`.
///
/// Returns `None` for fewer than two samples or when `t` lies outside
/// every pair. NaN never brackets.
pub fn bracket<T>(samples: &[T], t: f64, time: impl Fn(&T) -> f64) -> Option<(&T, &T)> {
    samples.windows(2).find_map(|pair| match pair {
        [a, b] if time(a) <= t && t <= time(b) => Some((a, b)),
        _ => None,
    })
}

/// Fraction of the way `t` lies from `t0` to `t1`.
///
/// A zero-width interval yields `0.0`, so duplicate timestamps resolve to
/// the earlier sample instead of dividing by zero.
pub fn ratio(t: f64, t0: f64, t1: f64) -> f64 {
    let span = t1 - t0;
    if span > 0.0 { (t - t0) / span } else { 0.0 }
}

/// Linear interpolation between `v0` and `v1`.
pub fn lerp(v0: f64, v1: f64, ratio: f64) -> f64 {
    v0 + ratio * (v1 - v0)
}

/// Value at `t` on the segment `(t0, v0)..(t1, v1)`, with `t0 <= t <= t1`.
///
/// Exact endpoint times return the endpoint value unchanged, so a query
/// at a sample's own timestamp reproduces that sample bit for bit.
pub fn interpolate(t: f64, (t0, v0): (f64, f64), (t1, v1): (f64, f64)) -> f64 {
    if t <= t0 {
        v0
    } else if t >= t1 {
        v1
    } else {
        lerp(v0, v1, ratio(t, t0, t1))
    }
}
