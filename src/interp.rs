use crate::types::{Rgba, Value};

// Return the interpolation factor t of `v` between v0 and v1.
// A zero-width interval yields 0 rather than dividing by zero.
pub fn find_t(v0: Value, v1: Value, v: Value) -> Value {
    let span = v1 - v0;
    if span == 0.0 { 0.0 } else { (v - v0) / span }
}

// Linear interpolation
pub fn lerp(a: Value, b: Value, t: Value) -> Value {
    a + (b - a) * t
}

// Per-channel linear interpolation between two colors
pub fn lerp_color(low: Rgba, high: Rgba, t: Value) -> Rgba {
    std::array::from_fn(|c| lerp(low[c] as Value, high[c] as Value, t) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_t_guards_zero_span() {
        assert_eq!(find_t(3.0, 3.0, 3.0), 0.0);
        assert_eq!(find_t(-2.0, 5.0, 5.0), 1.0);
        assert_eq!(find_t(-2.0, 5.0, -2.0), 0.0);
    }

    #[test]
    fn lerp_color_hits_both_ends() {
        let low = [0.0, 0.0, 1.0, 1.0];
        let high = [1.0, 0.0, 0.0, 1.0];
        assert_eq!(lerp_color(low, high, 0.0), low);
        assert_eq!(lerp_color(low, high, 1.0), high);
        assert_eq!(lerp_color(low, high, 0.5), [0.5, 0.0, 0.5, 1.0]);
    }
}
