//! Sensor sampling schedule in synchronous mode.
//!
//! A sensor with `sensor_tick = interval` produces a sample on the first tick at which the
//! accumulated simulation time reaches the next multiple of `interval`. Sensors faster than
//! the simulation step fire on every tick.

/// Float slack for accumulated time comparisons
const EPSILON: f64 = 1e-9;

/// Whether a sensor with the given sample interval fires on tick number `tick` (1-based,
/// counted since the sensor started listening) of a world stepping by `fixed_delta`.
pub fn is_due(tick: u64, interval: f64, fixed_delta: f64) -> bool {
    if tick == 0 {
        return false;
    }
    if interval <= fixed_delta + EPSILON {
        return true;
    }
    let periods = |k: u64| ((k as f64 * fixed_delta) / interval + EPSILON).floor() as u64;
    periods(tick) > periods(tick - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fast_sensor_fires_every_tick() {
        assert!((1..=10).all(|k| is_due(k, 0.0, 0.05)));
        assert!((1..=10).all(|k| is_due(k, 0.05, 0.05)));
    }

    #[test]
    fn slow_sensor_fires_on_interval_boundaries() {
        // 0.1 s interval at 0.05 s per tick: every second tick
        let due: Vec<u64> = (1..=6).filter(|&k| is_due(k, 0.1, 0.05)).collect();
        assert_eq!(due, vec![2, 4, 6]);
    }

    #[test]
    fn non_multiple_interval() {
        // 0.12 s at 0.05 s: boundaries at 0.12, 0.24, 0.36 -> ticks 3, 5, 8
        let due: Vec<u64> = (1..=8).filter(|&k| is_due(k, 0.12, 0.05)).collect();
        assert_eq!(due, vec![3, 5, 8]);
    }

    #[test]
    fn tick_zero_never_due() {
        assert!(!is_due(0, 0.0, 0.05));
    }
}
