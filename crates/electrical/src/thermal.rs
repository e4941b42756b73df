/// Heating per kW of motor power (°C/kW)
pub const HEATING_COEFF: f64 = 0.01;
pub const COOLING_COEFF: f64 = 0.15;
pub const COOLING_BASE: f64 = 1000.0;
/// Extra cooling per °C above ambient
pub const COOLING_RATE: f64 = 30.0;

/// Battery temperature after one tick.
///
/// Anchored at ambient: motor load heats the pack, and cooling grows with
/// how far the previous temperature sat above ambient.
pub fn battery_temperature(previous_c: f64, environment_c: f64, engine_power_w: f64) -> f64 {
    let heating = HEATING_COEFF * (engine_power_w / 1000.0);
    let cooling = (COOLING_BASE + COOLING_RATE * (previous_c - environment_c)) / 1000.0;
    environment_c + heating - COOLING_COEFF * cooling
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_pack_settles_below_ambient() {
        let t = battery_temperature(35.0, 35.0, 0.0);
        assert!((t - 34.85).abs() < 1e-9);
    }

    #[test]
    fn test_load_heats_pack() {
        // 100 kW adds 1°C before cooling
        let t = battery_temperature(35.0, 35.0, 100_000.0);
        assert!((t - 35.85).abs() < 1e-9);
    }

    #[test]
    fn test_hot_pack_cools_harder() {
        // 10°C over ambient: cooling term 1.3
        let t = battery_temperature(45.0, 35.0, 0.0);
        assert!((t - (35.0 - 0.15 * 1.3)).abs() < 1e-9);
        assert!(t < battery_temperature(35.0, 35.0, 0.0));
    }
}
