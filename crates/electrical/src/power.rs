//! Cabin climate loads

/// Largest cabin/ambient difference the AC is rated for (°C)
pub const AC_MAX_TEMP_DELTA: f64 = 20.0;

/// Blower power per wind level (W)
pub const WIND_POWER_TABLE: [f64; 6] = [0.0, 300.0, 600.0, 900.0, 1200.0, 1500.0];

/// AC compressor power (W).
///
/// A target of 0 means the AC is off. Otherwise power grows linearly with the
/// distance between ambient and target, reaching `max_ac_power_w` at
/// [`AC_MAX_TEMP_DELTA`].
pub fn ac_power(environment_temp_c: f64, target_temp_c: i32, max_ac_power_w: f64) -> f64 {
    if target_temp_c == 0 {
        return 0.0;
    }
    let delta = (environment_temp_c - target_temp_c as f64).abs();
    (max_ac_power_w / AC_MAX_TEMP_DELTA) * delta
}

/// Blower power (W); levels above the table saturate at the top entry
pub fn wind_power(level: u8) -> f64 {
    let idx = (level as usize).min(WIND_POWER_TABLE.len() - 1);
    WIND_POWER_TABLE[idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ac_power() {
        // 35°C outside, 22°C target, 3kW unit: 150 W/°C * 13°C
        assert!((ac_power(35.0, 22, 3000.0) - 1950.0).abs() < 1e-9);
        assert_eq!(ac_power(35.0, 0, 3000.0), 0.0);
        // Heating draws the same as cooling for the same delta
        assert!((ac_power(10.0, 23, 3000.0) - ac_power(36.0, 23, 3000.0)).abs() < 1e-9);
    }

    #[test]
    fn test_wind_power_table() {
        assert_eq!(wind_power(0), 0.0);
        assert_eq!(wind_power(3), 900.0);
        assert_eq!(wind_power(5), 1500.0);
        assert_eq!(wind_power(9), 1500.0);
    }
}
