//! Longitudinal vehicle physics
//!
//! Stateless functions converting instantaneous inputs into forces, torque,
//! motor speed and electrical power. Anything that needs memory across ticks
//! (the previous acceleration) is passed in explicitly by the caller, so every
//! function here is deterministic and bit-reproducible.
//!
//! Forces are in N, masses in kg, speeds in m/s unless the name says otherwise.

/// Gear ratio on the torque path
pub const GEAR_RATIO: f64 = 9.0;
/// Final-drive ratio on the wheel-to-motor speed path
pub const FINAL_DRIVE_RATIO: f64 = 9.1;
#[allow(clippy::approx_constant)]
pub const PI: f64 = 3.14159;
pub const GRAVITY: f64 = 9.81;
/// Rolling resistance coefficient
pub const ROLLING_COEFF: f64 = 0.006;
pub const DRAG_COEFF: f64 = 0.23;
/// Tyre static friction coefficient used for the launch gate
pub const STATIC_FRICTION_COEFF: f64 = 0.015;
pub const BRAKE_FRICTION_COEFF: f64 = 0.7;
/// Braking friction headroom on top of `BRAKE_FRICTION_COEFF`
pub const BRAKE_GAIN: f64 = 1.5;
/// kg/m³
pub const AIR_DENSITY: f64 = 1.225;
pub const DRIVE_EFFICIENCY: f64 = 0.95;
/// Frontal area (m²)
pub const FRONTAL_AREA: f64 = 2.2;
/// Scales tractive force so low-speed starts stay responsive at tick rate
pub const SIMULATION_MULTIPLIER: f64 = 100.0;

/// Floor applied to launch acceleration once static friction is overcome (m/s²)
pub const MIN_LAUNCH_ACCELERATION: f64 = 0.2;
/// Below this speed the vehicle is treated as standing (m/s)
pub const STANDSTILL_SPEED: f64 = 0.01;
/// Geometric decay applied to drag-induced deceleration under throttle
pub const COAST_DECAY: f64 = 0.9;
/// Decayed accelerations below this snap to zero (m/s²)
pub const DECAY_SNAP: f64 = 0.01;

/// Motor speed above which torque is linearly de-rated
pub const RPM_THRESHOLD: u32 = 6000;

// === Forces ===

/// Minimum tractive force needed to start moving from rest
pub fn static_friction(weight_kg: f64) -> f64 {
    STATIC_FRICTION_COEFF * weight_kg * GRAVITY
}

pub fn rolling_friction(weight_kg: f64) -> f64 {
    ROLLING_COEFF * weight_kg * GRAVITY
}

/// Aerodynamic drag, quadratic in speed
pub fn air_drag(speed_ms: f64) -> f64 {
    0.5 * DRAG_COEFF * AIR_DENSITY * FRONTAL_AREA * speed_ms * speed_ms
}

/// Brake force for a brake level in [0, 100].
///
/// Brakes only act on a moving vehicle. The level scales the force with a
/// nonlinear multiplier of `1 + level/100`.
pub fn brake_force(speed_ms: f64, weight_kg: f64, brake_level: u8) -> f64 {
    let max_brake = if speed_ms > 0.0 {
        BRAKE_FRICTION_COEFF * BRAKE_GAIN * weight_kg * GRAVITY
    } else {
        0.0
    };

    let level = brake_level as f64;
    let multiplier = 1.0 + level / 100.0;
    level * max_brake * multiplier / 100.0
}

/// Force at the wheel from motor torque
pub fn tractive_force(wheel_radius_cm: f64, torque_nm: f64) -> f64 {
    let wheel_radius_m = wheel_radius_cm / 100.0;
    torque_nm * GEAR_RATIO * DRIVE_EFFICIENCY * SIMULATION_MULTIPLIER / wheel_radius_m
}

/// Longitudinal acceleration (m/s²).
///
/// - Negative speed is invalid input and yields 0.
/// - At standstill the vehicle does not creep: below static friction the
///   result is exactly 0, above it at least [`MIN_LAUNCH_ACCELERATION`].
/// - In motion, a throttle-on/brake-off tick whose drag would produce a
///   deceleration instead decays `previous_acceleration` by [`COAST_DECAY`].
pub fn acceleration(
    speed_ms: f64,
    tractive_n: f64,
    weight_kg: f64,
    brake_level: u8,
    previous_acceleration: f64,
) -> f64 {
    if speed_ms < 0.0 {
        return 0.0;
    }

    if speed_ms < STANDSTILL_SPEED {
        if tractive_n < static_friction(weight_kg) {
            return 0.0;
        }

        let resisting = rolling_friction(weight_kg) + air_drag(0.0) + brake_force(0.0, weight_kg, brake_level);
        let launch = (tractive_n - resisting) / weight_kg;
        return launch.max(MIN_LAUNCH_ACCELERATION);
    }

    let resisting = rolling_friction(weight_kg)
        + air_drag(speed_ms)
        + brake_force(speed_ms, weight_kg, brake_level);
    let raw = (tractive_n - resisting) / weight_kg;

    if tractive_n > 0.0 && brake_level == 0 && raw < 0.0 {
        let decayed = previous_acceleration * COAST_DECAY;
        return if decayed < DECAY_SNAP { 0.0 } else { decayed };
    }

    raw
}

// === Motor ===

/// Motor torque (N·m) for a throttle level in [0, 100].
///
/// Full rated torque below [`RPM_THRESHOLD`], linearly de-rated to zero at
/// `max_rpm`. At standstill the throttle share of rated torque is always
/// available so the vehicle can launch.
pub fn torque(rpm: u32, max_rpm: u32, gas_level: u8, max_torque_nm: f64) -> f64 {
    if gas_level == 0 {
        return 0.0;
    }

    let throttle = gas_level as f64 / 100.0;
    if rpm == 0 {
        return max_torque_nm * throttle;
    }

    let available = if rpm < RPM_THRESHOLD {
        max_torque_nm
    } else if max_rpm <= RPM_THRESHOLD {
        0.0
    } else {
        let derate = (rpm - RPM_THRESHOLD) as f64 / (max_rpm - RPM_THRESHOLD) as f64;
        (max_torque_nm * (1.0 - derate)).max(0.0)
    };

    available * throttle
}

/// Motor speed from vehicle speed, clamped to [0, max_rpm] and truncated
pub fn rpm(speed_ms: f64, wheel_radius_cm: f64, max_rpm: u32) -> u32 {
    let wheel_radius_m = wheel_radius_cm / 100.0;
    let rpm = (speed_ms * FINAL_DRIVE_RATIO * 60.0) / (2.0 * PI * wheel_radius_m);

    if !rpm.is_finite() || rpm < 0.0 {
        0
    } else if rpm > max_rpm as f64 {
        max_rpm
    } else {
        rpm as u32
    }
}

/// rad/s
pub fn angular_speed(rpm: u32) -> f64 {
    (rpm as f64 * 2.0 * PI) / 60.0
}

/// Electrical power drawn by the motor (W)
pub fn engine_electrical_power(torque_nm: f64, angular_speed_rad_s: f64) -> f64 {
    (torque_nm * angular_speed_rad_s) / DRIVE_EFFICIENCY
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const LOADED_WEIGHT: f64 = 1847.0 + 200.0;

    #[test]
    fn test_tractive_force_scales_with_torque() {
        // 100 Nm * 9 * 0.95 * 100 / 0.35 m
        assert_relative_eq!(tractive_force(35.0, 100.0), 85_500.0 / 0.35, epsilon = 1e-6);
        assert_eq!(tractive_force(35.0, 0.0), 0.0);
    }

    #[test]
    fn test_rpm_truncates_and_clamps() {
        // 10 m/s on a 35 cm wheel: 5460 / (2 * 3.14159 * 0.35) = 2482.8
        assert_eq!(rpm(10.0, 35.0, 17_000), 2482);
        assert_eq!(rpm(-5.0, 35.0, 17_000), 0);
        assert_eq!(rpm(500.0, 35.0, 17_000), 17_000);
    }

    #[test]
    fn test_torque_curve() {
        // No throttle, no torque
        assert_eq!(torque(3000, 17_000, 0, 440.0), 0.0);
        // Starting torque is the throttle share of rated torque
        assert_relative_eq!(torque(0, 17_000, 50, 440.0), 220.0);
        // Flat region below the threshold
        assert_relative_eq!(torque(5999, 17_000, 100, 440.0), 440.0);
        // Halfway through the de-rate region
        assert_relative_eq!(torque(11_500, 17_000, 100, 440.0), 220.0, epsilon = 1e-9);
        // Zero at max rpm
        assert_eq!(torque(17_000, 17_000, 100, 440.0), 0.0);
    }

    #[test]
    fn test_power_from_torque_and_speed() {
        assert_relative_eq!(angular_speed(60), 2.0 * PI, epsilon = 1e-12);
        assert_relative_eq!(engine_electrical_power(100.0, 10.0), 1000.0 / 0.95, epsilon = 1e-9);
        assert_eq!(engine_electrical_power(440.0, angular_speed(0)), 0.0);
    }

    #[test]
    fn test_zero_launch_gate() {
        let gate = static_friction(LOADED_WEIGHT);
        assert!(gate > 300.0 && gate < 302.0);

        // Below static friction the vehicle must not creep
        assert_eq!(acceleration(0.0, gate - 1.0, LOADED_WEIGHT, 0, 0.0), 0.0);
        assert_eq!(acceleration(0.0, 0.0, LOADED_WEIGHT, 0, 0.0), 0.0);
    }

    #[test]
    fn test_launch_floor() {
        // 500 N barely beats rolling friction: (500 - 120.5) / 2047 < 0.2
        let a = acceleration(0.0, 500.0, LOADED_WEIGHT, 0, 0.0);
        assert_eq!(a, MIN_LAUNCH_ACCELERATION);

        // A strong launch is not clipped
        let strong = acceleration(0.0, 20_000.0, LOADED_WEIGHT, 0, 0.0);
        assert!(strong > 9.0);
    }

    #[test]
    fn test_negative_speed_is_rejected() {
        assert_eq!(acceleration(-1.0, 50_000.0, LOADED_WEIGHT, 0, 3.0), 0.0);
    }

    #[test]
    fn test_drag_deceleration_under_throttle_decays() {
        // Weak traction at speed: drag wins, so the previous acceleration decays
        let a = acceleration(20.0, 10.0, LOADED_WEIGHT, 0, 1.0);
        assert_relative_eq!(a, 0.9, epsilon = 1e-12);

        // Decay snaps to zero once it gets small
        let snapped = acceleration(20.0, 10.0, LOADED_WEIGHT, 0, 0.01);
        assert_eq!(snapped, 0.0);
    }

    #[test]
    fn test_coasting_and_braking_decelerate() {
        let coast = acceleration(20.0, 0.0, LOADED_WEIGHT, 0, 1.0);
        assert!(coast < 0.0);

        let brake = acceleration(20.0, 0.0, LOADED_WEIGHT, 50, 1.0);
        assert!(brake < coast);
    }

    #[test]
    fn test_brake_force_only_when_moving() {
        assert_eq!(brake_force(0.0, LOADED_WEIGHT, 100), 0.0);

        // Full brake doubles the linear share: 100 * max * 2 / 100
        let max = BRAKE_FRICTION_COEFF * BRAKE_GAIN * LOADED_WEIGHT * GRAVITY;
        assert_relative_eq!(brake_force(5.0, LOADED_WEIGHT, 100), 2.0 * max, epsilon = 1e-9);
    }
}
