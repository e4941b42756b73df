//! Keyboard mapping and cabin controls
//!
//! Pedal keys are "held" flags valid for a single poll frame. Every other key
//! is an edge-triggered toggle applied to the persistent cabin settings.

use log::debug;
use simcore::{TickInputs, TurnSignal, VehicleParameters};

/// Target temperature restored when the AC is switched on (°C)
pub const DEFAULT_AC_TARGET_C: i32 = 22;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverKey {
    Accelerator,
    Brake,
    ToggleDriveMode,
    ToggleAc,
    Warmer,
    Cooler,
    CycleWind,
    LeftSignal,
    RightSignal,
}

impl DriverKey {
    pub const ALL: [DriverKey; 9] = [
        DriverKey::Accelerator,
        DriverKey::Brake,
        DriverKey::ToggleDriveMode,
        DriverKey::ToggleAc,
        DriverKey::Warmer,
        DriverKey::Cooler,
        DriverKey::CycleWind,
        DriverKey::LeftSignal,
        DriverKey::RightSignal,
    ];

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'w' => Some(DriverKey::Accelerator),
            's' => Some(DriverKey::Brake),
            'd' => Some(DriverKey::ToggleDriveMode),
            'x' => Some(DriverKey::ToggleAc),
            'c' => Some(DriverKey::Warmer),
            'z' => Some(DriverKey::Cooler),
            'a' => Some(DriverKey::CycleWind),
            'q' => Some(DriverKey::LeftSignal),
            'e' => Some(DriverKey::RightSignal),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            DriverKey::Accelerator => 'w',
            DriverKey::Brake => 's',
            DriverKey::ToggleDriveMode => 'd',
            DriverKey::ToggleAc => 'x',
            DriverKey::Warmer => 'c',
            DriverKey::Cooler => 'z',
            DriverKey::CycleWind => 'a',
            DriverKey::LeftSignal => 'q',
            DriverKey::RightSignal => 'e',
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DriverKey::Accelerator => "accelerate",
            DriverKey::Brake => "brake",
            DriverKey::ToggleDriveMode => "toggle ECO/SPORT",
            DriverKey::ToggleAc => "toggle AC",
            DriverKey::Warmer => "AC warmer",
            DriverKey::Cooler => "AC cooler",
            DriverKey::CycleWind => "cycle wind level",
            DriverKey::LeftSignal => "left turn signal",
            DriverKey::RightSignal => "right turn signal",
        }
    }

    pub fn is_pedal(&self) -> bool {
        matches!(self, DriverKey::Accelerator | DriverKey::Brake)
    }
}

/// Bounds for the cabin settings, taken from the vehicle
#[derive(Debug, Clone, Copy)]
pub struct CabinControls {
    pub ac_temp_min_c: i32,
    pub ac_temp_max_c: i32,
    pub max_wind_level: u8,
}

impl CabinControls {
    pub fn new(params: &VehicleParameters) -> Self {
        CabinControls {
            ac_temp_min_c: params.ac_temp_min_c,
            ac_temp_max_c: params.ac_temp_max_c,
            max_wind_level: params.max_wind_level,
        }
    }

    /// Apply one key to the inputs. Returns whether anything changed.
    pub fn apply(&self, inputs: &mut TickInputs, key: DriverKey) -> bool {
        let before = *inputs;

        match key {
            DriverKey::Accelerator => inputs.accelerator_pressed = true,
            DriverKey::Brake => inputs.brake_pressed = true,
            DriverKey::ToggleDriveMode => inputs.drive_mode = inputs.drive_mode.toggled(),
            DriverKey::ToggleAc => {
                inputs.ac_on = !inputs.ac_on;
                inputs.ac_target_c = if inputs.ac_on { DEFAULT_AC_TARGET_C } else { 0 };
            }
            DriverKey::Warmer => {
                if inputs.ac_on && inputs.ac_target_c < self.ac_temp_max_c {
                    inputs.ac_target_c += 1;
                }
            }
            DriverKey::Cooler => {
                if inputs.ac_on && inputs.ac_target_c > self.ac_temp_min_c {
                    inputs.ac_target_c -= 1;
                }
            }
            DriverKey::CycleWind => {
                if inputs.ac_on {
                    inputs.wind_level = if inputs.wind_level >= self.max_wind_level {
                        0
                    } else {
                        inputs.wind_level + 1
                    };
                }
            }
            DriverKey::LeftSignal => {
                inputs.turn_signal = match inputs.turn_signal {
                    TurnSignal::Left => TurnSignal::Off,
                    _ => TurnSignal::Left,
                };
            }
            DriverKey::RightSignal => {
                inputs.turn_signal = match inputs.turn_signal {
                    TurnSignal::Right => TurnSignal::Off,
                    _ => TurnSignal::Right,
                };
            }
        }

        let changed = *inputs != before;
        if changed && !key.is_pedal() {
            debug!("{:?} -> {:?}", key, inputs);
        }
        changed
    }

    /// Start a new poll frame: pedal flags drop, then the held keys are applied.
    pub fn apply_frame<I>(&self, inputs: &mut TickInputs, keys: I)
    where
        I: IntoIterator<Item = DriverKey>,
    {
        inputs.accelerator_pressed = false;
        inputs.brake_pressed = false;
        for key in keys {
            self.apply(inputs, key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simcore::{DriveMode, VehiclePreset};

    fn controls() -> CabinControls {
        CabinControls::new(&VehiclePreset::TeslaModel3LongRange.parameters())
    }

    #[test]
    fn test_key_mapping() {
        for key in DriverKey::ALL {
            assert_eq!(DriverKey::from_char(key.as_char()), Some(key));
        }
        assert_eq!(DriverKey::from_char('W'), Some(DriverKey::Accelerator));
        assert_eq!(DriverKey::from_char('p'), None);
    }

    #[test]
    fn test_ac_toggle_sets_target() {
        let cabin = controls();
        let mut inputs = TickInputs::default();

        cabin.apply(&mut inputs, DriverKey::ToggleAc);
        assert!(!inputs.ac_on);
        assert_eq!(inputs.ac_target_c, 0);

        cabin.apply(&mut inputs, DriverKey::ToggleAc);
        assert!(inputs.ac_on);
        assert_eq!(inputs.ac_target_c, DEFAULT_AC_TARGET_C);
    }

    #[test]
    fn test_ac_target_stays_in_range() {
        let cabin = controls();
        let mut inputs = TickInputs::default();

        for _ in 0..20 {
            cabin.apply(&mut inputs, DriverKey::Warmer);
        }
        assert_eq!(inputs.ac_target_c, 28);
        assert!(!cabin.apply(&mut inputs, DriverKey::Warmer));

        for _ in 0..20 {
            cabin.apply(&mut inputs, DriverKey::Cooler);
        }
        assert_eq!(inputs.ac_target_c, 15);
    }

    #[test]
    fn test_climate_keys_ignored_with_ac_off() {
        let cabin = controls();
        let mut inputs = TickInputs {
            ac_on: false,
            ac_target_c: 0,
            ..Default::default()
        };

        assert!(!cabin.apply(&mut inputs, DriverKey::Warmer));
        assert!(!cabin.apply(&mut inputs, DriverKey::Cooler));
        assert!(!cabin.apply(&mut inputs, DriverKey::CycleWind));
        assert_eq!(inputs.wind_level, 2);
    }

    #[test]
    fn test_wind_cycles_through_zero() {
        let cabin = controls();
        let mut inputs = TickInputs::default();

        let mut seen = Vec::new();
        for _ in 0..6 {
            cabin.apply(&mut inputs, DriverKey::CycleWind);
            seen.push(inputs.wind_level);
        }
        assert_eq!(seen, vec![3, 4, 5, 0, 1, 2]);
    }

    #[test]
    fn test_turn_signals_toggle() {
        let cabin = controls();
        let mut inputs = TickInputs::default();

        cabin.apply(&mut inputs, DriverKey::LeftSignal);
        assert_eq!(inputs.turn_signal, TurnSignal::Left);
        cabin.apply(&mut inputs, DriverKey::RightSignal);
        assert_eq!(inputs.turn_signal, TurnSignal::Right);
        cabin.apply(&mut inputs, DriverKey::RightSignal);
        assert_eq!(inputs.turn_signal, TurnSignal::Off);
    }

    #[test]
    fn test_frame_resets_pedals() {
        let cabin = controls();
        let mut inputs = TickInputs::default();

        cabin.apply_frame(&mut inputs, [DriverKey::Accelerator, DriverKey::ToggleDriveMode]);
        assert!(inputs.accelerator_pressed);
        assert_eq!(inputs.drive_mode, DriveMode::Sport);

        cabin.apply_frame(&mut inputs, []);
        assert!(!inputs.accelerator_pressed);
        assert!(!inputs.brake_pressed);
        assert_eq!(inputs.drive_mode, DriveMode::Sport);
    }
}
