use std::fmt::Write as _;
use std::io::{self, Write};

use electrical::battery::LOW_BATTERY_PERCENT;
use simcore::{Telemetry, TelemetrySink, TurnSignal};

const RULE: &str = "========================================";

/// Render one dashboard frame.
pub fn render_dashboard(t: &Telemetry, environment_temp_c: f64) -> String {
    let mut s = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(s, "{RULE}");
    if t.safety_action_triggered {
        let _ = writeln!(s, "!! SAFETY: accelerator and brake pressed together, braking !!");
    }
    let _ = writeln!(
        s,
        "Speed: {:>3} km/h        Max power: {:.1} kW",
        t.speed_kmh, t.max_power_output_kw
    );
    let _ = writeln!(
        s,
        "Battery: {:.1}%  Temp: {:.1}°C  Ambient: {:.1}°C",
        t.battery_percentage, t.battery_temperature_c, environment_temp_c
    );
    if t.battery_percentage < LOW_BATTERY_PERCENT {
        let _ = writeln!(s, "!! LOW BATTERY: charge soon !!");
    }
    if t.ac_on {
        let _ = writeln!(s, "Climate: AC {}°C  Wind {}", t.ac_target_c, t.wind_level);
    } else {
        let _ = writeln!(s, "Climate: AC off  Wind {}", t.wind_level);
    }
    let _ = writeln!(s, "Drive mode: {}", t.drive_mode.as_str());
    let _ = writeln!(
        s,
        "Range: {:.1} km  Traveled: {:.2} km",
        t.remaining_range_km, t.total_distance_km
    );
    let signal = match t.turn_signal {
        TurnSignal::Off => "off",
        TurnSignal::Left => "<< LEFT",
        TurnSignal::Right => "RIGHT >>",
    };
    let _ = writeln!(s, "Turn signal: {signal}");
    let _ = writeln!(
        s,
        "Brake: {:>3}%  Gas: {:>3}%",
        t.brake_intensity, t.accelerator_intensity
    );
    s
}

/// Writes a dashboard frame per published telemetry
pub struct ConsoleDisplay<W: Write> {
    out: W,
    environment_temp_c: f64,
}

impl<W: Write> ConsoleDisplay<W> {
    pub fn new(out: W, environment_temp_c: f64) -> Self {
        ConsoleDisplay {
            out,
            environment_temp_c,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TelemetrySink for ConsoleDisplay<W> {
    type Error = io::Error;

    fn publish(&mut self, telemetry: &Telemetry) -> io::Result<()> {
        let frame = render_dashboard(telemetry, self.environment_temp_c);
        self.out.write_all(frame.as_bytes())?;
        self.out.flush()
    }
}
