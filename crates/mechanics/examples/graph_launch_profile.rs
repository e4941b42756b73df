use mechanics::physics;
use mechanics::{DrivetrainConfig, DrivetrainSimulator};
use plotters::prelude::*;
use simcore::{DriveMode, DrivetrainState, PedalState, VehiclePreset};

fn draw_series(
    filename: &str,
    title: &str,
    x_label: &str,
    y_label: &str,
    series: &[(String, Vec<(f64, f64)>)],
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(filename, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)?;

    let points = series.iter().flat_map(|(_, pts)| pts.iter());
    let (mut x_min, mut x_max, mut y_min, mut y_max) =
        (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in points {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("Arial", 28))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..(y_max * 1.05))?;

    chart.configure_mesh().x_desc(x_label).y_desc(y_label).draw()?;

    for (i, (name, pts)) in series.iter().enumerate() {
        let color = Palette99::pick(i).to_rgba();
        chart
            .draw_series(LineSeries::new(pts.iter().cloned(), &color))?
            .label(name.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE)
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Hold the accelerator from standstill, ramping the pedal one step per tick.
fn launch(preset: VehiclePreset, mode: DriveMode, dt: f64, ticks: usize) -> Vec<(f64, f64)> {
    let sim = DrivetrainSimulator::new(preset.parameters(), DrivetrainConfig::default());
    let mut state = DrivetrainState::default();
    let mut pedals = PedalState::default();

    let mut out = Vec::with_capacity(ticks);
    for i in 0..ticks {
        pedals.accelerator_intensity = (pedals.accelerator_intensity + 1).min(100);
        let step = sim.tick(&mut state, &pedals, true, mode, dt);
        out.push(((i + 1) as f64 * dt, step.speed_kmh));
    }
    out
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dt = 0.06;
    let ticks = 400;

    // 1) Speed vs time from standstill for every preset, both modes
    let mut launches = Vec::new();
    for preset in VehiclePreset::ALL {
        for mode in [DriveMode::Eco, DriveMode::Sport] {
            let name = format!("{} {}", preset.display_name(), mode.as_str());
            launches.push((name, launch(preset, mode, dt, ticks)));
        }
    }
    draw_series(
        "launch_profile.png",
        "Launch profile (pedal ramp 1%/tick)",
        "time [s]",
        "speed [km/h]",
        &launches,
    )?;

    // 2) Full-throttle torque curve per preset
    let mut curves = Vec::new();
    for preset in VehiclePreset::ALL {
        let params = preset.parameters();
        let pts = (0..=params.max_rpm)
            .step_by(100)
            .map(|rpm| {
                let t = physics::torque(rpm, params.max_rpm, 100, params.max_torque_nm);
                (rpm as f64, t)
            })
            .collect();
        curves.push((preset.display_name().to_string(), pts));
    }
    draw_series(
        "torque_curve.png",
        "Motor torque at full throttle",
        "motor speed [rpm]",
        "torque [N·m]",
        &curves,
    )?;

    println!("Wrote launch_profile.png and torque_curve.png");
    Ok(())
}
