use control::{CabinControls, DriverKey};
use ev_sim_app::VehicleSimulator;
use simcore::{Telemetry, TickInputs, TickScheduler, VehiclePreset};

use egui_plot::{Legend, Line, Plot, PlotPoints};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

const TICK_PERIOD_S: f64 = 0.06; // control-loop period (s)
const MAX_TICKS_PER_FRAME: usize = 50;

fn main() -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("EV Realtime Dashboard"),
        ..Default::default()
    };
    eframe::run_native(
        "EV Realtime Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(App::new(VehiclePreset::TeslaModel3LongRange)))),
    )
}

struct Trace {
    t: VecDeque<f64>,
    speed: VecDeque<f64>,
    power_kw: VecDeque<f64>,
    battery: VecDeque<f64>,
    temperature: VecDeque<f64>,
    range: VecDeque<f64>,
    capacity: usize,
}

impl Trace {
    fn new(seconds: f64) -> Self {
        let capacity = (seconds / TICK_PERIOD_S).ceil() as usize + 1;
        Self {
            t: VecDeque::with_capacity(capacity),
            speed: VecDeque::with_capacity(capacity),
            power_kw: VecDeque::with_capacity(capacity),
            battery: VecDeque::with_capacity(capacity),
            temperature: VecDeque::with_capacity(capacity),
            range: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn set_window_seconds(&mut self, seconds: f64) {
        self.capacity = (seconds / TICK_PERIOD_S).ceil() as usize + 1;
        self.trim_to_capacity();
    }

    fn push(&mut self, telemetry: &Telemetry) {
        self.t.push_back(telemetry.elapsed_s);
        self.speed.push_back(telemetry.speed_kmh as f64);
        self.power_kw.push_back(telemetry.power_consumption_w / 1000.0);
        self.battery.push_back(telemetry.battery_percentage);
        self.temperature.push_back(telemetry.battery_temperature_c);
        self.range.push_back(telemetry.remaining_range_km);
        self.trim_to_capacity();
    }

    fn trim_to_capacity(&mut self) {
        let mut trim = |v: &mut VecDeque<f64>| while v.len() > self.capacity { v.pop_front(); };
        trim(&mut self.t);
        trim(&mut self.speed);
        trim(&mut self.power_kw);
        trim(&mut self.battery);
        trim(&mut self.temperature);
        trim(&mut self.range);
    }

    fn line<'a>(points: &'a VecDeque<f64>, t: &'a VecDeque<f64>) -> PlotPoints<'a> {
        PlotPoints::from_iter(
            t.iter()
                .copied()
                .zip(points.iter().copied())
                .map(|(x, y)| [x, y])
        )
    }
}

struct App {
    // Simulation
    preset: VehiclePreset,
    sim: VehicleSimulator,
    cabin: CabinControls,
    inputs: TickInputs,
    scheduler: TickScheduler,
    telemetry: Telemetry,
    paused: bool,
    last_frame: Instant,

    // Plotting
    trace: Trace,
    window_s: f64,
}

impl App {
    fn new(preset: VehiclePreset) -> Self {
        let sim = VehicleSimulator::with_defaults(preset.parameters());
        let cabin = CabinControls::new(sim.params());
        let telemetry = sim.telemetry();

        let mut app = Self {
            preset,
            sim,
            cabin,
            inputs: TickInputs::default(),
            scheduler: TickScheduler::new(TICK_PERIOD_S),
            telemetry,
            paused: false,
            last_frame: Instant::now(),
            window_s: 30.0,
            trace: Trace::new(30.0),
        };
        app.trace.push(&app.telemetry);
        app
    }

    fn reset(&mut self) {
        self.sim = VehicleSimulator::with_defaults(self.preset.parameters());
        self.cabin = CabinControls::new(self.sim.params());
        self.inputs = TickInputs::default();
        self.scheduler.reset();
        self.telemetry = self.sim.telemetry();
        self.trace = Trace::new(self.window_s);
        self.trace.push(&self.telemetry);
    }

    /// Held pedal keys plus edge-triggered cabin keys for this frame
    fn poll_keys(&self, ctx: &egui::Context) -> Vec<DriverKey> {
        ctx.input(|i| {
            let mut keys = Vec::new();
            if i.key_down(egui::Key::W) {
                keys.push(DriverKey::Accelerator);
            }
            if i.key_down(egui::Key::S) {
                keys.push(DriverKey::Brake);
            }
            let toggles = [
                (egui::Key::D, DriverKey::ToggleDriveMode),
                (egui::Key::X, DriverKey::ToggleAc),
                (egui::Key::C, DriverKey::Warmer),
                (egui::Key::Z, DriverKey::Cooler),
                (egui::Key::A, DriverKey::CycleWind),
                (egui::Key::Q, DriverKey::LeftSignal),
                (egui::Key::E, DriverKey::RightSignal),
            ];
            for (key, action) in toggles {
                if i.key_pressed(key) {
                    keys.push(action);
                }
            }
            keys
        })
    }

    fn update_sim(&mut self, wall_dt: f64) {
        let due = self.scheduler.advance(wall_dt).min(MAX_TICKS_PER_FRAME);
        for _ in 0..due {
            self.telemetry = self.sim.tick(self.inputs, TICK_PERIOD_S);
            self.trace.push(&self.telemetry);
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let keys = self.poll_keys(ctx);
        self.cabin.apply_frame(&mut self.inputs, keys);

        // SIMULATION ADVANCE
        let now = Instant::now();
        let wall_dt = now.duration_since(self.last_frame).as_secs_f64();
        self.last_frame = now;
        if !self.paused {
            self.update_sim(wall_dt);
        }

        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.horizontal_wrapped(|ui| {
                if ui.button(if self.paused { "▶ Resume" } else { "⏸ Pause" }).clicked() {
                    self.paused = !self.paused;
                }
                if ui.button("⟲ Reset").clicked() {
                    self.reset();
                }

                ui.separator();

                egui::ComboBox::from_label("Vehicle")
                    .selected_text(self.preset.display_name())
                    .show_ui(ui, |ui| {
                        for preset in VehiclePreset::ALL {
                            ui.selectable_value(&mut self.preset, preset, preset.display_name());
                        }
                    });
                if self.preset.display_name() != self.sim.params().name {
                    self.reset();
                }

                ui.separator();

                ui.label("Window");
                if ui.add(egui::Slider::new(&mut self.window_s, 5.0..=300.0).suffix(" s")).changed() {
                    self.trace.set_window_seconds(self.window_s);
                }
            });
            ui.label(
                DriverKey::ALL
                    .iter()
                    .map(|k| format!("{}: {}", k.as_char().to_ascii_uppercase(), k.description()))
                    .collect::<Vec<_>>()
                    .join("   "),
            );
        });

        egui::SidePanel::left("dashboard").min_width(320.0).show(ctx, |ui| {
            ui.heading("Dashboard");
            ui.monospace(ev_sim_app::render_dashboard(&self.telemetry, self.sim.environment_temp_c()));
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.columns(2, |cols| {
                cols[0].heading("Speed & Power");
                Plot::new("speed_plot")
                    .legend(Legend::default())
                    .allow_scroll(false)
                    .x_axis_label("Time (s)")
                    .show(&mut cols[0], |plot_ui| {
                        plot_ui.line(Line::new("Speed (km/h)", Trace::line(&self.trace.speed, &self.trace.t)));
                        plot_ui.line(Line::new("Motor power (kW)", Trace::line(&self.trace.power_kw, &self.trace.t)));
                    });

                cols[1].heading("Battery");
                Plot::new("battery_plot")
                    .legend(Legend::default())
                    .allow_scroll(false)
                    .x_axis_label("Time (s)")
                    .show(&mut cols[1], |plot_ui| {
                        plot_ui.line(Line::new("Battery (%)", Trace::line(&self.trace.battery, &self.trace.t)));
                        plot_ui.line(Line::new("Pack temp (°C)", Trace::line(&self.trace.temperature, &self.trace.t)));
                        plot_ui.line(Line::new("Range (km)", Trace::line(&self.trace.range, &self.trace.t)));
                    });
            });
        });

        // Keep ticking even without input events
        ctx.request_repaint_after(Duration::from_millis(16));
    }
}
