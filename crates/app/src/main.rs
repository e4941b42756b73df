use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use ev_sim_app::{AppConfig, ConsoleDisplay, KeyValueStore, Scenario, render_dashboard};
use log::{LevelFilter, info, warn};
use simcore::{InputSource, TelemetrySink, VehiclePreset};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

#[derive(Parser)]
#[command(name = "ev-sim", author, version, about = "Electric vehicle dynamics and energy simulator")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Vehicle preset key, overrides the configuration
    #[arg(long, global = true)]
    preset: Option<String>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the built-in vehicle presets
    Presets,
    /// Show the parameters of the selected vehicle
    Info,
    /// Run a scripted scenario with a fixed timestep
    Scenario {
        file: PathBuf,
        /// Print a dashboard frame for every tick
        #[arg(long)]
        trace: bool,
        /// Print the final telemetry as JSON
        #[arg(long)]
        json: bool,
    },
    /// Poll a key-value store in real time and publish telemetry back to it
    Live {
        /// Store file, overrides the configuration
        #[arg(long)]
        store: Option<PathBuf>,
        /// Stop after this many ticks
        #[arg(long)]
        ticks: Option<u64>,
        /// Reset the store to defaults before starting
        #[arg(long)]
        init: bool,
        /// Do not render the console dashboard
        #[arg(long)]
        quiet: bool,
    },
}

fn load_config(cli: &Cli) -> Result<AppConfig, Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };
    if let Some(preset) = &cli.preset {
        config.preset = preset.clone();
        config.vehicle_file = None;
    }
    Ok(config)
}

fn run_scenario(config: &AppConfig, file: PathBuf, trace: bool, json: bool) -> Result<(), Box<dyn Error>> {
    let scenario = Scenario::from_file(&file)?;
    let mut sim = config.build_simulator()?;
    let mut inputs = scenario.inputs();
    info!(
        "Running {} ({} ticks, {:.1} s)",
        file.display(),
        scenario.total_ticks(),
        scenario.duration_s()
    );

    let mut display = ConsoleDisplay::new(io::stdout(), config.environment_temp_c);
    while let Some(tick_inputs) = inputs.snapshot()? {
        let telemetry = sim.tick(tick_inputs, scenario.dt_s);
        if trace {
            display.publish(&telemetry)?;
        }
    }

    let telemetry = sim.telemetry();
    if json {
        println!("{}", serde_json::to_string_pretty(&telemetry)?);
    } else {
        print!("{}", render_dashboard(&telemetry, config.environment_temp_c));
    }
    Ok(())
}

fn run_live(
    config: &AppConfig,
    store_path: Option<PathBuf>,
    max_ticks: Option<u64>,
    init: bool,
    quiet: bool,
) -> Result<(), Box<dyn Error>> {
    let mut sim = config.build_simulator()?;
    let path = store_path.unwrap_or_else(|| config.store_path.clone());
    let mut store = KeyValueStore::new(&path);
    if init || !path.exists() {
        store.initialize(sim.params(), config.environment_temp_c)?;
    }

    let period = Duration::from_millis(config.tick_period_ms);
    let mut display = ConsoleDisplay::new(io::stdout(), config.environment_temp_c);
    info!("Live loop on {} every {:?}", path.display(), period);

    let mut last_tick = Instant::now();
    let mut ticks = 0u64;
    while max_ticks.is_none_or(|max| ticks < max) {
        let started = Instant::now();
        let elapsed = started.duration_since(last_tick).as_secs_f64();
        last_tick = started;

        let inputs = store.snapshot_or_previous();
        let telemetry = sim.tick(inputs, elapsed);
        if let Err(e) = store.publish(&telemetry) {
            warn!("{e}, retrying telemetry on the next tick");
        }
        if !quiet {
            display.publish(&telemetry)?;
        }
        ticks += 1;

        thread::sleep(period.saturating_sub(started.elapsed()));
    }

    info!("Stopped after {} ticks ({:.2} km)", ticks, sim.telemetry().total_distance_km);
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let level = if cli.verbose { LevelFilter::Debug } else { config.level_filter() };
    TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto)?;

    match cli.command {
        Command::Presets => {
            for preset in VehiclePreset::ALL {
                println!("{:<28} {}", preset.key(), preset.parameters().summary());
            }
        }
        Command::Info => {
            let params = config.vehicle_parameters()?;
            println!("{}", serde_json::to_string_pretty(&params)?);
        }
        Command::Scenario { file, trace, json } => run_scenario(&config, file, trace, json)?,
        Command::Live {
            store,
            ticks,
            init,
            quiet,
        } => run_live(&config, store, ticks, init, quiet)?,
    }
    Ok(())
}
