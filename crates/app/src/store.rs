//! File-backed key-value store
//!
//! A two-column CSV (`key,value`) shared with other processes: an input
//! handler writes pedal and cabin keys, the simulator writes telemetry back.
//! The whole file is rewritten on every update through a temporary file, so a
//! reader never observes a half-written store written by this process.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use simcore::{
    DriveMode, InputSource, Telemetry, TelemetrySink, TickInputs, TurnSignal, VehicleParameters,
};
use thiserror::Error;

pub const HEADER: [&str; 2] = ["key", "value"];

/// Store keys
pub mod keys {
    pub const VEHICLE_SPEED: &str = "VEHICLE_SPEED";
    pub const DRIVE_MODE: &str = "DRIVE_MODE";
    pub const WIND_LEVEL: &str = "WIND_LEVEL";
    pub const BATTERY_LEVEL: &str = "BATTERY_LEVEL";
    pub const AC_STATUS: &str = "AC_STATUS";
    pub const AC_CONTROL: &str = "AC_CONTROL";
    pub const BATTERY_TEMP: &str = "BATTERY_TEMP";
    pub const BRAKE: &str = "BRAKE";
    pub const ACCELERATOR: &str = "ACCELERATOR";
    pub const ODOMETER: &str = "ODOMETER";
    pub const ROUTE_PLANNER: &str = "ROUTE_PLANNER";
    pub const TURN_SIGNAL: &str = "TURN_SIGNAL";
    pub const BRAKE_INTENSITY: &str = "BRAKE_INTENSITY";
    pub const ACCELERATOR_INTENSITY: &str = "ACCELERATOR_INTENSITY";
    pub const SAFETY_ACTION: &str = "SAFETY_ACTION";
    pub const POWER_OUTPUT: &str = "POWER_OUTPUT";
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error on {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed store {}: {}", .path.display(), .source)]
    Malformed {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Values as last written to the store, used for change thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
struct Published {
    speed_kmh: u32,
    odometer_km: f64,
    battery_percentage: f64,
    range_km: f64,
    battery_temperature_c: f64,
    brake_intensity: u8,
    accelerator_intensity: u8,
    safety_action: bool,
    power_output_kw: f64,
}

impl Published {
    fn from_telemetry(t: &Telemetry) -> Self {
        Published {
            speed_kmh: t.speed_kmh,
            odometer_km: t.total_distance_km,
            battery_percentage: t.battery_percentage,
            range_km: t.remaining_range_km,
            battery_temperature_c: t.battery_temperature_c,
            brake_intensity: t.brake_intensity,
            accelerator_intensity: t.accelerator_intensity,
            safety_action: t.safety_action_triggered,
            power_output_kw: t.max_power_output_kw,
        }
    }
}

fn flag(value: bool) -> String {
    let s = if value { "1" } else { "0" };
    s.to_string()
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "true" | "TRUE" => Some(true),
        "0" | "false" | "FALSE" => Some(false),
        _ => None,
    }
}

pub struct KeyValueStore {
    path: PathBuf,
    inputs: TickInputs,
    published: Option<Published>,
}

impl KeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        KeyValueStore {
            path: path.into(),
            inputs: TickInputs::default(),
            published: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn csv_error(&self, source: csv::Error) -> StoreError {
        StoreError::Malformed {
            path: self.path.clone(),
            source,
        }
    }

    /// Every key in the store. A missing file reads as an empty store.
    pub fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("Store {} not found, reading as empty", self.path.display());
                return Ok(BTreeMap::new());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let mut map = BTreeMap::new();
        for record in reader.deserialize::<(String, String)>() {
            let (key, value) = record.map_err(|e| self.csv_error(e))?;
            map.insert(key, value);
        }
        Ok(map)
    }

    /// Value for `key`, or `None` when the key is absent
    pub fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_all()?.remove(key))
    }

    fn write_all(&self, map: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let tmp = self.path.with_extension("csv.tmp");
        let mut writer = csv::Writer::from_path(&tmp).map_err(|e| self.csv_error(e))?;
        writer.write_record(HEADER).map_err(|e| self.csv_error(e))?;
        for (key, value) in map {
            writer.write_record([key, value]).map_err(|e| self.csv_error(e))?;
        }
        writer.flush().map_err(|e| self.io_error(e))?;
        drop(writer);

        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))
    }

    /// Merge `updates` into the store and rewrite it
    pub fn update<I, K, V>(&self, updates: I) -> Result<(), StoreError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = self.read_all()?;
        for (key, value) in updates {
            map.insert(key.into(), value.into());
        }
        self.write_all(&map)
    }

    /// Overwrite the store with a parked vehicle and default cabin settings
    pub fn initialize(
        &mut self,
        params: &VehicleParameters,
        environment_temp_c: f64,
    ) -> Result<(), StoreError> {
        let inputs = TickInputs::default();
        let defaults = [
            (keys::VEHICLE_SPEED, "0".to_string()),
            (keys::DRIVE_MODE, inputs.drive_mode.as_str().to_string()),
            (keys::WIND_LEVEL, inputs.wind_level.to_string()),
            (keys::BATTERY_LEVEL, "100".to_string()),
            (keys::AC_STATUS, flag(inputs.ac_on)),
            (keys::AC_CONTROL, inputs.ac_target_c.to_string()),
            (keys::BATTERY_TEMP, format!("{:.1}", environment_temp_c)),
            (keys::BRAKE, "0".to_string()),
            (keys::ACCELERATOR, "0".to_string()),
            (keys::ODOMETER, "0.0".to_string()),
            (keys::ROUTE_PLANNER, format!("{:.1}", params.max_range_km)),
            (keys::TURN_SIGNAL, inputs.turn_signal.code().to_string()),
            (keys::BRAKE_INTENSITY, "0".to_string()),
            (keys::ACCELERATOR_INTENSITY, "0".to_string()),
            (keys::SAFETY_ACTION, "0".to_string()),
            (
                keys::POWER_OUTPUT,
                format!("{:.1}", inputs.drive_mode.power_output_kw(params)),
            ),
        ];

        let map: BTreeMap<String, String> = defaults
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        self.write_all(&map)?;
        self.inputs = inputs;
        self.published = None;
        debug!("Initialized store {}", self.path.display());
        Ok(())
    }

    /// Snapshot the inputs, or reuse the previous snapshot when the store
    /// cannot be read (another process may be rewriting it in place).
    pub fn snapshot_or_previous(&mut self) -> TickInputs {
        match self.snapshot() {
            Ok(inputs) => inputs.unwrap_or(self.inputs),
            Err(e) => {
                warn!("{e}, reusing previous inputs");
                self.inputs
            }
        }
    }

    /// Merge the input keys of `map` over the previous snapshot.
    /// Absent or unparseable values keep their previous value.
    fn parse_inputs(&self, map: &BTreeMap<String, String>) -> TickInputs {
        let mut inputs = self.inputs;
        let get = |key: &str| map.get(key).map(String::as_str);

        if let Some(v) = get(keys::ACCELERATOR).and_then(parse_flag) {
            inputs.accelerator_pressed = v;
        }
        if let Some(v) = get(keys::BRAKE).and_then(parse_flag) {
            inputs.brake_pressed = v;
        }
        if let Some(mode) = get(keys::DRIVE_MODE).and_then(DriveMode::parse) {
            inputs.drive_mode = mode;
        }
        if let Some(v) = get(keys::AC_STATUS).and_then(parse_flag) {
            inputs.ac_on = v;
        }
        if let Some(v) = get(keys::AC_CONTROL).and_then(|s| s.trim().parse::<i32>().ok()) {
            inputs.ac_target_c = v;
        }
        if let Some(v) = get(keys::WIND_LEVEL).and_then(|s| s.trim().parse::<u8>().ok()) {
            inputs.wind_level = v;
        }
        if let Some(signal) = get(keys::TURN_SIGNAL)
            .and_then(|s| s.trim().parse::<u8>().ok())
            .and_then(TurnSignal::from_code)
        {
            inputs.turn_signal = signal;
        }
        inputs
    }

    /// Store updates for the telemetry values that moved past their thresholds
    fn telemetry_updates(&self, t: &Telemetry) -> Vec<(&'static str, String)> {
        let now = Published::from_telemetry(t);
        let last = self.published;
        let moved = |f: fn(&Published) -> f64, threshold: f64| match last {
            Some(prev) => (f(&now) - f(&prev)).abs() >= threshold,
            None => true,
        };

        let mut updates = Vec::new();
        if last.is_none_or(|prev| now.speed_kmh.abs_diff(prev.speed_kmh) >= 1) {
            updates.push((keys::VEHICLE_SPEED, now.speed_kmh.to_string()));
        }
        if moved(|p| p.odometer_km, 0.1) {
            updates.push((keys::ODOMETER, format!("{:.1}", now.odometer_km)));
        }
        if moved(|p| p.battery_percentage, 1.0) {
            updates.push((keys::BATTERY_LEVEL, (now.battery_percentage as u32).to_string()));
        }
        if moved(|p| p.range_km, 0.1) {
            updates.push((keys::ROUTE_PLANNER, format!("{:.1}", now.range_km)));
        }
        if moved(|p| p.battery_temperature_c, 0.1) {
            updates.push((keys::BATTERY_TEMP, format!("{:.1}", now.battery_temperature_c)));
        }
        if last.is_none_or(|prev| prev.brake_intensity != now.brake_intensity) {
            updates.push((keys::BRAKE_INTENSITY, now.brake_intensity.to_string()));
        }
        if last.is_none_or(|prev| prev.accelerator_intensity != now.accelerator_intensity) {
            updates.push((keys::ACCELERATOR_INTENSITY, now.accelerator_intensity.to_string()));
        }
        if last.is_none_or(|prev| prev.safety_action != now.safety_action) {
            updates.push((keys::SAFETY_ACTION, flag(now.safety_action)));
        }
        if moved(|p| p.power_output_kw, 0.1) {
            updates.push((keys::POWER_OUTPUT, format!("{:.1}", now.power_output_kw)));
        }
        updates
    }
}

impl InputSource for KeyValueStore {
    type Error = StoreError;

    fn snapshot(&mut self) -> Result<Option<TickInputs>, StoreError> {
        let map = self.read_all()?;
        self.inputs = self.parse_inputs(&map);
        Ok(Some(self.inputs))
    }
}

impl TelemetrySink for KeyValueStore {
    type Error = StoreError;

    /// Write the telemetry keys that changed enough since the last publish.
    fn publish(&mut self, telemetry: &Telemetry) -> Result<(), StoreError> {
        let updates = self.telemetry_updates(telemetry);
        if updates.is_empty() {
            return Ok(());
        }

        // Thresholds compare against the values actually written
        let now = Published::from_telemetry(telemetry);
        let mut published = self.published.unwrap_or(now);
        for (key, _) in &updates {
            match *key {
                keys::VEHICLE_SPEED => published.speed_kmh = now.speed_kmh,
                keys::ODOMETER => published.odometer_km = now.odometer_km,
                keys::BATTERY_LEVEL => published.battery_percentage = now.battery_percentage,
                keys::ROUTE_PLANNER => published.range_km = now.range_km,
                keys::BATTERY_TEMP => published.battery_temperature_c = now.battery_temperature_c,
                keys::BRAKE_INTENSITY => published.brake_intensity = now.brake_intensity,
                keys::ACCELERATOR_INTENSITY => {
                    published.accelerator_intensity = now.accelerator_intensity
                }
                keys::SAFETY_ACTION => published.safety_action = now.safety_action,
                keys::POWER_OUTPUT => published.power_output_kw = now.power_output_kw,
                _ => {}
            }
        }

        self.update(updates)?;
        self.published = Some(published);
        Ok(())
    }
}
