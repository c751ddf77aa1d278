//! Keyboard manifest (`keyboard.json`).
//!
//! The manifest is assumed to be schema-valid; this module only gives it a
//! typed shape. Fields unknown to the compiler are ignored.

use kbconf_drivers::AdcInput;
use serde::{Deserialize, Serialize};

use crate::error::CompileError;
use crate::keymap::Keymap;
use crate::value::Literal;

/// Default wear-leveling virtual EEPROM size in bytes.
pub const DEFAULT_WL_VIRTUAL_SIZE: u64 = 8192;
/// Default wear-leveling write log size in bytes.
pub const DEFAULT_WL_WRITE_LOG_SIZE: u64 = 65536;

/// A keyboard product manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Product name (USB product string).
    pub name: String,
    /// Manufacturer name (USB manufacturer string).
    pub manufacturer: String,
    pub hardware: HardwareConfig,
    pub usb: UsbConfig,
    pub analog: AnalogConfig,
    /// Default calibration, emitted as a struct initializer in manifest
    /// order.
    pub calibration: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub wear_leveling: WearLevelingConfig,
    pub keyboard: KeyboardGeometry,
    /// Default keymap shared by every profile.
    #[serde(default)]
    pub keymap: Option<Keymap>,
    /// Per-profile default keymaps; takes precedence over `keymap`.
    #[serde(default)]
    pub keymaps: Option<Vec<Keymap>>,
    #[serde(default)]
    pub actuation: Option<ActuationConfig>,
}

/// `hardware` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HardwareConfig {
    /// Driver identifier, resolved through the driver registry.
    pub driver: String,
    /// External oscillator frequency in Hz.
    pub hse_value: u64,
}

/// USB peripheral used by the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsbPort {
    /// Full-speed port.
    Fs,
    /// High-speed port.
    Hs,
}

/// `usb` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsbConfig {
    pub port: UsbPort,
    /// Vendor ID, as a number or a literal such as `"0xAB50"`.
    pub vid: Literal,
    /// Product ID, as a number or a literal such as `"0xAB60"`.
    pub pid: Literal,
}

/// `analog` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalogConfig {
    /// ADC resolution override in bits; the driver maximum otherwise.
    #[serde(default)]
    pub adc_resolution: Option<u8>,
    /// Invert raw ADC readings.
    #[serde(default)]
    pub invert_adc: bool,
    /// Delay between ADC samples.
    #[serde(default)]
    pub delay: Option<u64>,
    /// Keys wired directly to ADC inputs.
    #[serde(default)]
    pub raw: Option<RawInputs>,
    /// Keys wired through analog multiplexers.
    #[serde(default)]
    pub mux: Option<MuxInputs>,
}

/// `analog.raw` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawInputs {
    /// ADC inputs, as pin names or channel numbers.
    pub input: Vec<AdcInput>,
    /// Key index for each input.
    pub vector: Vec<Literal>,
}

/// `analog.mux` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MuxInputs {
    /// ADC inputs fed by multiplexer outputs.
    pub input: Vec<AdcInput>,
    /// Multiplexer select line pins.
    pub select: Vec<String>,
    /// Key index per select combination (rows) and mux input (columns).
    pub matrix: Vec<Vec<Literal>>,
}

/// `wear_leveling` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WearLevelingConfig {
    #[serde(default = "default_virtual_size")]
    pub virtual_size: u64,
    #[serde(default = "default_write_log_size")]
    pub write_log_size: u64,
}

fn default_virtual_size() -> u64 {
    DEFAULT_WL_VIRTUAL_SIZE
}

fn default_write_log_size() -> u64 {
    DEFAULT_WL_WRITE_LOG_SIZE
}

impl Default for WearLevelingConfig {
    fn default() -> Self {
        Self {
            virtual_size: DEFAULT_WL_VIRTUAL_SIZE,
            write_log_size: DEFAULT_WL_WRITE_LOG_SIZE,
        }
    }
}

impl WearLevelingConfig {
    /// Bytes of flash backing the wear-leveling store, or `None` when the
    /// two sizes do not fit in a `u64` together.
    pub fn backing_store_size(&self) -> Option<u64> {
        self.virtual_size.checked_add(self.write_log_size)
    }
}

/// `keyboard` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyboardGeometry {
    pub num_profiles: usize,
    pub num_layers: usize,
    pub num_keys: usize,
    pub num_advanced_keys: usize,
}

/// `actuation` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActuationConfig {
    #[serde(default)]
    pub actuation_point: Option<Literal>,
}

impl Manifest {
    /// Parse a manifest from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, CompileError> {
        Ok(serde_json::from_str(json)?)
    }
}
