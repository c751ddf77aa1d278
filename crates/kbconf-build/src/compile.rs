//! Build parameter compilation pass.

use kbconf_drivers::{DriverDescriptor, DriverError, DriverRegistry, FlashGeometry, SectorLayout};
use log::{debug, warn};

use crate::error::CompileError;
use crate::keymap::{resolve_default_keymaps, validate_dimensions};
use crate::manifest::{Manifest, MuxInputs, RawInputs, UsbPort, WearLevelingConfig};
use crate::params::BuildParameterSet;
use crate::report::CompileReport;
use crate::value::{Literal, Value};

/// Configuration for a compilation pass.
pub struct CompileConfig<'a> {
    /// Drivers the manifest may select.
    pub registry: &'a DriverRegistry,
    /// Header search paths emitted ahead of every definition.
    pub include_dirs: Vec<String>,
}

impl<'a> CompileConfig<'a> {
    pub fn new(registry: &'a DriverRegistry) -> Self {
        Self {
            registry,
            include_dirs: Vec::new(),
        }
    }

    pub fn with_include_dirs(mut self, dirs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.include_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }
}

/// Output of a successful compilation pass.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub parameters: BuildParameterSet,
    pub report: CompileReport,
}

/// Placement of the wear-leveling backing store at the end of the flash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WearLevelingPlacement {
    /// Bytes requested (virtual size + write log size).
    pub backing_store_size: u64,
    /// Bytes reserved after rounding up to whole sectors.
    pub reserved_size: u64,
    /// Offset of the reserved region from the start of the flash.
    pub base_address: u64,
}

/// Place the wear-leveling backing store in the trailing flash sectors.
pub fn place_wear_leveling(
    config: &WearLevelingConfig,
    flash: &FlashGeometry,
) -> Result<WearLevelingPlacement, DriverError> {
    let backing_store_size = config.backing_store_size().ok_or_else(|| {
        DriverError::CapacityExceeded {
            required: u64::MAX,
            available: flash.total_size(),
        }
    })?;
    let base_address = flash.reserve_from_end(backing_store_size)?;
    Ok(WearLevelingPlacement {
        backing_store_size,
        reserved_size: flash.total_size() - base_address,
        base_address,
    })
}

/// Swap rows and columns of a rectangular matrix.
///
/// The mux matrix is written per select combination but the firmware
/// indexes it per mux input.
pub fn transpose(field: &str, matrix: &[Vec<Literal>]) -> Result<Vec<Vec<Literal>>, CompileError> {
    let width = matrix.first().map_or(0, Vec::len);
    if let Some((row, r)) = matrix.iter().enumerate().find(|(_, r)| r.len() != width) {
        return Err(CompileError::RaggedMatrix {
            field: field.to_string(),
            row,
            expected: width,
            found: r.len(),
        });
    }
    Ok((0..width)
        .map(|col| matrix.iter().map(|r| r[col].clone()).collect())
        .collect())
}

/// Compile a manifest into build parameters.
///
/// Parameters are appended in a fixed order so identical inputs produce
/// identical output. Any error aborts the whole pass.
pub fn compile(manifest: &Manifest, config: &CompileConfig) -> Result<CompileOutput, CompileError> {
    let driver = config
        .registry
        .lookup(&manifest.hardware.driver)
        .map_err(CompileError::field("hardware.driver"))?;
    let mut params = BuildParameterSet::new();

    for dir in &config.include_dirs {
        params.include(dir.as_str());
    }

    emit_bootloader(&mut params, driver);
    emit_flash(&mut params, &driver.metadata.flash);
    params.define("CFG_TUSB_MCU", Value::ident(driver.tinyusb.opt_mcu()));
    params.define("BOARD_HSE_VALUE", manifest.hardware.hse_value);
    params.define("HSE_VALUE", manifest.hardware.hse_value);
    emit_usb(&mut params, manifest);
    emit_analog(&mut params, manifest, driver)?;
    params.define(
        "DEFAULT_CALIBRATION",
        Value::Struct(
            manifest
                .calibration
                .iter()
                .map(|(k, v)| -> Result<(String, Value), CompileError> {
                    Ok((k.clone(), Value::from_json(&format!("calibration.{k}"), v)?))
                })
                .collect::<Result<_, _>>()?,
        ),
    );

    let wear_leveling = place_wear_leveling(&manifest.wear_leveling, &driver.metadata.flash)
        .map_err(CompileError::field("wear_leveling"))?;
    debug!(
        "wear leveling: {} bytes requested, {} reserved at 0x{:X}",
        wear_leveling.backing_store_size, wear_leveling.reserved_size, wear_leveling.base_address
    );
    params.define_and_defsym("WL_VIRTUAL_SIZE", manifest.wear_leveling.virtual_size);
    params.define_and_defsym("WL_WRITE_LOG_SIZE", manifest.wear_leveling.write_log_size);
    params.define_and_defsym("WL_BASE_ADDRESS", wear_leveling.base_address);

    let kb = &manifest.keyboard;
    params.define("NUM_PROFILES", kb.num_profiles);
    params.define("NUM_LAYERS", kb.num_layers);
    params.define("NUM_KEYS", kb.num_keys);
    params.define("NUM_ADVANCED_KEYS", kb.num_advanced_keys);

    let keymaps = resolve_default_keymaps(manifest)?;
    validate_dimensions(&keymaps, kb.num_profiles, kb.num_layers, kb.num_keys)?;
    params.define("DEFAULT_KEYMAPS", &keymaps);

    if let Some(point) = manifest
        .actuation
        .as_ref()
        .and_then(|a| a.actuation_point.as_ref())
    {
        params.define("ACTUATION_POINT", point);
    }

    let report = CompileReport {
        keyboard: manifest.name.clone(),
        driver: driver.id.clone(),
        flash_size: driver.metadata.flash.total_size(),
        flash_sectors: driver.metadata.flash.sector_count(),
        wear_leveling,
        num_profiles: kb.num_profiles,
        num_layers: kb.num_layers,
        num_keys: kb.num_keys,
        parameter_count: params.len(),
        fingerprint: params.fingerprint(),
    };

    Ok(CompileOutput {
        parameters: params,
        report,
    })
}

fn emit_bootloader(params: &mut BuildParameterSet, driver: &DriverDescriptor) {
    let bootloader = &driver.metadata.bootloader;
    params.define("BOOTLOADER_ADDR", bootloader.address);
    params.define("BOOTLOADER_MAGIC", bootloader.magic);
}

fn emit_flash(params: &mut BuildParameterSet, flash: &FlashGeometry) {
    params.define_and_defsym("FLASH_SIZE", flash.total_size());
    params.define("FLASH_NUM_SECTORS", flash.sector_count());
    params.define("FLASH_EMPTY_VAL", flash.empty_value);
    match &flash.sectors {
        SectorLayout::NonUniform { sizes } => {
            params.define("FLASH_SECTOR_SIZES", Value::array(sizes.iter().copied()))
        }
        SectorLayout::Uniform { size, .. } => params.define("FLASH_SECTOR_SIZE", *size),
    }
}

fn emit_usb(params: &mut BuildParameterSet, manifest: &Manifest) {
    match manifest.usb.port {
        UsbPort::Fs => params.flag("BOARD_USB_FS"),
        UsbPort::Hs => params.flag("BOARD_USB_HS"),
    }
    params.define("USB_MANUFACTURER_NAME", Value::string(&manifest.manufacturer));
    params.define("USB_PRODUCT_NAME", Value::string(&manifest.name));
    params.define("USB_VENDOR_ID", &manifest.usb.vid);
    params.define("USB_PRODUCT_ID", &manifest.usb.pid);
}

fn emit_analog(
    params: &mut BuildParameterSet,
    manifest: &Manifest,
    driver: &DriverDescriptor,
) -> Result<(), CompileError> {
    let analog = &manifest.analog;
    let adc = &driver.metadata.adc;

    let resolution = analog.adc_resolution.unwrap_or(adc.max_resolution);
    if resolution > adc.max_resolution {
        warn!(
            "analog.adc_resolution {resolution} exceeds the {}-bit maximum of {}",
            adc.max_resolution, driver.id
        );
    }
    params.define("ADC_NUM_CHANNELS", adc.channel_count());
    params.define("ADC_RESOLUTION", resolution);

    if analog.invert_adc {
        params.flag("MATRIX_INVERT_ADC_VALUES");
    }
    if let Some(delay) = analog.delay {
        params.define("ADC_SAMPLE_DELAY", delay);
    }
    if let Some(raw) = &analog.raw {
        emit_raw_inputs(params, raw, driver)?;
    }
    if let Some(mux) = &analog.mux {
        emit_mux_inputs(params, mux, driver)?;
    }
    Ok(())
}

fn emit_raw_inputs(
    params: &mut BuildParameterSet,
    raw: &RawInputs,
    driver: &DriverDescriptor,
) -> Result<(), CompileError> {
    let channels = driver
        .metadata
        .adc
        .resolve_channels(&raw.input)
        .map_err(CompileError::field("analog.raw.input"))?;
    params.define("ADC_NUM_RAW_INPUTS", raw.input.len());
    params.define("ADC_RAW_INPUT_CHANNELS", channels);
    params.define("ADC_RAW_INPUT_VECTOR", &raw.vector);
    Ok(())
}

fn emit_mux_inputs(
    params: &mut BuildParameterSet,
    mux: &MuxInputs,
    driver: &DriverDescriptor,
) -> Result<(), CompileError> {
    let adc = &driver.metadata.adc;
    let channels = adc
        .resolve_channels(&mux.input)
        .map_err(CompileError::field("analog.mux.input"))?;
    let gpio = adc
        .pins_to_gpio(&mux.select)
        .map_err(CompileError::field("analog.mux.select"))?;
    let matrix = transpose("analog.mux.matrix", &mux.matrix)?;

    let combinations = 1usize.checked_shl(mux.select.len() as u32);
    if combinations != Some(mux.matrix.len()) {
        warn!(
            "analog.mux.matrix has {} rows but {} select pins address {} combinations",
            mux.matrix.len(),
            mux.select.len(),
            combinations.map_or_else(|| "too many".to_string(), |c| c.to_string())
        );
    }
    if !mux.matrix.is_empty() && matrix.len() != mux.input.len() {
        warn!(
            "analog.mux.matrix has {} columns but {} mux inputs are declared",
            matrix.len(),
            mux.input.len()
        );
    }

    params.define("ADC_NUM_MUX_INPUTS", mux.input.len());
    params.define("ADC_MUX_INPUT_CHANNELS", channels);
    params.define("ADC_NUM_MUX_SELECT_PINS", mux.select.len());
    params.define("ADC_MUX_SELECT_PORTS", Value::array(gpio.ports.into_iter().map(Value::Ident)));
    params.define("ADC_MUX_SELECT_PINS", Value::array(gpio.pins.into_iter().map(Value::Ident)));
    params.define("ADC_MUX_INPUT_MATRIX", &matrix);
    Ok(())
}
