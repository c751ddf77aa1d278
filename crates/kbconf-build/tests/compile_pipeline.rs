//! End-to-end tests for the build parameter compiler.

use kbconf_build::{compile, CompileConfig, CompileError, Manifest};
use kbconf_drivers::{DriverError, DriverRegistry};

const MINI4: &str = include_str!("fixtures/mini4.json");
const RAW3: &str = include_str!("fixtures/raw3.json");

fn edit(json: &str, f: impl FnOnce(&mut serde_json::Value)) -> Manifest {
    let mut value: serde_json::Value = serde_json::from_str(json).unwrap();
    f(&mut value);
    serde_json::from_value(value).unwrap()
}

fn compile_str(json: &str) -> Result<kbconf_build::CompileOutput, CompileError> {
    let registry = DriverRegistry::builtin();
    let manifest = Manifest::from_json_str(json).unwrap();
    compile(&manifest, &CompileConfig::new(&registry))
}

#[test]
fn mux_keyboard_full_flag_list() {
    let output = compile_str(MINI4).expect("compile");

    let expected = vec![
        "-DBOOTLOADER_ADDR='536805376'",
        "-DBOOTLOADER_MAGIC='3735928559'",
        "-DFLASH_SIZE='458752'",
        "-Wl,--defsym,FLASH_SIZE=458752",
        "-DFLASH_NUM_SECTORS='8'",
        "-DFLASH_EMPTY_VAL='4294967295'",
        "-DFLASH_SECTOR_SIZES='{16384, 16384, 16384, 16384, 65536, 131072, 131072, 131072}'",
        "-DCFG_TUSB_MCU='OPT_MCU_STM32F4'",
        "-DBOARD_HSE_VALUE='16000000'",
        "-DHSE_VALUE='16000000'",
        "-DBOARD_USB_FS",
        "-DUSB_MANUFACTURER_NAME='\"ABS0\"'",
        "-DUSB_PRODUCT_NAME='\"Mini4\"'",
        "-DUSB_VENDOR_ID='0xAB50'",
        "-DUSB_PRODUCT_ID='0xAB61'",
        "-DADC_NUM_CHANNELS='16'",
        "-DADC_RESOLUTION='12'",
        "-DMATRIX_INVERT_ADC_VALUES",
        "-DADC_SAMPLE_DELAY='40'",
        "-DADC_NUM_MUX_INPUTS='2'",
        "-DADC_MUX_INPUT_CHANNELS='{3, 4}'",
        "-DADC_NUM_MUX_SELECT_PINS='2'",
        "-DADC_MUX_SELECT_PORTS='{GPIOC, GPIOC}'",
        "-DADC_MUX_SELECT_PINS='{GPIO_PIN_13, GPIO_PIN_14}'",
        "-DADC_MUX_INPUT_MATRIX='{{0, 2, 255, 255}, {1, 3, 255, 255}}'",
        "-DDEFAULT_CALIBRATION='{.initial_rest_value = 2048, .initial_bottom_out_threshold = 800}'",
        "-DWL_VIRTUAL_SIZE='8192'",
        "-Wl,--defsym,WL_VIRTUAL_SIZE=8192",
        "-DWL_WRITE_LOG_SIZE='65536'",
        "-Wl,--defsym,WL_WRITE_LOG_SIZE=65536",
        "-DWL_BASE_ADDRESS='327680'",
        "-Wl,--defsym,WL_BASE_ADDRESS=327680",
        "-DNUM_PROFILES='2'",
        "-DNUM_LAYERS='2'",
        "-DNUM_KEYS='4'",
        "-DNUM_ADVANCED_KEYS='8'",
        "-DDEFAULT_KEYMAPS='{{{KC_ESC, KC_1, KC_2, KC_3}, {KC_TRNS, KC_F1, KC_F2, KC_F3}}, \
         {{KC_ESC, KC_1, KC_2, KC_3}, {KC_TRNS, KC_F1, KC_F2, KC_F3}}}'",
        "-DACTUATION_POINT='128'",
    ];
    assert_eq!(output.parameters.to_flags(), expected);
    assert_eq!(output.report.parameter_count, expected.len());
}

#[test]
fn raw_keyboard_on_uniform_flash() {
    let output = compile_str(RAW3).expect("compile");
    let params = &output.parameters;

    assert_eq!(params.define_value("FLASH_SECTOR_SIZE").as_deref(), Some("2048"));
    assert!(params.definition("FLASH_SECTOR_SIZES").is_none());
    assert_eq!(params.define_value("CFG_TUSB_MCU").as_deref(), Some("OPT_MCU_AT32F402_405"));
    assert!(params.definition("BOARD_USB_HS").is_some());
    assert!(params.definition("BOARD_USB_FS").is_none());
    assert_eq!(params.define_value("USB_VENDOR_ID").as_deref(), Some("4660"));
    assert_eq!(params.define_value("ADC_RESOLUTION").as_deref(), Some("10"));
    assert_eq!(params.define_value("ADC_NUM_RAW_INPUTS").as_deref(), Some("3"));
    assert_eq!(params.define_value("ADC_RAW_INPUT_CHANNELS").as_deref(), Some("{0, 3, 5}"));
    assert_eq!(params.define_value("ADC_RAW_INPUT_VECTOR").as_deref(), Some("{0, 1, 2}"));
    assert!(params.definition("ADC_NUM_MUX_INPUTS").is_none());
    assert!(params.definition("MATRIX_INVERT_ADC_VALUES").is_none());
    assert!(params.definition("ADC_SAMPLE_DELAY").is_none());
    assert!(params.definition("ACTUATION_POINT").is_none());
    assert_eq!(
        params.define_value("DEFAULT_KEYMAPS").as_deref(),
        Some("{{{KC_A, KC_B, KC_C}}, {{KC_X, KC_Y, KC_Z}}}")
    );

    // 4096 + 16384 = 10 sectors of 2 KiB at the end of 256 KiB.
    assert_eq!(output.report.wear_leveling.reserved_size, 20_480);
    assert_eq!(params.define_value("WL_BASE_ADDRESS").as_deref(), Some("241664"));
    assert_eq!(
        params.linker_symbol("WL_BASE_ADDRESS").unwrap().to_string(),
        "-Wl,--defsym,WL_BASE_ADDRESS=241664"
    );
}

#[test]
fn usb_id_above_i64_range_renders_as_integer() {
    let registry = DriverRegistry::builtin();
    let manifest = edit(RAW3, |v| v["usb"]["vid"] = u64::MAX.into());
    let output = compile(&manifest, &CompileConfig::new(&registry)).unwrap();
    assert_eq!(
        output.parameters.define_value("USB_VENDOR_ID").as_deref(),
        Some("18446744073709551615")
    );
}

#[test]
fn default_wear_leveling_on_uniform_flash() {
    let registry = DriverRegistry::builtin();
    let manifest = edit(RAW3, |v| {
        v.as_object_mut().unwrap().remove("wear_leveling");
    });
    let output = compile(&manifest, &CompileConfig::new(&registry)).unwrap();
    assert_eq!(output.parameters.define_value("WL_BASE_ADDRESS").as_deref(), Some("188416"));
    assert_eq!(output.parameters.define_value("WL_VIRTUAL_SIZE").as_deref(), Some("8192"));
    assert_eq!(output.parameters.define_value("WL_WRITE_LOG_SIZE").as_deref(), Some("65536"));
}

#[test]
fn include_dirs_come_first() {
    let registry = DriverRegistry::builtin();
    let manifest = Manifest::from_json_str(MINI4).unwrap();
    let config = CompileConfig::new(&registry).with_include_dirs([
        "hardware/stm32f446xx",
        "keyboards/mini4",
        "include",
    ]);
    let flags = compile(&manifest, &config).unwrap().parameters.to_flags();
    assert_eq!(
        &flags[..4],
        &[
            "-Ihardware/stm32f446xx",
            "-Ikeyboards/mini4",
            "-Iinclude",
            "-DBOOTLOADER_ADDR='536805376'",
        ]
    );
}

#[test]
fn compilation_is_deterministic() {
    let a = compile_str(MINI4).unwrap();
    let b = compile_str(MINI4).unwrap();
    assert_eq!(a.parameters, b.parameters);
    assert_eq!(a.report.fingerprint, b.report.fingerprint);
    assert_ne!(a.report.fingerprint, compile_str(RAW3).unwrap().report.fingerprint);
}

#[test]
fn unknown_driver_aborts() {
    let registry = DriverRegistry::builtin();
    let manifest = edit(MINI4, |v| v["hardware"]["driver"] = "rp2040".into());
    let err = compile(&manifest, &CompileConfig::new(&registry)).unwrap_err();
    assert!(matches!(
        &err,
        CompileError::Field {
            source: DriverError::UnknownDriver { .. },
            ..
        }
    ));
    assert_eq!(err.to_string(), "`hardware.driver`: unsupported driver: 'rp2040'");
}

#[test]
fn unknown_mux_pin_aborts() {
    let registry = DriverRegistry::builtin();
    let manifest = edit(MINI4, |v| v["analog"]["mux"]["input"][0] = "D2".into());
    let err = compile(&manifest, &CompileConfig::new(&registry)).unwrap_err();
    assert_eq!(err.to_string(), "`analog.mux.input`: pin 'D2' is not an ADC input");
}

#[test]
fn raw_channel_out_of_range_aborts() {
    let registry = DriverRegistry::builtin();
    let manifest = edit(RAW3, |v| v["analog"]["raw"]["input"][2] = 16.into());
    let err = compile(&manifest, &CompileConfig::new(&registry)).unwrap_err();
    assert!(matches!(
        err,
        CompileError::Field {
            source: DriverError::IndexOutOfRange { index: 16, len: 16 },
            ..
        }
    ));
}

#[test]
fn malformed_select_pin_aborts() {
    let registry = DriverRegistry::builtin();
    let manifest = edit(MINI4, |v| v["analog"]["mux"]["select"][1] = "14".into());
    let err = compile(&manifest, &CompileConfig::new(&registry)).unwrap_err();
    assert!(err.to_string().starts_with("`analog.mux.select`"), "{err}");
}

#[test]
fn ragged_mux_matrix_aborts() {
    let registry = DriverRegistry::builtin();
    let manifest = edit(MINI4, |v| v["analog"]["mux"]["matrix"][2] = serde_json::json!([255]));
    let err = compile(&manifest, &CompileConfig::new(&registry)).unwrap_err();
    assert!(matches!(err, CompileError::RaggedMatrix { row: 2, .. }));
}

#[test]
fn oversized_wear_leveling_aborts() {
    let registry = DriverRegistry::builtin();
    let manifest = edit(RAW3, |v| v["wear_leveling"]["write_log_size"] = 262_144.into());
    let err = compile(&manifest, &CompileConfig::new(&registry)).unwrap_err();
    assert!(matches!(
        err,
        CompileError::Field {
            source: DriverError::CapacityExceeded {
                required: 266_240,
                available: 262_144,
            },
            ..
        }
    ));
}

#[test]
fn overflowing_wear_leveling_sizes_abort() {
    let registry = DriverRegistry::builtin();
    let manifest = edit(RAW3, |v| {
        v["wear_leveling"]["virtual_size"] = u64::MAX.into();
        v["wear_leveling"]["write_log_size"] = 1.into();
    });
    let err = compile(&manifest, &CompileConfig::new(&registry)).unwrap_err();
    assert!(matches!(
        err,
        CompileError::Field {
            source: DriverError::CapacityExceeded {
                required: u64::MAX,
                available: 262_144,
            },
            ..
        }
    ));
    assert!(err.to_string().starts_with("`wear_leveling`"), "{err}");
}

#[test]
fn keymap_dimension_mismatch_aborts() {
    let registry = DriverRegistry::builtin();
    let manifest = edit(MINI4, |v| v["keyboard"]["num_keys"] = 5.into());
    let err = compile(&manifest, &CompileConfig::new(&registry)).unwrap_err();
    assert_eq!(err.to_string(), "`keymaps[0][0]`: expected 5 keys, found 4");
}

#[test]
fn explicit_keymaps_with_wrong_profile_count_abort() {
    let registry = DriverRegistry::builtin();
    let manifest = edit(RAW3, |v| v["keyboard"]["num_profiles"] = 3.into());
    let err = compile(&manifest, &CompileConfig::new(&registry)).unwrap_err();
    assert!(matches!(
        err,
        CompileError::DimensionMismatch {
            dimension: "profiles",
            expected: 3,
            found: 2,
            ..
        }
    ));
}

#[test]
fn missing_keymap_aborts() {
    let registry = DriverRegistry::builtin();
    let manifest = edit(MINI4, |v| {
        v.as_object_mut().unwrap().remove("keymap");
    });
    let err = compile(&manifest, &CompileConfig::new(&registry)).unwrap_err();
    assert!(matches!(err, CompileError::MissingKeymap));
}
