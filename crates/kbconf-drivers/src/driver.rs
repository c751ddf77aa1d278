//! Driver descriptors.
//!
//! Assembles PlatformIO identity + TinyUSB MCU + hardware metadata into a
//! single description of a supported microcontroller family.

use crate::adc::{AdcWiring, At32FirmlibNaming, StmHalNaming};
use crate::flash::{FlashGeometry, SectorLayout};

/// PlatformIO identity of a driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformIo {
    /// PlatformIO board identifier.
    pub board: String,
    /// Linker script used for the board.
    pub ldscript: String,
    /// PlatformIO framework identifier.
    pub framework: String,
    /// PlatformIO platform identifier (name or git URL).
    pub platform: String,
}

/// TinyUSB identity of a driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TinyUsb {
    /// TinyUSB MCU identifier (e.g., "stm32f4").
    pub mcu: String,
}

impl TinyUsb {
    /// The `OPT_MCU_*` constant selecting this MCU in TinyUSB.
    pub fn opt_mcu(&self) -> String {
        format!("OPT_MCU_{}", self.mcu.to_uppercase())
    }
}

/// System bootloader entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bootloader {
    /// Flash address of the system bootloader.
    pub address: u32,
    /// Magic value that makes the firmware jump to the bootloader on the
    /// next reset.
    pub magic: u32,
}

/// Hardware metadata consumed by the compiler.
#[derive(Debug, Clone)]
pub struct Metadata {
    pub bootloader: Bootloader,
    pub flash: FlashGeometry,
    pub adc: AdcWiring,
}

/// A complete driver description.
#[derive(Debug, Clone)]
pub struct DriverDescriptor {
    /// Driver identifier (e.g., "stm32f446xx").
    pub id: String,
    /// Human-readable summary.
    pub description: String,
    pub platformio: PlatformIo,
    pub tinyusb: TinyUsb,
    pub metadata: Metadata,
}

const K: u64 = 1024;

/// ADC input pins shared by the STM32F446 and AT32F405 64-pin packages.
fn lqfp64_adc_pins() -> Vec<String> {
    [
        "A0", "A1", "A2", "A3", "A4", "A5", "A6", "A7", "B0", "B1", "C0", "C1", "C2", "C3", "C4",
        "C5",
    ]
    .iter()
    .map(|pin| pin.to_string())
    .collect()
}

impl DriverDescriptor {
    /// Construct the STM32F446xx driver.
    pub fn stm32f446xx() -> Self {
        Self {
            id: "stm32f446xx".into(),
            description: "STM32F446RE (ARM Cortex-M4F, 512 KB flash)".into(),
            platformio: PlatformIo {
                board: "genericSTM32F446RE".into(),
                ldscript: "stm32f446retx.ld".into(),
                framework: "stm32cube".into(),
                platform: "ststm32".into(),
            },
            tinyusb: TinyUsb {
                mcu: "stm32f4".into(),
            },
            metadata: Metadata {
                bootloader: Bootloader {
                    address: 0x1FFF_0000,
                    magic: 0xDEAD_BEEF,
                },
                flash: FlashGeometry {
                    sectors: SectorLayout::NonUniform {
                        sizes: vec![
                            16 * K,
                            16 * K,
                            16 * K,
                            16 * K,
                            64 * K,
                            128 * K,
                            128 * K,
                            128 * K,
                        ],
                    },
                    empty_value: 0xFFFF_FFFF,
                },
                adc: AdcWiring {
                    max_resolution: 12,
                    input_pins: lqfp64_adc_pins(),
                    naming: &StmHalNaming,
                },
            },
        }
    }

    /// Construct the AT32F405xx driver.
    pub fn at32f405xx() -> Self {
        Self {
            id: "at32f405xx".into(),
            description: "AT32F405RCT7 (ARM Cortex-M4F, 256 KB flash)".into(),
            platformio: PlatformIo {
                board: "genericAT32F405RCT7".into(),
                ldscript: "at32f405xc.ld".into(),
                framework: "at32firmlib".into(),
                platform: "https://github.com/ArteryTek/platform-arterytekat32.git".into(),
            },
            tinyusb: TinyUsb {
                mcu: "at32f402_405".into(),
            },
            metadata: Metadata {
                bootloader: Bootloader {
                    address: 0x1FFF_A400,
                    magic: 0xDEAD_BEEF,
                },
                flash: FlashGeometry {
                    sectors: SectorLayout::Uniform {
                        size: 2 * K,
                        count: 128,
                    },
                    empty_value: 0xFFFF_FFFF,
                },
                adc: AdcWiring {
                    max_resolution: 12,
                    input_pins: lqfp64_adc_pins(),
                    naming: &At32FirmlibNaming,
                },
            },
        }
    }
}
