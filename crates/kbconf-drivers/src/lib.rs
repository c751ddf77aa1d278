//! Hardware driver model for the kbconf configuration compiler.
//!
//! A driver descriptor captures everything the compiler needs to know about
//! a microcontroller family:
//! - **Identity:** PlatformIO board, linker script, framework and platform
//! - **MCU:** TinyUSB MCU identifier
//! - **Metadata:** bootloader entry, flash sector geometry and ADC wiring
//!
//! Descriptors are collected in a [`DriverRegistry`] that is built once at
//! startup and passed by reference to whoever needs to resolve a driver.

pub mod adc;
pub mod driver;
pub mod error;
pub mod flash;
pub mod registry;

pub use adc::{
    AdcInput, AdcWiring, At32FirmlibNaming, GpioNaming, GpioPins, PinName, StmHalNaming,
};
pub use driver::{Bootloader, DriverDescriptor, Metadata, PlatformIo, TinyUsb};
pub use error::{DriverError, Result};
pub use flash::{FlashGeometry, SectorLayout};
pub use registry::DriverRegistry;
