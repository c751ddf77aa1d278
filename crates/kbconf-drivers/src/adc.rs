//! ADC wiring and GPIO pin naming.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DriverError, Result};

/// An ADC input as written in a manifest: either a pin name or a channel
/// number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdcInput {
    /// Channel number.
    Channel(u64),
    /// GPIO pin name, e.g. `"A3"`.
    Pin(String),
}

impl From<&str> for AdcInput {
    fn from(pin: &str) -> Self {
        AdcInput::Pin(pin.to_string())
    }
}

impl From<u64> for AdcInput {
    fn from(channel: u64) -> Self {
        AdcInput::Channel(channel)
    }
}

/// A pin name split into its port letter and pin number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinName {
    /// Port letter (`'A'`, `'B'`, ...).
    pub port: char,
    /// Pin number within the port.
    pub number: u8,
}

impl PinName {
    /// Parse a `<Port><Number>` pin name such as `"C13"`.
    pub fn parse(name: &str) -> Result<Self> {
        let invalid = || DriverError::InvalidPinName {
            pin: name.to_string(),
        };
        let mut chars = name.chars();
        let port = chars.next().filter(|c| c.is_ascii_uppercase()).ok_or_else(invalid)?;
        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let number = digits.parse().map_err(|_| invalid())?;
        Ok(Self { port, number })
    }
}

impl fmt::Display for PinName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.port, self.number)
    }
}

/// GPIO constant naming of an MCU vendor library.
///
/// Vendor libraries agree on port names but spell pin constants
/// differently, so each driver carries the convention of its framework.
pub trait GpioNaming: fmt::Debug + Send + Sync {
    /// Name of the convention (shown by `kbconf drivers describe`).
    fn name(&self) -> &str;

    /// Port peripheral identifier for a pin.
    fn port(&self, pin: PinName) -> String {
        format!("GPIO{}", pin.port)
    }

    /// Pin constant identifier for a pin.
    fn pin(&self, pin: PinName) -> String;
}

/// STM32Cube HAL naming (`GPIO_PIN_13`).
#[derive(Debug, Clone, Copy, Default)]
pub struct StmHalNaming;

impl GpioNaming for StmHalNaming {
    fn name(&self) -> &str {
        "stm32cube-hal"
    }

    fn pin(&self, pin: PinName) -> String {
        format!("GPIO_PIN_{}", pin.number)
    }
}

/// Artery AT32 firmware library naming (`GPIO_PINS_13`).
#[derive(Debug, Clone, Copy, Default)]
pub struct At32FirmlibNaming;

impl GpioNaming for At32FirmlibNaming {
    fn name(&self) -> &str {
        "at32-firmlib"
    }

    fn pin(&self, pin: PinName) -> String {
        format!("GPIO_PINS_{}", pin.number)
    }
}

/// Parallel port and pin identifier arrays for a list of pins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GpioPins {
    /// Port identifiers (`GPIOA`, ...).
    pub ports: Vec<String>,
    /// Pin identifiers, spelled by the driver's naming convention.
    pub pins: Vec<String>,
}

/// ADC wiring of a microcontroller.
#[derive(Debug, Clone)]
pub struct AdcWiring {
    /// Maximum ADC resolution supported by the MCU, in bits.
    pub max_resolution: u8,
    /// ADC input pin names; the position in the list is the channel number.
    pub input_pins: Vec<String>,
    /// GPIO naming convention of the driver's framework.
    pub naming: &'static dyn GpioNaming,
}

impl AdcWiring {
    /// Number of ADC channels.
    pub fn channel_count(&self) -> usize {
        self.input_pins.len()
    }

    /// Channel number of an ADC input pin.
    pub fn channel_of(&self, pin: &str) -> Result<u64> {
        self.input_pins
            .iter()
            .position(|p| p == pin)
            .map(|i| i as u64)
            .ok_or_else(|| DriverError::UnknownPin {
                pin: pin.to_string(),
            })
    }

    /// Resolve pin names and channel numbers to channel numbers.
    ///
    /// Order and duplicates are preserved.
    pub fn resolve_channels(&self, inputs: &[AdcInput]) -> Result<Vec<u64>> {
        let len = self.channel_count() as u64;
        inputs
            .iter()
            .map(|input| match input {
                AdcInput::Pin(pin) => self.channel_of(pin),
                AdcInput::Channel(index) if *index >= len => {
                    Err(DriverError::IndexOutOfRange { index: *index, len })
                }
                AdcInput::Channel(index) => Ok(*index),
            })
            .collect()
    }

    /// Convert pin names to GPIO port and pin identifiers.
    pub fn pins_to_gpio<S: AsRef<str>>(&self, pins: &[S]) -> Result<GpioPins> {
        let mut gpio = GpioPins::default();
        for name in pins {
            let pin = PinName::parse(name.as_ref())?;
            gpio.ports.push(self.naming.port(pin));
            gpio.pins.push(self.naming.pin(pin));
        }
        Ok(gpio)
    }
}
