//! Build parameter compiler for kbconf.
//!
//! Turns a keyboard manifest and the driver it selects into an ordered set
//! of preprocessor definitions and linker symbols for the firmware build:
//! driver metadata, USB identity, ADC channel wiring, wear-leveling
//! placement and default keymaps.
//!
//! The pass is pure and fails fast: either every parameter is derived or an
//! error naming the offending manifest field is returned.

pub mod compile;
pub mod error;
pub mod keymap;
pub mod manifest;
pub mod params;
pub mod report;
pub mod value;

pub use compile::{
    compile, place_wear_leveling, transpose, CompileConfig, CompileOutput, WearLevelingPlacement,
};
pub use error::CompileError;
pub use keymap::{resolve_default_keymaps, validate_dimensions, Keymap, Layer};
pub use manifest::Manifest;
pub use params::{BuildParameter, BuildParameterSet};
pub use report::CompileReport;
pub use value::{Literal, Value};
