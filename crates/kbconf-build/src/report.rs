//! Compile report summarising one compilation pass.

use std::fmt;

use crate::compile::WearLevelingPlacement;

/// Summary of a successful compilation pass.
#[derive(Debug, Clone)]
pub struct CompileReport {
    /// Product name from the manifest.
    pub keyboard: String,
    /// Driver identifier.
    pub driver: String,
    /// Total flash size in bytes.
    pub flash_size: u64,
    /// Number of flash sectors.
    pub flash_sectors: u64,
    /// Wear-leveling region placement.
    pub wear_leveling: WearLevelingPlacement,
    pub num_profiles: usize,
    pub num_layers: usize,
    pub num_keys: usize,
    /// Number of emitted build parameters.
    pub parameter_count: usize,
    /// SHA-256 of the rendered parameters.
    pub fingerprint: String,
}

impl fmt::Display for CompileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Compile Report ===")?;
        writeln!(f, "Keyboard: {}", self.keyboard)?;
        writeln!(f, "Driver:   {}", self.driver)?;
        writeln!(f)?;

        writeln!(f, "--- Flash ---")?;
        writeln!(
            f,
            "  Size:    {} bytes ({} sectors)",
            self.flash_size, self.flash_sectors
        )?;
        let wl = &self.wear_leveling;
        writeln!(
            f,
            "  Wear leveling: 0x{:08X} - 0x{:08X} ({} bytes reserved, {} requested)",
            wl.base_address,
            wl.base_address + wl.reserved_size,
            wl.reserved_size,
            wl.backing_store_size,
        )?;
        writeln!(f)?;

        writeln!(f, "--- Keymaps ---")?;
        writeln!(
            f,
            "  {} profiles x {} layers x {} keys",
            self.num_profiles, self.num_layers, self.num_keys
        )?;
        writeln!(f)?;

        writeln!(f, "Parameters:  {}", self.parameter_count)?;
        write!(f, "Fingerprint: {}", self.fingerprint)
    }
}
