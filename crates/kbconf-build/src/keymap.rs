//! Default keymap resolution and dimension checks.

use crate::error::CompileError;
use crate::manifest::Manifest;
use crate::value::Literal;

/// Key actions of one layer.
pub type Layer = Vec<Literal>;

/// Layers of one profile.
pub type Keymap = Vec<Layer>;

/// Resolve the default keymap of every profile.
///
/// Explicit per-profile `keymaps` are returned as-is; otherwise the shared
/// `keymap` is repeated once per profile.
pub fn resolve_default_keymaps(manifest: &Manifest) -> Result<Vec<Keymap>, CompileError> {
    if let Some(keymaps) = &manifest.keymaps {
        return Ok(keymaps.clone());
    }
    let keymap = manifest.keymap.as_ref().ok_or(CompileError::MissingKeymap)?;
    Ok(vec![keymap.clone(); manifest.keyboard.num_profiles])
}

/// Check that `keymaps` has exactly `num_profiles` profiles of `num_layers`
/// layers of `num_keys` keys each.
pub fn validate_dimensions(
    keymaps: &[Keymap],
    num_profiles: usize,
    num_layers: usize,
    num_keys: usize,
) -> Result<(), CompileError> {
    check("keymaps", "profiles", num_profiles, keymaps.len())?;
    for (p, keymap) in keymaps.iter().enumerate() {
        check(&format!("keymaps[{p}]"), "layers", num_layers, keymap.len())?;
        for (l, layer) in keymap.iter().enumerate() {
            check(&format!("keymaps[{p}][{l}]"), "keys", num_keys, layer.len())?;
        }
    }
    Ok(())
}

fn check(
    location: &str,
    dimension: &'static str,
    expected: usize,
    found: usize,
) -> Result<(), CompileError> {
    if expected == found {
        Ok(())
    } else {
        Err(CompileError::DimensionMismatch {
            location: location.to_string(),
            dimension,
            expected,
            found,
        })
    }
}
