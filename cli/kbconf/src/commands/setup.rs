//! `kbconf setup`: generate the PlatformIO environment for a keyboard.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use kbconf_drivers::{DriverDescriptor, DriverRegistry};

use crate::project::{PlatformioConfig, Project};

/// Render the `[env:<keyboard>]` section of `platformio.ini`.
///
/// Build flags are produced at build time by running `kbconf build`, so
/// the generated file stays valid when the manifest changes.
pub fn render_platformio_ini(
    keyboard: &str,
    driver: &DriverDescriptor,
    config: &PlatformioConfig,
) -> String {
    let build_flags = vec![
        "${env.build_flags}".to_string(),
        format!("!kbconf build -k {keyboard}"),
    ];
    let build_src_flags: Vec<String> = std::iter::once("${env.build_src_flags}".to_string())
        .chain(config.build_src_flags.iter().cloned())
        .collect();

    let pio = &driver.platformio;
    let entries: Vec<(&str, Vec<String>)> = vec![
        ("board", vec![pio.board.clone()]),
        ("board_build.ldscript", vec![format!("linker/{}", pio.ldscript)]),
        ("build_flags", build_flags),
        ("build_src_filter", vec!["${env.build_src_filter}".to_string()]),
        ("build_src_flags", build_src_flags),
        ("extra_scripts", config.extra_scripts.clone()),
        ("framework", vec![pio.framework.clone()]),
        ("lib_deps", config.lib_deps.clone()),
        ("platform", vec![pio.platform.clone()]),
        ("upload_protocol", vec![config.upload_protocol.clone()]),
    ];

    let mut out = format!("[env:{keyboard}]\n");
    for (key, values) in entries {
        match values.as_slice() {
            [] => continue,
            [single] => {
                let _ = writeln!(out, "{key} = {single}");
            }
            [first, rest @ ..] => {
                let _ = writeln!(out, "{key} = {first}");
                for value in rest {
                    let _ = writeln!(out, "\t{value}");
                }
            }
        }
    }
    out
}

/// Generate `platformio.ini` (or `output`) for a keyboard.
pub fn run(
    project: &Project,
    registry: &DriverRegistry,
    keyboard: &str,
    output: Option<&Path>,
) -> Result<()> {
    let manifest = project.load_manifest(keyboard)?;
    let driver = registry
        .lookup(&manifest.hardware.driver)
        .with_context(|| format!("keyboard '{keyboard}'"))?;

    let text = render_platformio_ini(keyboard, driver, &project.config.platformio);
    let path = match output {
        Some(path) => path.to_path_buf(),
        None => project.root.join("platformio.ini"),
    };
    fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
    log::info!("wrote {}", path.display());
    println!("Configured {} for {keyboard} ({})", path.display(), driver.id);
    Ok(())
}
