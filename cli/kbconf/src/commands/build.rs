//! `kbconf build` and `kbconf check`: compile a keyboard manifest into
//! build parameters.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use kbconf_build::{compile, CompileConfig, CompileOutput};
use kbconf_drivers::DriverRegistry;

use crate::project::Project;

/// Output format of `kbconf build`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Flags,
    Json,
}

fn resolve_format(format: Option<&str>) -> Result<Format> {
    match format.unwrap_or("flags") {
        "flags" => Ok(Format::Flags),
        "json" => Ok(Format::Json),
        other => bail!("unknown format: '{other}' (expected flags or json)"),
    }
}

/// Load and compile one keyboard of the project.
pub fn compile_keyboard(
    project: &Project,
    registry: &DriverRegistry,
    keyboard: &str,
) -> Result<CompileOutput> {
    let manifest = project.load_manifest(keyboard)?;
    let include_dirs = project.include_dirs(&manifest.hardware.driver, keyboard);
    let config = CompileConfig::new(registry).with_include_dirs(include_dirs);
    compile(&manifest, &config)
        .with_context(|| format!("compiling {}", project.manifest_path(keyboard).display()))
}

/// Render the compiled parameters in the requested format.
fn render(keyboard: &str, output: &CompileOutput, format: Format) -> Result<String> {
    let flags = output.parameters.to_flags();
    Ok(match format {
        Format::Flags => {
            let mut text = flags.join("\n");
            text.push('\n');
            text
        }
        Format::Json => {
            let doc = serde_json::json!({
                "keyboard": keyboard,
                "driver": output.report.driver,
                "fingerprint": output.report.fingerprint,
                "flags": flags,
            });
            let mut text = serde_json::to_string_pretty(&doc)?;
            text.push('\n');
            text
        }
    })
}

/// Compile a keyboard and print its build parameters, or write them to
/// `output`.
pub fn run(
    project: &Project,
    registry: &DriverRegistry,
    keyboard: &str,
    output: Option<&Path>,
    format: Option<&str>,
) -> Result<()> {
    let format = resolve_format(format)?;
    let compiled = compile_keyboard(project, registry, keyboard)?;
    log::debug!("fingerprint {}", compiled.report.fingerprint);
    let text = render(keyboard, &compiled, format)?;

    match output {
        Some(path) => write_if_changed(path, &text),
        None => {
            print!("{text}");
            Ok(())
        }
    }
}

/// Compile a keyboard and print the compile report only.
pub fn check(project: &Project, registry: &DriverRegistry, keyboard: &str) -> Result<()> {
    let compiled = compile_keyboard(project, registry, keyboard)?;
    println!("{}", compiled.report);
    Ok(())
}

/// Write `text` to `path` unless the file already holds exactly that text,
/// so downstream builds do not see a fresh timestamp.
fn write_if_changed(path: &Path, text: &str) -> Result<()> {
    if fs::read_to_string(path).is_ok_and(|existing| existing == text) {
        log::info!("{} is up to date", path.display());
        return Ok(());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    log::info!("wrote {}", path.display());
    Ok(())
}
