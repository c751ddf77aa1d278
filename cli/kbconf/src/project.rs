//! `kbconf.toml` project configuration and keyboard discovery.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use kbconf_build::Manifest;
use serde::{Deserialize, Serialize};

/// Name of the project configuration file.
pub const CONFIG_FILE: &str = "kbconf.toml";

/// Name of the manifest file inside each keyboard directory.
pub const MANIFEST_FILE: &str = "keyboard.json";

/// The top-level project configuration. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Directory layout.
    #[serde(default)]
    pub paths: PathsConfig,
    /// Build configuration.
    #[serde(default)]
    pub build: BuildConfig,
    /// PlatformIO environment generation.
    #[serde(default)]
    pub platformio: PlatformioConfig,
}

/// Directory layout, relative to the project root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding one subdirectory per keyboard.
    #[serde(default = "default_keyboards_dir")]
    pub keyboards: String,
    /// Directory holding one subdirectory of sources per driver.
    #[serde(default = "default_hardware_dir")]
    pub hardware: String,
    /// Shared firmware headers.
    #[serde(default = "default_include_dir")]
    pub include: String,
}

fn default_keyboards_dir() -> String {
    "keyboards".to_string()
}

fn default_hardware_dir() -> String {
    "hardware".to_string()
}

fn default_include_dir() -> String {
    "include".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            keyboards: default_keyboards_dir(),
            hardware: default_hardware_dir(),
            include: default_include_dir(),
        }
    }
}

/// Build section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Keyboard used when `--keyboard` is not given.
    #[serde(default)]
    pub default_keyboard: Option<String>,
}

/// PlatformIO section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformioConfig {
    /// Upload protocol of the generated environment.
    #[serde(default = "default_upload_protocol")]
    pub upload_protocol: String,
    /// Library dependencies.
    #[serde(default = "default_lib_deps")]
    pub lib_deps: Vec<String>,
    /// Warning flags applied to firmware sources only.
    #[serde(default = "default_build_src_flags")]
    pub build_src_flags: Vec<String>,
    /// Extra PlatformIO scripts.
    #[serde(default)]
    pub extra_scripts: Vec<String>,
}

fn default_upload_protocol() -> String {
    "dfu".to_string()
}

fn default_lib_deps() -> Vec<String> {
    vec!["https://github.com/hathach/tinyusb.git#0.20.0".to_string()]
}

fn default_build_src_flags() -> Vec<String> {
    [
        "-Werror",
        "-Wall",
        "-Wextra",
        "-Wsign-conversion",
        "-Wswitch-default",
        "-Wswitch",
        "-Wdouble-promotion",
        "-Wstrict-prototypes",
        "-Wno-unused-parameter",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for PlatformioConfig {
    fn default() -> Self {
        Self {
            upload_protocol: default_upload_protocol(),
            lib_deps: default_lib_deps(),
            build_src_flags: default_build_src_flags(),
            extra_scripts: Vec::new(),
        }
    }
}

/// A loaded project: configuration plus the directory it applies to.
#[derive(Debug, Clone)]
pub struct Project {
    pub config: ProjectConfig,
    pub root: PathBuf,
}

impl ProjectConfig {
    /// Search upward from `start_dir` for a `kbconf.toml` file, parse and
    /// return it along with the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(CONFIG_FILE);
            if candidate.is_file() {
                let content = std::fs::read_to_string(&candidate)
                    .with_context(|| format!("reading {}", candidate.display()))?;
                let config: ProjectConfig = toml::from_str(&content)
                    .with_context(|| format!("parsing {}", candidate.display()))?;
                return Ok(Some((config, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Parse a configuration from a TOML string.
    #[cfg(test)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing kbconf.toml")
    }
}

impl Project {
    /// Load the project enclosing `cwd`, or a default project rooted at
    /// `cwd` when there is no `kbconf.toml`.
    pub fn discover(cwd: &Path) -> Result<Self> {
        Ok(match ProjectConfig::find_and_load(cwd)? {
            Some((config, root)) => {
                log::debug!("using {}", root.join(CONFIG_FILE).display());
                Self { config, root }
            }
            None => Self {
                config: ProjectConfig::default(),
                root: cwd.to_path_buf(),
            },
        })
    }

    /// Pick the keyboard to work on.
    pub fn resolve_keyboard(&self, keyboard: Option<&str>) -> Result<String> {
        match keyboard.or(self.config.build.default_keyboard.as_deref()) {
            Some(name) => Ok(name.to_string()),
            None => bail!(
                "no keyboard selected: pass --keyboard or set build.default_keyboard in {CONFIG_FILE}"
            ),
        }
    }

    /// Path of a keyboard's manifest.
    pub fn manifest_path(&self, keyboard: &str) -> PathBuf {
        self.root
            .join(&self.config.paths.keyboards)
            .join(keyboard)
            .join(MANIFEST_FILE)
    }

    /// Load and parse a keyboard's manifest.
    pub fn load_manifest(&self, keyboard: &str) -> Result<Manifest> {
        let path = self.manifest_path(keyboard);
        if !path.is_file() {
            bail!(
                "unknown keyboard '{keyboard}': {} not found. Use 'kbconf keyboards' to list keyboards.",
                path.display()
            );
        }
        let content =
            std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        Manifest::from_json_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    /// Include directories for a keyboard, driver and keyboard headers
    /// first.
    pub fn include_dirs(&self, driver: &str, keyboard: &str) -> Vec<String> {
        let paths = &self.config.paths;
        vec![
            format!("{}/{driver}", paths.hardware),
            format!("{}/{keyboard}", paths.keyboards),
            paths.include.clone(),
        ]
    }

    /// Names of all keyboards with a manifest, sorted.
    pub fn keyboards(&self) -> Result<Vec<String>> {
        let dir = self.root.join(&self.config.paths.keyboards);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&dir).with_context(|| format!("reading {}", dir.display()))? {
            let entry = entry?;
            if entry.path().join(MANIFEST_FILE).is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
[paths]
keyboards = "boards"
hardware = "src/hardware"
include = "src/include"

[build]
default_keyboard = "he60"

[platformio]
upload_protocol = "stlink"
lib_deps = ["tinyusb"]
build_src_flags = ["-Wall"]
extra_scripts = ["pre:scripts/metadata.py"]
"#;
        let config = ProjectConfig::from_str(toml_str).unwrap();
        assert_eq!(config.paths.keyboards, "boards");
        assert_eq!(config.paths.hardware, "src/hardware");
        assert_eq!(config.build.default_keyboard.as_deref(), Some("he60"));
        assert_eq!(config.platformio.upload_protocol, "stlink");
        assert_eq!(config.platformio.extra_scripts.len(), 1);
    }

    #[test]
    fn parse_empty_config() {
        let config = ProjectConfig::from_str("").unwrap();
        assert_eq!(config.paths.keyboards, "keyboards");
        assert_eq!(config.paths.include, "include");
        assert!(config.build.default_keyboard.is_none());
        assert_eq!(config.platformio.upload_protocol, "dfu");
        assert_eq!(config.platformio.lib_deps.len(), 1);
        assert!(config.platformio.build_src_flags.contains(&"-Werror".to_string()));
    }

    #[test]
    fn reject_invalid_toml() {
        assert!(ProjectConfig::from_str("this is not valid toml [[[").is_err());
    }

    #[test]
    fn find_and_load_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[build]\ndefault_keyboard = \"he60\"\n",
        )
        .unwrap();
        let nested = dir.path().join("keyboards").join("he60");
        std::fs::create_dir_all(&nested).unwrap();

        let (config, found_dir) = ProjectConfig::find_and_load(&nested).unwrap().unwrap();
        assert_eq!(config.build.default_keyboard.as_deref(), Some("he60"));
        assert_eq!(found_dir, dir.path());
    }

    #[test]
    fn resolve_keyboard_prefers_argument() {
        let mut project = Project {
            config: ProjectConfig::default(),
            root: PathBuf::from("."),
        };
        assert!(project.resolve_keyboard(None).is_err());
        project.config.build.default_keyboard = Some("he60".into());
        assert_eq!(project.resolve_keyboard(None).unwrap(), "he60");
        assert_eq!(project.resolve_keyboard(Some("gauss60")).unwrap(), "gauss60");
    }

    #[test]
    fn include_dirs_follow_layout() {
        let project = Project {
            config: ProjectConfig::default(),
            root: PathBuf::from("."),
        };
        assert_eq!(
            project.include_dirs("stm32f446xx", "he60"),
            vec!["hardware/stm32f446xx", "keyboards/he60", "include"]
        );
    }

    #[test]
    fn keyboards_lists_only_manifests() {
        let dir = tempfile::tempdir().unwrap();
        let keyboards = dir.path().join("keyboards");
        for name in ["he60", "gauss60", "notes"] {
            std::fs::create_dir_all(keyboards.join(name)).unwrap();
        }
        std::fs::write(keyboards.join("he60").join(MANIFEST_FILE), "{}").unwrap();
        std::fs::write(keyboards.join("gauss60").join(MANIFEST_FILE), "{}").unwrap();

        let project = Project::discover(dir.path()).unwrap();
        assert_eq!(project.keyboards().unwrap(), vec!["gauss60", "he60"]);
    }

    #[test]
    fn load_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let project = Project::discover(dir.path()).unwrap();
        let err = project.load_manifest("he60").unwrap_err();
        assert!(err.to_string().contains("unknown keyboard 'he60'"));
    }
}
