//! Generator settings loaded from a TOML file

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// LaTeX engine used to compile the markup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    #[default]
    Pdflatex,
    Xelatex,
    Lualatex,
}

impl Engine {
    /// Executable name
    pub fn command(self) -> &'static str {
        match self {
            Self::Pdflatex => "pdflatex",
            Self::Xelatex => "xelatex",
            Self::Lualatex => "lualatex",
        }
    }

    /// Whether the engine can load font files through `fontspec`
    pub fn supports_font_files(self) -> bool {
        !matches!(self, Self::Pdflatex)
    }
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.command())
    }
}

/// TeX interaction mode passed as `-interaction=<mode>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    Batchmode,
    #[default]
    Nonstopmode,
    Scrollmode,
    Errorstopmode,
}

impl InteractionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Batchmode => "batchmode",
            Self::Nonstopmode => "nonstopmode",
            Self::Scrollmode => "scrollmode",
            Self::Errorstopmode => "errorstopmode",
        }
    }
}

/// Resolved generator settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Output, temporary and font directories
    pub directories: Directories,

    /// Engine and pass configuration
    pub compilation: Compilation,

    /// Cleanup policy for intermediate files
    pub file_management: FileManagement,

    /// Decoding of engine output
    pub encoding: Encoding,
}

/// Directory layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Directories {
    /// Where compiled artifacts (and provisioned images/fonts) are placed
    pub output_dir: PathBuf,

    /// Scratch directory; defaults to the output directory when unset
    pub temp_dir: Option<PathBuf>,

    /// Directory name for provisioned fonts, relative to the output directory
    pub fonts_dir: PathBuf,
}

impl Default for Directories {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            temp_dir: None,
            fonts_dir: PathBuf::from("fonts"),
        }
    }
}

/// Compiler invocation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Compilation {
    /// Default engine for new documents
    pub engine: Engine,

    /// Number of passes (cross-references need at least two)
    pub compile_times: u32,

    /// TeX interaction mode
    pub interaction_mode: InteractionMode,

    /// Extra command-line arguments passed to the engine
    pub extra_options: Vec<String>,

    /// Seconds a single engine pass may run before it is killed
    pub timeout_secs: u64,
}

impl Default for Compilation {
    fn default() -> Self {
        Self {
            engine: Engine::default(),
            compile_times: 2,
            interaction_mode: InteractionMode::default(),
            extra_options: Vec::new(),
            timeout_secs: 60,
        }
    }
}

/// Engine output decoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Encoding {
    /// Encoding labels tried in order; `cp932` is accepted as Shift_JIS
    pub fallback_encodings: Vec<String>,
}

impl Default for Encoding {
    fn default() -> Self {
        Self {
            fallback_encodings: ["utf-8", "cp932", "shift_jis"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Intermediate-file policy applied after a successful compile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileManagement {
    /// Remove intermediate files at all
    pub cleanup: bool,

    /// Keep the generated `.tex` source
    pub keep_tex: bool,

    /// Keep the engine `.log`
    pub keep_log: bool,

    /// Extensions removed during cleanup
    pub cleanup_extensions: Vec<String>,
}

impl Default for FileManagement {
    fn default() -> Self {
        Self {
            cleanup: true,
            keep_tex: false,
            keep_log: false,
            cleanup_extensions: [".aux", ".log", ".out", ".synctex.gz"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl FileManagement {
    /// Extensions to delete once `keep_tex`/`keep_log` are applied
    pub fn extensions_to_remove(&self) -> Vec<String> {
        let mut extensions: Vec<String> = self
            .cleanup_extensions
            .iter()
            .filter(|ext| !(self.keep_log && ext.as_str() == ".log"))
            .filter(|ext| !(self.keep_tex && ext.as_str() == ".tex"))
            .cloned()
            .collect();
        if !self.keep_tex && !extensions.iter().any(|e| e == ".tex") {
            extensions.push(".tex".to_string());
        }
        if !self.keep_log && !extensions.iter().any(|e| e == ".log") {
            extensions.push(".log".to_string());
        }
        extensions
    }
}

impl Settings {
    /// Load settings from a TOML file; missing keys take their defaults
    ///
    /// # Parameters
    /// * `path` - Path to the settings file
    ///
    /// # Returns
    /// * `Ok(Settings)` - Successfully loaded settings
    /// * `Err(ConfigError)` - Error reading or parsing the file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(&path).map_err(ConfigError::IoError)?;
        Self::from_toml(&content)
    }

    /// Parse settings from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(content).map_err(ConfigError::ParseError)?;
        if settings.compilation.compile_times == 0 {
            return Err(ConfigError::InvalidValue(
                "compilation.compile_times must be at least 1".to_string(),
            ));
        }
        if settings.compilation.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "compilation.timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(settings)
    }

    /// Save settings to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::SerializeError)?;

        fs::write(&path, content).map_err(ConfigError::IoError)?;

        Ok(())
    }

    /// Scratch directory, falling back to the output directory
    pub fn temp_dir(&self) -> &Path {
        self.directories
            .temp_dir
            .as_deref()
            .unwrap_or(&self.directories.output_dir)
    }
}

/// Errors that can occur when loading or saving settings
#[derive(Debug)]
#[allow(clippy::enum_variant_names)]
pub enum ConfigError {
    /// IO error when reading or writing file
    IoError(std::io::Error),

    /// Error parsing TOML
    ParseError(toml::de::Error),

    /// Error serializing to TOML
    SerializeError(toml::ser::Error),

    /// A value parsed but is out of range
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "TOML parse error: {}", e),
            ConfigError::SerializeError(e) => write!(f, "TOML serialize error: {}", e),
            ConfigError::InvalidValue(msg) => write!(f, "invalid setting: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
