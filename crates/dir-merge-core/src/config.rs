use config::{Config, ConfigBuilder, ConfigError, Environment, File as ConfigFile};
use config::builder::DefaultState;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Roots used when none are given on the command line.
    pub root_paths: Vec<String>,
    /// Glob patterns; matching files and directories are not indexed.
    pub ignore_patterns: Vec<String>,
    /// Where reports and the merge plan are written.
    pub output_dir: PathBuf,
    /// Fail on a pair the relation table cannot classify instead of
    /// recording it as `Distinct`.
    pub strict_taxonomy: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            root_paths: Vec::new(),
            ignore_patterns: Vec::new(),
            output_dir: PathBuf::from(".results"),
            strict_taxonomy: false,
        }
    }
}

/// Load `Config.toml` (optional) overlaid with `DIR_MERGE_*` environment variables.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder().add_source(ConfigFile::with_name("Config").required(false));
    finish(builder)
}

/// Load configuration from an explicit TOML file instead of `Config.toml`.
pub fn load_configuration_from(path: &Path) -> Result<AppConfig, ConfigError> {
    let builder = Config::builder().add_source(ConfigFile::from(path).required(true));
    finish(builder)
}

fn finish(builder: ConfigBuilder<DefaultState>) -> Result<AppConfig, ConfigError> {
    builder
        .add_source(
            Environment::with_prefix("DIR_MERGE")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("root_paths")
                .with_list_parse_key("ignore_patterns"),
        )
        .build()?
        .try_deserialize::<AppConfig>()
}

/// Remove directories that are subdirectories of other directories in the list.
pub fn non_overlapping_directories(dirs: Vec<String>) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();

    for dir in dirs {
        let dir_path = Path::new(&dir);

        if result.iter().any(|res_dir| dir_path.starts_with(res_dir)) {
            continue;
        }

        result.retain(|res_dir| !Path::new(res_dir).starts_with(dir_path));
        result.push(dir);
    }

    result
}
