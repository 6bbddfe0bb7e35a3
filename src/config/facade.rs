//! Config loading facade: assembles sources in precedence order and deserializes.

use super::merge::merge_policy;
use super::sources::{environment, global_file, workspace_file};
use super::WirecodeConfig;
use config::{ConfigError, File};
use std::path::{Path, PathBuf};

/// Loads [`WirecodeConfig`] once, for the caller to pass down explicitly.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Defaults, then global file, then workspace files, then environment.
    pub fn load(workspace_root: &Path) -> Result<WirecodeConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = environment::add_to_builder(builder);
        builder.build()?.try_deserialize()
    }

    /// Load a single explicit file on top of the defaults; environment still applies.
    pub fn load_from_file(path: &Path) -> Result<WirecodeConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?
            .add_source(File::from(path.to_path_buf()).required(true));
        let builder = environment::add_to_builder(builder);
        builder.build()?.try_deserialize()
    }

    /// Defaults only.
    pub fn defaults() -> Result<WirecodeConfig, ConfigError> {
        merge_policy::builder_with_defaults()?.build()?.try_deserialize()
    }

    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }
}
