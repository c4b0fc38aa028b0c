use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context as _, ensure};
use popstrike_core::config::Config;
use serde::{Deserialize, Serialize};

use crate::app::is_reserved_key;

/// Contents of the settings file.
///
/// Every field is optional; missing ones take their default values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Gameplay parameters.
    pub game: Config,
    /// Seed for note lanes. A random seed is used when unset.
    pub seed: Option<u64>,
}

pub fn from_reader<R: Read>(reader: R) -> Result<Settings, serde_yaml::Error> {
    serde_yaml::from_reader(reader)
}

pub fn load(path: &Path) -> anyhow::Result<Settings> {
    let file = File::open(path).with_context(|| format!("error opening {path:?}"))?;
    let settings = from_reader(file).with_context(|| format!("error parsing {path:?}"))?;
    validate(&settings).with_context(|| format!("invalid settings in {path:?}"))?;
    Ok(settings)
}

/// Checks the game config, and that the lane keys don't shadow the other key bindings.
pub fn validate(settings: &Settings) -> anyhow::Result<()> {
    settings.game.validate()?;

    for key in settings.game.lane_keys {
        ensure!(
            !is_reserved_key(key),
            "lane key {key:?} is already bound to another action"
        );
    }

    Ok(())
}
