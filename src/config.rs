use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AnnotateError, Result};
use crate::scale::ScalePolicy;

/// Tunables for a review session. Every field has a default, so a config
/// file only needs the keys it wants to change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// One export class per key; the class directory is the key uppercased.
    pub class_keys: Vec<char>,
    /// Where reviewed source images are moved to.
    pub used_dir: String,
    pub max_width: u32,
    pub max_height: u32,
    /// Smallest crop side, in original-image pixels.
    pub min_square_px: u32,
    pub scale_policy: ScalePolicy,
    /// File extensions picked up by the directory scan, without the dot.
    pub extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            class_keys: vec!['a', 'b', 'c', 'd', 'x'],
            used_dir: "_used".into(),
            max_width: 1600,
            max_height: 800,
            min_square_px: 128,
            scale_policy: ScalePolicy::IntegerCeil,
            extensions: vec!["jpg".into(), "jpeg".into(), "png".into()],
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|source| AnnotateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config =
            serde_json::from_str(&data).map_err(|source| AnnotateError::Config {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_width == 0 || self.max_height == 0 {
            return Err(AnnotateError::InvalidInput(
                "display box must be at least 1x1".into(),
            ));
        }
        if self.class_keys.is_empty() {
            return Err(AnnotateError::InvalidInput("no class keys configured".into()));
        }
        if let Some(key) = self.class_keys.iter().find(|c| !c.is_ascii_alphanumeric()) {
            return Err(AnnotateError::InvalidInput(format!(
                "class key {key:?} is not a letter or digit"
            )));
        }
        Ok(())
    }

    /// Looks up the configured class for a typed key, ignoring case.
    pub fn class_for(&self, key: char) -> Option<char> {
        self.class_keys
            .iter()
            .copied()
            .find(|c| c.eq_ignore_ascii_case(&key))
    }

    pub fn class_dir(&self, root: &Path, class: char) -> PathBuf {
        root.join(class.to_ascii_uppercase().to_string())
    }

    pub fn used_path(&self, root: &Path) -> PathBuf {
        root.join(&self.used_dir)
    }
}
