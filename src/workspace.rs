//! Filesystem side of a review session: finding images, preparing the class
//! directories, loading pictures and moving reviewed ones out of the way.

use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::config::Config;
use crate::error::{AnnotateError, Result};

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> AnnotateError + '_ {
    move |source| AnnotateError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// Names of the images directly inside `root`, sorted.
pub fn scan_images(root: &Path, extensions: &[String]) -> Result<Vec<String>> {
    if !root.is_dir() {
        return Err(AnnotateError::InvalidPath(root.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(root).map_err(io_error(root))? {
        let entry = entry.map_err(io_error(root))?;
        let path = entry.path();
        if !path.is_file() || !has_extension(&path, extensions) {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => files.push(name),
            Err(name) => log::warn!("Skipping non UTF-8 file name {name:?}"),
        }
    }

    if files.is_empty() {
        return Err(AnnotateError::EmptyDirectory(root.to_path_buf()));
    }
    files.sort();
    Ok(files)
}

/// Creates the per-class directories and the archive directory if missing.
pub fn provision(root: &Path, config: &Config) -> Result<()> {
    let dirs = config
        .class_keys
        .iter()
        .map(|&class| config.class_dir(root, class))
        .chain(std::iter::once(config.used_path(root)));

    for dir in dirs {
        if !dir.is_dir() {
            std::fs::create_dir_all(&dir).map_err(io_error(&dir))?;
            log::debug!("Created {}", dir.display());
        }
    }
    Ok(())
}

/// Moves a reviewed image into the archive directory.
pub fn archive(root: &Path, config: &Config, file_name: &str) -> Result<PathBuf> {
    let from = root.join(file_name);
    let to = config.used_path(root).join(file_name);
    std::fs::rename(&from, &to).map_err(io_error(&from))?;
    Ok(to)
}

pub fn load_image(path: &Path) -> Result<DynamicImage> {
    image::open(path).map_err(|source| AnnotateError::Decode {
        path: path.to_path_buf(),
        source,
    })
}
