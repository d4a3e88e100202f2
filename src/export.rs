use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::config::Config;
use crate::error::{AnnotateError, Result};
use crate::selection::Selection;
use crate::session::ImageView;
use crate::transform::PixelRect;

/// Destination for exported crops.
pub trait CropWriter {
    fn write(&mut self, path: &Path, image: &DynamicImage) -> Result<()>;
}

/// Saves crops to disk, format taken from the file extension.
pub struct FileWriter;

impl CropWriter for FileWriter {
    fn write(&mut self, path: &Path, image: &DynamicImage) -> Result<()> {
        image.save(path).map_err(|source| AnnotateError::Encode {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// `{x_start}_{y_start}_{side}_{file_name}`, with the start corner as drawn.
pub fn export_name(selection: &Selection, file_name: &str) -> String {
    format!(
        "{}_{}_{}_{}",
        selection.x_start,
        selection.y_start,
        selection.x_start.abs_diff(selection.x_end),
        file_name
    )
}

/// The finalized selection and the original-image pixels it covers.
pub fn bounded_region(view: &ImageView) -> Result<(Selection, PixelRect)> {
    let selection = *view.selection.finalized().ok_or(AnnotateError::NoSelection)?;
    let region = view.transform.to_original_rect(&selection);
    let (width, height) = (view.original.width(), view.original.height());
    if region.is_empty() || !region.fits_within(width, height) {
        return Err(AnnotateError::InvalidRegion {
            region,
            width,
            height,
        });
    }
    Ok((selection, region))
}

/// Writes the selected part of the original image into the class directory
/// bound to `key` and returns the new file's path.
pub fn export(
    view: &ImageView,
    root: &Path,
    config: &Config,
    key: char,
    writer: &mut impl CropWriter,
) -> Result<PathBuf> {
    let class = config
        .class_for(key)
        .ok_or_else(|| AnnotateError::InvalidInput(format!("no class bound to {key:?}")))?;
    let (selection, region) = bounded_region(view)?;

    let crop = view
        .original
        .crop_imm(region.x, region.y, region.width, region.height);
    let path = config
        .class_dir(root, class)
        .join(export_name(&selection, &view.file_name));
    writer.write(&path, &crop)?;

    log::info!(
        "Exported {}x{} crop at ({}, {}) to {}",
        region.width,
        region.height,
        region.x,
        region.y,
        path.display()
    );
    Ok(path)
}
