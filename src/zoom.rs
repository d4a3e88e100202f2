use crate::config::Config;
use crate::error::{AnnotateError, Result};
use crate::export::bounded_region;
use crate::scale;
use crate::session::{render, ImageView};
use crate::transform::Transform;

/// Replaces the view with the selected part of the original image, scaled to
/// fit the display box. Only one zoom level is allowed; `Reset` leaves it.
///
/// The new offset is the selection's top-left corner in original space, so
/// it already includes whatever offset was in effect before.
pub fn zoom(view: &mut ImageView, config: &Config) -> Result<()> {
    if view.zoomed {
        return Err(AnnotateError::AlreadyZoomed);
    }
    let (selection, region) = bounded_region(view)?;
    let (top_left, _) = selection.normalized();
    let offset = view.transform.to_original(top_left);

    let crop = view
        .original
        .crop_imm(region.x, region.y, region.width, region.height);
    let scale = scale::compute(
        crop.width(),
        crop.height(),
        config.max_width,
        config.max_height,
        config.scale_policy,
    )?;
    let display = render(&crop, scale);

    view.display = display;
    view.transform = Transform {
        scale,
        offset_x: offset.x,
        offset_y: offset.y,
    };
    view.selection.clear();
    view.zoomed = true;
    view.revision += 1;

    log::debug!(
        "Zoomed into {}x{} at ({}, {}), scale 1/{}",
        region.width,
        region.height,
        offset.x,
        offset.y,
        scale.divisor()
    );
    Ok(())
}
