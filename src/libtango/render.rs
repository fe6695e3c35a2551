use std::path::Path;

use image::{DynamicImage, ImageReader};
use log::debug;

use crate::libtango::Error;

/// Loads a card image and scales it to fit inside `max_width` × `max_height`
/// preserving aspect ratio. A file that has gone missing since the card was
/// created surfaces as [`Error::ImageLoad`]; a file that no longer decodes
/// surfaces as [`Error::ImageDecode`]. The deck is never mutated here.
pub fn fit_preview(path: &Path, max_width: u32, max_height: u32) -> Result<DynamicImage, Error> {
    if !path.is_file() {
        return Err(Error::ImageLoad(path.to_path_buf()));
    }
    let decoded = ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|err| Error::ImageDecode {
            path: path.to_path_buf(),
            source: err,
        })?;
    debug!(
        "[Render] {:?}: {}x{} -> fit {}x{}",
        path,
        decoded.width(),
        decoded.height(),
        max_width,
        max_height
    );
    Ok(decoded.thumbnail(max_width, max_height))
}
