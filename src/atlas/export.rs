//! Debug raster export of the atlas canvas.

use std::path::Path;

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage, RgbaImage};

use super::Atlas;
use crate::error::{Error, Result};

impl Atlas {
    /// Copy the canvas into an [`image`] buffer.
    ///
    /// One component maps to luma, three to RGB and four to RGBA.
    pub fn to_image(&self) -> Result<DynamicImage> {
        let (w, h) = (self.width() as u32, self.height() as u32);
        let raw = self.pixels().to_vec();
        let image = match self.components() {
            1 => GrayImage::from_raw(w, h, raw).map(DynamicImage::ImageLuma8),
            3 => RgbImage::from_raw(w, h, raw).map(DynamicImage::ImageRgb8),
            4 => RgbaImage::from_raw(w, h, raw).map(DynamicImage::ImageRgba8),
            _ => None,
        };
        image.ok_or(Error::UnsupportedFormat(self.components()))
    }

    /// Write the canvas to `path` as a PNG.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.to_image()?
            .save_with_format(path, ImageFormat::Png)
            .map_err(|source| Error::Export { path: path.to_path_buf(), source })?;
        tracing::debug!(path = %path.display(), width = self.width(), height = self.height(), "atlas exported");
        Ok(())
    }
}
