//! Image widget: pixels packed into the atlas and drawn as one quad.

use image::ImageFormat;

use crate::dom::{NodeData, NodeId};
use crate::error::{Error, Result};
use crate::geometry::Region;
use crate::screen::Screen;
use crate::widget::{Paint, Widget};

/// An image stretched over its bounds.
///
/// The pixels live in the shared atlas for as long as the widget does;
/// deleting it frees the rectangle and defragments the atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageView {
    id: NodeId,
    source: Region,
}

impl ImageView {
    /// Pack `pixels` (`width` × `height`, in the atlas's channel layout) and
    /// create the widget under `parent`.
    ///
    /// # Panics
    ///
    /// Panics when `pixels` does not match the given size.
    pub fn new(
        screen: &mut Screen,
        parent: NodeId,
        bounds: Region,
        pixels: &[u8],
        width: i32,
        height: i32,
    ) -> Self {
        let origin = screen.surface_mut().atlas_mut().build(pixels, width, height);
        let source = Region::new(origin.x, origin.y, width, height);
        let mut data = NodeData::new("Image")
            .with_bounds(bounds)
            .with_paint(Paint::Image { source });
        data.atlas_region = Some(source);
        let id = screen.spawn(parent, data);
        Self { id, source }
    }

    /// Decode a PNG into the atlas's channel layout and create the widget.
    pub fn from_png(screen: &mut Screen, parent: NodeId, bounds: Region, png: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory_with_format(png, ImageFormat::Png)?;
        let (width, height) = (decoded.width() as i32, decoded.height() as i32);
        let pixels = match screen.surface().atlas().components() {
            1 => decoded.into_luma8().into_raw(),
            3 => decoded.into_rgb8().into_raw(),
            4 => decoded.into_rgba8().into_raw(),
            other => return Err(Error::UnsupportedFormat(other)),
        };
        Ok(Self::new(screen, parent, bounds, &pixels, width, height))
    }

    /// Where the pixels sit in the atlas.
    pub fn source(&self) -> Region {
        self.source
    }
}

impl Widget for ImageView {
    fn id(&self) -> NodeId {
        self.id
    }

    fn widget_type(&self) -> &'static str {
        "Image"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppConfig;
    use crate::widget::WidgetExt;
    use image::{DynamicImage, Rgba, RgbaImage};
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn rgba(w: i32, h: i32, fill: u8) -> Vec<u8> {
        vec![fill; (w * h * 4) as usize]
    }

    #[test]
    fn pixels_land_in_atlas() {
        let mut screen = Screen::new(&AppConfig::default());
        let body = screen.body();
        let image = ImageView::new(&mut screen, body, Region::new(0, 0, 32, 32), &rgba(8, 8, 0xab), 8, 8);
        let src = image.source();
        assert_eq!(screen.surface().atlas().pixel(src.x + 7, src.y + 7), &[0xab; 4]);
    }

    #[test]
    fn delete_frees_and_reuses_atlas_space() {
        let mut screen = Screen::new(&AppConfig::default());
        let body = screen.body();
        let placed_before = screen.surface().atlas().placed_rects().len();

        let image = ImageView::new(&mut screen, body, Region::new(0, 0, 16, 16), &rgba(16, 16, 1), 16, 16);
        let first = image.source();
        image.delete(&mut screen);
        assert_eq!(screen.surface().atlas().placed_rects().len(), placed_before);

        let again = ImageView::new(&mut screen, body, Region::new(0, 0, 16, 16), &rgba(16, 16, 2), 16, 16);
        assert_eq!(again.source(), first);
    }

    #[test]
    fn png_is_decoded_into_the_atlas() {
        let mut png = Vec::new();
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 255])))
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();

        let mut screen = Screen::new(&AppConfig::default());
        let body = screen.body();
        let image = ImageView::from_png(&mut screen, body, Region::new(0, 0, 3, 2), &png).unwrap();
        let src = image.source();
        assert_eq!((src.width, src.height), (3, 2));
        assert_eq!(screen.surface().atlas().pixel(src.x + 2, src.y + 1), &[10, 20, 30, 255]);
    }

    #[test]
    fn corrupt_png_is_an_error() {
        let mut screen = Screen::new(&AppConfig::default());
        let body = screen.body();
        let nodes = screen.dom().len();
        let result = ImageView::from_png(&mut screen, body, Region::new(0, 0, 4, 4), b"not a png");
        assert!(matches!(result, Err(Error::Image(_))));
        assert_eq!(screen.dom().len(), nodes);
    }
}
