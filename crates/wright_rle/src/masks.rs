//! Splitting transparent sprites into black and white ink masks.
//!
//! Monochrome displays cannot blend, so a sprite with transparency is drawn
//! in two passes: the white mask is OR-ed onto the screen and the black
//! mask is cleared from it. Pixels that are transparent belong to neither.

use crate::color::is_light;
use crate::decoder::{MONO_BLACK, MONO_WHITE};
use crate::RasterImage;

/// The two monochrome passes of a transparent sprite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransparencyMasks {
    /// White where the sprite is opaque and light
    pub white: RasterImage,
    /// White where the sprite is opaque and dark
    pub black: RasterImage,
}

/// Splits `image` into its white-ink and black-ink masks.
///
/// A pixel is opaque when its alpha is at least 128; light and dark follow
/// the same luma threshold as monochrome encoding.
pub fn split_transparency(image: &RasterImage) -> TransparencyMasks {
    let mut white = RasterImage::new(image.width, image.height);
    let mut black = RasterImage::new(image.width, image.height);

    for y in 0..image.height {
        for x in 0..image.width {
            let px = image.pixel(x, y);
            let opaque = px[3] >= 128;
            let light = is_light([px[0], px[1], px[2], 255]);

            let (w, b) = match (opaque, light) {
                (true, true) => (MONO_WHITE, MONO_BLACK),
                (true, false) => (MONO_BLACK, MONO_WHITE),
                (false, _) => (MONO_BLACK, MONO_BLACK),
            };
            white.set_pixel(x, y, w);
            black.set_pixel(x, y, b);
        }
    }

    TransparencyMasks { white, black }
}
