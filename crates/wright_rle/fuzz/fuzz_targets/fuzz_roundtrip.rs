#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use wright_rle::color::{is_light, quantize};
use wright_rle::decoder::{MONO_BLACK, MONO_WHITE};
use wright_rle::{decode, encode, RasterImage, Variant};

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    width: u8,
    height: u8,
    color: bool,
    pixels: Vec<u8>,
}

fuzz_target!(|input: FuzzInput| {
    let width = (input.width as usize).min(64);
    let height = (input.height as usize).min(64);

    // Ensure we have enough pixels (RGBA = 4 bytes per pixel)
    let expected_size = width * height * 4;
    if input.pixels.len() < expected_size {
        return;
    }

    let pixels = input.pixels[..expected_size].to_vec();
    let image = match RasterImage::from_rgba(pixels, width, height) {
        Ok(img) => img,
        Err(_) => return,
    };
    let variant = if input.color {
        Variant::Color
    } else {
        Variant::Monochrome
    };

    // Encoding a valid image must always succeed and decode again
    let sprite = encode(&image, variant).expect("encode");
    let decoded = decode(&sprite.data).expect("decode");
    assert_eq!(decoded.width, width);
    assert_eq!(decoded.height, height);

    for (px, back) in image.rgba_pixels().zip(decoded.rgba_pixels()) {
        let expected = match variant {
            Variant::Color => quantize(px),
            Variant::Monochrome if is_light(px) => MONO_WHITE,
            Variant::Monochrome => MONO_BLACK,
        };
        assert_eq!(back, expected, "source pixel {px:?}");
    }
});
