//! Synthetic photo payloads for tests.

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

const SIDE: u32 = 32;

/// A small image with enough structure to be embedded; different seeds give different images.
#[must_use]
pub fn sample_face(seed: u8) -> DynamicImage {
	let seed = u32::from(seed);
	DynamicImage::ImageRgb8(RgbImage::from_fn(SIDE, SIDE, |x, y| {
		let wave = (x * (seed + 3) + y * (seed * 7 + 1)) % 256;
		Rgb([
			u8::try_from(wave).unwrap_or(u8::MAX),
			u8::try_from((x * 8) % 256).unwrap_or(u8::MAX),
			u8::try_from((y * 8 + seed) % 256).unwrap_or(u8::MAX),
		])
	}))
}

/// A single-colour image, which carries no subject at all.
#[must_use]
pub fn flat_image(value: u8) -> DynamicImage {
	DynamicImage::ImageRgb8(RgbImage::from_pixel(SIDE, SIDE, Rgb([value; 3])))
}

#[must_use]
pub fn to_base64_png(image: &DynamicImage) -> String {
	let mut bytes = Vec::new();
	image
		.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
		.expect("encoding a PNG into memory can't fail");
	STANDARD.encode(bytes)
}

#[must_use]
pub fn to_data_uri(image: &DynamicImage) -> String {
	format!("data:image/png;base64,{}", to_base64_png(image))
}
