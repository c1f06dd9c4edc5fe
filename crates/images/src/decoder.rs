use crate::{
	consts::SUPPORTED_FORMATS,
	error::{Error, Result},
	payload::decode_payload,
};

use image::DynamicImage;
use tracing::trace;

/// Decodes a base64 (optionally data URI prefixed) photo into a pixel grid.
pub fn decode(payload: impl AsRef<[u8]>) -> Result<DynamicImage> {
	let bytes = decode_payload(payload.as_ref())?;
	load_from_bytes(&bytes)
}

/// Loads already binary image bytes, refusing anything outside [`SUPPORTED_FORMATS`].
pub fn load_from_bytes(bytes: &[u8]) -> Result<DynamicImage> {
	let format = image::guess_format(bytes).map_err(|_| Error::UnknownFormat)?;

	if !SUPPORTED_FORMATS.contains(&format) {
		return Err(Error::Unsupported(format));
	}

	let image = image::load_from_memory_with_format(bytes, format)?;
	trace!(
		?format,
		width = image.width(),
		height = image.height(),
		"Decoded photo"
	);

	Ok(image)
}
