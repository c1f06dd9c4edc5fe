use crate::{
	consts::{DATA_URI_SCHEME, MAXIMUM_DECODED_SIZE},
	error::{Error, Result},
};

use base64::{
	alphabet,
	engine::{
		general_purpose::{GeneralPurpose, GeneralPurposeConfig},
		DecodePaddingMode,
	},
	Engine as _,
};

/// Browsers and most clients pad, some mobile capture libraries don't.
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
	&alphabet::STANDARD,
	GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Strips an optional `data:<media type>;base64,` prefix, returning the base64 body.
pub fn strip_data_uri(payload: &[u8]) -> Result<&[u8]> {
	let payload = payload.trim_ascii();

	let has_scheme = payload.len() >= DATA_URI_SCHEME.len()
		&& payload[..DATA_URI_SCHEME.len()].eq_ignore_ascii_case(DATA_URI_SCHEME.as_bytes());

	if !has_scheme {
		return Ok(payload);
	}

	payload
		.iter()
		.position(|&b| b == b',')
		.map(|comma| &payload[comma + 1..])
		.ok_or(Error::MalformedDataUri)
}

/// Turns a transport-encoded payload into the raw bytes of the encoded image.
pub fn decode_payload(payload: &[u8]) -> Result<Vec<u8>> {
	let body = strip_data_uri(payload)?;

	// Line-wrapped base64 (MIME style) is common when photos come from older clients
	let body = body
		.iter()
		.copied()
		.filter(|b| !b.is_ascii_whitespace())
		.collect::<Vec<_>>();

	if body.is_empty() {
		return Err(Error::Empty);
	}

	if u64::try_from(base64::decoded_len_estimate(body.len())).unwrap_or(u64::MAX)
		> MAXIMUM_DECODED_SIZE
	{
		return Err(Error::TooLarge);
	}

	Ok(LENIENT_STANDARD.decode(body)?)
}
