#![warn(
	clippy::all,
	clippy::pedantic,
	clippy::correctness,
	clippy::perf,
	clippy::style,
	clippy::suspicious,
	clippy::complexity,
	clippy::nursery,
	clippy::unwrap_used,
	unused_qualifications,
	rust_2018_idioms,
	clippy::expect_used,
	trivial_casts,
	trivial_numeric_casts,
	unused_allocation,
	clippy::as_conversions,
	clippy::dbg_macro
)]
#![forbid(unsafe_code)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

//! Image decoding for registration photos.
//!
//! Photos travel as base64 text, optionally wrapped in a data URI. Everything in here
//! returns a typed [`Error`] instead of panicking so callers can degrade per photo.

mod consts;
mod decoder;
mod error;
mod payload;

#[cfg(any(test, feature = "test-utils"))]
#[allow(clippy::expect_used)]
pub mod test_utils;

pub use consts::SUPPORTED_FORMATS;
pub use decoder::{decode, load_from_bytes};
pub use error::{Error, Result};
pub use image::DynamicImage;
pub use payload::{decode_payload, strip_data_uri};
