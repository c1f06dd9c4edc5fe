use image::ImageFormat;

/// Raster formats we accept for registration photos.
///
/// The format is sniffed from the decoded bytes, never trusted from the data URI media type.
pub const SUPPORTED_FORMATS: [ImageFormat; 6] = [
	ImageFormat::Png,
	ImageFormat::Jpeg,
	ImageFormat::Gif,
	ImageFormat::Bmp,
	ImageFormat::WebP,
	ImageFormat::Tiff,
];

/// The maximum size a decoded photo can be before we refuse to look at it.
///
/// This value is in MiB.
pub(crate) const MAXIMUM_DECODED_SIZE: u64 = MIB * 24;

/// Every data URI starts with this scheme
pub(crate) const DATA_URI_SCHEME: &str = "data:";

/// The size of 1MiB in bytes
const MIB: u64 = 1_048_576;
