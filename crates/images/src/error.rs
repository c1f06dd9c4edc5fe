pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
	#[error("the payload is empty")]
	Empty,
	#[error("the payload starts with a data URI scheme but has no `,` separator")]
	MalformedDataUri,
	#[error("the payload is not valid base64: {0}")]
	Base64(#[from] base64::DecodeError),
	#[error("the image provided is too large (over 24MiB)")]
	TooLarge,
	#[error("the image format could not be recognised")]
	UnknownFormat,
	#[error("the image format {0:?} is unsupported")]
	Unsupported(image::ImageFormat),
	#[error("error while loading the image (via the `image` crate): {0}")]
	Image(#[from] image::ImageError),
}
