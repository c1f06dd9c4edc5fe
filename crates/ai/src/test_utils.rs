//! Deterministic embedders for tests.

use crate::embedder::{Embedder, Embedding, EmbeddingError};

use image::DynamicImage;

/// Describes a photo by its mean colour and aspect ratio.
///
/// Cheap, deterministic and small enough to read in assertion failures.
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeEmbedder;

impl FakeEmbedder {
	pub const DIMENSIONS: usize = 4;
}

impl Embedder for FakeEmbedder {
	fn dimensions(&self) -> usize {
		Self::DIMENSIONS
	}

	fn embed(&self, image: &DynamicImage) -> Result<Embedding, EmbeddingError> {
		if image.width() == 0 || image.height() == 0 {
			return Err(EmbeddingError::EmptyImage);
		}

		let rgb = image.to_rgb8();
		let mut sums = [0_f64; 3];
		for pixel in rgb.pixels() {
			for (sum, channel) in sums.iter_mut().zip(pixel.0) {
				*sum += f64::from(channel);
			}
		}

		let count = f64::from(image.width()) * f64::from(image.height()) * 255.0;
		let aspect = f64::from(image.width()) / f64::from(image.height());

		#[allow(clippy::cast_possible_truncation)]
		Embedding::normalize(
			[sums[0] / count, sums[1] / count, sums[2] / count, aspect]
				.into_iter()
				.map(|value| value as f32)
				.collect(),
		)
	}
}

/// Finds no subject in anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectingEmbedder;

impl Embedder for RejectingEmbedder {
	fn dimensions(&self) -> usize {
		FakeEmbedder::DIMENSIONS
	}

	fn embed(&self, _: &DynamicImage) -> Result<Embedding, EmbeddingError> {
		Err(EmbeddingError::NoSubject)
	}
}

/// Breaks the output contract by returning one value too few.
#[derive(Debug, Clone, Copy, Default)]
pub struct WrongDimensionsEmbedder;

impl Embedder for WrongDimensionsEmbedder {
	fn dimensions(&self) -> usize {
		FakeEmbedder::DIMENSIONS
	}

	fn embed(&self, _: &DynamicImage) -> Result<Embedding, EmbeddingError> {
		Embedding::normalize(vec![1.0; FakeEmbedder::DIMENSIONS - 1])
	}
}
