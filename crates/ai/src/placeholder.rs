use crate::embedder::{Embedder, Embedding, EmbeddingError, EMBEDDING_DIMENSIONS};

use image::DynamicImage;
use rand::Rng;

/// Placeholder that returns a random unit vector for any non-empty photo.
///
/// Non-deterministic: two registrations of the same photo won't match. It exists to
/// exercise the pipeline end to end and MUST be replaced by a real model before any
/// similarity search is trusted.
#[derive(Debug, Clone, Copy)]
pub struct RandomEmbedder {
	dimensions: usize,
}

impl RandomEmbedder {
	#[must_use]
	pub const fn new(dimensions: usize) -> Self {
		Self { dimensions }
	}
}

impl Default for RandomEmbedder {
	fn default() -> Self {
		Self::new(EMBEDDING_DIMENSIONS)
	}
}

impl Embedder for RandomEmbedder {
	fn dimensions(&self) -> usize {
		self.dimensions
	}

	fn embed(&self, image: &DynamicImage) -> Result<Embedding, EmbeddingError> {
		if image.width() == 0 || image.height() == 0 {
			return Err(EmbeddingError::EmptyImage);
		}

		let mut rng = rand::thread_rng();
		Embedding::normalize(
			(0..self.dimensions)
				.map(|_| rng.gen_range(-1.0_f32..1.0))
				.collect(),
		)
	}
}
