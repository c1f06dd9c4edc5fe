use crate::embedder::{Embedder, Embedding, EmbeddingError};

use image::{imageops::FilterType, DynamicImage};

/// Below this luminance standard deviation (on a 0..1 scale) there is nothing to describe.
const MINIMUM_CONTRAST: f32 = 1e-3;

/// Deterministic stand-in for a trained face model.
///
/// The photo is downscaled to a fixed greyscale grid whose mean-centred, unit-length
/// luminance values form the embedding. Same pixels in, same vector out, which is all
/// the assembly and storage layers rely on.
#[derive(Debug, Clone, Copy)]
pub struct ThumbnailEmbedder {
	width: u32,
	height: u32,
}

impl ThumbnailEmbedder {
	#[must_use]
	pub const fn new(width: u32, height: u32) -> Self {
		Self { width, height }
	}
}

impl Default for ThumbnailEmbedder {
	/// 16x32 cells, taller than wide like a head, for 512 dimensions.
	fn default() -> Self {
		Self::new(16, 32)
	}
}

impl Embedder for ThumbnailEmbedder {
	fn dimensions(&self) -> usize {
		usize::try_from(self.width * self.height).unwrap_or(usize::MAX)
	}

	fn embed(&self, image: &DynamicImage) -> Result<Embedding, EmbeddingError> {
		if image.width() == 0 || image.height() == 0 {
			return Err(EmbeddingError::EmptyImage);
		}

		let mut cells = image
			.resize_exact(self.width, self.height, FilterType::Triangle)
			.to_luma32f()
			.into_raw();

		#[allow(clippy::cast_precision_loss)]
		let count = cells.len() as f32;
		let mean = cells.iter().sum::<f32>() / count;
		cells.iter_mut().for_each(|cell| *cell -= mean);

		let deviation = (cells.iter().map(|cell| cell * cell).sum::<f32>() / count).sqrt();
		if deviation < MINIMUM_CONTRAST {
			return Err(EmbeddingError::NoSubject);
		}

		Embedding::normalize(cells)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::embedder::{EMBEDDING_DIMENSIONS, NORM_TOLERANCE};

	use fr_images::test_utils::{flat_image, sample_face};
	use pretty_assertions::assert_eq;

	#[test]
	fn default_grid_has_published_dimensions() {
		assert_eq!(ThumbnailEmbedder::default().dimensions(), EMBEDDING_DIMENSIONS);
	}

	#[test]
	fn embeddings_are_unit_length_and_deterministic() {
		let embedder = ThumbnailEmbedder::default();
		let image = sample_face(7);

		let first = embedder.embed(&image).unwrap();
		let second = embedder.embed(&image).unwrap();

		assert_eq!(first.len(), EMBEDDING_DIMENSIONS);
		assert!((first.norm() - 1.0).abs() <= NORM_TOLERANCE);
		assert_eq!(first, second);
	}

	#[test]
	fn different_photos_give_different_embeddings() {
		let embedder = ThumbnailEmbedder::default();

		assert_ne!(
			embedder.embed(&sample_face(1)).unwrap(),
			embedder.embed(&sample_face(2)).unwrap()
		);
	}

	#[test]
	fn flat_photo_has_no_subject() {
		assert!(matches!(
			ThumbnailEmbedder::default().embed(&flat_image(90)),
			Err(EmbeddingError::NoSubject)
		));
	}

	#[test]
	fn empty_photo_is_rejected() {
		assert!(matches!(
			ThumbnailEmbedder::default().embed(&DynamicImage::new_rgb8(0, 0)),
			Err(EmbeddingError::EmptyImage)
		));
	}
}
