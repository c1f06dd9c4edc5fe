use image::DynamicImage;

/// Dimensionality of every embedder we ship
pub const EMBEDDING_DIMENSIONS: usize = 512;

/// How far from 1.0 an embedding's L2 norm may drift
pub const NORM_TOLERANCE: f32 = 1e-5;

#[derive(thiserror::Error, Debug)]
pub enum EmbeddingError {
	#[error("the image has no pixels")]
	EmptyImage,
	#[error("no subject detected in the image")]
	NoSubject,
	#[error("the embedding has zero or non-finite magnitude")]
	Degenerate,
	#[error("embedder produced {got} dimensions, expected {expected}")]
	Dimensions { expected: usize, got: usize },
	#[error("embedding norm {0} is not within tolerance of 1")]
	NotNormalized(f32),
}

/// Maps one decoded photo to a fixed-length, unit-length vector.
///
/// Implementations must always return exactly [`Embedder::dimensions`] values and must
/// never substitute zeros on failure; falling back is the caller's decision.
pub trait Embedder: Send + Sync {
	fn dimensions(&self) -> usize;

	fn embed(&self, image: &DynamicImage) -> Result<Embedding, EmbeddingError>;
}

/// A unit-length feature vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding(Vec<f32>);

impl Embedding {
	/// Scales `values` to unit length.
	pub fn normalize(values: Vec<f32>) -> Result<Self, EmbeddingError> {
		let norm = l2_norm(&values);
		if !norm.is_finite() || norm == 0.0 {
			return Err(EmbeddingError::Degenerate);
		}

		let norm = f64::from(norm);
		#[allow(clippy::cast_possible_truncation)]
		let values = values
			.into_iter()
			.map(|value| (f64::from(value) / norm) as f32)
			.collect();

		Ok(Self(values))
	}

	#[must_use]
	pub fn as_slice(&self) -> &[f32] {
		&self.0
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	#[must_use]
	pub fn norm(&self) -> f32 {
		l2_norm(&self.0)
	}

	#[must_use]
	pub fn into_inner(self) -> Vec<f32> {
		self.0
	}

	/// Checks the output contract every [`Embedder`] promises.
	pub fn verify(self, dimensions: usize) -> Result<Self, EmbeddingError> {
		if self.len() != dimensions {
			return Err(EmbeddingError::Dimensions {
				expected: dimensions,
				got: self.len(),
			});
		}

		let norm = self.norm();
		if (norm - 1.0).abs() > NORM_TOLERANCE {
			return Err(EmbeddingError::NotNormalized(norm));
		}

		Ok(self)
	}
}

/// Euclidean length, accumulated in `f64` so long vectors don't lose precision.
#[must_use]
pub fn l2_norm(values: &[f32]) -> f32 {
	#[allow(clippy::cast_possible_truncation)]
	let norm = values
		.iter()
		.map(|&value| f64::from(value).powi(2))
		.sum::<f64>()
		.sqrt() as f32;

	norm
}
