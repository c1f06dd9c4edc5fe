//! Face embeddings for registration photos.
//!
//! An [`Embedder`] turns one photo into a unit-length vector; the [`Assembler`] runs it
//! over every [`Angle`] and concatenates the results into a single fixed-width vector.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

mod angle;
mod assembler;
mod embedder;
mod placeholder;
mod thumbnail;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use angle::{Angle, AngleMap, ANGLE_COUNT};
pub use assembler::{Assembler, Assembly, ConcatenatedEmbedding, SlotStatus};
pub use embedder::{
	l2_norm, Embedder, Embedding, EmbeddingError, EMBEDDING_DIMENSIONS, NORM_TOLERANCE,
};
pub use placeholder::RandomEmbedder;
pub use thumbnail::ThumbnailEmbedder;

/// Which embedder implementation to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbedderKind {
	#[default]
	Thumbnail,
	Random,
}

impl EmbedderKind {
	#[must_use]
	pub fn build(self) -> Arc<dyn Embedder> {
		let embedder: Arc<dyn Embedder> = match self {
			Self::Thumbnail => Arc::new(ThumbnailEmbedder::default()),
			Self::Random => {
				warn!("Using the random placeholder embedder, registrations won't be searchable");
				Arc::new(RandomEmbedder::default())
			}
		};

		debug!(kind = ?self, dimensions = embedder.dimensions(), "Initialized embedder");

		embedder
	}
}
