use crate::{
	angle::{Angle, AngleMap, ANGLE_COUNT},
	embedder::{Embedder, Embedding},
};

use std::sync::Arc;

use futures::future::join_all;
use tokio::task::spawn_blocking;
use tracing::{debug, error, warn};

/// What ended up in one angle's slot.
///
/// Only the in-memory [`Assembly`] knows this; the stored vector can't tell a missing
/// photo from a failed one since both are zeros.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
	Embedded,
	Missing,
	DecodeFailed,
	EmbedFailed,
}

/// Five per-angle embeddings laid end to end in [`Angle::CANONICAL_ORDER`].
#[derive(Debug, Clone, PartialEq)]
pub struct ConcatenatedEmbedding {
	values: Vec<f32>,
	dimensions: usize,
}

impl ConcatenatedEmbedding {
	/// All slots zeroed, `dimensions` values per angle.
	#[must_use]
	pub fn zeroed(dimensions: usize) -> Self {
		Self {
			values: vec![0.0; dimensions * ANGLE_COUNT],
			dimensions,
		}
	}

	/// Rebuilds a vector read back from storage, `None` unless it is exactly `5 * dimensions` wide.
	#[must_use]
	pub fn from_values(values: Vec<f32>, dimensions: usize) -> Option<Self> {
		(values.len() == dimensions * ANGLE_COUNT).then_some(Self { values, dimensions })
	}

	/// Values per angle (the embedder's `D`).
	#[must_use]
	pub const fn dimensions(&self) -> usize {
		self.dimensions
	}

	/// Total width, always `5 * D`.
	#[must_use]
	pub fn len(&self) -> usize {
		self.values.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	#[must_use]
	pub fn slot(&self, angle: Angle) -> &[f32] {
		let start = angle.slot() * self.dimensions;
		&self.values[start..start + self.dimensions]
	}

	/// True when no angle contributed any signal.
	#[must_use]
	pub fn is_all_zero(&self) -> bool {
		self.values.iter().all(|&value| value == 0.0)
	}

	#[must_use]
	pub fn as_slice(&self) -> &[f32] {
		&self.values
	}

	#[must_use]
	pub fn into_inner(self) -> Vec<f32> {
		self.values
	}

	fn fill(&mut self, angle: Angle, embedding: &Embedding) {
		let start = angle.slot() * self.dimensions;
		self.values[start..start + self.dimensions].copy_from_slice(embedding.as_slice());
	}
}

#[derive(Debug, Clone)]
pub struct Assembly {
	pub embedding: ConcatenatedEmbedding,
	/// Indexed by [`Angle::slot`]
	pub slots: [SlotStatus; ANGLE_COUNT],
}

impl Assembly {
	#[must_use]
	pub const fn status(&self, angle: Angle) -> SlotStatus {
		self.slots[angle.slot()]
	}

	#[must_use]
	pub fn embedded_count(&self) -> usize {
		self.slots
			.iter()
			.filter(|&&status| status == SlotStatus::Embedded)
			.count()
	}
}

/// Drives an [`Embedder`] once per angle and lays the results out in canonical order.
///
/// Assembly never fails: any angle that is absent, undecodable or rejected by the
/// embedder is filled with zeros so the output width is always `5 * D`.
#[derive(Clone)]
pub struct Assembler {
	embedder: Arc<dyn Embedder>,
}

impl Assembler {
	pub fn new(embedder: Arc<dyn Embedder>) -> Self {
		Self { embedder }
	}

	/// Per-angle dimensions `D`
	#[must_use]
	pub fn dimensions(&self) -> usize {
		self.embedder.dimensions()
	}

	/// Width of every assembled vector
	#[must_use]
	pub fn concatenated_dimensions(&self) -> usize {
		self.dimensions() * ANGLE_COUNT
	}

	/// Embeds every angle on the calling thread, one after the other.
	#[must_use]
	pub fn assemble(&self, photos: &AngleMap) -> Assembly {
		let dimensions = self.dimensions();
		let mut embedding = ConcatenatedEmbedding::zeroed(dimensions);
		let mut slots = [SlotStatus::Missing; ANGLE_COUNT];

		for angle in Angle::CANONICAL_ORDER {
			let (status, maybe_embedding) =
				embed_slot(self.embedder.as_ref(), angle, photos.get(angle));

			if let Some(angle_embedding) = maybe_embedding {
				embedding.fill(angle, &angle_embedding);
			}
			slots[angle.slot()] = status;
		}

		Assembly { embedding, slots }
	}

	/// Embeds all angles at once on the blocking pool.
	///
	/// Results are written into their predetermined slots, so completion order has no
	/// effect on the layout.
	pub async fn assemble_concurrently(&self, mut photos: AngleMap) -> Assembly {
		let dimensions = self.dimensions();

		let results = join_all(Angle::CANONICAL_ORDER.map(|angle| {
			let embedder = Arc::clone(&self.embedder);
			let payload = photos.take(angle);

			async move {
				let Some(payload) = payload else {
					return (angle, SlotStatus::Missing, None);
				};

				match spawn_blocking(move || embed_slot(embedder.as_ref(), angle, Some(&payload)))
					.await
				{
					Ok((status, maybe_embedding)) => (angle, status, maybe_embedding),
					Err(e) => {
						error!(%angle, "Embedding worker failed, using zero-fallback: {e:#?}");
						(angle, SlotStatus::EmbedFailed, None)
					}
				}
			}
		}))
		.await;

		let mut embedding = ConcatenatedEmbedding::zeroed(dimensions);
		let mut slots = [SlotStatus::Missing; ANGLE_COUNT];

		for (angle, status, maybe_embedding) in results {
			if let Some(angle_embedding) = maybe_embedding {
				embedding.fill(angle, &angle_embedding);
			}
			slots[angle.slot()] = status;
		}

		Assembly { embedding, slots }
	}
}

fn embed_slot(
	embedder: &dyn Embedder,
	angle: Angle,
	payload: Option<&str>,
) -> (SlotStatus, Option<Embedding>) {
	let Some(payload) = payload else {
		debug!(%angle, "No photo supplied, using zero-fallback");
		return (SlotStatus::Missing, None);
	};

	let image = match fr_images::decode(payload) {
		Ok(image) => image,
		Err(e) => {
			warn!(%angle, "Failed to decode photo, using zero-fallback: {e}");
			return (SlotStatus::DecodeFailed, None);
		}
	};

	match embedder
		.embed(&image)
		.and_then(|embedding| embedding.verify(embedder.dimensions()))
	{
		Ok(embedding) => (SlotStatus::Embedded, Some(embedding)),
		Err(e) => {
			warn!(%angle, "Failed to embed photo, using zero-fallback: {e}");
			(SlotStatus::EmbedFailed, None)
		}
	}
}
