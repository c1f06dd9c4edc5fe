use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Number of viewpoints captured per person
pub const ANGLE_COUNT: usize = 5;

/// One of the fixed viewpoints a subject's head is photographed from.
#[derive(
	Debug,
	Clone,
	Copy,
	PartialEq,
	Eq,
	Hash,
	Serialize,
	Deserialize,
	Display,
	EnumString,
	IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Angle {
	Front,
	Left,
	Right,
	Top,
	Bottom,
}

impl Angle {
	/// Layout of the concatenated vector. Two people's vectors are only comparable
	/// coordinate by coordinate because this never changes.
	pub const CANONICAL_ORDER: [Self; ANGLE_COUNT] =
		[Self::Front, Self::Right, Self::Left, Self::Top, Self::Bottom];

	/// Position of this angle in [`Self::CANONICAL_ORDER`].
	#[must_use]
	pub const fn slot(self) -> usize {
		match self {
			Self::Front => 0,
			Self::Right => 1,
			Self::Left => 2,
			Self::Top => 3,
			Self::Bottom => 4,
		}
	}
}

/// The photos supplied for one registration, one optional payload per angle.
///
/// Inserting the same angle twice keeps the last payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AngleMap {
	photos: [Option<String>; ANGLE_COUNT],
}

impl AngleMap {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the payload previously stored for `angle`, if any.
	pub fn insert(&mut self, angle: Angle, payload: impl Into<String>) -> Option<String> {
		self.photos[angle.slot()].replace(payload.into())
	}

	/// The payload for `angle`; empty payloads count as absent.
	#[must_use]
	pub fn get(&self, angle: Angle) -> Option<&str> {
		self.photos[angle.slot()]
			.as_deref()
			.filter(|payload| !payload.is_empty())
	}

	pub fn take(&mut self, angle: Angle) -> Option<String> {
		self.photos[angle.slot()]
			.take()
			.filter(|payload| !payload.is_empty())
	}

	/// Distinct angles with a non-empty payload.
	#[must_use]
	pub fn supplied_count(&self) -> usize {
		Angle::CANONICAL_ORDER
			.into_iter()
			.filter(|&angle| self.get(angle).is_some())
			.count()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.supplied_count() == 0
	}
}

impl FromIterator<(Angle, String)> for AngleMap {
	fn from_iter<I: IntoIterator<Item = (Angle, String)>>(iter: I) -> Self {
		let mut map = Self::new();
		map.extend(iter);
		map
	}
}

impl Extend<(Angle, String)> for AngleMap {
	fn extend<I: IntoIterator<Item = (Angle, String)>>(&mut self, iter: I) {
		for (angle, payload) in iter {
			self.insert(angle, payload);
		}
	}
}
