use anyhow::Result;

/// Versioned configuration that knows how to upgrade itself
pub trait Migrate {
	fn current_version(&self) -> u32;

	fn target_version() -> u32;

	fn migrate(&mut self) -> Result<()>;

	fn needs_migration(&self) -> bool {
		self.current_version() < Self::target_version()
	}
}
