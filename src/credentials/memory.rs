//! In-memory [`CredentialResolver`] for programmatic setups and tests.

// self
use crate::{
	_prelude::*,
	credentials::{CredentialResolver, CredentialSet},
	environment::{Environment, EnvironmentId},
};

/// Credential map keyed by environment identifier.
#[derive(Clone, Debug, Default)]
pub struct MemoryCredentials(HashMap<EnvironmentId, CredentialSet>);
impl MemoryCredentials {
	/// Inserts or replaces the credential set for `environment`.
	pub fn insert(
		&mut self,
		environment: EnvironmentId,
		credentials: CredentialSet,
	) -> Option<CredentialSet> {
		self.0.insert(environment, credentials)
	}

	/// Builder-style variant of [`MemoryCredentials::insert`].
	pub fn with(mut self, environment: EnvironmentId, credentials: CredentialSet) -> Self {
		self.insert(environment, credentials);

		self
	}

	/// Number of configured environments.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true when no credentials are configured.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl CredentialResolver for MemoryCredentials {
	fn resolve(&self, environment: &Environment) -> Option<&CredentialSet> {
		self.0.get(&environment.id)
	}
}
impl FromIterator<(EnvironmentId, CredentialSet)> for MemoryCredentials {
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (EnvironmentId, CredentialSet)>,
	{
		Self(iter.into_iter().collect())
	}
}
