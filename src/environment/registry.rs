//! Registry of the environments a broker may talk to.

// self
use crate::{
	_prelude::*,
	environment::{Environment, EnvironmentId},
};

/// Errors raised while registering or looking up environments.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum RegistryError {
	/// An environment with the same identifier is already registered.
	#[error("Environment `{0}` is already registered.")]
	Duplicate(EnvironmentId),
	/// No environment matches the requested identifier.
	#[error("No environment is registered under `{0}`.")]
	UnknownEnvironment(String),
}

/// Fixed set of environments populated once before any concurrent access.
///
/// Registration rejects duplicates; lookups are case-insensitive because identifiers are
/// normalized on construction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Environment>", into = "Vec<Environment>")]
pub struct EnvironmentRegistry {
	environments: Vec<Environment>,
	index: HashMap<EnvironmentId, usize>,
}
impl EnvironmentRegistry {
	/// Registry holding the well-known sandbox and production environments.
	pub fn well_known() -> Self {
		let mut registry = Self::default();

		registry.insert_unchecked(Environment::sandbox());
		registry.insert_unchecked(Environment::production());

		registry
	}

	/// Builds a registry from the provided environments, failing on duplicate identifiers.
	pub fn from_environments<I>(environments: I) -> Result<Self, RegistryError>
	where
		I: IntoIterator<Item = Environment>,
	{
		let mut registry = Self::default();

		for environment in environments {
			registry.register(environment)?;
		}

		Ok(registry)
	}

	/// Adds an environment; fails if its identifier is already present.
	pub fn register(&mut self, environment: Environment) -> Result<(), RegistryError> {
		if self.index.contains_key(&environment.id) {
			return Err(RegistryError::Duplicate(environment.id));
		}

		self.insert_unchecked(environment);

		Ok(())
	}

	/// Looks up an environment by raw configuration identifier, ignoring case.
	pub fn lookup(&self, identifier: &str) -> Option<&Environment> {
		let normalized = identifier.to_lowercase();

		self.index.get(normalized.as_str()).map(|idx| &self.environments[*idx])
	}

	/// Returns true if an environment with the provided identifier is registered.
	pub fn contains(&self, id: &EnvironmentId) -> bool {
		self.index.contains_key(id)
	}

	/// Iterates environments in registration order.
	pub fn iter(&self) -> impl Iterator<Item = &Environment> {
		self.environments.iter()
	}

	/// Number of registered environments.
	pub fn len(&self) -> usize {
		self.environments.len()
	}

	/// Returns true when no environment is registered.
	pub fn is_empty(&self) -> bool {
		self.environments.is_empty()
	}

	fn insert_unchecked(&mut self, environment: Environment) {
		self.index.insert(environment.id.clone(), self.environments.len());
		self.environments.push(environment);
	}
}
impl TryFrom<Vec<Environment>> for EnvironmentRegistry {
	type Error = RegistryError;

	fn try_from(value: Vec<Environment>) -> Result<Self, Self::Error> {
		Self::from_environments(value)
	}
}
impl From<EnvironmentRegistry> for Vec<Environment> {
	fn from(value: EnvironmentRegistry) -> Self {
		value.environments
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::environment::{PRODUCTION_ID, SANDBOX_ID};

	#[test]
	fn well_known_registry_resolves_both_environments() {
		let registry = EnvironmentRegistry::well_known();

		assert_eq!(registry.len(), 2);
		assert_eq!(
			registry.lookup(SANDBOX_ID).map(|env| env.id.as_ref()),
			Some("api.sandbox.ebay.com")
		);
		assert_eq!(registry.lookup(PRODUCTION_ID).map(|env| env.id.as_ref()), Some("api.ebay.com"));
	}

	#[test]
	fn register_rejects_duplicates_regardless_of_case() {
		let mut registry = EnvironmentRegistry::well_known();
		let mut shadow = Environment::sandbox();

		shadow.id = EnvironmentId::new("API.SANDBOX.EBAY.COM")
			.expect("Uppercase identifier should normalize.");

		let err = registry.register(shadow).expect_err("Duplicate identifiers must be rejected.");

		assert!(matches!(err, RegistryError::Duplicate(id) if id.as_ref() == SANDBOX_ID));
		assert_eq!(registry.len(), 2);
	}

	#[test]
	fn registry_deserializes_from_environment_list() {
		let registry: EnvironmentRegistry = serde_json::from_str(
			r#"[{"id":"staging.example.com","endpoints":{"authorization":"https://staging.example.com/authorize","token":"https://staging.example.com/token"}}]"#,
		)
		.expect("Registry should deserialize from an environment list.");

		assert!(registry.lookup("Staging.Example.com").is_some());

		let duplicated = serde_json::from_str::<EnvironmentRegistry>(
			r#"[{"id":"a.example.com","endpoints":{"authorization":"https://a.example.com/a","token":"https://a.example.com/t"}},{"id":"A.example.com","endpoints":{"authorization":"https://a.example.com/a","token":"https://a.example.com/t"}}]"#,
		);

		assert!(duplicated.is_err());
	}
}
