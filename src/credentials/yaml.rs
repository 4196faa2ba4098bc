//! YAML-backed [`CredentialResolver`].
//!
//! The document holds one top-level section per environment identifier:
//!
//! ```yaml
//! api.sandbox.ebay.com:
//!   appid: sandbox-app
//!   certid: sandbox-cert
//!   devid: developer
//!   redirecturi: Sandbox_RuName
//! api.ebay.com:
//!   appid: production-app
//!   certid: production-cert
//! ```
//!
//! A missing or `null` section leaves that environment without credentials, and keys that are
//! not environment identifiers (`my notes`, empty strings) are skipped. Only a document that
//! cannot be read or parsed fails the load.

// std
use std::{collections::BTreeMap, fs, io::Read, path::Path};
// self
use crate::{
	_prelude::*,
	credentials::{CredentialResolver, CredentialSet},
	environment::{Environment, EnvironmentId},
	error::LoadError,
};

type Document = BTreeMap<String, Option<CredentialSet>>;

/// Credential sets loaded from a YAML document at startup.
#[derive(Clone, Debug, Default)]
pub struct YamlCredentials(HashMap<EnvironmentId, CredentialSet>);
impl YamlCredentials {
	/// Loads credentials from any reader.
	pub fn from_reader(reader: impl Read) -> Result<Self, LoadError> {
		let document: Document =
			serde_path_to_error::deserialize(serde_yaml::Deserializer::from_reader(reader))?;

		Self::from_document(document)
	}

	/// Loads credentials from a file on disk.
	pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
		let path = path.as_ref();
		let raw = fs::read_to_string(path)
			.map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;

		raw.parse()
	}

	/// Identifiers that have a credential section.
	pub fn environments(&self) -> impl Iterator<Item = &EnvironmentId> {
		self.0.keys()
	}

	/// Number of loaded credential sets.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true when the document configured no credentials.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	fn from_document(document: Document) -> Result<Self, LoadError> {
		let mut sections = HashMap::with_capacity(document.len());

		for (key, section) in document {
			let Ok(id) = EnvironmentId::new(&key) else {
				#[cfg(feature = "tracing")]
				tracing::debug!(section = %key, "skipping credential section with an invalid key");

				continue;
			};

			if sections.contains_key(&id) {
				return Err(LoadError::DuplicateSection(id));
			}

			sections.insert(id, section);
		}

		Ok(Self(
			sections
				.into_iter()
				.filter_map(|(id, section)| section.map(|credentials| (id, credentials)))
				.collect(),
		))
	}
}
impl FromStr for YamlCredentials {
	type Err = LoadError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let document: Document =
			serde_path_to_error::deserialize(serde_yaml::Deserializer::from_str(s))?;

		Self::from_document(document)
	}
}
impl CredentialResolver for YamlCredentials {
	fn resolve(&self, environment: &Environment) -> Option<&CredentialSet> {
		self.0.get(&environment.id)
	}
}
