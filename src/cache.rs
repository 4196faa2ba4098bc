//! Per-environment cache of application token sources.
//!
//! The cache holds at most one source per environment identifier and lives as long as the
//! broker that owns it; entries are never evicted. Lookups go through a read lock, so hits
//! from many tasks never serialize behind each other. Misses for the same environment funnel
//! through a per-environment singleflight guard so a burst of first callers constructs and
//! stores exactly one source.

// self
use crate::{
	_prelude::*, environment::EnvironmentId, obs::CacheLookup, source::TokenSource,
};

type SourceMap = RwLock<HashMap<EnvironmentId, Arc<dyn TokenSource>>>;
type GuardMap = Mutex<HashMap<EnvironmentId, Arc<AsyncMutex<()>>>>;

/// Concurrency-safe map from environment identifier to its shared token source.
#[derive(Default)]
pub struct TokenCache {
	sources: SourceMap,
	guards: GuardMap,
}
impl TokenCache {
	/// Returns the source stored for `environment`, if any.
	pub fn get(&self, environment: &EnvironmentId) -> Option<Arc<dyn TokenSource>> {
		self.sources.read().get(environment).cloned()
	}

	/// Stores `source` for `environment`, returning the source it replaced.
	pub fn store(
		&self,
		environment: EnvironmentId,
		source: Arc<dyn TokenSource>,
	) -> Option<Arc<dyn TokenSource>> {
		self.sources.write().insert(environment, source)
	}

	/// Returns true when a source is stored for `environment`.
	pub fn contains(&self, environment: &EnvironmentId) -> bool {
		self.sources.read().contains_key(environment)
	}

	/// Number of environments with a stored source.
	pub fn len(&self) -> usize {
		self.sources.read().len()
	}

	/// Returns true when no source has been stored yet.
	pub fn is_empty(&self) -> bool {
		self.sources.read().is_empty()
	}

	/// Returns the stored source, or builds and stores one under the environment's guard.
	///
	/// `build` runs at most once per racing group of callers; callers that waited on the guard
	/// observe the winner's source. The guard is released before this returns, so no lock is
	/// held while the caller talks to the token endpoint.
	pub(crate) async fn get_or_try_insert_with<F, E>(
		&self,
		environment: &EnvironmentId,
		build: F,
	) -> Result<(Arc<dyn TokenSource>, CacheLookup), E>
	where
		F: FnOnce() -> Result<Arc<dyn TokenSource>, E>,
	{
		if let Some(source) = self.get(environment) {
			return Ok((source, CacheLookup::Hit));
		}

		let guard = self.guard(environment);
		let _singleflight = guard.lock().await;

		if let Some(source) = self.get(environment) {
			return Ok((source, CacheLookup::Hit));
		}

		let source = build()?;

		self.store(environment.clone(), source.clone());

		Ok((source, CacheLookup::Miss))
	}

	fn guard(&self, environment: &EnvironmentId) -> Arc<AsyncMutex<()>> {
		let mut guards = self.guards.lock();

		guards.entry(environment.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
	}
}
impl Debug for TokenCache {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let environments = self.sources.read().keys().cloned().collect::<Vec<_>>();

		f.debug_struct("TokenCache").field("environments", &environments).finish()
	}
}
