//! Registry mapping normalized URLs to interposed endpoint configurations.

// self
use crate::{
	_prelude::*,
	endpoint::{EndpointConfig, EndpointKey},
	error::ConfigError,
};

/// Shared mutable mapping from normalized URL to [`EndpointConfig`].
///
/// The registry is an explicit object rather than process-global state:
/// construct one at application startup and hand an `Arc` of it to both the
/// registration call sites and the auth scheme wired into the HTTP client.
/// A single mutex guards the mapping; concurrent registrations for the same
/// key resolve last-writer-wins.
#[derive(Debug, Default)]
pub struct EndpointRegistry(Mutex<HashMap<EndpointKey, EndpointConfig>>);
impl EndpointRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a configuration under its normalized resource URL.
	///
	/// The configuration is re-validated before insertion so hand-assembled
	/// values fail here instead of mid-flow. Re-registering a key silently
	/// overwrites the previous entry.
	pub fn interpose(&self, config: EndpointConfig) -> Result<(), ConfigError> {
		config.validate()?;

		self.0.lock().insert(config.key(), config);

		Ok(())
	}

	/// Removes the entry registered for the configuration's URL, if any.
	pub fn uninterpose(&self, config: &EndpointConfig) {
		self.0.lock().remove(&config.key());
	}

	/// Looks up the configuration governing a request URL.
	///
	/// The URL is normalized first, so requests differing only in query
	/// string or fragment resolve to the same entry.
	pub fn lookup(&self, url: &Url) -> Option<EndpointConfig> {
		self.0.lock().get(&EndpointKey::normalize(url)).cloned()
	}

	/// Number of interposed endpoints.
	pub fn len(&self) -> usize {
		self.0.lock().len()
	}

	/// Returns true when nothing is interposed.
	pub fn is_empty(&self) -> bool {
		self.0.lock().is_empty()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::endpoint::ClientSecretMethod;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("URL fixture should parse successfully.")
	}

	fn config(resource: &str, client_id: &str) -> EndpointConfig {
		EndpointConfig::builder(url(resource))
			.authorization_endpoint(url("https://auth.example.com/authorize"))
			.token_endpoint(url("https://auth.example.com/token"))
			.client_identifier(client_id)
			.scope("read")
			.build()
			.expect("Config fixture should build successfully.")
	}

	#[test]
	fn lookup_ignores_query_and_fragment() {
		let registry = EndpointRegistry::new();

		registry
			.interpose(config("https://api.example.com/data", "myapp"))
			.expect("Registration should succeed for a valid config.");

		let hit = registry
			.lookup(&url("https://api.example.com/data?page=2&sort=asc#results"))
			.expect("Decorated URL should resolve to the bare registration.");

		assert_eq!(hit.client_identifier, "myapp");
		assert_eq!(
			hit,
			registry
				.lookup(&url("https://api.example.com/data"))
				.expect("Bare URL should resolve as well.")
		);
	}

	#[test]
	fn interpose_rejects_invalid_configs_without_side_effects() {
		let registry = EndpointRegistry::new();
		let mut bad = config("https://api.example.com/data", "myapp");

		bad.client_identifier.clear();

		let err = registry.interpose(bad).expect_err("Invalid configs must be rejected.");

		assert!(matches!(err, ConfigError::EmptyClientIdentifier));
		assert!(registry.is_empty(), "Failed registration must leave the registry unchanged.");
	}

	#[test]
	fn reregistration_overwrites_silently() {
		let registry = EndpointRegistry::new();

		registry
			.interpose(config("https://api.example.com/data?ignored=1", "first"))
			.expect("First registration should succeed.");
		registry
			.interpose(config("https://api.example.com/data", "second"))
			.expect("Second registration should succeed.");

		assert_eq!(registry.len(), 1);
		assert_eq!(
			registry
				.lookup(&url("https://api.example.com/data"))
				.expect("Overwritten key should still resolve.")
				.client_identifier,
			"second"
		);
	}

	#[test]
	fn uninterpose_unknown_url_is_a_noop() {
		let registry = EndpointRegistry::new();
		let registered = config("https://api.example.com/data", "myapp");
		let never_registered = config("https://api.example.com/other", "myapp");

		registry.interpose(registered.clone()).expect("Registration should succeed.");
		registry.uninterpose(&never_registered);

		assert_eq!(registry.len(), 1);

		registry.uninterpose(&registered);

		assert!(registry.is_empty());
		assert!(registry.lookup(&url("https://api.example.com/data")).is_none());
	}

	#[test]
	fn secret_method_is_round_tripped() {
		let registry = EndpointRegistry::new();
		let mut config = config("https://api.example.com/data", "myapp");

		config.client_secret_method = ClientSecretMethod::PromptForSecret;
		registry.interpose(config).expect("Registration should succeed.");

		assert_eq!(
			registry
				.lookup(&url("https://api.example.com/data"))
				.expect("Registered URL should resolve.")
				.client_secret_method,
			ClientSecretMethod::PromptForSecret
		);
	}
}
