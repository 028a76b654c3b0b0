//! Endpoint configuration data structures and validation.
//!
//! An [`EndpointConfig`] describes one protected resource URL together with
//! the OAuth 2.0 endpoints and client metadata needed to mint bearer tokens
//! for it. Configurations are built through [`EndpointConfigBuilder`], which
//! validates invariants up front so the registry never holds a config it
//! would have to re-check on every lookup.

/// URL normalization helpers shared by the registry and credential stores.
pub mod key;

pub use key::*;

// self
use crate::{_prelude::*, error::ConfigError};

/// Client authentication modes recognized for token endpoint calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientSecretMethod {
	#[default]
	/// Public client; the token request carries no client authentication.
	None,
	/// Confidential client; the secret is fetched from the credential store
	/// (prompting the user on first use) and sent as HTTP Basic.
	PromptForSecret,
}

/// Immutable per-URL OAuth configuration consumed by the flows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
	/// Protected resource URL; its normalized form is the registry key.
	pub url: Url,
	/// Authorization endpoint the user is sent to.
	pub authorization_endpoint: Url,
	/// Token endpoint the authorization code is exchanged against.
	pub token_endpoint: Url,
	/// Identifier presented to the server as `client_id`.
	pub client_identifier: String,
	/// Requested permission set, compared verbatim against grants.
	pub scope: String,
	/// How the client authenticates against the token endpoint.
	pub client_secret_method: ClientSecretMethod,
	/// Ordered extra query parameters appended to the authorization URL.
	pub authorization_extra_arguments: Vec<(String, String)>,
}
impl EndpointConfig {
	/// Creates a new builder for the provided resource URL.
	pub fn builder(url: Url) -> EndpointConfigBuilder {
		EndpointConfigBuilder::new(url)
	}

	/// Normalized registry key for this configuration's resource URL.
	pub fn key(&self) -> EndpointKey {
		EndpointKey::normalize(&self.url)
	}

	/// Validates invariants for the configuration.
	///
	/// Invoked by the builder, and again on registration since the fields are
	/// public and a config can be assembled by hand.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.client_identifier.is_empty() {
			return Err(ConfigError::EmptyClientIdentifier);
		}
		if self.scope.is_empty() {
			return Err(ConfigError::EmptyScope);
		}

		validate_endpoint("authorization", &self.authorization_endpoint)?;
		validate_endpoint("token", &self.token_endpoint)?;

		Ok(())
	}
}

/// Builder for [`EndpointConfig`] values.
#[derive(Debug)]
pub struct EndpointConfigBuilder {
	/// Protected resource URL the configuration is being built for.
	pub url: Url,
	/// Optional authorization endpoint (required to build).
	pub authorization_endpoint: Option<Url>,
	/// Optional token endpoint (required to build).
	pub token_endpoint: Option<Url>,
	/// Client identifier presented to the server.
	pub client_identifier: String,
	/// Requested permission set.
	pub scope: String,
	/// Client authentication mode for the token endpoint.
	pub client_secret_method: ClientSecretMethod,
	/// Extra query parameters for the authorization URL.
	pub authorization_extra_arguments: Vec<(String, String)>,
}
impl EndpointConfigBuilder {
	/// Creates a new builder seeded with the resource URL.
	pub fn new(url: Url) -> Self {
		Self {
			url,
			authorization_endpoint: None,
			token_endpoint: None,
			client_identifier: String::new(),
			scope: String::new(),
			client_secret_method: ClientSecretMethod::default(),
			authorization_extra_arguments: Vec::new(),
		}
	}

	/// Sets the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets the client identifier.
	pub fn client_identifier(mut self, id: impl Into<String>) -> Self {
		self.client_identifier = id.into();

		self
	}

	/// Sets the requested scope.
	pub fn scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = scope.into();

		self
	}

	/// Overrides the client secret method.
	pub fn client_secret_method(mut self, method: ClientSecretMethod) -> Self {
		self.client_secret_method = method;

		self
	}

	/// Appends one extra authorization query parameter, preserving order.
	pub fn authorization_extra_argument(
		mut self,
		name: impl Into<String>,
		value: impl Into<String>,
	) -> Self {
		self.authorization_extra_arguments.push((name.into(), value.into()));

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<EndpointConfig, ConfigError> {
		let authorization_endpoint =
			self.authorization_endpoint.ok_or(ConfigError::MissingAuthorizationEndpoint)?;
		let token_endpoint = self.token_endpoint.ok_or(ConfigError::MissingTokenEndpoint)?;
		let config = EndpointConfig {
			url: self.url,
			authorization_endpoint,
			token_endpoint,
			client_identifier: self.client_identifier,
			scope: self.scope,
			client_secret_method: self.client_secret_method,
			authorization_extra_arguments: self.authorization_extra_arguments,
		};

		config.validate()?;

		Ok(config)
	}
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ConfigError> {
	if url.scheme() != "https" {
		Err(ConfigError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	} else {
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("URL fixture should parse successfully.")
	}

	fn builder() -> EndpointConfigBuilder {
		EndpointConfig::builder(url("https://api.example.com/data"))
			.authorization_endpoint(url("https://auth.example.com/authorize"))
			.token_endpoint(url("https://auth.example.com/token"))
			.client_identifier("myapp")
			.scope("read")
	}

	#[test]
	fn builder_produces_valid_config() {
		let config = builder()
			.client_secret_method(ClientSecretMethod::PromptForSecret)
			.authorization_extra_argument("audience", "https://api.example.com")
			.build()
			.expect("Config builder should succeed for complete input.");

		assert_eq!(config.client_identifier, "myapp");
		assert_eq!(config.scope, "read");
		assert_eq!(config.client_secret_method, ClientSecretMethod::PromptForSecret);
		assert_eq!(
			config.authorization_extra_arguments,
			vec![("audience".to_string(), "https://api.example.com".to_string())]
		);
		assert_eq!(config.key().as_str(), "https://api.example.com/data");
	}

	#[test]
	fn builder_rejects_insecure_endpoints() {
		let err = builder()
			.token_endpoint(url("http://auth.example.com/token"))
			.build()
			.expect_err("Insecure token endpoints must be rejected.");

		assert!(matches!(err, ConfigError::InsecureEndpoint { endpoint: "token", .. }));
	}

	#[test]
	fn builder_rejects_empty_identity_fields() {
		let err = builder()
			.client_identifier("")
			.build()
			.expect_err("Empty client identifiers must be rejected.");

		assert!(matches!(err, ConfigError::EmptyClientIdentifier));

		let err = builder().scope("").build().expect_err("Empty scopes must be rejected.");

		assert!(matches!(err, ConfigError::EmptyScope));
	}

	#[test]
	fn client_secret_method_serializes_snake_case() {
		let payload = serde_json::to_string(&ClientSecretMethod::PromptForSecret)
			.expect("Method should serialize to JSON.");

		assert_eq!(payload, "\"prompt_for_secret\"");
	}
}
