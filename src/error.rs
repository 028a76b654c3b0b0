//! Crate-level error types shared across the registry, stores, and flows.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// The request URL has no interposed endpoint configuration.
	#[error("No OAuth 2.0 endpoint is interposed for {url}.")]
	NotConfigured {
		/// Normalized request URL that missed the registry.
		url: String,
	},
	/// The pasted redirect URL carries no `code` query parameter.
	#[error("The redirect URL carries no authorization code: {redirect}.")]
	MissingAuthorizationCode {
		/// Redirect URL as pasted by the user.
		redirect: String,
	},
	/// Token endpoint answered with a non-success HTTP status.
	#[error("Token endpoint rejected the code exchange: {body}.")]
	TokenExchangeFailed {
		/// HTTP status code, when the response got far enough to carry one.
		status: Option<u16>,
		/// Raw response body, kept verbatim for operator diagnosis.
		body: String,
	},
	/// Token endpoint responded with malformed JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Structured parsing failure pointing at the offending field.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Server issued a token of a type other than `bearer`.
	#[error("Token endpoint for client `{client_id}` at {url} issued an unsupported `{token_type}` token; only `bearer` is usable.")]
	UnsupportedTokenType {
		/// `token_type` field as returned by the server.
		token_type: String,
		/// Client identifier that made the request.
		client_id: String,
		/// Token endpoint URL that answered.
		url: String,
	},
	/// Server granted a different scope than the one requested.
	#[error("Token endpoint granted scope `{granted}` instead of the requested `{requested}`.")]
	ScopeMismatch {
		/// Scope the endpoint configuration asked for.
		requested: String,
		/// Scope the server actually granted.
		granted: String,
	},
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Authorization endpoint is required for the authorization-code flow.
	#[error("Missing authorization endpoint.")]
	MissingAuthorizationEndpoint,
	/// Token endpoint is required for the code exchange.
	#[error("Missing token endpoint.")]
	MissingTokenEndpoint,
	/// Authorization and token endpoints must use HTTPS.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Client identifier cannot be empty.
	#[error("Client identifier cannot be empty.")]
	EmptyClientIdentifier,
	/// Requested scope cannot be empty.
	#[error("Requested scope cannot be empty.")]
	EmptyScope,
	/// The pasted redirect URL cannot be parsed at all.
	#[error("The pasted redirect URL is not a valid URL.")]
	MalformedRedirect {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Token endpoint returned an excessively large `expires_in`.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
	/// Token endpoint returned a zero lifetime.
	#[error("The expires_in value must be positive.")]
	NonPositiveExpiresIn,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for ConfigError {
	fn from(e: reqwest::Error) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
