//! Credential-store contracts and built-in backends.
//!
//! Stores hold two kinds of records under the same attribute key: client
//! secrets used to authenticate against token endpoints, and bearer tokens
//! minted by successful exchanges. Writes are two-phase; staging returns a
//! [`PendingEntry`] and nothing is persisted until the caller commits it
//! after verifying the secret actually worked. Dropping an uncommitted entry
//! persists nothing, so failed exchanges never leave credentials behind.

/// JSON-file-backed store.
pub mod file;
/// In-memory store for local development and tests.
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	endpoint::key,
	secret::SecretString,
};

/// Boxed future returned by [`CredentialStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Attribute tuple identifying one stored secret.
///
/// The full tuple is the key; two records for the same host that differ in
/// scope or path are distinct credentials.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecretAttributes {
	/// Owning user; the URL's username when present, else the client identifier.
	pub user: String,
	/// Host component of the keyed URL.
	pub host: String,
	/// Effective port of the keyed URL (443 is implied for HTTPS).
	pub port: Option<u16>,
	/// Path component of the keyed URL.
	pub path: String,
	/// Scope string the credential was issued for.
	pub scope: String,
}
impl SecretAttributes {
	/// Builds the attribute tuple for a protected resource URL.
	///
	/// Bearer tokens are keyed by the resource they unlock; the `user` slot
	/// carries the URL's username when one is present and the registered
	/// client identifier otherwise.
	pub fn for_resource(url: &Url, client_identifier: &str, scope: &str) -> Self {
		let user = match url.username() {
			"" => client_identifier.to_owned(),
			name => name.to_owned(),
		};

		Self {
			user,
			host: url.host_str().unwrap_or_default().to_owned(),
			port: key::effective_port(url),
			path: url.path().to_owned(),
			scope: scope.to_owned(),
		}
	}

	/// Builds the attribute tuple for a token endpoint's client secret.
	///
	/// Client secrets belong to the application, so the `user` slot always
	/// carries the client identifier.
	pub fn for_token_endpoint(token_endpoint: &Url, client_identifier: &str, scope: &str) -> Self {
		Self {
			user: client_identifier.to_owned(),
			host: token_endpoint.host_str().unwrap_or_default().to_owned(),
			port: key::effective_port(token_endpoint),
			path: token_endpoint.path().to_owned(),
			scope: scope.to_owned(),
		}
	}
}
impl Display for SecretAttributes {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}@{}", self.user, self.host)?;

		if let Some(port) = self.port {
			write!(f, ":{port}")?;
		}

		write!(f, "{} [{}]", self.path, self.scope)
	}
}

/// One persisted credential value with its optional expiry instant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredential {
	/// Secret material (bearer token or client secret).
	pub secret: SecretString,
	/// Absolute expiry instant; `None` for non-expiring client secrets.
	pub expires_at: Option<OffsetDateTime>,
}
impl StoredCredential {
	/// Returns true while the credential has not passed its expiry.
	pub fn is_live_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.is_none_or(|deadline| instant < deadline)
	}
}

/// Secret returned by a lookup, plus the deferred save for create-paths.
///
/// A secret that was already persisted arrives with `pending: None`; a
/// freshly minted one carries the [`PendingEntry`] that will persist it once
/// the caller confirms success.
pub struct FoundSecret {
	/// The secret value.
	pub secret: SecretString,
	/// Deferred save, present only when the secret is not yet persisted.
	pub pending: Option<PendingEntry>,
}
impl Debug for FoundSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("FoundSecret")
			.field("secret", &"<redacted>")
			.field("pending", &self.pending.is_some())
			.finish()
	}
}

/// Deferred persistence handle produced by staging operations.
///
/// Commit at most once, and only after the staged secret has been verified
/// against the server. An entry that is dropped instead of committed writes
/// nothing.
pub struct PendingEntry(Box<dyn FnOnce() -> StoreFuture<'static, ()> + Send>);
impl PendingEntry {
	/// Wraps the closure that performs the actual write.
	pub fn new(commit: impl FnOnce() -> StoreFuture<'static, ()> + Send + 'static) -> Self {
		Self(Box::new(commit))
	}

	/// Persists the staged record.
	pub async fn commit(self) -> Result<(), StoreError> {
		(self.0)().await
	}
}
impl Debug for PendingEntry {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("PendingEntry(..)")
	}
}

/// Storage backend contract used by the authorization flow.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Fetches the single best match for the attributes, if one is live.
	fn find_secret<'a>(&'a self, attrs: &'a SecretAttributes)
	-> StoreFuture<'a, Option<FoundSecret>>;

	/// Fetches the client secret for the attributes, minting one when absent.
	///
	/// The create path may consult an injected [`SecretPrompt`] and returns
	/// the new secret staged behind a [`PendingEntry`]; nothing is persisted
	/// until the exchange that used the secret succeeds.
	///
	/// [`SecretPrompt`]: crate::prompt::SecretPrompt
	fn find_or_create_client_secret<'a>(
		&'a self,
		attrs: &'a SecretAttributes,
	) -> StoreFuture<'a, FoundSecret>;

	/// Stages a brand-new bearer entry with an explicit expiry.
	///
	/// Always creates a fresh record; a successful exchange replaces
	/// whatever was stored before rather than updating it in place.
	fn stage_bearer<'a>(
		&'a self,
		attrs: &'a SecretAttributes,
		secret: SecretString,
		expires_at: OffsetDateTime,
	) -> StoreFuture<'a, PendingEntry>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
	/// No client secret is stored and none could be obtained interactively.
	#[error("No client secret is available for {user}; configure a secret prompt or seed the store.")]
	MissingClientSecret {
		/// User attribute of the failed lookup.
		user: String,
	},
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("URL fixture should parse successfully.")
	}

	#[test]
	fn resource_attributes_prefer_url_username() {
		let anonymous =
			SecretAttributes::for_resource(&url("https://api.example.com/data"), "myapp", "read");

		assert_eq!(anonymous.user, "myapp");
		assert_eq!(anonymous.host, "api.example.com");
		assert_eq!(anonymous.port, Some(443));
		assert_eq!(anonymous.path, "/data");
		assert_eq!(anonymous.scope, "read");

		let named = SecretAttributes::for_resource(
			&url("https://alice@api.example.com:8443/data"),
			"myapp",
			"read",
		);

		assert_eq!(named.user, "alice");
		assert_eq!(named.port, Some(8443));
	}

	#[test]
	fn token_endpoint_attributes_use_client_identifier() {
		let attrs = SecretAttributes::for_token_endpoint(
			&url("https://auth.example.com/token"),
			"myapp",
			"read",
		);

		assert_eq!(attrs.user, "myapp");
		assert_eq!(attrs.path, "/token");
		assert_eq!(attrs.to_string(), "myapp@auth.example.com:443/token [read]");
	}

	#[test]
	fn liveness_respects_expiry() {
		let instant = macros::datetime!(2025-06-01 12:00 UTC);
		let eternal = StoredCredential { secret: SecretString::new("s"), expires_at: None };
		let expiring = StoredCredential {
			secret: SecretString::new("s"),
			expires_at: Some(macros::datetime!(2025-06-01 13:00 UTC)),
		};

		assert!(eternal.is_live_at(instant));
		assert!(expiring.is_live_at(instant));
		assert!(!expiring.is_live_at(macros::datetime!(2025-06-01 13:00 UTC)));
	}

	#[test]
	fn stored_credential_round_trips_through_json() {
		let credential = StoredCredential {
			secret: SecretString::new("bearer-value"),
			expires_at: Some(macros::datetime!(2025-06-01 13:00 UTC)),
		};
		let payload =
			serde_json::to_string(&credential).expect("Credential should serialize to JSON.");
		let round_trip: StoredCredential =
			serde_json::from_str(&payload).expect("Credential should deserialize from JSON.");

		assert_eq!(round_trip, credential);
	}
}
