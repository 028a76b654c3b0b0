//! User-interaction seams injected into the authorization flow.
//!
//! The interactive parts of the authorization-code grant are modeled as
//! traits so the core never owns a UI: [`RedirectPrompt`] hands the user an
//! authorization URL and blocks until they paste back the redirect they
//! landed on, and [`SecretPrompt`] asks for a client secret the first time a
//! confidential endpoint is used. Both return boxed futures so terminals,
//! editors, and test harnesses can all supply implementations.

// self
use crate::{_prelude::*, secret::SecretString, store::SecretAttributes};

/// Boxed future returned by prompt implementations.
pub type PromptFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a + Send>>;

/// Blocking prompt that obtains the pasted redirect URL from the user.
///
/// The flow suspends on this future for as long as the user takes; no
/// timeout is imposed by the crate. Callers who need one should wrap the
/// whole flow invocation instead.
pub trait RedirectPrompt: Send + Sync {
	/// Presents `authorize_url` to the user and resolves to the redirect URL
	/// they pasted back, verbatim.
	fn redirect_url<'a>(&'a self, authorize_url: &'a Url) -> PromptFuture<'a, String>;
}

/// Prompt used by credential stores to mint a missing client secret.
pub trait SecretPrompt: Send + Sync {
	/// Asks the user for the client secret matching `attrs`.
	///
	/// Resolving to `None` means the user declined; the store reports a
	/// missing-secret error in that case.
	fn client_secret<'a>(
		&'a self,
		attrs: &'a SecretAttributes,
	) -> PromptFuture<'a, Option<SecretString>>;
}

/// Redirect prompt that always answers with one prepared string.
///
/// Useful for bots and tests where the redirect is known up front.
#[derive(Clone, Debug)]
pub struct StaticRedirectPrompt(String);
impl StaticRedirectPrompt {
	/// Creates a prompt that always answers with `redirect`.
	pub fn new(redirect: impl Into<String>) -> Self {
		Self(redirect.into())
	}
}
impl RedirectPrompt for StaticRedirectPrompt {
	fn redirect_url<'a>(&'a self, _authorize_url: &'a Url) -> PromptFuture<'a, String> {
		Box::pin(async move { self.0.clone() })
	}
}

/// Secret prompt that always answers with one prepared secret.
#[derive(Clone, Debug)]
pub struct StaticSecretPrompt(SecretString);
impl StaticSecretPrompt {
	/// Creates a prompt that always answers with `secret`.
	pub fn new(secret: impl Into<String>) -> Self {
		Self(SecretString::new(secret))
	}
}
impl SecretPrompt for StaticSecretPrompt {
	fn client_secret<'a>(
		&'a self,
		_attrs: &'a SecretAttributes,
	) -> PromptFuture<'a, Option<SecretString>> {
		Box::pin(async move { Some(self.0.clone()) })
	}
}
