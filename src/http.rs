//! Transport primitives for the token-endpoint exchange.
//!
//! The module exposes [`TokenHttpClient`] so downstream crates can integrate
//! custom HTTP stacks. The trait is deliberately narrow; a token exchange is
//! one form POST that either yields an HTTP status plus body or a transport
//! error, and everything above it (JSON parsing, error taxonomy) lives in the
//! exchange layer so implementations stay small.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
// self
use crate::{_prelude::*, secret::SecretString};

/// Boxed future returned by [`TokenHttpClient::post_form`].
pub type TransportFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + 'a + Send>>;

/// HTTP Basic credentials sent to token endpoints that require client auth.
#[derive(Clone)]
pub struct BasicCredentials {
	/// Client identifier used as the Basic username.
	pub username: String,
	/// Client secret used as the Basic password.
	pub secret: SecretString,
}
impl BasicCredentials {
	/// Renders the `Authorization` header value, `Basic base64(id:secret)`.
	pub fn header_value(&self) -> String {
		let raw = format!("{}:{}", self.username, self.secret.expose());

		format!("Basic {}", STANDARD.encode(raw))
	}
}
impl Debug for BasicCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("BasicCredentials")
			.field("username", &self.username)
			.field("secret", &"<redacted>")
			.finish()
	}
}

/// One form POST against a token endpoint.
#[derive(Debug)]
pub struct TokenEndpointRequest<'r> {
	/// Token endpoint URL.
	pub url: &'r Url,
	/// Form fields, sent `application/x-www-form-urlencoded`.
	pub form: &'r [(&'static str, &'r str)],
	/// Optional HTTP Basic client authentication.
	pub basic: Option<&'r BasicCredentials>,
}

/// Raw reply captured from a token endpoint.
#[derive(Clone, Debug)]
pub struct TokenEndpointReply {
	/// HTTP status code.
	pub status: u16,
	/// Response body bytes, unparsed.
	pub body: Vec<u8>,
}
impl TokenEndpointReply {
	/// Returns true for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Lossy UTF-8 view of the body for diagnostics.
	pub fn body_text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}
}

/// Abstraction over HTTP transports capable of executing the code exchange.
///
/// The trait is the crate's only dependency on an HTTP stack. Implementations
/// must be `Send + Sync + 'static` so one transport can serve every flow
/// behind an `Arc`, and the returned future must be `Send` so flows can hop
/// executors.
pub trait TokenHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Dispatches the form POST and resolves to the raw status + body.
	///
	/// Non-2xx statuses are not transport errors; they resolve `Ok` so the
	/// exchange layer can surface the response body to the operator.
	fn post_form<'a>(
		&'a self,
		request: TokenEndpointRequest<'a>,
	) -> TransportFuture<'a, TokenEndpointReply, Self::TransportError>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one
/// place. Token requests should not follow redirects, matching OAuth 2.0
/// guidance that token endpoints return results directly; configure any
/// custom [`ReqwestClient`] accordingly before wrapping it.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client that aborts token requests after `timeout`.
	pub fn with_timeout(timeout: std::time::Duration) -> Result<Self, crate::error::ConfigError> {
		let client = ReqwestClient::builder().timeout(timeout).build()?;

		Ok(Self(client))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl std::ops::Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl TokenHttpClient for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn post_form<'a>(
		&'a self,
		request: TokenEndpointRequest<'a>,
	) -> TransportFuture<'a, TokenEndpointReply, Self::TransportError> {
		let mut builder = self.0.post(request.url.clone()).form(request.form);

		if let Some(basic) = request.basic {
			builder = builder.header(reqwest::header::AUTHORIZATION, basic.header_value());
		}

		Box::pin(async move {
			let response = builder.send().await?;
			let status = response.status().as_u16();
			let body = response.bytes().await?.to_vec();

			Ok(TokenEndpointReply { status, body })
		})
	}
}
