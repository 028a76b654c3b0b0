//! High-level flow orchestration for interposed endpoints.

pub mod bearer;
pub mod common;

// self
use crate::{
	_prelude::*,
	exchange::TransportErrorMapper,
	http::TokenHttpClient,
	prompt::RedirectPrompt,
	registry::EndpointRegistry,
	store::{CredentialStore, SecretAttributes},
};
#[cfg(feature = "reqwest")]
use crate::{exchange::ReqwestTransportErrorMapper, http::ReqwestHttpClient};

#[cfg(feature = "reqwest")]
/// Interposer specialized for the crate's default reqwest transport stack.
pub type ReqwestInterposer = Interposer<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Coordinates bearer-token resolution for every interposed URL.
///
/// The interposer owns the endpoint registry, the credential store, the
/// redirect prompt, and the transport pair, so the bearer flow can focus on
/// its state machine (registry lookup, cache check, interactive prompt, code
/// exchange, persistence). Clones share all of that state, including the
/// per-key in-flight guards.
#[derive(Clone)]
pub struct Interposer<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Registry mapping normalized URLs to endpoint configurations.
	pub registry: Arc<EndpointRegistry>,
	/// Credential store holding bearer tokens and client secrets.
	pub store: Arc<dyn CredentialStore>,
	/// Prompt that obtains the pasted redirect URL from the user.
	pub redirect_prompt: Arc<dyn RedirectPrompt>,
	/// HTTP client wrapper used for token endpoint requests.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them.
	pub transport_mapper: Arc<M>,
	flow_guards: Arc<Mutex<HashMap<SecretAttributes, Arc<AsyncMutex<()>>>>>,
}
impl<C, M> Interposer<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates an interposer that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		registry: Arc<EndpointRegistry>,
		store: Arc<dyn CredentialStore>,
		redirect_prompt: Arc<dyn RedirectPrompt>,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			registry,
			store,
			redirect_prompt,
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			flow_guards: Default::default(),
		}
	}
}
#[cfg(feature = "reqwest")]
impl Interposer<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a new interposer over the provided registry, store, and prompt.
	///
	/// The interposer provisions its own reqwest-backed transport so callers
	/// do not need to pass HTTP handles explicitly; use
	/// [`Interposer::with_http_client`] to supply a custom stack or timeout.
	pub fn new(
		registry: Arc<EndpointRegistry>,
		store: Arc<dyn CredentialStore>,
		redirect_prompt: Arc<dyn RedirectPrompt>,
	) -> Self {
		Self::with_http_client(
			registry,
			store,
			redirect_prompt,
			ReqwestHttpClient::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<C, M> Debug for Interposer<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Interposer")
			.field("interposed", &self.registry.len())
			.finish()
	}
}
