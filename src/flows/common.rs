//! Shared helpers for flow implementations (authorization URL, code extraction, guards).

// self
use crate::{
	_prelude::*,
	endpoint::EndpointConfig,
	error::ConfigError,
	exchange::TransportErrorMapper,
	flows::Interposer,
	http::TokenHttpClient,
	store::SecretAttributes,
};

/// Builds the authorization URL the user is sent to.
///
/// Query order is `client_id`, `response_type`, `scope`, then the configured
/// extra arguments in their registered order.
pub fn build_authorization_url(config: &EndpointConfig) -> Url {
	let mut url = config.authorization_endpoint.clone();
	let mut pairs = url.query_pairs_mut();

	pairs.append_pair("client_id", &config.client_identifier);
	pairs.append_pair("response_type", "code");
	pairs.append_pair("scope", &config.scope);

	for (name, value) in &config.authorization_extra_arguments {
		pairs.append_pair(name, value);
	}

	drop(pairs);

	url
}

/// Extracts the `code` query parameter from the pasted redirect URL.
pub fn extract_code(redirect: &str) -> Result<String> {
	let url = Url::parse(redirect)
		.map_err(|source| Error::from(ConfigError::MalformedRedirect { source }))?;
	let code = url
		.query_pairs()
		.find_map(|(name, value)| (name == "code").then(|| value.into_owned()))
		.filter(|code| !code.is_empty());

	code.ok_or_else(|| Error::MissingAuthorizationCode { redirect: redirect.to_owned() })
}

/// Returns (and creates on demand) the in-flight guard for a credential key.
pub(crate) fn flow_guard<C, M>(
	interposer: &Interposer<C, M>,
	attrs: &SecretAttributes,
) -> Arc<AsyncMutex<()>>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let mut guards = interposer.flow_guards.lock();

	guards.entry(attrs.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
}
