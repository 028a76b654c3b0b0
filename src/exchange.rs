//! Authorization-code-for-token exchange against the token endpoint.
//!
//! [`CodeExchanger`] owns the wire protocol: one `application/x-www-form-urlencoded`
//! POST carrying `grant_type=authorization_code&code=<code>`, optional HTTP
//! Basic client authentication, and a JSON reply that must describe a
//! `bearer` token. Client secrets obtained through the store's create path
//! are committed only after the endpoint accepted them, so a failed exchange
//! never persists an unverified secret.

// self
use crate::{
	_prelude::*,
	endpoint::{ClientSecretMethod, EndpointConfig},
	error::ConfigError,
	http::{BasicCredentials, TokenEndpointRequest, TokenHttpClient},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	secret::SecretString,
	store::{CredentialStore, PendingEntry, SecretAttributes},
};
#[cfg(feature = "reqwest")] use crate::error::TransportError;

/// Grant returned by a successful exchange; lives for one flow invocation.
#[derive(Clone)]
pub struct BearerGrant {
	/// Access token to be sent as `Authorization: Bearer <token>`.
	pub access_token: SecretString,
	/// Scope string the server actually granted.
	pub scope: String,
	/// Absolute expiry instant, receipt time plus `expires_in`.
	pub expires_at: OffsetDateTime,
}
impl Debug for BearerGrant {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("BearerGrant")
			.field("access_token", &"<redacted>")
			.field("scope", &self.scope)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

/// Wire shape of the token endpoint's JSON reply.
#[derive(Debug, Deserialize)]
struct TokenEndpointResponse {
	token_type: String,
	access_token: String,
	scope: String,
	expires_in: u64,
}

/// Maps HTTP transport failures into crate [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts a transport error raised while calling `endpoint`.
	fn map_transport_error(&self, endpoint: &Url, error: E) -> Error;
}

/// Default mapper for reqwest-backed transports.
///
/// Builder misuse maps to configuration errors, request timeouts surface as
/// a failed exchange per the timeout contract, and everything else is a
/// plain transport failure.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(&self, endpoint: &Url, error: ReqwestError) -> Error {
		if error.is_builder() {
			return ConfigError::from(error).into();
		}
		if error.is_timeout() {
			return Error::TokenExchangeFailed {
				status: error.status().map(|code| code.as_u16()),
				body: format!("Request to {endpoint} timed out."),
			};
		}

		TransportError::from(error).into()
	}
}

/// Performs the code-for-token exchange for one endpoint configuration.
pub struct CodeExchanger<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	http_client: Arc<C>,
	transport_mapper: Arc<M>,
	store: Arc<dyn CredentialStore>,
}
impl<C, M> CodeExchanger<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates an exchanger over the provided transport, mapper, and store.
	pub fn new(
		http_client: Arc<C>,
		transport_mapper: Arc<M>,
		store: Arc<dyn CredentialStore>,
	) -> Self {
		Self { http_client, transport_mapper, store }
	}

	/// Exchanges an authorization code for a [`BearerGrant`].
	pub async fn exchange(&self, config: &EndpointConfig, code: &str) -> Result<BearerGrant> {
		const KIND: FlowKind = FlowKind::Exchange;

		let span = FlowSpan::new(KIND, "exchange");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.exchange_inner(config, code)).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	async fn exchange_inner(&self, config: &EndpointConfig, code: &str) -> Result<BearerGrant> {
		let (basic, pending_secret) = self.client_authentication(config).await?;
		let form = [("grant_type", "authorization_code"), ("code", code)];
		let request = TokenEndpointRequest {
			url: &config.token_endpoint,
			form: &form,
			basic: basic.as_ref(),
		};
		let reply = self
			.http_client
			.post_form(request)
			.await
			.map_err(|e| self.transport_mapper.map_transport_error(&config.token_endpoint, e))?;

		if !reply.is_success() {
			return Err(Error::TokenExchangeFailed {
				status: Some(reply.status),
				body: reply.body_text(),
			});
		}

		let mut deserializer = serde_json::Deserializer::from_slice(&reply.body);
		let response: TokenEndpointResponse = serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| Error::TokenResponseParse { source })?;

		if response.token_type != "bearer" {
			return Err(Error::UnsupportedTokenType {
				token_type: response.token_type,
				client_id: config.client_identifier.clone(),
				url: config.token_endpoint.to_string(),
			});
		}

		let expires_at = expiry_deadline(response.expires_in)?;

		// The endpoint accepted the secret; persist it now.
		if let Some(entry) = pending_secret {
			entry.commit().await.map_err(Error::from)?;
		}

		Ok(BearerGrant {
			access_token: SecretString::new(response.access_token),
			scope: response.scope,
			expires_at,
		})
	}

	async fn client_authentication(
		&self,
		config: &EndpointConfig,
	) -> Result<(Option<BasicCredentials>, Option<PendingEntry>)> {
		match config.client_secret_method {
			ClientSecretMethod::None => Ok((None, None)),
			ClientSecretMethod::PromptForSecret => {
				let attrs = SecretAttributes::for_token_endpoint(
					&config.token_endpoint,
					&config.client_identifier,
					&config.scope,
				);
				let found = self
					.store
					.find_or_create_client_secret(&attrs)
					.await
					.map_err(Error::from)?;
				let basic = BasicCredentials {
					username: config.client_identifier.clone(),
					secret: found.secret,
				};

				Ok((Some(basic), found.pending))
			},
		}
	}
}
impl<C, M> Debug for CodeExchanger<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("CodeExchanger(..)")
	}
}

fn expiry_deadline(expires_in: u64) -> Result<OffsetDateTime> {
	if expires_in == 0 {
		return Err(ConfigError::NonPositiveExpiresIn.into());
	}

	let seconds = i64::try_from(expires_in).map_err(|_| ConfigError::ExpiresInOutOfRange)?;

	Ok(OffsetDateTime::now_utc() + Duration::seconds(seconds))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn expiry_deadline_validates_bounds() {
		assert!(matches!(
			expiry_deadline(0),
			Err(Error::Config(ConfigError::NonPositiveExpiresIn))
		));
		assert!(matches!(
			expiry_deadline(u64::MAX),
			Err(Error::Config(ConfigError::ExpiresInOutOfRange))
		));

		let deadline =
			expiry_deadline(3600).expect("A one-hour lifetime should produce a deadline.");
		let delta = deadline - OffsetDateTime::now_utc();

		assert!(delta > Duration::minutes(59) && delta <= Duration::hours(1));
	}

	#[test]
	fn token_response_parses_the_wire_shape() {
		let body = br#"{"token_type":"bearer","access_token":"XYZ","scope":"read","expires_in":3600}"#;
		let mut deserializer = serde_json::Deserializer::from_slice(body);
		let response: TokenEndpointResponse =
			serde_path_to_error::deserialize(&mut deserializer)
				.expect("Wire fixture should deserialize.");

		assert_eq!(response.token_type, "bearer");
		assert_eq!(response.access_token, "XYZ");
		assert_eq!(response.scope, "read");
		assert_eq!(response.expires_in, 3600);
	}

	#[test]
	fn grant_debug_redacts_the_token() {
		let grant = BearerGrant {
			access_token: SecretString::new("XYZ"),
			scope: "read".into(),
			expires_at: OffsetDateTime::now_utc(),
		};

		assert!(!format!("{grant:?}").contains("XYZ"));
	}
}
