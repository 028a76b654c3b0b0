//! Bearer-token resolution for interposed URLs.
//!
//! [`Interposer::bearer_token`] is the central operation: registry lookup,
//! credential-store cache check, interactive authorization, code exchange,
//! and persistence, in that order. A cached token is returned as-is without
//! a flow-level expiry comparison; whatever liveness policy the store applies
//! at fetch time is the policy. Per-key in-flight guards serialize concurrent
//! calls for the same credential so one interactive flow services them all
//! instead of stacking duplicate prompts.

// self
use crate::{
	_prelude::*,
	exchange::{CodeExchanger, TransportErrorMapper},
	flows::{Interposer, common},
	http::TokenHttpClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	secret::SecretString,
	store::SecretAttributes,
};

impl<C, M> Interposer<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Resolves the bearer token for a request URL, minting one if needed.
	///
	/// Fails with [`Error::NotConfigured`] when the URL is not interposed;
	/// the scheme adapter translates that into "scheme inapplicable". Every
	/// other failure is terminal for this call, and nothing is persisted on
	/// a failure path except a client secret the token endpoint has already
	/// accepted.
	pub async fn bearer_token(&self, url: &Url) -> Result<SecretString> {
		const KIND: FlowKind = FlowKind::Bearer;

		let span = FlowSpan::new(KIND, "bearer_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let config = self.registry.lookup(url).ok_or_else(|| Error::NotConfigured {
					url: crate::endpoint::EndpointKey::normalize(url).to_string(),
				})?;
				let attrs =
					SecretAttributes::for_resource(url, &config.client_identifier, &config.scope);
				let guard = common::flow_guard(self, &attrs);
				let _in_flight = guard.lock().await;

				// Presence is trusted; liveness is the store's concern.
				if let Some(found) =
					self.store.find_secret(&attrs).await.map_err(Error::from)?
				{
					return Ok(found.secret);
				}

				let authorize_url = common::build_authorization_url(&config);
				let redirect = self.redirect_prompt.redirect_url(&authorize_url).await;
				let code = common::extract_code(&redirect)?;
				let exchanger = CodeExchanger::new(
					self.http_client.clone(),
					self.transport_mapper.clone(),
					self.store.clone(),
				);
				let grant = exchanger.exchange(&config, &code).await?;

				if grant.scope != config.scope {
					return Err(Error::ScopeMismatch {
						requested: config.scope.clone(),
						granted: grant.scope,
					});
				}

				self.store
					.stage_bearer(&attrs, grant.access_token.clone(), grant.expires_at)
					.await
					.map_err(Error::from)?
					.commit()
					.await
					.map_err(Error::from)?;

				Ok(grant.access_token)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}
