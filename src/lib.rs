//! Transparent OAuth 2.0 bearer authentication for Rust HTTP clients—interpose endpoints once
//! and every matching request mints, caches, and supplies its own `Authorization` header.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod endpoint;
pub mod error;
pub mod exchange;
pub mod flows;
pub mod http;
pub mod obs;
pub mod prompt;
pub mod registry;
pub mod scheme;
pub mod secret;
pub mod store;
#[cfg(feature = "reqwest")]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests and demos.

	pub use crate::_prelude::*;

	// self
	use crate::{
		exchange::ReqwestTransportErrorMapper,
		flows::Interposer,
		http::ReqwestHttpClient,
		prompt::StaticRedirectPrompt,
		registry::EndpointRegistry,
		store::{CredentialStore, MemoryStore},
	};

	/// Interposer type alias used by reqwest-backed integration tests.
	pub type ReqwestTestInterposer = Interposer<ReqwestHttpClient, ReqwestTransportErrorMapper>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs an [`Interposer`] backed by a fresh registry, the provided memory store, a
	/// static redirect prompt, and the reqwest transport used across integration tests.
	pub fn build_reqwest_test_interposer(
		store: Arc<MemoryStore>,
		redirect: &str,
	) -> (ReqwestTestInterposer, Arc<EndpointRegistry>) {
		let registry = Arc::new(EndpointRegistry::new());
		let store_dyn: Arc<dyn CredentialStore> = store;
		let prompt = Arc::new(StaticRedirectPrompt::new(redirect));
		let interposer = Interposer::with_http_client(
			registry.clone(),
			store_dyn,
			prompt,
			test_reqwest_http_client(),
			Arc::new(ReqwestTransportErrorMapper),
		);

		(interposer, registry)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use httpmock as _;
