//! Auth-scheme adapter exposed to generic HTTP clients.
//!
//! A generic HTTP client calls [`BearerScheme::authorize`] for every outgoing
//! request; the scheme answers with a ready-to-send `Authorization` header
//! value for interposed URLs and `None` for everything else, so inapplicable
//! URLs fall through to weaker schemes without an error. [`NAME`] and
//! [`RATING`] are published so clients can register the scheme above
//! unauthenticated defaults.

// self
use crate::{
	_prelude::*,
	exchange::TransportErrorMapper,
	flows::Interposer,
	http::TokenHttpClient,
};

/// Scheme name registered with the HTTP client.
pub const NAME: &str = "oauth";
/// Registration rating; higher wins when several schemes match a URL.
pub const RATING: u8 = 9;

/// Boxed future returned by [`AuthScheme::authorize`].
pub type SchemeFuture<'a> = Pin<Box<dyn Future<Output = Result<Option<String>>> + 'a + Send>>;

/// Callback contract between an HTTP client and a named auth scheme.
pub trait AuthScheme
where
	Self: Send + Sync,
{
	/// Name the scheme registers under.
	fn name(&self) -> &'static str;

	/// Rating used to pick between several applicable schemes.
	fn rating(&self) -> u8;

	/// Produces the `Authorization` header value for a request URL, or
	/// `None` when the scheme does not apply to it.
	fn authorize<'a>(&'a self, url: &'a Url) -> SchemeFuture<'a>;
}

/// Bearer scheme backed by an [`Interposer`].
pub struct BearerScheme<C, M>(Arc<Interposer<C, M>>)
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>;
impl<C, M> Clone for BearerScheme<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self(self.0.clone())
	}
}
impl<C, M> Debug for BearerScheme<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("BearerScheme").field(&self.0).finish()
	}
}
impl<C, M> BearerScheme<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Wraps an interposer as a registrable scheme.
	pub fn new(interposer: Arc<Interposer<C, M>>) -> Self {
		Self(interposer)
	}

	/// Resolves the header value for `url`, or `None` when not interposed.
	pub async fn authorize(&self, url: &Url) -> Result<Option<String>> {
		match self.0.bearer_token(url).await {
			Ok(token) => Ok(Some(format!("Bearer {}", token.expose()))),
			Err(Error::NotConfigured { .. }) => Ok(None),
			Err(e) => Err(e),
		}
	}
}
impl<C, M> AuthScheme for BearerScheme<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn name(&self) -> &'static str {
		NAME
	}

	fn rating(&self) -> u8 {
		RATING
	}

	fn authorize<'a>(&'a self, url: &'a Url) -> SchemeFuture<'a> {
		Box::pin(BearerScheme::authorize(self, url))
	}
}
