//! URL normalization used for registry and credential-store keying.

// self
use crate::_prelude::*;

/// Stable registry key derived from a URL with its query and fragment removed.
///
/// Two request URLs that differ only in query string or fragment normalize to
/// the same key, so they resolve to the same interposed configuration. The
/// userinfo component is dropped as well; only scheme, host, port, and path
/// take part in the key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndpointKey(String);
impl EndpointKey {
	/// Normalizes a URL into its registry key.
	pub fn normalize(url: &Url) -> Self {
		let mut bare = url.clone();

		bare.set_query(None);
		bare.set_fragment(None);

		// Cannot-be-a-base URLs have no userinfo to strip.
		let _ = bare.set_username("");
		let _ = bare.set_password(None);

		Self(bare.into())
	}

	/// Returns the normalized string form.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Display for EndpointKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Returns the explicit port of a URL, defaulting to 443 for HTTPS.
///
/// Any other scheme without an explicit port yields `None`; callers decide how
/// to key portless URLs.
pub fn effective_port(url: &Url) -> Option<u16> {
	url.port().or_else(|| (url.scheme() == "https").then_some(443))
}
