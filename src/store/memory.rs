//! Thread-safe in-memory [`CredentialStore`] for local development and tests.

// self
use crate::{
	_prelude::*,
	prompt::SecretPrompt,
	secret::SecretString,
	store::{
		CredentialStore, FoundSecret, PendingEntry, SecretAttributes, StoreError, StoreFuture,
		StoredCredential,
	},
};

type StoreMap = Arc<RwLock<HashMap<SecretAttributes, StoredCredential>>>;

/// Keeps credentials in-process; optionally minting client secrets through a
/// [`SecretPrompt`].
#[derive(Clone, Default)]
pub struct MemoryStore {
	map: StoreMap,
	secret_prompt: Option<Arc<dyn SecretPrompt>>,
}
impl MemoryStore {
	/// Creates an empty store without a secret prompt.
	pub fn new() -> Self {
		Self::default()
	}

	/// Attaches the prompt consulted when a client secret is absent.
	pub fn with_secret_prompt(mut self, prompt: Arc<dyn SecretPrompt>) -> Self {
		self.secret_prompt = Some(prompt);

		self
	}

	/// Seeds a credential directly, bypassing the two-phase staging.
	pub fn seed(&self, attrs: SecretAttributes, credential: StoredCredential) {
		self.map.write().insert(attrs, credential);
	}

	/// Returns the raw record for the attributes, expired or not.
	pub fn get(&self, attrs: &SecretAttributes) -> Option<StoredCredential> {
		self.map.read().get(attrs).cloned()
	}

	/// Number of persisted records.
	pub fn len(&self) -> usize {
		self.map.read().len()
	}

	/// Returns true when nothing is persisted.
	pub fn is_empty(&self) -> bool {
		self.map.read().is_empty()
	}

	fn fetch_live(map: &StoreMap, attrs: &SecretAttributes) -> Option<StoredCredential> {
		let now = OffsetDateTime::now_utc();

		map.read().get(attrs).filter(|credential| credential.is_live_at(now)).cloned()
	}

	fn staged_insert(map: StoreMap, attrs: SecretAttributes, credential: StoredCredential) -> PendingEntry {
		PendingEntry::new(move || {
			Box::pin(async move {
				map.write().insert(attrs, credential);

				Ok(())
			})
		})
	}
}
impl Debug for MemoryStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("MemoryStore")
			.field("records", &self.map.read().len())
			.field("secret_prompt", &self.secret_prompt.is_some())
			.finish()
	}
}
impl CredentialStore for MemoryStore {
	fn find_secret<'a>(
		&'a self,
		attrs: &'a SecretAttributes,
	) -> StoreFuture<'a, Option<FoundSecret>> {
		let map = self.map.clone();

		Box::pin(async move {
			Ok(Self::fetch_live(&map, attrs)
				.map(|credential| FoundSecret { secret: credential.secret, pending: None }))
		})
	}

	fn find_or_create_client_secret<'a>(
		&'a self,
		attrs: &'a SecretAttributes,
	) -> StoreFuture<'a, FoundSecret> {
		Box::pin(async move {
			if let Some(credential) = Self::fetch_live(&self.map, attrs) {
				return Ok(FoundSecret { secret: credential.secret, pending: None });
			}

			let prompt = self
				.secret_prompt
				.as_ref()
				.ok_or_else(|| StoreError::MissingClientSecret { user: attrs.user.clone() })?;
			let secret = prompt
				.client_secret(attrs)
				.await
				.ok_or_else(|| StoreError::MissingClientSecret { user: attrs.user.clone() })?;
			let staged = StoredCredential { secret: secret.clone(), expires_at: None };
			let pending = Self::staged_insert(self.map.clone(), attrs.clone(), staged);

			Ok(FoundSecret { secret, pending: Some(pending) })
		})
	}

	fn stage_bearer<'a>(
		&'a self,
		attrs: &'a SecretAttributes,
		secret: SecretString,
		expires_at: OffsetDateTime,
	) -> StoreFuture<'a, PendingEntry> {
		let map = self.map.clone();
		let attrs = attrs.clone();

		Box::pin(async move {
			Ok(Self::staged_insert(map, attrs, StoredCredential { secret, expires_at: Some(expires_at) }))
		})
	}
}
