//! Simple file-backed [`CredentialStore`] for lightweight deployments and bots.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
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

/// Persists credentials to a JSON snapshot after each committed write.
#[derive(Clone)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<HashMap<SecretAttributes, StoredCredential>>>,
	secret_prompt: Option<Arc<dyn SecretPrompt>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = if path.exists() { Self::load_snapshot(&path)? } else { HashMap::new() };

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)), secret_prompt: None })
	}

	/// Attaches the prompt consulted when a client secret is absent.
	pub fn with_secret_prompt(mut self, prompt: Arc<dyn SecretPrompt>) -> Self {
		self.secret_prompt = Some(prompt);

		self
	}

	fn load_snapshot(
		path: &Path,
	) -> Result<HashMap<SecretAttributes, StoredCredential>, StoreError> {
		let metadata = path.metadata().map_err(|e| StoreError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(HashMap::new());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;
		let entries: Vec<(SecretAttributes, StoredCredential)> = serde_json::from_slice(&bytes)
			.map_err(|e| StoreError::Serialization {
				message: format!("Failed to parse {}: {e}", path.display()),
			})?;

		Ok(entries.into_iter().collect())
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}
		Ok(())
	}

	fn persist_locked(
		&self,
		contents: &HashMap<SecretAttributes, StoredCredential>,
	) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let snapshot: Vec<_> = contents.iter().collect();
		let serialized =
			serde_json::to_vec_pretty(&snapshot).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize store snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}

	fn fetch_live(&self, attrs: &SecretAttributes) -> Option<StoredCredential> {
		let now = OffsetDateTime::now_utc();

		self.inner.read().get(attrs).filter(|credential| credential.is_live_at(now)).cloned()
	}

	fn commit_now(
		&self,
		attrs: SecretAttributes,
		credential: StoredCredential,
	) -> Result<(), StoreError> {
		let mut guard = self.inner.write();

		guard.insert(attrs, credential);
		self.persist_locked(&guard)
	}

	fn staged_insert(&self, attrs: SecretAttributes, credential: StoredCredential) -> PendingEntry {
		let store = self.clone();

		PendingEntry::new(move || Box::pin(async move { store.commit_now(attrs, credential) }))
	}
}
impl Debug for FileStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("FileStore")
			.field("path", &self.path)
			.field("records", &self.inner.read().len())
			.field("secret_prompt", &self.secret_prompt.is_some())
			.finish()
	}
}
impl CredentialStore for FileStore {
	fn find_secret<'a>(
		&'a self,
		attrs: &'a SecretAttributes,
	) -> StoreFuture<'a, Option<FoundSecret>> {
		Box::pin(async move {
			Ok(self
				.fetch_live(attrs)
				.map(|credential| FoundSecret { secret: credential.secret, pending: None }))
		})
	}

	fn find_or_create_client_secret<'a>(
		&'a self,
		attrs: &'a SecretAttributes,
	) -> StoreFuture<'a, FoundSecret> {
		Box::pin(async move {
			if let Some(credential) = self.fetch_live(attrs) {
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
			let pending = self.staged_insert(attrs.clone(), staged);

			Ok(FoundSecret { secret, pending: Some(pending) })
		})
	}

	fn stage_bearer<'a>(
		&'a self,
		attrs: &'a SecretAttributes,
		secret: SecretString,
		expires_at: OffsetDateTime,
	) -> StoreFuture<'a, PendingEntry> {
		Box::pin(async move {
			Ok(self.staged_insert(
				attrs.clone(),
				StoredCredential { secret, expires_at: Some(expires_at) },
			))
		})
	}
}
