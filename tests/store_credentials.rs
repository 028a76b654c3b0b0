#![cfg(feature = "reqwest")]

// std
use std::{env, path::PathBuf, process};
// self
use oauth2_interpose::{
	_preludet::*,
	prompt::StaticSecretPrompt,
	secret::SecretString,
	store::{CredentialStore, FileStore, MemoryStore, SecretAttributes, StoreError, StoredCredential},
};

fn attrs(scope: &str) -> SecretAttributes {
	SecretAttributes {
		user: "myapp".into(),
		host: "api.example.com".into(),
		port: Some(443),
		path: "/data".into(),
		scope: scope.into(),
	}
}

fn temp_path() -> PathBuf {
	let unique = format!(
		"oauth2_interpose_store_it_{}_{}.json",
		process::id(),
		OffsetDateTime::now_utc().unix_timestamp_nanos(),
	);

	env::temp_dir().join(unique)
}

#[tokio::test]
async fn scope_partitions_credentials() {
	let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::new());
	let deadline = OffsetDateTime::now_utc() + Duration::hours(1);

	store
		.stage_bearer(&attrs("read"), SecretString::new("read-token"), deadline)
		.await
		.expect("Staging the read-scoped bearer should succeed.")
		.commit()
		.await
		.expect("Committing the read-scoped bearer should succeed.");

	let read_hit = store
		.find_secret(&attrs("read"))
		.await
		.expect("Read-scoped lookup should succeed.")
		.expect("Read-scoped bearer should be present.");

	assert_eq!(read_hit.secret.expose(), "read-token");
	assert!(
		store
			.find_secret(&attrs("read write"))
			.await
			.expect("Write-scoped lookup should succeed.")
			.is_none(),
		"A differently scoped credential must not be served."
	);
}

#[tokio::test]
async fn replacement_overwrites_instead_of_updating() {
	let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::new());
	let first_deadline = OffsetDateTime::now_utc() + Duration::minutes(5);
	let second_deadline = OffsetDateTime::now_utc() + Duration::hours(1);

	store
		.stage_bearer(&attrs("read"), SecretString::new("first"), first_deadline)
		.await
		.expect("Staging the first bearer should succeed.")
		.commit()
		.await
		.expect("Committing the first bearer should succeed.");
	store
		.stage_bearer(&attrs("read"), SecretString::new("second"), second_deadline)
		.await
		.expect("Staging the replacement bearer should succeed.")
		.commit()
		.await
		.expect("Committing the replacement bearer should succeed.");

	let hit = store
		.find_secret(&attrs("read"))
		.await
		.expect("Lookup should succeed after replacement.")
		.expect("The replacement bearer should be present.");

	assert_eq!(hit.secret.expose(), "second");
}

#[tokio::test]
async fn file_store_round_trips_through_the_trait() {
	let path = temp_path();
	let deadline = OffsetDateTime::now_utc() + Duration::hours(1);

	{
		let store: Arc<dyn CredentialStore> =
			Arc::new(FileStore::open(&path).expect("Failed to open file store snapshot."));

		store
			.stage_bearer(&attrs("read"), SecretString::new("XYZ"), deadline)
			.await
			.expect("Staging a bearer entry should succeed.")
			.commit()
			.await
			.expect("Committing the staged entry should succeed.");
	}

	let reopened: Arc<dyn CredentialStore> =
		Arc::new(FileStore::open(&path).expect("Failed to reopen file store snapshot."));
	let found = reopened
		.find_secret(&attrs("read"))
		.await
		.expect("Lookup should succeed after reopen.")
		.expect("Committed bearer should survive a reopen.");

	assert_eq!(found.secret.expose(), "XYZ");

	std::fs::remove_file(&path).unwrap_or_else(|e| {
		panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
	});
}

#[tokio::test]
async fn file_store_create_path_commits_client_secrets() {
	let path = temp_path();
	let store = FileStore::open(&path)
		.expect("Failed to open file store snapshot.")
		.with_secret_prompt(Arc::new(StaticSecretPrompt::new("hunter2")));
	let token_attrs = SecretAttributes {
		user: "myapp".into(),
		host: "auth.example.com".into(),
		port: Some(443),
		path: "/token".into(),
		scope: "read".into(),
	};
	let found = store
		.find_or_create_client_secret(&token_attrs)
		.await
		.expect("Create path should mint a secret through the prompt.");

	assert_eq!(found.secret.expose(), "hunter2");

	found
		.pending
		.expect("Freshly minted secrets must stay staged.")
		.commit()
		.await
		.expect("Committing the staged secret should succeed.");

	let reopened = FileStore::open(&path).expect("Failed to reopen file store snapshot.");
	let persisted = reopened
		.find_secret(&token_attrs)
		.await
		.expect("Lookup should succeed after reopen.")
		.expect("Committed client secret should survive a reopen.");

	assert_eq!(persisted.secret.expose(), "hunter2");

	std::fs::remove_file(&path).unwrap_or_else(|e| {
		panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
	});
}

#[tokio::test]
async fn expired_bearers_trigger_a_fresh_flow_lookup() {
	let store = MemoryStore::new();

	store.seed(
		attrs("read"),
		StoredCredential {
			secret: SecretString::new("stale"),
			expires_at: Some(OffsetDateTime::now_utc() - Duration::minutes(1)),
		},
	);

	let as_dyn: &dyn CredentialStore = &store;

	assert!(
		as_dyn
			.find_secret(&attrs("read"))
			.await
			.expect("Lookup should succeed.")
			.is_none(),
		"Expired bearers must read as absent so the flow re-authorizes."
	);
}

#[tokio::test]
async fn missing_secret_error_names_the_user() {
	let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::new());
	let err = store
		.find_or_create_client_secret(&attrs("read"))
		.await
		.expect_err("Create path without a prompt must fail.");

	match err {
		StoreError::MissingClientSecret { user } => assert_eq!(user, "myapp"),
		other => panic!("Unexpected error variant: {other:?}."),
	}
}
