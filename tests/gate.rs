//! Integration tests for the gate, store manager and credential store working
//! together over in-memory backends.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use chrono::Utc;
use depreg::auth::{CredentialStore, TokenService, UserPassAuth};
use depreg::binstore::{BinStore, KvBinStore};
use depreg::error::{Error, Result};
use depreg::gate::{Gate, can_user};
use depreg::manager::StoreManager;
use depreg::metastore::{KvMetaStore, MetaStore};
use depreg::resolver::Resolver;
use depreg::store::SqliteKv;
use depreg::types::{Access, Identity, Import, User, Version};

const URL: &str = "example.com/pkg";
const PASSWORD: &str = "secret1";

/// Binary store whose writes and deletes can be made to fail on demand.
struct FlakyBinStore {
    inner: KvBinStore,
    fail_add: AtomicBool,
    fail_delete: AtomicBool,
}

impl FlakyBinStore {
    fn new() -> Self {
        Self {
            inner: KvBinStore::new(SqliteKv::open_in_memory().unwrap()),
            fail_add: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
        }
    }

    fn io_error() -> Error {
        Error::Io(std::io::Error::other("disk unavailable"))
    }
}

impl BinStore for FlakyBinStore {
    fn add(&self, artifact_id: &str, content: &[u8]) -> Result<()> {
        if self.fail_add.load(Ordering::SeqCst) {
            return Err(Self::io_error());
        }
        self.inner.add(artifact_id, content)
    }

    fn get(&self, artifact_id: &str) -> Result<Vec<u8>> {
        self.inner.get(artifact_id)
    }

    fn delete(&self, artifact_id: &str) -> Result<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(Self::io_error());
        }
        self.inner.delete(artifact_id)
    }
}

struct TestContext {
    gate: Gate,
    auth: Arc<dyn CredentialStore>,
    tokens: Arc<TokenService>,
    bin: Arc<FlakyBinStore>,
}

impl TestContext {
    fn new() -> Self {
        let tokens = Arc::new(TokenService::new(
            b"integration-key".to_vec(),
            Duration::from_secs(60),
        ));
        let auth: Arc<dyn CredentialStore> = Arc::new(UserPassAuth::new(
            SqliteKv::open_in_memory().unwrap(),
            Arc::clone(&tokens),
        ));
        let bin = Arc::new(FlakyBinStore::new());
        let meta: Arc<dyn MetaStore> =
            Arc::new(KvMetaStore::new(SqliteKv::open_in_memory().unwrap()));
        let store = Arc::new(StoreManager::new(
            Arc::clone(&bin) as Arc<dyn BinStore>,
            meta,
        ));

        Self {
            gate: Gate::new(Arc::clone(&auth), store, Arc::clone(&tokens)),
            auth,
            tokens,
            bin,
        }
    }

    fn user(&self, user: User) -> String {
        let name = user.username.clone();
        self.auth.add_user(&user).unwrap();
        self.auth.set_password(&name, PASSWORD).unwrap();
        self.gate.login(&name, PASSWORD).unwrap()
    }

    fn publish(&self, token: &str, import: &Import, name: &str, content: &[u8]) -> Version {
        let version = Version::new(&import.url, name, "zip");
        self.gate.add(token, import, &version, content).unwrap();
        version
    }
}

fn alice_import() -> Import {
    Import::new(URL).with_owner("alice")
}

#[test]
fn test_owner_admin_and_anonymous_scenario() {
    let ctx = TestContext::new();
    let alice = ctx.user(User::new("alice"));
    let bob = ctx.user(User::new("bob"));
    let root = ctx.user(User::admin("root"));

    ctx.publish(&alice, &alice_import(), "v1", b"one");

    let update = alice_import().with_reader("carol");
    assert!(matches!(
        ctx.gate.update_import(&bob, &update),
        Err(Error::NotAuthorized)
    ));
    ctx.gate.update_import(&root, &update).unwrap();

    let import = ctx.gate.get("", URL).unwrap();
    assert!(import.is_reader("carol"));
    assert_eq!(ctx.gate.get_version_binary("", URL, "v1").unwrap(), b"one");
}

#[test]
fn test_disabled_user_denied_everywhere() {
    let ctx = TestContext::new();
    let alice = ctx.user(User::new("alice"));
    ctx.publish(&alice, &alice_import(), "v1", b"one");

    let mut record = ctx.auth.get_user("alice").unwrap();
    record.disabled = true;
    ctx.auth.update_user("alice", &record).unwrap();

    assert!(matches!(ctx.gate.get(&alice, URL), Err(Error::NotAuthorized)));
    assert!(matches!(
        ctx.gate.delete_import(&alice, URL),
        Err(Error::NotAuthorized)
    ));

    let root = User {
        disabled: true,
        ..User::admin("root")
    };
    assert!(can_user(&Identity::Authenticated(root), &alice_import(), Access::Read).is_err());
}

#[test]
fn test_private_import_visibility() {
    let ctx = TestContext::new();
    let alice = ctx.user(User::new("alice"));
    let carol = ctx.user(User::new("carol"));
    let bob = ctx.user(User::new("bob"));

    let import = alice_import().with_reader("carol").private(true);
    ctx.publish(&alice, &import, "v1", b"one");

    ctx.gate.get(&carol, URL).unwrap();
    assert_eq!(ctx.gate.get_version_binary(&carol, URL, "").unwrap(), b"one");
    assert!(matches!(ctx.gate.get(&bob, URL), Err(Error::NotAuthorized)));
    assert!(matches!(ctx.gate.get("", URL), Err(Error::NotAuthorized)));
    assert!(matches!(
        ctx.gate.get_versions("", URL),
        Err(Error::NotAuthorized)
    ));
}

#[test]
fn test_missing_import_reported_before_authorization() {
    let ctx = TestContext::new();
    assert!(matches!(ctx.gate.get("", URL), Err(Error::NotFound)));
    assert!(matches!(
        ctx.gate.delete_import("", URL),
        Err(Error::NotFound)
    ));
}

#[test]
fn test_first_publish_must_list_publisher_as_owner() {
    let ctx = TestContext::new();
    let bob = ctx.user(User::new("bob"));
    let root = ctx.user(User::admin("root"));

    let version = Version::new(URL, "v1", "zip");
    assert!(matches!(
        ctx.gate.add(&bob, &alice_import(), &version, b"one"),
        Err(Error::NotAuthorized)
    ));
    assert!(matches!(
        ctx.gate.add("", &Import::new(URL), &version, b"one"),
        Err(Error::NotAuthorized)
    ));

    ctx.gate.add(&root, &alice_import(), &version, b"one").unwrap();
    assert!(ctx.gate.get("", URL).unwrap().is_owner("alice"));
}

#[test]
fn test_existing_import_checked_against_stored_owners() {
    let ctx = TestContext::new();
    let alice = ctx.user(User::new("alice"));
    let bob = ctx.user(User::new("bob"));
    ctx.publish(&alice, &alice_import(), "v1", b"one");

    // Claiming ownership in the submitted record does not help.
    let forged = Import::new(URL).with_owner("bob");
    let version = Version::new(URL, "v2", "zip");
    assert!(matches!(
        ctx.gate.add(&bob, &forged, &version, b"two"),
        Err(Error::NotAuthorized)
    ));
    assert_eq!(ctx.gate.get_versions("", URL).unwrap().len(), 1);
}

#[test]
fn test_duplicate_version_rejected() {
    let ctx = TestContext::new();
    let alice = ctx.user(User::new("alice"));
    ctx.publish(&alice, &alice_import(), "v1", b"one");

    let dup = Version::new(URL, "v1", "zip");
    assert!(matches!(
        ctx.gate.add(&alice, &alice_import(), &dup, b"other"),
        Err(Error::AlreadyExists)
    ));
    assert_eq!(ctx.gate.get_versions("", URL).unwrap().len(), 1);
    assert_eq!(ctx.gate.get_version_binary("", URL, "v1").unwrap(), b"one");
}

#[test]
fn test_latest_version() {
    let ctx = TestContext::new();
    let alice = ctx.user(User::new("alice"));
    ctx.publish(&alice, &alice_import(), "v1", b"one");
    ctx.publish(&alice, &alice_import(), "v2", b"two");

    assert_eq!(ctx.gate.get_version("", URL, "").unwrap().name, "v2");
    assert_eq!(ctx.gate.get_version_binary("", URL, "").unwrap(), b"two");
    assert!(matches!(
        ctx.gate.get_version("", URL, "v3"),
        Err(Error::VersionNotFound)
    ));
}

#[test]
fn test_disabled_version_hidden_from_readers() {
    let ctx = TestContext::new();
    let alice = ctx.user(User::new("alice"));
    let bob = ctx.user(User::new("bob"));
    ctx.publish(&alice, &alice_import(), "v1", b"one");

    assert!(matches!(
        ctx.gate.disable_version(&bob, URL, "v1"),
        Err(Error::NotAuthorized)
    ));
    ctx.gate.disable_version(&alice, URL, "v1").unwrap();

    assert!(matches!(
        ctx.gate.get_version_binary(&bob, URL, "v1"),
        Err(Error::Disabled)
    ));
    assert!(matches!(
        ctx.gate.get_version_binary("", URL, "v1"),
        Err(Error::Disabled)
    ));
    assert_eq!(ctx.gate.get_version_binary(&alice, URL, "v1").unwrap(), b"one");
    assert!(!ctx.gate.get_version("", URL, "v1").unwrap().enabled);

    ctx.gate.enable_version(&alice, URL, "v1").unwrap();
    assert_eq!(ctx.gate.get_version_binary(&bob, URL, "v1").unwrap(), b"one");
}

#[test]
fn test_disabled_import_hidden_from_readers() {
    let ctx = TestContext::new();
    let alice = ctx.user(User::new("alice"));
    ctx.publish(&alice, &alice_import(), "v1", b"one");

    ctx.gate.disable_import(&alice, URL).unwrap();
    assert!(!ctx.gate.get("", URL).unwrap().enabled);
    assert!(matches!(
        ctx.gate.get_version_binary("", URL, ""),
        Err(Error::Disabled)
    ));

    ctx.gate.enable_import(&alice, URL).unwrap();
    assert_eq!(ctx.gate.get_version_binary("", URL, "").unwrap(), b"one");
}

#[test]
fn test_delete_version_requires_write() {
    let ctx = TestContext::new();
    let alice = ctx.user(User::new("alice"));
    let bob = ctx.user(User::new("bob"));
    ctx.publish(&alice, &alice_import(), "v1", b"one");

    assert!(matches!(
        ctx.gate.delete_version(&bob, URL, "v1"),
        Err(Error::NotAuthorized)
    ));
    assert!(matches!(
        ctx.gate.delete_version("", URL, "v1"),
        Err(Error::NotAuthorized)
    ));

    ctx.gate.delete_version(&alice, URL, "v1").unwrap();
    assert!(ctx.gate.get_versions("", URL).unwrap().is_empty());
}

#[test]
fn test_delete_import_removes_everything() {
    let ctx = TestContext::new();
    let alice = ctx.user(User::new("alice"));
    let v1 = ctx.publish(&alice, &alice_import(), "v1", b"one");
    let v2 = ctx.publish(&alice, &alice_import(), "v2", b"two");

    ctx.gate.delete_import(&alice, URL).unwrap();

    assert!(matches!(ctx.gate.get("", URL), Err(Error::NotFound)));
    for version in [v1, v2] {
        assert!(matches!(
            ctx.bin.get(&version.artifact_id),
            Err(Error::NotFound)
        ));
    }
}

#[test]
fn test_failed_binary_write_leaves_dangling_version() {
    let ctx = TestContext::new();
    let alice = ctx.user(User::new("alice"));

    ctx.bin.fail_add.store(true, Ordering::SeqCst);
    let version = Version::new(URL, "v1", "zip");
    assert!(matches!(
        ctx.gate.add(&alice, &alice_import(), &version, b"one"),
        Err(Error::Io(_))
    ));

    assert_eq!(ctx.gate.get_version("", URL, "v1").unwrap(), version);
    assert!(matches!(
        ctx.gate.get_version_binary("", URL, "v1"),
        Err(Error::NotFound)
    ));
}

#[test]
fn test_delete_import_ignores_binary_failures() {
    let ctx = TestContext::new();
    let alice = ctx.user(User::new("alice"));
    let version = ctx.publish(&alice, &alice_import(), "v1", b"one");

    ctx.bin.fail_delete.store(true, Ordering::SeqCst);
    ctx.gate.delete_import(&alice, URL).unwrap();

    assert!(matches!(ctx.gate.get("", URL), Err(Error::NotFound)));
    // The orphaned archive is still there.
    assert_eq!(ctx.bin.get(&version.artifact_id).unwrap(), b"one");
}

#[test]
fn test_delete_version_surfaces_binary_failure() {
    let ctx = TestContext::new();
    let alice = ctx.user(User::new("alice"));
    ctx.publish(&alice, &alice_import(), "v1", b"one");

    ctx.bin.fail_delete.store(true, Ordering::SeqCst);
    assert!(matches!(
        ctx.gate.delete_version(&alice, URL, "v1"),
        Err(Error::Io(_))
    ));
    // Metadata went first.
    assert!(matches!(
        ctx.gate.get_version("", URL, "v1"),
        Err(Error::VersionNotFound)
    ));
}

#[test]
fn test_toggle_missing_version() {
    let ctx = TestContext::new();
    let alice = ctx.user(User::new("alice"));
    ctx.publish(&alice, &alice_import(), "v1", b"one");

    assert!(matches!(
        ctx.gate.disable_version(&alice, URL, "v9"),
        Err(Error::VersionNotFound)
    ));
    assert!(matches!(
        ctx.gate.enable_version(&alice, URL, "v9"),
        Err(Error::VersionNotFound)
    ));
}

#[test]
fn test_login_failures() {
    let ctx = TestContext::new();
    ctx.user(User::new("alice"));

    assert!(matches!(
        ctx.gate.login("alice", "wrong-password"),
        Err(Error::PasswordMismatch)
    ));
    assert!(matches!(
        ctx.gate.login("nobody", PASSWORD),
        Err(Error::UserDoesNotExist)
    ));
    assert!(matches!(ctx.gate.login("", PASSWORD), Err(Error::UsernameEmpty)));
    assert!(matches!(
        ctx.gate.login("alice", "short"),
        Err(Error::PasswordTooShort)
    ));
}

#[test]
fn test_token_round_trip_and_expiry() {
    let ctx = TestContext::new();
    let token = ctx.user(User::new("alice"));

    assert_eq!(ctx.tokens.validate(&token).unwrap(), "alice");
    assert_eq!(
        ctx.gate.parse_token(&token).unwrap().username(),
        Some("alice")
    );

    let later = Utc::now() + chrono::Duration::seconds(120);
    assert!(matches!(
        ctx.tokens.validate_at(&token, later),
        Err(Error::TokenExpired)
    ));
}

#[test]
fn test_bad_tokens_rejected() {
    let ctx = TestContext::new();
    assert!(ctx.gate.parse_token("").unwrap().is_anonymous());
    assert!(matches!(
        ctx.gate.parse_token("not-a-token"),
        Err(Error::MalformedToken)
    ));

    let other = TokenService::new(b"other-key".to_vec(), Duration::from_secs(60));
    let forged = other.generate("alice").unwrap();
    assert!(matches!(
        ctx.gate.get(&forged, URL),
        Err(Error::InvalidSignature)
    ));
}

#[test]
fn test_resolver_errors() {
    let resolver: Resolver<u8> = Resolver::new("test").register("known", |_| Ok(1));
    assert_eq!(resolver.resolve("known://x").unwrap(), 1);
    assert!(matches!(
        resolver.resolve("bogus://x"),
        Err(Error::UnknownBackend(_))
    ));
    assert!(matches!(
        resolver.resolve("no-scheme-here"),
        Err(Error::InvalidConnectionString(_))
    ));
}

#[test]
fn test_concurrent_publishes_all_visible() {
    let ctx = Arc::new(TestContext::new());
    let alice = ctx.user(User::new("alice"));
    ctx.publish(&alice, &alice_import(), "v0", b"zero");

    let handles: Vec<_> = (1..=8)
        .map(|i| {
            let ctx = Arc::clone(&ctx);
            let token = alice.clone();
            thread::spawn(move || {
                let name = format!("v{i}");
                ctx.publish(&token, &alice_import(), &name, name.as_bytes());
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let versions = ctx.gate.get_versions("", URL).unwrap();
    assert_eq!(versions.len(), 9);
    for i in 1..=8 {
        let name = format!("v{i}");
        assert_eq!(
            ctx.gate.get_version_binary("", URL, &name).unwrap(),
            name.as_bytes()
        );
    }
}
