//! Counting collaborators for coordinator tests.

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use mobile_backend_core::{
    AuthProvider, Backend, InvalidOperation, LocalStore, RemoteClient, RemoteError, StoreError,
    SyncContext, TableDefinition, UserIdentity,
};

use crate::storage::MemoryStore;

#[derive(Clone)]
pub enum LoginOutcome {
    Success(UserIdentity),
    Denied,
    Transport,
}

/// Backend whose collaborators report every call back to shared counters.
pub struct MockBackend {
    pub outcome: LoginOutcome,
    pub remote_builds: AtomicUsize,
    pub store_builds: AtomicUsize,
    pub init_calls: Arc<AtomicUsize>,
    pub login_calls: Arc<AtomicUsize>,
    /// Number of upcoming store initializations that fail.
    pub init_failures: Arc<AtomicUsize>,
    providers: Arc<Mutex<Vec<AuthProvider>>>,
}

impl MockBackend {
    pub fn new(outcome: LoginOutcome) -> Self {
        Self {
            outcome,
            remote_builds: AtomicUsize::new(0),
            store_builds: AtomicUsize::new(0),
            init_calls: Arc::new(AtomicUsize::new(0)),
            login_calls: Arc::new(AtomicUsize::new(0)),
            init_failures: Arc::new(AtomicUsize::new(0)),
            providers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing_init(self, failures: usize) -> Self {
        self.init_failures.store(failures, Ordering::SeqCst);
        self
    }

    pub fn last_provider(&self) -> Option<AuthProvider> {
        self.providers.lock().unwrap().last().copied()
    }
}

impl Backend for MockBackend {
    fn remote_client(&self, endpoint: &str) -> Result<Arc<dyn RemoteClient>, RemoteError> {
        self.remote_builds.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MockRemote {
            endpoint: endpoint.to_string(),
            sync: SyncContext::new(),
            outcome: self.outcome.clone(),
            login_calls: Arc::clone(&self.login_calls),
            providers: Arc::clone(&self.providers),
        }))
    }

    fn local_store(&self, name: &str) -> Result<Arc<dyn LocalStore>, StoreError> {
        self.store_builds.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(CountingStore {
            inner: MemoryStore::new(name),
            init_calls: Arc::clone(&self.init_calls),
            init_failures: Arc::clone(&self.init_failures),
        }))
    }
}

struct MockRemote {
    endpoint: String,
    sync: SyncContext,
    outcome: LoginOutcome,
    login_calls: Arc<AtomicUsize>,
    providers: Arc<Mutex<Vec<AuthProvider>>>,
}

#[async_trait]
impl RemoteClient for MockRemote {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn sync_context(&self) -> &SyncContext {
        &self.sync
    }

    async fn login(&self, provider: AuthProvider) -> Result<UserIdentity, RemoteError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        self.providers.lock().unwrap().push(provider);
        tokio::task::yield_now().await;

        match &self.outcome {
            LoginOutcome::Success(user) => Ok(user.clone()),
            LoginOutcome::Denied => Err(InvalidOperation {
                status: 401,
                message: "You do not have permission to view this directory or page.".into(),
                request_uri: format!("{}/.auth/login/{}", self.endpoint, provider.login_path()),
                reason_phrase: "Unauthorized".into(),
            }
            .into()),
            LoginOutcome::Transport => Err(RemoteError::Transport("connection refused".into())),
        }
    }
}

/// Memory store that counts initializations and can be told to fail them.
struct CountingStore {
    inner: MemoryStore,
    init_calls: Arc<AtomicUsize>,
    init_failures: Arc<AtomicUsize>,
}

#[async_trait]
impl LocalStore for CountingStore {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn define_table(&self, table: TableDefinition) -> Result<(), StoreError> {
        self.inner.define_table(table)
    }

    fn tables(&self) -> Vec<TableDefinition> {
        self.inner.tables()
    }

    async fn initialize(&self) -> Result<(), StoreError> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        // Hold the initialization open so concurrent callers pile up.
        tokio::time::sleep(Duration::from_millis(10)).await;

        let failed = self
            .init_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(StoreError::Unavailable("local storage unavailable".into()));
        }
        self.inner.initialize().await
    }

    fn is_initialized(&self) -> bool {
        self.inner.is_initialized()
    }
}
