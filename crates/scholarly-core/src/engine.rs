// ── Engine facade ──
//
// Bundles the injected store, clock, and configuration, and vends the
// registries and the subscription session that operate on them.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::error::CoreError;
use crate::preferences::Preferences;
use crate::registry::{ChildRegistry, ParentAccountRegistry, PaymentRequestRegistry};
use crate::session::SubscriptionSession;
use crate::store::{KeyValueStore, MemoryStore};

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<EngineInner>`. Every registry and session
/// created from one engine shares its store, so their read-modify-write
/// cycles are serialized against each other.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl Engine {
    /// An engine on the system clock.
    pub fn new(store: Arc<dyn KeyValueStore>, config: EngineConfig) -> Self {
        Self::with_clock(store, Arc::new(SystemClock), config)
    }

    pub fn with_clock(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
    ) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                store,
                clock,
                config,
            }),
        }
    }

    /// A throwaway engine over an empty in-memory store.
    pub fn in_memory(config: EngineConfig) -> Self {
        Self::new(Arc::new(MemoryStore::new()), config)
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.inner.store.as_ref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.inner.clock.now()
    }

    // ── Registries ───────────────────────────────────────────────

    pub fn payment_requests(&self) -> PaymentRequestRegistry {
        PaymentRequestRegistry::new(self.clone())
    }

    pub fn parent_accounts(&self) -> ParentAccountRegistry {
        ParentAccountRegistry::new(self.clone())
    }

    pub fn children(&self) -> ChildRegistry {
        ChildRegistry::new(self.clone())
    }

    pub fn preferences(&self) -> Preferences {
        Preferences::new(self.clone())
    }

    // ── Session ──────────────────────────────────────────────────

    /// Load (or synthesize) the subscription and run the first expiry
    /// sweep. Does NOT start the background sweep; call
    /// [`SubscriptionSession::start`] for that.
    pub fn open_session(&self) -> Result<SubscriptionSession, CoreError> {
        SubscriptionSession::open(self.clone())
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
