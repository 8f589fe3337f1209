// ── Subscription session ──
//
// Owns the live subscription record: loads or synthesizes it, applies
// partial updates, publishes every change on a watch channel, and runs
// the periodic expiry sweep as a cancellable background task.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::engine::Engine;
use crate::entitlement::{self, Entitlements, Feature};
use crate::error::CoreError;
use crate::model::{
    BillingPeriod, PaymentMethod, Subscription, SubscriptionStatus, SubscriptionUpdate, Tier,
};
use crate::store::{FIRST_VISIT, SUBSCRIPTION};
use crate::stream::SubscriptionWatch;

/// Downgrade a lapsed record in place. Returns `true` if it changed.
///
/// A lapsed trial drops back to `{free, free}`. A lapsed paid plan only
/// flips to `expired`; its tier and expiry are left for display.
pub fn expire_if_lapsed(subscription: &mut Subscription, now: DateTime<Utc>) -> bool {
    match subscription.status {
        SubscriptionStatus::Trial if subscription.trial_ends_at.is_some_and(|end| end < now) => {
            subscription.status = SubscriptionStatus::Free;
            subscription.tier = Tier::Free;
            subscription.trial_ends_at = None;
            true
        }
        SubscriptionStatus::Active if subscription.expires_at.is_some_and(|end| end < now) => {
            subscription.status = SubscriptionStatus::Expired;
            true
        }
        _ => false,
    }
}

/// Sweep the stored record in place. `None` when nothing is stored.
fn sweep_stored(engine: &Engine) -> Result<Option<(bool, Subscription)>, CoreError> {
    let now = engine.now();
    let swept = SUBSCRIPTION.modify_existing(engine.store(), |sub| {
        let changed = expire_if_lapsed(sub, now);
        Ok((changed, sub.clone()))
    })?;
    if let Some((true, ref sub)) = swept {
        info!(status = %sub.status, tier = %sub.tier, "subscription lapsed");
    }
    Ok(swept)
}

/// The live subscription for one user.
///
/// Cheaply cloneable via `Arc<SessionInner>`.
#[derive(Clone)]
pub struct SubscriptionSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    engine: Engine,
    subscription: watch::Sender<Subscription>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
    lapsed_on_open: bool,
}

impl SubscriptionSession {
    /// Load the stored subscription, synthesizing a trial on the very
    /// first visit, then run one expiry sweep.
    pub(crate) fn open(engine: Engine) -> Result<Self, CoreError> {
        let mut subscription = Self::initial_subscription(&engine)?;
        let lapsed_on_open = match sweep_stored(&engine)? {
            Some((changed, swept)) => {
                subscription = swept;
                changed
            }
            None => false,
        };
        let (sender, _) = watch::channel(subscription);
        Ok(Self {
            inner: Arc::new(SessionInner {
                engine,
                subscription: sender,
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
                lapsed_on_open,
            }),
        })
    }

    /// Whether the sweep run while opening downgraded the record.
    pub fn lapsed_on_open(&self) -> bool {
        self.inner.lapsed_on_open
    }

    fn initial_subscription(engine: &Engine) -> Result<Subscription, CoreError> {
        let store = engine.store();
        if let Some(stored) = SUBSCRIPTION.load(store)? {
            debug!(status = %stored.status, tier = %stored.tier, "loaded subscription");
            return Ok(stored);
        }

        let first_visit = FIRST_VISIT.modify_or_default(store, |visited| {
            let first = !*visited;
            *visited = true;
            Ok(first)
        })?;
        if !first_visit {
            return Ok(Subscription::free());
        }

        let trial = Subscription::trial(engine.now(), engine.config().trial_days);
        SUBSCRIPTION.save(store, &trial)?;
        info!(
            trial_ends_at = ?trial.trial_ends_at,
            "first visit, started premium trial"
        );
        Ok(trial)
    }

    // ── Background sweep ─────────────────────────────────────────

    /// Sweep once now, then every configured interval until
    /// [`shutdown`](Self::shutdown). A zero interval skips the task.
    pub async fn start(&self) -> Result<(), CoreError> {
        self.sweep_expired()?;

        let interval = self.inner.engine.config().sweep_interval;
        if interval.is_zero() {
            debug!("background sweep disabled");
            return Ok(());
        }

        let handle = tokio::spawn(sweep_task(
            self.clone(),
            interval,
            self.inner.cancel.clone(),
        ));
        self.inner.task_handles.lock().await.push(handle);
        debug!(?interval, "background sweep started");
        Ok(())
    }

    /// Cancel background tasks and wait for them to finish.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("session shut down");
    }

    /// Apply the expiry rules to the stored record. Returns `true` if a
    /// downgrade happened.
    pub fn sweep_expired(&self) -> Result<bool, CoreError> {
        let Some((changed, swept)) = sweep_stored(&self.inner.engine)? else {
            return Ok(false);
        };
        self.publish(swept);
        Ok(changed)
    }

    // ── Mutation ─────────────────────────────────────────────────

    /// Shallow-merge `update` into the record, persist, and publish.
    ///
    /// The merged record must still be coherent: a trial needs its end
    /// date and an active plan its expiry.
    pub fn update_subscription(&self, update: SubscriptionUpdate) -> Result<Subscription, CoreError> {
        let updated = SUBSCRIPTION.modify_or_default(self.inner.engine.store(), |sub| {
            sub.apply(update);
            sub.validate()?;
            Ok(sub.clone())
        })?;
        debug!(status = %updated.status, tier = %updated.tier, "subscription updated");
        self.publish(updated.clone());
        Ok(updated)
    }

    /// Start a paid premium period of `period` length from now.
    pub fn activate(
        &self,
        period: BillingPeriod,
        method: PaymentMethod,
        payer_email: Option<String>,
        payer_name: Option<String>,
    ) -> Result<Subscription, CoreError> {
        let expires_at = self.inner.engine.now() + period.duration();
        let activated = self.update_subscription(SubscriptionUpdate {
            status: Some(SubscriptionStatus::Active),
            tier: Some(Tier::Premium),
            expires_at: Some(Some(expires_at)),
            trial_ends_at: Some(None),
            payment_method: Some(Some(method)),
            payer_email: Some(payer_email),
            payer_name: Some(payer_name),
        })?;
        info!(%period, %method, %expires_at, "subscription activated");
        Ok(activated)
    }

    /// Drop back to `{free, free}` and delete the stored record. The
    /// first-visit marker is kept, so no new trial follows.
    pub fn clear_subscription(&self) -> Result<(), CoreError> {
        SUBSCRIPTION.remove(self.inner.engine.store())?;
        self.publish(Subscription::free());
        info!("subscription cleared");
        Ok(())
    }

    fn publish(&self, subscription: Subscription) {
        self.inner.subscription.send_if_modified(|current| {
            if *current == subscription {
                return false;
            }
            *current = subscription;
            true
        });
    }

    // ── Queries ──────────────────────────────────────────────────

    pub fn current(&self) -> Subscription {
        self.inner.subscription.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Subscription> {
        self.inner.subscription.subscribe()
    }

    pub fn watch(&self) -> SubscriptionWatch {
        SubscriptionWatch::new(self.subscribe())
    }

    pub fn check_subscription_status(&self) -> bool {
        entitlement::check_subscription_status(&self.current())
    }

    pub fn is_feature_locked(&self, feature: Feature) -> bool {
        entitlement::is_feature_locked(&self.current(), feature)
    }

    pub fn is_premium_user(&self) -> bool {
        entitlement::is_premium_user(&self.current())
    }

    pub fn entitlements(&self) -> Entitlements {
        Entitlements::of(&self.current())
    }

    pub fn time_remaining(&self) -> Option<chrono::Duration> {
        entitlement::time_remaining(&self.current(), self.inner.engine.now())
    }
}

async fn sweep_task(session: SubscriptionSession, every: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(every);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = session.sweep_expired() {
                    warn!(error = %e, "expiry sweep failed");
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::clock::ManualClock;
    use crate::config::EngineConfig;
    use crate::store::{KeyValueStore, MemoryStore};

    fn start_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 9, 1, 8, 0, 0).unwrap()
    }

    fn engine_with(store: Arc<MemoryStore>, clock: &ManualClock) -> Engine {
        Engine::with_clock(store, Arc::new(clock.clone()), EngineConfig::default())
    }

    #[test]
    fn first_visit_synthesizes_a_week_of_premium_trial() {
        let clock = ManualClock::new(start_time());
        let store = Arc::new(MemoryStore::new());
        let session = engine_with(store.clone(), &clock).open_session().unwrap();

        let sub = session.current();
        assert_eq!(sub.status, SubscriptionStatus::Trial);
        assert_eq!(sub.tier, Tier::Premium);
        assert_eq!(sub.trial_ends_at, Some(start_time() + chrono::Duration::days(7)));
        assert_eq!(store.get("hasVisitedBefore").unwrap().as_deref(), Some("true"));
        assert!(store.get("subscription").unwrap().is_some());
    }

    #[test]
    fn lapsed_trial_sweeps_to_free() {
        let clock = ManualClock::new(start_time());
        let store = Arc::new(MemoryStore::new());
        let engine = engine_with(store, &clock);
        let session = engine.open_session().unwrap();

        clock.advance(chrono::Duration::days(8));
        assert!(session.sweep_expired().unwrap());
        assert_eq!(session.current(), Subscription::free());
        assert_eq!(
            SUBSCRIPTION.load(engine.store()).unwrap(),
            Some(Subscription::free())
        );
    }

    #[test]
    fn lapsed_paid_plan_keeps_tier_but_loses_entitlement() {
        let clock = ManualClock::new(start_time());
        let engine = engine_with(Arc::new(MemoryStore::new()), &clock);
        let session = engine.open_session().unwrap();
        session
            .activate(BillingPeriod::Monthly, PaymentMethod::Direct, None, None)
            .unwrap();
        assert!(session.is_premium_user());

        clock.advance(chrono::Duration::days(31));
        session.sweep_expired().unwrap();
        let sub = session.current();
        assert_eq!(sub.status, SubscriptionStatus::Expired);
        assert_eq!(sub.tier, Tier::Premium);
        assert!(!session.is_premium_user());
        assert!(session.is_feature_locked(Feature::UnlimitedScholarships));
    }

    #[test]
    fn open_reports_a_lapse_it_swept() {
        let clock = ManualClock::new(start_time());
        let engine = engine_with(Arc::new(MemoryStore::new()), &clock);
        let session = engine.open_session().unwrap();
        assert!(!session.lapsed_on_open());
        session
            .activate(BillingPeriod::Monthly, PaymentMethod::Direct, None, None)
            .unwrap();

        clock.advance(chrono::Duration::days(40));
        let reopened = engine.open_session().unwrap();
        assert!(reopened.lapsed_on_open());
        assert_eq!(reopened.current().status, SubscriptionStatus::Expired);
        assert!(!reopened.sweep_expired().unwrap());
    }

    #[test]
    fn sweep_after_clear_does_not_recreate_record() {
        let clock = ManualClock::new(start_time());
        let store = Arc::new(MemoryStore::new());
        let session = engine_with(store.clone(), &clock).open_session().unwrap();
        session.clear_subscription().unwrap();

        clock.advance(chrono::Duration::days(30));
        assert!(!session.sweep_expired().unwrap());
        assert!(store.get("subscription").unwrap().is_none());
        assert_eq!(session.current(), Subscription::free());
    }

    #[test]
    fn returning_visitor_without_record_is_free() {
        let clock = ManualClock::new(start_time());
        let store = Arc::new(MemoryStore::new());
        store.put("hasVisitedBefore", "true".into()).unwrap();
        let session = engine_with(store, &clock).open_session().unwrap();
        assert_eq!(session.current(), Subscription::free());
    }

    #[test]
    fn malformed_record_is_treated_as_absent() {
        let clock = ManualClock::new(start_time());
        let store = Arc::new(MemoryStore::new());
        store.put("subscription", "{\"status\":".into()).unwrap();
        store.put("hasVisitedBefore", "true".into()).unwrap();
        let session = engine_with(store, &clock).open_session().unwrap();
        assert_eq!(session.current(), Subscription::free());
    }

    #[test]
    fn clear_keeps_first_visit_marker() {
        let clock = ManualClock::new(start_time());
        let store = Arc::new(MemoryStore::new());
        let engine = engine_with(store.clone(), &clock);
        engine.open_session().unwrap().clear_subscription().unwrap();

        assert!(store.get("subscription").unwrap().is_none());
        let reopened = engine.open_session().unwrap();
        assert_eq!(reopened.current(), Subscription::free());
    }

    #[test]
    fn incoherent_update_is_rejected_and_not_stored() {
        let clock = ManualClock::new(start_time());
        let engine = engine_with(Arc::new(MemoryStore::new()), &clock);
        let session = engine.open_session().unwrap();
        let before = session.current();

        let err = session
            .update_subscription(SubscriptionUpdate {
                status: Some(SubscriptionStatus::Active),
                ..SubscriptionUpdate::default()
            })
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { .. }));
        assert_eq!(session.current(), before);
        assert_eq!(SUBSCRIPTION.load(engine.store()).unwrap(), Some(before));
    }

    #[tokio::test]
    async fn updates_are_published_to_watchers() {
        let clock = ManualClock::new(start_time());
        let session = engine_with(Arc::new(MemoryStore::new()), &clock)
            .open_session()
            .unwrap();
        let mut watch = session.watch();
        assert_eq!(watch.current().status, SubscriptionStatus::Trial);

        session
            .activate(
                BillingPeriod::Annual,
                PaymentMethod::Parent,
                Some("parent@example.com".into()),
                None,
            )
            .unwrap();
        let next = watch.changed().await.unwrap();
        assert_eq!(next.status, SubscriptionStatus::Active);
        assert_eq!(next.payer_email.as_deref(), Some("parent@example.com"));
        assert_eq!(next.trial_ends_at, None);
    }

    #[tokio::test]
    async fn stream_yields_current_then_updates() {
        use tokio_stream::StreamExt;

        let clock = ManualClock::new(start_time());
        let session = engine_with(Arc::new(MemoryStore::new()), &clock)
            .open_session()
            .unwrap();
        let mut stream = session.watch().into_stream();

        let first = stream.next().await.unwrap();
        assert_eq!(first.status, SubscriptionStatus::Trial);

        session.clear_subscription().unwrap();
        let second = stream.next().await.unwrap();
        assert_eq!(second, Subscription::free());
    }

    #[tokio::test(start_paused = true)]
    async fn background_sweep_downgrades_lapsed_trial() {
        let clock = ManualClock::new(start_time());
        let session = engine_with(Arc::new(MemoryStore::new()), &clock)
            .open_session()
            .unwrap();
        let mut watch = session.watch();
        session.start().await.unwrap();

        clock.advance(chrono::Duration::days(7) + chrono::Duration::seconds(1));
        let next = tokio::time::timeout(Duration::from_secs(7_200), watch.changed())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(next, Subscription::free());

        session.shutdown().await;
    }
}
