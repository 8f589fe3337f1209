// ── Per-user preferences ──
//
// Privacy settings, cookie consent, and the saved / applied scholarship
// id lists. All single-key records with no cross-record invariants.

use tracing::debug;
use url::Url;

use crate::engine::Engine;
use crate::error::CoreError;
use crate::model::{CookieConsent, PRIVACY_FLAGS, PrivacySettings, Scholarship};
use crate::store::{APPLIED_SCHOLARSHIPS, COOKIE_CONSENT, Key, PRIVACY_SETTINGS, SAVED_SCHOLARSHIPS};

/// Which scholarship list an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScholarshipList {
    Saved,
    Applied,
}

impl ScholarshipList {
    fn key(self) -> Key<Vec<String>> {
        match self {
            Self::Saved => SAVED_SCHOLARSHIPS,
            Self::Applied => APPLIED_SCHOLARSHIPS,
        }
    }
}

pub struct Preferences {
    engine: Engine,
}

impl Preferences {
    pub(crate) fn new(engine: Engine) -> Self {
        Self { engine }
    }

    // ── Privacy ──────────────────────────────────────────────────

    pub fn privacy_settings(&self) -> Result<PrivacySettings, CoreError> {
        PRIVACY_SETTINGS.load_or_default(self.engine.store())
    }

    pub fn save_privacy_settings(&self, settings: &PrivacySettings) -> Result<(), CoreError> {
        PRIVACY_SETTINGS.save(self.engine.store(), settings)
    }

    /// Set one visibility flag by name and return the updated settings.
    pub fn set_privacy_flag(&self, name: &str, visible: bool) -> Result<PrivacySettings, CoreError> {
        let settings = PRIVACY_SETTINGS.modify_or_default(self.engine.store(), |settings| {
            if !settings.set(name, visible) {
                return Err(CoreError::ValidationFailed {
                    message: format!(
                        "unknown privacy setting '{name}' (expected one of: {})",
                        PRIVACY_FLAGS.join(", ")
                    ),
                });
            }
            Ok(*settings)
        })?;
        debug!(flag = name, visible, "updated privacy setting");
        Ok(settings)
    }

    // ── Cookie consent ───────────────────────────────────────────

    /// The recorded decision, or `None` if the visitor has not chosen yet.
    pub fn cookie_consent(&self) -> Result<Option<CookieConsent>, CoreError> {
        COOKIE_CONSENT.load(self.engine.store())
    }

    pub fn set_cookie_consent(
        &self,
        analytics: bool,
        marketing: bool,
    ) -> Result<CookieConsent, CoreError> {
        let consent = CookieConsent::new(analytics, marketing, self.engine.now());
        COOKIE_CONSENT.save(self.engine.store(), &consent)?;
        debug!(analytics, marketing, "recorded cookie consent");
        Ok(consent)
    }

    // ── Saved / applied scholarships ─────────────────────────────

    pub fn scholarships(&self, list: ScholarshipList) -> Result<Vec<String>, CoreError> {
        list.key().load_or_default(self.engine.store())
    }

    pub fn contains(&self, list: ScholarshipList, id: &str) -> Result<bool, CoreError> {
        Ok(self.scholarships(list)?.iter().any(|s| s == id))
    }

    /// Add `id` to the list. Returns `false` if it was already there.
    pub fn add(&self, list: ScholarshipList, id: &str) -> Result<bool, CoreError> {
        list.key().modify_or_default(self.engine.store(), |ids| {
            if ids.iter().any(|s| s == id) {
                return Ok(false);
            }
            ids.push(id.to_owned());
            Ok(true)
        })
    }

    /// Remove `id` from the list. Returns `false` if it was not there.
    pub fn remove(&self, list: ScholarshipList, id: &str) -> Result<bool, CoreError> {
        list.key().modify_or_default(self.engine.store(), |ids| {
            let before = ids.len();
            ids.retain(|s| s != id);
            Ok(ids.len() != before)
        })
    }

    /// Flip membership of `id`. Returns whether it is now in the list.
    pub fn toggle(&self, list: ScholarshipList, id: &str) -> Result<bool, CoreError> {
        list.key().modify_or_default(self.engine.store(), |ids| {
            if let Some(pos) = ids.iter().position(|s| s == id) {
                ids.remove(pos);
                Ok(false)
            } else {
                ids.push(id.to_owned());
                Ok(true)
            }
        })
    }

    pub fn scholarship_link(&self, scholarship: &Scholarship) -> Url {
        self.engine
            .config()
            .link(&format!("scholarship/{}", scholarship.slug()))
    }
}
