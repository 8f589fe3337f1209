// ── Child profiles ──

use tracing::{debug, info};
use url::Url;

use crate::engine::Engine;
use crate::error::CoreError;
use crate::model::{
    ChildProfile, InvitationStatus, NewChildProfile, Token, normalize_email, validate_email,
};
use crate::store::CHILDREN;

pub struct ChildRegistry {
    engine: Engine,
}

impl ChildRegistry {
    pub(crate) fn new(engine: Engine) -> Self {
        Self { engine }
    }

    pub fn add(&self, child: NewChildProfile) -> Result<ChildProfile, CoreError> {
        let first_name = child.first_name.trim();
        if first_name.is_empty() {
            return Err(CoreError::ValidationFailed {
                message: "first name must not be empty".into(),
            });
        }
        if let Some(ref email) = child.email {
            validate_email(email.trim())?;
        }

        let profile = ChildProfile {
            id: Token::generate(),
            first_name: first_name.to_owned(),
            last_name: child.last_name,
            email: child.email.as_deref().map(normalize_email),
            grade_level: child.grade_level,
            school: child.school,
            invitation_token: None,
            invitation_status: InvitationStatus::NotInvited,
            created_at: self.engine.now(),
            accepted_at: None,
        };

        let stored = profile.clone();
        CHILDREN.modify_or_default(self.engine.store(), move |children| {
            children.push(stored);
            Ok(())
        })?;
        info!(id = %profile.id, "added child profile");
        Ok(profile)
    }

    pub fn list(&self) -> Result<Vec<ChildProfile>, CoreError> {
        CHILDREN.load_or_default(self.engine.store())
    }

    pub fn get(&self, id: &Token) -> Result<Option<ChildProfile>, CoreError> {
        Ok(self.list()?.into_iter().find(|c| c.id == *id))
    }

    /// Issue a fresh invitation token. Re-inviting replaces the previous
    /// token; an accepted profile cannot be invited again.
    pub fn invite(&self, id: &Token) -> Result<ChildProfile, CoreError> {
        let invited = CHILDREN.modify_or_default(self.engine.store(), |children| {
            let child = children
                .iter_mut()
                .find(|c| c.id == *id)
                .ok_or_else(|| CoreError::ChildNotFound {
                    identifier: id.to_string(),
                })?;
            if child.invitation_status == InvitationStatus::Accepted {
                return Err(CoreError::ValidationFailed {
                    message: format!("{} has already accepted an invitation", child.full_name()),
                });
            }
            child.invitation_token = Some(Token::generate_distinct_from(&child.id));
            child.invitation_status = InvitationStatus::Pending;
            Ok(child.clone())
        })?;
        debug!(id = %invited.id, "issued invitation");
        Ok(invited)
    }

    /// Accept the pending invitation carrying `token`.
    pub fn accept(&self, token: &Token) -> Result<ChildProfile, CoreError> {
        let now = self.engine.now();
        let accepted = CHILDREN.modify_or_default(self.engine.store(), |children| {
            let child = children
                .iter_mut()
                .find(|c| {
                    c.invitation_status == InvitationStatus::Pending
                        && c.invitation_token.as_ref() == Some(token)
                })
                .ok_or_else(|| CoreError::InvitationInvalid {
                    token: token.to_string(),
                })?;
            child.invitation_status = InvitationStatus::Accepted;
            child.accepted_at = Some(now);
            Ok(child.clone())
        })?;
        info!(id = %accepted.id, "invitation accepted");
        Ok(accepted)
    }

    pub fn remove(&self, id: &Token) -> Result<ChildProfile, CoreError> {
        CHILDREN.modify_or_default(self.engine.store(), |children| {
            let index = children
                .iter()
                .position(|c| c.id == *id)
                .ok_or_else(|| CoreError::ChildNotFound {
                    identifier: id.to_string(),
                })?;
            Ok(children.remove(index))
        })
    }

    pub fn invitation_link(&self, token: &Token) -> Url {
        self.engine.config().link(&format!("invitation/{token}"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::EngineConfig;

    fn child(name: &str) -> NewChildProfile {
        NewChildProfile {
            first_name: name.into(),
            ..NewChildProfile::default()
        }
    }

    #[test]
    fn invitation_lifecycle() {
        let engine = Engine::in_memory(EngineConfig::default());
        let children = engine.children();
        let added = children.add(child("Sam")).unwrap();
        assert_eq!(added.invitation_status, InvitationStatus::NotInvited);

        let invited = children.invite(&added.id).unwrap();
        let token = invited.invitation_token.clone().unwrap();
        assert_eq!(invited.invitation_status, InvitationStatus::Pending);

        let accepted = children.accept(&token).unwrap();
        assert_eq!(accepted.invitation_status, InvitationStatus::Accepted);
        assert!(accepted.accepted_at.is_some());

        assert!(matches!(
            children.accept(&token),
            Err(CoreError::InvitationInvalid { .. })
        ));
        assert!(children.invite(&added.id).is_err());
    }

    #[test]
    fn reinviting_replaces_the_token() {
        let engine = Engine::in_memory(EngineConfig::default());
        let children = engine.children();
        let added = children.add(child("Sam")).unwrap();
        let first = children.invite(&added.id).unwrap().invitation_token.unwrap();
        let second = children.invite(&added.id).unwrap().invitation_token.unwrap();
        assert_ne!(first, second);
        assert!(children.accept(&first).is_err());
        assert!(children.accept(&second).is_ok());
    }

    #[test]
    fn remove_deletes_profile() {
        let engine = Engine::in_memory(EngineConfig::default());
        let children = engine.children();
        let sam = children.add(child("Sam")).unwrap();
        children.add(child("Alex")).unwrap();

        let removed = children.remove(&sam.id).unwrap();
        assert_eq!(removed.first_name, "Sam");
        assert_eq!(children.list().unwrap().len(), 1);
        assert!(matches!(
            children.remove(&sam.id),
            Err(CoreError::ChildNotFound { .. })
        ));
    }

    #[test]
    fn blank_name_is_rejected() {
        let engine = Engine::in_memory(EngineConfig::default());
        assert!(engine.children().add(child("  ")).is_err());
    }

    #[test]
    fn invitation_link_uses_route() {
        let engine = Engine::in_memory(EngineConfig::default());
        assert_eq!(
            engine.children().invitation_link(&Token::from("t1")).as_str(),
            "http://localhost:5173/invitation/t1"
        );
    }
}
