// ── Child profiles on a parent dashboard ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::token::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InvitationStatus {
    NotInvited,
    Pending,
    Accepted,
}

/// A student profile created by a parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildProfile {
    pub id: Token,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invitation_token: Option<Token>,
    pub invitation_status: InvitationStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<DateTime<Utc>>,
}

impl ChildProfile {
    pub fn full_name(&self) -> String {
        match self.last_name {
            Some(ref last) => format!("{} {last}", self.first_name),
            None => self.first_name.clone(),
        }
    }
}

/// Input for adding a child profile.
#[derive(Debug, Clone, Default)]
pub struct NewChildProfile {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub grade_level: Option<String>,
    pub school: Option<String>,
}
