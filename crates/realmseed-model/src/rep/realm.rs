//! Realm settings representation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Realm-level settings as exposed by the admin API.
///
/// Only the configuration surface the seeding engine manages is modeled;
/// runtime state (sessions, keys) is deliberately absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealmRepresentation {
    /// Server-assigned identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Realm name (natural key).
    pub realm: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name_html: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_required: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_allowed: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_email_as_username: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub remember_me: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify_email: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_with_email_allowed: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_emails_allowed: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_password_allowed: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_username_allowed: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_theme: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_theme: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_theme: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_theme: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub internationalization_enabled: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub supported_locales: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_locale: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_policy: Option<String>,

    /// SSO session idle timeout in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sso_session_idle_timeout: Option<i64>,

    /// SSO session maximum lifespan in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sso_session_max_lifespan: Option<i64>,

    /// Access token lifespan in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token_lifespan: Option<i64>,

    /// Alias of the flow bound as browser flow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser_flow: Option<String>,

    /// Alias of the flow bound as registration flow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_flow: Option<String>,

    /// Alias of the flow bound as direct grant flow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direct_grant_flow: Option<String>,

    /// Alias of the flow bound as reset credentials flow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_credentials_flow: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl RealmRepresentation {
    /// A minimal representation carrying only the realm name.
    #[must_use]
    pub fn named(realm: impl Into<String>) -> Self {
        Self {
            realm: realm.into(),
            ..Self::default()
        }
    }
}
