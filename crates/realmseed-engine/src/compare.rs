//! Per-entity field comparators.
//!
//! Each comparator is an explicit, exhaustive field list over two typed
//! records, returning the names of changed fields for diagnostics. No
//! reflection-style deep equality anywhere.
//!
//! Comparison semantics follow the update-payload semantics: payloads are
//! built by overlaying desired fields onto the live entity, so a desired
//! field that is absent (`None`, or a config key missing from the desired
//! map) keeps its live value and is never reported as drift.

use std::collections::BTreeMap;

use realmseed_model::rep::{
    AuthenticationExecutionInfoRepresentation, ClientRepresentation, ClientScopeRepresentation,
    AuthenticatorConfigRepresentation, IdentityProviderMapperRepresentation,
    IdentityProviderRepresentation, ProtocolMapperRepresentation, RealmRepresentation,
    RoleRepresentation, UserProfileConfig, UserRepresentation,
};
use realmseed_model::spec::{ExecutionSpec, RoleSpec, UserSpec};

fn field<T: PartialEq>(
    changes: &mut Vec<&'static str>,
    name: &'static str,
    desired: &T,
    live: &T,
) {
    if desired != live {
        changes.push(name);
    }
}

fn opt_field<T: PartialEq>(
    changes: &mut Vec<&'static str>,
    name: &'static str,
    desired: &Option<T>,
    live: &Option<T>,
) {
    if desired.is_some() && desired != live {
        changes.push(name);
    }
}

/// Compare string lists ignoring order.
fn set_field(
    changes: &mut Vec<&'static str>,
    name: &'static str,
    desired: &Option<Vec<String>>,
    live: &Option<Vec<String>>,
) {
    let Some(desired) = desired else { return };
    let mut desired_sorted = desired.clone();
    desired_sorted.sort();
    let mut live_sorted = live.clone().unwrap_or_default();
    live_sorted.sort();
    if desired_sorted != live_sorted {
        changes.push(name);
    }
}

/// Compare only the keys present in the desired map.
fn config_subset(
    changes: &mut Vec<&'static str>,
    name: &'static str,
    desired: &BTreeMap<String, String>,
    live: &BTreeMap<String, String>,
) {
    if desired.iter().any(|(k, v)| live.get(k) != Some(v)) {
        changes.push(name);
    }
}

/// Compare only the keys present in the desired multi-valued map.
fn attributes_subset(
    changes: &mut Vec<&'static str>,
    name: &'static str,
    desired: &BTreeMap<String, Vec<String>>,
    live: &BTreeMap<String, Vec<String>>,
) {
    if desired.iter().any(|(k, v)| live.get(k) != Some(v)) {
        changes.push(name);
    }
}

/// Changed fields of the realm settings singleton.
pub fn realm_changes(
    desired: &RealmRepresentation,
    live: &RealmRepresentation,
) -> Vec<&'static str> {
    let mut changes = Vec::new();
    opt_field(&mut changes, "displayName", &desired.display_name, &live.display_name);
    opt_field(
        &mut changes,
        "displayNameHtml",
        &desired.display_name_html,
        &live.display_name_html,
    );
    opt_field(&mut changes, "enabled", &desired.enabled, &live.enabled);
    opt_field(&mut changes, "sslRequired", &desired.ssl_required, &live.ssl_required);
    opt_field(
        &mut changes,
        "registrationAllowed",
        &desired.registration_allowed,
        &live.registration_allowed,
    );
    opt_field(
        &mut changes,
        "registrationEmailAsUsername",
        &desired.registration_email_as_username,
        &live.registration_email_as_username,
    );
    opt_field(&mut changes, "rememberMe", &desired.remember_me, &live.remember_me);
    opt_field(&mut changes, "verifyEmail", &desired.verify_email, &live.verify_email);
    opt_field(
        &mut changes,
        "loginWithEmailAllowed",
        &desired.login_with_email_allowed,
        &live.login_with_email_allowed,
    );
    opt_field(
        &mut changes,
        "duplicateEmailsAllowed",
        &desired.duplicate_emails_allowed,
        &live.duplicate_emails_allowed,
    );
    opt_field(
        &mut changes,
        "resetPasswordAllowed",
        &desired.reset_password_allowed,
        &live.reset_password_allowed,
    );
    opt_field(
        &mut changes,
        "editUsernameAllowed",
        &desired.edit_username_allowed,
        &live.edit_username_allowed,
    );
    opt_field(&mut changes, "loginTheme", &desired.login_theme, &live.login_theme);
    opt_field(&mut changes, "accountTheme", &desired.account_theme, &live.account_theme);
    opt_field(&mut changes, "adminTheme", &desired.admin_theme, &live.admin_theme);
    opt_field(&mut changes, "emailTheme", &desired.email_theme, &live.email_theme);
    opt_field(
        &mut changes,
        "internationalizationEnabled",
        &desired.internationalization_enabled,
        &live.internationalization_enabled,
    );
    set_field(
        &mut changes,
        "supportedLocales",
        &desired.supported_locales,
        &live.supported_locales,
    );
    opt_field(&mut changes, "defaultLocale", &desired.default_locale, &live.default_locale);
    opt_field(
        &mut changes,
        "passwordPolicy",
        &desired.password_policy,
        &live.password_policy,
    );
    opt_field(
        &mut changes,
        "ssoSessionIdleTimeout",
        &desired.sso_session_idle_timeout,
        &live.sso_session_idle_timeout,
    );
    opt_field(
        &mut changes,
        "ssoSessionMaxLifespan",
        &desired.sso_session_max_lifespan,
        &live.sso_session_max_lifespan,
    );
    opt_field(
        &mut changes,
        "accessTokenLifespan",
        &desired.access_token_lifespan,
        &live.access_token_lifespan,
    );
    opt_field(&mut changes, "browserFlow", &desired.browser_flow, &live.browser_flow);
    opt_field(
        &mut changes,
        "registrationFlow",
        &desired.registration_flow,
        &live.registration_flow,
    );
    opt_field(
        &mut changes,
        "directGrantFlow",
        &desired.direct_grant_flow,
        &live.direct_grant_flow,
    );
    opt_field(
        &mut changes,
        "resetCredentialsFlow",
        &desired.reset_credentials_flow,
        &live.reset_credentials_flow,
    );
    config_subset(&mut changes, "attributes", &desired.attributes, &live.attributes);
    changes
}

/// Changed fields of a client scope (protocol mappers are reconciled
/// separately).
pub fn client_scope_changes(
    desired: &ClientScopeRepresentation,
    live: &ClientScopeRepresentation,
) -> Vec<&'static str> {
    let mut changes = Vec::new();
    opt_field(&mut changes, "description", &desired.description, &live.description);
    opt_field(&mut changes, "protocol", &desired.protocol, &live.protocol);
    config_subset(&mut changes, "attributes", &desired.attributes, &live.attributes);
    changes
}

/// Changed fields of a protocol mapper. Config keys absent from the
/// desired model are "don't care", never drift.
pub fn protocol_mapper_changes(
    desired: &ProtocolMapperRepresentation,
    live: &ProtocolMapperRepresentation,
) -> Vec<&'static str> {
    let mut changes = Vec::new();
    field(&mut changes, "protocol", &desired.protocol, &live.protocol);
    field(
        &mut changes,
        "protocolMapper",
        &desired.protocol_mapper,
        &live.protocol_mapper,
    );
    config_subset(&mut changes, "config", &desired.config, &live.config);
    changes
}

/// Changed fields of a client (mappers and scope lists are reconciled
/// separately; the secret is write-only and never compared).
pub fn client_changes(
    desired: &ClientRepresentation,
    live: &ClientRepresentation,
) -> Vec<&'static str> {
    let mut changes = Vec::new();
    opt_field(&mut changes, "name", &desired.name, &live.name);
    opt_field(&mut changes, "description", &desired.description, &live.description);
    opt_field(&mut changes, "enabled", &desired.enabled, &live.enabled);
    opt_field(&mut changes, "protocol", &desired.protocol, &live.protocol);
    opt_field(&mut changes, "publicClient", &desired.public_client, &live.public_client);
    opt_field(&mut changes, "bearerOnly", &desired.bearer_only, &live.bearer_only);
    opt_field(
        &mut changes,
        "serviceAccountsEnabled",
        &desired.service_accounts_enabled,
        &live.service_accounts_enabled,
    );
    opt_field(
        &mut changes,
        "standardFlowEnabled",
        &desired.standard_flow_enabled,
        &live.standard_flow_enabled,
    );
    opt_field(
        &mut changes,
        "implicitFlowEnabled",
        &desired.implicit_flow_enabled,
        &live.implicit_flow_enabled,
    );
    opt_field(
        &mut changes,
        "directAccessGrantsEnabled",
        &desired.direct_access_grants_enabled,
        &live.direct_access_grants_enabled,
    );
    opt_field(
        &mut changes,
        "fullScopeAllowed",
        &desired.full_scope_allowed,
        &live.full_scope_allowed,
    );
    opt_field(&mut changes, "rootUrl", &desired.root_url, &live.root_url);
    opt_field(&mut changes, "baseUrl", &desired.base_url, &live.base_url);
    opt_field(&mut changes, "adminUrl", &desired.admin_url, &live.admin_url);
    set_field(&mut changes, "redirectUris", &desired.redirect_uris, &live.redirect_uris);
    set_field(&mut changes, "webOrigins", &desired.web_origins, &live.web_origins);
    config_subset(&mut changes, "attributes", &desired.attributes, &live.attributes);
    changes
}

/// Changed fields of a role (composite edges are reconciled separately).
pub fn role_changes(desired: &RoleSpec, live: &RoleRepresentation) -> Vec<&'static str> {
    let mut changes = Vec::new();
    opt_field(&mut changes, "description", &desired.description, &live.description);
    attributes_subset(&mut changes, "attributes", &desired.attributes, &live.attributes);
    changes
}

/// Changed fields of an identity provider (mappers are reconciled
/// separately).
pub fn identity_provider_changes(
    desired: &IdentityProviderRepresentation,
    live: &IdentityProviderRepresentation,
) -> Vec<&'static str> {
    let mut changes = Vec::new();
    field(&mut changes, "providerId", &desired.provider_id, &live.provider_id);
    opt_field(&mut changes, "displayName", &desired.display_name, &live.display_name);
    opt_field(&mut changes, "enabled", &desired.enabled, &live.enabled);
    opt_field(&mut changes, "trustEmail", &desired.trust_email, &live.trust_email);
    opt_field(&mut changes, "storeToken", &desired.store_token, &live.store_token);
    opt_field(&mut changes, "linkOnly", &desired.link_only, &live.link_only);
    opt_field(
        &mut changes,
        "firstBrokerLoginFlowAlias",
        &desired.first_broker_login_flow_alias,
        &live.first_broker_login_flow_alias,
    );
    opt_field(
        &mut changes,
        "postBrokerLoginFlowAlias",
        &desired.post_broker_login_flow_alias,
        &live.post_broker_login_flow_alias,
    );
    config_subset(&mut changes, "config", &desired.config, &live.config);
    changes
}

/// Changed fields of an identity provider mapper.
pub fn idp_mapper_changes(
    desired: &IdentityProviderMapperRepresentation,
    live: &IdentityProviderMapperRepresentation,
) -> Vec<&'static str> {
    let mut changes = Vec::new();
    field(
        &mut changes,
        "identityProviderMapper",
        &desired.identity_provider_mapper,
        &live.identity_provider_mapper,
    );
    config_subset(&mut changes, "config", &desired.config, &live.config);
    changes
}

/// Changed fields of a user (role assignments and federated identities
/// are reconciled separately; credentials are write-only).
pub fn user_changes(desired: &UserSpec, live: &UserRepresentation) -> Vec<&'static str> {
    let mut changes = Vec::new();
    opt_field(&mut changes, "email", &desired.email, &live.email);
    opt_field(&mut changes, "emailVerified", &desired.email_verified, &live.email_verified);
    opt_field(&mut changes, "firstName", &desired.first_name, &live.first_name);
    opt_field(&mut changes, "lastName", &desired.last_name, &live.last_name);
    opt_field(&mut changes, "enabled", &desired.enabled, &live.enabled);
    attributes_subset(&mut changes, "attributes", &desired.attributes, &live.attributes);
    set_field(
        &mut changes,
        "requiredActions",
        &desired.required_actions,
        &live.required_actions,
    );
    changes
}

/// Changed fields of an execution (tree structure is compared elsewhere;
/// this covers the per-node update pass).
pub fn execution_changes(
    desired: &ExecutionSpec,
    live: &AuthenticationExecutionInfoRepresentation,
) -> Vec<&'static str> {
    let mut changes = Vec::new();
    if live.requirement.as_deref() != Some(desired.requirement.as_str()) {
        changes.push("requirement");
    }
    opt_field(&mut changes, "description", &desired.description, &live.description);
    changes
}

/// Changed fields of an authenticator config.
pub fn authenticator_config_changes(
    desired: &AuthenticatorConfigRepresentation,
    live: &AuthenticatorConfigRepresentation,
) -> Vec<&'static str> {
    let mut changes = Vec::new();
    field(&mut changes, "alias", &desired.alias, &live.alias);
    config_subset(&mut changes, "config", &desired.config, &live.config);
    changes
}

/// Whether the user-profile document differs at the JSON level.
#[must_use]
pub fn user_profile_changed(desired: &UserProfileConfig, live: &UserProfileConfig) -> bool {
    desired != live
}
