//! reqwest-backed implementation of [`AdminApi`].
//!
//! Paths follow the admin REST layout under `/admin/realms/{realm}`. Every
//! method is a single request; the shared response handlers map 404/409/
//! 401/429 to dedicated error variants and invalidate the cached token on
//! 401.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;
use url::Url;

use realmseed_model::rep::{
    AuthenticationExecutionInfoRepresentation, AuthenticationFlowRepresentation,
    AuthenticatorConfigRepresentation, ClientRepresentation, ClientScopeRepresentation,
    CreateSubflowRequest, FederatedIdentityRepresentation, IdentityProviderMapperRepresentation,
    IdentityProviderRepresentation, PartialImportRequest, PartialImportResult,
    ProtocolMapperRepresentation, RealmRepresentation, RoleRepresentation, UserProfileConfig,
    UserRepresentation,
};

use crate::api::{AdminApi, MapperOwner};
use crate::auth::AdminAuth;
use crate::error::{ClientError, ClientResult};

/// Typed HTTP client for the admin REST API.
#[derive(Debug, Clone)]
pub struct HttpAdminClient {
    base_url: String,
    auth: AdminAuth,
    http_client: Client,
}

impl HttpAdminClient {
    /// Create a new client for the server at `base_url` (the server root,
    /// without the `/admin` suffix).
    pub fn new(base_url: &str, auth: AdminAuth, timeout: Duration) -> ClientResult<Self> {
        Url::parse(base_url)?;
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent("realmseed/0.4")
            .build()
            .map_err(|e| ClientError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
            http_client,
        })
    }

    /// Create a client with a pre-built `reqwest::Client` (for testing).
    #[must_use]
    pub fn with_http_client(base_url: &str, auth: AdminAuth, http_client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
            http_client,
        }
    }

    /// The server base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn realm_url(&self, realm: &str, path: &str) -> String {
        format!("{}/admin/realms/{realm}{path}", self.base_url)
    }

    fn mapper_base(&self, realm: &str, owner: MapperOwner<'_>) -> String {
        match owner {
            MapperOwner::ClientScope(id) => {
                self.realm_url(realm, &format!("/client-scopes/{id}/protocol-mappers/models"))
            }
            MapperOwner::Client(id) => {
                self.realm_url(realm, &format!("/clients/{id}/protocol-mappers/models"))
            }
        }
    }

    // ── Request helpers ───────────────────────────────────────────────

    async fn send(&self, builder: reqwest::RequestBuilder) -> ClientResult<reqwest::Response> {
        let token = self.auth.bearer_token().await?;
        Ok(builder.bearer_auth(token).send().await?)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> ClientResult<T> {
        debug!("admin GET {url}");
        let response = self.send(self.http_client.get(url)).await?;
        self.handle_json(response).await
    }

    async fn get_optional<T: DeserializeOwned>(&self, url: &str) -> ClientResult<Option<T>> {
        debug!("admin GET {url}");
        let response = self.send(self.http_client.get(url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        self.handle_json(response).await.map(Some)
    }

    async fn post_json<B: Serialize>(&self, url: &str, body: &B) -> ClientResult<()> {
        debug!("admin POST {url}");
        let response = self.send(self.http_client.post(url).json(body)).await?;
        self.handle_empty(response).await
    }

    async fn post_for<T: DeserializeOwned, B: Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> ClientResult<T> {
        debug!("admin POST {url}");
        let response = self.send(self.http_client.post(url).json(body)).await?;
        self.handle_json(response).await
    }

    async fn put_json<B: Serialize>(&self, url: &str, body: &B) -> ClientResult<()> {
        debug!("admin PUT {url}");
        let response = self.send(self.http_client.put(url).json(body)).await?;
        self.handle_empty(response).await
    }

    async fn put_empty(&self, url: &str) -> ClientResult<()> {
        debug!("admin PUT {url}");
        let response = self.send(self.http_client.put(url)).await?;
        self.handle_empty(response).await
    }

    async fn delete_empty(&self, url: &str) -> ClientResult<()> {
        debug!("admin DELETE {url}");
        let response = self.send(self.http_client.delete(url)).await?;
        self.handle_empty(response).await
    }

    async fn delete_json<B: Serialize>(&self, url: &str, body: &B) -> ClientResult<()> {
        debug!("admin DELETE {url}");
        let response = self.send(self.http_client.delete(url).json(body)).await?;
        self.handle_empty(response).await
    }

    // ── Response handling ─────────────────────────────────────────────

    async fn handle_json<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> ClientResult<T> {
        let status = response.status();
        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body)
                .map_err(|e| ClientError::Parse(format!("failed to parse response: {e}")))
        } else {
            self.error_response(response).await
        }
    }

    async fn handle_empty(&self, response: reqwest::Response) -> ClientResult<()> {
        if response.status().is_success() {
            Ok(())
        } else {
            self.error_response(response).await
        }
    }

    async fn error_response<T>(&self, response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<no body>".to_string());

        match status {
            StatusCode::NOT_FOUND => Err(ClientError::NotFound(body)),
            StatusCode::CONFLICT => Err(ClientError::Conflict(body)),
            StatusCode::TOO_MANY_REQUESTS => Err(ClientError::RateLimited {
                retry_after_secs: retry_after,
            }),
            StatusCode::UNAUTHORIZED => {
                self.auth.invalidate().await;
                Err(ClientError::Auth(format!("authentication failed (401): {body}")))
            }
            _ => {
                let detail = if body.is_empty() {
                    format!("HTTP {status}")
                } else {
                    body
                };
                Err(ClientError::Api {
                    status: status.as_u16(),
                    detail,
                })
            }
        }
    }
}

#[async_trait]
impl AdminApi for HttpAdminClient {
    // ── Realm ─────────────────────────────────────────────────────────

    async fn get_realm(&self, realm: &str) -> ClientResult<Option<RealmRepresentation>> {
        self.get_optional(&format!("{}/admin/realms/{realm}", self.base_url))
            .await
    }

    async fn import_realm(&self, rep: &RealmRepresentation) -> ClientResult<()> {
        self.post_json(&format!("{}/admin/realms", self.base_url), rep)
            .await
    }

    async fn update_realm(&self, realm: &str, rep: &RealmRepresentation) -> ClientResult<()> {
        self.put_json(&format!("{}/admin/realms/{realm}", self.base_url), rep)
            .await
    }

    // ── Client scopes ─────────────────────────────────────────────────

    async fn list_client_scopes(
        &self,
        realm: &str,
    ) -> ClientResult<Vec<ClientScopeRepresentation>> {
        self.get_json(&self.realm_url(realm, "/client-scopes")).await
    }

    async fn create_client_scope(
        &self,
        realm: &str,
        rep: &ClientScopeRepresentation,
    ) -> ClientResult<()> {
        self.post_json(&self.realm_url(realm, "/client-scopes"), rep)
            .await
    }

    async fn update_client_scope(
        &self,
        realm: &str,
        id: &str,
        rep: &ClientScopeRepresentation,
    ) -> ClientResult<()> {
        self.put_json(&self.realm_url(realm, &format!("/client-scopes/{id}")), rep)
            .await
    }

    async fn delete_client_scope(&self, realm: &str, id: &str) -> ClientResult<()> {
        self.delete_empty(&self.realm_url(realm, &format!("/client-scopes/{id}")))
            .await
    }

    // ── Protocol mappers ──────────────────────────────────────────────

    async fn list_protocol_mappers(
        &self,
        realm: &str,
        owner: MapperOwner<'_>,
    ) -> ClientResult<Vec<ProtocolMapperRepresentation>> {
        self.get_json(&self.mapper_base(realm, owner)).await
    }

    async fn create_protocol_mapper(
        &self,
        realm: &str,
        owner: MapperOwner<'_>,
        rep: &ProtocolMapperRepresentation,
    ) -> ClientResult<()> {
        self.post_json(&self.mapper_base(realm, owner), rep).await
    }

    async fn update_protocol_mapper(
        &self,
        realm: &str,
        owner: MapperOwner<'_>,
        mapper_id: &str,
        rep: &ProtocolMapperRepresentation,
    ) -> ClientResult<()> {
        let url = format!("{}/{mapper_id}", self.mapper_base(realm, owner));
        self.put_json(&url, rep).await
    }

    async fn delete_protocol_mapper(
        &self,
        realm: &str,
        owner: MapperOwner<'_>,
        mapper_id: &str,
    ) -> ClientResult<()> {
        let url = format!("{}/{mapper_id}", self.mapper_base(realm, owner));
        self.delete_empty(&url).await
    }

    // ── Clients ───────────────────────────────────────────────────────

    async fn list_clients(&self, realm: &str) -> ClientResult<Vec<ClientRepresentation>> {
        self.get_json(&self.realm_url(realm, "/clients")).await
    }

    async fn find_client(
        &self,
        realm: &str,
        client_id: &str,
    ) -> ClientResult<Option<ClientRepresentation>> {
        let url = self.realm_url(realm, &format!("/clients?clientId={client_id}"));
        let matches: Vec<ClientRepresentation> = self.get_json(&url).await?;
        Ok(matches.into_iter().find(|c| c.client_id == client_id))
    }

    async fn update_client(
        &self,
        realm: &str,
        id: &str,
        rep: &ClientRepresentation,
    ) -> ClientResult<()> {
        self.put_json(&self.realm_url(realm, &format!("/clients/{id}")), rep)
            .await
    }

    async fn delete_client(&self, realm: &str, id: &str) -> ClientResult<()> {
        self.delete_empty(&self.realm_url(realm, &format!("/clients/{id}")))
            .await
    }

    async fn partial_import(
        &self,
        realm: &str,
        request: &PartialImportRequest,
    ) -> ClientResult<PartialImportResult> {
        self.post_for(&self.realm_url(realm, "/partialImport"), request)
            .await
    }

    async fn get_default_client_scopes(
        &self,
        realm: &str,
        client_internal_id: &str,
    ) -> ClientResult<Vec<ClientScopeRepresentation>> {
        self.get_json(&self.realm_url(
            realm,
            &format!("/clients/{client_internal_id}/default-client-scopes"),
        ))
        .await
    }

    async fn add_default_client_scope(
        &self,
        realm: &str,
        client_internal_id: &str,
        scope_id: &str,
    ) -> ClientResult<()> {
        self.put_empty(&self.realm_url(
            realm,
            &format!("/clients/{client_internal_id}/default-client-scopes/{scope_id}"),
        ))
        .await
    }

    async fn remove_default_client_scope(
        &self,
        realm: &str,
        client_internal_id: &str,
        scope_id: &str,
    ) -> ClientResult<()> {
        self.delete_empty(&self.realm_url(
            realm,
            &format!("/clients/{client_internal_id}/default-client-scopes/{scope_id}"),
        ))
        .await
    }

    async fn get_optional_client_scopes(
        &self,
        realm: &str,
        client_internal_id: &str,
    ) -> ClientResult<Vec<ClientScopeRepresentation>> {
        self.get_json(&self.realm_url(
            realm,
            &format!("/clients/{client_internal_id}/optional-client-scopes"),
        ))
        .await
    }

    async fn add_optional_client_scope(
        &self,
        realm: &str,
        client_internal_id: &str,
        scope_id: &str,
    ) -> ClientResult<()> {
        self.put_empty(&self.realm_url(
            realm,
            &format!("/clients/{client_internal_id}/optional-client-scopes/{scope_id}"),
        ))
        .await
    }

    async fn remove_optional_client_scope(
        &self,
        realm: &str,
        client_internal_id: &str,
        scope_id: &str,
    ) -> ClientResult<()> {
        self.delete_empty(&self.realm_url(
            realm,
            &format!("/clients/{client_internal_id}/optional-client-scopes/{scope_id}"),
        ))
        .await
    }

    // ── Roles ─────────────────────────────────────────────────────────

    async fn list_realm_roles(&self, realm: &str) -> ClientResult<Vec<RoleRepresentation>> {
        self.get_json(&self.realm_url(realm, "/roles")).await
    }

    async fn get_realm_role(
        &self,
        realm: &str,
        name: &str,
    ) -> ClientResult<Option<RoleRepresentation>> {
        self.get_optional(&self.realm_url(realm, &format!("/roles/{name}")))
            .await
    }

    async fn create_realm_role(&self, realm: &str, rep: &RoleRepresentation) -> ClientResult<()> {
        self.post_json(&self.realm_url(realm, "/roles"), rep).await
    }

    async fn update_realm_role(
        &self,
        realm: &str,
        name: &str,
        rep: &RoleRepresentation,
    ) -> ClientResult<()> {
        self.put_json(&self.realm_url(realm, &format!("/roles/{name}")), rep)
            .await
    }

    async fn delete_realm_role(&self, realm: &str, name: &str) -> ClientResult<()> {
        self.delete_empty(&self.realm_url(realm, &format!("/roles/{name}")))
            .await
    }

    async fn list_client_roles(
        &self,
        realm: &str,
        client_internal_id: &str,
    ) -> ClientResult<Vec<RoleRepresentation>> {
        self.get_json(&self.realm_url(realm, &format!("/clients/{client_internal_id}/roles")))
            .await
    }

    async fn get_client_role(
        &self,
        realm: &str,
        client_internal_id: &str,
        name: &str,
    ) -> ClientResult<Option<RoleRepresentation>> {
        self.get_optional(
            &self.realm_url(realm, &format!("/clients/{client_internal_id}/roles/{name}")),
        )
        .await
    }

    async fn create_client_role(
        &self,
        realm: &str,
        client_internal_id: &str,
        rep: &RoleRepresentation,
    ) -> ClientResult<()> {
        self.post_json(
            &self.realm_url(realm, &format!("/clients/{client_internal_id}/roles")),
            rep,
        )
        .await
    }

    async fn update_client_role(
        &self,
        realm: &str,
        client_internal_id: &str,
        name: &str,
        rep: &RoleRepresentation,
    ) -> ClientResult<()> {
        self.put_json(
            &self.realm_url(realm, &format!("/clients/{client_internal_id}/roles/{name}")),
            rep,
        )
        .await
    }

    async fn delete_client_role(
        &self,
        realm: &str,
        client_internal_id: &str,
        name: &str,
    ) -> ClientResult<()> {
        self.delete_empty(
            &self.realm_url(realm, &format!("/clients/{client_internal_id}/roles/{name}")),
        )
        .await
    }

    async fn get_role_composites(
        &self,
        realm: &str,
        role_id: &str,
    ) -> ClientResult<Vec<RoleRepresentation>> {
        self.get_json(&self.realm_url(realm, &format!("/roles-by-id/{role_id}/composites")))
            .await
    }

    async fn add_role_composites(
        &self,
        realm: &str,
        role_id: &str,
        roles: &[RoleRepresentation],
    ) -> ClientResult<()> {
        self.post_json(
            &self.realm_url(realm, &format!("/roles-by-id/{role_id}/composites")),
            &roles,
        )
        .await
    }

    async fn remove_role_composites(
        &self,
        realm: &str,
        role_id: &str,
        roles: &[RoleRepresentation],
    ) -> ClientResult<()> {
        self.delete_json(
            &self.realm_url(realm, &format!("/roles-by-id/{role_id}/composites")),
            &roles,
        )
        .await
    }

    // ── Identity providers ────────────────────────────────────────────

    async fn list_identity_providers(
        &self,
        realm: &str,
    ) -> ClientResult<Vec<IdentityProviderRepresentation>> {
        self.get_json(&self.realm_url(realm, "/identity-provider/instances"))
            .await
    }

    async fn create_identity_provider(
        &self,
        realm: &str,
        rep: &IdentityProviderRepresentation,
    ) -> ClientResult<()> {
        self.post_json(&self.realm_url(realm, "/identity-provider/instances"), rep)
            .await
    }

    async fn update_identity_provider(
        &self,
        realm: &str,
        alias: &str,
        rep: &IdentityProviderRepresentation,
    ) -> ClientResult<()> {
        self.put_json(
            &self.realm_url(realm, &format!("/identity-provider/instances/{alias}")),
            rep,
        )
        .await
    }

    async fn delete_identity_provider(&self, realm: &str, alias: &str) -> ClientResult<()> {
        self.delete_empty(&self.realm_url(realm, &format!("/identity-provider/instances/{alias}")))
            .await
    }

    async fn list_identity_provider_mappers(
        &self,
        realm: &str,
        alias: &str,
    ) -> ClientResult<Vec<IdentityProviderMapperRepresentation>> {
        self.get_json(
            &self.realm_url(realm, &format!("/identity-provider/instances/{alias}/mappers")),
        )
        .await
    }

    async fn create_identity_provider_mapper(
        &self,
        realm: &str,
        alias: &str,
        rep: &IdentityProviderMapperRepresentation,
    ) -> ClientResult<()> {
        self.post_json(
            &self.realm_url(realm, &format!("/identity-provider/instances/{alias}/mappers")),
            rep,
        )
        .await
    }

    async fn update_identity_provider_mapper(
        &self,
        realm: &str,
        alias: &str,
        mapper_id: &str,
        rep: &IdentityProviderMapperRepresentation,
    ) -> ClientResult<()> {
        self.put_json(
            &self.realm_url(
                realm,
                &format!("/identity-provider/instances/{alias}/mappers/{mapper_id}"),
            ),
            rep,
        )
        .await
    }

    async fn delete_identity_provider_mapper(
        &self,
        realm: &str,
        alias: &str,
        mapper_id: &str,
    ) -> ClientResult<()> {
        self.delete_empty(&self.realm_url(
            realm,
            &format!("/identity-provider/instances/{alias}/mappers/{mapper_id}"),
        ))
        .await
    }

    // ── Users ─────────────────────────────────────────────────────────

    async fn list_users(
        &self,
        realm: &str,
        first: i64,
        max: i64,
    ) -> ClientResult<Vec<UserRepresentation>> {
        self.get_json(&self.realm_url(realm, &format!("/users?first={first}&max={max}")))
            .await
    }

    async fn find_user(
        &self,
        realm: &str,
        username: &str,
    ) -> ClientResult<Option<UserRepresentation>> {
        let url = self.realm_url(realm, &format!("/users?username={username}&exact=true"));
        let matches: Vec<UserRepresentation> = self.get_json(&url).await?;
        Ok(matches.into_iter().find(|u| u.username == username))
    }

    async fn update_user(
        &self,
        realm: &str,
        id: &str,
        rep: &UserRepresentation,
    ) -> ClientResult<()> {
        self.put_json(&self.realm_url(realm, &format!("/users/{id}")), rep)
            .await
    }

    async fn delete_user(&self, realm: &str, id: &str) -> ClientResult<()> {
        self.delete_empty(&self.realm_url(realm, &format!("/users/{id}")))
            .await
    }

    async fn get_user_realm_roles(
        &self,
        realm: &str,
        user_id: &str,
    ) -> ClientResult<Vec<RoleRepresentation>> {
        self.get_json(&self.realm_url(realm, &format!("/users/{user_id}/role-mappings/realm")))
            .await
    }

    async fn add_user_realm_roles(
        &self,
        realm: &str,
        user_id: &str,
        roles: &[RoleRepresentation],
    ) -> ClientResult<()> {
        self.post_json(
            &self.realm_url(realm, &format!("/users/{user_id}/role-mappings/realm")),
            &roles,
        )
        .await
    }

    async fn remove_user_realm_roles(
        &self,
        realm: &str,
        user_id: &str,
        roles: &[RoleRepresentation],
    ) -> ClientResult<()> {
        self.delete_json(
            &self.realm_url(realm, &format!("/users/{user_id}/role-mappings/realm")),
            &roles,
        )
        .await
    }

    async fn get_user_client_roles(
        &self,
        realm: &str,
        user_id: &str,
        client_internal_id: &str,
    ) -> ClientResult<Vec<RoleRepresentation>> {
        self.get_json(&self.realm_url(
            realm,
            &format!("/users/{user_id}/role-mappings/clients/{client_internal_id}"),
        ))
        .await
    }

    async fn add_user_client_roles(
        &self,
        realm: &str,
        user_id: &str,
        client_internal_id: &str,
        roles: &[RoleRepresentation],
    ) -> ClientResult<()> {
        self.post_json(
            &self.realm_url(
                realm,
                &format!("/users/{user_id}/role-mappings/clients/{client_internal_id}"),
            ),
            &roles,
        )
        .await
    }

    async fn remove_user_client_roles(
        &self,
        realm: &str,
        user_id: &str,
        client_internal_id: &str,
        roles: &[RoleRepresentation],
    ) -> ClientResult<()> {
        self.delete_json(
            &self.realm_url(
                realm,
                &format!("/users/{user_id}/role-mappings/clients/{client_internal_id}"),
            ),
            &roles,
        )
        .await
    }

    async fn list_federated_identities(
        &self,
        realm: &str,
        user_id: &str,
    ) -> ClientResult<Vec<FederatedIdentityRepresentation>> {
        self.get_json(&self.realm_url(realm, &format!("/users/{user_id}/federated-identity")))
            .await
    }

    async fn add_federated_identity(
        &self,
        realm: &str,
        user_id: &str,
        provider_alias: &str,
        rep: &FederatedIdentityRepresentation,
    ) -> ClientResult<()> {
        self.post_json(
            &self.realm_url(
                realm,
                &format!("/users/{user_id}/federated-identity/{provider_alias}"),
            ),
            rep,
        )
        .await
    }

    async fn remove_federated_identity(
        &self,
        realm: &str,
        user_id: &str,
        provider_alias: &str,
    ) -> ClientResult<()> {
        self.delete_empty(&self.realm_url(
            realm,
            &format!("/users/{user_id}/federated-identity/{provider_alias}"),
        ))
        .await
    }

    // ── Authentication flows ──────────────────────────────────────────

    async fn list_flows(
        &self,
        realm: &str,
    ) -> ClientResult<Vec<AuthenticationFlowRepresentation>> {
        self.get_json(&self.realm_url(realm, "/authentication/flows"))
            .await
    }

    async fn create_flow(
        &self,
        realm: &str,
        rep: &AuthenticationFlowRepresentation,
    ) -> ClientResult<()> {
        self.post_json(&self.realm_url(realm, "/authentication/flows"), rep)
            .await
    }

    async fn update_flow(
        &self,
        realm: &str,
        id: &str,
        rep: &AuthenticationFlowRepresentation,
    ) -> ClientResult<()> {
        self.put_json(&self.realm_url(realm, &format!("/authentication/flows/{id}")), rep)
            .await
    }

    async fn delete_flow(&self, realm: &str, id: &str) -> ClientResult<()> {
        self.delete_empty(&self.realm_url(realm, &format!("/authentication/flows/{id}")))
            .await
    }

    async fn list_flow_executions(
        &self,
        realm: &str,
        flow_alias: &str,
    ) -> ClientResult<Vec<AuthenticationExecutionInfoRepresentation>> {
        self.get_json(
            &self.realm_url(realm, &format!("/authentication/flows/{flow_alias}/executions")),
        )
        .await
    }

    async fn add_execution(
        &self,
        realm: &str,
        flow_alias: &str,
        provider: &str,
    ) -> ClientResult<()> {
        let body = serde_json::json!({ "provider": provider });
        self.post_json(
            &self.realm_url(
                realm,
                &format!("/authentication/flows/{flow_alias}/executions/execution"),
            ),
            &body,
        )
        .await
    }

    async fn add_subflow(
        &self,
        realm: &str,
        parent_alias: &str,
        request: &CreateSubflowRequest,
    ) -> ClientResult<()> {
        self.post_json(
            &self.realm_url(
                realm,
                &format!("/authentication/flows/{parent_alias}/executions/flow"),
            ),
            request,
        )
        .await
    }

    async fn update_execution(
        &self,
        realm: &str,
        flow_alias: &str,
        rep: &AuthenticationExecutionInfoRepresentation,
    ) -> ClientResult<()> {
        self.put_json(
            &self.realm_url(realm, &format!("/authentication/flows/{flow_alias}/executions")),
            rep,
        )
        .await
    }

    async fn delete_execution(&self, realm: &str, execution_id: &str) -> ClientResult<()> {
        self.delete_empty(
            &self.realm_url(realm, &format!("/authentication/executions/{execution_id}")),
        )
        .await
    }

    async fn get_authenticator_config(
        &self,
        realm: &str,
        config_id: &str,
    ) -> ClientResult<AuthenticatorConfigRepresentation> {
        self.get_json(&self.realm_url(realm, &format!("/authentication/config/{config_id}")))
            .await
    }

    async fn create_execution_config(
        &self,
        realm: &str,
        execution_id: &str,
        rep: &AuthenticatorConfigRepresentation,
    ) -> ClientResult<()> {
        self.post_json(
            &self.realm_url(realm, &format!("/authentication/executions/{execution_id}/config")),
            rep,
        )
        .await
    }

    async fn update_authenticator_config(
        &self,
        realm: &str,
        config_id: &str,
        rep: &AuthenticatorConfigRepresentation,
    ) -> ClientResult<()> {
        self.put_json(
            &self.realm_url(realm, &format!("/authentication/config/{config_id}")),
            rep,
        )
        .await
    }

    async fn delete_authenticator_config(
        &self,
        realm: &str,
        config_id: &str,
    ) -> ClientResult<()> {
        self.delete_empty(&self.realm_url(realm, &format!("/authentication/config/{config_id}")))
            .await
    }

    // ── Localization ──────────────────────────────────────────────────

    async fn list_locales(&self, realm: &str) -> ClientResult<Vec<String>> {
        self.get_json(&self.realm_url(realm, "/localization")).await
    }

    async fn get_locale_texts(
        &self,
        realm: &str,
        locale: &str,
    ) -> ClientResult<BTreeMap<String, String>> {
        self.get_json(&self.realm_url(realm, &format!("/localization/{locale}")))
            .await
    }

    async fn update_locale_texts(
        &self,
        realm: &str,
        locale: &str,
        texts: &BTreeMap<String, String>,
    ) -> ClientResult<()> {
        self.post_json(&self.realm_url(realm, &format!("/localization/{locale}")), texts)
            .await
    }

    async fn delete_locale(&self, realm: &str, locale: &str) -> ClientResult<()> {
        self.delete_empty(&self.realm_url(realm, &format!("/localization/{locale}")))
            .await
    }

    // ── User profile ──────────────────────────────────────────────────

    async fn get_user_profile(&self, realm: &str) -> ClientResult<UserProfileConfig> {
        self.get_json(&self.realm_url(realm, "/users/profile")).await
    }

    async fn update_user_profile(
        &self,
        realm: &str,
        config: &UserProfileConfig,
    ) -> ClientResult<()> {
        self.put_json(&self.realm_url(realm, "/users/profile"), config)
            .await
    }
}
