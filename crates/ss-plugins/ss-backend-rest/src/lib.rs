//! # ss-backend-rest
//!
//! Hosted backend over HTTP: rows through PostgREST (`/rest/v1`), blobs
//! through the storage API (`/storage/v1`), identity through GoTrue
//! (`/auth/v1`). Every request carries the project's anon key.

pub mod postgrest;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{Duration, Utc};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use ss_core::models::{AuthUser, OAuthProvider, Session, SignUpOutcome};
use ss_core::query::{Filter, Join, Query, Table};
use ss_core::traits::{AuthProvider, ObjectStore, RowStore};
use tracing::debug;

pub struct RestBackend {
    client: Client,
    /// Project URL without trailing slash (e.g., "https://xyz.supabase.co")
    url: String,
    anon_key: SecretString,
}

#[derive(Debug, Deserialize)]
struct Bucket {
    name: String,
}

#[derive(Debug, Deserialize)]
struct StoredObject {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct UserMetadata {
    #[serde(default)]
    full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoTrueUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<UserMetadata>,
}

impl From<GoTrueUser> for AuthUser {
    fn from(user: GoTrueUser) -> Self {
        AuthUser {
            id: user.id,
            email: user.email.unwrap_or_default(),
            full_name: user.user_metadata.and_then(|m| m.full_name),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    user: GoTrueUser,
}

impl From<TokenResponse> for Session {
    fn from(token: TokenResponse) -> Self {
        Session {
            access_token: token.access_token,
            user: token.user.into(),
            expires_at: token.expires_in.map(|secs| Utc::now() + Duration::seconds(secs)),
        }
    }
}

/// Sign-up answers with a session, or with the bare user while the address
/// awaits confirmation.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    Pending(GoTrueUser),
}

/// Turns non-2xx responses into errors carrying the body text.
async fn check(response: Response) -> anyhow::Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    anyhow::bail!("backend responded {status}: {body}")
}

impl RestBackend {
    pub fn new(url: impl Into<String>, anon_key: SecretString) -> Self {
        let url = url.into().trim_end_matches('/').to_string();
        Self { client: Client::new(), url, anon_key }
    }

    fn request(&self, method: Method, path: &str, bearer: Option<&str>) -> RequestBuilder {
        let key = self.anon_key.expose_secret();
        self.client
            .request(method, format!("{}{}", self.url, path))
            .header("apikey", key)
            .bearer_auth(bearer.unwrap_or(key))
    }

    fn rows(&self, method: Method, table: Table) -> RequestBuilder {
        self.request(method, &format!("/rest/v1/{table}"), None)
    }

    /// URL the browser is sent to for a federated sign-in.
    pub fn authorize_url(&self, provider: OAuthProvider, redirect_to: &str) -> anyhow::Result<String> {
        let url = Url::parse_with_params(
            &format!("{}/auth/v1/authorize", self.url),
            &[("provider", provider.as_str()), ("redirect_to", redirect_to)],
        )?;
        Ok(url.into())
    }
}

#[async_trait]
impl RowStore for RestBackend {
    async fn select(&self, query: &Query) -> anyhow::Result<Vec<Value>> {
        debug!(table = %query.table, "Selecting rows");
        let response = self.rows(Method::GET, query.table).query(&postgrest::query_params(query)).send().await?;
        Ok(check(response).await?.json().await?)
    }

    async fn insert(&self, table: Table, row: Value, joins: &[Join]) -> anyhow::Result<Value> {
        let response = self
            .rows(Method::POST, table)
            .query(&[("select", postgrest::select_clause(joins))])
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;
        let rows: Vec<Value> = check(response).await?.json().await?;
        rows.into_iter().next().ok_or_else(|| anyhow::anyhow!("insert into {table} returned no row"))
    }

    async fn update(
        &self,
        table: Table,
        id: &str,
        scope: &[Filter],
        patch: Value,
        joins: &[Join],
    ) -> anyhow::Result<Option<Value>> {
        let mut params = postgrest::target_params(id, scope);
        params.push(("select".to_string(), postgrest::select_clause(joins)));
        let response = self
            .rows(Method::PATCH, table)
            .query(&params)
            .header("Prefer", "return=representation")
            .json(&patch)
            .send()
            .await?;
        let rows: Vec<Value> = check(response).await?.json().await?;
        Ok(rows.into_iter().next())
    }

    async fn delete(&self, table: Table, id: &str, scope: &[Filter]) -> anyhow::Result<bool> {
        let mut params = postgrest::target_params(id, scope);
        params.push(("select".to_string(), "id".to_string()));
        let response = self
            .rows(Method::DELETE, table)
            .query(&params)
            .header("Prefer", "return=representation")
            .send()
            .await?;
        let rows: Vec<Value> = check(response).await?.json().await?;
        Ok(!rows.is_empty())
    }
}

#[async_trait]
impl ObjectStore for RestBackend {
    async fn list_buckets(&self) -> anyhow::Result<Vec<String>> {
        let response = self.request(Method::GET, "/storage/v1/bucket", None).send().await?;
        let buckets: Vec<Bucket> = check(response).await?.json().await?;
        Ok(buckets.into_iter().map(|b| b.name).collect())
    }

    async fn list_objects(&self, bucket: &str, prefix: &str, limit: usize) -> anyhow::Result<Vec<String>> {
        let response = self
            .request(Method::POST, &format!("/storage/v1/object/list/{bucket}"), None)
            .json(&json!({ "prefix": prefix, "limit": limit, "offset": 0 }))
            .send()
            .await?;
        let objects: Vec<StoredObject> = check(response).await?.json().await?;
        Ok(objects.into_iter().map(|o| o.name).collect())
    }

    async fn upload(&self, bucket: &str, path: &str, data: Bytes, content_type: &str) -> anyhow::Result<String> {
        let response = self
            .request(Method::POST, &format!("/storage/v1/object/{bucket}/{path}"), None)
            .header("Content-Type", content_type)
            .header("x-upsert", "false")
            .body(data)
            .send()
            .await?;
        check(response).await?;
        debug!(bucket, path, "Uploaded object");
        Ok(path.to_string())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{}", self.url, bucket, path)
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> anyhow::Result<()> {
        let response = self
            .request(Method::DELETE, &format!("/storage/v1/object/{bucket}"), None)
            .json(&json!({ "prefixes": paths }))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl AuthProvider for RestBackend {
    async fn session(&self, access_token: &str) -> anyhow::Result<Option<Session>> {
        let response = self.request(Method::GET, "/auth/v1/user", Some(access_token)).send().await?;
        if matches!(response.status().as_u16(), 401 | 403) {
            return Ok(None);
        }
        let user: GoTrueUser = check(response).await?.json().await?;
        Ok(Some(Session { access_token: access_token.to_string(), user: user.into(), expires_at: None }))
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> anyhow::Result<Session> {
        let response = self
            .request(Method::POST, "/auth/v1/token", None)
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let token: TokenResponse = check(response).await?.json().await?;
        Ok(token.into())
    }

    async fn sign_in_with_oauth(&self, provider: OAuthProvider, redirect_to: &str) -> anyhow::Result<String> {
        self.authorize_url(provider, redirect_to)
    }

    async fn sign_up(&self, email: &str, password: &str, full_name: &str) -> anyhow::Result<SignUpOutcome> {
        let response = self
            .request(Method::POST, "/auth/v1/signup", None)
            .json(&json!({ "email": email, "password": password, "data": { "full_name": full_name } }))
            .send()
            .await?;
        Ok(match check(response).await?.json::<SignUpResponse>().await? {
            SignUpResponse::Session(token) => {
                let session: Session = token.into();
                SignUpOutcome { user: session.user.clone(), session: Some(session) }
            }
            SignUpResponse::Pending(user) => SignUpOutcome { user: user.into(), session: None },
        })
    }

    async fn sign_out(&self, access_token: &str) -> anyhow::Result<()> {
        let response = self.request(Method::POST, "/auth/v1/logout", Some(access_token)).send().await?;
        check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> RestBackend {
        RestBackend::new("https://project.example.co/", SecretString::from("anon".to_string()))
    }

    #[test]
    fn public_urls_live_under_storage_api() {
        assert_eq!(
            backend().public_url("items", "items/u1-1.png"),
            "https://project.example.co/storage/v1/object/public/items/items/u1-1.png"
        );
    }

    #[test]
    fn authorize_url_carries_provider_and_redirect() {
        let url = backend().authorize_url(OAuthProvider::Apple, "http://localhost:3000/cb?x=1").unwrap();
        assert!(url.starts_with("https://project.example.co/auth/v1/authorize?provider=apple&redirect_to="));
        assert!(url.contains("http%3A%2F%2Flocalhost%3A3000%2Fcb%3Fx%3D1"));
    }

    #[test]
    fn sign_up_response_distinguishes_pending_confirmation() {
        let pending: SignUpResponse =
            serde_json::from_value(json!({ "id": "u1", "email": "ada@example.com" })).unwrap();
        assert!(matches!(pending, SignUpResponse::Pending(_)));

        let signed_in: SignUpResponse = serde_json::from_value(json!({
            "access_token": "t",
            "expires_in": 3600,
            "user": { "id": "u1", "email": "ada@example.com", "user_metadata": { "full_name": "Ada" } }
        }))
        .unwrap();
        let SignUpResponse::Session(token) = signed_in else { panic!("expected a session") };
        let session: Session = token.into();
        assert_eq!(session.user.full_name.as_deref(), Some("Ada"));
        assert!(session.expires_at.is_some());
    }
}
