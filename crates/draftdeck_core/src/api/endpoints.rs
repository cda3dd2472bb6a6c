//! Typed DocService endpoints.

use super::client::{ApiClient, Payload};
use super::transport::Method;
use crate::error::{ClientError, ClientResult};
use crate::model::credential::{Identity, TokenGrant};
use crate::model::draft::CreateProjectRequest;
use crate::model::project::{DocType, Project, ProjectId, Section, SectionId};
use serde_json::json;

impl ApiClient {
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> ClientResult<()> {
        let body = json!({
            "email": email,
            "password": password,
            "full_name": full_name,
        });
        self.request_unit("/auth/register", Method::Post, Some(body))
            .await
    }

    /// Exchanges credentials for a token. Field names follow the OAuth2
    /// password form (`username`, `password`).
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<TokenGrant> {
        self.submit_form(
            "/auth/login",
            vec![
                ("username".to_string(), email.to_string()),
                ("password".to_string(), password.to_string()),
            ],
        )
        .await
    }

    pub async fn me(&self) -> ClientResult<Identity> {
        self.request_json("/auth/me", Method::Get, None).await
    }

    pub async fn list_projects(&self) -> ClientResult<Vec<Project>> {
        self.request_json("/projects", Method::Get, None).await
    }

    pub async fn create_project(&self, request: &CreateProjectRequest) -> ClientResult<Project> {
        let body = serde_json::to_value(request)
            .map_err(|err| ClientError::Decode(format!("POST /projects: {err}")))?;
        self.request_json("/projects", Method::Post, Some(body))
            .await
    }

    pub async fn get_project(&self, id: ProjectId) -> ClientResult<Project> {
        self.request_json(&format!("/projects/{id}"), Method::Get, None)
            .await
    }

    pub async fn delete_project(&self, id: ProjectId) -> ClientResult<()> {
        self.request_unit(&format!("/projects/{id}"), Method::Delete, None)
            .await
    }

    pub async fn generate(&self, id: ProjectId) -> ClientResult<Project> {
        self.request_json(&format!("/projects/{id}/generate"), Method::Post, None)
            .await
    }

    pub async fn refine(&self, id: SectionId, prompt: &str) -> ClientResult<Section> {
        self.request_json(
            &format!("/sections/{id}/refine"),
            Method::Post,
            Some(json!({ "prompt": prompt })),
        )
        .await
    }

    pub async fn feedback(&self, id: SectionId, liked: bool) -> ClientResult<()> {
        self.request_unit(
            &format!("/sections/{id}/feedback"),
            Method::Post,
            Some(json!({ "liked": liked })),
        )
        .await
    }

    pub async fn comment(&self, id: SectionId, text: &str) -> ClientResult<()> {
        self.request_unit(
            &format!("/sections/{id}/comment"),
            Method::Post,
            Some(json!({ "text": text })),
        )
        .await
    }

    /// Downloads the rendered document. The body is returned as-is.
    pub async fn export(&self, id: ProjectId, format: DocType) -> ClientResult<Vec<u8>> {
        let path = format!("/projects/{id}/export/{}", format.extension());
        match self.request(&path, Method::Get, None).await? {
            Payload::Bytes(bytes) => Ok(bytes),
            Payload::Json(value) => Err(ClientError::Decode(format!(
                "GET {path}: expected a document stream, got JSON {value}"
            ))),
        }
    }
}
