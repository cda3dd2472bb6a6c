//! Credential lifecycle.
//!
//! # Responsibility
//! - Acquire a token at login, resolve the identity behind it and persist it.
//! - Resume a persisted session at startup.
//! - Drop the token (memory and storage) at logout or auth failure.
//!
//! # Invariants
//! - A token is only observable together with a resolved identity, or while
//!   that resolution is in flight; a failed resolution erases it.
//! - Restore never surfaces an error: any failure reads as "not logged in".
//! - Logout never fails and is idempotent.

use crate::api::{ApiClient, SharedToken};
use crate::error::{ClientError, ClientResult};
use crate::model::credential::{Credential, Identity};
use crate::model::validation::{require_text, ValidationError};
use crate::repo::credential_repo::CredentialRepository;
use crate::service::activity::{ActivityTracker, OperationKind, OperationTarget};
use log::{info, warn};
use std::sync::{Arc, RwLock};

pub struct SessionStore {
    api: ApiClient,
    repo: Arc<dyn CredentialRepository>,
    identity: RwLock<Option<Identity>>,
    activity: ActivityTracker,
}

impl SessionStore {
    pub fn new(
        api: ApiClient,
        repo: Arc<dyn CredentialRepository>,
        activity: ActivityTracker,
    ) -> Self {
        Self {
            api,
            repo,
            identity: RwLock::new(None),
            activity,
        }
    }

    fn token(&self) -> &SharedToken {
        self.api.token()
    }

    /// Creates an account. Does not log in.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> ClientResult<()> {
        let email = require_text(email, ValidationError::EmptyField("email"))?;
        require_text(password, ValidationError::EmptyField("password"))?;
        let full_name = full_name.map(str::trim).filter(|name| !name.is_empty());

        let _busy = self
            .activity
            .begin(OperationKind::Register, OperationTarget::none());
        self.api.register(email, password, full_name).await?;
        info!("event=register module=session status=ok");
        Ok(())
    }

    /// Exchanges credentials for a token, stores it and resolves the identity.
    ///
    /// Any remote failure is reported as `ClientError::Auth` with the server's
    /// message; on failure no token remains in memory or storage.
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<Credential> {
        let email = require_text(email, ValidationError::EmptyField("email"))?;
        require_text(password, ValidationError::EmptyField("password"))?;

        let _busy = self
            .activity
            .begin(OperationKind::Login, OperationTarget::none());

        let grant = self.api.login(email, password).await.map_err(into_auth)?;
        if grant.access_token.trim().is_empty() {
            return Err(ClientError::Auth("Login failed".to_string()));
        }

        self.token().set(Some(grant.access_token.clone()));
        if let Err(err) = self.repo.save_token(&grant.access_token) {
            self.teardown();
            return Err(err.into());
        }

        match self.api.me().await {
            Ok(identity) => {
                self.set_identity(Some(identity.clone()));
                info!("event=login module=session status=ok");
                Ok(Credential {
                    token: grant.access_token,
                    identity: Some(identity),
                })
            }
            Err(err) => {
                warn!("event=login module=session status=error stage=identity");
                self.teardown();
                Err(into_auth(err))
            }
        }
    }

    /// Resumes the persisted session, if any. Fails closed.
    pub async fn restore(&self) -> Option<Credential> {
        let token = match self.repo.load_token() {
            Ok(Some(token)) => token,
            Ok(None) => return None,
            Err(err) => {
                warn!("event=restore module=session status=error stage=storage error={err}");
                return None;
            }
        };

        let _busy = self
            .activity
            .begin(OperationKind::Restore, OperationTarget::none());
        self.token().set(Some(token.clone()));

        match self.api.me().await {
            Ok(identity) => {
                self.set_identity(Some(identity.clone()));
                info!("event=restore module=session status=ok");
                Some(Credential {
                    token,
                    identity: Some(identity),
                })
            }
            Err(_) => {
                info!("event=restore module=session status=discarded");
                self.teardown();
                None
            }
        }
    }

    /// Forgets the token and identity everywhere.
    pub fn logout(&self) {
        self.teardown();
        info!("event=logout module=session status=ok");
    }

    pub fn credential(&self) -> Option<Credential> {
        let token = self.token().get()?;
        Some(Credential {
            token,
            identity: self.identity(),
        })
    }

    /// Bearer token that outgoing calls carry right now.
    pub fn current_token(&self) -> Option<String> {
        self.token().get()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.identity
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Token held and identity resolved.
    pub fn is_authenticated(&self) -> bool {
        self.token().is_present() && self.identity().is_some()
    }

    fn set_identity(&self, identity: Option<Identity>) {
        *self
            .identity
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = identity;
    }

    fn teardown(&self) {
        self.token().set(None);
        self.set_identity(None);
        if let Err(err) = self.repo.clear_token() {
            warn!("event=token_clear module=session status=error error={err}");
        }
    }
}

fn into_auth(err: ClientError) -> ClientError {
    match err {
        ClientError::Validation(_) | ClientError::Auth(_) => err,
        other => ClientError::Auth(other.to_string()),
    }
}
