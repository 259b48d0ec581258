use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub mod http;
pub mod models;

use models::{
    LoginCredentials, MedicineDraft, OrderRequest, PrescriptionUpload, ScanRequest,
    SignupRequest,
};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid backend URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Invalid JSON response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Status code and decoded JSON body of a backend response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiReply {
    pub status: u16,
    pub body: Value,
}

impl ApiReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The PharmaSure backend as seen by the client.
///
/// Authentication calls return the full reply so the caller can inspect the
/// status. Every dashboard call returns only the decoded body: a non-success
/// status is not an error there, only transport and decode failures are.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PharmaApi: Send + Sync {
    /// `POST /auth/signup` with a JSON body.
    async fn signup(&self, request: &SignupRequest) -> Result<ApiReply, ApiError>;

    /// `POST /auth/login` with a form-encoded body.
    async fn login(&self, credentials: &LoginCredentials) -> Result<ApiReply, ApiError>;

    /// Unauthenticated `GET /test`.
    async fn health(&self) -> Result<Value, ApiError>;

    async fn notifications(&self, token: &str) -> Result<Value, ApiError>;

    async fn scan(&self, token: &str, request: &ScanRequest) -> Result<Value, ApiError>;

    async fn add_medicine(&self, token: &str, draft: &MedicineDraft) -> Result<Value, ApiError>;

    async fn list_medicines(
        &self,
        token: &str,
        expiry_threshold_days: u32,
    ) -> Result<Value, ApiError>;

    async fn upload_prescription(
        &self,
        token: &str,
        upload: PrescriptionUpload,
    ) -> Result<Value, ApiError>;

    async fn create_order(&self, token: &str, order: &OrderRequest) -> Result<Value, ApiError>;
}
