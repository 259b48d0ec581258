use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, RequestBuilder, StatusCode,
};
use serde_json::Value;
use url::Url;

use super::models::{
    LoginCredentials, MedicineDraft, OrderRequest, PrescriptionUpload, ScanRequest,
    SignupRequest,
};
use super::{ApiError, ApiReply, PharmaApi};

/// reqwest-backed client for the PharmaSure REST backend.
///
/// Requests are sent once: no timeout, retry or deduplication is applied.
#[derive(Clone, Debug)]
pub struct HttpPharmaApi {
    client: Client,
    base: Url,
}

impl HttpPharmaApi {
    /// `base` must end with `/` so that endpoint paths join beneath it
    /// (see [`crate::config::resolve_backend_base`]).
    pub fn new(base: Url) -> Result<Self, ApiError> {
        let client = Client::builder().build()?;
        Ok(Self { client, base })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base.join(path)?)
    }

    fn signup_request(&self, request: &SignupRequest) -> Result<RequestBuilder, ApiError> {
        Ok(self.client.post(self.endpoint("auth/signup")?).json(request))
    }

    fn login_request(&self, credentials: &LoginCredentials) -> Result<RequestBuilder, ApiError> {
        Ok(self.client.post(self.endpoint("auth/login")?).form(credentials))
    }

    fn health_request(&self) -> Result<RequestBuilder, ApiError> {
        Ok(self.client.get(self.endpoint("test")?))
    }

    fn notifications_request(&self, token: &str) -> Result<RequestBuilder, ApiError> {
        Ok(self
            .client
            .get(self.endpoint("notifications")?)
            .bearer_auth(token))
    }

    fn scan_request(&self, token: &str, request: &ScanRequest) -> Result<RequestBuilder, ApiError> {
        Ok(self
            .client
            .post(self.endpoint("medicines/scan")?)
            .bearer_auth(token)
            .json(request))
    }

    fn add_medicine_request(
        &self,
        token: &str,
        draft: &MedicineDraft,
    ) -> Result<RequestBuilder, ApiError> {
        Ok(self
            .client
            .post(self.endpoint("users/me/medicines")?)
            .bearer_auth(token)
            .json(draft))
    }

    fn list_medicines_request(
        &self,
        token: &str,
        expiry_threshold_days: u32,
    ) -> Result<RequestBuilder, ApiError> {
        Ok(self
            .client
            .get(self.endpoint("users/me/medicines")?)
            .bearer_auth(token)
            .query(&[("expiry_threshold_days", expiry_threshold_days)]))
    }

    fn prescription_request(
        &self,
        token: &str,
        upload: PrescriptionUpload,
    ) -> Result<RequestBuilder, ApiError> {
        let mut part = Part::bytes(upload.bytes).file_name(upload.file_name);
        if let Some(mime) = upload.mime_type.as_deref() {
            part = part.mime_str(mime)?;
        }
        Ok(self
            .client
            .post(self.endpoint("prescriptions")?)
            .bearer_auth(token)
            .multipart(Form::new().part("file", part)))
    }

    fn order_request(&self, token: &str, order: &OrderRequest) -> Result<RequestBuilder, ApiError> {
        Ok(self
            .client
            .post(self.endpoint("orders")?)
            .bearer_auth(token)
            .json(order))
    }
}

async fn send(request: RequestBuilder) -> Result<ApiReply, ApiError> {
    let response = request.send().await?;
    let status = response.status();
    log::debug!("Backend {} responded {}", response.url().path(), status);
    let body = response.bytes().await?;
    decode_reply(status, &body)
}

/// Decodes the body as JSON whatever the status code.
fn decode_reply(status: StatusCode, body: &[u8]) -> Result<ApiReply, ApiError> {
    Ok(ApiReply {
        status: status.as_u16(),
        body: serde_json::from_slice(body)?,
    })
}

/// Sends a dashboard request and keeps only the body.
// Status is deliberately ignored: error bodies are displayed like successes.
async fn send_for_body(request: RequestBuilder) -> Result<Value, ApiError> {
    send(request).await.map(|reply| reply.body)
}

#[async_trait]
impl PharmaApi for HttpPharmaApi {
    async fn signup(&self, request: &SignupRequest) -> Result<ApiReply, ApiError> {
        send(self.signup_request(request)?).await
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<ApiReply, ApiError> {
        send(self.login_request(credentials)?).await
    }

    async fn health(&self) -> Result<Value, ApiError> {
        send_for_body(self.health_request()?).await
    }

    async fn notifications(&self, token: &str) -> Result<Value, ApiError> {
        send_for_body(self.notifications_request(token)?).await
    }

    async fn scan(&self, token: &str, request: &ScanRequest) -> Result<Value, ApiError> {
        send_for_body(self.scan_request(token, request)?).await
    }

    async fn add_medicine(&self, token: &str, draft: &MedicineDraft) -> Result<Value, ApiError> {
        send_for_body(self.add_medicine_request(token, draft)?).await
    }

    async fn list_medicines(
        &self,
        token: &str,
        expiry_threshold_days: u32,
    ) -> Result<Value, ApiError> {
        send_for_body(self.list_medicines_request(token, expiry_threshold_days)?).await
    }

    async fn upload_prescription(
        &self,
        token: &str,
        upload: PrescriptionUpload,
    ) -> Result<Value, ApiError> {
        send_for_body(self.prescription_request(token, upload)?).await
    }

    async fn create_order(&self, token: &str, order: &OrderRequest) -> Result<Value, ApiError> {
        send_for_body(self.order_request(token, order)?).await
    }
}
