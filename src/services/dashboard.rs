use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::api::models::{
    MedicineDraft, OrderRequest, PrescriptionUpload, ScanRequest, EXPIRY_THRESHOLD_DAYS,
};
use crate::api::{ApiError, PharmaApi};
use crate::session::Session;
use crate::utils::is_truthy;

pub const DEFAULT_SCAN_CODE: &str = "1234567890";

/// View state of the authenticated dashboard.
///
/// Each action owns one slot and replaces it wholesale with the latest
/// response body. None of the actions inspect HTTP status codes: an error body
/// is shown exactly like a success. Transport and decode failures are returned
/// to the caller untouched and leave the slot as it was.
#[derive(Clone, Debug, PartialEq)]
pub struct DashboardPanel {
    session: Session,
    hello: String,
    notifications: Value,
    pub scan_code: String,
    scan_result: Value,
    medicines: Value,
    order_id: Option<Value>,
}

impl DashboardPanel {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            hello: String::new(),
            notifications: json!([]),
            scan_code: DEFAULT_SCAN_CODE.to_string(),
            scan_result: Value::Null,
            medicines: json!({ "items": [], "warnings": [] }),
            order_id: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn hello(&self) -> &str {
        &self.hello
    }

    pub fn notifications(&self) -> &Value {
        &self.notifications
    }

    pub fn scan_result(&self) -> &Value {
        &self.scan_result
    }

    pub fn medicines(&self) -> &Value {
        &self.medicines
    }

    pub fn order_id(&self) -> Option<&Value> {
        self.order_id.as_ref()
    }

    /// Runs the on-open fetches: the health check and the notification list,
    /// issued together.
    ///
    /// The health check is fire-and-forget, so its failure is only logged. A
    /// notification failure is returned.
    pub async fn mount(&mut self, api: &dyn PharmaApi) -> Result<(), ApiError> {
        let token = self.session.token();
        let (health, notifications) = futures::join!(api.health(), api.notifications(token));

        match health {
            Ok(body) => self.hello = body.to_string(),
            Err(e) => log::warn!("Health check failed: {}", e),
        }
        self.notifications = items_or_empty(notifications?);
        Ok(())
    }

    pub async fn check_notifications(&mut self, api: &dyn PharmaApi) -> Result<(), ApiError> {
        let body = api.notifications(self.session.token()).await?;
        self.notifications = items_or_empty(body);
        Ok(())
    }

    pub async fn scan(&mut self, api: &dyn PharmaApi) -> Result<(), ApiError> {
        let request = ScanRequest {
            barcode: self.scan_code.clone(),
        };
        self.scan_result = api.scan(self.session.token(), &request).await?;
        Ok(())
    }

    /// Stores the demo medicine expiring 20 days after `now`, then refreshes
    /// the list once. Returns the body of the create call.
    pub async fn add_sample_medicine(
        &mut self,
        api: &dyn PharmaApi,
        now: DateTime<Utc>,
    ) -> Result<Value, ApiError> {
        let draft = MedicineDraft::sample(now);
        let created = api.add_medicine(self.session.token(), &draft).await?;
        self.list_medicines(api).await?;
        Ok(created)
    }

    pub async fn list_medicines(&mut self, api: &dyn PharmaApi) -> Result<(), ApiError> {
        self.medicines = api
            .list_medicines(self.session.token(), EXPIRY_THRESHOLD_DAYS)
            .await?;
        Ok(())
    }

    /// Uploads the file and returns the alert text naming the stored URL.
    pub async fn upload_prescription(
        &self,
        api: &dyn PharmaApi,
        upload: PrescriptionUpload,
    ) -> Result<String, ApiError> {
        let body = api.upload_prescription(self.session.token(), upload).await?;
        let file_url = match body.get("file_url") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(url)) => url.clone(),
            Some(other) => other.to_string(),
        };
        Ok(format!("Uploaded prescription: {file_url}"))
    }

    pub async fn create_order(&mut self, api: &dyn PharmaApi) -> Result<(), ApiError> {
        let body = api
            .create_order(self.session.token(), &OrderRequest::sample())
            .await?;
        self.order_id = body.get("id").filter(|id| is_truthy(id)).cloned();
        Ok(())
    }
}

fn items_or_empty(mut body: Value) -> Value {
    match body.get_mut("items").map(Value::take) {
        None | Some(Value::Null) => json!([]),
        Some(items) => items,
    }
}
