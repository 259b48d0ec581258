use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::Serialize;

use crate::session::Role;

/// Days until the sample medicine expires.
pub const SAMPLE_EXPIRY_DAYS: i64 = 20;

/// Expiry window the backend uses to attach warnings to the medicine list.
pub const EXPIRY_THRESHOLD_DAYS: u32 = 30;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
    pub name: String,
    pub pharmacy_name: String,
    pub license_no: String,
}

impl SignupRequest {
    /// Builds the signup body with the demo profile fields for `role`.
    /// Fields that don't apply to the role are sent as empty strings.
    pub fn demo(email: &str, password: &str, role: Role) -> Self {
        let (name, pharmacy_name, license_no) = match role {
            Role::User => ("Sample User", "", ""),
            Role::Pharmacist => ("", "Sample Pharmacy", "LIC123"),
        };
        Self {
            email: email.to_string(),
            password: password.to_string(),
            role,
            name: name.to_string(),
            pharmacy_name: pharmacy_name.to_string(),
            license_no: license_no.to_string(),
        }
    }
}

/// Form-encoded login body. The backend expects the email under `username`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ScanRequest {
    pub barcode: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MedicineDraft {
    pub user_id: String,
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub reminders: Vec<String>,
    pub expiry_date: String,
}

impl MedicineDraft {
    pub fn sample(now: DateTime<Utc>) -> Self {
        let expiry = now + Duration::days(SAMPLE_EXPIRY_DAYS);
        Self {
            user_id: "me".to_string(),
            name: "Sample Med".to_string(),
            dosage: "1 tab".to_string(),
            frequency: "daily".to_string(),
            reminders: vec!["08:00".to_string()],
            expiry_date: expiry.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub name: String,
    pub qty: u32,
    pub price: u32,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub items: Vec<OrderItem>,
}

impl OrderRequest {
    pub fn sample() -> Self {
        Self {
            items: vec![OrderItem {
                name: "Item A".to_string(),
                qty: 1,
                price: 10,
            }],
        }
    }
}

/// A prescription file as received from the chat, ready for multipart upload.
#[derive(Debug, Clone, PartialEq)]
pub struct PrescriptionUpload {
    pub file_name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(Role::User, "Sample User", "", "")]
    #[case(Role::Pharmacist, "", "Sample Pharmacy", "LIC123")]
    fn signup_sends_role_conditional_fields(
        #[case] role: Role,
        #[case] name: &str,
        #[case] pharmacy_name: &str,
        #[case] license_no: &str,
    ) {
        let body = serde_json::to_value(SignupRequest::demo("a@b.c", "pw", role)).unwrap();
        assert_eq!(
            body,
            json!({
                "email": "a@b.c",
                "password": "pw",
                "role": role.as_str(),
                "name": name,
                "pharmacy_name": pharmacy_name,
                "license_no": license_no,
            })
        );
    }

    #[test]
    fn sample_medicine_expires_in_twenty_days() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap();
        let draft = MedicineDraft::sample(now);
        assert_eq!(draft.expiry_date, "2026-11-07T09:30:00.000Z");
        assert_eq!(draft.reminders, vec!["08:00"]);
        assert_eq!(draft.user_id, "me");
    }

    #[test]
    fn sample_order_has_one_line_item() {
        assert_eq!(
            serde_json::to_value(OrderRequest::sample()).unwrap(),
            json!({ "items": [{ "name": "Item A", "qty": 1, "price": 10 }] })
        );
    }
}
