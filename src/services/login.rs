use serde_json::Value;
use thiserror::Error;

use crate::api::models::{LoginCredentials, SignupRequest};
use crate::api::{ApiError, ApiReply, PharmaApi};
use crate::session::{Role, Session};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthMode {
    #[default]
    Signup,
    Login,
}

impl AuthMode {
    pub fn label(self) -> &'static str {
        match self {
            AuthMode::Signup => "Sign up",
            AuthMode::Login => "Log in",
        }
    }

    fn fallback_message(self) -> &'static str {
        match self {
            AuthMode::Signup => "Signup failed",
            AuthMode::Login => "Login failed",
        }
    }
}

/// Why a submit did not produce a session. The `Display` text is what the
/// form shows.
#[derive(Error, Debug)]
pub enum AuthFailure {
    #[error("{0}")]
    Rejected(String),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// State of the login/signup form.
#[derive(Clone, Debug, PartialEq)]
pub struct LoginPanel {
    pub email: String,
    pub password: String,
    pub role: Role,
    pub mode: AuthMode,
    loading: bool,
    error: String,
}

impl Default for LoginPanel {
    fn default() -> Self {
        Self {
            email: "user@example.com".to_string(),
            password: "password".to_string(),
            role: Role::default(),
            mode: AuthMode::default(),
            loading: false,
            error: String::new(),
        }
    }
}

impl LoginPanel {
    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> &str {
        &self.error
    }

    pub fn submit_label(&self) -> &'static str {
        if self.loading {
            return "Please wait...";
        }
        match self.mode {
            AuthMode::Signup => "Create account",
            AuthMode::Login => "Log in",
        }
    }

    /// Exchanges the form for a session with exactly one request.
    ///
    /// Returns the session on success. On failure the message is kept in
    /// [`LoginPanel::error`] and `None` is returned. The loading flag is
    /// cleared either way.
    pub async fn submit(&mut self, api: &dyn PharmaApi) -> Option<Session> {
        self.error.clear();
        self.loading = true;
        let outcome = self.authenticate(api).await;
        self.loading = false;

        match outcome {
            Ok(session) => {
                log::info!("{} succeeded", self.mode.label());
                Some(session)
            }
            Err(e) => {
                log::warn!("{} failed: {}", self.mode.label(), e);
                self.error = e.to_string();
                None
            }
        }
    }

    async fn authenticate(&self, api: &dyn PharmaApi) -> Result<Session, AuthFailure> {
        let reply = match self.mode {
            AuthMode::Signup => {
                api.signup(&SignupRequest::demo(&self.email, &self.password, self.role))
                    .await?
            }
            AuthMode::Login => {
                let credentials = LoginCredentials {
                    username: self.email.clone(),
                    password: self.password.clone(),
                };
                api.login(&credentials).await?
            }
        };
        let token = self.access_token(reply)?;
        // The token is not decoded: the session keeps the role picked on the form.
        Ok(Session::new(token, self.role))
    }

    fn access_token(&self, reply: ApiReply) -> Result<String, AuthFailure> {
        let fallback = || AuthFailure::Rejected(self.mode.fallback_message().to_string());
        if !reply.is_success() {
            return Err(detail_message(&reply.body)
                .map(AuthFailure::Rejected)
                .unwrap_or_else(fallback));
        }
        match reply.body.get("access_token") {
            Some(Value::String(token)) => Ok(token.clone()),
            _ => Err(fallback()),
        }
    }
}

/// The server's `detail` field as display text, if it carries anything.
fn detail_message(body: &Value) -> Option<String> {
    match body.get("detail")? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockPharmaApi;
    use serde_json::json;
    use std::sync::{Mutex, Once};

    /// Keeps every log line emitted by the tests in this process.
    struct CapturingLogger;

    static LOG_LINES: Mutex<Vec<String>> = Mutex::new(Vec::new());
    static INSTALL_LOGGER: Once = Once::new();

    impl log::Log for CapturingLogger {
        fn enabled(&self, _: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            LOG_LINES.lock().unwrap().push(record.args().to_string());
        }

        fn flush(&self) {}
    }

    fn capture_logs() {
        INSTALL_LOGGER.call_once(|| {
            log::set_logger(&CapturingLogger).unwrap();
            log::set_max_level(log::LevelFilter::Trace);
        });
    }

    fn reply(status: u16, body: Value) -> ApiReply {
        ApiReply { status, body }
    }

    #[test]
    fn defaults_match_the_demo_form() {
        let panel = LoginPanel::default();
        assert_eq!(panel.email, "user@example.com");
        assert_eq!(panel.password, "password");
        assert_eq!(panel.role, Role::User);
        assert_eq!(panel.mode, AuthMode::Signup);
        assert!(!panel.loading());
        assert_eq!(panel.submit_label(), "Create account");
    }

    #[tokio::test]
    async fn signup_success_yields_session_with_selected_role() {
        let mut api = MockPharmaApi::new();
        api.expect_signup()
            .withf(|request| {
                request.role == Role::Pharmacist
                    && request.pharmacy_name == "Sample Pharmacy"
                    && request.license_no == "LIC123"
                    && request.name.is_empty()
            })
            .times(1)
            .returning(|_| Ok(reply(200, json!({ "access_token": "tok-1" }))));
        api.expect_login().never();

        let mut panel = LoginPanel {
            role: Role::Pharmacist,
            ..LoginPanel::default()
        };
        let session = panel.submit(&api).await;

        assert_eq!(session, Some(Session::new("tok-1", Role::Pharmacist)));
        assert!(!panel.loading());
        assert_eq!(panel.error(), "");
    }

    #[tokio::test]
    async fn login_sends_email_as_username_and_keeps_form_role() {
        let mut api = MockPharmaApi::new();
        api.expect_login()
            .withf(|credentials| {
                credentials.username == "rx@pharma.test" && credentials.password == "secret"
            })
            .times(1)
            // Token claims say pharmacist; the form's role still wins.
            .returning(|_| Ok(reply(200, json!({ "access_token": "tok-2", "role": "pharmacist" }))));
        api.expect_signup().never();

        let mut panel = LoginPanel {
            email: "rx@pharma.test".to_string(),
            password: "secret".to_string(),
            mode: AuthMode::Login,
            ..LoginPanel::default()
        };

        assert_eq!(
            panel.submit(&api).await,
            Some(Session::new("tok-2", Role::User))
        );
    }

    #[tokio::test]
    async fn rejection_shows_server_detail() {
        let mut api = MockPharmaApi::new();
        api.expect_login()
            .returning(|_| Ok(reply(401, json!({ "detail": "Incorrect email or password" }))));

        let mut panel = LoginPanel {
            mode: AuthMode::Login,
            ..LoginPanel::default()
        };

        assert_eq!(panel.submit(&api).await, None);
        assert_eq!(panel.error(), "Incorrect email or password");
        assert!(!panel.loading());
    }

    #[tokio::test]
    async fn rejection_without_detail_uses_fallback() {
        let mut api = MockPharmaApi::new();
        api.expect_signup()
            .returning(|_| Ok(reply(500, json!({ "error": "boom" }))));

        let mut panel = LoginPanel::default();

        assert_eq!(panel.submit(&api).await, None);
        assert_eq!(panel.error(), "Signup failed");
    }

    #[tokio::test]
    async fn structured_detail_is_shown_as_json() {
        let mut api = MockPharmaApi::new();
        api.expect_signup()
            .returning(|_| Ok(reply(422, json!({ "detail": [{ "msg": "invalid email" }] }))));

        let mut panel = LoginPanel::default();
        panel.submit(&api).await;

        assert_eq!(panel.error(), r#"[{"msg":"invalid email"}]"#);
    }

    #[tokio::test]
    async fn success_without_token_is_a_failure() {
        let mut api = MockPharmaApi::new();
        api.expect_login().returning(|_| Ok(reply(200, json!({}))));

        let mut panel = LoginPanel {
            mode: AuthMode::Login,
            ..LoginPanel::default()
        };

        assert_eq!(panel.submit(&api).await, None);
        assert_eq!(panel.error(), "Login failed");
    }

    #[tokio::test]
    async fn transport_error_is_shown_and_previous_error_cleared() {
        let mut api = MockPharmaApi::new();
        let mut calls = 0;
        api.expect_signup().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(ApiError::Decode(
                    serde_json::from_str::<Value>("<").unwrap_err(),
                ))
            } else {
                Ok(reply(201, json!({ "access_token": "tok-3" })))
            }
        });

        let mut panel = LoginPanel::default();

        assert_eq!(panel.submit(&api).await, None);
        assert!(panel.error().starts_with("Invalid JSON response"));
        assert!(!panel.loading());

        assert!(panel.submit(&api).await.is_some());
        assert_eq!(panel.error(), "");
    }

    #[tokio::test]
    async fn auth_outcome_logs_do_not_name_the_user() {
        capture_logs();
        let mut api = MockPharmaApi::new();
        api.expect_signup()
            .returning(|_| Ok(reply(201, json!({ "access_token": "tok-4" }))));
        api.expect_login()
            .returning(|_| Ok(reply(401, json!({ "detail": "Incorrect email or password" }))));

        let mut panel = LoginPanel::default();
        panel.email = "private.person@clinic.test".to_string();
        assert!(panel.submit(&api).await.is_some());
        panel.mode = AuthMode::Login;
        assert!(panel.submit(&api).await.is_none());

        let lines = LOG_LINES.lock().unwrap();
        assert!(lines.iter().any(|line| line == "Sign up succeeded"));
        assert!(lines
            .iter()
            .any(|line| line == "Log in failed: Incorrect email or password"));
        assert!(lines.iter().all(|line| !line.contains("private.person")));
    }
}
