use crate::services::dashboard::DashboardPanel;
use crate::services::login::LoginPanel;
use crate::session::Session;

#[derive(Clone, Debug, PartialEq)]
pub enum Screen {
    Login(LoginPanel),
    Dashboard(DashboardPanel),
}

/// Root state of one chat. The session exists only while the dashboard is
/// shown, and it is owned by the dashboard panel.
#[derive(Clone, Debug, PartialEq)]
pub struct App {
    screen: Screen,
}

impl Default for App {
    fn default() -> Self {
        Self {
            screen: Screen::Login(LoginPanel::default()),
        }
    }
}

impl App {
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut Screen {
        &mut self.screen
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.screen {
            Screen::Login(_) => None,
            Screen::Dashboard(panel) => Some(panel.session()),
        }
    }

    pub fn sign_in(&mut self, dashboard: DashboardPanel) {
        self.screen = Screen::Dashboard(dashboard);
    }

    /// Drops the session together with every dashboard slot and shows a fresh
    /// login form.
    pub fn logout(&mut self) {
        self.screen = Screen::Login(LoginPanel::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Role;

    #[test]
    fn starts_logged_out() {
        let app = App::default();
        assert_eq!(app.session(), None);
        assert_eq!(app.screen(), &Screen::Login(LoginPanel::default()));
    }

    #[test]
    fn sign_in_exposes_session() {
        let mut app = App::default();
        app.sign_in(DashboardPanel::new(Session::new("tok", Role::Pharmacist)));

        assert_eq!(app.session(), Some(&Session::new("tok", Role::Pharmacist)));
        assert!(matches!(app.screen(), Screen::Dashboard(_)));
    }

    #[test]
    fn logout_returns_to_a_fresh_login_form() {
        let mut app = App::default();
        if let Screen::Login(panel) = app.screen_mut() {
            panel.email = "someone@pharma.test".to_string();
        }
        let mut dashboard = DashboardPanel::new(Session::new("tok", Role::User));
        dashboard.scan_code = "999".to_string();
        app.sign_in(dashboard);

        app.logout();

        assert_eq!(app.session(), None);
        assert_eq!(app, App::default());
    }
}
