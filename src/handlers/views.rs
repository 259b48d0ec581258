use serde_json::Value;
use teloxide::types::{KeyboardButton, KeyboardMarkup};

use super::Command;
use crate::app::{App, Screen};
use crate::services::dashboard::DashboardPanel;
use crate::services::login::LoginPanel;
use crate::utils::{clip, display_value, escape_code, escape_markdown, pretty_json};

pub const SIGN_UP_BUTTON: &str = "Sign up";
pub const LOG_IN_BUTTON: &str = "Log in";
pub const SCAN_BUTTON: &str = "🔍 Scan";
pub const ADD_SAMPLE_BUTTON: &str = "➕ Add sample";
pub const REFRESH_BUTTON: &str = "🔄 Refresh";
pub const ORDER_BUTTON: &str = "🛒 Create order";
pub const NOTIFICATIONS_BUTTON: &str = "🔔 Notifications";
pub const LOGOUT_BUTTON: &str = "🚪 Logout";

/// Keeps four JSON blocks plus headings under Telegram's 4096 character limit.
const MAX_BLOCK_CHARS: usize = 900;

/// A screen ready to be sent as a MarkdownV2 message.
#[derive(Clone, Debug)]
pub struct Rendered {
    pub text: String,
    pub keyboard: KeyboardMarkup,
}

pub fn render(app: &App) -> Rendered {
    match app.screen() {
        Screen::Login(panel) => login_screen(panel),
        Screen::Dashboard(panel) => dashboard_screen(panel),
    }
}

fn submit_button(panel: &LoginPanel) -> String {
    format!("✅ {}", panel.submit_label())
}

pub fn login_screen(panel: &LoginPanel) -> Rendered {
    let mut lines = vec![
        "*PharmaSure*".to_string(),
        String::new(),
        format!("Mode: *{}*", escape_markdown(panel.mode.label())),
        format!("Email: {}", escape_markdown(&panel.email)),
        format!("Password: {}", "•".repeat(panel.password.chars().count())),
        format!("Role: {}", escape_markdown(panel.role.as_str())),
    ];
    if !panel.error().is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "❗ {}",
            escape_markdown(&clip(panel.error(), MAX_BLOCK_CHARS))
        ));
    }
    lines.push(String::new());
    lines.push(escape_markdown(&format!(
        "Edit with /email, /password and /role, then tap \"{}\".",
        submit_button(panel)
    )));

    let keyboard = KeyboardMarkup::new(vec![
        vec![
            KeyboardButton::new(SIGN_UP_BUTTON),
            KeyboardButton::new(LOG_IN_BUTTON),
        ],
        vec![KeyboardButton::new(submit_button(panel))],
    ])
    .resize_keyboard();

    Rendered {
        text: lines.join("\n"),
        keyboard,
    }
}

fn json_block(value: &Value) -> String {
    format!(
        "```json\n{}\n```",
        escape_code(&clip(&pretty_json(value), MAX_BLOCK_CHARS))
    )
}

pub fn dashboard_screen(panel: &DashboardPanel) -> Rendered {
    let role = panel.session().role();
    let mut lines = vec![format!(
        "*{}*",
        escape_markdown(&format!("Welcome ({role})"))
    )];
    if !panel.hello().is_empty() {
        lines.push(format!(
            "```\n{}\n```",
            escape_code(&clip(panel.hello(), MAX_BLOCK_CHARS))
        ));
    }

    lines.push(String::new());
    lines.push(format!("*{}*", escape_markdown("Scan Medicine (demo)")));
    lines.push(format!("Barcode: `{}`", escape_code(&panel.scan_code)));
    lines.push(json_block(panel.scan_result()));

    lines.push(String::new());
    lines.push("*My Medicines*".to_string());
    lines.push(json_block(panel.medicines()));

    lines.push(String::new());
    lines.push("*Orders*".to_string());
    if let Some(id) = panel.order_id() {
        lines.push(format!(
            "Latest order id: `{}`",
            escape_code(&display_value(id))
        ));
    }

    lines.push(String::new());
    lines.push("*Notifications*".to_string());
    lines.push(json_block(panel.notifications()));

    lines.push(String::new());
    lines.push(escape_markdown(
        "Send a document or photo to upload a prescription. Use /scan <barcode> to scan another code.",
    ));

    let keyboard = KeyboardMarkup::new(vec![
        vec![
            KeyboardButton::new(SCAN_BUTTON),
            KeyboardButton::new(ORDER_BUTTON),
        ],
        vec![
            KeyboardButton::new(ADD_SAMPLE_BUTTON),
            KeyboardButton::new(REFRESH_BUTTON),
        ],
        vec![
            KeyboardButton::new(NOTIFICATIONS_BUTTON),
            KeyboardButton::new(LOGOUT_BUTTON),
        ],
    ])
    .resize_keyboard();

    Rendered {
        text: lines.join("\n"),
        keyboard,
    }
}

/// Maps reply-keyboard button text to the command it stands for.
pub fn command_for_button(text: &str) -> Option<Command> {
    let command = match text {
        SIGN_UP_BUTTON => Command::Signup,
        LOG_IN_BUTTON => Command::Login,
        "✅ Create account" | "✅ Log in" => Command::Submit,
        SCAN_BUTTON => Command::Scan(String::new()),
        ADD_SAMPLE_BUTTON => Command::AddSample,
        REFRESH_BUTTON => Command::Medicines,
        ORDER_BUTTON => Command::Order,
        NOTIFICATIONS_BUTTON => Command::Notifications,
        LOGOUT_BUTTON => Command::Logout,
        _ => return None,
    };
    Some(command)
}
