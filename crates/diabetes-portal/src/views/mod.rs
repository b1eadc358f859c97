//! HTML views. Every function here is pure: state and form values in,
//! markup or a validated value out. Handlers own the transitions.
//!
//! Pages are minijinja templates compiled into the binary; `.html` names get
//! HTML auto-escaping, so values are passed raw.

pub mod input;
pub mod login;
pub mod output;
pub mod signup;

use lazy_static::lazy_static;
use minijinja::{context, Environment, Value};
use serde::Serialize;
use tracing::warn;

use crate::controller::{ClinicalView, GuestPage, Notice, NoticeLevel, Page, SessionState};

const TEMPLATE_SOURCES: [(&str, &str); 6] = [
    ("layout.html", include_str!("templates/layout.html")),
    ("login.html", include_str!("templates/login.html")),
    ("signup.html", include_str!("templates/signup.html")),
    ("input.html", include_str!("templates/input.html")),
    ("output.html", include_str!("templates/output.html")),
    ("error.html", include_str!("templates/error.html")),
];

lazy_static! {
    static ref TEMPLATES: Environment<'static> = {
        let mut env = Environment::new();
        for (name, source) in TEMPLATE_SOURCES {
            if let Err(e) = env.add_template(name, source) {
                warn!("Template {} failed to compile: {}", name, e);
            }
        }
        env
    };
}

pub(crate) fn render(name: &str, ctx: Value) -> Result<String, minijinja::Error> {
    TEMPLATES.get_template(name)?.render(ctx)
}

#[derive(Serialize)]
struct NoticeView<'a> {
    class: &'static str,
    text: &'a str,
}

pub(crate) fn notice_class(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Success => "notice success",
        NoticeLevel::Warning => "notice warning",
        NoticeLevel::Error => "notice error",
    }
}

/// Shared layout variables: title, guest menu selection and notices.
pub(crate) fn frame(title: &str, menu: Option<GuestPage>, notices: &[Notice]) -> Value {
    let notices: Vec<NoticeView<'_>> = notices
        .iter()
        .map(|n| NoticeView {
            class: notice_class(n.level),
            text: &n.text,
        })
        .collect();
    let menu = menu.map(|page| match page {
        GuestPage::Login => "login",
        GuestPage::Signup => "signup",
    });
    context! { title => title, menu => menu, notices => notices }
}

pub fn error_notices(messages: &[String]) -> Vec<Notice> {
    messages
        .iter()
        .map(|text| Notice {
            level: NoticeLevel::Error,
            text: text.clone(),
        })
        .collect()
}

/// Message page for actions that do not apply, with a link home.
pub fn error_page(message: &str) -> Result<String, minijinja::Error> {
    let notices = error_notices(&[message.to_string()]);
    render(
        "error.html",
        frame("Diabetes Prediction App", None, &notices),
    )
}

/// Render whatever page the session is on.
pub fn render_current(state: &SessionState, notices: &[Notice]) -> Result<String, minijinja::Error> {
    match state.page() {
        Page::Guest(GuestPage::Login) => login::page(notices, ""),
        Page::Guest(GuestPage::Signup) => signup::page(notices, None),
        Page::Clinical(session) => match &session.view {
            ClinicalView::Input { last } => {
                input::page(notices, &input::prefill(last.as_ref()))
            }
            ClinicalView::Output { input, prediction } => {
                output::page(notices, &output::OutputReport::new(input, prediction))
            }
        },
    }
}
