pub mod gallery;
pub mod plots;

use axum::http::header;
use axum::response::IntoResponse;
use maud::{DOCTYPE, Markup, html};

use crate::styles::{self, Layout, Plots};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Plots,
    Gallery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn warning(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// A single-choice dropdown bound to a query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectField {
    pub name: &'static str,
    pub label: &'static str,
    pub options: Vec<String>,
    pub selected: String,
}

/// Picks the requested option when it is available, otherwise the first one.
pub fn pick<'a>(requested: Option<&str>, options: &'a [String]) -> Option<&'a String> {
    requested
        .and_then(|wanted| options.iter().find(|option| *option == wanted))
        .or_else(|| options.first())
}

/// Percent-encodes a `/`-separated relative path for use in a URL.
pub fn encode_path(path: &str) -> String {
    let mut encoded = String::with_capacity(path.len());
    for byte in path.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}

pub fn plot_url(relative: &str) -> String {
    format!("/plots/{}", encode_path(relative))
}

pub fn download_url(relative: &str) -> String {
    format!("/download/{}", encode_path(relative))
}

pub async fn styles() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        styles::ALL.as_str(),
    )
}

pub fn page_shell(title: &str, active: Page, sidebar: Markup, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                link rel="stylesheet" href="/styles.css";
            }
            body {
                div.(Layout::SHELL) {
                    aside.(Layout::SIDEBAR) { (sidebar) }
                    main.(Layout::MAIN) {
                        nav.(Layout::NAV) {
                            (nav_link("/", "Plots", active == Page::Plots))
                            (nav_link("/gallery", "Sampling Gallery", active == Page::Gallery))
                        }
                        (content)
                    }
                }
            }
        }
    }
}

fn nav_link(href: &str, label: &str, active: bool) -> Markup {
    html! {
        a.(if active { Layout::NAV_ACTIVE } else { "" }) href=(href) { (label) }
    }
}

pub fn notice(notice: &Notice) -> Markup {
    let level_class = match notice.level {
        NoticeLevel::Warning => Plots::NOTICE_WARNING,
        NoticeLevel::Error => Plots::NOTICE_ERROR,
    };
    html! {
        div.(Plots::NOTICE).(level_class) role="alert" { (notice.message) }
    }
}

/// Renders a dropdown. `form` ties selects outside the `<form>` element to it.
pub fn select_field(field: &SelectField, form: &str, auto_submit: bool) -> Markup {
    html! {
        label.(Layout::FIELD) {
            span { (field.label) }
            select name=(field.name) form=(form) onchange=[auto_submit.then_some("this.form.submit()")] {
                @for option in &field.options {
                    option value=(option) selected[*option == field.selected] { (option) }
                }
            }
        }
    }
}

pub fn metric(label: &str, value: usize) -> Markup {
    html! {
        div.(Layout::METRIC) {
            div.(Layout::METRIC_LABEL) { (label) }
            div.(Layout::METRIC_VALUE) { (value) }
        }
    }
}
