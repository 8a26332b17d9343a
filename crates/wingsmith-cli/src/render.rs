use std::cmp::Ordering;
use std::io::IsTerminal;

use anstyle::{AnsiColor, Effects, Style};
use wingsmith_core::Installer;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum OutputStyle {
    Plain,
    Rich,
}

/// Status output goes to stderr so stdout stays machine-readable.
#[derive(Copy, Clone, Debug)]
pub(crate) struct TerminalRenderer {
    style: OutputStyle,
}

impl TerminalRenderer {
    pub(crate) fn from_style(style: OutputStyle) -> Self {
        Self { style }
    }

    pub(crate) fn print_status(self, status: &str, message: &str) {
        eprintln!("{}", paint_status_line(self.style, status, message));
    }

    pub(crate) fn print_section(self, title: &str) {
        if let Some(line) = render_section_header(self.style, title) {
            eprintln!("{}", colorize(section_style(), &line));
        }
    }
}

pub(crate) fn current_output_style(force_plain: bool) -> OutputStyle {
    output_style_for(
        force_plain,
        std::env::var_os("NO_COLOR").is_some(),
        std::io::stderr().is_terminal(),
    )
}

pub(crate) fn output_style_for(force_plain: bool, no_color: bool, is_terminal: bool) -> OutputStyle {
    if force_plain || no_color || !is_terminal {
        OutputStyle::Plain
    } else {
        OutputStyle::Rich
    }
}

pub(crate) fn render_status_line(style: OutputStyle, status: &str, message: &str) -> String {
    match style {
        OutputStyle::Plain => message.to_string(),
        OutputStyle::Rich => format!("{} {message}", status_badge(status)),
    }
}

fn paint_status_line(style: OutputStyle, status: &str, message: &str) -> String {
    match style {
        OutputStyle::Plain => render_status_line(style, status, message),
        OutputStyle::Rich => format!(
            "{} {message}",
            colorize(status_style(status), status_badge(status))
        ),
    }
}

fn render_section_header(style: OutputStyle, title: &str) -> Option<String> {
    match style {
        OutputStyle::Plain => None,
        OutputStyle::Rich => Some(format!("== {title} ==")),
    }
}

pub(crate) fn render_installer_summary(installer: &Installer) -> String {
    let installer_type = installer
        .installer_type
        .map(|value| value.as_str())
        .unwrap_or("unknown");
    let mut line = format!(
        "{} {installer_type} {}",
        installer.architecture.as_str(),
        installer.installer_url
    );
    if let Some(scope) = installer.scope {
        line.push_str(&format!(" (scope={})", scope.as_str()));
    }
    line
}

pub(crate) fn render_ordering(ordering: Ordering) -> &'static str {
    match ordering {
        Ordering::Less => "<",
        Ordering::Equal => "=",
        Ordering::Greater => ">",
    }
}

fn status_badge(status: &str) -> &'static str {
    match status {
        "ok" => "[OK]",
        "warn" => "[WARN]",
        "error" => "[ERR]",
        _ => "[..]",
    }
}

fn status_style(status: &str) -> Style {
    let color = match status {
        "ok" => AnsiColor::BrightGreen,
        "warn" => AnsiColor::BrightYellow,
        "error" => AnsiColor::BrightRed,
        _ => AnsiColor::BrightCyan,
    };
    Style::new()
        .fg_color(Some(color.into()))
        .effects(Effects::BOLD)
}

fn section_style() -> Style {
    Style::new()
        .fg_color(Some(AnsiColor::BrightBlue.into()))
        .effects(Effects::BOLD)
}

fn colorize(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}
