use crate::output::is_quiet;
use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;

pub fn header(icon: &str, text: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", icon, text.style(theme().header.clone()));
}

pub fn success(label: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn.clone()));
}

pub fn info(label: &str, value: &str) {
    if is_quiet() {
        return;
    }
    println!(
        "{} {}: {}",
        Icons::INFO.style(theme().info.clone()),
        label.style(theme().dim.clone()),
        value
    );
}

pub fn section(title: &str) {
    if let Some(text) = render_section(title, is_quiet()) {
        println!();
        println!("{}", text);
    }
}

fn render_section(title: &str, quiet: bool) -> Option<String> {
    if quiet {
        return None;
    }
    Some(format!("━{}━", title.style(theme().header.clone())))
}
