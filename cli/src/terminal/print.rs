//! Terminal layout for everything lanscope prints outside of log records.
//!
//! All output goes through [`print`], which emits a tracing event with
//! [`PRINT_TARGET`] so the formatter writes it verbatim above any live
//! progress bar.

use std::fmt::Display;

use colored::*;
use unicode_width::UnicodeWidthStr;

use crate::terminal::{colors, format::Detail};

pub const WIDTH: usize = 64;

/// Events with this target are printed verbatim, without a status symbol.
pub const PRINT_TARGET: &str = "lanscope::print";

/// Keys of [`field`] lines are padded to at least this many columns.
const FIELD_KEY_MIN: usize = 10;

#[macro_export]
macro_rules! mprint {
    () => {
        $crate::terminal::print::print("");
    };
    ($msg:expr) => {
        $crate::terminal::print::print($msg);
    };
}

pub fn print(msg: &str) {
    tracing::info!(target: PRINT_TARGET, "{msg}");
}

fn fill(ch: &str, used: usize) -> ColoredString {
    ch.repeat(WIDTH.saturating_sub(used)).color(colors::SEPARATOR)
}

pub fn banner(q_level: u8) {
    if q_level > 0 {
        return;
    }

    let title = format!(" lanscope {} ", env!("CARGO_PKG_VERSION"));
    let tagline = " arp sweep · live capture · topology ";
    print(&format!(
        "{}{}{}",
        "━━".color(colors::SEPARATOR),
        title.as_str().color(colors::PRIMARY).bold(),
        fill("━", 2 + title.width())
    ));
    print(&tagline.color(colors::SEPARATOR).italic().to_string());
}

/// Section title: `▌ TITLE ┄┄┄┄`.
pub fn header(title: &str, q_level: u8) {
    if q_level > 0 {
        return;
    }

    let label = format!("▌ {} ", title.to_uppercase());
    print(&format!(
        "{}{}",
        label.as_str().color(colors::ACCENT).bold(),
        fill("┄", label.width())
    ));
}

/// Thin rule closing a command's output.
pub fn rule() {
    print(&fill("━", 0).to_string());
}

/// `key ····· value` line.
pub fn field(key: &str, value: impl Display) {
    let pad = FIELD_KEY_MIN.max(key.width()) + 1 - key.width();
    status(format!(
        "{} {} {}",
        key.color(colors::PRIMARY),
        "·".repeat(pad).color(colors::SEPARATOR),
        value
    ));
}

pub fn status(msg: impl AsRef<str>) {
    print(&format!("{} {}", "›".color(colors::SEPARATOR), msg.as_ref()));
}

/// Numbered entry heading a [`tree`].
pub fn item(idx: usize, name: &str) {
    print(&format!(
        "{} {}",
        format!("{idx:>2} ▸").color(colors::ACCENT),
        name.color(colors::PRIMARY)
    ));
}

/// Details of the last [`item`], keys aligned on the widest one.
pub fn tree(details: &[Detail]) {
    let key_width = details.iter().map(|(key, _)| key.width()).max().unwrap_or(0);
    for (i, (key, value)) in details.iter().enumerate() {
        let branch = if i + 1 == details.len() { "└╴" } else { "├╴" };
        print(&format!(
            "    {} {}{} {}",
            branch.color(colors::SEPARATOR),
            key.color(colors::TEXT_DEFAULT),
            " ".repeat(key_width - key.width()),
            value
        ));
    }
}

/// A rule followed by `msg` centered under it.
pub fn closing(msg: &str) {
    rule();
    let pad = WIDTH.saturating_sub(console::measure_text_width(msg)) / 2;
    print(&format!("{}{msg}", " ".repeat(pad)));
}

/// Prints a multi-line block, one event per line.
pub fn block(text: &str) {
    for line in text.lines() {
        print(line);
    }
}

/// Replaces a section that has nothing to show.
pub fn nothing(what: &str, q_level: u8) {
    if q_level > 1 {
        return;
    }
    print(&format!("∅ {what}").red().bold().to_string());
}
