//! Terminal output for the graft CLI.

use std::path::Path;
use std::time::Duration;

use console::style;
use graft::project::FileStatus;
use indicatif::{ProgressBar, ProgressStyle};

pub mod colors {
    use console::Color;

    pub const CYAN: Color = Color::Color256(51);
    pub const MAGENTA: Color = Color::Color256(201);
    pub const VIOLET: Color = Color::Color256(135);
    pub const NEON_GREEN: Color = Color::Color256(82);
    pub const AMBER: Color = Color::Color256(214);
    pub const DIM: Color = Color::Color256(240);
}

pub mod symbols {
    pub const DIAMOND: &str = "\u{25C6}"; // ◆
    pub const DIAMOND_OUTLINE: &str = "\u{25C7}"; // ◇
    pub const TARGET_FILLED: &str = "\u{25C9}"; // ◉
    pub const TARGET_EMPTY: &str = "\u{25CE}"; // ◎
    pub const TRIANGLE: &str = "\u{25B8}"; // ▸
    pub const DOT: &str = "\u{00B7}"; // ·
}

/// Print the compact header shown before every command.
pub fn header(command: &str) {
    println!(
        "  {} {} {}",
        style(symbols::DIAMOND).fg(colors::CYAN),
        style("graft").fg(colors::CYAN).bold(),
        style(command).dim()
    );
    println!();
}

pub fn success(msg: &str) {
    println!("  {} {}", style(symbols::TARGET_FILLED).fg(colors::NEON_GREEN), msg);
}

pub fn error(msg: &str) {
    println!(
        "  {} {}",
        style(symbols::DIAMOND).fg(colors::MAGENTA),
        style(msg).fg(colors::MAGENTA)
    );
}

pub fn info(msg: &str) {
    println!("  {} {}", style(symbols::DIAMOND_OUTLINE).fg(colors::CYAN), msg);
}

pub fn dim(msg: &str) {
    println!("  {}", style(msg).fg(colors::DIM));
}

pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::default_spinner()
        .tick_chars("\u{25CE}\u{25C9}\u{25CE}\u{25C9}")
        .template("  {spinner:.cyan} {msg}")
    {
        pb.set_style(template);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(150));
    pb
}

/// One line per saved file: a status glyph, the status word and the path.
pub fn file_status(status: FileStatus, path: &Path) {
    let (glyph, color) = status_style(status);
    let word = format!("{:<9}", status.as_str());
    println!(
        "  {} {} {}",
        style(glyph).fg(color),
        style(word).fg(color),
        path.display()
    );
}

fn status_style(status: FileStatus) -> (&'static str, console::Color) {
    match status {
        FileStatus::Created => (symbols::TARGET_FILLED, colors::NEON_GREEN),
        FileStatus::Modified => (symbols::TARGET_FILLED, colors::AMBER),
        FileStatus::Unchanged => (symbols::TARGET_EMPTY, colors::DIM),
        FileStatus::Failed => (symbols::DIAMOND, colors::MAGENTA),
    }
}

/// Summary counts, e.g. `2 created · 1 modified · 4 unchanged`.
pub fn summary(created: usize, modified: usize, unchanged: usize, failed: usize) -> String {
    let mut parts = vec![
        format!("{} created", created),
        format!("{} modified", modified),
        format!("{} unchanged", unchanged),
    ];
    if failed > 0 {
        parts.push(format!("{} failed", failed));
    }
    parts.join(&format!(" {} ", symbols::DOT))
}

pub fn box_header(title: &str) {
    let width: usize = 55;
    let title_padded = format!(" {} ", title);
    let dashes = width.saturating_sub(title_padded.chars().count() + 4);

    println!(
        "  {}{}{}{}",
        style("\u{256D}\u{2500}").fg(colors::VIOLET),
        style(title_padded).fg(colors::VIOLET).bold(),
        style("\u{2500}".repeat(dashes)).fg(colors::VIOLET),
        style("\u{256E}").fg(colors::VIOLET)
    );
}

pub fn box_line(content: &str) {
    let width: usize = 53;
    let padding = width.saturating_sub(content.chars().count());
    println!(
        "  {} {}{}{}",
        style("\u{2502}").fg(colors::VIOLET),
        content,
        " ".repeat(padding),
        style("\u{2502}").fg(colors::VIOLET)
    );
}

pub fn box_footer() {
    let width = 55;
    println!(
        "  {}{}{}",
        style("\u{2570}").fg(colors::VIOLET),
        style("\u{2500}".repeat(width - 2)).fg(colors::VIOLET),
        style("\u{256F}").fg(colors::VIOLET)
    );
}

/// Print a declaration line under a file in `inspect` output.
pub fn declaration(kind: &str, name: &str, artifact: &str, stub: bool) {
    let stub_tag = if stub { " stub" } else { "" };
    println!(
        "     {} {:<10} {}  {}{}",
        style(symbols::TRIANGLE).fg(colors::CYAN),
        style(kind).dim(),
        style(name).fg(colors::CYAN),
        style(artifact).fg(colors::DIM),
        style(stub_tag).fg(colors::AMBER)
    );
}

pub fn timing(duration: Duration) -> String {
    let ms = duration.as_millis();
    if ms < 1000 {
        format!("{}ms", ms)
    } else {
        format!("{:.1}s", duration.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_format() {
        assert_eq!(timing(Duration::from_millis(42)), "42ms");
        assert_eq!(timing(Duration::from_millis(1500)), "1.5s");
    }

    #[test]
    fn test_summary_omits_zero_failures() {
        assert_eq!(summary(2, 1, 4, 0), "2 created · 1 modified · 4 unchanged");
        assert_eq!(summary(0, 0, 0, 1), "0 created · 0 modified · 0 unchanged · 1 failed");
    }

    #[test]
    fn test_status_style_distinguishes_failures() {
        assert_eq!(status_style(FileStatus::Failed).0, symbols::DIAMOND);
        assert_eq!(status_style(FileStatus::Unchanged).0, symbols::TARGET_EMPTY);
    }
}
