// src/utils/log.rs

//! Run narration helpers over the `log` facade.
//!
//! Keeps step headers and summaries consistent between the CLI and the
//! pipeline, whatever logger backend is installed.

/// Log an info message
pub fn info(message: &str) {
    ::log::info!("{}", message);
}

/// Log a warning message
pub fn warn(message: &str) {
    ::log::warn!("{}", message);
}

/// Log an error message
pub fn error(message: &str) {
    ::log::error!("{}", message);
}

/// Log a success message (always shown as INFO)
pub fn success(message: &str) {
    ::log::info!("✓ {}", message);
}

/// Log a step in a process
pub fn step(step_num: usize, total: usize, message: &str) {
    ::log::info!("{}", step_line(step_num, total, message));
}

/// Log a header
pub fn header(title: &str) {
    let border = "═".repeat(60);
    ::log::info!("{}", border);
    ::log::info!("  {}", title);
    ::log::info!("{}", border);
}

/// Log a sub-item (indented)
pub fn sub_item(message: &str) {
    ::log::info!("    {}", message);
}

/// Log a summary section
pub fn summary(title: &str, items: &[(&str, String)]) {
    ::log::info!("[SUMMARY] {}", title);
    for line in summary_lines(items) {
        ::log::info!("{}", line);
    }
}

fn step_line(step_num: usize, total: usize, message: &str) -> String {
    format!("[STEP {}/{}] {}", step_num, total, message)
}

fn summary_lines(items: &[(&str, String)]) -> Vec<String> {
    items
        .iter()
        .map(|(key, value)| format!("    {}: {}", key, value))
        .collect()
}
