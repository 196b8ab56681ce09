//! Utility functions for rendering UI components

pub fn truncate_string(s: &str, max_width: usize) -> String {
    if s.chars().count() > max_width {
        let truncated: String = s.chars().take(max_width.saturating_sub(3)).collect();
        format!("{:<width$}", format!("{}...", truncated), width = max_width)
    } else {
        format!("{:<width$}", s, width = max_width)
    }
}

/// Width of the id column for `max_id` (digits + padding)
pub fn id_column_width(max_id: i64) -> usize {
    max_id.max(1).to_string().len() + 1
}
