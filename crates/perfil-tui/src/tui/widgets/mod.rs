// TUI widget modules for each dashboard panel.

pub mod bars;
pub mod comparison;
pub mod group;
pub mod sidebar;
pub mod status_bar;
pub mod zscores;

/// Fixed-decimal display of an optional value; missing values show "N/A".
pub fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => "N/A".to_string(),
    }
}
