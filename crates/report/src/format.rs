//! Cell formatting shared by the terminal and CSV renderings.

/// `"202125"` -> `"WW25"`.
pub fn week_header(label: &str) -> String {
    let chars: Vec<char> = label.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(2)..].iter().collect();
    format!("WW{tail}")
}

/// Unmeasured fallout is left blank.
pub fn fallout(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_default()
}

pub fn weighted(value: f64) -> String {
    format!("{value:.4}")
}
