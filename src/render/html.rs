//! Small HTML building helpers shared by the renderers.

/// Escape text for use in element content and quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Inline error block rendered inside a slide whose content failed.
pub fn error_block(message: &str) -> String {
    format!(
        r#"<div class="slide-error"><span class="slide-error-icon">&#9888;</span> {}</div>"#,
        escape(message)
    )
}

/// Round to an integer and group thousands with a space (`1250` → `1 250`).
pub fn format_number(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }
    if rounded < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Euro amount in thousands (`1350` → `1k€`).
pub fn format_thousands_eur(value: f64) -> String {
    format!("{}k€", format_number(value / 1000.0))
}
