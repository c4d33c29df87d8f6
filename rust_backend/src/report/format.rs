/// Render a floating value for a report cell.
///
/// Produces the shortest decimal text that round-trips, always with a
/// fractional part for integral values (`2.0`, not `2`). Undefined values
/// render as `NaN`.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let text = value.to_string();
    if value.fract() == 0.0 && !text.contains('.') {
        format!("{}.0", text)
    } else {
        text
    }
}
