/// Sales figure with at most two decimals and no trailing zeros, for reports
/// and status text. Page attributes carry the unrounded value.
pub fn format_value(v: f64) -> String {
    let s = format!("{:.2}", v);
    let s: &str = if s.contains('.') { s.trim_end_matches('0').trim_end_matches('.') } else { &s };
    if s == "-0" { "0".to_string() } else { s.to_string() }
}
