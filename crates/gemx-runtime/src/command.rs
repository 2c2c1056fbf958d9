use crate::session::SessionState;

/// Argument vector for `<binary> generate ...`, excluding the binary itself.
///
/// `--system` is appended only when the session carries a system prompt.
pub fn build_args(state: &SessionState) -> Vec<String> {
    let mut args = vec![
        "generate".to_string(),
        "--model".to_string(),
        state.model.clone(),
        "--temperature".to_string(),
        format_temperature(state.temperature),
    ];
    if !state.system.is_empty() {
        args.push("--system".to_string());
        args.push(state.system.clone());
    }
    args
}

/// Whole numbers keep one decimal place (`0.0`, `1.0`) so the binary always
/// receives a float literal.
pub fn format_temperature(temperature: f64) -> String {
    if temperature.is_finite() && temperature.fract() == 0.0 {
        format!("{:.1}", temperature)
    } else {
        temperature.to_string()
    }
}
