use anyhow::Result;
use gemx_runtime::ConfigStore;
use serde_json::Value;
use std::process::ExitCode;

pub fn get(key: &str, store: &ConfigStore) -> Result<ExitCode> {
    match store.get(key) {
        Some(Value::String(s)) => println!("{}", s),
        Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        None => {
            eprintln!("Key '{}' not set", key);
            return Ok(ExitCode::FAILURE);
        }
    }
    Ok(ExitCode::SUCCESS)
}

pub fn set(key: &str, raw: &str, store: &ConfigStore) -> Result<ExitCode> {
    let value = parse_value(raw);
    store.set(key, value.clone())?;
    println!("{} = {}", key, value);
    Ok(ExitCode::SUCCESS)
}

pub fn show(store: &ConfigStore) -> Result<ExitCode> {
    println!("{}", serde_json::to_string_pretty(&store.read())?);
    Ok(ExitCode::SUCCESS)
}

pub fn path(store: &ConfigStore) -> ExitCode {
    println!("{}", store.path().display());
    ExitCode::SUCCESS
}

/// `true`, `0.5`, `{"a":1}` are JSON; anything else is a plain string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_json_or_falls_back_to_string() {
        assert_eq!(parse_value("true"), json!(true));
        assert_eq!(parse_value("0.5"), json!(0.5));
        assert_eq!(parse_value(r#"{"a": 1}"#), json!({"a": 1}));
        assert_eq!(parse_value("gemini-2.5-flash"), json!("gemini-2.5-flash"));
        assert_eq!(parse_value(""), json!(""));
    }
}
