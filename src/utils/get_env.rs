use anyhow::{Error, anyhow};
use dotenv::dotenv;
use std::env;
use std::str::FromStr;

pub fn get_env_var(key: &str) -> Result<String, Error> {
    dotenv().ok();
    env::var(key).map_err(|e| anyhow!("{}: {}", key, e))
}

pub fn get_env_var_or(key: &str, default: &str) -> String {
    match get_env_var(key) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => default.to_string(),
    }
}

pub fn get_env_parsed<T>(key: &str, default: T) -> Result<T, Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get_env_var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("invalid value for {}: {}", key, e)),
        _ => Ok(default),
    }
}

pub fn get_env_flag(key: &str, default: bool) -> Result<bool, Error> {
    match get_env_var(key) {
        Ok(raw) if !raw.trim().is_empty() => {
            parse_flag(&raw).ok_or_else(|| anyhow!("invalid boolean for {}: {}", key, raw))
        }
        _ => Ok(default),
    }
}

pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
