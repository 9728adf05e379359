//! YAML loading with `${VAR}` / `${VAR:default}` environment substitution.

use dotenvy::dotenv;
use regex::Regex;
use serde::de::DeserializeOwned;
use std::env;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
    #[error("Invalid variable format: {0}")]
    InvalidVariable(String),
}

fn var_regex() -> &'static Regex {
    static VAR_REGEX: OnceLock<Regex> = OnceLock::new();
    VAR_REGEX.get_or_init(|| {
        Regex::new(r"\$\{([^}:]*)(?::([^}]*))?\}").expect("Invalid regex pattern")
    })
}

fn replace_vars(content: &str) -> Result<String, ConfigError> {
    // A missing .env file is fine.
    let _ = dotenv();

    let re = var_regex();
    if let Some(bad) = re
        .captures_iter(content)
        .map(|caps| caps[1].to_string())
        .find(|name| !is_var_name(name))
    {
        return Err(ConfigError::InvalidVariable(bad));
    }

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let default = caps.get(2).map(|m| m.as_str());
        env::var(&caps[1]).unwrap_or_else(|_| default.unwrap_or("").to_string())
    });

    Ok(result.into_owned())
}

fn is_var_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

pub fn load_from_file<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str<T: DeserializeOwned>(content: &str) -> Result<T, ConfigError> {
    let replaced = replace_vars(content)?;
    let data = serde_yaml::from_str(&replaced)?;
    Ok(data)
}
