use std::{fmt::Write, path::Path, str::FromStr};

use anyhow::bail;
use indoc::indoc;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_dynamic_string::DynamicString;
use toml::Value;

use crate::{Config, Environment, ModelProfile};

/// Fields that may reference an unset environment variable. The field is
/// dropped and its default applies instead of failing the whole load.
const OPTIONAL_ENV_FIELDS: &[&str] = &["completion.base_url", "completion.api_key", "server.auth.issuer"];

pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read configuration file {}: {e}", path.display()))?;

    let config = parse(&content)?;

    log::debug!("Loaded configuration from {}", path.display());

    Ok(config)
}

pub(crate) fn parse(content: &str) -> anyhow::Result<Config> {
    let mut raw_config: Value = toml::from_str(content)?;

    // Each failed expansion of an optional field removes it and retries, so
    // several optional fields may be missing at once.
    for _ in 0..=OPTIONAL_ENV_FIELDS.len() {
        let Err(err) = expand_dynamic_strings(&mut Vec::new(), &mut raw_config) else {
            break;
        };

        match err {
            ExpandError { path, message } if OPTIONAL_ENV_FIELDS.contains(&path.as_str()) => {
                log::debug!("Ignoring optional field '{path}': {message}");
                remove_field(&mut raw_config, &path);
            }
            ExpandError { path, message } => {
                bail!("Failed to expand dynamic string at path '{path}': {message}");
            }
        }
    }

    let config = Config::deserialize(raw_config)?;

    for warning in warnings(&config) {
        log::warn!("{warning}");
    }

    Ok(config)
}

pub(crate) fn validate(config: &Config) -> anyhow::Result<()> {
    let has_api_key = config
        .completion
        .api_key
        .as_ref()
        .is_some_and(|key| !key.expose_secret().trim().is_empty());

    if !has_api_key {
        bail!(indoc! {r#"
            No completion provider API key configured. Prompt Canvas needs an API key to answer questions.

            Set the GROQ_API_KEY environment variable, or configure it in the file:

              [completion]
              api_key = "{{ env.GROQ_API_KEY }}"
        "#});
    }

    for (name, profile) in [
        ("primary", &config.completion.primary),
        ("secondary", &config.completion.secondary),
        ("context", &config.completion.context),
    ] {
        validate_profile(name, profile)?;
    }

    if let Some(auth) = &config.server.auth
        && auth.secret.expose_secret().is_empty()
    {
        bail!("The [server.auth] secret must not be empty");
    }

    Ok(())
}

fn validate_profile(name: &str, profile: &ModelProfile) -> anyhow::Result<()> {
    if profile.model.trim().is_empty() {
        bail!("The model of [completion.{name}] must not be empty");
    }

    if let Some(temperature) = profile.temperature
        && !(0.0..=2.0).contains(&temperature)
    {
        bail!("The temperature of [completion.{name}] must be between 0 and 2, got {temperature}");
    }

    if let Some(top_p) = profile.top_p
        && !(0.0..=1.0).contains(&top_p)
    {
        bail!("The top_p of [completion.{name}] must be between 0 and 1, got {top_p}");
    }

    if profile.max_tokens == Some(0) {
        bail!("The max_tokens of [completion.{name}] must be greater than zero");
    }

    Ok(())
}

fn warnings(config: &Config) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.server.environment == Environment::Production && config.server.cors.is_none() {
        warnings.push(
            "Running in production without [server.cors]: browsers will not be allowed to call the API cross-origin"
                .to_string(),
        );
    }

    if config.completion.primary == config.completion.secondary {
        warnings.push("The primary and secondary completion models are identical, the fallback retries the same model".to_string());
    }

    warnings
}

struct ExpandError {
    path: String,
    message: String,
}

fn expand_dynamic_strings<'a>(
    path: &mut Vec<Result<&'a str, usize>>,
    value: &'a mut Value,
) -> Result<(), ExpandError> {
    match value {
        Value::String(s) => match DynamicString::<String>::from_str(s) {
            Ok(out) => *s = out.into_inner(),
            Err(err) => {
                let mut p = String::new();

                for segment in path.iter() {
                    match segment {
                        Ok(s) => {
                            p.push_str(s);
                            p.push('.');
                        }
                        Err(i) => {
                            let _ = write!(p, "[{i}]");
                        }
                    }
                }

                if p.ends_with('.') {
                    p.pop();
                }

                return Err(ExpandError {
                    path: p,
                    message: err.to_string(),
                });
            }
        },
        Value::Array(values) => {
            for (i, value) in values.iter_mut().enumerate() {
                path.push(Err(i));
                expand_dynamic_strings(path, value)?;
                path.pop();
            }
        }
        Value::Table(map) => {
            for (key, value) in map {
                path.push(Ok(key.as_str()));
                expand_dynamic_strings(path, value)?;
                path.pop();
            }
        }
        Value::Integer(_) | Value::Float(_) | Value::Boolean(_) | Value::Datetime(_) => (),
    }

    Ok(())
}

fn remove_field(config: &mut Value, path: &str) {
    let Some((parent, key)) = path.rsplit_once('.') else {
        if let Some(table) = config.as_table_mut() {
            table.remove(path);
        }

        return;
    };

    let mut current = config;

    for part in parent.split('.') {
        let Some(next) = current.as_table_mut().and_then(|table| table.get_mut(part)) else {
            return;
        };

        current = next;
    }

    if let Some(table) = current.as_table_mut() {
        table.remove(key);
    }
}
