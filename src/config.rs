use std::{
    net::{Ipv4Addr, SocketAddr},
    path::PathBuf,
    str::FromStr,
};

use crate::{
    constants::{
        DEFAULT_GRADE_CONCURRENCY, DEFAULT_INTERPRETER, DEFAULT_MAX_TIMEOUT_SECS,
        DEFAULT_OUTPUT_LIMIT_BYTES, DEFAULT_PORT, SOURCE_DIR_NAME,
    },
    core::{domain::TimeLimit, engine::EngineLimits},
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Process-wide settings, read once from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub interpreter: PathBuf,
    pub isolated: bool,
    pub source_dir: PathBuf,
    pub max_timeout: TimeLimit,
    pub output_limit_bytes: usize,
    pub grade_concurrency: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_timeout_secs: f64 =
            parse_var(&lookup, "CODEHELPER_MAX_TIMEOUT", DEFAULT_MAX_TIMEOUT_SECS)?;
        let max_timeout =
            TimeLimit::from_secs(max_timeout_secs).ok_or_else(|| ConfigError::InvalidValue {
                var: "CODEHELPER_MAX_TIMEOUT",
                value: max_timeout_secs.to_string(),
                reason: "must be a positive number of seconds within range".to_string(),
            })?;

        let grade_concurrency = parse_var(
            &lookup,
            "CODEHELPER_GRADE_CONCURRENCY",
            DEFAULT_GRADE_CONCURRENCY,
        )?;
        if grade_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                var: "CODEHELPER_GRADE_CONCURRENCY",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            addr: parse_var(
                &lookup,
                "CODEHELPER_ADDR",
                SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            )?,
            interpreter: lookup("CODEHELPER_INTERPRETER")
                .unwrap_or_else(|| DEFAULT_INTERPRETER.to_string())
                .into(),
            isolated: parse_var(&lookup, "CODEHELPER_ISOLATED", true)?,
            source_dir: lookup("CODEHELPER_SOURCE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(SOURCE_DIR_NAME)),
            max_timeout,
            output_limit_bytes: parse_var(
                &lookup,
                "CODEHELPER_OUTPUT_LIMIT_BYTES",
                DEFAULT_OUTPUT_LIMIT_BYTES,
            )?,
            grade_concurrency,
        })
    }

    pub fn engine_limits(&self) -> EngineLimits {
        EngineLimits {
            max_timeout: self.max_timeout,
            grade_concurrency: self.grade_concurrency,
        }
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(value) = lookup(var) else {
        return Ok(default);
    };

    let parsed = value.trim().parse::<T>();
    match parsed {
        Ok(parsed) => Ok(parsed),
        Err(e) => Err(ConfigError::InvalidValue {
            var,
            reason: e.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.addr, "127.0.0.1:8000".parse().unwrap());
        assert_eq!(config.interpreter, PathBuf::from("python3"));
        assert!(config.isolated);
        assert!(config.source_dir.ends_with("codehelper"));
        assert_eq!(config.max_timeout.as_secs(), 30.0);
        assert_eq!(config.output_limit_bytes, 8 * 1024 * 1024);
        assert_eq!(config.grade_concurrency, 1);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("CODEHELPER_ADDR", "0.0.0.0:9000"),
            ("CODEHELPER_INTERPRETER", "/usr/bin/python3.12"),
            ("CODEHELPER_ISOLATED", "false"),
            ("CODEHELPER_SOURCE_DIR", "/var/tmp/judge"),
            ("CODEHELPER_MAX_TIMEOUT", "12.5"),
            ("CODEHELPER_OUTPUT_LIMIT_BYTES", "4096"),
            ("CODEHELPER_GRADE_CONCURRENCY", "4"),
        ])
        .unwrap();

        assert_eq!(config.addr, "0.0.0.0:9000".parse().unwrap());
        assert_eq!(config.interpreter, PathBuf::from("/usr/bin/python3.12"));
        assert!(!config.isolated);
        assert_eq!(config.source_dir, PathBuf::from("/var/tmp/judge"));
        assert_eq!(config.engine_limits().max_timeout.as_secs(), 12.5);
        assert_eq!(config.output_limit_bytes, 4096);
        assert_eq!(config.engine_limits().grade_concurrency, 4);
    }

    #[test]
    fn test_invalid_values() {
        let cases = [
            ("CODEHELPER_ADDR", "not-an-addr"),
            ("CODEHELPER_ISOLATED", "maybe"),
            ("CODEHELPER_MAX_TIMEOUT", "-1"),
            ("CODEHELPER_MAX_TIMEOUT", "abc"),
            ("CODEHELPER_MAX_TIMEOUT", "1e20"),
            ("CODEHELPER_MAX_TIMEOUT", "inf"),
            ("CODEHELPER_OUTPUT_LIMIT_BYTES", "-5"),
            ("CODEHELPER_GRADE_CONCURRENCY", "0"),
        ];

        for (var, value) in cases {
            let result = config_from(&[(var, value)]);
            assert!(
                matches!(&result, Err(ConfigError::InvalidValue { var: v, .. }) if *v == var),
                "{var}={value} should be rejected, got {result:?}"
            );
        }
    }
}
