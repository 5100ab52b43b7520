use chrono::NaiveTime;
use framework::config_error;
use framework::exception::CoreRsResult;
use framework::validate::Validator;
use serde::Deserialize;
use tracing::warn;

const MAX_PAGE_SIZE: usize = 250;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub linear_uri: String,
    #[serde(default = "default_archive_after_days")]
    pub archive_after_days: f64,
    #[serde(default)]
    pub team_key: Option<String>,
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_schedule_time")]
    pub schedule_time: NaiveTime,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub cron_secret: Option<String>,
}

fn default_archive_after_days() -> f64 {
    30.0
}

fn default_dry_run() -> bool {
    true
}

fn default_page_size() -> usize {
    50
}

fn default_schedule_time() -> NaiveTime {
    NaiveTime::from_hms_opt(3, 0, 0).unwrap_or_default()
}

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_owned()
}

impl AppConfig {
    /// Overrides file values with `LINEAR_API_KEY`, `CRON_SECRET`, `ARCHIVE_AFTER_DAYS`,
    /// `LINEAR_TEAM_KEY`, `DRY_RUN` and `PAGE_SIZE`.
    pub fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_key) = var("LINEAR_API_KEY") {
            self.api_key = Some(api_key);
        }
        if let Some(cron_secret) = var("CRON_SECRET") {
            self.cron_secret = Some(cron_secret);
        }
        if let Some(days) = var("ARCHIVE_AFTER_DAYS") {
            match days.trim().parse::<f64>() {
                Ok(days) if !days.is_nan() => self.archive_after_days = days,
                _ => warn!("ignore invalid ARCHIVE_AFTER_DAYS, value={days}"),
            }
        }
        if let Some(team_key) = var("LINEAR_TEAM_KEY") {
            self.team_key = Some(team_key);
        }
        if let Some(dry_run) = var("DRY_RUN") {
            // only an explicit "false" archives
            self.dry_run = dry_run != "false";
        }
        if let Some(page_size) = var("PAGE_SIZE") {
            match page_size.trim().parse::<usize>() {
                Ok(page_size) => self.page_size = page_size,
                Err(_) => warn!("ignore invalid PAGE_SIZE, value={page_size}"),
            }
        }
    }

    pub fn api_key(&self) -> CoreRsResult<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| config_error!(message = "missing LINEAR_API_KEY environment variable"))
    }

    pub fn team_key(&self) -> Option<&str> {
        self.team_key.as_deref().filter(|key| !key.is_empty())
    }

    pub fn cron_secret(&self) -> Option<&str> {
        self.cron_secret.as_deref().filter(|secret| !secret.is_empty())
    }
}

impl Validator for AppConfig {
    fn validate(&self) -> CoreRsResult<()> {
        self.api_key()?;
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(config_error!(
                message = format!("page_size must be between 1 and {MAX_PAGE_SIZE}, page_size={}", self.page_size)
            ));
        }
        if self.linear_uri.is_empty() {
            return Err(config_error!(message = "linear_uri must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::NaiveTime;
    use framework::exception::error_code;
    use framework::json;
    use framework::validate::Validator;

    use super::AppConfig;

    fn config() -> AppConfig {
        json::from_json(r#"{"linear_uri":"https://api.linear.app/graphql"}"#).unwrap()
    }

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = config();
        assert!((config.archive_after_days - 30.0).abs() < f64::EPSILON);
        assert!(config.dry_run);
        assert_eq!(config.page_size, 50);
        assert_eq!(config.schedule_time, NaiveTime::from_hms_opt(3, 0, 0).unwrap());
        assert_eq!(config.team_key(), None);
        assert_eq!(config.cron_secret(), None);
    }

    #[test]
    fn apply_env() {
        let mut config = config();
        config.apply_env(env(&[
            ("LINEAR_API_KEY", "lin_api_123"),
            ("CRON_SECRET", "s3cret"),
            ("ARCHIVE_AFTER_DAYS", "14"),
            ("LINEAR_TEAM_KEY", "ENG"),
            ("DRY_RUN", "false"),
            ("PAGE_SIZE", "100"),
        ]));

        assert_eq!(config.api_key().unwrap(), "lin_api_123");
        assert_eq!(config.cron_secret(), Some("s3cret"));
        assert!((config.archive_after_days - 14.0).abs() < f64::EPSILON);
        assert_eq!(config.team_key(), Some("ENG"));
        assert!(!config.dry_run);
        assert_eq!(config.page_size, 100);
    }

    #[test]
    fn apply_env_ignores_invalid_numbers() {
        let mut config = config();
        config.apply_env(env(&[("ARCHIVE_AFTER_DAYS", "two weeks"), ("PAGE_SIZE", "-1")]));

        assert!((config.archive_after_days - 30.0).abs() < f64::EPSILON);
        assert_eq!(config.page_size, 50);
    }

    #[test]
    fn dry_run_unless_explicit_false() {
        for (value, dry_run) in [("true", true), ("1", true), ("", true), ("FALSE", true), ("false", false)] {
            let mut config = config();
            config.apply_env(env(&[("DRY_RUN", value)]));
            assert_eq!(config.dry_run, dry_run, "DRY_RUN={value}");
        }
    }

    #[test]
    fn validate_requires_api_key() {
        let mut config = config();
        let error = config.validate().err().unwrap();
        assert!(error.has_code(error_code::CONFIG_ERROR));

        config.apply_env(env(&[("LINEAR_API_KEY", "")]));
        assert!(config.validate().is_err());

        config.apply_env(env(&[("LINEAR_API_KEY", "lin_api_123")]));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_page_size() {
        let mut config = config();
        config.apply_env(env(&[("LINEAR_API_KEY", "lin_api_123")]));

        config.page_size = 0;
        assert!(config.validate().is_err());
        config.page_size = 251;
        assert!(config.validate().is_err());
        config.page_size = 250;
        assert!(config.validate().is_ok());
    }
}
