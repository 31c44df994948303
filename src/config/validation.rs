use crate::config::types::{
    CheckpointConfig, Config, CrawlerConfig, ExtractionConfig, UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

const MAX_WORKERS: u32 = 256;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_checkpoint_config(&config.checkpoint)?;
    validate_extraction_config(&config.extraction)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.language.is_empty()
        || !config
            .language
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "language must be a non-empty alphanumeric tag, got '{}'",
            config.language
        )));
    }

    validate_worker_count("fetch_workers", config.fetch_workers)?;

    if config.completed_buffer < 1 {
        return Err(ConfigError::Validation(
            "completed_buffer must be >= 1".to_string(),
        ));
    }

    if config.poll_interval < 1 {
        return Err(ConfigError::Validation(
            "poll_interval must be >= 1ms".to_string(),
        ));
    }

    if !config.link_prefix.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "link_prefix must start with '/', got '{}'",
            config.link_prefix
        )));
    }

    let base = parse_http_url("base_url", &config.base_url())?;
    let initial = parse_http_url("initial_url", &config.initial_url())?;

    if base.host_str() != initial.host_str() {
        return Err(ConfigError::Validation(format!(
            "initial_url '{}' is outside the collection '{}'",
            initial, base
        )));
    }

    Ok(())
}

/// Validates checkpoint configuration
fn validate_checkpoint_config(config: &CheckpointConfig) -> Result<(), ConfigError> {
    if config.interval < 1 {
        return Err(ConfigError::Validation(
            "checkpoint interval must be >= 1s".to_string(),
        ));
    }

    if let Some(directory) = &config.directory {
        if directory.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "checkpoint directory cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates extraction configuration
fn validate_extraction_config(config: &ExtractionConfig) -> Result<(), ConfigError> {
    validate_worker_count("extraction workers", config.workers)?;

    if config.output_directory.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output_directory cannot be empty".to_string(),
        ));
    }

    if config.queue_capacity == Some(0) {
        return Err(ConfigError::Validation(
            "queue_capacity must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

fn validate_worker_count(name: &str, count: u32) -> Result<(), ConfigError> {
    if count < 1 || count > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "{} must be between 1 and {}, got {}",
            name, MAX_WORKERS, count
        )));
    }
    Ok(())
}

/// Parses an absolute http(s) URL
fn parse_http_url(name: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", name, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            name, value
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' has no host",
            name, value
        )));
    }

    Ok(url)
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| ConfigError::Validation(format!("Invalid email format: '{}'", email)))?;

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
