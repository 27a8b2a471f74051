use crate::config::types::{BatchConfig, Config, CrawlerConfig, HttpConfig, OutputConfig};
use crate::ConfigError;

/// Highest search page a crawl may request
pub const MAX_END_PAGE: u32 = 100_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_http_config(&config.http)?;
    validate_output_config(&config.output)?;
    validate_batch_config(&config.batch)?;
    config.time_filter.to_filter()?;
    // Building the registry validates every [[site]] table
    config.site_registry()?;
    Ok(())
}

/// Validates paging and failure-budget settings
pub fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.start_page < 1 {
        return Err(ConfigError::Validation(format!(
            "start_page must be >= 1, got {}",
            config.start_page
        )));
    }

    if config.end_page > MAX_END_PAGE {
        return Err(ConfigError::Validation(format!(
            "end_page must be <= {}, got {}",
            MAX_END_PAGE, config.end_page
        )));
    }

    for (name, value) in [
        ("max_fetch_retries", config.max_fetch_retries),
        ("max_empty_page_retries", config.max_empty_page_retries),
        ("max_parse_failures", config.max_parse_failures),
    ] {
        if value < 1 {
            return Err(ConfigError::Validation(format!(
                "{} must be >= 1, got {}",
                name, value
            )));
        }
    }

    if config.checkpoint_interval < 1 {
        return Err(ConfigError::Validation(format!(
            "checkpoint_interval must be >= 1, got {}",
            config.checkpoint_interval
        )));
    }

    Ok(())
}

/// Validates HTTP settings
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.browser_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "browser_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.root.trim().is_empty() {
        return Err(ConfigError::Validation("root cannot be empty".to_string()));
    }

    Ok(())
}

/// Validates batch settings
fn validate_batch_config(config: &BatchConfig) -> Result<(), ConfigError> {
    if config.max_parallel_runs < 1 {
        return Err(ConfigError::Validation(format!(
            "max_parallel_runs must be >= 1, got {}",
            config.max_parallel_runs
        )));
    }

    if config.keywords.iter().any(|k| k.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "batch keywords cannot be blank".to_string(),
        ));
    }

    Ok(())
}
