//! Configuration module for Press-Trawl
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use press_trawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("press-trawl.toml")).unwrap();
//! println!("Output root: {}", config.output.root);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{
    BatchConfig, Config, CrawlerConfig, HttpConfig, OutputConfig, SiteEntry, TimeFilterConfig,
};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::{validate, validate_crawler_config};
