//! Configuration module for the crew staffing system.
//!
//! This module provides structures and utilities for managing engine
//! configuration. It supports loading configuration from TOML files and
//! provides validation to ensure all required values are properly set.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the staffing engine.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Configuration specific to the staffing engine instance.
	pub staffing: StaffingConfig,
	/// Configuration for the repository backend.
	pub storage: StorageConfig,
}

/// Configuration specific to the staffing engine instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StaffingConfig {
	/// Unique identifier for this engine instance.
	pub id: String,
	/// Maximum applied + selected applications a worker may hold across
	/// all non-terminal orders. Defaults to 3 if not specified.
	#[serde(default = "default_application_limit")]
	pub application_limit: u32,
	/// Interval in seconds between expiry sweeps of staffing orders.
	/// Defaults to 60 seconds if not specified.
	#[serde(default = "default_refresh_interval_seconds")]
	pub refresh_interval_seconds: u64,
}

/// Returns the default in-flight application limit per worker.
fn default_application_limit() -> u32 {
	3
}

/// Returns the default expiry sweep interval in seconds.
fn default_refresh_interval_seconds() -> u64 {
	60
}

/// Configuration for the repository backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of repository implementation names to their configurations.
	#[serde(default)]
	pub implementations: HashMap<String, toml::Value>,
}

impl Config {
	/// Loads and validates configuration from a TOML file.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let raw = std::fs::read_to_string(path)?;
		let config: Config = toml::from_str(&raw)?;
		config.validate()?;
		Ok(config)
	}

	/// Validates field values that serde cannot express.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.staffing.id.trim().is_empty() {
			return Err(ConfigError::Validation(
				"staffing.id must not be empty".into(),
			));
		}
		if self.staffing.application_limit == 0 {
			return Err(ConfigError::Validation(
				"staffing.application_limit must be at least 1".into(),
			));
		}
		if self.storage.primary.trim().is_empty() {
			return Err(ConfigError::Validation(
				"storage.primary must not be empty".into(),
			));
		}
		Ok(())
	}

	/// Configuration table for the selected primary backend.
	pub fn primary_storage_config(&self) -> toml::Value {
		self.storage
			.implementations
			.get(&self.storage.primary)
			.cloned()
			.unwrap_or(toml::Value::Table(Default::default()))
	}
}
