//! `claimdesk check-config`: validate and print the effective configuration.

use std::path::Path;

use anyhow::{bail, Result};

use claimdesk_config::{load_config, redacted_yaml, validate};

pub async fn run(config_path: &Path) -> Result<()> {
    println!("Config: {}", config_path.display());
    if !config_path.exists() {
        println!("  (file not found, using defaults and environment)");
    }

    let config = load_config(config_path).await?;
    let report = validate(&config);

    println!("\n{}", redacted_yaml(&config));

    for warning in &report.warnings {
        println!("  warning  {}: {}", warning.path, warning.message);
    }
    for error in &report.errors {
        println!("  error    {}: {}", error.path, error.message);
    }

    if report.is_valid() {
        println!("\nConfiguration OK ({} warning(s)).", report.warnings.len());
        Ok(())
    } else {
        bail!("configuration has {} error(s)", report.errors.len())
    }
}
