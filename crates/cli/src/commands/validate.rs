use anyhow::{Context, Result};
use std::path::PathBuf;
use villa_site_core::load_settings;
use villa_site_validator::validate_site;

pub async fn run(path: PathBuf) -> Result<()> {
    println!("Validating site at: {}", path.display());

    let settings = load_settings(&path).context("Failed to load site settings")?;
    println!("✓ settings valid");

    let report = validate_site(&settings.root, &settings.content)?;

    for line in &report.info {
        println!("  {}", line);
    }
    for warning in &report.warnings {
        println!("⚠ {}", warning);
    }
    for error in &report.errors {
        println!("✗ {}", error);
    }

    println!();
    if !report.is_ok() {
        anyhow::bail!(
            "Validation failed: {} error(s), {} warning(s)",
            report.errors.len(),
            report.warnings.len()
        );
    }
    println!("✅ Valid ({} warning(s))", report.warnings.len());

    Ok(())
}
