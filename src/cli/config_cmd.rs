use anyhow::Result;

use crate::core::config::{AppConfig, PROVISIONING_KEY_ENV};

pub fn init() -> Result<()> {
    let path = AppConfig::config_path();
    if path.exists() {
        eprintln!("Config file already exists at {}", path.display());
        eprintln!("Remove it first if you want to regenerate.");
        return Ok(());
    }

    let path = AppConfig::default().save()?;
    println!("Generated config at {}", path.display());
    println!(
        "  Set {} or provider.provisioning_key to list your keys.",
        PROVISIONING_KEY_ENV
    );
    Ok(())
}

pub fn path() -> Result<()> {
    println!("{}", AppConfig::config_path().display());
    Ok(())
}

pub fn check() -> Result<()> {
    let path = AppConfig::config_path();
    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    let issues = config.validate();
    if !issues.is_empty() {
        eprintln!("Config issues found in {}:", path.display());
        for issue in &issues {
            eprintln!("  - {}", issue);
        }
        std::process::exit(1);
    }

    if path.exists() {
        println!("Config is valid: {}", path.display());
    } else {
        println!("No config file at {}, using defaults.", path.display());
    }
    println!("  Endpoint: {}", config.provider.endpoint);
    if config.provisioning_key().is_some() {
        println!("  Provisioning key: set");
    } else {
        println!("  Provisioning key: missing (set {})", PROVISIONING_KEY_ENV);
    }
    Ok(())
}
