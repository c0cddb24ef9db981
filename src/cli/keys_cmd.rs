use std::time::Duration;

use anyhow::Result;
use chrono::Utc;

use crate::cli::listing::{self, ListFilter, SortKey};
use crate::cli::output::{OutputFormat, OutputOptions};
use crate::cli::renderer;
use crate::core::config::{AppConfig, PROVISIONING_KEY_ENV};
use crate::core::gateway::{self, GatewayOptions, RetrievalError};

pub struct KeysArgs {
    pub include_disabled: bool,
    pub filter: Option<String>,
    pub state: Option<String>,
    pub sort: Option<String>,
    pub offset: Option<u32>,
}

/// Braille spinner on stderr while the request is in flight.
fn spawn_spinner(msg: &'static str) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let frames = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
        let mut i = 0usize;
        loop {
            eprint!("\r {} {}", frames[i % frames.len()], msg);
            i = i.wrapping_add(1);
            tokio::time::sleep(Duration::from_millis(80)).await;
        }
    })
}

fn gateway_options(
    config: &AppConfig,
    include_disabled: bool,
    offset: Option<u32>,
) -> Result<GatewayOptions, RetrievalError> {
    let from_env = std::env::var(PROVISIONING_KEY_ENV).ok();
    gateway_options_with(config, from_env, include_disabled, offset)
}

fn gateway_options_with(
    config: &AppConfig,
    secret_from_env: Option<String>,
    include_disabled: bool,
    offset: Option<u32>,
) -> Result<GatewayOptions, RetrievalError> {
    let secret = config
        .provisioning_key_from(secret_from_env)
        .ok_or(RetrievalError::MissingSecret(PROVISIONING_KEY_ENV))?;
    Ok(GatewayOptions {
        endpoint: config.provider.endpoint.clone(),
        secret,
        timeout: Duration::from_secs(config.provider.timeout_secs),
        include_disabled,
        offset,
    })
}

pub async fn run(args: KeysArgs, config: &AppConfig, opts: &OutputOptions) -> Result<()> {
    let sort_id = args.sort.as_deref().unwrap_or(&config.settings.sort);
    let sort = match SortKey::from_id(sort_id) {
        Some(s) => s,
        None => {
            eprintln!("Unknown sort key: '{}' (expected name|usage|ratio|expiry)", sort_id);
            std::process::exit(2);
        }
    };
    let state = match args.state.as_deref() {
        Some(id) => match listing::parse_state(id) {
            Some(s) => Some(s),
            None => {
                eprintln!("Unknown state: '{}' (expected normal|near|over)", id);
                std::process::exit(2);
            }
        },
        None => None,
    };
    let include_disabled = args.include_disabled || config.provider.include_disabled;

    let show_spinner = matches!(opts.format, OutputFormat::Text);
    let spinner = show_spinner.then(|| spawn_spinner("Fetching API keys..."));

    let result = match gateway_options(config, include_disabled, args.offset) {
        Ok(gw_opts) => gateway::fetch_key_list(&gw_opts).await,
        Err(e) => Err(e),
    };

    if let Some(s) = spinner {
        s.abort();
        eprint!("\r\x1b[2K");
    }

    let records = match result {
        Ok(records) => records,
        Err(e) => {
            tracing::debug!(error = ?e, "key list retrieval failed");
            match opts.format {
                OutputFormat::Text => eprintln!("{}", renderer::render_error(&e.to_string(), opts.use_color)),
                OutputFormat::Json => {
                    let body = serde_json::json!({ "error": e.to_string() });
                    println!("{}", body);
                }
            }
            std::process::exit(1);
        }
    };

    let filter = ListFilter {
        include_disabled,
        text: args.filter,
        state,
    };
    let total = records.len();
    let views = listing::build_views(records, &filter, sort, Utc::now());
    tracing::debug!(total, shown = views.len(), ?sort, "keys derived");

    match opts.format {
        OutputFormat::Text => {
            println!("{}", renderer::render_keys(&views, opts.show_all, opts.use_color));
        }
        OutputFormat::Json => {
            println!("{}", renderer::render_json(&views, opts.pretty)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key(key: Option<&str>) -> AppConfig {
        let mut config = AppConfig::default();
        config.provider.provisioning_key = key.map(str::to_string);
        config.provider.timeout_secs = 7;
        config
    }

    #[test]
    fn gateway_options_use_config_values() {
        let config = config_with_key(Some("sk-or-v1-prov"));
        let opts = gateway_options_with(&config, None, true, Some(50)).unwrap();
        assert_eq!(opts.secret, "sk-or-v1-prov");
        assert_eq!(opts.timeout, Duration::from_secs(7));
        assert!(opts.include_disabled);
        assert_eq!(opts.offset, Some(50));
        assert_eq!(opts.endpoint, config.provider.endpoint);
    }

    #[test]
    fn gateway_options_prefer_env_secret() {
        let config = config_with_key(Some("sk-or-v1-file"));
        let opts =
            gateway_options_with(&config, Some("sk-or-v1-env".to_string()), false, None).unwrap();
        assert_eq!(opts.secret, "sk-or-v1-env");
        assert!(opts.offset.is_none());
    }

    #[test]
    fn gateway_options_require_secret() {
        let err = gateway_options_with(&config_with_key(None), None, false, None).unwrap_err();
        assert!(matches!(err, RetrievalError::MissingSecret(_)));

        let err = gateway_options_with(&config_with_key(Some("")), Some("  ".to_string()), false, None)
            .unwrap_err();
        assert!(matches!(err, RetrievalError::MissingSecret(_)));
    }
}
