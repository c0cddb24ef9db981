use std::io::IsTerminal;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    /// `-j` wins, then `--format`, then the config default.
    pub fn resolve(json_flag: bool, format_flag: Option<&str>, config_default: &str) -> Self {
        if json_flag {
            return Self::Json;
        }
        match format_flag.unwrap_or(config_default) {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format: OutputFormat,
    pub pretty: bool,
    pub use_color: bool,
    pub show_all: bool,
}

/// Decide whether to emit ANSI colors from `--no-color`, the config
/// `color` setting (auto|always|never) and `NO_COLOR`.
pub fn detect_color(no_color_flag: bool, color_setting: &str) -> bool {
    let no_color_env = std::env::var("NO_COLOR").is_ok();
    color_enabled(
        no_color_flag,
        no_color_env,
        color_setting,
        std::io::stdout().is_terminal(),
    )
}

fn color_enabled(no_color_flag: bool, no_color_env: bool, setting: &str, is_tty: bool) -> bool {
    if no_color_flag || no_color_env {
        return false;
    }
    match setting {
        "always" => true,
        "never" => false,
        _ => is_tty,
    }
}
