use std::{borrow::Cow, fmt, io::IsTerminal, net::SocketAddr, path::PathBuf, str::FromStr};

use clap::{Parser, ValueEnum};
use config::{Config, Environment};
use logforth::filter::EnvFilter;
use secrecy::SecretString;

#[derive(Debug, Parser)]
#[command(name = "Prompt Canvas", version, long_about = concat!("Prompt Canvas API v", env!("CARGO_PKG_VERSION")))]
pub struct Args {
    /// IP address on which the server will listen for incomming connections.
    /// Default: 127.0.0.1:3001
    #[arg(short, long, env = "CANVAS_LISTEN_ADDRESS")]
    pub listen_address: Option<SocketAddr>,
    /// Port to listen on all interfaces, ignored when a listen address is given
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,
    /// Path to the TOML configuration file
    #[arg(long, short, env = "CANVAS_CONFIG_PATH", default_value = "./canvas.toml")]
    pub config: PathBuf,
    /// API key of the completion provider, overrides the configuration file
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
    /// Deployment environment, overrides the configuration file
    #[arg(long, env = "CANVAS_ENV")]
    pub environment: Option<EnvironmentArg>,
    /// Set the logging level, this applies to all log events.
    #[arg(long = "log", env = "CANVAS_LOG", default_value_t = LogLevel::default())]
    pub log_level: LogLevel,
    /// Set the style of log output
    #[arg(long, env = "CANVAS_LOG_STYLE", default_value_t = LogStyle::default())]
    pub log_style: LogStyle,
}

impl Args {
    /// Loads the configuration file, applies the command line overrides and
    /// validates the result.
    pub fn config(&self) -> anyhow::Result<Config> {
        let mut config = if self.config.exists() {
            Config::load(&self.config)?
        } else {
            log::debug!(
                "No configuration file at {}, using defaults",
                self.config.display()
            );

            Config::default()
        };

        if let Some(api_key) = self.api_key.as_deref().filter(|key| !key.trim().is_empty()) {
            config.completion.api_key = Some(SecretString::from(api_key));
        }

        if let Some(environment) = self.environment {
            config.server.environment = environment.into();
        }

        config.validate()?;

        Ok(config)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub(crate) enum EnvironmentArg {
    /// Local development, allows the canvas frontend on localhost
    Development,
    /// Production deployment
    Production,
}

impl From<EnvironmentArg> for Environment {
    fn from(value: EnvironmentArg) -> Self {
        match value {
            EnvironmentArg::Development => Environment::Development,
            EnvironmentArg::Production => Environment::Production,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub(crate) enum LogStyle {
    /// Colorized text, used as the default with TTY output
    Color,
    /// Standard text, used as the default with non-TTY output
    Text,
    /// JSON objects
    Json,
}

impl Default for LogStyle {
    fn default() -> Self {
        if std::io::stdout().is_terminal() {
            LogStyle::Color
        } else {
            LogStyle::Text
        }
    }
}

impl AsRef<str> for LogStyle {
    fn as_ref(&self) -> &str {
        match self {
            LogStyle::Color => "color",
            LogStyle::Text => "text",
            LogStyle::Json => "json",
        }
    }
}

impl fmt::Display for LogStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub(crate) enum LogLevel {
    /// Disable logging
    Off,
    /// Only log errors
    Error,
    /// Log errors, and warnings
    Warn,
    /// Log errors, warnings, and info messages
    #[default]
    Info,
    /// Log errors, warnings, info, and debug messages
    Debug,
    /// Log errors, warnings, info, debug, and trace messages
    Trace,
}

impl LogLevel {
    pub fn env_filter(self) -> EnvFilter {
        EnvFilter::from_str(&self.filter_directives()).expect("These all are valid env filters.")
    }

    /// Dependencies log at `warn`, workspace crates at the selected level.
    fn filter_directives(self) -> Cow<'static, str> {
        match self {
            LogLevel::Off => Cow::Borrowed("off"),
            level => Cow::Owned(format!(
                "warn,canvas={level},server={level},config={level},completion={level}"
            )),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_ref().fmt(f)
    }
}

impl AsRef<str> for LogLevel {
    fn as_ref(&self) -> &str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}
