use std::net::IpAddr;
use std::time::Duration;

use ipnet::IpNet;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub max_body_size: usize,
    pub static_dir: String,
    pub cors_origins: Vec<String>,
    pub trusted_proxies: Vec<IpNet>,
    pub rate_limit: u32,
    pub rate_limit_window: Duration,
    pub webhook_url: Option<String>,
    pub sink_timeout: Duration,
    pub dispatch_deadline: Option<Duration>,
    pub notify_email: String,
    pub smtp: Option<SmtpConfig>,
    pub database_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
    /// Implicit TLS when set, STARTTLS otherwise.
    pub secure: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let host: IpAddr = env_or("BESTIE_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid BESTIE_HOST: {e}"))?;

        let port: u16 = env_or("BESTIE_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid BESTIE_PORT: {e}"))?;

        let log_level = env_or("BESTIE_LOG_LEVEL", "info");

        let max_body_size: usize = env_or("BESTIE_MAX_BODY_SIZE", "65536")
            .parse()
            .map_err(|e| format!("Invalid BESTIE_MAX_BODY_SIZE: {e}"))?;

        let static_dir = env_or("BESTIE_STATIC_DIR", "public");

        let cors_origins = split_list(&env_or("BESTIE_CORS_ORIGINS", ""))
            .map(str::to_string)
            .collect();

        let trusted_proxies: Vec<IpNet> = split_list(&env_or("BESTIE_TRUSTED_PROXIES", ""))
            .map(|s| {
                s.parse()
                    .map_err(|e| format!("Invalid BESTIE_TRUSTED_PROXIES entry '{s}': {e}"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let rate_limit: u32 = env_or("BESTIE_RATE_LIMIT", "10")
            .parse()
            .map_err(|e| format!("Invalid BESTIE_RATE_LIMIT: {e}"))?;

        let rate_limit_window = env_or("BESTIE_RATE_LIMIT_WINDOW_SECS", "900")
            .parse()
            .map(Duration::from_secs)
            .map_err(|e| format!("Invalid BESTIE_RATE_LIMIT_WINDOW_SECS: {e}"))?;

        let webhook_url = env_optional("BESTIE_WEBHOOK_URL");

        let sink_timeout = env_or("BESTIE_SINK_TIMEOUT_SECS", "10")
            .parse()
            .map(Duration::from_secs)
            .map_err(|e| format!("Invalid BESTIE_SINK_TIMEOUT_SECS: {e}"))?;

        let dispatch_deadline = env_optional("BESTIE_DISPATCH_DEADLINE_SECS")
            .map(|s| {
                s.parse()
                    .map(Duration::from_secs)
                    .map_err(|e| format!("Invalid BESTIE_DISPATCH_DEADLINE_SECS: {e}"))
            })
            .transpose()?;

        let notify_email = env_or("BESTIE_NOTIFY_EMAIL", "info@bestie.co.ke");

        let smtp = match (
            env_optional("BESTIE_SMTP_USER"),
            env_optional("BESTIE_SMTP_PASS"),
        ) {
            (Some(user), Some(pass)) => {
                let secure = matches!(
                    env_or("BESTIE_SMTP_SECURE", "false").to_lowercase().as_str(),
                    "true" | "1" | "yes"
                );
                let default_port = if secure { "465" } else { "587" };
                Some(SmtpConfig {
                    host: env_or("BESTIE_SMTP_HOST", "smtp.gmail.com"),
                    port: env_or("BESTIE_SMTP_PORT", default_port)
                        .parse()
                        .map_err(|e| format!("Invalid BESTIE_SMTP_PORT: {e}"))?,
                    from: env_optional("BESTIE_SMTP_FROM").unwrap_or_else(|| user.clone()),
                    user,
                    pass,
                    secure,
                })
            }
            _ => None,
        };

        let database_url = env_optional("DATABASE_URL");

        Ok(Config {
            host,
            port,
            log_level,
            max_body_size,
            static_dir,
            cors_origins,
            trusted_proxies,
            rate_limit,
            rate_limit_window,
            webhook_url,
            sink_timeout,
            dispatch_deadline,
            notify_email,
            smtp,
            database_url,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Unset and blank values are treated the same.
fn env_optional(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}
