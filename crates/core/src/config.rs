use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_u16(key: &str, default: u16) -> u16 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    env_opt(key)
        .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub postgres: PostgresConfig,
    pub smtp: SmtpConfig,
    pub email_function: EmailFunctionConfig,
    pub escalation: EscalationConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig::from_env(),
            postgres: PostgresConfig::from_env(),
            smtp: SmtpConfig::from_env(),
            email_function: EmailFunctionConfig::from_env(),
            escalation: EscalationConfig::from_env(),
        }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  server:     {}:{}", self.server.host, self.server.port);
        tracing::info!(
            "  postgres:   host={}, db={}",
            self.postgres.host,
            self.postgres.database
        );
        tracing::info!(
            "  smtp:       {}",
            self.smtp
                .host
                .as_deref()
                .map(|h| format!("{}:{}", h, self.smtp.port))
                .unwrap_or_else(|| "(not configured)".to_string())
        );
        tracing::info!(
            "  email fn:   {}",
            self.email_function.url.as_deref().unwrap_or("(not configured)")
        );
        tracing::info!(
            "  escalation: cron={}, pass_timeout={}s",
            self.escalation.cron.as_deref().unwrap_or("(manual only)"),
            self.escalation.pass_timeout_secs
        );
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

impl ServerConfig {
    fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0"),
            port: env_u16("PORT", 3001),
            cors_origin: env_or("CORS_ORIGIN", "*"),
        }
    }
}

// ── PostgreSQL ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub ssl_mode: String,
    pub max_connections: u32,
    /// Full connection URL override; wins over the individual fields.
    pub url: Option<String>,
}

impl PostgresConfig {
    fn from_env() -> Self {
        Self {
            host: env_or("PG_HOST", "localhost"),
            port: env_u16("PG_PORT", 5432),
            database: env_or("PG_DATABASE", "sitewatch"),
            username: env_opt("PG_USERNAME"),
            password: env_opt("PG_PASSWORD"),
            ssl_mode: env_or("PG_SSL_MODE", "prefer"),
            max_connections: env_u32("PG_MAX_CONNECTIONS", 10),
            url: env_opt("DATABASE_URL"),
        }
    }

    pub fn database_url(&self) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }
        let user = self.username.as_deref().unwrap_or("postgres");
        let pass = self.password.as_deref().unwrap_or("");
        format!(
            "postgres://{}:{}@{}:{}/{}?sslmode={}",
            user, pass, self.host, self.port, self.database, self.ssl_mode
        )
    }
}

// ── SMTP ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: Option<String>,
    pub port: u16,
    pub tls: bool,
    pub from: String,
}

impl SmtpConfig {
    fn from_env() -> Self {
        Self {
            host: env_opt("SMTP_HOST"),
            port: env_u16("SMTP_PORT", 587),
            tls: env_bool("SMTP_TLS", true),
            from: env_or("SMTP_FROM", "alerts@sitewatch.local"),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.host.is_some()
    }
}

// ── Email function ────────────────────────────────────────────

/// HTTP email-sending function (hosted serverless endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailFunctionConfig {
    pub url: Option<String>,
    pub api_key: Option<String>,
}

impl EmailFunctionConfig {
    fn from_env() -> Self {
        Self {
            url: env_opt("EMAIL_FUNCTION_URL"),
            api_key: env_opt("EMAIL_FUNCTION_API_KEY"),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }
}

// ── Escalation ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationConfig {
    /// 5-field cron expression for scheduled passes; unset = manual trigger only.
    pub cron: Option<String>,
    /// Outer deadline for one full pass.
    pub pass_timeout_secs: u64,
}

impl EscalationConfig {
    fn from_env() -> Self {
        Self {
            cron: env_opt("ESCALATION_CRON"),
            pass_timeout_secs: env_u64("ESCALATION_PASS_TIMEOUT_SECS", 300),
        }
    }
}
