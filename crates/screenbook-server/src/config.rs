//! Server configuration loaded from the environment.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, bail};
use screenbook_auth::{AuthConfig, OtpConfig};
use screenbook_db::DbConfig;

/// Which SMS provider to deliver through.
#[derive(Debug, Clone)]
pub enum SmsConfig {
    /// Log messages instead of sending them.
    Console,
    Twilio {
        account_sid: String,
        auth_token: String,
        from_number: String,
    },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db: DbConfig,
    pub auth: AuthConfig,
    pub otp: OtpConfig,
    pub sms: SmsConfig,
    /// Directory uploaded result files are written under.
    pub storage_dir: PathBuf,
    /// Externally reachable base URL, used in download links.
    pub public_base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            db: DbConfig::default(),
            auth: AuthConfig::default(),
            otp: OtpConfig::default(),
            sms: SmsConfig::Console,
            storage_dir: PathBuf::from("./data/results"),
            public_base_url: "http://localhost:8080".into(),
        }
    }
}

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} has an invalid value: {raw}")),
        None => Ok(default),
    }
}

fn required(name: &str) -> anyhow::Result<String> {
    var(name).with_context(|| format!("{name} must be set"))
}

/// Reads a PEM from `{prefix}_PEM`, or from the file named by
/// `{prefix}_FILE`.
fn pem(prefix: &str) -> anyhow::Result<String> {
    if let Some(inline) = var(&format!("{prefix}_PEM")) {
        return Ok(inline.replace("\\n", "\n"));
    }
    if let Some(path) = var(&format!("{prefix}_FILE")) {
        return std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {prefix}_FILE at {path}"));
    }
    bail!("either {prefix}_PEM or {prefix}_FILE must be set")
}

impl ServerConfig {
    /// Builds the configuration from environment variables, falling back
    /// to defaults for everything but the signing keys.
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let db_defaults = DbConfig::default();
        let db = DbConfig {
            url: var("SURREAL_URL").unwrap_or(db_defaults.url),
            namespace: var("SURREAL_NS").unwrap_or(db_defaults.namespace),
            database: var("SURREAL_DB").unwrap_or(db_defaults.database),
            username: var("SURREAL_USER").unwrap_or(db_defaults.username),
            password: var("SURREAL_PASS").unwrap_or(db_defaults.password),
        };

        let auth_defaults = AuthConfig::default();
        let auth = AuthConfig {
            jwt_private_key_pem: pem("JWT_PRIVATE_KEY")?,
            jwt_public_key_pem: pem("JWT_PUBLIC_KEY")?,
            jwt_issuer: var("JWT_ISSUER").unwrap_or(auth_defaults.jwt_issuer.clone()),
            access_token_lifetime_secs: parsed(
                "ACCESS_TOKEN_LIFETIME_SECS",
                auth_defaults.access_token_lifetime_secs,
            )?,
            pepper: var("PASSWORD_PEPPER"),
            ..auth_defaults
        };

        let otp_defaults = OtpConfig::default();
        let otp = OtpConfig {
            lifetime_secs: parsed("OTP_LIFETIME_SECS", otp_defaults.lifetime_secs)?,
            max_attempts: parsed("OTP_MAX_ATTEMPTS", otp_defaults.max_attempts)?,
        };

        auth.validate().context("invalid token configuration")?;
        otp.validate().context("invalid OTP configuration")?;

        let sms = match var("SMS_PROVIDER").as_deref().unwrap_or("console") {
            "console" => SmsConfig::Console,
            "twilio" => SmsConfig::Twilio {
                account_sid: required("TWILIO_ACCOUNT_SID")?,
                auth_token: required("TWILIO_AUTH_TOKEN")?,
                from_number: required("TWILIO_FROM_NUMBER")?,
            },
            other => bail!("unknown SMS_PROVIDER '{other}', expected console or twilio"),
        };

        Ok(Self {
            host: var("SCREENBOOK_HOST").unwrap_or(defaults.host),
            port: parsed("SCREENBOOK_PORT", defaults.port)?,
            db,
            auth,
            otp,
            sms,
            storage_dir: var("RESULT_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_dir),
            public_base_url: var("PUBLIC_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.public_base_url),
        })
    }
}
