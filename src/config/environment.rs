//! Configuración del entorno
//!
//! Todo lo que el servidor lee del entorno del proceso (tras cargar `.env`
//! con `dotenvy`). Solo `JWT_SECRET` es obligatorio; las integraciones
//! externas se activan cuando sus claves están presentes.

use std::env;
use std::str::FromStr;

use thiserror::Error;

pub const DEFAULT_JWT_EXPIRATION: i64 = 86_400;
pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";
pub const DEFAULT_TWILIO_API_BASE: &str = "https://api.twilio.com";
pub const DEFAULT_MAIL_API_URL: &str = "https://api.sendgrid.com/v3/mail/send";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Configuración de Stripe; sin clave no hay payment intents
#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: Option<String>,
    pub api_base: String,
}

/// Configuración de la API HTTP de correo
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: String,
    pub from: String,
}

/// Configuración de Twilio
#[derive(Debug, Clone)]
pub struct SmsConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub jwt_secret: String,
    /// Duración de la sesión en segundos
    pub jwt_expiration: i64,
    pub bcrypt_cost: u32,
    pub cors_origins: Vec<String>,
    pub log_level: String,
    pub stripe: StripeConfig,
    pub mail: Option<MailConfig>,
    pub sms: Option<SmsConfig>,
}

fn optional(name: &'static str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parsed<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(name) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

impl EnvironmentConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = optional("ENVIRONMENT").unwrap_or_else(|| "development".to_string());
        let default_level = if environment == "development" { "debug" } else { "info" };

        let mail = match (optional("MAIL_API_KEY"), optional("MAIL_FROM")) {
            (Some(api_key), Some(from)) => Some(MailConfig {
                api_url: optional("MAIL_API_URL").unwrap_or_else(|| DEFAULT_MAIL_API_URL.to_string()),
                api_key,
                from,
            }),
            _ => None,
        };

        let sms = match (
            optional("TWILIO_ACCOUNT_SID"),
            optional("TWILIO_AUTH_TOKEN"),
            optional("TWILIO_PHONE_NUMBER"),
        ) {
            (Some(account_sid), Some(auth_token), Some(from_number)) => Some(SmsConfig {
                account_sid,
                auth_token,
                from_number,
                api_base: optional("TWILIO_API_BASE").unwrap_or_else(|| DEFAULT_TWILIO_API_BASE.to_string()),
            }),
            _ => None,
        };

        Ok(Self {
            port: parsed("PORT", 3000)?,
            host: optional("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            jwt_secret: optional("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
            jwt_expiration: parsed("JWT_EXPIRATION", DEFAULT_JWT_EXPIRATION)?,
            bcrypt_cost: parsed("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            cors_origins: optional("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            log_level: optional("LOG_LEVEL").unwrap_or_else(|| default_level.to_string()),
            stripe: StripeConfig {
                secret_key: optional("STRIPE_SECRET_KEY"),
                api_base: optional("STRIPE_API_BASE").unwrap_or_else(|| DEFAULT_STRIPE_API_BASE.to_string()),
            },
            mail,
            sms,
            environment,
        })
    }

    /// Configuración de desarrollo sin integraciones externas
    pub fn development(jwt_secret: impl Into<String>) -> Self {
        Self {
            environment: "development".to_string(),
            port: 3000,
            host: "127.0.0.1".to_string(),
            jwt_secret: jwt_secret.into(),
            jwt_expiration: DEFAULT_JWT_EXPIRATION,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            cors_origins: Vec::new(),
            log_level: "debug".to_string(),
            stripe: StripeConfig {
                secret_key: None,
                api_base: DEFAULT_STRIPE_API_BASE.to_string(),
            },
            mail: None,
            sms: None,
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// `LOG_LEVEL` como nivel de tracing, INFO por defecto
    pub fn tracing_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }
}
