use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    pub stripe_secret_key: String,
    pub api_base: String,
    pub currency: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
    pub payment: PaymentConfig,
    /// Put the admin guard in front of role, membership, premium and contact approvals.
    pub strict_access_control: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "heartsync".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "heartsync-users".into()),
            ttl_minutes: parsed_var("JWT_TTL_MINUTES").unwrap_or(60),
        };
        let payment = PaymentConfig {
            stripe_secret_key: std::env::var("STRIPE_SECRET_KEY")
                .context("STRIPE_SECRET_KEY is not set")?,
            api_base: std::env::var("STRIPE_API_BASE")
                .unwrap_or_else(|_| "https://api.stripe.com".into()),
            currency: std::env::var("PAYMENT_CURRENCY").unwrap_or_else(|_| "usd".into()),
        };
        Ok(Self {
            database_url,
            db_max_connections: parsed_var("DB_MAX_CONNECTIONS").unwrap_or(10),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parsed_var("APP_PORT").unwrap_or(5000),
            jwt,
            payment,
            strict_access_control: parsed_var("STRICT_ACCESS_CONTROL").unwrap_or(false),
        })
    }
}

fn parsed_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}
