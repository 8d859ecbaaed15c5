use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Cadence configuration for the background scheduler.
    pub scheduler: SchedulerConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            scheduler: SchedulerConfig::from_env(),
        }
    }
}

/// Cadences for the three scheduled jobs. All hours are UTC.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Hour of the nightly streak sweep (default: `0`, i.e. midnight).
    pub sweep_hour: u32,
    /// The two hours the engagement trigger fires (default: `10` and `18`).
    pub engagement_hours: [u32; 2],
    /// Per-pair Bernoulli sampling probability for exam nudges
    /// (default: `0.1`).
    pub engagement_sample_rate: f64,
}

impl SchedulerConfig {
    /// Load scheduler cadences from environment variables.
    ///
    /// | Env Var                    | Default |
    /// |----------------------------|---------|
    /// | `STREAK_SWEEP_HOUR`        | `0`     |
    /// | `ENGAGEMENT_HOURS`         | `10,18` |
    /// | `ENGAGEMENT_SAMPLE_RATE`   | `0.1`   |
    pub fn from_env() -> Self {
        let sweep_hour: u32 = std::env::var("STREAK_SWEEP_HOUR")
            .unwrap_or_else(|_| "0".into())
            .parse()
            .expect("STREAK_SWEEP_HOUR must be an hour 0-23");
        assert!(sweep_hour < 24, "STREAK_SWEEP_HOUR must be an hour 0-23");

        let raw = std::env::var("ENGAGEMENT_HOURS").unwrap_or_else(|_| "10,18".into());
        let hours: Vec<u32> = raw
            .split(',')
            .map(|s| {
                let h: u32 = s
                    .trim()
                    .parse()
                    .expect("ENGAGEMENT_HOURS must be comma-separated hours");
                assert!(h < 24, "ENGAGEMENT_HOURS entries must be hours 0-23");
                h
            })
            .collect();
        assert_eq!(hours.len(), 2, "ENGAGEMENT_HOURS must list exactly two hours");

        let engagement_sample_rate: f64 = std::env::var("ENGAGEMENT_SAMPLE_RATE")
            .unwrap_or_else(|_| "0.1".into())
            .parse()
            .expect("ENGAGEMENT_SAMPLE_RATE must be a float");
        assert!(
            (0.0..=1.0).contains(&engagement_sample_rate),
            "ENGAGEMENT_SAMPLE_RATE must be in [0, 1]"
        );

        Self {
            sweep_hour,
            engagement_hours: [hours[0], hours[1]],
            engagement_sample_rate,
        }
    }
}
