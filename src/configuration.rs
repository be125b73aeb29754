use crate::error::ConfigError;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub environment: String,
    pub api_prefix: String,
    pub api_version: String,
    pub log_level: String,
}

impl ApplicationSettings {
    /// Path every route is mounted under, e.g. `/api/v1`.
    pub fn base_path(&self) -> String {
        format!(
            "{}/{}",
            self.api_prefix.trim_end_matches('/'),
            self.api_version.trim_matches('/')
        )
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }

    pub fn connection_string_without_db(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port
        )
    }
}

/// Token signing and credential hashing settings
#[derive(serde::Deserialize, Clone)]
pub struct AuthSettings {
    pub secret_key: String,
    pub access_token_expire_minutes: i64,
    pub refresh_token_expire_minutes: i64,
    #[serde(default = "default_hash_cost")]
    pub hash_cost: u32,
}

fn default_hash_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

/// One year
const MAX_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 365;

impl AuthSettings {
    /// Reject settings that would mint unusable tokens or fail at hash time
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret_key.trim().is_empty() {
            return Err(ConfigError::MissingRequired("auth.secret_key".to_string()));
        }

        for (key, minutes) in [
            ("auth.access_token_expire_minutes", self.access_token_expire_minutes),
            ("auth.refresh_token_expire_minutes", self.refresh_token_expire_minutes),
        ] {
            if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&minutes) {
                return Err(ConfigError::InvalidValue(
                    key.to_string(),
                    format!("must be between 1 and {} minutes, got {}", MAX_TOKEN_TTL_MINUTES, minutes),
                ));
            }
        }

        if !(4..=31).contains(&self.hash_cost) {
            return Err(ConfigError::InvalidValue(
                "auth.hash_cost".to_string(),
                format!("must be between 4 and 31, got {}", self.hash_cost),
            ));
        }

        Ok(())
    }
}

/// Load settings from defaults, an optional `configuration` file and
/// `APP_`-prefixed environment variables (`APP_AUTH__SECRET_KEY`), in
/// increasing order of precedence.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .set_default("application.host", "127.0.0.1")?
        .set_default("application.port", 8000)?
        .set_default("application.name", "CoreAPI")?
        .set_default("application.environment", "development")?
        .set_default("application.api_prefix", "/api")?
        .set_default("application.api_version", "v1")?
        .set_default("application.log_level", "info")?
        .set_default("database.username", "postgres")?
        .set_default("database.password", "password")?
        .set_default("database.port", 5432)?
        .set_default("database.host", "localhost")?
        .set_default("database.database_name", "coreapi")?
        .set_default("auth.secret_key", "changeme")?
        .set_default("auth.access_token_expire_minutes", 30)?
        .set_default("auth.refresh_token_expire_minutes", 10080)?
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let settings = settings.try_deserialize::<Settings>()?;
    settings.auth.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configuration() {
        let settings = get_configuration().expect("defaults should load");

        assert_eq!(settings.application.api_prefix, "/api");
        assert_eq!(settings.application.api_version, "v1");
        assert!(settings.auth.access_token_expire_minutes > 0);
        assert!(settings.auth.refresh_token_expire_minutes > settings.auth.access_token_expire_minutes);
    }

    #[test]
    fn test_base_path() {
        let mut settings = get_configuration().expect("defaults should load").application;
        settings.api_prefix = "/api/".to_string();
        settings.api_version = "v2".to_string();

        assert_eq!(settings.base_path(), "/api/v2");
    }

    fn auth_settings() -> AuthSettings {
        AuthSettings {
            secret_key: "secret".to_string(),
            access_token_expire_minutes: 30,
            refresh_token_expire_minutes: 10080,
            hash_cost: 4,
        }
    }

    #[test]
    fn test_auth_settings_validation() {
        assert!(auth_settings().validate().is_ok());

        let mut empty_secret = auth_settings();
        empty_secret.secret_key = "  ".to_string();
        assert!(matches!(empty_secret.validate(), Err(ConfigError::MissingRequired(_))));

        let mut zero_ttl = auth_settings();
        zero_ttl.access_token_expire_minutes = 0;
        assert!(matches!(zero_ttl.validate(), Err(ConfigError::InvalidValue(key, _)) if key == "auth.access_token_expire_minutes"));

        let mut negative_ttl = auth_settings();
        negative_ttl.refresh_token_expire_minutes = -5;
        assert!(matches!(negative_ttl.validate(), Err(ConfigError::InvalidValue(_, _))));

        let mut huge_ttl = auth_settings();
        huge_ttl.refresh_token_expire_minutes = i64::MAX;
        assert!(matches!(huge_ttl.validate(), Err(ConfigError::InvalidValue(_, _))));

        let mut bad_cost = auth_settings();
        bad_cost.hash_cost = 2;
        assert!(matches!(bad_cost.validate(), Err(ConfigError::InvalidValue(_, _))));
    }

    #[test]
    fn test_connection_string() {
        let database = DatabaseSettings {
            username: "user".to_string(),
            password: "pw".to_string(),
            port: 5432,
            host: "db".to_string(),
            database_name: "core".to_string(),
        };

        assert_eq!(database.connection_string(), "postgres://user:pw@db:5432/core");
        assert_eq!(database.connection_string_without_db(), "postgres://user:pw@db:5432");
    }
}
