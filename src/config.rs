use std::env;

#[derive(Clone)]
pub struct AppConfig {
    pub server_port: u16,
    pub sqlite_path: String,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub token_header: String,
    pub token_ttl_days: i64,
    pub sendgrid_api_key: String,
    pub project_email_address: String,
    pub recovery_link_base: String,
    pub confirm_link_base: String,
    pub telegram_bot_token: String,
    pub telegram_bot_host: String,
    pub admin_host: String,
    pub storage: StorageConfig,
    pub defaults: StoreDefaults,
}

#[derive(Clone)]
pub struct StorageConfig {
    pub bucket: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub public_url_base: String,
}

// Creation-time defaults handed to the record stores, overridable per
// instance.
#[derive(Clone)]
pub struct StoreDefaults {
    pub avatar_url: String,
    pub logo_url: String,
    pub block_producer_status: String,
}

impl Default for StoreDefaults {
    fn default() -> Self {
        Self {
            avatar_url: String::new(),
            logo_url: String::new(),
            block_producer_status: "moderation".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let server_port = env::var("SERVER_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(8000);

        let sqlite_path =
            env::var("SQLITE_PATH").unwrap_or_else(|_| "/opt/bp-directory/data.sqlite".to_string());
        let database_url = env::var("DATABASE_URL").ok();

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| "change-me".to_string());
        let token_header = env::var("TOKEN_HEADER").unwrap_or_else(|_| "token".to_string());
        let token_ttl_days = env::var("TOKEN_TTL_DAYS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(7);

        let sendgrid_api_key = env::var("SENDGRID_API_KEY").unwrap_or_default();
        let project_email_address = env::var("PROJECT_EMAIL_ADDRESS")
            .unwrap_or_else(|_| "noreply@directory.com".to_string());
        let recovery_link_base = env::var("RECOVERY_LINK_BASE")
            .unwrap_or_else(|_| "https://directory.com/user/password/recovering".to_string());
        let confirm_link_base = env::var("CONFIRM_LINK_BASE")
            .unwrap_or_else(|_| "https://directory.com/user/email/confirming".to_string());

        let telegram_bot_token = env::var("TELEGRAM_BOT_TOKEN").unwrap_or_default();
        let telegram_bot_host = env::var("TELEGRAM_BOT_HOST").unwrap_or_default();
        let admin_host = env::var("ADMIN_HOST").unwrap_or_default();

        let storage = StorageConfig {
            bucket: env::var("S3_BUCKET").unwrap_or_default(),
            region: env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            access_key: env::var("S3_ACCESS_KEY").unwrap_or_default(),
            secret_key: env::var("S3_SECRET_KEY").unwrap_or_default(),
            public_url_base: env::var("S3_PUBLIC_URL_BASE").unwrap_or_default(),
        };

        let defaults = StoreDefaults {
            avatar_url: env::var("DEFAULT_AVATAR_URL").unwrap_or_default(),
            logo_url: env::var("DEFAULT_LOGO_URL").unwrap_or_default(),
            block_producer_status: env::var("DEFAULT_BLOCK_PRODUCER_STATUS")
                .unwrap_or_else(|_| "moderation".to_string()),
        };

        Self {
            server_port,
            sqlite_path,
            database_url,
            jwt_secret,
            token_header,
            token_ttl_days,
            sendgrid_api_key,
            project_email_address,
            recovery_link_base,
            confirm_link_base,
            telegram_bot_token,
            telegram_bot_host,
            admin_host,
            storage,
            defaults,
        }
    }

    pub fn database_url(&self) -> String {
        if let Some(url) = &self.database_url {
            return url.clone();
        }

        let path = self.sqlite_path.trim();
        if path.starts_with("sqlite:") || path.starts_with("file:") {
            return path.to_string();
        }
        format!("sqlite://{}", path)
    }
}
