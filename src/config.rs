use dotenvy;

#[derive(Debug)]
pub struct AppConfig {
    pub db_namespace: String,
    pub db_database: String,
    pub db_password: Option<String>,
    pub db_username: Option<String>,
    pub db_url: String,
    pub jwt_secret: String,
    pub verification_code_ttl: u8,
    pub wallet_nonce_ttl: u8,
    pub is_development: bool,
    pub sendgrid_api_key: String,
    pub sendgrid_api_url: String,
    pub no_reply_email: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let db_namespace = std::env::var("DB_NAMESPACE").unwrap_or("namespace".to_string());
        let db_database = std::env::var("DB_DATABASE").unwrap_or("database".to_string());
        let db_password = std::env::var("DB_PASSWORD").ok();
        let db_username = std::env::var("DB_USERNAME").ok();
        let db_url = std::env::var("DB_URL").expect("Missing DB_URL in env");

        let jwt_secret = std::env::var("JWT_SECRET").expect("Missing JWT_SECRET in env");

        let verification_code_ttl = std::env::var("EMAIL_CODE_TIME_TO_LIVE")
            .unwrap_or("10".to_string())
            .parse::<u8>()
            .expect("EMAIL_CODE_TIME_TO_LIVE must be number");

        let wallet_nonce_ttl = std::env::var("WALLET_NONCE_TIME_TO_LIVE")
            .unwrap_or("5".to_string())
            .parse::<u8>()
            .expect("WALLET_NONCE_TIME_TO_LIVE must be number");

        let sendgrid_api_key = std::env::var("SENDGRID_API_KEY").unwrap_or_default();
        let no_reply_email = std::env::var("NO_REPLY_EMAIL").unwrap_or_default();
        let sendgrid_api_url = std::env::var("SENDGRID_API_URL")
            .unwrap_or("https://api.sendgrid.com/v3/mail/send".to_string());

        let is_development = std::env::var("DEVELOPMENT")
            .map(|v| v.eq("true"))
            .unwrap_or(false);

        Self {
            db_namespace,
            db_database,
            db_password,
            db_username,
            db_url,
            jwt_secret,
            verification_code_ttl,
            wallet_nonce_ttl,
            is_development,
            sendgrid_api_key,
            sendgrid_api_url,
            no_reply_email,
        }
    }
}
