//! Runtime configuration read from the environment

use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Path of the redb file holding click counters
    pub database_url: String,
    pub public_dir: PathBuf,
    pub supabase_url: Option<String>,
    pub supabase_anon_key: String,
    pub service_role_key: Option<String>,
    /// Lower-cased emails allowed to bootstrap an admin profile
    pub admin_emails: Vec<String>,
    pub storage_bucket: String,
    pub whatsapp_number: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            database_url: "clicks.db".to_string(),
            public_dir: PathBuf::from("public"),
            supabase_url: None,
            supabase_anon_key: String::new(),
            service_role_key: None,
            admin_emails: Vec::new(),
            storage_bucket: "product-images".to_string(),
            whatsapp_number: "233540460532".to_string(),
        }
    }
}

impl Config {
    /// Reads the configuration from the environment.
    ///
    /// # Environment Variables
    ///
    /// - `PORT` - Server port number (default: 3000)
    /// - `DATABASE_URL` - Path to the click counter file (default: "clicks.db")
    /// - `PUBLIC_DIR` - Static site directory (default: "public")
    /// - `SUPABASE_URL` - Hosted project URL; unset means the in-memory data service
    /// - `SUPABASE_ANON_KEY` - Public key handed to browsers by `GET /config`
    /// - `SUPABASE_SERVICE_ROLE` (or `SERVICE_KEY`) - Key for admin writes
    /// - `ADMIN_EMAILS` - Comma separated emails allowed to bootstrap an admin
    /// - `STORAGE_BUCKET` - Bucket for product images (default: "product-images")
    /// - `WHATSAPP_NUMBER` - Fallback order number (default: "233540460532")
    ///
    /// Unparseable values are logged and replaced by their default.
    pub fn load() -> Self {
        let defaults = Self::default();

        let service_role_key = optional("SUPABASE_SERVICE_ROLE").or_else(|| optional("SERVICE_KEY"));
        if service_role_key.is_none() {
            warn!("SUPABASE_SERVICE_ROLE not set; admin operations are disabled");
        }

        Self {
            port: try_load("PORT", defaults.port),
            database_url: try_load("DATABASE_URL", defaults.database_url),
            public_dir: PathBuf::from(try_load(
                "PUBLIC_DIR",
                defaults.public_dir.to_string_lossy().into_owned(),
            )),
            supabase_url: optional("SUPABASE_URL"),
            supabase_anon_key: optional("SUPABASE_ANON_KEY").unwrap_or_default(),
            service_role_key,
            admin_emails: parse_email_list(&optional("ADMIN_EMAILS").unwrap_or_default()),
            storage_bucket: try_load("STORAGE_BUCKET", defaults.storage_bucket),
            whatsapp_number: try_load("WHATSAPP_NUMBER", defaults.whatsapp_number),
        }
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn try_load<T: FromStr + Display>(key: &str, default: T) -> T
where
    T::Err: Display,
{
    match optional(key) {
        None => {
            info!("{key} not set, using default: {default}");
            default
        }
        Some(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value: {e}, using default: {default}");
            default
        }),
    }
}

pub fn parse_email_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_list_is_trimmed_and_lowercased() {
        assert_eq!(
            parse_email_list(" Owner@Shop.com, ,ops@shop.com "),
            vec!["owner@shop.com", "ops@shop.com"]
        );
    }
}
