use std::net::IpAddr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct Config {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub host: IpAddr,
    pub port: u16,
    pub site_url: String,
    pub storage_dir: PathBuf,
    pub environment: Environment,
    pub company_name: String,
    pub log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let supabase_url = env_required("SUPABASE_URL")?;
        let supabase_anon_key = env_required("SUPABASE_ANON_KEY")?;

        let host: IpAddr = env_or("PORTAL_HOST", "127.0.0.1")
            .parse()
            .map_err(|e| format!("Invalid PORTAL_HOST: {e}"))?;

        let port: u16 = env_or("PORTAL_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid PORTAL_PORT: {e}"))?;

        let site_url = env_or("PORTAL_SITE_URL", &format!("http://{host}:{port}"));

        let storage_dir = PathBuf::from(env_or("PORTAL_STORAGE_DIR", ".portal"));

        let environment = match env_or("PORTAL_ENV", "development").as_str() {
            "development" => Environment::Development,
            "staging" => Environment::Staging,
            "production" => Environment::Production,
            other => return Err(format!("Invalid PORTAL_ENV: {other}")),
        };

        let company_name = env_or("PORTAL_COMPANY_NAME", "IngenieríaCopilot");
        let log_level = env_or("PORTAL_LOG_LEVEL", "info");

        Ok(Config {
            supabase_url,
            supabase_anon_key,
            host,
            port,
            site_url,
            storage_dir,
            environment,
            company_name,
            log_level,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
