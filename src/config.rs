use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: IpAddr,
    pub http_port: u16,
    pub log_level: String,
    pub command_queue_size: usize,
    pub event_buffer_size: usize,
    pub sim_tick: Duration,
    pub store_path: PathBuf,
    pub static_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        let sim_tick_ms: u64 = parse_or_default("SIM_TICK_MS", 3000)?;
        if sim_tick_ms == 0 {
            return Err(AppError::Internal("invalid SIM_TICK_MS: must be > 0".to_string()));
        }

        Ok(Self {
            bind_addr: parse_or_default("BIND_ADDR", IpAddr::from([127, 0, 0, 1]))?,
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            command_queue_size: parse_or_default("COMMAND_QUEUE_SIZE", 256)?,
            event_buffer_size: parse_or_default("EVENT_BUFFER_SIZE", 256)?,
            sim_tick: Duration::from_millis(sim_tick_ms),
            store_path: env::var("STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("rapidingo-store.json")),
            static_dir: env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("static")),
        })
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
