use domain::Tenancy;
use std::env;
use std::net::{IpAddr, SocketAddr};
use thiserror::Error;

pub const DEFAULT_API_PREFIX: &str = "/api/todos";
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = [
    "https://todo-app-taupe-chi-60.vercel.app",
    "http://localhost:5173",
];

/// 設定読み込みエラー
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// 永続化先
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    DynamoDb,
    /// ローカル開発用。プロセス終了でデータは失われる
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub api_prefix: String,
    pub tenancy: Tenancy,
    pub store_backend: StoreBackend,
    pub dynamodb_table: String,
    pub dynamodb_endpoint: Option<String>,
    pub aws_region: Option<String>,
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 任意のキー参照関数から設定を構築（テスト用に環境変数を差し替えられる）
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = match lookup("HOST") {
            Some(v) => v.parse().map_err(|_| ConfigError::InvalidValue {
                key: "HOST",
                value: v,
            })?,
            None => IpAddr::from([0, 0, 0, 0]),
        };

        let port = match lookup("PORT") {
            Some(v) => v.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT",
                value: v,
            })?,
            None => 3001,
        };

        let tenancy = match lookup("TENANCY_MODE") {
            Some(v) => v.parse().map_err(|_| ConfigError::InvalidValue {
                key: "TENANCY_MODE",
                value: v,
            })?,
            None => Tenancy::Multi,
        };

        let store_backend = match lookup("STORE_BACKEND").as_deref() {
            None | Some("dynamodb") => StoreBackend::DynamoDb,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "STORE_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let api_prefix = lookup("API_PREFIX").unwrap_or_else(|| DEFAULT_API_PREFIX.to_string());
        if !api_prefix.is_empty() && !api_prefix.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                key: "API_PREFIX",
                value: api_prefix,
            });
        }

        let allowed_origins = match lookup("CORS_ALLOWED_ORIGINS") {
            Some(v) => v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect(),
        };

        Ok(Config {
            host,
            port,
            api_prefix,
            tenancy,
            store_backend,
            dynamodb_table: lookup("DYNAMODB_TABLE").unwrap_or_else(|| "todos".to_string()),
            dynamodb_endpoint: lookup("DYNAMODB_ENDPOINT"),
            aws_region: lookup("AWS_REGION"),
            allowed_origins,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.port, 3001);
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:3001");
        assert_eq!(config.api_prefix, "/api/todos");
        assert_eq!(config.tenancy, Tenancy::Multi);
        assert_eq!(config.store_backend, StoreBackend::DynamoDb);
        assert_eq!(config.dynamodb_table, "todos");
        assert!(config.dynamodb_endpoint.is_none());
        assert_eq!(config.allowed_origins.len(), 2);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("HOST", "127.0.0.1"),
            ("TENANCY_MODE", "single"),
            ("STORE_BACKEND", "memory"),
            ("DYNAMODB_ENDPOINT", "http://localhost:8000"),
            ("CORS_ALLOWED_ORIGINS", "http://a.example, http://b.example,"),
        ])
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8080");
        assert_eq!(config.tenancy, Tenancy::Single);
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(
            config.dynamodb_endpoint.as_deref(),
            Some("http://localhost:8000")
        );
        assert_eq!(
            config.allowed_origins,
            vec!["http://a.example".to_string(), "http://b.example".to_string()]
        );
    }

    #[test]
    fn test_invalid_values() {
        assert!(config_from(&[("PORT", "abc")]).is_err());
        assert!(config_from(&[("TENANCY_MODE", "both")]).is_err());
        assert!(config_from(&[("STORE_BACKEND", "mongo")]).is_err());
        assert!(config_from(&[("API_PREFIX", "api")]).is_err());
    }
}
