use crate::identity::{DEFAULT_SCOPE, IdentityConfig};

// =========================================================
// 动态运行时配置 (Runtime Configuration)
// =========================================================

/// 缺省值：未配置时使用
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";

pub const VAR_API_BASE_URL: &str = "PORTAL_API_BASE_URL";
pub const VAR_AUTH_DOMAIN: &str = "PORTAL_AUTH_DOMAIN";
pub const VAR_AUTH_CLIENT_ID: &str = "PORTAL_AUTH_CLIENT_ID";
pub const VAR_AUTH_AUDIENCE: &str = "PORTAL_AUTH_AUDIENCE";
pub const VAR_AUTH_SCOPE: &str = "PORTAL_AUTH_SCOPE";

/// 配置来源（构建期环境变量、测试用 map 等）
pub trait VarSource {
    fn var(&self, name: &str) -> Option<String>;
}

impl<F> VarSource for F
where
    F: Fn(&str) -> Option<String>,
{
    fn var(&self, name: &str) -> Option<String> {
        self(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    /// 后端 API 根地址（无结尾 `/`）
    pub api_base_url: String,
    pub identity: IdentityConfig,
}

impl PortalConfig {
    pub fn from_source(source: &impl VarSource) -> Result<Self, ConfigError> {
        let lookup = |name: &str| {
            source
                .var(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));

        let api_base_url = lookup(VAR_API_BASE_URL)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                name: VAR_API_BASE_URL,
                reason: format!("'{}' is not an http(s) URL", api_base_url),
            });
        }

        Ok(Self {
            api_base_url,
            identity: IdentityConfig {
                domain: required(VAR_AUTH_DOMAIN)?,
                client_id: required(VAR_AUTH_CLIENT_ID)?,
                audience: required(VAR_AUTH_AUDIENCE)?,
                scope: lookup(VAR_AUTH_SCOPE).unwrap_or_else(|| DEFAULT_SCOPE.to_string()),
            },
        })
    }
}
