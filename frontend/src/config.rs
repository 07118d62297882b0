//! 构建期配置
//!
//! 浏览器中没有进程环境变量，配置在编译时通过 `option_env!` 注入，
//! 例如 `PORTAL_AUTH_DOMAIN=tenant.us.auth0.com trunk build`。

use maintenance_portal::config::{
    ConfigError, PortalConfig, VAR_API_BASE_URL, VAR_AUTH_AUDIENCE, VAR_AUTH_CLIENT_ID,
    VAR_AUTH_DOMAIN, VAR_AUTH_SCOPE,
};

fn build_var(name: &str) -> Option<String> {
    let value = match name {
        VAR_API_BASE_URL => option_env!("PORTAL_API_BASE_URL"),
        VAR_AUTH_DOMAIN => option_env!("PORTAL_AUTH_DOMAIN"),
        VAR_AUTH_CLIENT_ID => option_env!("PORTAL_AUTH_CLIENT_ID"),
        VAR_AUTH_AUDIENCE => option_env!("PORTAL_AUTH_AUDIENCE"),
        VAR_AUTH_SCOPE => option_env!("PORTAL_AUTH_SCOPE"),
        _ => None,
    };
    value.map(str::to_string)
}

pub fn load() -> Result<PortalConfig, ConfigError> {
    PortalConfig::from_source(&build_var)
}
