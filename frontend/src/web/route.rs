//! 路由定义模块 - 领域模型
//!
//! 这是纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由及其属性。

use maintenance_portal_shared::RequestId;
use std::fmt::Display;

/// 应用路由枚举
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 公开首页 (默认路由)
    #[default]
    Home,
    /// 房主控制面板 (需要认证)
    Dashboard,
    /// 单条维修请求详情 (需要认证)
    RequestDetail(RequestId),
    /// 页面未找到
    NotFound,
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Self::Home,
            "/dashboard" => Self::Dashboard,
            _ => match trimmed.strip_prefix("/requests/") {
                Some(segment) if !segment.is_empty() && !segment.contains('/') => {
                    RequestId::from_path_segment(segment)
                        .map(Self::RequestDetail)
                        .unwrap_or(Self::NotFound)
                }
                _ => Self::NotFound,
            },
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Dashboard => "/dashboard".to_string(),
            Self::RequestDetail(id) => format!("/requests/{}", id.to_path_segment()),
            Self::NotFound => "/404".to_string(),
        }
    }

    /// **核心守卫逻辑：定义该路由是否需要认证**
    pub fn requires_auth(&self) -> bool {
        matches!(self, Self::Dashboard | Self::RequestDetail(_))
    }

    /// 获取认证失败时的重定向目标
    pub fn auth_failure_redirect() -> Self {
        Self::Home
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_paths() {
        assert_eq!(AppRoute::from_path("/"), AppRoute::Home);
        assert_eq!(AppRoute::from_path(""), AppRoute::Home);
        assert_eq!(AppRoute::from_path("/dashboard/"), AppRoute::Dashboard);
        assert_eq!(
            AppRoute::from_path("/requests/65a1f0"),
            AppRoute::RequestDetail(RequestId::from("65a1f0".to_string()))
        );
    }

    #[test]
    fn unknown_paths_are_not_found() {
        assert_eq!(AppRoute::from_path("/requests/"), AppRoute::NotFound);
        assert_eq!(AppRoute::from_path("/requests/a/b"), AppRoute::NotFound);
        assert_eq!(AppRoute::from_path("/login"), AppRoute::NotFound);
    }

    #[test]
    fn path_round_trip() {
        let route = AppRoute::RequestDetail(RequestId::from("65a1f0".to_string()));
        assert_eq!(AppRoute::from_path(&route.to_path()), route);
    }

    #[test]
    fn id_with_reserved_characters_stays_one_segment() {
        let route = AppRoute::RequestDetail(RequestId::from("a/b?c#d".to_string()));
        assert_eq!(route.to_path(), "/requests/a%2Fb%3Fc%23d");
        assert_eq!(AppRoute::from_path(&route.to_path()), route);
    }

    #[test]
    fn undecodable_id_is_not_found() {
        assert_eq!(AppRoute::from_path("/requests/%FF"), AppRoute::NotFound);
    }

    #[test]
    fn only_homeowner_pages_are_guarded() {
        assert!(!AppRoute::Home.requires_auth());
        assert!(!AppRoute::NotFound.requires_auth());
        assert!(AppRoute::Dashboard.requires_auth());
        assert!(AppRoute::from_path("/requests/x").requires_auth());
    }
}
