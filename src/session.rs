//! 会话上下文
//!
//! 身份提供方持有真正的会话；这里只是一个显式传递的上下文对象，
//! 携带认证标志、用户资料以及按需获取令牌的能力。

use crate::error::{PortalError, PortalResult};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// 用户资料（来自身份提供方的 id token 声明）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UserProfile {
    /// 主体标识 (subject identifier)，即 `homeowner_id`
    pub sub: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

impl UserProfile {
    /// 用于问候语等界面显示
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.sub)
    }
}

/// 按需提供 bearer token
///
/// 每次 API 调用前都会重新调用，核心层不缓存令牌。
#[async_trait::async_trait(?Send)]
pub trait TokenSource {
    async fn access_token(&self) -> PortalResult<String>;
}

#[async_trait::async_trait(?Send)]
impl<T: TokenSource + ?Sized> TokenSource for Rc<T> {
    async fn access_token(&self) -> PortalResult<String> {
        (**self).access_token().await
    }
}

/// 固定令牌，用于测试和脚本
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

#[async_trait::async_trait(?Send)]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> PortalResult<String> {
        if self.0.is_empty() {
            return Err(PortalError::unauthorized("no access token available"));
        }
        Ok(self.0.clone())
    }
}

#[derive(Clone)]
pub struct SessionContext<T: TokenSource> {
    profile: Option<UserProfile>,
    tokens: T,
}

impl<T: TokenSource> SessionContext<T> {
    pub fn authenticated(profile: UserProfile, tokens: T) -> Self {
        Self {
            profile: Some(profile),
            tokens,
        }
    }

    pub fn anonymous(tokens: T) -> Self {
        Self {
            profile: None,
            tokens,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.profile.is_some()
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    /// 当前会话的主体标识
    pub fn subject_id(&self) -> PortalResult<&str> {
        self.profile
            .as_ref()
            .map(|p| p.sub.as_str())
            .ok_or_else(|| PortalError::unauthorized("no authenticated session"))
    }

    pub fn tokens(&self) -> &T {
        &self.tokens
    }

    pub async fn access_token(&self) -> PortalResult<String> {
        if !self.is_authenticated() {
            return Err(PortalError::unauthorized("no authenticated session"));
        }
        self.tokens.access_token().await
    }
}

/// 未认证的会话不会向下游索取令牌
#[async_trait::async_trait(?Send)]
impl<T: TokenSource> TokenSource for SessionContext<T> {
    async fn access_token(&self) -> PortalResult<String> {
        SessionContext::access_token(self).await
    }
}
