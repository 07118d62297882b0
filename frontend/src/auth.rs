//! 认证模块 (Session Provider)
//!
//! 登录与注销都是到身份提供方的整页跳转。回跳时令牌在 URL fragment 中，
//! 这里负责取出令牌、核对 state 与 nonce、保存到 SessionStorage，并维护认证信号。
//! 路由服务通过注入的认证信号来检查认证状态。

use crate::web::SessionStore;
use crate::web::router::replace_history_state;
use leptos::prelude::*;
use maintenance_portal::{
    PendingLogin, PortalConfig, PortalError, PortalResult, SessionContext, TokenGrant, TokenSource,
    UserProfile,
};

const GRANT_KEY: &str = "portal.grant";
const PENDING_LOGIN_KEY: &str = "portal.pending_login";

/// 回跳后的落地页
const LOGIN_LANDING_PATH: &str = "/dashboard";

const LOGIN_FAILED_MESSAGE: &str = "Login could not be completed. Please try again.";
const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

fn now_ms() -> i64 {
    js_sys::Date::now() as i64
}

fn origin() -> Option<String> {
    web_sys::window()?.location().origin().ok()
}

fn redirect(url: &str) {
    let assigned = web_sys::window().map(|w| w.location().assign(url));
    if !matches!(assigned, Some(Ok(()))) {
        log::error!("[Auth] failed to redirect to {}", url);
    }
}

/// 认证状态
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthState {
    /// 已认证用户的资料，`None` 表示未登录
    pub profile: Option<UserProfile>,
    /// 最近一次登录失败或会话过期的提示
    pub error: Option<String>,
}

/// 认证上下文
///
/// 包含读写信号，通过 Context 在组件间共享。
#[derive(Clone, Copy)]
pub struct AuthContext {
    pub state: ReadSignal<AuthState>,
    pub set_state: WriteSignal<AuthState>,
    config: StoredValue<PortalConfig>,
}

impl AuthContext {
    pub fn new(config: PortalConfig) -> Self {
        let (state, set_state) = signal(AuthState::default());
        Self {
            state,
            set_state,
            config: StoredValue::new(config),
        }
    }

    /// 获取认证状态信号（用于路由服务注入）
    pub fn is_authenticated_signal(&self) -> Signal<bool> {
        let state = self.state;
        Signal::derive(move || state.with(|s| s.profile.is_some()))
    }

    pub fn config(&self) -> PortalConfig {
        self.config.get_value()
    }

    /// 当前会话的快照，令牌仍在每次调用时重新读取
    pub fn session(&self) -> SessionContext<BrowserTokenSource> {
        let tokens = BrowserTokenSource {
            set_state: self.set_state,
        };
        match self.state.get_untracked().profile {
            Some(profile) => SessionContext::authenticated(profile, tokens),
            None => SessionContext::anonymous(tokens),
        }
    }
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}

/// 初始化认证状态：先处理登录回跳，再恢复已保存的会话
pub fn init_auth(ctx: &AuthContext) {
    if !complete_login(ctx) {
        restore_session(ctx);
    }
}

/// 消费 URL fragment 中的登录结果，返回是否处理了回跳
fn complete_login(ctx: &AuthContext) -> bool {
    let Some(location) = web_sys::window().map(|w| w.location()) else {
        return false;
    };
    let hash = location.hash().unwrap_or_default();
    if hash.len() <= 1 {
        return false;
    }

    let outcome = TokenGrant::from_fragment(&hash, now_ms());
    if matches!(outcome, Ok(None)) {
        return false;
    }

    // fragment 中是令牌或错误信息，都不应留在地址栏
    let path = location.pathname().unwrap_or_else(|_| "/".to_string());
    replace_history_state(&path);

    let pending = SessionStore::get_json::<PendingLogin>(PENDING_LOGIN_KEY);
    SessionStore::delete(PENDING_LOGIN_KEY);

    match outcome.and_then(|grant| accept_grant(grant, pending.as_ref())) {
        Ok(profile) => {
            log::info!("[Auth] logged in as {}", profile.sub);
            ctx.set_state.set(AuthState {
                profile: Some(profile),
                error: None,
            });
        }
        Err(e) => {
            log::error!("[Auth] login callback rejected: {}", e);
            ctx.set_state.set(AuthState {
                profile: None,
                error: Some(LOGIN_FAILED_MESSAGE.to_string()),
            });
        }
    }
    true
}

fn accept_grant(grant: Option<TokenGrant>, pending: Option<&PendingLogin>) -> PortalResult<UserProfile> {
    let grant = grant.ok_or_else(|| PortalError::unauthorized("no token in callback"))?;
    let profile = grant.accept(pending).map_err(|e| e.in_op("auth.callback"))?;
    if !SessionStore::set_json(GRANT_KEY, &grant) {
        log::warn!("[Auth] session storage unavailable, session will not survive reload");
    }
    Ok(profile)
}

fn restore_session(ctx: &AuthContext) {
    let Some(grant) = SessionStore::get_json::<TokenGrant>(GRANT_KEY) else {
        return;
    };
    if grant.is_expired(now_ms()) {
        log::info!("[Auth] stored session expired");
        SessionStore::delete(GRANT_KEY);
        return;
    }
    match grant.profile() {
        Ok(profile) => ctx.set_state.set(AuthState {
            profile: Some(profile),
            error: None,
        }),
        Err(e) => {
            log::warn!("[Auth] discarding stored session: {}", e);
            SessionStore::delete(GRANT_KEY);
        }
    }
}

/// 跳转到身份提供方登录
pub fn login(ctx: &AuthContext) {
    let Some(origin) = origin() else {
        return;
    };
    let redirect_uri = format!("{}{}", origin, LOGIN_LANDING_PATH);

    match ctx.config().identity.login_redirect(&redirect_uri) {
        Ok(login) => {
            if !SessionStore::set_json(PENDING_LOGIN_KEY, &login.pending()) {
                log::warn!("[Auth] session storage unavailable, login cannot be verified");
            }
            redirect(&login.url);
        }
        Err(e) => {
            log::error!("[Auth] cannot build login redirect: {}", e);
            ctx.set_state.update(|s| s.error = Some(LOGIN_FAILED_MESSAGE.to_string()));
        }
    }
}

/// 清除本地会话并跳转到身份提供方注销
pub fn logout(ctx: &AuthContext) {
    SessionStore::delete(GRANT_KEY);
    ctx.set_state.set(AuthState::default());

    let Some(origin) = origin() else {
        return;
    };
    match ctx.config().identity.logout_url(&origin) {
        Ok(url) => redirect(&url),
        Err(e) => log::error!("[Auth] cannot build logout redirect: {}", e),
    }
}

// =========================================================
// 令牌来源
// =========================================================

/// 每次调用都从 SessionStorage 重新读取令牌；过期时注销当前用户
#[derive(Clone, Copy)]
pub struct BrowserTokenSource {
    set_state: WriteSignal<AuthState>,
}

#[async_trait::async_trait(?Send)]
impl TokenSource for BrowserTokenSource {
    async fn access_token(&self) -> PortalResult<String> {
        let grant = SessionStore::get_json::<TokenGrant>(GRANT_KEY)
            .ok_or_else(|| PortalError::unauthorized("no stored session"))?;

        if grant.is_expired(now_ms()) {
            SessionStore::delete(GRANT_KEY);
            let _ = self.set_state.try_set(AuthState {
                profile: None,
                error: Some(SESSION_EXPIRED_MESSAGE.to_string()),
            });
            return Err(PortalError::unauthorized("access token expired"));
        }
        Ok(grant.access_token)
    }
}
