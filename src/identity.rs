//! 身份提供方对接
//!
//! 登录、注销、令牌签发都在外部身份提供方完成，这里只负责：
//! - 构造跳转地址（authorize / logout）
//! - 解析回跳 URL fragment 中的令牌
//! - 读取 id token 中用于显示的声明（不校验签名，后端负责校验）

use crate::error::{PortalError, PortalResult};
use crate::session::UserProfile;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_SCOPE: &str = "openid profile email";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityConfig {
    /// 租户域名，如 `tenant.us.auth0.com`
    pub domain: String,
    pub client_id: String,
    /// 后端 API 的 audience
    pub audience: String,
    pub scope: String,
}

/// 一次登录跳转：目标地址及需要在回跳时核对的 state / nonce
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRedirect {
    pub url: String,
    pub state: String,
    pub nonce: String,
}

impl LoginRedirect {
    /// 跳转前需要保存下来的部分
    pub fn pending(&self) -> PendingLogin {
        PendingLogin {
            state: self.state.clone(),
            nonce: self.nonce.clone(),
        }
    }
}

/// 跳转期间保存在浏览器中的 state / nonce
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingLogin {
    pub state: String,
    pub nonce: String,
}

impl IdentityConfig {
    fn base_url(&self) -> PortalResult<Url> {
        let host = self
            .domain
            .trim()
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/');
        Url::parse(&format!("https://{}/", host)).map_err(|e| {
            PortalError::config(format!("invalid identity domain '{}'", self.domain)).with_source(e)
        })
    }

    /// 生成新的 state / nonce 并构造登录跳转
    pub fn login_redirect(&self, redirect_uri: &str) -> PortalResult<LoginRedirect> {
        let state = uuid::Uuid::new_v4().simple().to_string();
        let nonce = uuid::Uuid::new_v4().simple().to_string();
        let url = self.authorize_url(redirect_uri, &state, &nonce)?;
        Ok(LoginRedirect { url, state, nonce })
    }

    pub fn authorize_url(&self, redirect_uri: &str, state: &str, nonce: &str) -> PortalResult<String> {
        let mut url = self.base_url()?;
        url.set_path("authorize");
        url.query_pairs_mut()
            .append_pair("response_type", "token id_token")
            .append_pair("client_id", &self.client_id)
            .append_pair("audience", &self.audience)
            .append_pair("scope", &self.scope)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("state", state)
            .append_pair("nonce", nonce);
        Ok(url.into())
    }

    pub fn logout_url(&self, return_to: &str) -> PortalResult<String> {
        let mut url = self.base_url()?;
        url.set_path("v2/logout");
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("returnTo", return_to);
        Ok(url.into())
    }
}

// =========================================================
// 回跳令牌 (Token Grant)
// =========================================================

/// 身份提供方通过 URL fragment 返回的令牌
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub id_token: Option<String>,
    /// 过期时刻（Unix 毫秒），缺省表示未知
    pub expires_at_ms: Option<i64>,
    pub state: Option<String>,
}

impl TokenGrant {
    /// 解析 `#access_token=..&id_token=..&expires_in=..&state=..`
    ///
    /// `now_ms` 用于把相对的 `expires_in` 换算成绝对时刻。
    /// 返回 `Ok(None)` 表示 fragment 中没有登录结果。
    pub fn from_fragment(fragment: &str, now_ms: i64) -> PortalResult<Option<Self>> {
        let fragment = fragment.trim_start_matches('#');
        let mut access_token = None;
        let mut id_token = None;
        let mut expires_in = None;
        let mut state = None;
        let mut error = None;
        let mut error_description = None;

        for (key, value) in url::form_urlencoded::parse(fragment.as_bytes()) {
            match key.as_ref() {
                "access_token" => access_token = Some(value.into_owned()),
                "id_token" => id_token = Some(value.into_owned()),
                "expires_in" => expires_in = value.parse::<i64>().ok(),
                "state" => state = Some(value.into_owned()),
                "error" => error = Some(value.into_owned()),
                "error_description" => error_description = Some(value.into_owned()),
                _ => {}
            }
        }

        if let Some(error) = error {
            let detail = error_description.unwrap_or_default();
            return Err(PortalError::unauthorized(format!("{}: {}", error, detail))
                .in_op("identity.callback"));
        }

        Ok(access_token.map(|access_token| Self {
            access_token,
            id_token,
            expires_at_ms: expires_in.and_then(|secs| expiry_ms(now_ms, secs)),
            state,
        }))
    }

    /// 核对回跳结果属于本次登录：`state` 与 fragment 一致，`nonce` 与 id token 一致
    pub fn accept(&self, pending: Option<&PendingLogin>) -> PortalResult<UserProfile> {
        let Some(pending) = pending else {
            return Err(PortalError::unauthorized("no login in progress").in_op("identity.accept"));
        };
        if self.state.as_deref() != Some(pending.state.as_str()) {
            return Err(PortalError::unauthorized("login state mismatch").in_op("identity.accept"));
        }
        let id_token = self.id_token()?;
        let claims: NonceClaim = decode_payload(id_token)?;
        if claims.nonce.as_deref() != Some(pending.nonce.as_str()) {
            return Err(PortalError::unauthorized("id token nonce mismatch").in_op("identity.accept"));
        }
        decode_claims(id_token)
    }

    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.expires_at_ms.is_some_and(|at| now_ms >= at)
    }

    /// 读取 id token 中的用户声明
    pub fn profile(&self) -> PortalResult<UserProfile> {
        decode_claims(self.id_token()?)
    }

    fn id_token(&self) -> PortalResult<&str> {
        self.id_token
            .as_deref()
            .ok_or_else(|| PortalError::unauthorized("identity provider returned no id token"))
    }
}

#[derive(Deserialize)]
struct NonceClaim {
    #[serde(default)]
    nonce: Option<String>,
}

/// 非正数或溢出的 `expires_in` 视为未知
fn expiry_ms(now_ms: i64, secs: i64) -> Option<i64> {
    if secs <= 0 {
        return None;
    }
    secs.checked_mul(1000).and_then(|ms| now_ms.checked_add(ms))
}

fn decode_payload<T: DeserializeOwned>(jwt: &str) -> PortalResult<T> {
    let payload = jwt
        .split('.')
        .nth(1)
        .ok_or_else(|| PortalError::unauthorized("malformed id token"))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| PortalError::unauthorized("malformed id token payload").with_source(e))?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn decode_claims(jwt: &str) -> PortalResult<UserProfile> {
    let profile: UserProfile = decode_payload(jwt)?;
    if profile.sub.is_empty() {
        return Err(PortalError::unauthorized("id token has no subject"));
    }
    Ok(profile)
}
