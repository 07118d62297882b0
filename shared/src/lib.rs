use chrono::{DateTime, NaiveDateTime, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod protocol;

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const REQUESTS_PATH: &str = "/homeowner/requests";
pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const HEADER_ACCEPT: &str = "Accept";
pub const CONTENT_TYPE_JSON: &str = "application/json";

// =========================================================
// 领域模型 (Domain Models)
// =========================================================

/// 维修请求 ID
///
/// 由后端在创建时分配，客户端只从响应中读取，从不自行生成。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

/// 路径段中保留原样的字符 (RFC 3986 unreserved)
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 编码为单个 URL 路径段，`/`、`?`、`#` 等不会改变路径结构
    pub fn to_path_segment(&self) -> String {
        utf8_percent_encode(&self.0, PATH_SEGMENT).to_string()
    }

    /// `to_path_segment` 的逆操作；非法的 UTF-8 序列返回 `None`
    pub fn from_path_segment(segment: &str) -> Option<Self> {
        percent_decode_str(segment)
            .decode_utf8()
            .ok()
            .map(|id| Self(id.into_owned()))
    }
}

impl From<String> for RequestId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Open,
    InProgress,
    Completed,
    Canceled,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 4] = [
        RequestStatus::Open,
        RequestStatus::InProgress,
        RequestStatus::Completed,
        RequestStatus::Canceled,
    ];

    /// 线上格式 (snake_case)
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Open => "open",
            RequestStatus::InProgress => "in_progress",
            RequestStatus::Completed => "completed",
            RequestStatus::Canceled => "canceled",
        }
    }

    /// 界面显示用标签
    pub fn label(&self) -> &'static str {
        match self {
            RequestStatus::Open => "Open",
            RequestStatus::InProgress => "In progress",
            RequestStatus::Completed => "Completed",
            RequestStatus::Canceled => "Canceled",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown request status: {}", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for RequestStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RequestStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// 后端返回的完整维修请求记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceRequest {
    pub id: RequestId,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub status: RequestStatus,
    #[serde(default)]
    pub image_url: Option<String>,
    pub homeowner_id: String,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

/// 接受 RFC 3339 或不带时区的 ISO 时间（按 UTC 处理）
///
/// 展示用字段：无法识别的值记为 `None`，不影响整条记录的解析。
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Other(#[allow(dead_code)] IgnoredAny),
    }

    let Some(Raw::Text(text)) = Option::<Raw>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let text = text.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Ok(Some(at.with_timezone(&Utc)));
    }
    Ok(NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|at| at.and_utc()))
}

/// POST 请求体：新建维修请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMaintenanceRequest {
    pub title: String,
    pub description: String,
    pub homeowner_id: String,
}

/// PUT 请求体：更新可变字段
///
/// `image_url` 总是序列化，`null` 表示清除图片。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceRequestUpdate {
    pub title: String,
    pub description: String,
    pub status: RequestStatus,
    pub image_url: Option<String>,
}

impl MaintenanceRequest {
    /// 取出可变字段，构造一次完整的更新请求体
    pub fn to_update(&self) -> MaintenanceRequestUpdate {
        MaintenanceRequestUpdate {
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status,
            image_url: self.image_url.clone(),
        }
    }
}
