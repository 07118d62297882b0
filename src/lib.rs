//! 房主维修请求门户的平台无关核心
//!
//! 浏览器相关的部分（fetch、存储、路由、组件）位于 `frontend` crate，
//! 这里只包含可以在本机测试的逻辑：API 网关客户端、会话与身份、
//! 表单校验、运行时配置以及控制面板的状态机。

pub mod api;
pub mod config;
pub mod error;
pub mod identity;
pub mod manager;
pub mod request;
pub mod session;
pub mod validation;

#[cfg(test)]
mod test_support;

pub use api::MaintenanceApi;
pub use config::{ConfigError, PortalConfig, VarSource};
pub use error::{ErrorKind, PortalError, PortalResult};
pub use identity::{IdentityConfig, LoginRedirect, PendingLogin, TokenGrant};
pub use manager::{DashboardState, DashboardView, EditDraft, RequestForm, RequestManager};
pub use request::{HttpClient, HttpError, HttpRequest, HttpResponse};
pub use session::{SessionContext, StaticToken, TokenSource, UserProfile};
pub use validation::{ValidationError, validate_request_fields};

pub use maintenance_portal_shared as shared;
