use crate::error::{PortalError, PortalResult};
use crate::request::{HttpClient, HttpRequest};
use crate::session::TokenSource;
use maintenance_portal_shared::protocol::{
    ApiRequest, CreateRequest, DeleteRequest, GetRequest, ListRequests, SubmitRequest,
    UpdateRequest,
};
use maintenance_portal_shared::{
    CONTENT_TYPE_JSON, HEADER_ACCEPT, HEADER_AUTHORIZATION, HEADER_CONTENT_TYPE,
    MaintenanceRequest, MaintenanceRequestUpdate, NewMaintenanceRequest, RequestId,
};

// =========================================================
// API 网关客户端
// =========================================================

/// 后端维修请求 API 的薄封装
///
/// 每次调用前都向 `TokenSource` 重新索取令牌；不重试、不退避，
/// 传输错误和服务端错误原样交给调用方。
pub struct MaintenanceApi<C: HttpClient, T: TokenSource> {
    base_url: String,
    client: C,
    tokens: T,
}

impl<C: HttpClient, T: TokenSource> MaintenanceApi<C, T> {
    pub fn new(base_url: &str, client: C, tokens: T) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            tokens,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// 发送强类型请求并解析响应
    pub async fn execute<R: ApiRequest>(&self, req: &R) -> PortalResult<R::Response> {
        let path = req.path();
        let op = R::METHOD.as_str();

        let token = self
            .tokens
            .access_token()
            .await
            .map_err(|e| e.in_op_with("api.token", &path))?;

        let mut http_req = HttpRequest::new(&self.url(&path), R::METHOD)
            .with_header(HEADER_AUTHORIZATION, &format!("Bearer {}", token))
            .with_header(HEADER_ACCEPT, CONTENT_TYPE_JSON);

        if let Some(body) = req.body() {
            http_req = http_req
                .with_header(HEADER_CONTENT_TYPE, CONTENT_TYPE_JSON)
                .with_json_body(body)
                .map_err(|e| PortalError::from(e).in_op_with("api.serialize", &path))?;
        }

        log::debug!("{} {}", op, path);
        let response = self.client.send(http_req).await.map_err(|e| {
            log::warn!("{} {} failed: {}", op, path, e);
            PortalError::from(e).in_op_with("api.send", format!("{} {}", op, path))
        })?;

        if !response.is_success() {
            log::warn!("{} {} rejected with HTTP {}", op, path, response.status);
            return Err(PortalError::http_status(response.status, response.body)
                .in_op_with("api.response", format!("{} {}", op, path)));
        }

        response
            .json::<R::Response>()
            .map_err(|e| PortalError::from(e).in_op_with("api.deserialize", &path))
    }

    /// 当前用户的全部请求（顺序由服务端决定）
    pub async fn list(&self) -> PortalResult<Vec<MaintenanceRequest>> {
        self.execute(&ListRequests).await
    }

    pub async fn get(&self, id: &RequestId) -> PortalResult<MaintenanceRequest> {
        self.execute(&GetRequest { id: id.clone() }).await
    }

    pub async fn create(&self, data: &NewMaintenanceRequest) -> PortalResult<MaintenanceRequest> {
        self.execute(&CreateRequest { data: data.clone() }).await
    }

    /// 新建请求，只关心服务端是否接受（2xx），不解析返回的记录
    pub async fn submit(&self, data: &NewMaintenanceRequest) -> PortalResult<()> {
        self.execute(&SubmitRequest { data: data.clone() }).await?;
        Ok(())
    }

    pub async fn update(
        &self,
        id: &RequestId,
        changes: &MaintenanceRequestUpdate,
    ) -> PortalResult<MaintenanceRequest> {
        self.execute(&UpdateRequest {
            id: id.clone(),
            changes: changes.clone(),
        })
        .await
    }

    pub async fn delete(&self, id: &RequestId) -> PortalResult<()> {
        self.execute(&DeleteRequest { id: id.clone() }).await?;
        Ok(())
    }
}
