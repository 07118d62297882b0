//! 测试工具: 内存中的假后端
//!
//! 按 `/homeowner/requests` 的约定处理请求，记录收到的每个请求，
//! 并支持注入失败或把下一次响应挂起在一个 oneshot 闸门上。

use crate::request::{HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse};
use futures::channel::oneshot;
use maintenance_portal_shared::{
    MaintenanceRequest, MaintenanceRequestUpdate, NewMaintenanceRequest, REQUESTS_PATH, RequestId,
    RequestStatus,
};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

enum Scripted {
    Route,
    Status(u16, String),
    Transport(String),
}

pub struct FakeBackend {
    records: RefCell<Vec<MaintenanceRequest>>,
    next_id: Cell<u32>,
    scripted: RefCell<VecDeque<Scripted>>,
    gate: RefCell<Option<oneshot::Receiver<()>>>,
    requests: RefCell<Vec<HttpRequest>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            records: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
            scripted: RefCell::new(VecDeque::new()),
            gate: RefCell::new(None),
            requests: RefCell::new(Vec::new()),
        }
    }

    /// 直接放入一条记录（模拟其他会话创建的数据）
    pub fn seed(&self, title: &str, homeowner_id: &str) -> MaintenanceRequest {
        self.insert(NewMaintenanceRequest {
            title: title.to_string(),
            description: format!("{} description", title),
            homeowner_id: homeowner_id.to_string(),
        })
    }

    pub fn records(&self) -> Vec<MaintenanceRequest> {
        self.records.borrow().clone()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn fail_next_with_status(&self, status: u16, body: &str) {
        self.respond_next(status, body);
    }

    pub fn respond_next(&self, status: u16, body: &str) {
        self.scripted
            .borrow_mut()
            .push_back(Scripted::Status(status, body.to_string()));
    }

    /// 下一个请求照常处理，用于把脚本化的失败推迟到之后的请求
    pub fn pass_next(&self) {
        self.scripted.borrow_mut().push_back(Scripted::Route);
    }

    pub fn fail_next_with_transport(&self, message: &str) {
        self.scripted
            .borrow_mut()
            .push_back(Scripted::Transport(message.to_string()));
    }

    /// 下一个请求在 `release` 端发送信号前不会得到响应
    pub fn hold_next(&self) -> oneshot::Sender<()> {
        let (release, gate) = oneshot::channel();
        *self.gate.borrow_mut() = Some(gate);
        release
    }

    fn insert(&self, data: NewMaintenanceRequest) -> MaintenanceRequest {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let record = MaintenanceRequest {
            id: format!("req-{}", id).into(),
            title: data.title,
            description: data.description,
            status: RequestStatus::Open,
            image_url: None,
            homeowner_id: data.homeowner_id,
            created_at: None,
        };
        self.records.borrow_mut().push(record.clone());
        record
    }

    fn route(&self, req: &HttpRequest) -> HttpResponse {
        let path = url::Url::parse(&req.url)
            .map(|u| u.path().to_string())
            .unwrap_or_default();
        let Some(rest) = path.strip_prefix(REQUESTS_PATH) else {
            return text(404, "Not Found");
        };
        let id = RequestId::from_path_segment(rest.trim_start_matches('/'))
            .map(|id| id.as_str().to_string())
            .unwrap_or_default();

        match (req.method, id.is_empty()) {
            (HttpMethod::Get, true) => json(200, &*self.records.borrow()),
            (HttpMethod::Post, true) => {
                match serde_json::from_str::<NewMaintenanceRequest>(body(req)) {
                    Ok(data) => json(201, &self.insert(data)),
                    Err(e) => text(422, &e.to_string()),
                }
            }
            (HttpMethod::Get, false) => match self.find(&id) {
                Some(record) => json(200, &record),
                None => text(404, "Not Found"),
            },
            (HttpMethod::Put, false) => {
                let changes = match serde_json::from_str::<MaintenanceRequestUpdate>(body(req)) {
                    Ok(changes) => changes,
                    Err(e) => return text(422, &e.to_string()),
                };
                let mut records = self.records.borrow_mut();
                match records.iter_mut().find(|r| r.id.as_str() == id) {
                    Some(record) => {
                        record.title = changes.title;
                        record.description = changes.description;
                        record.status = changes.status;
                        record.image_url = changes.image_url;
                        json(200, &*record)
                    }
                    None => text(404, "Not Found"),
                }
            }
            (HttpMethod::Delete, false) => {
                let mut records = self.records.borrow_mut();
                let before = records.len();
                records.retain(|r| r.id.as_str() != id);
                if records.len() == before {
                    text(404, "Not Found")
                } else {
                    text(204, "")
                }
            }
            _ => text(405, "Method Not Allowed"),
        }
    }

    fn find(&self, id: &str) -> Option<MaintenanceRequest> {
        self.records
            .borrow()
            .iter()
            .find(|r| r.id.as_str() == id)
            .cloned()
    }
}

fn body(req: &HttpRequest) -> &str {
    req.body.as_deref().unwrap_or_default()
}

fn text(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        body: body.to_string(),
    }
}

fn json<T: serde::Serialize + ?Sized>(status: u16, value: &T) -> HttpResponse {
    HttpResponse {
        status,
        body: serde_json::to_string(value).unwrap(),
    }
}

#[async_trait::async_trait(?Send)]
impl HttpClient for FakeBackend {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.requests.borrow_mut().push(req.clone());

        let gate = self.gate.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        let scripted = self.scripted.borrow_mut().pop_front();
        match scripted {
            Some(Scripted::Status(status, body)) => Ok(text(status, &body)),
            Some(Scripted::Transport(message)) => Err(HttpError::Network(message)),
            Some(Scripted::Route) | None => Ok(self.route(&req)),
        }
    }
}
