//! 维修请求管理器 (Request Manager)
//!
//! 持有控制面板的全部客户端状态，并与后端保持一致：
//! - 每次成功的变更之后整体重新拉取列表，不做乐观合并
//! - 同一时间只允许一项网络操作（in-flight guard），后来者直接被拒绝
//! - 同一时间最多一条请求处于编辑状态（`editing_id` + 独立的草稿）
//!
//! 状态放在 `RefCell` 中，且从不跨 `.await` 持有借用。

use crate::api::MaintenanceApi;
use crate::error::{PortalError, PortalResult};
use crate::request::HttpClient;
use crate::session::{SessionContext, TokenSource};
use crate::validation::validate_request_fields;
use maintenance_portal_shared::{
    MaintenanceRequest, MaintenanceRequestUpdate, NewMaintenanceRequest, RequestId, RequestStatus,
};
use std::cell::{Cell, RefCell};
use std::fmt;

// =========================================================
// 用户可见的提示文本
// =========================================================

pub const LOAD_FAILED_MESSAGE: &str = "Failed to fetch maintenance requests.";
pub const CREATE_FAILED_MESSAGE: &str = "Failed to create the request.";
pub const UPDATE_FAILED_MESSAGE: &str = "Failed to update the request.";
pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete the request.";
pub const BUSY_MESSAGE: &str = "Please wait for the current operation to finish.";
pub const EMPTY_LIST_MESSAGE: &str = "You have not submitted any requests yet.";

// =========================================================
// 状态模型
// =========================================================

#[derive(Debug, Clone, PartialEq)]
pub enum ListState {
    Loading,
    Ready(Vec<MaintenanceRequest>),
    /// 列表拉取失败：界面只显示错误（fail-closed）
    Failed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestForm {
    pub title: String,
    pub description: String,
}

/// 编辑草稿：被编辑请求的可变字段副本
///
/// `image_url` 以文本形式绑定到输入框，空字符串表示没有图片。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditDraft {
    pub title: String,
    pub description: String,
    pub status: RequestStatus,
    pub image_url: String,
}

impl EditDraft {
    pub fn to_update(&self) -> MaintenanceRequestUpdate {
        let image_url = self.image_url.trim();
        MaintenanceRequestUpdate {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            status: self.status,
            image_url: (!image_url.is_empty()).then(|| image_url.to_string()),
        }
    }
}

impl From<&MaintenanceRequest> for EditDraft {
    fn from(request: &MaintenanceRequest) -> Self {
        Self {
            title: request.title.clone(),
            description: request.description.clone(),
            status: request.status,
            image_url: request.image_url.clone().unwrap_or_default(),
        }
    }
}

/// 需要访问网络的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Load,
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Load => "load",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    pub list: ListState,
    pub create_form: RequestForm,
    /// 当前处于编辑状态的请求
    pub editing_id: Option<RequestId>,
    pub edit_draft: EditDraft,
    /// 等待用户确认删除的请求
    pub pending_delete: Option<RequestId>,
    /// 变更失败或校验失败的提示
    pub notice: Option<String>,
    pub in_flight: Option<Operation>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            list: ListState::Loading,
            create_form: RequestForm::default(),
            editing_id: None,
            edit_draft: EditDraft::default(),
            pending_delete: None,
            notice: None,
            in_flight: None,
        }
    }
}

/// 渲染用视图
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DashboardView<'a> {
    Loading,
    Error(&'a str),
    Empty,
    Items(&'a [MaintenanceRequest]),
}

impl DashboardState {
    pub fn view(&self) -> DashboardView<'_> {
        match &self.list {
            ListState::Loading => DashboardView::Loading,
            ListState::Failed(message) => DashboardView::Error(message),
            ListState::Ready(items) if items.is_empty() => DashboardView::Empty,
            ListState::Ready(items) => DashboardView::Items(items),
        }
    }

    pub fn is_editing(&self, id: &RequestId) -> bool {
        self.editing_id.as_ref() == Some(id)
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn requests(&self) -> &[MaintenanceRequest] {
        match &self.list {
            ListState::Ready(items) => items,
            _ => &[],
        }
    }

    fn clear_edit(&mut self) {
        self.editing_id = None;
        self.edit_draft = EditDraft::default();
    }
}

// =========================================================
// 状态存储与 in-flight guard
// =========================================================

type Observer = Box<dyn Fn(&DashboardState)>;

struct Store {
    state: RefCell<DashboardState>,
    detached: Cell<bool>,
    observer: RefCell<Option<Observer>>,
}

impl Store {
    fn apply(&self, f: impl FnOnce(&mut DashboardState)) {
        if self.detached.get() {
            return;
        }
        f(&mut self.state.borrow_mut());
        self.notify();
    }

    fn notify(&self) {
        if self.detached.get() {
            return;
        }
        if let Some(observer) = self.observer.borrow().as_ref() {
            observer(&self.state.borrow());
        }
    }
}

/// 释放时清除 `in_flight`，包括 future 在中途被丢弃的情况
struct InFlight<'a> {
    store: &'a Store,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.store.state.borrow_mut().in_flight = None;
        self.store.notify();
    }
}

// =========================================================
// Request Manager
// =========================================================

pub struct RequestManager<C: HttpClient, T: TokenSource> {
    api: MaintenanceApi<C, SessionContext<T>>,
    session: SessionContext<T>,
    store: Store,
}

impl<C: HttpClient, T: TokenSource + Clone> RequestManager<C, T> {
    /// 同一个会话上下文同时注入管理器和 API 客户端
    pub fn new(base_url: &str, client: C, session: SessionContext<T>) -> Self {
        Self {
            api: MaintenanceApi::new(base_url, client, session.clone()),
            session,
            store: Store {
                state: RefCell::new(DashboardState::default()),
                detached: Cell::new(false),
                observer: RefCell::new(None),
            },
        }
    }
}

impl<C: HttpClient, T: TokenSource> RequestManager<C, T> {
    /// 每次状态变化后收到一份状态引用；回调内不得再调用管理器的方法
    pub fn on_change(&self, observer: impl Fn(&DashboardState) + 'static) {
        *self.store.observer.borrow_mut() = Some(Box::new(observer));
    }

    /// 所属视图已卸载：之后到达的结果全部丢弃
    pub fn detach(&self) {
        self.store.detached.set(true);
        self.store.observer.borrow_mut().take();
    }

    pub fn is_detached(&self) -> bool {
        self.store.detached.get()
    }

    pub fn snapshot(&self) -> DashboardState {
        self.store.state.borrow().clone()
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&DashboardState) -> R) -> R {
        f(&self.store.state.borrow())
    }

    pub fn is_editing(&self, id: &RequestId) -> bool {
        self.store.state.borrow().is_editing(id)
    }

    fn apply(&self, f: impl FnOnce(&mut DashboardState)) {
        self.store.apply(f);
    }

    fn notice(&self, message: &str) {
        let message = message.to_string();
        self.apply(|s| s.notice = Some(message));
    }

    fn begin(&self, op: Operation) -> PortalResult<InFlight<'_>> {
        let current = self.store.state.borrow().in_flight;
        if let Some(current) = current {
            log::debug!("rejecting {} while {} is in flight", op, current);
            self.notice(BUSY_MESSAGE);
            return Err(PortalError::busy(format!("{} is still in progress", current))
                .in_op_with("manager.begin", op.to_string()));
        }
        self.store.state.borrow_mut().in_flight = Some(op);
        self.store.notify();
        Ok(InFlight { store: &self.store })
    }

    // -----------------------------------------------------
    // Load
    // -----------------------------------------------------

    /// 拉取完整列表并整体替换本地状态
    pub async fn load(&self) -> PortalResult<()> {
        let _guard = self.begin(Operation::Load)?;
        self.refresh().await
    }

    async fn refresh(&self) -> PortalResult<()> {
        self.apply(|s| {
            if !matches!(s.list, ListState::Ready(_)) {
                s.list = ListState::Loading;
            }
        });

        match self.api.list().await {
            Ok(items) => {
                log::debug!("loaded {} maintenance requests", items.len());
                self.apply(|s| s.list = ListState::Ready(items));
                Ok(())
            }
            Err(e) => {
                log::error!("failed to load maintenance requests: {}", e);
                self.apply(|s| s.list = ListState::Failed(LOAD_FAILED_MESSAGE.to_string()));
                Err(e.in_op("manager.load"))
            }
        }
    }

    // -----------------------------------------------------
    // Create
    // -----------------------------------------------------

    pub fn update_create_form(&self, f: impl FnOnce(&mut RequestForm)) {
        self.apply(|s| f(&mut s.create_form));
    }

    /// 新建请求；成功后清空表单并重新拉取列表，失败时保留表单内容
    pub async fn create(&self, title: &str, description: &str) -> PortalResult<()> {
        let form = RequestForm {
            title: title.to_string(),
            description: description.to_string(),
        };
        self.apply(|s| s.create_form = form);

        if let Err(e) = validate_request_fields(title, description) {
            self.notice(&e.message);
            return Err(PortalError::from(e).in_op("manager.create"));
        }

        let _guard = self.begin(Operation::Create)?;

        let homeowner_id = match self.session.subject_id() {
            Ok(sub) => sub.to_string(),
            Err(e) => {
                log::error!("cannot create a request without a session: {}", e);
                self.notice(CREATE_FAILED_MESSAGE);
                return Err(e.in_op("manager.create"));
            }
        };
        let data = NewMaintenanceRequest {
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            homeowner_id,
        };

        // 列表随后整体重新拉取，返回的记录不参与合并
        match self.api.submit(&data).await {
            Ok(()) => {
                log::info!("created maintenance request '{}'", data.title);
                self.apply(|s| {
                    s.create_form = RequestForm::default();
                    s.notice = None;
                });
                self.refresh().await
            }
            Err(e) => {
                log::error!("failed to create maintenance request: {}", e);
                self.notice(CREATE_FAILED_MESSAGE);
                Err(e.in_op("manager.create"))
            }
        }
    }

    // -----------------------------------------------------
    // Edit
    // -----------------------------------------------------

    /// 进入编辑；已有的草稿被直接丢弃，不会为其发出更新
    pub fn begin_edit(&self, request: &MaintenanceRequest) {
        let draft = EditDraft::from(request);
        let id = request.id.clone();
        self.apply(|s| {
            if let Some(previous) = s.editing_id.as_ref().filter(|prev| **prev != id) {
                log::debug!("discarding draft of {}", previous);
            }
            s.editing_id = Some(id);
            s.edit_draft = draft;
        });
    }

    pub fn update_edit_draft(&self, f: impl FnOnce(&mut EditDraft)) {
        self.apply(|s| {
            if s.editing_id.is_some() {
                f(&mut s.edit_draft);
            }
        });
    }

    pub fn cancel_edit(&self) {
        self.apply(DashboardState::clear_edit);
    }

    /// 提交草稿；失败时保留编辑状态以便重试
    pub async fn submit_edit(&self) -> PortalResult<()> {
        let (id, draft) = {
            let state = self.store.state.borrow();
            match &state.editing_id {
                Some(id) => (id.clone(), state.edit_draft.clone()),
                None => {
                    return Err(PortalError::validation("no request is being edited")
                        .in_op("manager.submit_edit"));
                }
            }
        };

        if let Err(e) = validate_request_fields(&draft.title, &draft.description) {
            self.notice(&e.message);
            return Err(PortalError::from(e).in_op_with("manager.submit_edit", id.to_string()));
        }

        let _guard = self.begin(Operation::Update)?;

        match self.api.update(&id, &draft.to_update()).await {
            Ok(_) => {
                log::info!("updated maintenance request {}", id);
                self.apply(|s| {
                    // 提交期间用户可能已转去编辑另一条
                    if s.editing_id.as_ref() == Some(&id) {
                        s.clear_edit();
                    }
                    s.notice = None;
                });
                self.refresh().await
            }
            Err(e) => {
                log::error!("failed to update maintenance request {}: {}", id, e);
                self.notice(UPDATE_FAILED_MESSAGE);
                Err(e.in_op_with("manager.submit_edit", id.to_string()))
            }
        }
    }

    // -----------------------------------------------------
    // Delete
    // -----------------------------------------------------

    /// 删除第一步：等待用户确认
    pub fn request_delete(&self, id: &RequestId) {
        let id = id.clone();
        self.apply(|s| s.pending_delete = Some(id));
    }

    pub fn cancel_delete(&self) {
        self.apply(|s| s.pending_delete = None);
    }

    /// 删除第二步：用户已确认
    pub async fn confirm_delete(&self) -> PortalResult<()> {
        let pending = self.store.state.borrow().pending_delete.clone();
        let Some(id) = pending else {
            return Err(PortalError::validation("no deletion awaiting confirmation")
                .in_op("manager.confirm_delete"));
        };

        let _guard = self.begin(Operation::Delete)?;
        self.apply(|s| s.pending_delete = None);

        match self.api.delete(&id).await {
            Ok(()) => {
                log::info!("deleted maintenance request {}", id);
                self.apply(|s| {
                    if s.editing_id.as_ref() == Some(&id) {
                        s.clear_edit();
                    }
                    s.notice = None;
                });
                self.refresh().await
            }
            Err(e) => {
                log::error!("failed to delete maintenance request {}: {}", id, e);
                self.notice(DELETE_FAILED_MESSAGE);
                Err(e.in_op_with("manager.confirm_delete", id.to_string()))
            }
        }
    }

    pub fn dismiss_notice(&self) {
        self.apply(|s| s.notice = None);
    }
}

#[cfg(test)]
mod tests;
