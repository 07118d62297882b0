//! 房主控制面板
//!
//! 组件本身不持有业务状态：所有状态都在 `RequestManager` 中，
//! 每次变化后通过 `on_change` 复制到一个信号，界面据此渲染。

mod create_form;
mod delete_dialog;
mod request_card;

use crate::auth::{BrowserTokenSource, use_auth};
use crate::web::FetchClient;
use create_form::CreateForm;
use delete_dialog::DeleteDialog;
use leptos::prelude::*;
use leptos::task::spawn_local;
use maintenance_portal::manager::EMPTY_LIST_MESSAGE;
use maintenance_portal::{DashboardState, DashboardView, PortalResult, RequestManager};
use request_card::RequestCard;
use std::future::Future;
use std::rc::Rc;

type Manager = RequestManager<FetchClient, BrowserTokenSource>;

/// 子组件共享的句柄（`Copy`，可直接作为 Props 传递）
#[derive(Clone, Copy)]
pub struct DashboardHandle {
    manager: StoredValue<Rc<Manager>, LocalStorage>,
    pub state: ReadSignal<DashboardState>,
}

impl DashboardHandle {
    /// 同步调用管理器（本地状态操作）
    pub fn with<R>(&self, f: impl FnOnce(&Manager) -> R) -> Option<R> {
        self.manager.try_with_value(|m| f(&**m))
    }

    /// 在后台执行一项网络操作；结果已经反映在状态中，这里只记录日志
    pub fn run<F, Fut>(&self, op: F)
    where
        F: FnOnce(Rc<Manager>) -> Fut + 'static,
        Fut: Future<Output = PortalResult<()>> + 'static,
    {
        let Some(manager) = self.manager.try_get_value() else {
            return;
        };
        spawn_local(async move {
            if let Err(e) = op(manager).await {
                log::debug!("[Dashboard] operation ended with {}", e);
            }
        });
    }
}

/// 列表区域的渲染分支
#[derive(Clone, PartialEq)]
enum Section {
    Loading,
    Error(String),
    Empty,
    Items,
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let auth = use_auth();
    let config = auth.config();

    let manager = Rc::new(RequestManager::new(
        &config.api_base_url,
        FetchClient,
        auth.session(),
    ));
    let (state, set_state) = signal(manager.snapshot());
    manager.on_change(move |s| {
        let _ = set_state.try_set(s.clone());
    });

    let handle = DashboardHandle {
        manager: StoredValue::new_local(manager),
        state,
    };

    // 卸载后到达的结果全部丢弃
    on_cleanup(move || {
        handle.with(|m| m.detach());
    });

    handle.run(|m| async move { m.load().await });

    let section = Memo::new(move |_| {
        state.with(|s| match s.view() {
            DashboardView::Loading => Section::Loading,
            DashboardView::Error(message) => Section::Error(message.to_string()),
            DashboardView::Empty => Section::Empty,
            DashboardView::Items(_) => Section::Items,
        })
    });

    let greeting = move || {
        auth.state.with(|s| {
            s.profile
                .as_ref()
                .map(|p| p.display_name().to_string())
                .unwrap_or_default()
        })
    };

    let notice = move || state.with(|s| s.notice.clone());
    let busy = move || state.with(|s| s.is_busy());

    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8 font-sans">
            <div class="max-w-5xl mx-auto space-y-8">
                // 通知提示框
                <Show when=move || notice().is_some()>
                    <div class="toast toast-top toast-end z-50">
                        <div role="alert" class="alert alert-error shadow-lg">
                            <span>{move || notice().unwrap_or_default()}</span>
                            <button
                                class="btn btn-ghost btn-xs"
                                on:click=move |_| {
                                    handle.with(|m| m.dismiss_notice());
                                }
                            >
                                "Dismiss"
                            </button>
                        </div>
                    </div>
                </Show>

                <div class="flex items-center justify-between">
                    <div>
                        <h2 class="text-2xl font-bold">"My Maintenance Requests"</h2>
                        <p class="text-base-content/70 text-sm">"Signed in as " {greeting}</p>
                    </div>
                    <button
                        class="btn btn-ghost gap-2"
                        disabled=busy
                        on:click=move |_| handle.run(|m| async move { m.load().await })
                    >
                        <span class=move || if busy() { "loading loading-spinner loading-sm" } else { "hidden" }></span>
                        "Refresh"
                    </button>
                </div>

                {move || match section.get() {
                    Section::Loading => view! {
                        <div class="text-center py-8 text-base-content/50">
                            <span class="loading loading-spinner loading-md"></span> " Loading..."
                        </div>
                    }.into_any(),
                    Section::Error(message) => view! {
                        <div role="alert" class="alert alert-error">
                            <span>{message}</span>
                            <button
                                class="btn btn-sm"
                                on:click=move |_| handle.run(|m| async move { m.load().await })
                            >
                                "Retry"
                            </button>
                        </div>
                    }.into_any(),
                    Section::Empty => view! {
                        <CreateForm handle=handle />
                        <div class="text-center py-8 text-base-content/50">{EMPTY_LIST_MESSAGE}</div>
                    }.into_any(),
                    Section::Items => view! {
                        <CreateForm handle=handle />
                        <div class="grid gap-4">
                            <For
                                each=move || state.with(|s| {
                                    s.requests().iter().map(|r| r.id.clone()).collect::<Vec<_>>()
                                })
                                key=|id| id.clone()
                                children=move |id| view! { <RequestCard handle=handle id=id /> }
                            />
                        </div>
                    }.into_any(),
                }}

                <DeleteDialog handle=handle />
            </div>
        </div>
    }
}
