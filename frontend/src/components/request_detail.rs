use crate::auth::use_auth;
use crate::web::FetchClient;
use crate::web::route::AppRoute;
use crate::web::router::Link;
use leptos::prelude::*;
use leptos::task::spawn_local;
use maintenance_portal::MaintenanceApi;
use maintenance_portal_shared::{MaintenanceRequest, RequestId};

const DETAIL_FAILED_MESSAGE: &str = "Failed to fetch the maintenance request.";

#[derive(Clone, PartialEq)]
enum Detail {
    Loading,
    Ready(MaintenanceRequest),
    Failed,
}

/// 单条维修请求详情（只读）
#[component]
pub fn RequestDetailPage(id: RequestId) -> impl IntoView {
    let auth = use_auth();
    let (detail, set_detail) = signal(Detail::Loading);

    let api = MaintenanceApi::new(&auth.config().api_base_url, FetchClient, auth.session());
    spawn_local(async move {
        let next = match api.get(&id).await {
            Ok(request) => Detail::Ready(request),
            Err(e) => {
                // 不存在与其他失败对用户显示同一条提示
                log::error!("[Detail] failed to load {}: {}", id, e);
                Detail::Failed
            }
        };
        let _ = set_detail.try_set(next);
    });

    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8">
            <div class="max-w-3xl mx-auto space-y-4">
                <Link route=AppRoute::Dashboard class="btn btn-ghost btn-sm">"Back to dashboard"</Link>
                {move || match detail.get() {
                    Detail::Loading => view! {
                        <div class="text-center py-8 text-base-content/50">
                            <span class="loading loading-spinner loading-md"></span> " Loading..."
                        </div>
                    }.into_any(),
                    Detail::Failed => view! {
                        <div role="alert" class="alert alert-error">{DETAIL_FAILED_MESSAGE}</div>
                    }.into_any(),
                    Detail::Ready(request) => view! {
                        <div class="card bg-base-100 shadow-xl">
                            <div class="card-body">
                                <h2 class="card-title">{request.title}</h2>
                                <div class="badge badge-outline">{request.status.label()}</div>
                                <p class="whitespace-pre-line">{request.description}</p>
                                {request.image_url.map(|src| view! {
                                    <img src=src alt="Attached photo" class="rounded-box" />
                                })}
                                <dl class="text-sm text-base-content/60 grid grid-cols-[auto_1fr] gap-x-4">
                                    <dt>"Request ID"</dt>
                                    <dd class="font-mono">{request.id.to_string()}</dd>
                                    {request.created_at.map(|at| view! {
                                        <dt>"Submitted"</dt>
                                        <dd>{at.format("%Y-%m-%d %H:%M").to_string()}</dd>
                                    })}
                                </dl>
                            </div>
                        </div>
                    }.into_any(),
                }}
            </div>
        </div>
    }
}
