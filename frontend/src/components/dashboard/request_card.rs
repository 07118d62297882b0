//! 单条请求：展示模式与编辑模式

use super::DashboardHandle;
use crate::web::route::AppRoute;
use crate::web::router::Link;
use leptos::prelude::*;
use maintenance_portal_shared::{MaintenanceRequest, RequestId, RequestStatus};

fn status_badge(status: RequestStatus) -> &'static str {
    match status {
        RequestStatus::Open => "badge badge-info",
        RequestStatus::InProgress => "badge badge-warning",
        RequestStatus::Completed => "badge badge-success",
        RequestStatus::Canceled => "badge badge-ghost",
    }
}

#[component]
pub fn RequestCard(handle: DashboardHandle, id: RequestId) -> impl IntoView {
    let state = handle.state;
    let record = Memo::new({
        let id = id.clone();
        move |_| state.with(|s| s.requests().iter().find(|r| r.id == id).cloned())
    });
    let editing = Memo::new({
        let id = id.clone();
        move |_| state.with(|s| s.is_editing(&id))
    });

    move || {
        let Some(request) = record.get() else {
            return ().into_any();
        };
        if editing.get() {
            view! { <EditCard handle=handle /> }.into_any()
        } else {
            view! { <DisplayCard handle=handle request=request /> }.into_any()
        }
    }
}

#[component]
fn DisplayCard(handle: DashboardHandle, request: MaintenanceRequest) -> impl IntoView {
    let busy = move || handle.state.with(|s| s.is_busy());
    let created = request
        .created_at
        .map(|at| at.format("%Y-%m-%d %H:%M").to_string());
    let detail_route = AppRoute::RequestDetail(request.id.clone());
    let delete_id = request.id.clone();
    let edit_source = request.clone();

    view! {
        <div class="card bg-base-100 shadow">
            <div class="card-body">
                <div class="flex items-start justify-between gap-4">
                    <h3 class="card-title">{request.title.clone()}</h3>
                    <span class=status_badge(request.status)>{request.status.label()}</span>
                </div>
                <p class="whitespace-pre-line">{request.description.clone()}</p>
                {request.image_url.clone().map(|src| view! {
                    <img src=src alt="Attached photo" class="rounded-box max-h-48 object-cover" />
                })}
                {created.map(|at| view! { <p class="text-xs text-base-content/50">"Submitted " {at}</p> })}
                <div class="card-actions justify-end">
                    <Link route=detail_route class="btn btn-ghost btn-sm">"Details"</Link>
                    <button
                        class="btn btn-outline btn-sm"
                        on:click=move |_| {
                            handle.with(|m| m.begin_edit(&edit_source));
                        }
                    >
                        "Edit"
                    </button>
                    <button
                        class="btn btn-outline btn-error btn-sm"
                        disabled=busy
                        on:click=move |_| {
                            handle.with(|m| m.request_delete(&delete_id));
                        }
                    >
                        "Delete"
                    </button>
                </div>
            </div>
        </div>
    }
}

#[component]
fn EditCard(handle: DashboardHandle) -> impl IntoView {
    let state = handle.state;
    let draft = move || state.with(|s| s.edit_draft.clone());
    let saving = move || state.with(|s| s.is_busy());

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        handle.run(|m| async move { m.submit_edit().await });
    };

    view! {
        <div class="card bg-base-100 shadow ring ring-primary">
            <form class="card-body space-y-2" on:submit=on_submit>
                <input
                    type="text"
                    aria-label="Title"
                    on:input=move |ev| {
                        let value = event_target_value(&ev);
                        handle.with(|m| m.update_edit_draft(|d| d.title = value));
                    }
                    prop:value=move || draft().title
                    class="input input-bordered w-full"
                />
                <textarea
                    aria-label="Description"
                    on:input=move |ev| {
                        let value = event_target_value(&ev);
                        handle.with(|m| m.update_edit_draft(|d| d.description = value));
                    }
                    prop:value=move || draft().description
                    class="textarea textarea-bordered w-full"
                ></textarea>
                <div class="grid grid-cols-2 gap-4">
                    <select
                        aria-label="Status"
                        class="select select-bordered w-full"
                        on:change=move |ev| {
                            match event_target_value(&ev).parse::<RequestStatus>() {
                                Ok(status) => {
                                    handle.with(|m| m.update_edit_draft(|d| d.status = status));
                                }
                                Err(e) => log::warn!("[Dashboard] {}", e),
                            }
                        }
                        prop:value=move || draft().status.as_str()
                    >
                        {RequestStatus::ALL
                            .iter()
                            .map(|status| view! { <option value=status.as_str()>{status.label()}</option> })
                            .collect_view()}
                    </select>
                    <input
                        type="url"
                        aria-label="Image URL"
                        placeholder="https://..."
                        on:input=move |ev| {
                            let value = event_target_value(&ev);
                            handle.with(|m| m.update_edit_draft(|d| d.image_url = value));
                        }
                        prop:value=move || draft().image_url
                        class="input input-bordered w-full"
                    />
                </div>
                <div class="card-actions justify-end">
                    <button
                        type="button"
                        class="btn btn-ghost btn-sm"
                        on:click=move |_| {
                            handle.with(|m| m.cancel_edit());
                        }
                    >
                        "Cancel"
                    </button>
                    <button type="submit" class="btn btn-primary btn-sm" disabled=saving>
                        "Save"
                    </button>
                </div>
            </form>
        </div>
    }
}
