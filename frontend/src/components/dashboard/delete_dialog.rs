//! 删除确认对话框
//!
//! `pending_delete` 有值时打开；关闭对话框（Esc 或取消）等同于取消删除。

use super::DashboardHandle;
use leptos::prelude::*;

#[component]
pub fn DeleteDialog(handle: DashboardHandle) -> impl IntoView {
    let state = handle.state;
    let dialog_ref = NodeRef::<leptos::html::Dialog>::new();

    let pending_title = Memo::new(move |_| {
        state.with(|s| {
            let id = s.pending_delete.as_ref()?;
            let title = s
                .requests()
                .iter()
                .find(|r| &r.id == id)
                .map(|r| r.title.clone());
            Some(title.unwrap_or_else(|| id.to_string()))
        })
    });

    Effect::new(move |_| {
        if let Some(dialog) = dialog_ref.get() {
            if pending_title.get().is_some() {
                if !dialog.open() {
                    let _ = dialog.show_modal();
                }
            } else if dialog.open() {
                dialog.close();
            }
        }
    });

    let on_cancel = move || {
        if state.with_untracked(|s| s.pending_delete.is_some()) {
            handle.with(|m| m.cancel_delete());
        }
    };

    let on_confirm = move |_: leptos::ev::MouseEvent| {
        handle.run(|m| async move { m.confirm_delete().await });
    };

    view! {
        <dialog class="modal" node_ref=dialog_ref on:close=move |_| on_cancel()>
            <div class="modal-box">
                <h3 class="font-bold text-lg">"Delete request?"</h3>
                <p class="py-4 text-base-content/70">
                    "\"" {move || pending_title.get().unwrap_or_default()} "\" will be permanently removed."
                </p>
                <div class="modal-action">
                    <button class="btn btn-ghost" on:click=move |_| on_cancel()>"Cancel"</button>
                    <button class="btn btn-error" on:click=on_confirm>"Delete"</button>
                </div>
            </div>
        </dialog>
    }
}
