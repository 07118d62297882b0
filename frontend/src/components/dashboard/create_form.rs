//! 新建请求表单
//!
//! 输入直接写回管理器中的表单状态，提交失败时内容保留。

use super::DashboardHandle;
use leptos::prelude::*;

#[component]
pub fn CreateForm(handle: DashboardHandle) -> impl IntoView {
    let state = handle.state;
    let title = move || state.with(|s| s.create_form.title.clone());
    let description = move || state.with(|s| s.create_form.description.clone());
    let submitting = move || state.with(|s| s.is_busy());

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let (title, description) =
            state.with_untracked(|s| (s.create_form.title.clone(), s.create_form.description.clone()));
        handle.run(move |m| async move { m.create(&title, &description).await });
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <form class="card-body space-y-2" on:submit=on_submit>
                <h3 class="card-title">"Submit a New Request"</h3>
                <div class="form-control">
                    <label for="new_title" class="label">
                        <span class="label-text">"Title"</span>
                    </label>
                    <input id="new_title"
                        type="text"
                        placeholder="Leaky faucet"
                        on:input=move |ev| {
                            let value = event_target_value(&ev);
                            handle.with(|m| m.update_create_form(|f| f.title = value));
                        }
                        prop:value=title
                        class="input input-bordered w-full"
                    />
                </div>
                <div class="form-control">
                    <label for="new_description" class="label">
                        <span class="label-text">"Description"</span>
                    </label>
                    <textarea id="new_description"
                        placeholder="Describe the problem"
                        on:input=move |ev| {
                            let value = event_target_value(&ev);
                            handle.with(|m| m.update_create_form(|f| f.description = value));
                        }
                        prop:value=description
                        class="textarea textarea-bordered w-full"
                    ></textarea>
                </div>
                <div class="card-actions justify-end">
                    <button type="submit" class="btn btn-primary" disabled=submitting>
                        {move || if submitting() {
                            view! { <span class="loading loading-spinner"></span> "Submitting..." }.into_any()
                        } else {
                            "Submit Request".into_any()
                        }}
                    </button>
                </div>
            </form>
        </div>
    }
}
