use crate::auth::{login, logout, use_auth};
use crate::web::route::AppRoute;
use crate::web::router::Link;
use leptos::prelude::*;

/// 顶部导航栏
#[component]
pub fn NavBar() -> impl IntoView {
    let auth = use_auth();
    let is_authenticated = auth.is_authenticated_signal();
    let name = move || {
        auth.state.with(|s| {
            s.profile
                .as_ref()
                .map(|p| p.display_name().to_string())
                .unwrap_or_default()
        })
    };

    view! {
        <div class="navbar bg-base-100 shadow">
            <div class="flex-1 gap-2">
                <Link route=AppRoute::Home class="btn btn-ghost text-xl">"Maintenance Portal"</Link>
                <Show when=move || is_authenticated.get()>
                    <Link route=AppRoute::Dashboard class="btn btn-ghost">"Dashboard"</Link>
                </Show>
            </div>
            <div class="flex-none gap-2">
                <Show
                    when=move || is_authenticated.get()
                    fallback=move || view! {
                        <button class="btn btn-primary" on:click=move |_| login(&auth)>"Log In"</button>
                    }
                >
                    <span class="hidden md:inline text-sm">{name}</span>
                    <button class="btn btn-outline btn-error" on:click=move |_| logout(&auth)>
                        "Log Out"
                    </button>
                </Show>
            </div>
        </div>
    }
}
