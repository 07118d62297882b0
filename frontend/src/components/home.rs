use crate::auth::{login, use_auth};
use crate::web::route::AppRoute;
use crate::web::router::Link;
use leptos::prelude::*;

/// 公开首页
#[component]
pub fn HomePage() -> impl IntoView {
    let auth = use_auth();
    let profile = move || auth.state.with(|s| s.profile.clone());
    let auth_error = move || auth.state.with(|s| s.error.clone());

    view! {
        <div class="hero min-h-[70vh] bg-base-200">
            <div class="hero-content text-center">
                <div class="max-w-md space-y-4">
                    <h1 class="text-4xl font-bold">"Property Maintenance Portal"</h1>
                    <p class="text-base-content/70">
                        "Report problems with your home and follow them until they are fixed."
                    </p>

                    <Show when=move || auth_error().is_some()>
                        <div role="alert" class="alert alert-warning text-sm py-2">
                            <span>{move || auth_error().unwrap_or_default()}</span>
                        </div>
                    </Show>

                    {move || match profile() {
                        Some(profile) => view! {
                            <p class="font-semibold">"Welcome back, " {profile.display_name().to_string()} "!"</p>
                            <Link route=AppRoute::Dashboard class="btn btn-primary">"Go to my requests"</Link>
                        }.into_any(),
                        None => view! {
                            <button class="btn btn-primary" on:click=move |_| login(&auth)>
                                "Log In"
                            </button>
                        }.into_any(),
                    }}
                </div>
            </div>
        </div>
    }
}
