//! 房主维修请求门户前端
//!
//! 采用 Context-Driven 的架构：
//! - `web::route`: 路由定义（领域模型）
//! - `web::router`: 路由服务（核心引擎）
//! - `auth`: 会话提供方（身份提供方跳转与令牌）
//! - `components`: UI 组件层
//!
//! 业务状态与后端通信在 `maintenance-portal` 核心库中完成。

mod auth;
mod components {
    pub mod dashboard;
    pub mod home;
    pub mod request_detail;
    pub mod shell;
}
mod config;

use crate::auth::{AuthContext, init_auth};
use crate::components::dashboard::DashboardPage;
use crate::components::home::HomePage;
use crate::components::request_detail::RequestDetailPage;
use crate::components::shell::NavBar;

use leptos::prelude::*;

// 原生 Web API 封装模块
pub(crate) mod web {
    mod http;
    pub mod route;
    pub mod router;
    mod storage;

    pub use http::FetchClient;
    pub use storage::SessionStore;
}

use web::route::AppRoute;
use web::router::{Router, RouterOutlet};

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Home => view! { <HomePage /> }.into_any(),
        AppRoute::Dashboard => view! { <DashboardPage /> }.into_any(),
        AppRoute::RequestDetail(id) => view! { <RequestDetailPage id=id /> }.into_any(),
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-[70vh] bg-base-200">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl mt-4">"Page not found"</p>
                </div>
            </div>
        }
        .into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 读取构建期配置
    let config = match config::load() {
        Ok(config) => config,
        Err(e) => {
            log::error!("invalid build configuration: {}", e);
            return view! {
                <div role="alert" class="alert alert-error m-8">
                    <span>"The portal is not configured: " {e.to_string()}</span>
                </div>
            }
            .into_any();
        }
    };

    // 2. 创建认证上下文并处理登录回跳
    let auth_ctx = AuthContext::new(config);
    provide_context(auth_ctx);
    init_auth(&auth_ctx);

    // 3. 认证信号注入路由服务
    let is_authenticated = auth_ctx.is_authenticated_signal();

    view! {
        <Router is_authenticated=is_authenticated>
            <NavBar />
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
    .into_any()
}
