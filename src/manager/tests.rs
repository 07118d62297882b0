use super::*;
use crate::error::ErrorKind;
use crate::request::HttpMethod;
use crate::session::{StaticToken, UserProfile};
use crate::test_support::FakeBackend;
use crate::validation::REQUIRED_FIELDS_MESSAGE;
use rstest::rstest;
use std::rc::Rc;

const SUB: &str = "auth0|homeowner-1";

type Manager = RequestManager<Rc<FakeBackend>, StaticToken>;

fn session() -> SessionContext<StaticToken> {
    SessionContext::authenticated(
        UserProfile {
            sub: SUB.into(),
            name: Some("Pat".into()),
            email: None,
            picture: None,
        },
        StaticToken("tok".into()),
    )
}

fn setup() -> (Rc<FakeBackend>, Manager) {
    let backend = Rc::new(FakeBackend::new());
    let manager = RequestManager::new("http://api.test", backend.clone(), session());
    (backend, manager)
}

fn titles(manager: &Manager) -> Vec<String> {
    manager.with_state(|s| s.requests().iter().map(|r| r.title.clone()).collect())
}

fn methods(backend: &FakeBackend) -> Vec<HttpMethod> {
    backend.requests().iter().map(|r| r.method).collect()
}

// ===== 加载 =====

#[tokio::test]
async fn starts_in_loading_view() {
    let (_, manager) = setup();
    assert_eq!(manager.snapshot().view(), DashboardView::Loading);
}

#[tokio::test]
async fn load_replaces_list_with_server_order() {
    let (backend, manager) = setup();
    backend.seed("Leaky faucet", SUB);
    backend.seed("Broken window", SUB);

    manager.load().await.unwrap();

    assert_eq!(titles(&manager), vec!["Leaky faucet", "Broken window"]);
    assert!(matches!(manager.snapshot().view(), DashboardView::Items(items) if items.len() == 2));
}

#[tokio::test]
async fn empty_list_renders_empty_view() {
    let (_, manager) = setup();
    manager.load().await.unwrap();
    assert_eq!(manager.snapshot().view(), DashboardView::Empty);
}

#[tokio::test]
async fn failed_load_shows_error_only() {
    let (backend, manager) = setup();
    backend.seed("Leaky faucet", SUB);
    backend.fail_next_with_status(500, "boom");

    let err = manager.load().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Server);

    let state = manager.snapshot();
    assert_eq!(state.view(), DashboardView::Error(LOAD_FAILED_MESSAGE));
    assert!(state.requests().is_empty());
    assert!(!state.is_busy());
}

#[tokio::test]
async fn retry_after_failed_load_recovers() {
    let (backend, manager) = setup();
    backend.seed("Leaky faucet", SUB);
    backend.fail_next_with_transport("offline");

    let err = manager.load().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    let state = manager.snapshot();
    assert_eq!(state.view(), DashboardView::Error(LOAD_FAILED_MESSAGE));
    assert!(state.requests().is_empty());

    manager.load().await.unwrap();
    assert_eq!(titles(&manager), vec!["Leaky faucet"]);
}

/// 变更已被服务端接受、但随后的重新拉取失败：只显示错误视图
fn assert_fails_closed(manager: &Manager) {
    let state = manager.snapshot();
    assert_eq!(state.view(), DashboardView::Error(LOAD_FAILED_MESSAGE));
    assert!(state.requests().is_empty());
    assert!(!state.is_busy());
}

// ===== 新建 =====

#[tokio::test]
async fn created_request_appears_after_reload() {
    let (backend, manager) = setup();
    manager.load().await.unwrap();

    manager
        .create("Broken window", "Glass cracked")
        .await
        .unwrap();

    let state = manager.snapshot();
    assert_eq!(titles(&manager), vec!["Broken window"]);
    let created = &state.requests()[0];
    assert_eq!(created.status, RequestStatus::Open);
    assert_eq!(created.homeowner_id, SUB);
    assert_eq!(state.create_form, RequestForm::default());
    assert_eq!(
        methods(&backend),
        vec![HttpMethod::Get, HttpMethod::Post, HttpMethod::Get]
    );
}

#[tokio::test]
async fn create_acknowledged_without_record_still_reloads() {
    let (backend, manager) = setup();
    manager.load().await.unwrap();

    backend.respond_next(
        201,
        r#"{"title":"Broken window","description":"Glass cracked","status":"open","bids":[]}"#,
    );
    manager
        .create("Broken window", "Glass cracked")
        .await
        .unwrap();

    let state = manager.snapshot();
    assert_eq!(state.notice, None);
    assert_eq!(state.create_form, RequestForm::default());
    assert_eq!(
        methods(&backend),
        vec![HttpMethod::Get, HttpMethod::Post, HttpMethod::Get]
    );
}

#[tokio::test]
async fn create_with_empty_acknowledgement_succeeds() {
    let (backend, manager) = setup();
    manager.load().await.unwrap();

    backend.respond_next(204, "");
    manager.create("Broken window", "Glass cracked").await.unwrap();
    assert_eq!(manager.snapshot().notice, None);
}

#[tokio::test]
async fn failed_reload_after_create_fails_closed() {
    let (backend, manager) = setup();
    backend.seed("Leaky faucet", SUB);
    manager.load().await.unwrap();

    backend.pass_next();
    backend.fail_next_with_transport("offline");
    let err = manager.create("Broken window", "Glass cracked").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_fails_closed(&manager);
    assert_eq!(backend.records().len(), 2);
    assert_eq!(manager.snapshot().create_form, RequestForm::default());
}

#[tokio::test]
async fn single_character_fields_are_accepted() {
    let (_, manager) = setup();
    manager.load().await.unwrap();
    manager.create("A", "B").await.unwrap();
    assert_eq!(titles(&manager), vec!["A"]);
}

#[rstest]
#[case("", "Glass cracked")]
#[case("Broken window", "")]
#[case("   ", "\n")]
#[tokio::test]
async fn invalid_form_makes_no_request(#[case] title: &str, #[case] description: &str) {
    let (backend, manager) = setup();

    let err = manager.create(title, description).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(backend.request_count(), 0);
    let state = manager.snapshot();
    assert_eq!(state.notice.as_deref(), Some(REQUIRED_FIELDS_MESSAGE));
    assert_eq!(state.create_form.title, title);
    assert_eq!(state.create_form.description, description);
}

#[tokio::test]
async fn failed_create_keeps_form_and_list() {
    let (backend, manager) = setup();
    backend.seed("Leaky faucet", SUB);
    manager.load().await.unwrap();

    backend.fail_next_with_status(500, "boom");
    assert!(manager.create("Broken window", "Glass cracked").await.is_err());

    let state = manager.snapshot();
    assert_eq!(state.notice.as_deref(), Some(CREATE_FAILED_MESSAGE));
    assert_eq!(state.create_form.title, "Broken window");
    assert_eq!(titles(&manager), vec!["Leaky faucet"]);
}

#[tokio::test]
async fn create_without_session_is_rejected_locally() {
    let backend = Rc::new(FakeBackend::new());
    let manager = RequestManager::new(
        "http://api.test",
        backend.clone(),
        SessionContext::anonymous(StaticToken("tok".into())),
    );

    let err = manager.create("Broken window", "Glass cracked").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(backend.request_count(), 0);
    assert!(!manager.snapshot().is_busy());
}

// ===== 编辑 =====

#[tokio::test]
async fn at_most_one_request_is_edited() {
    let (backend, manager) = setup();
    let first = backend.seed("Leaky faucet", SUB);
    let second = backend.seed("Broken window", SUB);
    manager.load().await.unwrap();

    manager.begin_edit(&first);
    manager.update_edit_draft(|d| d.title = "Dripping faucet".into());
    manager.begin_edit(&second);

    assert!(!manager.is_editing(&first.id));
    assert!(manager.is_editing(&second.id));
    assert_eq!(manager.snapshot().edit_draft.title, "Broken window");
    // 被丢弃的草稿不会发出请求
    assert_eq!(backend.request_count(), 1);
}

#[tokio::test]
async fn submitted_edit_is_reflected_after_reload() {
    let (backend, manager) = setup();
    let record = backend.seed("Leaky faucet", SUB);
    manager.load().await.unwrap();

    manager.begin_edit(&record);
    manager.update_edit_draft(|d| {
        d.title = "Dripping faucet".into();
        d.status = RequestStatus::InProgress;
        d.image_url = "https://img.example.com/faucet.png".into();
    });
    manager.submit_edit().await.unwrap();

    let state = manager.snapshot();
    assert_eq!(state.editing_id, None);
    let updated = &state.requests()[0];
    assert_eq!(updated.title, "Dripping faucet");
    assert_eq!(updated.status, RequestStatus::InProgress);
    assert_eq!(
        updated.image_url.as_deref(),
        Some("https://img.example.com/faucet.png")
    );
    assert_eq!(
        methods(&backend),
        vec![HttpMethod::Get, HttpMethod::Put, HttpMethod::Get]
    );
}

#[tokio::test]
async fn failed_edit_keeps_draft() {
    let (backend, manager) = setup();
    let record = backend.seed("Leaky faucet", SUB);
    manager.load().await.unwrap();

    manager.begin_edit(&record);
    manager.update_edit_draft(|d| d.title = "Dripping faucet".into());
    backend.fail_next_with_status(404, "Not Found");
    let err = manager.submit_edit().await.unwrap_err();

    assert!(err.is_not_found());
    let state = manager.snapshot();
    assert!(state.is_editing(&record.id));
    assert_eq!(state.edit_draft.title, "Dripping faucet");
    assert_eq!(state.notice.as_deref(), Some(UPDATE_FAILED_MESSAGE));
    assert_eq!(titles(&manager), vec!["Leaky faucet"]);
}

#[tokio::test]
async fn failed_reload_after_edit_fails_closed() {
    let (backend, manager) = setup();
    let record = backend.seed("Leaky faucet", SUB);
    manager.load().await.unwrap();

    manager.begin_edit(&record);
    manager.update_edit_draft(|d| d.title = "Dripping faucet".into());
    backend.pass_next();
    backend.fail_next_with_status(500, "boom");
    let err = manager.submit_edit().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Server);
    assert_fails_closed(&manager);
    assert_eq!(manager.snapshot().editing_id, None);
    assert_eq!(backend.records()[0].title, "Dripping faucet");
}

#[tokio::test]
async fn blank_draft_is_not_submitted() {
    let (backend, manager) = setup();
    let record = backend.seed("Leaky faucet", SUB);
    manager.load().await.unwrap();

    manager.begin_edit(&record);
    manager.update_edit_draft(|d| d.description = " ".into());
    let err = manager.submit_edit().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(backend.request_count(), 1);
    assert!(manager.is_editing(&record.id));
}

#[tokio::test]
async fn cancel_edit_discards_draft() {
    let (backend, manager) = setup();
    let record = backend.seed("Leaky faucet", SUB);
    manager.load().await.unwrap();

    manager.begin_edit(&record);
    manager.update_edit_draft(|d| d.title = "Changed".into());
    manager.cancel_edit();

    let state = manager.snapshot();
    assert_eq!(state.editing_id, None);
    assert_eq!(state.edit_draft, EditDraft::default());
    assert_eq!(titles(&manager), vec!["Leaky faucet"]);
    assert_eq!(backend.request_count(), 1);
}

#[test]
fn draft_maps_blank_image_to_none() {
    let draft = EditDraft {
        title: " Leak ".into(),
        description: "Sink".into(),
        status: RequestStatus::Completed,
        image_url: "  ".into(),
    };
    let update = draft.to_update();
    assert_eq!(update.title, "Leak");
    assert_eq!(update.image_url, None);
}

// ===== 删除 =====

#[tokio::test]
async fn delete_waits_for_confirmation() {
    let (backend, manager) = setup();
    let record = backend.seed("Leaky faucet", SUB);
    manager.load().await.unwrap();

    manager.request_delete(&record.id);
    assert_eq!(manager.snapshot().pending_delete, Some(record.id.clone()));
    manager.cancel_delete();
    assert_eq!(manager.snapshot().pending_delete, None);
    assert_eq!(backend.request_count(), 1);

    manager.request_delete(&record.id);
    manager.confirm_delete().await.unwrap();

    assert_eq!(manager.snapshot().view(), DashboardView::Empty);
    assert_eq!(
        methods(&backend),
        vec![HttpMethod::Get, HttpMethod::Delete, HttpMethod::Get]
    );
}

#[tokio::test]
async fn deleting_edited_request_clears_edit_state() {
    let (backend, manager) = setup();
    let record = backend.seed("Leaky faucet", SUB);
    manager.load().await.unwrap();

    manager.begin_edit(&record);
    manager.request_delete(&record.id);
    manager.confirm_delete().await.unwrap();

    assert_eq!(manager.snapshot().editing_id, None);
}

#[tokio::test]
async fn failed_delete_keeps_list() {
    let (backend, manager) = setup();
    let record = backend.seed("Leaky faucet", SUB);
    manager.load().await.unwrap();

    manager.request_delete(&record.id);
    backend.fail_next_with_status(403, "Forbidden");
    let err = manager.confirm_delete().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Forbidden);
    let state = manager.snapshot();
    assert_eq!(state.notice.as_deref(), Some(DELETE_FAILED_MESSAGE));
    assert_eq!(state.pending_delete, None);
    assert_eq!(titles(&manager), vec!["Leaky faucet"]);
}

#[tokio::test]
async fn failed_reload_after_delete_fails_closed() {
    let (backend, manager) = setup();
    let record = backend.seed("Leaky faucet", SUB);
    backend.seed("Broken window", SUB);
    manager.load().await.unwrap();

    manager.request_delete(&record.id);
    backend.pass_next();
    backend.fail_next_with_transport("offline");
    let err = manager.confirm_delete().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_fails_closed(&manager);
    assert_eq!(backend.records().len(), 1);
}

#[tokio::test]
async fn confirm_without_pending_delete_is_rejected() {
    let (backend, manager) = setup();
    let err = manager.confirm_delete().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(backend.request_count(), 0);
}

// ===== 并发与生命周期 =====

#[tokio::test]
async fn second_operation_is_rejected_while_one_is_in_flight() {
    let (backend, manager) = setup();
    let release = backend.hold_next();

    let (first, second) = futures::join!(
        manager.create("Broken window", "Glass cracked"),
        async {
            let second = manager.create("Leaky faucet", "Drips").await;
            let _ = release.send(());
            second
        }
    );

    first.unwrap();
    assert_eq!(second.unwrap_err().kind(), ErrorKind::Busy);
    assert_eq!(backend.records().len(), 1);
    assert_eq!(backend.records()[0].title, "Broken window");
    assert!(!manager.snapshot().is_busy());
}

#[tokio::test]
async fn local_edits_are_allowed_while_busy() {
    let (backend, manager) = setup();
    let record = backend.seed("Leaky faucet", SUB);
    let release = backend.hold_next();

    let (loaded, ()) = futures::join!(manager.load(), async {
        assert!(manager.snapshot().is_busy());
        manager.begin_edit(&record);
        let _ = release.send(());
    });

    loaded.unwrap();
    assert!(manager.is_editing(&record.id));
}

#[tokio::test]
async fn results_after_detach_are_dropped() {
    let (backend, manager) = setup();
    backend.seed("Leaky faucet", SUB);
    let release = backend.hold_next();

    let (loaded, ()) = futures::join!(manager.load(), async {
        manager.detach();
        let _ = release.send(());
    });

    assert!(loaded.is_ok());
    assert!(manager.is_detached());
    assert_eq!(manager.snapshot().view(), DashboardView::Loading);
}

#[tokio::test]
async fn observer_sees_final_state() {
    let (backend, manager) = setup();
    backend.seed("Leaky faucet", SUB);

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    manager.on_change(move |state| sink.borrow_mut().push(state.clone()));

    manager.load().await.unwrap();

    let seen = seen.borrow();
    assert!(seen.first().is_some_and(|s| s.is_busy()));
    let last = seen.last().unwrap();
    assert!(!last.is_busy());
    assert_eq!(last.requests().len(), 1);
}

#[tokio::test]
async fn dismiss_notice_clears_message() {
    let (_, manager) = setup();
    let _ = manager.create("", "").await;
    assert!(manager.snapshot().notice.is_some());
    manager.dismiss_notice();
    assert_eq!(manager.snapshot().notice, None);
}
