//! End-to-end flows through the App against the in-memory service.
//!
//! Tests own the completion channel: each spawned service call sends one
//! event, which the test receives and feeds back through `App::apply`,
//! making the async handoffs deterministic.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use taskdeck_core::task::CreateTask;
use taskdeck_service::{LocalService, TaskService};
use taskdeck_tui::app::{App, Screen};
use taskdeck_tui::components::Notice;
use taskdeck_tui::detail::TaskSlot;
use taskdeck_tui::event::AppEvent;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn char_key(c: char) -> KeyEvent {
    key(KeyCode::Char(c))
}

fn ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

fn type_str(app: &mut App, s: &str) {
    for c in s.chars() {
        app.handle_key(char_key(c));
    }
}

async fn pump(app: &mut App, rx: &mut UnboundedReceiver<AppEvent>) {
    let event = rx.recv().await.unwrap();
    app.apply(event);
}

async fn seed(service: &LocalService, name: &str, command: &str) -> String {
    service
        .create_task(&CreateTask {
            name: name.to_string(),
            owner: "alice".to_string(),
            command: command.to_string(),
        })
        .await
        .unwrap()
        .id
}

/// Builds an App and pumps the initial list load.
async fn make_app(service: Arc<LocalService>) -> (App, UnboundedReceiver<AppEvent>) {
    let (tx, mut rx) = unbounded_channel();
    let svc: Arc<dyn TaskService> = service;
    let mut app = App::new(svc, tx);
    pump(&mut app, &mut rx).await;
    (app, rx)
}

fn list_len(app: &App) -> usize {
    match app.screen() {
        Screen::List(list) => list.tasks().len(),
        _ => panic!("expected list screen"),
    }
}

/// Navigates from the list to the first task's detail screen and pumps the
/// load, leaving the slot Ready.
async fn open_first_detail(app: &mut App, rx: &mut UnboundedReceiver<AppEvent>) {
    app.handle_key(key(KeyCode::Enter));
    assert!(matches!(app.screen(), Screen::Detail(_)));
    pump(app, rx).await;
    let Screen::Detail(detail) = app.screen() else {
        panic!("expected detail screen");
    };
    assert!(matches!(detail.slot(), TaskSlot::Ready(_)));
}

// ---- list and search ----

#[tokio::test]
async fn starts_on_list_with_tasks_loaded() {
    let service = Arc::new(LocalService::new());
    seed(&service, "Ping Test", "echo hi").await;
    let (app, _rx) = make_app(service).await;
    assert_eq!(list_len(&app), 1);
}

#[tokio::test]
async fn search_filters_and_escape_restores() {
    let service = Arc::new(LocalService::new());
    seed(&service, "Ping Test", "echo a").await;
    seed(&service, "deploy", "echo b").await;
    let (mut app, mut rx) = make_app(service).await;
    assert_eq!(list_len(&app), 2);

    app.handle_key(char_key('/'));
    type_str(&mut app, "ping");
    app.handle_key(key(KeyCode::Enter));
    pump(&mut app, &mut rx).await;
    assert_eq!(list_len(&app), 1);

    app.handle_key(key(KeyCode::Esc));
    pump(&mut app, &mut rx).await;
    assert_eq!(list_len(&app), 2);
}

#[tokio::test]
async fn blank_search_reloads_full_set() {
    let service = Arc::new(LocalService::new());
    seed(&service, "Ping Test", "echo a").await;
    let (mut app, mut rx) = make_app(service).await;

    app.handle_key(char_key('/'));
    type_str(&mut app, "   ");
    app.handle_key(key(KeyCode::Enter));
    pump(&mut app, &mut rx).await;
    assert_eq!(list_len(&app), 1);
}

// ---- create ----

#[tokio::test]
async fn create_flow_saves_and_opens_detail() {
    let service = Arc::new(LocalService::new());
    let (mut app, mut rx) = make_app(service).await;

    app.handle_key(char_key('n'));
    assert!(matches!(app.screen(), Screen::Create(_)));

    type_str(&mut app, "Ping Test");
    app.handle_key(key(KeyCode::Enter));
    type_str(&mut app, "alice");
    app.handle_key(key(KeyCode::Enter));
    type_str(&mut app, "echo hi");
    app.handle_key(key(KeyCode::Enter));

    pump(&mut app, &mut rx).await;
    let Screen::Create(create) = app.screen() else {
        panic!("expected create screen");
    };
    let saved = create.saved.as_ref().expect("task should be saved");
    assert!(!saved.id.is_empty());
    assert_eq!(saved.name, "Ping Test");
    // Form resets for the next task.
    assert!(create.form.name.is_empty());
    assert!(matches!(create.notice, Some(Notice::Success(_))));

    app.handle_key(ctrl('v'));
    assert!(matches!(app.screen(), Screen::Detail(_)));
    pump(&mut app, &mut rx).await;
    let Screen::Detail(detail) = app.screen() else {
        panic!("expected detail screen");
    };
    assert_eq!(detail.ready().unwrap().task.name, "Ping Test");
}

#[tokio::test]
async fn create_with_blank_name_is_rejected_locally() {
    let service = Arc::new(LocalService::new());
    let (mut app, mut rx) = make_app(service).await;

    app.handle_key(char_key('n'));
    // Jump straight to the command field and submit with a blank name.
    app.handle_key(key(KeyCode::Tab));
    app.handle_key(key(KeyCode::Tab));
    type_str(&mut app, "echo hi");
    app.handle_key(key(KeyCode::Enter));

    let Screen::Create(create) = app.screen() else {
        panic!("expected create screen");
    };
    assert!(create.form.error.is_some());
    // No request was issued.
    assert!(rx.try_recv().is_err());
}

// ---- detail: run ----

#[tokio::test]
async fn run_flow_shows_output_and_refreshes_history() {
    let service = Arc::new(LocalService::new());
    seed(&service, "Ping Test", "echo hi").await;
    let (mut app, mut rx) = make_app(service).await;
    open_first_detail(&mut app, &mut rx).await;

    app.handle_key(char_key('r'));
    pump(&mut app, &mut rx).await; // RunFinished, triggers the reload
    pump(&mut app, &mut rx).await; // TaskLoaded with fresh history

    let Screen::Detail(detail) = app.screen() else {
        panic!("expected detail screen");
    };
    let r = detail.ready().unwrap();
    assert!(!r.running);
    assert_eq!(r.task.executions.len(), 1);
    assert!(detail.terminal_output.contains("echo hi"));
    assert!(matches!(detail.notice, Some(Notice::Success(_))));
}

#[tokio::test]
async fn rejected_run_shows_error_and_skips_reload() {
    let service = Arc::new(LocalService::new());
    seed(&service, "danger", "sudo reboot").await;
    let (mut app, mut rx) = make_app(service).await;
    open_first_detail(&mut app, &mut rx).await;

    app.handle_key(char_key('r'));
    pump(&mut app, &mut rx).await;

    let Screen::Detail(detail) = app.screen() else {
        panic!("expected detail screen");
    };
    assert!(matches!(detail.notice, Some(Notice::Error(_))));
    assert!(detail.ready().unwrap().task.executions.is_empty());
    // Failure does not trigger a re-fetch.
    assert!(rx.try_recv().is_err());
}

// ---- detail: update ----

#[tokio::test]
async fn update_flow_renames_task() {
    let service = Arc::new(LocalService::new());
    seed(&service, "Ping Test", "echo hi").await;
    let (mut app, mut rx) = make_app(service).await;
    open_first_detail(&mut app, &mut rx).await;

    app.handle_key(char_key('e'));
    type_str(&mut app, " v2");
    app.handle_key(key(KeyCode::Enter));
    pump(&mut app, &mut rx).await; // UpdateFinished, triggers the reload
    pump(&mut app, &mut rx).await; // TaskLoaded

    let Screen::Detail(detail) = app.screen() else {
        panic!("expected detail screen");
    };
    let r = detail.ready().unwrap();
    assert!(r.update_form.is_none());
    assert_eq!(r.task.name, "Ping Test v2");
    assert!(matches!(detail.notice, Some(Notice::Success(_))));
}

// ---- detail: delete ----

#[tokio::test(start_paused = true)]
async fn delete_flow_returns_to_list_after_delay() {
    let service = Arc::new(LocalService::new());
    seed(&service, "Ping Test", "echo hi").await;
    let (mut app, mut rx) = make_app(service).await;
    open_first_detail(&mut app, &mut rx).await;

    app.handle_key(char_key('d'));
    app.handle_key(char_key('y'));
    pump(&mut app, &mut rx).await; // DeleteFinished
    let Screen::Detail(detail) = app.screen() else {
        panic!("expected detail screen");
    };
    assert!(matches!(detail.slot(), TaskSlot::Removed));

    // Paused time auto-advances through the navigation timer.
    pump(&mut app, &mut rx).await; // DeleteSettled
    assert!(matches!(app.screen(), Screen::List(_)));
    pump(&mut app, &mut rx).await; // fresh list load
    assert_eq!(list_len(&app), 0);
}

#[tokio::test]
async fn any_key_other_than_y_cancels_delete() {
    let service = Arc::new(LocalService::new());
    seed(&service, "Ping Test", "echo hi").await;
    let (mut app, mut rx) = make_app(service).await;
    open_first_detail(&mut app, &mut rx).await;

    app.handle_key(char_key('d'));
    app.handle_key(char_key('x'));

    let Screen::Detail(detail) = app.screen() else {
        panic!("expected detail screen");
    };
    let r = detail.ready().unwrap();
    assert!(!r.confirm_delete);
    assert!(!r.deleting);
    assert!(rx.try_recv().is_err());
}

// ---- slow completions for abandoned screens ----

#[tokio::test]
async fn slow_delete_of_abandoned_task_does_not_remove_current_one() {
    let service = Arc::new(LocalService::new());
    seed(&service, "alpha", "echo a").await;
    let beta_id = seed(&service, "beta", "echo b").await;
    let (mut app, mut rx) = make_app(service).await;

    // Open alpha's detail and confirm its delete.
    open_first_detail(&mut app, &mut rx).await;
    app.handle_key(char_key('d'));
    app.handle_key(char_key('y'));

    // Hold the delete completion, as if the response were slow, and
    // navigate to beta's detail in the meantime.
    let held = rx.recv().await.unwrap();
    app.handle_key(key(KeyCode::Esc));
    pump(&mut app, &mut rx).await; // fresh list, only beta remains
    assert_eq!(list_len(&app), 1);
    app.handle_key(key(KeyCode::Enter));
    pump(&mut app, &mut rx).await; // beta loaded

    // The straggler arrives; beta's slot must be untouched.
    app.apply(held);
    let Screen::Detail(detail) = app.screen() else {
        panic!("expected detail screen");
    };
    assert!(!matches!(detail.slot(), TaskSlot::Removed));
    assert_eq!(detail.ready().unwrap().task.id, beta_id);
    assert_eq!(detail.notice, None);
    // And no navigation timer was scheduled.
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn slow_run_of_abandoned_task_does_not_write_into_current_one() {
    let service = Arc::new(LocalService::new());
    seed(&service, "alpha", "echo a").await;
    seed(&service, "beta", "echo b").await;
    let (mut app, mut rx) = make_app(service).await;

    open_first_detail(&mut app, &mut rx).await;
    app.handle_key(char_key('r'));

    let held = rx.recv().await.unwrap();
    app.handle_key(key(KeyCode::Esc));
    pump(&mut app, &mut rx).await;
    app.handle_key(char_key('j'));
    app.handle_key(key(KeyCode::Enter));
    pump(&mut app, &mut rx).await; // beta loaded

    app.apply(held);
    let Screen::Detail(detail) = app.screen() else {
        panic!("expected detail screen");
    };
    // Alpha's output and success notice must not land on beta.
    assert!(detail.terminal_output.is_empty());
    assert_eq!(detail.notice, None);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn stale_create_completion_is_ignored_after_leaving_the_screen() {
    let service = Arc::new(LocalService::new());
    let (mut app, mut rx) = make_app(service).await;

    app.handle_key(char_key('n'));
    type_str(&mut app, "Ping Test");
    app.handle_key(key(KeyCode::Enter));
    type_str(&mut app, "alice");
    app.handle_key(key(KeyCode::Enter));
    type_str(&mut app, "echo hi");
    app.handle_key(key(KeyCode::Enter));

    // Hold the completion; leave and reopen the create screen.
    let held = rx.recv().await.unwrap();
    app.handle_key(key(KeyCode::Esc));
    pump(&mut app, &mut rx).await; // list reload
    app.handle_key(char_key('n'));

    app.apply(held);
    let Screen::Create(create) = app.screen() else {
        panic!("expected create screen");
    };
    assert!(create.saved.is_none());
    assert!(create.notice.is_none());
}

// ---- quitting ----

#[tokio::test]
async fn q_quits_from_list_but_not_from_search_input() {
    let service = Arc::new(LocalService::new());
    let (mut app, _rx) = make_app(service).await;

    app.handle_key(char_key('/'));
    app.handle_key(char_key('q'));
    assert!(!app.should_quit());

    app.handle_key(key(KeyCode::Esc));
    app.handle_key(char_key('q'));
    assert!(app.should_quit());
}

#[tokio::test]
async fn ctrl_c_quits_everywhere() {
    let service = Arc::new(LocalService::new());
    seed(&service, "Ping Test", "echo hi").await;
    let (mut app, mut rx) = make_app(service).await;
    open_first_detail(&mut app, &mut rx).await;

    app.handle_key(ctrl('c'));
    assert!(app.should_quit());
}

// ---- render smoke tests ----

#[tokio::test]
async fn renders_list_screen() {
    let service = Arc::new(LocalService::new());
    seed(&service, "Ping Test", "echo hi").await;
    let (app, _rx) = make_app(service).await;

    let backend = TestBackend::new(80, 24);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(|frame| app.render(frame)).unwrap();
}

#[tokio::test]
async fn renders_detail_with_update_modal_and_delete_dialog() {
    let service = Arc::new(LocalService::new());
    seed(&service, "Ping Test", "echo hi").await;
    let (mut app, mut rx) = make_app(service).await;
    open_first_detail(&mut app, &mut rx).await;

    let backend = TestBackend::new(80, 24);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(|frame| app.render(frame)).unwrap();

    app.handle_key(char_key('e'));
    terminal.draw(|frame| app.render(frame)).unwrap();
    app.handle_key(key(KeyCode::Esc));

    app.handle_key(char_key('d'));
    terminal.draw(|frame| app.render(frame)).unwrap();
}

#[tokio::test]
async fn renders_create_screen_with_saved_panel() {
    let service = Arc::new(LocalService::new());
    let (mut app, mut rx) = make_app(service).await;

    app.handle_key(char_key('n'));
    type_str(&mut app, "Ping Test");
    app.handle_key(key(KeyCode::Enter));
    type_str(&mut app, "alice");
    app.handle_key(key(KeyCode::Enter));
    type_str(&mut app, "echo hi");
    app.handle_key(key(KeyCode::Enter));
    pump(&mut app, &mut rx).await;

    let backend = TestBackend::new(80, 24);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(|frame| app.render(frame)).unwrap();
}
