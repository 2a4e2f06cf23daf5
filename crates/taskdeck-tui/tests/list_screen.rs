//! Failure and staleness behavior of the list screen, driven directly.

use taskdeck_core::task::Task;
use taskdeck_service::ServiceError;
use taskdeck_tui::components::Notice;
use taskdeck_tui::list::{ListScreen, LIST_FAILED_MSG, SEARCH_FAILED_MSG};

fn task(name: &str) -> Task {
    Task {
        id: format!("id-{name}"),
        name: name.to_string(),
        owner: "alice".to_string(),
        command: "echo hi".to_string(),
        executions: Vec::new(),
    }
}

#[test]
fn failed_initial_load_shows_notice_over_empty_set() {
    let mut list = ListScreen::new();
    list.begin_load(1);
    list.finish_load(1, Err(ServiceError::Internal(String::new())));
    assert!(list.tasks().is_empty());
    assert_eq!(list.notice, Some(Notice::Error(LIST_FAILED_MSG.to_string())));
}

#[test]
fn failed_search_keeps_previous_set_stable() {
    let mut list = ListScreen::new();
    list.begin_load(1);
    list.finish_load(1, Ok(vec![task("a"), task("b")]));

    list.begin_search(2);
    list.finish_search(
        2,
        "a".to_string(),
        Err(ServiceError::Internal(String::new())),
    );
    assert_eq!(list.tasks().len(), 2);
    assert_eq!(
        list.notice,
        Some(Notice::Error(SEARCH_FAILED_MSG.to_string()))
    );
    // The displayed set is still the unfiltered one.
    assert_eq!(list.active_query(), None);
}

#[test]
fn stale_search_result_cannot_clobber_fresher_load() {
    let mut list = ListScreen::new();
    list.begin_search(1);
    list.begin_load(2);
    list.finish_load(2, Ok(vec![task("a"), task("b")]));

    // The slow search response arrives after being superseded.
    list.finish_search(1, "a".to_string(), Ok(vec![task("a")]));
    assert_eq!(list.tasks().len(), 2);
    assert_eq!(list.active_query(), None);
}

#[test]
fn selection_clamps_when_the_set_shrinks() {
    let mut list = ListScreen::new();
    list.begin_load(1);
    list.finish_load(1, Ok(vec![task("a"), task("b"), task("c")]));
    list.select_next();
    list.select_next();
    assert_eq!(list.selected_task().unwrap().name, "c");

    list.begin_load(2);
    list.finish_load(2, Ok(vec![task("a")]));
    assert_eq!(list.selected_task().unwrap().name, "a");
}

#[test]
fn blank_search_submission_requests_a_plain_load() {
    let mut list = ListScreen::new();
    list.open_search();
    list.query.push_str("   ");
    assert_eq!(list.submit_search(), None);
    assert!(!list.searching);

    list.open_search();
    list.query.push_str("ping");
    assert_eq!(list.submit_search(), Some("ping".to_string()));
}
