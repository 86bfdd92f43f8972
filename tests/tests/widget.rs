//! Widget-level flows: form lifecycle, shared challenge state, thread
//! refresh and display order.

use std::sync::Arc;

use quibble_client::{CommentWidget, Draft, SortField};
use quibble_mock_server::MockServer;
use tests::{comment_at, valid_draft};

fn fill(form: &mut quibble_client::CommentForm, server: &MockServer, content: &str) {
    form.draft = Draft {
        parent: form.draft.parent,
        ..valid_draft(content)
    };
    form.draft.challenge_answer = server.test_challenge_answer().expect("challenge issued");
}

#[tokio::test]
async fn a_successful_submission_clears_the_form_and_refreshes_the_thread() {
    let server = Arc::new(MockServer::new());
    let mut widget = CommentWidget::new(server.clone());
    let mut form = widget.open_form(None).await;
    assert!(form.challenge.is_some());
    fill(&mut form, &server, "<i>hello</i>");

    let issued_before = server.test_challenges_issued();
    assert!(widget.submit_form(&mut form).await);

    assert_eq!(form.draft, Draft::default());
    assert!(form.alert.is_none());
    assert!(form.preview.is_none());
    // a fresh puzzle was fetched for the next attempt
    assert!(server.test_challenges_issued() > issued_before);
    assert_eq!(widget.thread.comments().len(), 1);
    assert_eq!(widget.thread.comments()[0].content, "<i>hello</i>");
}

#[tokio::test]
async fn a_failed_attempt_keeps_the_fields_but_spends_the_puzzle() {
    let server = Arc::new(MockServer::new());
    let mut widget = CommentWidget::new(server.clone());
    let mut form = widget.open_form(None).await;
    fill(&mut form, &server, "<strong>oops");

    assert!(!widget.submit_form(&mut form).await);

    assert_eq!(
        form.alert.as_deref(),
        Some("The comment contains unclosed HTML tags.")
    );
    // everything the user typed survives, except the spent answer
    assert_eq!(form.draft.content, "<strong>oops");
    assert_eq!(form.draft.username, "ada");
    assert!(form.draft.challenge_answer.is_empty());
    assert!(form.challenge.is_some());
    assert!(widget.thread.comments().is_empty());
}

#[tokio::test]
async fn the_validators_wording_becomes_the_alert() {
    let server = Arc::new(MockServer::new());
    server.test_ban_word("pineapple");
    let mut widget = CommentWidget::new(server.clone());
    let mut form = widget.open_form(None).await;
    fill(&mut form, &server, "pineapple on pizza");

    assert!(!widget.submit_form(&mut form).await);
    assert_eq!(
        form.alert.as_deref(),
        Some("The word \"pineapple\" is not welcome here.")
    );
}

#[tokio::test]
async fn reply_forms_nest_their_comment_under_the_parent() {
    let server = Arc::new(MockServer::new());
    let mut widget = CommentWidget::new(server.clone());

    let mut top = widget.open_form(None).await;
    fill(&mut top, &server, "first!");
    assert!(widget.submit_form(&mut top).await);
    let parent_id = widget.thread.comments()[0].id;

    let mut reply = widget.open_form(Some(parent_id)).await;
    fill(&mut reply, &server, "welcome");
    assert!(widget.submit_form(&mut reply).await);

    // the reply form stays aimed at its parent after clearing
    assert_eq!(reply.draft.parent, Some(parent_id));
    let top_level = widget.thread.comments();
    assert_eq!(top_level.len(), 1);
    assert_eq!(top_level[0].replies.len(), 1);
    assert_eq!(top_level[0].replies[0].content, "welcome");
}

#[tokio::test]
async fn one_forms_attempt_invalidates_the_other_forms_puzzle() {
    let server = Arc::new(MockServer::new());
    let mut widget = CommentWidget::new(server.clone());

    let mut first = widget.open_form(None).await;
    fill(&mut first, &server, "draft one");
    let first_answer = first.draft.challenge_answer.clone();

    // a second form refreshes the shared session; the displayed puzzle
    // (and its answer) move on
    let mut second = widget.open_form(None).await;
    fill(&mut second, &server, "draft two");
    assert!(widget.submit_form(&mut second).await);

    first.draft.challenge_answer = first_answer;
    assert!(!widget.submit_form(&mut first).await);
    assert!(first.alert.is_some());
    assert_eq!(widget.thread.comments().len(), 1);
}

#[tokio::test]
async fn preview_fills_the_form_without_submitting() {
    let server = Arc::new(MockServer::new());
    let mut widget = CommentWidget::new(server.clone());
    let mut form = widget.open_form(None).await;
    fill(&mut form, &server, "<code>let x = 1;</code><div>hm</div>");

    widget.preview_form(&mut form).await;

    assert_eq!(
        form.preview.as_deref(),
        Some("<code>let x = 1;</code>hm")
    );
    assert!(widget.thread.comments().is_empty());
    assert_eq!(server.test_verify_calls(), 0);
}

#[tokio::test]
async fn refresh_orders_the_seeded_tree_for_display() {
    let server = Arc::new(MockServer::new());
    server.test_seed_comments(vec![
        comment_at(1, "ada", 10, vec![comment_at(4, "dan", 11, vec![]), comment_at(5, "eve", 12, vec![])]),
        comment_at(2, "ben", 30, vec![]),
        comment_at(3, "cyn", 20, vec![]),
    ]);
    let mut widget = CommentWidget::with_page_size(server.clone(), 2);
    widget.refresh().await.expect("fetching seeded comments");

    // newest first, windowed to the first page of two
    let visible: Vec<i64> = widget.thread.visible_page().iter().map(|c| c.id.0).collect();
    assert_eq!(visible, vec![2, 3]);
    assert_eq!(widget.thread.page_count(), 2);

    // replies read newest-first whatever the table sort
    widget.thread.sort_clicked(SortField::Author);
    let ada = &widget.thread.visible_page()[0];
    assert_eq!(ada.username, "ada");
    let reply_ids: Vec<i64> = ada.replies.iter().map(|c| c.id.0).collect();
    assert_eq!(reply_ids, vec![5, 4]);
}
