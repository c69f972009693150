// SPDX-FileCopyrightText: 2026 TeleEye Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the complete TeleEye pipeline.
//!
//! Each test creates an isolated TestHarness with mock channel and either
//! in-memory stores or a temp SQLite database. Tests are independent and
//! order-insensitive.

use std::time::Duration;

use teleeye_core::types::{EventKind, GroupKind, ResolvedGroup};
use teleeye_core::{AddStage, Flow, IndexStage};
use teleeye_test_utils::TestHarness;

fn group(chat_id: i64, handle: &str, title: &str, members: u32) -> ResolvedGroup {
    ResolvedGroup {
        chat_id,
        handle: handle.to_string(),
        title: title.to_string(),
        kind: GroupKind::Supergroup,
        description: String::new(),
        member_count: members,
    }
}

async fn directory() -> TestHarness {
    TestHarness::builder()
        .with_group(group(-1001, "nightyworld", "Nighty World", 2048))
        .with_group(group(-1002, "rustlang_cn", "Rust 中文社区", 15300))
        .build()
        .await
        .unwrap()
}

async fn index(harness: &TestHarness, chat_id: i64, handle: &str, tags: &str) {
    harness.send_text(chat_id, "/index").await.unwrap();
    harness.send_text(chat_id, handle).await.unwrap();
    harness.send_text(chat_id, tags).await.unwrap();
}

// ---- Full conversations ----

#[tokio::test]
async fn index_conversation_creates_record_within_tag_bound() {
    let harness = directory().await;

    let replies = harness.send_text(7, "/index").await.unwrap();
    assert!(replies[0].contains("t.me"));

    let replies = harness.send_text(7, "https://t.me/nightyworld").await.unwrap();
    assert!(replies[0].starts_with("Send a few keywords"));

    let replies = harness
        .send_text(7, "rust golang 夜猫子 linux docker")
        .await
        .unwrap();
    assert!(replies[0].starts_with("Congratulations!"));

    let record = harness.memory_records.group("nightyworld").unwrap();
    assert_eq!(record.handle, "nightyworld");
    assert_eq!(record.member_count, 2048);
    assert!(record.tags.len() <= harness.config.conversation.max_tags);
    assert_eq!(record.tags, vec!["rust", "golang", "夜猫子"]);
    assert!(harness.state.get(7).await.unwrap().is_none());
}

#[tokio::test]
async fn add_conversation_uses_category_button() {
    let harness = directory().await;

    harness.send_text(7, "/add").await.unwrap();
    let (sent, _) = harness
        .dispatch(harness.event(7, EventKind::Text("@rustlang_cn".into())))
        .await
        .unwrap();
    assert!(sent[0].keyboard.is_some());

    let replies = harness.send_callback(7, "Programming").await.unwrap();
    assert!(replies[0].starts_with("Send a few keywords"));
    let state = harness.state.get(7).await.unwrap().unwrap();
    assert_eq!(state.flow, Flow::Add(AddStage::CategoryReceived));

    harness.send_text(7, "rust 编程").await.unwrap();
    let record = harness.memory_records.group("rustlang_cn").unwrap();
    assert_eq!(record.category.as_deref(), Some("Programming"));
    assert_eq!(record.tags, vec!["rust", "编程"]);
}

#[tokio::test]
async fn full_conversation_over_sqlite() {
    let harness = TestHarness::builder()
        .with_group(group(-1001, "nightyworld", "Nighty World", 2048))
        .with_sqlite()
        .build()
        .await
        .unwrap();

    index(&harness, 7, "nightyworld", "rust golang").await;
    let replies = harness.send_text(9, "golang").await.unwrap();
    assert!(replies[0].contains("https://t.me/nightyworld"));
    assert!(replies[0].contains("2.0k members"));
}

// ---- Re-indexing ----

#[tokio::test]
async fn reindex_moves_group_between_tags() {
    let harness = directory().await;
    index(&harness, 7, "nightyworld", "xx yy").await;
    index(&harness, 7, "nightyworld", "yy zz").await;

    assert!(!harness.memory_records.tag_members("xx").contains("nightyworld"));
    assert!(harness.memory_records.tag_members("yy").contains("nightyworld"));
    assert!(harness.memory_records.tag_members("zz").contains("nightyworld"));

    let replies = harness.send_text(8, "yy").await.unwrap();
    assert!(replies[0].contains("1. Nighty World"));
}

#[tokio::test]
async fn reindex_with_same_tags_issues_no_index_calls() {
    let harness = directory().await;
    index(&harness, 7, "nightyworld", "rust golang").await;
    let calls = harness.memory_records.index_call_count();

    index(&harness, 7, "nightyworld", "golang rust").await;
    assert_eq!(harness.memory_records.index_call_count(), calls);
}

// ---- Search ----

#[tokio::test]
async fn search_ranks_by_matching_tags() {
    let harness = directory().await;
    index(&harness, 7, "nightyworld", "rust golang").await;
    index(&harness, 7, "rustlang_cn", "rust").await;

    let replies = harness.send_text(8, "rust golang").await.unwrap();
    let text = &replies[0];
    let first = text.find("Nighty World").unwrap();
    let second = text.find("Rust 中文社区").unwrap();
    assert!(first < second);
    assert!(text.contains("15.3k members"));
}

#[tokio::test]
async fn invalid_only_query_fetches_nothing() {
    let harness = directory().await;
    let replies = harness.send_text(8, "! ? c").await.unwrap();
    assert_eq!(replies, vec!["No groups found for \"! ? c\"."]);
    assert_eq!(harness.memory_records.tag_fetch_count(), 0);
}

#[tokio::test]
async fn search_reply_follows_sender_language() {
    let harness = TestHarness::builder()
        .with_language(Some("zh-hans"))
        .build()
        .await
        .unwrap();
    let replies = harness.send_text(8, "夜猫子").await.unwrap();
    assert_eq!(replies, vec!["没有找到与 \"夜猫子\" 相关的群组"]);
}

// ---- Validation and errors ----

#[tokio::test]
async fn invalid_handle_keeps_stage_and_state() {
    let harness = directory().await;
    harness.send_text(7, "/index").await.unwrap();

    let replies = harness.send_text(7, "1nightyworld").await.unwrap();
    assert!(replies[0].starts_with("Invalid group username"));

    let state = harness.state.get(7).await.unwrap().unwrap();
    assert_eq!(state.flow, Flow::Index(IndexStage::Received));
}

#[tokio::test]
async fn unknown_group_keeps_stage() {
    let harness = directory().await;
    harness.send_text(7, "/index").await.unwrap();
    let replies = harness.send_text(7, "ghostgroup").await.unwrap();
    assert_eq!(replies, vec!["Found no group or channel, please check your input."]);
    let state = harness.state.get(7).await.unwrap().unwrap();
    assert_eq!(state.flow, Flow::Index(IndexStage::Received));
}

#[tokio::test]
async fn store_failure_replies_and_holds() {
    let harness = directory().await;
    harness.send_text(7, "/index").await.unwrap();
    harness.send_text(7, "nightyworld").await.unwrap();

    harness.memory_records.set_fail_upsert(true);
    let replies = harness.send_text(7, "rust").await.unwrap();
    assert_eq!(replies, vec!["Index failed, please try again later."]);
    let state = harness.state.get(7).await.unwrap().unwrap();
    assert_eq!(state.flow, Flow::Index(IndexStage::LinkReceived));
}

// ---- Commands ----

#[tokio::test]
async fn cancel_discards_conversation() {
    let harness = directory().await;
    harness.send_text(7, "/add").await.unwrap();
    assert_eq!(harness.send_text(7, "/cancel").await.unwrap(), vec!["Cancelled."]);
    assert_eq!(
        harness.send_text(7, "/cancel").await.unwrap(),
        vec!["There is nothing to cancel."]
    );
}

#[tokio::test]
async fn unknown_command_is_answered() {
    let harness = directory().await;
    let replies = harness.send_text(7, "/frobnicate").await.unwrap();
    assert_eq!(replies, vec!["Unknown command. Send /help for the command list."]);
}

#[tokio::test]
async fn new_command_replaces_open_conversation() {
    let harness = directory().await;
    harness.send_text(7, "/index").await.unwrap();
    harness.send_text(7, "nightyworld").await.unwrap();
    harness.send_text(7, "/add").await.unwrap();

    let state = harness.state.get(7).await.unwrap().unwrap();
    assert_eq!(state.flow, Flow::Add(AddStage::Received));
    assert!(state.group.handle.is_empty());
}

// ---- Membership ----

#[tokio::test]
async fn bot_added_to_public_group_indexes_it() {
    let harness = TestHarness::builder()
        .with_group(ResolvedGroup {
            description: "Rust and golang night owls".into(),
            ..group(-1001, "nightyworld", "Nighty World", 2048)
        })
        .build()
        .await
        .unwrap();

    let report = harness
        .add_bot_to_group(-1001, "nightyworld")
        .await
        .unwrap()
        .expect("index report");
    assert!(report.is_complete());

    let record = harness.memory_records.group("nightyworld").unwrap();
    assert!(!record.tags.is_empty());
    assert!(record.tags.len() <= harness.config.conversation.max_tags);
    for tag in &record.tags {
        assert!(harness.memory_records.tag_members(tag).contains("nightyworld"));
    }
}

// ---- TTL ----

#[tokio::test(start_paused = true)]
async fn expired_conversation_turns_text_into_search() {
    let harness = directory().await;
    harness.send_text(7, "/index").await.unwrap();

    let ttl = harness.config.conversation.ttl();
    tokio::time::advance(ttl + Duration::from_secs(1)).await;

    let replies = harness.send_text(7, "nightyworld").await.unwrap();
    assert_eq!(replies, vec!["No groups found for \"nightyworld\"."]);
    assert!(harness.state.get(7).await.unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn activity_refreshes_the_ttl() {
    let harness = directory().await;
    harness.send_text(7, "/index").await.unwrap();

    let ttl = harness.config.conversation.ttl();
    tokio::time::advance(ttl - Duration::from_secs(10)).await;
    harness.send_text(7, "nightyworld").await.unwrap();
    tokio::time::advance(ttl - Duration::from_secs(10)).await;

    let state = harness.state.get(7).await.unwrap().unwrap();
    assert_eq!(state.flow, Flow::Index(IndexStage::LinkReceived));
}
