//! Integration tests for the normalization pipeline.
//!
//! These drive the public API end to end: raw events in, records out.

use std::collections::HashSet;

use chatnorm::prelude::*;

const T0: i64 = 1_705_314_600_000; // 2024-01-15T10:30:00Z

// ============================================================================
// Helpers
// ============================================================================

fn channels() -> Vec<ChannelDescriptor> {
    vec![
        ChannelDescriptor::new("ch-fb", "FACEBOOK"),
        ChannelDescriptor::new("ch-line", "LINE"),
    ]
}

fn rules() -> Vec<FlowRule> {
    vec![FlowRule::new("BOOKING", ["book.*room"])]
}

fn human(ts: i64, payload: &str) -> RawEvent {
    RawEvent::from_payload("ch-fb", ts, EventSource::Human, payload).with_interact_with("page")
}

fn bot(ts: i64, payload: &str) -> RawEvent {
    RawEvent::from_payload("ch-fb", ts, EventSource::Automation, payload)
        .with_interact_with("u1")
        .with_channel_type("FACEBOOK")
}

fn single_user(events: Vec<RawEvent>) -> UserEvents {
    let mut users = UserEvents::new();
    users.insert("u1".to_string(), events);
    users
}

fn run_one(event: RawEvent) -> NormalizedRecord {
    let mut records = normalize(channels(), &rules(), &single_user(vec![event])).unwrap();
    assert_eq!(records.len(), 1);
    records.remove(0)
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_human_plain_text() {
    let record = run_one(human(T0, r#"{"text": "hello"}"#));

    assert_eq!(record.message_type, MessageType::Text);
    assert_eq!(record.message, "hello");
    assert_eq!(record.language, Language::Eng);
    assert_eq!(record.flow, "UNKNOWN");
    assert_eq!(record.channel_type, "FACEBOOK");
    assert_eq!(record.source, EventSource::Human);
    assert_eq!(record.user_id, "u1");
    assert_eq!(record.interact_with, "page");
}

#[test]
fn test_human_quick_reply_thai() {
    let record = run_one(human(
        T0,
        r#"{"quick_reply": {"payload": "GREETING"}, "text": "สวัสดี"}"#,
    ));

    assert_eq!(record.message_type, MessageType::QuickReply);
    assert_eq!(record.message, "สวัสดี");
    assert_eq!(record.language, Language::Thai);
    assert_eq!(record.flow, "UNKNOWN");
}

#[test]
fn test_bot_text_matches_flow() {
    let record = run_one(bot(T0, r#"[{"text": "book a room"}]"#));

    assert_eq!(record.message_type, MessageType::Text);
    assert_eq!(record.message, "book a room");
    assert_eq!(record.flow, "BOOKING");
    assert_eq!(record.language, Language::Eng);
    assert_eq!(record.source, EventSource::Automation);
}

#[test]
fn test_bot_image_attachment() {
    let record = run_one(bot(
        T0,
        r#"[{"attachment": {"type": "image", "payload": {"url": "http://x/y.jpg"}}}]"#,
    ));

    assert_eq!(record.message_type, MessageType::Image);
    assert_eq!(record.language, Language::Unknown);
    assert_eq!(record.message, "<IMAGE ATTACHMENT:http://x/y.jpg>");
    assert_eq!(record.flow, "UNKNOWN");
}

#[test]
fn test_bot_malformed_sequence_is_a_warning() {
    let users = single_user(vec![bot(
        T0,
        r#"[{"sticker": 42}, {"text": "book a room"}]"#,
    )]);
    let pipeline = Pipeline::new(ChannelDirectory::new(channels()), &rules(), PipelineConfig::new())
        .unwrap();

    let out = pipeline.run(&users).unwrap();

    assert_eq!(out.records.len(), 1);
    assert_eq!(out.records[0].message_type, MessageType::Unknown);
    assert_eq!(out.records[0].message, "");
    assert_eq!(out.records[0].flow, "UNKNOWN");
    assert_eq!(out.warnings.len(), 1);
    assert!(out.warnings[0].is_malformed_sequence());
    assert_eq!(out.stats.warnings, 1);
}

#[test]
fn test_bot_sequence_classifies_first_part_only() {
    let record = run_one(bot(
        T0,
        r#"[{"message": {"text": "book a room"}}, {"message": {"text": "anything else?"}}]"#,
    ));
    assert_eq!(record.message_type, MessageType::SequenceOfMessage);
    assert_eq!(record.message, "book a room");
    assert_eq!(record.flow, "BOOKING");

    let record = run_one(bot(T0, r#"[{"text": "hi"}, {"text": "book a room"}]"#));
    assert_eq!(record.message_type, MessageType::UnknownSequenceOfMessage);
    assert_eq!(record.flow, "UNKNOWN");
}

// ============================================================================
// Run-wide properties
// ============================================================================

#[test]
fn test_records_follow_event_time_per_user() {
    let users = single_user(vec![
        bot(T0 + 2_000, r#"[{"text": "book a room"}]"#),
        human(T0, r#"{"text": "first"}"#),
        human(T0 + 1_000, r#"{"text": "second"}"#),
    ]);

    let records = normalize(channels(), &rules(), &users).unwrap();
    let messages: Vec<&str> = records.iter().map(|r| r.message.as_str()).collect();
    assert_eq!(messages, vec!["first", "second", "book a room"]);
}

#[test]
fn test_record_ids_unique_across_users() {
    let mut users = UserEvents::new();
    for u in 0..20 {
        let events = (0..10)
            .map(|i| human(T0 + i, &format!(r#"{{"text": "message {i}"}}"#)))
            .collect();
        users.insert(format!("user-{u}"), events);
    }

    let records = normalize(channels(), &rules(), &users).unwrap();
    assert_eq!(records.len(), 200);

    let ids: HashSet<_> = records.iter().map(|r| r.record_id).collect();
    assert_eq!(ids.len(), records.len());
}

#[test]
fn test_utc_and_thai_timestamps_are_same_instant() {
    let record = run_one(human(T0 + 123, r#"{"text": "hello"}"#));

    assert_eq!(record.utc_timestamp.timestamp_millis(), T0 + 123);
    assert_eq!(record.thai_timestamp.timestamp_millis(), T0 + 123);
    assert_eq!(record.thai_timestamp.offset().local_minus_utc(), 7 * 3600);
    assert_eq!(
        record.thai_timestamp.to_rfc3339(),
        "2024-01-15T17:30:00.123+07:00"
    );
}

#[test]
fn test_abort_policy_fails_run_on_bad_event() {
    let users = single_user(vec![
        human(T0, r#"{"text": "ok"}"#),
        RawEvent::new("ch-fb", T0 + 1, EventSource::Human, "!!! not base64 !!!"),
    ]);

    let err = normalize(channels(), &rules(), &users).unwrap_err();
    assert!(err.is_decode());
    assert!(err.to_string().contains("u1"));
}

#[test]
fn test_skip_policy_reports_and_continues() {
    let mut users = single_user(vec![
        human(T0, r#"{"text": "ok"}"#),
        RawEvent::new("ch-fb", T0 + 1, EventSource::Human, "!!! not base64 !!!"),
        RawEvent::from_payload("ch-unknown", T0 + 2, EventSource::Human, r#"{"text": "lost"}"#),
    ]);
    users.insert("u2".into(), vec![human(T0, "not json")]);

    let config = PipelineConfig::new().with_error_policy(ErrorPolicy::Skip);
    let pipeline = Pipeline::new(ChannelDirectory::new(channels()), &rules(), config).unwrap();
    let out = pipeline.run(&users).unwrap();

    assert_eq!(out.records.len(), 1);
    assert_eq!(out.stats.events, 4);
    assert_eq!(out.stats.skipped, 3);
    assert_eq!(out.skipped.len(), 3);
    assert!(out.skipped.iter().any(ChatnormError::is_decode));
    assert!(out.skipped.iter().any(ChatnormError::is_unresolved_channel));
    assert!(out.skipped.iter().any(ChatnormError::is_parse));
}

#[test]
fn test_invalid_rule_rejected_before_processing() {
    let rules = vec![FlowRule::new("BROKEN", ["(unclosed"])];
    let err = Pipeline::new(ChannelDirectory::new(channels()), &rules, PipelineConfig::new())
        .unwrap_err();
    assert!(matches!(err, ChatnormError::InvalidPattern { .. }));
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_matches_sequential() {
    let mut users = UserEvents::new();
    for u in 0..8 {
        users.insert(
            format!("user-{u}"),
            vec![
                bot(T0 + 5, r#"[{"text": "book a room"}]"#),
                human(T0, r#"{"text": "hi"}"#),
            ],
        );
    }
    let directory = ChannelDirectory::new(channels());

    let sequential = Pipeline::new(directory.clone(), &rules(), PipelineConfig::new())
        .unwrap()
        .run(&users)
        .unwrap();
    let parallel = Pipeline::new(directory, &rules(), PipelineConfig::new().with_parallel(true))
        .unwrap()
        .run(&users)
        .unwrap();

    assert_eq!(parallel.stats, sequential.stats);

    let key = |r: &NormalizedRecord| (r.user_id.clone(), r.utc_timestamp, r.message.clone());
    let mut a: Vec<_> = sequential.records.iter().map(key).collect();
    let mut b: Vec<_> = parallel.records.iter().map(key).collect();
    a.sort();
    b.sort();
    assert_eq!(a, b);
}
