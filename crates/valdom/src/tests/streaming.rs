//! Progressive parser sessions: event order, batching, pass-through,
//! cancellation and buffer pooling.

use alloc::{format, rc::Rc, string::String, vec, vec::Vec};

use super::support::{Event, RecordingVisitor, chunks_of, normalized};
use crate::{BufferPool, ProgressiveParser, json::stream::MAX_BATCH_LEN};

fn parser(max_token_size: usize) -> ProgressiveParser<RecordingVisitor> {
    ProgressiveParser::new(RecordingVisitor::default(), BufferPool::new(), max_token_size)
}

/// Runs one full session over the given chunks and returns the events.
fn run(text: &str, chunk_size: usize, max_token_size: usize) -> Vec<Event> {
    let mut parser = parser(max_token_size);
    parser.begin();
    for chunk in chunks_of(text.as_bytes(), chunk_size) {
        assert!(parser.parse_data(chunk), "chunk rejected");
    }
    assert!(parser.finish());
    parser.into_visitor().events
}

#[test]
fn event_order_byte_by_byte() {
    let events = run(r#"{"a":1,"b":[1,2,3],"c":"x"}"#, 1, 8);
    assert_eq!(
        events,
        vec![
            Event::Begin,
            Event::BeginStruct,
            Event::BeginAttribute("a".into()),
            Event::Ints(vec![1]),
            Event::FinishAttribute("a".into()),
            Event::BeginAttribute("b".into()),
            Event::BeginList,
            Event::Ints(vec![1, 2, 3]),
            Event::FinishList,
            Event::FinishAttribute("b".into()),
            Event::BeginAttribute("c".into()),
            Event::Str("x".into()),
            Event::FinishAttribute("c".into()),
            Event::FinishStruct,
            Event::Flush,
            Event::Finish,
        ]
    );
}

#[test]
fn scalar_root_session() {
    assert_eq!(
        run(r#""hello""#, 3, 16),
        vec![
            Event::Begin,
            Event::Str("hello".into()),
            Event::Flush,
            Event::Finish,
        ]
    );
}

#[test]
fn numeric_batches_cap_out() {
    let mut text = String::from("[");
    for i in 0..600 {
        if i > 0 {
            text.push(',');
        }
        text.push_str(&format!("{i}"));
    }
    text.push(']');

    let events = run(&text, 7, 16);
    let batches: Vec<&Vec<i64>> = events
        .iter()
        .filter_map(|e| match e {
            Event::Ints(v) => Some(v),
            _ => None,
        })
        .collect();
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].len(), MAX_BATCH_LEN);
    assert_eq!(batches[1].len(), 600 - MAX_BATCH_LEN);
    assert_eq!(batches[0][0], 0);
    assert_eq!(batches[1][87], 599);
}

#[test]
fn batch_splits_on_type_change() {
    let events = run("[1,2,2.5,3,18446744073709551615]", 4, 24);
    assert_eq!(
        events,
        vec![
            Event::Begin,
            Event::BeginList,
            Event::Ints(vec![1, 2]),
            Event::Floats(vec![2.5]),
            Event::Ints(vec![3]),
            Event::Uints(vec![18_446_744_073_709_551_615]),
            Event::FinishList,
            Event::Flush,
            Event::Finish,
        ]
    );
}

#[test]
fn non_numeric_list_elements_interleave() {
    let events = run(r#"[1,"x",2,null,true]"#, 5, 16);
    assert_eq!(
        events,
        vec![
            Event::Begin,
            Event::BeginList,
            Event::Ints(vec![1]),
            Event::Str("x".into()),
            Event::Ints(vec![2]),
            Event::Null,
            Event::Bool(true),
            Event::FinishList,
            Event::Flush,
            Event::Finish,
        ]
    );
}

#[test]
fn trailing_bytes_pass_through() {
    let mut parser = parser(4);
    parser.begin();
    assert!(parser.parse_data(br#"{"a":1} tr"#));
    assert!(parser.parse_data(b"ailing"));
    assert!(parser.finish());

    let events = normalized(&parser.into_visitor().events);
    assert_eq!(
        events,
        vec![
            Event::Begin,
            Event::BeginStruct,
            Event::BeginAttribute("a".into()),
            Event::Ints(vec![1]),
            Event::FinishAttribute("a".into()),
            Event::FinishStruct,
            Event::Unparsed(b" trailing".to_vec()),
            Event::Flush,
            Event::Finish,
        ]
    );
}

#[test]
fn cancellation_pauses_and_resumes() {
    let mut parser = parser(2);
    parser.visitor_mut().budget = Some(2);
    parser.begin();
    assert!(!parser.parse_data(b"[1,2,3,4,5,6]"));

    // Paused, not failed: lifting the budget resumes the session.
    parser.visitor_mut().budget = None;
    assert!(parser.parse_data(&[]));
    assert!(parser.finish());

    let events = parser.into_visitor().events;
    assert_eq!(
        events,
        vec![
            Event::Begin,
            Event::BeginList,
            Event::Ints(vec![1, 2, 3, 4, 5, 6]),
            Event::FinishList,
            Event::Flush,
            Event::Finish,
        ]
    );
}

#[test]
fn pool_is_shared_across_sessions() {
    let pool = BufferPool::new();
    let mut parser =
        ProgressiveParser::new(RecordingVisitor::default(), Rc::clone(&pool), 16);

    parser.begin();
    assert_eq!(pool.idle_buffers(), 0);
    assert!(parser.parse_data(br#"{"a":1}"#));
    assert!(parser.finish());
    assert_eq!(pool.idle_buffers(), 1);

    // A new session on the same parser reuses the pooled storage.
    parser.begin();
    assert_eq!(pool.idle_buffers(), 0);
    assert!(parser.parse_data(b"[2]"));
    assert!(parser.finish());
    assert_eq!(pool.idle_buffers(), 1);
}

#[test]
fn failed_session_returns_buffer_to_pool() {
    let pool = BufferPool::new();
    let mut parser =
        ProgressiveParser::new(RecordingVisitor::default(), Rc::clone(&pool), 4);
    parser.begin();
    for byte in br#"["aaaaaaaaaa"]"#.iter() {
        if !parser.parse_data(core::slice::from_ref(byte)) {
            break;
        }
    }
    assert_eq!(pool.idle_buffers(), 1);

    let events = parser.into_visitor().events;
    match events.last() {
        Some(Event::Failed(err)) => {
            assert!(err.message.contains("maximum token size"), "{err}");
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[test]
fn oversized_token_is_terminal() {
    let mut parser = parser(4);
    parser.begin();
    let mut rejected = false;
    for byte in br#"["aaaaaaaaaa"]"#.iter() {
        if !parser.parse_data(core::slice::from_ref(byte)) {
            rejected = true;
            break;
        }
    }
    assert!(rejected);
    assert!(!parser.parse_data(b"x"));
    assert!(!parser.finish());
}

#[test]
fn unterminated_token_filling_the_budget_is_carried() {
    let mut parser = parser(3);
    parser.begin();
    assert!(parser.parse_data(b"123"));
    assert!(parser.finish());
    assert_eq!(
        parser.into_visitor().events,
        vec![
            Event::Begin,
            Event::Ints(vec![123]),
            Event::Flush,
            Event::Finish,
        ]
    );
}

#[test]
fn truncated_input_fails_at_finish() {
    let mut parser = parser(4);
    parser.begin();
    assert!(parser.parse_data(br#"{"a":"#));
    assert!(!parser.finish());

    let events = parser.into_visitor().events;
    match events.last() {
        Some(Event::Failed(err)) => {
            assert_eq!(err.message, "unexpected end of input");
            assert_eq!(err.offset, 5);
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[test]
fn empty_chunks_are_harmless() {
    let mut parser = parser(8);
    parser.begin();
    assert!(parser.parse_data(&[]));
    assert!(parser.parse_data(br#"{"a":"#));
    assert!(parser.parse_data(&[]));
    assert!(parser.parse_data(br#"1}"#));
    assert!(parser.finish());
    assert!(matches!(
        parser.visitor().events.last(),
        Some(Event::Finish)
    ));
}

#[test]
fn data_before_begin_is_rejected() {
    let mut parser = parser(8);
    assert!(!parser.parse_data(b"{}"));
    assert!(!parser.finish());
    assert!(parser.visitor().events.is_empty());
}

#[test]
fn sessions_restart_cleanly_after_completion() {
    let mut parser = parser(8);
    parser.begin();
    assert!(parser.parse_data(br#"{"a":1}"#));
    assert!(parser.finish());
    let first = parser.visitor().events.len();

    parser.begin();
    assert!(parser.parse_data(b"[true]"));
    assert!(parser.finish());

    let events = &parser.visitor().events[first..];
    assert_eq!(
        events,
        &[
            Event::Begin,
            Event::BeginList,
            Event::Bool(true),
            Event::FinishList,
            Event::Flush,
            Event::Finish,
        ]
    );
    assert_eq!(parser.bytes_consumed(), 6);
}
