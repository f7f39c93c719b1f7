// Integration tests for the hybrid responder
//
// Tests cover:
// - Intent matching through the public API
// - The fallback chain with a mocked encyclopedia
// - Exit commands and the interactive session loop

use async_trait::async_trait;
use hybrid_chatbot::config::config::ResponderConfig;
use hybrid_chatbot::encyclopedia::{EncyclopediaClient, EncyclopediaError};
use hybrid_chatbot::matching::{match_intent, normalize, similarity};
use hybrid_chatbot::models::intent::{Intent, IntentStore};
use hybrid_chatbot::services::{
    ChatSession, Reply, Responder, ResponseSource, SessionEnd, seeded_source,
};
use mockall::mock;
use std::sync::Arc;

mock! {
    pub Encyclopedia {}

    #[async_trait]
    impl EncyclopediaClient for Encyclopedia {
        async fn search(&self, query: &str) -> Result<Vec<String>, EncyclopediaError>;
        async fn summarize(&self, title: &str) -> Result<String, EncyclopediaError>;
    }
}

const FALLBACKS: [&str; 3] = [
    "I couldn't find information about that.",
    "I'm not sure about that topic.",
    "That's beyond my current knowledge.",
];

fn greeting_store() -> Arc<IntentStore> {
    Arc::new(IntentStore::from(vec![Intent::new(
        "greeting",
        ["hello", "hi there"],
        ["Hi!", "Hello!"],
    )]))
}

fn responder(encyclopedia: MockEncyclopedia) -> Responder {
    Responder::new(
        greeting_store(),
        Box::new(encyclopedia),
        &ResponderConfig::default(),
    )
    .with_rng(seeded_source(2024))
}

fn silent_encyclopedia() -> MockEncyclopedia {
    let mut encyclopedia = MockEncyclopedia::new();
    encyclopedia.expect_search().never();
    encyclopedia.expect_summarize().never();
    encyclopedia
}

// ============ Matching properties ============

#[test]
fn test_normalization_is_idempotent() {
    for input in ["Hello, World!", "  Hi\tthere ", "WHAT'S UP???", "", "a  -  b"] {
        let once = normalize(input);
        assert_eq!(normalize(&once), once);
    }
}

#[test]
fn test_similarity_properties() {
    assert_eq!(similarity("hello", "hello"), 1.0);
    assert_eq!(similarity("abc", "xyz"), 0.0);
    for (a, b) in [("hello", "hi there"), ("diet", "tide"), ("abcab", "bcabc")] {
        assert_eq!(similarity(a, b), similarity(b, a));
    }
}

#[test]
fn test_single_pattern_above_threshold_wins() {
    let store = IntentStore::from(vec![
        Intent::new("weather", ["what is the weather"], ["Sunny."]),
        Intent::new("name", ["what is your name"], ["I'm a bot."]),
    ]);
    let matched = match_intent("What is your name?", &store, 0.75).unwrap();
    assert_eq!(matched.intent.tag, "name");
}

#[test]
fn test_tie_goes_to_earlier_intent() {
    let store = IntentStore::from(vec![
        Intent::new("first", ["good day"], ["1"]),
        Intent::new("second", ["good day"], ["2"]),
    ]);
    let matched = match_intent("good day", &store, 0.75).unwrap();
    assert_eq!(matched.intent.tag, "first");
}

// ============ Fallback chain scenarios ============

#[tokio::test]
async fn test_greeting_matches_local_knowledge() {
    let responder = responder(silent_encyclopedia());

    let reply = responder.respond("Hello").await.unwrap();

    assert_eq!(reply.source, ResponseSource::ChatbotKnowledge);
    assert!(["Hi!", "Hello!"].contains(&reply.text.as_str()));
    assert!(!reply.end_session);
}

#[tokio::test]
async fn test_unknown_input_with_not_found_uses_fallback() {
    let mut encyclopedia = MockEncyclopedia::new();
    encyclopedia
        .expect_search()
        .withf(|query| query == "asdkjaslkdj")
        .times(1)
        .returning(|query| Err(EncyclopediaError::NotFound(query.to_string())));
    encyclopedia.expect_summarize().never();

    let responder = responder(encyclopedia);
    let reply = responder.respond("asdkjaslkdj").await.unwrap();

    assert_eq!(reply.source, ResponseSource::System);
    assert!(FALLBACKS.contains(&reply.text.as_str()));
    assert_eq!(responder.metrics().snapshot().lookup_failures, 1);
}

#[tokio::test]
async fn test_summary_is_attributed() {
    let mut encyclopedia = MockEncyclopedia::new();
    encyclopedia
        .expect_search()
        .returning(|_| Ok(vec!["Ferris".into(), "Ferris wheel".into()]));
    encyclopedia
        .expect_summarize()
        .withf(|title| title == "Ferris")
        .times(1)
        .returning(|_| Ok("Ferris is a crab. It is the Rust mascot.".into()));

    let reply = responder(encyclopedia)
        .respond("who is ferris")
        .await
        .unwrap();

    assert_eq!(reply.source, ResponseSource::Wikipedia);
    assert_eq!(
        reply.text,
        "According to Wikipedia: Ferris is a crab. It is the Rust mascot."
    );
}

#[tokio::test]
async fn test_ambiguous_topic_asks_for_clarification() {
    let mut encyclopedia = MockEncyclopedia::new();
    encyclopedia
        .expect_search()
        .returning(|_| Ok(vec!["Mercury".into()]));
    encyclopedia.expect_summarize().returning(|title| {
        Err(EncyclopediaError::Ambiguous {
            title: title.to_string(),
            options: vec![
                "Mercury (planet)".into(),
                "Mercury (element)".into(),
                "Freddie Mercury".into(),
                "Mercury (mythology)".into(),
            ],
        })
    });

    let reply = responder(encyclopedia).respond("mercury").await.unwrap();

    assert_eq!(reply.source, ResponseSource::Wikipedia);
    assert_eq!(
        reply.text,
        "Multiple options found. Did you mean: Mercury (planet), Mercury (element), Freddie Mercury?"
    );
}

#[tokio::test]
async fn test_transient_failure_is_not_raised() {
    let mut encyclopedia = MockEncyclopedia::new();
    encyclopedia
        .expect_search()
        .returning(|_| Err(EncyclopediaError::Transient("connection reset".into())));

    let reply = responder(encyclopedia)
        .respond("tell me about quasars")
        .await
        .unwrap();

    assert_eq!(reply.source, ResponseSource::System);
    assert!(FALLBACKS.contains(&reply.text.as_str()));
}

#[tokio::test]
async fn test_no_search_results_uses_fallback() {
    let mut encyclopedia = MockEncyclopedia::new();
    encyclopedia.expect_search().returning(|_| Ok(vec![]));
    encyclopedia.expect_summarize().never();

    let reply = responder(encyclopedia).respond("qwzx vbnm").await.unwrap();
    assert_eq!(reply.source, ResponseSource::System);
}

#[tokio::test]
async fn test_exit_commands_short_circuit() {
    let responder = responder(silent_encyclopedia());

    for command in ["exit", "QUIT", "  bye  "] {
        let reply = responder.respond(command).await.unwrap();
        assert!(reply.end_session);
        assert_eq!(reply.source, ResponseSource::System);
        assert_eq!(reply.text, "Goodbye! Have a nice day.");
    }
}

#[tokio::test]
async fn test_exit_command_wins_over_matching_intent() {
    let store = Arc::new(IntentStore::from(vec![Intent::new(
        "bye",
        ["bye"],
        ["See ya"],
    )]));
    let responder = Responder::new(
        store,
        Box::new(silent_encyclopedia()),
        &ResponderConfig::default(),
    )
    .with_rng(seeded_source(7));

    let reply = responder.respond("bye").await.unwrap();

    assert_eq!(
        reply,
        Reply {
            text: "Goodbye! Have a nice day.".into(),
            source: ResponseSource::System,
            end_session: true,
        }
    );
    assert_eq!(responder.metrics().snapshot().exit_requests, 1);
}

#[tokio::test]
async fn test_same_seed_gives_same_replies() {
    let store = IntentStore::from(vec![Intent::new(
        "greeting",
        ["hello"],
        ["a", "b", "c", "d", "e"],
    )]);
    let store = Arc::new(store);

    let build = || {
        Responder::new(
            store.clone(),
            Box::new(silent_encyclopedia()),
            &ResponderConfig::default(),
        )
        .with_rng(seeded_source(99))
    };
    let (left, right) = (build(), build());

    for _ in 0..10 {
        let a = left.respond("hello").await.unwrap();
        let b = right.respond("hello").await.unwrap();
        assert_eq!(a, b);
    }
}

#[tokio::test]
async fn test_custom_threshold_and_exit_commands() {
    let config = ResponderConfig {
        similarity_threshold: 0.5,
        exit_commands: vec!["stop".into()],
        ..ResponderConfig::default()
    };
    let responder = Responder::new(greeting_store(), Box::new(silent_encyclopedia()), &config)
        .with_rng(seeded_source(1));

    // similarity("help", "hello") == 2/3
    let reply = responder.respond("help").await.unwrap();
    assert_eq!(reply.source, ResponseSource::ChatbotKnowledge);
    assert!(responder.respond("Stop").await.unwrap().end_session);
}

// ============ Session loop ============

#[tokio::test]
async fn test_quit_ends_session_loop() {
    let responder = Arc::new(responder(silent_encyclopedia()));
    let mut session = ChatSession::new(responder);
    let mut output = Vec::new();

    let summary = session
        .run(
            "Hello\nquit\nhello again\n".as_bytes(),
            &mut output,
            std::future::pending::<()>(),
        )
        .await
        .unwrap();
    let output = String::from_utf8(output).unwrap();

    assert_eq!(summary.end, SessionEnd::ExitCommand);
    assert_eq!(summary.turns, 2);
    assert!(output.contains("[Source: Chatbot Knowledge]"));
    assert!(output.ends_with("Chatbot: Goodbye! Have a great day.\n"));
    assert!(!output.contains("hello again"));
}

struct ExplodingEncyclopedia;

#[async_trait]
impl EncyclopediaClient for ExplodingEncyclopedia {
    async fn search(&self, _query: &str) -> Result<Vec<String>, EncyclopediaError> {
        panic!("encyclopedia exploded")
    }

    async fn summarize(&self, _title: &str) -> Result<String, EncyclopediaError> {
        panic!("encyclopedia exploded")
    }
}

#[tokio::test]
async fn test_failing_turn_does_not_end_session() {
    let responder = Arc::new(
        Responder::new(
            greeting_store(),
            Box::new(ExplodingEncyclopedia),
            &ResponderConfig::default(),
        )
        .with_rng(seeded_source(8)),
    );
    let mut session = ChatSession::new(responder.clone());
    let mut output = Vec::new();

    let summary = session
        .run(
            "what is a pulsar\nhello\nexit\n".as_bytes(),
            &mut output,
            std::future::pending::<()>(),
        )
        .await
        .unwrap();
    let output = String::from_utf8(output).unwrap();

    assert_eq!(summary.end, SessionEnd::ExitCommand);
    assert_eq!(summary.turns, 3);
    assert!(output.contains("Sorry, I encountered an error: encyclopedia exploded"));
    assert!(output.contains("[Source: Chatbot Knowledge]"));
    assert_eq!(responder.metrics().snapshot().turn_errors, 1);
}

struct UnreachableEncyclopedia;

#[async_trait]
impl EncyclopediaClient for UnreachableEncyclopedia {
    async fn search(&self, _query: &str) -> Result<Vec<String>, EncyclopediaError> {
        Err(EncyclopediaError::Transient("network unreachable".into()))
    }

    async fn summarize(&self, title: &str) -> Result<String, EncyclopediaError> {
        Err(EncyclopediaError::NotFound(title.to_string()))
    }
}

#[tokio::test]
async fn test_responder_is_shareable_across_sessions() {
    let responder = Arc::new(
        Responder::new(
            greeting_store(),
            Box::new(UnreachableEncyclopedia),
            &ResponderConfig::default(),
        )
        .with_rng(seeded_source(3)),
    );

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let responder = responder.clone();
            tokio::spawn(async move { responder.respond("hi there").await })
        })
        .collect();

    for handle in handles {
        let reply = handle.await.unwrap().unwrap();
        assert_eq!(reply.source, ResponseSource::ChatbotKnowledge);
    }
    assert_eq!(responder.store().len(), 1);
}
