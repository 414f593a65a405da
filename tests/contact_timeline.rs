//! Contact aggregation across many ingests: FIFO timeline cap, derived
//! aggregates, and lost-update safety under concurrent same-sender load.

use std::sync::Arc;

use lexmail::domain::TIMELINE_CAP;
use lexmail::ingest::IngestRequest;
use lexmail::{EmailStore, Engine, MemoryStore, Taxonomy};

fn engine() -> Engine<MemoryStore> {
    Engine::new(Arc::new(MemoryStore::new()), Taxonomy::builtin())
}

fn request(subject: &str, body: &str, sender: &str) -> IngestRequest {
    IngestRequest {
        subject: subject.to_string(),
        body: body.to_string(),
        sender: sender.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn timeline_caps_and_evicts_oldest() {
    let engine = engine();

    // First message is the only deceptive one; it must fall off the end.
    engine
        .ingest(request(
            "opening",
            "You must be confused, I never said that. Act now, last chance, \
             final offer, limited time.",
            "Jane Doe <jane@acme.com>",
        ))
        .await
        .unwrap();

    for i in 0..TIMELINE_CAP {
        engine
            .ingest(request(
                &format!("routine {i}"),
                "Enclosed herewith the requested documents.",
                "Jane Doe <jane@acme.com>",
            ))
            .await
            .unwrap();
    }

    let contact = engine
        .store()
        .get_contact("jane@acme.com")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(contact.total_emails, (TIMELINE_CAP + 1) as u64);
    assert_eq!(contact.behavior_timeline.len(), TIMELINE_CAP);
    // The deceptive opener was evicted, so the average is clean again.
    assert!(contact
        .behavior_timeline
        .iter()
        .all(|e| e.deception_score == 0));
    assert_eq!(contact.avg_deception_score, 0.0);
    assert_eq!(contact.dominant_sentiment, "formal_neutral");
}

#[tokio::test]
async fn aggregates_track_sentiment_and_deception() {
    let engine = engine();
    for _ in 0..3 {
        engine
            .ingest(request(
                "complaint",
                "This is unacceptable and I will report you.",
                "client@gmail.com",
            ))
            .await
            .unwrap();
    }
    engine
        .ingest(request(
            "thanks",
            "Thank you for the update, happy to work together.",
            "client@gmail.com",
        ))
        .await
        .unwrap();

    let contact = engine
        .store()
        .get_contact("client@gmail.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(contact.total_emails, 4);
    assert_eq!(contact.dominant_sentiment, "angry");
    // Three angry_client alerts push the contact to high risk.
    assert!(contact.alert_count > 2);
    assert_eq!(contact.risk_assessment.as_str(), "high");
}

#[tokio::test]
async fn concurrent_same_sender_ingests_keep_every_entry() {
    let engine = Arc::new(engine());
    let mut handles = Vec::new();
    for i in 0..16 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            engine
                .ingest(request(
                    &format!("batch {i}"),
                    "Enclosed herewith the requested documents.",
                    "jane@acme.com",
                ))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let contact = engine
        .store()
        .get_contact("jane@acme.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(contact.total_emails, 16);
    assert_eq!(contact.behavior_timeline.len(), 16);
}

#[tokio::test]
async fn profiles_are_keyed_by_lowercased_address() {
    let engine = engine();
    engine
        .ingest(request("a", "first note", "Jane@Acme.com"))
        .await
        .unwrap();
    engine
        .ingest(request("b", "second note", "jane@acme.com"))
        .await
        .unwrap();

    let contacts = engine.store().list_contacts().await.unwrap();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].email, "jane@acme.com");
    assert_eq!(contacts[0].total_emails, 2);
}

#[tokio::test]
async fn matter_ids_union_marks_multi_matter_contacts() {
    let engine = engine();
    let client = engine.store().add_client("Acme Corp", "ops@acme.com");
    engine
        .store()
        .add_matter("2024-DC-004521", "Acme v. Doe", client.id);
    engine
        .store()
        .add_matter("2024-DC-009999", "Acme v. Roe", client.id);

    engine
        .ingest(request(
            "first",
            "Regarding Case No. 2024-DC-004521.",
            "jane@acme.com",
        ))
        .await
        .unwrap();
    engine
        .ingest(request(
            "second",
            "Regarding Case No. 2024-DC-009999.",
            "jane@acme.com",
        ))
        .await
        .unwrap();

    let contact = engine
        .store()
        .get_contact("jane@acme.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(contact.matter_ids.len(), 2);
    assert!(contact.is_multi_matter());
}
