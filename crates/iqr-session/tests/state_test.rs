use iqr_core::constants::STATE_ZIP_FILENAME;
use iqr_core::errors::{IqrError, StateError};
use iqr_core::DescriptorSet;
use iqr_session::IqrSession;
use iqr_test_fixtures::{descriptor, MemoryDescriptorFactory, ScriptedNeighbors, ScriptedRanker};

fn populated_session() -> IqrSession {
    let index = ScriptedNeighbors::new().with("p1", vec![descriptor("a", &[0.25, 0.5])]);
    let session = IqrSession::new(4);
    session.adjudicate(
        &[descriptor("p1", &[0.1, 0.2]), descriptor("p2", &[0.3, 0.4])],
        &[descriptor("n1", &[-1.0, 1e-7])],
        &[],
        &[],
    );
    session.set_external(
        &[descriptor("ext-p", &[0.123456789012345, 9.0])],
        &[descriptor("ext-n", &[f64::MAX, -0.0])],
    );
    session.grow(&index).unwrap();
    session.refine(&ScriptedRanker::new(&[("a", 0.5)])).unwrap();
    session
}

fn same_members_and_vectors(left: &DescriptorSet, right: &DescriptorSet) -> bool {
    left.len() == right.len()
        && left.iter().zip(right.iter()).all(|(l, r)| l.uid() == r.uid() && l.vector() == r.vector())
}

fn corrupt_last(bytes: &mut [u8], needle: &[u8]) {
    let at = bytes
        .windows(needle.len())
        .rposition(|w| w == needle)
        .expect("entry name present in archive");
    bytes[at] ^= 0x20;
}

// ── Round trip ────────────────────────────────────────────────────────────

#[test]
fn export_import_round_trips_adjudications() {
    let source = populated_session();
    let bytes = source.export_state().unwrap();

    let target = IqrSession::new(4);
    target.import_state(&bytes, &MemoryDescriptorFactory::new()).unwrap();

    let expected = source.adjudications();
    let restored = target.adjudications();
    assert!(same_members_and_vectors(&expected.positive, &restored.positive));
    assert!(same_members_and_vectors(&expected.negative, &restored.negative));
    assert!(same_members_and_vectors(&expected.external_positive, &restored.external_positive));
    assert!(same_members_and_vectors(&expected.external_negative, &restored.external_negative));
    assert!(target.working_set().is_empty());
    assert!(!target.has_results());
}

#[test]
fn import_discards_working_set_and_results() {
    let session = populated_session();
    let bytes = session.export_state().unwrap();
    assert!(session.has_results());

    session.import_state(&bytes, &MemoryDescriptorFactory::new()).unwrap();

    assert!(session.working_set().is_empty());
    assert!(session.seeds_used().is_empty());
    assert!(!session.has_results());
    assert!(session.ordered_results().is_empty());
    assert_eq!(session.adjudications().positive.len(), 2);
}

#[test]
fn export_is_deterministic() {
    let session = populated_session();
    let first = iqr_session::decode_state(&session.export_state().unwrap()).unwrap();
    let second = iqr_session::decode_state(&session.export_state().unwrap()).unwrap();
    assert_eq!(first, second);
    let pos: Vec<&str> = first.pos.iter().map(|(uid, _)| uid.as_str()).collect();
    assert_eq!(pos, vec!["p1", "p2"]);
}

#[test]
fn factory_vectors_that_match_are_accepted() {
    let session = populated_session();
    let bytes = session.export_state().unwrap();
    let factory = MemoryDescriptorFactory::new().with_known("p1", &[0.1, 0.2]);

    let target = IqrSession::new(4);
    target.import_state(&bytes, &factory).unwrap();
    assert_eq!(target.adjudications().positive.len(), 2);
}

#[test]
fn assigned_vectors_are_written_back_to_factory() {
    let bytes = populated_session().export_state().unwrap();
    let factory = MemoryDescriptorFactory::new().with_known("p1", &[0.1, 0.2]);

    IqrSession::new(4).import_state(&bytes, &factory).unwrap();

    assert_eq!(factory.vector_of("p2"), Some(vec![0.3, 0.4]));
    assert_eq!(factory.vector_of("ext-n"), Some(vec![f64::MAX, -0.0]));
    assert_eq!(factory.vector_of("p1"), Some(vec![0.1, 0.2]));
    assert_eq!(factory.vector_of("a"), None);
}

// ── Failures ──────────────────────────────────────────────────────────────

#[test]
fn corrupted_entry_name_is_malformed_and_leaves_session_alone() {
    let session = populated_session();
    let mut bytes = session.export_state().unwrap();
    corrupt_last(&mut bytes, STATE_ZIP_FILENAME.as_bytes());

    let err = session
        .import_state(&bytes, &MemoryDescriptorFactory::new())
        .unwrap_err();
    assert!(matches!(err, IqrError::State(StateError::MalformedState { .. })));
    // Decoding failed before the reset.
    assert!(session.has_results());
    assert_eq!(session.adjudications().positive.len(), 2);
}

#[test]
fn conflicting_factory_vector_is_inconsistent() {
    let session = populated_session();
    let bytes = session.export_state().unwrap();
    let factory = MemoryDescriptorFactory::new().with_known("n1", &[5.0, 5.0]);

    let target = IqrSession::new(4);
    target.adjudicate(&[descriptor("old", &[0.0])], &[], &[], &[]);
    let err = target.import_state(&bytes, &factory).unwrap_err();
    assert!(matches!(
        err,
        IqrError::State(StateError::InconsistentDescriptor { ref uid }) if uid == "n1"
    ));
    // The session was reset and nothing partial was applied.
    assert_eq!(target.adjudications(), Default::default());
}

#[test]
fn import_inside_hold_reenters_lock() {
    let bytes = populated_session().export_state().unwrap();
    let target = IqrSession::new(4);
    let _hold = target.hold();
    target.import_state(&bytes, &MemoryDescriptorFactory::new()).unwrap();
    assert_eq!(target.adjudications().external_negative.len(), 1);
}
