use std::fs;

use tempfile::TempDir;

use hunkwise::config::HunkwiseConfig;
use hunkwise::core::{apply, diff, group, ChunkId, ChunkKind, ChunkStatus, ChunkStore, Decision};
use hunkwise::session::{FinalResult, ReviewOptions, ReviewRegistry, ReviewSession};
use hunkwise::storage::{DocumentStore, FsDocumentStore, PendingStore};
use hunkwise::{DiffChunk, IntegrityError, ReviewError};

const CASES: &[(&str, &str)] = &[
    ("", ""),
    ("", "new file\nwith two lines\n"),
    ("to be removed\n", ""),
    ("Hello world", "Hello world"),
    ("abc", "xyz"),
    ("Hello world. This is a test. Goodbye world.", "Hello universe. This is a test. Goodbye universe."),
    (
        "fn main() {\n    let x = 1;\n    println!(\"{}\", x);\n}\n",
        "fn main() {\n    let value = 41 + 1;\n    println!(\"value = {}\", value);\n}\n",
    ),
    (
        "# Title\n\nSome intro text that stays the same for a while, long enough to split.\n\nOld closing line.\n",
        "# New Title\n\nSome intro text that stays the same for a while, long enough to split.\n\nNew closing line!\n",
    ),
    ("größe: 10 €\nnaïve\n", "Größe: 12 €\nnaive ✓\n"),
];

fn accept_all(chunks: &[DiffChunk]) -> Vec<Decision> {
    chunks.iter().map(|c| Decision::accept(c.id)).collect()
}

fn reject_all(chunks: &[DiffChunk]) -> Vec<Decision> {
    chunks.iter().map(|c| Decision::reject(c.id)).collect()
}

#[test]
fn test_round_trip_and_identity() {
    for &(old, new) in CASES {
        for gap in [0, 1, 3, 10, 50, 1000] {
            let chunks = group(&diff(old, new), gap);

            assert_eq!(
                apply(old, &chunks, &accept_all(&chunks)).unwrap(),
                new,
                "accept-all round trip failed for {old:?} -> {new:?} (gap {gap})"
            );
            assert_eq!(
                apply(old, &chunks, &reject_all(&chunks)).unwrap(),
                old,
                "reject-all identity failed for {old:?} -> {new:?} (gap {gap})"
            );
        }
    }
}

#[test]
fn test_chunk_invariants() {
    for &(old, new) in CASES {
        let chunks = group(&diff(old, new), 5);
        for chunk in &chunks {
            assert_eq!(chunk.old_range.len(), chunk.old_text.len());
            assert_eq!(chunk.new_range.len(), chunk.new_text.len());
            assert_eq!(&old[chunk.old_range.as_range()], chunk.old_text);
            assert_eq!(&new[chunk.new_range.as_range()], chunk.new_text);
            assert!(!(chunk.old_text.is_empty() && chunk.new_text.is_empty()));
            assert_eq!(chunk.status, ChunkStatus::Pending);
        }
        for pair in chunks.windows(2) {
            assert!(pair[0].old_range.to <= pair[1].old_range.from);
            assert!(pair[0].new_range.to <= pair[1].new_range.from);
            assert!(pair[0].id < pair[1].id);
        }
    }
}

#[test]
fn test_no_op_diff() {
    let text = "nothing changes here\n";
    let chunks = group(&diff(text, text), 50);
    assert!(chunks.is_empty());
    assert!(ChunkStore::new(chunks).is_fully_processed());
}

#[test]
fn test_determinism_modulo_ids() {
    let (old, new) = CASES[6];
    let strip = |chunks: Vec<DiffChunk>| -> Vec<(String, String, usize, usize)> {
        chunks
            .into_iter()
            .map(|c| (c.old_text, c.new_text, c.old_range.from, c.new_range.from))
            .collect()
    };
    assert_eq!(
        strip(group(&diff(old, new), 10)),
        strip(group(&diff(old, new), 10))
    );
}

#[test]
fn test_gap_split_and_merge() {
    let old = "Hello world. This is a test. Goodbye world.";
    let new = "Hello universe. This is a test. Goodbye universe.";
    let split = group(&diff(old, new), 10);
    assert_eq!(split.len(), 2);
    assert!(split.iter().all(|c| c.kind() == ChunkKind::Change));
    assert_eq!((split[0].old_text.as_str(), split[0].new_text.as_str()), ("world", "universe"));
    assert_eq!((split[1].old_text.as_str(), split[1].new_text.as_str()), ("world", "universe"));

    let merged = group(&diff("Hello world test", "Hi universe exam"), 50);
    assert_eq!(merged.len(), 1);
}

#[test]
fn test_kind_classification() {
    let insert = group(&diff("Hello", "Hello world"), 50);
    assert_eq!(insert.len(), 1);
    assert_eq!(insert[0].kind(), ChunkKind::Insert);
    assert_eq!(insert[0].old_text, "");
    assert_eq!(insert[0].new_text, " world");

    let delete = group(&diff("Hello world", "Hello"), 50);
    assert_eq!(delete.len(), 1);
    assert_eq!(delete[0].kind(), ChunkKind::Delete);
    assert_eq!(delete[0].new_text, "");
    assert_eq!(delete[0].old_text, " world");
}

#[test]
fn test_monotonic_terminal_states() {
    let session = ReviewSession::open(
        "doc.txt",
        "Hello world. Goodbye world.",
        "Hello universe. Goodbye universe.",
        Some(5),
    )
    .unwrap();

    let session = session.decide(ChunkId(1), false).decide_all(true);
    assert_eq!(session.store().get(ChunkId(1)).unwrap().status, ChunkStatus::Rejected);
    assert_eq!(session.store().get(ChunkId(2)).unwrap().status, ChunkStatus::Accepted);

    let again = session.decide(ChunkId(1), true).decide_all(false);
    assert_eq!(again, session);
}

/// Full workflow: propose, decide across invocations, commit to disk
#[test]
fn test_full_workflow_on_disk() {
    let dir = TempDir::new().unwrap();
    let documents = FsDocumentStore::new(dir.path());
    let pending = PendingStore::new(dir.path());

    let original = "Hello world. Goodbye world.";
    fs::write(dir.path().join("greeting.txt"), original).unwrap();

    // First invocation: open the review
    let mut registry = pending.load_with_max_age(24).unwrap();
    let options = ReviewOptions::default().with_min_gap_size(5);
    let current = documents.read("greeting.txt").unwrap();
    let session = registry
        .open("greeting.txt", &current, "Hello universe. Goodbye universe.", &options)
        .unwrap();
    assert_eq!(session.chunks().len(), 2);
    pending.save(&registry).unwrap();

    // Second invocation: decide
    let mut registry = pending.load_with_max_age(24).unwrap();
    registry.decide("greeting.txt", ChunkId(1), true).unwrap();
    let err = registry.commit("greeting.txt", &documents).unwrap_err();
    assert!(matches!(err, ReviewError::Undecided { pending: 1, .. }));
    registry.decide("greeting.txt", ChunkId(2), false).unwrap();
    pending.save(&registry).unwrap();

    // Third invocation: commit
    let mut registry = pending.load_with_max_age(24).unwrap();
    assert!(registry.get("greeting.txt").unwrap().is_done());
    let result = registry.commit("greeting.txt", &documents).unwrap();
    assert_eq!(
        result,
        FinalResult::Written("Hello universe. Goodbye world.".to_string())
    );
    pending.save(&registry).unwrap();

    assert_eq!(
        fs::read_to_string(dir.path().join("greeting.txt")).unwrap(),
        "Hello universe. Goodbye world."
    );
    assert!(!pending.exists());
}

#[test]
fn test_stale_review_is_not_written() {
    let dir = TempDir::new().unwrap();
    let documents = FsDocumentStore::new(dir.path());
    fs::write(dir.path().join("notes.md"), "alpha beta gamma\n").unwrap();

    let mut registry = ReviewRegistry::new();
    registry
        .open("notes.md", "alpha beta gamma\n", "alpha BETA gamma\n", &ReviewOptions::default())
        .unwrap();
    registry.decide_all("notes.md", true).unwrap();

    // The file changes underneath the review
    fs::write(dir.path().join("notes.md"), "alpha beta gamma delta\n").unwrap();

    let result = registry.commit("notes.md", &documents).unwrap();
    assert_eq!(
        result,
        FinalResult::Integrity(IntegrityError::DocumentChanged {
            path: "notes.md".to_string()
        })
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("notes.md")).unwrap(),
        "alpha beta gamma delta\n"
    );
    assert!(registry.get("notes.md").is_some());
}

#[test]
fn test_new_review_replaces_uncommitted_one() {
    let mut registry = ReviewRegistry::new();
    let options = ReviewOptions::default();
    registry.open("a.txt", "one", "two", &options).unwrap();
    registry.decide_all("a.txt", true).unwrap();

    registry.open("a.txt", "one", "three", &options).unwrap();
    let session = registry.get("a.txt").unwrap();
    assert_eq!(session.target_content, "three");
    assert_eq!(session.progress().pending, session.chunks().len());
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_config_drives_review_options() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(".hunkwise.toml"),
        "[review]\nmin_gap_size = 5\n",
    )
    .unwrap();

    let config = HunkwiseConfig::load(dir.path()).unwrap();
    let options = ReviewOptions::from(&config);
    let session = ReviewSession::open_with(
        "doc.txt",
        "Hello world. Goodbye world.",
        "Hello universe. Goodbye universe.",
        &options,
    )
    .unwrap();
    assert_eq!(session.chunks().len(), 2);

    let default_session = ReviewSession::open(
        "doc.txt",
        "Hello world. Goodbye world.",
        "Hello universe. Goodbye universe.",
        None,
    )
    .unwrap();
    assert_eq!(default_session.chunks().len(), 1);
}
