use std::collections::HashSet;

use crate::core::chunk::{ChunkId, DiffChunk};
use crate::core::store::Decision;
use crate::error::IntegrityError;

/// Produce the final document from `original` and the accepted chunks
///
/// Only chunks with an explicit `accepted: true` decision are applied. All
/// of them are validated against `original` first; a single bad chunk fails
/// the whole reconstruction. Replacements run from the highest offset down so
/// every range stays valid in original coordinates.
pub fn apply(
    original: &str,
    chunks: &[DiffChunk],
    decisions: &[Decision],
) -> Result<String, IntegrityError> {
    let accepted_ids: HashSet<ChunkId> = decisions
        .iter()
        .filter(|d| d.accepted)
        .map(|d| d.chunk_id)
        .collect();

    let mut selected: Vec<&DiffChunk> = chunks
        .iter()
        .filter(|c| accepted_ids.contains(&c.id))
        .collect();

    for chunk in &selected {
        validate(original, chunk)?;
    }

    selected.sort_by(|a, b| b.old_range.from.cmp(&a.old_range.from));
    ensure_non_overlapping(&selected)?;

    let mut updated = original.to_string();
    for chunk in selected {
        updated.replace_range(chunk.old_range.as_range(), &chunk.new_text);
    }

    Ok(updated)
}

fn validate(original: &str, chunk: &DiffChunk) -> Result<(), IntegrityError> {
    let range = chunk.old_range;
    if range.from > range.to || range.to > original.len() {
        return Err(IntegrityError::OutOfBounds {
            id: chunk.id,
            range,
            len: original.len(),
        });
    }

    let Some(current) = original.get(range.as_range()) else {
        return Err(IntegrityError::NotCharBoundary {
            id: chunk.id,
            range,
        });
    };

    if current != chunk.old_text {
        return Err(IntegrityError::TextMismatch {
            id: chunk.id,
            range,
        });
    }

    Ok(())
}

/// `chunks` must already be sorted descending by start offset
fn ensure_non_overlapping(chunks: &[&DiffChunk]) -> Result<(), IntegrityError> {
    for window in chunks.windows(2) {
        let [later, earlier] = window else {
            continue;
        };
        if earlier.old_range.to > later.old_range.from {
            return Err(IntegrityError::Overlap {
                first: earlier.id,
                second: later.id,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chunk::{group, ChunkStatus, TextRange};
    use crate::core::diff::diff;

    fn accept_all(chunks: &[DiffChunk]) -> Vec<Decision> {
        chunks.iter().map(|c| Decision::accept(c.id)).collect()
    }

    #[test]
    fn test_accept_all_reaches_target() {
        let old = "Hello world. This is a test. Goodbye world.";
        let new = "Hello universe. This is a test. Goodbye universe.";
        let chunks = group(&diff(old, new), 10);
        assert_eq!(apply(old, &chunks, &accept_all(&chunks)).unwrap(), new);
    }

    #[test]
    fn test_no_decisions_keeps_original() {
        let old = "Hello world. Goodbye world.";
        let new = "Hello universe. Goodbye universe.";
        let chunks = group(&diff(old, new), 5);
        assert_eq!(apply(old, &chunks, &[]).unwrap(), old);

        let rejected: Vec<Decision> = chunks.iter().map(|c| Decision::reject(c.id)).collect();
        assert_eq!(apply(old, &chunks, &rejected).unwrap(), old);
    }

    #[test]
    fn test_partial_acceptance() {
        let old = "Hello world. Goodbye world.";
        let new = "Hello universe. Goodbye universe.";
        let chunks = group(&diff(old, new), 5);
        assert_eq!(chunks.len(), 2);

        let decisions = vec![Decision::accept(chunks[0].id), Decision::reject(chunks[1].id)];
        assert_eq!(
            apply(old, &chunks, &decisions).unwrap(),
            "Hello universe. Goodbye world."
        );

        let decisions = vec![Decision::reject(chunks[0].id), Decision::accept(chunks[1].id)];
        assert_eq!(
            apply(old, &chunks, &decisions).unwrap(),
            "Hello world. Goodbye universe."
        );
    }

    #[test]
    fn test_round_trip_with_length_changes() {
        let cases = [
            ("", "fresh file\n"),
            ("old file\n", ""),
            ("short", "a much longer replacement text"),
            ("line one\nline two\nline three\n", "line 1\nline two\nline three, extended\n"),
            ("héllo wörld", "hello world ✓"),
        ];
        for (old, new) in cases {
            for gap in [0, 1, 5, 50] {
                let chunks = group(&diff(old, new), gap);
                assert_eq!(apply(old, &chunks, &accept_all(&chunks)).unwrap(), new);
                assert_eq!(apply(old, &chunks, &[]).unwrap(), old);
            }
        }
    }

    #[test]
    fn test_out_of_bounds_aborts() {
        let old = "Hello world. Goodbye world.";
        let chunks = group(&diff(old, "Hello universe. Goodbye universe."), 5);
        let err = apply("Hello", &chunks, &accept_all(&chunks)).unwrap_err();
        assert!(matches!(err, IntegrityError::OutOfBounds { .. }));
    }

    #[test]
    fn test_stale_text_aborts() {
        let old = "Hello world.";
        let chunks = group(&diff(old, "Hello universe."), 5);
        let err = apply("Hello WORLD.", &chunks, &accept_all(&chunks)).unwrap_err();
        assert!(matches!(err, IntegrityError::TextMismatch { .. }));
    }

    #[test]
    fn test_overlap_aborts() {
        let chunk = |id: u32, from: usize, to: usize, text: &str| DiffChunk {
            id: ChunkId(id),
            old_range: TextRange::new(from, to),
            new_range: TextRange::new(from, from + 1),
            old_text: text.to_string(),
            new_text: "x".to_string(),
            status: ChunkStatus::Accepted,
        };
        let chunks = vec![chunk(1, 0, 3, "abc"), chunk(2, 2, 4, "cd")];
        let err = apply("abcdef", &chunks, &accept_all(&chunks)).unwrap_err();
        assert_eq!(
            err,
            IntegrityError::Overlap {
                first: ChunkId(1),
                second: ChunkId(2),
            }
        );
    }

    #[test]
    fn test_split_character_aborts() {
        let chunks = vec![DiffChunk {
            id: ChunkId(1),
            old_range: TextRange::new(1, 2),
            new_range: TextRange::new(1, 2),
            old_text: "?".to_string(),
            new_text: "x".to_string(),
            status: ChunkStatus::Accepted,
        }];
        let err = apply("é", &chunks, &accept_all(&chunks)).unwrap_err();
        assert!(matches!(err, IntegrityError::NotCharBoundary { .. }));
    }
}
