use serde::{Deserialize, Serialize};
use similar::{Algorithm, ChangeTag, TextDiff};

/// An elementary edit operation produced by the character diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "text", rename_all = "lowercase")]
pub enum EditOp {
    /// Text present on both sides
    Equal(String),
    /// Text only present in the original
    Delete(String),
    /// Text only present in the proposed content
    Insert(String),
}

impl EditOp {
    pub fn text(&self) -> &str {
        match self {
            EditOp::Equal(text) | EditOp::Delete(text) | EditOp::Insert(text) => text,
        }
    }

    pub fn is_equal(&self) -> bool {
        matches!(self, EditOp::Equal(_))
    }

    /// Bytes this op covers in the original content
    pub fn old_len(&self) -> usize {
        match self {
            EditOp::Equal(text) | EditOp::Delete(text) => text.len(),
            EditOp::Insert(_) => 0,
        }
    }

    /// Bytes this op covers in the proposed content
    pub fn new_len(&self) -> usize {
        match self {
            EditOp::Equal(text) | EditOp::Insert(text) => text.len(),
            EditOp::Delete(_) => 0,
        }
    }

    /// Length in characters, the unit used by gap and cleanup heuristics
    pub fn char_len(&self) -> usize {
        self.text().chars().count()
    }
}

/// Tuning for the diff cleanup passes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffOptions {
    /// Fold tiny equalities sandwiched between edits into the edits
    pub semantic_cleanup: bool,
    /// Slide lone edits so they start and end on word or line boundaries
    pub align_word_boundaries: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            semantic_cleanup: true,
            align_word_boundaries: true,
        }
    }
}

/// Compute a character-level edit script with the default cleanup passes
pub fn diff(old: &str, new: &str) -> Vec<EditOp> {
    diff_with(old, new, &DiffOptions::default())
}

/// Compute a character-level edit script between `old` and `new`
///
/// The raw Myers script is normalized (adjacent ops merged, deletes before
/// inserts) and then cleaned up according to `options`. The result always
/// reproduces `old` from its equal and delete ops and `new` from its equal
/// and insert ops.
pub fn diff_with(old: &str, new: &str, options: &DiffOptions) -> Vec<EditOp> {
    if old == new {
        return Vec::new();
    }

    let text_diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .diff_chars(old, new);

    let mut ops: Vec<EditOp> = Vec::new();
    for change in text_diff.iter_all_changes() {
        let value = change.value();
        match (change.tag(), ops.last_mut()) {
            (ChangeTag::Equal, Some(EditOp::Equal(text)))
            | (ChangeTag::Delete, Some(EditOp::Delete(text)))
            | (ChangeTag::Insert, Some(EditOp::Insert(text))) => text.push_str(value),
            (ChangeTag::Equal, _) => ops.push(EditOp::Equal(value.to_string())),
            (ChangeTag::Delete, _) => ops.push(EditOp::Delete(value.to_string())),
            (ChangeTag::Insert, _) => ops.push(EditOp::Insert(value.to_string())),
        }
    }

    normalize(&mut ops);

    if options.semantic_cleanup {
        cleanup_semantic(&mut ops);
    }
    if options.align_word_boundaries {
        align_word_boundaries(&mut ops);
    }

    ops
}

/// Merge adjacent ops and order each edit run as one DELETE then one INSERT
fn normalize(ops: &mut Vec<EditOp>) {
    let mut merged: Vec<EditOp> = Vec::with_capacity(ops.len());
    let mut deleted = String::new();
    let mut inserted = String::new();

    for op in ops.drain(..) {
        match op {
            EditOp::Delete(text) => deleted.push_str(&text),
            EditOp::Insert(text) => inserted.push_str(&text),
            EditOp::Equal(text) => {
                flush_edits(&mut merged, &mut deleted, &mut inserted);
                if text.is_empty() {
                    continue;
                }
                if let Some(EditOp::Equal(previous)) = merged.last_mut() {
                    previous.push_str(&text);
                } else {
                    merged.push(EditOp::Equal(text));
                }
            }
        }
    }
    flush_edits(&mut merged, &mut deleted, &mut inserted);

    *ops = merged;
}

fn flush_edits(merged: &mut Vec<EditOp>, deleted: &mut String, inserted: &mut String) {
    if !deleted.is_empty() {
        merged.push(EditOp::Delete(std::mem::take(deleted)));
    }
    if !inserted.is_empty() {
        merged.push(EditOp::Insert(std::mem::take(inserted)));
    }
}

/// Character counts of the (deleted, inserted) text in a run of edits
fn edit_run_lengths<'a>(run: impl Iterator<Item = &'a EditOp>) -> (usize, usize) {
    let mut deleted = 0;
    let mut inserted = 0;
    for op in run {
        match op {
            EditOp::Delete(_) => deleted += op.char_len(),
            EditOp::Insert(_) => inserted += op.char_len(),
            EditOp::Equal(_) => break,
        }
    }
    (deleted, inserted)
}

/// Eliminate equalities no longer than the edits on either side of them
///
/// Such an equality is rewritten as a delete plus an insert of the same
/// text, after which normalization folds it into the neighbouring edits.
/// Every rewrite removes one equality, so the loop terminates.
fn cleanup_semantic(ops: &mut Vec<EditOp>) {
    loop {
        let candidate = (0..ops.len()).find(|&index| {
            if !ops[index].is_equal() {
                return false;
            }
            let (del_before, ins_before) = edit_run_lengths(ops[..index].iter().rev());
            let (del_after, ins_after) = edit_run_lengths(ops[index + 1..].iter());
            let before = del_before.max(ins_before);
            let after = del_after.max(ins_after);
            let length = ops[index].char_len();

            before > 0 && after > 0 && length <= before && length <= after
        });

        let Some(index) = candidate else {
            break;
        };

        let text = ops[index].text().to_string();
        ops.splice(index..=index, [EditOp::Delete(text.clone()), EditOp::Insert(text)]);
        normalize(ops);
    }
}

/// Shift single edits between two equalities onto the best nearby boundary
///
/// Only the split point between the surrounding equalities changes; the text
/// reconstructed on either side is identical before and after.
fn align_word_boundaries(ops: &mut Vec<EditOp>) {
    let mut index = 1;
    while index + 1 < ops.len() {
        let (EditOp::Equal(before), EditOp::Equal(after)) = (&ops[index - 1], &ops[index + 1]) else {
            index += 1;
            continue;
        };
        if ops[index].is_equal() {
            index += 1;
            continue;
        }

        let mut left: Vec<char> = before.chars().collect();
        let mut edit: Vec<char> = ops[index].text().chars().collect();
        let mut right: Vec<char> = after.chars().collect();

        // Slide the edit as far left as it will go
        let shared = common_suffix(&left, &edit);
        if shared > 0 {
            let moved: Vec<char> = left.split_off(left.len() - shared);
            edit.truncate(edit.len() - shared);
            edit.splice(0..0, moved.iter().copied());
            right.splice(0..0, moved);
        }

        // Then walk right one character at a time, keeping the best split
        let mut best = (left.clone(), edit.clone(), right.clone());
        let mut best_score = boundary_score(&left, &edit) + boundary_score(&edit, &right);
        while !edit.is_empty() && !right.is_empty() && edit[0] == right[0] {
            let ch = edit.remove(0);
            left.push(ch);
            edit.push(right.remove(0));
            let score = boundary_score(&left, &edit) + boundary_score(&edit, &right);
            if score >= best_score {
                best_score = score;
                best = (left.clone(), edit.clone(), right.clone());
            }
        }

        let (left, edit, right) = best;
        let edit_text: String = edit.into_iter().collect();
        ops[index - 1] = EditOp::Equal(left.into_iter().collect());
        ops[index] = match ops[index] {
            EditOp::Delete(_) => EditOp::Delete(edit_text),
            _ => EditOp::Insert(edit_text),
        };
        ops[index + 1] = EditOp::Equal(right.into_iter().collect());
        index += 1;
    }

    normalize(ops);
}

fn common_suffix(a: &[char], b: &[char]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

/// Score how natural a split between `one` and `two` is (6 best, 0 worst)
fn boundary_score(one: &[char], two: &[char]) -> u8 {
    let (Some(&last), Some(&first)) = (one.last(), two.first()) else {
        return 6;
    };

    let non_alnum_1 = !last.is_alphanumeric();
    let non_alnum_2 = !first.is_alphanumeric();
    let whitespace_1 = non_alnum_1 && last.is_whitespace();
    let whitespace_2 = non_alnum_2 && first.is_whitespace();
    let line_break_1 = whitespace_1 && (last == '\n' || last == '\r');
    let line_break_2 = whitespace_2 && (first == '\n' || first == '\r');
    let blank_line_1 = line_break_1 && ends_with_blank_line(one);
    let blank_line_2 = line_break_2 && starts_with_blank_line(two);

    if blank_line_1 || blank_line_2 {
        5
    } else if line_break_1 || line_break_2 {
        4
    } else if non_alnum_1 && !whitespace_1 && whitespace_2 {
        3
    } else if whitespace_1 || whitespace_2 {
        2
    } else if non_alnum_1 || non_alnum_2 {
        1
    } else {
        0
    }
}

fn ends_with_blank_line(text: &[char]) -> bool {
    text.ends_with(&['\n', '\n']) || text.ends_with(&['\n', '\r', '\n'])
}

fn starts_with_blank_line(text: &[char]) -> bool {
    let text: String = text.iter().take(4).collect();
    let text = text.strip_prefix('\r').unwrap_or(text.as_str());
    let Some(rest) = text.strip_prefix('\n') else {
        return false;
    };
    let rest = rest.strip_prefix('\r').unwrap_or(rest);
    rest.starts_with('\n')
}
