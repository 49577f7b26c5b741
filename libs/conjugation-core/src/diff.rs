//! Character-level diff and edit-script generation.
//!
//! Computes an LCS diff between a base word and a target word, coalesces
//! noisy single-character edits into legible chunks, and converts the
//! result into ordered [`Operation`]s whose indices refer to the word as
//! it exists when each operation is applied.

use crate::types::Operation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditKind {
    Equal,
    Delete,
    Insert,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct EditSpan {
    kind: EditKind,
    text: Vec<char>,
}

/// Compute the edit script transforming `base` into `target`.
///
/// Applying the returned operations in order to `base` yields `target`.
/// Identical inputs produce an empty script. Insert operations come back
/// with empty `variants`; the sequence builder fills them in.
pub fn compute_operations(base: &str, target: &str) -> Vec<Operation> {
    let spans = cleanup_semantic(diff_chars(base, target));

    // Deletions leave the cursor in place (the operation removes the span
    // under it); insertions advance it past the inserted text.
    let mut cursor = 0;
    let mut ops = Vec::new();
    for span in spans {
        match span.kind {
            EditKind::Equal => cursor += span.text.len(),
            EditKind::Delete => ops.push(Operation::Delete {
                index: cursor,
                length: span.text.len(),
                text: span.text.iter().collect(),
            }),
            EditKind::Insert => {
                let length = span.text.len();
                ops.push(Operation::Insert {
                    index: cursor,
                    text: span.text.iter().collect(),
                    variants: Vec::new(),
                });
                cursor += length;
            }
        }
    }
    ops
}

/// Raw char diff: common prefix and suffix trimmed, LCS over the middle.
fn diff_chars(base: &str, target: &str) -> Vec<EditSpan> {
    let a: Vec<char> = base.chars().collect();
    let b: Vec<char> = target.chars().collect();

    let prefix = a.iter().zip(&b).take_while(|(x, y)| x == y).count();
    let limit = a.len().min(b.len()) - prefix;
    let suffix = (1..=limit)
        .take_while(|&i| a[a.len() - i] == b[b.len() - i])
        .count();

    let mut spans = Vec::new();
    if prefix > 0 {
        spans.push(EditSpan {
            kind: EditKind::Equal,
            text: a[..prefix].to_vec(),
        });
    }
    spans.extend(lcs_spans(
        &a[prefix..a.len() - suffix],
        &b[prefix..b.len() - suffix],
    ));
    if suffix > 0 {
        spans.push(EditSpan {
            kind: EditKind::Equal,
            text: a[a.len() - suffix..].to_vec(),
        });
    }
    spans
}

fn lcs_spans(a: &[char], b: &[char]) -> Vec<EditSpan> {
    let mut spans: Vec<EditSpan> = Vec::new();
    if a.is_empty() && b.is_empty() {
        return spans;
    }
    if a.is_empty() {
        spans.push(EditSpan {
            kind: EditKind::Insert,
            text: b.to_vec(),
        });
        return spans;
    }
    if b.is_empty() {
        spans.push(EditSpan {
            kind: EditKind::Delete,
            text: a.to_vec(),
        });
        return spans;
    }

    // dp[i][j] = LCS length of a[i..] and b[j..]
    let mut dp = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for i in (0..a.len()).rev() {
        for j in (0..b.len()).rev() {
            dp[i][j] = if a[i] == b[j] {
                dp[i + 1][j + 1] + 1
            } else {
                dp[i + 1][j].max(dp[i][j + 1])
            };
        }
    }

    // Walk forward along an optimal path. Ties consume the deletion first,
    // which keeps deletions ahead of insertions within a changed region.
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if a[i] == b[j] {
            push_char(&mut spans, EditKind::Equal, a[i]);
            i += 1;
            j += 1;
        } else if dp[i + 1][j] >= dp[i][j + 1] {
            push_char(&mut spans, EditKind::Delete, a[i]);
            i += 1;
        } else {
            push_char(&mut spans, EditKind::Insert, b[j]);
            j += 1;
        }
    }
    while i < a.len() {
        push_char(&mut spans, EditKind::Delete, a[i]);
        i += 1;
    }
    while j < b.len() {
        push_char(&mut spans, EditKind::Insert, b[j]);
        j += 1;
    }
    spans
}

fn push_char(spans: &mut Vec<EditSpan>, kind: EditKind, c: char) {
    match spans.last_mut() {
        Some(span) if span.kind == kind => span.text.push(c),
        _ => spans.push(EditSpan {
            kind,
            text: vec![c],
        }),
    }
}

/// Semantic cleanup: an equality no longer than the edit runs on both of
/// its sides is folded into the surrounding edits. Folding repeats until
/// stable, then each changed region is merged into one deletion followed
/// by one insertion.
fn cleanup_semantic(mut spans: Vec<EditSpan>) -> Vec<EditSpan> {
    loop {
        let mut folded = Vec::with_capacity(spans.len());
        let mut changed = false;
        for (idx, span) in spans.iter().enumerate() {
            let fold = span.kind == EditKind::Equal
                && edit_run_len(spans[..idx].iter().rev()) >= span.text.len()
                && edit_run_len(spans[idx + 1..].iter()) >= span.text.len();
            if fold {
                folded.push(EditSpan {
                    kind: EditKind::Delete,
                    text: span.text.clone(),
                });
                folded.push(EditSpan {
                    kind: EditKind::Insert,
                    text: span.text.clone(),
                });
                changed = true;
            } else {
                folded.push(span.clone());
            }
        }
        spans = merge_runs(folded);
        if !changed {
            return spans;
        }
    }
}

/// Size of the contiguous edit run at the start of `spans`: the larger of
/// its deleted and inserted char counts. Zero if it starts with an equality.
fn edit_run_len<'a, I: Iterator<Item = &'a EditSpan>>(spans: I) -> usize {
    let mut deletes = 0;
    let mut inserts = 0;
    for span in spans {
        match span.kind {
            EditKind::Equal => break,
            EditKind::Delete => deletes += span.text.len(),
            EditKind::Insert => inserts += span.text.len(),
        }
    }
    deletes.max(inserts)
}

fn merge_runs(spans: Vec<EditSpan>) -> Vec<EditSpan> {
    let mut merged: Vec<EditSpan> = Vec::new();
    let mut deletes: Vec<char> = Vec::new();
    let mut inserts: Vec<char> = Vec::new();
    for span in spans {
        match span.kind {
            EditKind::Delete => deletes.extend(span.text),
            EditKind::Insert => inserts.extend(span.text),
            EditKind::Equal => {
                flush_edits(&mut merged, &mut deletes, &mut inserts);
                match merged.last_mut() {
                    Some(last) if last.kind == EditKind::Equal => last.text.extend(span.text),
                    _ => merged.push(span),
                }
            }
        }
    }
    flush_edits(&mut merged, &mut deletes, &mut inserts);
    merged
}

fn flush_edits(merged: &mut Vec<EditSpan>, deletes: &mut Vec<char>, inserts: &mut Vec<char>) {
    if !deletes.is_empty() {
        merged.push(EditSpan {
            kind: EditKind::Delete,
            text: std::mem::take(deletes),
        });
    }
    if !inserts.is_empty() {
        merged.push(EditSpan {
            kind: EditKind::Insert,
            text: std::mem::take(inserts),
        });
    }
}
