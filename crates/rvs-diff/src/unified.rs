//! Unified diff output: `---`/`+++` headers, `@@` hunk headers, and
//! context/addition/deletion lines with three lines of context.

use bstr::ByteSlice;

use crate::{myers_diff, split_lines, Edit, EditOp};

/// Lines of unchanged context around each hunk.
const CONTEXT: usize = 3;

/// Format a unified diff between two blobs.
///
/// `old_label` and `new_label` are the header names (callers pass
/// `a/<path>` / `b/<path>`, or `/dev/null` for creation and deletion).
/// Returns an empty string when the contents are identical.
pub fn format_unified(
    old_label: &str,
    new_label: &str,
    old_data: &[u8],
    new_data: &[u8],
) -> String {
    if old_data == new_data {
        return String::new();
    }

    let old_lines = split_lines(old_data);
    let new_lines = split_lines(new_data);
    let edits = myers_diff(&old_lines, &new_lines);

    let hunks = build_hunks(&edits);
    if hunks.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    out.push_str(&format!("--- {old_label}\n"));
    out.push_str(&format!("+++ {new_label}\n"));

    for hunk in hunks {
        let (old_start, old_count, new_start, new_count) = hunk_spans(&hunk, &edits);
        out.push_str(&format!(
            "@@ -{},{} +{},{} @@\n",
            old_start, old_count, new_start, new_count
        ));
        for &i in &hunk {
            let edit = edits[i];
            match edit.op {
                EditOp::Equal => push_line(&mut out, ' ', old_lines[edit.old_index]),
                EditOp::Delete => push_line(&mut out, '-', old_lines[edit.old_index]),
                EditOp::Insert => push_line(&mut out, '+', new_lines[edit.new_index]),
            }
        }
    }

    out
}

fn push_line(out: &mut String, marker: char, line: &[u8]) {
    out.push(marker);
    out.push_str(&line.to_str_lossy());
    out.push('\n');
}

/// Group edit indices into hunks: runs of changes plus surrounding context,
/// merging hunks whose context would overlap.
fn build_hunks(edits: &[Edit]) -> Vec<Vec<usize>> {
    let change_indices: Vec<usize> = edits
        .iter()
        .enumerate()
        .filter(|(_, e)| e.op != EditOp::Equal)
        .map(|(i, _)| i)
        .collect();

    if change_indices.is_empty() {
        return Vec::new();
    }

    let mut hunks: Vec<(usize, usize)> = Vec::new();
    for &i in &change_indices {
        let start = i.saturating_sub(CONTEXT);
        let end = (i + CONTEXT + 1).min(edits.len());
        match hunks.last_mut() {
            Some((_, last_end)) if start <= *last_end => {
                *last_end = end.max(*last_end);
            }
            _ => hunks.push((start, end)),
        }
    }

    hunks
        .into_iter()
        .map(|(start, end)| (start..end).collect())
        .collect()
}

/// Compute `@@` header spans for a hunk.
fn hunk_spans(hunk: &[usize], edits: &[Edit]) -> (usize, usize, usize, usize) {
    let mut old_count = 0;
    let mut new_count = 0;
    for &i in hunk {
        match edits[i].op {
            EditOp::Equal => {
                old_count += 1;
                new_count += 1;
            }
            EditOp::Delete => old_count += 1,
            EditOp::Insert => new_count += 1,
        }
    }

    let first = edits[hunk[0]];
    // 1-based starts; a zero count renders the conventional 0 start.
    let old_start = if old_count == 0 { first.old_index } else { first.old_index + 1 };
    let new_start = if new_count == 0 { first.new_index } else { first.new_index + 1 };
    (old_start, old_count, new_start, new_count)
}
