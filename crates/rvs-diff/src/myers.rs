//! Myers O(ND) difference algorithm.
//!
//! Produces a minimal line-level edit script. Common prefix and suffix are
//! trimmed before the quadratic core runs.

use crate::{Edit, EditOp};

/// Compute a diff between two line sequences.
pub fn diff(old: &[&[u8]], new: &[&[u8]]) -> Vec<Edit> {
    // Trim common prefix.
    let prefix_len = old
        .iter()
        .zip(new.iter())
        .take_while(|(a, b)| a == b)
        .count();

    // Trim common suffix.
    let suffix_len = old[prefix_len..]
        .iter()
        .rev()
        .zip(new[prefix_len..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let old_trimmed = &old[prefix_len..old.len() - suffix_len];
    let new_trimmed = &new[prefix_len..new.len() - suffix_len];

    let mut edits = Vec::with_capacity(old.len() + new.len());
    for i in 0..prefix_len {
        edits.push(Edit {
            op: EditOp::Equal,
            old_index: i,
            new_index: i,
        });
    }

    for edit in myers_core(old_trimmed, new_trimmed) {
        edits.push(Edit {
            op: edit.op,
            old_index: edit.old_index + prefix_len,
            new_index: edit.new_index + prefix_len,
        });
    }

    for i in 0..suffix_len {
        edits.push(Edit {
            op: EditOp::Equal,
            old_index: old.len() - suffix_len + i,
            new_index: new.len() - suffix_len + i,
        });
    }

    edits
}

/// The shortest-edit-script search over the trimmed sequences.
fn myers_core(old: &[&[u8]], new: &[&[u8]]) -> Vec<Edit> {
    let n = old.len();
    let m = new.len();
    if n == 0 {
        return (0..m)
            .map(|i| Edit {
                op: EditOp::Insert,
                old_index: 0,
                new_index: i,
            })
            .collect();
    }
    if m == 0 {
        return (0..n)
            .map(|i| Edit {
                op: EditOp::Delete,
                old_index: i,
                new_index: 0,
            })
            .collect();
    }

    let max = n + m;
    let offset = max;
    // v[k + offset] = furthest x on diagonal k.
    let mut v = vec![0usize; 2 * max + 1];
    let mut trace: Vec<Vec<usize>> = Vec::new();

    'outer: for d in 0..=max {
        trace.push(v.clone());
        let d_i = d as isize;
        let mut k = -d_i;
        while k <= d_i {
            let ki = (k + offset as isize) as usize;
            let mut x = if k == -d_i || (k != d_i && v[ki - 1] < v[ki + 1]) {
                v[ki + 1]
            } else {
                v[ki - 1] + 1
            };
            let mut y = (x as isize - k) as usize;
            while x < n && y < m && old[x] == new[y] {
                x += 1;
                y += 1;
            }
            v[ki] = x;
            if x >= n && y >= m {
                break 'outer;
            }
            k += 2;
        }
    }

    backtrack(old, new, &trace, offset)
}

/// Walk the trace backwards to recover the edit script.
fn backtrack(old: &[&[u8]], new: &[&[u8]], trace: &[Vec<usize>], offset: usize) -> Vec<Edit> {
    let mut edits = Vec::new();
    let mut x = old.len();
    let mut y = new.len();

    for (d, v) in trace.iter().enumerate().rev() {
        if d == 0 {
            // Depth 0 is a pure snake along diagonal 0.
            while x > 0 && y > 0 {
                x -= 1;
                y -= 1;
                edits.push(Edit {
                    op: EditOp::Equal,
                    old_index: x,
                    new_index: y,
                });
            }
            break;
        }

        let d_i = d as isize;
        let k = x as isize - y as isize;
        let ki = (k + offset as isize) as usize;

        let prev_k = if k == -d_i || (k != d_i && v[ki - 1] < v[ki + 1]) {
            k + 1
        } else {
            k - 1
        };
        let prev_ki = (prev_k + offset as isize) as usize;
        let prev_x = v[prev_ki];
        let prev_y = (prev_x as isize - prev_k).max(0) as usize;

        // Snake: trailing equal lines on this diagonal.
        while x > prev_x && y > prev_y {
            x -= 1;
            y -= 1;
            edits.push(Edit {
                op: EditOp::Equal,
                old_index: x,
                new_index: y,
            });
        }

        if x == prev_x {
            y -= 1;
            edits.push(Edit {
                op: EditOp::Insert,
                old_index: x,
                new_index: y,
            });
        } else {
            x -= 1;
            edits.push(Edit {
                op: EditOp::Delete,
                old_index: x,
                new_index: y,
            });
        }
    }

    edits.reverse();
    edits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::split_lines;

    fn ops(old: &[u8], new: &[u8]) -> Vec<EditOp> {
        let old = split_lines(old);
        let new = split_lines(new);
        diff(&old, &new).into_iter().map(|e| e.op).collect()
    }

    #[test]
    fn identical_inputs_are_all_equal() {
        let result = ops(b"a\nb\nc\n", b"a\nb\nc\n");
        assert_eq!(result, vec![EditOp::Equal; 3]);
    }

    #[test]
    fn pure_insertion() {
        let result = ops(b"a\n", b"a\nb\n");
        assert_eq!(result, vec![EditOp::Equal, EditOp::Insert]);
    }

    #[test]
    fn pure_deletion() {
        let result = ops(b"a\nb\n", b"a\n");
        assert_eq!(result, vec![EditOp::Equal, EditOp::Delete]);
    }

    #[test]
    fn replacement_in_middle() {
        let result = ops(b"a\nx\nc\n", b"a\ny\nc\n");
        assert_eq!(
            result,
            vec![EditOp::Equal, EditOp::Delete, EditOp::Insert, EditOp::Equal]
        );
    }

    #[test]
    fn empty_to_content() {
        let result = ops(b"", b"a\nb\n");
        assert_eq!(result, vec![EditOp::Insert, EditOp::Insert]);
    }

    #[test]
    fn content_to_empty() {
        let result = ops(b"a\nb\n", b"");
        assert_eq!(result, vec![EditOp::Delete, EditOp::Delete]);
    }

    #[test]
    fn edit_script_reproduces_target() {
        let old_bytes: &[u8] = b"one\ntwo\nthree\nfour\n";
        let new_bytes: &[u8] = b"zero\none\nthree\nfive\n";
        let old = split_lines(old_bytes);
        let new = split_lines(new_bytes);
        let edits = diff(&old, &new);

        // Applying the script to `old` must yield `new`.
        let mut rebuilt: Vec<&[u8]> = Vec::new();
        for edit in &edits {
            match edit.op {
                EditOp::Equal => rebuilt.push(old[edit.old_index]),
                EditOp::Insert => rebuilt.push(new[edit.new_index]),
                EditOp::Delete => {}
            }
        }
        assert_eq!(rebuilt, new);
    }
}
