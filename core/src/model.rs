use std::sync::Mutex;
use std::sync::PoisonError;

use assist_protocol::Position;
use assist_protocol::Range;

use crate::editor::TextEdit;
use crate::editor::TextModel;

/// A plain in-memory [`TextModel`]: 1-based line/column addressing over a
/// `\n`-joined line list. Backs the proposed-edit buffer in test widgets and
/// is available to embedders that have no richer buffer to offer.
#[derive(Debug)]
pub struct InMemoryModel {
    lines: Mutex<Vec<String>>,
}

fn split_lines(text: &str) -> Vec<String> {
    // split (not `lines()`) keeps a trailing empty line, matching editors.
    text.split('\n').map(String::from).collect()
}

/// Char offset of `pos` in the `\n`-joined text, clamped into bounds.
fn char_offset(lines: &[String], pos: Position) -> usize {
    let wanted = pos.line.saturating_sub(1) as usize;
    let mut offset = 0usize;
    for (idx, line) in lines.iter().enumerate() {
        let len = line.chars().count();
        if idx == wanted {
            return offset + (pos.column.saturating_sub(1) as usize).min(len);
        }
        offset += len + 1;
    }
    // Past the last line: end of text.
    offset.saturating_sub(1)
}

impl InMemoryModel {
    pub fn new(text: &str) -> Self {
        Self {
            lines: Mutex::new(split_lines(text)),
        }
    }

    fn lines(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn splice(lines: &mut Vec<String>, range: Range, text: &str) {
        let start = char_offset(lines, range.start);
        let end = char_offset(lines, range.end).max(start);
        let mut chars: Vec<char> = lines.join("\n").chars().collect();
        chars.splice(start..end, text.chars());
        let rebuilt: String = chars.into_iter().collect();
        *lines = split_lines(&rebuilt);
    }
}

impl TextModel for InMemoryModel {
    fn line_count(&self) -> u32 {
        self.lines().len() as u32
    }

    fn line_max_column(&self, line: u32) -> u32 {
        let lines = self.lines();
        match line
            .checked_sub(1)
            .and_then(|idx| lines.get(idx as usize))
        {
            Some(text) => text.chars().count() as u32 + 1,
            None => 1,
        }
    }

    fn get_value(&self) -> String {
        self.lines().join("\n")
    }

    fn get_value_in_range(&self, range: Range) -> String {
        let lines = self.lines();
        let start = char_offset(&lines, range.start);
        let end = char_offset(&lines, range.end).max(start);
        lines.join("\n").chars().take(end).skip(start).collect()
    }

    fn set_value(&self, text: &str) {
        *self.lines() = split_lines(text);
    }

    fn push_edit_operations(&self, mut edits: Vec<TextEdit>) {
        // Apply back to front so earlier offsets stay valid.
        edits.sort_by(|a, b| b.range.start.cmp(&a.range.start));
        let mut lines = self.lines();
        for edit in edits {
            Self::splice(&mut lines, edit.range, &edit.text);
        }
    }
}
