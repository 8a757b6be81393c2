//! Stack of output buffers.
//!
//! Sub-expressions are often emitted into a private buffer first so the
//! caller can splice them into a template, wrap them, or drop them. Frames
//! must be pushed and popped in strict LIFO order.

use crate::options::EmitterOptions;

/// Callback run with the captured text when a frame is popped.
pub type PopCallback = Box<dyn FnOnce(&str)>;

struct Frame {
    saved: String,
    saved_level: u32,
    saved_new_line: bool,
    saved_comma: bool,
    template: Option<String>,
    this_arg: Option<String>,
    /// Byte range of the template left untouched by substitution.
    ignore_range: Option<(usize, usize)>,
    callback: Option<PopCallback>,
}

/// Position inside the current buffer, used to discard partial output.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WriterSnapshot {
    len: usize,
    level: u32,
    is_new_line: bool,
    comma: bool,
    depth: usize,
}

pub struct OutputStack {
    current: String,
    level: u32,
    is_new_line: bool,
    comma: bool,
    frames: Vec<Frame>,
    indent_unit: String,
    new_line: &'static str,
}

impl OutputStack {
    pub fn new(options: &EmitterOptions) -> Self {
        Self {
            current: String::new(),
            level: 0,
            is_new_line: true,
            comma: false,
            frames: Vec::new(),
            indent_unit: " ".repeat(options.indent_size),
            new_line: options.new_line.as_str(),
        }
    }

    // =========================================================================
    // Frames
    // =========================================================================

    /// Start capturing into a fresh buffer.
    ///
    /// On pop, `{0}` in `template` is replaced by the captured text and
    /// `{this}` by `this_arg`, except inside `ignore_range`.
    pub fn push_writer(
        &mut self,
        template: Option<String>,
        callback: Option<PopCallback>,
        this_arg: Option<String>,
        ignore_range: Option<(usize, usize)>,
    ) {
        let saved = std::mem::take(&mut self.current);
        self.frames.push(Frame {
            saved,
            saved_level: self.level,
            saved_new_line: self.is_new_line,
            saved_comma: self.comma,
            template,
            this_arg,
            ignore_range,
            callback,
        });
        self.is_new_line = false;
        self.comma = false;
    }

    /// Finish the innermost frame and return its (substituted) text.
    ///
    /// Unless `prevent_write` is set, the text is also appended to the
    /// enclosing buffer.
    pub fn pop_writer(&mut self, prevent_write: bool) -> String {
        let Some(frame) = self.frames.pop() else {
            panic!("pop_writer called without a matching push_writer");
        };
        let captured = std::mem::replace(&mut self.current, frame.saved);
        self.level = frame.saved_level;
        self.is_new_line = frame.saved_new_line;
        self.comma = frame.saved_comma;

        let text = match frame.template {
            Some(template) => substitute(
                &template,
                &captured,
                frame.this_arg.as_deref(),
                frame.ignore_range,
            ),
            None => captured,
        };
        if !prevent_write {
            self.write(&text);
        }
        if let Some(callback) = frame.callback {
            callback(&text);
        }
        text
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn save_writer(&self) -> WriterSnapshot {
        WriterSnapshot {
            len: self.current.len(),
            level: self.level,
            is_new_line: self.is_new_line,
            comma: self.comma,
            depth: self.frames.len(),
        }
    }

    /// Discard everything written since `snapshot`.
    pub fn restore_writer(&mut self, snapshot: WriterSnapshot) {
        assert_eq!(
            snapshot.depth,
            self.frames.len(),
            "restore_writer across a frame boundary"
        );
        self.current.truncate(snapshot.len);
        self.level = snapshot.level;
        self.is_new_line = snapshot.is_new_line;
        self.comma = snapshot.comma;
    }

    // =========================================================================
    // Writing
    // =========================================================================

    pub fn write(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.is_new_line {
            for _ in 0..self.level {
                self.current.push_str(&self.indent_unit);
            }
            self.is_new_line = false;
        }
        self.current.push_str(text);
    }

    pub fn write_line(&mut self) {
        self.current.push_str(self.new_line);
        self.is_new_line = true;
    }

    /// Write text that may span several lines, re-indenting each line.
    pub fn write_block_text(&mut self, text: &str) {
        let mut first = true;
        for line in text.lines() {
            if !first {
                self.write_line();
            }
            first = false;
            self.write(line);
        }
    }

    /// Write `separator` before every item but the first in a list.
    pub fn separate(&mut self, separator: &str) {
        if self.comma {
            self.write(separator);
        }
        self.comma = true;
    }

    pub fn reset_separator(&mut self) {
        self.comma = false;
    }

    pub fn indent(&mut self) {
        self.level += 1;
    }

    pub fn outdent(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    pub const fn level(&self) -> u32 {
        self.level
    }

    pub fn set_level(&mut self, level: u32) {
        self.level = level;
    }

    pub fn indent_unit(&self) -> &str {
        &self.indent_unit
    }

    pub const fn new_line(&self) -> &'static str {
        self.new_line
    }

    /// Current buffer contents.
    pub fn text(&self) -> &str {
        &self.current
    }

    /// Take the root buffer, leaving it empty.
    pub fn take(&mut self) -> String {
        assert!(self.frames.is_empty(), "output taken with open frames");
        self.is_new_line = true;
        std::mem::take(&mut self.current)
    }
}

fn substitute(
    template: &str,
    captured: &str,
    this_arg: Option<&str>,
    ignore_range: Option<(usize, usize)>,
) -> String {
    let apply = |part: &str| {
        let part = part.replace("{0}", captured);
        match this_arg {
            Some(this_arg) => part.replace("{this}", this_arg),
            None => part,
        }
    };
    match ignore_range {
        Some((start, end)) if start <= end && end <= template.len() => {
            let mut out = apply(&template[..start]);
            out.push_str(&template[start..end]);
            out.push_str(&apply(&template[end..]));
            out
        }
        _ => apply(template),
    }
}

#[cfg(test)]
#[path = "../tests/output.rs"]
mod tests;
