//! Buffered command output.
//!
//! Commands never print directly. They write into an [`OutputBuffer`] that
//! the dispatcher acquires per run, so callers can capture, inspect, or
//! forward the text afterwards. The buffer is a plain string sink; styling
//! and structured serialization are out of scope for this layer.

use std::fmt;

/// A plain text sink, scope-acquired for a single command run.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    buf: String,
}

impl OutputBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends raw text without a trailing newline.
    pub fn write(&mut self, text: &str) {
        self.buf.push_str(text);
    }

    /// Appends a line of text.
    pub fn line(&mut self, text: &str) {
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    /// Appends an informational line.
    pub fn info(&mut self, text: &str) {
        self.line(text);
    }

    /// Appends a warning line with a `warning:` prefix.
    pub fn warn(&mut self, text: &str) {
        self.line(&format!("warning: {}", text));
    }

    /// Appends an error line with an `error:` prefix.
    pub fn error(&mut self, text: &str) {
        self.line(&format!("error: {}", text));
    }

    /// Returns the captured text.
    pub fn contents(&self) -> &str {
        &self.buf
    }

    /// Returns true if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consumes the buffer, returning the captured text.
    pub fn into_string(self) -> String {
        self.buf
    }
}

impl fmt::Write for OutputBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.buf.push_str(s);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_appends_newline() {
        let mut out = OutputBuffer::new();
        out.line("hello");
        assert_eq!(out.contents(), "hello\n");
    }

    #[test]
    fn test_severity_prefixes() {
        let mut out = OutputBuffer::new();
        out.warn("careful");
        out.error("broken");
        assert_eq!(out.contents(), "warning: careful\nerror: broken\n");
    }

    #[test]
    fn test_write_is_raw() {
        let mut out = OutputBuffer::new();
        out.write("a");
        out.write("b");
        assert_eq!(out.into_string(), "ab");
    }
}
