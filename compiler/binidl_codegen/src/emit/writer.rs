//! Indented source output.

/// Line-oriented writer for emitted source.
pub struct SourceWriter {
    /// Current indentation level.
    indent: usize,
    output: String,
    /// Counter for unique temporaries within one function body.
    temp_counter: u32,
}

impl Default for SourceWriter {
    fn default() -> Self {
        SourceWriter {
            indent: 0,
            output: String::with_capacity(4096),
            temp_counter: 0,
        }
    }
}

impl SourceWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a unique temporary variable name.
    pub fn fresh_temp(&mut self) -> String {
        let n = self.temp_counter;
        self.temp_counter += 1;
        format!("t{n}")
    }

    /// Restart temporary numbering, at the start of a function body.
    pub fn reset_temps(&mut self) {
        self.temp_counter = 0;
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        debug_assert!(self.indent > 0, "dedent called with zero indent");
        self.indent = self.indent.saturating_sub(1);
    }

    /// Write a line with indentation and newline.
    pub fn writeln(&mut self, s: &str) {
        for _ in 0..self.indent {
            self.output.push_str("    ");
        }
        self.output.push_str(s);
        self.output.push('\n');
    }

    /// Write `open`, then indent.
    pub fn open(&mut self, open: &str) {
        self.writeln(open);
        self.indent();
    }

    /// Dedent, then write `close`.
    pub fn close(&mut self, close: &str) {
        self.dedent();
        self.writeln(close);
    }

    pub fn newline(&mut self) {
        self.output.push('\n');
    }

    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }
}
