//! Line-oriented text builder for generated C/CUDA sources

/// Accumulates generated source text with four-space indentation
#[derive(Debug, Default)]
pub struct Source {
    buf: String,
    depth: usize,
}

impl Source {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one line at the current indentation
    pub fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.depth {
                self.buf.push_str("    ");
            }
            self.buf.push_str(text);
        }
        self.buf.push('\n');
        self
    }

    /// Append a preprocessor line, always in column zero
    pub fn directive(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.buf.push_str(text.as_ref());
        self.buf.push('\n');
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.buf.push('\n');
        self
    }

    /// Open a `{` block and indent; an empty head opens a bare scope
    pub fn open(&mut self, head: impl AsRef<str>) -> &mut Self {
        match head.as_ref() {
            "" => self.line("{"),
            head => self.line(format!("{head} {{")),
        };
        self.depth += 1;
        self
    }

    /// Dedent and close a block
    pub fn close(&mut self) -> &mut Self {
        self.close_with("")
    }

    /// Dedent and close a block followed by `tail`, e.g. `};`
    pub fn close_with(&mut self, tail: &str) -> &mut Self {
        self.depth = self.depth.saturating_sub(1);
        self.line(format!("}}{tail}"))
    }

    /// `for (int i = 0; i < bound; ++i) { body }`
    pub fn for_loop(&mut self, var: &str, bound: &str, body: impl AsRef<str>) -> &mut Self {
        self.open(format!("for (int {var} = 0; {var} < {bound}; ++{var})"));
        self.line(body);
        self.close()
    }

    /// Append text produced by another builder at the current depth
    pub fn append(&mut self, other: Source) -> &mut Self {
        for line in other.buf.lines() {
            if line.starts_with('#') {
                self.directive(line);
            } else {
                self.line(line);
            }
        }
        self
    }

    pub fn finish(self) -> String {
        self.buf
    }
}

/// Render a double literal that round-trips exactly (`800.0`, `1e-7`)
pub fn c_double(value: f64) -> String {
    format!("{value:?}")
}
