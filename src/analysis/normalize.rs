//! Comment and string masking for JavaScript/TypeScript source text.
//!
//! The normalizer blanks out everything that is not code (comment text,
//! string bodies, template bodies) in a single linear pass without relying
//! on any grammar, so it works on files tree-sitter cannot parse. The output
//! keeps the exact byte length of the input and every newline, which keeps
//! byte offsets and line numbers valid against the raw text.

/// Source text with non-code content blanked out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    text: String,
    mask: Vec<bool>,
}

impl NormalizedText {
    /// The masked text. Masked bytes are spaces.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in bytes (always equal to the raw text length).
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Returns true if the text is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Returns true if the byte at `offset` lies inside a comment, string or
    /// template body. Offsets past the end count as masked.
    pub fn is_masked(&self, offset: usize) -> bool {
        self.mask.get(offset).copied().unwrap_or(true)
    }

    fn push_code(&mut self, c: char) {
        self.text.push(c);
        self.mask.extend(std::iter::repeat(false).take(c.len_utf8()));
    }

    fn push_masked(&mut self, c: char) {
        if c == '\n' {
            self.push_code(c);
            return;
        }
        for _ in 0..c.len_utf8() {
            self.text.push(' ');
            self.mask.push(true);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    LineComment,
    BlockComment,
    Str(char),
    Template,
}

/// Mask comments, string bodies and template bodies in `source`.
///
/// Quote characters and `${`/`}` delimiters stay visible; the contents of
/// template interpolations are treated as code. Unterminated strings and
/// templates close at the next newline.
///
/// # Example
///
/// ```rust
/// use shakeguard::analysis::normalize::normalize;
///
/// let masked = normalize("let a = 'x'; // note\n");
/// assert_eq!(masked.as_str(), "let a = ' ';        \n");
/// assert!(masked.is_masked(9));
/// assert!(!masked.is_masked(0));
/// ```
pub fn normalize(source: &str) -> NormalizedText {
    let mut out = NormalizedText {
        text: String::with_capacity(source.len()),
        mask: Vec::with_capacity(source.len()),
    };
    // One brace-depth counter per open `${` interpolation.
    let mut holes: Vec<usize> = Vec::new();
    let mut state = State::Code;
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Code => match c {
                '/' if chars.peek() == Some(&'/') => {
                    out.push_masked(c);
                    if let Some(next) = chars.next() {
                        out.push_masked(next);
                    }
                    state = State::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    out.push_masked(c);
                    if let Some(next) = chars.next() {
                        out.push_masked(next);
                    }
                    state = State::BlockComment;
                }
                '\'' | '"' => {
                    out.push_code(c);
                    state = State::Str(c);
                }
                '`' => {
                    out.push_code(c);
                    state = State::Template;
                }
                '{' => {
                    if let Some(depth) = holes.last_mut() {
                        *depth += 1;
                    }
                    out.push_code(c);
                }
                '}' => {
                    out.push_code(c);
                    match holes.last_mut() {
                        Some(0) => {
                            holes.pop();
                            state = State::Template;
                        }
                        Some(depth) => *depth -= 1,
                        None => {}
                    }
                }
                _ => out.push_code(c),
            },
            State::LineComment => {
                if c == '\n' {
                    out.push_code(c);
                    state = State::Code;
                } else {
                    out.push_masked(c);
                }
            }
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    out.push_masked(c);
                    if let Some(next) = chars.next() {
                        out.push_masked(next);
                    }
                    state = State::Code;
                } else {
                    out.push_masked(c);
                }
            }
            State::Str(quote) => match c {
                '\\' => {
                    out.push_masked(c);
                    if let Some(next) = chars.next() {
                        out.push_masked(next);
                    }
                }
                '\n' => {
                    out.push_code(c);
                    state = State::Code;
                }
                _ if c == quote => {
                    out.push_code(c);
                    state = State::Code;
                }
                _ => out.push_masked(c),
            },
            State::Template => match c {
                '\\' => {
                    out.push_masked(c);
                    if let Some(next) = chars.next() {
                        out.push_masked(next);
                    }
                }
                '`' => {
                    out.push_code(c);
                    state = State::Code;
                }
                '$' if chars.peek() == Some(&'{') => {
                    out.push_code(c);
                    if let Some(next) = chars.next() {
                        out.push_code(next);
                    }
                    holes.push(0);
                    state = State::Code;
                }
                '\n' => {
                    out.push_code(c);
                    state = State::Code;
                }
                _ => out.push_masked(c),
            },
        }
    }

    out
}
