//! Lexical analysis of a console input line.
//!
//! A line is split on unquoted whitespace. A double-quoted span is kept as part
//! of a single token with its quotes removed, so `greet "New York" 5` yields the
//! tokens `greet`, `New York` and `5`.

use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexingState {
    Start,
    ReadingWord,
    ReadingQuote,
}

struct LexingFSM {
    input: Vec<char>,
    pos: usize,
    state: LexingState,
    buffer: String,
    // whether the token being built contained a quoted span; `""` is an empty token
    quoted: bool,
    token_start: usize,
}

impl LexingFSM {
    fn new(line: &str) -> Self {
        LexingFSM {
            input: line.chars().collect(),
            pos: 0,
            state: LexingState::Start,
            buffer: String::new(),
            quoted: false,
            token_start: 0,
        }
    }

    /// Runs the machine over the whole input.
    ///
    /// An opening quote that is never closed does not fail the line: the token
    /// it starts and everything after it are split on whitespace with quotes
    /// kept as literal characters.
    fn make_tokens(mut self) -> Vec<String> {
        let mut out = Vec::new();

        while let Some(ch) = self.read_char() {
            match self.state {
                LexingState::Start => self.handle_start(ch),
                LexingState::ReadingWord => self.handle_word(ch, &mut out),
                LexingState::ReadingQuote => self.handle_quote(ch),
            }
        }

        if self.state == LexingState::ReadingQuote {
            let rest: String = self.input[self.token_start..].iter().collect();
            warn!(rest = %rest, "unbalanced quote, treating the rest of the line literally");
            out.extend(rest.split_whitespace().map(str::to_string));
            return out;
        }

        self.finish_token(&mut out);
        out
    }

    fn read_char(&mut self) -> Option<char> {
        let ch = self.input.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn handle_start(&mut self, ch: char) {
        if ch.is_whitespace() {
            return;
        }
        self.token_start = self.pos - 1;
        if ch == '"' {
            self.quoted = true;
            self.state = LexingState::ReadingQuote;
        } else {
            self.buffer.push(ch);
            self.state = LexingState::ReadingWord;
        }
    }

    fn handle_word(&mut self, ch: char, out: &mut Vec<String>) {
        match ch {
            c if c.is_whitespace() => {
                self.finish_token(out);
                self.state = LexingState::Start;
            }
            '"' => {
                self.quoted = true;
                self.state = LexingState::ReadingQuote;
            }
            c => self.buffer.push(c),
        }
    }

    fn handle_quote(&mut self, ch: char) {
        match ch {
            '"' => self.state = LexingState::ReadingWord,
            c => self.buffer.push(c),
        }
    }

    fn finish_token(&mut self, out: &mut Vec<String>) {
        if !self.buffer.is_empty() || self.quoted {
            out.push(std::mem::take(&mut self.buffer));
        }
        self.quoted = false;
    }
}

/// Split `line` into tokens.
///
/// Whitespace outside double quotes separates tokens; runs of whitespace count
/// as one separator. Quote characters are removed and the text between them is
/// kept verbatim, including spaces.
pub fn split_into_tokens(line: &str) -> Vec<String> {
    LexingFSM::new(line).make_tokens()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(line: &str) -> Vec<String> {
        split_into_tokens(line)
    }

    #[test]
    fn test_plain_words() {
        assert_eq!(tokens("Math.add 1 2"), vec!["Math.add", "1", "2"]);
    }

    #[test]
    fn test_quoted_span_is_one_token() {
        assert_eq!(tokens("greet \"New York\" 5"), vec!["greet", "New York", "5"]);
    }

    #[test]
    fn test_quoted_span_keeps_inner_spacing() {
        assert_eq!(tokens("echo \"  a  b \""), vec!["echo", "  a  b "]);
    }

    #[test]
    fn test_empty_quotes_give_empty_token() {
        assert_eq!(tokens("echo \"\" x"), vec!["echo", "", "x"]);
    }

    #[test]
    fn test_extra_whitespace_is_collapsed() {
        assert_eq!(tokens("  echo   a\tb  "), vec!["echo", "a", "b"]);
    }

    #[test]
    fn test_quotes_inside_word_are_joined() {
        assert_eq!(tokens("cat dir/\"my file\".txt"), vec!["cat", "dir/my file.txt"]);
    }

    #[test]
    fn test_unbalanced_quote_falls_back_to_literal_text() {
        assert_eq!(
            tokens("echo ok \"New York 5"),
            vec!["echo", "ok", "\"New", "York", "5"]
        );
        assert_eq!(tokens("echo a\"b c"), vec!["echo", "a\"b", "c"]);
    }

    #[test]
    fn test_blank_line_has_no_tokens() {
        assert!(tokens("").is_empty());
        assert!(tokens("   ").is_empty());
    }
}
