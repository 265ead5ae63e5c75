//! Best-effort repair of almost-JSON text produced by language models.
//!
//! [`repair_json`] makes a single forward pass over the input while tracking
//! the open containers. It re-emits what it can recognise as JSON and patches
//! the usual defects along the way: comments and ellipses, trailing or
//! missing commas, missing colons, bare keys and bare word values, Python
//! literals, single-quoted strings, raw control characters and unescaped
//! quotes inside strings, unterminated strings and unclosed containers.
//! Anything after the first complete top-level value is ignored.
//!
//! The output is not guaranteed to be valid JSON; callers still parse it.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Key,
    Colon,
    Value,
    AfterValue,
}

#[derive(Debug)]
struct Frame {
    container: Container,
    slot: Slot,
    items: usize,
}

impl Frame {
    fn new(container: Container) -> Self {
        let slot = match container {
            Container::Object => Slot::Key,
            Container::Array => Slot::Value,
        };
        Self {
            container,
            slot,
            items: 0,
        }
    }

    fn closer(&self) -> char {
        match self.container {
            Container::Object => '}',
            Container::Array => ']',
        }
    }
}

struct Repairer {
    chars: Vec<char>,
    pos: usize,
    out: String,
    stack: Vec<Frame>,
    done: bool,
}

pub fn repair_json(input: &str) -> String {
    let mut repairer = Repairer {
        chars: input.chars().collect(),
        pos: 0,
        out: String::with_capacity(input.len() + 16),
        stack: Vec::new(),
        done: false,
    };
    repairer.run();
    repairer.out
}

fn is_word_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_number_start(c: char) -> bool {
    c.is_ascii_digit() || c == '-' || c == '+'
}

impl Repairer {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn run(&mut self) {
        while !self.done {
            let Some(c) = self.peek() else { break };
            match c {
                c if c.is_whitespace() => self.pos += 1,
                '/' if matches!(self.peek_at(1), Some('/') | Some('*')) => self.skip_comment(),
                '#' => self.skip_line(),
                '{' => {
                    self.pos += 1;
                    self.open(Container::Object);
                }
                '[' => {
                    self.pos += 1;
                    self.open(Container::Array);
                }
                '}' | ']' => {
                    self.pos += 1;
                    self.close_matching(c);
                }
                ',' => {
                    self.pos += 1;
                    self.comma();
                }
                ':' => {
                    self.pos += 1;
                    self.colon();
                }
                '"' | '\'' => {
                    self.pos += 1;
                    let literal = self.read_string(c);
                    self.scalar(literal, true);
                }
                c if is_number_start(c)
                    || (c == '.' && self.peek_at(1).is_some_and(|n| n.is_ascii_digit())) =>
                {
                    let literal = self.read_number();
                    self.scalar(literal, false);
                }
                c if is_word_start(c) => {
                    let as_key = self.expects_key();
                    let literal = self.read_word(as_key);
                    self.scalar(literal, as_key);
                }
                // ellipses and any other stray punctuation
                _ => self.pos += 1,
            }
        }

        if !self.done {
            while !self.stack.is_empty() {
                self.close_top();
            }
        }
    }

    fn expects_key(&self) -> bool {
        self.stack.last().is_some_and(|frame| {
            frame.container == Container::Object
                && matches!(frame.slot, Slot::Key | Slot::AfterValue)
        })
    }

    fn skip_comment(&mut self) {
        if self.peek_at(1) == Some('/') {
            self.skip_line();
            return;
        }
        self.pos += 2;
        while let Some(c) = self.peek() {
            if c == '*' && self.peek_at(1) == Some('/') {
                self.pos += 2;
                return;
            }
            self.pos += 1;
        }
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.peek() {
            self.pos += 1;
            if c == '\n' {
                break;
            }
        }
    }

    /// Emits whatever separator the enclosing container needs before a value.
    /// Returns false when the value cannot be placed and must be dropped.
    fn before_value(&mut self) -> bool {
        let Some(frame) = self.stack.last_mut() else {
            return true;
        };
        match (frame.container, frame.slot) {
            (Container::Array, Slot::Value) | (Container::Array, Slot::AfterValue) => {
                if frame.items > 0 {
                    self.out.push(',');
                }
                frame.items += 1;
                frame.slot = Slot::AfterValue;
                true
            }
            (Container::Object, Slot::Value) => {
                frame.slot = Slot::AfterValue;
                true
            }
            (Container::Object, Slot::Colon) => {
                self.out.push(':');
                frame.slot = Slot::AfterValue;
                true
            }
            // a value where a key belongs: nowhere to put it
            (Container::Object, _) => false,
            (Container::Array, _) => false,
        }
    }

    fn before_key(&mut self) {
        if let Some(frame) = self.stack.last_mut() {
            if frame.items > 0 {
                self.out.push(',');
            }
            frame.items += 1;
            frame.slot = Slot::Colon;
        }
    }

    fn open(&mut self, container: Container) {
        if !self.before_value() {
            return;
        }
        self.out.push(match container {
            Container::Object => '{',
            Container::Array => '[',
        });
        self.stack.push(Frame::new(container));
    }

    fn close_top(&mut self) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        if frame.container == Container::Object {
            match frame.slot {
                Slot::Colon => self.out.push_str(":null"),
                Slot::Value => self.out.push_str("null"),
                _ => {}
            }
        }
        self.out.push(frame.closer());
        if self.stack.is_empty() {
            self.done = true;
        }
    }

    fn close_matching(&mut self, closer: char) {
        let Some(depth) = self.stack.iter().rposition(|frame| frame.closer() == closer) else {
            return;
        };
        while self.stack.len() > depth {
            self.close_top();
        }
    }

    fn comma(&mut self) {
        let Some(frame) = self.stack.last_mut() else {
            return;
        };
        match (frame.container, frame.slot) {
            (Container::Object, Slot::AfterValue) => frame.slot = Slot::Key,
            (Container::Array, Slot::AfterValue) => frame.slot = Slot::Value,
            (Container::Object, Slot::Value) => {
                self.out.push_str("null");
                frame.slot = Slot::Key;
            }
            (Container::Object, Slot::Colon) => {
                self.out.push_str(":null");
                frame.slot = Slot::Key;
            }
            _ => {}
        }
    }

    fn colon(&mut self) {
        if let Some(frame) = self.stack.last_mut() {
            if frame.container == Container::Object && frame.slot == Slot::Colon {
                self.out.push(':');
                frame.slot = Slot::Value;
            }
        }
    }

    /// Places an already-rendered scalar. Strings may serve as object keys.
    fn scalar(&mut self, literal: String, is_string: bool) {
        if self.expects_key() {
            if is_string {
                self.before_key();
                self.out.push_str(&literal);
            }
            return;
        }
        if !self.before_value() {
            return;
        }
        self.out.push_str(&literal);
        if self.stack.is_empty() {
            self.done = true;
        }
    }

    /// Reads a string body after its opening quote and returns it re-quoted.
    fn read_string(&mut self, quote: char) -> String {
        let mut buf = String::from('"');
        while let Some(c) = self.peek() {
            self.pos += 1;
            match c {
                '\\' => match self.peek() {
                    Some(next @ ('"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't')) => {
                        self.pos += 1;
                        buf.push('\\');
                        buf.push(next);
                    }
                    Some('u') if self.has_hex_escape() => {
                        self.pos += 1;
                        buf.push_str("\\u");
                    }
                    Some('\'') => {
                        self.pos += 1;
                        buf.push('\'');
                    }
                    _ => buf.push_str("\\\\"),
                },
                c if c == quote => {
                    if self.quote_closes_string() {
                        break;
                    }
                    buf.push_str(if quote == '"' { "\\\"" } else { "'" });
                }
                '"' => buf.push_str("\\\""),
                '\n' => buf.push_str("\\n"),
                '\r' => buf.push_str("\\r"),
                '\t' => buf.push_str("\\t"),
                c if (c as u32) < 0x20 => buf.push_str(&format!("\\u{:04x}", c as u32)),
                c => buf.push(c),
            }
        }
        buf.push('"');
        buf
    }

    fn has_hex_escape(&self) -> bool {
        (1..=4).all(|i| self.peek_at(i).is_some_and(|c| c.is_ascii_hexdigit()))
    }

    /// Decides whether a quote just consumed ends the string or is part of it.
    fn quote_closes_string(&self) -> bool {
        let mut i = self.pos;
        let mut saw_newline = false;
        while let Some(&c) = self.chars.get(i) {
            if !c.is_whitespace() {
                return match c {
                    ',' | '}' | ']' | ':' | '#' => true,
                    '/' => matches!(self.chars.get(i + 1), Some('/') | Some('*')),
                    '"' | '\'' => saw_newline,
                    c if saw_newline && is_word_start(c) => self.bare_key_at(i),
                    _ => false,
                };
            }
            saw_newline |= c == '\n';
            i += 1;
        }
        true
    }

    /// True when an unquoted identifier starting at `start` is followed by `:`.
    fn bare_key_at(&self, start: usize) -> bool {
        let rest = &self.chars[start..];
        let key_len = rest
            .iter()
            .take_while(|&&c| c.is_alphanumeric() || matches!(c, '_' | '$' | '-'))
            .count();
        rest[key_len..]
            .iter()
            .find(|&&c| !matches!(c, ' ' | '\t'))
            .is_some_and(|&c| c == ':')
    }

    fn read_number(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E') {
                self.pos += 1;
            } else {
                break;
            }
        }
        let raw: String = self.chars[start..self.pos].iter().collect();
        let trimmed = raw.trim_start_matches('+');

        if serde_json::from_str::<serde_json::Number>(trimmed).is_ok() {
            return trimmed.to_string();
        }
        match trimmed.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
            Some(number) => number.to_string(),
            None => serde_json::Value::String(raw).to_string(),
        }
    }

    /// Reads an unquoted word. Keys stop at `:`; values run to the next delimiter.
    fn read_word(&mut self, as_key: bool) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            let stop = if as_key {
                c == ':' || c.is_whitespace() || matches!(c, ',' | '{' | '}' | '[' | ']' | '"')
            } else {
                matches!(c, ',' | '}' | ']' | '\n' | '\r' | '"')
            };
            if stop {
                break;
            }
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        let word = word.trim();

        if as_key {
            return serde_json::Value::String(word.to_string()).to_string();
        }
        match word {
            "true" | "True" | "TRUE" => "true".to_string(),
            "false" | "False" | "FALSE" => "false".to_string(),
            "null" | "None" | "NULL" | "undefined" | "NaN" => "null".to_string(),
            other => serde_json::Value::String(other.to_string()).to_string(),
        }
    }
}
