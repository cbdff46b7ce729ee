//! Parser for the literal-like mappings the model writes as its answer.
//!
//! The answer looks like a Python dict literal:
//! `{'year': [2024, 2024], 'file content': ['Report'], ...}`. This module reads
//! exactly one such mapping from the start of the input and reports how many
//! bytes it consumed, so whatever the model keeps writing after the closing
//! brace is left alone. Nothing is ever evaluated.

use crate::error::MalformedOutput;

/// Deepest nesting of lists and mappings accepted.
pub const MAX_DEPTH: usize = 32;

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<LiteralValue>),
    Map(Vec<(String, LiteralValue)>),
}

impl LiteralValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            LiteralValue::None => "None",
            LiteralValue::Bool(_) => "bool",
            LiteralValue::Int(_) => "int",
            LiteralValue::Float(_) => "float",
            LiteralValue::Str(_) => "string",
            LiteralValue::List(_) => "list",
            LiteralValue::Map(_) => "mapping",
        }
    }
}

/// Parse the mapping at the start of `input` (after whitespace).
///
/// Returns the mapping and the byte offset just past its closing brace.
pub fn parse_mapping(input: &str) -> Result<(LiteralValue, usize), MalformedOutput> {
    let mut parser = Parser::new(input);
    parser.skip_whitespace();
    match parser.peek() {
        Some(b'{') => {}
        Some(_) => {
            return Err(MalformedOutput::Syntax {
                offset: parser.pos,
                expected: "'{'",
            })
        }
        None => return Err(MalformedOutput::EmptyAnswer),
    }
    let value = parser.parse_value(0)?;
    Ok((value, parser.pos))
}

struct Parser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn error(&self, expected: &'static str) -> MalformedOutput {
        if self.pos >= self.bytes.len() {
            MalformedOutput::Truncated { expected }
        } else {
            MalformedOutput::Syntax {
                offset: self.pos,
                expected,
            }
        }
    }

    fn expect(&mut self, byte: u8, expected: &'static str) -> Result<(), MalformedOutput> {
        self.skip_whitespace();
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(expected))
        }
    }

    fn parse_value(&mut self, depth: usize) -> Result<LiteralValue, MalformedOutput> {
        if depth > MAX_DEPTH {
            return Err(MalformedOutput::TooDeep(MAX_DEPTH));
        }
        self.skip_whitespace();
        match self.peek() {
            Some(b'{') => self.parse_map(depth),
            Some(b'[') => self.parse_sequence(b']', depth),
            Some(b'(') => self.parse_sequence(b')', depth),
            Some(b'\'') | Some(b'"') => self.parse_string().map(LiteralValue::Str),
            Some(b) if b == b'-' || b == b'+' || b == b'.' || b.is_ascii_digit() => {
                self.parse_number()
            }
            Some(b) if b.is_ascii_alphabetic() => self.parse_keyword(),
            _ => Err(self.error("a value")),
        }
    }

    fn parse_map(&mut self, depth: usize) -> Result<LiteralValue, MalformedOutput> {
        self.expect(b'{', "'{'")?;
        let mut entries: Vec<(String, LiteralValue)> = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some(b'}') {
                self.pos += 1;
                return Ok(LiteralValue::Map(entries));
            }
            let key = match self.peek() {
                Some(b'\'') | Some(b'"') => self.parse_string()?,
                _ => return Err(self.error("a quoted key or '}'")),
            };
            self.expect(b':', "':'")?;
            let value = self.parse_value(depth + 1)?;
            // Later duplicates replace earlier ones, keeping first position.
            match entries.iter_mut().find(|(existing, _)| *existing == key) {
                Some(entry) => entry.1 = value,
                None => entries.push((key, value)),
            }
            self.skip_whitespace();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {}
                _ => return Err(self.error("',' or '}'")),
            }
        }
    }

    fn parse_sequence(&mut self, close: u8, depth: usize) -> Result<LiteralValue, MalformedOutput> {
        // opening bracket
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some(close) {
                self.pos += 1;
                return Ok(LiteralValue::List(items));
            }
            items.push(self.parse_value(depth + 1)?);
            self.skip_whitespace();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b) if b == close => {}
                _ => return Err(self.error("',' or a closing bracket")),
            }
        }
    }

    fn parse_string(&mut self) -> Result<String, MalformedOutput> {
        let quote = self.bytes[self.pos];
        self.pos += 1;
        let mut out = String::new();
        let mut run_start = self.pos;
        loop {
            match self.peek() {
                None => return Err(MalformedOutput::Truncated { expected: "closing quote" }),
                Some(b) if b == quote => {
                    out.push_str(&self.src[run_start..self.pos]);
                    self.pos += 1;
                    return Ok(out);
                }
                Some(b'\\') => {
                    out.push_str(&self.src[run_start..self.pos]);
                    self.pos += 1;
                    self.parse_escape(&mut out)?;
                    run_start = self.pos;
                }
                Some(b'\n') => return Err(self.error("closing quote before end of line")),
                Some(_) => self.pos += 1,
            }
        }
    }

    fn parse_escape(&mut self, out: &mut String) -> Result<(), MalformedOutput> {
        let Some(b) = self.peek() else {
            return Err(MalformedOutput::Truncated { expected: "escape sequence" });
        };
        self.pos += 1;
        match b {
            b'\\' => out.push('\\'),
            b'\'' => out.push('\''),
            b'"' => out.push('"'),
            b'n' => out.push('\n'),
            b't' => out.push('\t'),
            b'r' => out.push('\r'),
            b'0' => out.push('\0'),
            b'u' => {
                let end = self.pos + 4;
                let hex = self
                    .src
                    .get(self.pos..end)
                    .ok_or(MalformedOutput::Truncated { expected: "four hex digits" })?;
                let ch = u32::from_str_radix(hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or(MalformedOutput::Syntax {
                        offset: self.pos,
                        expected: "four hex digits",
                    })?;
                out.push(ch);
                self.pos = end;
            }
            _ => {
                // Unknown escapes are kept literally, backslash included.
                self.pos -= 1;
                let ch = self.src[self.pos..]
                    .chars()
                    .next()
                    .ok_or(MalformedOutput::Truncated { expected: "escape sequence" })?;
                out.push('\\');
                out.push(ch);
                self.pos += ch.len_utf8();
            }
        }
        Ok(())
    }

    fn parse_number(&mut self) -> Result<LiteralValue, MalformedOutput> {
        let start = self.pos;
        if matches!(self.peek(), Some(b'-') | Some(b'+')) {
            self.pos += 1;
        }
        let mut is_float = false;
        while let Some(b) = self.peek() {
            match b {
                b'0'..=b'9' | b'_' => self.pos += 1,
                b'.' | b'e' | b'E' => {
                    is_float = true;
                    self.pos += 1;
                    if matches!(b, b'e' | b'E') && matches!(self.peek(), Some(b'-') | Some(b'+')) {
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
        let text: String = self.src[start..self.pos]
            .chars()
            .filter(|c| *c != '_')
            .collect();
        let invalid = MalformedOutput::Syntax {
            offset: start,
            expected: "a number",
        };
        if is_float {
            text.parse::<f64>()
                .map(LiteralValue::Float)
                .map_err(|_| invalid)
        } else {
            text.parse::<i64>().map(LiteralValue::Int).map_err(|_| invalid)
        }
    }

    fn parse_keyword(&mut self) -> Result<LiteralValue, MalformedOutput> {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if b.is_ascii_alphanumeric() || b == b'_') {
            self.pos += 1;
        }
        match &self.src[start..self.pos] {
            "None" | "null" => Ok(LiteralValue::None),
            "True" | "true" => Ok(LiteralValue::Bool(true)),
            "False" | "false" => Ok(LiteralValue::Bool(false)),
            _ => Err(MalformedOutput::Syntax {
                offset: start,
                expected: "None, True, False or a quoted string",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<LiteralValue, MalformedOutput> {
        parse_mapping(input).map(|(value, _)| value)
    }

    #[test]
    fn test_parses_python_style_mapping() {
        let value = parse("{'year': [2024, 2024], 'file type': ['pdf'], 'x': None}").unwrap();
        assert_eq!(
            value,
            LiteralValue::Map(vec![
                (
                    "year".to_string(),
                    LiteralValue::List(vec![LiteralValue::Int(2024), LiteralValue::Int(2024)])
                ),
                (
                    "file type".to_string(),
                    LiteralValue::List(vec![LiteralValue::Str("pdf".to_string())])
                ),
                ("x".to_string(), LiteralValue::None),
            ])
        );
    }

    #[test]
    fn test_reports_end_of_mapping_and_ignores_suffix() {
        let input = "{'a': [1, -1]} and then the model kept talking {";
        let (_, end) = parse_mapping(input).unwrap();
        assert_eq!(&input[..end], "{'a': [1, -1]}");
    }

    #[test]
    fn test_escapes_and_double_quotes() {
        let value = parse(r#"{"k": ['Children\'s Basics', "say \"hi\"", 'tab\there', 'é']}"#)
            .unwrap();
        let LiteralValue::Map(entries) = value else {
            panic!("expected mapping");
        };
        assert_eq!(
            entries[0].1,
            LiteralValue::List(vec![
                LiteralValue::Str("Children's Basics".to_string()),
                LiteralValue::Str("say \"hi\"".to_string()),
                LiteralValue::Str("tab\there".to_string()),
                LiteralValue::Str("é".to_string()),
            ])
        );
    }

    #[test]
    fn test_numbers_keywords_tuples_and_trailing_commas() {
        let value = parse("{'a': (1, 2.5, -3, +4,), 'b': True, 'c': false,}").unwrap();
        assert_eq!(
            value,
            LiteralValue::Map(vec![
                (
                    "a".to_string(),
                    LiteralValue::List(vec![
                        LiteralValue::Int(1),
                        LiteralValue::Float(2.5),
                        LiteralValue::Int(-3),
                        LiteralValue::Int(4),
                    ])
                ),
                ("b".to_string(), LiteralValue::Bool(true)),
                ("c".to_string(), LiteralValue::Bool(false)),
            ])
        );
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let value = parse("{'a': 1, 'b': 2, 'a': 3}").unwrap();
        assert_eq!(
            value,
            LiteralValue::Map(vec![
                ("a".to_string(), LiteralValue::Int(3)),
                ("b".to_string(), LiteralValue::Int(2)),
            ])
        );
    }

    #[test]
    fn test_truncated_input_is_reported() {
        for input in [
            "{'year': [2024, 20",
            "{'year': [2024, 2024], 'file content': ['Proj",
            "{'year'",
            "{",
        ] {
            assert!(
                matches!(parse(input), Err(MalformedOutput::Truncated { .. })),
                "{input:?} should be truncated"
            );
        }
    }

    #[test]
    fn test_rejects_non_literal_input() {
        assert_eq!(parse("   "), Err(MalformedOutput::EmptyAnswer));
        assert!(matches!(parse("year: 2024"), Err(MalformedOutput::Syntax { offset: 0, .. })));
        assert!(matches!(
            parse("{'a': __import__('os')}"),
            Err(MalformedOutput::Syntax { .. })
        ));
        assert!(matches!(parse("{year: 1}"), Err(MalformedOutput::Syntax { .. })));
        assert!(matches!(parse("{'a': 1 'b': 2}"), Err(MalformedOutput::Syntax { .. })));
    }

    #[test]
    fn test_depth_limit() {
        let deep = format!("{{'a': {}1{}}}", "[".repeat(MAX_DEPTH + 2), "]".repeat(MAX_DEPTH + 2));
        assert_eq!(parse(&deep), Err(MalformedOutput::TooDeep(MAX_DEPTH)));
    }
}
