//! RESP2 request encoder and reply parser.
//!
//! Requests are always arrays of bulk strings. Replies may be any RESP2
//! type:
//! - Simple Strings (+)
//! - Errors (-)
//! - Integers (:)
//! - Bulk Strings ($)
//! - Arrays (*)
//! - Null (represented as $-1 or *-1)

use bytes::Bytes;

/// Maximum nesting depth for arrays.
pub const MAX_NESTING_DEPTH: usize = 32;

/// Maximum bulk string size (512MB).
pub const MAX_BULK_SIZE: usize = 512 * 1024 * 1024;

/// Maximum array elements.
pub const MAX_ELEMENTS: usize = 1_000_000;

/// A decoded RESP2 value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RespValue {
    SimpleString(String),
    Error { kind: String, message: String },
    Integer(i64),
    BulkString(Bytes),
    Array(Vec<RespValue>),
    Null,
}

/// Parse result.
#[derive(Debug)]
pub enum ParseResult {
    /// Successfully parsed a value.
    Ok(RespValue),
    /// Need more data.
    Incomplete,
    /// Parse error.
    Error(String),
}

/// RESP2 reply parser.
#[derive(Debug, Default)]
pub struct RespParser {
    depth: usize,
}

impl RespParser {
    /// Create a new parser.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one value from the front of `data`.
    ///
    /// Returns the result and the number of bytes consumed (zero unless a
    /// value was parsed).
    pub fn parse(&mut self, data: &[u8]) -> (ParseResult, usize) {
        self.depth = 0;
        self.parse_value(data)
    }

    fn parse_value(&mut self, data: &[u8]) -> (ParseResult, usize) {
        if data.is_empty() {
            return (ParseResult::Incomplete, 0);
        }

        if self.depth > MAX_NESTING_DEPTH {
            return (
                ParseResult::Error("maximum nesting depth exceeded".to_string()),
                0,
            );
        }

        match data[0] {
            b'+' => self.parse_simple_string(&data[1..]),
            b'-' => self.parse_error(&data[1..]),
            b':' => self.parse_integer(&data[1..]),
            b'$' => self.parse_bulk_string(&data[1..]),
            b'*' => self.parse_array(&data[1..]),
            other => (
                ParseResult::Error(format!("unexpected type byte 0x{:02x}", other)),
                0,
            ),
        }
    }

    /// Parse a simple string (+OK\r\n).
    fn parse_simple_string(&self, data: &[u8]) -> (ParseResult, usize) {
        match find_crlf(data) {
            Some(pos) => {
                let s = String::from_utf8_lossy(&data[..pos]).to_string();
                (ParseResult::Ok(RespValue::SimpleString(s)), pos + 3) // +1 for prefix, +2 for CRLF
            }
            None => (ParseResult::Incomplete, 0),
        }
    }

    /// Parse an error (-ERR message\r\n).
    fn parse_error(&self, data: &[u8]) -> (ParseResult, usize) {
        match find_crlf(data) {
            Some(pos) => {
                let s = String::from_utf8_lossy(&data[..pos]);
                let (kind, message) = match s.split_once(' ') {
                    Some((kind, message)) => (kind.to_string(), message.to_string()),
                    None => (s.to_string(), String::new()),
                };
                (ParseResult::Ok(RespValue::Error { kind, message }), pos + 3)
            }
            None => (ParseResult::Incomplete, 0),
        }
    }

    /// Parse an integer (:1000\r\n).
    fn parse_integer(&self, data: &[u8]) -> (ParseResult, usize) {
        match find_crlf(data) {
            Some(pos) => match parse_decimal(&data[..pos]) {
                Some(n) => (ParseResult::Ok(RespValue::Integer(n)), pos + 3),
                None => (ParseResult::Error("invalid integer".to_string()), 0),
            },
            None => (ParseResult::Incomplete, 0),
        }
    }

    /// Parse a bulk string ($6\r\nfoobar\r\n).
    fn parse_bulk_string(&self, data: &[u8]) -> (ParseResult, usize) {
        let Some(len_pos) = find_crlf(data) else {
            return (ParseResult::Incomplete, 0);
        };

        let len = match parse_decimal(&data[..len_pos]) {
            Some(-1) => return (ParseResult::Ok(RespValue::Null), len_pos + 3),
            Some(len) if len >= 0 => len as usize,
            _ => {
                return (
                    ParseResult::Error("invalid bulk string length".to_string()),
                    0,
                )
            }
        };
        if len > MAX_BULK_SIZE {
            return (
                ParseResult::Error(format!("bulk string too large: {} > {}", len, MAX_BULK_SIZE)),
                0,
            );
        }

        let data_start = len_pos + 2;
        let data_end = data_start + len;
        if data.len() < data_end + 2 {
            return (ParseResult::Incomplete, 0);
        }
        if &data[data_end..data_end + 2] != b"\r\n" {
            return (
                ParseResult::Error("missing CRLF after bulk string".to_string()),
                0,
            );
        }

        let bytes = Bytes::copy_from_slice(&data[data_start..data_end]);
        (ParseResult::Ok(RespValue::BulkString(bytes)), data_end + 3)
    }

    /// Parse an array (*2\r\n...).
    fn parse_array(&mut self, data: &[u8]) -> (ParseResult, usize) {
        let Some(len_pos) = find_crlf(data) else {
            return (ParseResult::Incomplete, 0);
        };

        let len = match parse_decimal(&data[..len_pos]) {
            Some(-1) => return (ParseResult::Ok(RespValue::Null), len_pos + 3),
            Some(len) if len >= 0 => len as usize,
            _ => return (ParseResult::Error("invalid array length".to_string()), 0),
        };
        if len > MAX_ELEMENTS {
            return (
                ParseResult::Error(format!("array too large: {} > {}", len, MAX_ELEMENTS)),
                0,
            );
        }

        self.depth += 1;
        let mut elements = Vec::with_capacity(len.min(1024));
        let mut offset = len_pos + 2;

        for _ in 0..len {
            let (result, consumed) = self.parse_value(&data[offset..]);
            match result {
                ParseResult::Ok(value) => {
                    elements.push(value);
                    offset += consumed;
                }
                other => {
                    self.depth -= 1;
                    return (other, 0);
                }
            }
        }

        self.depth -= 1;
        (ParseResult::Ok(RespValue::Array(elements)), offset + 1) // +1 for prefix
    }
}

/// Encode a command as a RESP2 array of bulk strings.
pub fn encode_command(args: &[&[u8]]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(16 + args.iter().map(|a| a.len() + 16).sum::<usize>());
    buf.push(b'*');
    buf.extend_from_slice(args.len().to_string().as_bytes());
    buf.extend_from_slice(b"\r\n");
    for arg in args {
        buf.push(b'$');
        buf.extend_from_slice(arg.len().to_string().as_bytes());
        buf.extend_from_slice(b"\r\n");
        buf.extend_from_slice(arg);
        buf.extend_from_slice(b"\r\n");
    }
    buf
}

/// Find CRLF in data, returning position of first \r.
fn find_crlf(data: &[u8]) -> Option<usize> {
    data.windows(2).position(|w| w == b"\r\n")
}

fn parse_decimal(data: &[u8]) -> Option<i64> {
    std::str::from_utf8(data).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_string() {
        let mut parser = RespParser::new();
        let (result, consumed) = parser.parse(b"+OK\r\n");
        assert!(matches!(result, ParseResult::Ok(RespValue::SimpleString(s)) if s == "OK"));
        assert_eq!(consumed, 5);
    }

    #[test]
    fn test_parse_error() {
        let mut parser = RespParser::new();
        let (result, _) = parser.parse(b"-WRONGTYPE Operation against a key\r\n");
        assert!(
            matches!(result, ParseResult::Ok(RespValue::Error { kind, message }) if kind == "WRONGTYPE" && message == "Operation against a key")
        );
    }

    #[test]
    fn test_parse_bulk_and_null() {
        let mut parser = RespParser::new();
        let (result, consumed) = parser.parse(b"$6\r\nfoobar\r\nextra");
        assert!(
            matches!(result, ParseResult::Ok(RespValue::BulkString(ref b)) if &b[..] == b"foobar")
        );
        assert_eq!(consumed, 12);

        let (result, consumed) = parser.parse(b"$-1\r\n");
        assert!(matches!(result, ParseResult::Ok(RespValue::Null)));
        assert_eq!(consumed, 5);
    }

    #[test]
    fn test_parse_incomplete() {
        let mut parser = RespParser::new();
        assert!(matches!(parser.parse(b"$6\r\nfoo").0, ParseResult::Incomplete));
        assert!(matches!(parser.parse(b"*2\r\n:1\r\n").0, ParseResult::Incomplete));
        assert!(matches!(parser.parse(b"").0, ParseResult::Incomplete));
    }

    #[test]
    fn test_parse_array() {
        let mut parser = RespParser::new();
        let input = b"*2\r\n:1\r\n$1\r\na\r\n";
        let (result, consumed) = parser.parse(input);
        match result {
            ParseResult::Ok(RespValue::Array(items)) => {
                assert_eq!(items.len(), 2);
                assert_eq!(items[0], RespValue::Integer(1));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(consumed, input.len());
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        let mut parser = RespParser::new();
        assert!(matches!(parser.parse(b"%1\r\n").0, ParseResult::Error(_)));
    }

    #[test]
    fn test_encode_command() {
        let encoded = encode_command(&[b"SET".as_slice(), b"k", b"hello"]);
        assert_eq!(encoded, b"*3\r\n$3\r\nSET\r\n$1\r\nk\r\n$5\r\nhello\r\n".to_vec());
    }
}
