//! Read dispatcher
//!
//! A read call evaluates its requests left to right and stops at the first
//! one that produces no value. That request's slot holds `None`; earlier
//! results are kept. A hard I/O error anywhere turns the whole call into a
//! [`Failure`] and discards the results.

use crate::error::{IoError, Result};
use crate::handle::FileHandle;
use crate::handle::stream::NativeStream;
use crate::outcome::{Failure, Outcome};
use crate::value::Value;

/// One read request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadRequest {
    /// Up to this many bytes; `0` only probes for end-of-stream
    Count(usize),
    /// A numeric literal
    Number,
    /// One line without its terminator
    Line,
    /// Everything up to end-of-stream
    All,
}

impl ReadRequest {
    /// Parse a format tag given in argument `position`
    ///
    /// Accepts `number`/`line`/`all`, their initials, and the star forms
    /// (`*n`, `*l`, `*a`) where only the letter after the star counts.
    pub fn parse_format(tag: &str, position: usize) -> Result<Self> {
        match tag {
            "n" | "number" => return Ok(ReadRequest::Number),
            "l" | "line" => return Ok(ReadRequest::Line),
            "a" | "all" => return Ok(ReadRequest::All),
            _ => {}
        }
        match tag.strip_prefix('*').map(str::as_bytes) {
            Some([b'n', ..]) => Ok(ReadRequest::Number),
            Some([b'l', ..]) => Ok(ReadRequest::Line),
            Some([b'a', ..]) => Ok(ReadRequest::All),
            _ => Err(IoError::bad_argument(position, "invalid format")),
        }
    }
}

/// Results of one read call; only the last entry can be `None`
pub type ReadResults = Vec<Option<Value>>;

impl FileHandle {
    /// Evaluate `requests` against this handle
    ///
    /// No requests means a single `Line` request.
    pub fn read(&self, requests: &[ReadRequest]) -> Result<Outcome<ReadResults>> {
        self.with_stream(|stream| read_requests(stream, requests))
    }
}

pub(crate) fn read_requests(
    stream: &mut NativeStream,
    requests: &[ReadRequest],
) -> Outcome<ReadResults> {
    const IMPLICIT: [ReadRequest; 1] = [ReadRequest::Line];
    let requests = if requests.is_empty() {
        &IMPLICIT[..]
    } else {
        requests
    };

    stream.clear_error();
    let mut results = Vec::with_capacity(requests.len());
    for request in requests {
        let value = read_one(stream, *request);
        let exhausted = value.is_none();
        results.push(value);
        if exhausted {
            break;
        }
    }

    match stream.take_error() {
        Some(err) => Err(Failure::from_io(&err, None)),
        None => Ok(results),
    }
}

fn read_one(stream: &mut NativeStream, request: ReadRequest) -> Option<Value> {
    match request {
        ReadRequest::Count(0) => stream.peek_byte().map(|_| Value::Bytes(Vec::new())),
        ReadRequest::Count(n) => {
            let mut bytes = Vec::new();
            stream.read_up_to(n, &mut bytes);
            (!bytes.is_empty()).then_some(Value::Bytes(bytes))
        }
        ReadRequest::Number => scan_number(stream).map(Value::Number),
        ReadRequest::Line => read_line(stream).map(Value::Bytes),
        ReadRequest::All => {
            let mut bytes = Vec::new();
            stream.read_to_end(&mut bytes);
            Some(Value::Bytes(bytes))
        }
    }
}

/// Next line without its terminator; `None` at immediate end-of-stream
pub(crate) fn read_line(stream: &mut NativeStream) -> Option<Vec<u8>> {
    let mut line = Vec::new();
    let terminated = stream.read_line(&mut line);
    (terminated || !line.is_empty()).then_some(line)
}

// ============================================================================
// Number Scanning
// ============================================================================

/// Consume the next byte into `taken` if it satisfies `pred`
fn take_if(stream: &mut NativeStream, taken: &mut Vec<u8>, pred: impl Fn(u8) -> bool) -> bool {
    match stream.peek_byte() {
        Some(b) if pred(b) => {
            taken.push(b);
            stream.bump();
            true
        }
        _ => false,
    }
}

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

/// Scan a numeric literal after optional whitespace
///
/// On failure every consumed byte, whitespace included, is pushed back, so a
/// failed scan leaves the stream where it found it.
fn scan_number(stream: &mut NativeStream) -> Option<f64> {
    let mut taken = Vec::new();
    while let Some(b) = stream.peek_byte().filter(|&b| is_space(b)) {
        taken.push(b);
        stream.bump();
    }
    let start = taken.len();

    take_if(stream, &mut taken, |b| b == b'+' || b == b'-');
    let body = taken.len();

    let parsed = if take_if(stream, &mut taken, |b| b.eq_ignore_ascii_case(&b'i'))
        || take_if(stream, &mut taken, |b| b.eq_ignore_ascii_case(&b'n'))
    {
        // Keep letters while they can still spell "infinity" or "nan".
        loop {
            let word = taken[body..].to_ascii_lowercase();
            let matched = |b: u8| {
                let mut next = word.clone();
                next.push(b.to_ascii_lowercase());
                b"infinity".starts_with(&next) || b"nan".starts_with(&next)
            };
            if !take_if(stream, &mut taken, matched) {
                break;
            }
        }
        parse_decimal(&taken[start..])
    } else if take_if(stream, &mut taken, |b| b == b'0')
        && take_if(stream, &mut taken, |b| b == b'x' || b == b'X')
    {
        while take_if(stream, &mut taken, |b| b.is_ascii_hexdigit()) {}
        if take_if(stream, &mut taken, |b| b == b'.') {
            while take_if(stream, &mut taken, |b| b.is_ascii_hexdigit()) {}
        }
        if take_if(stream, &mut taken, |b| b == b'p' || b == b'P') {
            take_if(stream, &mut taken, |b| b == b'+' || b == b'-');
            while take_if(stream, &mut taken, |b| b.is_ascii_digit()) {}
        }
        parse_hex(&taken[start..])
    } else {
        while take_if(stream, &mut taken, |b| b.is_ascii_digit()) {}
        if take_if(stream, &mut taken, |b| b == b'.') {
            while take_if(stream, &mut taken, |b| b.is_ascii_digit()) {}
        }
        if take_if(stream, &mut taken, |b| b == b'e' || b == b'E') {
            take_if(stream, &mut taken, |b| b == b'+' || b == b'-');
            while take_if(stream, &mut taken, |b| b.is_ascii_digit()) {}
        }
        parse_decimal(&taken[start..])
    };

    if parsed.is_none() {
        stream.unread(&taken);
    }
    parsed
}

fn parse_decimal(token: &[u8]) -> Option<f64> {
    std::str::from_utf8(token).ok()?.parse::<f64>().ok()
}

fn parse_hex(token: &[u8]) -> Option<f64> {
    let (negative, rest) = match token.split_first()? {
        (&b'-', rest) => (true, rest),
        (&b'+', rest) => (false, rest),
        _ => (false, token),
    };
    let rest = rest.get(2..)?;
    let (mantissa, exponent) = match rest.iter().position(|&b| b == b'p' || b == b'P') {
        Some(idx) => (&rest[..idx], Some(&rest[idx + 1..])),
        None => (rest, None),
    };

    let mut value = 0.0f64;
    let mut scale = 0i32;
    let mut digits = 0usize;
    let mut seen_point = false;
    for &b in mantissa {
        if b == b'.' {
            seen_point = true;
            continue;
        }
        let digit = (b as char).to_digit(16)?;
        value = value * 16.0 + f64::from(digit);
        digits += 1;
        if seen_point {
            scale -= 4;
        }
    }
    if digits == 0 {
        return None;
    }

    if let Some(exponent) = exponent {
        let text = std::str::from_utf8(exponent).ok()?;
        scale = scale.checked_add(text.parse::<i32>().ok()?)?;
    }

    let value = value * 2f64.powi(scale);
    Some(if negative { -value } else { value })
}
