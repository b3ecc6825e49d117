//! Scalar-by-scalar JSON decoder
//!
//! Recursive-descent decoder over a Unicode scalar stream. Deliberately a
//! best-effort reader, not a validator: malformed input degrades to
//! [`JsonValue::Invalid`] instead of a structured error, and only `\"` is
//! unescaped inside strings (every other backslash sequence is kept
//! verbatim). Callers check the resulting value shape themselves.
//!
//! All parse functions share one scalar cursor; scanners that detect
//! their terminating scalar (numbers, literals) push it back so the
//! enclosing object/array loop consumes separators and closers itself.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use crate::value::{JsonMap, JsonValue};

/// JSON decoder over a finite sequence of Unicode scalars.
///
/// # Example
/// ```
/// use parsekit::{JsonDecoder, JsonValue};
///
/// let value = JsonDecoder::new("{\"a\": 1}").decode();
/// assert_eq!(value.get("a"), Some(&JsonValue::Number(1.0)));
/// ```
pub struct JsonDecoder {
    scalars: Vec<char>,
}

impl JsonDecoder {
    /// Prepare a decoder for the given input text.
    pub fn new(input: &str) -> Self {
        Self {
            scalars: input.chars().collect(),
        }
    }

    /// Decode the input into a value tree.
    ///
    /// Returns [`JsonValue::Invalid`] when no value can be parsed; never
    /// fails with an error.
    pub fn decode(&self) -> JsonValue {
        let mut cursor = ScalarCursor::new(&self.scalars);
        scan_value(&mut cursor)
    }
}

/// Decode a JSON string in one call.
pub fn decode(input: &str) -> JsonValue {
    JsonDecoder::new(input).decode()
}

/// Read cursor over the scalar buffer, shared by the mutually recursive
/// parse functions. `back` un-consumes the scalar a scanner stopped on.
struct ScalarCursor<'a> {
    scalars: &'a [char],
    pos: usize,
}

impl<'a> ScalarCursor<'a> {
    fn new(scalars: &'a [char]) -> Self {
        Self { scalars, pos: 0 }
    }

    fn next(&mut self) -> Option<char> {
        let c = self.scalars.get(self.pos).copied();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn back(&mut self) {
        if self.pos > 0 {
            self.pos -= 1;
        }
    }
}

fn is_json_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// Skip whitespace and dispatch on the first significant scalar.
///
/// Used for the root value and recursively for every nested value.
fn scan_value(cursor: &mut ScalarCursor) -> JsonValue {
    while let Some(c) = cursor.next() {
        match c {
            c if is_json_whitespace(c) => continue,
            '{' => {
                return match parse_object(cursor) {
                    Some(map) => JsonValue::Object(map),
                    None => JsonValue::Invalid,
                };
            }
            '[' => {
                return match parse_array(cursor) {
                    Some(items) => JsonValue::Array(items),
                    None => JsonValue::Invalid,
                };
            }
            '"' => return JsonValue::String(parse_string(cursor)),
            '+' | '-' | '0'..='9' => {
                cursor.back();
                return match parse_number(cursor) {
                    Some(n) => JsonValue::Number(n),
                    None => JsonValue::Invalid,
                };
            }
            'f' | 'n' | 't' => {
                cursor.back();
                return match parse_literal(cursor) {
                    Some(Literal::True) => JsonValue::Boolean(true),
                    Some(Literal::False) => JsonValue::Boolean(false),
                    Some(Literal::Null) => JsonValue::Null,
                    None => JsonValue::Invalid,
                };
            }
            _ => return JsonValue::Invalid,
        }
    }
    JsonValue::Invalid
}

/// Scan a string body after the opening quote.
///
/// Minimal-escaping policy: a backslash before `"` yields a bare `"`;
/// any other escaped scalar keeps both the backslash and the scalar.
/// An unterminated string yields whatever accumulated.
fn parse_string(cursor: &mut ScalarCursor) -> String {
    let mut out = String::new();
    let mut escaped = false;
    while let Some(c) = cursor.next() {
        if escaped {
            if c != '"' {
                out.push('\\');
            }
            out.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => break,
            _ => out.push(c),
        }
    }
    out
}

/// Scan an object body after the opening brace.
///
/// Returns `None` on a hard failure (unexpected scalar, or a member value
/// that failed to parse); the caller reports the whole object as invalid.
/// Duplicate keys resolve last-write-wins.
fn parse_object(cursor: &mut ScalarCursor) -> Option<JsonMap> {
    let mut map = JsonMap::new();
    let mut pending_key: Option<String> = None;

    while let Some(c) = cursor.next() {
        match c {
            c if is_json_whitespace(c) || c == ',' => continue,
            '"' => pending_key = Some(parse_string(cursor)),
            ':' => match pending_key.take() {
                Some(key) => {
                    let value = scan_value(cursor);
                    if value.is_invalid() {
                        return None;
                    }
                    map.insert(key, value);
                }
                // stray colon without a key ends the object
                None => return Some(map),
            },
            '}' => return Some(map),
            _ => return None,
        }
    }
    Some(map)
}

/// Scan an array body after the opening bracket.
///
/// Any scalar that is not whitespace, `,` or `]` is pushed back and parsed
/// as a nested value. A nested `Invalid` poisons the whole array.
fn parse_array(cursor: &mut ScalarCursor) -> Option<Vec<JsonValue>> {
    let mut items = Vec::new();

    while let Some(c) = cursor.next() {
        match c {
            c if is_json_whitespace(c) || c == ',' => continue,
            ']' => return Some(items),
            _ => {
                cursor.back();
                let value = scan_value(cursor);
                if value.is_invalid() {
                    return None;
                }
                items.push(value);
            }
        }
    }
    Some(items)
}

/// Number scanner.
///
/// Accumulates sign, integer digits, one optional decimal point (digit
/// count tracked for scaling) and one optional exponent with its own sign.
/// The final value is `mantissa * 10^(exponent - decimals) * sign`.
/// A doubled `.`/`e` or a misplaced sign is a hard failure. The scalar
/// that terminates the number is pushed back for the caller.
fn parse_number(cursor: &mut ScalarCursor) -> Option<f64> {
    let mut started = false;
    let mut decimal_started = false;
    let mut exponent_started = false;
    let mut exponent_digits = false;
    let mut exponent_signed = false;

    let mut sign = 1.0f64;
    let mut exponent_sign = 1i32;
    let mut exponent = 0i32;
    let mut decimals = 0i32;
    let mut mantissa = 0.0f64;

    while let Some(c) = cursor.next() {
        match c {
            c if is_json_whitespace(c) => {
                if started {
                    cursor.back();
                    break;
                }
            }
            '+' | '-' => {
                if exponent_started {
                    if exponent_digits || exponent_signed {
                        return None;
                    }
                    exponent_signed = true;
                    if c == '-' {
                        exponent_sign = -1;
                    }
                } else if started {
                    return None;
                } else {
                    started = true;
                    if c == '-' {
                        sign = -1.0;
                    }
                }
            }
            '0'..='9' => {
                let digit = c as u32 - '0' as u32;
                if exponent_started {
                    exponent_digits = true;
                    // saturate: an absurdly long exponent must not wrap,
                    // it just pins the value to infinity/zero
                    exponent = exponent.saturating_mul(10).saturating_add(digit as i32);
                } else {
                    started = true;
                    if decimal_started {
                        decimals += 1;
                    }
                    mantissa = mantissa * 10.0 + f64::from(digit);
                }
            }
            '.' => {
                if decimal_started || exponent_started {
                    return None;
                }
                decimal_started = true;
            }
            'e' | 'E' => {
                if exponent_started {
                    return None;
                }
                exponent_started = true;
            }
            _ => {
                if started {
                    cursor.back();
                    break;
                }
                return None;
            }
        }
    }

    if !started {
        return None;
    }
    let scale = exponent_sign
        .saturating_mul(exponent)
        .saturating_sub(decimals);
    Some(mantissa * pow10(scale) * sign)
}

/// Powers of ten by repeated multiplication. `f64` is infinite past
/// 10^309 and zero below 10^-324, so the loop is clamped there instead
/// of spinning through a huge exponent.
fn pow10(e: i32) -> f64 {
    if e > 400 {
        return f64::INFINITY;
    }
    if e < -400 {
        return 0.0;
    }
    let mut value = 1.0f64;
    if e >= 0 {
        for _ in 0..e {
            value *= 10.0;
        }
    } else {
        for _ in 0..-e {
            value /= 10.0;
        }
    }
    value
}

enum Literal {
    True,
    False,
    Null,
}

/// Literal matcher state: which keyword is being matched, and how far in.
enum LiteralState {
    Unknown,
    MatchingTrue(usize),
    MatchingFalse(usize),
    MatchingNull(usize),
}

const TRUE: [char; 4] = ['t', 'r', 'u', 'e'];
const FALSE: [char; 5] = ['f', 'a', 'l', 's', 'e'];
const NULL: [char; 4] = ['n', 'u', 'l', 'l'];

/// Match `true`, `false` or `null` scalar-by-scalar.
///
/// A mismatched scalar aborts with no backtracking. The scalar after the
/// last keyword character is not consumed.
fn parse_literal(cursor: &mut ScalarCursor) -> Option<Literal> {
    let mut state = LiteralState::Unknown;
    while let Some(c) = cursor.next() {
        state = match state {
            LiteralState::Unknown => match c {
                't' => LiteralState::MatchingTrue(1),
                'f' => LiteralState::MatchingFalse(1),
                'n' => LiteralState::MatchingNull(1),
                _ => return None,
            },
            LiteralState::MatchingTrue(index) => {
                if TRUE[index] != c {
                    return None;
                }
                if index == TRUE.len() - 1 {
                    return Some(Literal::True);
                }
                LiteralState::MatchingTrue(index + 1)
            }
            LiteralState::MatchingFalse(index) => {
                if FALSE[index] != c {
                    return None;
                }
                if index == FALSE.len() - 1 {
                    return Some(Literal::False);
                }
                LiteralState::MatchingFalse(index + 1)
            }
            LiteralState::MatchingNull(index) => {
                if NULL[index] != c {
                    return None;
                }
                if index == NULL.len() - 1 {
                    return Some(Literal::Null);
                }
                LiteralState::MatchingNull(index + 1)
            }
        };
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;

    fn num(input: &str) -> f64 {
        match decode(input) {
            JsonValue::Number(n) => n,
            other => panic!("expected number for {:?}, got {:?}", input, other),
        }
    }

    #[test]
    fn test_number_parsing() {
        assert_eq!(num("123"), 123.0);
        assert_eq!(num("-45.6"), -45.6);
        assert_eq!(num("1.5e3"), 1500.0);
        assert_eq!(num("2E-2"), 0.02);
        assert_eq!(num("+7"), 7.0);
        assert_eq!(num("0"), 0.0);
        assert_eq!(num("1e2"), 100.0);
    }

    #[test]
    fn test_extreme_exponents_saturate() {
        // longer than any i32 can hold; must pin, not wrap or panic
        assert_eq!(num("1e999999999999"), f64::INFINITY);
        assert_eq!(num("-2e999999999999"), f64::NEG_INFINITY);
        assert_eq!(num("1e-999999999999"), 0.0);
        // large but in-range exponents overflow the f64 naturally
        assert_eq!(num("1e309"), f64::INFINITY);
        assert_eq!(num("1e-325"), 0.0);
    }

    #[test]
    fn test_number_hard_failures() {
        assert_eq!(decode("1.2.3"), JsonValue::Invalid);
        assert_eq!(decode("1e2e3"), JsonValue::Invalid);
        assert_eq!(decode("12-4"), JsonValue::Invalid);
        assert_eq!(decode("1e--2"), JsonValue::Invalid);
    }

    #[test]
    fn test_literals() {
        assert_eq!(decode("true"), JsonValue::Boolean(true));
        assert_eq!(decode("false"), JsonValue::Boolean(false));
        assert_eq!(decode("null"), JsonValue::Null);
    }

    #[test]
    fn test_mismatched_literal_is_invalid() {
        assert_eq!(decode("tru"), JsonValue::Invalid);
        assert_eq!(decode("nope"), JsonValue::Invalid);
        assert_eq!(decode("fals"), JsonValue::Invalid);
    }

    #[test]
    fn test_string_minimal_escaping() {
        assert_eq!(decode("\"a\\\"b\""), JsonValue::String("a\"b".to_string()));
        // non-quote escapes are preserved verbatim, backslash included
        assert_eq!(decode("\"a\\nb\""), JsonValue::String("a\\nb".to_string()));
        assert_eq!(
            decode("\"a\\u0041b\""),
            JsonValue::String("a\\u0041b".to_string())
        );
    }

    #[test]
    fn test_whitespace_idempotence() {
        assert_eq!(decode(" { \"a\" : 1 } "), decode("{\"a\":1}"));
        assert_eq!(decode("\t[ 1 ,\n 2 ]\r"), decode("[1,2]"));
    }

    #[test]
    fn test_object_duplicate_keys_last_write_wins() {
        let v = decode("{\"a\":1,\"a\":2}");
        assert_eq!(v.get("a"), Some(&JsonValue::Number(2.0)));
    }

    #[test]
    fn test_array_of_numbers_keeps_separators_in_sync() {
        // the number scanner pushes its terminator back, so the array loop
        // still sees every comma and the closing bracket
        assert_eq!(
            decode("[1,2,3]"),
            JsonValue::Array(vec![
                JsonValue::Number(1.0),
                JsonValue::Number(2.0),
                JsonValue::Number(3.0),
            ])
        );
    }

    #[test]
    fn test_object_with_trailing_number_value() {
        // the closing brace after a number value must still end the object
        let v = decode("[{\"a\":1},2]");
        assert_eq!(
            v,
            JsonValue::Array(vec![
                decode("{\"a\":1}"),
                JsonValue::Number(2.0),
            ])
        );
    }

    #[test]
    fn test_nested_structures() {
        let v = decode("{\"a\":[1,{\"b\":true},null],\"c\":\"x\"}");
        let a = v.get("a").and_then(JsonValue::as_array).unwrap();
        assert_eq!(a.len(), 3);
        assert_eq!(a[0], JsonValue::Number(1.0));
        assert_eq!(a[1].get("b"), Some(&JsonValue::Boolean(true)));
        assert_eq!(a[2], JsonValue::Null);
        assert_eq!(v.get("c"), Some(&JsonValue::String("x".to_string())));
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(decode(""), JsonValue::Invalid);
        assert_eq!(decode("   "), JsonValue::Invalid);
        assert_eq!(decode("@"), JsonValue::Invalid);
        assert_eq!(decode("{a:1}"), JsonValue::Invalid);
    }

    #[test]
    fn test_nested_invalid_poisons_parent() {
        // Invalid never rides inside a successfully returned tree
        assert_eq!(decode("[1,@]"), JsonValue::Invalid);
        assert_eq!(decode("{\"a\":@}"), JsonValue::Invalid);
        assert_eq!(decode("[[@]]"), JsonValue::Invalid);
    }

    #[test]
    fn test_unterminated_string_returns_accumulated() {
        assert_eq!(decode("\"abc"), JsonValue::String("abc".to_string()));
    }

    #[test]
    fn test_empty_containers() {
        assert_eq!(decode("[]"), JsonValue::Array(vec![]));
        assert_eq!(decode("{}"), JsonValue::Object(JsonMap::new()));
    }
}
