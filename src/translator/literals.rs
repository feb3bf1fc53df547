//! Shared literal normalization.
//!
//! Both expression engines (the AST lowerer and the macro parser) go through
//! these helpers so numeric spelling and escape re-encoding stay consistent.

/// Integer literal suffix, order-insensitive (`ul` == `lu`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntSuffix {
    U,
    L,
    UL,
    LL,
    ULL,
}

impl IntSuffix {
    /// The Zig type an explicitly suffixed literal is pinned to.
    pub fn type_name(self) -> &'static str {
        match self {
            IntSuffix::U => "c_uint",
            IntSuffix::L => "c_long",
            IntSuffix::UL => "c_ulong",
            IntSuffix::LL => "c_longlong",
            IntSuffix::ULL => "c_ulonglong",
        }
    }
}

/// Strip a C integer suffix (`u`, `l`, `ll`, `ul`, `llu`, ... any case).
pub fn strip_int_suffix(text: &str) -> (&str, Option<IntSuffix>) {
    let bytes = text.as_bytes();
    let len = bytes.len();

    if len >= 3 {
        let last3 = (
            bytes[len - 3].to_ascii_lowercase(),
            bytes[len - 2].to_ascii_lowercase(),
            bytes[len - 1].to_ascii_lowercase(),
        );
        if matches!(last3, (b'u', b'l', b'l') | (b'l', b'l', b'u')) {
            return (&text[..len - 3], Some(IntSuffix::ULL));
        }
    }
    if len >= 2 {
        let last2 = (
            bytes[len - 2].to_ascii_lowercase(),
            bytes[len - 1].to_ascii_lowercase(),
        );
        if matches!(last2, (b'u', b'l') | (b'l', b'u')) {
            return (&text[..len - 2], Some(IntSuffix::UL));
        }
        if last2 == (b'l', b'l') {
            return (&text[..len - 2], Some(IntSuffix::LL));
        }
    }
    if len >= 1 {
        match bytes[len - 1].to_ascii_lowercase() {
            b'u' => return (&text[..len - 1], Some(IntSuffix::U)),
            b'l' => return (&text[..len - 1], Some(IntSuffix::L)),
            _ => {}
        }
    }
    (text, None)
}

/// Re-spell a C integer literal (suffix already stripped) in Zig syntax:
/// `0x`/`0X` hex stays hex with a lowercase prefix, leading-zero octal
/// becomes `0o`, decimal is unchanged.
pub fn normalize_int_text(text: &str) -> String {
    if let Some(digits) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return format!("0x{}", digits);
    }
    if text.len() > 1 && text.starts_with('0') && text.bytes().all(|b| b.is_ascii_digit()) {
        return format!("0o{}", &text[1..]);
    }
    text.to_string()
}

/// Parse the numeric value of a C integer literal (suffix already stripped).
pub fn parse_int_value(text: &str) -> Option<u64> {
    if text == "0" {
        return Some(0);
    }
    let (digits, radix) = if let Some(d) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X"))
    {
        (d, 16)
    } else if let Some(d) = text.strip_prefix('0') {
        (d, 8)
    } else {
        (text, 10)
    };
    if digits.is_empty() {
        return None;
    }
    let mut value: u64 = 0;
    for c in digits.chars() {
        let digit = c.to_digit(radix)? as u64;
        value = value.checked_mul(radix as u64)?.checked_add(digit)?;
    }
    Some(value)
}

/// Float literal suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatSuffix {
    F,
    L,
}

impl FloatSuffix {
    pub fn type_name(self) -> &'static str {
        match self {
            FloatSuffix::F => "f32",
            FloatSuffix::L => "c_longdouble",
        }
    }
}

pub fn strip_float_suffix(text: &str) -> (&str, Option<FloatSuffix>) {
    match text.as_bytes().last() {
        Some(b'f') | Some(b'F') => (&text[..text.len() - 1], Some(FloatSuffix::F)),
        Some(b'l') | Some(b'L') => (&text[..text.len() - 1], Some(FloatSuffix::L)),
        _ => (text, None),
    }
}

/// Zig float literals require a digit on both sides of the dot.
pub fn normalize_float_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    if text.starts_with('.') {
        out.push('0');
    }
    out.push_str(text);
    if out.ends_with('.') {
        out.push('0');
    }
    out
}

/// Decode the escapes of a C string or char literal body into raw bytes.
///
/// Octal and hex escapes map to single bytes; `\a \b \f \v` become their
/// byte values, matching how they are later re-encoded as `\xNN` on the Zig
/// side.
pub fn unescape_c_bytes(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        match chars.next() {
            Some('n') => out.push(b'\n'),
            Some('t') => out.push(b'\t'),
            Some('r') => out.push(b'\r'),
            Some('a') => out.push(0x07),
            Some('b') => out.push(0x08),
            Some('f') => out.push(0x0c),
            Some('v') => out.push(0x0b),
            Some(d @ '0'..='7') => {
                // Up to three octal digits, the first already consumed.
                let mut val = d.to_digit(8).unwrap();
                for _ in 0..2 {
                    match chars.peek().and_then(|ch| ch.to_digit(8)) {
                        Some(digit) => {
                            val = val * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push((val & 0xff) as u8);
            }
            Some('x') => {
                let mut val: u32 = 0;
                let mut any = false;
                while let Some(&ch) = chars.peek() {
                    if let Some(d) = ch.to_digit(16) {
                        val = val.saturating_mul(16).saturating_add(d);
                        any = true;
                        chars.next();
                    } else {
                        break;
                    }
                }
                if any {
                    out.push((val & 0xff) as u8);
                } else {
                    out.extend_from_slice(b"\\x");
                }
            }
            Some('\\') => out.push(b'\\'),
            Some('\'') => out.push(b'\''),
            Some('"') => out.push(b'"'),
            Some('?') => out.push(b'?'),
            Some(other) => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
            }
            None => out.push(b'\\'),
        }
    }
    out
}

/// First code point of a C character literal body.
pub fn parse_char_value(s: &str) -> Option<u32> {
    let bytes = unescape_c_bytes(s);
    bytes.first().map(|&b| b as u32)
}
