use std::fmt;

use thiserror::Error;

/// An absolute URI (`scheme:rest`), validated for syntax only.
///
/// The canonical form is the trimmed input text; non-ASCII characters are
/// kept as-is rather than percent-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Uri {
    text: String,
    scheme_len: usize,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid URI '{input}': {reason}")]
pub struct UriSyntaxError {
    pub input: String,
    pub reason: String,
}

impl UriSyntaxError {
    fn new(input: &str, reason: impl Into<String>) -> Self {
        Self {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

impl Uri {
    pub fn parse(raw: &str) -> Result<Self, UriSyntaxError> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(UriSyntaxError::new(raw, "empty input"));
        }

        // RFC 3986 has no room for whitespace or control characters anywhere.
        if let Some((index, ch)) = text
            .char_indices()
            .find(|(_, ch)| ch.is_whitespace() || ch.is_control())
        {
            return Err(UriSyntaxError::new(
                raw,
                format!("illegal character {:?} at index {}", ch, index),
            ));
        }

        check_rfc3986(text).map_err(|reason| UriSyntaxError::new(raw, reason))?;

        let parsed = url::Url::parse(text).map_err(|err| UriSyntaxError::new(raw, err.to_string()))?;

        Ok(Self {
            text: text.to_string(),
            scheme_len: parsed.scheme().len(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Scheme as written in the input (not case-folded).
    pub fn scheme(&self) -> &str {
        &self.text[..self.scheme_len]
    }
}

// `url` follows the lenient WHATWG rules; this enforces the RFC 3986
// character set (non-ASCII letters aside), well-formed escapes, a single
// fragment and a non-empty part after the scheme.
fn check_rfc3986(text: &str) -> Result<(), String> {
    let bytes = text.as_bytes();
    let mut in_fragment = false;

    for (index, ch) in text.char_indices() {
        match ch {
            '%' => {
                let hex_pair = match bytes.get(index + 1..index + 3) {
                    Some([hi, lo]) => hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit(),
                    _ => false,
                };
                if !hex_pair {
                    return Err(format!("malformed escape at index {}", index));
                }
            }
            '#' if in_fragment => {
                return Err(format!("second fragment delimiter at index {}", index));
            }
            '#' => in_fragment = true,
            _ if !ch.is_ascii() || is_unreserved(ch) || is_reserved(ch) => {}
            _ => {
                return Err(format!("illegal character {:?} at index {}", ch, index));
            }
        }
    }

    let rest = text.split_once(':').map(|(_, rest)| rest).unwrap_or_default();
    if rest.is_empty() || rest.starts_with('#') {
        return Err("expected scheme-specific part after ':'".to_string());
    }
    Ok(())
}

fn is_unreserved(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '-' | '.' | '_' | '~')
}

fn is_reserved(ch: char) -> bool {
    matches!(
        ch,
        ':' | '/' | '?' | '#' | '[' | ']' | '@' | '!' | '$' | '&' | '\'' | '(' | ')' | '*' | '+'
            | ',' | ';' | '='
    )
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl std::str::FromStr for Uri {
    type Err = UriSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uri::parse(s)
    }
}
