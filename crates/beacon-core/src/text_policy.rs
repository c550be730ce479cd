//! Message text shaping: capacity limits, receive-path vocabulary and badges.

use core::str;

pub const MESSAGE_BYTES: usize = 64;
pub const PLACEHOLDER: &str = "?";

/// Bounded message buffer shared by the sync state and the renderer.
pub type MessageText = heapless::String<MESSAGE_BYTES>;

/// Emoji codes the bitmap font cannot draw, mapped to words.
pub const EMOJI_WORDS: Vocabulary = Vocabulary::new(&[
    ("👍", "good"),
    ("❤️", "love"),
    ("❤", "love"),
    ("✨", "nice"),
    ("❗", "alert"),
    ("☆", "star"),
]);

/// Copies `source` into a message buffer, cutting at a char boundary.
///
/// Empty input becomes [`PLACEHOLDER`] so the marquee always has a glyph.
pub fn message_from(source: &str) -> MessageText {
    let mut out = MessageText::new();
    push_truncated(&mut out, source);
    if out.is_empty() {
        let _ = out.push_str(PLACEHOLDER);
    }
    out
}

/// Appends as much of `source` as fits. Returns `false` when truncated.
pub fn push_truncated(out: &mut MessageText, source: &str) -> bool {
    for ch in source.chars() {
        if out.push(ch).is_err() {
            return false;
        }
    }
    true
}

/// Substring substitution table applied to received text only.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Vocabulary {
    entries: &'static [(&'static str, &'static str)],
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::empty()
    }
}

impl Vocabulary {
    /// Earlier entries win when several codes match at the same position.
    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    pub const fn empty() -> Self {
        Self { entries: &[] }
    }

    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn substitute(&self, source: &str) -> MessageText {
        if self.is_empty() {
            return message_from(source);
        }

        let mut out = MessageText::new();
        let mut rest = source;

        'scan: while !rest.is_empty() {
            for (code, word) in self.entries {
                if !code.is_empty() && rest.starts_with(code) {
                    if !push_truncated(&mut out, word) {
                        break 'scan;
                    }
                    rest = &rest[code.len()..];
                    continue 'scan;
                }
            }

            let Some(ch) = rest.chars().next() else {
                break;
            };
            if out.push(ch).is_err() {
                break;
            }
            rest = &rest[ch.len_utf8()..];
        }

        if out.is_empty() {
            let _ = out.push_str(PLACEHOLDER);
        }
        out
    }
}

/// Formats `"<prefix> <code>"`, e.g. `SENT 200`.
pub fn status_code_label<'a>(prefix: &str, code: u16, out: &'a mut [u8]) -> &'a str {
    let mut len = 0usize;
    for byte in prefix.bytes() {
        if len >= out.len() {
            return str::from_utf8(&out[..len]).unwrap_or("");
        }
        out[len] = byte;
        len += 1;
    }
    if len + 1 >= out.len() {
        return str::from_utf8(&out[..len]).unwrap_or("");
    }
    out[len] = b' ';
    len += 1;
    len += write_u16_ascii(code, &mut out[len..]);

    str::from_utf8(&out[..len]).unwrap_or("")
}

pub fn write_u16_ascii(mut value: u16, out: &mut [u8]) -> usize {
    if out.is_empty() {
        return 0;
    }

    if value == 0 {
        out[0] = b'0';
        return 1;
    }

    let mut tmp = [0u8; 5];
    let mut n = 0usize;
    while value > 0 && n < tmp.len() {
        tmp[n] = b'0' + (value % 10) as u8;
        value /= 10;
        n += 1;
    }

    let len = n.min(out.len());
    for i in 0..len {
        out[i] = tmp[n - 1 - i];
    }
    len
}
