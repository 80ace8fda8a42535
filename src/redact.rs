use std::borrow::Cow;

// Casaview session tokens carry a fixed prefix; anything after it up to the
// next delimiter is secret.
const TOKEN_PREFIX: &str = "cv-sess-";

fn scrub_after(rest: &str) -> usize {
    let mut consumed = 0;
    for ch in rest.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' {
            consumed += ch.len_utf8();
        } else {
            break;
        }
    }
    consumed
}

/// Replaces Casaview session tokens embedded in free-form text (error
/// messages, debug output) with a redacted marker.
pub fn redact_token(input: &str) -> Cow<'_, str> {
    if !input.contains(TOKEN_PREFIX) {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(idx) = rest.find(TOKEN_PREFIX) {
        out.push_str(&rest[..idx]);
        out.push_str(TOKEN_PREFIX);
        out.push_str("REDACTED");
        rest = &rest[idx + TOKEN_PREFIX.len()..];
        rest = &rest[scrub_after(rest)..];
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn find_ascii_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    let hay = haystack.as_bytes();
    let nee = needle.as_bytes();
    if nee.is_empty() {
        return Some(0);
    }
    if nee.len() > hay.len() {
        return None;
    }

    (0..=hay.len() - nee.len()).find(|&i| {
        hay[i..i + nee.len()]
            .iter()
            .zip(nee)
            .all(|(a, b)| a.to_ascii_lowercase() == b.to_ascii_lowercase())
    })
}

fn redact_header_line(text: String, header: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text.as_str();
    loop {
        let Some(idx) = find_ascii_case_insensitive(rest, header) else {
            out.push_str(rest);
            break;
        };
        out.push_str(&rest[..idx + header.len()]);
        rest = &rest[idx + header.len()..];

        if let Some(' ') = rest.chars().next() {
            out.push(' ');
            rest = &rest[1..];
        }

        let mut consumed = 0;
        for ch in rest.chars() {
            if ch == '\n' || ch == '\r' {
                break;
            }
            consumed += ch.len_utf8();
        }
        out.push_str("REDACTED");
        rest = &rest[consumed..];
    }
    out
}

/// Token plus header scrubbing for anything that may end up in a log line.
pub fn redact_secrets(input: &str) -> Cow<'_, str> {
    let mut value = match redact_token(input) {
        Cow::Borrowed(s) => s.to_string(),
        Cow::Owned(s) => s,
    };

    value = redact_header_line(value, "Authorization: Bearer");
    value = redact_header_line(value, "authorization: Bearer");

    if value == input {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(value)
    }
}
