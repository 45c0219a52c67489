//! Input Sanitization
//!
//! Two separate transforms:
//! - [`sanitize_input`] runs before validation and storage. It bounds the
//!   size of free text and strips markup fragments. It is not an HTML
//!   sanitizer; stored text is still untrusted at render time.
//! - [`sanitize_for_display`] escapes text for insertion into HTML. It is
//!   applied at render time only, never before storage, so stored values
//!   stay escapable for any output context.

use unicode_normalization::UnicodeNormalization;

/// Hard cap on sanitized input length, in characters.
pub const MAX_INPUT_CHARS: usize = 1000;

const SCRIPT_SCHEME: &[u8] = b"javascript:";

/// Trim, bound and strip dangerous fragments from untrusted text.
///
/// Steps:
/// 1. trim and cap at [`MAX_INPUT_CHARS`]
/// 2. NFC-compose (`e` + U+0301 becomes `é`); compatibility characters such
///    as `½` or `ﬁ` are left as typed
/// 3. strip `<`, `>` (and their fullwidth and small forms), `javascript:`
///    and `on<word>=` (ASCII case-insensitive), repeating 2-3 until nothing
///    changes, so removals cannot splice a new match together
/// 4. re-trim
///
/// The result is a fixpoint: `sanitize_input(&sanitize_input(x)) == sanitize_input(x)`.
pub fn sanitize_input(raw: &str) -> String {
    let mut current = truncate_chars(raw.trim(), MAX_INPUT_CHARS).to_string();

    loop {
        let composed: String = current.nfc().collect();
        let next = strip_dangerous(&composed);
        if next == current {
            break;
        }
        current = next;
    }

    truncate_chars(current.trim(), MAX_INPUT_CHARS)
        .trim_end()
        .to_string()
}

/// HTML-entity-encode `& < > " ' /`.
///
/// Single pass over the input, so entities produced for one character are
/// never re-encoded (same result as replacing `&` first).
pub fn sanitize_for_display(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            _ => out.push(c),
        }
    }
    out
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn strip_dangerous(input: &str) -> String {
    let without_brackets: String = input.chars().filter(|c| !is_angle_bracket(*c)).collect();
    let without_scheme = remove_ascii_ci(&without_brackets, SCRIPT_SCHEME);
    strip_event_handlers(&without_scheme)
}

/// `<` / `>` and the fullwidth and small forms browsers may fold into them
fn is_angle_bracket(c: char) -> bool {
    matches!(c, '<' | '>' | '\u{FF1C}' | '\u{FF1E}' | '\u{FE64}' | '\u{FE65}')
}

/// Remove every non-overlapping, ASCII case-insensitive occurrence of `needle`.
fn remove_ascii_ci(input: &str, needle: &[u8]) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while !rest.is_empty() {
        // Matched bytes equal an ASCII needle, so they are ASCII and the
        // slice below stays on a char boundary.
        if rest.len() >= needle.len() && rest.as_bytes()[..needle.len()].eq_ignore_ascii_case(needle)
        {
            rest = &rest[needle.len()..];
            continue;
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            out.push(c);
        }
        rest = chars.as_str();
    }
    out
}

/// Remove inline event handler prefixes such as `onclick=` / `ONLOAD=`.
fn strip_event_handlers(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while !rest.is_empty() {
        if let Some(len) = event_handler_len(rest.as_bytes()) {
            rest = &rest[len..];
            continue;
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            out.push(c);
        }
        rest = chars.as_str();
    }
    out
}

/// Length of an `on\w+=` match at the start of `bytes`, if any.
fn event_handler_len(bytes: &[u8]) -> Option<usize> {
    if bytes.len() < 4 || !bytes[..2].eq_ignore_ascii_case(b"on") {
        return None;
    }
    let word = bytes[2..]
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
        .count();
    if word == 0 {
        return None;
    }
    (bytes.get(2 + word) == Some(&b'=')).then_some(3 + word)
}

#[cfg(test)]
mod tests {
    use super::*;

    mod sanitize_input {
        use super::*;

        #[test]
        fn test_trims_whitespace() {
            assert_eq!(sanitize_input("  Jane Doe \n"), "Jane Doe");
        }

        #[test]
        fn test_strips_angle_brackets() {
            assert_eq!(sanitize_input("<b>Bob</b>"), "bBob/b");
        }

        #[test]
        fn test_strips_script_scheme_case_insensitive() {
            assert_eq!(sanitize_input("JavaScript:alert(1)"), "alert(1)");
            assert_eq!(sanitize_input("a javascript: b"), "a  b");
        }

        #[test]
        fn test_strips_event_handlers() {
            assert_eq!(sanitize_input("img onerror=alert(1)"), "img alert(1)");
            assert_eq!(sanitize_input("x ONCLICK=y"), "x y");
            // `on` must be followed by at least one word character
            assert_eq!(sanitize_input("on=1"), "on=1");
            assert_eq!(sanitize_input("button"), "button");
        }

        #[test]
        fn test_spliced_patterns_are_removed() {
            assert_eq!(sanitize_input("javajavascript:script:x"), "x");
            assert_eq!(sanitize_input("java<script:x"), "x");
            assert_eq!(sanitize_input("oonclick=nclick=x"), "x");
        }

        #[test]
        fn test_fullwidth_brackets_are_stripped() {
            assert_eq!(sanitize_input("\u{FF1C}script\u{FF1E}"), "script");
            assert_eq!(sanitize_input("\u{FE64}b\u{FE65}"), "b");
        }

        #[test]
        fn test_compatibility_characters_are_kept() {
            assert_eq!(sanitize_input("\u{BD} portion"), "\u{BD} portion");
            assert_eq!(sanitize_input("\u{FB01}ona \u{2460}"), "\u{FB01}ona \u{2460}");
        }

        #[test]
        fn test_combining_marks_are_composed() {
            assert_eq!(sanitize_input("Jose\u{301}"), "Jos\u{E9}");
        }

        #[test]
        fn test_caps_length() {
            let long = "a".repeat(MAX_INPUT_CHARS + 500);
            assert_eq!(sanitize_input(&long).chars().count(), MAX_INPUT_CHARS);
        }

        #[test]
        fn test_caps_length_in_characters_not_bytes() {
            let long = "é".repeat(MAX_INPUT_CHARS + 1);
            let out = sanitize_input(&long);
            assert_eq!(out.chars().count(), MAX_INPUT_CHARS);
        }

        #[test]
        fn test_keeps_ordinary_punctuation() {
            assert_eq!(
                sanitize_input("Gluten-free; no nuts (severe) & vegan/ish"),
                "Gluten-free; no nuts (severe) & vegan/ish"
            );
        }

        #[test]
        fn test_idempotent_on_tricky_inputs() {
            let cases = [
                "",
                "   ",
                "  <  x",
                "x  >  ",
                "javajavascript:script:",
                "ononclick==",
                "<<>>",
                "\u{FF1C}\u{FF1E}",
                "e<\u{301}",
                " onload=  javascript: <x> ",
                "O'Brien-Smith Jr.",
            ];
            for case in cases {
                let once = sanitize_input(case);
                assert_eq!(sanitize_input(&once), once, "input: {case:?}");
            }
        }

        #[test]
        fn test_idempotent_on_generated_inputs() {
            let fragments = [
                "<", ">", "on", "ON", "click", "=", "java", "script", ":", " ", "a", "Z", "_",
                "\u{FF1C}", "é", "\u{301}", "\t", "-", "'",
            ];
            let mut rng = fastrand::Rng::with_seed(7);
            for _ in 0..2_000 {
                let len = rng.usize(0..24);
                let input: String = (0..len)
                    .map(|_| fragments[rng.usize(..fragments.len())])
                    .collect();
                let once = sanitize_input(&input);
                assert_eq!(sanitize_input(&once), once, "input: {input:?}");
            }
        }
    }

    mod sanitize_for_display {
        use super::*;

        #[test]
        fn test_escapes_all_special_characters() {
            assert_eq!(
                sanitize_for_display(r#"<a href="/x">'&'</a>"#),
                "&lt;a href=&quot;&#x2F;x&quot;&gt;&#x27;&amp;&#x27;&lt;&#x2F;a&gt;"
            );
        }

        #[test]
        fn test_does_not_double_encode_its_own_output() {
            assert_eq!(sanitize_for_display("<"), "&lt;");
            assert_eq!(sanitize_for_display("&lt;"), "&amp;lt;");
        }

        #[test]
        fn test_never_emits_raw_special_characters() {
            let input = "<>&\"'/ plain text <script>alert('x')</script>";
            let escaped = sanitize_for_display(input);
            // Only the entity syntax itself may contain '&' and ';'
            let stripped = escaped
                .replace("&amp;", "")
                .replace("&lt;", "")
                .replace("&gt;", "")
                .replace("&quot;", "")
                .replace("&#x27;", "")
                .replace("&#x2F;", "");
            for c in ['<', '>', '&', '"', '\'', '/'] {
                assert!(!stripped.contains(c), "raw {c:?} in {escaped:?}");
            }
        }

        #[test]
        fn test_plain_text_unchanged() {
            assert_eq!(sanitize_for_display("Jane Doe"), "Jane Doe");
        }
    }
}
