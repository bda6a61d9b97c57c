//! Small text helpers shared by extraction and scoring.

/// Collapse all whitespace runs (including newlines) into single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapse whitespace within each line and drop blank lines, keeping line
/// structure (section markers such as "Requirements:" are line-based).
pub fn clean_multiline(text: &str) -> String {
    text.lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_term_char(c: char) -> bool {
    c.is_alphanumeric() || c == '+' || c == '#'
}

/// Byte offsets of every whole-term occurrence of `term` in `haystack`:
/// the characters just before and after are not letters, digits, `+` or `#`.
/// Matching is case-sensitive.
pub fn term_positions<'a>(haystack: &'a str, term: &'a str) -> impl Iterator<Item = usize> + 'a {
    haystack
        .match_indices(term)
        .filter(move |_| !term.is_empty())
        .filter(move |(start, _)| {
            let before = haystack[..*start].chars().next_back();
            let after = haystack[start + term.len()..].chars().next();
            // A trailing '.' is fine ("python."), a leading one is not (".net" inside "asp.net").
            let before_ok = before.map_or(true, |c| !is_term_char(c) && c != '.');
            let after_ok = after.map_or(true, |c| !is_term_char(c));
            before_ok && after_ok
        })
        .map(|(start, _)| start)
}

/// True if `term` occurs in `haystack` as a whole term. Both sides are
/// expected to be lowercase already.
pub fn contains_term(haystack: &str, term: &str) -> bool {
    term_positions(haystack, term).next().is_some()
}

/// True when the text before `offset` ends a sentence or line, so a word
/// starting there is capitalized for grammar rather than as a name.
pub fn starts_sentence(text: &str, offset: usize) -> bool {
    let before = text[..offset].trim_end_matches(&[' ', '\t'][..]);
    match before.chars().next_back() {
        None => true,
        Some(c) => matches!(c, '.' | '!' | '?' | '\n' | '\r' | ':' | '-' | '*' | '•' | '"'),
    }
}
