#[derive(Clone, Copy, PartialEq, Eq)]
pub(super) enum State {
    Normal,
    SingleQuoted,
}

/// Walk `sql`, calling `on_placeholder` with the byte offset of each `?` outside a quoted literal.
///
/// A doubled quote inside a literal closes and immediately reopens it, so `'O''Brien'` is
/// one quoted run. An unterminated literal swallows the rest of the text.
pub(super) fn scan_placeholders(sql: &str, mut on_placeholder: impl FnMut(usize)) {
    let mut state = State::Normal;
    for (idx, b) in sql.bytes().enumerate() {
        match (state, b) {
            (State::Normal, b'\'') => state = State::SingleQuoted,
            (State::Normal, b'?') => on_placeholder(idx),
            (State::SingleQuoted, b'\'') => state = State::Normal,
            _ => {}
        }
    }
}
