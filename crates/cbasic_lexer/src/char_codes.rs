//! Character classification used by the lexer.

pub const LINE_FEED: char = '\n';
pub const CARRIAGE_RETURN: char = '\r';
pub const TAB: char = '\t';
pub const SPACE: char = ' ';
pub const BYTE_ORDER_MARK: char = '\u{FEFF}';
pub const DOUBLE_QUOTE: char = '"';
pub const SINGLE_QUOTE: char = '\'';
pub const HASH: char = '#';
pub const SLASH: char = '/';
pub const ASTERISK: char = '*';
pub const DOT: char = '.';
pub const DOLLAR_SIGN: char = '$';
pub const UNDERSCORE: char = '_';

/// Whitespace that separates tokens on a line. Line feeds are significant.
#[inline]
pub fn is_inline_whitespace(ch: char) -> bool {
    matches!(ch, SPACE | TAB | CARRIAGE_RETURN | BYTE_ORDER_MARK)
}

#[inline]
pub fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

/// `[A-Za-z_$]`
#[inline]
pub fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == UNDERSCORE || ch == DOLLAR_SIGN
}

/// `[A-Za-z0-9_$]`
#[inline]
pub fn is_identifier_part(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == UNDERSCORE || ch == DOLLAR_SIGN
}
