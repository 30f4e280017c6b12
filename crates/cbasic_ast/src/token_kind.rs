//! TokenKind enum - every lexical category of the language.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

/// The kind of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum TokenKind {
    // ========================================================================
    // Markers
    // ========================================================================
    Eof,
    Newline,
    /// Unrecognised input. The lexeme carries the message.
    Error,

    // Literals
    Number,
    String,
    FString,
    Ident,

    // Punctuation
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Semicolon,
    Dot,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Backslash,
    Caret,
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    /// `:=`, also produced for `==`.
    TypeInfer,
    /// `..`
    Spread,
    /// `?.`
    NullSafeDot,
    /// `?[`
    NullSafeIndex,
    /// `??`
    NullCoalesce,

    // ========================================================================
    // Keywords
    // ========================================================================
    Let,
    Var,
    Const,
    Print,
    PrintC,
    Input,
    If,
    Then,
    Else,
    ElseIf,
    EndIf,
    While,
    Wend,
    For,
    To,
    Step,
    Next,
    Each,
    In,
    Do,
    Loop,
    Repeat,
    Until,
    Break,
    Continue,
    Exit,
    Not,
    And,
    Or,
    Xor,
    Mod,
    True,
    False,
    /// `NIL`, `NONE` and `NULL`.
    Nil,
    Call,
    Sub,
    EndSub,
    Function,
    EndFunction,
    Return,
    Gosub,
    Goto,
    End,
    Dim,
    Redim,
    Preserve,
    Select,
    Case,
    EndSelect,
    Is,
    Option,
    Explicit,
    Local,
    Global,
    Import,
    Include,
    Type,
    EndType,
    As,
    Extends,
    Super,
    Module,
    EndModule,
    Public,
    Private,
    Operator,
    EndOperator,
    Lambda,
    EndLambda,
    Using,
    EndUsing,
    Match,
    EndMatch,
    Enum,
    EndEnum,
    Union,
    EndUnion,
    Try,
    Catch,
    Finally,
    EndTry,
    Throw,
    Assert,
    Breakpoint,
    Debug,
    Yield,
    Await,

    // State machines and events
    State,
    EndState,
    Transition,
    On,
    EndOn,
    Enter,
    Update,
    Parallel,
    EndParallel,
    Group,
    EndGroup,
    System,
    EndSystem,
    Define,
    Event,
    Attach,
    From,
    Override,
    Priority,
    Enable,
    Disable,
}

/// Reserved words and their kinds. Lookup happens on upper-cased text.
const KEYWORDS: &[(&str, TokenKind)] = &[
    ("LET", TokenKind::Let),
    ("VAR", TokenKind::Var),
    ("CONST", TokenKind::Const),
    ("PRINT", TokenKind::Print),
    ("PRINTC", TokenKind::PrintC),
    ("INPUT", TokenKind::Input),
    ("IF", TokenKind::If),
    ("THEN", TokenKind::Then),
    ("ELSE", TokenKind::Else),
    ("ELSEIF", TokenKind::ElseIf),
    ("ENDIF", TokenKind::EndIf),
    ("WHILE", TokenKind::While),
    ("WEND", TokenKind::Wend),
    ("FOR", TokenKind::For),
    ("TO", TokenKind::To),
    ("STEP", TokenKind::Step),
    ("NEXT", TokenKind::Next),
    ("EACH", TokenKind::Each),
    ("IN", TokenKind::In),
    ("DO", TokenKind::Do),
    ("LOOP", TokenKind::Loop),
    ("REPEAT", TokenKind::Repeat),
    ("UNTIL", TokenKind::Until),
    ("BREAK", TokenKind::Break),
    ("CONTINUE", TokenKind::Continue),
    ("EXIT", TokenKind::Exit),
    ("NOT", TokenKind::Not),
    ("AND", TokenKind::And),
    ("OR", TokenKind::Or),
    ("XOR", TokenKind::Xor),
    ("MOD", TokenKind::Mod),
    ("TRUE", TokenKind::True),
    ("FALSE", TokenKind::False),
    ("NIL", TokenKind::Nil),
    ("NONE", TokenKind::Nil),
    ("NULL", TokenKind::Nil),
    ("CALL", TokenKind::Call),
    ("SUB", TokenKind::Sub),
    ("ENDSUB", TokenKind::EndSub),
    ("FUNCTION", TokenKind::Function),
    ("ENDFUNCTION", TokenKind::EndFunction),
    ("RETURN", TokenKind::Return),
    ("GOSUB", TokenKind::Gosub),
    ("GOTO", TokenKind::Goto),
    ("END", TokenKind::End),
    ("DIM", TokenKind::Dim),
    ("REDIM", TokenKind::Redim),
    ("PRESERVE", TokenKind::Preserve),
    ("SELECT", TokenKind::Select),
    ("CASE", TokenKind::Case),
    ("ENDSELECT", TokenKind::EndSelect),
    ("IS", TokenKind::Is),
    ("OPTION", TokenKind::Option),
    ("EXPLICIT", TokenKind::Explicit),
    ("LOCAL", TokenKind::Local),
    ("GLOBAL", TokenKind::Global),
    ("IMPORT", TokenKind::Import),
    ("INCLUDE", TokenKind::Include),
    ("TYPE", TokenKind::Type),
    ("ENDTYPE", TokenKind::EndType),
    ("AS", TokenKind::As),
    ("EXTENDS", TokenKind::Extends),
    ("SUPER", TokenKind::Super),
    ("MODULE", TokenKind::Module),
    ("ENDMODULE", TokenKind::EndModule),
    ("PUBLIC", TokenKind::Public),
    ("PRIVATE", TokenKind::Private),
    ("OPERATOR", TokenKind::Operator),
    ("ENDOPERATOR", TokenKind::EndOperator),
    ("LAMBDA", TokenKind::Lambda),
    ("ENDLAMBDA", TokenKind::EndLambda),
    ("USING", TokenKind::Using),
    ("ENDUSING", TokenKind::EndUsing),
    ("MATCH", TokenKind::Match),
    ("ENDMATCH", TokenKind::EndMatch),
    ("ENUM", TokenKind::Enum),
    ("ENDENUM", TokenKind::EndEnum),
    ("UNION", TokenKind::Union),
    ("ENDUNION", TokenKind::EndUnion),
    ("TRY", TokenKind::Try),
    ("CATCH", TokenKind::Catch),
    ("FINALLY", TokenKind::Finally),
    ("ENDTRY", TokenKind::EndTry),
    ("THROW", TokenKind::Throw),
    ("ASSERT", TokenKind::Assert),
    ("BREAKPOINT", TokenKind::Breakpoint),
    ("DEBUG", TokenKind::Debug),
    ("YIELD", TokenKind::Yield),
    ("AWAIT", TokenKind::Await),
    ("STATE", TokenKind::State),
    ("ENDSTATE", TokenKind::EndState),
    ("TRANSITION", TokenKind::Transition),
    ("ON", TokenKind::On),
    ("ENDON", TokenKind::EndOn),
    ("ENTER", TokenKind::Enter),
    ("UPDATE", TokenKind::Update),
    ("PARALLEL", TokenKind::Parallel),
    ("ENDPARALLEL", TokenKind::EndParallel),
    ("GROUP", TokenKind::Group),
    ("ENDGROUP", TokenKind::EndGroup),
    ("SYSTEM", TokenKind::System),
    ("ENDSYSTEM", TokenKind::EndSystem),
    ("DEFINE", TokenKind::Define),
    ("EVENT", TokenKind::Event),
    ("ATTACH", TokenKind::Attach),
    ("FROM", TokenKind::From),
    ("OVERRIDE", TokenKind::Override),
    ("PRIORITY", TokenKind::Priority),
    ("ENABLE", TokenKind::Enable),
    ("DISABLE", TokenKind::Disable),
];

static KEYWORD_TABLE: LazyLock<FxHashMap<&'static str, TokenKind>> =
    LazyLock::new(|| KEYWORDS.iter().copied().collect());

impl TokenKind {
    /// Look up an upper-cased word in the keyword table.
    #[inline]
    pub fn from_keyword(text: &str) -> Option<TokenKind> {
        KEYWORD_TABLE.get(text).copied()
    }

    /// The canonical spelling of a keyword kind.
    pub fn keyword_text(self) -> Option<&'static str> {
        if self == TokenKind::Nil {
            return Some("NIL");
        }
        KEYWORDS
            .iter()
            .find(|(_, kind)| *kind == self)
            .map(|(text, _)| *text)
    }

    pub fn is_keyword(self) -> bool {
        self >= TokenKind::Let
    }

    pub fn punctuation_text(self) -> Option<&'static str> {
        let text = match self {
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Semicolon => ";",
            TokenKind::Dot => ".",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Backslash => "\\",
            TokenKind::Caret => "^",
            TokenKind::Eq => "=",
            TokenKind::Neq => "<>",
            TokenKind::Lt => "<",
            TokenKind::Lte => "<=",
            TokenKind::Gt => ">",
            TokenKind::Gte => ">=",
            TokenKind::TypeInfer => ":=",
            TokenKind::Spread => "..",
            TokenKind::NullSafeDot => "?.",
            TokenKind::NullSafeIndex => "?[",
            TokenKind::NullCoalesce => "??",
            _ => return None,
        };
        Some(text)
    }

    /// Statement separators: end of line and `:`.
    #[inline]
    pub fn is_separator(self) -> bool {
        matches!(self, TokenKind::Newline | TokenKind::Colon)
    }

    /// A human-readable description used in diagnostics.
    pub fn describe(self) -> String {
        match self {
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::Newline => "end of line".to_string(),
            TokenKind::Error => "invalid token".to_string(),
            TokenKind::Number => "number".to_string(),
            TokenKind::String => "string".to_string(),
            TokenKind::FString => "interpolated string".to_string(),
            TokenKind::Ident => "identifier".to_string(),
            _ => {
                if let Some(text) = self.punctuation_text() {
                    format!("'{}'", text)
                } else {
                    self.keyword_text().unwrap_or("token").to_string()
                }
            }
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(TokenKind::from_keyword("PRINT"), Some(TokenKind::Print));
        assert_eq!(TokenKind::from_keyword("ENDIF"), Some(TokenKind::EndIf));
        assert_eq!(TokenKind::from_keyword("NULL"), Some(TokenKind::Nil));
        assert_eq!(TokenKind::from_keyword("print"), None);
        assert_eq!(TokenKind::from_keyword("FOO"), None);
    }

    #[test]
    fn test_keyword_text_round_trip() {
        for (text, kind) in KEYWORDS {
            if *kind == TokenKind::Nil {
                continue;
            }
            assert_eq!(kind.keyword_text(), Some(*text));
            assert!(kind.is_keyword(), "{} should be a keyword", text);
        }
        assert_eq!(TokenKind::Nil.keyword_text(), Some("NIL"));
    }

    #[test]
    fn test_non_keywords() {
        assert!(!TokenKind::Ident.is_keyword());
        assert!(!TokenKind::NullCoalesce.is_keyword());
        assert_eq!(TokenKind::Ident.keyword_text(), None);
    }

    #[test]
    fn test_describe() {
        assert_eq!(TokenKind::Wend.describe(), "WEND");
        assert_eq!(TokenKind::RParen.describe(), "')'");
        assert_eq!(TokenKind::Newline.describe(), "end of line");
        assert_eq!(TokenKind::Ident.to_string(), "identifier");
    }

    #[test]
    fn test_separators() {
        assert!(TokenKind::Newline.is_separator());
        assert!(TokenKind::Colon.is_separator());
        assert!(!TokenKind::Semicolon.is_separator());
        assert!(!TokenKind::Eof.is_separator());
    }
}
