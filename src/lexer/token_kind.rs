/// Every kind of token the lexer can emit.
///
/// Keywords are single Unicode glyphs (`•` var, `←` assign, `¿` if and so
/// on); the remaining kinds cover punctuation, operators and literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Structural
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Dot,
    Semicolon,

    // Arithmetic
    Minus,
    Plus,
    Divide,
    Multiply,

    // Comparison and equality
    Bang,
    Equal,
    NotEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // Literals
    Identifier,
    String,
    Number,

    // Glyph keywords
    And,
    Assign,
    Break,
    False,
    Func,
    If,
    Loop,
    Nil,
    Or,
    Print,
    Return,
    True,
    Var,

    Eof,
}
