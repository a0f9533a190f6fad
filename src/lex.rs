use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'de> {
    pub kind: TokenKind,
    pub literal: &'de str,
    /// Byte offset of `literal` in the scanned input.
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LeftParen,
    RightParen,
    Operand,
}

impl Token<'_> {
    pub fn span(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.literal.len()
    }
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lit = self.literal;
        let at = self.offset;
        match self.kind {
            TokenKind::Plus => write!(f, "PLUS {lit} {at}"),
            TokenKind::Minus => write!(f, "MINUS {lit} {at}"),
            TokenKind::Star => write!(f, "STAR {lit} {at}"),
            TokenKind::Slash => write!(f, "SLASH {lit} {at}"),
            TokenKind::Caret => write!(f, "CARET {lit} {at}"),
            TokenKind::LeftParen => write!(f, "LEFT_PAREN {lit} {at}"),
            TokenKind::RightParen => write!(f, "RIGHT_PAREN {lit} {at}"),
            TokenKind::Operand => write!(f, "OPERAND {lit} {at}"),
        }
    }
}

pub struct Lexer<'de> {
    pub(crate) filename: Option<&'de str>,
    pub(crate) whole: &'de str,
    rest: &'de str,
    byte: usize,
    number_literals: bool,
}

impl<'de> Lexer<'de> {
    pub fn new(filename: Option<&'de str>, input: &'de str) -> Self {
        Lexer {
            filename,
            whole: input,
            rest: input,
            byte: 0,
            number_literals: false,
        }
    }

    /// Group runs of ASCII digits into a single operand instead of one
    /// operand per character.
    pub fn with_number_literals(mut self) -> Self {
        self.number_literals = true;
        self
    }
}

impl<'de> Iterator for Lexer<'de> {
    type Item = Token<'de>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut chars = self.rest.chars();
            let c = chars.next()?;
            let literal = &self.rest[..c.len_utf8()];
            let cur = self.rest;
            let offset = self.byte;
            self.rest = chars.as_str();
            self.byte += c.len_utf8();

            let process = |kind: TokenKind| {
                Some(Token {
                    kind,
                    literal,
                    offset,
                })
            };

            return match c {
                '+' => process(TokenKind::Plus),
                '-' => process(TokenKind::Minus),
                '*' => process(TokenKind::Star),
                '/' => process(TokenKind::Slash),
                '^' => process(TokenKind::Caret),
                '(' => process(TokenKind::LeftParen),
                ')' => process(TokenKind::RightParen),
                c if c.is_whitespace() => continue,
                '0'..='9' if self.number_literals => {
                    let first_non_digit = cur
                        .find(|c: char| !c.is_ascii_digit())
                        .unwrap_or(cur.len());
                    let literal = &cur[..first_non_digit];

                    let extra_bytes = literal.len() - c.len_utf8();
                    self.byte += extra_bytes;
                    self.rest = &self.rest[extra_bytes..];

                    Some(Token {
                        kind: TokenKind::Operand,
                        literal,
                        offset,
                    })
                }
                _ => process(TokenKind::Operand),
            };
        }
    }
}
