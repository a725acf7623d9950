use crate::token::{lookup_ident, Token, TokenKind};

/// Character-level lexer. Walks the source one char at a time and hands out
/// tokens through [`Lexer::next_token`]; once the input is exhausted it
/// yields `Eof` forever.
///
/// Line and column counters track the position of the character currently
/// under examination, so every token carries the 1-based coordinates of its
/// first character.
pub struct Lexer {
    input: Vec<char>,
    /// index of the char currently under examination
    position: usize,
    /// index of the next char to read
    read_position: usize,
    ch: char,
    line: usize,
    column: usize,
}

const EOF_CHAR: char = '\0';

impl Lexer {
    pub fn new(input: &str) -> Self {
        let mut lexer = Lexer {
            input: input.chars().collect(),
            position: 0,
            read_position: 0,
            ch: EOF_CHAR,
            line: 1,
            column: 0,
        };
        lexer.read_char();
        lexer
    }

    fn read_char(&mut self) {
        if self.ch == '\n' {
            self.line += 1;
            self.column = 0;
        }
        self.ch = self
            .input
            .get(self.read_position)
            .copied()
            .unwrap_or(EOF_CHAR);
        self.position = self.read_position;
        self.read_position += 1;
        self.column += 1;
    }

    fn peek_char(&self) -> char {
        self.input
            .get(self.read_position)
            .copied()
            .unwrap_or(EOF_CHAR)
    }

    fn skip_whitespace(&mut self) {
        while self.ch == ' ' || self.ch == '\t' || self.ch == '\r' || self.ch == '\n' {
            self.read_char();
        }
    }

    fn read_identifier(&mut self) -> String {
        let start = self.position;
        while is_letter(self.ch) || self.ch.is_ascii_digit() {
            self.read_char();
        }
        self.input[start..self.position].iter().collect()
    }

    fn read_number(&mut self) -> String {
        let start = self.position;
        while self.ch.is_ascii_digit() {
            self.read_char();
        }
        self.input[start..self.position].iter().collect()
    }

    /// Reads a string literal up to the closing quote. The literal also ends
    /// at a line break or end of input; there is no escape syntax.
    fn read_string(&mut self) -> String {
        let start = self.position + 1;
        loop {
            self.read_char();
            if self.ch == '"' || self.ch == EOF_CHAR || self.ch == '\n' {
                break;
            }
        }
        self.input[start..self.position].iter().collect()
    }

    /// Reads a `#` comment to the end of the line, yielding the trimmed text.
    fn read_comment(&mut self) -> String {
        let start = self.position + 1;
        loop {
            self.read_char();
            if self.ch == EOF_CHAR || self.ch == '\n' {
                break;
            }
        }
        self.input[start..self.position]
            .iter()
            .collect::<String>()
            .trim()
            .to_string()
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let line = self.line;
        let column = self.column;

        let token = match self.ch {
            '#' => {
                let text = self.read_comment();
                Token::new(TokenKind::Comment, text, line, column)
            }
            '=' => {
                if self.peek_char() == '=' {
                    self.read_char();
                    Token::new(TokenKind::Eq, "==", line, column)
                } else {
                    Token::new(TokenKind::Assign, "=", line, column)
                }
            }
            '!' => {
                if self.peek_char() == '=' {
                    self.read_char();
                    Token::new(TokenKind::NotEq, "!=", line, column)
                } else {
                    Token::new(TokenKind::Bang, "!", line, column)
                }
            }
            '"' => {
                let literal = self.read_string();
                Token::new(TokenKind::Str, literal, line, column)
            }
            '+' => Token::new(TokenKind::Plus, "+", line, column),
            '-' => Token::new(TokenKind::Minus, "-", line, column),
            '/' => Token::new(TokenKind::Slash, "/", line, column),
            '*' => Token::new(TokenKind::Asterisk, "*", line, column),
            '<' => Token::new(TokenKind::Lt, "<", line, column),
            '>' => Token::new(TokenKind::Gt, ">", line, column),
            ';' => Token::new(TokenKind::Semicolon, ";", line, column),
            ',' => Token::new(TokenKind::Comma, ",", line, column),
            '(' => Token::new(TokenKind::LParen, "(", line, column),
            ')' => Token::new(TokenKind::RParen, ")", line, column),
            '{' => Token::new(TokenKind::LBrace, "{", line, column),
            '}' => Token::new(TokenKind::RBrace, "}", line, column),
            '[' => Token::new(TokenKind::LBracket, "[", line, column),
            ']' => Token::new(TokenKind::RBracket, "]", line, column),
            EOF_CHAR => Token::new(TokenKind::Eof, "", line, column),
            c if is_letter(c) => {
                let literal = self.read_identifier();
                let kind = lookup_ident(&literal);
                // read_identifier already advanced past the last char
                return Token::new(kind, literal, line, column);
            }
            c if c.is_ascii_digit() => {
                let literal = self.read_number();
                return Token::new(TokenKind::Int, literal, line, column);
            }
            c => Token::new(TokenKind::Illegal, c.to_string(), line, column),
        };

        self.read_char();
        token
    }
}

/// Dot and slash count as identifier characters so bare filenames such as
/// `input.csv` or `data/input.csv` lex as a single identifier. A leading
/// slash still lexes as the division operator.
fn is_letter(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch == '.' || ch == '/'
}
