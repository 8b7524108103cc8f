use crate::error::{DbError, Result};

/// Represents the smallest meaningful units (atoms) of the command language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // --- Keywords ---
    Create,
    Table,
    Insert,
    Into,
    Values,
    Select,
    From,
    Where,
    Update,
    Set,
    Delete,
    Join,
    On,
    Drop,
    Primary,
    Key,

    // --- Identifiers & Literals ---
    /// A name representing a table, a column, or a data type (e.g., `users`,
    /// `id`, `Int`).
    Ident(String),
    /// A 64-bit integer literal (e.g., `42`, `-7`).
    Number(i64),
    /// A 64-bit floating-point literal (e.g., `3.14`).
    FloatNumber(f64),
    /// A string literal, between single or double quotes.
    String(String),
    /// The boolean literal `TRUE`.
    True,
    /// The boolean literal `FALSE`.
    False,

    // --- Symbols ---
    /// Left parenthesis `(`
    LeftParen,
    /// Right parenthesis `)`
    RightParen,
    /// Comma `,`
    Comma,
    /// Semicolon `;`
    Semicolon,
    /// Wildcard symbol `*`
    Star,
    /// Greater than `>`
    Greater,
    /// Greater than or equal `>=`
    GreaterEq,
    /// Lower than `<`
    Lower,
    /// Lower than or equal `<=`
    LowerEq,
    /// Equal to `=`
    Equal,
    /// Not equal `!=`
    NotEqual,

    // --- Special ---
    /// Represents the End Of File/Input.
    Eof,
}

/// A lexical scanner that converts a raw command string into [Token]s.
pub struct Tokenizer {
    /// The input string stored as a vector of characters for easy iteration.
    input: Vec<char>,
    /// The current position in the character vector.
    position: usize,
}

impl Tokenizer {
    /// Creates a new Tokenizer for the given input string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Processes the entire input and returns a vector of tokens.
    ///
    /// # Errors
    /// Returns [DbError::Parse] if an invalid character is encountered or a
    /// literal is malformed.
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        while !self.is_at_end() {
            self.skip_whitespace();

            if self.is_at_end() {
                break;
            }

            let token = self.next_token()?;
            tokens.push(token);
        }

        tokens.push(Token::Eof);
        Ok(tokens)
    }

    /// Identifies the next token based on the character at the current position.
    fn next_token(&mut self) -> Result<Token> {
        let ch = self.current_char();

        match ch {
            '(' => {
                self.advance();
                Ok(Token::LeftParen)
            }
            ')' => {
                self.advance();
                Ok(Token::RightParen)
            }
            ',' => {
                self.advance();
                Ok(Token::Comma)
            }
            ';' => {
                self.advance();
                Ok(Token::Semicolon)
            }
            '*' => {
                self.advance();
                Ok(Token::Star)
            }
            '>' => {
                self.advance();
                if self.matches_char('=') {
                    Ok(Token::GreaterEq)
                } else {
                    Ok(Token::Greater)
                }
            }
            '<' => {
                self.advance();
                if self.matches_char('=') {
                    Ok(Token::LowerEq)
                } else {
                    Ok(Token::Lower)
                }
            }
            '=' => {
                self.advance();
                Ok(Token::Equal)
            }
            '!' => {
                self.advance();
                if self.matches_char('=') {
                    Ok(Token::NotEqual)
                } else {
                    Err(DbError::Parse("expected '=' after '!'".into()))
                }
            }
            '-' => self.read_number(),
            c if c.is_alphabetic() => self.read_identifier(),
            c if c.is_numeric() => self.read_number(),
            '\'' | '"' => self.read_string(ch),
            _ => Err(DbError::Parse(format!(
                "character {ch:?} is not supported"
            ))),
        }
    }

    // --- Navigation Helpers ---

    /// Returns the character at the current position.
    fn current_char(&self) -> char {
        self.input[self.position]
    }

    /// Moves the cursor forward by one character.
    fn advance(&mut self) {
        self.position += 1;
    }

    /// Checks if the cursor has reached the end of the input.
    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Consumes the current character if it equals `expected`.
    fn matches_char(&mut self, expected: char) -> bool {
        if !self.is_at_end() && self.current_char() == expected {
            self.advance();
            return true;
        }
        false
    }

    /// Consumes any whitespace characters (spaces, tabs, newlines).
    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.current_char().is_whitespace() {
            self.advance();
        }
    }

    // --- Extraction Logic ---

    /// Reads a sequence of alphanumeric characters and determines if it's
    /// a reserved keyword or a user-defined identifier.
    ///
    /// Keywords are matched case-insensitively; data type names stay plain
    /// identifiers and are resolved by the parser.
    fn read_identifier(&mut self) -> Result<Token> {
        let mut ident = String::new();

        while !self.is_at_end()
            && (self.current_char().is_alphanumeric() || self.current_char() == '_')
        {
            ident.push(self.current_char());
            self.advance();
        }

        match ident.to_uppercase().as_str() {
            "CREATE" => Ok(Token::Create),
            "TABLE" => Ok(Token::Table),
            "INSERT" => Ok(Token::Insert),
            "INTO" => Ok(Token::Into),
            "VALUES" => Ok(Token::Values),
            "SELECT" => Ok(Token::Select),
            "FROM" => Ok(Token::From),
            "WHERE" => Ok(Token::Where),
            "UPDATE" => Ok(Token::Update),
            "SET" => Ok(Token::Set),
            "DELETE" => Ok(Token::Delete),
            "JOIN" => Ok(Token::Join),
            "ON" => Ok(Token::On),
            "DROP" => Ok(Token::Drop),
            "PRIMARY" => Ok(Token::Primary),
            "KEY" => Ok(Token::Key),
            "TRUE" => Ok(Token::True),
            "FALSE" => Ok(Token::False),
            _ => Ok(Token::Ident(ident)),
        }
    }

    /// Reads a numeric literal, optionally signed. If a dot `.` is
    /// encountered, it returns a [Token::FloatNumber], otherwise a
    /// [Token::Number].
    fn read_number(&mut self) -> Result<Token> {
        let mut number = String::new();
        let mut has_dot = false;

        if self.current_char() == '-' {
            number.push('-');
            self.advance();
            if self.is_at_end() || !self.current_char().is_numeric() {
                return Err(DbError::Parse("expected digits after '-'".into()));
            }
        }

        while !self.is_at_end()
            && (self.current_char().is_numeric() || (self.current_char() == '.' && !has_dot))
        {
            if self.current_char() == '.' {
                has_dot = true;
            }
            number.push(self.current_char());
            self.advance();
        }

        if !self.is_at_end() && self.current_char() == '.' {
            return Err(DbError::Parse(
                "multiple dots are not allowed for a float".into(),
            ));
        }

        if has_dot {
            return number
                .parse::<f64>()
                .map(Token::FloatNumber)
                .map_err(|e| DbError::Parse(e.to_string()));
        }

        number
            .parse::<i64>()
            .map(Token::Number)
            .map_err(|e| DbError::Parse(e.to_string()))
    }

    /// Reads a string literal enclosed in matching quotes.
    fn read_string(&mut self, quote: char) -> Result<Token> {
        self.advance(); // Skip the opening quote

        let mut string = String::new();
        while !self.is_at_end() && self.current_char() != quote {
            string.push(self.current_char());
            self.advance();
        }

        if self.is_at_end() {
            return Err(DbError::Parse("unterminated string".into()));
        }

        // Skip the closing quote
        self.advance();

        Ok(Token::String(string))
    }
}
