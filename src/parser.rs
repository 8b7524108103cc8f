use crate::ast::{
    ColumnsSelect, CreateTable, Delete, Insert, Join, Select, Statement, Update,
};
use crate::condition::{CompareOp, Condition};
use crate::data_type::DataType;
use crate::error::{DbError, Result};
use crate::schema::ColumnDef;
use crate::tokenizer::Token;
use crate::value::Value;

/// A recursive-descent parser turning a token stream into one [Statement].
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    pub fn parse(&mut self) -> Result<Statement> {
        let statement = match self.current_token() {
            Token::Create => self.parse_create_table(),
            Token::Insert => self.parse_insert(),
            Token::Select => self.parse_select(),
            Token::Update => self.parse_update(),
            Token::Delete => self.parse_delete(),
            Token::Join => self.parse_join(),
            Token::Drop => self.parse_drop_table(),
            other => Err(DbError::Parse(format!("unexpected token: {other:?}"))),
        }?;

        // trailing semicolon is optional
        if matches!(self.current_token(), Token::Semicolon) {
            self.advance();
        }

        // Check we are at the end of the statement
        if !self.is_at_end() {
            return Err(DbError::Parse(format!(
                "unexpected token after statement: {:?}",
                self.current_token()
            )));
        }

        Ok(statement)
    }

    // --- helpers ---

    fn current_token(&self) -> &Token {
        &self.tokens[self.position]
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current_token(), Token::Eof)
    }

    fn consume(&mut self, expected: Token) -> Result<()> {
        if *self.current_token() == expected {
            self.advance();
            Ok(())
        } else {
            Err(DbError::Parse(format!(
                "expected {:?}, found {:?}",
                expected,
                self.current_token()
            )))
        }
    }

    fn consume_ident(&mut self) -> Result<String> {
        match self.current_token() {
            Token::Ident(string) => {
                let string = string.clone();
                self.advance();
                Ok(string)
            }
            other => Err(DbError::Parse(format!(
                "expected identifier, found {other:?}"
            ))),
        }
    }

    fn consume_data_type(&mut self) -> Result<DataType> {
        match self.current_token() {
            Token::Ident(name) => {
                let data_type = name.parse()?;
                self.advance();
                Ok(data_type)
            }
            other => Err(DbError::Parse(format!(
                "expected a data type, found {other:?}"
            ))),
        }
    }

    fn consume_literal(&mut self) -> Result<Value> {
        let value = match self.current_token() {
            Token::Number(n) => Value::Int(*n),
            Token::FloatNumber(f) => Value::Float(*f),
            Token::String(s) => Value::String(s.clone()),
            Token::True => Value::Bool(true),
            Token::False => Value::Bool(false),
            other => {
                return Err(DbError::Parse(format!(
                    "expected a literal value, found {other:?}"
                )));
            }
        };
        self.advance();
        Ok(value)
    }

    fn consume_compare_op(&mut self) -> Result<CompareOp> {
        let op = match self.current_token() {
            Token::Equal => CompareOp::Eq,
            Token::NotEqual => CompareOp::NotEq,
            Token::Lower => CompareOp::Lt,
            Token::LowerEq => CompareOp::LtEq,
            Token::Greater => CompareOp::Gt,
            Token::GreaterEq => CompareOp::GtEq,
            other => {
                return Err(DbError::Parse(format!(
                    "expected a comparison operator, found {other:?}"
                )));
            }
        };
        self.advance();
        Ok(op)
    }

    /// Parses `column OP literal`.
    fn parse_condition(&mut self) -> Result<Condition> {
        let column = self.consume_ident()?;
        let op = self.consume_compare_op()?;
        let value = self.consume_literal()?;
        Ok(Condition { column, op, value })
    }

    /// Parses a mandatory `WHERE column OP literal` clause.
    fn parse_where(&mut self) -> Result<Condition> {
        self.consume(Token::Where)?;
        self.parse_condition()
    }

    fn parse_column_def(&mut self) -> Result<ColumnDef> {
        let name = self.consume_ident()?;
        let data_type = self.consume_data_type()?;
        Ok(ColumnDef { name, data_type })
    }

    // --- statements ---

    /// `CREATE TABLE name (col Type, ...) [PRIMARY KEY col]`
    fn parse_create_table(&mut self) -> Result<Statement> {
        self.consume(Token::Create)?;
        self.consume(Token::Table)?;
        let table = self.consume_ident()?;
        self.consume(Token::LeftParen)?;

        let mut columns = vec![];
        loop {
            columns.push(self.parse_column_def()?);
            match self.current_token() {
                Token::RightParen => {
                    self.advance();
                    break;
                }
                Token::Comma => {
                    self.advance();
                    continue;
                }
                _ => return Err(DbError::Parse("expected ',' or ')'".into())),
            }
        }

        let primary_key = if matches!(self.current_token(), Token::Primary) {
            self.advance();
            self.consume(Token::Key)?;
            Some(self.consume_ident()?)
        } else {
            None
        };

        Ok(Statement::CreateTable(CreateTable {
            table,
            columns,
            primary_key,
        }))
    }

    /// `INSERT INTO name VALUES (v, ...)`
    fn parse_insert(&mut self) -> Result<Statement> {
        self.consume(Token::Insert)?;
        self.consume(Token::Into)?;
        let table = self.consume_ident()?;
        self.consume(Token::Values)?;
        self.consume(Token::LeftParen)?;

        let mut values = vec![];
        loop {
            values.push(self.consume_literal()?);
            match self.current_token() {
                Token::RightParen => {
                    self.advance();
                    break;
                }
                Token::Comma => {
                    self.advance();
                    continue;
                }
                _ => return Err(DbError::Parse("expected ',' or ')'".into())),
            }
        }

        Ok(Statement::Insert(Insert { table, values }))
    }

    /// `SELECT *|c1,c2 FROM name [WHERE col OP literal]`
    fn parse_select(&mut self) -> Result<Statement> {
        self.consume(Token::Select)?;

        let columns = if matches!(self.current_token(), Token::Star) {
            self.advance();
            ColumnsSelect::Star
        } else {
            let mut names = vec![self.consume_ident()?];
            while matches!(self.current_token(), Token::Comma) {
                self.advance();
                names.push(self.consume_ident()?);
            }
            ColumnsSelect::Names(names)
        };

        self.consume(Token::From)?;
        let table = self.consume_ident()?;

        let filter = if matches!(self.current_token(), Token::Where) {
            self.advance();
            Some(self.parse_condition()?)
        } else {
            None
        };

        Ok(Statement::Select(Select {
            table,
            columns,
            filter,
        }))
    }

    /// `UPDATE name SET c = v[, ...] WHERE col OP literal`
    fn parse_update(&mut self) -> Result<Statement> {
        self.consume(Token::Update)?;
        let table = self.consume_ident()?;
        self.consume(Token::Set)?;

        let mut assignments = vec![];
        loop {
            let column = self.consume_ident()?;
            self.consume(Token::Equal)?;
            let value = self.consume_literal()?;
            assignments.push((column, value));
            if matches!(self.current_token(), Token::Comma) {
                self.advance();
                continue;
            }
            break;
        }

        let filter = self.parse_where()?;
        Ok(Statement::Update(Update {
            table,
            assignments,
            filter,
        }))
    }

    /// `DELETE FROM name WHERE col OP literal`
    fn parse_delete(&mut self) -> Result<Statement> {
        self.consume(Token::Delete)?;
        self.consume(Token::From)?;
        let table = self.consume_ident()?;
        let filter = self.parse_where()?;
        Ok(Statement::Delete(Delete { table, filter }))
    }

    /// `JOIN left, right ON col`
    fn parse_join(&mut self) -> Result<Statement> {
        self.consume(Token::Join)?;
        let left = self.consume_ident()?;
        self.consume(Token::Comma)?;
        let right = self.consume_ident()?;
        self.consume(Token::On)?;
        let on_column = self.consume_ident()?;
        Ok(Statement::Join(Join {
            left,
            right,
            on_column,
        }))
    }

    /// `DROP TABLE name`
    fn parse_drop_table(&mut self) -> Result<Statement> {
        self.consume(Token::Drop)?;
        self.consume(Token::Table)?;
        let table = self.consume_ident()?;
        Ok(Statement::DropTable(table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::Tokenizer;

    fn parse(input: &str) -> Result<Statement> {
        let tokens = Tokenizer::new(input).tokenize()?;
        Parser::new(tokens).parse()
    }

    #[test]
    fn test_parse_create_table() {
        let statement =
            parse("CREATE TABLE users (id Int, name String) PRIMARY KEY id").unwrap();

        match statement {
            Statement::CreateTable(ct) => {
                assert_eq!(ct.table, "users");
                assert_eq!(ct.columns.len(), 2);
                assert_eq!(ct.columns[0].name, "id");
                assert_eq!(ct.columns[0].data_type, DataType::Int);
                assert_eq!(ct.columns[1].name, "name");
                assert_eq!(ct.columns[1].data_type, DataType::String);
                assert_eq!(ct.primary_key.as_deref(), Some("id"));
            }
            other => panic!("expected CreateTable, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_create_table_without_primary_key() {
        let statement = parse("CREATE TABLE logs (msg String)").unwrap();
        match statement {
            Statement::CreateTable(ct) => assert_eq!(ct.primary_key, None),
            other => panic!("expected CreateTable, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_create_table_bad_type() {
        assert!(matches!(
            parse("CREATE TABLE users (id Serial)"),
            Err(DbError::InvalidDefinition(_))
        ));
    }

    #[test]
    fn test_parse_insert() {
        let statement = parse("INSERT INTO users VALUES (1, 'a', 2.5, TRUE)").unwrap();
        assert_eq!(
            statement,
            Statement::Insert(Insert {
                table: "users".into(),
                values: vec![
                    Value::Int(1),
                    Value::String("a".into()),
                    Value::Float(2.5),
                    Value::Bool(true),
                ],
            })
        );
    }

    #[test]
    fn test_parse_select_star() {
        let statement = parse("SELECT * FROM users").unwrap();
        assert_eq!(
            statement,
            Statement::Select(Select {
                table: "users".into(),
                columns: ColumnsSelect::Star,
                filter: None,
            })
        );
    }

    #[test]
    fn test_parse_select_with_where() {
        let statement = parse("SELECT id, name FROM users WHERE age >= 18").unwrap();
        assert_eq!(
            statement,
            Statement::Select(Select {
                table: "users".into(),
                columns: ColumnsSelect::Names(vec!["id".into(), "name".into()]),
                filter: Some(Condition::new("age", CompareOp::GtEq, Value::Int(18))),
            })
        );
    }

    #[test]
    fn test_parse_update() {
        let statement = parse("UPDATE users SET name = 'z', age = 31 WHERE id = 1").unwrap();
        assert_eq!(
            statement,
            Statement::Update(Update {
                table: "users".into(),
                assignments: vec![
                    ("name".into(), Value::String("z".into())),
                    ("age".into(), Value::Int(31)),
                ],
                filter: Condition::new("id", CompareOp::Eq, Value::Int(1)),
            })
        );
    }

    #[test]
    fn test_parse_update_requires_where() {
        assert!(matches!(
            parse("UPDATE users SET name = 'z'"),
            Err(DbError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_delete() {
        let statement = parse("DELETE FROM users WHERE id != 3").unwrap();
        assert_eq!(
            statement,
            Statement::Delete(Delete {
                table: "users".into(),
                filter: Condition::new("id", CompareOp::NotEq, Value::Int(3)),
            })
        );
    }

    #[test]
    fn test_parse_delete_requires_where() {
        assert!(matches!(
            parse("DELETE FROM users"),
            Err(DbError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_join() {
        let statement = parse("JOIN users, orders ON id").unwrap();
        assert_eq!(
            statement,
            Statement::Join(Join {
                left: "users".into(),
                right: "orders".into(),
                on_column: "id".into(),
            })
        );
    }

    #[test]
    fn test_parse_drop_table() {
        let statement = parse("DROP TABLE users;").unwrap();
        assert_eq!(statement, Statement::DropTable("users".into()));
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        assert!(matches!(
            parse("DROP TABLE users garbage"),
            Err(DbError::Parse(_))
        ));
    }
}
