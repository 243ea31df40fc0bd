//! Small boolean expression language for `if` conditions
//!
//! ```text
//! expr    := and ( "||" and )*
//! and     := eq ( "&&" eq )*
//! eq      := unary ( ("==" | "!=") unary )?
//! unary   := "!" unary | primary
//! primary := literal | identifier | "(" expr ")"
//! ```
//!
//! Identifiers: `platform`, `env.NAME`, `item.<field>.<field>`. Anything
//! else evaluates to null.

use serde_json::Value;

use crate::domain::ports::{ConditionContext, ConditionEvaluator};
use crate::error::{SyncError, SyncResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct ExpressionEvaluator;

impl ConditionEvaluator for ExpressionEvaluator {
    fn evaluate(&self, expression: &str, context: &ConditionContext) -> SyncResult<bool> {
        let fail = |message: String| SyncError::Condition {
            expression: expression.to_string(),
            message,
        };

        let tokens = tokenize(expression).map_err(fail)?;
        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
            context,
        };
        let value = parser.expr().map_err(fail)?;
        if parser.pos != tokens.len() {
            return Err(fail(format!("unexpected token at position {}", parser.pos)));
        }
        Ok(truthy(&value))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    LParen,
    RParen,
    Not,
    Eq,
    Ne,
    And,
    Or,
    Str(String),
    Num(f64),
    Ident(String),
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match c {
            c if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '!' if next == Some('=') => {
                tokens.push(Token::Ne);
                i += 2;
            }
            '!' => {
                tokens.push(Token::Not);
                i += 1;
            }
            '=' if next == Some('=') => {
                tokens.push(Token::Eq);
                i += 2;
            }
            '&' if next == Some('&') => {
                tokens.push(Token::And);
                i += 2;
            }
            '|' if next == Some('|') => {
                tokens.push(Token::Or);
                i += 2;
            }
            '\'' | '"' => {
                let quote = c;
                let start = i + 1;
                let end = chars[start..]
                    .iter()
                    .position(|&ch| ch == quote)
                    .map(|offset| start + offset)
                    .ok_or_else(|| "unterminated string".to_string())?;
                tokens.push(Token::Str(chars[start..end].iter().collect()));
                i = end + 1;
            }
            c if c.is_ascii_digit() => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let number = text
                    .parse::<f64>()
                    .map_err(|_| format!("invalid number '{}'", text))?;
                tokens.push(Token::Num(number));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '.')
                {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            other => return Err(format!("unexpected character '{}'", other)),
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    context: &'a ConditionContext,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expr(&mut self) -> Result<Value, String> {
        let mut left = self.and()?;
        while self.eat(&Token::Or) {
            let right = self.and()?;
            left = Value::Bool(truthy(&left) || truthy(&right));
        }
        Ok(left)
    }

    fn and(&mut self) -> Result<Value, String> {
        let mut left = self.equality()?;
        while self.eat(&Token::And) {
            let right = self.equality()?;
            left = Value::Bool(truthy(&left) && truthy(&right));
        }
        Ok(left)
    }

    fn equality(&mut self) -> Result<Value, String> {
        let left = self.unary()?;
        if self.eat(&Token::Eq) {
            let right = self.unary()?;
            return Ok(Value::Bool(loosely_equal(&left, &right)));
        }
        if self.eat(&Token::Ne) {
            let right = self.unary()?;
            return Ok(Value::Bool(!loosely_equal(&left, &right)));
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Value, String> {
        if self.eat(&Token::Not) {
            let value = self.unary()?;
            return Ok(Value::Bool(!truthy(&value)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Value, String> {
        let token = self
            .peek()
            .cloned()
            .ok_or_else(|| "unexpected end of expression".to_string())?;
        self.pos += 1;

        match token {
            Token::LParen => {
                let value = self.expr()?;
                if !self.eat(&Token::RParen) {
                    return Err("missing ')'".to_string());
                }
                Ok(value)
            }
            Token::Str(s) => Ok(Value::String(s)),
            Token::Num(n) => Ok(serde_json::Number::from_f64(n)
                .map(Value::Number)
                .unwrap_or(Value::Null)),
            Token::Ident(name) => Ok(self.lookup(&name)),
            other => Err(format!("unexpected token {:?}", other)),
        }
    }

    fn lookup(&self, name: &str) -> Value {
        match name {
            "true" => return Value::Bool(true),
            "false" => return Value::Bool(false),
            "null" => return Value::Null,
            "platform" => return Value::String(self.context.platform.clone()),
            _ => {}
        }

        if let Some(var) = name.strip_prefix("env.") {
            return std::env::var(var).map(Value::String).unwrap_or(Value::Null);
        }
        if let Some(path) = name.strip_prefix("item.") {
            let mut current = &self.context.item;
            for key in path.split('.') {
                match current.get(key) {
                    Some(next) => current = next,
                    None => return Value::Null,
                }
            }
            return current.clone();
        }
        Value::Null
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn loosely_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::String(a), Value::String(b)) => a.eq_ignore_ascii_case(b),
        _ => left == right,
    }
}
