use crate::error::Result;
use crate::traits::{Tool, ToolOutput};
use async_trait::async_trait;
use chefbot_core::{Context, ToolDefinition, ToolParameter};
use serde::Deserialize;
use serde_json::Value;

pub const INVALID_EXPRESSION: &str = "Invalid expression";

const ALLOWED: &str = "0123456789+-*/.() ";

pub struct CalculateTool {
    def: ToolDefinition,
}

impl CalculateTool {
    pub fn new() -> Self {
        let def = ToolDefinition::new("calculate", "Evaluate a math expression.").with_required_param(
            "expression",
            ToolParameter::string().with_description("Math expression like '18 + 16 + 7'"),
        );
        Self { def }
    }
}

impl Default for CalculateTool {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Deserialize)]
struct CalculateInput {
    expression: String,
}

#[async_trait]
impl Tool for CalculateTool {
    fn definition(&self) -> &ToolDefinition {
        &self.def
    }

    async fn execute(&self, _ctx: &Context, input: Value) -> Result<ToolOutput> {
        let input: CalculateInput = serde_json::from_value(input)?;
        let text = match evaluate(&input.expression) {
            Some(value) => format_number(value),
            None => INVALID_EXPRESSION.to_string(),
        };
        Ok(ToolOutput::text(text))
    }
}

/// Evaluates `+ - * / // ** ( )` arithmetic over decimal literals.
/// Returns `None` for disallowed characters, syntax errors, division by
/// zero and non-finite results.
pub fn evaluate(expression: &str) -> Option<f64> {
    if !expression.chars().all(|c| ALLOWED.contains(c)) {
        return None;
    }
    let tokens = tokenize(expression)?;
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expr()?;
    if parser.pos != parser.tokens.len() || !value.is_finite() {
        return None;
    }
    Some(value)
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Token {
    Num(f64),
    Plus,
    Minus,
    Star,
    Slash,
    FloorDiv,
    Pow,
    LParen,
    RParen,
}

fn tokenize(s: &str) -> Option<Vec<Token>> {
    let chars: Vec<char> = s.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match c {
            ' ' => {}
            '+' => tokens.push(Token::Plus),
            '-' => tokens.push(Token::Minus),
            '*' if next == Some('*') => {
                tokens.push(Token::Pow);
                i += 1;
            }
            '*' => tokens.push(Token::Star),
            '/' if next == Some('/') => {
                tokens.push(Token::FloorDiv);
                i += 1;
            }
            '/' => tokens.push(Token::Slash),
            '(' => tokens.push(Token::LParen),
            ')' => tokens.push(Token::RParen),
            _ => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                if literal.is_empty() || literal == "." || literal.matches('.').count() > 1 {
                    return None;
                }
                tokens.push(Token::Num(literal.parse().ok()?));
                continue;
            }
        }
        i += 1;
    }
    Some(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<Token> {
        let t = self.peek();
        self.pos += 1;
        t
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Option<f64> {
        let mut value = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == Token::Plus { value + rhs } else { value - rhs };
        }
        Some(value)
    }

    // term := unary (('*' | '/' | '//') unary)*
    fn term(&mut self) -> Option<f64> {
        let mut value = self.unary()?;
        while let Some(op @ (Token::Star | Token::Slash | Token::FloorDiv)) = self.peek() {
            self.pos += 1;
            let rhs = self.unary()?;
            value = match op {
                Token::Star => value * rhs,
                _ if rhs == 0.0 => return None,
                Token::Slash => value / rhs,
                _ => (value / rhs).floor(),
            };
        }
        Some(value)
    }

    // unary := ('+' | '-') unary | power
    fn unary(&mut self) -> Option<f64> {
        match self.peek()? {
            Token::Plus => {
                self.pos += 1;
                self.unary()
            }
            Token::Minus => {
                self.pos += 1;
                self.unary().map(|v| -v)
            }
            _ => self.power(),
        }
    }

    // power := atom ('**' unary)?
    fn power(&mut self) -> Option<f64> {
        let base = self.atom()?;
        if self.peek() == Some(Token::Pow) {
            self.pos += 1;
            let exp = self.unary()?;
            if base == 0.0 && exp < 0.0 {
                return None;
            }
            return Some(base.powf(exp));
        }
        Some(base)
    }

    fn atom(&mut self) -> Option<f64> {
        match self.bump()? {
            Token::Num(n) => Some(n),
            Token::LParen => {
                let value = self.expr()?;
                (self.bump()? == Token::RParen).then_some(value)
            }
            _ => None,
        }
    }
}
