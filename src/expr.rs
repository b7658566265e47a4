//! Numeric expression engine for function plots.
//!
//! Expressions are single-variable (`x`) and compiled once into a small tree
//! that is evaluated per sample. Supported syntax: `+ - * / % ^` (`**` is an
//! alias for `^`), unary minus, parentheses, implicit multiplication (`2x`,
//! `3(x + 1)`, `(x - 1)(x + 1)`), the constants `pi` and `e`, and the
//! functions listed in [`Function`].

use thiserror::Error;

/// Bounds the height of the compiled tree, which is evaluated and dropped
/// recursively.
const MAX_TOKENS: usize = 1024;
const MAX_NESTING: usize = 256;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error("empty expression")]
    Empty,
    #[error("unexpected character '{ch}' at {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("unexpected {found} at {pos}")]
    UnexpectedToken { found: String, pos: usize },
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),
    #[error("unknown function '{0}'")]
    UnknownFunction(String),
    #[error("expression nests deeper than {max} levels")]
    TooDeep { max: usize },
    #[error("expression has more than {max} tokens")]
    TooLong { max: usize },
    #[error("{name} expects {expected} argument(s), got {found}")]
    Arity {
        name: &'static str,
        expected: &'static str,
        found: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Sqrt,
    Cbrt,
    Abs,
    Exp,
    Ln,
    Log10,
    Log2,
    Floor,
    Ceil,
    Round,
    Sign,
    Min,
    Max,
    Pow,
}

impl Function {
    fn lookup(name: &str) -> Option<Self> {
        let function = match name {
            "sin" => Self::Sin,
            "cos" => Self::Cos,
            "tan" => Self::Tan,
            "asin" | "arcsin" => Self::Asin,
            "acos" | "arccos" => Self::Acos,
            "atan" | "arctan" => Self::Atan,
            "sinh" => Self::Sinh,
            "cosh" => Self::Cosh,
            "tanh" => Self::Tanh,
            "sqrt" => Self::Sqrt,
            "cbrt" => Self::Cbrt,
            "abs" => Self::Abs,
            "exp" => Self::Exp,
            "ln" | "log" => Self::Ln,
            "log10" => Self::Log10,
            "log2" => Self::Log2,
            "floor" => Self::Floor,
            "ceil" => Self::Ceil,
            "round" => Self::Round,
            "sign" | "sgn" => Self::Sign,
            "min" => Self::Min,
            "max" => Self::Max,
            "pow" => Self::Pow,
            _ => return None,
        };
        Some(function)
    }

    fn name(self) -> &'static str {
        match self {
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Asin => "asin",
            Self::Acos => "acos",
            Self::Atan => "atan",
            Self::Sinh => "sinh",
            Self::Cosh => "cosh",
            Self::Tanh => "tanh",
            Self::Sqrt => "sqrt",
            Self::Cbrt => "cbrt",
            Self::Abs => "abs",
            Self::Exp => "exp",
            Self::Ln => "ln",
            Self::Log10 => "log10",
            Self::Log2 => "log2",
            Self::Floor => "floor",
            Self::Ceil => "ceil",
            Self::Round => "round",
            Self::Sign => "sign",
            Self::Min => "min",
            Self::Max => "max",
            Self::Pow => "pow",
        }
    }

    fn check_arity(self, found: usize) -> Result<(), ExprError> {
        let (ok, expected) = match self {
            Self::Min | Self::Max => (found >= 1, "at least 1"),
            Self::Pow => (found == 2, "2"),
            _ => (found == 1, "1"),
        };
        if ok {
            Ok(())
        } else {
            Err(ExprError::Arity {
                name: self.name(),
                expected,
                found,
            })
        }
    }

    fn apply(self, args: &[f64]) -> f64 {
        let a = args.first().copied().unwrap_or(f64::NAN);
        match self {
            Self::Sin => a.sin(),
            Self::Cos => a.cos(),
            Self::Tan => a.tan(),
            Self::Asin => a.asin(),
            Self::Acos => a.acos(),
            Self::Atan => a.atan(),
            Self::Sinh => a.sinh(),
            Self::Cosh => a.cosh(),
            Self::Tanh => a.tanh(),
            Self::Sqrt => a.sqrt(),
            Self::Cbrt => a.cbrt(),
            Self::Abs => a.abs(),
            Self::Exp => a.exp(),
            Self::Ln => a.ln(),
            Self::Log10 => a.log10(),
            Self::Log2 => a.log2(),
            Self::Floor => a.floor(),
            Self::Ceil => a.ceil(),
            Self::Round => a.round(),
            Self::Sign => {
                if a == 0.0 || a.is_nan() {
                    a
                } else {
                    a.signum()
                }
            }
            Self::Min => args.iter().copied().fold(f64::INFINITY, f64::min),
            Self::Max => args.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Self::Pow => a.powf(args.get(1).copied().unwrap_or(f64::NAN)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

#[derive(Debug, Clone, PartialEq)]
enum Ast {
    Number(f64),
    Variable,
    Negate(Box<Ast>),
    Binary(BinaryOp, Box<Ast>, Box<Ast>),
    Call(Function, Vec<Ast>),
}

impl Ast {
    fn eval(&self, x: f64) -> f64 {
        match self {
            Ast::Number(value) => *value,
            Ast::Variable => x,
            Ast::Negate(inner) => -inner.eval(x),
            Ast::Binary(op, lhs, rhs) => {
                let a = lhs.eval(x);
                let b = rhs.eval(x);
                match op {
                    BinaryOp::Add => a + b,
                    BinaryOp::Sub => a - b,
                    BinaryOp::Mul => a * b,
                    BinaryOp::Div => a / b,
                    BinaryOp::Rem => a % b,
                    BinaryOp::Pow => a.powf(b),
                }
            }
            Ast::Call(function, args) => {
                let values: Vec<f64> = args.iter().map(|arg| arg.eval(x)).collect();
                function.apply(&values)
            }
        }
    }
}

/// A compiled single-variable expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    root: Ast,
}

impl Expression {
    pub fn compile(source: &str) -> Result<Self, ExprError> {
        let tokens = tokenize(source)?;
        if tokens.is_empty() {
            return Err(ExprError::Empty);
        }
        if tokens.len() > MAX_TOKENS {
            return Err(ExprError::TooLong { max: MAX_TOKENS });
        }
        let mut parser = Parser {
            tokens,
            pos: 0,
            depth: 0,
        };
        let root = parser.expression()?;
        if let Some(token) = parser.peek() {
            return Err(ExprError::UnexpectedToken {
                found: token.kind.describe(),
                pos: token.pos,
            });
        }
        Ok(Self {
            source: source.trim().to_string(),
            root,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluates at `x`. Domain errors come back as NaN or infinities.
    pub fn eval(&self, x: f64) -> f64 {
        self.root.eval(x)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    LParen,
    RParen,
    Comma,
}

impl TokenKind {
    fn describe(&self) -> String {
        match self {
            TokenKind::Number(value) => format!("number {value}"),
            TokenKind::Ident(name) => format!("'{name}'"),
            TokenKind::Plus => "'+'".to_string(),
            TokenKind::Minus => "'-'".to_string(),
            TokenKind::Star => "'*'".to_string(),
            TokenKind::Slash => "'/'".to_string(),
            TokenKind::Percent => "'%'".to_string(),
            TokenKind::Caret => "'^'".to_string(),
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
            TokenKind::Comma => "','".to_string(),
        }
    }

    fn starts_operand(&self) -> bool {
        matches!(
            self,
            TokenKind::Number(_) | TokenKind::Ident(_) | TokenKind::LParen
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Token {
    kind: TokenKind,
    pos: usize,
}

fn tokenize(source: &str) -> Result<Vec<Token>, ExprError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut idx = 0;

    while idx < chars.len() {
        let ch = chars[idx];
        let start = idx;
        if ch.is_whitespace() {
            idx += 1;
            continue;
        }
        if ch.is_ascii_digit() || (ch == '.' && chars.get(idx + 1).is_some_and(char::is_ascii_digit)) {
            while idx < chars.len() && (chars[idx].is_ascii_digit() || chars[idx] == '.') {
                idx += 1;
            }
            if idx < chars.len() && (chars[idx] == 'e' || chars[idx] == 'E') {
                let mut look = idx + 1;
                if look < chars.len() && (chars[look] == '+' || chars[look] == '-') {
                    look += 1;
                }
                if look < chars.len() && chars[look].is_ascii_digit() {
                    idx = look;
                    while idx < chars.len() && chars[idx].is_ascii_digit() {
                        idx += 1;
                    }
                }
            }
            let text: String = chars[start..idx].iter().collect();
            let value = text
                .parse::<f64>()
                .map_err(|_| ExprError::UnexpectedChar { ch, pos: start })?;
            tokens.push(Token {
                kind: TokenKind::Number(value),
                pos: start,
            });
            continue;
        }
        if ch.is_alphabetic() || ch == '_' {
            while idx < chars.len() && (chars[idx].is_alphanumeric() || chars[idx] == '_') {
                idx += 1;
            }
            let name: String = chars[start..idx].iter().collect();
            tokens.push(Token {
                kind: TokenKind::Ident(name),
                pos: start,
            });
            continue;
        }
        let kind = match ch {
            '+' => TokenKind::Plus,
            '-' | '−' => TokenKind::Minus,
            '*' if chars.get(idx + 1) == Some(&'*') => {
                idx += 1;
                TokenKind::Caret
            }
            '*' | '×' | '·' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '^' => TokenKind::Caret,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            other => return Err(ExprError::UnexpectedChar { ch: other, pos: start }),
        };
        idx += 1;
        tokens.push(Token { kind, pos: start });
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|token| &token.kind)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), ExprError> {
        match self.advance() {
            Some(token) if token.kind == kind => Ok(()),
            Some(token) => Err(ExprError::UnexpectedToken {
                found: token.kind.describe(),
                pos: token.pos,
            }),
            None => Err(ExprError::UnexpectedEnd),
        }
    }

    fn expression(&mut self) -> Result<Ast, ExprError> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Plus) => BinaryOp::Add,
                Some(TokenKind::Minus) => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Ast::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn term(&mut self) -> Result<Ast, ExprError> {
        let mut lhs = self.unary()?;
        loop {
            let (op, rhs) = match self.peek_kind() {
                Some(TokenKind::Star) => {
                    self.pos += 1;
                    (BinaryOp::Mul, self.unary()?)
                }
                Some(TokenKind::Slash) => {
                    self.pos += 1;
                    (BinaryOp::Div, self.unary()?)
                }
                Some(TokenKind::Percent) => {
                    self.pos += 1;
                    (BinaryOp::Rem, self.unary()?)
                }
                Some(kind) if kind.starts_operand() => (BinaryOp::Mul, self.power()?),
                _ => return Ok(lhs),
            };
            lhs = Ast::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    // Every recursive path passes through here.
    fn unary(&mut self) -> Result<Ast, ExprError> {
        if self.depth >= MAX_NESTING {
            return Err(ExprError::TooDeep { max: MAX_NESTING });
        }
        self.depth += 1;
        let result = self.signed();
        self.depth -= 1;
        result
    }

    fn signed(&mut self) -> Result<Ast, ExprError> {
        match self.peek_kind() {
            Some(TokenKind::Minus) => {
                self.pos += 1;
                Ok(Ast::Negate(Box::new(self.unary()?)))
            }
            Some(TokenKind::Plus) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Ast, ExprError> {
        let base = self.primary()?;
        if self.peek_kind() == Some(&TokenKind::Caret) {
            self.pos += 1;
            let exponent = self.unary()?;
            return Ok(Ast::Binary(BinaryOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Ast, ExprError> {
        let token = self.advance().ok_or(ExprError::UnexpectedEnd)?;
        match token.kind {
            TokenKind::Number(value) => Ok(Ast::Number(value)),
            TokenKind::LParen => {
                let inner = self.expression()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::Ident(name) => self.identifier(name),
            other => Err(ExprError::UnexpectedToken {
                found: other.describe(),
                pos: token.pos,
            }),
        }
    }

    fn identifier(&mut self, name: String) -> Result<Ast, ExprError> {
        let lower = name.to_ascii_lowercase();
        if self.peek_kind() == Some(&TokenKind::LParen) {
            if let Some(function) = Function::lookup(&lower) {
                self.pos += 1;
                let args = self.arguments()?;
                function.check_arity(args.len())?;
                return Ok(Ast::Call(function, args));
            }
        }
        match lower.as_str() {
            "x" => Ok(Ast::Variable),
            "pi" | "π" => Ok(Ast::Number(std::f64::consts::PI)),
            "e" => Ok(Ast::Number(std::f64::consts::E)),
            "tau" => Ok(Ast::Number(std::f64::consts::TAU)),
            _ if Function::lookup(&lower).is_some() => Err(match self.peek() {
                Some(token) => ExprError::UnexpectedToken {
                    found: token.kind.describe(),
                    pos: token.pos,
                },
                None => ExprError::UnexpectedEnd,
            }),
            _ => Err(ExprError::UnknownVariable(name)),
        }
    }

    fn arguments(&mut self) -> Result<Vec<Ast>, ExprError> {
        let mut args = Vec::new();
        if self.peek_kind() == Some(&TokenKind::RParen) {
            self.pos += 1;
            return Ok(args);
        }
        loop {
            args.push(self.expression()?);
            match self.advance() {
                Some(Token {
                    kind: TokenKind::Comma,
                    ..
                }) => continue,
                Some(Token {
                    kind: TokenKind::RParen,
                    ..
                }) => return Ok(args),
                Some(token) => {
                    return Err(ExprError::UnexpectedToken {
                        found: token.kind.describe(),
                        pos: token.pos,
                    });
                }
                None => return Err(ExprError::UnexpectedEnd),
            }
        }
    }
}
