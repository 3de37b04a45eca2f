//! Recursive descent parser producing an expression tree
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := unary (('*' | '/' | '//' | '%') unary)*
//! unary  := ('+' | '-') unary | power
//! power  := atom ('**' unary)?
//! atom   := NUMBER | IDENT | IDENT '(' args? ')' | '(' expr ')'
//! ```
//!
//! `power`의 오른쪽이 `unary`이므로 `**`는 오른쪽 결합이고
//! 왼쪽의 단항 마이너스보다 강하게 묶인다 (`-2**2 == -4`, `2**-1 == 0.5`).
//!
//! 괄호, 단항 연산자, `**` 중첩과 이항 연산자 체인은 모두 [`MAX_DEPTH`]로
//! 제한된다. 파서와 평가기가 재귀하므로 트리 깊이가 곧 스택 사용량이다.

use super::lexer::{tokenize, Spanned, Token};
use tiercache_foundation::{Error, Result};

/// 허용하는 최대 중첩 깊이
pub(crate) const MAX_DEPTH: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnaryOp {
    Plus,
    Neg,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Number(f64),
    Symbol(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Call(String, Vec<Expr>),
}

pub(crate) fn parse(input: &str) -> Result<Expr> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        end: input.chars().count(),
        depth: 0,
    };

    let expr = parser.expr()?;
    if let Some((token, at)) = parser.tokens.get(parser.pos) {
        return Err(syntax(format!(
            "unexpected '{}' at position {}",
            token.describe(),
            at
        )));
    }
    Ok(expr)
}

fn syntax(detail: String) -> Error {
    Error::Evaluation(format!("invalid syntax: {}", detail))
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    /// 입력 길이 (EOF 위치 보고용)
    end: usize,
    /// 현재 중첩 깊이
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn advance(&mut self) -> Option<Spanned> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        match self.advance() {
            Some((token, _)) if token == expected => Ok(()),
            Some((token, at)) => Err(syntax(format!(
                "expected '{}' but found '{}' at position {}",
                expected.describe(),
                token.describe(),
                at
            ))),
            None => Err(syntax(format!(
                "expected '{}' at end of input",
                expected.describe()
            ))),
        }
    }

    /// 깊이를 하나 늘린다. 실패하면 파싱 전체가 중단되므로 복원하지 않는다.
    fn enter(&mut self) -> Result<()> {
        if self.depth >= MAX_DEPTH {
            return Err(syntax("expression nested too deeply".to_string()));
        }
        self.depth += 1;
        Ok(())
    }

    fn expr(&mut self) -> Result<Expr> {
        let start = self.depth;
        let mut left = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => {
                    self.depth = start;
                    return Ok(left);
                }
            };
            self.pos += 1;
            // 왼쪽으로 깊어지는 체인
            self.enter()?;
            let right = self.term()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn term(&mut self) -> Result<Expr> {
        let start = self.depth;
        let mut left = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::DoubleSlash) => BinaryOp::FloorDiv,
                Some(Token::Percent) => BinaryOp::Mod,
                _ => {
                    self.depth = start;
                    return Ok(left);
                }
            };
            self.pos += 1;
            self.enter()?;
            let right = self.unary()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn unary(&mut self) -> Result<Expr> {
        let op = if self.eat(&Token::Minus) {
            UnaryOp::Neg
        } else if self.eat(&Token::Plus) {
            UnaryOp::Plus
        } else {
            return self.power();
        };
        self.enter()?;
        let operand = self.unary()?;
        self.depth -= 1;
        Ok(Expr::Unary(op, Box::new(operand)))
    }

    fn power(&mut self) -> Result<Expr> {
        let base = self.atom()?;
        if self.eat(&Token::DoubleStar) {
            self.enter()?;
            let exponent = self.unary()?;
            self.depth -= 1;
            return Ok(Expr::Binary(BinaryOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Expr> {
        match self.advance() {
            Some((Token::Number(value), _)) => Ok(Expr::Number(value)),
            Some((Token::Ident(name), _)) => {
                if self.eat(&Token::LParen) {
                    self.enter()?;
                    let args = self.arguments()?;
                    self.depth -= 1;
                    Ok(Expr::Call(name, args))
                } else {
                    Ok(Expr::Symbol(name))
                }
            }
            Some((Token::LParen, _)) => {
                self.enter()?;
                let inner = self.expr()?;
                self.expect(Token::RParen)?;
                self.depth -= 1;
                Ok(inner)
            }
            Some((token, at)) => Err(syntax(format!(
                "unexpected '{}' at position {}",
                token.describe(),
                at
            ))),
            None => Err(syntax(format!("unexpected end of input at position {}", self.end))),
        }
    }

    /// 여는 괄호 다음부터 닫는 괄호까지
    fn arguments(&mut self) -> Result<Vec<Expr>> {
        let mut args = Vec::new();
        if self.eat(&Token::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.expr()?);
            if self.eat(&Token::Comma) {
                // trailing comma 허용: f(1, 2,)
                if self.eat(&Token::RParen) {
                    return Ok(args);
                }
                continue;
            }
            self.expect(Token::RParen)?;
            return Ok(args);
        }
    }
}
