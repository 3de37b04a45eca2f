//! Calc - 제한된 산술 식 평가기
//!
//! 호스트 언어 eval 없이 직접 파싱한 트리만 평가한다.
//! 허용: 숫자, `+ - * / // % **`, 괄호, 상수 `pi` `e`,
//! 함수 `sin cos tan sqrt log exp max min abs`.
//!
//! 모든 실패는 `Error::Evaluation`으로 보고되며 메시지는 그대로
//! 클라이언트 응답의 `error`에 들어간다.

mod lexer;
mod parser;

use parser::{parse, BinaryOp, Expr, UnaryOp};
use tiercache_foundation::{Error, Result};

/// 식을 평가해 f64로 반환
///
/// ```ignore
/// assert_eq!(calc::evaluate("1+2")?, 3.0);
/// ```
pub fn evaluate(expr: &str) -> Result<f64> {
    let tree = parse(expr)?;
    let value = eval(&tree)?;
    if !value.is_finite() {
        return Err(range_error());
    }
    Ok(value)
}

fn eval(expr: &Expr) -> Result<f64> {
    match expr {
        Expr::Number(value) => Ok(*value),
        Expr::Symbol(name) => constant(name),
        Expr::Unary(op, operand) => {
            let value = eval(operand)?;
            Ok(match op {
                UnaryOp::Plus => value,
                UnaryOp::Neg => -value,
            })
        }
        Expr::Binary(op, left, right) => binary(*op, eval(left)?, eval(right)?),
        Expr::Call(name, args) => call(name, args),
    }
}

fn constant(name: &str) -> Result<f64> {
    match name {
        "pi" => Ok(std::f64::consts::PI),
        "e" => Ok(std::f64::consts::E),
        _ => Err(Error::Evaluation(format!("unknown symbol {}", name))),
    }
}

fn binary(op: BinaryOp, a: f64, b: f64) -> Result<f64> {
    match op {
        BinaryOp::Add => Ok(a + b),
        BinaryOp::Sub => Ok(a - b),
        BinaryOp::Mul => Ok(a * b),
        BinaryOp::Div => {
            if b == 0.0 {
                return Err(zero_division());
            }
            Ok(a / b)
        }
        BinaryOp::FloorDiv => floor_div(a, b),
        BinaryOp::Mod => floor_mod(a, b),
        BinaryOp::Pow => power(a, b),
    }
}

/// 나머지: 부호는 제수를 따른다 (`-7 % 3 == 2`, `7 % -3 == -2`)
fn floor_mod(a: f64, b: f64) -> Result<f64> {
    if b == 0.0 {
        return Err(zero_division());
    }
    let m = a % b;
    if m != 0.0 {
        if (b < 0.0) != (m < 0.0) {
            return Ok(m + b);
        }
        Ok(m)
    } else {
        Ok(0.0_f64.copysign(b))
    }
}

/// 내림 나눗셈 (`-7 // 2 == -4`)
fn floor_div(a: f64, b: f64) -> Result<f64> {
    if b == 0.0 {
        return Err(zero_division());
    }
    let m = a % b;
    let mut div = (a - m) / b;
    if m != 0.0 && ((b < 0.0) != (m < 0.0)) {
        div -= 1.0;
    }
    if div == 0.0 {
        return Ok(0.0_f64.copysign(a / b));
    }
    let floored = div.floor();
    if div - floored > 0.5 {
        return Ok(floored + 1.0);
    }
    Ok(floored)
}

fn power(base: f64, exponent: f64) -> Result<f64> {
    if base == 0.0 && exponent < 0.0 {
        return Err(Error::Evaluation(
            "0.0 cannot be raised to a negative power".to_string(),
        ));
    }
    let value = base.powf(exponent);
    if value.is_nan() {
        return Err(domain_error());
    }
    if value.is_infinite() && base.is_finite() && exponent.is_finite() {
        return Err(range_error());
    }
    Ok(value)
}

fn call(name: &str, args: &[Expr]) -> Result<f64> {
    // 함수 이름을 인자보다 먼저 검사
    let function = Function::lookup(name)
        .ok_or_else(|| Error::Evaluation("illegal function call".to_string()))?;

    let values = args.iter().map(eval).collect::<Result<Vec<_>>>()?;
    function.apply(&values)
}

#[derive(Debug, Clone, Copy)]
enum Function {
    Sin,
    Cos,
    Tan,
    Sqrt,
    Log,
    Exp,
    Max,
    Min,
    Abs,
}

impl Function {
    fn lookup(name: &str) -> Option<Self> {
        Some(match name {
            "sin" => Function::Sin,
            "cos" => Function::Cos,
            "tan" => Function::Tan,
            "sqrt" => Function::Sqrt,
            "log" => Function::Log,
            "exp" => Function::Exp,
            "max" => Function::Max,
            "min" => Function::Min,
            "abs" => Function::Abs,
            _ => return None,
        })
    }

    fn name(self) -> &'static str {
        match self {
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Sqrt => "sqrt",
            Function::Log => "log",
            Function::Exp => "exp",
            Function::Max => "max",
            Function::Min => "min",
            Function::Abs => "abs",
        }
    }

    fn apply(self, args: &[f64]) -> Result<f64> {
        match self {
            Function::Sin => self.unary(args, |x| finite_input(x).map(f64::sin)),
            Function::Cos => self.unary(args, |x| finite_input(x).map(f64::cos)),
            Function::Tan => self.unary(args, |x| finite_input(x).map(f64::tan)),
            Function::Sqrt => self.unary(args, |x| {
                if x < 0.0 {
                    return Err(domain_error());
                }
                Ok(x.sqrt())
            }),
            Function::Exp => self.unary(args, |x| {
                let value = x.exp();
                if value.is_infinite() && x.is_finite() {
                    return Err(range_error());
                }
                Ok(value)
            }),
            Function::Abs => self.unary(args, |x| Ok(x.abs())),
            Function::Log => match args {
                [x] => ln(*x),
                [x, base] => {
                    let num = ln(*x)?;
                    let den = ln(*base)?;
                    if den == 0.0 {
                        return Err(zero_division());
                    }
                    Ok(num / den)
                }
                _ => Err(Error::Evaluation(format!(
                    "log expected 1 or 2 arguments, got {}",
                    args.len()
                ))),
            },
            Function::Max | Function::Min => {
                let (first, rest) = args.split_first().ok_or_else(|| {
                    Error::Evaluation(format!(
                        "{} expected at least 1 argument, got 0",
                        self.name()
                    ))
                })?;
                Ok(rest.iter().fold(*first, |acc, &x| match self {
                    Function::Max if x > acc => x,
                    Function::Min if x < acc => x,
                    _ => acc,
                }))
            }
        }
    }

    fn unary(self, args: &[f64], f: impl Fn(f64) -> Result<f64>) -> Result<f64> {
        match args {
            [x] => f(*x),
            _ => Err(Error::Evaluation(format!(
                "{}() takes exactly one argument ({} given)",
                self.name(),
                args.len()
            ))),
        }
    }
}

fn ln(x: f64) -> Result<f64> {
    if x <= 0.0 {
        return Err(domain_error());
    }
    Ok(x.ln())
}

fn finite_input(x: f64) -> Result<f64> {
    if x.is_infinite() {
        return Err(domain_error());
    }
    Ok(x)
}

fn zero_division() -> Error {
    Error::Evaluation("float division by zero".to_string())
}

fn domain_error() -> Error {
    Error::Evaluation("math domain error".to_string())
}

fn range_error() -> Error {
    Error::Evaluation("math range error".to_string())
}
