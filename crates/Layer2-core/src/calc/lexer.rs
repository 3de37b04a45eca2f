//! Tokenizer for arithmetic expressions

use tiercache_foundation::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,
    LParen,
    RParen,
    Comma,
}

impl Token {
    pub(crate) fn describe(&self) -> String {
        match self {
            Token::Number(n) => n.to_string(),
            Token::Ident(name) => name.clone(),
            Token::Plus => "+".into(),
            Token::Minus => "-".into(),
            Token::Star => "*".into(),
            Token::DoubleStar => "**".into(),
            Token::Slash => "/".into(),
            Token::DoubleSlash => "//".into(),
            Token::Percent => "%".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),
            Token::Comma => ",".into(),
        }
    }
}

/// 토큰과 시작 위치(문자 인덱스)
pub(crate) type Spanned = (Token, usize);

pub(crate) fn tokenize(input: &str) -> Result<Vec<Spanned>> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let start = i;

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_digit() || (c == '.' && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit())) {
            let (value, next) = read_number(&chars, i)?;
            tokens.push((Token::Number(value), start));
            i = next;
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let name: String = chars[start..i].iter().collect();
            tokens.push((Token::Ident(name), start));
            continue;
        }

        let next = chars.get(i + 1).copied();
        let (token, width) = match (c, next) {
            ('*', Some('*')) => (Token::DoubleStar, 2),
            ('/', Some('/')) => (Token::DoubleSlash, 2),
            ('+', _) => (Token::Plus, 1),
            ('-', _) => (Token::Minus, 1),
            ('*', _) => (Token::Star, 1),
            ('/', _) => (Token::Slash, 1),
            ('%', _) => (Token::Percent, 1),
            ('(', _) => (Token::LParen, 1),
            (')', _) => (Token::RParen, 1),
            (',', _) => (Token::Comma, 1),
            _ => {
                return Err(Error::Evaluation(format!(
                    "invalid syntax: unexpected character '{}' at position {}",
                    c, start
                )))
            }
        };
        tokens.push((token, start));
        i += width;
    }

    Ok(tokens)
}

/// `1`, `2.5`, `.5`, `1.`, `1e3`, `2.5E-3`
fn read_number(chars: &[char], start: usize) -> Result<(f64, usize)> {
    let mut i = start;
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    if i < chars.len() && chars[i] == '.' {
        i += 1;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
        let mut j = i + 1;
        if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
            j += 1;
        }
        if j < chars.len() && chars[j].is_ascii_digit() {
            while j < chars.len() && chars[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        } else {
            return Err(Error::Evaluation(format!(
                "invalid syntax: malformed number at position {}",
                start
            )));
        }
    }

    let literal: String = chars[start..i].iter().collect();
    literal
        .parse::<f64>()
        .map(|v| (v, i))
        .map_err(|_| {
            Error::Evaluation(format!(
                "invalid syntax: malformed number '{}' at position {}",
                literal, start
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        tokenize(input).unwrap().into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("1 2.5 .5 1. 1e3 2E-2"),
            vec![
                Token::Number(1.0),
                Token::Number(2.5),
                Token::Number(0.5),
                Token::Number(1.0),
                Token::Number(1000.0),
                Token::Number(0.02),
            ]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("2**3//4%5/6*-+"),
            vec![
                Token::Number(2.0),
                Token::DoubleStar,
                Token::Number(3.0),
                Token::DoubleSlash,
                Token::Number(4.0),
                Token::Percent,
                Token::Number(5.0),
                Token::Slash,
                Token::Number(6.0),
                Token::Star,
                Token::Minus,
                Token::Plus,
            ]
        );
    }

    #[test]
    fn test_identifiers_and_calls() {
        assert_eq!(
            kinds("log(x, 2)"),
            vec![
                Token::Ident("log".into()),
                Token::LParen,
                Token::Ident("x".into()),
                Token::Comma,
                Token::Number(2.0),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn test_rejects_unknown_characters() {
        let err = tokenize("1 < 2").unwrap_err();
        assert!(err.to_string().contains("unexpected character '<'"));
        assert!(tokenize("2e").is_err());
        assert!(tokenize("'a'").is_err());
    }
}
