//! 표현식 토큰화

use crate::core::errors::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Integer(i64),
    Float(f64),
    Str(String),
    Ident(String),
    /// `#name`
    Variable(String),
    True,
    False,
    Null,
    Dot,        // .
    SafeDot,    // ?.
    OpenBracket,
    CloseBracket,
    OpenParen,
    CloseParen,
    Plus,
    Minus,
    Asterisk,
    Slash,
    Percent,
    Eq,         // == eq
    NotEq,      // != ne
    Lt,         // < lt
    LtEq,       // <= le
    Gt,         // > gt
    GtEq,       // >= ge
    And,        // && and
    Or,         // || or
    Not,        // ! not
    Question,   // ?
    Colon,      // :
    Elvis,      // ?:
}

pub(crate) fn tokenize(source: &str) -> AppResult<Vec<Token>> {
    let chars: Vec<char> = source.chars().collect();
    let len = chars.len();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < len {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let next = chars.get(i + 1).copied();

        let (token, width) = match c {
            '.' => (Token::Dot, 1),
            '[' => (Token::OpenBracket, 1),
            ']' => (Token::CloseBracket, 1),
            '(' => (Token::OpenParen, 1),
            ')' => (Token::CloseParen, 1),
            '+' => (Token::Plus, 1),
            '-' => (Token::Minus, 1),
            '*' => (Token::Asterisk, 1),
            '/' => (Token::Slash, 1),
            '%' => (Token::Percent, 1),
            ':' => (Token::Colon, 1),
            '?' => match next {
                Some('.') => (Token::SafeDot, 2),
                Some(':') => (Token::Elvis, 2),
                _ => (Token::Question, 1),
            },
            '=' if next == Some('=') => (Token::Eq, 2),
            '!' if next == Some('=') => (Token::NotEq, 2),
            '!' => (Token::Not, 1),
            '<' if next == Some('=') => (Token::LtEq, 2),
            '<' => (Token::Lt, 1),
            '>' if next == Some('=') => (Token::GtEq, 2),
            '>' => (Token::Gt, 1),
            '&' if next == Some('&') => (Token::And, 2),
            '|' if next == Some('|') => (Token::Or, 2),
            '\'' | '"' => {
                let (value, end) = read_string(&chars, i)?;
                tokens.push(Token::Str(value));
                i = end;
                continue;
            }
            '#' => {
                let end = scan_identifier(&chars, i + 1);
                if end == i + 1 {
                    return Err(unexpected(c, i));
                }
                tokens.push(Token::Variable(chars[i + 1..end].iter().collect()));
                i = end;
                continue;
            }
            c if c.is_ascii_digit() => {
                let (token, end) = read_number(&chars, i)?;
                tokens.push(token);
                i = end;
                continue;
            }
            c if is_identifier_start(c) => {
                let end = scan_identifier(&chars, i);
                let word: String = chars[i..end].iter().collect();
                let after_dot = matches!(tokens.last(), Some(Token::Dot) | Some(Token::SafeDot));
                tokens.push(if after_dot { Token::Ident(word) } else { keyword_or_ident(word) });
                i = end;
                continue;
            }
            _ => return Err(unexpected(c, i)),
        };

        tokens.push(token);
        i += width;
    }

    Ok(tokens)
}

fn keyword_or_ident(word: String) -> Token {
    match word.to_ascii_lowercase().as_str() {
        "true" => Token::True,
        "false" => Token::False,
        "null" => Token::Null,
        "and" => Token::And,
        "or" => Token::Or,
        "not" => Token::Not,
        "eq" => Token::Eq,
        "ne" => Token::NotEq,
        "lt" => Token::Lt,
        "le" => Token::LtEq,
        "gt" => Token::Gt,
        "ge" => Token::GtEq,
        "div" => Token::Slash,
        "mod" => Token::Percent,
        _ => Token::Ident(word),
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn scan_identifier(chars: &[char], start: usize) -> usize {
    let mut end = start;
    while end < chars.len() && (is_identifier_start(chars[end]) || chars[end].is_ascii_digit()) {
        end += 1;
    }
    end
}

/// 같은 따옴표 두 개는 따옴표 하나로 읽습니다 (`'it''s'`).
fn read_string(chars: &[char], start: usize) -> AppResult<(String, usize)> {
    let quote = chars[start];
    let mut value = String::new();
    let mut i = start + 1;

    while i < chars.len() {
        if chars[i] == quote {
            if chars.get(i + 1) == Some(&quote) {
                value.push(quote);
                i += 2;
                continue;
            }
            return Ok((value, i + 1));
        }
        value.push(chars[i]);
        i += 1;
    }

    Err(AppError::Expression(format!("Unterminated string literal at position {}", start)))
}

fn read_number(chars: &[char], start: usize) -> AppResult<(Token, usize)> {
    let mut end = start;
    while end < chars.len() && chars[end].is_ascii_digit() {
        end += 1;
    }

    let is_float = end + 1 < chars.len() && chars[end] == '.' && chars[end + 1].is_ascii_digit();
    if is_float {
        end += 1;
        while end < chars.len() && chars[end].is_ascii_digit() {
            end += 1;
        }
    }

    let text: String = chars[start..end].iter().collect();
    let token = if is_float {
        text.parse::<f64>().map(Token::Float).map_err(|e| invalid_number(&text, e))?
    } else {
        text.parse::<i64>().map(Token::Integer).map_err(|e| invalid_number(&text, e))?
    };

    // 자바식 접미사 (10L, 1.5d)
    if end < chars.len() && matches!(chars[end], 'L' | 'l' | 'D' | 'd' | 'F' | 'f') {
        end += 1;
    }

    Ok((token, end))
}

fn invalid_number(text: &str, error: impl std::fmt::Display) -> AppError {
    AppError::Expression(format!("Invalid number '{}': {}", text, error))
}

fn unexpected(c: char, position: usize) -> AppError {
    AppError::Expression(format!("Unexpected character '{}' at position {}", c, position))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_arithmetic() {
        let tokens = tokenize("#id + 1").unwrap();

        assert_eq!(tokens, vec![Token::Variable("id".to_string()), Token::Plus, Token::Integer(1)]);
    }

    #[test]
    fn test_tokenize_operators() {
        let tokens = tokenize("#a?.b ?: 'x' == \"y\" && !c").unwrap();

        assert_eq!(
            tokens,
            vec![
                Token::Variable("a".to_string()),
                Token::SafeDot,
                Token::Ident("b".to_string()),
                Token::Elvis,
                Token::Str("x".to_string()),
                Token::Eq,
                Token::Str("y".to_string()),
                Token::And,
                Token::Not,
                Token::Ident("c".to_string()),
            ]
        );
    }

    #[test]
    fn test_keywords_after_dot_are_properties() {
        let tokens = tokenize("#range.lt gt 3").unwrap();

        assert_eq!(
            tokens,
            vec![
                Token::Variable("range".to_string()),
                Token::Dot,
                Token::Ident("lt".to_string()),
                Token::Gt,
                Token::Integer(3),
            ]
        );
    }

    #[test]
    fn test_numbers_and_strings() {
        let tokens = tokenize("3.25 10L 'it''s'").unwrap();

        assert_eq!(
            tokens,
            vec![Token::Float(3.25), Token::Integer(10), Token::Str("it's".to_string())]
        );
    }

    #[test]
    fn test_invalid_input() {
        assert!(tokenize("'open").is_err());
        assert!(tokenize("#id = 1").is_err());
        assert!(tokenize("# + 1").is_err());
    }
}
