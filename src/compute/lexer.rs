//! Splits sanitized formula text into tokens.
use super::value::FormulaError;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Str(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Comma,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the token in the source text.
    pub pos: usize,
}

impl TokenKind {
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Number(n) => format!("number {}", n),
            TokenKind::Str(s) => format!("string {:?}", s),
            TokenKind::Plus => "'+'".into(),
            TokenKind::Minus => "'-'".into(),
            TokenKind::Star => "'*'".into(),
            TokenKind::Slash => "'/'".into(),
            TokenKind::LParen => "'('".into(),
            TokenKind::RParen => "')'".into(),
            TokenKind::Comma => "','".into(),
        }
    }
}

pub fn tokenize(src: &str) -> Result<Vec<Token>, FormulaError> {
    let mut tokens = Vec::new();
    let mut chars = src.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        let kind = match c {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            '"' => {
                chars.next();
                let text = lex_string(&mut chars, pos)?;
                tokens.push(Token { kind: TokenKind::Str(text), pos });
                continue;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut end = pos;
                let mut seen_dot = false;
                while let Some(&(i, d)) = chars.peek() {
                    if d.is_ascii_digit() {
                        end = i + 1;
                    } else if d == '.' && !seen_dot {
                        seen_dot = true;
                        end = i + 1;
                    } else {
                        break;
                    }
                    chars.next();
                }
                let text = &src[pos..end];
                let value = text.parse::<f64>().map_err(|_| FormulaError::MalformedNumber {
                    text: text.to_string(),
                    pos,
                })?;
                tokens.push(Token { kind: TokenKind::Number(value), pos });
                continue;
            }
            other => return Err(FormulaError::UnexpectedChar { ch: other, pos }),
        };
        chars.next();
        tokens.push(Token { kind, pos });
    }

    Ok(tokens)
}

/// Reads a string literal body after its opening quote. `\"` and `\\` are escapes.
fn lex_string(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    start: usize,
) -> Result<String, FormulaError> {
    let mut text = String::new();
    while let Some((_, c)) = chars.next() {
        match c {
            '"' => return Ok(text),
            '\\' => match chars.next() {
                Some((_, escaped)) => text.push(escaped),
                None => break,
            },
            c => text.push(c),
        }
    }
    Err(FormulaError::UnterminatedString(start))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_tokenize_arithmetic() {
        assert_eq!(
            kinds("(1.5 + 2) * .5"),
            vec![
                TokenKind::LParen,
                TokenKind::Number(1.5),
                TokenKind::Plus,
                TokenKind::Number(2.0),
                TokenKind::RParen,
                TokenKind::Star,
                TokenKind::Number(0.5),
            ]
        );
    }

    #[test]
    fn test_tokenize_strings_with_escapes() {
        assert_eq!(
            kinds(r#""say \"hi\"" , "a\\b""#),
            vec![
                TokenKind::Str("say \"hi\"".into()),
                TokenKind::Comma,
                TokenKind::Str("a\\b".into()),
            ]
        );
    }

    #[test]
    fn test_second_dot_starts_a_new_number() {
        assert_eq!(kinds("1.2.3"), vec![TokenKind::Number(1.2), TokenKind::Number(0.3)]);
    }

    #[test]
    fn test_lex_errors() {
        assert_eq!(tokenize("\"open"), Err(FormulaError::UnterminatedString(0)));
        assert_eq!(tokenize("1 ? 2"), Err(FormulaError::UnexpectedChar { ch: '?', pos: 2 }));
        assert!(matches!(tokenize("."), Err(FormulaError::MalformedNumber { .. })));
    }
}
