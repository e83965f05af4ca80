//! Lexer for placeholder expressions using logos

use logos::Logos;

use super::ast::Span;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum Token {
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,

    /// Literals too large for `f64` are rejected
    #[regex(r"[0-9]+(\.[0-9]*)?|\.[0-9]+", |lex| lex.slice().parse::<f64>().ok().filter(|n| n.is_finite()))]
    Number(f64),

    /// `$name`, `L<n>` or a custom name; classified later
    #[regex(r"\$?[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),
}

/// Tokenize an expression, stopping at the first character that is not a token
pub fn lex(input: &str) -> Result<Vec<(Token, Span)>, Span> {
    let mut tokens = Vec::new();
    for (result, span) in Token::lexer(input).spanned() {
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(()) => return Err(span),
        }
    }
    Ok(tokens)
}

/// Human readable token description for diagnostics
pub fn describe(token: &Token) -> String {
    match token {
        Token::Plus => "'+'".to_string(),
        Token::Minus => "'-'".to_string(),
        Token::Star => "'*'".to_string(),
        Token::Slash => "'/'".to_string(),
        Token::ParenOpen => "'('".to_string(),
        Token::ParenClose => "')'".to_string(),
        Token::Number(n) => format!("number {}", n),
        Token::Ident(s) => format!("identifier '{}'", s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        lex(input).unwrap().into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(
            tokens("2*(L1 + 3)"),
            vec![
                Token::Number(2.0),
                Token::Star,
                Token::ParenOpen,
                Token::Ident("L1".to_string()),
                Token::Plus,
                Token::Number(3.0),
                Token::ParenClose,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(tokens("12.5 .25 7."), vec![
            Token::Number(12.5),
            Token::Number(0.25),
            Token::Number(7.0),
        ]);
    }

    #[test]
    fn test_system_identifier() {
        assert_eq!(
            tokens("$frame_height/2"),
            vec![
                Token::Ident("$frame_height".to_string()),
                Token::Slash,
                Token::Number(2.0),
            ]
        );
    }

    #[test]
    fn test_spans() {
        let lexed = lex("L1 +  4").unwrap();
        let spans: Vec<Span> = lexed.into_iter().map(|(_, s)| s).collect();
        assert_eq!(spans, vec![0..2, 3..4, 6..7]);
    }

    #[test]
    fn test_rejects_colon() {
        assert_eq!(lex("L1+2:5"), Err(4..5));
    }

    #[test]
    fn test_rejects_overflowing_literal() {
        let huge = format!("1{}", "0".repeat(400));
        assert_eq!(lex(&huge), Err(0..401));
        assert_eq!(lex(&format!("2 + {}", huge)), Err(4..405));
    }
}
