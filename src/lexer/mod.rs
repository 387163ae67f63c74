pub mod token;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::anychar,
    combinator::{eof, map, opt},
    sequence::{delimited, preceded},
    IResult,
};
use token::{lookup_ident, Token, TokenKind};

/// Cursor over the source text, producing one token per call.
pub struct Lexer<'a> {
    input: &'a str,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            finished: false,
        }
    }

    /// Returns the next token. Once the input is exhausted every call yields `Eof`.
    pub fn next_token(&mut self) -> Token {
        match preceded(Self::whitespace, Self::token)(self.input) {
            Ok((rest, token)) => {
                self.input = rest;
                token
            }
            // `anychar` only fails on empty input, which `eof` has already matched
            Err(e) => unreachable!("token lexer rejected input: {:?}", e),
        }
    }

    fn token(i: &'a str) -> IResult<&'a str, Token> {
        alt((
            map(eof, |_| Token::eof()),
            Self::string_literal_lexer,
            Self::number_lexer,
            Self::ident_lexer,
            Self::symbol_lexer,
            map(anychar, |c: char| Token::new(TokenKind::Illegal, c)),
        ))(i)
    }

    fn symbol_lexer(i: &'a str) -> IResult<&'a str, Token> {
        alt((
            Self::static_token_lexer_generator("==", TokenKind::Eq),
            Self::static_token_lexer_generator("=", TokenKind::Assign),
            Self::static_token_lexer_generator("!=", TokenKind::NotEq),
            Self::static_token_lexer_generator("!", TokenKind::Bang),
            Self::static_token_lexer_generator("+", TokenKind::Plus),
            Self::static_token_lexer_generator("-", TokenKind::Minus),
            Self::static_token_lexer_generator("*", TokenKind::Asterisk),
            Self::static_token_lexer_generator("/", TokenKind::Slash),
            Self::static_token_lexer_generator("<", TokenKind::Lt),
            Self::static_token_lexer_generator(">", TokenKind::Gt),
            Self::static_token_lexer_generator("(", TokenKind::LParen),
            Self::static_token_lexer_generator(")", TokenKind::RParen),
            Self::static_token_lexer_generator("{", TokenKind::LBrace),
            Self::static_token_lexer_generator("}", TokenKind::RBrace),
            Self::static_token_lexer_generator("[", TokenKind::LBracket),
            Self::static_token_lexer_generator("]", TokenKind::RBracket),
            Self::static_token_lexer_generator(",", TokenKind::Comma),
            Self::static_token_lexer_generator(";", TokenKind::Semicolon),
            Self::static_token_lexer_generator(":", TokenKind::Colon),
        ))(i)
    }

    fn static_token_lexer_generator(
        symbol: &'static str,
        kind: TokenKind,
    ) -> impl FnMut(&'a str) -> IResult<&'a str, Token> {
        map(tag(symbol), move |literal: &'a str| Token::new(kind, literal))
    }

    fn ident_lexer(i: &'a str) -> IResult<&'a str, Token> {
        map(take_while1(Self::is_letter), |ident: &'a str| {
            Token::new(lookup_ident(ident), ident)
        })(i)
    }

    fn number_lexer(i: &'a str) -> IResult<&'a str, Token> {
        map(take_while1(|c: char| c.is_ascii_digit()), |number: &'a str| {
            Token::new(TokenKind::Int, number)
        })(i)
    }

    // No escapes; an unterminated literal runs to the end of input.
    fn string_literal_lexer(i: &'a str) -> IResult<&'a str, Token> {
        map(
            delimited(tag("\""), take_while(|c: char| c != '"'), opt(tag("\""))),
            |string_literal: &'a str| Token::new(TokenKind::Str, string_literal),
        )(i)
    }

    fn whitespace(i: &'a str) -> IResult<&'a str, &'a str> {
        let whitespace_chars = " \t\r\n";

        take_while(move |c: char| whitespace_chars.contains(c))(i)
    }

    fn is_letter(c: char) -> bool {
        c.is_ascii_alphabetic() || c == '_'
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    /// Yields every token up to and including the first `Eof`.
    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }

        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            self.finished = true;
        }

        Some(token)
    }
}

/// Lexes the whole input, `Eof` included.
pub fn lex(input: &str) -> Vec<Token> {
    Lexer::new(input).collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(input: &str) -> Vec<TokenKind> {
        lex(input).into_iter().map(|token| token.kind).collect()
    }

    #[test]
    fn tokens_simple() {
        let input = "=+(){},;";

        let expected_tokens = vec![
            Token::new(TokenKind::Assign, "="),
            Token::new(TokenKind::Plus, "+"),
            Token::new(TokenKind::LParen, "("),
            Token::new(TokenKind::RParen, ")"),
            Token::new(TokenKind::LBrace, "{"),
            Token::new(TokenKind::RBrace, "}"),
            Token::new(TokenKind::Comma, ","),
            Token::new(TokenKind::Semicolon, ";"),
            Token::eof(),
        ];

        assert_eq!(lex(input), expected_tokens);
    }

    #[test]
    fn tokens_complex() {
        let input = r#"let five = 5;
let ten = 10;

let add = fn(x, y) {
  x + y;
};

let result = add(five, ten);
!-/*5;
5 < 10 > 5;

if (5 < 10) {
    return true;
} else {
    return false;
}

10 == 10;
10 != 9;
"foobar"
"foo bar"
[1, 2];
{"foo": "bar"}
        "#;

        let expected_tokens = vec![
            (TokenKind::Let, "let"),
            (TokenKind::Ident, "five"),
            (TokenKind::Assign, "="),
            (TokenKind::Int, "5"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::Let, "let"),
            (TokenKind::Ident, "ten"),
            (TokenKind::Assign, "="),
            (TokenKind::Int, "10"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::Let, "let"),
            (TokenKind::Ident, "add"),
            (TokenKind::Assign, "="),
            (TokenKind::Function, "fn"),
            (TokenKind::LParen, "("),
            (TokenKind::Ident, "x"),
            (TokenKind::Comma, ","),
            (TokenKind::Ident, "y"),
            (TokenKind::RParen, ")"),
            (TokenKind::LBrace, "{"),
            (TokenKind::Ident, "x"),
            (TokenKind::Plus, "+"),
            (TokenKind::Ident, "y"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::RBrace, "}"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::Let, "let"),
            (TokenKind::Ident, "result"),
            (TokenKind::Assign, "="),
            (TokenKind::Ident, "add"),
            (TokenKind::LParen, "("),
            (TokenKind::Ident, "five"),
            (TokenKind::Comma, ","),
            (TokenKind::Ident, "ten"),
            (TokenKind::RParen, ")"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::Bang, "!"),
            (TokenKind::Minus, "-"),
            (TokenKind::Slash, "/"),
            (TokenKind::Asterisk, "*"),
            (TokenKind::Int, "5"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::Int, "5"),
            (TokenKind::Lt, "<"),
            (TokenKind::Int, "10"),
            (TokenKind::Gt, ">"),
            (TokenKind::Int, "5"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::If, "if"),
            (TokenKind::LParen, "("),
            (TokenKind::Int, "5"),
            (TokenKind::Lt, "<"),
            (TokenKind::Int, "10"),
            (TokenKind::RParen, ")"),
            (TokenKind::LBrace, "{"),
            (TokenKind::Return, "return"),
            (TokenKind::True, "true"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::RBrace, "}"),
            (TokenKind::Else, "else"),
            (TokenKind::LBrace, "{"),
            (TokenKind::Return, "return"),
            (TokenKind::False, "false"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::RBrace, "}"),
            (TokenKind::Int, "10"),
            (TokenKind::Eq, "=="),
            (TokenKind::Int, "10"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::Int, "10"),
            (TokenKind::NotEq, "!="),
            (TokenKind::Int, "9"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::Str, "foobar"),
            (TokenKind::Str, "foo bar"),
            (TokenKind::LBracket, "["),
            (TokenKind::Int, "1"),
            (TokenKind::Comma, ","),
            (TokenKind::Int, "2"),
            (TokenKind::RBracket, "]"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::LBrace, "{"),
            (TokenKind::Str, "foo"),
            (TokenKind::Colon, ":"),
            (TokenKind::Str, "bar"),
            (TokenKind::RBrace, "}"),
            (TokenKind::Eof, ""),
        ]
        .into_iter()
        .map(|(kind, literal)| Token::new(kind, literal))
        .collect::<Vec<Token>>();

        let actual_tokens = lex(input);

        assert_eq!(actual_tokens.len(), expected_tokens.len());

        expected_tokens
            .into_iter()
            .zip(actual_tokens)
            .for_each(|(expected, actual)| assert_eq!(actual, expected));
    }

    #[test]
    fn identifiers_are_maximal_letter_runs() {
        let inputs = vec![
            ("five", vec![(TokenKind::Ident, "five")]),
            ("letter", vec![(TokenKind::Ident, "letter")]),
            ("my_thing", vec![(TokenKind::Ident, "my_thing")]),
            ("_private", vec![(TokenKind::Ident, "_private")]),
            ("x1", vec![(TokenKind::Ident, "x"), (TokenKind::Int, "1")]),
            ("1x", vec![(TokenKind::Int, "1"), (TokenKind::Ident, "x")]),
        ];

        inputs.into_iter().for_each(|(input, expected)| {
            let mut expected = expected
                .into_iter()
                .map(|(kind, literal)| Token::new(kind, literal))
                .collect::<Vec<Token>>();
            expected.push(Token::eof());

            assert_eq!(lex(input), expected, "input: {}", input);
        });
    }

    #[test]
    fn illegal_characters() {
        assert_eq!(
            lex("5 @ 6 é"),
            vec![
                Token::new(TokenKind::Int, "5"),
                Token::new(TokenKind::Illegal, "@"),
                Token::new(TokenKind::Int, "6"),
                Token::new(TokenKind::Illegal, "é"),
                Token::eof(),
            ]
        );
    }

    #[test]
    fn unterminated_string_runs_to_end() {
        assert_eq!(
            lex(r#"let s = "abc"#),
            vec![
                Token::new(TokenKind::Let, "let"),
                Token::new(TokenKind::Ident, "s"),
                Token::new(TokenKind::Assign, "="),
                Token::new(TokenKind::Str, "abc"),
                Token::eof(),
            ]
        );
        assert_eq!(kinds(r#""""#), vec![TokenKind::Str, TokenKind::Eof]);
    }

    #[test]
    fn eof_is_idempotent() {
        let mut lexer = Lexer::new("  x ");

        assert_eq!(lexer.next_token(), Token::new(TokenKind::Ident, "x"));
        assert_eq!(lexer.next_token(), Token::eof());
        assert_eq!(lexer.next_token(), Token::eof());
        assert_eq!(lexer.next_token(), Token::eof());
    }

    #[test]
    fn iterator_stops_after_eof() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
        assert_eq!(kinds(" \n\t "), vec![TokenKind::Eof]);
        assert_eq!(
            kinds("a==b!=!c"),
            vec![
                TokenKind::Ident,
                TokenKind::Eq,
                TokenKind::Ident,
                TokenKind::NotEq,
                TokenKind::Bang,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }
}
