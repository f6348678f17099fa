use crate::algebra::{BinaryOperation, Builtin, Expression, Parameter};
use smol_str::SmolStr;
use std::{
    fmt::{self, Display, Formatter},
    iter::Peekable,
    ops::Range,
    str::FromStr,
};

/// Parse an [`Expression`] tree from some text.
pub fn parse(s: &str) -> Result<Expression, ParseError> {
    Parser::new(s).parse()
}

impl FromStr for Expression {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { parse(s) }
}

/// A simple recursive descent parser (`LL(1)`) for converting a string into an
/// expression tree.
///
/// The grammar:
///
/// ```text
/// expression     := term (("+" | "-") term)*
///
/// term           := unary (("*" | "/") unary)*
///
/// unary          := "-" unary
///                 | "+" unary
///                 | power
///
/// power          := factor ("^" unary)?
///
/// factor         := function_call
///                 | IDENTIFIER
///                 | "(" expression ")"
///                 | NUMBER
///
/// function_call  := IDENTIFIER "(" expression ")"
/// ```
///
/// Both `^` and `**` are lexed as [`TokenKind::Caret`].
#[derive(Debug, Clone)]
pub(crate) struct Parser<'a> {
    tokens: Peekable<Tokens<'a>>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Parser {
            tokens: Tokens::new(src).peekable(),
        }
    }

    pub(crate) fn parse(mut self) -> Result<Expression, ParseError> {
        let expr = self.expression()?;

        match self.tokens.next() {
            None => Ok(expr),
            Some(Ok(token)) => Err(ParseError::TrailingInput {
                found: token.kind,
                span: token.span,
            }),
            Some(Err(e)) => Err(e),
        }
    }

    fn peek(&mut self) -> Option<TokenKind> {
        self.tokens
            .peek()
            .and_then(|result| result.as_ref().ok())
            .map(|tok| tok.kind)
    }

    fn advance(&mut self) -> Result<Token<'a>, ParseError> {
        match self.tokens.next() {
            Some(result) => result,
            None => Err(ParseError::UnexpectedEndOfInput),
        }
    }

    fn expression(&mut self) -> Result<Expression, ParseError> {
        let left = self.term()?;

        self.then_right_part_of_binary_op(
            left,
            &[TokenKind::Plus, TokenKind::Minus],
            |p| p.term(),
        )
    }

    fn term(&mut self) -> Result<Expression, ParseError> {
        let left = self.unary()?;

        self.then_right_part_of_binary_op(
            left,
            &[TokenKind::Times, TokenKind::Divide],
            |p| p.unary(),
        )
    }

    /// Keep folding `left op right` while the next token is one of the
    /// `expected` operators, giving us left-associativity.
    fn then_right_part_of_binary_op<F>(
        &mut self,
        mut left: Expression,
        expected: &[TokenKind],
        mut then: F,
    ) -> Result<Expression, ParseError>
    where
        F: FnMut(&mut Parser<'a>) -> Result<Expression, ParseError>,
    {
        while let Some(kind) = self.peek() {
            if !expected.contains(&kind) {
                break;
            }

            // skip past the operator
            let _ = self.advance()?;
            // and parse the second bit
            let right = then(self)?;

            left = Expression::Binary {
                left: Box::new(left),
                right: Box::new(right),
                op: kind.as_binary_op(),
            };
        }

        Ok(left)
    }

    fn unary(&mut self) -> Result<Expression, ParseError> {
        match self.peek() {
            Some(TokenKind::Minus) => {
                let _ = self.advance()?;
                let operand = self.unary()?;
                Ok(Expression::Negate(Box::new(operand)))
            },
            Some(TokenKind::Plus) => {
                let _ = self.advance()?;
                self.unary()
            },
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Expression, ParseError> {
        let base = self.factor()?;

        if self.peek() == Some(TokenKind::Caret) {
            let _ = self.advance()?;
            // the exponent may carry its own sign, e.g. "2^-1", and recursing
            // through unary() makes "2^3^2" group as "2^(3^2)"
            let exponent = self.unary()?;
            return Ok(base.pow(exponent));
        }

        Ok(base)
    }

    fn factor(&mut self) -> Result<Expression, ParseError> {
        const EXPECTED: &[TokenKind] = &[
            TokenKind::Number,
            TokenKind::Identifier,
            TokenKind::Minus,
            TokenKind::OpenParen,
        ];

        match self.peek() {
            Some(TokenKind::Number) => {
                return self.number();
            },
            Some(TokenKind::Identifier) => {
                return self.variable_or_function_call()
            },
            Some(TokenKind::OpenParen) => {
                let _ = self.advance()?;
                let expr = self.expression()?;
                let close_paren = self.advance()?;

                if close_paren.kind == TokenKind::CloseParen {
                    return Ok(expr);
                } else {
                    return Err(ParseError::UnexpectedToken {
                        found: close_paren.kind,
                        span: close_paren.span,
                        expected: &[TokenKind::CloseParen],
                    });
                }
            },
            _ => {},
        }

        // we couldn't parse the factor, return a nice error
        match self.tokens.next() {
            Some(Ok(Token { span, kind, .. })) => {
                Err(ParseError::UnexpectedToken {
                    found: kind,
                    expected: EXPECTED,
                    span,
                })
            },
            Some(Err(e)) => Err(e),
            None => Err(ParseError::UnexpectedEndOfInput),
        }
    }

    fn variable_or_function_call(&mut self) -> Result<Expression, ParseError> {
        let ident = self.advance()?;
        debug_assert_eq!(ident.kind, TokenKind::Identifier);

        if self.peek() == Some(TokenKind::OpenParen) {
            self.function_call(ident)
        } else {
            Ok(Expression::Parameter(Parameter::named(ident.text)))
        }
    }

    fn function_call(
        &mut self,
        identifier: Token<'a>,
    ) -> Result<Expression, ParseError> {
        let function = Builtin::from_name(identifier.text).ok_or_else(|| {
            ParseError::UnknownFunction {
                name: identifier.text.into(),
                span: identifier.span.clone(),
            }
        })?;

        let open_paren = self.advance()?;
        debug_assert_eq!(open_paren.kind, TokenKind::OpenParen);

        let argument = self.expression()?;

        let Token { kind, span, .. } = self.advance()?;

        if kind == TokenKind::CloseParen {
            Ok(Expression::call(function, argument))
        } else {
            Err(ParseError::UnexpectedToken {
                found: kind,
                span,
                expected: &[TokenKind::CloseParen],
            })
        }
    }

    fn number(&mut self) -> Result<Expression, ParseError> {
        let token = self.advance()?;
        debug_assert_eq!(token.kind, TokenKind::Number);

        token
            .text
            .parse()
            .map(Expression::Constant)
            .map_err(|_| ParseError::InvalidNumber {
                text: token.text.into(),
                span: token.span,
            })
    }
}

/// Possible errors that may occur while parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid character {character:?} at index {index}")]
    InvalidCharacter { character: char, index: usize },
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    #[error("expected {} but found {found} at {span:?}", OneOf(.expected))]
    UnexpectedToken {
        found: TokenKind,
        span: Range<usize>,
        expected: &'static [TokenKind],
    },
    #[error("unexpected {found} at {span:?}")]
    TrailingInput { found: TokenKind, span: Range<usize> },
    #[error("unknown function \"{name}\" at {span:?}")]
    UnknownFunction { name: SmolStr, span: Range<usize> },
    #[error("\"{text}\" is not a valid number")]
    InvalidNumber { text: SmolStr, span: Range<usize> },
}

/// Formats a list of token kinds as "a, b or c".
struct OneOf<'a>(&'a [TokenKind]);

impl Display for OneOf<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, kind) in self.0.iter().enumerate() {
            if i > 0 && i + 1 == self.0.len() {
                write!(f, " or ")?;
            } else if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", kind)?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Tokens<'a> {
    src: &'a str,
    cursor: usize,
}

impl<'a> Tokens<'a> {
    fn new(src: &'a str) -> Self { Tokens { src, cursor: 0 } }

    fn rest(&self) -> &'a str { &self.src[self.cursor..] }

    fn peek(&self) -> Option<char> { self.rest().chars().next() }

    fn peek_nth(&self, n: usize) -> Option<char> { self.rest().chars().nth(n) }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.cursor += c.len_utf8();
        Some(c)
    }

    fn chomp(
        &mut self,
        kind: TokenKind,
        length: usize,
    ) -> Option<Result<Token<'a>, ParseError>> {
        let start = self.cursor;
        for _ in 0..length {
            self.advance()?;
        }
        let end = self.cursor;

        Some(Ok(Token::from_text(self.src, start..end, kind)))
    }

    fn take_while<P>(&mut self, mut predicate: P) -> Range<usize>
    where
        P: FnMut(char) -> bool,
    {
        let start = self.cursor;

        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }

            self.advance();
        }

        start..self.cursor
    }

    fn chomp_integer(&mut self) -> Range<usize> {
        self.take_while(|c| c.is_ascii_digit())
    }

    fn chomp_number(&mut self) -> Token<'a> {
        let start = self.cursor;
        self.chomp_integer();

        if self.peek() == Some('.') {
            // skip past the decimal
            self.advance();
            self.chomp_integer();
        }

        // only treat an "e" as an exponent when digits follow, so "2e" is
        // still the number 2 followed by the constant e
        if let Some('e') | Some('E') = self.peek() {
            let exponent_digits_follow = match self.peek_nth(1) {
                Some('+') | Some('-') => {
                    self.peek_nth(2).map_or(false, |c| c.is_ascii_digit())
                },
                Some(c) => c.is_ascii_digit(),
                None => false,
            };

            if exponent_digits_follow {
                self.advance();
                if let Some('+') | Some('-') = self.peek() {
                    self.advance();
                }
                self.chomp_integer();
            }
        }

        let end = self.cursor;

        Token::from_text(self.src, start..end, TokenKind::Number)
    }

    fn chomp_identifier(&mut self) -> Token<'a> {
        let mut seen_first_character = false;

        let span = self.take_while(|c| {
            if seen_first_character {
                c.is_ascii_alphanumeric() || c == '_'
            } else {
                seen_first_character = true;
                c.is_ascii_alphabetic() || c == '_'
            }
        });

        Token::from_text(self.src, span, TokenKind::Identifier)
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Result<Token<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            return match self.peek()? {
                space if space.is_whitespace() => {
                    self.advance();
                    continue;
                },
                '(' => self.chomp(TokenKind::OpenParen, 1),
                ')' => self.chomp(TokenKind::CloseParen, 1),
                '+' => self.chomp(TokenKind::Plus, 1),
                '-' => self.chomp(TokenKind::Minus, 1),
                '*' if self.peek_nth(1) == Some('*') => {
                    self.chomp(TokenKind::Caret, 2)
                },
                '*' => self.chomp(TokenKind::Times, 1),
                '/' => self.chomp(TokenKind::Divide, 1),
                '^' => self.chomp(TokenKind::Caret, 1),
                '_' | 'a'..='z' | 'A'..='Z' => {
                    Some(Ok(self.chomp_identifier()))
                },
                '0'..='9' => Some(Ok(self.chomp_number())),
                '.' if self.peek_nth(1).map_or(false, |c| c.is_ascii_digit()) => {
                    Some(Ok(self.chomp_number()))
                },
                other => Some(Err(ParseError::InvalidCharacter {
                    character: other,
                    index: self.cursor,
                })),
            };
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Token<'a> {
    text: &'a str,
    span: Range<usize>,
    kind: TokenKind,
}

impl<'a> Token<'a> {
    fn from_text(
        original_source: &'a str,
        span: Range<usize>,
        kind: TokenKind,
    ) -> Self {
        Token {
            text: &original_source[span.clone()],
            span,
            kind,
        }
    }
}

/// The kinds of token that can appear in an [`Expression`]'s text form.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TokenKind {
    Identifier,
    Number,
    OpenParen,
    CloseParen,
    Plus,
    Minus,
    Times,
    Divide,
    Caret,
}

impl TokenKind {
    fn as_binary_op(self) -> BinaryOperation {
        match self {
            TokenKind::Plus => BinaryOperation::Plus,
            TokenKind::Minus => BinaryOperation::Minus,
            TokenKind::Times => BinaryOperation::Times,
            TokenKind::Divide => BinaryOperation::Divide,
            TokenKind::Caret => BinaryOperation::Power,
            other => unreachable!("{:?} is not a binary op", other),
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Identifier => write!(f, "an identifier"),
            TokenKind::Number => write!(f, "a number"),
            TokenKind::OpenParen => write!(f, "\"(\""),
            TokenKind::CloseParen => write!(f, "\")\""),
            TokenKind::Plus => write!(f, "\"+\""),
            TokenKind::Minus => write!(f, "\"-\""),
            TokenKind::Times => write!(f, "\"*\""),
            TokenKind::Divide => write!(f, "\"/\""),
            TokenKind::Caret => write!(f, "\"^\""),
        }
    }
}


#[cfg(test)]
mod parser_tests {
    use super::*;

    macro_rules! parser_test {
        ($name:ident, $src:expr) => {
            parser_test!($name, $src, $src);
        };
        ($name:ident, $src:expr, $should_be:expr) => {
            #[test]
            fn $name() {
                let got = Parser::new($src).parse().unwrap();

                let round_tripped = got.to_string();
                assert_eq!(round_tripped, $should_be);
            }
        };
    }

    parser_test!(simple_integer, "1");
    parser_test!(one_plus_one, "1 + 1");
    parser_test!(one_plus_one_plus_negative_one, "1 + -1");
    parser_test!(one_plus_one_times_three, "1 + 1*3");
    parser_test!(one_plus_one_all_times_three, "(1 + 1)*3");
    parser_test!(negative_one, "-1");
    parser_test!(negative_one_plus_one, "-1 + 1");
    parser_test!(negative_one_plus_x, "-1 + x");
    parser_test!(number_in_parens, "(1)", "1");
    parser_test!(bimdas, "1*2 + 3*4/(5 - 2)*1 - 3");
    parser_test!(subtraction_is_left_associative, "1 - 2 - 3");
    parser_test!(explicit_right_grouping, "1 - (2 - 3)");
    parser_test!(division_is_left_associative, "8/2/2");
    parser_test!(function_call, "sin(1)", "sin(1)");
    parser_test!(function_call_with_expression, "sin(1/0)");
    parser_test!(
        function_calls_function_calls_function_with_variable,
        "sqrt(abs(cos(pi)))"
    );
    parser_test!(simple_power, "x^2");
    parser_test!(python_style_power, "x**2", "x^2");
    parser_test!(power_binds_tighter_than_negation, "-x^2");
    parser_test!(power_is_right_associative, "2^3^2");
    parser_test!(negative_exponent, "2^-1", "2^(-1)");
    parser_test!(unary_plus, "+x", "x");
    parser_test!(scientific_literal, "x - 1e-3", "x - 0.001");

    #[test]
    fn left_associativity_evaluates_correctly() {
        let inputs = vec![("1 - 2 - 3", -4.0), ("8/2/2", 2.0), ("2^3^2", 512.0)];

        for (src, should_be) in inputs {
            let expr = parse(src).unwrap();
            let got = crate::algebra::ops::evaluate(&expr, |_| None).unwrap();

            assert_eq!(got, should_be, "{}", src);
        }
    }

    #[test]
    fn unknown_functions_are_rejected() {
        let got = parse("1 + foo(x)").unwrap_err();

        assert_eq!(
            got,
            ParseError::UnknownFunction {
                name: "foo".into(),
                span: 4..7,
            }
        );
    }

    #[test]
    fn leftover_tokens_are_an_error() {
        let got = parse("2 x").unwrap_err();

        assert_eq!(
            got,
            ParseError::TrailingInput {
                found: TokenKind::Identifier,
                span: 2..3,
            }
        );
    }

    #[test]
    fn unbalanced_parens() {
        assert_eq!(parse("(x + 1"), Err(ParseError::UnexpectedEndOfInput));
        assert!(matches!(
            parse("x + )"),
            Err(ParseError::UnexpectedToken {
                found: TokenKind::CloseParen,
                ..
            })
        ));
    }

    #[test]
    fn errors_have_readable_messages() {
        let got = parse("x + )").unwrap_err().to_string();

        assert_eq!(
            got,
            "expected a number, an identifier, \"-\" or \"(\" but found \")\" at 4..5"
        );
    }
}
