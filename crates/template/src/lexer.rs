//! Template tokenization
//!
//! Splits raw template text into a linear stream of [Token]s on the
//! `{{ }}`/`{% %}` delimiters. Tokenization is total: an opener with no
//! matching closer collapses the remaining input into a single empty text
//! token, which is the engine's permissive failure mode for unterminated
//! tags.

use winnow::{
    ModalResult, Parser,
    combinator::{alt, delimited, not, repeat},
    token::{any, take_until},
};

/// Marks the start of a variable substitution
pub(crate) const VARIABLE_OPEN: &str = "{{";
/// Marks the end of a variable substitution
pub(crate) const VARIABLE_CLOSE: &str = "}}";
/// Marks the start of a control tag
pub(crate) const TAG_OPEN: &str = "{%";
/// Marks the end of a control tag
pub(crate) const TAG_CLOSE: &str = "%}";

/// A lexed piece of a template. Variable and tag payloads are the interior
/// between the delimiters with outer whitespace trimmed.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    /// Literal text outside any delimiter
    Text(String),
    /// The payload of a `{{ … }}` substitution
    Variable(String),
    /// The payload of a `{% … %}` control tag
    Tag(String),
}

/// The keyword of a tag payload: its first whitespace-separated word
pub(crate) fn keyword_of(payload: &str) -> &str {
    payload.split_whitespace().next().unwrap_or("")
}

/// Split a template into its token stream
pub(crate) fn tokenize(template: &str) -> Vec<Token> {
    let mut input = template;
    let mut tokens = Vec::new();
    while !input.is_empty() {
        if let Ok(text) = text.parse_next(&mut input) {
            tokens.push(Token::Text(text.to_owned()));
        }
        if input.is_empty() {
            break;
        }
        // The input now starts with an opener
        if input.starts_with(VARIABLE_OPEN) {
            match variable.parse_next(&mut input) {
                Ok(payload) => {
                    tokens.push(Token::Variable(payload.trim().to_owned()));
                }
                Err(_) => {
                    // Unterminated variable: swallow the rest
                    tokens.push(Token::Text(String::new()));
                    break;
                }
            }
        } else {
            match tag.parse_next(&mut input) {
                Ok(payload) => {
                    let payload = payload.trim();
                    if keyword_of(payload) == "raw" {
                        tokens.push(Token::Text(raw_span(&mut input)));
                    } else {
                        tokens.push(Token::Tag(payload.to_owned()));
                    }
                }
                Err(_) => {
                    // Unterminated tag: swallow the rest
                    tokens.push(Token::Text(String::new()));
                    break;
                }
            }
        }
    }
    tokens
}

/// Match literal text up to the next opener (or end of input)
fn text<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    repeat::<_, _, (), _, _>(
        1..,
        (not(alt((VARIABLE_OPEN, TAG_OPEN))), any),
    )
    .take()
    .parse_next(input)
}

/// Match a `{{ … }}` token, yielding the untrimmed payload
fn variable<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    delimited(
        VARIABLE_OPEN,
        take_until(0.., VARIABLE_CLOSE),
        VARIABLE_CLOSE,
    )
    .parse_next(input)
}

/// Match a `{% … %}` token, yielding the untrimmed payload
fn tag<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    delimited(TAG_OPEN, take_until(0.., TAG_CLOSE), TAG_CLOSE).parse_next(input)
}

/// Consume input verbatim until `{% endraw %}` (consuming the end tag), and
/// return the captured span. Nested delimiters are not interpreted. If the
/// end tag never appears, the rest of the input is captured.
fn raw_span(input: &mut &str) -> String {
    /// Literal text up to the next `{%` (or end of input)
    fn verbatim<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
        repeat::<_, _, (), _, _>(1.., (not(TAG_OPEN), any))
            .take()
            .parse_next(input)
    }

    let mut captured = String::new();
    loop {
        if let Ok(text) = verbatim.parse_next(input) {
            captured.push_str(text);
        }
        if input.is_empty() {
            break;
        }
        match tag.with_taken().parse_next(input) {
            Ok((payload, _)) if payload.trim() == "endraw" => break,
            // Some other tag: part of the raw span, kept verbatim
            Ok((_, consumed)) => captured.push_str(consumed),
            Err(_) => {
                // Unterminated tag inside the raw span: capture the rest
                captured.push_str(input);
                *input = "";
                break;
            }
        }
    }
    captured
}
