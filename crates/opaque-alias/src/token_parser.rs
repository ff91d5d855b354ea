use nom::{
    branch::alt,
    bytes::complete::{take_till1, take_while_m_n},
    character::complete::char,
    combinator::{all_consuming, map},
    error::{ErrorKind, ParseError},
    Err as NomErr, IResult,
};

/// Length of the unlabeled token minted for orders.
pub const ORDER_TOKEN_LENGTH: usize = 32;
pub const SEGMENT_SEPARATOR: char = '_';

/// Structural view of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenShape<'a> {
    /// `ORDER_TOKEN_LENGTH` characters without any separator.
    Unlabeled(&'a str),
    /// `<entity>_<random>_<timestamp>`. The random part keeps any inner
    /// separators; only the first and last ones delimit segments.
    Labeled {
        entity: &'a str,
        random: &'a str,
        timestamp: &'a str,
    },
}

impl<'a> TokenShape<'a> {
    pub fn entity_tag(&self) -> Option<&'a str> {
        match self {
            TokenShape::Unlabeled(_) => None,
            TokenShape::Labeled { entity, .. } => Some(*entity),
        }
    }
}

fn unlabeled(input: &str) -> IResult<&str, TokenShape<'_>> {
    map(
        all_consuming(take_while_m_n(
            ORDER_TOKEN_LENGTH,
            ORDER_TOKEN_LENGTH,
            |c: char| c != SEGMENT_SEPARATOR,
        )),
        TokenShape::Unlabeled,
    )(input)
}

fn labeled(input: &str) -> IResult<&str, TokenShape<'_>> {
    let (rest, entity) = take_till1(|c: char| c == SEGMENT_SEPARATOR)(input)?;
    let (rest, _) = char(SEGMENT_SEPARATOR)(rest)?;

    // Need at least one more separator for a third segment.
    match rest.rfind(SEGMENT_SEPARATOR) {
        Some(pos) => Ok((
            &rest[rest.len()..],
            TokenShape::Labeled {
                entity,
                random: &rest[..pos],
                timestamp: &rest[pos + SEGMENT_SEPARATOR.len_utf8()..],
            },
        )),
        None => Err(NomErr::Error(ParseError::from_error_kind(
            input,
            ErrorKind::Char,
        ))),
    }
}

/// Parse a token into its shape.
///
/// Accepts either `ORDER_TOKEN_LENGTH` characters with no separator, or at
/// least three separator-delimited segments whose first segment is
/// non-empty.
pub fn parse_token(input: &str) -> IResult<&str, TokenShape<'_>> {
    if input.is_empty() {
        return Err(NomErr::Error(ParseError::from_error_kind(
            input,
            ErrorKind::Eof,
        )));
    }
    alt((unlabeled, labeled))(input)
}
