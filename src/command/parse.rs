//! Parameter extraction helpers shared by command matchers

use nom::branch::alt;
use nom::bytes::complete::{tag, take_while, take_while1, take_while_m_n};
use nom::character::complete::char;
use nom::combinator::{map_res, opt, value};
use nom::sequence::preceded;
use nom::{IResult, Parser};

/// Trailing verbs that turn a phrase into a create request
pub const ACTION_KEYWORDS: [&str; 2] = ["추가", "등록"];

/// Relative day named at the start of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Day {
    Today,
    Tomorrow,
}

impl Day {
    pub fn offset(self) -> i64 {
        match self {
            Day::Today => 0,
            Day::Tomorrow => 1,
        }
    }
}

/// Local wall-clock time as written by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub day: Day,
    pub hour: u32,
    pub minute: u32,
}

pub fn day(input: &str) -> IResult<&str, Day> {
    alt((value(Day::Today, tag("오늘")), value(Day::Tomorrow, tag("내일")))).parse(input)
}

fn hour(input: &str) -> IResult<&str, u32> {
    map_res(take_while_m_n(1, 2, |c: char| c.is_ascii_digit()), |s: &str| {
        s.parse::<u32>()
    })
    .parse(input)
}

fn minute(input: &str) -> IResult<&str, u32> {
    map_res(take_while_m_n(2, 2, |c: char| c.is_ascii_digit()), |s: &str| {
        s.parse::<u32>()
    })
    .parse(input)
}

/// Any Unicode whitespace, including U+3000 from Korean IMEs
fn space0(input: &str) -> IResult<&str, &str> {
    take_while(|c: char| c.is_whitespace()).parse(input)
}

fn space1(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_whitespace()).parse(input)
}

/// `오늘|내일`, whitespace, `H` or `HH`, optional `:MM`, optional `시`
///
/// Consumes the whitespace that follows, so the remainder starts at the title.
pub fn schedule(input: &str) -> IResult<&str, Schedule> {
    (
        day,
        space1,
        hour,
        opt(preceded(char(':'), minute)),
        space0,
        opt(tag("시")),
        space0,
    )
        .map(|(day, _, hour, minute, _, _, _)| Schedule {
            day,
            hour,
            minute: minute.unwrap_or(0),
        })
        .parse(input)
}

/// Text with a trailing action keyword removed, if it ends with one
pub fn strip_action_keyword(text: &str) -> Option<&str> {
    ACTION_KEYWORDS
        .iter()
        .find_map(|keyword| text.strip_suffix(keyword))
}

/// True when every keyword occurs somewhere in `text`
pub fn contains_all(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().all(|keyword| text.contains(keyword))
}
