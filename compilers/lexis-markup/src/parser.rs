use nom::{
    bytes::complete::{tag, tag_no_case, take_until, take_while, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::opt,
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

/// Marker of a form the corpus does not attest.
pub const GRAY_SPAN: &str = "<span class='gray'>";

/// Raw `<td title='...'>content</td>` cell, borrowed from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawCell<'a> {
    pub title: &'a str,
    pub content: &'a str,
}

/// `<td title='masc nom sg' class='..'>` -> `masc nom sg`
fn cell_open(input: &str) -> IResult<&str, &str> {
    let (input, _) = pair(tag("<td"), multispace1)(input)?;
    let (input, title) = delimited(tag("title='"), take_while1(|c: char| c != '\''), char('\''))(input)?;
    let (input, _) = terminated(take_while(|c: char| c != '>'), char('>'))(input)?;
    Ok((input, title))
}

fn cell(input: &str) -> IResult<&str, RawCell<'_>> {
    let (input, title) = cell_open(input)?;
    let (input, content) = terminated(take_until("</td>"), tag("</td>"))(input)?;
    Ok((input, RawCell { title, content }))
}

/// `<br>`, `<br/>`, `<br />` in any letter case.
fn line_break(input: &str) -> IResult<&str, ()> {
    let (input, _) = tuple((tag_no_case("<br"), multispace0, opt(char('/')), char('>')))(input)?;
    Ok((input, ()))
}

/// `anga<b>raja</b>...` -> `("anga", "raja")`
fn bold_form(input: &str) -> IResult<&str, (&str, &str)> {
    pair(
        take_while(|c: char| c != '<'),
        preceded(tag("<b>"), terminated(take_while1(|c: char| c != '<'), tag("</b>"))),
    )(input)
}

/// Scans for table cells, skipping anything that is not one.
pub fn parse_cells(original_input: &str) -> Vec<RawCell<'_>> {
    let mut input = original_input;
    let mut result = Vec::new();

    while let Some(offset) = input.find('<') {
        input = &input[offset..];
        match cell(input) {
            Ok((rest, raw)) => {
                result.push(raw);
                input = rest;
            }
            // Not a complete cell: step past this '<' and keep scanning
            Err(_) => input = &input[1..],
        }
    }

    result
}

/// Splits cell content at line breaks.
pub fn split_lines(content: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut pos = 0;

    while let Some(offset) = content[pos..].find('<') {
        let at = pos + offset;
        match line_break(&content[at..]) {
            Ok((rest, ())) => {
                parts.push(&content[start..at]);
                pos = content.len() - rest.len();
                start = pos;
            }
            Err(_) => pos = at + 1,
        }
    }
    parts.push(&content[start..]);

    parts
}

/// Full surface form of one line, or `None` for gray or unreadable lines.
pub fn line_form(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || line.contains(GRAY_SPAN) {
        return None;
    }
    bold_form(line)
        .ok()
        .map(|(_, (stem, ending))| format!("{stem}{ending}"))
}
