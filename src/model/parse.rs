//! Reader for the plain-text instance format.
//!
//! ```text
//! 3
//! 1 0.0 0.0
//! 2 10.0 0.0
//!
//! 3 5.0 8.5
//! ```
//!
//! The first non-blank line holds the city count `n`, followed by exactly `n`
//! non-blank `id x y` lines. The id column is ignored; cities are numbered by
//! their order of appearance. Blank lines are skipped anywhere.

use std::io::BufRead;

use super::distance::{DistanceModel, Point};
use crate::error::{Error, Result};

/// Parses instance text into its coordinate list.
///
/// Errors report the 1-based line number of the offending line.
pub fn parse_instance(text: &str) -> Result<Vec<Point>> {
    let lines = text.lines().map(|l| Ok(l.to_owned()));
    parse_lines(lines)
}

impl DistanceModel {
    /// Reads an instance from `reader` and builds its distance table.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let points = parse_lines(reader.lines().map(|l| l.map_err(Error::from)))?;
        DistanceModel::new(points)
    }

    /// Parses instance text and builds its distance table.
    pub fn parse(text: &str) -> Result<Self> {
        DistanceModel::new(parse_instance(text)?)
    }
}

fn parse_lines<I>(lines: I) -> Result<Vec<Point>>
where
    I: Iterator<Item = Result<String>>,
{
    let mut non_blank = lines
        .enumerate()
        .map(|(idx, line)| line.map(|l| (idx + 1, l)))
        .filter(|entry| match entry {
            Ok((_, l)) => !l.trim().is_empty(),
            Err(_) => true,
        });

    let (count_line, header) = non_blank.next().ok_or(Error::EmptyInstance)??;
    let declared = parse_count(count_line, &header)?;

    let mut points = Vec::with_capacity(declared);
    for entry in non_blank {
        let (line_no, line) = entry?;
        if points.len() == declared {
            return Err(Error::parse(
                line_no,
                format!("unexpected coordinate line beyond the declared count {declared}"),
            ));
        }
        points.push(parse_coordinate(line_no, &line)?);
    }

    if points.len() != declared {
        return Err(Error::CountMismatch {
            declared,
            found: points.len(),
        });
    }
    Ok(points)
}

fn parse_count(line_no: usize, line: &str) -> Result<usize> {
    let token = line.trim();
    let n: usize = token
        .parse()
        .map_err(|_| Error::parse(line_no, format!("invalid city count `{token}`")))?;
    if n == 0 {
        return Err(Error::parse(line_no, "city count must be at least 1"));
    }
    Ok(n)
}

fn parse_coordinate(line_no: usize, line: &str) -> Result<Point> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 3 {
        return Err(Error::parse(
            line_no,
            format!(
                "coordinates have to be three values `id x y`, found {}",
                fields.len()
            ),
        ));
    }
    let x = parse_float(line_no, "x", fields[1])?;
    let y = parse_float(line_no, "y", fields[2])?;
    Ok(Point::new(x, y))
}

fn parse_float(line_no: usize, axis: &str, token: &str) -> Result<f64> {
    match token.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(Error::parse(line_no, format!("invalid {axis} coordinate `{token}`"))),
    }
}
