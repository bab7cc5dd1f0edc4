use crate::prompt::Console;
use crate::{FilterError, FilterResult};
use std::io::{self, BufRead, Write};

/// A click position in window coordinates: `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    /// `(row, col)`; no scaling is applied.
    pub fn row_col(self) -> (i64, i64) {
        (self.y, self.x)
    }
}

/// Whatever is showing the image: blocks until the user clicks it.
pub trait ClickSource {
    fn wait_for_click(&mut self) -> FilterResult<Point>;
}

/// Without a window the terminal stands in for one: the click is typed as
/// `x y` (or `x,y`) pixel coordinates.
impl<R: BufRead, W: Write> ClickSource for Console<R, W> {
    fn wait_for_click(&mut self) -> FilterResult<Point> {
        loop {
            let Some(line) = self.read_line("Click position as \"x y\": ")? else {
                return Err(FilterError::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "input closed while waiting for a click",
                )));
            };
            if let Some(point) = parse_point(&line) {
                return Ok(point);
            }
        }
    }
}

fn parse_point(line: &str) -> Option<Point> {
    let mut parts = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty());
    let x = parts.next()?.parse().ok()?;
    let y = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Point { x, y })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn click_maps_y_to_row() {
        assert_eq!(Point { x: 4, y: 9 }.row_col(), (9, 4));
    }

    #[test]
    fn parses_space_or_comma_separated_points() {
        assert_eq!(parse_point("3 7"), Some(Point { x: 3, y: 7 }));
        assert_eq!(parse_point(" 3, 7 "), Some(Point { x: 3, y: 7 }));
        assert_eq!(parse_point("3"), None);
        assert_eq!(parse_point("3 7 1"), None);
        assert_eq!(parse_point("a b"), None);
    }

    #[test]
    fn console_click_reprompts_until_valid() {
        let mut console = Console::new(Cursor::new("nope\n12 5\n"), Vec::new());
        assert_eq!(console.wait_for_click().unwrap(), Point { x: 12, y: 5 });
    }

    #[test]
    fn console_click_fails_at_end_of_input() {
        let mut console = Console::new(Cursor::new(""), Vec::new());
        assert!(matches!(console.wait_for_click(), Err(FilterError::Io(_))));
    }
}
