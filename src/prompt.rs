//! Interactive session: asks for an image, a filter and its parameters, then
//! where to save the result. Every question is asked again until it gets a
//! usable answer; a blank answer to the first two quits.

use crate::display::{ClickSource, Point};
use crate::filter::{Filter, FilterKind, FilterOutput, MAX_RADIUS, MIN_RADIUS};
use crate::image_io::{load_grid, save_grid};
use crate::{FilterError, FilterResult, PixelGrid};
use log::warn;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// Line-oriented prompt/answer I/O.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Prints `prompt` and reads one answer. `None` once input is exhausted.
    pub fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(|c: char| c == '\r' || c == '\n').to_string()))
    }

    pub fn say(&mut self, message: impl Display) -> io::Result<()> {
        writeln!(self.output, "{message}")
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Quit,
    Saved(PathBuf),
    Unsaved,
    Compared(usize),
    DimensionMismatch,
}

pub struct Session<R, W> {
    console: Console<R, W>,
    clicks: Option<Box<dyn ClickSource>>,
    seed: Option<u64>,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            console: Console::new(input, output),
            clicks: None,
            seed: None,
        }
    }

    /// Sticker placement clicks come from `clicks` instead of the console.
    pub fn with_clicks(mut self, clicks: Box<dyn ClickSource>) -> Self {
        self.clicks = Some(clicks);
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn into_output(self) -> W {
        self.console.into_output()
    }

    pub fn run(&mut self) -> FilterResult<Outcome> {
        self.console.say("Welcome to the pixel grid filter!")?;

        let Some(grid) =
            self.open_image("Enter name of image file to open (or blank to quit): ", true)?
        else {
            return Ok(Outcome::Quit);
        };
        let Some(kind) = self.choose_filter()? else {
            return Ok(Outcome::Quit);
        };
        let Some(filter) = self.configure(kind)? else {
            return Ok(Outcome::Quit);
        };

        let output = match self.seed {
            Some(seed) => filter.apply(&grid, &mut StdRng::seed_from_u64(seed)),
            None => filter.apply(&grid, &mut rand::rng()),
        };

        match output {
            Ok(FilterOutput::Grid(filtered)) => self.save(&filtered),
            Ok(FilterOutput::Count(0)) => {
                self.console.say("These images are the same!")?;
                Ok(Outcome::Compared(0))
            }
            Ok(FilterOutput::Count(diff)) => {
                self.console
                    .say(format!("These images differ in {diff} pixel locations!"))?;
                Ok(Outcome::Compared(diff))
            }
            Err(err @ FilterError::DimensionMismatch { .. }) => {
                self.console.say(format!("These images cannot be compared: {err}"))?;
                Ok(Outcome::DimensionMismatch)
            }
            Err(err) => Err(err),
        }
    }

    fn open_image(&mut self, prompt: &str, blank_quits: bool) -> FilterResult<Option<PixelGrid>> {
        loop {
            let Some(name) = self.console.read_line(prompt)? else {
                return Ok(None);
            };
            let name = name.trim();
            if name.is_empty() {
                if blank_quits {
                    return Ok(None);
                }
                continue;
            }
            match load_grid(name) {
                Ok(grid) => return Ok(Some(grid)),
                Err(err) => {
                    warn!("failed to open {name}: {err}");
                    self.console.say(format!("Unable to open {name}."))?;
                }
            }
        }
    }

    fn choose_filter(&mut self) -> FilterResult<Option<FilterKind>> {
        let mut menu = String::from("Which image filter would you like to apply?\n");
        for kind in FilterKind::ALL {
            menu.push_str(&format!("\t {} - {}\n", kind.menu_number(), kind));
        }
        menu.push_str("Your choice: ");

        loop {
            let Some(choice) = self.console.read_line(&menu)? else {
                return Ok(None);
            };
            if choice.trim().is_empty() {
                return Ok(None);
            }
            if let Ok(kind) = choice.parse() {
                return Ok(Some(kind));
            }
        }
    }

    fn configure(&mut self, kind: FilterKind) -> FilterResult<Option<Filter>> {
        let filter = match kind {
            FilterKind::Scatter => {
                let Some(radius) = self.read_integer("Enter degree of scatter [1-100]: ", |r| {
                    (MIN_RADIUS..=MAX_RADIUS).contains(&r)
                })?
                else {
                    return Ok(None);
                };
                Filter::Scatter { radius }
            }
            FilterKind::EdgeDetect => {
                let Some(threshold) =
                    self.read_integer("Enter threshold for edge detection: ", |t| t > 0)?
                else {
                    return Ok(None);
                };
                Filter::EdgeDetect { threshold }
            }
            FilterKind::GreenScreen => {
                self.console
                    .say("Now choose another file to add to your background image.")?;
                let Some(overlay) =
                    self.open_image("Enter name of sticker image file to open: ", false)?
                else {
                    return Ok(None);
                };
                let Some(tolerance) =
                    self.read_integer("Please enter a green screen tolerance: ", |t| t > 0)?
                else {
                    return Ok(None);
                };
                let Some((place_row, place_col)) = self.read_placement()? else {
                    return Ok(None);
                };
                Filter::GreenScreen {
                    overlay,
                    tolerance,
                    place_row,
                    place_col,
                }
            }
            FilterKind::Compare => {
                let Some(other) =
                    self.open_image("Enter name of image file to compare with: ", false)?
                else {
                    return Ok(None);
                };
                Filter::Compare { other }
            }
        };
        Ok(Some(filter))
    }

    fn read_integer(
        &mut self,
        prompt: &str,
        valid: impl Fn(i32) -> bool,
    ) -> FilterResult<Option<i32>> {
        loop {
            let Some(answer) = self.console.read_line(prompt)? else {
                return Ok(None);
            };
            match answer.trim().parse::<i32>() {
                Ok(value) if valid(value) => return Ok(Some(value)),
                Ok(_) => {}
                Err(_) => self.console.say("Illegal integer format. Try again.")?,
            }
        }
    }

    fn read_placement(&mut self) -> FilterResult<Option<(i64, i64)>> {
        loop {
            let Some(answer) = self
                .console
                .read_line("Enter location to place image as \"(row,col)\" or blank to use mouse: ")?
            else {
                return Ok(None);
            };
            if answer.trim().is_empty() {
                self.console
                    .say("Now click the background image to place new image:")?;
                let (row, col) = self.wait_for_click()?.row_col();
                self.console.say(format!("You chose ({row},{col})"))?;
                return Ok(Some((row, col)));
            }
            if let Some((row, col)) = parse_location(&answer) {
                if row >= 0 && col >= 0 {
                    return Ok(Some((row, col)));
                }
            }
        }
    }

    fn wait_for_click(&mut self) -> FilterResult<Point> {
        match self.clicks.as_mut() {
            Some(clicks) => clicks.wait_for_click(),
            None => self.console.wait_for_click(),
        }
    }

    fn save(&mut self, grid: &PixelGrid) -> FilterResult<Outcome> {
        loop {
            let Some(name) = self
                .console
                .read_line("Enter filename to save image (or blank to skip saving): ")?
            else {
                return Ok(Outcome::Unsaved);
            };
            let name = name.trim();
            if name.is_empty() {
                return Ok(Outcome::Unsaved);
            }
            match save_grid(grid, name) {
                Ok(()) => return Ok(Outcome::Saved(PathBuf::from(name))),
                Err(err) => {
                    warn!("failed to save {name}: {err}");
                    self.console.say(format!("Unable to save {name}."))?;
                }
            }
        }
    }
}

/// Parses `(row,col)`. Whitespace around either number is allowed.
pub fn parse_location(text: &str) -> Option<(i64, i64)> {
    let inner = text.trim().strip_prefix('(')?.strip_suffix(')')?;
    let (row, col) = inner.split_once(',')?;
    Some((row.trim().parse().ok()?, col.trim().parse().ok()?))
}
