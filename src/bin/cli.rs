use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use grid_filter::filter::{
    count_differing_pixels, edge_detect, green_screen_composite, scatter, DEFAULT_RADIUS,
    DEFAULT_THRESHOLD, DEFAULT_TOLERANCE,
};
use grid_filter::image_io::{load_grid, save_grid};
use grid_filter::prompt::{parse_location, Outcome, Session};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Scatter, edge-detect, green-screen or compare images.
/// Run without a subcommand for the interactive prompt.
#[derive(Parser)]
#[command(name = "grid-filter", version)]
struct Cli {
    /// Seed for scatter in the interactive session
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Move every pixel to a random spot within a radius
    Scatter {
        input: PathBuf,
        output: PathBuf,
        /// 1 to 100
        #[arg(long, default_value_t = DEFAULT_RADIUS)]
        radius: i32,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Black where neighbouring pixels differ by more than the threshold
    Edges {
        input: PathBuf,
        output: PathBuf,
        #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: i32,
    },
    /// Paste a green-screened overlay onto a background
    GreenScreen {
        background: PathBuf,
        overlay: PathBuf,
        output: PathBuf,
        /// Top-left corner of the overlay as ROW,COL
        #[arg(long, value_parser = parse_at, allow_hyphen_values = true)]
        at: (i64, i64),
        #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
        tolerance: i32,
    },
    /// Count the pixel locations where two images differ
    Compare { first: PathBuf, second: PathBuf },
}

fn parse_at(text: &str) -> Result<(i64, i64), String> {
    let text = text.trim();
    let wrapped = if text.starts_with('(') {
        text.to_string()
    } else {
        format!("({text})")
    };
    parse_location(&wrapped).ok_or_else(|| format!("expected ROW,COL, got {text:?}"))
}

fn load(path: &Path) -> Result<grid_filter::PixelGrid> {
    load_grid(path).with_context(|| format!("Failed to open image: {}", path.display()))
}

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let success = match cli.command {
        Some(command) => run_command(command)?,
        None => {
            let stdin = io::stdin();
            let mut session = Session::new(stdin.lock(), io::stdout()).with_seed(cli.seed);
            !matches!(
                session.run()?,
                Outcome::DimensionMismatch | Outcome::Compared(1..)
            )
        }
    };
    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Runs one subcommand. `false` means the exit status should be a failure:
/// `compare` found differing pixels.
fn run_command(command: Command) -> Result<bool> {
    match command {
        Command::Scatter {
            input,
            output,
            radius,
            seed,
        } => {
            let grid = load(&input)?;
            let scattered = match seed {
                Some(seed) => scatter(&grid, radius, &mut StdRng::seed_from_u64(seed))?,
                None => scatter(&grid, radius, &mut rand::rng())?,
            };
            save_grid(&scattered, &output)
                .with_context(|| format!("Failed to save image: {}", output.display()))?;
        }
        Command::Edges {
            input,
            output,
            threshold,
        } => {
            let edges = edge_detect(&load(&input)?, threshold)?;
            save_grid(&edges, &output)
                .with_context(|| format!("Failed to save image: {}", output.display()))?;
        }
        Command::GreenScreen {
            background,
            overlay,
            output,
            at: (row, col),
            tolerance,
        } => {
            let composite =
                green_screen_composite(&load(&background)?, &load(&overlay)?, tolerance, row, col)?;
            save_grid(&composite, &output)
                .with_context(|| format!("Failed to save image: {}", output.display()))?;
        }
        Command::Compare { first, second } => {
            let diff = count_differing_pixels(&load(&first)?, &load(&second)?)?;
            if diff == 0 {
                println!("These images are the same!");
            } else {
                println!("These images differ in {diff} pixel locations!");
                return Ok(false);
            }
        }
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_filter::color::{BLACK, WHITE};
    use grid_filter::PixelGrid;

    fn placement(args: &[&str]) -> (i64, i64) {
        let mut argv = vec!["grid-filter", "green-screen", "bg.png", "ov.png", "out.png"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Some(Command::GreenScreen { at, .. }) => at,
            _ => panic!("expected the green-screen subcommand"),
        }
    }

    #[test]
    fn test_parse_at_accepts_bare_and_parenthesised() {
        assert_eq!(parse_at("3,4"), Ok((3, 4)));
        assert_eq!(parse_at("(3,4)"), Ok((3, 4)));
        assert_eq!(parse_at(" 5 , 6 "), Ok((5, 6)));
        assert_eq!(parse_at("-1,2"), Ok((-1, 2)));
    }

    #[test]
    fn test_parse_at_rejects_malformed_input() {
        assert!(parse_at("3").is_err());
        assert!(parse_at("3;4").is_err());
        assert!(parse_at("(a,4)").is_err());
        assert!(parse_at("").is_err());
    }

    #[test]
    fn test_at_flag_allows_negative_and_parenthesised_values() {
        assert_eq!(placement(&["--at", "-1,2"]), (-1, 2));
        assert_eq!(placement(&["--at", "(3,4)"]), (3, 4));
        let far = format!("{},0", i64::MIN);
        assert_eq!(placement(&["--at", far.as_str()]), (i64::MIN, 0));
    }

    #[test]
    fn test_at_flag_is_required() {
        let argv = ["grid-filter", "green-screen", "bg.png", "ov.png", "out.png"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_no_subcommand_means_interactive() {
        let cli = Cli::try_parse_from(["grid-filter", "--seed", "7"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.seed, Some(7));
    }

    #[test]
    fn test_compare_status_follows_difference() {
        let dir = tempfile::tempdir().unwrap();
        let grid = PixelGrid::new(3, 3, WHITE);
        let first = dir.path().join("a.png");
        let same = dir.path().join("b.png");
        let changed = dir.path().join("c.png");
        save_grid(&grid, &first).unwrap();
        save_grid(&grid, &same).unwrap();
        save_grid(&grid.with_cell(1, 1, BLACK), &changed).unwrap();

        let compare = |second: &Path| Command::Compare {
            first: first.clone(),
            second: second.to_path_buf(),
        };
        assert!(run_command(compare(same.as_path())).unwrap());
        assert!(!run_command(compare(changed.as_path())).unwrap());
    }

    #[test]
    fn test_compare_mismatched_dimensions_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.png");
        let second = dir.path().join("b.png");
        save_grid(&PixelGrid::new(2, 3, WHITE), &first).unwrap();
        save_grid(&PixelGrid::new(3, 2, WHITE), &second).unwrap();

        assert!(run_command(Command::Compare { first, second }).is_err());
    }

    #[test]
    fn test_green_screen_far_placement_keeps_background() {
        let dir = tempfile::tempdir().unwrap();
        let background = dir.path().join("bg.png");
        let overlay = dir.path().join("ov.png");
        let output = dir.path().join("out.png");
        let grid = PixelGrid::new(2, 2, WHITE);
        save_grid(&grid, &background).unwrap();
        save_grid(&PixelGrid::new(1, 1, BLACK), &overlay).unwrap();

        let command = Command::GreenScreen {
            background,
            overlay,
            output: output.clone(),
            at: (i64::MIN, i64::MAX),
            tolerance: DEFAULT_TOLERANCE,
        };
        assert!(run_command(command).unwrap());
        assert_eq!(load_grid(&output).unwrap(), grid);
    }
}
