use crate::{Color, FilterResult, PixelGrid};
use image::io::Reader;
use image::{ImageBuffer, Rgb, RgbImage};
use log::info;
use std::path::Path;

/// Decodes an image file into a grid. Any alpha channel is dropped.
pub fn load_grid(path: impl AsRef<Path>) -> FilterResult<PixelGrid> {
    let path = path.as_ref();
    let img = Reader::open(path)?.with_guessed_format()?.decode()?;
    let grid = grid_from_image(&img.to_rgb8());
    info!(
        "loaded {} ({}x{})",
        path.display(),
        grid.rows(),
        grid.cols()
    );
    Ok(grid)
}

/// Encodes a grid to `path`; the format follows the file extension.
pub fn save_grid(grid: &PixelGrid, path: impl AsRef<Path>) -> FilterResult<()> {
    let path = path.as_ref();
    image_from_grid(grid).save(path)?;
    info!("saved {}", path.display());
    Ok(())
}

pub fn grid_from_image(img: &RgbImage) -> PixelGrid {
    PixelGrid::from_fn(img.height() as usize, img.width() as usize, |row, col| {
        Color::from(*img.get_pixel(col as u32, row as u32))
    })
}

pub fn image_from_grid(grid: &PixelGrid) -> RgbImage {
    ImageBuffer::from_fn(grid.cols() as u32, grid.rows() as u32, |x, y| {
        Rgb::from(grid[(y as usize, x as usize)])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{GREEN, WHITE};

    #[test]
    fn grid_rows_follow_image_height() {
        let img = ImageBuffer::from_fn(3, 2, |x, y| Rgb([x as u8, y as u8, 7]));
        let grid = grid_from_image(&img);
        assert_eq!(grid.dimensions(), (2, 3));
        assert_eq!(grid[(1, 2)], Color::from_rgb(2, 1, 7));
        assert_eq!(image_from_grid(&grid), img);
    }

    #[test]
    fn png_save_and_load_preserves_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.png");
        let grid = PixelGrid::new(4, 6, WHITE).with_cell(3, 5, GREEN);

        save_grid(&grid, &path).unwrap();
        assert_eq!(load_grid(&path).unwrap(), grid);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_grid(dir.path().join("nope.png")).is_err());
    }
}
