use palette::Srgb;

/// A packed 24-bit color, `0xRRGGBB`. There is no alpha channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color(u32);

pub const WHITE: Color = Color(0xFFFFFF);
pub const BLACK: Color = Color(0x000000);
pub const GREEN: Color = Color(0x00FF00);

const RGB_MASK: u32 = 0xFF_FFFF;

impl Color {
    /// Bits above the low 24 are discarded.
    pub const fn from_packed(value: u32) -> Self {
        Self(value & RGB_MASK)
    }

    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self(((red as u32) << 16) | ((green as u32) << 8) | blue as u32)
    }

    pub const fn packed(self) -> u32 {
        self.0
    }

    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    pub fn components(self) -> Srgb<u8> {
        Srgb::new(self.red(), self.green(), self.blue())
    }
}

impl From<Srgb<u8>> for Color {
    fn from(rgb: Srgb<u8>) -> Self {
        Self::from_rgb(rgb.red, rgb.green, rgb.blue)
    }
}

impl From<image::Rgb<u8>> for Color {
    fn from(pixel: image::Rgb<u8>) -> Self {
        let [r, g, b] = pixel.0;
        Self::from_rgb(r, g, b)
    }
}

impl From<Color> for image::Rgb<u8> {
    fn from(color: Color) -> Self {
        image::Rgb([color.red(), color.green(), color.blue()])
    }
}

/// Chebyshev distance between two colors: the largest absolute difference
/// over the red, green and blue channels.
pub fn color_distance(a: Color, b: Color) -> i32 {
    let (a, b) = (a.components(), b.components());
    let dr = (a.red as i32 - b.red as i32).abs();
    let dg = (a.green as i32 - b.green as i32).abs();
    let db = (a.blue as i32 - b.blue as i32).abs();
    dr.max(dg).max(db)
}
