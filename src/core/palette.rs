use crate::error::{PlotError, PlotResult};
use crate::render::Color;

/// Default group colors, in assignment order.
pub static DEFAULT_PALETTE: [Color; 12] = [
    Color::rgb8(0xff, 0x00, 0x00),
    Color::rgb8(0x00, 0xff, 0x00),
    Color::rgb8(0x00, 0x00, 0xff),
    Color::rgb8(0x00, 0x8f, 0x5d),
    Color::rgb8(0x72, 0xe0, 0x6a),
    Color::rgb8(0xbc, 0xe9, 0x31),
    Color::rgb8(0xf6, 0x85, 0x11),
    Color::rgb8(0x73, 0x26, 0xd3),
    Color::rgb8(0x7e, 0x84, 0xfa),
    Color::rgb8(0x40, 0x46, 0xca),
    Color::rgb8(0x0f, 0xb5, 0xae),
    Color::rgb8(0xcb, 0x5d, 0x00),
];

/// Non-empty color cycle indexed by group creation order.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    pub fn new(colors: Vec<Color>) -> PlotResult<Self> {
        if colors.is_empty() {
            return Err(PlotError::InvalidData(
                "palette must contain at least one color".to_owned(),
            ));
        }
        for color in &colors {
            color.validate()?;
        }
        Ok(Self { colors })
    }

    /// Parses CSS-like color literals, e.g. `"#ff0000"` or `"rgba(0,0,0,0.45)"`.
    pub fn parse<S: AsRef<str>>(literals: &[S]) -> PlotResult<Self> {
        let colors = literals
            .iter()
            .map(|literal| Color::parse(literal.as_ref()))
            .collect::<PlotResult<Vec<_>>>()?;
        Self::new(colors)
    }

    /// The same color for every group.
    #[must_use]
    pub fn uniform(color: Color) -> Self {
        Self {
            colors: vec![color],
        }
    }

    #[must_use]
    pub fn color_for(&self, group_index: usize) -> Color {
        self.colors[group_index % self.colors.len()]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    #[must_use]
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_PALETTE.to_vec(),
        }
    }
}
