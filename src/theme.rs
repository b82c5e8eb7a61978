//! Colors used by the frame
//!
//! Colors are packed as 0xRRGGBBAA, the same layout the shaders unpack.

pub const BLACK: u32 = 0x000000FF;
pub const WHITE: u32 = 0xFFFFFFFF;
pub const GREEN: u32 = 0x00FF00FF;

/// Split a packed color into its channels
pub fn unpack(color: u32) -> [u8; 4] {
    color.to_be_bytes()
}

/// Packed color as normalized floats, for clear colors
pub fn to_f64(color: u32) -> [f64; 4] {
    unpack(color).map(|c| c as f64 / 255.0)
}

#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
    pub background: u32,
    pub text: u32,
    /// Label color of the active tab
    pub accent: u32,
    pub pane_outline: u32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: BLACK,
            text: WHITE,
            accent: GREEN,
            pane_outline: WHITE,
        }
    }
}
