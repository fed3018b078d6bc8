use std::{path::PathBuf, str::FromStr};

use crate::render::{BitDepth, Pixel};

/// Settings for the viewer binary.
///
/// Every field has a default; `INKBUF_*` environment variables override them.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewerConfig {
    pub title: String,
    pub width: Pixel,
    pub height: Pixel,

    /// Depth of the emulated panel
    pub depth: BitDepth,

    /// Squash the finished frame to 1 bpp with the 2x2 pattern before presenting
    pub dither_to_bitmap: bool,

    /// Without a font the viewer skips the caption
    pub font_path: Option<PathBuf>,
    pub font_size: Pixel,
}
impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "inkbuf".to_owned(),
            width: 600,
            height: 800,
            depth: BitDepth::Gray2,
            dither_to_bitmap: false,
            font_path: None,
            font_size: 32,
        }
    }
}

impl ViewerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`; values that don't parse are logged and ignored
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(bpp) = parse::<u32>(&lookup, "INKBUF_BPP") {
            match BitDepth::from_bits(bpp) {
                Ok(depth) => config.depth = depth,
                Err(err) => log::warn!("ignoring INKBUF_BPP: {err}"),
            }
        }
        if let Some(dither) = parse::<bool>(&lookup, "INKBUF_DITHER") {
            config.dither_to_bitmap = dither;
        }
        if let Some(path) = lookup("INKBUF_FONT") {
            config.font_path = Some(PathBuf::from(path));
        }
        if let Some(size) = parse::<Pixel>(&lookup, "INKBUF_FONT_SIZE") {
            if size > 0 {
                config.font_size = size;
            } else {
                log::warn!("ignoring INKBUF_FONT_SIZE={size}");
            }
        }

        config
    }
}

fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let value = lookup(key)?;
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            log::warn!("ignoring {key}={value:?}: not a valid value");
            None
        }
    }
}
