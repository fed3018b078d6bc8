use std::{fmt::Display, path::Path};

use eyre::WrapErr;
use fontdue::{Font as FontData, FontSettings};

/// Simple wrapper for the `&'static str` returned by `fontdue`;
/// we need something that implements `Error` for `eyre`
#[derive(Debug)]
pub struct FontError(&'static str);
impl Display for FontError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FontError: {}", self.0)
    }
}
impl std::error::Error for FontError {}

/// A single loaded face. Glyph masks come out of here at whatever pixel size is asked for.
pub struct Typeface {
    data: FontData,
}
impl Typeface {
    pub fn from_bytes(bytes: &[u8]) -> eyre::Result<Self> {
        let data = FontData::from_bytes(bytes, FontSettings::default())
            .map_err(FontError)
            .wrap_err("parsing font data")?;
        Ok(Self { data })
    }

    pub fn from_path(path: &Path) -> eyre::Result<Self> {
        let bytes = std::fs::read(path)
            .wrap_err_with(|| format!("reading font file {}", path.display()))?;
        Self::from_bytes(&bytes).wrap_err_with(|| format!("loading {}", path.display()))
    }

    pub fn font(&self) -> &FontData {
        &self.data
    }
}
