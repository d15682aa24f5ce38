use crate::foundation::error::{PlayoffError, PlayoffResult};

pub use kurbo::{Point, Rect, Vec2};

/// Absolute 0-based frame index on the capture timeline.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> PlayoffResult<Self> {
        if den == 0 {
            return Err(PlayoffError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(PlayoffError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in milliseconds.
    pub fn frame_duration_ms(self) -> f64 {
        1000.0 * f64::from(self.den) / f64::from(self.num)
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 60, den: 1 }
    }
}

/// Output canvas dimensions in logical pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for Canvas {
    // Portrait video target the reference diagrams were produced for.
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
        }
    }
}

/// Straight-alpha RGBA8 color. Serializes as its CSS hex string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// Parse `#RGB`, `#RRGGBB`, `#RRGGBBAA`, or a small set of CSS color
    /// names (the ones bracket scripts actually use).
    pub fn parse(s: &str) -> PlayoffResult<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }
        match s.to_ascii_lowercase().as_str() {
            "white" => Ok(Self::rgb(255, 255, 255)),
            "black" => Ok(Self::rgb(0, 0, 0)),
            "red" => Ok(Self::rgb(255, 0, 0)),
            "green" => Ok(Self::rgb(0, 128, 0)),
            "blue" => Ok(Self::rgb(0, 0, 255)),
            "lime" => Ok(Self::rgb(0, 255, 0)),
            "gray" | "grey" => Ok(Self::rgb(128, 128, 128)),
            other => Err(PlayoffError::validation(format!(
                "unknown color name \"{other}\""
            ))),
        }
    }

    /// CSS hex form, used verbatim in SVG output.
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!(
                "#{:02x}{:02x}{:02x}{:02x}",
                self.r, self.g, self.b, self.a
            )
        }
    }
}

fn parse_hex(s: &str) -> PlayoffResult<Rgba8> {
    fn hex_byte(pair: &str) -> PlayoffResult<u8> {
        u8::from_str_radix(pair, 16)
            .map_err(|_| PlayoffError::validation(format!("invalid hex byte \"{pair}\"")))
    }

    match s.len() {
        3 => {
            let mut it = s.chars();
            let mut next = || {
                let c = it.next().unwrap_or('0');
                hex_byte(&format!("{c}{c}"))
            };
            Ok(Rgba8 {
                r: next()?,
                g: next()?,
                b: next()?,
                a: 255,
            })
        }
        6 => Ok(Rgba8 {
            r: hex_byte(&s[0..2])?,
            g: hex_byte(&s[2..4])?,
            b: hex_byte(&s[4..6])?,
            a: 255,
        }),
        8 => Ok(Rgba8 {
            r: hex_byte(&s[0..2])?,
            g: hex_byte(&s[2..4])?,
            b: hex_byte(&s[4..6])?,
            a: hex_byte(&s[6..8])?,
        }),
        _ => Err(PlayoffError::validation(
            "hex color must be #RGB, #RRGGBB, or #RRGGBBAA",
        )),
    }
}

impl serde::Serialize for Rgba8 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Rgba8 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Rgba8::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_rejects_zero_terms() {
        assert!(Fps::new(0, 1).is_err());
        assert!(Fps::new(60, 0).is_err());
        assert_eq!(Fps::new(60, 1).unwrap().frame_duration_ms(), 1000.0 / 60.0);
    }

    #[test]
    fn color_parses_hex_and_names() {
        assert_eq!(Rgba8::parse("#666").unwrap(), Rgba8::rgb(0x66, 0x66, 0x66));
        assert_eq!(Rgba8::parse("#cc5500").unwrap(), Rgba8::rgb(0xcc, 0x55, 0x00));
        assert_eq!(
            Rgba8::parse("#11223344").unwrap(),
            Rgba8 {
                r: 0x11,
                g: 0x22,
                b: 0x33,
                a: 0x44
            }
        );
        assert_eq!(Rgba8::parse("red").unwrap(), Rgba8::rgb(255, 0, 0));
        assert!(Rgba8::parse("chartreuse-ish").is_err());
    }

    #[test]
    fn color_hex_roundtrip() {
        assert_eq!(Rgba8::rgb(0xcc, 0xcc, 0xcc).to_hex(), "#cccccc");
        let c: Rgba8 = serde_json::from_str("\"#666\"").unwrap();
        assert_eq!(c, Rgba8::rgb(0x66, 0x66, 0x66));
        let json = serde_json::to_string(&Rgba8::rgb(255, 0, 0)).unwrap();
        assert_eq!(json, "\"#ff0000\"");
        let back: Rgba8 = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Rgba8::rgb(255, 0, 0));
    }
}
