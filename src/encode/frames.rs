use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Datelike, Timelike};

use crate::foundation::error::{PlayoffError, PlayoffResult};
use crate::render::surface::FramePixels;

/// Wall-clock identity of one capture run, baked into every frame file
/// name so runs never collide in a shared directory.
///
/// Colons and dots are illegal or awkward in file names on common
/// filesystems, so the stamp uses lookalike separators (`⸱` for dates,
/// `⦂` for times) that survive everywhere.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunStamp(String);

impl RunStamp {
    pub fn now() -> Self {
        Self::from_datetime(chrono::Local::now())
    }

    pub fn from_datetime<Tz: chrono::TimeZone>(at: chrono::DateTime<Tz>) -> Self {
        Self(format!(
            "{:04}\u{2e31}{:02}\u{2e31}{:02} {:02}\u{2982}{:02}\u{2982}{:02}",
            at.year(),
            at.month(),
            at.day(),
            at.hour(),
            at.minute(),
            at.second()
        ))
    }

    /// All-zeros sentinel used when frames are rendered without a real
    /// capture run (previews, tests).
    pub fn invalid() -> Self {
        Self("0000\u{2e31}00\u{2e31}00 00\u{2982}00\u{2982}00".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `"{stamp} {index:04}.png"`; zero-padding keeps lexicographic order
/// equal to capture order for runs under 10000 frames.
pub fn frame_file_name(stamp: &RunStamp, index: u64) -> String {
    format!("{stamp} {index:04}.png")
}

/// Encode straight-alpha RGBA8 pixels as a PNG byte buffer.
pub fn encode_png(pixels: &FramePixels) -> PlayoffResult<Vec<u8>> {
    use image::ImageEncoder;

    let expected = pixels.width as usize * pixels.height as usize * 4;
    if pixels.data.len() != expected {
        return Err(PlayoffError::encode(format!(
            "pixel buffer holds {} bytes, {}x{} rgba needs {expected}",
            pixels.data.len(),
            pixels.width,
            pixels.height
        )));
    }

    let mut out = Vec::new();
    image::codecs::png::PngEncoder::new(&mut out)
        .write_image(
            &pixels.data,
            pixels.width,
            pixels.height,
            image::ExtendedColorType::Rgba8,
        )
        .context("png encode")?;
    Ok(out)
}

/// Destination for the ordered stream of captured frames.
pub trait FrameSink {
    /// Append one encoded frame. Names arrive in capture order.
    fn push_frame(&mut self, name: &str, png: &[u8]) -> PlayoffResult<()>;

    /// Flush and close the destination. Must be called exactly once,
    /// after the last frame.
    fn finish(&mut self) -> PlayoffResult<()>;
}

/// In-memory sink for tests and preview tooling.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub frames: Vec<(String, Vec<u8>)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names(&self) -> Vec<&str> {
        self.frames.iter().map(|(n, _)| n.as_str()).collect()
    }
}

impl FrameSink for MemorySink {
    fn push_frame(&mut self, name: &str, png: &[u8]) -> PlayoffResult<()> {
        self.frames.push((name.to_string(), png.to_vec()));
        Ok(())
    }

    fn finish(&mut self) -> PlayoffResult<()> {
        Ok(())
    }
}

/// Writes each frame as a loose PNG file under one directory.
#[derive(Debug)]
pub struct DirSink {
    dir: PathBuf,
}

impl DirSink {
    pub fn create(dir: impl Into<PathBuf>) -> PlayoffResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("create frame directory {}", dir.display()))?;
        Ok(Self { dir })
    }
}

impl FrameSink for DirSink {
    fn push_frame(&mut self, name: &str, png: &[u8]) -> PlayoffResult<()> {
        let path = self.dir.join(name);
        fs::write(&path, png).with_context(|| format!("write frame {}", path.display()))?;
        Ok(())
    }

    fn finish(&mut self) -> PlayoffResult<()> {
        Ok(())
    }
}

/// Packages the run as a single zip archive, entries in capture order.
pub struct ZipSink {
    writer: Option<zip::ZipWriter<fs::File>>,
    path: PathBuf,
}

impl ZipSink {
    pub fn create(path: impl AsRef<Path>) -> PlayoffResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file =
            fs::File::create(&path).with_context(|| format!("create {}", path.display()))?;
        Ok(Self {
            writer: Some(zip::ZipWriter::new(file)),
            path,
        })
    }
}

impl FrameSink for ZipSink {
    fn push_frame(&mut self, name: &str, png: &[u8]) -> PlayoffResult<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| PlayoffError::encode("zip sink already finished"))?;
        // PNG is already compressed; store entries as-is.
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        writer
            .start_file(name, options)
            .with_context(|| format!("start zip entry {name}"))?;
        writer
            .write_all(png)
            .with_context(|| format!("write zip entry {name}"))?;
        Ok(())
    }

    fn finish(&mut self) -> PlayoffResult<()> {
        let writer = self
            .writer
            .take()
            .ok_or_else(|| PlayoffError::encode("zip sink already finished"))?;
        writer
            .finish()
            .with_context(|| format!("finalize {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn stamp_formats_with_lookalike_separators() {
        let at = chrono::Utc.with_ymd_and_hms(2026, 3, 7, 9, 5, 42).unwrap();
        let stamp = RunStamp::from_datetime(at);
        assert_eq!(stamp.as_str(), "2026\u{2e31}03\u{2e31}07 09\u{2982}05\u{2982}42");
        assert!(!stamp.as_str().contains(':'));
    }

    #[test]
    fn sentinel_stamp_is_all_zeros() {
        assert_eq!(
            RunStamp::invalid().as_str(),
            "0000\u{2e31}00\u{2e31}00 00\u{2982}00\u{2982}00"
        );
    }

    #[test]
    fn frame_names_zero_pad_to_four() {
        let stamp = RunStamp::invalid();
        assert_eq!(
            frame_file_name(&stamp, 0),
            "0000\u{2e31}00\u{2e31}00 00\u{2982}00\u{2982}00 0000.png"
        );
        assert_eq!(
            frame_file_name(&stamp, 137),
            "0000\u{2e31}00\u{2e31}00 00\u{2982}00\u{2982}00 0137.png"
        );
        assert!(frame_file_name(&stamp, 9) < frame_file_name(&stamp, 10));
    }

    #[test]
    fn encode_png_rejects_short_buffer() {
        let pixels = FramePixels {
            width: 2,
            height: 2,
            data: vec![0; 8],
        };
        let err = encode_png(&pixels).unwrap_err();
        assert!(err.to_string().contains("encode error:"));
    }

    #[test]
    fn encode_png_emits_signature() {
        let pixels = FramePixels {
            width: 2,
            height: 1,
            data: vec![255, 0, 0, 255, 0, 0, 255, 255],
        };
        let png = encode_png(&pixels).unwrap();
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    }

    #[test]
    fn memory_sink_preserves_order() {
        let mut sink = MemorySink::new();
        sink.push_frame("a.png", &[1]).unwrap();
        sink.push_frame("b.png", &[2]).unwrap();
        sink.finish().unwrap();
        assert_eq!(sink.names(), vec!["a.png", "b.png"]);
    }
}
