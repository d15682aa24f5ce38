use std::time::{Duration, Instant};

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{PlayoffError, PlayoffResult};

/// External playback clock frame pacing can synchronize against, e.g. a
/// voiceover track position.
pub trait AudioClock: Send {
    /// Elapsed playback position in milliseconds.
    fn position_ms(&self) -> f64;
}

/// Blocks the caller until a target point on the virtual timeline has
/// been reached. Unpaced runs install no pacer and never block.
pub trait Pacer: Send {
    /// Suspend until the reference clock catches up to
    /// `target_timeline_ms`.
    fn pace(&mut self, target_timeline_ms: f64);

    /// Suspend for a fixed timeline duration (photo playback simulation).
    fn hold(&mut self, duration_ms: f64);
}

/// Wall-clock pacer. `slowness` scales every wait (speed = slowness⁻¹);
/// when an audio clock is present its position replaces the wall clock so
/// frames stay locked to the voiceover.
pub struct SleepPacer {
    started: Instant,
    slowness: f64,
    audio: Option<Box<dyn AudioClock>>,
}

impl SleepPacer {
    pub fn new(slowness: f64) -> Self {
        Self {
            started: Instant::now(),
            slowness,
            audio: None,
        }
    }

    pub fn with_audio_clock(mut self, audio: Box<dyn AudioClock>) -> Self {
        self.audio = Some(audio);
        self
    }

    fn position_ms(&self) -> f64 {
        match &self.audio {
            Some(audio) => audio.position_ms(),
            None => self.started.elapsed().as_secs_f64() * 1000.0,
        }
    }
}

impl Pacer for SleepPacer {
    fn pace(&mut self, target_timeline_ms: f64) {
        let wait_ms = (target_timeline_ms - self.position_ms()) * self.slowness;
        if wait_ms > 0.0 {
            std::thread::sleep(Duration::from_secs_f64(wait_ms / 1000.0));
        }
    }

    fn hold(&mut self, duration_ms: f64) {
        let wait_ms = duration_ms * self.slowness;
        if wait_ms > 0.0 {
            std::thread::sleep(Duration::from_secs_f64(wait_ms / 1000.0));
        }
    }
}

/// Monotonic frame counter driving playback pacing and frame naming.
///
/// The counter only moves forward; a negative advance or a time-advance
/// behind the current frame is a fatal sequence error.
pub struct FrameClock {
    fps: Fps,
    frame: u64,
    pacer: Option<Box<dyn Pacer>>,
}

impl FrameClock {
    pub fn new(fps: Fps) -> Self {
        Self {
            fps,
            frame: 0,
            pacer: None,
        }
    }

    pub fn with_pacer(mut self, pacer: Box<dyn Pacer>) -> Self {
        self.pacer = Some(pacer);
        self
    }

    pub fn frame(&self) -> FrameIndex {
        FrameIndex(self.frame)
    }

    pub fn frame_duration_ms(&self) -> f64 {
        self.fps.frame_duration_ms()
    }

    /// Elapsed virtual time at the current frame.
    pub fn timeline_ms(&self) -> f64 {
        self.frame as f64 * self.frame_duration_ms()
    }

    /// Advance the counter by `floor(frames)` and, when paced, block
    /// until the reference clock reaches the new timeline position.
    pub fn advance_frames(&mut self, frames: f64) -> PlayoffResult<()> {
        if !frames.is_finite() || frames < 0.0 {
            return Err(PlayoffError::sequence(format!(
                "cannot advance by {frames} frames"
            )));
        }
        self.frame += frames.floor() as u64;
        let target = self.timeline_ms();
        if let Some(pacer) = &mut self.pacer {
            pacer.pace(target);
        }
        Ok(())
    }

    /// Frames needed to reach absolute timeline time `ms`. Fails when the
    /// counter is already past it.
    pub fn frames_until_ms(&self, ms: f64) -> PlayoffResult<u64> {
        let target_frame = (ms / self.frame_duration_ms()).floor() as i64;
        let remaining = target_frame - self.frame as i64;
        if remaining < 0 {
            return Err(PlayoffError::sequence(format!(
                "time {ms}ms is behind the frame counter (frame {})",
                self.frame
            )));
        }
        Ok(remaining as u64)
    }

    /// Advance to absolute timeline time `ms` (forward only).
    pub fn advance_to_ms(&mut self, ms: f64) -> PlayoffResult<()> {
        let remaining = self.frames_until_ms(ms)?;
        self.advance_frames(remaining as f64)
    }

    /// Claim the current frame index for a captured photo and step past
    /// it without pacing; the photo hold supplies the real-time delay.
    pub fn consume_frame(&mut self) -> FrameIndex {
        let index = FrameIndex(self.frame);
        self.frame += 1;
        index
    }

    /// One frame's worth of real-time hold (no counter movement); used
    /// after each captured photo when pacing is on.
    pub fn hold_one_frame(&mut self) {
        let duration = self.frame_duration_ms();
        if let Some(pacer) = &mut self.pacer {
            pacer.hold(duration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock() -> FrameClock {
        FrameClock::new(Fps::default())
    }

    #[test]
    fn advances_by_floor_of_frames() {
        let mut c = clock();
        c.advance_frames(2.9).unwrap();
        assert_eq!(c.frame(), FrameIndex(2));
        c.advance_frames(0.0).unwrap();
        assert_eq!(c.frame(), FrameIndex(2));
    }

    #[test]
    fn negative_advance_is_fatal() {
        let mut c = clock();
        let err = c.advance_frames(-1.0).unwrap_err();
        assert!(err.to_string().contains("sequence error"));
    }

    #[test]
    fn counter_is_monotonic_across_time_advances() {
        // 1000 / (1000/60) lands just under 60 in doubles and floors to
        // 59; the clock inherits that truncation on purpose.
        let mut c = clock();
        c.advance_to_ms(1000.0).unwrap();
        assert_eq!(c.frame(), FrameIndex(59));
        c.advance_to_ms(1000.0).unwrap();
        assert_eq!(c.frame(), FrameIndex(59));
        c.advance_to_ms(1500.0).unwrap();
        assert_eq!(c.frame(), FrameIndex(90));
    }

    #[test]
    fn backward_time_advance_is_fatal() {
        let mut c = clock();
        c.advance_to_ms(2000.0).unwrap();
        assert_eq!(c.frame(), FrameIndex(119));
        assert!(c.advance_to_ms(1980.0).is_err());
        // Counter must be untouched by the failed call.
        assert_eq!(c.frame(), FrameIndex(119));
    }

    #[test]
    fn timeline_tracks_frame_duration() {
        let mut c = FrameClock::new(Fps::new(50, 1).unwrap());
        c.advance_frames(5.0).unwrap();
        assert_eq!(c.timeline_ms(), 100.0);
    }
}
