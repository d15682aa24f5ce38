use crate::bracket::layout::BracketLayout;
use crate::bracket::model::{AnimationState, BracketSpec, CellId, MutationStep};
use crate::encode::frames::{FrameSink, RunStamp, encode_png, frame_file_name};
use crate::foundation::core::Rgba8;
use crate::foundation::error::{PlayoffError, PlayoffResult};
use crate::render::painter::{BracketPainter, Theme};
use crate::render::surface::Surface;
use crate::sequence::clock::FrameClock;
use crate::sequence::script::{Action, Pause, PhotoTimer, Storyboard};

/// Lifecycle of one animation run. Transitions only move forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Idle,
    AwaitingStart,
    Playing,
    Complete,
}

/// Drives one scripted animation run: owns the overwrite counters and the
/// frame clock, interprets script actions into painter calls, and feeds
/// captured frames to the sink in order.
pub struct Sequencer<'a> {
    spec: BracketSpec,
    layout: BracketLayout,
    theme: Theme,
    state: AnimationState,
    clock: FrameClock,
    stamp: RunStamp,
    save_frames: bool,
    sink: &'a mut dyn FrameSink,
    run_state: RunState,
}

impl<'a> Sequencer<'a> {
    pub fn new(
        storyboard: &Storyboard,
        clock: FrameClock,
        save_frames: bool,
        sink: &'a mut dyn FrameSink,
    ) -> PlayoffResult<Self> {
        storyboard.validate()?;
        let layout = BracketLayout::new(&storyboard.bracket, storyboard.layout);
        Ok(Self {
            spec: storyboard.bracket.clone(),
            layout,
            theme: storyboard.theme,
            state: AnimationState::new(&storyboard.bracket),
            clock,
            stamp: RunStamp::invalid(),
            save_frames,
            sink,
            run_state: RunState::Idle,
        })
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn layout(&self) -> &BracketLayout {
        &self.layout
    }

    pub fn iteration(&self, cell: CellId) -> usize {
        self.state.iteration(cell)
    }

    pub fn frame(&self) -> u64 {
        self.clock.frame().0
    }

    /// Idle -> AwaitingStart: setup is done, waiting for the go signal.
    pub fn arm(&mut self) -> PlayoffResult<()> {
        if self.run_state != RunState::Idle {
            return Err(PlayoffError::sequence(format!(
                "arm called in state {:?}",
                self.run_state
            )));
        }
        self.run_state = RunState::AwaitingStart;
        Ok(())
    }

    /// AwaitingStart -> Playing. The stamp taken here names every frame
    /// of the run.
    pub fn start(&mut self, stamp: RunStamp) -> PlayoffResult<()> {
        if self.run_state != RunState::AwaitingStart {
            return Err(PlayoffError::sequence(format!(
                "start called in state {:?}",
                self.run_state
            )));
        }
        self.stamp = stamp;
        self.run_state = RunState::Playing;
        tracing::info!(stamp = %self.stamp, save_frames = self.save_frames, "run started");
        Ok(())
    }

    /// Interpret the whole script, then close the sink.
    /// Playing -> Complete.
    pub fn run(&mut self, surface: &mut dyn Surface, script: &[Action]) -> PlayoffResult<()> {
        if self.run_state != RunState::Playing {
            return Err(PlayoffError::sequence(format!(
                "run called in state {:?}",
                self.run_state
            )));
        }
        for action in script {
            tracing::debug!(frame = self.clock.frame().0, ?action, "script step");
            self.step(surface, action)?;
        }
        self.run_state = RunState::Complete;
        self.sink.finish()?;
        tracing::info!(
            frames = self.clock.frame().0,
            total_ms = self.clock.timeline_ms(),
            "run complete"
        );
        Ok(())
    }

    fn step(&mut self, surface: &mut dyn Surface, action: &Action) -> PlayoffResult<()> {
        match action {
            Action::DrawBracket => {
                let painter = BracketPainter::new(&self.spec, &self.layout, self.theme);
                painter.draw_bracket(surface);
                Ok(())
            }
            Action::ShowColumn { column } => {
                let painter = BracketPainter::new(&self.spec, &self.layout, self.theme);
                painter.draw_initial_letters(surface, *column);
                Ok(())
            }
            Action::Photo => take_photo(
                &mut self.clock,
                self.sink,
                &self.stamp,
                self.save_frames,
                surface,
            ),
            Action::AdvanceTo { ms } => self.clock.advance_to_ms(*ms),
            Action::FinalResult {
                text,
                position,
                color,
            } => {
                let painter = BracketPainter::new(&self.spec, &self.layout, self.theme);
                painter.draw_final_result(surface, text, *position, *color);
                Ok(())
            }
            Action::TimedReveal { start_ms, end_ms } => {
                self.timed_reveal(surface, *start_ms, *end_ms)
            }
            Action::Replace {
                steps,
                color,
                position,
                start_ms,
                mid_ms,
                end_ms,
            } => self.replace_one_value(
                surface, steps, *color, *position, *start_ms, *mid_ms, *end_ms,
            ),
        }
    }

    /// Reveal the whole bracket over `[start_ms, end_ms]`: connector
    /// lines first, then one column of letters per photo, then the winner
    /// call-out, photos spread `Pause::Both` across the window.
    fn timed_reveal(
        &mut self,
        surface: &mut dyn Surface,
        start_ms: f64,
        end_ms: f64,
    ) -> PlayoffResult<()> {
        self.clock.advance_to_ms(start_ms)?;
        let columns = self.spec.column_count();
        let mut timer = PhotoTimer::new(start_ms, end_ms, columns + 1, Pause::Both);

        let painter = BracketPainter::new(&self.spec, &self.layout, self.theme);
        painter.draw_bracket(surface);
        for column in 0..columns {
            painter.draw_initial_letters(surface, column);
            self.clock.advance_to_ms(timer.next()?)?;
            take_photo(
                &mut self.clock,
                self.sink,
                &self.stamp,
                self.save_frames,
                surface,
            )?;
        }

        painter.draw_final_result(
            surface,
            &self.spec.columns[columns - 1][0],
            0,
            self.theme.initial_letter,
        );
        self.clock.advance_to_ms(timer.next()?)?;
        take_photo(
            &mut self.clock,
            self.sink,
            &self.stamp,
            self.save_frames,
            surface,
        )?;

        self.clock.advance_to_ms(end_ms)
    }

    /// Re-run the bracket with one contestant removed.
    ///
    /// `steps[0]` addresses the final (rightmost) column and each further
    /// step moves one column left. Cross-outs land on the current
    /// iteration slot over `[start_ms, mid_ms]`; replacements are queued
    /// leftmost-first and drawn at the bumped slot over `[mid_ms,
    /// end_ms]`. A replacement at the root also rewrites the call-out at
    /// `position` and lingers half a second on it.
    fn replace_one_value(
        &mut self,
        surface: &mut dyn Surface,
        steps: &[MutationStep],
        color: Rgba8,
        position: usize,
        start_ms: f64,
        mid_ms: f64,
        end_ms: f64,
    ) -> PlayoffResult<()> {
        let root = steps
            .first()
            .ok_or_else(|| PlayoffError::sequence("replace needs >= 1 step"))?;

        let painter = BracketPainter::new(&self.spec, &self.layout, self.theme);
        let mut timer = PhotoTimer::new(start_ms, mid_ms, steps.len(), Pause::End);
        let mut column = self.spec.column_count();
        let mut overwrite: Vec<(CellId, &str)> = Vec::new();
        for step in steps {
            column -= 1;
            let cell = CellId::new(column, step.row);
            let iteration = self.state.bump(cell);
            let at = self.layout.cell_position(cell, iteration);
            painter.cross_out(surface, at, color);
            if let Some(text) = &step.replacement {
                overwrite.insert(0, (cell, text));
            }
            self.clock.advance_to_ms(timer.next()?)?;
            take_photo(
                &mut self.clock,
                self.sink,
                &self.stamp,
                self.save_frames,
                surface,
            )?;
        }

        let mut timer = PhotoTimer::new(mid_ms, end_ms, overwrite.len(), Pause::End);
        for (cell, text) in overwrite {
            let at = self.layout.cell_position(cell, self.state.iteration(cell));
            painter.add_letter(surface, at, text, color);
            self.clock.advance_to_ms(timer.next()?)?;
            take_photo(
                &mut self.clock,
                self.sink,
                &self.stamp,
                self.save_frames,
                surface,
            )?;
        }

        if let Some(text) = &root.replacement {
            painter.draw_final_result(surface, text, position, color);
            let frames = 500.0 / self.clock.frame_duration_ms();
            self.clock.advance_frames(frames)?;
        }
        Ok(())
    }
}

/// Capture one photo. When saving, the photo claims the current frame
/// index for its file name; when paced, it holds one frame of real time
/// either way.
fn take_photo(
    clock: &mut FrameClock,
    sink: &mut dyn FrameSink,
    stamp: &RunStamp,
    save_frames: bool,
    surface: &mut dyn Surface,
) -> PlayoffResult<()> {
    if save_frames {
        let index = clock.consume_frame();
        let name = frame_file_name(stamp, index.0);
        let pixels = surface.capture()?;
        let png = encode_png(&pixels)?;
        tracing::debug!(%name, bytes = png.len(), "photo");
        sink.push_frame(&name, &png)?;
    }
    clock.hold_one_frame();
    Ok(())
}
