use crate::bracket::layout::LayoutOpts;
use crate::bracket::model::{BracketSpec, MutationStep};
use crate::foundation::core::Rgba8;
use crate::foundation::error::{PlayoffError, PlayoffResult};
use crate::render::painter::Theme;

/// Where the spare pause slots of a photo window go.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pause {
    Start,
    End,
    Both,
    Neither,
}

/// Spreads `count` photo instants across `[start_ms, end_ms]`.
///
/// The window is divided into equal pauses between shots, with optional
/// extra pauses before the first and after the last shot. Requesting more
/// instants than budgeted is a fatal sequence error.
#[derive(Debug)]
pub struct PhotoTimer {
    first_ms: f64,
    pause_ms: f64,
    count: usize,
    taken: usize,
}

impl PhotoTimer {
    pub fn new(start_ms: f64, end_ms: f64, count: usize, pause: Pause) -> Self {
        let pause_before = matches!(pause, Pause::Start | Pause::Both);
        let pause_after = matches!(pause, Pause::End | Pause::Both);

        let mut pauses = count.saturating_sub(1);
        if pause_before {
            pauses += 1;
        }
        if pause_after {
            pauses += 1;
        }
        let pause_ms = if pauses == 0 {
            0.0
        } else {
            (end_ms - start_ms) / pauses as f64
        };
        let first_ms = start_ms + if pause_before { pause_ms } else { 0.0 };

        Self {
            first_ms,
            pause_ms,
            count,
            taken: 0,
        }
    }

    /// Absolute timeline ms of the next photo.
    pub fn next(&mut self) -> PlayoffResult<f64> {
        if self.taken >= self.count {
            return Err(PlayoffError::sequence(format!(
                "photo timer exhausted after {} shots",
                self.count
            )));
        }
        let at = self.first_ms + self.pause_ms * self.taken as f64;
        self.taken += 1;
        Ok(at)
    }

    pub fn remaining(&self) -> usize {
        self.count - self.taken
    }
}

/// One step of a scripted animation, consumed in order by the sequencer.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Draw the connector lines and occlusion discs.
    DrawBracket,
    /// Draw the initial letters of one column.
    ShowColumn { column: usize },
    /// Capture a photo at the current frame.
    Photo,
    /// Advance the frame clock to an absolute timeline time.
    AdvanceTo { ms: f64 },
    /// Winner call-out above the grid.
    FinalResult {
        text: String,
        position: usize,
        color: Rgba8,
    },
    /// Reveal the full bracket over a time window: connector lines, then
    /// column after column of letters, then the winner call-out, with
    /// photos spread `Pause::Both` across the window.
    TimedReveal { start_ms: f64, end_ms: f64 },
    /// Cross out a root-to-leaf chain and write the replacement labels
    /// back, photos paced over `[start, mid]` and `[mid, end]`.
    Replace {
        steps: Vec<MutationStep>,
        color: Rgba8,
        position: usize,
        start_ms: f64,
        mid_ms: f64,
        end_ms: f64,
    },
}

/// A bracket plus the mutation script that animates it; the JSON document
/// the CLI consumes.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Storyboard {
    pub bracket: BracketSpec,
    #[serde(default)]
    pub layout: LayoutOpts,
    #[serde(default)]
    pub theme: Theme,
    pub script: Vec<Action>,
}

impl Storyboard {
    pub fn validate(&self) -> PlayoffResult<()> {
        self.bracket.validate()?;
        let columns = self.bracket.column_count();
        for (i, action) in self.script.iter().enumerate() {
            match action {
                Action::ShowColumn { column } if *column >= columns => {
                    return Err(PlayoffError::validation(format!(
                        "script step {i}: column {column} out of range"
                    )));
                }
                Action::Replace { steps, .. } => {
                    if steps.is_empty() {
                        return Err(PlayoffError::validation(format!(
                            "script step {i}: replace needs >= 1 mutation step"
                        )));
                    }
                    if steps.len() > columns {
                        return Err(PlayoffError::validation(format!(
                            "script step {i}: {} mutation steps exceed {columns} columns",
                            steps.len()
                        )));
                    }
                    for (j, step) in steps.iter().enumerate() {
                        let column = columns - 1 - j;
                        if step.row >= self.bracket.rows_in(column) {
                            return Err(PlayoffError::validation(format!(
                                "script step {i}: mutation {j} row {} out of range for column {column}",
                                step.row
                            )));
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// The reference 8-contestant bracket.
pub fn demo_bracket() -> BracketSpec {
    BracketSpec {
        columns: [
            vec!["Z", "A", "Q", "B", "R", "T", "S", "D"],
            vec!["A", "B", "R", "D"],
            vec!["A", "D"],
            vec!["A"],
        ]
        .into_iter()
        .map(|c| c.into_iter().map(String::from).collect())
        .collect(),
    }
}

/// The reference voiceover-timed script: tease the question, reveal the
/// bracket, then re-run it twice to find 2nd and 3rd place.
pub fn demo_script() -> Vec<Action> {
    let grey = Rgba8::rgb(0x66, 0x66, 0x66);
    let red = Rgba8::rgb(255, 0, 0);
    let blue = Rgba8::rgb(0, 0, 255);

    vec![
        Action::ShowColumn { column: 0 },
        Action::Photo,
        Action::AdvanceTo { ms: 2200.0 },
        Action::FinalResult {
            text: "??".to_string(),
            position: 0,
            color: grey,
        },
        Action::AdvanceTo { ms: 3750.0 },
        Action::TimedReveal {
            start_ms: 3750.0,
            end_ms: 6500.0,
        },
        Action::AdvanceTo { ms: 8000.0 },
        Action::FinalResult {
            text: "??".to_string(),
            position: 1,
            color: red,
        },
        Action::Replace {
            steps: vec![
                MutationStep::replace(0, "B"),
                MutationStep::replace(0, "B"),
                MutationStep::replace(0, "Z"),
                MutationStep::cross_out(1),
            ],
            color: red,
            position: 1,
            start_ms: 12000.0,
            mid_ms: 13750.0,
            end_ms: 16500.0,
        },
        Action::Replace {
            steps: vec![
                MutationStep::replace(0, "D"),
                MutationStep::replace(0, "Q"),
                MutationStep::replace(1, "Q"),
                MutationStep::cross_out(3),
            ],
            color: blue,
            position: 2,
            start_ms: 16500.0,
            mid_ms: 18250.0,
            end_ms: 21000.0,
        },
    ]
}

/// The full demo storyboard.
pub fn demo_storyboard() -> Storyboard {
    Storyboard {
        bracket: demo_bracket(),
        layout: LayoutOpts::default(),
        theme: Theme::default(),
        script: demo_script(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn photo_timer_end_pause_spreads_evenly() {
        // 4 shots over [0, 1000] with a trailing pause: 4 pauses of 250.
        let mut t = PhotoTimer::new(0.0, 1000.0, 4, Pause::End);
        assert_eq!(t.next().unwrap(), 0.0);
        assert_eq!(t.next().unwrap(), 250.0);
        assert_eq!(t.next().unwrap(), 500.0);
        assert_eq!(t.next().unwrap(), 750.0);
        assert!(t.next().is_err());
    }

    #[test]
    fn photo_timer_both_pause_offsets_first_shot() {
        // 3 shots over [0, 1000] with both pauses: 4 pauses of 250,
        // first shot lands at 250.
        let mut t = PhotoTimer::new(0.0, 1000.0, 3, Pause::Both);
        assert_eq!(t.next().unwrap(), 250.0);
        assert_eq!(t.next().unwrap(), 500.0);
        assert_eq!(t.next().unwrap(), 750.0);
    }

    #[test]
    fn photo_timer_single_shot_without_pauses() {
        let mut t = PhotoTimer::new(100.0, 900.0, 1, Pause::Neither);
        assert_eq!(t.next().unwrap(), 100.0);
        assert!(t.next().is_err());
    }

    #[test]
    fn demo_storyboard_validates() {
        demo_storyboard().validate().unwrap();
    }

    #[test]
    fn storyboard_rejects_out_of_range_steps() {
        let mut sb = demo_storyboard();
        sb.script.push(Action::ShowColumn { column: 9 });
        assert!(sb.validate().is_err());

        let mut sb = demo_storyboard();
        sb.script.push(Action::Replace {
            steps: vec![MutationStep::cross_out(5)],
            color: Rgba8::BLACK,
            position: 0,
            start_ms: 0.0,
            mid_ms: 1.0,
            end_ms: 2.0,
        });
        // Step 0 addresses the final column, which has a single row.
        assert!(sb.validate().is_err());
    }

    #[test]
    fn storyboard_json_roundtrip() {
        let sb = demo_storyboard();
        let s = serde_json::to_string_pretty(&sb).unwrap();
        let de: Storyboard = serde_json::from_str(&s).unwrap();
        de.validate().unwrap();
        assert_eq!(de.script.len(), sb.script.len());
    }
}
