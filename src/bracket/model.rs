use crate::foundation::error::{PlayoffError, PlayoffResult};

/// One round of an elimination bracket and its initial labels, ordered
/// left-to-right from most contestants down to the single winner.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct BracketSpec {
    pub columns: Vec<Vec<String>>,
}

impl BracketSpec {
    pub fn new(columns: Vec<Vec<String>>) -> PlayoffResult<Self> {
        let spec = Self { columns };
        spec.validate()?;
        Ok(spec)
    }

    /// Check the binary-reduction shape: each column must hold exactly
    /// `ceil(previous / 2)` cells so the merge lines have somewhere to go,
    /// and the last column must hold the lone winner.
    pub fn validate(&self) -> PlayoffResult<()> {
        if self.columns.is_empty() {
            return Err(PlayoffError::validation("bracket must have >= 1 column"));
        }
        for (i, column) in self.columns.iter().enumerate() {
            if column.is_empty() {
                return Err(PlayoffError::validation(format!(
                    "column {i} must be non-empty"
                )));
            }
        }
        for (i, pair) in self.columns.windows(2).enumerate() {
            let expect = pair[0].len().div_ceil(2);
            if pair[1].len() != expect {
                return Err(PlayoffError::validation(format!(
                    "column {} has {} cells, expected ceil({}/2) = {}",
                    i + 1,
                    pair[1].len(),
                    pair[0].len(),
                    expect
                )));
            }
        }
        let last = self.columns.last().map(Vec::len).unwrap_or(0);
        if last != 1 {
            return Err(PlayoffError::validation(format!(
                "final column must hold exactly 1 cell, found {last}"
            )));
        }
        Ok(())
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn rows_in(&self, column: usize) -> usize {
        self.columns[column].len()
    }
}

/// The row of column `c + 1` that rows `2r` and `2r + 1` of column `c`
/// merge into.
pub fn merge_target(row: usize) -> usize {
    row / 2
}

/// A (column, row) position in the bracket grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct CellId {
    pub column: usize,
    pub row: usize,
}

impl CellId {
    pub fn new(column: usize, row: usize) -> Self {
        Self { column, row }
    }
}

/// One entry of a `replace_one_value` call. Step index 0 addresses the
/// final (rightmost) column; each subsequent step moves one column left.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MutationStep {
    pub row: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
}

impl MutationStep {
    pub fn cross_out(row: usize) -> Self {
        Self {
            row,
            replacement: None,
        }
    }

    pub fn replace(row: usize, text: impl Into<String>) -> Self {
        Self {
            row,
            replacement: Some(text.into()),
        }
    }
}

/// Mutable per-cell overwrite counters for one animation run.
///
/// Owned by the sequencer and passed explicitly; each overwrite of a cell
/// shifts where the next label for that logical position is drawn.
#[derive(Clone, Debug)]
pub struct AnimationState {
    iterations: Vec<Vec<usize>>,
}

impl AnimationState {
    pub fn new(spec: &BracketSpec) -> Self {
        Self {
            iterations: spec.columns.iter().map(|c| vec![0; c.len()]).collect(),
        }
    }

    pub fn iteration(&self, cell: CellId) -> usize {
        self.iterations[cell.column][cell.row]
    }

    /// Increment the cell's counter, returning the pre-increment value
    /// (the slot the cross-out mark lands on).
    pub fn bump(&mut self, cell: CellId) -> usize {
        let slot = &mut self.iterations[cell.column][cell.row];
        let before = *slot;
        *slot += 1;
        before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(shape: &[&[&str]]) -> Vec<Vec<String>> {
        shape
            .iter()
            .map(|c| c.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn validates_reference_shape() {
        let spec = BracketSpec::new(cols(&[
            &["Z", "A", "Q", "B", "R", "T", "S", "D"],
            &["A", "B", "R", "D"],
            &["A", "D"],
            &["A"],
        ]))
        .unwrap();
        assert_eq!(spec.column_count(), 4);
        assert_eq!(spec.rows_in(0), 8);
    }

    #[test]
    fn validates_odd_column_rounds_up() {
        // 5 -> 3 -> 2 -> 1 is a legal reduction.
        BracketSpec::new(cols(&[
            &["A", "B", "C", "D", "E"],
            &["A", "C", "E"],
            &["A", "E"],
            &["A"],
        ]))
        .unwrap();
    }

    #[test]
    fn rejects_bad_shapes() {
        assert!(BracketSpec::new(vec![]).is_err());
        assert!(BracketSpec::new(cols(&[&["A", "B"], &["A", "B"]])).is_err());
        assert!(BracketSpec::new(cols(&[&["A", "B"]])).is_err());
        assert!(BracketSpec::new(cols(&[&[], &["A"]])).is_err());
    }

    #[test]
    fn merge_law_pairs_adjacent_rows() {
        for r in 0..8usize {
            assert_eq!(merge_target(r), r / 2);
        }
        assert_eq!(merge_target(0), merge_target(1));
        assert_ne!(merge_target(1), merge_target(2));
    }

    #[test]
    fn bump_returns_pre_increment_value() {
        let spec = BracketSpec::new(cols(&[&["A", "B"], &["A"]])).unwrap();
        let mut state = AnimationState::new(&spec);
        let cell = CellId::new(1, 0);
        assert_eq!(state.bump(cell), 0);
        assert_eq!(state.bump(cell), 1);
        assert_eq!(state.iteration(cell), 2);
    }

    #[test]
    fn spec_json_roundtrip() {
        let spec = BracketSpec::new(cols(&[&["A", "B"], &["A"]])).unwrap();
        let s = serde_json::to_string(&spec).unwrap();
        let de: BracketSpec = serde_json::from_str(&s).unwrap();
        assert_eq!(de.columns, spec.columns);
    }
}
