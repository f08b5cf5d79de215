use crate::bookmark::key::Selection;
use crate::paradigm::grid::Grid;
use crate::quiz::answer::answers_match;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellStatus {
    Pending,
    Correct,
    Wrong,
    Revealed,
}

impl CellStatus {
    pub fn is_locked(self) -> bool {
        matches!(self, CellStatus::Correct | CellStatus::Revealed)
    }
}

#[derive(Clone, Debug)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
    pub expected: String,
    pub input: String,
    pub status: CellStatus,
}

/// The user's answers for one table, one cell per non-empty form.
pub struct QuizTable {
    pub selection: Selection,
    pub grid: Grid,
    cells: Vec<Cell>,
    cursor: usize,
    strict_accents: bool,
    /// Set once a check of this table has gone into the practice history.
    recorded: bool,
}

impl QuizTable {
    pub fn new(selection: Selection, grid: &Grid, strict_accents: bool) -> Self {
        let mut cells = Vec::with_capacity(grid.cell_count());
        for (row, form_row) in grid.rows.iter().enumerate() {
            for (col, form) in form_row.forms.iter().enumerate() {
                if form.is_empty() {
                    continue;
                }
                cells.push(Cell {
                    row,
                    col,
                    expected: form.clone(),
                    input: String::new(),
                    status: CellStatus::Pending,
                });
            }
        }
        Self {
            selection,
            grid: grid.clone(),
            cells,
            cursor: 0,
            strict_accents,
            recorded: false,
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell_at(&self, row: usize, col: usize) -> Option<&Cell> {
        self.cells.iter().find(|c| c.row == row && c.col == col)
    }

    pub fn cursor(&self) -> Option<&Cell> {
        self.cells.get(self.cursor)
    }

    pub fn is_cursor(&self, row: usize, col: usize) -> bool {
        self.cursor().is_some_and(|c| c.row == row && c.col == col)
    }

    fn editable(&mut self) -> Option<&mut Cell> {
        self.cells
            .get_mut(self.cursor)
            .filter(|c| !c.status.is_locked())
    }

    pub fn type_char(&mut self, ch: char) {
        if let Some(cell) = self.editable() {
            cell.input.push(ch);
            cell.status = CellStatus::Pending;
        }
    }

    pub fn backspace(&mut self) {
        if let Some(cell) = self.editable() {
            cell.input.pop();
            cell.status = CellStatus::Pending;
        }
    }

    pub fn next_cell(&mut self) {
        if !self.cells.is_empty() {
            self.cursor = (self.cursor + 1) % self.cells.len();
        }
    }

    pub fn prev_cell(&mut self) {
        if !self.cells.is_empty() {
            self.cursor = self.cursor.checked_sub(1).unwrap_or(self.cells.len() - 1);
        }
    }

    /// Move to the nearest cell in the same column, up (`down == false`) or down.
    pub fn move_vertical(&mut self, down: bool) {
        let Some(current) = self.cursor() else {
            return;
        };
        let (row, col) = (current.row, current.col);
        let candidates = self
            .cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.col == col && if down { c.row > row } else { c.row < row });
        let target = if down {
            candidates.min_by_key(|(_, c)| c.row)
        } else {
            candidates.max_by_key(|(_, c)| c.row)
        };
        if let Some((idx, _)) = target {
            self.cursor = idx;
        }
    }

    /// Move to the nearest cell in the same row, left (`right == false`) or right.
    pub fn move_horizontal(&mut self, right: bool) {
        let Some(current) = self.cursor() else {
            return;
        };
        let (row, col) = (current.row, current.col);
        let candidates = self
            .cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.row == row && if right { c.col > col } else { c.col < col });
        let target = if right {
            candidates.min_by_key(|(_, c)| c.col)
        } else {
            candidates.max_by_key(|(_, c)| c.col)
        };
        if let Some((idx, _)) = target {
            self.cursor = idx;
        }
    }

    fn grade(&mut self, idx: usize) -> bool {
        let strict = self.strict_accents;
        let Some(cell) = self.cells.get_mut(idx) else {
            return false;
        };
        if cell.status.is_locked() {
            return cell.status == CellStatus::Correct;
        }
        let correct = answers_match(&cell.input, &cell.expected, strict);
        cell.status = if correct {
            CellStatus::Correct
        } else {
            CellStatus::Wrong
        };
        correct
    }

    /// Grade the cell under the cursor; on success jump to the next unfinished cell.
    pub fn check_current(&mut self) -> Option<bool> {
        if self.cells.is_empty() {
            return None;
        }
        let correct = self.grade(self.cursor);
        if correct {
            let len = self.cells.len();
            if let Some(next) = (1..len)
                .map(|step| (self.cursor + step) % len)
                .find(|&idx| !self.cells[idx].status.is_locked())
            {
                self.cursor = next;
            }
        }
        Some(correct)
    }

    /// Grade every cell and return the accuracy.
    pub fn check_all(&mut self) -> f64 {
        for idx in 0..self.cells.len() {
            self.grade(idx);
        }
        self.accuracy()
    }

    pub fn reveal(&mut self) {
        for cell in &mut self.cells {
            if cell.status != CellStatus::Correct {
                cell.input = cell.expected.clone();
                cell.status = CellStatus::Revealed;
            }
        }
    }

    pub fn reset(&mut self) {
        for cell in &mut self.cells {
            cell.input.clear();
            cell.status = CellStatus::Pending;
        }
        self.cursor = 0;
        self.recorded = false;
    }

    /// Returns true the first time it is called for this loaded table, and
    /// again only after a reset.
    pub fn mark_recorded(&mut self) -> bool {
        !std::mem::replace(&mut self.recorded, true)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn correct_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| c.status == CellStatus::Correct)
            .count()
    }

    pub fn accuracy(&self) -> f64 {
        if self.cells.is_empty() {
            return 1.0;
        }
        self.correct_count() as f64 / self.cells.len() as f64
    }

    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(|c| c.status.is_locked())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookmark::key::Category;
    use crate::paradigm::grid::FormRow;

    fn row(label: &str, forms: &[&str]) -> FormRow {
        FormRow {
            label: label.to_string(),
            forms: forms.iter().map(|f| f.to_string()).collect(),
        }
    }

    fn mousa_table() -> QuizTable {
        let grid = Grid {
            columns: vec!["Singular".to_string(), "Plural".to_string()],
            rows: vec![
                row("Nominative", &["μοῦσα", "μοῦσαι"]),
                row("Genitive", &["μούσης", "μουσῶν"]),
                row("Dative", &["μούσῃ", ""]),
            ],
        };
        QuizTable::new(
            Selection::table(Category::Noun, "First Declension (μουσα)"),
            &grid,
            false,
        )
    }

    fn type_str(table: &mut QuizTable, text: &str) {
        for ch in text.chars() {
            table.type_char(ch);
        }
    }

    #[test]
    fn test_cells_skip_empty_forms() {
        let table = mousa_table();
        assert_eq!(table.len(), 5);
        assert!(table.cell_at(2, 1).is_none());
        assert!(table.is_cursor(0, 0));
    }

    #[test]
    fn test_correct_answer_locks_and_advances() {
        let mut table = mousa_table();
        type_str(&mut table, "μουσα");
        assert_eq!(table.check_current(), Some(true));
        assert_eq!(table.cell_at(0, 0).unwrap().status, CellStatus::Correct);
        assert!(table.is_cursor(0, 1));

        // locked cells ignore input
        table.prev_cell();
        table.type_char('x');
        assert_eq!(table.cell_at(0, 0).unwrap().input, "μουσα");
    }

    #[test]
    fn test_wrong_answer_stays_and_clears_on_edit() {
        let mut table = mousa_table();
        type_str(&mut table, "μουσε");
        assert_eq!(table.check_current(), Some(false));
        assert!(table.is_cursor(0, 0));
        assert_eq!(table.cell_at(0, 0).unwrap().status, CellStatus::Wrong);
        table.backspace();
        assert_eq!(table.cell_at(0, 0).unwrap().status, CellStatus::Pending);
    }

    #[test]
    fn test_check_current_skips_finished_cells() {
        let mut table = mousa_table();
        table.next_cell();
        type_str(&mut table, "μουσαι");
        table.check_current();
        table.prev_cell();
        table.prev_cell();
        type_str(&mut table, "μουσα");
        table.check_current();
        assert!(table.is_cursor(1, 0), "skips the already-correct plural");
    }

    #[test]
    fn test_vertical_and_horizontal_moves() {
        let mut table = mousa_table();
        table.move_horizontal(true);
        assert!(table.is_cursor(0, 1));
        table.move_vertical(true);
        assert!(table.is_cursor(1, 1));
        table.move_vertical(true);
        assert!(table.is_cursor(1, 1), "no dative plural cell");
        table.move_horizontal(false);
        table.move_vertical(true);
        assert!(table.is_cursor(2, 0));
        table.move_vertical(false);
        table.move_vertical(false);
        assert!(table.is_cursor(0, 0));
    }

    #[test]
    fn test_check_all_reveal_reset() {
        let mut table = mousa_table();
        type_str(&mut table, "μουσα");
        let accuracy = table.check_all();
        assert!((accuracy - 0.2).abs() < 1e-9);
        assert!(!table.is_complete());

        table.reveal();
        assert!(table.is_complete());
        assert_eq!(table.correct_count(), 1);
        assert_eq!(table.cell_at(1, 1).unwrap().input, "μουσῶν");

        table.reset();
        assert_eq!(table.correct_count(), 0);
        assert!(table.cells().iter().all(|c| c.input.is_empty()));
        assert!(table.is_cursor(0, 0));
    }

    #[test]
    fn test_recorded_once_until_reset() {
        let mut table = mousa_table();
        table.check_all();
        assert!(table.mark_recorded());
        table.check_all();
        assert!(!table.mark_recorded(), "a second check of the same table");

        table.reset();
        assert!(table.mark_recorded());
    }
}
