use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormRow {
    pub label: String,
    /// One form per column; an empty string marks a cell with no form.
    pub forms: Vec<String>,
}

/// The answer sheet for one table: column headings and labelled rows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    pub columns: Vec<String>,
    pub rows: Vec<FormRow>,
}

impl Grid {
    pub fn form(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.forms.get(col))
            .map(String::as_str)
            .filter(|f| !f.is_empty())
    }

    pub fn cell_count(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.forms.iter().filter(|f| !f.is_empty()).count())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article_fragment() -> Grid {
        Grid {
            columns: vec!["Singular".to_string(), "Plural".to_string()],
            rows: vec![
                FormRow {
                    label: "Nominative".to_string(),
                    forms: vec!["ὁ".to_string(), "οἱ".to_string()],
                },
                FormRow {
                    label: "Vocative".to_string(),
                    forms: vec![String::new(), String::new()],
                },
            ],
        }
    }

    #[test]
    fn test_empty_forms_are_not_cells() {
        let grid = article_fragment();
        assert_eq!(grid.cell_count(), 2);
        assert_eq!(grid.form(0, 1), Some("οἱ"));
        assert_eq!(grid.form(1, 0), None);
        assert_eq!(grid.form(5, 0), None);
    }
}
