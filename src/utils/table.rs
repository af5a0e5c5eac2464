//! Table rendering utilities for CLI outputs.

use super::colors::display_width;

pub struct Column {
    pub header: String,
    pub min_width: usize,
}

impl Column {
    pub fn new(header: &str, min_width: usize) -> Self {
        Self {
            header: header.to_string(),
            min_width,
        }
    }
}

pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column widths: widest cell (colors excluded), never below the
    /// header or the column minimum.
    fn widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                self.rows
                    .iter()
                    .filter_map(|r| r.get(i))
                    .map(|cell| display_width(cell))
                    .chain([display_width(&col.header), col.min_width])
                    .max()
                    .unwrap_or(col.min_width)
            })
            .collect()
    }

    pub fn render(&self) -> String {
        let widths = self.widths();
        let mut out = String::new();

        // Header
        for (col, w) in self.columns.iter().zip(&widths) {
            out.push_str(&col.header);
            out.push_str(&" ".repeat(w.saturating_sub(display_width(&col.header)) + 1));
        }
        out.push('\n');

        // Rows (padding computed on visible width so colored cells line up)
        for row in &self.rows {
            for (i, w) in widths.iter().enumerate() {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                let pad = w.saturating_sub(display_width(cell));
                out.push_str(cell);
                out.push_str(&" ".repeat(pad + 1));
            }
            out.push('\n');
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_grow_to_fit() {
        let mut t = Table::new(vec![Column::new("ID", 2), Column::new("EMPLOYEE", 4)]);
        t.add_row(vec!["1".into(), "E-LONG-NAME".into()]);

        let out = t.render();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("ID EMPLOYEE"));
        assert!(lines[1].starts_with("1  E-LONG-NAME"));
    }

    #[test]
    fn wide_names_keep_columns_aligned() {
        let mut t = Table::new(vec![Column::new("EMPLOYEE", 4), Column::new("STATE", 5)]);
        t.add_row(vec!["山田太郎".into(), "x".into()]);
        t.add_row(vec!["ABCDEFGH".into(), "x".into()]);
        t.add_row(vec!["E1".into(), "\x1b[32mx\x1b[0m".into()]);

        let out = t.render();
        let state_col: Vec<usize> = out
            .lines()
            .skip(1)
            .map(|line| {
                let (before, _) = line.split_once('x').unwrap();
                display_width(before)
            })
            .collect();
        assert_eq!(state_col, vec![9, 9, 9]);
    }
}
