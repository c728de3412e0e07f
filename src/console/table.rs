/// Fixed-width text table with centered cells. Cells longer than their
/// column are truncated.
pub struct Table {
    title: String,
    columns: Vec<(&'static str, usize)>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(title: impl Into<String>, columns: &[(&'static str, usize)]) -> Self {
        Self {
            title: title.into(),
            columns: columns.to_vec(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    pub fn width(&self) -> usize {
        self.columns.iter().map(|(_, w)| *w).sum()
    }

    pub fn render(&self) -> String {
        let width = self.width();
        let mut out = String::new();
        out.push_str(&"=".repeat(width));
        out.push('\n');
        if !self.title.is_empty() {
            out.push_str(&center(&self.title, width));
            out.push('\n');
            out.push_str(&"=".repeat(width));
            out.push('\n');
        }
        for (name, w) in &self.columns {
            out.push_str(&center(name, *w));
        }
        out.push('\n');
        out.push_str(&"-".repeat(width));
        out.push('\n');
        for row in &self.rows {
            for ((_, w), cell) in self.columns.iter().zip(row) {
                out.push_str(&center(&truncate(cell, *w), *w));
            }
            out.push('\n');
        }
        out.push_str(&"=".repeat(width));
        out
    }
}

/// First `max` characters of `text`.
pub fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

fn center(text: &str, width: usize) -> String {
    format!("{text:^width$}")
}
