//! Tabular data in a `table` float

use super::{push_label, Element};
use crate::error::UsageError;
use crate::escape::escape_latex;

/// A ruled table with one header row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    caption: Option<String>,
    label: Option<String>,
    placement: String,
}

impl Table {
    pub fn new<H, S>(headers: H) -> Self
    where
        H: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            caption: None,
            label: None,
            placement: "h".to_string(),
        }
    }

    pub fn with_row<R, S>(mut self, row: R) -> Self
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(row.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_rows<I, R, S>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for row in rows {
            self = self.with_row(row);
        }
        self
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_placement(mut self, placement: impl Into<String>) -> Self {
        self.placement = placement.into();
        self
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    fn describe(&self) -> String {
        self.label
            .clone()
            .or_else(|| self.caption.clone())
            .unwrap_or_else(|| self.headers.join(" | "))
    }
}

fn render_row(cells: &[String]) -> String {
    let cells: Vec<String> = cells.iter().map(|c| escape_latex(c)).collect();
    format!("        {} \\\\\n", cells.join(" & "))
}

impl Element for Table {
    fn render(&self) -> String {
        let num_cols = self.headers.len();
        let column_spec = vec!["c"; num_cols].join("|");

        let mut output = format!("\\begin{{table}}[{}]\n", self.placement);
        output.push_str("    \\centering\n");
        output.push_str(&format!("    \\begin{{tabular}}{{|{}|}}\n", column_spec));
        output.push_str("        \\hline\n");
        output.push_str(&render_row(&self.headers));
        output.push_str("        \\hline\n");
        for row in &self.rows {
            output.push_str(&render_row(row));
        }
        if !self.rows.is_empty() {
            output.push_str("        \\hline\n");
        }
        output.push_str("    \\end{tabular}\n");
        if let Some(caption) = &self.caption {
            output.push_str(&format!("    \\caption{{{}}}\n", escape_latex(caption)));
        }
        push_label(&mut output, "    ", self.label.as_deref());
        output.push_str("\\end{table}\n");
        output
    }

    fn labels(&self) -> Vec<&str> {
        self.label.as_deref().into_iter().collect()
    }

    fn validate(&self) -> Result<(), UsageError> {
        let expected = self.headers.len();
        match self
            .rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != expected)
        {
            Some((row, cells)) => Err(UsageError::RaggedTableRow {
                table: self.describe(),
                row,
                expected,
                found: cells.len(),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_render() {
        let table = Table::new(["Name", "Share"])
            .with_row(["alpha", "50%"])
            .with_caption("Shares")
            .with_label("tab:shares");
        let out = table.render();
        assert!(out.contains("\\begin{tabular}{|c|c|}"));
        assert!(out.contains("        Name & Share \\\\\n"));
        assert!(out.contains("        alpha & 50\\% \\\\\n"));
        assert!(out.contains("\\caption{Shares}"));
        assert!(out.contains("\\label{tab:shares}"));
    }

    #[test]
    fn test_zero_rows_renders_header_only() {
        let out = Table::new(["A", "B"]).render();
        assert_eq!(
            out,
            "\\begin{table}[h]\n    \\centering\n    \\begin{tabular}{|c|c|}\n        \\hline\n        A & B \\\\\n        \\hline\n    \\end{tabular}\n\\end{table}\n"
        );
        assert!(Table::new(["A"]).validate().is_ok());
    }

    #[test]
    fn test_ragged_row_rejected() {
        let table = Table::new(["A", "B"])
            .with_rows(vec![vec!["1", "2"], vec!["3"]])
            .with_label("tab:ragged");
        assert_eq!(
            table.validate(),
            Err(UsageError::RaggedTableRow {
                table: "tab:ragged".to_string(),
                row: 1,
                expected: 2,
                found: 1,
            })
        );
    }
}
