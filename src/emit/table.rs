// Table render state.
//
// Columns come from `colspec` events (or the `tgroup cols` count), the first
// head row supplies the header labels, and every body row is rendered as one
// physical line. Column spans (`namest`/`nameend`) and row spans (`morerows`)
// are filled with empty cells so that every row carries the declared number
// of columns.

use crate::error::Malformed;
use crate::transduce::text::Piece;

/// Column alignment, rendered in the separator row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Align {
    #[default]
    Center,
    Left,
    Right,
}

impl Align {
    pub fn from_attr(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("left") | Some("justify") => Align::Left,
            Some("right") => Align::Right,
            _ => Align::Center,
        }
    }

    fn separator(self) -> &'static str {
        match self {
            Align::Center => ":---:",
            Align::Left => ":----",
            Align::Right => "----:",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Column {
    name: Option<String>,
    align: Align,
}

/// Placement attributes of one `entry`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CellSpec {
    pub colname: Option<String>,
    pub namest: Option<String>,
    pub nameend: Option<String>,
    pub morerows: usize,
}

#[derive(Debug)]
struct OpenCell {
    column: usize,
    span: usize,
    morerows: usize,
}

#[derive(Debug, Default)]
struct Row {
    cells: Vec<String>,
    /// Columns occupied by a cell from an earlier row.
    blocked: Vec<bool>,
    open: Option<OpenCell>,
}

impl Row {
    fn skip_blocked(&mut self) {
        while self.blocked.get(self.cells.len()).copied().unwrap_or(false) {
            self.cells.push(String::new());
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct TableState {
    columns: Vec<Column>,
    declared: Option<usize>,
    /// Column count taken from the first row when nothing declares one.
    inferred: Option<usize>,
    header: Option<Vec<String>>,
    header_emitted: bool,
    /// Remaining rows each column stays occupied by a `morerows` cell.
    reserved: Vec<usize>,
    row: Option<Row>,
}

impl TableState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare_columns(&mut self, count: usize) {
        self.declared = Some(count);
    }

    pub fn add_column(&mut self, name: Option<String>, align: Align) {
        self.columns.push(Column { name, align });
    }

    pub fn column_count(&self) -> Option<usize> {
        if !self.columns.is_empty() {
            Some(self.columns.len())
        } else {
            self.declared.or(self.inferred)
        }
    }

    pub fn cell_open(&self) -> bool {
        self.row.as_ref().is_some_and(|r| r.open.is_some())
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.as_deref() == Some(name))
    }

    pub fn start_row(&mut self) {
        let mut blocked = Vec::with_capacity(self.reserved.len());
        for remaining in self.reserved.iter_mut() {
            blocked.push(*remaining > 0);
            *remaining = remaining.saturating_sub(1);
        }
        self.row = Some(Row {
            cells: Vec::new(),
            blocked,
            open: None,
        });
    }

    pub fn start_cell(&mut self, spec: &CellSpec) -> Result<(), Malformed> {
        let start = spec
            .namest
            .as_deref()
            .or(spec.colname.as_deref())
            .and_then(|name| self.column_index(name));
        let end = spec.nameend.as_deref().and_then(|name| self.column_index(name));

        let row = self.row.get_or_insert_with(Row::default);
        if row.open.is_some() {
            return Err(Malformed::NestedTable);
        }
        row.skip_blocked();
        if let Some(start) = start {
            while row.cells.len() < start {
                row.cells.push(String::new());
                row.skip_blocked();
            }
        }
        let column = row.cells.len();
        let span = match end {
            Some(end) if end >= column => end - column + 1,
            _ => 1,
        };
        row.open = Some(OpenCell {
            column,
            span,
            morerows: spec.morerows,
        });
        Ok(())
    }

    pub fn end_cell(&mut self, content: Vec<Piece>) {
        let Some(row) = self.row.as_mut() else {
            return;
        };
        let Some(open) = row.open.take() else {
            return;
        };
        row.cells.push(render_cell(&content));
        for _ in 1..open.span {
            row.cells.push(String::new());
        }
        if open.morerows > 0 {
            let needed = open.column + open.span;
            if self.reserved.len() < needed {
                self.reserved.resize(needed, 0);
            }
            for remaining in &mut self.reserved[open.column..needed] {
                *remaining = open.morerows;
            }
        }
    }

    /// Finish the current row and return the lines to write.
    ///
    /// The first head row only records the header labels. The header and
    /// separator rows are written before the first body row.
    pub fn end_row(&mut self, in_head: bool) -> Result<Vec<String>, Malformed> {
        let Some(mut row) = self.row.take() else {
            return Ok(Vec::new());
        };
        row.skip_blocked();

        let expected = match self.column_count() {
            Some(n) => n,
            None => {
                self.inferred = Some(row.cells.len());
                row.cells.len()
            }
        };
        if row.cells.len() != expected {
            return Err(Malformed::ColumnMismatch {
                expected,
                found: row.cells.len(),
            });
        }

        if in_head && self.header.is_none() && !self.header_emitted {
            self.header = Some(row.cells);
            return Ok(Vec::new());
        }

        let mut lines = self.take_header();
        lines.push(render_row(&row.cells));
        Ok(lines)
    }

    /// Lines still owed when the table closes (a header-only table).
    pub fn finish(&mut self) -> Vec<String> {
        if self.header.is_some() {
            self.take_header()
        } else {
            Vec::new()
        }
    }

    fn take_header(&mut self) -> Vec<String> {
        if self.header_emitted {
            return Vec::new();
        }
        self.header_emitted = true;
        let count = self.column_count().unwrap_or(0);
        let labels = self
            .header
            .take()
            .unwrap_or_else(|| vec![String::new(); count]);
        let aligns: Vec<Align> = (0..count)
            .map(|i| self.columns.get(i).map(|c| c.align).unwrap_or_default())
            .collect();
        let separators: Vec<&str> = aligns.iter().map(|a| a.separator()).collect();
        vec![
            render_row(&labels),
            format!("| {} |", separators.join(" | ")),
        ]
    }
}

/// `| a | b |`
fn render_row(cells: &[String]) -> String {
    format!("| {} |", cells.join(" | "))
}

/// Render cell content on one line: text runs trimmed, `|` escaped, line
/// breaks as `<br>`. Breaks at the edges of the cell are dropped.
fn render_cell(content: &[Piece]) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut current = String::new();
    for piece in content {
        match piece {
            Piece::Text(s) => current.push_str(s),
            Piece::Break => {
                parts.push(current.trim().to_string());
                current.clear();
            }
        }
    }
    parts.push(current.trim().to_string());

    let start = parts.iter().position(|p| !p.is_empty()).unwrap_or(parts.len());
    let end = parts.iter().rposition(|p| !p.is_empty()).map_or(start, |i| i + 1);
    parts[start..end].join("<br>").replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Vec<Piece> {
        vec![Piece::Text(s.to_string())]
    }

    fn cell(table: &mut TableState, spec: CellSpec, content: &str) {
        table.start_cell(&spec).unwrap();
        table.end_cell(text(content));
    }

    fn two_column_table() -> TableState {
        let mut table = TableState::new();
        table.add_column(Some("col1".into()), Align::Center);
        table.add_column(Some("col2".into()), Align::Center);
        table
    }

    #[test]
    fn test_header_and_body_rows() {
        let mut table = two_column_table();
        table.start_row();
        cell(&mut table, CellSpec::default(), "Part");
        cell(&mut table, CellSpec::default(), "Page");
        assert!(table.end_row(true).unwrap().is_empty());

        table.start_row();
        cell(&mut table, CellSpec::default(), "I");
        cell(&mut table, CellSpec::default(), "12");
        let lines = table.end_row(false).unwrap();
        assert_eq!(
            lines,
            vec!["| Part | Page |", "| :---: | :---: |", "| I | 12 |"]
        );
        assert!(table.finish().is_empty());
    }

    #[test]
    fn test_placeholder_header_without_thead() {
        let mut table = TableState::new();
        table.add_column(None, Align::Left);
        table.start_row();
        cell(&mut table, CellSpec::default(), "x");
        let lines = table.end_row(false).unwrap();
        assert_eq!(lines, vec!["|  |", "| :---- |", "| x |"]);
    }

    #[test]
    fn test_align_from_attr() {
        assert_eq!(Align::from_attr(Some("justify")), Align::Left);
        assert_eq!(Align::from_attr(Some("Right")), Align::Right);
        assert_eq!(Align::from_attr(Some("center")), Align::Center);
        assert_eq!(Align::from_attr(None), Align::Center);
    }

    #[test]
    fn test_column_mismatch_is_rejected() {
        let mut table = two_column_table();
        table.start_row();
        cell(&mut table, CellSpec::default(), "only one");
        assert_eq!(
            table.end_row(false),
            Err(Malformed::ColumnMismatch {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn test_declared_column_count() {
        let mut table = TableState::new();
        table.declare_columns(3);
        table.start_row();
        cell(&mut table, CellSpec::default(), "a");
        cell(&mut table, CellSpec::default(), "b");
        cell(&mut table, CellSpec::default(), "c");
        let lines = table.end_row(false).unwrap();
        assert_eq!(lines[1], "| :---: | :---: | :---: |");
        assert_eq!(lines[2], "| a | b | c |");
    }

    #[test]
    fn test_inferred_column_count() {
        let mut table = TableState::new();
        table.start_row();
        cell(&mut table, CellSpec::default(), "a");
        cell(&mut table, CellSpec::default(), "b");
        let lines = table.end_row(false).unwrap();
        assert_eq!(lines, vec!["|  |  |", "| :---: | :---: |", "| a | b |"]);

        table.start_row();
        cell(&mut table, CellSpec::default(), "c");
        assert!(table.end_row(false).is_err());
    }

    #[test]
    fn test_column_span_fills_empty_cells() {
        let mut table = TableState::new();
        for name in ["c1", "c2", "c3"] {
            table.add_column(Some(name.into()), Align::Center);
        }
        table.start_row();
        let spanning = CellSpec {
            namest: Some("c1".into()),
            nameend: Some("c2".into()),
            ..CellSpec::default()
        };
        cell(&mut table, spanning, "wide");
        cell(&mut table, CellSpec::default(), "z");
        let lines = table.end_row(false).unwrap();
        assert_eq!(lines[2], "| wide |  | z |");
    }

    #[test]
    fn test_colname_skips_to_column() {
        let mut table = TableState::new();
        for name in ["c1", "c2", "c3"] {
            table.add_column(Some(name.into()), Align::Center);
        }
        table.start_row();
        let third = CellSpec {
            colname: Some("c3".into()),
            ..CellSpec::default()
        };
        cell(&mut table, third, "last");
        let lines = table.end_row(false).unwrap();
        assert_eq!(lines[2], "|  |  | last |");
    }

    #[test]
    fn test_row_span_reserves_following_rows() {
        let mut table = two_column_table();
        table.start_row();
        let tall = CellSpec {
            morerows: 1,
            ..CellSpec::default()
        };
        cell(&mut table, tall, "tall");
        cell(&mut table, CellSpec::default(), "a");
        let first = table.end_row(false).unwrap();
        assert_eq!(first[2], "| tall | a |");

        table.start_row();
        cell(&mut table, CellSpec::default(), "b");
        assert_eq!(table.end_row(false).unwrap(), vec!["|  | b |"]);

        table.start_row();
        cell(&mut table, CellSpec::default(), "c");
        cell(&mut table, CellSpec::default(), "d");
        assert_eq!(table.end_row(false).unwrap(), vec!["| c | d |"]);
    }

    #[test]
    fn test_cell_breaks_and_pipes() {
        let content = vec![
            Piece::Break,
            Piece::Text("erste ".into()),
            Piece::Break,
            Piece::Text(" a|b".into()),
            Piece::Break,
        ];
        assert_eq!(render_cell(&content), "erste<br>a\\|b");
        assert_eq!(render_cell(&[]), "");
    }

    #[test]
    fn test_rows_have_trailing_pipe_and_column_separators() {
        let mut table = two_column_table();
        table.start_row();
        table.start_cell(&CellSpec::default()).unwrap();
        table.end_cell(vec![
            Piece::Text("x".into()),
            Piece::Break,
            Piece::Text("y".into()),
        ]);
        cell(&mut table, CellSpec::default(), "");
        for line in table.end_row(false).unwrap() {
            assert!(line.ends_with(" |"));
            assert_eq!(line.matches(" | ").count(), 1, "{line}");
        }
    }
}
