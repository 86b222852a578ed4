//! Range addressing: translation of logical (row, column) positions into
//! the range-expression strings the Sheets API understands.

/// A numeric cell endpoint. Either component may be absent, which leaves
/// that side of the range open ("from row 2 to the end of the column").
/// Rows and columns are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellRef {
    pub row: Option<u32>,
    pub col: Option<u32>,
}

impl CellRef {
    pub fn at(row: u32, col: u32) -> Self {
        Self {
            row: Some(row),
            col: Some(col),
        }
    }

    pub fn row(row: u32) -> Self {
        Self {
            row: Some(row),
            col: None,
        }
    }

    pub fn col(col: u32) -> Self {
        Self {
            row: None,
            col: Some(col),
        }
    }

    pub fn open() -> Self {
        Self::default()
    }

    fn is_open(self) -> bool {
        self.row.is_none() && self.col.is_none()
    }
}

/// An unqualified range within a sheet. The three forms keep the caller's
/// intent distinct at the type level instead of overloading one string
/// argument: a verbatim A1 expression, column-letter/row endpoints, or
/// purely numeric endpoints rendered in R1C1 notation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetRange {
    /// A literal A1 expression, passed through untouched (e.g. `A1:1`,
    /// `A1:Z`, `B2:D4`).
    Literal(String),

    /// Column-letter + row-number endpoints; any component may be absent
    /// to leave the range open on that side.
    A1 {
        start_col: Option<String>,
        start_row: Option<u32>,
        end_col: Option<String>,
        end_row: Option<u32>,
    },

    /// Numeric endpoints, rendered in R1C1 notation. `cells(at(2, 5), col(5))`
    /// renders `R2C5:C5`: column 5 from row 2 down.
    Cells { start: CellRef, end: CellRef },
}

impl SheetRange {
    pub fn literal(expr: impl Into<String>) -> Self {
        SheetRange::Literal(expr.into())
    }

    pub fn cell(at: CellRef) -> Self {
        SheetRange::Cells {
            start: at,
            end: CellRef::open(),
        }
    }

    pub fn cells(start: CellRef, end: CellRef) -> Self {
        SheetRange::Cells { start, end }
    }

    /// Render the fully qualified range expression for `sheet`. The sheet
    /// title is always single-quoted; embedded quotes are doubled.
    pub fn in_sheet(&self, sheet: &str) -> String {
        format!("'{}'!{}", sheet.replace('\'', "''"), self.body())
    }

    fn body(&self) -> String {
        match self {
            SheetRange::Literal(expr) => expr.clone(),
            SheetRange::A1 {
                start_col,
                start_row,
                end_col,
                end_row,
            } => {
                let mut out = String::new();
                if let Some(col) = start_col {
                    out.push_str(col);
                }
                if let Some(row) = start_row {
                    out.push_str(&row.to_string());
                }
                if end_col.is_some() || end_row.is_some() {
                    out.push(':');
                    if let Some(col) = end_col {
                        out.push_str(col);
                    }
                    if let Some(row) = end_row {
                        out.push_str(&row.to_string());
                    }
                }
                out
            }
            SheetRange::Cells { start, end } => {
                let mut out = String::new();
                push_r1c1(&mut out, *start);
                if !end.is_open() {
                    out.push(':');
                    push_r1c1(&mut out, *end);
                }
                out
            }
        }
    }
}

fn push_r1c1(out: &mut String, cell: CellRef) {
    if let Some(row) = cell.row {
        out.push('R');
        out.push_str(&row.to_string());
    }
    if let Some(col) = cell.col {
        out.push('C');
        out.push_str(&col.to_string());
    }
}

/// Extract the 1-based row number from the `updatedRange` expression the
/// append call reports (e.g. `'tbl_People'!A7:C7` -> 7). The service may
/// land the row anywhere below the requested range, so the response is
/// the only authority on where it went.
pub fn parse_appended_row(expr: &str) -> Option<u32> {
    // The range body follows the last '!'; sheet titles are quoted, so a
    // bare '!' cannot appear later in the expression.
    let body = expr.rsplit('!').next()?;
    let digits: String = body
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_ranges_pass_through_with_quoted_sheet() {
        let range = SheetRange::literal("A1:B2");
        assert_eq!(range.in_sheet("tbl_People"), "'tbl_People'!A1:B2");
    }

    #[test]
    fn embedded_quotes_in_sheet_titles_are_doubled() {
        let range = SheetRange::literal("A1:A");
        assert_eq!(range.in_sheet("kv_Bob's"), "'kv_Bob''s'!A1:A");
    }

    #[test]
    fn single_cell_renders_without_colon() {
        let range = SheetRange::cell(CellRef::at(5, 2));
        assert_eq!(range.in_sheet("kv_Info"), "'kv_Info'!R5C2");
    }

    #[test]
    fn open_ended_column_scan() {
        let range = SheetRange::cells(CellRef::at(2, 3), CellRef::col(3));
        assert_eq!(range.in_sheet("tbl_People"), "'tbl_People'!R2C3:C3");
    }

    #[test]
    fn open_ended_row_fetch() {
        let range = SheetRange::cells(CellRef::at(7, 1), CellRef::row(7));
        assert_eq!(range.in_sheet("tbl_People"), "'tbl_People'!R7C1:R7");
    }

    #[test]
    fn closed_rectangle() {
        let range = SheetRange::cells(CellRef::at(4, 1), CellRef::at(4, 3));
        assert_eq!(range.in_sheet("tbl_People"), "'tbl_People'!R4C1:R4C3");
    }

    #[test]
    fn a1_form_with_open_end() {
        let range = SheetRange::A1 {
            start_col: Some("A".into()),
            start_row: Some(1),
            end_col: Some("Z".into()),
            end_row: None,
        };
        assert_eq!(range.in_sheet("kv_Info"), "'kv_Info'!A1:Z");
    }

    #[test]
    fn appended_row_parses_from_updated_range() {
        assert_eq!(parse_appended_row("'tbl_People'!A7:C7"), Some(7));
        assert_eq!(parse_appended_row("tbl_People!B12"), Some(12));
        assert_eq!(parse_appended_row("'tbl_Data2020'!A31:D31"), Some(31));
        assert_eq!(parse_appended_row("garbage"), None);
    }
}
