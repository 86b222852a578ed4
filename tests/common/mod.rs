//! An in-memory [`GridAccess`] backend for exercising the store layer
//! without the network. It understands the qualified range expressions
//! the stores emit (literal A1 forms and R1C1 forms) and mimics the
//! service's trimming behavior: trailing empty cells and rows are not
//! returned, and writing a `null` cell skips it rather than clearing it.

use async_trait::async_trait;
use serde_json::Value;
use sheetbase::error::{Result, SheetbaseError};
use sheetbase::grid::{AppendedRange, GridAccess, ReadOptions, SheetInfo, WorkbookMetadata};
use sheetbase_schema::{MajorDimension, ValueInputOption};
use std::sync::Mutex;

pub struct InMemoryGrid {
    title: String,
    sheets: Mutex<Vec<FakeSheet>>,
}

struct FakeSheet {
    title: String,
    sheet_id: i64,
    cells: Vec<Vec<Value>>,
}

impl InMemoryGrid {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            sheets: Mutex::new(Vec::new()),
        }
    }

    pub fn with_sheet(self, title: &str, rows: Vec<Vec<Value>>) -> Self {
        {
            let mut sheets = self.sheets.lock().unwrap();
            let sheet_id = next_sheet_id(&sheets);
            sheets.push(FakeSheet {
                title: title.to_string(),
                sheet_id,
                cells: rows,
            });
        }
        self
    }

    /// Snapshot of a sheet's raw cells, for assertions.
    pub fn sheet_rows(&self, title: &str) -> Vec<Vec<Value>> {
        let sheets = self.sheets.lock().unwrap();
        sheets
            .iter()
            .find(|sheet| sheet.title == title)
            .map(|sheet| sheet.cells.clone())
            .unwrap_or_default()
    }

    pub fn sheet_titles(&self) -> Vec<String> {
        let sheets = self.sheets.lock().unwrap();
        sheets.iter().map(|sheet| sheet.title.clone()).collect()
    }
}

fn next_sheet_id(sheets: &[FakeSheet]) -> i64 {
    sheets.iter().map(|s| s.sheet_id + 1).max().unwrap_or(0)
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// One endpoint of a range; either component may be open.
#[derive(Debug, Clone, Copy, Default)]
struct Endpoint {
    row: Option<usize>,
    col: Option<usize>,
}

/// A parsed range: sheet title plus resolved endpoints.
#[derive(Debug)]
struct ParsedRange {
    sheet: String,
    start: Endpoint,
    end: Endpoint,
}

fn parse_range(expr: &str) -> ParsedRange {
    let bang = expr.rfind('!').unwrap_or_else(|| panic!("unqualified range: {expr}"));
    let (sheet_part, body) = expr.split_at(bang);
    let body = &body[1..];

    let sheet = sheet_part
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .map_or_else(|| sheet_part.to_string(), |s| s.replace("''", "'"));

    let r1c1 = body.starts_with('R') && body[1..].starts_with(|c: char| c.is_ascii_digit());
    let (start_str, end_str) = match body.split_once(':') {
        Some((s, e)) => (s, Some(e)),
        None => (body, None),
    };

    let parse = if r1c1 { parse_r1c1 } else { parse_a1 };
    let start = parse(start_str);
    let end = end_str.map_or(start, parse);
    ParsedRange { sheet, start, end }
}

fn parse_r1c1(s: &str) -> Endpoint {
    let mut endpoint = Endpoint::default();
    let mut chars = s.chars().peekable();
    while let Some(marker) = chars.next() {
        let mut digits = String::new();
        while let Some(c) = chars.peek().filter(|c| c.is_ascii_digit()) {
            digits.push(*c);
            chars.next();
        }
        let n: usize = digits.parse().unwrap_or_else(|_| panic!("bad R1C1 range: {s}"));
        match marker {
            'R' => endpoint.row = Some(n),
            'C' => endpoint.col = Some(n),
            _ => panic!("bad R1C1 range: {s}"),
        }
    }
    endpoint
}

fn parse_a1(s: &str) -> Endpoint {
    let letters: String = s.chars().take_while(char::is_ascii_alphabetic).collect();
    let digits = &s[letters.len()..];
    let col = if letters.is_empty() {
        None
    } else {
        Some(
            letters
                .chars()
                .fold(0usize, |acc, c| acc * 26 + (c as usize - 'A' as usize + 1)),
        )
    };
    let row = if digits.is_empty() {
        None
    } else {
        Some(digits.parse().unwrap_or_else(|_| panic!("bad A1 range: {s}")))
    };
    Endpoint { row, col }
}

fn col_letter(mut n: usize) -> String {
    let mut out = String::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.insert(0, (b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    out
}

impl FakeSheet {
    fn used_rows(&self) -> usize {
        self.cells
            .iter()
            .rposition(|row| row.iter().any(|c| !is_blank(c)))
            .map_or(0, |i| i + 1)
    }

    fn used_cols(&self) -> usize {
        self.cells.iter().map(Vec::len).max().unwrap_or(0)
    }

    fn cell(&self, row: usize, col: usize) -> Value {
        self.cells
            .get(row - 1)
            .and_then(|r| r.get(col - 1))
            .cloned()
            .unwrap_or(Value::Null)
    }

    fn read(&self, range: &ParsedRange, dimension: MajorDimension) -> Vec<Vec<Value>> {
        let start_row = range.start.row.unwrap_or(1);
        let start_col = range.start.col.unwrap_or(1);
        let end_row = range.end.row.unwrap_or_else(|| self.used_rows());
        let end_col = range.end.col.unwrap_or_else(|| self.used_cols());
        if end_row < start_row || end_col < start_col {
            return Vec::new();
        }

        // Blank cells inside the rectangle render as empty strings, like
        // the live service; trailing blanks are trimmed entirely.
        let majors: Vec<Vec<Value>> = match dimension {
            MajorDimension::Rows => (start_row..=end_row)
                .map(|r| {
                    (start_col..=end_col)
                        .map(|c| render_cell(self.cell(r, c)))
                        .collect()
                })
                .collect(),
            MajorDimension::Columns => (start_col..=end_col)
                .map(|c| {
                    (start_row..=end_row)
                        .map(|r| render_cell(self.cell(r, c)))
                        .collect()
                })
                .collect(),
        };

        let mut trimmed: Vec<Vec<Value>> = majors
            .into_iter()
            .map(|mut major| {
                while major.last().is_some_and(is_blank) {
                    major.pop();
                }
                major
            })
            .collect();
        while trimmed.last().is_some_and(Vec::is_empty) {
            trimmed.pop();
        }
        if trimmed.iter().all(Vec::is_empty) {
            return Vec::new();
        }
        trimmed
    }

    fn write(&mut self, range: &ParsedRange, values: &[Vec<Value>]) {
        let start_row = range.start.row.unwrap_or(1);
        let start_col = range.start.col.unwrap_or(1);
        for (i, row) in values.iter().enumerate() {
            for (j, value) in row.iter().enumerate() {
                // null means "leave the cell alone", per the API.
                if value.is_null() {
                    continue;
                }
                let r = start_row + i - 1;
                let c = start_col + j - 1;
                if self.cells.len() <= r {
                    self.cells.resize(r + 1, Vec::new());
                }
                if self.cells[r].len() <= c {
                    self.cells[r].resize(c + 1, Value::Null);
                }
                self.cells[r][c] = value.clone();
            }
        }
    }
}

fn render_cell(value: Value) -> Value {
    match value {
        Value::Null => Value::String(String::new()),
        other => other,
    }
}

#[async_trait]
impl GridAccess for InMemoryGrid {
    async fn workbook_metadata(&self) -> Result<WorkbookMetadata> {
        let sheets = self.sheets.lock().unwrap();
        Ok(WorkbookMetadata {
            title: self.title.clone(),
            sheets: sheets
                .iter()
                .map(|sheet| SheetInfo {
                    title: sheet.title.clone(),
                    sheet_id: sheet.sheet_id,
                })
                .collect(),
        })
    }

    async fn get_range(&self, range: &str, opts: ReadOptions) -> Result<Vec<Vec<Value>>> {
        let parsed = parse_range(range);
        let sheets = self.sheets.lock().unwrap();
        let sheet = find_sheet(&sheets, &parsed.sheet)?;
        Ok(sheet.read(&parsed, opts.dimension))
    }

    async fn batch_get_ranges(
        &self,
        ranges: &[String],
        opts: ReadOptions,
    ) -> Result<Vec<Vec<Vec<Value>>>> {
        let mut grids = Vec::with_capacity(ranges.len());
        for range in ranges {
            grids.push(self.get_range(range, opts).await?);
        }
        Ok(grids)
    }

    async fn update_range(
        &self,
        range: &str,
        values: Vec<Vec<Value>>,
        _input: ValueInputOption,
    ) -> Result<()> {
        let parsed = parse_range(range);
        let mut sheets = self.sheets.lock().unwrap();
        let sheet = find_sheet_mut(&mut sheets, &parsed.sheet)?;
        sheet.write(&parsed, &values);
        Ok(())
    }

    async fn append_row(
        &self,
        range: &str,
        row: Vec<Value>,
        _input: ValueInputOption,
    ) -> Result<AppendedRange> {
        let parsed = parse_range(range);
        let mut sheets = self.sheets.lock().unwrap();
        let sheet = find_sheet_mut(&mut sheets, &parsed.sheet)?;

        let landing_row = sheet.used_rows() + 1;
        let width = row.len().max(1);
        let anchor = ParsedRange {
            sheet: parsed.sheet.clone(),
            start: Endpoint {
                row: Some(landing_row),
                col: Some(1),
            },
            end: Endpoint {
                row: Some(landing_row),
                col: Some(width),
            },
        };
        sheet.write(&anchor, &[row]);
        if sheet.cells.len() < landing_row {
            sheet.cells.resize(landing_row, Vec::new());
        }

        Ok(AppendedRange {
            updated_range: format!(
                "'{}'!A{}:{}{}",
                parsed.sheet.replace('\'', "''"),
                landing_row,
                col_letter(width),
                landing_row
            ),
        })
    }

    async fn create_sheet(&self, title: &str) -> Result<()> {
        let mut sheets = self.sheets.lock().unwrap();
        let sheet_id = next_sheet_id(&sheets);
        sheets.push(FakeSheet {
            title: title.to_string(),
            sheet_id,
            cells: Vec::new(),
        });
        Ok(())
    }

    async fn delete_rows(&self, sheet_id: i64, start_index: i64, end_index: i64) -> Result<()> {
        let mut sheets = self.sheets.lock().unwrap();
        let sheet = sheets
            .iter_mut()
            .find(|sheet| sheet.sheet_id == sheet_id)
            .ok_or_else(|| SheetbaseError::SheetNotFound(format!("id {sheet_id}")))?;
        let start = usize::try_from(start_index).unwrap_or(0);
        let end = usize::try_from(end_index).unwrap_or(0).min(sheet.cells.len());
        if start < end {
            sheet.cells.drain(start..end);
        }
        Ok(())
    }
}

fn find_sheet<'a>(sheets: &'a [FakeSheet], title: &str) -> Result<&'a FakeSheet> {
    sheets
        .iter()
        .find(|sheet| sheet.title == title)
        .ok_or_else(|| SheetbaseError::SheetNotFound(title.to_string()))
}

fn find_sheet_mut<'a>(sheets: &'a mut [FakeSheet], title: &str) -> Result<&'a mut FakeSheet> {
    sheets
        .iter_mut()
        .find(|sheet| sheet.title == title)
        .ok_or_else(|| SheetbaseError::SheetNotFound(title.to_string()))
}
