//! Tabular exports of the recorded report rows

use crate::error::{NcompareError, Result};
use rust_xlsxwriter::{DocProperties, ExcelDateTime, Workbook, XlsxError};
use std::path::Path;

/// A table that accumulates three-cell rows and serializes them on demand.
pub trait TableSink {
    fn append_row(&mut self, label: &str, value_a: &str, value_b: &str) -> Result<()>;

    /// Write the accumulated table to `path`.
    fn flush_to(&mut self, path: &Path) -> Result<()>;
}

type Record = [String; 3];

fn record(label: &str, value_a: &str, value_b: &str) -> Record {
    [label.to_string(), value_a.to_string(), value_b.to_string()]
}

/// Comma-separated rows.
#[derive(Debug, Default)]
pub struct CsvTable {
    records: Vec<Record>,
}

impl CsvTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The exact bytes `flush_to` writes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(false)
            .from_writer(Vec::new());
        for record in &self.records {
            writer.write_record(record)?;
        }
        writer
            .into_inner()
            .map_err(|e| NcompareError::invalid_input(format!("CSV buffer: {e}")))
    }
}

impl TableSink for CsvTable {
    fn append_row(&mut self, label: &str, value_a: &str, value_b: &str) -> Result<()> {
        self.records.push(record(label, value_a, value_b));
        Ok(())
    }

    fn flush_to(&mut self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes).map_err(|e| NcompareError::export_write(path, e.to_string()))
    }
}

/// Excel workbook with a single `ncompare` worksheet.
#[derive(Debug, Default)]
pub struct XlsxTable {
    records: Vec<Record>,
}

impl XlsxTable {
    pub const SHEET_NAME: &'static str = "ncompare";

    /// Creation date stamped into every workbook, so equal rows give equal bytes.
    pub const CREATION_DATE: (u16, u8, u8) = (2000, 1, 1);

    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn build(&self) -> std::result::Result<Workbook, XlsxError> {
        let mut workbook = Workbook::new();
        let (year, month, day) = Self::CREATION_DATE;
        let created = ExcelDateTime::from_ymd(year, month, day)?;
        workbook.set_properties(&DocProperties::new().set_creation_datetime(&created));

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(Self::SHEET_NAME)?;
        for (row, record) in self.records.iter().enumerate() {
            for (col, cell) in record.iter().enumerate() {
                worksheet.write_string(row as u32, col as u16, cell)?;
            }
        }
        Ok(workbook)
    }

    /// Serialize the workbook to `.xlsx` bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut workbook = self
            .build()
            .map_err(|e| NcompareError::invalid_input(format!("workbook: {e}")))?;
        workbook
            .save_to_buffer()
            .map_err(|e| NcompareError::invalid_input(format!("workbook: {e}")))
    }
}

impl TableSink for XlsxTable {
    fn append_row(&mut self, label: &str, value_a: &str, value_b: &str) -> Result<()> {
        self.records.push(record(label, value_a, value_b));
        Ok(())
    }

    fn flush_to(&mut self, path: &Path) -> Result<()> {
        let bytes = self
            .to_bytes()
            .map_err(|e| NcompareError::export_write(path, e.to_string()))?;
        std::fs::write(path, bytes).map_err(|e| NcompareError::export_write(path, e.to_string()))
    }
}
