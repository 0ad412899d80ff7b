//! Final per-class report and its text rendering.

use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::matching::ClassTally;
use crate::types::CategoryId;

const RULE_WIDTH: usize = 60;

/// One class line of the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub category_id: CategoryId,
    pub name: String,
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub precision: f64,
    pub recall: f64,
}

impl ReportRow {
    pub fn from_tally(category_id: CategoryId, name: impl Into<String>, tally: ClassTally) -> Self {
        Self {
            category_id,
            name: name.into(),
            true_positives: tally.true_positives,
            false_positives: tally.false_positives,
            false_negatives: tally.false_negatives,
            precision: tally.precision(),
            recall: tally.recall(),
        }
    }

    pub fn tally(&self) -> ClassTally {
        ClassTally::new(self.true_positives, self.false_positives, self.false_negatives)
    }
}

/// Read-only result of a finished evaluation. Rows follow the taxonomy order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub iou_threshold: f64,
    pub score_threshold: f64,
    pub rows: Vec<ReportRow>,
}

impl Report {
    pub fn new(iou_threshold: f64, score_threshold: f64, rows: Vec<ReportRow>) -> Self {
        Self {
            iou_threshold,
            score_threshold,
            rows,
        }
    }

    /// Row of a single class, if the class is part of the taxonomy.
    pub fn row(&self, category_id: CategoryId) -> Option<&ReportRow> {
        self.rows.iter().find(|row| row.category_id == category_id)
    }

    /// Write the fixed-width text table.
    pub fn write_text<W: Write>(&self, mut writer: W) -> Result<()> {
        let rule = "-".repeat(RULE_WIDTH);
        writeln!(
            writer,
            "Detection Analysis Report (IoU Thr: {:?}, Score Thr: {:?})",
            self.iou_threshold, self.score_threshold
        )?;
        writeln!(writer, "{rule}")?;
        writeln!(
            writer,
            "{:<15} | {:<5} | {:<5} | {:<5} | {:<10} | {:<10}",
            "Class", "TP", "FP", "FN", "Precision", "Recall"
        )?;
        writeln!(writer, "{rule}")?;

        for row in &self.rows {
            writeln!(
                writer,
                "{:<15} | {:<5} | {:<5} | {:<5} | {:<10.4} | {:<10.4}",
                row.name,
                row.true_positives,
                row.false_positives,
                row.false_negatives,
                row.precision,
                row.recall
            )?;
        }

        Ok(())
    }

    pub fn to_text(&self) -> String {
        let mut buffer = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_text(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    pub fn save_text<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_text(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}
