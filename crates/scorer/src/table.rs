use std::path::{Path, PathBuf};

use crate::error::{Result, ScoreError};

/// A comma separated text table with a header row.
///
/// Cells are trimmed and stripped of one pair of surrounding double quotes.
/// Quoted commas are not supported: a cell left with an unbalanced quote after
/// splitting fails the whole read.
#[derive(Debug, Clone)]
pub struct Table {
    pub path: PathBuf,
    pub header: Vec<String>,
    /// (1-based line number, cells)
    pub rows: Vec<(usize, Vec<String>)>,
}

impl Table {
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ScoreError::io(path, e))?;
        Self::parse(path, &content)
    }

    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        let mut lines = content
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l))
            .filter(|(_, l)| !l.trim().is_empty());

        let Some((header_line_no, header_line)) = lines.next() else {
            return Err(ScoreError::MissingHeader {
                path: path.to_path_buf(),
            });
        };
        let header = split_cells(
            path,
            header_line_no,
            header_line.trim_start_matches('\u{feff}'),
        )?;
        let rows = lines
            .map(|(n, l)| split_cells(path, n, l).map(|cells| (n, cells)))
            .collect::<Result<_>>()?;

        Ok(Self {
            path: path.to_path_buf(),
            header,
            rows,
        })
    }

    /// Case-insensitive header lookup.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.header
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| ScoreError::MissingColumn {
                path: self.path.clone(),
                column: name.to_string(),
            })
    }
}

fn split_cells(path: &Path, line_no: usize, line: &str) -> Result<Vec<String>> {
    line.split(',')
        .map(|c| {
            let c = c.trim();
            let inner = c
                .strip_prefix('"')
                .and_then(|c| c.strip_suffix('"'))
                .unwrap_or(c);
            if inner.contains('"') {
                return Err(ScoreError::UnbalancedQuote {
                    path: path.to_path_buf(),
                    line: line_no,
                });
            }
            Ok(inner.trim().to_string())
        })
        .collect()
}
