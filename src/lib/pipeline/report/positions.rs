//! Tab-delimited position tables.
//!
//! A table has a header naming at least the `contig` and `call` columns;
//! `coverage` and `proportion` are optional and default to not applicable.
//! Rows of one contig must be contiguous and in coordinate order:
//!
//! ```text
//! contig	call	coverage	proportion
//! chr1	A	12	0.95
//! chr1	G	?	?
//! chr1	X	-	-
//! ```
//!
//! Opening a table validates every row once and remembers where each contig
//! starts. Positions are then streamed from disk one contig at a time.

use crate::core::error::{Result, VtmError};
use crate::core::io::{open_table, open_table_at};
use crate::engine::filter::FilterValue;
use crate::engine::position::Position;
use crate::engine::source::{ContigInfo, PositionIter, PositionSource, ReferenceSource};
use csv::StringRecord;
use log::debug;
use rustc_hash::FxHashMap;
use smartstring::alias::String;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy)]
struct Columns {
    contig: usize,
    call: usize,
    coverage: Option<usize>,
    proportion: Option<usize>,
}

/// Where a contig's first row sits in the decoded table.
#[derive(Debug, Clone, Copy)]
struct ContigStart {
    byte: u64,
    line: u64,
}

/// A position table on disk, indexed by contig.
#[derive(Debug, Clone)]
pub struct TsvPositionTable {
    path: PathBuf,
    identifier: String,
    columns: Columns,
    contigs: Vec<ContigInfo>,
    starts: FxHashMap<String, ContigStart>,
}

impl TsvPositionTable {
    /// Index `path` (plain, or gzip/BGZF-compressed when it ends in `.gz`) under the given identifier.
    ///
    /// Every row is parsed here, so malformed values fail before any analysis starts.
    pub fn from_path<P: AsRef<Path>>(path: P, identifier: &str) -> Result<Self> {
        let path = path.as_ref();
        if path == Path::new("-") {
            return Err(VtmError::InvalidInput(format!(
                "{}: position tables are read once per contig and must be files",
                identifier
            )));
        }
        let mut reader = open_table(path)?;
        let headers = reader.headers()?.clone();
        let column = |name: &str| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name));

        let columns = Columns {
            contig: column("contig").ok_or_else(|| {
                VtmError::Parse(format!("{}: missing 'contig' column", path.display()))
            })?,
            call: column("call").ok_or_else(|| {
                VtmError::Parse(format!("{}: missing 'call' column", path.display()))
            })?,
            coverage: column("coverage"),
            proportion: column("proportion"),
        };

        let mut table = TsvPositionTable {
            path: path.to_path_buf(),
            identifier: String::from(identifier),
            columns,
            contigs: Vec::new(),
            starts: FxHashMap::default(),
        };

        let mut record = StringRecord::new();
        while reader.read_record(&mut record)? {
            let start = record
                .position()
                .map(|p| ContigStart {
                    byte: p.byte(),
                    line: p.line(),
                })
                .ok_or_else(|| {
                    VtmError::Parse(format!("{}: row without a file position", path.display()))
                })?;
            let (contig, _) = table.parse_row(&record, start.line)?;
            let contig = String::from(contig);
            table.index(contig, start)?;
        }

        debug!(
            "Indexed {} contigs from {} ({})",
            table.contigs.len(),
            path.display(),
            table.identifier
        );
        Ok(table)
    }

    fn index(&mut self, contig: String, start: ContigStart) -> Result<()> {
        let is_new_contig = self
            .contigs
            .last()
            .map(|last| last.name.as_str() != contig.as_str())
            .unwrap_or(true);
        if is_new_contig {
            if self.starts.contains_key(&contig) {
                return Err(VtmError::Parse(format!(
                    "{}: line {}: rows of contig {} are not contiguous",
                    self.path.display(),
                    start.line,
                    contig
                )));
            }
            self.contigs.push(ContigInfo {
                name: contig.clone(),
                length: 0,
            });
            self.starts.insert(contig, start);
        }
        if let Some(last) = self.contigs.last_mut() {
            last.length += 1;
        }
        Ok(())
    }

    fn parse_error(&self, line: u64, message: impl std::fmt::Display) -> VtmError {
        VtmError::Parse(format!("{}: line {}: {}", self.path.display(), line, message))
    }

    /// Split one row into its contig name and position.
    fn parse_row<'r>(&self, record: &'r StringRecord, line: u64) -> Result<(&'r str, Position)> {
        let field = |column: usize| {
            record
                .get(column)
                .ok_or_else(|| self.parse_error(line, format!("missing column {}", column + 1)))
        };
        let value = |column: Option<usize>| -> Result<FilterValue> {
            match column {
                Some(column) => field(column)?
                    .parse::<FilterValue>()
                    .map_err(|err| self.parse_error(line, err)),
                None => Ok(FilterValue::NotApplicable),
            }
        };

        let contig = field(self.columns.contig)?.trim();
        let call = parse_call(field(self.columns.call)?)
            .ok_or_else(|| self.parse_error(line, "call must be a single character"))?;
        let position = Position::new(
            call,
            value(self.columns.coverage)?,
            value(self.columns.proportion)?,
        );
        Ok((contig, position))
    }
}

/// A call is exactly one non-whitespace character. Soft-masked bases are
/// uppercased so they compare equal to the reference.
fn parse_call(raw: &str) -> Option<char> {
    let mut chars = raw.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(call), None) => Some(call.to_ascii_uppercase()),
        _ => None,
    }
}

impl PositionSource for TsvPositionTable {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn contig_positions(&self, contig: &str) -> Result<PositionIter<'_>> {
        let (start, length) = match (
            self.starts.get(contig),
            self.contigs.iter().find(|info| info.name.as_str() == contig),
        ) {
            (Some(start), Some(info)) => (*start, info.length),
            _ => return Ok(Box::new(std::iter::empty())),
        };

        let reader = open_table_at(&self.path, start.byte)?;
        let contig = String::from(contig);
        Ok(Box::new(reader.into_records().take(length).enumerate().map(
            move |(offset, record)| {
                let record = record?;
                let line = record
                    .position()
                    .map(|p| start.line + p.line() - 1)
                    .unwrap_or(start.line + offset as u64);
                let (name, position) = self.parse_row(&record, line)?;
                if name != contig.as_str() {
                    return Err(self.parse_error(
                        line,
                        format!("expected contig {}, found {}; table changed on disk", contig, name),
                    ));
                }
                Ok(position)
            },
        )))
    }
}

impl ReferenceSource for TsvPositionTable {
    fn contigs(&self) -> Vec<ContigInfo> {
        self.contigs.clone()
    }
}
