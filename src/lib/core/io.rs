//! Tab-delimited table I/O shared by the position loaders and the report writers.
//!
//! A path of `-` selects stdin or stdout.

use crate::core::error::Result;
use crate::core::fs::is_bgzipped;
use flate2::read::MultiGzDecoder;
use grep_cli::stdout;
use gzp::{deflate::Gzip, Compression, ZBuilder};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;
use termcolor::ColorChoice;

const COMPRESSION_LEVEL: u32 = 6;
const COMPRESSION_THREADS: usize = 1;

fn is_std_stream(path: &Path) -> bool {
    path == Path::new("-")
}

fn table_reader(raw: Box<dyn Read>, has_headers: bool) -> csv::Reader<Box<dyn Read>> {
    csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(has_headers)
        .comment(Some(b'#'))
        .from_reader(raw)
}

/// Decoded bytes of a table, gunzipping when the path ends in a gzip extension.
///
/// Both plain gzip and BGZF (multi-member gzip) are accepted.
fn open_decoded(path: &Path) -> Result<Box<dyn Read>> {
    let raw: Box<dyn Read> = if is_std_stream(path) {
        Box::new(io::stdin())
    } else {
        Box::new(BufReader::new(File::open(path)?))
    };
    if is_bgzipped(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(raw))))
    } else {
        Ok(raw)
    }
}

/// Open a headered table. Lines starting with `#` are skipped.
pub fn open_table<P: AsRef<Path>>(path: P) -> Result<csv::Reader<Box<dyn Read>>> {
    Ok(table_reader(open_decoded(path.as_ref())?, true))
}

/// Open a table file positioned `offset` decoded bytes in, without a header row.
///
/// Plain files seek directly; compressed files are decoded up to `offset`.
pub fn open_table_at<P: AsRef<Path>>(path: P, offset: u64) -> Result<csv::Reader<Box<dyn Read>>> {
    let path = path.as_ref();
    let raw: Box<dyn Read> = if is_bgzipped(path) {
        let mut decoded = open_decoded(path)?;
        io::copy(&mut decoded.by_ref().take(offset), &mut io::sink())?;
        decoded
    } else {
        let mut file = File::open(path)?;
        file.seek(SeekFrom::Start(offset))?;
        Box::new(BufReader::new(file))
    };
    Ok(table_reader(raw, false))
}

/// Create a table writer, gzip-compressing when `compress` is set.
///
/// With `serde_headers` the header row is derived from the first serialized
/// record; otherwise the caller writes its own header with `write_record`.
pub fn create_table<P: AsRef<Path>>(
    path: P,
    compress: bool,
    serde_headers: bool,
) -> Result<csv::Writer<Box<dyn Write>>> {
    let path = path.as_ref();
    let raw: Box<dyn Write + Send> = if is_std_stream(path) {
        Box::new(stdout(ColorChoice::Never))
    } else {
        Box::new(BufWriter::new(File::create(path)?))
    };
    let encoded: Box<dyn Write> = if compress {
        Box::new(
            ZBuilder::<Gzip, _>::new()
                .num_threads(COMPRESSION_THREADS)
                .compression_level(Compression::new(COMPRESSION_LEVEL))
                .from_writer(raw),
        )
    } else {
        raw
    };

    Ok(csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(serde_headers)
        .from_writer(encoded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writer_and_reader_share_tab_dialect() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.tsv");
        {
            let mut writer = create_table(&path, false, false).unwrap();
            writer.write_record(["contig", "call"]).unwrap();
            writer.write_record(["chr1", "A"]).unwrap();
            writer.flush().unwrap();
        }
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "contig\tcall\nchr1\tA\n");

        let mut reader = open_table(&path).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "chr1");
    }

    #[test]
    fn comment_lines_are_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("commented.tsv");
        std::fs::write(&path, "# generated\ncontig\tcall\nchr1\tG\n").unwrap();
        let mut reader = open_table(&path).unwrap();
        assert_eq!(reader.headers().unwrap().len(), 2);
        assert_eq!(reader.records().count(), 1);
    }

    #[test]
    fn compressed_output_is_gzip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.tsv.gz");
        {
            let mut writer = create_table(&path, true, false).unwrap();
            writer.write_record(["chr1", "A"]).unwrap();
            writer.flush().unwrap();
        }
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], &[0x1f, 0x8b]);
    }

    #[test]
    fn compressed_output_reads_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.tsv.gz");
        {
            let mut writer = create_table(&path, true, false).unwrap();
            writer.write_record(["contig", "call"]).unwrap();
            writer.write_record(["chr1", "A"]).unwrap();
            writer.flush().unwrap();
        }
        let mut reader = open_table(&path).unwrap();
        let headers: Vec<&str> = reader.headers().unwrap().iter().collect();
        assert_eq!(headers, vec!["contig", "call"]);
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][1], "A");
    }

    #[test]
    fn open_at_resumes_mid_table() {
        let dir = tempdir().unwrap();
        for name in ["offsets.tsv", "offsets.tsv.gz"] {
            let path = dir.path().join(name);
            {
                let mut writer = create_table(&path, name.ends_with(".gz"), false).unwrap();
                writer.write_record(["contig", "call"]).unwrap();
                writer.write_record(["chr1", "A"]).unwrap();
                writer.write_record(["chr2", "C"]).unwrap();
                writer.flush().unwrap();
            }
            let mut reader = open_table(&path).unwrap();
            let second = reader
                .records()
                .nth(1)
                .unwrap()
                .unwrap()
                .position()
                .unwrap()
                .byte();

            let mut resumed = open_table_at(&path, second).unwrap();
            let rows: Vec<csv::StringRecord> = resumed.records().map(|r| r.unwrap()).collect();
            assert_eq!(rows.len(), 1, "{}", name);
            assert_eq!(&rows[0][0], "chr2");
        }
    }
}
