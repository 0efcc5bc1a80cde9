//! Streaming consumers of per-locus results.
//!
//! The aggregator obtains a fresh set of sinks for every contig, primes each one
//! exactly once, pushes every [`PositionInfo`] in coordinate order and closes the
//! sinks after the contig's last locus. Sinks are driven sequentially in
//! registration order.

use crate::core::error::Result;
use crate::pipeline::analyze::locus::PositionInfo;

/// A per-contig consumer of locus results.
pub trait PositionSink {
    /// Called once before the first locus; may open a destination and write a header.
    fn prime(&mut self) -> Result<()>;

    /// Called once per locus in increasing coordinate order.
    fn accept(&mut self, info: &PositionInfo) -> Result<()>;

    /// Called once after the contig's last locus.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Builds the sinks for one contig.
pub trait SinkFactory {
    fn open(&mut self, contig: &str) -> Result<Vec<Box<dyn PositionSink>>>;
}

impl<F> SinkFactory for F
where
    F: FnMut(&str) -> Result<Vec<Box<dyn PositionSink>>>,
{
    fn open(&mut self, contig: &str) -> Result<Vec<Box<dyn PositionSink>>> {
        self(contig)
    }
}

/// A factory producing no sinks, for statistics-only runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSinks;

impl SinkFactory for NoSinks {
    fn open(&mut self, _contig: &str) -> Result<Vec<Box<dyn PositionSink>>> {
        Ok(Vec::new())
    }
}
