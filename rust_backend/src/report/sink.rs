//! Output sink routing and creation.
//!
//! Routing is a pure function of the two layout switches: the statistical
//! core never knows which file a column ends up in.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// The two output routing switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputLayout {
    /// One statistics sink per region instead of one shared sink
    pub write_per_region: bool,
    /// Histogram columns go to dedicated per-band sinks instead of inline
    pub write_separate_histogram: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SinkKind {
    Statistics,
    /// Dedicated histogram sink of the band at this index
    Histogram(usize),
}

/// Identifies one output sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SinkKey {
    /// `None` for the sink shared by all regions
    pub region: Option<usize>,
    pub kind: SinkKind,
}

impl OutputLayout {
    /// Sink receiving the statistics (`band == None`) or histogram columns of `band` for `region`.
    ///
    /// Inline histograms route to the statistics sink.
    pub fn route(&self, region: usize, band: Option<usize>) -> SinkKey {
        let region = self.write_per_region.then_some(region);
        let kind = match band {
            Some(band) if self.write_separate_histogram => SinkKind::Histogram(band),
            _ => SinkKind::Statistics,
        };
        SinkKey { region, kind }
    }

    /// All sinks in write order: per region group, statistics first, then histograms by band.
    pub fn sinks(&self, region_count: usize, histogram_bands: &[usize]) -> Vec<SinkKey> {
        let groups: Vec<Option<usize>> = if self.write_per_region {
            (0..region_count).map(Some).collect()
        } else {
            vec![None]
        };

        let mut keys = Vec::new();
        for region in groups {
            keys.push(SinkKey {
                region,
                kind: SinkKind::Statistics,
            });
            if self.write_separate_histogram {
                keys.extend(histogram_bands.iter().map(|&band| SinkKey {
                    region,
                    kind: SinkKind::Histogram(band),
                }));
            }
        }
        keys
    }
}

/// Deterministic file name of a sink.
pub fn sink_name(key: &SinkKey, region_names: &[String], band_names: &[String]) -> String {
    let prefix = match key.region {
        Some(region) => format!("region-{}", region_names[region]),
        None => "region".to_string(),
    };
    match key.kind {
        SinkKind::Statistics => format!("{}-statistics.csv", prefix),
        SinkKind::Histogram(band) => format!("{}-histogram-{}.csv", prefix, band_names[band]),
    }
}

/// Creates named output writers.
pub trait WriterFactory {
    fn create_writer(&mut self, name: &str) -> io::Result<Box<dyn Write>>;
}

/// Writes each sink to a file inside a directory.
#[derive(Debug, Clone)]
pub struct DirectoryWriterFactory {
    directory: PathBuf,
}

impl DirectoryWriterFactory {
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl WriterFactory for DirectoryWriterFactory {
    fn create_writer(&mut self, name: &str) -> io::Result<Box<dyn Write>> {
        fs::create_dir_all(&self.directory)?;
        let file = File::create(self.directory.join(name))?;
        Ok(Box::new(BufWriter::new(file)))
    }
}

type SharedOutputs = Rc<RefCell<BTreeMap<String, Vec<u8>>>>;

/// Keeps every sink in memory; clones share the same outputs.
#[derive(Debug, Clone, Default)]
pub struct MemoryWriterFactory {
    outputs: SharedOutputs,
}

impl MemoryWriterFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of all sinks created so far, sorted.
    pub fn names(&self) -> Vec<String> {
        self.outputs.borrow().keys().cloned().collect()
    }

    /// Text written to sink `name`.
    pub fn contents(&self, name: &str) -> Option<String> {
        self.outputs
            .borrow()
            .get(name)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

impl WriterFactory for MemoryWriterFactory {
    fn create_writer(&mut self, name: &str) -> io::Result<Box<dyn Write>> {
        self.outputs.borrow_mut().insert(name.to_string(), Vec::new());
        Ok(Box::new(MemoryWriter {
            name: name.to_string(),
            outputs: Rc::clone(&self.outputs),
        }))
    }
}

struct MemoryWriter {
    name: String,
    outputs: SharedOutputs,
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.outputs
            .borrow_mut()
            .entry(self.name.clone())
            .or_default()
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_route_shared_inline() {
        let layout = OutputLayout {
            write_per_region: false,
            write_separate_histogram: false,
        };
        let stats = SinkKey {
            region: None,
            kind: SinkKind::Statistics,
        };
        assert_eq!(layout.route(3, None), stats);
        assert_eq!(layout.route(3, Some(1)), stats);
    }

    #[test]
    fn test_route_per_region_separate() {
        let layout = OutputLayout {
            write_per_region: true,
            write_separate_histogram: true,
        };
        assert_eq!(
            layout.route(2, Some(1)),
            SinkKey {
                region: Some(2),
                kind: SinkKind::Histogram(1)
            }
        );
        assert_eq!(
            layout.route(2, None),
            SinkKey {
                region: Some(2),
                kind: SinkKind::Statistics
            }
        );
    }

    #[test]
    fn test_sink_count_matches_layout() {
        for &(per_region, separate) in &[(false, false), (false, true), (true, false), (true, true)] {
            let layout = OutputLayout {
                write_per_region: per_region,
                write_separate_histogram: separate,
            };
            let sinks = layout.sinks(3, &[0, 2]);
            let expected = (if per_region { 3 } else { 1 }) * (if separate { 3 } else { 1 });
            assert_eq!(sinks.len(), expected);
        }
    }

    #[test]
    fn test_sink_names() {
        let regions = names(&["north", "south"]);
        let bands = names(&["b1", "b2"]);

        let shared = SinkKey {
            region: None,
            kind: SinkKind::Statistics,
        };
        assert_eq!(sink_name(&shared, &regions, &bands), "region-statistics.csv");

        let shared_histo = SinkKey {
            region: None,
            kind: SinkKind::Histogram(1),
        };
        assert_eq!(sink_name(&shared_histo, &regions, &bands), "region-histogram-b2.csv");

        let per_region = SinkKey {
            region: Some(1),
            kind: SinkKind::Statistics,
        };
        assert_eq!(sink_name(&per_region, &regions, &bands), "region-south-statistics.csv");

        let per_region_histo = SinkKey {
            region: Some(0),
            kind: SinkKind::Histogram(0),
        };
        assert_eq!(
            sink_name(&per_region_histo, &regions, &bands),
            "region-north-histogram-b1.csv"
        );
    }

    #[test]
    fn test_memory_factory_shares_outputs() {
        let factory = MemoryWriterFactory::new();
        let mut handle = factory.clone();
        {
            let mut writer = handle.create_writer("a.csv").unwrap();
            writer.write_all(b"x\ty\n").unwrap();
        }
        assert_eq!(factory.names(), vec!["a.csv"]);
        assert_eq!(factory.contents("a.csv").unwrap(), "x\ty\n");
        assert!(factory.contents("b.csv").is_none());
    }

    #[test]
    fn test_directory_factory_creates_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut factory = DirectoryWriterFactory::new(dir.path().join("out"));
        {
            let mut writer = factory.create_writer("region-statistics.csv").unwrap();
            writer.write_all(b"RegionId\n").unwrap();
            writer.flush().unwrap();
        }
        let text = fs::read_to_string(dir.path().join("out/region-statistics.csv")).unwrap();
        assert_eq!(text, "RegionId\n");
    }
}
