//! Single-pass driver wiring source, classifier, correlator and sink.
//!
//! Nodes are classified as they arrive: derived network nodes are written
//! immediately, turning features are held back. Qualifying ways annotate the
//! held features. Once the stream ends the held features are finalised and
//! written, and the document is closed.
//!
//! Ways can only annotate turning features that were seen before them, which
//! holds for PBF files sorted nodes-first.

use std::io::{BufWriter, Write};

use camino::Utf8Path;
use log::info;
use waymark_core::{
    Classification, Entity, HighwayCategory, NodeIdAllocator, Path, Point, TurningCorrelator,
    classify, is_network_junction, synthesize,
};

use crate::{
    JunctionStatistics, OsmStatistics, OsmXmlWriter, PbfEntitySource, PipelineError,
    ProcessError, RunReport, SourceError, TurningStatistics,
};

/// Generator name written to the output root when none is configured.
pub const DEFAULT_GENERATOR: &str = "waymark";

/// Settings for [`process_osm_pbf`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JunctionOptions {
    /// First identifier assigned to derived nodes.
    pub start_node: i64,
    /// Value of the output root's `generator` attribute.
    pub generator: String,
}

impl JunctionOptions {
    /// Options with the default generator name.
    #[must_use]
    pub fn new(start_node: i64) -> Self {
        Self {
            start_node,
            generator: DEFAULT_GENERATOR.to_owned(),
        }
    }
}

/// Per-run state of the junction driver.
#[derive(Debug)]
pub struct JunctionProcessor {
    ids: NodeIdAllocator,
    correlator: TurningCorrelator,
    statistics: OsmStatistics,
    junctions: JunctionStatistics,
    annotated: u64,
}

impl JunctionProcessor {
    /// Start a run whose derived nodes draw identifiers from `ids`.
    #[must_use]
    pub fn new(ids: NodeIdAllocator) -> Self {
        Self {
            ids,
            correlator: TurningCorrelator::default(),
            statistics: OsmStatistics::default(),
            junctions: JunctionStatistics::default(),
            annotated: 0,
        }
    }

    /// Process one entity, writing any derived nodes to `sink`.
    ///
    /// # Errors
    /// Returns [`PipelineError`] when a derived node cannot be allocated or
    /// written.
    pub fn process<W: Write>(
        &mut self,
        entity: Entity,
        sink: &mut OsmXmlWriter<W>,
    ) -> Result<(), PipelineError> {
        self.statistics.record(&entity);
        match entity {
            Entity::Point(point) => self.process_point(point, sink),
            Entity::Path(path) => {
                self.process_path(&path);
                Ok(())
            }
            Entity::Relation(_) => Ok(()),
        }
    }

    fn process_point<W: Write>(
        &mut self,
        point: Point,
        sink: &mut OsmXmlWriter<W>,
    ) -> Result<(), PipelineError> {
        if is_network_junction(&point.tags) {
            self.junctions.junctions_found += 1;
        }
        let mut turning = false;
        for outcome in classify(&point.tags) {
            match outcome {
                Classification::Network(request) => {
                    let derived = synthesize(&point, &request, &mut self.ids)?;
                    sink.write_point(&derived)?;
                    self.junctions.nodes_written += 1;
                }
                Classification::TurningFeature(_) => turning = true,
            }
        }
        if turning {
            self.correlator.register(point);
        }
        Ok(())
    }

    fn process_path(&mut self, path: &Path) {
        let Some(category) = HighwayCategory::from_tags(&path.tags) else {
            return;
        };
        let annotated = self.correlator.annotate(&path.node_refs, category);
        self.annotated += count(annotated);
    }

    /// Finalise held turning features, write them, and report.
    ///
    /// The sink is left open; the caller closes the document.
    ///
    /// # Errors
    /// Returns [`PipelineError::Sink`] when writing fails.
    pub fn finish<W: Write>(self, sink: &mut OsmXmlWriter<W>) -> Result<RunReport, PipelineError> {
        let registered = count(self.correlator.len());
        let not_set = registered.saturating_sub(count(self.correlator.annotated_count()));
        for point in self.correlator.drain_finalize() {
            sink.write_point(&point)?;
        }
        Ok(RunReport {
            junctions: self.junctions,
            turning: TurningStatistics {
                registered,
                annotated: self.annotated,
                not_set,
            },
            statistics: self.statistics,
        })
    }
}

fn count(value: usize) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

/// Stream `entities` through a fresh [`JunctionProcessor`].
///
/// Stops at the first error. The sink is left open for the caller to close.
///
/// # Errors
/// Returns [`PipelineError`] when reading, deriving, or writing fails.
///
/// # Examples
/// ```
/// use waymark_core::{Entity, NodeIdAllocator, Point, TagList};
/// use waymark_data::{OsmXmlWriter, run_junctions};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let junction = Point::new(
///     1,
///     geo::Coord { x: 7.0, y: 52.0 },
///     TagList::from_iter([("network:type", "node_network"), ("rcn_ref", "53")]),
/// );
/// let mut sink = OsmXmlWriter::begin(Vec::new(), "waymark")?;
/// let report = run_junctions(
///     [Ok(Entity::Point(junction))],
///     &mut sink,
///     NodeIdAllocator::new(1000)?,
/// )?;
///
/// assert_eq!(report.junctions.nodes_written, 1);
/// let xml = String::from_utf8(sink.finish()?)?;
/// assert!(xml.contains(r#"<node id="1000""#));
/// # Ok(())
/// # }
/// ```
pub fn run_junctions<I, W>(
    entities: I,
    sink: &mut OsmXmlWriter<W>,
    ids: NodeIdAllocator,
) -> Result<RunReport, PipelineError>
where
    I: IntoIterator<Item = Result<Entity, SourceError>>,
    W: Write,
{
    let mut processor = JunctionProcessor::new(ids);
    for entity in entities {
        processor.process(entity?, sink)?;
    }
    processor.finish(sink)
}

/// Read `input`, write derived and annotated nodes to `output`.
///
/// The output is created (or truncated) before the input is decoded; on
/// error it may be left incomplete.
///
/// # Errors
/// Returns [`ProcessError`] when the start identifier is invalid, either file
/// cannot be opened, or the run aborts.
///
/// # Examples
/// ```no_run
/// use camino::Utf8Path;
/// use waymark_data::{JunctionOptions, process_osm_pbf};
///
/// # fn main() -> Result<(), waymark_data::ProcessError> {
/// let report = process_osm_pbf(
///     Utf8Path::new("region.osm.pbf"),
///     Utf8Path::new("junctions.osm"),
///     &JunctionOptions::new(10_000_000_000),
/// )?;
/// println!("{report}");
/// # Ok(())
/// # }
/// ```
pub fn process_osm_pbf(
    input: &Utf8Path,
    output: &Utf8Path,
    options: &JunctionOptions,
) -> Result<RunReport, ProcessError> {
    let ids = NodeIdAllocator::new(options.start_node)?;
    let source = PbfEntitySource::open(input).map_err(ProcessError::OpenInput)?;
    let file = waymark_fs::create_utf8_file(output).map_err(|source| {
        ProcessError::CreateOutput {
            source,
            path: output.to_path_buf(),
        }
    })?;
    info!(
        "Processing {input} into {output} starting at node id {}",
        options.start_node
    );

    let mut sink = OsmXmlWriter::begin(BufWriter::new(file.into_std()), &options.generator)
        .map_err(PipelineError::from)?;
    let report = run_junctions(source, &mut sink, ids)?;
    sink.finish().map_err(PipelineError::from)?;

    info!(
        "Wrote {} derived and {} turning nodes to {output}",
        report.junctions.nodes_written, report.turning.registered
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SinkError;
    use camino::Utf8PathBuf;
    use rstest::{fixture, rstest};
    use std::io;
    use tempfile::TempDir;
    use waymark_core::{NOT_SET_VALUE, TURNING_KEY, test_support};

    /// Accepts `budget` bytes, then fails every write.
    struct LimitedWriter {
        budget: usize,
    }

    impl Write for LimitedWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if buf.len() > self.budget {
                return Err(io::Error::other("disk full"));
            }
            self.budget -= buf.len();
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Run {
        report: RunReport,
        xml: String,
    }

    fn run(entities: Vec<Entity>, start: i64) -> Result<Run, PipelineError> {
        let mut sink = OsmXmlWriter::begin(Vec::new(), "waymark-test")?;
        let ids = NodeIdAllocator::new(start).expect("positive start");
        let report = run_junctions(entities.into_iter().map(Ok), &mut sink, ids)?;
        let xml = String::from_utf8(sink.finish()?).expect("utf-8 output");
        Ok(Run { report, xml })
    }

    #[fixture]
    fn mixed_entities() -> Vec<Entity> {
        vec![
            Entity::Point(test_support::junction(1, &[("rcn_ref", "53"), ("rwn_ref", "X32")])),
            Entity::Point(test_support::point(77, 8.0, 51.0, &[("highway", "turning_circle")])),
            Entity::Point(test_support::point(78, 8.1, 51.1, &[("highway", "turning_loop")])),
            Entity::Point(test_support::point(79, 8.2, 51.2, &[("amenity", "bench")])),
            Entity::Path(test_support::highway_path(100, "service", &[79, 77])),
            Entity::Path(test_support::highway_path(101, "residential", &[77])),
            Entity::Path(test_support::highway_path(102, "primary", &[78])),
            Entity::Relation(test_support::node_relation(200, &[1, 77])),
        ]
    }

    #[rstest]
    fn derives_and_annotates_in_one_pass(mixed_entities: Vec<Entity>) {
        let outcome = run(mixed_entities, 1000).expect("run succeeds");
        let report = outcome.report;
        assert_eq!(
            report.junctions,
            JunctionStatistics {
                junctions_found: 1,
                nodes_written: 2,
            }
        );
        assert_eq!(
            report.turning,
            TurningStatistics {
                registered: 2,
                annotated: 1,
                not_set: 1,
            }
        );
        assert_eq!(report.statistics.nodes, 4);
        assert_eq!(report.statistics.ways, 3);
        assert_eq!(report.statistics.relations, 1);

        let xml = outcome.xml;
        let derived_bicycle = xml.find(r#"<node id="1000""#).expect("bicycle node");
        let derived_hiking = xml.find(r#"<node id="1001""#).expect("hiking node");
        let turning_circle = xml.find(r#"<node id="77""#).expect("turning circle");
        let turning_loop = xml.find(r#"<node id="78""#).expect("turning loop");
        assert!(derived_bicycle < derived_hiking);
        assert!(derived_hiking < turning_circle);
        assert!(turning_circle < turning_loop);
        assert!(xml.contains(&format!(r#"<tag k="{TURNING_KEY}" v="service"/>"#)));
        assert!(xml.contains(&format!(r#"<tag k="{TURNING_KEY}" v="{NOT_SET_VALUE}"/>"#)));
        assert!(!xml.contains(r#"v="residential""#));
        assert!(!xml.contains(r#"<node id="79""#));
        assert!(!xml.contains(r#"<node id="1""#));
    }

    #[rstest]
    fn unmatched_input_yields_an_empty_document() {
        let outcome = run(
            vec![Entity::Point(test_support::point(5, 0.0, 0.0, &[("name", "x")]))],
            1,
        )
        .expect("run succeeds");
        assert_eq!(outcome.report.junctions.nodes_written, 0);
        assert!(!outcome.xml.contains("<node"));
    }

    #[rstest]
    fn ways_before_their_nodes_do_not_annotate() {
        let outcome = run(
            vec![
                Entity::Path(test_support::highway_path(100, "track", &[77])),
                Entity::Point(test_support::point(77, 8.0, 51.0, &[("highway", "turning_circle")])),
            ],
            1,
        )
        .expect("run succeeds");
        assert_eq!(outcome.report.turning.not_set, 1);
        assert!(!outcome.xml.contains(r#"v="track""#));
    }

    #[rstest]
    fn junction_that_is_also_a_turning_feature_is_kept_whole() {
        let mut point = test_support::junction(5, &[("rhn_ref", "h1")]);
        point.tags.push("highway", "turning_loop");
        let outcome = run(vec![Entity::Point(point)], 40).expect("run succeeds");
        assert!(outcome.xml.contains(r#"<node id="40""#));
        assert!(outcome.xml.contains(r#"<node id="5""#));
        assert!(outcome.xml.contains(r#"<tag k="rhn_ref" v="h1"/>"#));
        assert_eq!(outcome.report.turning.registered, 1);
    }

    #[rstest]
    fn source_errors_abort_the_run() {
        let mut sink = OsmXmlWriter::begin(Vec::new(), "waymark-test").expect("begin document");
        let failing = crate::PbfEntitySource::from_reader(
            std::io::Cursor::new(b"definitely not protobuf".to_vec()),
            "broken.osm.pbf".into(),
        );
        let ids = NodeIdAllocator::new(1).expect("positive start");
        let err = run_junctions(failing, &mut sink, ids).expect_err("decode failure");
        assert!(matches!(
            err,
            PipelineError::Source(SourceError::Decode { .. })
        ));
    }

    #[rstest]
    fn exhausted_identifiers_abort_the_run() {
        let entities = vec![Entity::Point(test_support::junction(
            1,
            &[("rcn_ref", "53"), ("rwn_ref", "X32")],
        ))];
        let err = match run(entities, i64::MAX) {
            Ok(_) => panic!("expected identifier exhaustion"),
            Err(err) => err,
        };
        assert!(matches!(err, PipelineError::Synthesis(_)));
    }

    #[rstest]
    fn write_failures_abort_the_run() {
        let mut sink =
            OsmXmlWriter::begin(LimitedWriter { budget: 128 }, "waymark-test").expect("begin document");
        let entities = [Ok(Entity::Point(test_support::junction(
            1,
            &[("rcn_ref", "53"), ("rwn_ref", "X32")],
        )))];
        let ids = NodeIdAllocator::new(1000).expect("positive start");
        let err = run_junctions(entities, &mut sink, ids).expect_err("write failure");
        match err {
            PipelineError::Sink(SinkError::Io(inner)) => assert_eq!(inner.to_string(), "disk full"),
            other => panic!("expected an output write error, got {other:?}"),
        }
    }

    #[rstest]
    fn failing_to_start_the_document_is_an_io_error() {
        let err = match OsmXmlWriter::begin(LimitedWriter { budget: 0 }, "waymark-test") {
            Ok(_) => panic!("expected the declaration write to fail"),
            Err(err) => err,
        };
        assert!(matches!(err, SinkError::Io(_)));
    }

    #[rstest]
    fn uncreatable_output_is_reported_with_its_path() {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 tempdir");
        let input = root.join("input.osm.pbf");
        std::fs::write(&input, b"never decoded").expect("seed input");
        let output = root.join("occupied");
        std::fs::create_dir(&output).expect("seed directory");

        let err = process_osm_pbf(&input, &output, &JunctionOptions::new(1))
            .expect_err("output is a directory");
        match err {
            ProcessError::CreateOutput { path, .. } => assert_eq!(path, output),
            other => panic!("expected an output creation error, got {other:?}"),
        }
    }
}
