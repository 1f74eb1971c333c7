//! Sequential OSM PBF entity source.
//!
//! Blobs are read and decoded one at a time; the elements of each data block
//! are converted into owned [`Entity`] values and yielded in storage order.
//! Header and unknown blobs are skipped. A string that fails to decode fails
//! the whole block. After the first error the source is exhausted.

use std::{
    collections::VecDeque,
    fs::File,
    io::{BufReader, Read},
};

use camino::{Utf8Path, Utf8PathBuf};
use chrono::DateTime;
use geo::Coord;
use log::debug;
use osmpbf::{BlobDecode, BlobReader, DenseNode, Element, Info, Node, RelMemberType, Way};
use waymark_core::{Entity, MemberKind, MemberRef, Metadata, Path, Point, Relation};

use crate::SourceError;

/// Iterator over the entities stored in a PBF container.
pub struct PbfEntitySource<R: Read + Send> {
    blobs: BlobReader<R>,
    pending: VecDeque<Entity>,
    path: Utf8PathBuf,
    exhausted: bool,
}

impl PbfEntitySource<BufReader<File>> {
    /// Open the PBF file at `path`.
    ///
    /// # Errors
    /// Returns [`SourceError::Open`] when the file cannot be opened.
    ///
    /// # Examples
    /// ```no_run
    /// use camino::Utf8Path;
    /// use waymark_data::PbfEntitySource;
    ///
    /// # fn main() -> Result<(), waymark_data::SourceError> {
    /// let source = PbfEntitySource::open(Utf8Path::new("region.osm.pbf"))?;
    /// for entity in source {
    ///     println!("{:?}", entity?.kind());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn open(path: &Utf8Path) -> Result<Self, SourceError> {
        let file = waymark_fs::open_utf8_file(path).map_err(|source| SourceError::Open {
            source,
            path: path.to_path_buf(),
        })?;
        Ok(Self::from_reader(
            BufReader::new(file.into_std()),
            path.to_path_buf(),
        ))
    }
}

impl<R: Read + Send> PbfEntitySource<R> {
    /// Wrap an already opened reader. `path` labels decode errors.
    pub fn from_reader(reader: R, path: Utf8PathBuf) -> Self {
        Self {
            blobs: BlobReader::new(reader),
            pending: VecDeque::new(),
            path,
            exhausted: false,
        }
    }

    fn decode_error(&mut self, source: osmpbf::Error) -> SourceError {
        self.exhausted = true;
        SourceError::Decode {
            source,
            path: self.path.clone(),
        }
    }
}

impl<R: Read + Send> Iterator for PbfEntitySource<R> {
    type Item = Result<Entity, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entity) = self.pending.pop_front() {
                return Some(Ok(entity));
            }
            if self.exhausted {
                return None;
            }
            let blob = match self.blobs.next()? {
                Ok(blob) => blob,
                Err(source) => return Some(Err(self.decode_error(source))),
            };
            match blob.decode() {
                Ok(BlobDecode::OsmData(block)) => {
                    match block
                        .elements()
                        .map(entity_from_element)
                        .collect::<Result<Vec<_>, _>>()
                    {
                        Ok(entities) => self.pending.extend(entities),
                        Err(source) => return Some(Err(self.decode_error(source))),
                    }
                }
                Ok(_) => debug!("Skipped non-data blob in {}", self.path),
                Err(source) => return Some(Err(self.decode_error(source))),
            }
        }
    }
}

fn entity_from_element(element: Element<'_>) -> Result<Entity, osmpbf::Error> {
    Ok(match element {
        Element::Node(node) => Entity::Point(point_from_node(&node)?),
        Element::DenseNode(node) => Entity::Point(point_from_dense_node(&node)?),
        Element::Way(way) => Entity::Path(path_from_way(&way)?),
        Element::Relation(relation) => Entity::Relation(relation_from_pbf(&relation)?),
    })
}

fn point_from_node(node: &Node<'_>) -> Result<Point, osmpbf::Error> {
    Ok(Point {
        id: node.id(),
        location: Coord {
            x: node.lon(),
            y: node.lat(),
        },
        tags: node.tags().collect(),
        metadata: metadata_from_info(&node.info())?,
    })
}

fn point_from_dense_node(node: &DenseNode<'_>) -> Result<Point, osmpbf::Error> {
    let metadata = match node.info() {
        Some(info) => Metadata {
            user: Some(info.user()?.to_owned()),
            uid: Some(info.uid()),
            visible: !info.deleted(),
            version: Some(info.version()),
            changeset: Some(info.changeset()),
            timestamp: DateTime::from_timestamp_millis(info.milli_timestamp()),
        },
        None => Metadata::default(),
    };
    Ok(Point {
        id: node.id(),
        location: Coord {
            x: node.lon(),
            y: node.lat(),
        },
        tags: node.tags().collect(),
        metadata,
    })
}

fn path_from_way(way: &Way<'_>) -> Result<Path, osmpbf::Error> {
    Ok(Path {
        id: way.id(),
        node_refs: way.refs().collect(),
        tags: way.tags().collect(),
        metadata: metadata_from_info(&way.info())?,
    })
}

fn relation_from_pbf(relation: &osmpbf::Relation<'_>) -> Result<Relation, osmpbf::Error> {
    let members = relation
        .members()
        .map(|member| MemberRef {
            kind: match member.member_type {
                RelMemberType::Node => MemberKind::Node,
                RelMemberType::Way => MemberKind::Way,
                RelMemberType::Relation => MemberKind::Relation,
            },
            id: member.member_id,
        })
        .collect();
    Ok(Relation {
        id: relation.id(),
        members,
        tags: relation.tags().collect(),
        metadata: metadata_from_info(&relation.info())?,
    })
}

fn metadata_from_info(info: &Info<'_>) -> Result<Metadata, osmpbf::Error> {
    Ok(Metadata {
        user: info.user().transpose()?.map(str::to_owned),
        uid: info.uid(),
        visible: !info.deleted(),
        version: info.version(),
        changeset: info.changeset(),
        timestamp: info
            .milli_timestamp()
            .and_then(DateTime::from_timestamp_millis),
    })
}
