//! TopoJSON decoding.
//!
//! A topology stores every boundary segment once as an "arc"; geometries refer
//! to arcs by index, with a negative index `i` meaning arc `!i` walked
//! backwards. Decoding turns those references back into absolute coordinate
//! rings (`feature`) or into a line geometry holding each referenced arc once
//! (`mesh`).

use std::collections::HashMap;

use geo::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon,
};
use serde::Deserialize;
use thiserror::Error;

use crate::education::CountyId;

#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("malformed topology JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("topology has no object named '{0}'")]
    MissingObject(String),

    #[error("arc index {index} out of range ({len} arcs)")]
    ArcOutOfRange { index: i64, len: usize },

    #[error("arc {arc} position {position} has fewer than two coordinates")]
    ShortPosition { arc: usize, position: usize },
}

/// Quantization transform applied to delta-encoded arcs.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Transform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

impl Transform {
    fn apply(&self, x: f64, y: f64) -> Coord<f64> {
        Coord {
            x: x * self.scale[0] + self.translate[0],
            y: y * self.scale[1] + self.translate[1],
        }
    }
}

/// Geometry identifier as found in the source: either a number or a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum GeometryId {
    Number(f64),
    Text(String),
}

impl GeometryId {
    /// Interpret the id as a FIPS code. Fractional, negative and non-numeric
    /// ids yield `None`.
    pub fn as_county_id(&self) -> Option<CountyId> {
        match self {
            Self::Number(n) => {
                if n.fract() == 0.0 && *n >= 0.0 && *n <= u32::MAX as f64 {
                    Some(CountyId(*n as u32))
                } else {
                    None
                }
            }
            Self::Text(s) => s.parse().ok(),
        }
    }
}

/// A geometry object inside `objects`, still referring to arcs by index.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum GeometryObject {
    GeometryCollection {
        geometries: Vec<GeometryObject>,
    },
    Point {
        coordinates: Vec<f64>,
        #[serde(default)]
        id: Option<GeometryId>,
    },
    MultiPoint {
        coordinates: Vec<Vec<f64>>,
        #[serde(default)]
        id: Option<GeometryId>,
    },
    LineString {
        arcs: Vec<i64>,
        #[serde(default)]
        id: Option<GeometryId>,
    },
    MultiLineString {
        arcs: Vec<Vec<i64>>,
        #[serde(default)]
        id: Option<GeometryId>,
    },
    Polygon {
        arcs: Vec<Vec<i64>>,
        #[serde(default)]
        id: Option<GeometryId>,
    },
    MultiPolygon {
        arcs: Vec<Vec<Vec<i64>>>,
        #[serde(default)]
        id: Option<GeometryId>,
    },
}

impl GeometryObject {
    pub fn id(&self) -> Option<&GeometryId> {
        match self {
            Self::GeometryCollection { .. } => None,
            Self::Point { id, .. }
            | Self::MultiPoint { id, .. }
            | Self::LineString { id, .. }
            | Self::MultiLineString { id, .. }
            | Self::Polygon { id, .. }
            | Self::MultiPolygon { id, .. } => id.as_ref(),
        }
    }
}

/// One decoded geometry in absolute coordinates, with the source id beside it.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: Option<GeometryId>,
    pub geometry: Geometry<f64>,
}

impl Feature {
    pub fn county_id(&self) -> Option<CountyId> {
        self.id.as_ref().and_then(GeometryId::as_county_id)
    }
}

/// Mesh filter: keeps only arcs referenced by two distinct geometries,
/// i.e. borders between neighbours rather than outer coastlines.
pub fn interior(a: &GeometryObject, b: &GeometryObject) -> bool {
    !std::ptr::eq(a, b)
}

#[derive(Debug, Clone, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub transform: Option<Transform>,
    pub arcs: Vec<Vec<Vec<f64>>>,
    pub objects: HashMap<String, GeometryObject>,
}

impl Topology {
    pub fn from_json(json: &str) -> Result<Self, TopologyError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn object(&self, name: &str) -> Result<&GeometryObject, TopologyError> {
        self.objects
            .get(name)
            .ok_or_else(|| TopologyError::MissingObject(name.to_string()))
    }

    /// Features for the named object. A collection yields one feature per
    /// member, in source order; any other geometry yields a single feature.
    pub fn feature(&self, name: &str) -> Result<Vec<Feature>, TopologyError> {
        let object = self.object(name)?;
        let decoder = ArcDecoder::new(self)?;
        match object {
            GeometryObject::GeometryCollection { geometries } => geometries
                .iter()
                .map(|g| decoder.feature(g))
                .collect(),
            other => Ok(vec![decoder.feature(other)?]),
        }
    }

    /// Every arc referenced by the named object, each exactly once, oriented
    /// as in its first reference.
    ///
    /// With a `filter`, an arc is kept only when `filter(first, last)` holds
    /// for the first and last geometries referencing it; for an arc used by
    /// one geometry only, `first` and `last` are the same object.
    pub fn mesh<F>(&self, name: &str, filter: Option<F>) -> Result<MultiLineString<f64>, TopologyError>
    where
        F: Fn(&GeometryObject, &GeometryObject) -> bool,
    {
        let object = self.object(name)?;
        let decoder = ArcDecoder::new(self)?;

        let mut refs: Vec<Option<ArcRefs<'_>>> = vec![None; self.arcs.len()];
        collect_arc_refs(object, object, &mut refs)?;

        let mut lines = Vec::new();
        for arc_refs in refs.into_iter().flatten() {
            if let Some(keep) = &filter
                && !keep(arc_refs.first, arc_refs.last)
            {
                continue;
            }
            let mut coords = Vec::new();
            decoder.push_arc(arc_refs.first_index, &mut coords)?;
            lines.push(LineString::new(coords));
        }
        Ok(MultiLineString::new(lines))
    }
}

#[derive(Clone, Copy)]
struct ArcRefs<'a> {
    first_index: i64,
    first: &'a GeometryObject,
    last: &'a GeometryObject,
}

fn record_arc<'a>(
    index: i64,
    owner: &'a GeometryObject,
    refs: &mut [Option<ArcRefs<'a>>],
) -> Result<(), TopologyError> {
    let len = refs.len();
    let slot = arc_slot(index, len)
        .and_then(|i| refs.get_mut(i))
        .ok_or(TopologyError::ArcOutOfRange { index, len })?;
    match slot {
        Some(existing) => existing.last = owner,
        None => {
            *slot = Some(ArcRefs {
                first_index: index,
                first: owner,
                last: owner,
            })
        }
    }
    Ok(())
}

fn collect_arc_refs<'a>(
    object: &'a GeometryObject,
    owner: &'a GeometryObject,
    refs: &mut [Option<ArcRefs<'a>>],
) -> Result<(), TopologyError> {
    match object {
        GeometryObject::GeometryCollection { geometries } => {
            for g in geometries {
                collect_arc_refs(g, g, refs)?;
            }
        }
        GeometryObject::LineString { arcs, .. } => {
            for &i in arcs {
                record_arc(i, owner, refs)?;
            }
        }
        GeometryObject::MultiLineString { arcs, .. } | GeometryObject::Polygon { arcs, .. } => {
            for &i in arcs.iter().flatten() {
                record_arc(i, owner, refs)?;
            }
        }
        GeometryObject::MultiPolygon { arcs, .. } => {
            for &i in arcs.iter().flatten().flatten() {
                record_arc(i, owner, refs)?;
            }
        }
        GeometryObject::Point { .. } | GeometryObject::MultiPoint { .. } => {}
    }
    Ok(())
}

/// Position in `arcs` for a signed arc reference.
fn arc_slot(index: i64, len: usize) -> Option<usize> {
    let slot = if index < 0 { !index } else { index };
    usize::try_from(slot).ok().filter(|&s| s < len)
}

/// Arcs with delta decoding and the quantization transform already applied.
struct ArcDecoder {
    arcs: Vec<Vec<Coord<f64>>>,
    transform: Option<Transform>,
}

impl ArcDecoder {
    fn new(topology: &Topology) -> Result<Self, TopologyError> {
        let arcs = topology
            .arcs
            .iter()
            .enumerate()
            .map(|(arc_idx, arc)| {
                let (mut x, mut y) = (0.0_f64, 0.0_f64);
                arc.iter()
                    .enumerate()
                    .map(|(position, p)| {
                        let [px, py, ..] = p.as_slice() else {
                            return Err(TopologyError::ShortPosition {
                                arc: arc_idx,
                                position,
                            });
                        };
                        Ok(match &topology.transform {
                            Some(t) => {
                                x += *px;
                                y += *py;
                                t.apply(x, y)
                            }
                            None => Coord { x: *px, y: *py },
                        })
                    })
                    .collect::<Result<Vec<Coord<f64>>, _>>()
            })
            .collect::<Result<Vec<_>, TopologyError>>()?;
        Ok(Self {
            arcs,
            transform: topology.transform,
        })
    }

    /// Append arc `index` to `line`, replacing the shared junction point
    /// with the arc's own first point.
    fn push_arc(&self, index: i64, line: &mut Vec<Coord<f64>>) -> Result<(), TopologyError> {
        let len = self.arcs.len();
        let arc = arc_slot(index, len)
            .map(|i| &self.arcs[i])
            .ok_or(TopologyError::ArcOutOfRange { index, len })?;
        line.pop();
        let start = line.len();
        line.extend_from_slice(arc);
        if index < 0 {
            line[start..].reverse();
        }
        Ok(())
    }

    fn coords(&self, arcs: &[i64]) -> Result<Vec<Coord<f64>>, TopologyError> {
        let mut coords = Vec::new();
        for &i in arcs {
            self.push_arc(i, &mut coords)?;
        }
        if coords.len() == 1 {
            coords.push(coords[0]);
        }
        Ok(coords)
    }

    fn line(&self, arcs: &[i64]) -> Result<LineString<f64>, TopologyError> {
        Ok(LineString::new(self.coords(arcs)?))
    }

    /// A ring has at least four points, first equal to last.
    fn ring(&self, arcs: &[i64]) -> Result<LineString<f64>, TopologyError> {
        let mut coords = self.coords(arcs)?;
        while !coords.is_empty() && coords.len() < 4 {
            coords.push(coords[0]);
        }
        Ok(LineString::new(coords))
    }

    /// First ring is the exterior, the rest are holes.
    fn polygon(&self, rings: &[Vec<i64>]) -> Result<Polygon<f64>, TopologyError> {
        let mut rings = rings
            .iter()
            .map(|r| self.ring(r))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter();
        let exterior = rings.next().unwrap_or_else(|| LineString::new(Vec::new()));
        Ok(Polygon::new(exterior, rings.collect()))
    }

    fn position(&self, coordinates: &[f64]) -> Point<f64> {
        let x = coordinates.first().copied().unwrap_or(0.0);
        let y = coordinates.get(1).copied().unwrap_or(0.0);
        match &self.transform {
            Some(t) => Point::from(t.apply(x, y)),
            None => Point::new(x, y),
        }
    }

    fn geometry(&self, object: &GeometryObject) -> Result<Geometry<f64>, TopologyError> {
        Ok(match object {
            GeometryObject::GeometryCollection { geometries } => {
                Geometry::GeometryCollection(GeometryCollection(
                    geometries
                        .iter()
                        .map(|g| self.geometry(g))
                        .collect::<Result<Vec<_>, _>>()?,
                ))
            }
            GeometryObject::Point { coordinates, .. } => Geometry::Point(self.position(coordinates)),
            GeometryObject::MultiPoint { coordinates, .. } => Geometry::MultiPoint(MultiPoint::new(
                coordinates.iter().map(|c| self.position(c)).collect(),
            )),
            GeometryObject::LineString { arcs, .. } => Geometry::LineString(self.line(arcs)?),
            GeometryObject::MultiLineString { arcs, .. } => {
                Geometry::MultiLineString(MultiLineString::new(
                    arcs.iter()
                        .map(|a| self.line(a))
                        .collect::<Result<_, _>>()?,
                ))
            }
            GeometryObject::Polygon { arcs, .. } => Geometry::Polygon(self.polygon(arcs)?),
            GeometryObject::MultiPolygon { arcs, .. } => Geometry::MultiPolygon(MultiPolygon::new(
                arcs.iter()
                    .map(|p| self.polygon(p))
                    .collect::<Result<_, _>>()?,
            )),
        })
    }

    fn feature(&self, object: &GeometryObject) -> Result<Feature, TopologyError> {
        Ok(Feature {
            id: object.id().cloned(),
            geometry: self.geometry(object)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use geo::{Coord, Geometry, LineString, MultiLineString, Polygon};
    use serde_json::json;

    use super::{GeometryId, GeometryObject, Topology, TopologyError, interior};
    use crate::education::CountyId;

    /// Two unit squares side by side sharing the edge x = 1.
    ///
    /// arc 0: shared edge (1,0) -> (1,1)
    /// arc 1: left square outline (1,1) -> (0,1) -> (0,0) -> (1,0)
    /// arc 2: right square outline (1,0) -> (2,0) -> (2,1) -> (1,1)
    fn two_squares() -> Topology {
        let value = json!({
            "type": "Topology",
            "arcs": [
                [[1, 0], [1, 1]],
                [[1, 1], [0, 1], [0, 0], [1, 0]],
                [[1, 0], [2, 0], [2, 1], [1, 1]]
            ],
            "objects": {
                "counties": {
                    "type": "GeometryCollection",
                    "geometries": [
                        { "type": "Polygon", "id": 1001, "arcs": [[0, 1]] },
                        { "type": "Polygon", "id": "01003", "arcs": [[2, -1]] }
                    ]
                }
            }
        });
        serde_json::from_value(value).expect("valid topology")
    }

    fn ring(points: &[(f64, f64)]) -> LineString<f64> {
        LineString::from(points.to_vec())
    }

    fn edge_count(lines: &MultiLineString<f64>, a: Coord<f64>, b: Coord<f64>) -> usize {
        lines
            .iter()
            .flat_map(|line| line.lines())
            .filter(|l| (l.start == a && l.end == b) || (l.start == b && l.end == a))
            .count()
    }

    #[test]
    fn feature_stitches_rings_and_keeps_ids() {
        let topology = two_squares();
        let features = topology.feature("counties").expect("counties present");
        assert_eq!(features.len(), 2);

        assert_eq!(features[0].county_id(), Some(CountyId(1001)));
        assert_eq!(features[1].county_id(), Some(CountyId(1003)));

        assert_eq!(
            features[0].geometry,
            Geometry::Polygon(Polygon::new(
                ring(&[(1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0), (1.0, 0.0)]),
                vec![],
            ))
        );
        // Reversed shared arc closes the right square back at (1,0).
        assert_eq!(
            features[1].geometry,
            Geometry::Polygon(Polygon::new(
                ring(&[(1.0, 0.0), (2.0, 0.0), (2.0, 1.0), (1.0, 1.0), (1.0, 0.0)]),
                vec![],
            ))
        );
    }

    #[test]
    fn multipolygon_with_detached_island() {
        // State "01" is the left square plus an island built from arc 3.
        let value = json!({
            "type": "Topology",
            "arcs": [
                [[1, 0], [1, 1]],
                [[1, 1], [0, 1], [0, 0], [1, 0]],
                [[1, 0], [2, 0], [2, 1], [1, 1]],
                [[5, 5], [6, 5], [6, 6], [5, 5]]
            ],
            "objects": {
                "states": {
                    "type": "GeometryCollection",
                    "geometries": [
                        { "type": "MultiPolygon", "id": "01", "arcs": [[[0, 1]], [[3]]] },
                        { "type": "Polygon", "id": "13", "arcs": [[2, -1]] }
                    ]
                }
            }
        });
        let topology: Topology = serde_json::from_value(value).expect("valid topology");

        let features = topology.feature("states").expect("states present");
        let Geometry::MultiPolygon(parts) = &features[0].geometry else {
            panic!("expected a multipolygon, got {:?}", features[0].geometry);
        };
        assert_eq!(parts.0.len(), 2);
        assert_eq!(
            parts.0[0].exterior(),
            &ring(&[(1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0), (1.0, 0.0)])
        );
        assert_eq!(
            parts.0[1].exterior(),
            &ring(&[(5.0, 5.0), (6.0, 5.0), (6.0, 6.0), (5.0, 5.0)])
        );

        let inner = topology.mesh("states", Some(interior)).expect("mesh");
        assert_eq!(inner, MultiLineString::new(vec![ring(&[(1.0, 0.0), (1.0, 1.0)])]));
        assert_eq!(
            edge_count(&inner, Coord { x: 5.0, y: 5.0 }, Coord { x: 6.0, y: 5.0 }),
            0
        );
    }

    #[test]
    fn polygon_holes_follow_the_exterior() {
        let value = json!({
            "type": "Topology",
            "arcs": [
                [[0, 0], [4, 0], [4, 4], [0, 4], [0, 0]],
                [[1, 1], [1, 2], [2, 2], [1, 1]]
            ],
            "objects": {
                "counties": { "type": "Polygon", "id": 2013, "arcs": [[0], [1]] }
            }
        });
        let topology: Topology = serde_json::from_value(value).expect("valid topology");
        let features = topology.feature("counties").expect("counties present");
        let Geometry::Polygon(polygon) = &features[0].geometry else {
            panic!("expected a polygon, got {:?}", features[0].geometry);
        };
        assert_eq!(polygon.exterior().0.len(), 5);
        assert_eq!(
            polygon.interiors(),
            &[ring(&[(1.0, 1.0), (1.0, 2.0), (2.0, 2.0), (1.0, 1.0)])]
        );
    }

    #[test]
    fn mesh_emits_shared_edge_once() {
        let topology = two_squares();
        let all = topology
            .mesh::<fn(&GeometryObject, &GeometryObject) -> bool>("counties", None)
            .expect("mesh");
        assert_eq!(all.0.len(), 3);
        assert_eq!(
            edge_count(&all, Coord { x: 1.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 }),
            1
        );
    }

    #[test]
    fn interior_mesh_drops_outer_edges() {
        let topology = two_squares();
        let inner = topology.mesh("counties", Some(interior)).expect("mesh");
        assert_eq!(inner, MultiLineString::new(vec![ring(&[(1.0, 0.0), (1.0, 1.0)])]));
    }

    #[test]
    fn quantized_arcs_are_delta_decoded() {
        let value = json!({
            "type": "Topology",
            "transform": { "scale": [0.5, 2.0], "translate": [10.0, 100.0] },
            "arcs": [[[0, 0], [2, 0], [0, 3], [-2, -3]]],
            "objects": {
                "states": {
                    "type": "GeometryCollection",
                    "geometries": [{ "type": "Polygon", "id": "01", "arcs": [[0]] }]
                }
            }
        });
        let topology: Topology = serde_json::from_value(value).expect("valid topology");
        let features = topology.feature("states").expect("states present");
        assert_eq!(
            features[0].geometry,
            Geometry::Polygon(Polygon::new(
                ring(&[(10.0, 100.0), (11.0, 100.0), (11.0, 106.0), (10.0, 100.0)]),
                vec![],
            ))
        );
    }

    #[test]
    fn decoding_is_deterministic() {
        let a = two_squares().feature("counties").expect("features");
        let b = two_squares().feature("counties").expect("features");
        assert_eq!(a, b);
    }

    #[test]
    fn missing_object_is_an_error() {
        let err = two_squares().feature("states").unwrap_err();
        assert!(matches!(err, TopologyError::MissingObject(name) if name == "states"));
    }

    #[test]
    fn out_of_range_arc_is_an_error() {
        let value = json!({
            "type": "Topology",
            "arcs": [[[0, 0], [1, 1]]],
            "objects": {
                "counties": { "type": "Polygon", "id": 5, "arcs": [[-3]] }
            }
        });
        let topology: Topology = serde_json::from_value(value).expect("valid topology");
        assert!(matches!(
            topology.feature("counties"),
            Err(TopologyError::ArcOutOfRange { index: -3, len: 1 })
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            Topology::from_json("{\"arcs\": 3}"),
            Err(TopologyError::Parse(_))
        ));
    }

    #[test]
    fn geometry_ids_parse_as_fips() {
        assert_eq!(GeometryId::Number(1001.0).as_county_id(), Some(CountyId(1001)));
        assert_eq!(GeometryId::Text("06037".into()).as_county_id(), Some(CountyId(6037)));
        assert_eq!(GeometryId::Number(1.5).as_county_id(), None);
        assert_eq!(GeometryId::Number(-4.0).as_county_id(), None);
        assert_eq!(GeometryId::Text("Alabama".into()).as_county_id(), None);
    }
}
