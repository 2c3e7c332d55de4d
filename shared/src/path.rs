//! SVG path data for decoded geometry.
//!
//! Coordinates in the source topology are already projected to screen space,
//! so points are written through unchanged.

use std::fmt::Write;

use geo::{Coord, Geometry, LineString, MultiLineString, Polygon};

/// Write `value` with at most three decimals and no trailing zeros.
fn write_number(buf: &mut String, value: f64) {
    let rounded = (value * 1000.0).round() / 1000.0;
    // Avoid "-0".
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    let _ = write!(buf, "{rounded}");
}

fn write_coord(buf: &mut String, command: char, Coord { x, y }: Coord<f64>) {
    buf.push(command);
    write_number(buf, x);
    buf.push(',');
    write_number(buf, y);
}

fn write_line(buf: &mut String, coords: &[Coord<f64>]) {
    for (i, c) in coords.iter().enumerate() {
        write_coord(buf, if i == 0 { 'M' } else { 'L' }, *c);
    }
}

/// Rings are closed with `Z`, so a repeated closing point is skipped.
fn write_ring(buf: &mut String, ring: &LineString<f64>) {
    let coords = ring.0.as_slice();
    let open = match coords {
        [first, rest @ .., last] if first == last && !rest.is_empty() => &coords[..coords.len() - 1],
        _ => coords,
    };
    if open.is_empty() {
        return;
    }
    write_line(buf, open);
    buf.push('Z');
}

fn write_polygon(buf: &mut String, polygon: &Polygon<f64>) {
    write_ring(buf, polygon.exterior());
    for hole in polygon.interiors() {
        write_ring(buf, hole);
    }
}

fn write_geometry(buf: &mut String, geometry: &Geometry<f64>) {
    match geometry {
        // Points are not drawn by the map.
        Geometry::Point(_) | Geometry::MultiPoint(_) => {}
        Geometry::Line(line) => write_line(buf, &[line.start, line.end]),
        Geometry::LineString(line) => write_line(buf, &line.0),
        Geometry::MultiLineString(lines) => {
            for line in lines {
                write_line(buf, &line.0);
            }
        }
        Geometry::Polygon(polygon) => write_polygon(buf, polygon),
        Geometry::MultiPolygon(polygons) => {
            for polygon in polygons {
                write_polygon(buf, polygon);
            }
        }
        Geometry::Rect(rect) => write_polygon(buf, &rect.to_polygon()),
        Geometry::Triangle(triangle) => write_polygon(buf, &triangle.to_polygon()),
        Geometry::GeometryCollection(members) => {
            for member in members {
                write_geometry(buf, member);
            }
        }
    }
}

/// Path data for one geometry. Empty geometry gives an empty string.
pub fn geometry_path(geometry: &Geometry<f64>) -> String {
    let mut buf = String::new();
    write_geometry(&mut buf, geometry);
    buf
}

/// Path data for a set of open lines, e.g. a border mesh.
pub fn lines_path(lines: &MultiLineString<f64>) -> String {
    let mut buf = String::new();
    for line in lines {
        write_line(&mut buf, &line.0);
    }
    buf
}
