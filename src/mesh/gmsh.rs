//! Reader and writer for ASCII Gmsh meshes (MSH 2.2) as [`MeshBlock`]s.
//!
//! ## Element codes
//! - 1 = Line (boundary edge of a 2-D mesh)
//! - 2 = Triangle (2-D cell, or boundary face of a 3-D mesh)
//! - 3 = Quadrilateral (2-D cell, or boundary face of a 3-D mesh)
//! - 4 = Tetrahedron
//! - 5 = Hexahedron
//! - 6 = Prism
//! - 7 = Pyramid
//! - 15 = Point (ignored)
//!
//! The first element tag is the physical group, mapped to a
//! [`BoundaryTag`] for boundary entities.
//!
//! ```no_run
//! use cese_rs::read_gmsh_block;
//!
//! let block = read_gmsh_block("channel.msh".as_ref(), 2).unwrap();
//! println!("{} cells, {} ghosts", block.n_cells, block.n_ghost_cells);
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use super::block::MeshBlock;
use super::boundary_tags::BoundaryTag;
use super::builder::{MeshBlockBuilder, MeshError};
use super::cell_type::CellType;

/// Failure while reading or writing an MSH file.
#[derive(Debug, Error)]
pub enum GmshError {
    #[error("MSH I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A line did not match the MSH 2.2 grammar.
    #[error("malformed MSH content: {0}")]
    Malformed(String),

    /// Only ASCII 2.x files are read.
    #[error("MSH version {0} is not supported")]
    UnsupportedVersion(String),

    #[error("element code {0} has no cell or face shape")]
    UnsupportedElement(i32),

    #[error("MSH file has no {0} section")]
    MissingSection(String),

    /// Connectivity could not be turned into a mesh block.
    #[error("Mesh error: {0}")]
    Mesh(#[from] MeshError),
}

/// Gmsh element types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GmshElementType {
    Line = 1,
    Triangle = 2,
    Quadrilateral = 3,
    Tetrahedron = 4,
    Hexahedron = 5,
    Prism = 6,
    Pyramid = 7,
    Point = 15,
}

impl GmshElementType {
    fn n_nodes(self) -> usize {
        match self {
            GmshElementType::Point => 1,
            GmshElementType::Line => 2,
            GmshElementType::Triangle => 3,
            GmshElementType::Quadrilateral | GmshElementType::Tetrahedron => 4,
            GmshElementType::Pyramid => 5,
            GmshElementType::Prism => 6,
            GmshElementType::Hexahedron => 8,
        }
    }

    /// Volume shape of the element, if it is one.
    fn cell_type(self) -> Option<CellType> {
        match self {
            GmshElementType::Triangle => Some(CellType::Triangle),
            GmshElementType::Quadrilateral => Some(CellType::Quadrilateral),
            GmshElementType::Tetrahedron => Some(CellType::Tetrahedron),
            GmshElementType::Hexahedron => Some(CellType::Hexahedron),
            GmshElementType::Prism => Some(CellType::Prism),
            GmshElementType::Pyramid => Some(CellType::Pyramid),
            GmshElementType::Line | GmshElementType::Point => None,
        }
    }

    /// Topological dimension of the element.
    fn dim(self) -> usize {
        match self {
            GmshElementType::Point => 0,
            GmshElementType::Line => 1,
            GmshElementType::Triangle | GmshElementType::Quadrilateral => 2,
            _ => 3,
        }
    }

    fn from_cell_type(shape: CellType) -> Self {
        match shape {
            CellType::Triangle => GmshElementType::Triangle,
            CellType::Quadrilateral => GmshElementType::Quadrilateral,
            CellType::Tetrahedron => GmshElementType::Tetrahedron,
            CellType::Hexahedron => GmshElementType::Hexahedron,
            CellType::Prism => GmshElementType::Prism,
            CellType::Pyramid => GmshElementType::Pyramid,
        }
    }
}

impl TryFrom<i32> for GmshElementType {
    type Error = GmshError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(GmshElementType::Line),
            2 => Ok(GmshElementType::Triangle),
            3 => Ok(GmshElementType::Quadrilateral),
            4 => Ok(GmshElementType::Tetrahedron),
            5 => Ok(GmshElementType::Hexahedron),
            6 => Ok(GmshElementType::Prism),
            7 => Ok(GmshElementType::Pyramid),
            15 => Ok(GmshElementType::Point),
            _ => Err(GmshError::UnsupportedElement(value)),
        }
    }
}

/// One parsed element: type, physical group, node ids as written.
struct GmshElement {
    kind: GmshElementType,
    physical: u32,
    nodes: Vec<usize>,
}

/// Read a Gmsh MSH file (format 2.2) into a mesh block of dimension `ndim`.
///
/// Elements of dimension `ndim` become cells; elements of dimension
/// `ndim - 1` tag the boundary faces they cover. Boundary faces without a
/// tagging element default to [`BoundaryTag::Wall`].
pub fn read_gmsh_block(path: &Path, ndim: usize) -> Result<MeshBlock, GmshError> {
    let file = File::open(path)?;
    parse_gmsh_block(BufReader::new(file), ndim)
}

/// Parse MSH 2.2 content from any buffered reader.
pub fn parse_gmsh_block<R: BufRead>(reader: R, ndim: usize) -> Result<MeshBlock, GmshError> {
    let mut lines = reader.lines();
    let mut nodes: Vec<[f64; 3]> = Vec::new();
    let mut node_ids: HashMap<usize, usize> = HashMap::new();
    let mut elements: Vec<GmshElement> = Vec::new();

    while let Some(header) = lines.next() {
        match header?.trim() {
            "$MeshFormat" => parse_mesh_format(&mut lines)?,
            "$Nodes" => (nodes, node_ids) = parse_nodes(&mut lines)?,
            "$Elements" => elements = parse_elements(&mut lines)?,
            _ => {}
        }
    }

    if nodes.is_empty() {
        return Err(GmshError::MissingSection("Nodes".to_string()));
    }

    let mut builder = MeshBlockBuilder::new(ndim).with_nodes(nodes);
    for element in &elements {
        let mapped = element
            .nodes
            .iter()
            .map(|id| {
                node_ids
                    .get(id)
                    .copied()
                    .ok_or_else(|| GmshError::Malformed(format!("Unknown node id: {}", id)))
            })
            .collect::<Result<Vec<usize>, GmshError>>()?;

        let dim = element.kind.dim();
        if dim == ndim {
            if let Some(shape) = element.kind.cell_type() {
                builder.add_cell(shape, &mapped);
            }
        } else if dim + 1 == ndim {
            builder.tag_boundary(&mapped, BoundaryTag::from_physical(element.physical));
        }
    }

    if builder.n_cells() == 0 {
        return Err(GmshError::MissingSection(format!(
            "Elements ({}-D cells)",
            ndim
        )));
    }

    let block = builder.build()?;
    log::debug!(
        "read Gmsh mesh: {} nodes, {} cells, {} boundary faces",
        block.nodes.len(),
        block.n_cells,
        block.n_ghost_cells
    );
    Ok(block)
}

/// Accept `2.x 0 <size>`, reject newer or binary files.
fn parse_mesh_format<I>(lines: &mut I) -> Result<(), GmshError>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    if let Some(line) = lines.next() {
        let line = line?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(&version) = parts.first() else {
            return Err(GmshError::Malformed("empty $MeshFormat line".to_string()));
        };
        if !version.starts_with("2.") {
            return Err(GmshError::UnsupportedVersion(version.to_string()));
        }
        if parts.get(1).is_some_and(|&ft| ft != "0") {
            return Err(GmshError::UnsupportedVersion(format!(
                "{} (binary)",
                version
            )));
        }

        skip_past(lines, "$EndMeshFormat")?;
    }
    Ok(())
}

/// Parse the $Nodes section.
///
/// Returns coordinates and the map from Gmsh node id to 0-based index.
fn parse_nodes<I>(lines: &mut I) -> Result<(Vec<[f64; 3]>, HashMap<usize, usize>), GmshError>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    let n_nodes = read_count(lines, "node")?;

    let mut coords = Vec::with_capacity(n_nodes);
    let mut ids = HashMap::with_capacity(n_nodes);

    for _ in 0..n_nodes {
        let line = match lines.next() {
            Some(line_result) => line_result?,
            None => return Err(GmshError::Malformed("Truncated node list".to_string())),
        };
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(GmshError::Malformed(format!(
                "Invalid node line: {}",
                line
            )));
        }

        // Format: node_id x y z
        let id: usize = parse_field(parts[0], "node id")?;
        let x: f64 = parse_field(parts[1], "x coordinate")?;
        let y: f64 = parse_field(parts[2], "y coordinate")?;
        let z: f64 = parse_field(parts[3], "z coordinate")?;

        ids.insert(id, coords.len());
        coords.push([x, y, z]);
    }

    skip_past(lines, "$EndNodes")?;

    Ok((coords, ids))
}

/// Parse the $Elements section. Node ids are returned as written.
fn parse_elements<I>(lines: &mut I) -> Result<Vec<GmshElement>, GmshError>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    let n_elements = read_count(lines, "element")?;
    let mut elements = Vec::with_capacity(n_elements);

    for _ in 0..n_elements {
        let line = match lines.next() {
            Some(line_result) => line_result?,
            None => return Err(GmshError::Malformed("Truncated element list".to_string())),
        };
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 3 {
            return Err(GmshError::Malformed(format!(
                "Invalid element line: {}",
                line
            )));
        }

        // Format: elem_id elem_type n_tags tag1 ... tagN node1 node2 ...
        let elem_type: i32 = parse_field(parts[1], "element type")?;
        let n_tags: usize = parse_field(parts[2], "tag count")?;

        // Physical group (first tag) selects the boundary tag
        let physical = if n_tags > 0 && parts.len() > 3 {
            parse_field::<u32>(parts[3], "physical tag")?
        } else {
            0
        };

        let kind = match GmshElementType::try_from(elem_type) {
            Ok(kind) => kind,
            Err(e) => {
                log::warn!("skipping Gmsh element: {}", e);
                continue;
            }
        };

        let node_start = 3 + n_tags;
        if parts.len() < node_start + kind.n_nodes() {
            return Err(GmshError::Malformed(format!(
                "{:?} needs {} nodes: {}",
                kind,
                kind.n_nodes(),
                line
            )));
        }
        let nodes = parts[node_start..node_start + kind.n_nodes()]
            .iter()
            .map(|p| parse_field::<usize>(p, "node id"))
            .collect::<Result<Vec<_>, _>>()?;

        elements.push(GmshElement {
            kind,
            physical,
            nodes,
        });
    }

    skip_past(lines, "$EndElements")?;

    Ok(elements)
}

/// Consume lines up to and including `marker`.
fn skip_past<I>(lines: &mut I, marker: &str) -> Result<(), GmshError>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    for line in lines.by_ref() {
        if line?.trim().starts_with(marker) {
            break;
        }
    }
    Ok(())
}

fn read_count<I>(lines: &mut I, what: &str) -> Result<usize, GmshError>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    match lines.next() {
        Some(line_result) => line_result?
            .trim()
            .parse::<usize>()
            .map_err(|_| GmshError::Malformed(format!("Invalid {} count", what))),
        None => Err(GmshError::Malformed(format!("Missing {} count", what))),
    }
}

fn parse_field<T: std::str::FromStr>(text: &str, what: &str) -> Result<T, GmshError> {
    text.parse()
        .map_err(|_| GmshError::Malformed(format!("Invalid {}: {}", what, text)))
}

/// Write a mesh block to Gmsh MSH format 2.2.
///
/// Boundary faces are written first with their tag as physical group,
/// followed by the cells.
pub fn write_gmsh_block(block: &MeshBlock, path: &Path) -> Result<(), GmshError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    // Write header
    writeln!(writer, "$MeshFormat")?;
    writeln!(writer, "2.2 0 8")?;
    writeln!(writer, "$EndMeshFormat")?;

    // Write nodes
    writeln!(writer, "$Nodes")?;
    writeln!(writer, "{}", block.nodes.len())?;
    for (i, p) in block.nodes.iter().enumerate() {
        writeln!(writer, "{} {} {} {}", i + 1, p[0], p[1], p[2])?;
    }
    writeln!(writer, "$EndNodes")?;

    let n_total = block.boundary_faces.len() + block.n_cells;
    writeln!(writer, "$Elements")?;
    writeln!(writer, "{}", n_total)?;

    let mut elem_id = 1;
    for bf in &block.boundary_faces {
        let fnodes = &block.face_nodes[bf.face];
        let elem_type = match (block.ndim, fnodes.len()) {
            (2, _) => GmshElementType::Line,
            (_, 3) => GmshElementType::Triangle,
            _ => GmshElementType::Quadrilateral,
        };
        let physical = bf.tag.to_physical();
        // Format: elem_id type n_tags physical_tag geometrical_tag nodes...
        write!(writer, "{} {} 2 {} {}", elem_id, elem_type as i32, physical, physical)?;
        for &n in fnodes {
            write!(writer, " {}", n + 1)?;
        }
        writeln!(writer)?;
        elem_id += 1;
    }

    for (shape, cnodes) in block.cell_types.iter().zip(&block.cell_nodes) {
        let elem_type = GmshElementType::from_cell_type(*shape);
        write!(writer, "{} {} 2 0 0", elem_id, elem_type as i32)?;
        for &n in cnodes {
            write!(writer, " {}", n + 1)?;
        }
        writeln!(writer)?;
        elem_id += 1;
    }

    writeln!(writer, "$EndElements")?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as IoWrite;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_simple_mesh() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"$MeshFormat
2.2 0 8
$EndMeshFormat
$Nodes
4
1 0.0 0.0 0.0
2 1.0 0.0 0.0
3 1.0 1.0 0.0
4 0.0 1.0 0.0
$EndNodes
$Elements
1
1 3 2 0 0 1 2 3 4
$EndElements"#
        )
        .unwrap();

        let block = read_gmsh_block(file.path(), 2).unwrap();
        assert_eq!(block.nodes.len(), 4);
        assert_eq!(block.n_cells, 1);
        assert_eq!(block.n_faces(), 4);
        assert_eq!(block.n_ghost_cells, 4);
        assert_eq!(block.cell_types[0], CellType::Quadrilateral);
    }

    #[test]
    fn test_read_mesh_with_boundary() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"$MeshFormat
2.2 0 8
$EndMeshFormat
$Nodes
4
1 0.0 0.0 0.0
2 1.0 0.0 0.0
3 1.0 1.0 0.0
4 0.0 1.0 0.0
$EndNodes
$Elements
7
1 1 2 1 1 1 2
2 1 2 2 2 2 3
3 1 2 1 1 3 4
4 1 2 2 2 4 1
5 15 2 0 0 1
6 2 2 0 0 1 2 3
7 2 2 0 0 1 3 4
$EndElements"#
        )
        .unwrap();

        let block = read_gmsh_block(file.path(), 2).unwrap();
        assert_eq!(block.n_cells, 2);
        assert!(block.is_simplicial());
        assert_eq!(block.n_ghost_cells, 4);
        assert_eq!(block.boundary_faces_tagged(BoundaryTag::Wall).count(), 2);
        assert_eq!(block.boundary_faces_tagged(BoundaryTag::Open).count(), 2);
    }

    #[test]
    fn test_read_tetrahedron() {
        let content = r#"$MeshFormat
2.2 0 8
$EndMeshFormat
$Nodes
4
10 0 0 0
20 1 0 0
30 0 1 0
40 0 0 1
$EndNodes
$Elements
2
1 2 2 7 7 10 20 30
2 4 2 0 0 10 20 30 40
$EndElements
"#;
        let block = parse_gmsh_block(content.as_bytes(), 3).unwrap();
        assert_eq!(block.n_cells, 1);
        assert_eq!(block.n_ghost_cells, 4);
        assert_eq!(
            block.boundary_faces_tagged(BoundaryTag::Custom(7)).count(),
            1
        );
        assert_eq!(block.boundary_faces_tagged(BoundaryTag::Wall).count(), 3);
    }

    #[test]
    fn test_roundtrip() {
        let mut block =
            MeshBlockBuilder::rectangle_mixed(0.0, 1.0, 0.0, 1.0, 3, 2).unwrap();
        block.retag_boundary(|c| {
            if c[0] < 1e-12 {
                BoundaryTag::Open
            } else {
                BoundaryTag::Wall
            }
        });

        let file = NamedTempFile::new().unwrap();
        write_gmsh_block(&block, file.path()).unwrap();
        let block2 = read_gmsh_block(file.path(), 2).unwrap();

        assert_eq!(block.nodes.len(), block2.nodes.len());
        assert_eq!(block.n_cells, block2.n_cells);
        assert_eq!(block.n_faces(), block2.n_faces());
        assert_eq!(block.cell_types, block2.cell_types);
        assert_eq!(block2.boundary_faces_tagged(BoundaryTag::Open).count(), 2);
    }

    #[test]
    fn test_roundtrip_hexahedra() {
        let block =
            MeshBlockBuilder::box_hexahedra([0.0; 3], [1.0; 3], 2, 1, 1).unwrap();
        let file = NamedTempFile::new().unwrap();
        write_gmsh_block(&block, file.path()).unwrap();
        let block2 = read_gmsh_block(file.path(), 3).unwrap();
        assert_eq!(block2.n_cells, 2);
        assert_eq!(block2.n_ghost_cells, block.n_ghost_cells);
    }

    #[test]
    fn test_error_missing_nodes() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"$MeshFormat
2.2 0 8
$EndMeshFormat
$Elements
1
1 3 2 0 0 1 2 3 4
$EndElements"#
        )
        .unwrap();

        let result = read_gmsh_block(file.path(), 2);
        assert!(matches!(result, Err(GmshError::MissingSection(_))));
    }

    #[test]
    fn test_error_unsupported_version() {
        let content = "$MeshFormat\n4.1 0 8\n$EndMeshFormat\n";
        let result = parse_gmsh_block(content.as_bytes(), 2);
        assert!(matches!(result, Err(GmshError::UnsupportedVersion(_))));
    }

    #[test]
    fn test_error_unknown_node() {
        let content = r#"$Nodes
3
1 0 0 0
2 1 0 0
3 0 1 0
$EndNodes
$Elements
1
1 2 2 0 0 1 2 9
$EndElements
"#;
        let result = parse_gmsh_block(content.as_bytes(), 2);
        assert!(matches!(result, Err(GmshError::Malformed(_))));
    }
}
