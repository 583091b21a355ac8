//! Reference cell topologies and their subcell structure.
//!
//! Vertex, edge and face numbering follows the conventions of the `shards` cell topologies.
use crate::Real;
use nalgebra::{convert, DVector, Vector3};
use serde::{Deserialize, Serialize};

/// A reference cell.
///
/// - `Line`: the interval `[-1, 1]`.
/// - `Triangle`: the unit triangle with vertices `(0, 0)`, `(1, 0)`, `(0, 1)`.
/// - `Tetrahedron`: the unit tetrahedron with vertices `(0, 0, 0)`, `(1, 0, 0)`, `(0, 1, 0)`,
///   `(0, 0, 1)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellTopology {
    Line,
    Triangle,
    Tetrahedron,
}

const LINE_VERTICES: [[f64; 1]; 2] = [[-1.0], [1.0]];
const TRIANGLE_VERTICES: [[f64; 2]; 3] = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
const TETRAHEDRON_VERTICES: [[f64; 3]; 4] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

const VERTEX_ORDINALS: [usize; 4] = [0, 1, 2, 3];
const TRIANGLE_EDGES: [[usize; 2]; 3] = [[0, 1], [1, 2], [2, 0]];
const TETRAHEDRON_EDGES: [[usize; 2]; 6] = [[0, 1], [1, 2], [2, 0], [0, 3], [1, 3], [2, 3]];
const TETRAHEDRON_FACES: [[usize; 3]; 4] = [[0, 1, 3], [1, 2, 3], [0, 3, 2], [0, 2, 1]];

impl CellTopology {
    /// The topology of the reference cell of the given dimension.
    pub fn from_dimension(dim: usize) -> Option<Self> {
        match dim {
            1 => Some(Self::Line),
            2 => Some(Self::Triangle),
            3 => Some(Self::Tetrahedron),
            _ => None,
        }
    }

    pub fn dimension(&self) -> usize {
        match self {
            Self::Line => 1,
            Self::Triangle => 2,
            Self::Tetrahedron => 3,
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.dimension() + 1
    }

    pub fn num_edges(&self) -> usize {
        self.num_subcells(1)
    }

    pub fn num_faces(&self) -> usize {
        self.num_subcells(2)
    }

    /// Number of subcells of the given dimension.
    ///
    /// The cell itself counts as its single subcell of its own dimension.
    pub fn num_subcells(&self, subcell_dim: usize) -> usize {
        match (self, subcell_dim) {
            (_, 0) => self.num_vertices(),
            (Self::Line, 1) => 1,
            (Self::Triangle, 1) => TRIANGLE_EDGES.len(),
            (Self::Triangle, 2) => 1,
            (Self::Tetrahedron, 1) => TETRAHEDRON_EDGES.len(),
            (Self::Tetrahedron, 2) => TETRAHEDRON_FACES.len(),
            (Self::Tetrahedron, 3) => 1,
            _ => 0,
        }
    }

    /// Reference coordinates of the given vertex.
    ///
    /// # Panics
    ///
    /// Panics if the vertex index is out of bounds.
    pub fn vertex(&self, index: usize) -> &'static [f64] {
        match self {
            Self::Line => &LINE_VERTICES[index],
            Self::Triangle => &TRIANGLE_VERTICES[index],
            Self::Tetrahedron => &TETRAHEDRON_VERTICES[index],
        }
    }

    /// Reference coordinates of the given vertex as a vector.
    pub fn vertex_vector<T: Real>(&self, index: usize) -> DVector<T> {
        DVector::from_iterator(self.dimension(), self.vertex(index).iter().map(|&x| convert(x)))
    }

    /// The cell vertices that span the given subcell, in subcell-local order.
    ///
    /// # Panics
    ///
    /// Panics if the subcell does not exist.
    pub fn subcell_vertices(&self, subcell_dim: usize, subcell_ordinal: usize) -> &'static [usize] {
        assert!(
            subcell_ordinal < self.num_subcells(subcell_dim),
            "subcell ({subcell_dim}, {subcell_ordinal}) does not exist on {self:?}"
        );
        match (self, subcell_dim) {
            (_, 0) => &VERTEX_ORDINALS[subcell_ordinal..=subcell_ordinal],
            (Self::Triangle, 1) => &TRIANGLE_EDGES[subcell_ordinal],
            (Self::Tetrahedron, 1) => &TETRAHEDRON_EDGES[subcell_ordinal],
            (Self::Tetrahedron, 2) => &TETRAHEDRON_FACES[subcell_ordinal],
            // The cell itself
            _ => &VERTEX_ORDINALS[..self.num_vertices()],
        }
    }

    /// Tangent `v1 - v0` of the given edge.
    pub fn edge_tangent<T: Real>(&self, edge: usize) -> DVector<T> {
        let vertices = self.subcell_vertices(1, edge);
        self.vertex_vector::<T>(vertices[1]) - self.vertex_vector::<T>(vertices[0])
    }

    /// Tangents `v1 - v0` and `v2 - v0` of the given face.
    pub fn face_tangents<T: Real>(&self, face: usize) -> (DVector<T>, DVector<T>) {
        let vertices = self.subcell_vertices(2, face);
        let v0 = self.vertex_vector::<T>(vertices[0]);
        let t1 = self.vertex_vector::<T>(vertices[1]) - &v0;
        let t2 = self.vertex_vector::<T>(vertices[2]) - &v0;
        (t1, t2)
    }

    /// Face normal `t1 x t2` of a face of a three-dimensional cell.
    ///
    /// The normal points out of the cell and its length is twice the face area.
    ///
    /// # Panics
    ///
    /// Panics if the cell is not three-dimensional.
    pub fn face_normal<T: Real>(&self, face: usize) -> DVector<T> {
        assert_eq!(self.dimension(), 3, "face normals require a three-dimensional cell");
        let (t1, t2) = self.face_tangents::<T>(face);
        let t1 = Vector3::new(t1[0], t1[1], t1[2]);
        let t2 = Vector3::new(t2[0], t2[1], t2[2]);
        DVector::from_column_slice(t1.cross(&t2).as_slice())
    }

    /// Maps a point given in the reference coordinates of a subcell into this cell.
    ///
    /// Edges are parametrized by the reference line `[-1, 1]` and faces by the unit triangle.
    /// Vertices ignore the parameter, and the cell itself maps with the identity.
    ///
    /// # Panics
    ///
    /// Panics if the subcell does not exist or the parameter has the wrong dimension.
    pub fn map_from_subcell<T: Real>(&self, subcell_dim: usize, subcell_ordinal: usize, param: &[T]) -> DVector<T> {
        let vertices = self.subcell_vertices(subcell_dim, subcell_ordinal);
        if subcell_dim == self.dimension() {
            assert_eq!(param.len(), subcell_dim);
            return DVector::from_column_slice(param);
        }
        let v0 = self.vertex_vector::<T>(vertices[0]);
        match subcell_dim {
            0 => v0,
            1 => {
                assert_eq!(param.len(), 1);
                let s = (param[0] + T::one()) / convert::<f64, T>(2.0);
                let v1 = self.vertex_vector::<T>(vertices[1]);
                &v0 + (v1 - &v0) * s
            }
            _ => {
                assert_eq!(param.len(), 2);
                let (t1, t2) = self.face_tangents::<T>(subcell_ordinal);
                v0 + t1 * param[0] + t2 * param[1]
            }
        }
    }
}
