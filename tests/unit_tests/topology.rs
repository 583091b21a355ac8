use fenris_basis::CellTopology;
use nalgebra::{DVector, Vector3};
use util::assert_approx_matrix_eq;

#[test]
fn subcell_counts() {
    let line = CellTopology::Line;
    assert_eq!([line.num_subcells(0), line.num_subcells(1)], [2, 1]);
    let triangle = CellTopology::Triangle;
    assert_eq!((0..=2).map(|d| triangle.num_subcells(d)).collect::<Vec<_>>(), vec![3, 3, 1]);
    let tet = CellTopology::Tetrahedron;
    assert_eq!((0..=3).map(|d| tet.num_subcells(d)).collect::<Vec<_>>(), vec![4, 6, 4, 1]);
    assert_eq!(tet.num_subcells(4), 0);
    assert_eq!(CellTopology::from_dimension(3), Some(tet));
    assert_eq!(CellTopology::from_dimension(0), None);
}

#[test]
fn tetrahedron_edges_and_faces_follow_shards_numbering() {
    let tet = CellTopology::Tetrahedron;
    let edges: Vec<_> = (0..6).map(|e| tet.subcell_vertices(1, e).to_vec()).collect();
    assert_eq!(edges, vec![vec![0, 1], vec![1, 2], vec![2, 0], vec![0, 3], vec![1, 3], vec![2, 3]]);
    let faces: Vec<_> = (0..4).map(|f| tet.subcell_vertices(2, f).to_vec()).collect();
    assert_eq!(faces, vec![vec![0, 1, 3], vec![1, 2, 3], vec![0, 3, 2], vec![0, 2, 1]]);
}

#[test]
fn edge_tangents_join_edge_vertices() {
    let tet = CellTopology::Tetrahedron;
    assert_eq!(tet.edge_tangent::<f64>(1), DVector::from_column_slice(&[-1.0, 1.0, 0.0]));
    assert_eq!(tet.edge_tangent::<f64>(5), DVector::from_column_slice(&[0.0, -1.0, 1.0]));
    let triangle = CellTopology::Triangle;
    assert_eq!(triangle.edge_tangent::<f64>(2), DVector::from_column_slice(&[0.0, -1.0]));
}

#[test]
fn face_normals_point_outwards() {
    let tet = CellTopology::Tetrahedron;
    let centroid = Vector3::repeat(0.25);
    for face in 0..4 {
        let normal = tet.face_normal::<f64>(face);
        let vertices = tet.subcell_vertices(2, face);
        let face_centroid = vertices
            .iter()
            .map(|&v| tet.vertex_vector::<f64>(v))
            .fold(DVector::zeros(3), |acc, v| acc + v)
            / 3.0;
        let outward: f64 = (0..3).map(|i| normal[i] * (face_centroid[i] - centroid[i])).sum();
        assert!(outward > 0.0);
    }
    // The slanted face has a normal of length twice its area
    let normal = tet.face_normal::<f64>(1);
    assert_eq!(normal, DVector::from_column_slice(&[1.0, 1.0, 1.0]));
}

#[test]
fn map_from_subcell() {
    let tet = CellTopology::Tetrahedron;
    let start = tet.map_from_subcell(1, 4, &[-1.0]);
    let end = tet.map_from_subcell(1, 4, &[1.0]);
    assert_eq!(start, tet.vertex_vector::<f64>(1));
    assert_eq!(end, tet.vertex_vector::<f64>(3));

    let mapped = tet.map_from_subcell(2, 2, &[0.5, 0.25]);
    // Face 2 spans vertices 0, 3, 2
    let expected = DVector::from_column_slice(&[0.0, 0.25, 0.5]);
    assert_approx_matrix_eq!(&mapped, &expected, abstol = 1e-15);

    assert_eq!(tet.map_from_subcell::<f64>(0, 2, &[]), tet.vertex_vector::<f64>(2));
    let interior = [0.1, 0.2, 0.3];
    assert_eq!(tet.map_from_subcell(3, 0, &interior), DVector::from_column_slice(&interior));
}
