use fenris_basis::{CellTopology, HCurlTetIn, HDivTetIn, HGradCn, HGradTetC2, ReferenceBasis};

fn check_tag_layout(basis: &dyn ReferenceBasis<f64>) {
    let tags = basis.dof_tags();
    assert_eq!(tags.len(), basis.cardinality());

    // Vertex dofs come first, then edges, faces and the interior
    assert!(tags
        .all()
        .windows(2)
        .all(|pair| pair[0].subcell_dim <= pair[1].subcell_dim));

    for (ordinal, tag) in tags.all().iter().enumerate() {
        assert_eq!(tags.ordinal(tag.subcell_dim, tag.subcell_ordinal, tag.local_index), Some(ordinal));
        assert_eq!(tags.tag(ordinal), Some(tag));
        assert!(tag.local_index < tag.subcell_dof_count);
        assert_eq!(
            tags.num_dofs_on_subcell(tag.subcell_dim, tag.subcell_ordinal),
            tag.subcell_dof_count
        );
    }
    assert_eq!(tags.tag(tags.len()), None);
}

#[test]
fn dof_tags_are_ordered_by_subcell_dimension_and_invertible() {
    let mut bases: Vec<Box<dyn ReferenceBasis<f64>>> = vec![Box::new(HGradTetC2::<f64>::new())];
    for order in 1..=4 {
        bases.push(Box::new(HCurlTetIn::<f64>::new(order).unwrap()));
        bases.push(Box::new(HDivTetIn::<f64>::new(order).unwrap()));
        for topology in [CellTopology::Line, CellTopology::Triangle, CellTopology::Tetrahedron] {
            bases.push(Box::new(HGradCn::<f64>::new(topology, order).unwrap()));
        }
    }
    for basis in &bases {
        check_tag_layout(basis.as_ref());
    }
}

#[test]
fn hcurl_dofs_live_on_edges_faces_and_interior() {
    let basis = HCurlTetIn::<f64>::new(3).unwrap();
    let tags = basis.dof_tags();
    assert!(tags.all().iter().all(|tag| tag.subcell_dim >= 1));
    for edge in 0..6 {
        assert_eq!(tags.num_dofs_on_subcell(1, edge), 3);
    }
    for face in 0..4 {
        assert_eq!(tags.num_dofs_on_subcell(2, face), 6);
    }
    assert_eq!(tags.num_dofs_on_subcell(3, 0), 3);
}

#[test]
fn hdiv_dofs_live_on_faces_and_interior() {
    let basis = HDivTetIn::<f64>::new(2).unwrap();
    let tags = basis.dof_tags();
    assert!(tags.all().iter().all(|tag| tag.subcell_dim >= 2));
    for face in 0..4 {
        assert_eq!(tags.num_dofs_on_subcell(2, face), 3);
    }
    assert_eq!(tags.num_dofs_on_subcell(3, 0), 3);
}
