//! Strategies for reference cells and operators.
use crate::operator::{Operator, MAX_DERIVATIVE_ORDER};
use crate::topology::CellTopology;
use ::proptest::prelude::*;
use nalgebra::DVector;

impl Arbitrary for CellTopology {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        prop_oneof![
            Just(CellTopology::Line),
            Just(CellTopology::Triangle),
            Just(CellTopology::Tetrahedron)
        ]
        .boxed()
    }
}

impl Arbitrary for Operator {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        prop_oneof![
            Just(Operator::Value),
            Just(Operator::Grad),
            Just(Operator::Curl),
            Just(Operator::Div),
            (1..=MAX_DERIVATIVE_ORDER).prop_filter_map("derivative order out of range", Operator::dk),
        ]
        .boxed()
    }
}

/// Points in the interior of the reference cell, at least `margin` away from its boundary.
///
/// The line is `[-1, 1]`, the triangle and tetrahedron are the unit simplices.
pub fn reference_point(topology: CellTopology, margin: f64) -> impl Strategy<Value = DVector<f64>> {
    let dim = topology.dimension();
    prop::collection::vec(0.0..1.0f64, dim + 1).prop_map(move |weights| match topology {
        CellTopology::Line => DVector::from_element(1, (2.0 * weights[0] - 1.0) * (1.0 - margin)),
        _ => {
            // Normalized weights are barycentric coordinates, shrunk towards the centroid
            let total: f64 = weights.iter().sum::<f64>() + f64::EPSILON;
            let centroid = 1.0 / (dim as f64 + 1.0);
            let shrink = 1.0 - margin * (dim as f64 + 1.0);
            DVector::from_iterator(
                dim,
                weights[1..]
                    .iter()
                    .map(|w| centroid + shrink * (w / total - centroid)),
            )
        }
    })
}

/// A reference cell together with a point in its interior.
pub fn topology_and_point(margin: f64) -> impl Strategy<Value = (CellTopology, DVector<f64>)> {
    any::<CellTopology>().prop_flat_map(move |topology| (Just(topology), reference_point(topology, margin)))
}
