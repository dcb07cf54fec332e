//! Element contract: how a balance element writes its rows.

use ahu_core::{ElementId, NodeId};
use ahu_network::{ElementNodes, UnknownLayout};
use ahu_psychro::PsyState;
use nalgebra::{DMatrix, DVector};

use crate::error::{ElementError, ElementResult};
use crate::params::OperatingParameters;

/// Read-only inputs shared by every element during one assembly.
#[derive(Clone, Copy)]
pub struct StampContext<'a> {
    pub params: &'a OperatingParameters,
    /// Temperature around which the saturation curve is linearized, °C.
    pub linearization_temperature: f64,
    /// Outdoor state resolved from the parameters.
    pub outdoor: PsyState,
    pub layout: &'a UnknownLayout,
}

/// The block of rows owned by one element inside the assembled system.
///
/// Coefficients of free node variables go into the matrix; terms of boundary
/// nodes move to the right-hand side with their known values.
pub struct RowBlock<'a> {
    matrix: &'a mut DMatrix<f64>,
    rhs: &'a mut DVector<f64>,
    first: usize,
    count: usize,
    layout: &'a UnknownLayout,
    known: &'a [Option<PsyState>],
}

impl<'a> RowBlock<'a> {
    /// `known` holds the resolved state of every boundary node, by node slot.
    pub fn new(
        matrix: &'a mut DMatrix<f64>,
        rhs: &'a mut DVector<f64>,
        first: usize,
        count: usize,
        layout: &'a UnknownLayout,
        known: &'a [Option<PsyState>],
    ) -> Self {
        Self {
            matrix,
            rhs,
            first,
            count,
            layout,
            known,
        }
    }

    fn row(&self, row: usize) -> ElementResult<usize> {
        if row < self.count {
            Ok(self.first + row)
        } else {
            Err(ElementError::RowOutOfBlock {
                row,
                count: self.count,
            })
        }
    }

    fn known_state(&self, node: NodeId) -> ElementResult<PsyState> {
        self.known
            .get(node.slot())
            .copied()
            .flatten()
            .ok_or(ElementError::UnresolvedNode { node })
    }

    /// Add `coef·θ(node)` to the left-hand side of `row`.
    pub fn temperature(&mut self, row: usize, node: NodeId, coef: f64) -> ElementResult<()> {
        let r = self.row(row)?;
        match self.layout.temperature_column(node) {
            Some(col) => self.matrix[(r, col)] += coef,
            None => self.rhs[r] -= coef * self.known_state(node)?.temperature,
        }
        Ok(())
    }

    /// Add `coef·w(node)` to the left-hand side of `row`.
    pub fn humidity_ratio(&mut self, row: usize, node: NodeId, coef: f64) -> ElementResult<()> {
        let r = self.row(row)?;
        match self.layout.humidity_column(node) {
            Some(col) => self.matrix[(r, col)] += coef,
            None => self.rhs[r] -= coef * self.known_state(node)?.humidity_ratio,
        }
        Ok(())
    }

    /// Add `coef·Q` for auxiliary unknown `slot` of `element`.
    pub fn aux(
        &mut self,
        row: usize,
        element: ElementId,
        slot: usize,
        coef: f64,
    ) -> ElementResult<()> {
        let r = self.row(row)?;
        let col = self.layout.aux_column(element, slot)?;
        self.matrix[(r, col)] += coef;
        Ok(())
    }

    /// Add `value` to the right-hand side of `row`.
    pub fn constant(&mut self, row: usize, value: f64) -> ElementResult<()> {
        let r = self.row(row)?;
        self.rhs[r] += value;
        Ok(())
    }
}

/// A balance element of the air-treatment network.
///
/// Elements are stateless descriptions: the same element stamps identical
/// rows for identical parameters, so topologies can be shared across
/// threads and solved concurrently.
pub trait BalanceElement: Send + Sync {
    /// Element kind for diagnostics ("heating coil", "mixing box", ...).
    fn name(&self) -> &'static str;

    /// Number of rows the element contributes.
    fn equation_count(&self) -> usize;

    /// Names of the auxiliary unknowns the element introduces.
    fn aux_labels(&self) -> &'static [&'static str] {
        &[]
    }

    /// Check that the element is attached to the right number of nodes.
    fn check_ports(&self, nodes: &ElementNodes) -> ElementResult<()>;

    /// Write the element's rows.
    ///
    /// # Arguments
    /// * `id` - the element's own ID, for its auxiliary columns
    /// * `nodes` - attached nodes grouped by port kind
    /// * `ctx` - parameters and linearization point
    /// * `rows` - the element's block, exactly `equation_count()` rows
    fn stamp(
        &self,
        id: ElementId,
        nodes: &ElementNodes,
        ctx: &StampContext<'_>,
        rows: &mut RowBlock<'_>,
    ) -> ElementResult<()>;

    /// Node constrained to the saturation-curve tangent, if any.
    fn saturated_node(&self, _nodes: &ElementNodes) -> Option<NodeId> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahu_network::{NetworkBuilder, PortKind};

    #[test]
    fn boundary_terms_move_to_rhs() {
        let mut b = NetworkBuilder::new();
        let o = b.add_outdoor_node("outdoor");
        let s = b.add_node("supply");
        b.add_element("HC", &[(o, PortKind::Inlet), (s, PortKind::Outlet)], &["Qs"]);
        let net = b.build().unwrap();

        let known = vec![Some(PsyState::new(-1.0, 0.0035).unwrap()), None];
        let mut a = DMatrix::zeros(3, 3);
        let mut rhs = DVector::zeros(3);
        {
            let mut rows = RowBlock::new(&mut a, &mut rhs, 1, 2, net.layout(), &known);
            rows.temperature(0, s, 2.0).unwrap();
            rows.temperature(0, o, 2.0).unwrap();
            rows.humidity_ratio(1, o, 10.0).unwrap();
            rows.constant(1, 1.0).unwrap();
            assert!(matches!(
                rows.temperature(2, s, 1.0),
                Err(ElementError::RowOutOfBlock { row: 2, count: 2 })
            ));
        }
        assert_eq!(a[(1, 0)], 2.0);
        assert_eq!(rhs[1], 2.0);
        assert!((rhs[2] - (1.0 - 0.035)).abs() < 1e-12);
    }

    #[test]
    fn unresolved_boundary_is_an_error() {
        let mut b = NetworkBuilder::new();
        let o = b.add_outdoor_node("outdoor");
        let s = b.add_node("supply");
        b.add_element("HC", &[(o, PortKind::Inlet), (s, PortKind::Outlet)], &["Qs"]);
        let net = b.build().unwrap();

        let known = vec![None, None];
        let mut a = DMatrix::zeros(3, 3);
        let mut rhs = DVector::zeros(3);
        let mut rows = RowBlock::new(&mut a, &mut rhs, 0, 2, net.layout(), &known);
        assert!(matches!(
            rows.temperature(0, o, 1.0),
            Err(ElementError::UnresolvedNode { .. })
        ));
    }
}
