//! Finite-difference update rules.
//!
//! Every free cell is relaxed towards the weighted average of its four
//! adjacent neighbours. Neumann neighbours carry no potential of their
//! own; they are handled by image reflection, which folds into one of
//! thirteen coefficient patterns selected once at lattice build time.

/// Update rule of one cell, chosen from the Neumann pattern of its
/// adjacent and diagonal neighbours.
///
/// Names refer to where the Neumann condition sits relative to the
/// cell: `SideNorth` has its northern neighbour on the mirror,
/// `CornerNorthEast` the northern and eastern ones, and
/// `InvCornerNorthEast` only the north-eastern diagonal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Stencil {
    #[default]
    Middle,
    SideSouth,
    SideNorth,
    SideWest,
    SideEast,
    CornerSouthEast,
    CornerNorthEast,
    CornerNorthWest,
    CornerSouthWest,
    InvCornerSouthEast,
    InvCornerNorthEast,
    InvCornerNorthWest,
    InvCornerSouthWest,
}

impl Stencil {
    pub const COUNT: usize = 13;

    /// Selects the stencil for a cell whose adjacent neighbours
    /// (south, north, west, east) and diagonal neighbours (south-east,
    /// north-east, north-west, south-west) are Neumann where the flag
    /// is set.
    ///
    /// Unsupported combinations fall back to the bulk average.
    pub fn select(adjacent: [bool; 4], diagonal: [bool; 4]) -> Self {
        let [south, north, west, east] = adjacent;
        let [south_east, north_east, north_west, south_west] = diagonal;

        match (south, north, west, east) {
            (false, false, false, false) => {
                match (south_east, north_east, north_west, south_west) {
                    (true, false, false, false) => Stencil::InvCornerSouthEast,
                    (false, true, false, false) => Stencil::InvCornerNorthEast,
                    (false, false, true, false) => Stencil::InvCornerNorthWest,
                    (false, false, false, true) => Stencil::InvCornerSouthWest,
                    _ => Stencil::Middle,
                }
            }
            (true, false, false, false) => Stencil::SideSouth,
            (false, true, false, false) => Stencil::SideNorth,
            (false, false, true, false) => Stencil::SideWest,
            (false, false, false, true) => Stencil::SideEast,
            (true, false, false, true) => Stencil::CornerSouthEast,
            (false, true, false, true) => Stencil::CornerNorthEast,
            (false, true, true, false) => Stencil::CornerNorthWest,
            (true, false, true, false) => Stencil::CornerSouthWest,
            _ => Stencil::Middle,
        }
    }

    /// Applies the update rule to the neighbour potentials and weights,
    /// both in (south, north, west, east) order.
    #[inline]
    pub fn apply(self, v: &[f64; 4], w: &[f64; 4]) -> f64 {
        let [vs, vn, vw, ve] = *v;
        let [ws, wn, ww, we] = *w;

        match self {
            Stencil::Middle => {
                (vs * ws + vn * wn + vw * ww + ve * we) / (ws + wn + ww + we)
            }
            // one adjacent neighbour mirrored: its opposite counts twice
            Stencil::SideSouth => (2.0 * vn * wn + vw * ww + ve * we) / (2.0 * wn + ww + we),
            Stencil::SideNorth => (2.0 * vs * ws + vw * ww + ve * we) / (2.0 * ws + ww + we),
            Stencil::SideWest => (vs * ws + vn * wn + 2.0 * ve * we) / (ws + wn + 2.0 * we),
            Stencil::SideEast => (vs * ws + vn * wn + 2.0 * vw * ww) / (ws + wn + 2.0 * ww),
            // two adjacent neighbours mirrored: the remaining pair averages
            Stencil::CornerSouthEast => (vn * wn + vw * ww) / (wn + ww),
            Stencil::CornerNorthEast => (vs * ws + vw * ww) / (ws + ww),
            Stencil::CornerNorthWest => (vs * ws + ve * we) / (ws + we),
            Stencil::CornerSouthWest => (vn * wn + ve * we) / (wn + we),
            // a single mirrored diagonal: the two adjacent neighbours
            // facing away from it count twice
            Stencil::InvCornerSouthEast => {
                (vs * ws + 2.0 * vn * wn + 2.0 * vw * ww + ve * we)
                    / (ws + 2.0 * wn + 2.0 * ww + we)
            }
            Stencil::InvCornerNorthEast => {
                (2.0 * vs * ws + vn * wn + 2.0 * vw * ww + ve * we)
                    / (2.0 * ws + wn + 2.0 * ww + we)
            }
            Stencil::InvCornerNorthWest => {
                (2.0 * vs * ws + vn * wn + vw * ww + 2.0 * ve * we)
                    / (2.0 * ws + wn + ww + 2.0 * we)
            }
            Stencil::InvCornerSouthWest => {
                (vs * ws + 2.0 * vn * wn + vw * ww + 2.0 * ve * we)
                    / (ws + 2.0 * wn + ww + 2.0 * we)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::stencil::Stencil;

    const FREE: [bool; 4] = [false; 4];

    #[test]
    fn it_selects_all_thirteen_classes() {
        let cases = [
            (FREE, FREE, Stencil::Middle),
            ([true, false, false, false], FREE, Stencil::SideSouth),
            ([false, true, false, false], FREE, Stencil::SideNorth),
            ([false, false, true, false], FREE, Stencil::SideWest),
            ([false, false, false, true], FREE, Stencil::SideEast),
            ([true, false, false, true], FREE, Stencil::CornerSouthEast),
            ([false, true, false, true], FREE, Stencil::CornerNorthEast),
            ([false, true, true, false], FREE, Stencil::CornerNorthWest),
            ([true, false, true, false], FREE, Stencil::CornerSouthWest),
            (FREE, [true, false, false, false], Stencil::InvCornerSouthEast),
            (FREE, [false, true, false, false], Stencil::InvCornerNorthEast),
            (FREE, [false, false, true, false], Stencil::InvCornerNorthWest),
            (FREE, [false, false, false, true], Stencil::InvCornerSouthWest),
        ];

        let mut seen = std::collections::HashSet::new();
        for (adjacent, diagonal, expected) in cases {
            assert_eq!(Stencil::select(adjacent, diagonal), expected);
            seen.insert(expected);
        }
        assert_eq!(seen.len(), Stencil::COUNT);
    }

    #[test]
    fn it_falls_back_to_the_bulk_average() {
        // opposite sides mirrored
        assert_eq!(
            Stencil::select([true, true, false, false], FREE),
            Stencil::Middle
        );
        // three mirrored neighbours
        assert_eq!(
            Stencil::select([true, true, true, false], FREE),
            Stencil::Middle
        );
        // two mirrored diagonals
        assert_eq!(
            Stencil::select(FREE, [true, true, false, false]),
            Stencil::Middle
        );
        // a mirrored adjacent beats any diagonal pattern
        assert_eq!(
            Stencil::select([true, false, false, false], [false, true, false, false]),
            Stencil::SideSouth
        );
    }

    #[test]
    fn it_averages_with_weights() {
        let v = [1.0, 2.0, 3.0, 4.0];
        let w = [1.0, 2.0, 3.0, 4.0];

        let bulk = Stencil::Middle.apply(&v, &w);
        assert!((bulk - 3.0).abs() < 1e-12);

        // uniform weights reduce the bulk stencil to the plain mean
        let uniform = Stencil::Middle.apply(&v, &[2.0; 4]);
        assert!((uniform - 2.5).abs() < 1e-12);
    }

    #[test]
    fn it_doubles_the_opposite_of_a_mirrored_side() {
        let v = [1.0, 5.0, 3.0, 3.0];
        let w = [1.0; 4];
        // south mirrored: (2·5 + 3 + 3) / 4
        assert!((Stencil::SideSouth.apply(&v, &w) - 4.0).abs() < 1e-12);
        // north mirrored: (2·1 + 3 + 3) / 4
        assert!((Stencil::SideNorth.apply(&v, &w) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn it_keeps_only_the_free_pair_in_corners() {
        let v = [100.0, 2.0, 4.0, 100.0];
        let w = [1.0; 4];
        // south and east mirrored: (2 + 4) / 2
        assert!((Stencil::CornerSouthEast.apply(&v, &w) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn it_doubles_the_pair_away_from_a_mirrored_diagonal() {
        let v = [1.0, 2.0, 3.0, 4.0];
        let w = [1.0, 1.0, 2.0, 1.0];
        // south-east mirrored: north and west doubled, product form
        // throughout
        let expected = (1.0 + 2.0 * 2.0 + 2.0 * 3.0 * 2.0 + 4.0) / (1.0 + 2.0 + 4.0 + 1.0);
        assert!((Stencil::InvCornerSouthEast.apply(&v, &w) - expected).abs() < 1e-12);
    }

    #[test]
    fn it_preserves_a_uniform_field() {
        // any stencil applied to a constant field returns the constant
        let v = [0.75; 4];
        let w = [1.0, 2.0742, 1.3, 4.0];
        for stencil in [
            Stencil::Middle,
            Stencil::SideSouth,
            Stencil::SideEast,
            Stencil::CornerNorthWest,
            Stencil::InvCornerSouthWest,
        ] {
            assert!((stencil.apply(&v, &w) - 0.75).abs() < 1e-12, "{stencil:?}");
        }
    }
}
