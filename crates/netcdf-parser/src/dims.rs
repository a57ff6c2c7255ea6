//! Storage layouts of WRF fields.
//!
//! Every WRF field is stored with one of a small, closed set of dimension
//! tuples. Each tuple is matched exactly against [`SIGNATURES`]; there is no
//! fallback layout.

/// Logical axis a stored dimension is sliced by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// `Time`, selected by `t`
    Time,
    /// `bottom_top` or `bottom_top_stag`, selected by `k`
    Vertical,
    /// `soil_layers_stag`, selected by `s`
    Soil,
    /// `land_cat_stag`, selected by `c`
    LandCategory,
    /// `south_north` or `south_north_stag`, selected by `i`
    SouthNorth,
    /// `west_east` or `west_east_stag`, selected by `j`
    WestEast,
}

impl Axis {
    pub fn label(self) -> &'static str {
        match self {
            Axis::Time => "time",
            Axis::Vertical => "vertical",
            Axis::Soil => "soil",
            Axis::LandCategory => "landcat",
            Axis::SouthNorth => "i",
            Axis::WestEast => "j",
        }
    }
}

/// Known storage layout of a WRF field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DimensionSignature {
    /// Surface field, e.g. T2
    Surface,
    /// 3D, U-like
    StaggeredEast3d,
    /// 3D, V-like
    StaggeredNorth3d,
    /// 3D, W-like
    StaggeredVertical3d,
    /// 3D on mass points, e.g. TKE
    Mass3d,
    /// Soil layers at each surface point, e.g. TSLB
    Soil3d,
    /// Eta on half levels, e.g. ZNU
    VerticalProfile,
    /// Eta on full levels, e.g. ZNW
    StaggeredVerticalProfile,
    /// Soil layer depths, e.g. ZS
    SoilProfile,
    /// Surface field staggered north, e.g. MAPFAC_V
    StaggeredNorthSurface,
    /// Surface field staggered east, e.g. MAPFAC_U
    StaggeredEastSurface,
    /// Plain time series, e.g. XTIME
    TimeOnly,
    /// Land use fraction by category, e.g. LANDUSEF
    LandCategory,
}

/// Lookup table from stored dimension names to layout and slicing axes.
pub static SIGNATURES: [(DimensionSignature, &[&str], &[Axis]); 13] = {
    use Axis::*;
    use DimensionSignature as S;
    [
        (
            S::Surface,
            &["Time", "south_north", "west_east"],
            &[Time, SouthNorth, WestEast],
        ),
        (
            S::StaggeredEast3d,
            &["Time", "bottom_top", "south_north", "west_east_stag"],
            &[Time, Vertical, SouthNorth, WestEast],
        ),
        (
            S::StaggeredNorth3d,
            &["Time", "bottom_top", "south_north_stag", "west_east"],
            &[Time, Vertical, SouthNorth, WestEast],
        ),
        (
            S::StaggeredVertical3d,
            &["Time", "bottom_top_stag", "south_north", "west_east"],
            &[Time, Vertical, SouthNorth, WestEast],
        ),
        (
            S::Mass3d,
            &["Time", "bottom_top", "south_north", "west_east"],
            &[Time, Vertical, SouthNorth, WestEast],
        ),
        (
            S::Soil3d,
            &["Time", "soil_layers_stag", "south_north", "west_east"],
            &[Time, Soil, SouthNorth, WestEast],
        ),
        (
            S::VerticalProfile,
            &["Time", "bottom_top"],
            &[Time, Vertical],
        ),
        (
            S::StaggeredVerticalProfile,
            &["Time", "bottom_top_stag"],
            &[Time, Vertical],
        ),
        (
            S::SoilProfile,
            &["Time", "soil_layers_stag"],
            &[Time, Soil],
        ),
        (
            S::StaggeredNorthSurface,
            &["Time", "south_north_stag", "west_east"],
            &[Time, SouthNorth, WestEast],
        ),
        (
            S::StaggeredEastSurface,
            &["Time", "south_north", "west_east_stag"],
            &[Time, SouthNorth, WestEast],
        ),
        (S::TimeOnly, &["Time"], &[Time]),
        (
            S::LandCategory,
            &["Time", "land_cat_stag", "south_north", "west_east"],
            &[Time, LandCategory, SouthNorth, WestEast],
        ),
    ]
};

impl DimensionSignature {
    /// Find the layout whose dimension names match exactly, in order.
    pub fn lookup<S: AsRef<str>>(dimensions: &[S]) -> Option<Self> {
        SIGNATURES.iter().find_map(|(signature, names, _)| {
            let matches = names.len() == dimensions.len()
                && names
                    .iter()
                    .zip(dimensions)
                    .all(|(name, dim)| *name == dim.as_ref());
            matches.then_some(*signature)
        })
    }

    fn entry(self) -> &'static (DimensionSignature, &'static [&'static str], &'static [Axis]) {
        // Table order equals declaration order
        &SIGNATURES[self as usize]
    }

    /// Stored dimension names, in storage order.
    pub fn dimension_names(self) -> &'static [&'static str] {
        self.entry().1
    }

    /// Slicing axis for each stored dimension.
    pub fn axes(self) -> &'static [Axis] {
        self.entry().2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_order_matches_declaration() {
        for (position, (signature, _, _)) in SIGNATURES.iter().enumerate() {
            assert_eq!(*signature as usize, position);
        }
    }

    #[test]
    fn test_every_signature_round_trips_through_lookup() {
        for (signature, names, axes) in SIGNATURES.iter() {
            assert_eq!(DimensionSignature::lookup(*names), Some(*signature));
            assert_eq!(names.len(), axes.len());
            assert_eq!(axes[0], Axis::Time);
        }
    }

    #[test]
    fn test_signatures_are_distinct() {
        for (a, names_a, _) in SIGNATURES.iter() {
            for (b, names_b, _) in SIGNATURES.iter() {
                if a != b {
                    assert_ne!(names_a, names_b);
                }
            }
        }
    }

    #[test]
    fn test_staggered_layouts_slice_like_unstaggered() {
        let u = DimensionSignature::StaggeredEast3d.axes();
        let w = DimensionSignature::StaggeredVertical3d.axes();
        assert_eq!(u, DimensionSignature::Mass3d.axes());
        assert_eq!(w, DimensionSignature::Mass3d.axes());
        assert_eq!(
            DimensionSignature::Soil3d.axes(),
            &[Axis::Time, Axis::Soil, Axis::SouthNorth, Axis::WestEast]
        );
    }

    #[test]
    fn test_unknown_layouts() {
        assert_eq!(DimensionSignature::lookup(&["Time", "DateStrLen"]), None);
        assert_eq!(DimensionSignature::lookup(&["south_north", "west_east"]), None);
        // Order matters
        assert_eq!(DimensionSignature::lookup(&["Time", "west_east", "south_north"]), None);
        assert_eq!(DimensionSignature::lookup::<&str>(&[]), None);
    }
}
