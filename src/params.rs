//! Tuning knobs for type generation.

/// Upper bounds on the shapes the generator may produce. The defaults keep individual types
/// small enough to print and debug while still exercising every structural feature.
#[derive(Debug, Clone, Copy)]
pub struct FuzzParams {
    /// Upper bound on signature parameter counts. The actual count is squared-biased towards
    /// zero.
    pub max_params: usize,

    /// Upper bound on struct field counts, both for root structs and for the fields a subtype
    /// may append beyond its parent's.
    pub max_struct_size: usize,

    /// Upper bound on multivalue result counts; must be at least 2. A multivalue result list
    /// has `2 + up_to(max_tuple_size - 1)` elements.
    pub max_tuple_size: usize,
}

impl Default for FuzzParams {
    fn default() -> Self {
        Self {
            max_params: 10,
            max_struct_size: 6,
            max_tuple_size: 3,
        }
    }
}
