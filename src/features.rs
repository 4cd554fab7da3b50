//! The set of WebAssembly proposals the generator is allowed to draw from.
use bitflags::bitflags;

bitflags! {
    /// Enabled feature proposals. The MVP numeric types are always available; each flag unlocks
    /// the corresponding extension. Flags with no bearing on heap-type generation are simply
    /// never consulted.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FeatureSet: u32 {
        const SIMD = 1 << 0;
        const MULTIVALUE = 1 << 1;
        const EXCEPTION_HANDLING = 1 << 2;
        const SHARED_EVERYTHING = 1 << 3;
    }
}

impl FeatureSet {
    /// The baseline feature set: no proposals beyond the MVP.
    pub const MVP: FeatureSet = FeatureSet::empty();

    pub fn has_simd(self) -> bool {
        self.contains(FeatureSet::SIMD)
    }

    pub fn has_multivalue(self) -> bool {
        self.contains(FeatureSet::MULTIVALUE)
    }

    pub fn has_exception_handling(self) -> bool {
        self.contains(FeatureSet::EXCEPTION_HANDLING)
    }

    pub fn has_shared_everything(self) -> bool {
        self.contains(FeatureSet::SHARED_EVERYTHING)
    }
}
