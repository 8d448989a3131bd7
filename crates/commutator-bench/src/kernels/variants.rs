//! Named host kernel variants.

use super::launch::{launch, KernelArgs};
use super::strategy::{Fusion, KernelConfig, LayoutKind, Seed};
use crate::error::Result;
use crate::transform::TransformPlan;

const AOS: KernelConfig = KernelConfig::baseline(LayoutKind::Aos);
const AOSOA: KernelConfig = KernelConfig::baseline(LayoutKind::Aosoa);
const MANUAL: KernelConfig = AOSOA.explicit();

macro_rules! variants {
    ($( $(#[$meta:meta])* $variant:ident => $name:literal, $plan:expr, $config:expr; )*) => {
        /// Host kernel variants, in benchmark order.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Variant {
            $( $(#[$meta])* $variant, )*
        }

        impl Variant {
            /// Every variant, in benchmark order.
            pub const ALL: &'static [Variant] = &[$( Variant::$variant, )*];

            /// Reported name.
            pub fn name(self) -> &'static str {
                match self {
                    $( Variant::$variant => $name, )*
                }
            }

            /// Strategy composition; `None` for the empty kernel.
            pub fn config(self) -> Option<KernelConfig> {
                match self {
                    $( Variant::$variant => $config, )*
                }
            }

            /// Transforms applied to the inputs before the kernel runs.
            pub fn plan(self) -> TransformPlan {
                match self {
                    $( Variant::$variant => $plan, )*
                }
            }
        }
    };
}

variants! {
    /// Does nothing; measures call overhead.
    Empty => "commutator_empty", TransformPlan::AOSOA, None;
    Aos => "commutator_aos", TransformPlan::IDENTITY, Some(AOS);
    AosDirect => "commutator_aos_direct", TransformPlan::SCALED, Some(AOS.direct());
    Aosoa => "commutator_aosoa", TransformPlan::AOSOA, Some(AOSOA);
    AosoaConstants => "commutator_aosoa_constants", TransformPlan::AOSOA, Some(AOSOA.constants());
    AosoaDirect => "commutator_aosoa_direct", TransformPlan::AOSOA, Some(AOSOA.direct());
    AosoaConstantsDirect => "commutator_aosoa_constants_direct", TransformPlan::AOSOA,
        Some(AOSOA.constants().direct());
    AosoaConstantsPerm => "commutator_aosoa_constants_perm", TransformPlan::AOSOA,
        Some(AOSOA.constants().perm());
    AosoaConstantsDirectPerm => "commutator_aosoa_constants_direct_perm", TransformPlan::AOSOA,
        Some(AOSOA.constants().direct().perm());
    AosoaConstantsDirectPerm2to3 => "commutator_aosoa_constants_direct_perm2to3", TransformPlan::AOSOA,
        Some(AOSOA.constants().direct().perm().fused(Fusion::TWO_TO_THREE));
    AosoaConstantsDirectPerm2to5 => "commutator_aosoa_constants_direct_perm2to5", TransformPlan::AOSOA,
        Some(AOSOA.constants().direct().perm().fused(Fusion::TWO_TO_FIVE));
    ManualAosoa => "commutator_manual_aosoa", TransformPlan::AOSOA, Some(MANUAL);
    ManualAosoaConstants => "commutator_manual_aosoa_constants", TransformPlan::AOSOA,
        Some(MANUAL.constants());
    ManualAosoaConstantsPerm => "commutator_manual_aosoa_constants_perm", TransformPlan::AOSOA,
        Some(MANUAL.constants().perm());
    ManualAosoaDirect => "commutator_manual_aosoa_direct", TransformPlan::AOSOA,
        Some(MANUAL.direct());
    ManualAosoaConstantsDirect => "commutator_manual_aosoa_constants_direct", TransformPlan::AOSOA,
        Some(MANUAL.constants().direct());
    ManualAosoaConstantsDirectPerm => "commutator_manual_aosoa_constants_direct_perm",
        TransformPlan::AOSOA, Some(MANUAL.constants().direct().perm());
    ManualAosoaConstantsDirectPerm4to5 => "commutator_manual_aosoa_constants_direct_perm4to5",
        TransformPlan::AOSOA, Some(MANUAL.constants().direct().perm().fused(Fusion::FOUR_TO_FIVE));
    ManualAosoaConstantsDirectUnrollhints => "commutator_manual_aosoa_constants_direct_unrollhints",
        TransformPlan::AOSOA, Some(MANUAL.constants().direct().unroll_hints());
    ManualAosoaConstantsDirectPermUnrollhints =>
        "commutator_manual_aosoa_constants_direct_perm_unrollhints",
        TransformPlan::AOSOA, Some(MANUAL.constants().direct().perm().unroll_hints());
}

impl Variant {
    /// Look up a variant by its reported name, with or without the
    /// `commutator_` prefix.
    pub fn from_name(name: &str) -> Option<Variant> {
        let short = name.strip_prefix("commutator_").unwrap_or(name);
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.name().strip_prefix("commutator_") == Some(short))
    }

    /// Run the variant once.
    pub fn run(self, seed: Seed, args: KernelArgs<'_>) -> Result<()> {
        match self.config() {
            Some(config) => launch(&config, seed, args),
            None => Ok(()),
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_twenty_unique_names() {
        assert_eq!(Variant::ALL.len(), 20);
        let names: HashSet<_> = Variant::ALL.iter().map(|v| v.name()).collect();
        assert_eq!(names.len(), 20);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Variant::from_name("commutator_aos"), Some(Variant::Aos));
        assert_eq!(
            Variant::from_name("manual_aosoa_constants_direct_perm4to5"),
            Some(Variant::ManualAosoaConstantsDirectPerm4to5)
        );
        assert_eq!(Variant::from_name("aosoa_naive"), None);
    }

    #[test]
    fn test_only_aos_variants_keep_canonical_layout() {
        for v in Variant::ALL {
            let canonical = v.plan().sigma.name() == "none";
            assert_eq!(canonical, matches!(v, Variant::Aos | Variant::AosDirect), "{v}");
        }
    }
}
