//! Static wave table: the partial order that makes the module dependency
//! graph a DAG by construction instead of a cyclic "depends on ALL" link.
//!
//! Five topological layers, not four: M10 hard-depends on M09 (both
//! nominally "wave 3" work), and M15 depends on everything including M10,
//! M12, M13, M14 (nominally "wave 4"). Honoring both dependency lists at
//! once forces M10 into its own layer between the two, and M15 into a
//! fifth.

use crate::module::ModuleId;

pub const WAVES: [&[ModuleId]; 5] = [
    &[
        ModuleId::M01CompanyContext,
        ModuleId::M02TechnologyStack,
        ModuleId::M03TrafficAnalysis,
        ModuleId::M04FinancialProfile,
    ],
    &[
        ModuleId::M05CompetitorIntelligence,
        ModuleId::M06HiringSignals,
        ModuleId::M07StrategicContext,
    ],
    &[
        ModuleId::M08InvestorIntelligence,
        ModuleId::M09ExecutiveIntelligence,
        ModuleId::M11DisplacementAnalysis,
    ],
    &[
        ModuleId::M10BuyingCommittee,
        ModuleId::M12CaseStudyMatching,
        ModuleId::M13IcpPriorityMapping,
        ModuleId::M14SignalScoring,
    ],
    &[ModuleId::M15StrategicBrief],
];

/// Which wave (1-indexed) a module belongs to.
#[must_use]
pub fn wave_of(module: ModuleId) -> u8 {
    for (idx, wave) in WAVES.iter().enumerate() {
        if wave.contains(&module) {
            return idx as u8 + 1;
        }
    }
    unreachable!("every ModuleId belongs to exactly one wave")
}

/// Every declared dependency of `module` resolves to a module in a
/// strictly earlier wave. Exercised by a unit test; guards against the
/// wave table and `ModuleId::depends_on` drifting out of sync.
#[must_use]
pub fn is_valid_dag() -> bool {
    ModuleId::ALL.iter().all(|&m| {
        let w = wave_of(m);
        m.depends_on().iter().all(|&dep| wave_of(dep) < w)
    })
}

/// Sanity check that the waves partition `ModuleId::ALL` exactly once
/// each, with no module missing or duplicated.
#[must_use]
pub fn covers_all_modules() -> bool {
    let mut seen: Vec<ModuleId> = WAVES.iter().flat_map(|w| w.iter().copied()).collect();
    seen.sort();
    let mut expected = ModuleId::ALL;
    expected.sort();
    seen == expected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waves_form_a_dag() {
        assert!(is_valid_dag());
    }

    #[test]
    fn waves_cover_every_module_exactly_once() {
        assert!(covers_all_modules());
    }

    #[test]
    fn m15_depends_on_every_other_module() {
        let deps = ModuleId::M15StrategicBrief.depends_on();
        assert_eq!(deps.len(), 14);
        for m in ModuleId::ALL {
            if m != ModuleId::M15StrategicBrief {
                assert!(deps.contains(&m), "M15 missing dependency on {m:?}");
            }
        }
    }

    #[test]
    fn m15_is_alone_in_the_final_wave() {
        assert_eq!(WAVES.last(), Some(&(&[ModuleId::M15StrategicBrief][..])));
    }
}
