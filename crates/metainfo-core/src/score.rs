//! Compatibility scoring of a component's relations against a system.
//!
//! Hard requirements decide whether a component can run at all. Input
//! controls listed under `supports` form a capability profile that must
//! overlap with the system's controls. Everything else is a soft relation
//! and lowers the score proportionally:
//!
//! ```text
//! score = 100 - 50 * penalty / soft_count
//! ```
//!
//! where a not satisfied soft relation adds 1 to `penalty` and an unknown
//! one adds 0.5 (1 in strict mode).

use tracing::debug;

use crate::{
    check::{is_satisfied, ComponentRegistry, RelationCheckResult, RelationStatus},
    error::{RelationError, RelationResult},
    relation::{Relation, RelationKind},
    system_info::SystemInfo,
};

#[derive(Debug, Clone)]
pub struct CompatibilityScore<'a> {
    /// 0 means incompatible, 100 fully compatible.
    pub score: u8,
    pub results: Vec<(&'a Relation, RelationCheckResult)>,
}

impl<'a> CompatibilityScore<'a> {
    pub fn is_compatible(&self) -> bool {
        self.score > 0
    }

    /// Hard requirements the system does not fulfil.
    pub fn failed_requirements(&self) -> impl Iterator<Item = &(&'a Relation, RelationCheckResult)> {
        self.results.iter().filter(|(relation, result)| {
            relation.kind() == RelationKind::Requires && result.status == RelationStatus::NotSatisfied
        })
    }
}

#[derive(Debug, Default)]
struct Tally {
    disqualified: bool,
    soft_count: u32,
    penalty: f64,
    capabilities: u32,
    capabilities_met: u32,
    capabilities_unknown: u32,
}

impl Tally {
    fn add(&mut self, relation: &Relation, status: RelationStatus, strict: bool) {
        let unknown_penalty = if strict { 1.0 } else { 0.5 };

        match relation.kind() {
            RelationKind::Requires => match status {
                RelationStatus::NotSatisfied | RelationStatus::Error => self.disqualified = true,
                RelationStatus::Unknown if strict => self.disqualified = true,
                _ => {}
            },
            RelationKind::Supports if relation.is_control() => {
                self.capabilities += 1;
                match status {
                    RelationStatus::Satisfied => self.capabilities_met += 1,
                    RelationStatus::Unknown => self.capabilities_unknown += 1,
                    _ => {}
                }
            }
            RelationKind::Supports | RelationKind::Recommends => {
                self.soft_count += 1;
                match status {
                    RelationStatus::NotSatisfied | RelationStatus::Error => self.penalty += 1.0,
                    RelationStatus::Unknown => self.penalty += unknown_penalty,
                    RelationStatus::Satisfied => {}
                }
            }
        }
    }

    fn finish(mut self, strict: bool) -> u8 {
        if self.disqualified {
            return 0;
        }

        if self.capabilities > 0 && self.capabilities_met == 0 {
            if self.capabilities_unknown == 0 || strict {
                debug!("no supported input control is available");
                return 0;
            }
            self.soft_count += 1;
            self.penalty += 1.0;
        }

        if self.soft_count == 0 {
            return 100;
        }
        let score = 100.0 - 50.0 * self.penalty / f64::from(self.soft_count);
        score.round().clamp(0.0, 100.0) as u8
    }
}

/// Checks every relation and rates how well the system fits them.
///
/// Any relation that can not be evaluated aborts scoring with the failing
/// relation attached as context.
pub fn score<'a>(
    relations: &'a [Relation],
    sysinfo: &mut SystemInfo,
    registry: Option<&dyn ComponentRegistry>,
    strict: bool,
) -> RelationResult<CompatibilityScore<'a>> {
    let mut tally = Tally::default();
    let mut results = Vec::with_capacity(relations.len());

    for relation in relations {
        let result = is_satisfied(relation, sysinfo, registry).map_err(|err| RelationError::Check {
            relation: relation.to_string(),
            source: Box::new(err),
        })?;
        tally.add(relation, result.status, strict);
        results.push((relation, result));
    }

    let score = tally.finish(strict);
    debug!(score, relations = relations.len(), "computed compatibility score");
    Ok(CompatibilityScore { score, results })
}

#[cfg(test)]
mod tests {
    use metainfo_utils::compare::Compare;

    use super::*;
    use crate::{
        relation::{ControlKind, DisplayLength, DisplaySize, RelationValue},
        system_info::{ChassisKind, InternetConnectivity},
    };

    fn control(kind: RelationKind, control: ControlKind) -> Relation {
        Relation::new(kind, RelationValue::Control(control))
    }

    fn memory(kind: RelationKind, mib: u64) -> Relation {
        Relation::new(kind, RelationValue::Memory(mib))
    }

    fn score_on(chassis: ChassisKind, relations: &[Relation], strict: bool) -> u8 {
        let mut sysinfo = SystemInfo::for_chassis(chassis).unwrap();
        score(relations, &mut sysinfo, None, strict).unwrap().score
    }

    #[test]
    fn test_no_relations() {
        assert_eq!(score_on(ChassisKind::Desktop, &[], false), 100);
    }

    #[test]
    fn test_failed_requirement_disqualifies() {
        let relations = [memory(RelationKind::Requires, 16384)];
        let mut sysinfo = SystemInfo::for_chassis(ChassisKind::Desktop).unwrap();
        let result = score(&relations, &mut sysinfo, None, false).unwrap();
        assert_eq!(result.score, 0);
        assert!(!result.is_compatible());
        assert_eq!(result.failed_requirements().count(), 1);
    }

    #[test]
    fn test_unknown_requirement_only_fails_strict() {
        let relations = [Relation::new(
            RelationKind::Requires,
            RelationValue::Internet {
                kind: crate::relation::InternetKind::Always,
                bandwidth_mbitps: None,
            },
        )];
        assert_eq!(score_on(ChassisKind::Desktop, &relations, false), 100);
        assert_eq!(score_on(ChassisKind::Desktop, &relations, true), 0);
    }

    #[test]
    fn test_capability_profile() {
        let desktop_only = [
            control(RelationKind::Supports, ControlKind::Pointing),
            control(RelationKind::Supports, ControlKind::Keyboard),
        ];
        assert_eq!(score_on(ChassisKind::Desktop, &desktop_only, false), 100);
        assert_eq!(score_on(ChassisKind::Handset, &desktop_only, false), 0);

        let mut adaptive = desktop_only.to_vec();
        adaptive.push(control(RelationKind::Supports, ControlKind::Touch));
        assert_eq!(score_on(ChassisKind::Desktop, &adaptive, false), 100);
        assert_eq!(score_on(ChassisKind::Handset, &adaptive, false), 100);
    }

    #[test]
    fn test_unknown_capability() {
        // Voice is never detected, so without an override it stays unknown.
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("udev")).unwrap();
        let paths = metainfo_config::config::ProbePaths {
            os_release: vec![],
            sysfs_devices: root.path().join("sys"),
            udev_data: root.path().join("udev"),
            hwdb: vec![],
        };
        let relations = [control(RelationKind::Supports, ControlKind::Voice)];

        let mut sysinfo = SystemInfo::with_paths(paths.clone());
        assert_eq!(score(&relations, &mut sysinfo, None, false).unwrap().score, 50);

        let mut sysinfo = SystemInfo::with_paths(paths);
        assert_eq!(score(&relations, &mut sysinfo, None, true).unwrap().score, 0);
    }

    #[test]
    fn test_soft_relations_are_proportional() {
        let mut sysinfo = SystemInfo::for_chassis(ChassisKind::Handset).unwrap();
        sysinfo.set_internet(InternetConnectivity::Untested);

        let relations = [
            memory(RelationKind::Recommends, 2048),
            memory(RelationKind::Recommends, 8192),
            Relation::new(
                RelationKind::Recommends,
                RelationValue::DisplayLength(DisplayLength::Size(DisplaySize::Large)),
            )
            .with_compare(Compare::Ge),
            Relation::new(
                RelationKind::Recommends,
                RelationValue::Internet {
                    kind: crate::relation::InternetKind::FirstRun,
                    bandwidth_mbitps: None,
                },
            ),
        ];

        // 1 (memory) + 1 (display) + 0.5 (internet unknown) over 4 soft relations
        let lenient = score(&relations, &mut sysinfo, None, false).unwrap();
        assert_eq!(lenient.score, 69);
        assert_eq!(lenient.results.len(), 4);

        // 1 + 1 + 1 over 4
        let strict = score(&relations, &mut sysinfo, None, true).unwrap();
        assert_eq!(strict.score, 63);
    }

    #[test]
    fn test_check_error_aborts_with_context() {
        let relations = [
            memory(RelationKind::Recommends, 1024),
            Relation::new(RelationKind::Requires, RelationValue::Id("org.example.Lib".into())),
        ];
        let mut sysinfo = SystemInfo::for_chassis(ChassisKind::Desktop).unwrap();
        let err = score(&relations, &mut sysinfo, None, false).unwrap_err();

        let cause = std::error::Error::source(&err).unwrap();
        assert!(cause.to_string().contains("no component registry available"));
        let report = miette::Report::new(err);
        assert_eq!(report.to_string(), "Failed to check `requires id org.example.Lib`");

        let err = score(&relations, &mut sysinfo, None, false).unwrap_err();
        match err {
            RelationError::Check { relation, source } => {
                assert_eq!(relation, "requires id org.example.Lib");
                assert!(matches!(*source, RelationError::RegistryUnavailable(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
