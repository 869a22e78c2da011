use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use metainfo_core::{
    check::{is_satisfied, RelationCheckResult, RelationStatus},
    component::Component,
    relation::RelationKind,
    MetainfoResult,
};
use nu_ansi_term::Color::{Blue, Cyan};
use tracing::{info, warn};

use crate::{
    target::{build_registry, Target},
    utils::{status_icon, Colored},
};

/// Whether a result fails the check. Anything short of satisfied counts for
/// requirements and recommendations; supported items are informational.
fn is_blocking(kind: RelationKind, status: RelationStatus) -> bool {
    kind != RelationKind::Supports && status != RelationStatus::Satisfied
}

pub fn check_relations(
    manifest: &Path,
    target: &mut Target,
    with: &[PathBuf],
) -> MetainfoResult<ExitCode> {
    let component = Component::load(manifest)?;
    let registry = build_registry(with, &mut target.sysinfo)?;

    info!(
        "Checking {} against {}",
        Colored(Blue, &component.id),
        Colored(Cyan, &target.label)
    );

    if component.relations.is_empty() {
        info!("No relations declared.");
        return Ok(ExitCode::SUCCESS);
    }

    let mut blocking = 0;
    for kind in RelationKind::ALL {
        let mut relations = component.relations_of(*kind).peekable();
        if relations.peek().is_none() {
            continue;
        }

        info!("\n{}:", Colored(Blue, kind.as_str()));
        for relation in relations {
            let result = is_satisfied(relation, &mut target.sysinfo, Some(&registry))
                .unwrap_or_else(|err| {
                    warn!("{err}");
                    RelationCheckResult::from_error(&err)
                });

            if is_blocking(*kind, result.status) {
                blocking += 1;
            }
            info!(
                status = %result.status,
                "  {} {}: {}",
                status_icon(result.status),
                relation,
                result.message
            );
        }
    }

    if blocking > 0 {
        info!("\n{blocking} relation(s) not satisfied.");
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
