use std::{cmp::Ordering, process::ExitCode};

use metainfo_core::MetainfoResult;
use metainfo_utils::{
    compare::Compare,
    vercmp::{compare_versions, VercmpFlags},
};
use nu_ansi_term::Color::{Cyan, Green, Red};
use tracing::info;

use crate::utils::Colored;

fn ordering_symbol(ordering: Ordering) -> &'static str {
    match ordering {
        Ordering::Less => Compare::Lt.as_symbols(),
        Ordering::Equal => Compare::Eq.as_symbols(),
        Ordering::Greater => Compare::Gt.as_symbols(),
    }
}

pub fn compare_versions_cmd(versions: &[String], ignore_epoch: bool) -> MetainfoResult<ExitCode> {
    let flags = if ignore_epoch {
        VercmpFlags::IGNORE_EPOCH
    } else {
        VercmpFlags::NONE
    };

    match versions {
        [a, b] => {
            let ordering = compare_versions(Some(a.as_str()), Some(b.as_str()), flags);
            info!(
                "{} {} {}",
                Colored(Cyan, a),
                ordering_symbol(ordering),
                Colored(Cyan, b)
            );
            Ok(ExitCode::SUCCESS)
        }
        [a, op, b] => {
            let compare: Compare = op.parse()?;
            let holds = compare.matches_versions(Some(a.as_str()), Some(b.as_str()), flags);
            let verdict = if holds {
                Colored(Green, "true")
            } else {
                Colored(Red, "false")
            };
            info!("{a} {} {b}: {verdict}", compare.as_symbols());
            Ok(if holds {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        // clap limits the argument count
        _ => Ok(ExitCode::from(2)),
    }
}
