use std::path::{Path, PathBuf};

use metainfo_core::{
    component::Component,
    score::{score, CompatibilityScore},
    system_info::ChassisKind,
    MetainfoResult,
};
use nu_ansi_term::Color::{Blue, Cyan, Red};
use tabled::{
    builder::Builder,
    settings::{peaker::PriorityMax, themes::BorderCorrection, Panel, Style, Width},
};
use tracing::{debug, error, info};

use crate::{
    target::{build_registry, Target},
    utils::{score_verdict, status_icon, term_width, Colored, Icons},
};

fn show_details(label: &str, result: &CompatibilityScore<'_>) {
    info!("\n{} ({}):", Colored(Blue, label), result.score);
    for (relation, check) in &result.results {
        info!(
            "  {} {}: {}",
            status_icon(check.status),
            relation,
            check.message
        );
    }
}

pub fn check_syscompat(
    manifest: &Path,
    target: Target,
    with: &[PathBuf],
    details: bool,
    strict: bool,
) -> MetainfoResult<()> {
    let component = Component::load(manifest)?;

    let mut targets = vec![target];
    for chassis in ChassisKind::TEMPLATES {
        targets.push(Target::chassis(*chassis)?);
    }

    let mut builder = Builder::new();
    builder.push_record(["System".to_string(), "Score".to_string(), "Verdict".to_string()]);

    let mut detailed = Vec::new();
    for target in &mut targets {
        let registry = build_registry(with, &mut target.sysinfo)?;
        match score(&component.relations, &mut target.sysinfo, Some(&registry), strict) {
            Ok(result) => {
                debug!(
                    system = %target.label,
                    score = result.score,
                    "{} scores {} on {}",
                    component.id,
                    result.score,
                    target.label
                );
                builder.push_record([
                    target.label.clone(),
                    result.score.to_string(),
                    score_verdict(result.score).to_string(),
                ]);
                if details {
                    detailed.push((target.label.clone(), result));
                }
            }
            Err(err) => {
                error!("{}: {err}", target.label);
                builder.push_record([
                    target.label.clone(),
                    "-".to_string(),
                    Colored(Red, "error").to_string(),
                ]);
            }
        }
    }

    let table = builder
        .build()
        .with(Panel::header(format!(
            "{} {} compatibility",
            Icons::ARROW,
            Colored(Cyan, &component.id)
        )))
        .with(Style::rounded())
        .with(BorderCorrection {})
        .with(Width::wrap(term_width()).priority(PriorityMax::default()))
        .to_string();

    info!("\n{table}");

    for (label, result) in &detailed {
        show_details(label, result);
    }

    Ok(())
}
