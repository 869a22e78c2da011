use std::fmt::Display;

use metainfo_core::{
    error::SystemInfoResult,
    relation::{ControlKind, DisplaySide},
    system_info::ControlState,
    MetainfoResult,
};
use nu_ansi_term::Color::{Blue, Cyan, Green, Red, Yellow};
use tabled::{
    builder::Builder,
    settings::{peaker::PriorityMax, themes::BorderCorrection, Panel, Style, Width},
};
use tracing::{info, warn};

use crate::{
    target::Target,
    utils::{term_width, Colored, Icons},
};

fn or_unknown<T: Display>(value: Option<T>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => Colored(Yellow, "unknown").to_string(),
    }
}

fn probed<T: Display>(what: &str, result: SystemInfoResult<T>) -> String {
    match result {
        Ok(value) => value.to_string(),
        Err(err) => {
            warn!("Unable to determine {what}: {err}");
            Colored(Red, "error").to_string()
        }
    }
}

fn display_side(px: u32) -> String {
    if px == 0 {
        Colored(Yellow, "unknown").to_string()
    } else {
        format!("{px}px")
    }
}

fn control_state(state: SystemInfoResult<ControlState>) -> String {
    match state {
        Ok(ControlState::Present) => Colored(Green, "present").to_string(),
        Ok(ControlState::Absent) => "absent".to_string(),
        Ok(ControlState::Untested) => Colored(Yellow, "untested").to_string(),
        Err(err) => {
            warn!("Unable to detect input controls: {err}");
            Colored(Red, "error").to_string()
        }
    }
}

pub fn show_sysinfo(target: &mut Target, devices: bool) -> MetainfoResult<()> {
    let sysinfo = &mut target.sysinfo;
    let mut builder = Builder::new();

    let os_name = or_unknown(sysinfo.os_name());
    let os_version = or_unknown(sysinfo.os_version());
    builder.push_record(["Operating system".to_string(), format!("{os_name} {os_version}")]);
    builder.push_record(["OS id".to_string(), or_unknown(sysinfo.os_id())]);
    builder.push_record(["OS component id".to_string(), or_unknown(sysinfo.os_component_id())]);

    let kernel_name = probed("kernel name", sysinfo.kernel_name().map(str::to_string));
    let kernel_version = probed("kernel version", sysinfo.kernel_version().map(str::to_string));
    builder.push_record(["Kernel".to_string(), format!("{kernel_name} {kernel_version}")]);

    let memory = probed(
        "total memory",
        sysinfo.memory_total_mib().map(|mib| format!("{mib} MiB")),
    );
    builder.push_record(["Memory".to_string(), memory]);

    builder.push_record([
        "Display".to_string(),
        format!(
            "{} shortest, {} longest",
            display_side(sysinfo.display_length(DisplaySide::Shortest)),
            display_side(sysinfo.display_length(DisplaySide::Longest))
        ),
    ]);
    builder.push_record(["GUI".to_string(), sysinfo.gui_available().to_string()]);
    builder.push_record(["Internet".to_string(), sysinfo.internet().to_string()]);

    for kind in ControlKind::ALL {
        let state = sysinfo.has_input_control(*kind);
        builder.push_record([format!("Control: {kind}"), control_state(state)]);
    }

    let modalias_count = probed("devices", sysinfo.modaliases().map(|m| m.len()));
    builder.push_record(["Devices".to_string(), modalias_count]);

    let table = builder
        .build()
        .with(Panel::header(format!("System information: {}", target.label)))
        .with(Style::rounded())
        .with(BorderCorrection {})
        .with(Width::wrap(term_width()).priority(PriorityMax::default()))
        .to_string();

    info!("\n{table}");

    if devices {
        show_devices(target)?;
    }

    Ok(())
}

fn show_devices(target: &mut Target) -> MetainfoResult<()> {
    let sysinfo = &mut target.sysinfo;
    let modaliases: Vec<String> = sysinfo.modaliases()?.keys().cloned().collect();

    if modaliases.is_empty() {
        info!("No devices found.");
        return Ok(());
    }

    info!("\nDevices:");
    for modalias in &modaliases {
        let name = sysinfo.device_name_for_modalias(modalias, true);
        match name {
            Ok(name) => info!(
                "  {} {} {}",
                Icons::ARROW,
                Colored(Blue, &name),
                Colored(Cyan, modalias)
            ),
            Err(err) => {
                warn!("{err}");
                info!("  {} {}", Icons::ARROW, Colored(Cyan, modalias));
            }
        }
    }

    Ok(())
}
