use log::info;
use ttempsmooth_core::config::{PLANE_NAMES, PlaneMode, ProcessingMode, SmoothConfig};

use crate::cli::ValidateArgs;
use crate::commands::resolve_config;
use crate::error::CliResult;
use crate::output::{print_config_block, print_heading, print_section, print_success, print_warning};

/// Execute the validate command
pub fn execute_validate(args: ValidateArgs) -> CliResult<()> {
    let config = resolve_config(&args.params)?;
    info!("Parameters are valid");

    if args.json {
        println!("{}", config.to_json_string()?);
        return Ok(());
    }

    print_heading("TTempSmooth Parameters");
    print_config_block(&[
        ("maxr", config.maxr.to_string()),
        ("window", format!("{} frames", config.diameter())),
        ("strength", config.strength.to_string()),
        (
            "scthresh",
            if config.scthresh == 0.0 {
                "disabled".to_string()
            } else {
                format!("{}%", config.scthresh)
            },
        ),
        ("fp", config.fp.to_string()),
        ("pmode", mode_label(config.pmode).to_string()),
        ("parallel", config.parallel.to_string()),
    ]);

    for (index, plane) in config.planes.iter().enumerate() {
        print_section(&format!("Plane {}", PLANE_NAMES[index].to_uppercase()));
        let mut items = vec![
            ("mode", plane_mode_label(plane.mode).to_string()),
            ("thresh", plane.thresh.to_string()),
            ("mdiff", plane.mdiff.to_string()),
        ];
        if config.pmode == ProcessingMode::BestMatch {
            items.push(("thupd", plane.thupd.to_string()));
            items.push(("pnew", plane.pnew.to_string()));
        }
        print_config_block(&items);
    }

    for note in notes(&config) {
        print_warning(&note);
    }
    print_success("Parameters are valid");
    Ok(())
}

fn mode_label(pmode: ProcessingMode) -> &'static str {
    match pmode {
        ProcessingMode::Adaptive => "adaptive blending",
        ProcessingMode::BestMatch => "best-match selection (8-bit only)",
    }
}

fn plane_mode_label(mode: PlaneMode) -> &'static str {
    match mode {
        PlaneMode::Skip => "skip (left blank)",
        PlaneMode::Copy => "copy from source",
        PlaneMode::Filter => "filter",
    }
}

/// Combinations that are valid but probably not what the user meant.
fn notes(config: &SmoothConfig) -> Vec<String> {
    let mut notes = Vec::new();
    if config.planes.iter().all(|p| p.mode != PlaneMode::Filter) {
        notes.push("No plane is filtered; output equals the input or is blank".to_string());
    }
    match config.pmode {
        ProcessingMode::Adaptive => {
            if config.planes.iter().any(|p| p.thupd > 0 || p.pnew > 0) {
                notes.push("thupd and pnew only apply in best-match mode".to_string());
            }
        }
        ProcessingMode::BestMatch => {
            if config.planes.iter().all(|p| p.thupd == 0) {
                notes.push("Best-match memory is disabled on every plane (thupd = 0)".to_string());
            }
        }
    }
    notes
}
