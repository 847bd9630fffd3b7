use serde_json::json;
use ttempsmooth_core::config::PLANE_NAMES;
use ttempsmooth_core::weights::DIFF_LEVELS;
use ttempsmooth_core::{WeightRegime, WeightTable};

use crate::cli::WeightsArgs;
use crate::commands::resolve_config;
use crate::error::CliResult;
use crate::output::{print_config_block, print_heading, print_section};

/// Execute the weights command
pub fn execute_weights(args: WeightsArgs) -> CliResult<()> {
    let config = resolve_config(&args.params)?;
    let plane = args.plane.index();
    let settings = config.planes[plane];
    let table = WeightTable::build(config.maxr, config.strength, settings.thresh, settings.mdiff);

    let shift = args.bits - 8;
    let int_thresh = u32::from(settings.thresh) << shift;

    if args.json {
        let value = json!({
            "plane": PLANE_NAMES[plane],
            "maxr": config.maxr,
            "strength": config.strength,
            "thresh": settings.thresh,
            "mdiff": settings.mdiff,
            "bits": args.bits,
            "integer_threshold": int_thresh,
            "table": table,
            "reachable_sum": table.reachable_sum(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    print_heading(&format!("Weights for plane {}", PLANE_NAMES[plane].to_uppercase()));
    print_config_block(&[
        ("regime", regime_label(table.regime()).to_string()),
        ("center weight", format!("{:.6}", table.center_weight())),
        ("reachable sum", format!("{:.6}", table.reachable_sum())),
        (
            "threshold",
            format!("{} (8-bit scale), {} at {} bits", settings.thresh, int_thresh, args.bits),
        ),
    ]);

    match table.regime() {
        WeightRegime::DistanceIndexed => {
            print_section("Weight by window position");
            for (index, w) in table.weights().iter().enumerate() {
                let offset = index as isize - config.maxr as isize;
                println!("  {:+3}  {:.6}", offset, w);
            }
        }
        WeightRegime::DifferenceIndexed => {
            print_section("Weight by distance and difference level");
            for distance in 1..=config.maxr {
                let band = &table.weights()[DIFF_LEVELS * (distance - 1)..DIFF_LEVELS * distance];
                let levels = band
                    .iter()
                    .take(usize::from(settings.thresh).min(DIFF_LEVELS))
                    .map(|w| format!("{:.4}", w))
                    .collect::<Vec<_>>();
                println!("  d={}  {}", distance, levels.join(" "));
            }
        }
    }
    Ok(())
}

fn regime_label(regime: WeightRegime) -> &'static str {
    match regime {
        WeightRegime::DistanceIndexed => "by temporal distance",
        WeightRegime::DifferenceIndexed => "by distance and difference",
    }
}
