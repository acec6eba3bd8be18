//! # Vitex CLI
//!
//! Tooling around the Vitex atlas allocator.
//!
//! ## Commands
//! - `simulate` - Run a synthetic streaming workload against the arranger
//! - `estimate` - Estimate the VRAM footprint of an atlas configuration

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use vitex_atlas::{
    Arranger, ArrangerConfig, AtlasSettings, FramePriorities, RecordingOutput, TextureId,
};

/// Vitex virtual-texture atlas CLI
#[derive(Parser)]
#[command(name = "vitex")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run a synthetic streaming workload against the arranger
    Simulate {
        /// Number of logical textures
        #[arg(short, long, default_value = "48")]
        objects: u32,

        /// Ticks to simulate
        #[arg(short, long, default_value = "600")]
        ticks: u32,

        /// Atlas edge in texels (power of two)
        #[arg(long, default_value = "16384")]
        atlas_size: u32,

        /// Smallest cell edge in texels (power of two)
        #[arg(long, default_value = "128")]
        thumb_size: u32,

        /// Resize damping threshold in (0, 1]
        #[arg(long, default_value = "0.5")]
        hysteresis: f32,

        /// Seed for the priority random walk
        #[arg(short, long, default_value = "0")]
        seed: u64,
    },

    /// Estimate the VRAM footprint of an atlas configuration
    Estimate {
        /// Number of virtualized materials
        #[arg(short, long)]
        materials: u32,

        /// Atlas settings JSON (defaults to the built-in configuration)
        #[arg(short, long)]
        settings: Option<PathBuf>,
    },
}

/// Execute the CLI command
pub fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    match cli.command {
        Commands::Simulate {
            objects,
            ticks,
            atlas_size,
            thumb_size,
            hysteresis,
            seed,
        } => {
            let settings = AtlasSettings {
                atlas_size,
                thumb_size,
                ..AtlasSettings::default()
            };
            settings.validate()?;
            simulate(&settings, objects, ticks, hysteresis, seed)
        }

        Commands::Estimate { materials, settings } => {
            let settings = match settings {
                Some(path) => {
                    let text = fs::read_to_string(&path)
                        .with_context(|| format!("reading {}", path.display()))?;
                    serde_json::from_str::<AtlasSettings>(&text)
                        .with_context(|| format!("parsing {}", path.display()))?
                }
                None => AtlasSettings::default(),
            };
            settings.validate()?;

            let bytes = settings.estimate_vram(materials);
            log::info!(
                "{} channels, {} texel atlas, {} materials",
                settings.channels.len(),
                settings.atlas_size,
                materials
            );
            log::info!("Estimated VRAM: {:.1} MiB", bytes as f64 / (1024.0 * 1024.0));
            Ok(())
        }
    }
}

/// Random-walk streaming workload: every object's screen area drifts each
/// tick, and the arranger chases the resulting priority ranking.
fn simulate(
    settings: &AtlasSettings,
    objects: u32,
    ticks: u32,
    hysteresis: f32,
    seed: u64,
) -> Result<()> {
    let mut arranger = Arranger::new(ArrangerConfig {
        depth: settings.depth(),
        hysteresis,
    });
    let mut output = RecordingOutput::new(settings.page_count());
    let mut rng = StdRng::seed_from_u64(seed);

    let ids: Vec<TextureId> = (0..objects).map(TextureId::new).collect();
    for &id in &ids {
        // Asset ceilings spread over the upper octaves of the atlas.
        let ceiling = settings.page_count() >> rng.random_range(0..3);
        output.set_max_size(id, ceiling.max(1));
    }
    let mut areas: Vec<f32> = (0..objects).map(|_| rng.random_range(0.0..1.0)).collect();

    let mut priorities = FramePriorities::new();
    let mut total_copies = 0usize;
    let mut total_unloads = 0usize;
    let mut total_forfeits = 0usize;

    log::info!(
        "Simulating {objects} objects over {ticks} ticks on a {} page atlas...",
        settings.page_count()
    );

    for tick in 0..ticks {
        for area in areas.iter_mut() {
            // Drift, pinned to [0, 1]; occasional objects drop off screen.
            *area = (*area + rng.random_range(-0.05..0.05f32)).clamp(0.0, 1.0);
            if rng.random_range(0.0..1.0f32) < 0.002 {
                *area = 0.0;
            }
        }

        priorities.clear();
        for (idx, &id) in ids.iter().enumerate() {
            priorities.note(id, areas[idx]);
        }

        let before = output.events().len();
        let report = arranger.update(&priorities, &mut output);
        let copies_issued = output.events()[before..]
            .iter()
            .filter(|e| matches!(e, vitex_atlas::OutputEvent::Copy { .. }))
            .count();
        if copies_issued > 1 {
            bail!("tick {tick} issued {copies_issued} copies; the budget is one");
        }

        total_copies += report.copies();
        total_unloads += report.unloads;
        total_forfeits += usize::from(report.growth_forfeited);
        if report.invariant_violations > 0 {
            bail!("tick {tick} hit {} pack invariant violations", report.invariant_violations);
        }

        log::debug!(
            "tick {tick}: {} pending, {} copies, {} unloads",
            report.pending,
            report.copies(),
            report.unloads
        );
    }

    log::info!("Done: {total_copies} copies, {total_unloads} unloads, {total_forfeits} forfeited growths");
    log::info!(
        "Resident: {} of {} objects",
        output.resident_count(),
        objects
    );

    let mut by_depth = vec![0usize; settings.depth() as usize + 1];
    for (_, smallness) in arranger.tree().occupants() {
        by_depth[smallness as usize] += 1;
    }
    for (depth, count) in by_depth.iter().enumerate() {
        if *count > 0 {
            let size = settings.page_count() >> depth;
            log::info!("  depth {depth} ({size} pages): {count}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse() {
        let cli = Cli::parse_from(["vitex", "simulate"]);
        assert!(matches!(cli.command, Commands::Simulate { .. }));
    }

    #[test]
    fn test_simulate_args() {
        let cli = Cli::parse_from([
            "vitex", "simulate", "-o", "16", "-t", "100", "--atlas-size", "4096",
        ]);
        if let Commands::Simulate { objects, ticks, atlas_size, .. } = cli.command {
            assert_eq!(objects, 16);
            assert_eq!(ticks, 100);
            assert_eq!(atlas_size, 4096);
        } else {
            panic!("Expected Simulate command");
        }
    }

    #[test]
    fn test_estimate_args() {
        let cli = Cli::parse_from(["vitex", "estimate", "-m", "200"]);
        assert!(matches!(cli.command, Commands::Estimate { materials: 200, .. }));
    }

    #[test]
    fn test_simulation_respects_budget() {
        let settings = AtlasSettings {
            atlas_size: 1024,
            thumb_size: 64,
            ..AtlasSettings::default()
        };
        // `simulate` bails on any budget or invariant breach.
        assert!(simulate(&settings, 24, 200, 0.5, 42).is_ok());
    }
}
