use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use wagen::{FeatureSet, HeapType, HeapTypeGenerator, Random, TypeIdx};

#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Seed for the deterministic generator. The same seed, features and
    /// count always print the same types.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Number of heap types to generate.
    #[arg(long, default_value_t = 20)]
    pub count: usize,

    /// Enable the SIMD proposal (v128 value types).
    #[arg(long)]
    pub simd: bool,

    /// Enable the multivalue proposal (multiple function results).
    #[arg(long)]
    pub multivalue: bool,

    /// Enable the exception-handling proposal (exnref).
    #[arg(long)]
    pub exception_handling: bool,

    /// Enable the shared-everything-threads proposal.
    #[arg(long)]
    pub shared_everything: bool,

    /// Enable every feature proposal.
    #[arg(long)]
    pub all_features: bool,

    /// Repair the generated types to be inhabitable before printing.
    #[arg(long)]
    pub inhabitable: bool,
}

impl Cli {
    fn features(&self) -> FeatureSet {
        let mut features = FeatureSet::MVP;
        if self.simd || self.all_features {
            features |= FeatureSet::SIMD;
        }
        if self.multivalue || self.all_features {
            features |= FeatureSet::MULTIVALUE;
        }
        if self.exception_handling || self.all_features {
            features |= FeatureSet::EXCEPTION_HANDLING;
        }
        if self.shared_everything || self.all_features {
            features |= FeatureSet::SHARED_EVERYTHING;
        }
        features
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut rand = Random::new(cli.seed);
    let generated = HeapTypeGenerator::create(&mut rand, cli.features(), cli.count);
    let mut graph = generated
        .builder
        .build()
        .context("generated an invalid type graph")?;

    if cli.inhabitable {
        let types: Vec<HeapType> = (0..graph.len())
            .map(|i| HeapType::Idx(TypeIdx(i as u32)))
            .collect();
        (graph, _) = HeapTypeGenerator::make_inhabitable(&graph, &types);
    }

    print!("{graph}");
    Ok(())
}
