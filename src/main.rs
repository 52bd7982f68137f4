// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
mod analysis;
mod audio;
mod camelot;
mod config;
mod library;
mod pad;
mod pipeline;
mod separator;
mod slicer;
#[cfg(test)]
mod testutil;

use std::error::Error;
use std::path::PathBuf;

use clap::{crate_version, Parser, Subcommand};
use rand::{rngs::StdRng, SeedableRng};
use tracing_subscriber::EnvFilter;

use crate::analysis::Analyzer;
use crate::camelot::{matching_keys, CamelotKey};
use crate::config::Settings;
use crate::library::{verify, Library, StemCategory};
use crate::pad::{PadAssembler, ProgramWriter};
use crate::pipeline::Extractor;
use crate::separator::SeparationSession;
use crate::slicer::TransientSlicer;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "Builds a key and tempo tagged sample library and assembles pad programs from it."
)]
struct Cli {
    /// A YAML config file. Settings can also be overridden with STEMDECK_ environment
    /// variables.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Writes a pad program of random samples compatible with the given key and tempo.
    Program {
        /// The target key in Camelot notation, e.g. 4A.
        #[arg(short, long)]
        key: CamelotKey,
        /// The target tempo in BPM.
        #[arg(short, long)]
        tempo: u32,
        /// Seed for the sample choice. Random if not given.
        #[arg(short, long)]
        seed: Option<u64>,
        /// Where to write the program. Defaults to the configured program file.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Slices, separates and tags every source in the input folder.
    Extract {},
    /// Lists the library samples compatible with the given key and tempo.
    Scan {
        /// The target key in Camelot notation, e.g. 4A.
        #[arg(short, long)]
        key: CamelotKey,
        /// The target tempo in BPM.
        #[arg(short, long)]
        tempo: u32,
        /// Only scan this category.
        #[arg(short = 'g', long)]
        category: Option<StemCategory>,
    },
    /// Verifies that every sample in the library follows the naming contract.
    Verify {},
    /// Prints the key, tempo and loudness of an audio file.
    Analyze {
        /// The audio file to analyze.
        file: PathBuf,
    },
    /// Prints the effective settings as YAML.
    Settings {},
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Program {
            key,
            tempo,
            seed,
            output,
        } => {
            let library = Library::new(&settings.library_root);
            let assembler = PadAssembler::new(&library, settings.scan_options());
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let grid = assembler.assemble(key, tempo, &mut rng)?;

            let output = output.unwrap_or_else(|| settings.program_file.clone());
            ProgramWriter::new(&settings.program_name).write(&grid, &output)?;

            println!("Program {} ({} {} BPM):", output.display(), key, tempo);
            for category in StemCategory::ALL {
                match grid.region_sample(category) {
                    Some(sample) => println!("- {}: {}", category, sample),
                    None => println!("- {}: (empty)", category),
                }
            }
        }
        Commands::Extract {} => {
            let mut session = SeparationSession::new(separator::from_settings(&settings.separator));
            let result = Extractor::new(settings).run(&mut session);
            session.close();
            println!("{}", result?);
        }
        Commands::Scan {
            key,
            tempo,
            category,
        } => {
            let library = Library::new(&settings.library_root);
            let keys = matching_keys(key);
            let options = settings.scan_options();
            println!(
                "Compatible keys: {}",
                keys.iter()
                    .map(|k| k.to_string())
                    .collect::<Vec<String>>()
                    .join(", ")
            );

            let categories = match category {
                Some(category) => vec![category],
                None => StemCategory::ALL.to_vec(),
            };
            for category in categories {
                let matches = library.scan(category, &keys, tempo, &options)?;
                println!("{} (count: {}):", category, matches.len());
                for sample in matches {
                    println!("- {}", sample);
                }
            }
        }
        Commands::Verify {} => {
            let library = Library::new(&settings.library_root);
            let report = verify::check_library(&library)?;
            verify::print_report(&report);
            if report.has_errors() {
                return Err("library verification failed".into());
            }
        }
        Commands::Analyze { file } => {
            let waveform = audio::decode_file(&file)?;
            let analyzer = Analyzer::new(settings.quiet_threshold_db);
            let analysis = analyzer.analyze(&waveform);

            println!("{}:", file.display());
            println!(
                "- format: {} channel(s), {} Hz, {:.2}s",
                waveform.channels(),
                waveform.sample_rate(),
                waveform.duration().as_secs_f64()
            );
            println!("- key: {}", analysis.key);
            println!("- tempo: {} BPM", analysis.tempo);
            println!(
                "- loudness: {:.1} dBFS{}",
                analysis.dbfs,
                if analysis.quiet { " (quiet)" } else { "" }
            );

            let sliced = TransientSlicer::new(waveform.sample_rate(), settings.hop_length)
                .slice_waveform(waveform);
            println!(
                "- transients: {} ({} slices)",
                sliced.onsets().len(),
                sliced.slices().count()
            );
        }
        Commands::Settings {} => {
            print!("{}", settings.to_yaml()?);
        }
    }

    Ok(())
}
