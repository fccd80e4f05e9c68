//! Run an accuracy or sampling job described in a JSON file.
//!
//! ```text
//! map-accuracy <job.json> [--output <result.json>]
//! ```
//!
//! The job file holds a `kind` tag (`accuracy` or `sampling`), optional
//! `config` and the already-extracted `inputs`. The result record is printed
//! to stdout or written to `--output`.

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use map_accuracy::{
    generate_methods_text, run_accuracy_assessment, run_sample_generation, sampling_metadata,
    AccuracyConfig, AccuracyInputs, AccuracyRun, RunMetadata, SampleSet, SamplingConfig,
    SamplingInputs, SourceInfo,
};

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Job {
    Accuracy {
        #[serde(default)]
        config: AccuracyConfig,
        inputs: AccuracyInputs,
        #[serde(default)]
        sampling_info: Option<String>,
    },
    Sampling {
        #[serde(default)]
        config: SamplingConfig,
        inputs: SamplingInputs,
        #[serde(default)]
        source: SourceInfo,
        #[serde(default)]
        crs_epsg: Option<u32>,
    },
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum JobOutput {
    Accuracy {
        #[serde(flatten)]
        run: Box<AccuracyRun>,
        methods_text: String,
    },
    Sampling {
        #[serde(flatten)]
        sample_set: SampleSet,
        metadata: RunMetadata,
    },
}

#[derive(Parser, Debug)]
#[command(name = "map-accuracy")]
#[command(version, about = "Accuracy assessment and sample design for classified maps", long_about = None)]
struct Cli {
    /// Job file (JSON) with a `kind`, optional `config` and the `inputs`
    job: PathBuf,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn run(job: Job) -> Result<JobOutput> {
    match job {
        Job::Accuracy {
            config,
            inputs,
            sampling_info,
        } => {
            let run = run_accuracy_assessment(&inputs, &config)
                .context("accuracy assessment failed")?;
            for issue in run.validation.warnings() {
                log::warn!("{}", issue);
            }
            let methods_text = generate_methods_text(
                &run.assessment,
                config.confidence_level,
                sampling_info.as_deref(),
            );
            Ok(JobOutput::Accuracy {
                run: Box::new(run),
                methods_text,
            })
        }
        Job::Sampling {
            config,
            inputs,
            source,
            crs_epsg,
        } => {
            let report: &mut dyn FnMut(usize, usize) = &mut |done, total| {
                log::info!("Sampled {}/{} classes", done, total);
            };
            let sample_set = run_sample_generation(&inputs, &config, Some(report))
                .context("sample generation failed")?;
            let metadata = sampling_metadata(&sample_set, &source, crs_epsg);
            Ok(JobOutput::Sampling {
                sample_set,
                metadata,
            })
        }
    }
}

fn main() -> Result<()> {
    map_accuracy::init()?;
    let args = Cli::parse();

    let text = std::fs::read_to_string(&args.job)
        .with_context(|| format!("failed to read {}", args.job.display()))?;
    let job: Job = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse {}", args.job.display()))?;

    let output = serde_json::to_string_pretty(&run(job)?)?;
    match args.output {
        Some(path) => {
            std::fs::write(&path, output)
                .with_context(|| format!("failed to write {}", path.display()))?;
            log::info!("Result written to {}", path.display());
        }
        None => println!("{}", output),
    }
    Ok(())
}
