use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use snpcons::genomics::{
    coalesce, overlap, sequence_distance, write_reference_snp_file, FilterDescription,
    FilterOutcome, Genotype, GoodDepthTally, Interval, PileupSummary, RecordSynthesizer,
    SingleSampleWriter, StaticFilters, StrandDepth, SynthesizerConfig, VcfHeader,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEPTH_BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];

#[derive(Parser, Debug)]
#[command(name = "snpcons", version, about = "Consensus VCF records and genomic region masks")]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Merge overlapping or touching regions.
    Coalesce {
        /// Regions file (`<start> <end>` per line, inclusive).
        regions: PathBuf,
    },
    /// Report regions covered by more than one input region.
    Overlap {
        /// Regions file (`<start> <end>` per line, inclusive).
        regions: PathBuf,
    },
    /// Write a single-sample consensus VCF from per-position depth summaries.
    Vcf {
        /// Summaries file (`chrom pos ref raw A+ A- C+ C- G+ G- T+ T- [reasons]` per line).
        summaries: PathBuf,
        /// Sample name for the header column.
        #[arg(long)]
        sample: String,
        /// Reference name for the `##reference` header line.
        #[arg(long)]
        reference: String,
        /// Output VCF path (stdout when omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Genotype written for positions failing filters: '.', '0' or '1'.
        #[arg(long, default_value = ".")]
        failed_snp_gt: Genotype,
        /// Keep lowercase (soft-masked) reference bases.
        #[arg(long)]
        preserve_ref_case: bool,
        /// Filter declared in the header, as `NAME=DESCRIPTION`. Repeatable.
        #[arg(long = "filter")]
        filters: Vec<String>,
    },
    /// Count base differences between two aligned sequences.
    Distance {
        /// First sequence.
        seq1: String,
        /// Second sequence.
        seq2: String,
        /// Treat upper and lower case bases as different.
        #[arg(long)]
        case_sensitive: bool,
    },
    /// Write the reference bases at every SNP list position as FASTA.
    ReferenceSnps {
        /// Reference FASTA (indexed on first use).
        reference: PathBuf,
        /// SNP list (`chrom pos ...` per line).
        snp_list: PathBuf,
        /// Output FASTA path.
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Coalesce { regions } => run_coalesce(&regions)?,
        Commands::Overlap { regions } => run_overlap(&regions)?,
        Commands::Vcf {
            summaries,
            sample,
            reference,
            output,
            failed_snp_gt,
            preserve_ref_case,
            filters,
        } => {
            let config = SynthesizerConfig::default()
                .with_failed_snp_gt(failed_snp_gt)
                .with_preserve_ref_case(preserve_ref_case);
            let caller = StaticFilters(parse_filters(&filters)?);
            let header = VcfHeader::new(sample, reference, &caller);
            run_vcf(&summaries, output.as_deref(), &header, config)?
        }
        Commands::Distance {
            seq1,
            seq2,
            case_sensitive,
        } => {
            let distance = sequence_distance(seq1.as_bytes(), seq2.as_bytes(), !case_sensitive)?;
            println!("{distance}");
        }
        Commands::ReferenceSnps {
            reference,
            snp_list,
            output,
        } => {
            write_reference_snp_file(&reference, &snp_list, &output)
                .with_context(|| format!("failed to write {}", output.display()))?;
            info!(output = %output.display(), "wrote reference SNP sequences");
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_coalesce(path: &Path) -> Result<()> {
    let regions = read_regions_file(path)?;
    let merged = coalesce(&regions);
    info!(input = regions.len(), output = merged.len(), "coalesced regions");
    for region in merged {
        println!("{}\t{}", region.start, region.end);
    }
    Ok(())
}

fn run_overlap(path: &Path) -> Result<()> {
    let regions = read_regions_file(path)?;
    for found in overlap(&regions) {
        println!(
            "{}\t{}\t{}",
            found.interval.start, found.interval.end, found.level
        );
    }
    Ok(())
}

fn run_vcf(
    summaries: &Path,
    output: Option<&Path>,
    header: &VcfHeader,
    config: SynthesizerConfig,
) -> Result<()> {
    let synthesizer = RecordSynthesizer::new(config);
    let positions = read_summaries_file(summaries)?;

    let written = match output {
        Some(path) => {
            let writer = SingleSampleWriter::create(path, header)
                .with_context(|| format!("failed to open output {}", path.display()))?;
            write_records(writer, &synthesizer, &positions)?
        }
        None => {
            let writer = SingleSampleWriter::new(io::stdout().lock(), header)?;
            write_records(writer, &synthesizer, &positions)?
        }
    };

    info!(records = written, sample = %header.sample_id, "consensus VCF complete");
    Ok(())
}

fn write_records<W: Write>(
    mut writer: SingleSampleWriter<W>,
    synthesizer: &RecordSynthesizer,
    positions: &[(PileupSummary, FilterOutcome)],
) -> Result<usize> {
    for (summary, outcome) in positions {
        let record = synthesizer.synthesize(summary, outcome);
        writer
            .write_record(&record)
            .with_context(|| format!("failed to write {}:{}", summary.chrom, summary.position))?;
    }
    let written = writer.records_written();
    writer.finish().context("failed to flush VCF output")?;
    Ok(written)
}

fn parse_filters(specs: &[String]) -> Result<Vec<FilterDescription>> {
    specs
        .iter()
        .map(|spec| {
            let (name, description) = spec
                .split_once('=')
                .ok_or_else(|| anyhow!("filter '{}' must be NAME=DESCRIPTION", spec))?;
            Ok(FilterDescription::new(name.trim(), description.trim()))
        })
        .collect()
}

fn data_lines(path: &Path) -> Result<impl Iterator<Item = (usize, io::Result<String>)>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    Ok(BufReader::new(file).lines().enumerate().filter(|(_, line)| {
        line.as_ref()
            .map(|l| {
                let l = l.trim();
                !l.is_empty() && !l.starts_with('#')
            })
            .unwrap_or(true)
    }))
}

fn read_regions_file(path: &Path) -> Result<Vec<Interval>> {
    let mut regions = Vec::new();
    for (line_no, line) in data_lines(path)? {
        let line = line?;
        let mut fields = line.split_whitespace();
        let mut next_coord = |what: &str| -> Result<u64> {
            let raw = fields
                .next()
                .ok_or_else(|| anyhow!("missing {} on line {}", what, line_no + 1))?;
            raw.parse()
                .with_context(|| format!("invalid {} '{}' on line {}", what, raw, line_no + 1))
        };
        let start = next_coord("start")?;
        let end = next_coord("end")?;
        regions.push(
            Interval::new(start, end).with_context(|| format!("on line {}", line_no + 1))?,
        );
    }
    Ok(regions)
}

fn read_summaries_file(path: &Path) -> Result<Vec<(PileupSummary, FilterOutcome)>> {
    let mut positions = Vec::new();
    for (line_no, line) in data_lines(path)? {
        let line = line?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 12 {
            bail!(
                "expected at least 12 columns on line {}, found {}",
                line_no + 1,
                fields.len()
            );
        }
        let parse = |idx: usize| -> Result<u32> {
            fields[idx]
                .parse()
                .with_context(|| format!("invalid number '{}' on line {}", fields[idx], line_no + 1))
        };

        let reference_base = match fields[2].as_bytes() {
            [base] => *base,
            _ => bail!("reference must be one base on line {}", line_no + 1),
        };

        let mut tally = GoodDepthTally::new();
        for (i, &base) in DEPTH_BASES.iter().enumerate() {
            tally.add(base, StrandDepth::new(parse(4 + 2 * i)?, parse(5 + 2 * i)?));
        }

        let summary = PileupSummary::new(fields[0], parse(1)?, reference_base, parse(3)?, tally);
        let outcome = match fields.get(12) {
            Some(reasons) => FilterOutcome::from_reasons(reasons.split(';').filter(|r| !r.is_empty())),
            None => FilterOutcome::Pass,
        };
        positions.push((summary, outcome));
    }
    Ok(positions)
}
