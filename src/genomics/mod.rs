//! Genomics primitives for consensus SNP calling.
//!
//! Region masks are reduced with the closed-interval algebra in [`regions`];
//! per-position pileup summaries become VCF records through the
//! [`RecordSynthesizer`] and [`SingleSampleWriter`].

pub mod regions;
mod pileup;
mod filters;
mod types;
mod synthesizer;
mod vcf;
mod io;
mod statistics;

pub use regions::{
    coalesce, in_region, overlap, sweep_events, CoordinateEvent, EventKind, Interval,
    IntervalError, Overlap,
};
pub use pileup::{GoodDepthTally, PileupSummary, Strand, StrandDepth};
pub use filters::{ConsensusCaller, FilterDescription, FilterOutcome, StaticFilters};
pub use types::{AltDepth, AlternateAlleles, Genotype, ParseGenotypeError, VariantRecord};
pub use synthesizer::{RecordSynthesizer, SynthesizerConfig};
pub use vcf::{
    format_string, render_record, render_vcf, FormatField, SingleSampleWriter, VcfError,
    VcfHeader, FORMAT_FIELDS,
};
pub use io::{
    read_snp_list, read_vcf_positions, write_reference_snp_file, write_snp_list, SnpIoError,
    SnpKey,
};
pub use statistics::{sequence_distance, LengthMismatch};
