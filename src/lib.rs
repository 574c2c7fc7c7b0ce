//! # Consensus SNP records and genomic region algebra
//!
//! This library turns per-position base-depth summaries into single-sample
//! VCF 4.2 records and reduces genomic region masks.
//!
//! ## Components
//!
//! 1. **Interval algebra**: coalesce and overlap closed `[start, end]`
//!    intervals with a start-before-end event sweep
//! 2. **Record synthesis**: reference/alternate alleles, genotype and strand
//!    depths from a [`PileupSummary`] and its [`FilterOutcome`]
//! 3. **Serialization**: fixed header plus one tab-separated line per record
//!
//! ## Usage Example
//!
//! ```ignore
//! use snpcons::{RecordSynthesizer, SingleSampleWriter, SynthesizerConfig, VcfHeader};
//!
//! let header = VcfHeader::new("sample1", "reference.fasta", &caller);
//! let mut writer = SingleSampleWriter::create("consensus.vcf", &header)?;
//! let synthesizer = RecordSynthesizer::new(SynthesizerConfig::default());
//! for (summary, outcome) in positions {
//!     writer.write_record(&synthesizer.synthesize(&summary, &outcome))?;
//! }
//! writer.finish()?;
//! ```

#![warn(missing_docs, missing_debug_implementations)]

pub mod genomics;
/// Python bindings for the interval algebra.
#[cfg(feature = "python-bindings")]
pub mod python_bindings;

pub use genomics::{
    coalesce, in_region, overlap, FilterOutcome, Genotype, Interval, PileupSummary,
    RecordSynthesizer, SingleSampleWriter, SynthesizerConfig, VariantRecord, VcfHeader,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genomics::{render_vcf, GoodDepthTally, StaticFilters, StrandDepth};
    use chrono::NaiveDate;

    #[test]
    fn summary_to_vcf_line() {
        let mut tally = GoodDepthTally::new();
        tally.add(b'A', StrandDepth::new(4, 4));
        tally.add(b'G', StrandDepth::new(3, 3));
        let summary = PileupSummary::new("ID", 42, b'G', 14, tally);

        let record = RecordSynthesizer::default().synthesize(&summary, &FilterOutcome::Pass);
        let header = VcfHeader::new("SampleName", "RefName", &StaticFilters::default())
            .with_file_date(NaiveDate::from_ymd_opt(2020, 1, 2).expect("valid date"));
        let text = render_vcf(&header, &[record]).expect("render");

        assert_eq!(
            text.lines().last(),
            Some("ID\t42\t.\tG\tA\t.\tPASS\tNS=1\tGT:SDP:RD:AD:RDF:RDR:ADF:ADR:FT\t1:14:6:8:3:3:4:4:PASS")
        );
    }
}
