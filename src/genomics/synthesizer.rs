use std::sync::Arc;

use crate::genomics::{
    AltDepth, AlternateAlleles, FilterOutcome, Genotype, PileupSummary, VariantRecord,
};

/// Per-run settings for record synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizerConfig {
    /// Emit the reference base in its original case instead of uppercase.
    pub preserve_ref_case: bool,
    /// Genotype written when a position fails one or more filters.
    pub failed_snp_gt: Genotype,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            preserve_ref_case: false,
            failed_snp_gt: Genotype::NoCall,
        }
    }
}

impl SynthesizerConfig {
    /// Keep soft-masked (lowercase) reference bases as they are.
    pub fn with_preserve_ref_case(mut self, enabled: bool) -> Self {
        self.preserve_ref_case = enabled;
        self
    }

    /// Set the genotype used for positions that fail filters.
    pub fn with_failed_snp_gt(mut self, genotype: Genotype) -> Self {
        self.failed_snp_gt = genotype;
        self
    }
}

/// Turns pileup summaries into single-sample variant records.
#[derive(Debug, Clone, Default)]
pub struct RecordSynthesizer {
    config: SynthesizerConfig,
}

impl RecordSynthesizer {
    /// Create a synthesizer with the given configuration.
    pub fn new(config: SynthesizerConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub fn config(&self) -> &SynthesizerConfig {
        &self.config
    }

    /// Build the record for one position.
    ///
    /// Expects `summary.most_common_good_bases` in canonical order.
    pub fn synthesize(&self, summary: &PileupSummary, filter: &FilterOutcome) -> VariantRecord {
        debug_assert!(summary.has_canonical_ordering());

        let upper_ref = summary.upper_reference();
        let reference = if self.config.preserve_ref_case {
            summary.reference_base
        } else {
            upper_ref
        };

        let (alternates, genotype, alt_depth) = match &summary.most_common_good_bases {
            None => (AlternateAlleles::NoneObserved, Genotype::NoCall, AltDepth::NoAlternates),
            Some(good_bases) => {
                let alt_bases: Vec<u8> = good_bases
                    .iter()
                    .copied()
                    .filter(|&base| base != upper_ref)
                    .collect();

                let (genotype, alt_depth) = if alt_bases.is_empty() {
                    (Genotype::Reference, AltDepth::NoAlternates)
                } else {
                    let genotype = if good_bases.first() == Some(&upper_ref) {
                        Genotype::Reference
                    } else {
                        Genotype::Alternate
                    };
                    let depths = alt_bases
                        .iter()
                        .map(|&base| summary.base_depth(base))
                        .collect();
                    (genotype, AltDepth::PerAllele(depths))
                };

                let genotype = if filter.is_failed() {
                    self.config.failed_snp_gt
                } else {
                    genotype
                };

                (AlternateAlleles::from_bases(alt_bases), genotype, alt_depth)
            }
        };

        VariantRecord {
            chrom: Arc::clone(&summary.chrom),
            position: summary.position,
            reference,
            alternates,
            genotype,
            raw_depth: summary.raw_depth,
            ref_depth: summary.base_depth(upper_ref),
            alt_depth,
            filter: filter.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genomics::{GoodDepthTally, StrandDepth};

    fn summary(reference: u8, raw_depth: u32, depths: &[(u8, u32, u32)]) -> PileupSummary {
        let mut tally = GoodDepthTally::new();
        for &(base, forward, reverse) in depths {
            tally.add(base, StrandDepth::new(forward, reverse));
        }
        PileupSummary::new("ID", 42, reference, raw_depth, tally)
    }

    #[test]
    fn alternate_called_when_most_frequent() {
        let record = RecordSynthesizer::default().synthesize(
            &summary(b'G', 14, &[(b'A', 4, 4), (b'G', 3, 3)]),
            &FilterOutcome::Pass,
        );
        assert_eq!(record.genotype, Genotype::Alternate);
        assert_eq!(record.alternates, AlternateAlleles::Observed(b"A".to_vec()));
        assert_eq!(record.ref_depth.total(), 6);
        assert_eq!(record.alt_depth.totals(), vec![8]);
        assert_eq!(record.filter.to_string(), "PASS");
    }

    #[test]
    fn reference_called_with_minor_alternate() {
        let record = RecordSynthesizer::default().synthesize(
            &summary(b'G', 14, &[(b'G', 7, 4), (b'A', 0, 3)]),
            &FilterOutcome::Pass,
        );
        assert_eq!(record.genotype, Genotype::Reference);
        assert_eq!(
            record.alt_depth,
            AltDepth::PerAllele(vec![StrandDepth::new(0, 3)])
        );
        assert_eq!(record.ref_depth, StrandDepth::new(7, 4));
    }

    #[test]
    fn no_good_depth_is_uncalled() {
        let synthesizer = RecordSynthesizer::new(
            SynthesizerConfig::default().with_failed_snp_gt(Genotype::Alternate),
        );
        let record = synthesizer.synthesize(
            &summary(b'G', 0, &[]),
            &FilterOutcome::from_reasons(["Fail"]),
        );
        assert_eq!(record.genotype, Genotype::NoCall);
        assert_eq!(record.alternates, AlternateAlleles::NoneObserved);
        assert_eq!(record.alt_depth, AltDepth::NoAlternates);
        assert_eq!(record.ref_depth.total(), 0);
    }

    #[test]
    fn lowercase_reference_is_uppercased_by_default() {
        let record = RecordSynthesizer::default().synthesize(
            &summary(b'g', 14, &[(b'G', 7, 7)]),
            &FilterOutcome::Pass,
        );
        assert_eq!(record.reference, b'G');
        assert_eq!(record.genotype, Genotype::Reference);
        assert_eq!(record.alternates, AlternateAlleles::NoneObserved);
        assert_eq!(record.ref_depth.total(), 14);
    }

    #[test]
    fn failed_filter_overrides_reference_only_call() {
        let synthesizer = RecordSynthesizer::new(
            SynthesizerConfig::default().with_failed_snp_gt(Genotype::NoCall),
        );
        let record = synthesizer.synthesize(
            &summary(b'G', 14, &[(b'G', 7, 7)]),
            &FilterOutcome::from_reasons(["LowDepth"]),
        );
        assert_eq!(record.genotype, Genotype::NoCall);
        assert_eq!(record.alt_depth, AltDepth::NoAlternates);
    }
}
