use std::collections::BTreeMap;
use std::sync::Arc;

/// Read strand of an observed base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strand {
    /// Read aligned to the forward strand.
    Forward,
    /// Read aligned to the reverse strand.
    Reverse,
}

/// Quality-passing depth of one base, split by strand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StrandDepth {
    /// Depth on the forward strand.
    pub forward: u32,
    /// Depth on the reverse strand.
    pub reverse: u32,
}

impl StrandDepth {
    /// Construct from forward and reverse depth.
    pub fn new(forward: u32, reverse: u32) -> Self {
        Self { forward, reverse }
    }

    /// Combined depth over both strands.
    pub fn total(&self) -> u32 {
        self.forward + self.reverse
    }

    fn add(&mut self, other: StrandDepth) {
        self.forward += other.forward;
        self.reverse += other.reverse;
    }
}

/// Per-base tally of quality-passing observations at one position.
///
/// Bases are keyed in uppercase; the case of the observed symbol never
/// affects which bucket it lands in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoodDepthTally {
    depths: BTreeMap<u8, StrandDepth>,
}

impl GoodDepthTally {
    /// Create an empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one quality-passing observation of `base` on `strand`.
    pub fn observe(&mut self, base: u8, strand: Strand) {
        let entry = self.depths.entry(base.to_ascii_uppercase()).or_default();
        match strand {
            Strand::Forward => entry.forward += 1,
            Strand::Reverse => entry.reverse += 1,
        }
    }

    /// Add pre-aggregated depth for `base`.
    pub fn add(&mut self, base: u8, depth: StrandDepth) {
        self.depths
            .entry(base.to_ascii_uppercase())
            .or_default()
            .add(depth);
    }

    /// Depth recorded for `base` (zero when never observed).
    pub fn depth(&self, base: u8) -> StrandDepth {
        self.depths
            .get(&base.to_ascii_uppercase())
            .copied()
            .unwrap_or_default()
    }

    /// Bases with non-zero depth in canonical order: descending total depth,
    /// ties broken alphabetically. `None` when nothing passed.
    pub fn ranked_bases(&self) -> Option<Vec<u8>> {
        let mut ranked: Vec<(u8, u32)> = self
            .depths
            .iter()
            .map(|(&base, depth)| (base, depth.total()))
            .filter(|&(_, total)| total > 0)
            .collect();
        if ranked.is_empty() {
            return None;
        }
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        Some(ranked.into_iter().map(|(base, _)| base).collect())
    }
}

/// Base-depth summary of a single genomic position.
///
/// Produced by an upstream pileup collaborator. `most_common_good_bases`
/// must be in canonical order (descending good depth, alphabetical on ties)
/// and `None` exactly when no base passed the quality thresholds;
/// [`PileupSummary::new`] establishes this and
/// [`PileupSummary::has_canonical_ordering`] checks it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PileupSummary {
    /// Contig identifier.
    pub chrom: Arc<str>,
    /// 1-based position on the contig.
    pub position: u32,
    /// Reference base as it appears in the reference (lowercase is soft-masked).
    pub reference_base: u8,
    /// Depth of every read covering the position regardless of quality.
    pub raw_depth: u32,
    /// Quality-passing depth per uppercase base.
    pub good_depth: GoodDepthTally,
    /// Good bases in canonical order, or `None` when none passed.
    pub most_common_good_bases: Option<Vec<u8>>,
}

impl PileupSummary {
    /// Build a summary, deriving the canonical good-base ordering from the tally.
    pub fn new(
        chrom: impl Into<Arc<str>>,
        position: u32,
        reference_base: u8,
        raw_depth: u32,
        good_depth: GoodDepthTally,
    ) -> Self {
        let most_common_good_bases = good_depth.ranked_bases();
        Self {
            chrom: chrom.into(),
            position,
            reference_base,
            raw_depth,
            good_depth,
            most_common_good_bases,
        }
    }

    /// Reference base in uppercase, used for all depth comparisons.
    pub fn upper_reference(&self) -> u8 {
        self.reference_base.to_ascii_uppercase()
    }

    /// Quality-passing depth of `base`.
    pub fn base_depth(&self, base: u8) -> StrandDepth {
        self.good_depth.depth(base)
    }

    /// Whether `most_common_good_bases` honours the ordering contract.
    pub fn has_canonical_ordering(&self) -> bool {
        self.most_common_good_bases == self.good_depth.ranked_bases()
    }
}
