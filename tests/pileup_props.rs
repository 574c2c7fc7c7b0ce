use proptest::prelude::*;
use snpcons::genomics::{
    FilterOutcome, Genotype, GoodDepthTally, PileupSummary, RecordSynthesizer, Strand,
};

fn observations() -> impl Strategy<Value = Vec<(u8, bool)>> {
    proptest::collection::vec(
        (
            prop_oneof![
                Just(b'A'),
                Just(b'c'),
                Just(b'G'),
                Just(b't'),
                Just(b'N')
            ],
            any::<bool>(),
        ),
        0..48,
    )
}

fn tally(obs: &[(u8, bool)]) -> GoodDepthTally {
    let mut tally = GoodDepthTally::new();
    for &(base, reverse) in obs {
        let strand = if reverse { Strand::Reverse } else { Strand::Forward };
        tally.observe(base, strand);
    }
    tally
}

proptest! {
    #[test]
    fn ranking_is_depth_descending_then_alphabetical(obs in observations()) {
        let tally = tally(&obs);
        match tally.ranked_bases() {
            None => prop_assert!(obs.is_empty()),
            Some(ranked) => {
                for pair in ranked.windows(2) {
                    let (a, b) = (tally.depth(pair[0]).total(), tally.depth(pair[1]).total());
                    prop_assert!(a > b || (a == b && pair[0] < pair[1]));
                }
                let total: u32 = ranked.iter().map(|&base| tally.depth(base).total()).sum();
                prop_assert_eq!(total as usize, obs.len());
            }
        }
    }

    #[test]
    fn records_align_alternates_with_depths(
        obs in observations(),
        reference in prop_oneof![Just(b'A'), Just(b'g'), Just(b'T')],
    ) {
        let summary = PileupSummary::new("chr1", 7, reference, obs.len() as u32, tally(&obs));
        prop_assert!(summary.has_canonical_ordering());

        let record = RecordSynthesizer::default().synthesize(&summary, &FilterOutcome::Pass);
        let alternates = record.alternates.bases();
        prop_assert!(!alternates.contains(&reference.to_ascii_uppercase()));
        prop_assert_eq!(record.alt_depth.totals().len(), alternates.len());
        prop_assert_eq!(record.reference, reference.to_ascii_uppercase());
        if obs.is_empty() {
            prop_assert_eq!(record.genotype, Genotype::NoCall);
        }
    }
}
