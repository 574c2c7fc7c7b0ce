use thiserror::Error;

/// Aligned sequences of different lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("sequences differ in length ({left} vs {right})")]
pub struct LengthMismatch {
    /// Length of the first sequence.
    pub left: usize,
    /// Length of the second sequence.
    pub right: usize,
}

/// Count nucleotide differences between two aligned sequences.
///
/// Positions where either base is outside `ACGT` (or `ACGTacgt` when
/// `case_insensitive` is false) are skipped. Both sequences must have the
/// same length.
pub fn sequence_distance(
    seq1: &[u8],
    seq2: &[u8],
    case_insensitive: bool,
) -> Result<usize, LengthMismatch> {
    if seq1.len() != seq2.len() {
        return Err(LengthMismatch {
            left: seq1.len(),
            right: seq2.len(),
        });
    }

    let allowed = |base: u8| match base {
        b'A' | b'C' | b'G' | b'T' => true,
        b'a' | b'c' | b'g' | b't' => !case_insensitive,
        _ => false,
    };
    let normalize = |base: u8| {
        if case_insensitive {
            base.to_ascii_uppercase()
        } else {
            base
        }
    };

    Ok(seq1
        .iter()
        .zip(seq2)
        .map(|(&a, &b)| (normalize(a), normalize(b)))
        .filter(|&(a, b)| allowed(a) && allowed(b) && a != b)
        .count())
}
