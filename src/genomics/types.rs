use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

use crate::genomics::{FilterOutcome, StrandDepth};

/// Per-sample genotype call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Genotype {
    /// Called as the reference allele (`0`).
    Reference,
    /// Called as the first alternate allele (`1`).
    Alternate,
    /// No call could be made (`.`).
    NoCall,
}

impl Genotype {
    /// VCF GT symbol.
    pub fn as_char(&self) -> char {
        match self {
            Genotype::Reference => '0',
            Genotype::Alternate => '1',
            Genotype::NoCall => '.',
        }
    }
}

impl fmt::Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Error parsing a genotype symbol.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid genotype '{0}', expected one of '.', '0', '1'")]
pub struct ParseGenotypeError(pub String);

impl FromStr for Genotype {
    type Err = ParseGenotypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0" => Ok(Genotype::Reference),
            "1" => Ok(Genotype::Alternate),
            "." => Ok(Genotype::NoCall),
            other => Err(ParseGenotypeError(other.to_string())),
        }
    }
}

/// Alternate alleles of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AlternateAlleles {
    /// No base other than the reference was observed (ALT renders as `.`).
    NoneObserved,
    /// Non-empty list of alternate bases, most frequent first.
    Observed(Vec<u8>),
}

impl AlternateAlleles {
    /// Wrap a base list, mapping an empty list to [`AlternateAlleles::NoneObserved`].
    pub fn from_bases(bases: Vec<u8>) -> Self {
        if bases.is_empty() {
            Self::NoneObserved
        } else {
            Self::Observed(bases)
        }
    }

    /// Alternate bases, empty when none were observed.
    pub fn bases(&self) -> &[u8] {
        match self {
            Self::NoneObserved => &[],
            Self::Observed(bases) => bases,
        }
    }
}

impl fmt::Display for AlternateAlleles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoneObserved => f.write_str("."),
            Self::Observed(bases) => {
                for (idx, &base) in bases.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", base as char)?;
                }
                Ok(())
            }
        }
    }
}

/// Alternate-allele depth of a record.
///
/// `NoAlternates` renders as a bare `0` in AD, ADF and ADR, which keeps it
/// distinct from a single alternate with zero depth.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AltDepth {
    /// No alternate alleles.
    NoAlternates,
    /// One entry per alternate allele, aligned with [`AlternateAlleles`].
    PerAllele(Vec<StrandDepth>),
}

impl AltDepth {
    /// Render one depth component (total, forward or reverse) for the FORMAT data.
    pub fn render(&self, component: impl Fn(&StrandDepth) -> u32) -> String {
        match self {
            AltDepth::NoAlternates => "0".to_string(),
            AltDepth::PerAllele(depths) => depths
                .iter()
                .map(|depth| component(depth).to_string())
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Combined depths per allele (AD).
    pub fn totals(&self) -> Vec<u32> {
        match self {
            AltDepth::NoAlternates => Vec::new(),
            AltDepth::PerAllele(depths) => depths.iter().map(StrandDepth::total).collect(),
        }
    }
}

/// Single-sample variant record for one position.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VariantRecord {
    /// Contig identifier.
    pub chrom: Arc<str>,
    /// 1-based position.
    pub position: u32,
    /// Reference allele, uppercase unless reference case is preserved.
    pub reference: u8,
    /// Alternate alleles.
    pub alternates: AlternateAlleles,
    /// Genotype call (GT).
    pub genotype: Genotype,
    /// Raw read depth (SDP).
    pub raw_depth: u32,
    /// Reference-supporting depth (RD, RDF, RDR).
    pub ref_depth: StrandDepth,
    /// Alternate-supporting depth (AD, ADF, ADR).
    pub alt_depth: AltDepth,
    /// Filter status (FILTER and FT).
    pub filter: FilterOutcome,
}
