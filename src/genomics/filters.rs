use std::fmt;

/// Name and description of a filter declared in the VCF header.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterDescription {
    /// Filter identifier, as used in the FILTER and FT columns.
    pub name: String,
    /// Free-text description for the header line.
    pub description: String,
}

impl FilterDescription {
    /// Construct a filter description.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Consensus caller collaborator.
///
/// Implementations own the thresholding that decides the good-base ordering
/// and which filters fail at a position. The serializer only needs the list
/// of filters they may report.
pub trait ConsensusCaller {
    /// Filters this caller may report, in header order.
    fn filter_descriptions(&self) -> Vec<FilterDescription>;
}

/// Fixed list of filters, for callers configured outside this crate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticFilters(pub Vec<FilterDescription>);

impl ConsensusCaller for StaticFilters {
    fn filter_descriptions(&self) -> Vec<FilterDescription> {
        self.0.clone()
    }
}

/// Result of applying the consensus caller's filters to one position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FilterOutcome {
    /// Every filter passed.
    #[default]
    Pass,
    /// One or more filters failed, in the order the caller reported them.
    Failed(Vec<String>),
}

impl FilterOutcome {
    /// Build an outcome from failure reasons; no reasons means [`FilterOutcome::Pass`].
    pub fn from_reasons<I, S>(reasons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let reasons: Vec<String> = reasons.into_iter().map(Into::into).collect();
        if reasons.is_empty() {
            Self::Pass
        } else {
            Self::Failed(reasons)
        }
    }

    /// Whether any filter failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(reasons) if !reasons.is_empty())
    }

    /// Failure reasons, empty on pass.
    pub fn reasons(&self) -> &[String] {
        match self {
            Self::Pass => &[],
            Self::Failed(reasons) => reasons,
        }
    }
}

impl fmt::Display for FilterOutcome {
    /// `PASS`, or the failure reasons joined by `;`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_failed() {
            f.write_str(&self.reasons().join(";"))
        } else {
            f.write_str("PASS")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_reasons_pass() {
        let outcome = FilterOutcome::from_reasons(Vec::<String>::new());
        assert_eq!(outcome, FilterOutcome::Pass);
        assert!(!outcome.is_failed());
        assert_eq!(outcome.to_string(), "PASS");
    }

    #[test]
    fn reasons_join_in_order() {
        let outcome = FilterOutcome::from_reasons(["LowDepth", "StrandBias"]);
        assert!(outcome.is_failed());
        assert_eq!(outcome.to_string(), "LowDepth;StrandBias");
    }

    #[test]
    fn static_filters_report_verbatim() {
        let caller = StaticFilters(vec![FilterDescription::new("LowDepth", "Depth below 10")]);
        assert_eq!(caller.filter_descriptions()[0].name, "LowDepth");
    }
}
