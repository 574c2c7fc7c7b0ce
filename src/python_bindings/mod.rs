//! Python bindings that expose the region algebra via PyO3.
use pyo3::{exceptions::PyValueError, prelude::*, types::PyModule};

use crate::genomics::{self, Interval};

fn to_intervals(regions: Vec<(u64, u64)>) -> PyResult<Vec<Interval>> {
    regions
        .into_iter()
        .map(|(start, end)| {
            Interval::new(start, end).map_err(|err| PyValueError::new_err(err.to_string()))
        })
        .collect()
}

/// Coalesce overlapping or touching `(start, end)` regions.
///
/// Args:
///     regions: List of inclusive `(start, end)` tuples.
///
/// Returns:
///     Sorted list of disjoint `(start, end)` tuples.
#[pyfunction]
pub fn coalesce(regions: Vec<(u64, u64)>) -> PyResult<Vec<(u64, u64)>> {
    let intervals = to_intervals(regions)?;
    Ok(genomics::coalesce(&intervals)
        .into_iter()
        .map(|iv| (iv.start, iv.end))
        .collect())
}

/// Find regions covered by more than one input region.
///
/// Returns:
///     List of `(start, end, level)` tuples.
#[pyfunction]
pub fn overlap(regions: Vec<(u64, u64)>) -> PyResult<Vec<(u64, u64, usize)>> {
    let intervals = to_intervals(regions)?;
    Ok(genomics::overlap(&intervals)
        .into_iter()
        .map(|found| (found.interval.start, found.interval.end, found.level))
        .collect())
}

/// Whether `position` lies inside any region.
#[pyfunction]
pub fn in_region(position: u64, regions: Vec<(u64, u64)>) -> PyResult<bool> {
    let intervals = to_intervals(regions)?;
    Ok(genomics::in_region(position, &intervals))
}

/// Create Python module.
#[pymodule]
pub fn snpcons_py(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(coalesce, m)?)?;
    m.add_function(wrap_pyfunction!(overlap, m)?)?;
    m.add_function(wrap_pyfunction!(in_region, m)?)?;
    Ok(())
}
