//! Single-sample VCF 4.2 serialization.
//!
//! [`VcfHeader`] renders the fixed header block, and [`SingleSampleWriter`]
//! owns the output sink, writes the header once on construction and then one
//! tab-separated line per [`VariantRecord`].

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::{Local, NaiveDate};
use thiserror::Error;
use tracing::{debug, info};

use crate::genomics::{ConsensusCaller, FilterDescription, StrandDepth, VariantRecord};

const FILE_FORMAT: &str = "VCFv4.2";
const SOURCE: &str = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"));
const INFO_NS: &str =
    r#"##INFO=<ID=NS,Number=1,Type=Integer,Description="Number of samples with data">"#;
const COLUMNS: &str = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT";

/// Declaration of one per-call FORMAT field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatField {
    /// Field identifier.
    pub id: &'static str,
    /// VCF `Number` attribute.
    pub number: &'static str,
    /// VCF `Type` attribute.
    pub kind: &'static str,
    /// Header description.
    pub description: &'static str,
}

/// Per-call fields in the order they appear in every record.
pub const FORMAT_FIELDS: [FormatField; 9] = [
    FormatField {
        id: "GT",
        number: "1",
        kind: "String",
        description: "Genotype",
    },
    FormatField {
        id: "SDP",
        number: "1",
        kind: "Integer",
        description: "Raw read depth",
    },
    FormatField {
        id: "RD",
        number: "1",
        kind: "Integer",
        description: "Depth of reference-supporting bases",
    },
    FormatField {
        id: "AD",
        number: "A",
        kind: "Integer",
        description: "Depth of variant-supporting bases (comma-separated depth per alt allele)",
    },
    FormatField {
        id: "RDF",
        number: "1",
        kind: "Integer",
        description: "Depth of reference-supporting bases on forward strand",
    },
    FormatField {
        id: "RDR",
        number: "1",
        kind: "Integer",
        description: "Depth of reference-supporting bases on reverse strand",
    },
    FormatField {
        id: "ADF",
        number: "A",
        kind: "Integer",
        description: "Depth of variant-supporting bases on forward strand (comma-separated depth per alt allele)",
    },
    FormatField {
        id: "ADR",
        number: "A",
        kind: "Integer",
        description: "Depth of variant-supporting bases on reverse strand (comma-separated depth per alt allele)",
    },
    FormatField {
        id: "FT",
        number: "1",
        kind: "String",
        description: "Genotype filters using the same codes as the FILTER data element",
    },
];

/// FORMAT column value shared by every record, e.g. `GT:SDP:...:FT`.
pub fn format_string() -> String {
    FORMAT_FIELDS
        .iter()
        .map(|field| field.id)
        .collect::<Vec<_>>()
        .join(":")
}

/// Errors raised while writing VCF output.
#[derive(Debug, Error)]
pub enum VcfError {
    /// Output file could not be created.
    #[error("failed to create VCF file {path}: {source}")]
    Create {
        /// Path that could not be opened.
        path: String,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// Write or flush to the sink failed.
    #[error("failed to write VCF output: {0}")]
    Io(#[from] io::Error),
    /// Rendered output was not valid UTF-8.
    #[error("rendered VCF is not valid UTF-8")]
    Utf8,
}

/// Header metadata for a single-sample VCF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcfHeader {
    /// Sample name for the last header column.
    pub sample_id: String,
    /// Reference name for the `##reference` line.
    pub reference: String,
    /// Caller filters, declared after `PASS`.
    pub filters: Vec<FilterDescription>,
    /// Creation date for `##fileDate`.
    pub file_date: NaiveDate,
}

impl VcfHeader {
    /// Header for `sample_id` dated today, with filters from `caller`.
    pub fn new(
        sample_id: impl Into<String>,
        reference: impl Into<String>,
        caller: &dyn ConsensusCaller,
    ) -> Self {
        Self {
            sample_id: sample_id.into(),
            reference: reference.into(),
            filters: caller.filter_descriptions(),
            file_date: Local::now().date_naive(),
        }
    }

    /// Override the `##fileDate` value.
    pub fn with_file_date(mut self, file_date: NaiveDate) -> Self {
        self.file_date = file_date;
        self
    }

    /// Write the complete header block, newline-terminated, to `sink`.
    pub fn write_to<W: Write>(&self, sink: &mut W) -> io::Result<()> {
        writeln!(sink, "##fileformat={FILE_FORMAT}")?;
        writeln!(sink, "##fileDate={}", self.file_date.format("%Y%m%d"))?;
        writeln!(sink, "##source={SOURCE}")?;
        writeln!(sink, "{INFO_NS}")?;
        let pass = FilterDescription::new("PASS", "All filters passed");
        for filter in std::iter::once(&pass).chain(self.filters.iter()) {
            writeln!(
                sink,
                "##FILTER=<ID={},Description=\"{}\">",
                filter.name, filter.description
            )?;
        }
        for field in FORMAT_FIELDS {
            writeln!(
                sink,
                "##FORMAT=<ID={},Number={},Type={},Description=\"{}\">",
                field.id, field.number, field.kind, field.description
            )?;
        }
        writeln!(sink, "##reference={}", self.reference)?;
        writeln!(sink, "{COLUMNS}\t{}", self.sample_id)
    }

    /// Render the complete header block into a string.
    pub fn render(&self) -> Result<String, VcfError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        String::from_utf8(buffer).map_err(|_| VcfError::Utf8)
    }
}

/// Render one record as a VCF body line, without the trailing newline.
pub fn render_record(record: &VariantRecord) -> String {
    let data = [
        record.genotype.to_string(),
        record.raw_depth.to_string(),
        record.ref_depth.total().to_string(),
        record.alt_depth.render(StrandDepth::total),
        record.ref_depth.forward.to_string(),
        record.ref_depth.reverse.to_string(),
        record.alt_depth.render(|depth| depth.forward),
        record.alt_depth.render(|depth| depth.reverse),
        record.filter.to_string(),
    ]
    .join(":");

    format!(
        "{chrom}\t{pos}\t.\t{reference}\t{alt}\t.\t{filter}\tNS=1\t{format}\t{data}",
        chrom = record.chrom,
        pos = record.position,
        reference = record.reference as char,
        alt = record.alternates,
        filter = record.filter,
        format = format_string(),
    )
}

/// VCF writer for a single sample.
///
/// The sink is buffered and owned exclusively. [`SingleSampleWriter::finish`]
/// flushes and hands it back; if the writer is dropped early (for example
/// when an error is propagated with `?`) the buffer is still flushed on a
/// best-effort basis.
#[derive(Debug)]
pub struct SingleSampleWriter<W: Write> {
    sink: Option<BufWriter<W>>,
    records_written: usize,
}

impl SingleSampleWriter<File> {
    /// Create `path` and write the header to it.
    pub fn create<P: AsRef<Path>>(path: P, header: &VcfHeader) -> Result<Self, VcfError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| VcfError::Create {
            path: path.display().to_string(),
            source,
        })?;
        info!(path = %path.display(), sample = %header.sample_id, "writing consensus VCF");
        Self::new(file, header)
    }
}

impl<W: Write> SingleSampleWriter<W> {
    /// Wrap `sink` and write the header.
    pub fn new(sink: W, header: &VcfHeader) -> Result<Self, VcfError> {
        let mut sink = BufWriter::new(sink);
        header.write_to(&mut sink)?;
        debug!(
            sample = %header.sample_id,
            filters = header.filters.len(),
            "wrote VCF header"
        );
        Ok(Self {
            sink: Some(sink),
            records_written: 0,
        })
    }

    /// Append one record line.
    pub fn write_record(&mut self, record: &VariantRecord) -> Result<(), VcfError> {
        let line = render_record(record);
        let sink = self.sink_mut()?;
        sink.write_all(line.as_bytes())?;
        sink.write_all(b"\n")?;
        self.records_written += 1;
        Ok(())
    }

    /// Number of records written so far.
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Flush the buffer and return the underlying sink.
    pub fn finish(mut self) -> Result<W, VcfError> {
        let sink = self.sink.take().ok_or_else(closed_error)?;
        debug!(records = self.records_written, "closing VCF writer");
        sink.into_inner().map_err(|err| VcfError::Io(err.into_error()))
    }

    fn sink_mut(&mut self) -> Result<&mut BufWriter<W>, VcfError> {
        self.sink.as_mut().ok_or_else(closed_error)
    }
}

fn closed_error() -> VcfError {
    VcfError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "VCF writer already closed"))
}

impl<W: Write> Drop for SingleSampleWriter<W> {
    fn drop(&mut self) {
        if let Some(mut sink) = self.sink.take() {
            if let Err(err) = sink.flush() {
                tracing::warn!(error = %err, "failed to flush VCF writer on drop");
            }
        }
    }
}

/// Render a full VCF (header and records) into a string.
pub fn render_vcf(header: &VcfHeader, records: &[VariantRecord]) -> Result<String, VcfError> {
    let mut writer = SingleSampleWriter::new(Vec::new(), header)?;
    for record in records {
        writer.write_record(record)?;
    }
    let buffer = writer.finish()?;
    String::from_utf8(buffer).map_err(|_| VcfError::Utf8)
}
