use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use rust_htslib::bcf::{self, Read};
use rust_htslib::faidx;
use thiserror::Error;
use tracing::debug;

/// Contig and 1-based position identifying a SNP site.
pub type SnpKey = (String, u32);

/// Errors from reading or writing SNP position files.
#[derive(Debug, Error)]
pub enum SnpIoError {
    /// File could not be opened, read or written.
    #[error("{path}: {source}")]
    Io {
        /// Path being accessed.
        path: String,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// htslib failed to parse a VCF.
    #[error("VCF parse error: {0}")]
    Htslib(#[from] rust_htslib::errors::Error),
    /// VCF record without a contig.
    #[error("VCF record at position {0} has no contig")]
    MissingContig(i64),
    /// Position that does not fit a 1-based `u32` coordinate, or lies
    /// outside its reference contig.
    #[error("{chrom}: position {position} is out of range")]
    PositionOutOfRange {
        /// Contig name.
        chrom: String,
        /// Offending position as read from the input.
        position: i64,
    },
    /// Reference FASTA index lists more contigs than htslib can address.
    #[error("reference has too many contigs ({0})")]
    TooManyContigs(u64),
    /// Malformed SNP list line.
    #[error("line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// Description of the problem.
        message: String,
    },
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> SnpIoError + '_ {
    move |source| SnpIoError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn one_based(chrom: &str, pos: i64) -> Result<u32, SnpIoError> {
    pos.checked_add(1)
        .and_then(|pos| u32::try_from(pos).ok())
        .ok_or_else(|| SnpIoError::PositionOutOfRange {
            chrom: chrom.to_string(),
            position: pos,
        })
}

/// Collect the `(CHROM, POS)` key of every record in a VCF file.
pub fn read_vcf_positions<P: AsRef<Path>>(path: P) -> Result<BTreeSet<SnpKey>, SnpIoError> {
    let mut reader = bcf::Reader::from_path(path.as_ref())?;
    let mut positions = BTreeSet::new();

    for record in reader.records() {
        let record = record?;
        let rid = record.rid().ok_or(SnpIoError::MissingContig(record.pos()))?;
        let chrom = String::from_utf8_lossy(record.header().rid2name(rid)?).into_owned();
        let pos = one_based(&chrom, record.pos())?;
        positions.insert((chrom, pos));
    }

    debug!(path = %path.as_ref().display(), sites = positions.len(), "read VCF positions");
    Ok(positions)
}

/// Write the SNP list: one `chrom\tpos\tcount\tsample...` line per site, in
/// sorted site order.
pub fn write_snp_list<P: AsRef<Path>>(
    path: P,
    sites: &BTreeMap<SnpKey, Vec<String>>,
) -> Result<(), SnpIoError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(io_error(path))?;
    let mut writer = BufWriter::new(file);

    for ((chrom, pos), samples) in sites {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}",
            chrom,
            pos,
            samples.len(),
            samples.join("\t")
        )
        .map_err(io_error(path))?;
    }

    writer.flush().map_err(io_error(path))?;
    debug!(path = %path.display(), sites = sites.len(), "wrote SNP list");
    Ok(())
}

/// Read the contig and position columns of a SNP list, in file order.
pub fn read_snp_list<P: AsRef<Path>>(path: P) -> Result<Vec<SnpKey>, SnpIoError> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path).map_err(io_error(path))?);
    let mut sites = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(io_error(path))?;
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = line.split_whitespace();
        let (Some(chrom), Some(pos)) = (fields.next(), fields.next()) else {
            return Err(SnpIoError::Parse {
                line: idx + 1,
                message: "expected contig and position".to_string(),
            });
        };
        let pos = pos.parse::<u32>().map_err(|_| SnpIoError::Parse {
            line: idx + 1,
            message: format!("invalid position '{pos}'"),
        })?;
        sites.push((chrom.to_string(), pos));
    }

    Ok(sites)
}

/// Write the reference bases at every SNP list position as FASTA.
///
/// One record per reference contig, in sorted contig name order, holding the
/// uppercased bases at that contig's SNP list positions in file order.
/// Contigs without SNPs get an empty record; SNP list contigs missing from
/// the reference are ignored. The FASTA index is built if absent.
pub fn write_reference_snp_file<P, Q, R>(
    reference_fasta: P,
    snp_list: Q,
    out: R,
) -> Result<(), SnpIoError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    R: AsRef<Path>,
{
    let sites = read_snp_list(snp_list)?;
    let reference = faidx::Reader::from_path(reference_fasta.as_ref())?;

    let n_seqs = reference.n_seqs();
    let n_seqs = i32::try_from(n_seqs).map_err(|_| SnpIoError::TooManyContigs(n_seqs))?;
    let mut contigs = (0..n_seqs)
        .map(|idx| reference.seq_name(idx))
        .collect::<Result<Vec<String>, _>>()?;
    contigs.sort();

    let path = out.as_ref();
    let file = File::create(path).map_err(io_error(path))?;
    let mut writer = BufWriter::new(file);

    for contig in &contigs {
        let mut bases = String::new();
        for (_, pos) in sites.iter().filter(|(chrom, _)| chrom == contig) {
            let out_of_range = || SnpIoError::PositionOutOfRange {
                chrom: contig.clone(),
                position: i64::from(*pos),
            };
            let offset = pos.checked_sub(1).ok_or_else(out_of_range)? as usize;
            let base = reference.fetch_seq_string(contig, offset, offset)?;
            if base.is_empty() {
                return Err(out_of_range());
            }
            bases.push_str(&base.to_ascii_uppercase());
        }
        write_fasta_record(&mut writer, contig, &bases).map_err(io_error(path))?;
    }

    writer.flush().map_err(io_error(path))?;
    debug!(
        path = %path.display(),
        contigs = contigs.len(),
        sites = sites.len(),
        "wrote reference SNP sequences"
    );
    Ok(())
}

const FASTA_LINE_WIDTH: usize = 60;

fn write_fasta_record<W: Write>(writer: &mut W, id: &str, sequence: &str) -> io::Result<()> {
    writeln!(writer, ">{id}")?;
    for line in sequence.as_bytes().chunks(FASTA_LINE_WIDTH) {
        writer.write_all(line)?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("snpcons-io-{}-{}", std::process::id(), name))
    }

    #[test]
    fn snp_list_round_trips_positions() {
        let path = temp_path("snplist.txt");
        let mut sites = BTreeMap::new();
        sites.insert(("chr2".to_string(), 7), vec!["s1".to_string()]);
        sites.insert(
            ("chr1".to_string(), 100),
            vec!["s1".to_string(), "s2".to_string()],
        );

        write_snp_list(&path, &sites).expect("write");
        let text = std::fs::read_to_string(&path).expect("read back");
        assert_eq!(text, "chr1\t100\t2\ts1\ts2\nchr2\t7\t1\ts1\n");
        assert_eq!(
            read_snp_list(&path).expect("parse"),
            vec![("chr1".to_string(), 100), ("chr2".to_string(), 7)]
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn snp_list_reports_bad_position() {
        let path = temp_path("bad-snplist.txt");
        std::fs::write(&path, "chr1\t10\t1\ts1\nchr1\tten\n").expect("write");
        match read_snp_list(&path) {
            Err(SnpIoError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other:?}"),
        }
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn vcf_positions_beyond_u32_are_rejected() {
        assert_eq!(one_based("chr1", 0).ok(), Some(1));
        assert_eq!(one_based("chr1", i64::from(u32::MAX) - 1).ok(), Some(u32::MAX));
        match one_based("chr1", i64::from(u32::MAX)) {
            Err(SnpIoError::PositionOutOfRange { chrom, position }) => {
                assert_eq!(chrom, "chr1");
                assert_eq!(position, i64::from(u32::MAX));
            }
            other => panic!("expected out-of-range error, got {other:?}"),
        }
        assert!(one_based("chr1", i64::MAX).is_err());
    }

    #[test]
    fn fasta_records_wrap_at_sixty_columns() {
        let mut out = Vec::new();
        write_fasta_record(&mut out, "empty", "").expect("write");
        write_fasta_record(&mut out, "long", &"A".repeat(61)).expect("write");
        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(text, format!(">empty\n>long\n{}\nA\n", "A".repeat(60)));
    }

    #[test]
    fn reference_snp_file_collects_bases_per_contig() {
        let fasta = temp_path("reference.fasta");
        let snps = temp_path("ref-snplist.txt");
        let out = temp_path("referenceSNPs.fasta");
        std::fs::write(&fasta, ">chrB\nacgtACGTac\n>chrA\nTTTTGGGGCC\n>chrC\nAAAA\n")
            .expect("write reference");
        std::fs::write(
            &snps,
            "chrB\t2\t1\ts1\nchrA\t5\t2\ts1\ts2\nchrB\t7\t1\ts2\nchrZ\t1\t1\ts3\nchrA\t1\t1\ts1\n",
        )
        .expect("write SNP list");

        write_reference_snp_file(&fasta, &snps, &out).expect("write reference SNPs");
        let text = std::fs::read_to_string(&out).expect("read back");
        assert_eq!(text, ">chrA\nGT\n>chrB\nCG\n>chrC\n");

        for path in [&fasta, &snps, &out] {
            let _ = std::fs::remove_file(path);
        }
        let _ = std::fs::remove_file(format!("{}.fai", fasta.display()));
    }

    #[test]
    fn reference_snp_file_rejects_positions_past_contig_end() {
        let fasta = temp_path("short.fasta");
        let snps = temp_path("short-snplist.txt");
        let out = temp_path("short-out.fasta");
        std::fs::write(&fasta, ">chr1\nACGT\n").expect("write reference");
        std::fs::write(&snps, "chr1\t9\t1\ts1\n").expect("write SNP list");

        match write_reference_snp_file(&fasta, &snps, &out) {
            Err(SnpIoError::PositionOutOfRange { chrom, position }) => {
                assert_eq!(chrom, "chr1");
                assert_eq!(position, 9);
            }
            other => panic!("expected out-of-range error, got {other:?}"),
        }

        for path in [&fasta, &snps, &out] {
            let _ = std::fs::remove_file(path);
        }
        let _ = std::fs::remove_file(format!("{}.fai", fasta.display()));
    }
}
