//! Whole-contig access to an indexed reference FASTA.

use bio::io::fasta::IndexedReader;
use std::fs::File;
use std::path::Path;

use crate::core::error::{PileupError, Result};

/// Fetches uppercase contig sequences from a faidx-indexed FASTA file.
pub struct ContigReference {
    reader: IndexedReader<File>,
}

impl ContigReference {
    pub fn open<P: AsRef<Path>>(fasta: P) -> Result<Self> {
        let fasta = fasta.as_ref();
        if !fasta.exists() {
            return Err(PileupError::FileNotFound(format!(
                "FASTA file not found: {}",
                fasta.display()
            )));
        }

        let index_path = format!("{}.fai", fasta.display());
        if !Path::new(&index_path).exists() {
            return Err(PileupError::FileNotFound(format!(
                "FASTA index file not found: {index_path}. \
                 Please create it using: samtools faidx {}",
                fasta.display()
            )));
        }

        let reader = IndexedReader::from_file(&fasta).map_err(|e| {
            PileupError::ReferenceGenome(format!("failed to load FASTA index: {e:?}"))
        })?;
        Ok(ContigReference { reader })
    }

    /// Fetch one contig's full sequence, uppercased.
    pub fn contig(&mut self, name: &str) -> Result<Vec<u8>> {
        self.reader.fetch_all(name).map_err(|e| {
            PileupError::ReferenceGenome(format!("contig {name} not found in reference: {e:?}"))
        })?;
        let mut seq = Vec::new();
        self.reader.read(&mut seq).map_err(|e| {
            PileupError::ReferenceGenome(format!("failed to read contig {name}: {e:?}"))
        })?;
        seq.make_ascii_uppercase();
        Ok(seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_test_fasta(dir: &Path) -> std::path::PathBuf {
        let fasta_path = dir.join("ref.fa");
        let mut fasta = File::create(&fasta_path).unwrap();
        writeln!(fasta, ">chr1").unwrap();
        writeln!(fasta, "acgtacgtacgt").unwrap();
        writeln!(fasta, ">chr2").unwrap();
        writeln!(fasta, "GCTAGCTAGCTA").unwrap();

        let mut fai = File::create(dir.join("ref.fa.fai")).unwrap();
        writeln!(fai, "chr1\t12\t6\t12\t13").unwrap();
        writeln!(fai, "chr2\t12\t25\t12\t13").unwrap();

        fasta_path
    }

    #[test]
    fn fetches_uppercased_contigs() {
        let dir = tempfile::tempdir().unwrap();
        let fasta = write_test_fasta(dir.path());

        let mut reference = ContigReference::open(&fasta).unwrap();
        assert_eq!(reference.contig("chr1").unwrap(), b"ACGTACGTACGT");
        assert_eq!(reference.contig("chr2").unwrap(), b"GCTAGCTAGCTA");
        assert!(reference.contig("chr3").is_err());
    }

    #[test]
    fn reports_missing_index() {
        let dir = tempfile::tempdir().unwrap();
        let fasta_path = dir.path().join("noindex.fa");
        let mut fasta = File::create(&fasta_path).unwrap();
        writeln!(fasta, ">chr1").unwrap();
        writeln!(fasta, "ACGT").unwrap();

        assert!(matches!(
            ContigReference::open(&fasta_path),
            Err(PileupError::FileNotFound(_))
        ));
    }
}
