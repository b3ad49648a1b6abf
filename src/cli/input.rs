use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::{PharmaGuardError, VcfError};
use crate::sources::vcf::MAX_VCF_BYTES;

/// Reads a `.vcf` or `.vcf.gz` file into text, enforcing the upload limits.
///
/// The size limit applies to the file on disk and, for gzip input, to the
/// decompressed text as well.
pub async fn read_vcf_file(path: &Path) -> Result<String, PharmaGuardError> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_file() => metadata,
        Ok(_) => return Err(PharmaGuardError::MissingFile(path.display().to_string())),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(PharmaGuardError::MissingFile(path.display().to_string()));
        }
        Err(err) => return Err(err.into()),
    };

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let gzipped = name.ends_with(".vcf.gz");
    if !gzipped && !name.ends_with(".vcf") {
        return Err(PharmaGuardError::InvalidFileType(
            path.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string()),
        ));
    }

    let size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
    if size > MAX_VCF_BYTES {
        return Err(VcfError::TooLarge { bytes: size }.into());
    }

    let bytes = tokio::fs::read(path).await?;
    debug!(path = %path.display(), bytes = bytes.len(), gzipped, "read VCF file");
    if gzipped {
        gunzip(&bytes)
    } else {
        Ok(String::from_utf8_lossy(&bytes).to_string())
    }
}

fn gunzip(bytes: &[u8]) -> Result<String, PharmaGuardError> {
    let gz = flate2::read::GzDecoder::new(bytes);
    let mut out: Vec<u8> = Vec::new();
    gz.take(MAX_VCF_BYTES as u64 + 1).read_to_end(&mut out)?;
    if out.len() > MAX_VCF_BYTES {
        return Err(VcfError::TooLarge { bytes: out.len() }.into());
    }
    Ok(String::from_utf8_lossy(&out).to_string())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::Compression;
    use flate2::write::GzEncoder;

    use super::*;
    use crate::utils::cache::scratch_dir;

    const SMALL_VCF: &str = "##fileformat=VCFv4.2\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n";

    #[tokio::test]
    async fn missing_file_is_reported_before_extension() {
        let dir = scratch_dir("input-missing");
        let err = read_vcf_file(&dir.join("absent.txt"))
            .await
            .expect_err("missing");
        assert_eq!(err.code(), "MISSING_FILE");
    }

    #[tokio::test]
    async fn rejects_non_vcf_extension() {
        let dir = scratch_dir("input-ext");
        tokio::fs::create_dir_all(&dir).await.expect("mkdir");
        let path = dir.join("patient.txt");
        tokio::fs::write(&path, SMALL_VCF).await.expect("write");

        let err = read_vcf_file(&path).await.expect_err("wrong extension");
        assert_eq!(err.code(), "INVALID_VCF");
        assert!(err.to_string().contains("patient.txt"));
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn rejects_oversized_file() {
        let dir = scratch_dir("input-large");
        tokio::fs::create_dir_all(&dir).await.expect("mkdir");
        let path = dir.join("big.VCF");
        tokio::fs::write(&path, vec![b'#'; MAX_VCF_BYTES + 1])
            .await
            .expect("write");

        let err = read_vcf_file(&path).await.expect_err("too large");
        assert_eq!(err.code(), "FILE_TOO_LARGE");
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn reads_plain_and_gzipped_vcf() {
        let dir = scratch_dir("input-gz");
        tokio::fs::create_dir_all(&dir).await.expect("mkdir");

        let plain = dir.join("sample.vcf");
        tokio::fs::write(&plain, SMALL_VCF).await.expect("write plain");
        assert_eq!(read_vcf_file(&plain).await.expect("plain"), SMALL_VCF);

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(SMALL_VCF.as_bytes()).expect("gzip write");
        let compressed = encoder.finish().expect("gzip finish");
        let gz = dir.join("sample.vcf.gz");
        tokio::fs::write(&gz, compressed).await.expect("write gz");
        assert_eq!(read_vcf_file(&gz).await.expect("gz"), SMALL_VCF);

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[test]
    fn gunzip_enforces_decompressed_limit() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
        encoder
            .write_all(&vec![b'A'; MAX_VCF_BYTES + 10])
            .expect("gzip write");
        let compressed = encoder.finish().expect("gzip finish");

        let err = gunzip(&compressed).expect_err("too large");
        assert_eq!(err.code(), "FILE_TOO_LARGE");
    }
}
