use crate::error::{Result, VectorStoreError};
use crate::flat_index::FlatIndex;
use crate::paths::{backup_path, staging_path, ArtifactLayout};
use ndarray::{Array2, ArrayView2};
use ndarray_npy::{ReadNpyExt, WriteNpyExt};
use std::path::{Path, PathBuf};

const INDEX_MAGIC: &[u8; 4] = b"RFI1";
const INDEX_HEADER_BYTES: usize = 4 + 4 + 8;

/// Index, id list and embedding matrix of one build.
#[derive(Debug, Clone)]
pub struct ArtifactBundle {
    pub index: FlatIndex,
    pub ids: Vec<String>,
    pub embeddings: Array2<f32>,
}

/// Reads and writes the three build artifacts in one directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
    layout: ArtifactLayout,
}

impl ArtifactStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self::with_layout(dir, ArtifactLayout::default())
    }

    pub fn with_layout(dir: impl AsRef<Path>, layout: ArtifactLayout) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            layout,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn layout(&self) -> &ArtifactLayout {
        &self.layout
    }

    pub fn index_path(&self) -> PathBuf {
        self.dir.join(&self.layout.index_file)
    }

    pub fn ids_path(&self) -> PathBuf {
        self.dir.join(&self.layout.ids_file)
    }

    pub fn embeddings_path(&self) -> PathBuf {
        self.dir.join(&self.layout.embeddings_file)
    }

    fn paths(&self) -> [PathBuf; 3] {
        [self.index_path(), self.ids_path(), self.embeddings_path()]
    }

    /// Whether all three artifacts are present
    pub async fn exists(&self) -> bool {
        for path in self.paths() {
            if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
                return false;
            }
        }
        true
    }

    /// Persist a consistent bundle.
    ///
    /// All three files are staged next to their targets and renamed into place
    /// only once every staged write has succeeded. A previous set is moved
    /// aside while the new one is installed and restored if installing fails.
    pub async fn save(
        &self,
        index: &FlatIndex,
        ids: &[String],
        embeddings: ArrayView2<'_, f32>,
    ) -> Result<()> {
        check_consistency(index, ids.len(), embeddings.dim())
            .map_err(VectorStoreError::InconsistentArtifacts)?;

        log::info!(
            "Saving {} vectors (dim {}) to {}",
            index.ntotal(),
            index.dimension(),
            self.dir.display()
        );
        tokio::fs::create_dir_all(&self.dir).await?;

        let mut npy = Vec::new();
        embeddings
            .write_npy(&mut npy)
            .map_err(|e| VectorStoreError::format(self.embeddings_path(), e))?;
        let payloads = [encode_index(index), serde_json::to_vec(ids)?, npy];

        let targets = self.paths();
        let staged: Vec<PathBuf> = targets.iter().map(|p| staging_path(p)).collect();

        for (tmp, bytes) in staged.iter().zip(&payloads) {
            if let Err(e) = tokio::fs::write(tmp, bytes).await {
                discard(&staged).await;
                return Err(e.into());
            }
        }

        let mut install = Install::default();
        for (tmp, target) in staged.iter().zip(&targets) {
            if let Err(e) = install.replace(tmp, target).await {
                log::warn!(
                    "Failed to install {}: {e}; restoring previous artifacts",
                    target.display()
                );
                install.rollback().await;
                discard(&staged).await;
                return Err(e.into());
            }
        }
        install.commit().await;

        log::info!("Artifacts saved to {}", self.dir.display());
        Ok(())
    }

    /// Load all three artifacts and check that they describe the same build.
    pub async fn load(&self) -> Result<ArtifactBundle> {
        let [index_path, ids_path, embeddings_path] = self.paths();
        for path in [&index_path, &ids_path, &embeddings_path] {
            if !tokio::fs::try_exists(path).await? {
                return Err(VectorStoreError::ArtifactMissing { path: path.clone() });
            }
        }
        log::info!("Loading artifacts from {}", self.dir.display());

        let bytes = tokio::fs::read(&index_path).await?;
        let index = decode_index(&bytes).map_err(|e| VectorStoreError::format(&index_path, e))?;

        let bytes = tokio::fs::read(&ids_path).await?;
        let ids: Vec<String> =
            serde_json::from_slice(&bytes).map_err(|e| VectorStoreError::format(&ids_path, e))?;

        let bytes = tokio::fs::read(&embeddings_path).await?;
        let embeddings = Array2::<f32>::read_npy(bytes.as_slice())
            .map_err(|e| VectorStoreError::format(&embeddings_path, e))?;

        check_consistency(&index, ids.len(), embeddings.dim())
            .map_err(|reason| VectorStoreError::format(&self.dir, reason))?;

        log::info!(
            "Loaded {} vectors (dim {})",
            index.ntotal(),
            index.dimension()
        );
        Ok(ArtifactBundle {
            index,
            ids,
            embeddings,
        })
    }
}

/// Targets replaced so far in one save, with the files they displaced.
#[derive(Default)]
struct Install {
    installed: Vec<PathBuf>,
    backups: Vec<(PathBuf, PathBuf)>,
}

impl Install {
    async fn replace(&mut self, staged: &Path, target: &Path) -> std::io::Result<()> {
        if tokio::fs::try_exists(target).await? {
            let backup = backup_path(target);
            tokio::fs::rename(target, &backup).await?;
            self.backups.push((backup, target.to_path_buf()));
        }
        tokio::fs::rename(staged, target).await?;
        self.installed.push(target.to_path_buf());
        Ok(())
    }

    async fn rollback(self) {
        for target in &self.installed {
            let _ = tokio::fs::remove_file(target).await;
        }
        for (backup, target) in &self.backups {
            if let Err(e) = tokio::fs::rename(backup, target).await {
                log::warn!("Failed to restore {}: {e}", target.display());
            }
        }
    }

    async fn commit(self) {
        for (backup, _) in &self.backups {
            let _ = tokio::fs::remove_file(backup).await;
        }
    }
}

async fn discard(staged: &[PathBuf]) {
    for tmp in staged {
        let _ = tokio::fs::remove_file(tmp).await;
    }
}

fn check_consistency(
    index: &FlatIndex,
    ids: usize,
    (rows, cols): (usize, usize),
) -> std::result::Result<(), String> {
    if ids != index.ntotal() {
        return Err(format!("{ids} ids for {} indexed vectors", index.ntotal()));
    }
    if rows != index.ntotal() {
        return Err(format!(
            "{rows} embedding rows for {} indexed vectors",
            index.ntotal()
        ));
    }
    if rows > 0 && cols != index.dimension() {
        return Err(format!(
            "embedding width {cols} differs from index dimension {}",
            index.dimension()
        ));
    }
    Ok(())
}

/// `RFI1` magic, u32 dimension, u64 row count, then row-major f32 (all little-endian).
pub fn encode_index(index: &FlatIndex) -> Vec<u8> {
    let vectors = index.vectors();
    let mut out = Vec::with_capacity(INDEX_HEADER_BYTES + vectors.len() * 4);
    out.extend_from_slice(INDEX_MAGIC);
    #[allow(clippy::cast_possible_truncation)]
    let dim = index.dimension() as u32;
    out.extend_from_slice(&dim.to_le_bytes());
    out.extend_from_slice(&(index.ntotal() as u64).to_le_bytes());
    // iter() walks in logical row-major order regardless of memory layout
    for v in vectors.iter() {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

pub fn decode_index(bytes: &[u8]) -> std::result::Result<FlatIndex, String> {
    if bytes.len() < INDEX_HEADER_BYTES || &bytes[0..4] != INDEX_MAGIC {
        return Err("not a flat index file".to_string());
    }
    let dim = u32::from_le_bytes(bytes[4..8].try_into().map_err(|_| "truncated header")?) as usize;
    let rows = u64::from_le_bytes(bytes[8..16].try_into().map_err(|_| "truncated header")?);
    let rows = usize::try_from(rows).map_err(|_| format!("row count {rows} out of range"))?;

    let expected_len = rows
        .checked_mul(dim)
        .and_then(|n| n.checked_mul(4))
        .and_then(|n| n.checked_add(INDEX_HEADER_BYTES))
        .ok_or_else(|| format!("{rows}x{dim} index overflows"))?;
    if bytes.len() != expected_len {
        return Err(format!(
            "expected {expected_len} bytes for {rows}x{dim} vectors, found {}",
            bytes.len()
        ));
    }

    let data: Vec<f32> = bytes[INDEX_HEADER_BYTES..]
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    let vectors = Array2::from_shape_vec((rows, dim), data).map_err(|e| e.to_string())?;
    Ok(FlatIndex::build(vectors))
}
