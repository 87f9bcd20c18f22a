use crate::error::ModelIoError;
use cropyield_core::error::TensorResult;
use cropyield_core::{FeatureFrame, FeatureSchema, Tensor};
use cropyield_metrics::RegressionReport;
use cropyield_pipeline::{ModelKind, Pipeline};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Bumped whenever the artifact layout changes incompatibly.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// A fitted preprocessing + regressor pipeline with the metadata needed to
/// serve it: the column schema it was trained on, the target name and the
/// held-out scores that got it selected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineArtifact {
    pub format_version: u32,
    pub model_kind: ModelKind,
    pub schema: FeatureSchema,
    pub target_column: String,
    pub evaluation: RegressionReport,
    pub pipeline: Pipeline,
}

impl PipelineArtifact {
    pub fn new(
        pipeline: Pipeline,
        schema: FeatureSchema,
        target_column: impl Into<String>,
        evaluation: RegressionReport,
    ) -> Self {
        PipelineArtifact {
            format_version: ARTIFACT_FORMAT_VERSION,
            model_kind: pipeline.kind(),
            schema,
            target_column: target_column.into(),
            evaluation,
            pipeline,
        }
    }

    pub fn predict(&self, x: &FeatureFrame) -> TensorResult<Tensor<f64>> {
        self.pipeline.predict(x)
    }
}

#[derive(Deserialize)]
struct VersionProbe {
    format_version: u32,
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}

/// Write the artifact to `path`. The JSON goes to a temporary sibling file
/// first and is renamed into place, so readers never see a partial file.
///
/// The encoded bytes are decoded again before anything touches the disk.
/// JSON has no encoding for NaN or infinity, so an artifact holding one
/// is refused here instead of being written and failing at load time.
pub fn save_artifact<P: AsRef<Path>>(artifact: &PipelineArtifact, path: P) -> Result<(), ModelIoError> {
    let path = path.as_ref();
    let io_err = |source: std::io::Error| ModelIoError::Io {
        path: path.to_path_buf(),
        source,
    };

    let bytes = serde_json::to_vec(artifact).map_err(ModelIoError::Encode)?;
    serde_json::from_slice::<PipelineArtifact>(&bytes).map_err(ModelIoError::NotReloadable)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let tmp = temp_sibling(path);
    let write = || -> Result<(), ModelIoError> {
        let file = File::create(&tmp).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&bytes).map_err(io_err)?;
        writer.flush().map_err(io_err)?;
        writer.get_ref().sync_all().map_err(io_err)?;
        Ok(())
    };
    if let Err(e) = write() {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    fs::rename(&tmp, path).map_err(io_err)?;

    info!(path = %path.display(), kind = %artifact.model_kind, "saved model artifact");
    Ok(())
}

/// Read an artifact written by [`save_artifact`].
pub fn load_artifact<P: AsRef<Path>>(path: P) -> Result<PipelineArtifact, ModelIoError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ModelIoError::NotFound(path.to_path_buf()));
    }
    let bytes = fs::read(path).map_err(|source| ModelIoError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let corrupt = |source: serde_json::Error| ModelIoError::Corrupt {
        path: path.to_path_buf(),
        source,
    };

    let probe: VersionProbe = serde_json::from_slice(&bytes).map_err(corrupt)?;
    if probe.format_version != ARTIFACT_FORMAT_VERSION {
        return Err(ModelIoError::VersionMismatch {
            found: probe.format_version,
            expected: ARTIFACT_FORMAT_VERSION,
        });
    }
    let artifact: PipelineArtifact = serde_json::from_slice(&bytes).map_err(corrupt)?;
    debug!(path = %path.display(), kind = %artifact.model_kind, "loaded model artifact");
    Ok(artifact)
}
