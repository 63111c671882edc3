pub type PipelineResult<T> = Result<T, PipelineError>;

/// Error taxonomy for the pipeline. Each stage fails explicitly with enough
/// context (which slide, which external call) to diagnose the run.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// Document yields no extractable text, or the narration script is empty.
    /// Raised before any media file is written.
    #[error("input error: {0}")]
    Input(String),

    /// Invalid numeric parameter. Raised before any external capability runs.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An external rendering, generation or speech-synthesis call failed.
    /// Fatal for the whole run.
    #[error("asset generation failed for {asset}: {detail}")]
    AssetGeneration { asset: String, detail: String },

    /// Final video write failed. The partial file is removed; nothing is left
    /// at the output path.
    #[error("encoding error: {0}")]
    Encoding(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PipelineError {
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn asset(asset: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::AssetGeneration {
            asset: asset.into(),
            detail: detail.into(),
        }
    }

    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        Self::Other(anyhow::Error::new(err))
    }
}
