//! Stage Ports - 外部协作者（拆分器 / 合成器）
//!
//! 两个阶段都是不透明的外部过程：给定输入路径与输出目录，
//! 成功的唯一判据是零退出码。

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// 流水线阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Split,
    Synthesize,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Split => "split",
            Stage::Synthesize => "synthesize",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 阶段执行错误
#[derive(Debug, Error)]
pub enum StageError {
    #[error("{stage} stage could not be started: {message}")]
    Spawn { stage: Stage, message: String },

    #[error("{stage} stage exited with {}: {stderr}", exit_label(.code))]
    NonZeroExit {
        stage: Stage,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{stage} stage timed out after {secs}s")]
    Timeout { stage: Stage, secs: u64 },

    #[error("{stage} stage failed: {message}")]
    Failed { stage: Stage, message: String },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "signal".to_string(),
    }
}

/// 段落拆分器
#[async_trait]
pub trait SplitterPort: Send + Sync {
    /// 将 `input_file` 拆分为 `output_dir/{ordinal}.txt`
    async fn split(&self, input_file: &Path, output_dir: &Path) -> Result<(), StageError>;
}

/// 语音合成器
#[async_trait]
pub trait SynthesizerPort: Send + Sync {
    /// 将 `paragraphs_dir/{ordinal}.txt` 合成为 `audio_dir/{ordinal}.wav`
    async fn synthesize(&self, paragraphs_dir: &Path, audio_dir: &Path) -> Result<(), StageError>;
}
