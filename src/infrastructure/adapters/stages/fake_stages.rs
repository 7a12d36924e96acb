//! Fake Stages - 进程内拆分器 / 合成器
//!
//! `pipeline.backend = "fake"` 时使用，无需外部脚本即可跑通整条流水线。

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Semaphore;

use crate::application::ports::{Stage, StageError, SplitterPort, SynthesizerPort};

const SAMPLE_RATE: u32 = 22_050;

/// 按空行拆分的拆分器
///
/// 输出 `1.txt`, `2.txt`, ... 每个非空段落一个文件
#[derive(Debug, Default)]
pub struct FakeSplitter {
    fail: bool,
}

impl FakeSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 总是失败的拆分器
    pub fn failing() -> Self {
        Self { fail: true }
    }
}

/// 以一个或多个空行为分隔
fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line.trim_end());
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n"));
    }

    paragraphs
}

#[async_trait]
impl SplitterPort for FakeSplitter {
    async fn split(&self, input_file: &Path, output_dir: &Path) -> Result<(), StageError> {
        if self.fail {
            return Err(StageError::Failed {
                stage: Stage::Split,
                message: "splitter configured to fail".to_string(),
            });
        }

        let data = fs::read(input_file).await.map_err(|e| failed(Stage::Split, e))?;
        let text = String::from_utf8_lossy(&data);

        fs::create_dir_all(output_dir)
            .await
            .map_err(|e| failed(Stage::Split, e))?;

        let paragraphs = split_paragraphs(&text);
        for (i, paragraph) in paragraphs.iter().enumerate() {
            let path = output_dir.join(format!("{}.txt", i + 1));
            fs::write(&path, paragraph)
                .await
                .map_err(|e| failed(Stage::Split, e))?;
        }

        tracing::debug!(paragraphs = paragraphs.len(), "Fake split finished");
        Ok(())
    }
}

/// 为每个段落写出一段静音 WAV 的合成器
///
/// 可选的 gate 用于测试中观察 `split` 中间状态：
/// 合成开始前需要从 gate 取得一个许可。
#[derive(Debug, Default)]
pub struct FakeSynthesizer {
    gate: Option<Arc<Semaphore>>,
    fail: bool,
}

impl FakeSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gate(gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            fail: false,
        }
    }

    /// 总是失败的合成器
    pub fn failing() -> Self {
        Self {
            gate: None,
            fail: true,
        }
    }
}

#[async_trait]
impl SynthesizerPort for FakeSynthesizer {
    async fn synthesize(&self, paragraphs_dir: &Path, audio_dir: &Path) -> Result<(), StageError> {
        if let Some(gate) = &self.gate {
            let permit = gate.acquire().await.map_err(|e| StageError::Failed {
                stage: Stage::Synthesize,
                message: e.to_string(),
            })?;
            permit.forget();
        }

        if self.fail {
            return Err(StageError::Failed {
                stage: Stage::Synthesize,
                message: "synthesizer configured to fail".to_string(),
            });
        }

        fs::create_dir_all(audio_dir)
            .await
            .map_err(|e| failed(Stage::Synthesize, e))?;

        let mut entries = match fs::read_dir(paragraphs_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(failed(Stage::Synthesize, e)),
        };

        let mut count = 0usize;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| failed(Stage::Synthesize, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("txt") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            fs::write(audio_dir.join(format!("{}.wav", stem)), silent_wav(SAMPLE_RATE))
                .await
                .map_err(|e| failed(Stage::Synthesize, e))?;
            count += 1;
        }

        tracing::debug!(files = count, "Fake synthesis finished");
        Ok(())
    }
}

fn failed(stage: Stage, e: std::io::Error) -> StageError {
    StageError::Failed {
        stage,
        message: e.to_string(),
    }
}

/// 只有头部的 16-bit 单声道 PCM WAV
fn silent_wav(sample_rate: u32) -> Vec<u8> {
    let channels: u16 = 1;
    let bits_per_sample: u16 = 16;
    let block_align = channels * bits_per_sample / 8;
    let byte_rate = sample_rate * block_align as u32;
    let data_len: u32 = 0;

    let mut buf = Vec::with_capacity(44);
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&(36 + data_len).to_le_bytes());
    buf.extend_from_slice(b"WAVE");
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes());
    buf.extend_from_slice(&channels.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_len.to_le_bytes());
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_split_paragraphs() {
        let text = "first line\nstill first\n\n\nsecond\n   \nthird\n";
        assert_eq!(
            split_paragraphs(text),
            vec!["first line\nstill first", "second", "third"]
        );
        assert!(split_paragraphs("\n\n").is_empty());
    }

    #[test]
    fn test_silent_wav_header() {
        let wav = silent_wav(SAMPLE_RATE);
        assert_eq!(wav.len(), 44);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[36..40], b"data");
    }

    #[tokio::test]
    async fn test_split_then_synthesize() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("file.data");
        std::fs::write(&input, "a\n\nb\n\nc").unwrap();
        let paragraphs = dir.path().join("paragraphs");
        let audio = dir.path().join("audio");

        FakeSplitter::new().split(&input, &paragraphs).await.unwrap();
        FakeSynthesizer::new().synthesize(&paragraphs, &audio).await.unwrap();

        assert_eq!(std::fs::read_to_string(paragraphs.join("3.txt")).unwrap(), "c");
        for i in 1..=3 {
            assert!(audio.join(format!("{}.wav", i)).is_file());
        }
    }

    #[tokio::test]
    async fn test_failing_stages() {
        let dir = tempdir().unwrap();
        let err = FakeSplitter::failing()
            .split(dir.path(), dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, StageError::Failed { stage: Stage::Split, .. }));

        let err = FakeSynthesizer::failing()
            .synthesize(dir.path(), dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, StageError::Failed { stage: Stage::Synthesize, .. }));
    }

    #[tokio::test]
    async fn test_gate_blocks_until_released() {
        let dir = tempdir().unwrap();
        let gate = Arc::new(Semaphore::new(0));
        let synthesizer = Arc::new(FakeSynthesizer::with_gate(gate.clone()));

        let paragraphs = dir.path().join("paragraphs");
        let audio = dir.path().join("audio");
        let task = {
            let synthesizer = synthesizer.clone();
            let (p, a) = (paragraphs.clone(), audio.clone());
            tokio::spawn(async move { synthesizer.synthesize(&p, &a).await })
        };

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(!task.is_finished());

        gate.add_permits(1);
        task.await.unwrap().unwrap();
        assert!(audio.is_dir());
    }
}
