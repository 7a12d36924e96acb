//! Command Stage - 以子进程运行外部拆分器 / 合成器
//!
//! 参数模板中的 `{input}` / `{output}` 会被替换为阶段的输入路径与输出目录。
//! 例如默认拆分器:
//!
//! ```text
//! bash ./split-document.sh --output {output} -- {input}
//! ```

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::application::ports::{Stage, StageError, SplitterPort, SynthesizerPort};

/// stderr 保留的最大字节数
const MAX_STDERR_BYTES: usize = 4096;

/// 外部命令配置
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CommandSpec {
    /// 可执行程序
    pub program: String,
    /// 参数模板
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn render_args(&self, input: &Path, output: &Path) -> Vec<String> {
        let input = input.to_string_lossy();
        let output = output.to_string_lossy();
        self.args
            .iter()
            .map(|arg| arg.replace("{input}", &input).replace("{output}", &output))
            .collect()
    }
}

/// 通用子进程阶段
#[derive(Debug, Clone)]
struct CommandStage {
    stage: Stage,
    spec: CommandSpec,
    working_dir: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl CommandStage {
    async fn run(&self, input: &Path, output_dir: &Path) -> Result<(), StageError> {
        let args = self.spec.render_args(input, output_dir);

        let mut command = Command::new(&self.spec.program);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        tracing::debug!(
            stage = %self.stage,
            program = %self.spec.program,
            args = ?args,
            "Running stage command"
        );

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, command.output())
                .await
                .map_err(|_| StageError::Timeout {
                    stage: self.stage,
                    secs: limit.as_secs(),
                })?,
            None => command.output().await,
        }
        .map_err(|e| StageError::Spawn {
            stage: self.stage,
            message: format!("{}: {}", self.spec.program, e),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            tracing::debug!(stage = %self.stage, stdout = %stdout.trim(), "Stage output");
        }

        if !output.status.success() {
            return Err(StageError::NonZeroExit {
                stage: self.stage,
                code: output.status.code(),
                stderr: tail(&output.stderr, MAX_STDERR_BYTES),
            });
        }

        Ok(())
    }
}

/// 只保留末尾 `max` 字节
fn tail(bytes: &[u8], max: usize) -> String {
    let start = bytes.len().saturating_sub(max);
    String::from_utf8_lossy(&bytes[start..]).trim().to_string()
}

/// 外部命令拆分器
pub struct CommandSplitter {
    inner: CommandStage,
}

impl CommandSplitter {
    pub fn new(spec: CommandSpec, working_dir: Option<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            inner: CommandStage {
                stage: Stage::Split,
                spec,
                working_dir,
                timeout,
            },
        }
    }
}

#[async_trait]
impl SplitterPort for CommandSplitter {
    async fn split(&self, input_file: &Path, output_dir: &Path) -> Result<(), StageError> {
        self.inner.run(input_file, output_dir).await
    }
}

/// 外部命令合成器
pub struct CommandSynthesizer {
    inner: CommandStage,
}

impl CommandSynthesizer {
    pub fn new(spec: CommandSpec, working_dir: Option<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            inner: CommandStage {
                stage: Stage::Synthesize,
                spec,
                working_dir,
                timeout,
            },
        }
    }
}

#[async_trait]
impl SynthesizerPort for CommandSynthesizer {
    async fn synthesize(&self, paragraphs_dir: &Path, audio_dir: &Path) -> Result<(), StageError> {
        self.inner.run(paragraphs_dir, audio_dir).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sh(script: &str) -> CommandSpec {
        CommandSpec::new("sh", &["-c", script, "sh", "{input}", "{output}"])
    }

    #[test]
    fn test_render_args() {
        let spec = CommandSpec::new("bash", &["./split.sh", "--output", "{output}", "--", "{input}"]);
        let args = spec.render_args(Path::new("/d/file.data"), Path::new("/d/paragraphs"));
        assert_eq!(args, vec!["./split.sh", "--output", "/d/paragraphs", "--", "/d/file.data"]);
    }

    #[tokio::test]
    async fn test_success_writes_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("file.data");
        std::fs::write(&input, "hello").unwrap();
        let output = dir.path().join("paragraphs");

        let splitter = CommandSplitter::new(
            sh(r#"mkdir -p "$2" && cp "$1" "$2/1.txt""#),
            None,
            None,
        );
        splitter.split(&input, &output).await.unwrap();

        assert_eq!(std::fs::read_to_string(output.join("1.txt")).unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_non_zero_exit() {
        let dir = tempdir().unwrap();
        let synthesizer = CommandSynthesizer::new(sh("echo boom >&2; exit 3"), None, None);

        let err = synthesizer
            .synthesize(dir.path(), &dir.path().join("audio"))
            .await
            .unwrap_err();

        match err {
            StageError::NonZeroExit { stage, code, stderr } => {
                assert_eq!(stage, Stage::Synthesize);
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_program() {
        let dir = tempdir().unwrap();
        let splitter = CommandSplitter::new(
            CommandSpec::new("definitely-not-a-real-program-xyz", &[]),
            None,
            None,
        );
        let err = splitter.split(dir.path(), dir.path()).await.unwrap_err();
        assert!(matches!(err, StageError::Spawn { stage: Stage::Split, .. }));
    }

    #[tokio::test]
    async fn test_timeout() {
        let dir = tempdir().unwrap();
        let splitter = CommandSplitter::new(
            sh("sleep 5"),
            None,
            Some(Duration::from_millis(200)),
        );
        let err = splitter.split(dir.path(), dir.path()).await.unwrap_err();
        assert!(matches!(err, StageError::Timeout { stage: Stage::Split, .. }));
    }

    #[tokio::test]
    async fn test_working_dir() {
        let dir = tempdir().unwrap();
        let splitter = CommandSplitter::new(
            CommandSpec::new("sh", &["-c", "touch marker"]),
            Some(dir.path().to_path_buf()),
            None,
        );
        splitter.split(dir.path(), dir.path()).await.unwrap();
        assert!(dir.path().join("marker").exists());
    }
}
