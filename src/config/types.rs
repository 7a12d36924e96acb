//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::infrastructure::adapters::stages::CommandSpec;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 流水线配置
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 文档根目录，每个文档一个子目录
    #[serde(default = "default_documents_dir")]
    pub documents_dir: PathBuf,

    /// 上传文件最大大小（字节），默认 32MB
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: usize,
}

fn default_documents_dir() -> PathBuf {
    PathBuf::from("documents")
}

fn default_max_upload_size() -> usize {
    32 * 1024 * 1024 // 32 MB
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            documents_dir: default_documents_dir(),
            max_upload_size: default_max_upload_size(),
        }
    }
}

/// 阶段实现
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineBackend {
    /// 外部进程
    #[default]
    Command,
    /// 进程内实现（开发用）
    Fake,
}

/// 流水线配置
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub backend: PipelineBackend,

    /// 最大并发流水线数
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// 队列容量
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// 单个阶段的超时时间（秒），0 表示不限制
    #[serde(default)]
    pub stage_timeout_secs: u64,

    /// 外部命令的工作目录，未设置时继承当前目录
    #[serde(default)]
    pub working_dir: Option<PathBuf>,

    #[serde(default = "default_splitter")]
    pub splitter: CommandSpec,

    #[serde(default = "default_synthesizer")]
    pub synthesizer: CommandSpec,
}

fn default_max_concurrent() -> usize {
    4
}

fn default_queue_capacity() -> usize {
    1024
}

pub(crate) fn default_splitter() -> CommandSpec {
    CommandSpec::new(
        "bash",
        &["./split-document.sh", "--output", "{output}", "--", "{input}"],
    )
}

pub(crate) fn default_synthesizer() -> CommandSpec {
    CommandSpec::new(
        "python3",
        &[
            "./split-txt-to-tts.py",
            "--speaker",
            "p241",
            "--text-dir",
            "{input}",
            "--out-dir",
            "{output}",
        ],
    )
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            backend: PipelineBackend::default(),
            max_concurrent: default_max_concurrent(),
            queue_capacity: default_queue_capacity(),
            stage_timeout_secs: 0,
            working_dir: None,
            splitter: default_splitter(),
            synthesizer: default_synthesizer(),
        }
    }
}

impl PipelineConfig {
    /// 阶段超时，0 表示不限制
    pub fn stage_timeout(&self) -> Option<Duration> {
        (self.stage_timeout_secs > 0).then(|| Duration::from_secs(self.stage_timeout_secs))
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
