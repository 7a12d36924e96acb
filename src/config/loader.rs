//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（docvoice.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::types::{default_splitter, default_synthesizer, AppConfig, PipelineBackend};
use crate::infrastructure::adapters::stages::CommandSpec;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["docvoice", "docvoice.local"];

/// 显式指定配置文件的环境变量
pub const CONFIG_PATH_ENV: &str = "DOCVOICE_CONFIG";

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `DOCVOICE_`，层级分隔符 `__`）
/// 2. 配置文件（`DOCVOICE_CONFIG` 指定的文件，或 docvoice.toml / docvoice.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `DOCVOICE_SERVER__PORT=9000`
/// - `DOCVOICE_STORAGE__DOCUMENTS_DIR=/srv/documents`
/// - `DOCVOICE_PIPELINE__BACKEND=fake`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let explicit = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
    load_config_from_path(explicit.as_deref())
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    let splitter = default_splitter();
    let synthesizer = default_synthesizer();

    // 1. 首先设置默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .set_default("storage.documents_dir", "documents")?
        .set_default("storage.max_upload_size", 32 * 1024 * 1024)?
        .set_default("pipeline.backend", "command")?
        .set_default("pipeline.max_concurrent", 4)?
        .set_default("pipeline.queue_capacity", 1024)?
        .set_default("pipeline.stage_timeout_secs", 0)?
        .set_default("pipeline.splitter.program", splitter.program)?
        .set_default("pipeline.splitter.args", splitter.args)?
        .set_default("pipeline.synthesizer.program", synthesizer.program)?
        .set_default("pipeline.synthesizer.args", synthesizer.args)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量（最高优先级）
    // 例如: DOCVOICE_PIPELINE__MAX_CONCURRENT=8
    builder = builder.add_source(
        Environment::with_prefix("DOCVOICE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.storage.documents_dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "Documents directory cannot be empty".to_string(),
        ));
    }

    if config.pipeline.max_concurrent == 0 {
        return Err(ConfigError::ValidationError(
            "Pipeline max_concurrent cannot be 0".to_string(),
        ));
    }

    if config.pipeline.queue_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "Pipeline queue_capacity cannot be 0".to_string(),
        ));
    }

    // fake 后端不调用外部命令
    if config.pipeline.backend == PipelineBackend::Command {
        validate_command("splitter", &config.pipeline.splitter)?;
        validate_command("synthesizer", &config.pipeline.synthesizer)?;
    }

    Ok(())
}

fn validate_command(stage: &str, spec: &CommandSpec) -> Result<(), ConfigError> {
    if spec.program.trim().is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "Pipeline {} program cannot be empty",
            stage
        )));
    }
    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}", config.server.addr());
    tracing::info!("Documents Directory: {:?}", config.storage.documents_dir);
    tracing::info!("Max Upload Size: {} bytes", config.storage.max_upload_size);
    tracing::info!("Pipeline Backend: {:?}", config.pipeline.backend);
    tracing::info!("Pipeline Max Concurrent: {}", config.pipeline.max_concurrent);
    if config.pipeline.backend == PipelineBackend::Command {
        tracing::info!(
            "Splitter: {} {:?}",
            config.pipeline.splitter.program,
            config.pipeline.splitter.args
        );
        tracing::info!(
            "Synthesizer: {} {:?}",
            config.pipeline.synthesizer.program,
            config.pipeline.synthesizer.args
        );
    }
    match config.pipeline.stage_timeout() {
        Some(timeout) => tracing::info!("Stage Timeout: {}s", timeout.as_secs()),
        None => tracing::info!("Stage Timeout: none"),
    }
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
