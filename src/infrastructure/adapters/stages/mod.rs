//! Stage Adapters - 外部协作者实现
//!
//! - CommandSplitter / CommandSynthesizer: 以子进程方式调用外部脚本
//! - FakeSplitter / FakeSynthesizer: 进程内实现（开发与测试用）

mod command_stage;
mod fake_stages;

pub use command_stage::{CommandSpec, CommandSplitter, CommandSynthesizer};
pub use fake_stages::{FakeSplitter, FakeSynthesizer};
