//! Paragraph Selector - 批量段落选择器解析
//!
//! 语法: 逗号分隔的 token，每个 token 为单个 ID 或闭区间 `start-end`。
//!
//! - `"1-3,5,7-8"` -> `["1","2","3","5","7","8"]`
//! - `"5-3"` -> `[]`（起点大于终点时该 token 不贡献任何 ID）
//! - `"1-3,2"` -> `["1","2","3","2"]`（保留顺序与重复）
//!
//! 空 token（如结尾多余的逗号）会被忽略。

use thiserror::Error;

/// 单次选择展开后的最大 ID 数
pub const MAX_SELECTION: usize = 10_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectorError {
    #[error("invalid range: {0}")]
    InvalidRange(String),

    #[error("selection too large: more than {max} paragraphs requested")]
    TooLarge { max: usize },
}

/// 将选择器展开为有序的段落 ID 列表
pub fn parse_selector(selector: &str) -> Result<Vec<String>, SelectorError> {
    let mut ids = Vec::new();

    for token in selector.split(',') {
        if token.is_empty() {
            continue;
        }

        if !token.contains('-') {
            ids.push(token.to_string());
            ensure_within_limit(ids.len())?;
            continue;
        }

        let (start, end) = parse_range(token)?;
        if start > end {
            continue;
        }
        let count = i128::from(end) - i128::from(start) + 1;
        if ids.len() as i128 + count > MAX_SELECTION as i128 {
            return Err(SelectorError::TooLarge { max: MAX_SELECTION });
        }
        ids.extend((start..=end).map(|i| i.to_string()));
    }

    Ok(ids)
}

fn parse_range(token: &str) -> Result<(i64, i64), SelectorError> {
    let parts: Vec<&str> = token.split('-').collect();
    if parts.len() != 2 {
        return Err(SelectorError::InvalidRange(token.to_string()));
    }
    let start = parts[0]
        .parse::<i64>()
        .map_err(|_| SelectorError::InvalidRange(token.to_string()))?;
    let end = parts[1]
        .parse::<i64>()
        .map_err(|_| SelectorError::InvalidRange(token.to_string()))?;
    Ok((start, end))
}

fn ensure_within_limit(len: usize) -> Result<(), SelectorError> {
    if len > MAX_SELECTION {
        return Err(SelectorError::TooLarge { max: MAX_SELECTION });
    }
    Ok(())
}
