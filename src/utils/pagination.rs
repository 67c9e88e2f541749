//! limit/offset 分页参数

use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

pub const DEFAULT_LIMIT: u64 = 50;
pub const MAX_LIMIT: u64 = 100;

#[derive(Debug, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LimitOffsetParams {
    /// 每页数量 (默认 50, 最大 100)
    pub limit: Option<i64>,
    /// 偏移量 (默认 0)
    pub offset: Option<i64>,
}

impl LimitOffsetParams {
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self { limit, offset }
    }

    /// Non-positive values fall back to the default, large values are capped.
    pub fn get_limit(&self) -> u64 {
        match self.limit {
            Some(l) if l > 0 => (l as u64).min(MAX_LIMIT),
            _ => DEFAULT_LIMIT,
        }
    }

    pub fn get_offset(&self) -> u64 {
        self.offset.unwrap_or(0).max(0) as u64
    }
}
