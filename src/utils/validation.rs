//! 抽奖字段校验
//!
//! Rules shared by create and update. `now` is passed in so callers (and
//! tests) control the clock.

use crate::entities::DrawType;
use crate::error::{AppError, AppResult};
use chrono::{DateTime, Utc};

pub const PRIZE_NAME_MIN_CHARS: usize = 5;
pub const PRIZE_NAME_MAX_CHARS: usize = 200;
/// `draws.win_probability` 列为 varchar(100)
pub const WIN_PROBABILITY_MAX_CHARS: usize = 100;

pub fn validate_prize_name(prize_name: &str) -> AppResult<()> {
    let len = prize_name.chars().count();
    if !(PRIZE_NAME_MIN_CHARS..=PRIZE_NAME_MAX_CHARS).contains(&len) {
        return Err(AppError::ValidationError(format!(
            "prize_name must be between {PRIZE_NAME_MIN_CHARS} and {PRIZE_NAME_MAX_CHARS} characters"
        )));
    }
    Ok(())
}

pub fn validate_win_probability(win_probability: &str) -> AppResult<()> {
    if win_probability.chars().count() > WIN_PROBABILITY_MAX_CHARS {
        return Err(AppError::ValidationError(format!(
            "win_probability must be at most {WIN_PROBABILITY_MAX_CHARS} characters"
        )));
    }
    Ok(())
}

pub fn validate_future_date(draw_date: &DateTime<Utc>, now: DateTime<Utc>) -> AppResult<()> {
    if *draw_date <= now {
        return Err(AppError::ValidationError(
            "draw_date must be in the future".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_trigger_threshold(trigger_threshold: i32) -> AppResult<()> {
    if trigger_threshold <= 0 {
        return Err(AppError::ValidationError(
            "trigger_threshold must be > 0".to_string(),
        ));
    }
    Ok(())
}

/// Checks that the type-specific fields a draw needs are present.
pub fn validate_schedule(
    draw_type: DrawType,
    draw_date: Option<&DateTime<Utc>>,
    trigger_threshold: Option<i32>,
) -> AppResult<()> {
    match draw_type {
        DrawType::FixedDate => {
            if draw_date.is_none() {
                return Err(AppError::ValidationError(
                    "draw_date is required for fixed_date draws".to_string(),
                ));
            }
        }
        DrawType::Conditional => match trigger_threshold {
            Some(t) if t > 0 => {}
            _ => {
                return Err(AppError::ValidationError(
                    "trigger_threshold is required and must be > 0 for conditional draws"
                        .to_string(),
                ));
            }
        },
    }
    Ok(())
}

/// 空字符串按 NULL 存储
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
