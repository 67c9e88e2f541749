use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::entities::{
    DrawStatus, DrawType, business_entity, draw_entity, draw_participant_entity,
};

use super::{double_option, empty_as_none};

/// 抽奖列表查询参数
#[derive(Debug, Clone, Default, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DrawListQuery {
    /// 按状态过滤: active / completed / cancelled (空值不过滤)
    #[serde(default, deserialize_with = "empty_as_none")]
    pub status: Option<DrawStatus>,
}

/// 创建抽奖请求
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateDrawRequest {
    #[schema(example = "Free dinner for two")]
    pub prize_name: Option<String>,
    pub prize_description: Option<String>,
    pub prize_image_url: Option<String>,
    pub draw_type: Option<DrawType>,
    /// RFC 3339, required for fixed_date draws
    pub draw_date: Option<DateTime<Utc>>,
    /// Required for conditional draws
    pub trigger_threshold: Option<i32>,
    #[schema(example = "1 in 50")]
    pub win_probability: Option<String>,
    pub terms_url: Option<String>,
    /// 默认 true
    pub use_default_terms: Option<bool>,
    pub custom_terms: Option<String>,
}

/// 修改抽奖请求（部分更新）
///
/// Nullable fields accept `null` to clear the stored value.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateDrawRequest {
    pub prize_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub prize_description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub prize_image_url: Option<Option<String>>,
    pub draw_type: Option<DrawType>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub draw_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub trigger_threshold: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub win_probability: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub terms_url: Option<Option<String>>,
    pub use_default_terms: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub custom_terms: Option<Option<String>>,
}

impl UpdateDrawRequest {
    pub fn is_empty(&self) -> bool {
        self.prize_name.is_none()
            && self.prize_description.is_none()
            && self.prize_image_url.is_none()
            && self.draw_type.is_none()
            && self.draw_date.is_none()
            && self.trigger_threshold.is_none()
            && self.win_probability.is_none()
            && self.terms_url.is_none()
            && self.use_default_terms.is_none()
            && self.custom_terms.is_none()
    }
}

/// 参与抽奖请求
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct ParticipateRequest {
    /// 必须为 true
    #[serde(default)]
    pub accept_terms: bool,
}

/// 抽奖完整信息
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DrawResponse {
    pub id: i64,
    pub business_id: i64,
    pub prize_name: String,
    pub prize_description: Option<String>,
    pub prize_image_url: Option<String>,
    pub draw_type: DrawType,
    pub draw_date: Option<DateTime<Utc>>,
    pub trigger_threshold: Option<i32>,
    pub win_probability: Option<String>,
    pub terms_url: Option<String>,
    pub use_default_terms: bool,
    pub custom_terms: Option<String>,
    pub status: DrawStatus,
    pub winner_user_id: Option<i64>,
    pub drawn_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<draw_entity::Model> for DrawResponse {
    fn from(m: draw_entity::Model) -> Self {
        DrawResponse {
            id: m.id,
            business_id: m.business_id,
            prize_name: m.prize_name,
            prize_description: m.prize_description,
            prize_image_url: m.prize_image_url,
            draw_type: m.draw_type,
            draw_date: m.draw_date,
            trigger_threshold: m.trigger_threshold,
            win_probability: m.win_probability,
            terms_url: m.terms_url,
            use_default_terms: m.use_default_terms,
            custom_terms: m.custom_terms,
            status: m.status,
            winner_user_id: m.winner_user_id,
            drawn_at: m.drawn_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// 抽奖列表项（附参与人数）
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DrawSummaryResponse {
    pub id: i64,
    pub prize_name: String,
    pub status: DrawStatus,
    pub draw_type: DrawType,
    pub participant_count: i64,
    pub draw_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl DrawSummaryResponse {
    pub fn new(m: draw_entity::Model, participant_count: i64) -> Self {
        DrawSummaryResponse {
            id: m.id,
            prize_name: m.prize_name,
            status: m.status,
            draw_type: m.draw_type,
            participant_count,
            draw_date: m.draw_date,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BusinessResponse {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub city: Option<String>,
}

impl From<business_entity::Model> for BusinessResponse {
    fn from(m: business_entity::Model) -> Self {
        BusinessResponse {
            id: m.id,
            name: m.name,
            email: m.email,
            city: m.city,
        }
    }
}

/// 抽奖详情
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DrawDetailResponse {
    pub draw: DrawResponse,
    pub business: Option<BusinessResponse>,
    pub participant_count: i64,
    /// 仅普通用户登录时计算
    pub user_has_participated: bool,
}

/// 参与记录
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ParticipationResponse {
    pub id: i64,
    pub draw_id: i64,
    pub user_id: i64,
    pub participated_at: DateTime<Utc>,
}

impl From<draw_participant_entity::Model> for ParticipationResponse {
    fn from(m: draw_participant_entity::Model) -> Self {
        ParticipationResponse {
            id: m.id,
            draw_id: m.draw_id,
            user_id: m.user_id,
            participated_at: m.participated_at,
        }
    }
}

/// 参与者列表项（餐厅后台）
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ParticipantResponse {
    pub id: i64,
    pub user_id: i64,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub participated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ParticipantListResponse {
    pub participants: Vec<ParticipantResponse>,
    pub total: i64,
    pub limit: u64,
    pub offset: u64,
}
