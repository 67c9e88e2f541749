use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(20))")]
#[serde(rename_all = "snake_case")]
pub enum DrawType {
    /// 指定日期开奖
    #[sea_orm(string_value = "fixed_date")]
    FixedDate,
    /// 达到参与人数阈值后开奖
    #[sea_orm(string_value = "conditional")]
    Conditional,
}

impl std::fmt::Display for DrawType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrawType::FixedDate => write!(f, "fixed_date"),
            DrawType::Conditional => write!(f, "conditional"),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(20))")]
#[serde(rename_all = "snake_case")]
pub enum DrawStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl std::fmt::Display for DrawStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrawStatus::Active => write!(f, "active"),
            DrawStatus::Completed => write!(f, "completed"),
            DrawStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// 抽奖实体
/// 说明:
/// - 有参与者之后不可修改、不可删除
/// - winner_user_id / drawn_at 由外部开奖流程写入
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "draws")]
pub struct Model {
    #[sea_orm(primary_key)]
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

impl Model {
    pub fn is_active(&self) -> bool {
        self.status == DrawStatus::Active
    }

    pub fn is_owned_by(&self, business_id: Option<i64>) -> bool {
        business_id == Some(self.business_id)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::businesses::Entity",
        from = "Column::BusinessId",
        to = "super::businesses::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Business,
    #[sea_orm(has_many = "super::draw_participants::Entity")]
    DrawParticipants,
}

impl Related<super::businesses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Business.def()
    }
}

impl Related<super::draw_participants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DrawParticipants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
