use std::collections::HashMap;

use crate::entities::{
    DrawStatus, DrawType, UserRole, business_entity as businesses, draw_entity as draws,
    draw_participant_entity as participants, user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    AuthUser, BusinessResponse, CreateDrawRequest, DrawDetailResponse, DrawListQuery,
    DrawResponse, DrawSummaryResponse, ParticipantListResponse, ParticipantResponse,
    ParticipateRequest, ParticipationResponse, UpdateDrawRequest,
};
use crate::services::UserService;
use crate::utils::LimitOffsetParams;
use crate::utils::validation::{
    normalize_optional, validate_future_date, validate_prize_name, validate_schedule,
    validate_trigger_threshold, validate_win_probability,
};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    SqlErr, TransactionTrait,
};

#[derive(Clone)]
pub struct DrawService {
    pool: DatabaseConnection,
    user_service: UserService,
}

impl DrawService {
    pub fn new(pool: DatabaseConnection, user_service: UserService) -> Self {
        Self { pool, user_service }
    }

    /// 餐厅的抽奖列表（倒序），附参与人数
    pub async fn list_draws(
        &self,
        user_id: Option<i64>,
        query: &DrawListQuery,
    ) -> AppResult<Vec<DrawSummaryResponse>> {
        let user = self.user_service.authenticate(user_id).await?;
        user.require_role(&[UserRole::Restaurant])?;
        let business_id = user.require_business_id()?;

        let mut select = draws::Entity::find().filter(draws::Column::BusinessId.eq(business_id));
        if let Some(status) = query.status {
            select = select.filter(draws::Column::Status.eq(status));
        }

        let list = select
            .order_by_desc(draws::Column::CreatedAt)
            .order_by_desc(draws::Column::Id)
            .all(&self.pool)
            .await?;

        let ids: Vec<i64> = list.iter().map(|d| d.id).collect();
        let counts = self.participant_counts(&ids).await?;

        Ok(list
            .into_iter()
            .map(|d| {
                let count = counts.get(&d.id).copied().unwrap_or(0);
                DrawSummaryResponse::new(d, count)
            })
            .collect())
    }

    /// 创建抽奖
    pub async fn create_draw(
        &self,
        user_id: Option<i64>,
        request: CreateDrawRequest,
    ) -> AppResult<DrawResponse> {
        let user = self.user_service.authenticate(user_id).await?;
        user.require_role(&[UserRole::Restaurant])?;
        let business_id = user.require_business_id()?;

        let prize_name = request.prize_name.ok_or_else(|| {
            AppError::ValidationError("prize_name is required and must be a string".to_string())
        })?;
        validate_prize_name(&prize_name)?;

        let draw_type = request.draw_type.ok_or_else(|| {
            AppError::ValidationError(
                "draw_type must be \"fixed_date\" or \"conditional\"".to_string(),
            )
        })?;

        let now = Utc::now();
        validate_schedule(
            draw_type,
            request.draw_date.as_ref(),
            request.trigger_threshold,
        )?;
        if draw_type == DrawType::FixedDate {
            if let Some(date) = &request.draw_date {
                validate_future_date(date, now)?;
            }
        }
        if let Some(threshold) = request.trigger_threshold {
            validate_trigger_threshold(threshold)?;
        }
        if let Some(win_probability) = &request.win_probability {
            validate_win_probability(win_probability)?;
        }

        let draw = draws::ActiveModel {
            business_id: Set(business_id),
            prize_name: Set(prize_name),
            prize_description: Set(normalize_optional(request.prize_description)),
            prize_image_url: Set(normalize_optional(request.prize_image_url)),
            draw_type: Set(draw_type),
            draw_date: Set(request.draw_date),
            trigger_threshold: Set(request.trigger_threshold),
            win_probability: Set(normalize_optional(request.win_probability)),
            terms_url: Set(normalize_optional(request.terms_url)),
            use_default_terms: Set(request.use_default_terms.unwrap_or(true)),
            custom_terms: Set(normalize_optional(request.custom_terms)),
            status: Set(DrawStatus::Active),
            winner_user_id: Set(None),
            drawn_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!(
            "Draw {} created by business {} ({})",
            draw.id,
            business_id,
            draw.draw_type
        );
        Ok(draw.into())
    }

    /// 抽奖详情
    ///
    /// Active draws are public. Other statuses are visible to the owning
    /// restaurant, admins and participants only.
    pub async fn get_draw(&self, draw_id: i64, user_id: Option<i64>) -> AppResult<DrawDetailResponse> {
        let draw = self.find_draw(draw_id).await?;
        let viewer = self.user_service.authenticate_optional(user_id).await?;

        let user_has_participated = match &viewer {
            Some(user) if user.role == UserRole::User => {
                self.has_participated(draw.id, user.id).await?
            }
            _ => false,
        };

        if !draw.is_active() {
            let user = viewer
                .as_ref()
                .ok_or_else(|| AppError::AuthError("Authentication required".to_string()))?;
            let allowed = user.is_admin()
                || (user.role == UserRole::Restaurant && draw.is_owned_by(user.business_id))
                || user_has_participated;
            if !allowed {
                return Err(AppError::Forbidden(
                    "Not allowed to view this draw".to_string(),
                ));
            }
        }

        let business = businesses::Entity::find_by_id(draw.business_id)
            .one(&self.pool)
            .await?
            .map(BusinessResponse::from);
        let participant_count = self.participant_count(&self.pool, draw.id).await?;

        Ok(DrawDetailResponse {
            draw: draw.into(),
            business,
            participant_count,
            user_has_participated,
        })
    }

    /// 修改抽奖（仅所有者，且无参与者）
    pub async fn update_draw(
        &self,
        draw_id: i64,
        user_id: Option<i64>,
        request: UpdateDrawRequest,
    ) -> AppResult<DrawResponse> {
        let user = self.user_service.authenticate(user_id).await?;
        user.require_role(&[UserRole::Restaurant])?;
        // 行锁覆盖 "无参与者" 检查到写入为止
        let txn = self.pool.begin().await?;
        let draw = self
            .find_owned_unlocked_draw(&txn, draw_id, &user, "modify")
            .await?;

        if request.is_empty() {
            return Err(AppError::ValidationError("No fields to update".to_string()));
        }

        let now = Utc::now();
        if let Some(name) = &request.prize_name {
            validate_prize_name(name)?;
        }
        if let Some(Some(date)) = &request.draw_date {
            validate_future_date(date, now)?;
        }
        if let Some(Some(threshold)) = request.trigger_threshold {
            validate_trigger_threshold(threshold)?;
        }
        if let Some(Some(win_probability)) = &request.win_probability {
            validate_win_probability(win_probability)?;
        }

        // 合并后的状态仍需满足类型约束
        let draw_type = request.draw_type.unwrap_or(draw.draw_type);
        let draw_date = match request.draw_date {
            Some(value) => value,
            None => draw.draw_date,
        };
        let trigger_threshold = match request.trigger_threshold {
            Some(value) => value,
            None => draw.trigger_threshold,
        };
        validate_schedule(draw_type, draw_date.as_ref(), trigger_threshold)?;
        if draw_type == DrawType::FixedDate && draw.draw_type != DrawType::FixedDate {
            if let Some(date) = &draw_date {
                validate_future_date(date, now)?;
            }
        }

        let mut am = draw.into_active_model();
        if let Some(name) = request.prize_name {
            am.prize_name = Set(name);
        }
        if let Some(value) = request.prize_description {
            am.prize_description = Set(normalize_optional(value));
        }
        if let Some(value) = request.prize_image_url {
            am.prize_image_url = Set(normalize_optional(value));
        }
        if request.draw_type.is_some() {
            am.draw_type = Set(draw_type);
        }
        if request.draw_date.is_some() {
            am.draw_date = Set(draw_date);
        }
        if request.trigger_threshold.is_some() {
            am.trigger_threshold = Set(trigger_threshold);
        }
        if let Some(value) = request.win_probability {
            am.win_probability = Set(normalize_optional(value));
        }
        if let Some(value) = request.terms_url {
            am.terms_url = Set(normalize_optional(value));
        }
        if let Some(value) = request.use_default_terms {
            am.use_default_terms = Set(value);
        }
        if let Some(value) = request.custom_terms {
            am.custom_terms = Set(normalize_optional(value));
        }
        am.updated_at = Set(now);

        let updated = am.update(&txn).await?;
        txn.commit().await?;
        log::info!("Draw {} updated by user {}", updated.id, user.id);
        Ok(updated.into())
    }

    /// 删除抽奖（仅所有者，且无参与者）
    pub async fn delete_draw(&self, draw_id: i64, user_id: Option<i64>) -> AppResult<()> {
        let user = self.user_service.authenticate(user_id).await?;
        user.require_role(&[UserRole::Restaurant])?;
        let txn = self.pool.begin().await?;
        let draw = self
            .find_owned_unlocked_draw(&txn, draw_id, &user, "delete")
            .await?;

        draws::Entity::delete_by_id(draw.id).exec(&txn).await?;
        txn.commit().await?;
        log::info!("Draw {} deleted by user {}", draw.id, user.id);
        Ok(())
    }

    /// 参与者列表（分页，仅所有者）
    pub async fn list_participants(
        &self,
        draw_id: i64,
        user_id: Option<i64>,
        params: &LimitOffsetParams,
    ) -> AppResult<ParticipantListResponse> {
        let user = self.user_service.authenticate(user_id).await?;
        user.require_role(&[UserRole::Restaurant])?;
        let business_id = user.require_business_id()?;

        let draw = self.find_draw(draw_id).await?;
        if draw.business_id != business_id {
            return Err(AppError::Forbidden("Unauthorized".to_string()));
        }

        let limit = params.get_limit();
        let offset = params.get_offset();
        let total = self.participant_count(&self.pool, draw.id).await?;

        let rows = participants::Entity::find()
            .filter(participants::Column::DrawId.eq(draw.id))
            .find_also_related(users::Entity)
            .order_by_desc(participants::Column::ParticipatedAt)
            .order_by_desc(participants::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(&self.pool)
            .await?;

        let participants = rows
            .into_iter()
            .map(|(p, u)| ParticipantResponse {
                id: p.id,
                user_id: p.user_id,
                user_name: u.as_ref().map(|u| u.name.clone()),
                user_email: u.map(|u| u.email),
                participated_at: p.participated_at,
            })
            .collect();

        Ok(ParticipantListResponse {
            participants,
            total,
            limit,
            offset,
        })
    }

    /// 参与抽奖
    ///
    /// The pre-check gives a clean 409 in the common case; concurrent
    /// requests are settled by the `(draw_id, user_id)` unique index.
    pub async fn participate(
        &self,
        draw_id: i64,
        user_id: Option<i64>,
        request: ParticipateRequest,
    ) -> AppResult<ParticipationResponse> {
        let user = self.user_service.authenticate(user_id).await?;
        user.require_role(&[UserRole::User])?;

        if !request.accept_terms {
            return Err(AppError::ValidationError(
                "You must accept the terms to participate".to_string(),
            ));
        }

        let draw = self.find_draw(draw_id).await?;
        if !draw.is_active() {
            return Err(AppError::DrawNotAvailable);
        }

        if self.has_participated(draw.id, user.id).await? {
            return Err(AppError::AlreadyParticipated);
        }

        let participation = self.insert_participation(draw.id, user.id).await?;
        log::info!("User {} joined draw {}", user.id, draw.id);
        Ok(participation.into())
    }

    // -----------------------------
    // 内部辅助方法
    // -----------------------------

    async fn insert_participation(
        &self,
        draw_id: i64,
        user_id: i64,
    ) -> AppResult<participants::Model> {
        participants::ActiveModel {
            draw_id: Set(draw_id),
            user_id: Set(user_id),
            participated_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => AppError::AlreadyParticipated,
            // 抽奖在检查之后被删除
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                AppError::NotFound("Draw not found".to_string())
            }
            _ => AppError::DatabaseError(e),
        })
    }

    async fn find_draw(&self, draw_id: i64) -> AppResult<draws::Model> {
        draws::Entity::find_by_id(draw_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Draw not found".to_string()))
    }

    /// 404 → 403 → 400 (有参与者) 依次检查
    ///
    /// The draw row is read `FOR UPDATE`; a concurrent participation insert
    /// waits on it through the foreign key until the caller's transaction ends.
    async fn find_owned_unlocked_draw<C: ConnectionTrait>(
        &self,
        db: &C,
        draw_id: i64,
        user: &AuthUser,
        action: &'static str,
    ) -> AppResult<draws::Model> {
        let draw = draws::Entity::find_by_id(draw_id)
            .lock_exclusive()
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Draw not found".to_string()))?;
        if !draw.is_owned_by(user.business_id) {
            return Err(AppError::Forbidden("Unauthorized".to_string()));
        }
        if self.participant_count(db, draw.id).await? > 0 {
            return Err(AppError::DrawHasParticipants(action));
        }
        Ok(draw)
    }

    async fn participant_count<C: ConnectionTrait>(&self, db: &C, draw_id: i64) -> AppResult<i64> {
        let count = participants::Entity::find()
            .filter(participants::Column::DrawId.eq(draw_id))
            .count(db)
            .await?;
        Ok(count as i64)
    }

    async fn participant_counts(&self, draw_ids: &[i64]) -> AppResult<HashMap<i64, i64>> {
        if draw_ids.is_empty() {
            return Ok(HashMap::new());
        }

        #[derive(Debug, FromQueryResult)]
        struct CountRow {
            draw_id: i64,
            count: i64,
        }
        let rows = participants::Entity::find()
            .select_only()
            .column(participants::Column::DrawId)
            .column_as(Expr::col(participants::Column::Id).count(), "count")
            .filter(participants::Column::DrawId.is_in(draw_ids.iter().copied()))
            .group_by(participants::Column::DrawId)
            .into_model::<CountRow>()
            .all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|r| (r.draw_id, r.count)).collect())
    }

    async fn has_participated(&self, draw_id: i64, user_id: i64) -> AppResult<bool> {
        let existing = participants::Entity::find()
            .filter(participants::Column::DrawId.eq(draw_id))
            .filter(participants::Column::UserId.eq(user_id))
            .one(&self.pool)
            .await?;
        Ok(existing.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use chrono::{DateTime, Duration};

    struct Fixture {
        service: DrawService,
        db: DatabaseConnection,
        business_id: i64,
        owner_id: i64,
        other_owner_id: i64,
        player_id: i64,
        admin_id: i64,
    }

    async fn fixture() -> Fixture {
        let db = testing::setup_db().await;
        let business = testing::insert_business(&db, "Bistro").await;
        let other = testing::insert_business(&db, "Brasserie").await;
        let owner =
            testing::insert_user(&db, "owner@bistro.test", UserRole::Restaurant, Some(business.id))
                .await;
        let other_owner =
            testing::insert_user(&db, "owner@brasserie.test", UserRole::Restaurant, Some(other.id))
                .await;
        let player = testing::insert_user(&db, "player@example.com", UserRole::User, None).await;
        let admin = testing::insert_user(&db, "admin@example.com", UserRole::Admin, None).await;

        let service = DrawService::new(db.clone(), UserService::new(db.clone()));
        Fixture {
            service,
            db,
            business_id: business.id,
            owner_id: owner.id,
            other_owner_id: other_owner.id,
            player_id: player.id,
            admin_id: admin.id,
        }
    }

    fn future(days: i64) -> DateTime<Utc> {
        Utc::now() + Duration::days(days)
    }

    fn conditional_request(name: &str, threshold: i32) -> CreateDrawRequest {
        CreateDrawRequest {
            prize_name: Some(name.to_string()),
            draw_type: Some(DrawType::Conditional),
            trigger_threshold: Some(threshold),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_fixed_date_draw() {
        let f = fixture().await;
        let draw = f
            .service
            .create_draw(
                Some(f.owner_id),
                CreateDrawRequest {
                    prize_name: Some("Weekend in Paris".to_string()),
                    prize_description: Some(String::new()),
                    draw_type: Some(DrawType::FixedDate),
                    draw_date: Some(future(7)),
                    win_probability: Some("1 in 50".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(draw.business_id, f.business_id);
        assert_eq!(draw.status, DrawStatus::Active);
        assert!(draw.use_default_terms);
        assert_eq!(draw.prize_description, None);
        assert_eq!(draw.win_probability.as_deref(), Some("1 in 50"));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_prize_name() {
        let f = fixture().await;
        for name in ["abc".to_string(), "x".repeat(201)] {
            let err = f
                .service
                .create_draw(Some(f.owner_id), conditional_request(&name, 10))
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::ValidationError(_)));
        }

        let err = f
            .service
            .create_draw(
                Some(f.owner_id),
                CreateDrawRequest {
                    draw_type: Some(DrawType::Conditional),
                    trigger_threshold: Some(10),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_create_fixed_date_requires_future_date() {
        let f = fixture().await;
        let missing = CreateDrawRequest {
            prize_name: Some("Free dessert".to_string()),
            draw_type: Some(DrawType::FixedDate),
            ..Default::default()
        };
        assert!(matches!(
            f.service.create_draw(Some(f.owner_id), missing).await,
            Err(AppError::ValidationError(_))
        ));

        let past = CreateDrawRequest {
            prize_name: Some("Free dessert".to_string()),
            draw_type: Some(DrawType::FixedDate),
            draw_date: Some(Utc::now() - Duration::hours(1)),
            ..Default::default()
        };
        assert!(matches!(
            f.service.create_draw(Some(f.owner_id), past).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_create_conditional_requires_positive_threshold() {
        let f = fixture().await;
        for threshold in [0, -1] {
            assert!(matches!(
                f.service
                    .create_draw(Some(f.owner_id), conditional_request("Free dessert", threshold))
                    .await,
                Err(AppError::ValidationError(_))
            ));
        }
        let missing = CreateDrawRequest {
            prize_name: Some("Free dessert".to_string()),
            draw_type: Some(DrawType::Conditional),
            ..Default::default()
        };
        assert!(matches!(
            f.service.create_draw(Some(f.owner_id), missing).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_create_requires_restaurant_role() {
        let f = fixture().await;
        assert!(matches!(
            f.service
                .create_draw(Some(f.player_id), conditional_request("Free dessert", 5))
                .await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            f.service
                .create_draw(None, conditional_request("Free dessert", 5))
                .await,
            Err(AppError::AuthError(_))
        ));
    }

    #[tokio::test]
    async fn test_list_draws_scoped_with_counts() {
        let f = fixture().await;
        let active = testing::insert_draw(&f.db, f.business_id, DrawStatus::Active).await;
        let done = testing::insert_draw(&f.db, f.business_id, DrawStatus::Completed).await;
        let other_business = testing::insert_business(&f.db, "Elsewhere").await;
        testing::insert_draw(&f.db, other_business.id, DrawStatus::Active).await;
        testing::insert_participant(&f.db, active.id, f.player_id, 5).await;

        let all = f
            .service
            .list_draws(Some(f.owner_id), &DrawListQuery::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        let active_row = all.iter().find(|d| d.id == active.id).unwrap();
        assert_eq!(active_row.participant_count, 1);
        let done_row = all.iter().find(|d| d.id == done.id).unwrap();
        assert_eq!(done_row.participant_count, 0);

        let completed = f
            .service
            .list_draws(
                Some(f.owner_id),
                &DrawListQuery {
                    status: Some(DrawStatus::Completed),
                },
            )
            .await
            .unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, done.id);
    }

    #[tokio::test]
    async fn test_get_active_draw_is_public() {
        let f = fixture().await;
        let draw = testing::insert_draw(&f.db, f.business_id, DrawStatus::Active).await;
        testing::insert_participant(&f.db, draw.id, f.player_id, 1).await;

        let anonymous = f.service.get_draw(draw.id, None).await.unwrap();
        assert_eq!(anonymous.participant_count, 1);
        assert!(!anonymous.user_has_participated);
        assert_eq!(
            anonymous.business.map(|b| b.id),
            Some(f.business_id)
        );

        let player = f.service.get_draw(draw.id, Some(f.player_id)).await.unwrap();
        assert!(player.user_has_participated);

        assert!(matches!(
            f.service.get_draw(424242, None).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_get_inactive_draw_requires_access() {
        let f = fixture().await;
        let draw = testing::insert_draw(&f.db, f.business_id, DrawStatus::Completed).await;

        assert!(matches!(
            f.service.get_draw(draw.id, None).await,
            Err(AppError::AuthError(_))
        ));
        assert!(matches!(
            f.service.get_draw(draw.id, Some(f.player_id)).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            f.service.get_draw(draw.id, Some(f.other_owner_id)).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(f.service.get_draw(draw.id, Some(f.owner_id)).await.is_ok());
        assert!(f.service.get_draw(draw.id, Some(f.admin_id)).await.is_ok());

        testing::insert_participant(&f.db, draw.id, f.player_id, 30).await;
        let detail = f.service.get_draw(draw.id, Some(f.player_id)).await.unwrap();
        assert!(detail.user_has_participated);
    }

    #[tokio::test]
    async fn test_update_draw() {
        let f = fixture().await;
        let draw = testing::insert_draw(&f.db, f.business_id, DrawStatus::Active).await;

        let updated = f
            .service
            .update_draw(
                draw.id,
                Some(f.owner_id),
                UpdateDrawRequest {
                    prize_name: Some("Brunch for four".to_string()),
                    prize_description: Some(Some("Sunday only".to_string())),
                    trigger_threshold: Some(Some(250)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.prize_name, "Brunch for four");
        assert_eq!(updated.prize_description.as_deref(), Some("Sunday only"));
        assert_eq!(updated.trigger_threshold, Some(250));
        assert!(updated.updated_at >= draw.updated_at);

        let cleared = f
            .service
            .update_draw(
                draw.id,
                Some(f.owner_id),
                UpdateDrawRequest {
                    prize_description: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.prize_description, None);
    }

    #[tokio::test]
    async fn test_update_validates_fields() {
        let f = fixture().await;
        let draw = testing::insert_draw(&f.db, f.business_id, DrawStatus::Active).await;

        let cases = [
            UpdateDrawRequest::default(),
            UpdateDrawRequest {
                prize_name: Some("tiny".to_string()),
                ..Default::default()
            },
            UpdateDrawRequest {
                prize_name: Some("x".repeat(201)),
                ..Default::default()
            },
            UpdateDrawRequest {
                win_probability: Some(Some("1".repeat(101))),
                ..Default::default()
            },
            UpdateDrawRequest {
                trigger_threshold: Some(Some(0)),
                ..Default::default()
            },
            // conditional draw cannot lose its threshold
            UpdateDrawRequest {
                trigger_threshold: Some(None),
                ..Default::default()
            },
            // switching to fixed_date needs a date
            UpdateDrawRequest {
                draw_type: Some(DrawType::FixedDate),
                ..Default::default()
            },
            UpdateDrawRequest {
                draw_type: Some(DrawType::FixedDate),
                draw_date: Some(Some(Utc::now() - Duration::days(1))),
                ..Default::default()
            },
        ];
        for request in cases {
            assert!(matches!(
                f.service
                    .update_draw(draw.id, Some(f.owner_id), request)
                    .await,
                Err(AppError::ValidationError(_))
            ));
        }

        let switched = f
            .service
            .update_draw(
                draw.id,
                Some(f.owner_id),
                UpdateDrawRequest {
                    draw_type: Some(DrawType::FixedDate),
                    draw_date: Some(Some(future(3))),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(switched.draw_type, DrawType::FixedDate);
    }

    #[tokio::test]
    async fn test_update_and_delete_require_ownership() {
        let f = fixture().await;
        let draw = testing::insert_draw(&f.db, f.business_id, DrawStatus::Active).await;

        let request = UpdateDrawRequest {
            prize_name: Some("Stolen prize".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            f.service
                .update_draw(draw.id, Some(f.other_owner_id), request)
                .await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            f.service.delete_draw(draw.id, Some(f.other_owner_id)).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            f.service.delete_draw(draw.id, Some(f.player_id)).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            f.service.delete_draw(999, Some(f.owner_id)).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_draw_with_participants_is_locked() {
        let f = fixture().await;
        let draw = testing::insert_draw(&f.db, f.business_id, DrawStatus::Active).await;
        testing::insert_participant(&f.db, draw.id, f.player_id, 1).await;

        let request = UpdateDrawRequest {
            prize_name: Some("Different prize".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            f.service.update_draw(draw.id, Some(f.owner_id), request).await,
            Err(AppError::DrawHasParticipants("modify"))
        ));
        assert!(matches!(
            f.service.delete_draw(draw.id, Some(f.owner_id)).await,
            Err(AppError::DrawHasParticipants("delete"))
        ));

        let still_there = f.service.get_draw(draw.id, None).await.unwrap();
        assert_eq!(still_there.draw.prize_name, "Dinner for two");
    }

    #[tokio::test]
    async fn test_delete_draw() {
        let f = fixture().await;
        let draw = testing::insert_draw(&f.db, f.business_id, DrawStatus::Active).await;

        f.service.delete_draw(draw.id, Some(f.owner_id)).await.unwrap();
        assert!(matches!(
            f.service.get_draw(draw.id, None).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_participate() {
        let f = fixture().await;
        let draw = testing::insert_draw(&f.db, f.business_id, DrawStatus::Active).await;

        let rejected = f
            .service
            .participate(draw.id, Some(f.player_id), ParticipateRequest { accept_terms: false })
            .await;
        assert!(matches!(rejected, Err(AppError::ValidationError(_))));

        let joined = f
            .service
            .participate(draw.id, Some(f.player_id), ParticipateRequest { accept_terms: true })
            .await
            .unwrap();
        assert_eq!(joined.draw_id, draw.id);
        assert_eq!(joined.user_id, f.player_id);

        let again = f
            .service
            .participate(draw.id, Some(f.player_id), ParticipateRequest { accept_terms: true })
            .await;
        assert!(matches!(again, Err(AppError::AlreadyParticipated)));
    }

    #[tokio::test]
    async fn test_participate_rules() {
        let f = fixture().await;
        let closed = testing::insert_draw(&f.db, f.business_id, DrawStatus::Cancelled).await;
        let accept = || ParticipateRequest { accept_terms: true };

        assert!(matches!(
            f.service.participate(closed.id, Some(f.player_id), accept()).await,
            Err(AppError::DrawNotAvailable)
        ));
        assert!(matches!(
            f.service.participate(777, Some(f.player_id), accept()).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            f.service.participate(closed.id, Some(f.owner_id), accept()).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_long_win_probability() {
        let f = fixture().await;
        let mut request = conditional_request("Free dessert", 10);
        request.win_probability = Some("1".repeat(101));
        assert!(matches!(
            f.service.create_draw(Some(f.owner_id), request).await,
            Err(AppError::ValidationError(_))
        ));

        let mut request = conditional_request("Free dessert", 10);
        request.win_probability = Some("1".repeat(100));
        assert!(f.service.create_draw(Some(f.owner_id), request).await.is_ok());
    }

    #[tokio::test]
    async fn test_participation_on_deleted_draw_is_not_found() {
        let f = fixture().await;
        let draw = testing::insert_draw(&f.db, f.business_id, DrawStatus::Active).await;
        f.service.delete_draw(draw.id, Some(f.owner_id)).await.unwrap();

        let late = f.service.insert_participation(draw.id, f.player_id).await;
        assert!(matches!(late, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_rejected_mutation_releases_draw() {
        let f = fixture().await;
        let draw = testing::insert_draw(&f.db, f.business_id, DrawStatus::Active).await;

        let err = f
            .service
            .update_draw(draw.id, Some(f.owner_id), UpdateDrawRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        // 事务已回滚，后续写入不受影响
        f.service.delete_draw(draw.id, Some(f.owner_id)).await.unwrap();
        assert!(matches!(
            f.service.get_draw(draw.id, None).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_unique_index_settles_duplicate_insert() {
        let f = fixture().await;
        let draw = testing::insert_draw(&f.db, f.business_id, DrawStatus::Active).await;

        f.service
            .insert_participation(draw.id, f.player_id)
            .await
            .unwrap();
        let second = f.service.insert_participation(draw.id, f.player_id).await;
        assert!(matches!(second, Err(AppError::AlreadyParticipated)));
    }

    #[tokio::test]
    async fn test_list_participants_paginated() {
        let f = fixture().await;
        let draw = testing::insert_draw(&f.db, f.business_id, DrawStatus::Active).await;
        let mut newest_user = 0;
        for i in 0..5 {
            let user = testing::insert_user(
                &f.db,
                &format!("p{i}@example.com"),
                UserRole::User,
                None,
            )
            .await;
            // i = 4 最新
            testing::insert_participant(&f.db, draw.id, user.id, 10 - i).await;
            newest_user = user.id;
        }

        let page = f
            .service
            .list_participants(draw.id, Some(f.owner_id), &LimitOffsetParams::new(Some(2), None))
            .await
            .unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.limit, 2);
        assert_eq!(page.participants.len(), 2);
        assert_eq!(page.participants[0].user_id, newest_user);
        assert_eq!(page.participants[0].user_name.as_deref(), Some("p4"));
        assert_eq!(
            page.participants[0].user_email.as_deref(),
            Some("p4@example.com")
        );

        let tail = f
            .service
            .list_participants(
                draw.id,
                Some(f.owner_id),
                &LimitOffsetParams::new(Some(500), Some(4)),
            )
            .await
            .unwrap();
        assert_eq!(tail.limit, 100);
        assert_eq!(tail.participants.len(), 1);

        assert!(matches!(
            f.service
                .list_participants(draw.id, Some(f.other_owner_id), &LimitOffsetParams::default())
                .await,
            Err(AppError::Forbidden(_))
        ));
    }
}
