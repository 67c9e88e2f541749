//! In-memory SQLite fixtures for service and handler tests.

use crate::entities::{
    DrawStatus, DrawType, UserRole, business_entity as businesses, draw_entity as draws,
    draw_participant_entity as participants, user_entity as users,
};
use chrono::{Duration, Utc};
use sea_orm::sea_query::Index;
use sea_orm::{
    ActiveModelTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend,
    Schema, Set,
};

/// Creates a fresh database with the draws schema, including the
/// `(draw_id, user_id)` unique index.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("failed to open in-memory sqlite");

    let backend = db.get_database_backend();
    let schema = Schema::new(DbBackend::Sqlite);
    let tables = [
        schema.create_table_from_entity(businesses::Entity),
        schema.create_table_from_entity(users::Entity),
        schema.create_table_from_entity(draws::Entity),
        schema.create_table_from_entity(participants::Entity),
    ];
    for table in tables {
        db.execute(backend.build(&table))
            .await
            .expect("failed to create table");
    }

    let unique = Index::create()
        .name("idx_draw_participants_draw_user_unique")
        .table(participants::Entity)
        .col(participants::Column::DrawId)
        .col(participants::Column::UserId)
        .unique()
        .to_owned();
    db.execute(backend.build(&unique))
        .await
        .expect("failed to create unique index");

    db
}

pub async fn insert_business(db: &DatabaseConnection, name: &str) -> businesses::Model {
    businesses::ActiveModel {
        name: Set(name.to_string()),
        email: Set(Some(format!("contact@{}.test", name.to_lowercase()))),
        city: Set(Some("Lyon".to_string())),
        created_at: Set(Some(Utc::now())),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("failed to insert business")
}

pub async fn insert_user(
    db: &DatabaseConnection,
    email: &str,
    role: UserRole,
    business_id: Option<i64>,
) -> users::Model {
    users::ActiveModel {
        email: Set(email.to_string()),
        name: Set(email.split('@').next().unwrap_or(email).to_string()),
        role: Set(role),
        business_id: Set(business_id),
        is_active: Set(true),
        created_at: Set(Some(Utc::now())),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("failed to insert user")
}

pub async fn insert_inactive_user(db: &DatabaseConnection, email: &str) -> users::Model {
    users::ActiveModel {
        email: Set(email.to_string()),
        name: Set("Inactive".to_string()),
        role: Set(UserRole::User),
        business_id: Set(None),
        is_active: Set(false),
        created_at: Set(Some(Utc::now())),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("failed to insert user")
}

/// Inserts a conditional draw directly, bypassing validation.
pub async fn insert_draw(
    db: &DatabaseConnection,
    business_id: i64,
    status: DrawStatus,
) -> draws::Model {
    let now = Utc::now();
    draws::ActiveModel {
        business_id: Set(business_id),
        prize_name: Set("Dinner for two".to_string()),
        prize_description: Set(None),
        prize_image_url: Set(None),
        draw_type: Set(DrawType::Conditional),
        draw_date: Set(None),
        trigger_threshold: Set(Some(100)),
        win_probability: Set(None),
        terms_url: Set(None),
        use_default_terms: Set(true),
        custom_terms: Set(None),
        status: Set(status),
        winner_user_id: Set(None),
        drawn_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("failed to insert draw")
}

pub async fn insert_participant(
    db: &DatabaseConnection,
    draw_id: i64,
    user_id: i64,
    minutes_ago: i64,
) -> participants::Model {
    participants::ActiveModel {
        draw_id: Set(draw_id),
        user_id: Set(user_id),
        participated_at: Set(Utc::now() - Duration::minutes(minutes_ago)),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("failed to insert participant")
}
