use sea_orm_migration::prelude::*;

/// Businesses (restaurants owning draws)
#[derive(DeriveIden)]
enum Businesses {
    Table,
    Id,
    Name,
    Email,
    City,
    CreatedAt,
}

/// Users (participants, restaurant staff, admins)
#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    Name,
    Role,
    BusinessId,
    IsActive,
    CreatedAt,
}

/// Draws (prize giveaways)
#[derive(DeriveIden)]
enum Draws {
    Table,
    Id,
    BusinessId,
    PrizeName,
    PrizeDescription,
    PrizeImageUrl,
    DrawType,
    DrawDate,
    TriggerThreshold,
    WinProbability,
    TermsUrl,
    UseDefaultTerms,
    CustomTerms,
    Status,
    WinnerUserId,
    DrawnAt,
    CreatedAt,
    UpdatedAt,
}

/// Draw participants (one row per user entry)
#[derive(DeriveIden)]
enum DrawParticipants {
    Table,
    Id,
    DrawId,
    UserId,
    ParticipatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Businesses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Businesses::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Businesses::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Businesses::Email).string_len(255).null())
                    .col(ColumnDef::new(Businesses::City).string_len(255).null())
                    .col(
                        ColumnDef::new(Businesses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Email).string_len(255).not_null())
                    .col(ColumnDef::new(Users::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string_len(20)
                            .not_null()
                            .default("user"),
                    )
                    .col(ColumnDef::new(Users::BusinessId).big_integer().null())
                    .col(
                        ColumnDef::new(Users::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_business")
                            .from(Users::Table, Users::BusinessId)
                            .to(Businesses::Table, Businesses::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_email_unique")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Draws::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Draws::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Draws::BusinessId).big_integer().not_null())
                    .col(ColumnDef::new(Draws::PrizeName).string_len(200).not_null())
                    .col(ColumnDef::new(Draws::PrizeDescription).text().null())
                    .col(ColumnDef::new(Draws::PrizeImageUrl).text().null())
                    .col(ColumnDef::new(Draws::DrawType).string_len(20).not_null())
                    .col(
                        ColumnDef::new(Draws::DrawDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Draws::TriggerThreshold).integer().null())
                    .col(ColumnDef::new(Draws::WinProbability).string_len(100).null())
                    .col(ColumnDef::new(Draws::TermsUrl).text().null())
                    .col(
                        ColumnDef::new(Draws::UseDefaultTerms)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Draws::CustomTerms).text().null())
                    .col(
                        ColumnDef::new(Draws::Status)
                            .string_len(20)
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(Draws::WinnerUserId).big_integer().null())
                    .col(
                        ColumnDef::new(Draws::DrawnAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Draws::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Draws::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_draws_business")
                            .from(Draws::Table, Draws::BusinessId)
                            .to(Businesses::Table, Businesses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_draws_winner")
                            .from(Draws::Table, Draws::WinnerUserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 餐厅列表查询: business_id + created_at 倒序
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_draws_business_created")
                    .table(Draws::Table)
                    .col(Draws::BusinessId)
                    .col(Draws::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DrawParticipants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DrawParticipants::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DrawParticipants::DrawId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DrawParticipants::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DrawParticipants::ParticipatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_draw_participants_draw")
                            .from(DrawParticipants::Table, DrawParticipants::DrawId)
                            .to(Draws::Table, Draws::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_draw_participants_user")
                            .from(DrawParticipants::Table, DrawParticipants::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 一个用户在同一个抽奖中只能参与一次
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_draw_participants_draw_user_unique")
                    .table(DrawParticipants::Table)
                    .col(DrawParticipants::DrawId)
                    .col(DrawParticipants::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 删除顺序：参与记录 -> 抽奖 -> 用户 -> 商家
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(DrawParticipants::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().if_exists().table(Draws::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().if_exists().table(Users::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().if_exists().table(Businesses::Table).to_owned())
            .await?;

        Ok(())
    }
}
