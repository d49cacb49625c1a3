use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Posts {
    Table,
    Id,
    UserId,
    Title,
    Body,
    CreatedAt,
    UpdatedAt,
}

fn create_posts_table() -> TableCreateStatement {
    Table::create()
        .table(Posts::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Posts::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(Posts::UserId).integer().null())
        .col(ColumnDef::new(Posts::Title).string().not_null())
        .col(ColumnDef::new(Posts::Body).text().not_null())
        .col(
            ColumnDef::new(Posts::CreatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .col(
            ColumnDef::new(Posts::UpdatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .to_owned()
}

// Backs the default newest-first listing.
fn create_created_at_index() -> IndexCreateStatement {
    Index::create()
        .if_not_exists()
        .name("idx_posts_created_at")
        .table(Posts::Table)
        .col(Posts::CreatedAt)
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(create_posts_table()).await?;
        manager.create_index(create_created_at_index()).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Posts::Table).to_owned())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn posts_table_matches_entity_columns() {
        let sql = create_posts_table().to_string(PostgresQueryBuilder);
        assert!(sql.starts_with(r#"CREATE TABLE IF NOT EXISTS "posts""#));
        for column in ["id", "user_id", "title", "body", "created_at", "updated_at"] {
            assert!(sql.contains(&format!("\"{column}\"")), "missing {column}");
        }
        assert!(sql.contains(r#""body" text NOT NULL"#));
    }

    #[test]
    fn migration_is_named_after_its_module() {
        assert_eq!(Migration.name(), "m20250101_000001_create_posts");
    }
}
