use sea_orm::entity::prelude::*;

/// One stored document, addressed by its key.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "kv_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    /// Raw document, usually JSON.
    #[sea_orm(column_type = "Text")]
    pub value: String,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::sea_query::SqliteQueryBuilder;
    use sea_orm::{Database, DatabaseConnection, DbBackend, Schema, Set, Statement};

    async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();

        let schema = Schema::new(DbBackend::Sqlite);
        let stmt = schema.create_table_from_entity(Entity);
        let statement =
            Statement::from_string(DbBackend::Sqlite, stmt.to_string(SqliteQueryBuilder));
        db.execute(statement).await.unwrap();

        db
    }

    #[tokio::test]
    async fn test_insert_and_find_by_key() {
        let db = setup_test_db().await;
        let now = chrono::Utc::now().naive_utc();

        ActiveModel {
            key: Set("approvedPredictions".to_string()),
            value: Set("[]".to_string()),
            updated_at: Set(now),
        }
        .insert(&db)
        .await
        .unwrap();

        let found = Entity::find_by_id("approvedPredictions".to_string())
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.value, "[]");

        let missing = Entity::find_by_id("other".to_string()).one(&db).await.unwrap();
        assert!(missing.is_none());
    }
}
