use sea_orm::entity::prelude::*;

/// One directory account. All attributes live in the `user_info` JSON blob.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Serialized JSON object holding every account attribute
    #[sea_orm(column_type = "Text")]
    pub user_info: String,

    /// Unix timestamp (seconds), set once at insert
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
