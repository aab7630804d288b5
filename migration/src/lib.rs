pub use sea_orm_migration::prelude::*;

mod m20241001_000001_create_users_table;

pub struct DirectoryMigrator;

#[async_trait::async_trait]
impl MigratorTrait for DirectoryMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20241001_000001_create_users_table::Migration)]
    }
}
