use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_store_table::Migration),
            Box::new(m20240101_000002_create_employee_table::Migration),
            Box::new(m20240101_000003_create_inventory_table::Migration),
        ]
    }
}

mod m20240101_000001_create_store_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_store_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Store::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Store::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Store::Name).string_len(50).null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Store::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Store {
        Table,
        Id,
        Name,
    }
}

mod m20240101_000002_create_employee_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_employee_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Employee::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Employee::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Employee::Name).string_len(50).null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Employee::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Employee {
        Table,
        Id,
        Name,
    }
}

mod m20240101_000003_create_inventory_table {
    use super::m20240101_000001_create_store_table::Store;
    use super::m20240101_000002_create_employee_table::Employee;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_inventory_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Inventory::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Inventory::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Inventory::StoreId).integer().null())
                        .col(ColumnDef::new(Inventory::EmployeeId).integer().null())
                        .col(ColumnDef::new(Inventory::Date).date().not_null())
                        .col(ColumnDef::new(Inventory::Flavor).string_len(50).not_null())
                        .col(
                            ColumnDef::new(Inventory::IsSeasonFlavor)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Inventory::Quantity).integer().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_inventory_store")
                                .from(Inventory::Table, Inventory::StoreId)
                                .to(Store::Table, Store::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_inventory_employee")
                                .from(Inventory::Table, Inventory::EmployeeId)
                                .to(Employee::Table, Employee::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_flavor")
                        .table(Inventory::Table)
                        .col(Inventory::Flavor)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_date")
                        .table(Inventory::Table)
                        .col(Inventory::Date)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Inventory::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Inventory {
        Table,
        Id,
        StoreId,
        EmployeeId,
        Date,
        Flavor,
        IsSeasonFlavor,
        Quantity,
    }
}
