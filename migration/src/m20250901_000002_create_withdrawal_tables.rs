use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum WithdrawalRequests {
    Table,
    Id,
    DoctorId,
    Amount,
    PaymentMethod,
    Status,
    BankName,
    AccountNumber,
    AccountHolderName,
    MobileProvider,
    MobileNumber,
    PaidBy,
    PaidAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum DoctorWallets {
    Table,
    Id,
    DoctorId,
    Balance,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum WalletTransactions {
    Table,
    Id,
    DoctorId,
    Type,
    Amount,
    Description,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WithdrawalRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WithdrawalRequests::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(WithdrawalRequests::DoctorId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WithdrawalRequests::Amount)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WithdrawalRequests::PaymentMethod)
                            .string_len(30)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WithdrawalRequests::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(WithdrawalRequests::BankName)
                            .string_len(100)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(WithdrawalRequests::AccountNumber)
                            .string_len(50)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(WithdrawalRequests::AccountHolderName)
                            .string_len(100)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(WithdrawalRequests::MobileProvider)
                            .string_len(50)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(WithdrawalRequests::MobileNumber)
                            .string_len(30)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(WithdrawalRequests::PaidBy)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(WithdrawalRequests::PaidAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(WithdrawalRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp())
                            .null(),
                    )
                    .col(
                        ColumnDef::new(WithdrawalRequests::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp())
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_withdrawal_requests_doctor")
                            .from(WithdrawalRequests::Table, WithdrawalRequests::DoctorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DoctorWallets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DoctorWallets::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DoctorWallets::DoctorId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(DoctorWallets::Balance)
                            .double()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DoctorWallets::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp())
                            .null(),
                    )
                    .col(
                        ColumnDef::new(DoctorWallets::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp())
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WalletTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WalletTransactions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(WalletTransactions::DoctorId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WalletTransactions::Type)
                            .string_len(10)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WalletTransactions::Amount)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WalletTransactions::Description)
                            .string_len(255)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(WalletTransactions::Status)
                            .string_len(20)
                            .not_null()
                            .default("completed"),
                    )
                    .col(
                        ColumnDef::new(WalletTransactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp())
                            .null(),
                    )
                    .col(
                        ColumnDef::new(WalletTransactions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp())
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WalletTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DoctorWallets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WithdrawalRequests::Table).to_owned())
            .await?;
        Ok(())
    }
}
