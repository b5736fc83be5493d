use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveEnum, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Set, TransactionTrait,
};
use serde_json::json;

use crate::config::AdminAccountConfig;
use crate::database::DbPool;
use crate::entities::{
    UserType, WithdrawalStatus, doctor_wallet_entity as wallets, user_entity as users,
    wallet_transaction_entity as wallet_transactions, withdrawal_entity as withdrawals,
};
use crate::error::{AppError, AppResult};
use crate::external::{EmailTemplate, Mailer};
use crate::models::*;
use crate::utils::normalize_email;

use super::AuthService;
use super::filters::load_users;

#[derive(Clone)]
pub struct WithdrawalService {
    pool: DbPool,
    auth_service: AuthService,
    mailer: Mailer,
}

impl WithdrawalService {
    pub fn new(pool: DbPool, auth_service: AuthService, mailer: Mailer) -> Self {
        Self {
            pool,
            auth_service,
            mailer,
        }
    }

    pub async fn list_withdrawals(
        &self,
        query: &WithdrawalListQuery,
    ) -> AppResult<Vec<WithdrawalResponse>> {
        let status: Option<WithdrawalStatus> = parse_filter(query.status.as_deref())?;

        let mut select = withdrawals::Entity::find();
        if let Some(s) = status {
            select = select.filter(withdrawals::Column::Status.eq(s));
        }
        if let Some(doctor_id) = query.doctor_id {
            select = select.filter(withdrawals::Column::DoctorId.eq(doctor_id));
        }
        let rows = select
            .order_by_desc(withdrawals::Column::CreatedAt)
            .order_by_desc(withdrawals::Column::Id)
            .all(&*self.pool)
            .await?;

        let doctors = load_users(&self.pool, rows.iter().map(|w| w.doctor_id).collect()).await?;
        Ok(rows
            .into_iter()
            .map(|w| {
                let doctor = doctors.get(&w.doctor_id).map(ParticipantSummary::from);
                WithdrawalResponse {
                    doctor,
                    ..WithdrawalResponse::from(w)
                }
            })
            .collect())
    }

    pub async fn update_status(
        &self,
        withdrawal_id: i64,
        request: &WithdrawalStatusUpdateRequest,
    ) -> AppResult<(WithdrawalResolution, WithdrawalResponse)> {
        let resolution: WithdrawalResolution = parse_status(request.status.as_deref())?;

        let completed_by = request
            .completed_by
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        if resolution == WithdrawalResolution::Completed && completed_by.is_none() {
            return Err(AppError::ValidationError(
                "completed_by is required for completed status".to_string(),
            ));
        }
        // 提供了 completed_by 时，无论哪种结果都要校验
        let paid_by = match completed_by {
            Some(admin_id) => {
                let admin = self.auth_service.find_admin(admin_id).ok_or_else(|| {
                    AppError::ValidationError("Invalid admin ID provided".to_string())
                })?;
                self.admin_user_id(admin).await
            }
            None => None,
        };

        let txn = self.pool.begin().await?;

        let current = withdrawals::Entity::find_by_id(withdrawal_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Withdrawal request not found".to_string()))?;
        if current.status == WithdrawalStatus::Completed {
            return Err(AppError::ValidationError(
                "Withdrawal request has already been completed".to_string(),
            ));
        }

        let now = Utc::now();
        let status = WithdrawalStatus::from(resolution);
        withdrawals::Entity::update_many()
            .col_expr(withdrawals::Column::Status, Expr::value(status.into_value()))
            .col_expr(withdrawals::Column::PaidBy, Expr::value(paid_by))
            .col_expr(withdrawals::Column::PaidAt, Expr::value(now))
            .col_expr(withdrawals::Column::UpdatedAt, Expr::value(now))
            .filter(withdrawals::Column::Id.eq(withdrawal_id))
            .exec(&txn)
            .await?;

        if resolution == WithdrawalResolution::Completed {
            debit_wallet(&txn, &current).await?;
        }

        txn.commit().await?;
        log::info!(
            "Withdrawal request {} marked {} (paid_by: {:?})",
            withdrawal_id,
            resolution.as_str(),
            paid_by
        );

        let updated = withdrawals::Entity::find_by_id(withdrawal_id)
            .one(&*self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Withdrawal request not found".to_string()))?;
        let doctor = users::Entity::find_by_id(updated.doctor_id)
            .one(&*self.pool)
            .await?;

        if resolution == WithdrawalResolution::Completed {
            match &doctor {
                Some(d) => {
                    let data = json!({
                        "name": d.full_name(),
                        "amount": updated.amount,
                        "payment_method": updated.payment_method.label(),
                        "reference": updated.id,
                    });
                    self.mailer
                        .send(EmailTemplate::WithdrawalCompleted, &d.email, &data)
                        .await;
                }
                None => log::warn!(
                    "Doctor {} for withdrawal {} not found, completion email skipped",
                    updated.doctor_id,
                    withdrawal_id
                ),
            }
        }

        let response = WithdrawalResponse {
            doctor: doctor.as_ref().map(ParticipantSummary::from),
            ..WithdrawalResponse::from(updated)
        };
        Ok((resolution, response))
    }

    /// The admin's row in `users`, matched by email. Lookup failures leave `paid_by` empty.
    async fn admin_user_id(&self, admin: &AdminAccountConfig) -> Option<i64> {
        let email = normalize_email(&admin.email);
        let found = users::Entity::find()
            .filter(users::Column::Email.eq(email.as_str()))
            .filter(users::Column::UserType.eq(UserType::Admin))
            .one(&*self.pool)
            .await;
        match found {
            Ok(Some(user)) => Some(user.id),
            Ok(None) => {
                log::warn!("No admin user row for {}, paid_by left empty", email);
                None
            }
            Err(e) => {
                log::error!("Failed to look up admin user {}: {}", email, e);
                None
            }
        }
    }
}

/// 扣减医生钱包并记录流水
async fn debit_wallet(txn: &DatabaseTransaction, withdrawal: &withdrawals::Model) -> AppResult<()> {
    let now = Utc::now();
    let wallet = wallets::Entity::find()
        .filter(wallets::Column::DoctorId.eq(withdrawal.doctor_id))
        .lock_exclusive()
        .one(txn)
        .await?;
    if wallet.is_none() {
        wallets::Entity::insert(wallets::ActiveModel {
            doctor_id: Set(withdrawal.doctor_id),
            balance: Set(0.0),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        })
        .exec_without_returning(txn)
        .await?;
    }

    wallets::Entity::update_many()
        .col_expr(
            wallets::Column::Balance,
            Expr::col(wallets::Column::Balance).sub(withdrawal.amount),
        )
        .col_expr(wallets::Column::UpdatedAt, Expr::value(now))
        .filter(wallets::Column::DoctorId.eq(withdrawal.doctor_id))
        .exec(txn)
        .await?;

    wallet_transactions::Entity::insert(wallet_transactions::ActiveModel {
        doctor_id: Set(withdrawal.doctor_id),
        transaction_type: Set("debit".to_string()),
        amount: Set(withdrawal.amount),
        description: Set(Some(format!(
            "Withdrawal processed - {}",
            withdrawal.payment_method.label()
        ))),
        status: Set("completed".to_string()),
        created_at: Set(Some(now)),
        updated_at: Set(Some(now)),
        ..Default::default()
    })
    .exec_without_returning(txn)
    .await?;

    Ok(())
}
