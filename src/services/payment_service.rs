use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveEnum, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use crate::database::DbPool;
use crate::entities::{PaymentStatus, payment_entity as payments};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::{PaginatedResponse, PaginationParams};

use super::filters::{load_users, lower_like, matching_user_ids, search_pattern};

#[derive(Clone)]
pub struct PaymentService {
    pool: DbPool,
}

impl PaymentService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn list_payments(
        &self,
        query: &PaymentListQuery,
    ) -> AppResult<PaginatedResponse<PaymentResponse>> {
        let params = PaginationParams::new(query.page, query.limit);
        let status: Option<PaymentStatus> = parse_filter(query.status.as_deref())?;

        let mut select = payments::Entity::find();
        if let Some(s) = status {
            select = select.filter(payments::Column::Status.eq(s));
        }
        if let Some(gateway) = active_filter(query.gateway.as_deref()) {
            select = select.filter(payments::Column::Gateway.eq(gateway));
        }
        if let Some(pattern) = search_pattern(query.search.as_deref()) {
            select = select.filter(
                Condition::any()
                    .add(lower_like(payments::Column::TransactionId, &pattern))
                    .add(lower_like(payments::Column::Reference, &pattern))
                    .add(payments::Column::UserId.in_subquery(matching_user_ids(&pattern))),
            );
        }

        let total = select.clone().count(&*self.pool).await?;
        let rows = select
            .order_by_desc(payments::Column::CreatedAt)
            .order_by_desc(payments::Column::Id)
            .offset(params.get_offset())
            .limit(params.get_limit())
            .all(&*self.pool)
            .await?;

        let people = load_users(&self.pool, rows.iter().map(|p| p.user_id).collect()).await?;
        let items = rows
            .into_iter()
            .map(|p| {
                let user = people.get(&p.user_id).map(ParticipantSummary::from);
                PaymentResponse {
                    user,
                    ..PaymentResponse::from(p)
                }
            })
            .collect();

        Ok(PaginatedResponse::new(items, &params, total))
    }

    pub async fn update_status(
        &self,
        payment_id: i64,
        raw_status: Option<&str>,
    ) -> AppResult<PaymentResponse> {
        let status: PaymentStatus = parse_status(raw_status)?;

        let result = payments::Entity::update_many()
            .col_expr(payments::Column::Status, Expr::value(status.into_value()))
            .col_expr(payments::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(payments::Column::Id.eq(payment_id))
            .exec(&*self.pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Payment not found".to_string()));
        }

        let payment = payments::Entity::find_by_id(payment_id)
            .one(&*self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))?;
        log::info!("Payment {} status set to {:?}", payment_id, status);

        Ok(PaymentResponse::from(payment))
    }
}
