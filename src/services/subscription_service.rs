use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveEnum, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

use crate::database::DbPool;
use crate::entities::{SubscriptionStatus, subscription_entity as subscriptions};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::{PaginatedResponse, PaginationParams};

#[derive(Clone)]
pub struct SubscriptionService {
    pool: DbPool,
}

impl SubscriptionService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn list_subscriptions(
        &self,
        query: &SubscriptionListQuery,
    ) -> AppResult<PaginatedResponse<SubscriptionResponse>> {
        let params = PaginationParams::new(query.page, query.limit);
        let status: Option<SubscriptionStatus> = parse_filter(query.status.as_deref())?;

        let mut select = subscriptions::Entity::find();
        if let Some(s) = status {
            select = select.filter(subscriptions::Column::Status.eq(s));
        }
        if let Some(user_id) = query.user_id {
            select = select.filter(subscriptions::Column::UserId.eq(user_id));
        }

        let total = select.clone().count(&*self.pool).await?;
        let rows = select
            .order_by_desc(subscriptions::Column::CreatedAt)
            .order_by_desc(subscriptions::Column::Id)
            .offset(params.get_offset())
            .limit(params.get_limit())
            .all(&*self.pool)
            .await?;

        Ok(PaginatedResponse::new(
            rows.into_iter().map(SubscriptionResponse::from).collect(),
            &params,
            total,
        ))
    }

    /// `is_active` follows the new status in the same statement.
    pub async fn update_status(
        &self,
        subscription_id: i64,
        raw_status: Option<&str>,
    ) -> AppResult<SubscriptionResponse> {
        let status: SubscriptionStatus = parse_status(raw_status)?;

        let result = subscriptions::Entity::update_many()
            .col_expr(subscriptions::Column::Status, Expr::value(status.into_value()))
            .col_expr(subscriptions::Column::IsActive, Expr::value(status.is_active()))
            .col_expr(subscriptions::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(subscriptions::Column::Id.eq(subscription_id))
            .exec(&*self.pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Subscription not found".to_string()));
        }

        let subscription = subscriptions::Entity::find_by_id(subscription_id)
            .one(&*self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Subscription not found".to_string()))?;
        log::info!("Subscription {} status set to {:?}", subscription_id, status);

        Ok(SubscriptionResponse::from(subscription))
    }
}
