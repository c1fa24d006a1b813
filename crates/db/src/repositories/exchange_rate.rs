//! Exchange rate quotes.
//!
//! A quote is identified by `(base_currency, quote_currency, as_of)`; storing
//! the same triple twice is a `Duplicate`.

use chrono::{DateTime, Utc};
use ledgerline_shared::types::Page;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::audited;
use crate::entities::exchange_rates;
use crate::error::GatewayError;

/// Writable fields of a quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRateInput {
    /// Currency being priced.
    pub base_currency: String,
    /// Currency the price is expressed in.
    pub quote_currency: String,
    /// Units of quote per unit of base; must be positive.
    pub rate: Decimal,
    /// Effective instant.
    pub as_of: DateTime<Utc>,
    /// Where the quote came from.
    #[serde(default)]
    pub source: Option<String>,
}

/// Filter options for listing quotes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExchangeRateFilter {
    /// Base currency.
    pub base_currency: Option<String>,
    /// Quote currency.
    pub quote_currency: Option<String>,
}

/// Exchange rate repository.
#[derive(Debug)]
pub struct ExchangeRateRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> ExchangeRateRepository<'a, C> {
    /// Creates a repository over `db`, which may be a pool or a transaction.
    #[must_use]
    pub const fn new(db: &'a C) -> Self {
        Self { db }
    }

    fn changes(input: ExchangeRateInput) -> exchange_rates::ActiveModel {
        exchange_rates::ActiveModel {
            base_currency: Set(input.base_currency),
            quote_currency: Set(input.quote_currency),
            rate: Set(input.rate),
            as_of: Set(input.as_of),
            source: Set(input.source),
            ..Default::default()
        }
    }

    /// Inserts a quote.
    pub async fn create(
        &self,
        input: ExchangeRateInput,
        actor: Option<Uuid>,
    ) -> Result<exchange_rates::Model, GatewayError> {
        audited::insert_new::<exchange_rates::Entity, _, _>(self.db, Self::changes(input), actor)
            .await
    }

    /// Fetches a quote by id.
    pub async fn get(&self, id: Uuid) -> Result<exchange_rates::Model, GatewayError> {
        audited::get::<exchange_rates::Entity, _>(self.db, id).await
    }

    /// Lists quotes newest first.
    pub async fn list(
        &self,
        filter: &ExchangeRateFilter,
        page: Page,
    ) -> Result<(Vec<exchange_rates::Model>, u64), GatewayError> {
        let mut query = exchange_rates::Entity::find();
        if let Some(base) = &filter.base_currency {
            query = query.filter(exchange_rates::Column::BaseCurrency.eq(base.as_str()));
        }
        if let Some(quote) = &filter.quote_currency {
            query = query.filter(exchange_rates::Column::QuoteCurrency.eq(quote.as_str()));
        }
        let query = query
            .order_by_desc(exchange_rates::Column::CreatedAt)
            .order_by_desc(exchange_rates::Column::Id);
        audited::fetch_page(self.db, query, page).await
    }

    /// Newest quote for the pair effective at or before `at`.
    pub async fn latest(
        &self,
        base: &str,
        quote: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<exchange_rates::Model>, GatewayError> {
        Ok(exchange_rates::Entity::find()
            .filter(exchange_rates::Column::BaseCurrency.eq(base))
            .filter(exchange_rates::Column::QuoteCurrency.eq(quote))
            .filter(exchange_rates::Column::AsOf.lte(at))
            .order_by_desc(exchange_rates::Column::AsOf)
            .order_by_desc(exchange_rates::Column::Id)
            .one(self.db)
            .await?)
    }

    /// Rewrites every writable field if `revision` still matches.
    pub async fn update(
        &self,
        id: Uuid,
        revision: i64,
        input: ExchangeRateInput,
        actor: Option<Uuid>,
    ) -> Result<exchange_rates::Model, GatewayError> {
        audited::update_checked::<exchange_rates::Entity, _, _>(
            self.db,
            id,
            revision,
            Self::changes(input),
            actor,
        )
        .await
    }

    /// Deletes a quote.
    pub async fn delete(&self, id: Uuid) -> Result<bool, GatewayError> {
        audited::delete::<exchange_rates::Entity, _>(self.db, id).await
    }
}
