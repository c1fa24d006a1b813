//! Exchange rate quotes.

use chrono::{DateTime, Utc};
use ledgerline_core::amount::check_rate;
use ledgerline_core::currency::{normalize_code, validate_quote};
use ledgerline_db::Gateway;
use ledgerline_db::entities::exchange_rates;
use ledgerline_db::repositories::{ExchangeRateFilter, ExchangeRateInput, ExchangeRateRepository};
use ledgerline_events::EventPublisher;
use ledgerline_shared::types::{Page, PageResponse};
use ledgerline_shared::{AppError, AppResult, RequestContext};
use tracing::{debug, info};
use uuid::Uuid;

fn validate(mut input: ExchangeRateInput) -> AppResult<ExchangeRateInput> {
    let (base, quote) = validate_quote(&input.base_currency, &input.quote_currency, input.rate)?;
    check_rate("rate", input.rate)?;
    input.base_currency = base;
    input.quote_currency = quote;
    Ok(input)
}

/// Exchange rate service.
#[derive(Debug, Clone)]
pub struct ExchangeRateService {
    gateway: Gateway,
    events: EventPublisher,
}

impl ExchangeRateService {
    /// Creates the service.
    #[must_use]
    pub fn new(gateway: Gateway, events: EventPublisher) -> Self {
        Self { gateway, events }
    }

    /// Records a quote. A second quote for the same pair and `as_of` is a
    /// conflict.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: ExchangeRateInput,
    ) -> AppResult<exchange_rates::Model> {
        let input = validate(input)?;
        let actor = ctx.actor();

        let rate = ctx
            .run(async {
                ExchangeRateRepository::new(self.gateway.connection())
                    .create(input, actor)
                    .await
                    .map_err(AppError::from)
            })
            .await?;

        info!(
            rate_id = %rate.id,
            pair = %format!("{}/{}", rate.base_currency, rate.quote_currency),
            rate = %rate.rate,
            "Exchange rate recorded"
        );
        self.events.exchange_rate_created(ctx, &rate).await;
        Ok(rate)
    }

    /// Fetches a quote.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> AppResult<exchange_rates::Model> {
        ctx.run(async {
            ExchangeRateRepository::new(self.gateway.connection())
                .get(id)
                .await
                .map_err(AppError::from)
        })
        .await
    }

    /// Lists quotes, optionally for one base and/or quote currency.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: ExchangeRateFilter,
        page: Page,
    ) -> AppResult<PageResponse<exchange_rates::Model>> {
        let filter = ExchangeRateFilter {
            base_currency: filter
                .base_currency
                .map(|c| normalize_code("base_currency", &c))
                .transpose()?,
            quote_currency: filter
                .quote_currency
                .map(|c| normalize_code("quote_currency", &c))
                .transpose()?,
        };
        ctx.run(async {
            let (items, total) = ExchangeRateRepository::new(self.gateway.connection())
                .list(&filter, page)
                .await?;
            Ok::<_, AppError>(PageResponse::new(items, page, total))
        })
        .await
    }

    /// Newest quote for the pair with `as_of <= at` (now when absent).
    pub async fn latest(
        &self,
        ctx: &RequestContext,
        base: &str,
        quote: &str,
        at: Option<DateTime<Utc>>,
    ) -> AppResult<exchange_rates::Model> {
        let base = normalize_code("base_currency", base)?;
        let quote = normalize_code("quote_currency", quote)?;
        let at = at.unwrap_or_else(Utc::now);
        ctx.run(async {
            ExchangeRateRepository::new(self.gateway.connection())
                .latest(&base, &quote, at)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("no {base}/{quote} rate as of {}", at.to_rfc3339()))
                })
        })
        .await
    }

    /// Rewrites a quote.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        revision: i64,
        input: ExchangeRateInput,
    ) -> AppResult<exchange_rates::Model> {
        let input = validate(input)?;
        let actor = ctx.actor();

        let rate = ctx
            .run(async {
                ExchangeRateRepository::new(self.gateway.connection())
                    .update(id, revision, input, actor)
                    .await
                    .map_err(AppError::from)
            })
            .await?;

        info!(rate_id = %rate.id, revision = rate.revision, "Exchange rate updated");
        self.events.exchange_rate_updated(ctx, &rate).await;
        Ok(rate)
    }

    /// Deletes a quote. A missing id is not an error.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        let removed = ctx
            .run(async {
                ExchangeRateRepository::new(self.gateway.connection())
                    .delete(id)
                    .await
                    .map_err(AppError::from)
            })
            .await?;

        if removed {
            info!(rate_id = %id, "Exchange rate deleted");
            self.events.exchange_rate_deleted(ctx, id).await;
        } else {
            debug!(rate_id = %id, "Exchange rate already absent");
        }
        Ok(())
    }
}
