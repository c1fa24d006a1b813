//! Chart of accounts.

use ledgerline_core::account::{validate_fields, validate_parent};
use ledgerline_db::entities::accounts;
use ledgerline_db::repositories::{AccountFilter, AccountInput, AccountRepository};
use ledgerline_db::Gateway;
use ledgerline_events::EventPublisher;
use ledgerline_shared::types::{Page, PageResponse};
use ledgerline_shared::{AppError, AppResult, RequestContext};
use tracing::{debug, info};
use uuid::Uuid;

/// Account service.
#[derive(Debug, Clone)]
pub struct AccountService {
    gateway: Gateway,
    events: EventPublisher,
}

impl AccountService {
    /// Creates the service.
    #[must_use]
    pub fn new(gateway: Gateway, events: EventPublisher) -> Self {
        Self { gateway, events }
    }

    /// Creates an account after checking its fields and parent.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: AccountInput,
    ) -> AppResult<accounts::Model> {
        validate_fields(&input.code, &input.name)?;
        let actor = ctx.actor();

        let account = ctx
            .run(self.gateway.with_transaction(None, move |txn| {
                Box::pin(async move {
                    let repo = AccountRepository::new(txn);
                    if let Some(parent) = input.parent_id {
                        validate_parent(None, parent, &repo.parent_map().await?)?;
                    }
                    let account = repo.create(input, actor).await?;
                    Ok::<_, AppError>(account)
                })
            }))
            .await?;

        info!(account_id = %account.id, code = %account.code, "Account created");
        self.events.account_created(ctx, &account).await;
        Ok(account)
    }

    /// Fetches an account.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> AppResult<accounts::Model> {
        ctx.run(async {
            AccountRepository::new(self.gateway.connection())
                .get(id)
                .await
                .map_err(AppError::from)
        })
        .await
    }

    /// Lists accounts ordered by code.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: &AccountFilter,
        page: Page,
    ) -> AppResult<PageResponse<accounts::Model>> {
        ctx.run(async {
            let (items, total) = AccountRepository::new(self.gateway.connection())
                .list(filter, page)
                .await?;
            Ok::<_, AppError>(PageResponse::new(items, page, total))
        })
        .await
    }

    /// Rewrites an account. The parent chain is re-walked so the account
    /// can never become its own ancestor.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        revision: i64,
        input: AccountInput,
    ) -> AppResult<accounts::Model> {
        validate_fields(&input.code, &input.name)?;
        let actor = ctx.actor();

        let account = ctx
            .run(self.gateway.with_transaction(None, move |txn| {
                Box::pin(async move {
                    let repo = AccountRepository::new(txn);
                    if let Some(parent) = input.parent_id {
                        validate_parent(Some(id), parent, &repo.parent_map().await?)?;
                    }
                    let account = repo.update(id, revision, input, actor).await?;
                    Ok::<_, AppError>(account)
                })
            }))
            .await?;

        info!(account_id = %account.id, revision = account.revision, "Account updated");
        self.events.account_updated(ctx, &account).await;
        Ok(account)
    }

    /// Deletes an account. A missing id is not an error.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        let removed = ctx
            .run(async {
                AccountRepository::new(self.gateway.connection())
                    .delete(id)
                    .await
                    .map_err(AppError::from)
            })
            .await?;

        if removed {
            info!(account_id = %id, "Account deleted");
            self.events.account_deleted(ctx, id).await;
        } else {
            debug!(account_id = %id, "Account already absent");
        }
        Ok(())
    }
}
