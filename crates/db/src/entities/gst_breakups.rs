//! `SeaORM` Entity for GST amount splits, one per invoice.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "gst_breakups")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub invoice_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub taxable_value: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub cgst: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub sgst: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub igst: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub cess: Decimal,
    pub created_at: DateTimeUtc,
    pub created_by: Option<Uuid>,
    pub updated_at: DateTimeUtc,
    pub updated_by: Option<Uuid>,
    pub revision: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::invoices::Entity",
        from = "Column::InvoiceId",
        to = "super::invoices::Column::Id"
    )]
    Invoices,
}

impl Related<super::invoices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
