//! `SeaORM` Entity for invoices.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{InvoiceStatus, InvoiceType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub invoice_number: String,
    pub invoice_type: InvoiceType,
    pub invoice_date: DateTimeUtc,
    pub due_date: Option<DateTimeUtc>,
    pub delivery_date: Option<DateTimeUtc>,
    pub status: InvoiceStatus,
    pub status_note: Option<String>,
    pub counterparty_name: Option<String>,
    pub currency: String,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub subtotal: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub grand_total: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub gst_rate: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub cgst: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub sgst: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub igst: Option<Decimal>,
    pub created_at: DateTimeUtc,
    pub created_by: Option<Uuid>,
    pub updated_at: DateTimeUtc,
    pub updated_by: Option<Uuid>,
    pub revision: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::invoice_items::Entity")]
    InvoiceItems,
    #[sea_orm(has_many = "super::invoice_taxes::Entity")]
    InvoiceTaxes,
    #[sea_orm(has_many = "super::invoice_discounts::Entity")]
    InvoiceDiscounts,
    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,
}

impl Related<super::invoice_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvoiceItems.def()
    }
}

impl Related<super::invoice_taxes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvoiceTaxes.def()
    }
}

impl Related<super::invoice_discounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvoiceDiscounts.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
