use crate::clients::{InvoiceRenderer, Mailer, PaymentGateway};
use crate::db::{DbPool, OrmConn};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub mailer: Mailer,
    pub invoices: InvoiceRenderer,
    pub payments: PaymentGateway,
}
