//! Ownership facts for the access decision table

use sqlx::PgPool;

use crate::auth::access::{Ownership, ResourceKind};

fn ownership_sql(kind: ResourceKind) -> String {
    match kind {
        ResourceKind::Workplace => "SELECT w.owner_id, u.parent_company_id AS owner_parent_company_id, \
                    w.owner_id AS managing_company_id \
             FROM workplaces w JOIN users u ON u.id = w.owner_id WHERE w.id = $1"
            .to_string(),
        ResourceKind::Shift => "SELECT s.user_id AS owner_id, u.parent_company_id AS owner_parent_company_id, \
                    w.owner_id AS managing_company_id \
             FROM shifts s JOIN workplaces w ON w.id = s.workplace_id \
             LEFT JOIN users u ON u.id = s.user_id WHERE s.id = $1"
            .to_string(),
        ResourceKind::Customer
        | ResourceKind::Invoice
        | ResourceKind::Document
        | ResourceKind::Report => format!(
            "SELECT t.user_id AS owner_id, u.parent_company_id AS owner_parent_company_id, \
                    NULL::BIGINT AS managing_company_id \
             FROM {} t JOIN users u ON u.id = t.user_id WHERE t.id = $1",
            table(kind)
        ),
    }
}

fn table(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Workplace => "workplaces",
        ResourceKind::Shift => "shifts",
        ResourceKind::Customer => "customers",
        ResourceKind::Invoice => "invoices",
        ResourceKind::Document => "documents",
        ResourceKind::Report => "reports",
    }
}

/// `None` when the record does not exist
pub async fn load(
    pool: &PgPool,
    kind: ResourceKind,
    id: i64,
) -> Result<Option<Ownership>, sqlx::Error> {
    let sql = ownership_sql(kind);
    sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
}
