//! Rows for database tests
//!
//! Tests using these run under `#[sqlx::test]`, which creates a scratch
//! database from `DATABASE_URL` and applies the migrations.

use chrono::{NaiveDate, NaiveTime};
use shared::models::{ExchangeRequest, RequestStatus, Shift, User, UserRole, Workplace};
use sqlx::PgPool;

pub fn user(id: i64, role: UserRole, parent: Option<i64>) -> User {
    User {
        id,
        username: format!("u{id}"),
        email: format!("u{id}@example.cz"),
        password_hash: String::new(),
        first_name: "Test".into(),
        last_name: format!("User{id}"),
        phone: None,
        role,
        parent_company_id: parent,
        company_name: (role == UserRole::Company).then(|| format!("Firma {id}")),
        company_ico: None,
        company_dic: None,
        company_address: None,
        hourly_rate: None,
        is_active: true,
        created_at: 1,
        updated_at: 1,
    }
}

pub async fn insert_user(
    pool: &PgPool,
    id: i64,
    role: UserRole,
    parent: Option<i64>,
) -> sqlx::Result<User> {
    let user = user(id, role, parent);
    super::users::create(pool, &user).await?;
    Ok(user)
}

pub async fn insert_workplace(pool: &PgPool, id: i64, owner_id: i64) -> sqlx::Result<Workplace> {
    let workplace = Workplace {
        id,
        owner_id,
        name: format!("Provozovna {id}"),
        address: Some("Náměstí 1, Brno".into()),
        notes: Some("Vchod ze dvora".into()),
        created_at: 1,
        updated_at: 1,
    };
    super::workplaces::create(pool, &workplace).await?;
    Ok(workplace)
}

pub async fn insert_shift(
    pool: &PgPool,
    id: i64,
    workplace_id: i64,
    user_id: Option<i64>,
    day: u32,
) -> sqlx::Result<Shift> {
    let shift = Shift {
        id,
        workplace_id,
        user_id,
        date: NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
        start_time: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(14, 30, 0).unwrap(),
        notes: Some(format!("směna {id}")),
        created_at: 1,
        updated_at: 1,
    };
    super::shifts::create(pool, &shift).await?;
    Ok(shift)
}

pub async fn insert_exchange_request(
    pool: &PgPool,
    id: i64,
    requester: (i64, i64),
    requestee: (i64, i64),
) -> sqlx::Result<ExchangeRequest> {
    let request = ExchangeRequest {
        id,
        requester_id: requester.0,
        requestee_id: requestee.0,
        requester_shift_id: requester.1,
        requestee_shift_id: requestee.1,
        status: RequestStatus::Pending,
        message: None,
        created_at: 1,
        updated_at: 1,
    };
    super::exchange_requests::create(pool, &request).await?;
    Ok(request)
}
