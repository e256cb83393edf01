use sqlx::PgConnection;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{ReservationRecord, ReservationRow};

const RESERVATION_COLUMNS: &str = "id, reservation_no, base_id, reservation_name, customer_account_number, \
     tail_number, status, reservation_type, created_at, updated_at, est_arrival_at, act_arrival_at, \
     est_departure_at, act_departure_at, fbo_name, res_created_date, flight_name, flight_model, flight_type";

/// Insert the reservation or, when `reservation_no` already exists, overwrite
/// every mutable attribute. Returns the internal id in both cases.
///
/// Last writer wins: reservations are synced from a single upstream source.
pub async fn upsert(conn: &mut PgConnection, record: &ReservationRecord) -> Result<Uuid, DatabaseError> {
    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO reservations (
            reservation_no, base_id, reservation_name, customer_account_number, tail_number,
            status, reservation_type, est_arrival_at, act_arrival_at, est_departure_at,
            act_departure_at, fbo_name, res_created_date, flight_name, flight_model,
            flight_type, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, now())
        ON CONFLICT (reservation_no) DO UPDATE SET
            base_id = EXCLUDED.base_id,
            reservation_name = EXCLUDED.reservation_name,
            customer_account_number = EXCLUDED.customer_account_number,
            tail_number = EXCLUDED.tail_number,
            status = EXCLUDED.status,
            reservation_type = EXCLUDED.reservation_type,
            est_arrival_at = EXCLUDED.est_arrival_at,
            act_arrival_at = EXCLUDED.act_arrival_at,
            est_departure_at = EXCLUDED.est_departure_at,
            act_departure_at = EXCLUDED.act_departure_at,
            fbo_name = EXCLUDED.fbo_name,
            res_created_date = EXCLUDED.res_created_date,
            flight_name = EXCLUDED.flight_name,
            flight_model = EXCLUDED.flight_model,
            flight_type = EXCLUDED.flight_type,
            updated_at = now()
        RETURNING id
        "#,
    )
    .bind(&record.reservation_no)
    .bind(&record.base_id)
    .bind(&record.reservation_name)
    .bind(&record.customer_account_number)
    .bind(&record.tail_number)
    .bind(&record.status)
    .bind(&record.reservation_type)
    .bind(record.est_arrival_at)
    .bind(record.act_arrival_at)
    .bind(record.est_departure_at)
    .bind(record.act_departure_at)
    .bind(&record.fbo_name)
    .bind(record.res_created_date)
    .bind(&record.flight_name)
    .bind(&record.flight_model)
    .bind(&record.flight_type)
    .fetch_one(&mut *conn)
    .await?;

    Ok(id)
}

/// Look up a reservation by its external number
pub async fn find_by_number(conn: &mut PgConnection, reservation_no: &str) -> Result<Option<ReservationRow>, DatabaseError> {
    let sql = format!("SELECT {} FROM reservations WHERE reservation_no = $1", RESERVATION_COLUMNS);
    let row = sqlx::query_as::<_, ReservationRow>(&sql)
        .bind(reservation_no)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}
