use sqlx::PgConnection;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{ServiceLine, ServiceLineRow};

/// Replace every service line of a reservation with `lines`, preserving their
/// order. Must run inside the caller's transaction: between the delete and the
/// last insert the reservation has an incomplete set.
pub async fn replace(conn: &mut PgConnection, reservation_id: Uuid, lines: &[ServiceLine]) -> Result<(), DatabaseError> {
    let removed = sqlx::query("DELETE FROM reservation_services WHERE reservation_id = $1")
        .bind(reservation_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    for (position, line) in lines.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO reservation_services (
                reservation_id, product_id, product_name, product_status, quantity,
                service_date, subcase_id, for_arrival_or_departure, dsf_product_name,
                service_request_details, vendor_name, on_arrival, on_departure,
                phone_number, email_address, quoted_price, special_instruction_value,
                vendor_rep, crew_meal_count, pax_meal_count, crew_or_passenger,
                position, created_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                $17, $18, $19, $20, $21, $22, now()
            )
            "#,
        )
        .bind(reservation_id)
        .bind(&line.product_id)
        .bind(&line.product_name)
        .bind(&line.product_status)
        .bind(line.quantity)
        .bind(line.service_date)
        .bind(&line.subcase_id)
        .bind(&line.for_arrival_or_departure)
        .bind(&line.dsf_product_name)
        .bind(&line.service_request_details)
        .bind(&line.vendor_name)
        .bind(line.on_arrival)
        .bind(line.on_departure)
        .bind(&line.phone_number)
        .bind(&line.email_address)
        .bind(line.quoted_price)
        .bind(&line.special_instruction_value)
        .bind(&line.vendor_rep)
        .bind(line.crew_meal_count)
        .bind(line.pax_meal_count)
        .bind(&line.crew_or_passenger)
        .bind(position as i32)
        .execute(&mut *conn)
        .await?;
    }

    tracing::debug!(
        "Replaced service lines for reservation {}: {} removed, {} inserted",
        reservation_id,
        removed,
        lines.len()
    );
    Ok(())
}

/// Service lines of a reservation in the order they were synced
pub async fn list(conn: &mut PgConnection, reservation_id: Uuid) -> Result<Vec<ServiceLineRow>, DatabaseError> {
    let rows = sqlx::query_as::<_, ServiceLineRow>(
        r#"
        SELECT id, product_id, product_name, product_status, quantity, service_date,
               vendor_name, on_arrival, on_departure, quoted_price, special_instruction_value
        FROM reservation_services
        WHERE reservation_id = $1
        ORDER BY position ASC, created_at ASC
        "#,
    )
    .bind(reservation_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}
