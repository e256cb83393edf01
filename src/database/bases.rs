use sqlx::{PgConnection, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::models::BaseMapping;

const BASE_COLUMNS: &str = "base_id, company_code, base_number, iata, icao, region, business_division, \
     base_description, fbo_name, city, state, active, currency_code, default_units, base_country, base_time_zone";

/// Every base, ordered by id
pub async fn list(pool: &PgPool) -> Result<Vec<BaseMapping>, DatabaseError> {
    let sql = format!("SELECT {} FROM base_mapping ORDER BY base_id ASC", BASE_COLUMNS);
    let rows = sqlx::query_as::<_, BaseMapping>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find(conn: &mut PgConnection, base_id: &str) -> Result<Option<BaseMapping>, DatabaseError> {
    let sql = format!("SELECT {} FROM base_mapping WHERE base_id = $1", BASE_COLUMNS);
    let row = sqlx::query_as::<_, BaseMapping>(&sql)
        .bind(base_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}
