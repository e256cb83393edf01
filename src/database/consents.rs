use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{ConsentDraft, ConsentRecord, ConsentRow, StoredConsent, CONSENT_CHANNEL};

/// Result of a consent write. A duplicate without overwrite is an expected
/// business outcome, not a storage error.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsentOutcome {
    Inserted(ConsentRecord),
    Replaced(ConsentRecord),
    Conflict,
}

#[derive(FromRow)]
struct WrittenConsent {
    #[sqlx(flatten)]
    record: ConsentRecord,
    inserted: bool,
}

/// Write the consent for `reservation_id`.
///
/// With `overwrite` an existing consent is replaced in place (its id and
/// `created_at` survive, everything else is rewritten). Without it, an existing
/// consent leaves the table untouched and yields `ConsentOutcome::Conflict`.
pub async fn write(
    conn: &mut PgConnection,
    reservation_id: Uuid,
    draft: &ConsentDraft,
    overwrite: bool,
) -> Result<ConsentOutcome, DatabaseError> {
    let on_conflict = if overwrite {
        r#"
        ON CONFLICT (reservation_id) DO UPDATE SET
            full_name = EXCLUDED.full_name,
            terms_and_conditions = EXCLUDED.terms_and_conditions,
            terms_version = EXCLUDED.terms_version,
            geo_location = EXCLUDED.geo_location,
            channel = EXCLUDED.channel,
            signature_image = EXCLUDED.signature_image,
            updated_at = now()
        "#
    } else {
        "ON CONFLICT (reservation_id) DO NOTHING"
    };

    // xmax is zero only for a freshly inserted tuple
    let sql = format!(
        r#"
        INSERT INTO consents (
            reservation_id, full_name, terms_and_conditions, terms_version,
            geo_location, channel, signature_image, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, now(), now())
        {}
        RETURNING id, terms_version, geo_location, channel, created_at, updated_at,
                  (xmax = 0) AS inserted
        "#,
        on_conflict
    );

    let written = sqlx::query_as::<_, WrittenConsent>(&sql)
        .bind(reservation_id)
        .bind(&draft.full_name)
        .bind(&draft.terms_text)
        .bind(&draft.terms_version)
        .bind(&draft.geo_location)
        .bind(CONSENT_CHANNEL)
        .bind(&draft.signature)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(match written {
        None => ConsentOutcome::Conflict,
        Some(w) if w.inserted => ConsentOutcome::Inserted(w.record),
        Some(w) => ConsentOutcome::Replaced(w.record),
    })
}

/// Consent attached to a reservation, with the signature only when asked for
pub async fn find_for_reservation(
    conn: &mut PgConnection,
    reservation_id: Uuid,
    include_signature: bool,
) -> Result<Option<ConsentRow>, DatabaseError> {
    let row = sqlx::query_as::<_, ConsentRow>(
        r#"
        SELECT id, full_name, terms_version, terms_and_conditions, geo_location, channel,
               created_at, updated_at,
               CASE WHEN $2 THEN signature_image ELSE NULL END AS signature_image
        FROM consents
        WHERE reservation_id = $1
        "#,
    )
    .bind(reservation_id)
    .bind(include_signature)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row)
}

/// Consents for a batch of external reservation numbers, in one round trip
pub async fn find_by_reservation_numbers(
    pool: &PgPool,
    reservation_numbers: &[String],
) -> Result<Vec<StoredConsent>, DatabaseError> {
    if reservation_numbers.is_empty() {
        return Ok(vec![]);
    }

    let rows = sqlx::query_as::<_, StoredConsent>(
        r#"
        SELECT r.reservation_no, c.full_name, c.terms_version, c.geo_location,
               c.created_at, c.signature_image
        FROM reservations r
        JOIN consents c ON c.reservation_id = r.id
        WHERE r.reservation_no = ANY($1)
        "#,
    )
    .bind(reservation_numbers)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
