use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use diesel::prelude::{Insertable, Queryable};
use diesel::{ExpressionMethods, QueryDsl, Selectable, SelectableHelper};
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use lapin::Channel;
use serde::Serialize;

use crate::core::app_state::AppState;
use crate::core::rmq;
use crate::schema::outbox;

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::outbox)]
#[diesel(check_for_backend(diesel::pg::Pg))]
struct OutboxRow {
    pub id: i32,
    pub event_type: String,
    pub payload: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::outbox)]
struct CreateOutboxRow {
    pub event_type: String,
    pub payload: String,
    pub status: String,
}

/// Records an integration event in the outbox table. Called inside the same
/// transaction as the state change it announces, so the event is only
/// visible if the change commits.
pub async fn publish<E: Serialize>(
    conn: &mut AsyncPgConnection,
    event_type: String,
    event: E,
) -> Result<()> {
    let payload = serde_json::to_string(&event).context("Failed to serialize outbox event")?;

    diesel::insert_into(outbox::table)
        .values(CreateOutboxRow {
            event_type,
            payload,
            status: "PENDING".into(),
        })
        .execute(conn)
        .await
        .context("Failed to insert outbox event")?;

    Ok(())
}

/// Spawns the relay loop that drains PENDING outbox rows to the broker.
pub fn spawn_relay(channel: Channel, state: Arc<AppState>) {
    tokio::spawn(async move {
        loop {
            if let Err(err) = relay_once(&channel, &state).await {
                tracing::error!("Outbox relay pass failed: {err:#}");
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    });
}

async fn relay_once(channel: &Channel, state: &AppState) -> Result<()> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let pending: Vec<OutboxRow> = outbox::table
        .filter(outbox::status.eq("PENDING"))
        .order_by(outbox::created_at.asc())
        .limit(50)
        .select(OutboxRow::as_select())
        .get_results(conn)
        .await
        .context("Failed to fetch pending outbox rows")?;

    for row in pending {
        rmq::publish(channel, &row.event_type, row.payload.as_bytes()).await?;

        diesel::update(outbox::table.find(row.id))
            .set((
                outbox::status.eq("SENT"),
                outbox::updated_at.eq(diesel::dsl::now),
            ))
            .execute(conn)
            .await
            .context("Failed to mark outbox row as sent")?;
    }

    Ok(())
}
