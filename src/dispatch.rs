use std::future::Future;

use anyhow::Result;
use futures::future::join_all;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::DeliveryPartnerEntity;

#[derive(Serialize, Debug, ToSchema)]
pub struct DispatchFailure {
    pub partner_id: Uuid,
    pub reason: String,
}

/// Per-recipient outcome of a broadcast. Partial failure is reported here,
/// never raised as an error.
#[derive(Serialize, Debug, ToSchema)]
pub struct DispatchResult {
    pub requested: usize,
    pub notified: Vec<Uuid>,
    pub failed: Vec<DispatchFailure>,
}

/// Sends to every partner concurrently and collects the outcomes. The
/// dispatcher only fans out; whichever partner accepts first is resolved by
/// the external assignment service and reported back over the broker.
pub async fn fan_out<F, Fut>(partners: &[DeliveryPartnerEntity], send: F) -> DispatchResult
where
    F: Fn(&DeliveryPartnerEntity) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let outcomes = join_all(partners.iter().map(|partner| {
        let fut = send(partner);
        async move { (partner.id, fut.await) }
    }))
    .await;

    let mut result = DispatchResult {
        requested: partners.len(),
        notified: Vec::new(),
        failed: Vec::new(),
    };
    for (partner_id, outcome) in outcomes {
        match outcome {
            Ok(()) => result.notified.push(partner_id),
            Err(err) => result.failed.push(DispatchFailure {
                partner_id,
                reason: format!("{err:#}"),
            }),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use chrono::Utc;

    use super::*;

    fn partner(name: &str) -> DeliveryPartnerEntity {
        DeliveryPartnerEntity {
            id: Uuid::new_v4(),
            name: name.into(),
            phone: "8888888888".into(),
            callback_url: format!("http://partners.local/{name}"),
            is_available: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn partial_failure_is_collected_not_raised() {
        let partners = vec![partner("ravi"), partner("meena"), partner("kiran")];
        let unreachable = partners[1].id;

        let result = fan_out(&partners, |p| {
            let failed = p.id == unreachable;
            async move {
                if failed {
                    Err(anyhow!("connection refused"))
                } else {
                    Ok(())
                }
            }
        })
        .await;

        assert_eq!(result.requested, 3);
        assert_eq!(result.notified.len(), 2);
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].partner_id, unreachable);
        assert!(result.failed[0].reason.contains("connection refused"));
    }

    #[tokio::test]
    async fn empty_roster_dispatches_nothing() {
        let result = fan_out(&[], |_: &DeliveryPartnerEntity| async { Ok(()) }).await;
        assert_eq!(result.requested, 0);
        assert!(result.notified.is_empty());
        assert!(result.failed.is_empty());
    }
}
