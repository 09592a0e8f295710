use crate::api::error::AppError;
use crate::entities::{prelude::*, *};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter, QueryOrder,
    QuerySelect,
};

/// Derived per-link statistics. Computed from the access log on every
/// request, never stored; correct for zero-log links (zero counts, no
/// last-opened timestamp).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkStats {
    pub view_count: i64,
    pub unique_viewers: i64,
    pub last_opened: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(FromQueryResult)]
struct LogAggregate {
    view_count: i64,
    unique_viewers: i64,
    last_opened: Option<chrono::DateTime<chrono::Utc>>,
}

pub struct StatsService;

impl StatsService {
    /// Aggregate the access log for one link: total views, distinct
    /// viewer addresses and the most recent access. A single pass over
    /// the log table; counts include rows logged against expired links
    /// since logging is ungated by default.
    pub async fn link_stats(
        db: &DatabaseConnection,
        share_link_pk: &str,
    ) -> Result<LinkStats, AppError> {
        let agg = ShareLinkLogs::find()
            .select_only()
            .column_as(share_link_logs::Column::Id.count(), "view_count")
            .column_as(
                Expr::col(share_link_logs::Column::IpAddress).count_distinct(),
                "unique_viewers",
            )
            .column_as(share_link_logs::Column::Timestamp.max(), "last_opened")
            .filter(share_link_logs::Column::ShareLinkId.eq(share_link_pk))
            .into_model::<LogAggregate>()
            .one(db)
            .await?;

        // An ungrouped aggregate always yields one row; treat a missing
        // row the same as an empty log anyway.
        Ok(match agg {
            Some(agg) => LinkStats {
                view_count: agg.view_count,
                unique_viewers: agg.unique_viewers,
                last_opened: agg.last_opened,
            },
            None => LinkStats {
                view_count: 0,
                unique_viewers: 0,
                last_opened: None,
            },
        })
    }

    /// Per-link stats for every link of a document, newest link first.
    /// Stats stay per-link; callers roll up totals as needed.
    pub async fn document_stats(
        db: &DatabaseConnection,
        document_id: &str,
    ) -> Result<Vec<(share_links::Model, LinkStats)>, AppError> {
        let links = ShareLinks::find()
            .filter(share_links::Column::DocumentId.eq(document_id))
            .order_by_desc(share_links::Column::CreatedAt)
            .all(db)
            .await?;

        let mut result = Vec::with_capacity(links.len());
        for link in links {
            let stats = Self::link_stats(db, &link.id).await?;
            result.push((link, stats));
        }

        Ok(result)
    }
}
