use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Links a material into a collection.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Membership {
    pub collection_id: String,
    pub material_id: String,
}

/// Marks a collection as part of a user's personal list.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Subscription {
    pub user_id: String,
    pub collection_id: String,
}

/// At most one record exists per (user_id, material_id). A missing record
/// reads as not completed.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct CompletionRecord {
    pub user_id: String,
    pub material_id: String,
    pub completed: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct XpTotals {
    pub total_xp: i64,
    pub earned_xp: i64,
}

impl XpTotals {
    /// Totals over `(xp, completed)` pairs of distinct materials.
    pub fn from_materials<I>(materials: I) -> Self
    where
        I: IntoIterator<Item = (i64, bool)>,
    {
        materials
            .into_iter()
            .fold(XpTotals::default(), |mut totals, (xp, completed)| {
                totals.total_xp += xp;
                if completed {
                    totals.earned_xp += xp;
                }
                totals
            })
    }
}
