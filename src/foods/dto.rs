use serde::Deserialize;

use crate::foods::repo_types::FoodQuery;

pub const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 200;

#[derive(Debug, Deserialize)]
pub struct FoodSearchParams {
    pub q: Option<String>,
    pub category: Option<String>,
    /// Comma-separated tag list.
    pub tags: Option<String>,
    pub limit: Option<usize>,
}

impl From<FoodSearchParams> for FoodQuery {
    fn from(p: FoodSearchParams) -> Self {
        let tags = p
            .tags
            .map(|raw| {
                raw.split(',')
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        FoodQuery {
            text: p.q.filter(|t| !t.trim().is_empty()),
            category: p.category.filter(|c| !c.is_empty()),
            tags,
            limit: p.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        }
    }
}
