use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Deal, OTHER_SECTOR};

#[derive(Debug, Clone, Serialize)]
pub struct DigestSection {
    pub sector: String,
    pub deals: Vec<Deal>,
}

/// One run's worth of deals, grouped by sector in display order
#[derive(Debug, Clone, Serialize)]
pub struct Digest {
    pub generated_at: DateTime<Utc>,
    pub firm_name: String,
    pub window_hours: i64,
    pub sections: Vec<DigestSection>,
    pub total_found: usize,
}

impl Digest {
    /// Group deals under `sector_order`, then "Other" for anything left.
    /// Empty sectors are dropped; deal order within a sector is preserved.
    pub fn assemble(
        generated_at: DateTime<Utc>,
        firm_name: &str,
        window_hours: i64,
        sector_order: &[String],
        deals: Vec<Deal>,
        total_found: usize,
    ) -> Self {
        let mut order: Vec<&str> = sector_order.iter().map(String::as_str).collect();
        if !order.contains(&OTHER_SECTOR) {
            order.push(OTHER_SECTOR);
        }

        let mut sections: Vec<DigestSection> = order
            .iter()
            .map(|name| DigestSection {
                sector: name.to_string(),
                deals: Vec::new(),
            })
            .collect();

        let other_index = order
            .iter()
            .position(|name| *name == OTHER_SECTOR)
            .unwrap_or(sections.len() - 1);

        for deal in deals {
            let index = order
                .iter()
                .position(|name| *name == deal.sector)
                .unwrap_or(other_index);
            sections[index].deals.push(deal);
        }

        sections.retain(|s| !s.deals.is_empty());

        Self {
            generated_at,
            firm_name: firm_name.to_string(),
            window_hours,
            sections,
            total_found,
        }
    }

    pub fn total_kept(&self) -> usize {
        self.sections.iter().map(|s| s.deals.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn deals(&self) -> impl Iterator<Item = &Deal> {
        self.sections.iter().flat_map(|s| s.deals.iter())
    }
}
