//! Sorted projections of a store snapshot.

use std::{cmp::Ordering, sync::Arc};

use shared::domain::{MailItem, SortColumn, SortDirection, SortState};

/// Header indicator for the active sort column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortIcon {
    Up,
    Down,
}

impl SortIcon {
    pub fn glyph(self) -> &'static str {
        match self {
            SortIcon::Up => "▲",
            SortIcon::Down => "▼",
        }
    }
}

/// Returns a newly ordered copy of `snapshot`; the input is never reordered.
///
/// The sort is stable in both directions: items whose keys compare equal keep
/// their snapshot order.
pub fn project(snapshot: &[Arc<MailItem>], sort: SortState) -> Vec<Arc<MailItem>> {
    let mut projected = snapshot.to_vec();
    projected.sort_by(|a, b| {
        let ordering = compare_column(a, b, sort.column);
        match sort.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
    projected
}

pub fn sort_icon(sort: SortState, column: SortColumn) -> Option<SortIcon> {
    if sort.column != column {
        return None;
    }
    match sort.direction {
        SortDirection::Descending => Some(SortIcon::Down),
        SortDirection::Ascending => Some(SortIcon::Up),
    }
}

fn compare_column(a: &MailItem, b: &MailItem, column: SortColumn) -> Ordering {
    match column {
        SortColumn::DateSent => a.date_sent.cmp(&b.date_sent),
        SortColumn::FromAddress => a.from_address.cmp(&b.from_address),
        SortColumn::ToAddresses => a.compressed_recipients().cmp(&b.compressed_recipients()),
        SortColumn::Subject => a.subject.cmp(&b.subject),
    }
}

#[cfg(test)]
#[path = "tests/projector_tests.rs"]
mod tests;
