use crate::model::{EnrichedDeal, User};

/// Selects and orders the deals to feature in one user's email.
///
/// Keeps deals from the user's preferred retailers, sorts them by price
/// ascending (ties keep catalog order) and truncates to `cap` when one
/// is configured. A user with no matching deals gets an empty list, not
/// an error.
pub fn personalize(user: &User, catalog: &[EnrichedDeal], cap: Option<usize>) -> Vec<EnrichedDeal> {
    let mut matched: Vec<EnrichedDeal> = catalog
        .iter()
        .filter(|d| user.preferred_retailer_ids.contains(&d.retailer_id))
        .cloned()
        .collect();
    matched.sort_by(|a, b| a.price.cmp(&b.price));
    if let Some(cap) = cap {
        matched.truncate(cap);
    }
    matched
}
