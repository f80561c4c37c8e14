use serde::{Deserialize, Serialize};
use uuid::Uuid;

use numu_types::models::{Equipment, EquipmentPatch};

use crate::error::{MarketError, MarketResult};

/// Catalog query. Every predicate is optional and they combine with AND;
/// empty strings count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogFilter {
    pub category: Option<String>,
    pub city: Option<String>,
    #[serde(default)]
    pub available_only: bool,
    /// Case-insensitive substring over name and description.
    #[serde(rename = "q")]
    pub search: Option<String>,
    pub min_day_rate: Option<u64>,
    pub max_day_rate: Option<u64>,
}

impl CatalogFilter {
    pub fn matches(&self, eq: &Equipment) -> bool {
        if let Some(category) = non_empty(&self.category) {
            if eq.category != category {
                return false;
            }
        }
        if let Some(city) = non_empty(&self.city) {
            if eq.city != city {
                return false;
            }
        }
        if self.available_only && !eq.available {
            return false;
        }
        if let Some(query) = non_empty(&self.search) {
            let query = query.to_lowercase();
            if !eq.name.to_lowercase().contains(&query)
                && !eq.description.to_lowercase().contains(&query)
            {
                return false;
            }
        }
        if self.min_day_rate.is_some_and(|min| eq.day_rate < min) {
            return false;
        }
        if self.max_day_rate.is_some_and(|max| eq.day_rate > max) {
            return false;
        }
        true
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Equipment listings, newest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    listings: Vec<Equipment>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn all(&self) -> &[Equipment] {
        &self.listings
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.get(id).is_some()
    }

    /// Prepends a listing.
    pub fn add(&mut self, listing: Equipment) {
        self.listings.insert(0, listing);
    }

    pub fn get(&self, id: Uuid) -> Option<&Equipment> {
        self.listings.iter().find(|eq| eq.id == id)
    }

    fn get_mut(&mut self, id: Uuid) -> MarketResult<&mut Equipment> {
        self.listings
            .iter_mut()
            .find(|eq| eq.id == id)
            .ok_or(MarketError::NotFound {
                kind: "equipment",
                id,
            })
    }

    pub fn filter(&self, filter: &CatalogFilter) -> Vec<&Equipment> {
        self.listings.iter().filter(|eq| filter.matches(eq)).collect()
    }

    pub fn by_owner(&self, owner_id: Uuid) -> Vec<&Equipment> {
        self.listings
            .iter()
            .filter(|eq| eq.owner_id == owner_id)
            .collect()
    }

    pub fn set_availability(&mut self, id: Uuid, available: bool) -> MarketResult<&Equipment> {
        let eq = self.get_mut(id)?;
        eq.available = available;
        Ok(eq)
    }

    pub fn update(&mut self, id: Uuid, patch: &EquipmentPatch) -> MarketResult<&Equipment> {
        let eq = self.get_mut(id)?;
        if let Some(name) = &patch.name {
            eq.name = name.clone();
        }
        if let Some(description) = &patch.description {
            eq.description = description.clone();
        }
        if let Some(category) = &patch.category {
            eq.category = category.clone();
        }
        if let Some(city) = &patch.city {
            eq.city = city.clone();
        }
        if let Some(location) = &patch.location {
            eq.location = location.clone();
        }
        if let Some(day_rate) = patch.day_rate {
            eq.day_rate = day_rate;
        }
        if let Some(week_rate) = patch.week_rate {
            eq.week_rate = week_rate;
        }
        if let Some(image) = &patch.image {
            eq.image = image.clone();
        }
        if let Some(specifications) = &patch.specifications {
            eq.specifications = specifications.clone();
        }
        if let Some(available) = patch.available {
            eq.available = available;
        }
        Ok(eq)
    }

    pub fn remove(&mut self, id: Uuid) -> Option<Equipment> {
        let index = self.listings.iter().position(|eq| eq.id == id)?;
        Some(self.listings.remove(index))
    }

    /// Replaces the aggregate rating fields with values computed from reviews.
    pub fn apply_rating(&mut self, id: Uuid, average: f64, count: u32) -> MarketResult<()> {
        let eq = self.get_mut(id)?;
        eq.rating = average;
        eq.reviews_count = count;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::listing;

    fn sample() -> (Catalog, [Uuid; 3]) {
        let owner = Uuid::new_v4();
        let mut tractor = listing(owner, "جرار زراعي جون ديري", "tractors", "الرياض", 800);
        tractor.description = "Powerful tractor with hydraulics".into();
        let mut busy_tractor = listing(owner, "جرار كبير", "tractors", "بريدة", 900);
        busy_tractor.available = false;
        let harvester = listing(owner, "حصادة القمح", "harvesters", "الرياض", 1500);

        let ids = [tractor.id, busy_tractor.id, harvester.id];
        let mut catalog = Catalog::new();
        // Added oldest first, so the catalog reads harvester, busy_tractor, tractor.
        catalog.add(tractor);
        catalog.add(busy_tractor);
        catalog.add(harvester);
        (catalog, ids)
    }

    #[test]
    fn add_prepends() {
        let (catalog, [tractor, busy, harvester]) = sample();
        let order: Vec<Uuid> = catalog.all().iter().map(|eq| eq.id).collect();
        assert_eq!(order, vec![harvester, busy, tractor]);
    }

    #[test]
    fn empty_filter_returns_everything_in_order() {
        let (catalog, _) = sample();
        let all: Vec<Uuid> = catalog
            .filter(&CatalogFilter::default())
            .into_iter()
            .map(|eq| eq.id)
            .collect();
        let expected: Vec<Uuid> = catalog.all().iter().map(|eq| eq.id).collect();
        assert_eq!(all, expected);
    }

    #[test]
    fn category_and_availability_combine() {
        let (catalog, [tractor, _, _]) = sample();
        let filter = CatalogFilter {
            category: Some("tractors".into()),
            available_only: true,
            ..Default::default()
        };
        let hits = catalog.filter(&filter);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, tractor);
    }

    #[test]
    fn search_is_case_insensitive_over_name_and_description() {
        let (catalog, [tractor, _, harvester]) = sample();
        let by_description = CatalogFilter {
            search: Some("HYDRAULICS".into()),
            ..Default::default()
        };
        assert_eq!(catalog.filter(&by_description)[0].id, tractor);

        let by_name = CatalogFilter {
            search: Some("القمح".into()),
            ..Default::default()
        };
        let hits = catalog.filter(&by_name);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, harvester);
    }

    #[test]
    fn blank_strings_do_not_filter() {
        let (catalog, _) = sample();
        let filter = CatalogFilter {
            category: Some(String::new()),
            city: Some("  ".into()),
            search: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(catalog.filter(&filter).len(), 3);
    }

    #[test]
    fn day_rate_range_is_inclusive() {
        let (catalog, _) = sample();
        let filter = CatalogFilter {
            min_day_rate: Some(800),
            max_day_rate: Some(900),
            ..Default::default()
        };
        assert_eq!(catalog.filter(&filter).len(), 2);
    }

    #[test]
    fn availability_change_is_visible_to_next_filter() {
        let (mut catalog, [tractor, _, _]) = sample();
        let available = CatalogFilter {
            available_only: true,
            ..Default::default()
        };
        assert_eq!(catalog.filter(&available).len(), 2);

        catalog.set_availability(tractor, false).unwrap();
        assert_eq!(catalog.filter(&available).len(), 1);
    }

    #[test]
    fn lookups_of_unknown_ids() {
        let (mut catalog, _) = sample();
        let missing = Uuid::new_v4();
        assert!(catalog.get(missing).is_none());
        assert!(catalog.remove(missing).is_none());
        assert!(matches!(
            catalog.set_availability(missing, true),
            Err(MarketError::NotFound { .. })
        ));
    }

    #[test]
    fn patch_only_touches_given_fields() {
        let (mut catalog, [tractor, _, _]) = sample();
        let patch = EquipmentPatch {
            day_rate: Some(750),
            city: Some("حائل".into()),
            ..Default::default()
        };
        let updated = catalog.update(tractor, &patch).unwrap();
        assert_eq!(updated.day_rate, 750);
        assert_eq!(updated.city, "حائل");
        assert_eq!(updated.category, "tractors");
        assert_eq!(updated.week_rate, 4800);
    }
}
