//! Listing filter and tier segmentation.
//!
//! The public listing index is built entirely in memory:
//!
//! 1. All active listings are fetched, newest first
//! 2. `ListingFilter::apply` keeps the listings matching every active filter
//! 3. `partition_tiers` splits the survivors into premium / vip / normal
//!
//! # Filter Semantics
//!
//! - Filters combine with AND
//! - The sentinel `"all"` (or a missing/blank value) disables a filter
//! - Range filters use fixed brackets; a listing without the attribute
//!   never matches an active range filter
//! - Free-text search is a case-insensitive substring match on title and
//!   description
//!
//! Partitioning is stable: each tier keeps the input order.

use serde::Deserialize;
use uuid::Uuid;

use crate::{error::AppError, models::listing::Listing};

/// Sentinel value that disables a filter.
pub const ALL: &str = "all";

/// Age brackets offered by the public filter bar.
///
/// | Value | Range |
/// |---|---|
/// | `18-25` | 18..=25 |
/// | `26-35` | 26..=35 |
/// | `36-45` | 36..=45 |
/// | `46+` | >= 46 |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeBracket {
    From18To25,
    From26To35,
    From36To45,
    Over45,
}

impl AgeBracket {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "18-25" => Some(Self::From18To25),
            "26-35" => Some(Self::From26To35),
            "36-45" => Some(Self::From36To45),
            "46+" => Some(Self::Over45),
            _ => None,
        }
    }

    pub fn contains(self, age: i32) -> bool {
        match self {
            Self::From18To25 => (18..=25).contains(&age),
            Self::From26To35 => (26..=35).contains(&age),
            Self::From36To45 => (36..=45).contains(&age),
            Self::Over45 => age >= 46,
        }
    }
}

/// Height brackets in centimetres: short < 160, medium 160..=175, tall > 175.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeightBracket {
    Short,
    Medium,
    Tall,
}

impl HeightBracket {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "short" => Some(Self::Short),
            "medium" => Some(Self::Medium),
            "tall" => Some(Self::Tall),
            _ => None,
        }
    }

    pub fn contains(self, height_cm: i32) -> bool {
        match self {
            Self::Short => height_cm < 160,
            Self::Medium => (160..=175).contains(&height_cm),
            Self::Tall => height_cm > 175,
        }
    }
}

/// Weight brackets in kilograms: slim < 55, average 55..=70, curvy > 70.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightBracket {
    Slim,
    Average,
    Curvy,
}

impl WeightBracket {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "slim" => Some(Self::Slim),
            "average" => Some(Self::Average),
            "curvy" => Some(Self::Curvy),
            _ => None,
        }
    }

    pub fn contains(self, weight_kg: i32) -> bool {
        match self {
            Self::Slim => weight_kg < 55,
            Self::Average => (55..=70).contains(&weight_kg),
            Self::Curvy => weight_kg > 70,
        }
    }
}

/// Raw filter selection as it arrives in the query string.
///
/// # Example
///
/// `GET /api/v1/listings?city=all&age=18-25&height=tall&q=mer`
#[derive(Debug, Default, Deserialize)]
pub struct ListingFilterParams {
    pub city: Option<String>,
    pub category: Option<String>,
    pub age: Option<String>,
    pub height: Option<String>,
    pub weight: Option<String>,
    pub hair_color: Option<String>,
    pub q: Option<String>,
}

/// Parsed filter selection. `None` means the filter is disabled.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ListingFilter {
    pub city_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub age: Option<AgeBracket>,
    pub height: Option<HeightBracket>,
    pub weight: Option<WeightBracket>,
    /// Stored trimmed and lowercased
    pub hair_color: Option<String>,
    /// Stored trimmed and lowercased
    pub query: Option<String>,
}

/// Returns the trimmed value when it selects something, `None` for the
/// `"all"` sentinel or a blank value.
fn selected(value: Option<&str>) -> Option<&str> {
    let value = value?.trim();
    if value.is_empty() || value.eq_ignore_ascii_case(ALL) {
        None
    } else {
        Some(value)
    }
}

fn parse_selected<T>(
    key: &str,
    value: Option<&str>,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, AppError> {
    match selected(value) {
        None => Ok(None),
        Some(raw) => parse(&raw.to_ascii_lowercase())
            .map(Some)
            .ok_or_else(|| AppError::InvalidRequest(format!("Unknown {} filter: {}", key, raw))),
    }
}

impl ListingFilter {
    /// Parse the query-string selection.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` for an unknown bracket value or a malformed
    /// city/category id. Free-text and hair color accept any value.
    pub fn from_params(params: &ListingFilterParams) -> Result<Self, AppError> {
        let parse_id = |raw: &str| Uuid::parse_str(raw).ok();

        Ok(Self {
            city_id: parse_selected("city", params.city.as_deref(), parse_id)?,
            category_id: parse_selected("category", params.category.as_deref(), parse_id)?,
            age: parse_selected("age", params.age.as_deref(), AgeBracket::parse)?,
            height: parse_selected("height", params.height.as_deref(), HeightBracket::parse)?,
            weight: parse_selected("weight", params.weight.as_deref(), WeightBracket::parse)?,
            hair_color: selected(params.hair_color.as_deref()).map(str::to_lowercase),
            query: selected(params.q.as_deref()).map(str::to_lowercase),
        })
    }

    /// True when no filter is active.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Check a single listing against every active filter.
    pub fn matches(&self, listing: &Listing) -> bool {
        if let Some(city_id) = self.city_id {
            if listing.city_id != Some(city_id) {
                return false;
            }
        }

        if let Some(category_id) = self.category_id {
            if listing.category_id != Some(category_id) {
                return false;
            }
        }

        if let Some(bracket) = self.age {
            if !listing.age.is_some_and(|age| bracket.contains(age)) {
                return false;
            }
        }

        if let Some(bracket) = self.height {
            if !listing.height_cm.is_some_and(|h| bracket.contains(h)) {
                return false;
            }
        }

        if let Some(bracket) = self.weight {
            if !listing.weight_kg.is_some_and(|w| bracket.contains(w)) {
                return false;
            }
        }

        if let Some(ref hair_color) = self.hair_color {
            let same = listing
                .hair_color
                .as_deref()
                .is_some_and(|c| c.trim().to_lowercase() == *hair_color);
            if !same {
                return false;
            }
        }

        if let Some(ref query) = self.query {
            let in_title = listing.title.to_lowercase().contains(query.as_str());
            let in_description = listing
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(query.as_str()));
            if !in_title && !in_description {
                return false;
            }
        }

        true
    }

    /// Keep the listings matching every active filter, in input order.
    pub fn apply(&self, listings: Vec<Listing>) -> Vec<Listing> {
        if self.is_empty() {
            return listings;
        }

        listings.into_iter().filter(|l| self.matches(l)).collect()
    }
}

/// Display tier of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Premium,
    Vip,
    Normal,
}

impl Tier {
    /// Premium wins over VIP when both flags are set.
    pub fn of(listing: &Listing) -> Self {
        if listing.is_premium {
            Tier::Premium
        } else if listing.is_vip {
            Tier::Vip
        } else {
            Tier::Normal
        }
    }
}

/// Listings split into display tiers.
#[derive(Debug)]
pub struct Tiers<T> {
    pub premium: Vec<T>,
    pub vip: Vec<T>,
    pub normal: Vec<T>,
}

impl<T> Default for Tiers<T> {
    fn default() -> Self {
        Self {
            premium: Vec::new(),
            vip: Vec::new(),
            normal: Vec::new(),
        }
    }
}

impl<T> Tiers<T> {
    pub fn len(&self) -> usize {
        self.premium.len() + self.vip.len() + self.normal.len()
    }

    pub fn map<U>(self, f: impl Fn(T) -> U) -> Tiers<U> {
        Tiers {
            premium: self.premium.into_iter().map(&f).collect(),
            vip: self.vip.into_iter().map(&f).collect(),
            normal: self.normal.into_iter().map(&f).collect(),
        }
    }
}

/// Stable partition into premium / vip / normal.
pub fn partition_tiers(listings: Vec<Listing>) -> Tiers<Listing> {
    let mut tiers = Tiers::default();

    for listing in listings {
        match Tier::of(&listing) {
            Tier::Premium => tiers.premium.push(listing),
            Tier::Vip => tiers.vip.push(listing),
            Tier::Normal => tiers.normal.push(listing),
        }
    }

    tiers
}

/// Filter then partition, the full pipeline behind the public index.
pub fn filter_and_partition(listings: Vec<Listing>, filter: &ListingFilter) -> Tiers<Listing> {
    partition_tiers(filter.apply(listings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use proptest::prelude::*;

    fn listing(title: &str) -> Listing {
        let now = Utc::now();
        Listing {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            category_id: None,
            city_id: None,
            age: Some(24),
            height_cm: Some(168),
            weight_kg: Some(54),
            hair_color: Some("Blonde".to_string()),
            phone: None,
            image_url: None,
            is_premium: false,
            is_vip: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn ids(listings: &[Listing]) -> Vec<Uuid> {
        listings.iter().map(|l| l.id).collect()
    }

    fn sample() -> Vec<Listing> {
        let istanbul = Uuid::new_v4();
        let now = Utc::now();

        let mut merve = listing("Merve");
        merve.city_id = Some(istanbul);
        merve.is_premium = true;

        let mut ayla = listing("Ayla");
        ayla.description = Some("Tall and elegant".to_string());
        ayla.age = Some(31);
        ayla.height_cm = Some(180);
        ayla.weight_kg = Some(62);
        ayla.hair_color = Some("black".to_string());
        ayla.is_vip = true;
        ayla.created_at = now - Duration::hours(1);

        let mut selin = listing("Selin");
        selin.age = None;
        selin.height_cm = None;
        selin.weight_kg = None;
        selin.hair_color = None;
        selin.created_at = now - Duration::hours(2);

        let mut deniz = listing("Deniz");
        deniz.city_id = Some(istanbul);
        deniz.age = Some(47);
        deniz.height_cm = Some(159);
        deniz.weight_kg = Some(75);
        deniz.created_at = now - Duration::hours(3);

        vec![merve, ayla, selin, deniz]
    }

    fn params(f: impl FnOnce(&mut ListingFilterParams)) -> ListingFilterParams {
        let mut p = ListingFilterParams::default();
        f(&mut p);
        p
    }

    #[test]
    fn all_sentinels_return_input_unchanged() {
        let listings = sample();
        let expected = ids(&listings);

        let filter = ListingFilter::from_params(&ListingFilterParams {
            city: Some("all".into()),
            category: Some("ALL".into()),
            age: Some("all".into()),
            height: Some("all".into()),
            weight: Some("all".into()),
            hair_color: Some("all".into()),
            q: Some("   ".into()),
        })
        .unwrap();

        assert!(filter.is_empty());
        assert_eq!(ids(&filter.apply(listings)), expected);
    }

    #[test]
    fn filtered_result_is_ordered_subset() {
        let listings = sample();
        let original = ids(&listings);

        let filter =
            ListingFilter::from_params(&params(|p| p.height = Some("medium".into()))).unwrap();
        let kept = ids(&filter.apply(listings));

        assert!(!kept.is_empty());
        let positions: Vec<usize> = kept
            .iter()
            .map(|id| original.iter().position(|o| o == id).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn filters_combine_with_and() {
        let listings = sample();
        let istanbul = listings[0].city_id.unwrap();

        let filter = ListingFilter::from_params(&params(|p| {
            p.city = Some(istanbul.to_string());
            p.age = Some("46+".into());
        }))
        .unwrap();

        let kept = filter.apply(listings);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "Deniz");
    }

    #[test]
    fn missing_numeric_attribute_never_matches_range_filter() {
        for p in [
            params(|p| p.age = Some("18-25".into())),
            params(|p| p.height = Some("medium".into())),
            params(|p| p.weight = Some("slim".into())),
        ] {
            let filter = ListingFilter::from_params(&p).unwrap();
            let kept = filter.apply(sample());
            assert!(kept.iter().all(|l| l.title != "Selin"), "{:?}", p);
        }
    }

    #[test]
    fn height_breakpoints() {
        assert!(HeightBracket::Short.contains(159));
        assert!(HeightBracket::Medium.contains(160));
        assert!(HeightBracket::Medium.contains(175));
        assert!(HeightBracket::Tall.contains(176));
        assert!(!HeightBracket::Tall.contains(175));
    }

    #[test]
    fn age_and_weight_breakpoints() {
        assert!(!AgeBracket::From18To25.contains(17));
        assert!(AgeBracket::From18To25.contains(25));
        assert!(AgeBracket::From26To35.contains(26));
        assert!(AgeBracket::From36To45.contains(45));
        assert!(AgeBracket::Over45.contains(46));
        assert!(WeightBracket::Slim.contains(54));
        assert!(WeightBracket::Average.contains(55));
        assert!(WeightBracket::Average.contains(70));
        assert!(WeightBracket::Curvy.contains(71));
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let filter = ListingFilter::from_params(&params(|p| p.q = Some("mer".into()))).unwrap();
        let kept = filter.apply(sample());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "Merve");

        let filter = ListingFilter::from_params(&params(|p| p.q = Some("ELEG".into()))).unwrap();
        let kept = filter.apply(sample());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "Ayla");
    }

    #[test]
    fn hair_color_is_case_insensitive_equality() {
        let filter =
            ListingFilter::from_params(&params(|p| p.hair_color = Some(" BLACK ".into()))).unwrap();
        let kept = filter.apply(sample());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "Ayla");

        let filter =
            ListingFilter::from_params(&params(|p| p.hair_color = Some("blo".into()))).unwrap();
        assert!(filter.apply(sample()).is_empty());
    }

    #[test]
    fn unknown_bracket_is_rejected() {
        let err = ListingFilter::from_params(&params(|p| p.height = Some("giant".into())));
        assert!(matches!(err, Err(AppError::InvalidRequest(_))));

        let err = ListingFilter::from_params(&params(|p| p.city = Some("istanbul".into())));
        assert!(matches!(err, Err(AppError::InvalidRequest(_))));
    }

    #[test]
    fn bracket_values_are_case_insensitive() {
        let filter =
            ListingFilter::from_params(&params(|p| p.height = Some("Tall".into()))).unwrap();
        assert_eq!(filter.height, Some(HeightBracket::Tall));
    }

    #[test]
    fn partition_is_exhaustive_disjoint_and_stable() {
        let mut listings = sample();
        let mut both = listing("Both");
        both.is_premium = true;
        both.is_vip = true;
        listings.push(both);
        let mut late_premium = listing("Late");
        late_premium.is_premium = true;
        listings.push(late_premium);

        let input = ids(&listings);
        let tiers = partition_tiers(listings);

        assert_eq!(tiers.len(), input.len());
        let mut all: Vec<Uuid> = ids(&tiers.premium);
        all.extend(ids(&tiers.vip));
        all.extend(ids(&tiers.normal));
        for id in &input {
            assert_eq!(all.iter().filter(|x| *x == id).count(), 1);
        }

        let premium_titles: Vec<&str> = tiers.premium.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(premium_titles, vec!["Merve", "Both", "Late"]);
        assert_eq!(tiers.vip.len(), 1);
        assert_eq!(tiers.normal.len(), 2);
        assert_eq!(tiers.normal[0].title, "Selin");
    }

    #[test]
    fn filter_and_partition_composes() {
        let filter =
            ListingFilter::from_params(&params(|p| p.weight = Some("slim".into()))).unwrap();
        let tiers = filter_and_partition(sample(), &filter);

        assert_eq!(tiers.premium.len(), 1);
        assert!(tiers.vip.is_empty());
        assert!(tiers.normal.is_empty());
    }

    // Property-based tests

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    /// A filter value: absent, a disabling sentinel, or one of `values`.
    fn selection(values: Vec<String>) -> impl Strategy<Value = Option<String>> {
        let mut picks = strings(&[ALL, "ALL", "", "  "]);
        picks.extend(values);
        proptest::option::of(proptest::sample::select(picks))
    }

    fn arb_listing() -> impl Strategy<Value = Listing> {
        (
            "[a-dA-D ]{0,8}",
            proptest::option::of("[a-dA-D ]{0,12}"),
            proptest::option::of(1u128..=2),
            proptest::option::of(1u128..=2),
            proptest::option::of(18i32..70),
            proptest::option::of(140i32..200),
            proptest::option::of(40i32..100),
            proptest::option::of(proptest::sample::select(strings(&[
                "Blonde", "black", " RED ",
            ]))),
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(
                |(title, description, city, category, age, height, weight, hair, premium, vip)| {
                    let mut l = listing(&title);
                    l.description = description;
                    l.city_id = city.map(id);
                    l.category_id = category.map(id);
                    l.age = age;
                    l.height_cm = height;
                    l.weight_kg = weight;
                    l.hair_color = hair;
                    l.is_premium = premium;
                    l.is_vip = vip;
                    l
                },
            )
    }

    fn arb_listings() -> impl Strategy<Value = Vec<Listing>> {
        proptest::collection::vec(arb_listing(), 0..24)
    }

    fn arb_params() -> impl Strategy<Value = ListingFilterParams> {
        let ids = || vec![id(1).to_string(), id(2).to_string()];
        (
            selection(ids()),
            selection(ids()),
            selection(strings(&["18-25", "26-35", "36-45", "46+"])),
            selection(strings(&["short", "Medium", "tall"])),
            selection(strings(&["slim", "average", "CURVY"])),
            selection(strings(&["blonde", "Black", "red"])),
            selection(strings(&["a", "B", "cd", "x"])),
        )
            .prop_map(
                |(city, category, age, height, weight, hair_color, q)| ListingFilterParams {
                    city,
                    category,
                    age,
                    height,
                    weight,
                    hair_color,
                    q,
                },
            )
    }

    /// Params where every filter is absent, `all` or blank.
    fn arb_disabled_params() -> impl Strategy<Value = ListingFilterParams> {
        (
            selection(Vec::new()),
            selection(Vec::new()),
            selection(Vec::new()),
            selection(Vec::new()),
            selection(Vec::new()),
            selection(Vec::new()),
            selection(Vec::new()),
        )
            .prop_map(
                |(city, category, age, height, weight, hair_color, q)| ListingFilterParams {
                    city,
                    category,
                    age,
                    height,
                    weight,
                    hair_color,
                    q,
                },
            )
    }

    fn is_subsequence(sub: &[Uuid], full: &[Uuid]) -> bool {
        let mut rest = full.iter();
        sub.iter().all(|id| rest.any(|x| x == id))
    }

    proptest! {
        #[test]
        fn prop_filter_keeps_exactly_the_matches_in_order(
            listings in arb_listings(),
            params in arb_params()
        ) {
            let filter = ListingFilter::from_params(&params).unwrap();
            let input = ids(&listings);
            let expected: Vec<Uuid> = listings
                .iter()
                .filter(|l| filter.matches(l))
                .map(|l| l.id)
                .collect();

            let kept = ids(&filter.apply(listings));

            prop_assert!(is_subsequence(&kept, &input));
            prop_assert_eq!(kept, expected);
        }

        #[test]
        fn prop_disabled_filters_are_identity(
            listings in arb_listings(),
            params in arb_disabled_params()
        ) {
            let filter = ListingFilter::from_params(&params).unwrap();
            prop_assert!(filter.is_empty());

            let input = ids(&listings);
            prop_assert_eq!(ids(&filter.apply(listings)), input);
        }

        #[test]
        fn prop_partition_is_exhaustive_disjoint_and_stable(listings in arb_listings()) {
            let input = ids(&listings);
            let tiers = partition_tiers(listings);

            prop_assert_eq!(tiers.len(), input.len());
            for tier in [&tiers.premium, &tiers.vip, &tiers.normal] {
                prop_assert!(is_subsequence(&ids(tier), &input));
            }

            prop_assert!(tiers.premium.iter().all(|l| l.is_premium));
            prop_assert!(tiers.vip.iter().all(|l| l.is_vip && !l.is_premium));
            prop_assert!(tiers.normal.iter().all(|l| !l.is_vip && !l.is_premium));

            let mut seen: Vec<Uuid> = ids(&tiers.premium);
            seen.extend(ids(&tiers.vip));
            seen.extend(ids(&tiers.normal));
            seen.sort();
            let mut sorted = input;
            sorted.sort();
            prop_assert_eq!(seen, sorted);
        }

        #[test]
        fn prop_missing_attribute_never_matches_active_filter(
            listing in arb_listing(),
            params in arb_params()
        ) {
            let filter = ListingFilter::from_params(&params).unwrap();
            let missing = (filter.city_id.is_some() && listing.city_id.is_none())
                || (filter.category_id.is_some() && listing.category_id.is_none())
                || (filter.age.is_some() && listing.age.is_none())
                || (filter.height.is_some() && listing.height_cm.is_none())
                || (filter.weight.is_some() && listing.weight_kg.is_none())
                || (filter.hair_color.is_some() && listing.hair_color.is_none());

            if missing {
                prop_assert!(!filter.matches(&listing));
            }
        }
    }
}
