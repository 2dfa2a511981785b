//! Marketplace default rate cards, seeded into an empty database.
//!
//! These are the carrier "barem" tables in TRY, VAT included, current as of
//! mid-2025. Sellers shadow them with custom rows; the defaults themselves
//! are only replaced by shipping a new build.

use crate::db::Repository;
use crate::domain::{Decimal, Marketplace, NewShippingRateTier, RateType};
use tracing::info;

struct Band(&'static str, &'static str, &'static str);

fn card(marketplace: &Marketplace, rate_type: RateType, bands: &[Band]) -> Vec<NewShippingRateTier> {
    bands
        .iter()
        .map(|Band(min, max, cost)| NewShippingRateTier {
            store_id: None,
            marketplace: marketplace.clone(),
            rate_type,
            min_value: parse(min),
            max_value: parse(max),
            cost: parse(cost),
            vat_included: true,
            is_active: true,
        })
        .collect()
}

fn parse(s: &str) -> Decimal {
    Decimal::from_str_canonical(s).unwrap_or_default()
}

/// String form of the open-ended sentinel the lookup recognizes.
fn unbounded() -> &'static str {
    "999999"
}

/// The default card for one marketplace: desi bands plus price bands.
pub fn default_card(marketplace: &Marketplace) -> Vec<NewShippingRateTier> {
    let mut tiers = Vec::new();
    match marketplace.as_str() {
        "trendyol" => {
            tiers.extend(card(
                marketplace,
                RateType::WeightClass,
                &[
                    Band("0", "1", "27.99"),
                    Band("1", "2", "33.49"),
                    Band("2", "3", "38.99"),
                    Band("3", "5", "49.99"),
                    Band("5", "10", "74.99"),
                    Band("10", "15", "104.99"),
                    Band("15", "20", "139.99"),
                    Band("20", "30", "189.99"),
                    Band("30", unbounded(), "259.99"),
                ],
            ));
            tiers.extend(card(
                marketplace,
                RateType::PriceBand,
                &[
                    Band("0", "100", "24.99"),
                    Band("100", "200", "33.99"),
                    Band("200", "300", "41.99"),
                    Band("300", unbounded(), "48.99"),
                ],
            ));
        }
        "hepsiburada" => {
            tiers.extend(card(
                marketplace,
                RateType::WeightClass,
                &[
                    Band("0", "1", "29.49"),
                    Band("1", "2", "35.99"),
                    Band("2", "3", "41.49"),
                    Band("3", "5", "53.99"),
                    Band("5", "10", "79.99"),
                    Band("10", "15", "112.49"),
                    Band("15", "25", "164.99"),
                    Band("25", unbounded(), "229.99"),
                ],
            ));
            tiers.extend(card(
                marketplace,
                RateType::PriceBand,
                &[
                    Band("0", "150", "27.49"),
                    Band("150", "300", "39.99"),
                    Band("300", unbounded(), "52.49"),
                ],
            ));
        }
        "n11" => {
            tiers.extend(card(
                marketplace,
                RateType::WeightClass,
                &[
                    Band("0", "1", "26.49"),
                    Band("1", "2", "31.99"),
                    Band("2", "4", "43.99"),
                    Band("4", "8", "64.99"),
                    Band("8", "15", "99.99"),
                    Band("15", unbounded(), "169.99"),
                ],
            ));
            tiers.extend(card(
                marketplace,
                RateType::PriceBand,
                &[
                    Band("0", "120", "25.99"),
                    Band("120", "250", "36.99"),
                    Band("250", unbounded(), "47.99"),
                ],
            ));
        }
        _ => {}
    }
    tiers
}

/// Marketplaces a default card ships for.
pub fn seeded_marketplaces() -> Vec<Marketplace> {
    ["trendyol", "hepsiburada", "n11"]
        .iter()
        .map(|m| Marketplace::new(m))
        .collect()
}

/// Seed every marketplace's default card into an empty database.
///
/// A marketplace that already carries default rows is left untouched, so
/// restarts never duplicate or overwrite the cards.
pub async fn seed_default_rate_cards(repo: &Repository) -> Result<usize, sqlx::Error> {
    let mut total = 0usize;
    for marketplace in seeded_marketplaces() {
        let tiers = default_card(&marketplace);
        let inserted = repo.seed_default_tiers(&marketplace, &tiers).await?;
        if inserted > 0 {
            info!(
                marketplace = %marketplace,
                tiers = inserted,
                "Seeded default shipping rate card"
            );
        }
        total += inserted;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repo::test_support::setup_test_db;
    use crate::domain::UNBOUNDED_MAX;
    use crate::engine::ShippingRateTable;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    #[test]
    fn test_every_card_has_both_axes() {
        for marketplace in seeded_marketplaces() {
            let tiers = default_card(&marketplace);
            assert!(
                tiers.iter().any(|t| t.rate_type == RateType::WeightClass),
                "{} missing desi bands",
                marketplace
            );
            assert!(
                tiers.iter().any(|t| t.rate_type == RateType::PriceBand),
                "{} missing price bands",
                marketplace
            );
        }
    }

    #[test]
    fn test_cards_are_contiguous_and_capped() {
        for marketplace in seeded_marketplaces() {
            for rate_type in [RateType::WeightClass, RateType::PriceBand] {
                let bands: Vec<_> = default_card(&marketplace)
                    .into_iter()
                    .filter(|t| t.rate_type == rate_type)
                    .collect();

                assert_eq!(bands[0].min_value, d("0"));
                for pair in bands.windows(2) {
                    assert_eq!(
                        pair[0].max_value, pair[1].min_value,
                        "{} {} bands must not leave gaps",
                        marketplace,
                        rate_type.as_str()
                    );
                }
                let last = bands.last().unwrap();
                assert!(last.max_value >= Decimal::from(UNBOUNDED_MAX));
            }
        }
    }

    #[test]
    fn test_unknown_marketplace_has_no_card() {
        assert!(default_card(&Marketplace::new("amazon")).is_empty());
    }

    #[tokio::test]
    async fn test_seed_then_resolve_trendyol() {
        let (repo, _temp) = setup_test_db().await;
        let total = seed_default_rate_cards(&repo).await.unwrap();
        assert!(total > 0);

        // Seeding again is a no-op.
        assert_eq!(seed_default_rate_cards(&repo).await.unwrap(), 0);

        let store = crate::domain::StoreId::new("store-1".to_string());
        let marketplace = Marketplace::new("trendyol");
        let rows = repo.list_visible_tiers(&store, &marketplace).await.unwrap();
        let table = ShippingRateTable::from_rows(rows);

        // desi 2.5 -> 38.99; price band for 150 -> 33.99; cheaper wins.
        assert_eq!(table.resolve(d("2.5"), d("150")), d("33.99"));
        // Heavy item far above every price band boundary: 300+ band is 48.99,
        // desi 12 band is 104.99; the price band is cheaper.
        assert_eq!(table.resolve(d("12"), d("5000")), d("48.99"));
    }
}
