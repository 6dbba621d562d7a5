use serde::Serialize;
use utoipa::ToSchema;

/// Flat default until components carry real weights.
pub const DEFAULT_WEIGHT_KG: i64 = 5;

const DELIVERY_RATE_PER_KG: i64 = 200;
const DELIVERY_MIN: i64 = 500;
const DELIVERY_MAX: i64 = 2000;
const GST_PERCENT: i64 = 18;

/// Price breakdown for one build, all amounts in whole rupees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PriceQuote {
    pub component_cost: i64,
    pub build_charge: i64,
    pub weight_kg: i64,
    pub delivery_charge: i64,
    pub gst: i64,
    pub total: i64,
}

/// Flat assembly fee, tiered by component cost.
pub fn build_charge(component_cost: i64) -> i64 {
    if component_cost < 25_000 {
        2_500
    } else if component_cost < 50_000 {
        3_500
    } else if component_cost < 100_000 {
        5_000
    } else {
        7_500
    }
}

pub fn delivery_charge(weight_kg: i64) -> i64 {
    (weight_kg * DELIVERY_RATE_PER_KG).clamp(DELIVERY_MIN, DELIVERY_MAX)
}

/// 18% of the pre-tax subtotal, rounded half-up to the rupee.
pub fn gst(subtotal: i64) -> i64 {
    (subtotal * GST_PERCENT + 50) / 100
}

/// Full breakdown for a build with the given component cost.
///
/// Callers validate the cost before invoking; component prices are
/// non-negative at catalog write time so the sum cannot go negative.
pub fn quote(component_cost: i64) -> PriceQuote {
    let build_charge = build_charge(component_cost);
    let weight_kg = DEFAULT_WEIGHT_KG;
    let delivery_charge = delivery_charge(weight_kg);
    let subtotal = component_cost + build_charge + delivery_charge;
    let gst = gst(subtotal);
    PriceQuote {
        component_cost,
        build_charge,
        weight_kg,
        delivery_charge,
        gst,
        total: subtotal + gst,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_charge_tiers() {
        assert_eq!(build_charge(0), 2_500);
        assert_eq!(build_charge(24_999), 2_500);
        assert_eq!(build_charge(25_000), 3_500);
        assert_eq!(build_charge(49_999), 3_500);
        assert_eq!(build_charge(50_000), 5_000);
        assert_eq!(build_charge(99_999), 5_000);
        assert_eq!(build_charge(100_000), 7_500);
        assert_eq!(build_charge(1_000_000), 7_500);
    }

    #[test]
    fn build_charge_is_monotone_and_in_range() {
        let valid = [2_500, 3_500, 5_000, 7_500];
        let mut prev = 0;
        for cost in (0..200_000i64).step_by(500) {
            let charge = build_charge(cost);
            assert!(valid.contains(&charge), "unexpected charge {charge}");
            assert!(charge >= prev, "charge decreased at cost {cost}");
            prev = charge;
        }
    }

    #[test]
    fn delivery_charge_is_clamped() {
        assert_eq!(delivery_charge(0), 500);
        assert_eq!(delivery_charge(1), 500);
        assert_eq!(delivery_charge(2), 500);
        assert_eq!(delivery_charge(3), 600);
        assert_eq!(delivery_charge(5), 1_000);
        assert_eq!(delivery_charge(10), 2_000);
        assert_eq!(delivery_charge(500), 2_000);
        for w in 0..100 {
            let charge = delivery_charge(w);
            assert!((500..=2_000).contains(&charge));
        }
    }

    #[test]
    fn gst_rounds_half_up() {
        // 18% of 100 = 18 exactly
        assert_eq!(gst(100), 18);
        // 18% of 3 = 0.54, rounds to 1
        assert_eq!(gst(3), 1);
        // 18% of 2 = 0.36, rounds to 0
        assert_eq!(gst(2), 0);
    }

    #[test]
    fn quote_matches_reference_case() {
        // component cost 45,000: build charge 3,500, weight 5 -> delivery 1,000,
        // GST = round(0.18 * 49,500) = 8,910, total 58,410.
        let q = quote(45_000);
        assert_eq!(q.build_charge, 3_500);
        assert_eq!(q.delivery_charge, 1_000);
        assert_eq!(q.gst, 8_910);
        assert_eq!(q.total, 58_410);
    }

    #[test]
    fn quote_total_is_sum_of_parts() {
        for cost in [0, 12_345, 25_000, 49_999, 87_650, 250_000] {
            let q = quote(cost);
            assert_eq!(
                q.total,
                q.component_cost + q.build_charge + q.delivery_charge + q.gst
            );
            assert_eq!(q.gst, gst(q.component_cost + q.build_charge + q.delivery_charge));
        }
    }
}
