use serde::{Deserialize, Serialize};

/// Top-level bookable offering (farm stay, workshop, venue rental, ...)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReservationType {
    pub id: String,
    pub name: String,
    pub base_price: f64,
}

/// Sub-option of a reservation type (room tier, course track) with its own multiplier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub name: String,
    pub price_multiplier: f64,
}

/// Optional add-on priced flat, independent of nights and head-count
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdditionalService {
    pub id: String,
    pub name: String,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    /// `discount` is a fraction of the estimated price (0.25 = 25 %)
    Percentage,
    /// `discount` is a flat amount in currency units
    Fixed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Coupon {
    pub code: String,
    pub discount: f64,
    #[serde(rename = "type")]
    pub kind: DiscountKind,
}

impl Coupon {
    /// Discount this coupon grants against an estimated (pre add-on) price.
    pub fn discount_for(&self, estimated_price: f64) -> f64 {
        match self.kind {
            DiscountKind::Percentage => estimated_price * self.discount,
            DiscountKind::Fixed => self.discount,
        }
    }
}

/// How a reservation type is billed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReservationCategory {
    /// Billed per night between arrival and departure
    Stay,
    /// Billed per session, optionally per attendee, and may recur
    Course,
}

/// Coupon codes are matched case-insensitively; the canonical form is trimmed uppercase.
pub fn normalize_coupon_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed catalog: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Invalid catalog entry: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_coupon_discount() {
        let coupon = Coupon {
            code: "WELCOME10".to_string(),
            discount: 0.1,
            kind: DiscountKind::Percentage,
        };
        assert_eq!(coupon.discount_for(1000.0), 100.0);
    }

    #[test]
    fn test_fixed_coupon_ignores_estimate() {
        let coupon = Coupon {
            code: "FARM50".to_string(),
            discount: 50.0,
            kind: DiscountKind::Fixed,
        };
        assert_eq!(coupon.discount_for(10.0), 50.0);
        assert_eq!(coupon.discount_for(0.0), 50.0);
    }

    #[test]
    fn test_coupon_wire_format() {
        let coupon: Coupon =
            serde_json::from_str(r#"{"code":"SUMMER25","discount":0.25,"type":"percentage"}"#).unwrap();
        assert_eq!(coupon.kind, DiscountKind::Percentage);
    }

    #[test]
    fn test_normalize_coupon_code() {
        assert_eq!(normalize_coupon_code("  summer25 "), "SUMMER25");
    }
}
