//! Marketplace fee formulas.
//!
//! Every channel charges a fee that is affine in the selling price
//! (`flat + rate * price`). Keeping the two parts explicit lets the optimal
//! price solver invert the profit equation in closed form.

use serde::{Deserialize, Serialize};

/// Etsy listing fee per sale.
const ETSY_LISTING: f64 = 0.20;
/// Etsy transaction fee (6.5%).
const ETSY_TRANSACTION: f64 = 0.065;
/// Etsy payment processing (3%).
const ETSY_PAYMENT_PROCESSING: f64 = 0.03;
/// Etsy offsite ads (15%).
const ETSY_OFFSITE_ADS: f64 = 0.15;

/// Shopify transaction fee (2.9%).
const SHOPIFY_TRANSACTION: f64 = 0.029;
/// Shopify per-transaction processing charge.
const SHOPIFY_PROCESSING: f64 = 0.30;

/// Amazon minimum FBA fulfillment fee.
const AMAZON_FULFILLMENT: f64 = 3.49;
/// Amazon closing fee (1.75%).
const AMAZON_CLOSING: f64 = 0.0175;

/// Amazon product category, which selects the referral rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmazonCategory {
    Handmade,
    Jewelry,
    #[default]
    Default,
}

impl AmazonCategory {
    /// Referral rate charged on the selling price.
    pub fn referral_rate(self) -> f64 {
        match self {
            AmazonCategory::Handmade => 0.15,
            AmazonCategory::Jewelry => 0.20,
            AmazonCategory::Default => 0.15,
        }
    }
}

/// Sales channel a product is listed on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "channel")]
pub enum Channel {
    /// Direct sale, no marketplace cut.
    #[default]
    None,
    Etsy,
    Shopify,
    Amazon {
        #[serde(default)]
        category: AmazonCategory,
    },
}

impl Channel {
    /// Short identifier used in logs and records.
    pub fn id(&self) -> &'static str {
        match self {
            Channel::None => "none",
            Channel::Etsy => "etsy",
            Channel::Shopify => "shopify",
            Channel::Amazon { .. } => "amazon",
        }
    }

    /// The fee schedule this channel charges.
    pub fn schedule(&self) -> FeeSchedule {
        match self {
            Channel::None => FeeSchedule::FREE,
            Channel::Etsy => FeeSchedule {
                flat: ETSY_LISTING,
                rate: ETSY_TRANSACTION + ETSY_PAYMENT_PROCESSING + ETSY_OFFSITE_ADS,
            },
            Channel::Shopify => FeeSchedule {
                flat: SHOPIFY_PROCESSING,
                rate: SHOPIFY_TRANSACTION,
            },
            Channel::Amazon { category } => FeeSchedule {
                flat: AMAZON_FULFILLMENT,
                rate: category.referral_rate() + AMAZON_CLOSING,
            },
        }
    }

    /// Fee charged on a sale at `price`.
    ///
    /// Components are summed in the order each marketplace itemises them,
    /// so the result carries full floating precision without rounding.
    pub fn fee(&self, price: f64) -> f64 {
        match self {
            Channel::None => 0.0,
            Channel::Etsy => {
                ETSY_LISTING
                    + price * ETSY_TRANSACTION
                    + price * ETSY_PAYMENT_PROCESSING
                    + price * ETSY_OFFSITE_ADS
            }
            Channel::Shopify => price * SHOPIFY_TRANSACTION + SHOPIFY_PROCESSING,
            Channel::Amazon { category } => {
                price * category.referral_rate() + AMAZON_FULFILLMENT + price * AMAZON_CLOSING
            }
        }
    }
}

/// Affine fee: `flat + rate * price`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeeSchedule {
    pub flat: f64,
    pub rate: f64,
}

impl FeeSchedule {
    pub const FREE: FeeSchedule = FeeSchedule {
        flat: 0.0,
        rate: 0.0,
    };
}

/// Fees for the same price on every marketplace, side by side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeeComparison {
    pub etsy: f64,
    pub shopify: f64,
    pub amazon: f64,
}

/// Compare marketplace fees at `price`.
///
/// A non-positive price has nothing to charge a fee on and compares as 0
/// everywhere.
pub fn compare_fees(price: f64, category: AmazonCategory) -> FeeComparison {
    if price <= 0.0 {
        return FeeComparison {
            etsy: 0.0,
            shopify: 0.0,
            amazon: 0.0,
        };
    }
    FeeComparison {
        etsy: Channel::Etsy.fee(price),
        shopify: Channel::Shopify.fee(price),
        amazon: Channel::Amazon { category }.fee(price),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn all_channels() -> Vec<Channel> {
        vec![
            Channel::None,
            Channel::Etsy,
            Channel::Shopify,
            Channel::Amazon {
                category: AmazonCategory::Handmade,
            },
            Channel::Amazon {
                category: AmazonCategory::Jewelry,
            },
            Channel::Amazon {
                category: AmazonCategory::Default,
            },
        ]
    }

    #[test]
    fn test_etsy_fee_at_twenty() {
        // 0.20 + 1.30 + 0.60 + 3.00
        assert!((Channel::Etsy.fee(20.0) - 5.10).abs() < EPS);
    }

    #[test]
    fn test_amazon_jewelry_fee_at_fifty() {
        let amazon = Channel::Amazon {
            category: AmazonCategory::Jewelry,
        };
        // 10 + 3.49 + 0.875
        assert!((amazon.fee(50.0) - 14.365).abs() < EPS);
    }

    #[test]
    fn test_shopify_fee() {
        assert!((Channel::Shopify.fee(100.0) - 3.20).abs() < EPS);
    }

    #[test]
    fn test_zero_price_is_flat_component() {
        for channel in all_channels() {
            let fee = channel.fee(0.0);
            assert!(!fee.is_nan());
            assert_eq!(fee, channel.schedule().flat, "{}", channel.id());
        }
    }

    #[test]
    fn test_schedule_matches_formula() {
        for channel in all_channels() {
            let schedule = channel.schedule();
            for price in [0.0, 1.0, 19.99, 84.0, 250.5] {
                let affine = schedule.flat + schedule.rate * price;
                assert!((channel.fee(price) - affine).abs() < EPS);
                assert!(channel.fee(price) >= 0.0);
            }
        }
    }

    #[test]
    fn test_referral_rates() {
        assert_eq!(AmazonCategory::Handmade.referral_rate(), 0.15);
        assert_eq!(AmazonCategory::Jewelry.referral_rate(), 0.20);
        assert_eq!(AmazonCategory::Default.referral_rate(), 0.15);
    }

    #[test]
    fn test_compare_fees() {
        let cmp = compare_fees(20.0, AmazonCategory::Default);
        assert!((cmp.etsy - 5.10).abs() < EPS);
        assert!((cmp.shopify - 0.88).abs() < EPS);
        assert!((cmp.amazon - (3.0 + 3.49 + 0.35)).abs() < EPS);

        let zero = compare_fees(0.0, AmazonCategory::Jewelry);
        assert_eq!(zero.etsy, 0.0);
        assert_eq!(zero.amazon, 0.0);
    }

    #[test]
    fn test_channel_serde() {
        let ch: Channel =
            serde_json::from_str(r#"{"channel":"amazon","category":"jewelry"}"#).unwrap();
        assert_eq!(
            ch,
            Channel::Amazon {
                category: AmazonCategory::Jewelry
            }
        );
        let ch: Channel = serde_json::from_str(r#"{"channel":"amazon"}"#).unwrap();
        assert_eq!(
            ch,
            Channel::Amazon {
                category: AmazonCategory::Default
            }
        );
        let ch: Channel = serde_json::from_str(r#"{"channel":"etsy"}"#).unwrap();
        assert_eq!(ch, Channel::Etsy);
        assert!(serde_json::from_str::<Channel>(r#"{"channel":"ebay"}"#).is_err());
    }
}
