//! Gift catalog, invoice payload codec and purchase validation.

use bot_core::SideSignal;

/// Currency code for provider stars.
pub const GIFT_CURRENCY: &str = "XTR";

const PAYLOAD_PREFIX: &str = "gift:";

/// One purchasable drink for the persona.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GiftItem {
    /// Stable code used in payloads and stored transactions.
    pub code: &'static str,
    /// Human title shown on buttons and invoices.
    pub title: &'static str,
    pub emoji: &'static str,
    /// Price in minimal currency units (stars).
    pub price_units: i64,
}

impl GiftItem {
    /// Invoice payload for this item.
    pub fn payload(&self) -> String {
        format!("{}{}", PAYLOAD_PREFIX, self.code)
    }

    /// Button/invoice label, e.g. "🍷 Вино — 250 ⭐".
    pub fn label(&self) -> String {
        format!("{} {} — {} ⭐", self.emoji, self.title, self.price_units)
    }

    /// The consumption signal dispatched after a successful purchase.
    pub fn side_signal(&self) -> SideSignal {
        match self.code {
            "vodka" => SideSignal::Vodka,
            "whisky" => SideSignal::Whisky,
            "beer" => SideSignal::Beer,
            _ => SideSignal::Wine,
        }
    }
}

/// The fixed catalog, as offered when the free quota runs out.
pub const CATALOG: [GiftItem; 4] = [
    GiftItem {
        code: "wine",
        title: "Вино",
        emoji: "🍷",
        price_units: 250,
    },
    GiftItem {
        code: "vodka",
        title: "Водка",
        emoji: "🥃",
        price_units: 100,
    },
    GiftItem {
        code: "whisky",
        title: "Виски",
        emoji: "🥃",
        price_units: 500,
    },
    GiftItem {
        code: "beer",
        title: "Пиво",
        emoji: "🍺",
        price_units: 50,
    },
];

/// Look up a catalog item by code.
pub fn find_item(code: &str) -> Option<&'static GiftItem> {
    CATALOG.iter().find(|item| item.code == code)
}

/// Extract the item code from an invoice payload.
pub fn decode_payload(payload: &str) -> Option<&str> {
    payload.strip_prefix(PAYLOAD_PREFIX).filter(|c| !c.is_empty())
}

/// Validate a pre-checkout handshake against the catalog.
///
/// Pure check: approving here mutates nothing, the ledger only changes on
/// the confirmed-payment notification. Returns the matched item, or a short
/// user-facing rejection reason.
pub fn validate_pre_checkout(
    payload: &str,
    amount: i64,
    currency: &str,
) -> std::result::Result<&'static GiftItem, &'static str> {
    let code = decode_payload(payload).ok_or("Неизвестный товар")?;
    let item = find_item(code).ok_or("Неизвестный товар")?;

    if currency != GIFT_CURRENCY {
        return Err("Неверная валюта");
    }
    if amount != item.price_units {
        return Err("Неверная сумма");
    }

    Ok(item)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_prices() {
        assert_eq!(find_item("wine").unwrap().price_units, 250);
        assert_eq!(find_item("vodka").unwrap().price_units, 100);
        assert_eq!(find_item("whisky").unwrap().price_units, 500);
        assert_eq!(find_item("beer").unwrap().price_units, 50);
        assert!(find_item("mead").is_none());
    }

    #[test]
    fn test_payload_round_trip() {
        for item in &CATALOG {
            assert_eq!(decode_payload(&item.payload()), Some(item.code));
        }
        assert_eq!(decode_payload("gift:"), None);
        assert_eq!(decode_payload("order:wine"), None);
    }

    #[test]
    fn test_item_signals() {
        assert_eq!(find_item("wine").unwrap().side_signal(), SideSignal::Wine);
        assert_eq!(find_item("beer").unwrap().side_signal(), SideSignal::Beer);
        assert_eq!(find_item("vodka").unwrap().side_signal(), SideSignal::Vodka);
        assert_eq!(
            find_item("whisky").unwrap().side_signal(),
            SideSignal::Whisky
        );
    }

    #[test]
    fn test_pre_checkout_validation() {
        assert!(validate_pre_checkout("gift:wine", 250, "XTR").is_ok());
        assert!(validate_pre_checkout("gift:mead", 250, "XTR").is_err());
        assert!(validate_pre_checkout("gift:wine", 100, "XTR").is_err());
        assert!(validate_pre_checkout("gift:wine", 250, "USD").is_err());
        assert!(validate_pre_checkout("wine", 250, "XTR").is_err());
    }
}
