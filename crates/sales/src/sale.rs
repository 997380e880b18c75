//! Sale events for the two product lines and their validation.

use serde::{Deserialize, Serialize};

use salesrelay_core::{DomainError, DomainResult, SaleTimestamp, ValueObject};

use crate::projection::{LedgerRow, SaleProjection};

/// Product lines the shop records sales for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductLine {
    /// 3D-printed figurines.
    Toy,
    Jewelry,
}

impl ProductLine {
    pub fn as_str(self) -> &'static str {
        match self {
            ProductLine::Toy => "toy",
            ProductLine::Jewelry => "jewelry",
        }
    }

    /// Width of this line's ledger row.
    pub fn column_count(self) -> usize {
        match self {
            ProductLine::Toy => 5,
            ProductLine::Jewelry => 4,
        }
    }

    /// A1 column range the ledger row is appended to.
    pub fn column_range(self) -> &'static str {
        match self {
            ProductLine::Toy => "A:E",
            ProductLine::Jewelry => "A:D",
        }
    }
}

impl core::fmt::Display for ProductLine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sale of a 3D-printed figurine.
///
/// Ledger columns: Время продажи | Фигурка | Пластик | Цена | Тип оплаты
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToySale {
    pub timestamp: SaleTimestamp,
    /// Figurine name.
    pub item: String,
    /// Print material (plastic colour/type). Empty when not reported.
    pub material: String,
    pub price: String,
    pub payment_type: String,
}

impl ValueObject for ToySale {}

impl SaleProjection for ToySale {
    const LINE: ProductLine = ProductLine::Toy;

    fn item(&self) -> &str {
        &self.item
    }

    fn ledger_row(&self) -> LedgerRow {
        LedgerRow::from_iter([
            self.timestamp.as_str(),
            self.item.as_str(),
            self.material.as_str(),
            self.price.as_str(),
            self.payment_type.as_str(),
        ])
    }

    fn notification_text(&self) -> String {
        format!(
            "Фигурка: {}\nПластик: {}\nПродано за: {}\nТип оплаты: {}",
            self.item, self.material, self.price, self.payment_type
        )
    }
}

/// Sale of a jewelry product.
///
/// Ledger columns: Время продажи | Товар | Цена | Тип оплаты
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JewelrySale {
    pub timestamp: SaleTimestamp,
    /// Product name.
    pub item: String,
    pub price: String,
    pub payment_type: String,
}

impl ValueObject for JewelrySale {}

impl SaleProjection for JewelrySale {
    const LINE: ProductLine = ProductLine::Jewelry;

    fn item(&self) -> &str {
        &self.item
    }

    fn ledger_row(&self) -> LedgerRow {
        LedgerRow::from_iter([
            self.timestamp.as_str(),
            self.item.as_str(),
            self.price.as_str(),
            self.payment_type.as_str(),
        ])
    }

    fn notification_text(&self) -> String {
        format!(
            "Товар: {}\nПродано за: {}\nТип оплаты: {}",
            self.item, self.price, self.payment_type
        )
    }
}

/// A single decoded sale, tagged by product line.
///
/// Built fresh per request and dropped once both sinks have been called.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "line", rename_all = "lowercase")]
pub enum SaleEvent {
    Toy(ToySale),
    Jewelry(JewelrySale),
}

impl SaleEvent {
    pub fn product_line(&self) -> ProductLine {
        match self {
            SaleEvent::Toy(_) => ToySale::LINE,
            SaleEvent::Jewelry(_) => JewelrySale::LINE,
        }
    }

    pub fn item(&self) -> &str {
        match self {
            SaleEvent::Toy(sale) => sale.item(),
            SaleEvent::Jewelry(sale) => sale.item(),
        }
    }

    /// Print material; only figurines have one.
    pub fn material(&self) -> Option<&str> {
        match self {
            SaleEvent::Toy(sale) => Some(&sale.material),
            SaleEvent::Jewelry(_) => None,
        }
    }

    /// Minimal structural validation: `item` must be non-empty.
    ///
    /// No other field is checked; price and payment type are free-form.
    pub fn validate(&self) -> DomainResult<()> {
        if self.item().is_empty() {
            return Err(DomainError::missing_field("item"));
        }
        Ok(())
    }

    pub fn ledger_row(&self) -> LedgerRow {
        match self {
            SaleEvent::Toy(sale) => sale.ledger_row(),
            SaleEvent::Jewelry(sale) => sale.ledger_row(),
        }
    }

    pub fn notification_text(&self) -> String {
        match self {
            SaleEvent::Toy(sale) => sale.notification_text(),
            SaleEvent::Jewelry(sale) => sale.notification_text(),
        }
    }
}

impl From<ToySale> for SaleEvent {
    fn from(value: ToySale) -> Self {
        SaleEvent::Toy(value)
    }
}

impl From<JewelrySale> for SaleEvent {
    fn from(value: JewelrySale) -> Self {
        SaleEvent::Jewelry(value)
    }
}
