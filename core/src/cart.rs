// core/src/cart.rs

//! Cart rules. Carts are plain `Vec<CartLine>` snapshots embedded in the
//! user record; these functions mutate them in place and the caller persists
//! the result immediately.

use serde::Serialize;

use crate::error::{VitrineError, VitrineResult};
use crate::model::{CartLine, Product};

/// Any client-supplied quantity becomes an integer of at least one.
pub fn coerce_quantity(raw: i64) -> u32 {
    raw.clamp(1, i64::from(u32::MAX)) as u32
}

/// Adds `quantity` units of `product`, merging with an existing line for the
/// same product. The resulting quantity never exceeds tracked stock.
pub fn add_product(
    cart: &mut Vec<CartLine>,
    product: &Product,
    quantity: u32,
) -> VitrineResult<usize> {
    if product.is_sold_out() {
        return Err(VitrineError::OutOfStock {
            product_id: product.id.clone(),
            product_name: product.display_name().to_string(),
        });
    }
    let add = quantity.max(1);
    let cap = |q: u32| product.stock.map_or(q, |s| q.min(s));
    let image = product.image.clone().or_else(|| product.images.first().cloned());
    let description = Some(product.description.clone()).filter(|d| !d.is_empty());

    if let Some(index) = cart.iter().position(|l| l.product_id == product.id) {
        let line = &mut cart[index];
        let desired = line.quantity.max(1).saturating_add(add);
        line.product_name = Some(product.name.clone());
        line.image = line.image.take().or(image);
        line.description = line.description.take().or(description);
        line.price_cents = line.price_cents.or(product.price_cents);
        line.stock_snapshot = product.stock.or(line.stock_snapshot);
        line.quantity = cap(desired);
        return Ok(index);
    }

    cart.push(CartLine {
        product_id: product.id.clone(),
        product_name: Some(product.name.clone()),
        quantity: cap(add),
        price_cents: product.price_cents,
        image,
        description,
        stock_snapshot: product.stock,
    });
    Ok(cart.len() - 1)
}

/// Sets the quantity of the line at `index`, clamped to its stock snapshot.
pub fn set_quantity(cart: &mut [CartLine], index: usize, raw_quantity: i64) -> VitrineResult<u32> {
    let line = cart
        .get_mut(index)
        .ok_or_else(|| VitrineError::not_found("cart line", index.to_string()))?;
    let quantity = coerce_quantity(raw_quantity);
    line.quantity = line.stock_snapshot.map_or(quantity, |s| quantity.min(s));
    Ok(line.quantity)
}

pub fn remove_line(cart: &mut Vec<CartLine>, index: usize) -> VitrineResult<CartLine> {
    if index >= cart.len() {
        return Err(VitrineError::not_found("cart line", index.to_string()));
    }
    Ok(cart.remove(index))
}

/// A line is a problem when its product sold out or the quantity exceeds the
/// stock last seen.
pub fn has_stock_issues(cart: &[CartLine]) -> bool {
    cart.iter().any(|l| match l.stock_snapshot {
        Some(stock) => stock == 0 || l.quantity > stock,
        None => false,
    })
}

/// `None` when no line carries a price. Saturates instead of overflowing.
pub fn total_cents(cart: &[CartLine]) -> Option<i64> {
    if cart.iter().all(|l| l.price_cents.is_none()) {
        return None;
    }
    Some(
        cart
            .iter()
            .filter_map(CartLine::line_total_cents)
            .fold(0, i64::saturating_add),
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub lines: Vec<CartLine>,
    pub count: usize,
    pub total_cents: Option<i64>,
    pub has_stock_issues: bool,
}

impl From<Vec<CartLine>> for CartSummary {
    fn from(lines: Vec<CartLine>) -> Self {
        Self {
            count: lines.len(),
            total_cents: total_cents(&lines),
            has_stock_issues: has_stock_issues(&lines),
            lines,
        }
    }
}
