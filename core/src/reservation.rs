// core/src/reservation.rs

//! The stock-reservation transaction: turn a cart into a `Request` while
//! decrementing inventory, all or nothing.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

use crate::config::ReservationConfig;
use crate::error::{VitrineError, VitrineResult};
use crate::model::{CartLine, Contact, Request, RequestLine, RequestStatus};
use crate::store::Backend;

/// Total quantity per distinct product id. Lines without a product id do not
/// count against stock.
pub fn aggregate_quantities(lines: &[CartLine]) -> BTreeMap<String, u32> {
    let mut totals: BTreeMap<String, u32> = BTreeMap::new();
    for line in lines {
        if line.product_id.trim().is_empty() {
            continue;
        }
        let entry = totals.entry(line.product_id.clone()).or_insert(0);
        *entry = entry.saturating_add(line.quantity.max(1));
    }
    totals
}

/// Runs the reservation, retrying on `Conflict` up to `config.max_attempts`.
///
/// The request id is allocated once, so every attempt writes the same
/// document and the id doubles as the human-facing request number.
#[instrument(name = "reservation::reserve", skip(backend, config, contact, lines), fields(lines = lines.len()), err(Display))]
pub async fn reserve(
    backend: &dyn Backend,
    config: &ReservationConfig,
    uid: &str,
    contact: Contact,
    lines: &[CartLine],
) -> VitrineResult<Request> {
    if lines.is_empty() {
        return Err(VitrineError::EmptyCart);
    }

    let quantities = aggregate_quantities(lines);
    let request_id = backend.new_document_id();
    let now = Utc::now();
    let request = Request {
        id: request_id.clone(),
        user_id: uid.to_string(),
        contact,
        items: lines.iter().map(RequestLine::from).collect(),
        status: RequestStatus::Pending,
        request_number: request_id,
        created_at: now,
    };

    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match attempt_once(backend, uid, &quantities, &request, now).await {
            Ok(()) => {
                info!(request_id = %request.id, attempt, products = quantities.len(), "Request recorded and stock reserved.");
                return Ok(request);
            }
            Err(err) if err.is_retryable() && attempt < max_attempts => {
                let delay = config.backoff_for(attempt);
                warn!(attempt, ?delay, error = %err, "Reservation conflicted, retrying.");
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
            Err(err) => return Err(err),
        }
    }
}

async fn attempt_once(
    backend: &dyn Backend,
    uid: &str,
    quantities: &BTreeMap<String, u32>,
    request: &Request,
    now: DateTime<Utc>,
) -> VitrineResult<()> {
    let mut tx = backend.begin().await?;

    for (product_id, requested) in quantities {
        let Some(product) = tx.product(product_id).await? else {
            debug!(%product_id, "Product not found, skipping stock check.");
            continue;
        };
        let Some(stock) = product.stock else {
            continue;
        };
        match stock.checked_sub(*requested) {
            Some(remaining) => tx.set_stock(product_id, remaining, now),
            None => {
                warn!(%product_id, stock, requested, "Insufficient stock, aborting reservation.");
                return Err(VitrineError::InsufficientStock {
                    product_id: product_id.clone(),
                    product_name: product.display_name().to_string(),
                    available: stock,
                });
            }
        }
    }

    tx.insert_request(request.clone());
    tx.clear_cart(uid);
    tx.commit().await
}
