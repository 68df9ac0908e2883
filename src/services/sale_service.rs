// src/services/sale_service.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CustomerRepository, NewSale, ProductRepository, SaleFilter, SaleRepository},
    models::{
        auth::User,
        catalog::MAX_MONEY,
        sale::{
            CreateSalePayload, PaginatedSales, SaleDetail, SaleItem, SaleListQuery, SaleStatus,
        },
    },
};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

// ---
// Regras puras (sem banco)
// ---

/// Total da linha, arredondado para centavos como a coluna NUMERIC(12,2).
/// `None` se a conta estourar o Decimal.
pub fn line_total(quantity: i32, price: Decimal) -> Option<Decimal> {
    Decimal::from(quantity)
        .checked_mul(price)
        .map(|total| total.round_dp(2))
}

fn total_out_of_range() -> AppError {
    AppError::AmountOutOfRange { field: "total_amount".into() }
}

/// Soma a linha ao total da venda, recusando valores que a coluna não comporta.
/// Como nenhuma linha é negativa, a linha também cabe quando o total cabe.
pub fn accumulate(total: Decimal, item_total: Option<Decimal>) -> Result<Decimal, AppError> {
    item_total
        .and_then(|item| total.checked_add(item))
        .filter(|sum| *sum <= MAX_MONEY)
        .ok_or_else(total_out_of_range)
}

/// Fecha o pagamento da venda. Devolve `(pago, troco)`.
///
/// - `client_total`, quando enviado, precisa bater com o total calculado;
/// - sem `paid`, a venda é considerada paga no valor exato;
/// - venda COMPLETED exige `paid >= total`.
pub fn settle(
    total: Decimal,
    paid: Option<Decimal>,
    status: SaleStatus,
    client_total: Option<Decimal>,
) -> Result<(Decimal, Decimal), AppError> {
    if let Some(received) = client_total {
        if received.round_dp(2) != total {
            return Err(AppError::TotalMismatch { expected: total, received });
        }
    }

    let paid = paid.map(|p| p.round_dp(2)).unwrap_or(total);
    if status == SaleStatus::Completed && paid < total {
        return Err(AppError::InsufficientPayment { total, paid });
    }

    Ok((paid, (paid - total).max(Decimal::ZERO)))
}

/// `SALE-YYYYMMDD-XXXXXXXX`
pub fn generate_reference_no(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
    format!("SALE-{}-{}", now.format("%Y%m%d"), suffix)
}

/// Converte page/page_size em (LIMIT, OFFSET).
pub fn page_window(page: Option<i64>, page_size: Option<i64>) -> Result<(i64, i64), AppError> {
    let page = page.unwrap_or(1);
    let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);

    if page < 1 {
        return Err(AppError::BadRequest("page must be >= 1".into()));
    }
    if page_size < 1 {
        return Err(AppError::BadRequest("page_size must be >= 1".into()));
    }

    let limit = page_size.min(MAX_PAGE_SIZE);
    let offset = (page - 1)
        .checked_mul(limit)
        .ok_or_else(|| AppError::BadRequest("page out of range".into()))?;
    Ok((limit, offset))
}

// O filtro de data só vale com as duas pontas
fn sale_filter(query: &SaleListQuery) -> SaleFilter {
    let (start_date, end_date) = match (query.start_date, query.end_date) {
        (Some(start), Some(end)) => (Some(start), Some(end)),
        _ => (None, None),
    };
    SaleFilter { start_date, end_date, status: query.status }
}

// ---
// Serviço
// ---

#[derive(Clone)]
pub struct SaleService {
    sale_repo: SaleRepository,
    product_repo: ProductRepository,
    customer_repo: CustomerRepository,
    pool: PgPool,
}

impl SaleService {
    pub fn new(
        sale_repo: SaleRepository,
        product_repo: ProductRepository,
        customer_repo: CustomerRepository,
        pool: PgPool,
    ) -> Self {
        Self { sale_repo, product_repo, customer_repo, pool }
    }

    /// Checkout: cabeçalho, baixa de estoque e itens em uma única transação.
    /// Qualquer erro derruba a transação (rollback no drop).
    pub async fn create_sale(&self, user: &User, payload: &CreateSalePayload) -> Result<SaleDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        if let Some(customer_id) = payload.customer {
            if self.customer_repo.find_by_id(&mut *tx, customer_id).await?.is_none() {
                return Err(AppError::UnknownReference { field: "customer".into() });
            }
        }

        let status = payload.status.unwrap_or(SaleStatus::Completed);
        let reference_no = generate_reference_no(Utc::now());
        let notes = payload.notes.as_deref().map(str::trim).filter(|n| !n.is_empty());

        let sale_id = self
            .sale_repo
            .create_header(
                &mut *tx,
                &NewSale {
                    reference_no: &reference_no,
                    customer_id: payload.customer,
                    user_id: user.id,
                    status,
                    payment_method: payload.payment_method,
                    notes,
                },
            )
            .await?;

        // Locks de linha antes de qualquer baixa, em ordem de id
        let mut product_ids: Vec<Uuid> = payload.items.iter().map(|line| line.product).collect();
        product_ids.sort_unstable();
        product_ids.dedup();
        self.product_repo.lock_for_sale(&mut *tx, &product_ids).await?;

        let mut total = Decimal::ZERO;
        for (index, line) in payload.items.iter().enumerate() {
            let Some(product) = self
                .product_repo
                .deduct_stock(&mut *tx, line.product, line.quantity)
                .await?
            else {
                // Nada foi atualizado: produto inexistente ou saldo insuficiente
                return Err(match self.product_repo.current_stock(&mut *tx, line.product).await? {
                    None => AppError::UnknownReference { field: format!("items[{index}].product") },
                    Some(available) => {
                        tracing::warn!(
                            product_id = %line.product,
                            available,
                            requested = line.quantity,
                            "Venda recusada por falta de estoque"
                        );
                        AppError::InsufficientStock {
                            field: format!("items[{index}].quantity"),
                            product_id: line.product,
                            available,
                            requested: line.quantity,
                        }
                    }
                });
            };

            let price = line.price.unwrap_or(product.price).round_dp(2);
            let item_total = line_total(line.quantity, price).ok_or_else(total_out_of_range)?;
            total = accumulate(total, Some(item_total))?;
            self.sale_repo
                .insert_item(&mut *tx, sale_id, product.id, index as i32, line.quantity, price, item_total)
                .await?;
        }

        let (paid, change) = settle(total, payload.paid_amount, status, payload.total_amount)?;
        self.sale_repo.set_totals(&mut *tx, sale_id, total, paid, change).await?;

        let detail = self.fetch_detail(&mut tx, sale_id).await?;
        tx.commit().await?;

        tracing::info!(
            sale_id = %sale_id,
            reference_no = %reference_no,
            total = %total,
            items = payload.items.len(),
            user = %user.username,
            "Venda registrada"
        );
        Ok(detail)
    }

    pub async fn get_sale(&self, sale_id: Uuid) -> Result<SaleDetail, AppError> {
        let mut conn = self.pool.acquire().await?;
        self.fetch_detail(&mut conn, sale_id).await
    }

    pub async fn list_sales(&self, query: &SaleListQuery) -> Result<PaginatedSales, AppError> {
        let (limit, offset) = page_window(query.page, query.page_size)?;
        let filter = sale_filter(query);

        let count = self.sale_repo.count(&filter).await?;
        let sales = self.sale_repo.list(&filter, limit, offset).await?;

        let ids: Vec<Uuid> = sales.iter().map(|s| s.id).collect();
        let mut items_by_sale: HashMap<Uuid, Vec<SaleItem>> = HashMap::new();
        for item in self.sale_repo.list_items(&self.pool, &ids).await? {
            items_by_sale.entry(item.sale_id).or_default().push(item);
        }

        let results = sales
            .into_iter()
            .map(|sale| {
                let items = items_by_sale.remove(&sale.id).unwrap_or_default();
                SaleDetail { sale, items }
            })
            .collect();

        Ok(PaginatedSales { count, results })
    }

    /// PENDING -> COMPLETED, PENDING -> CANCELLED, COMPLETED -> CANCELLED.
    /// Cancelar devolve o estoque de todas as linhas.
    pub async fn change_status(&self, sale_id: Uuid, next: SaleStatus) -> Result<SaleDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        let (current, total, paid) = self
            .sale_repo
            .lock_for_update(&mut *tx, sale_id)
            .await?
            .ok_or(AppError::NotFound("Sale"))?;

        if !current.can_transition_to(next) {
            return Err(AppError::InvalidStatusTransition { from: current, to: next });
        }

        match next {
            SaleStatus::Completed if paid < total => {
                return Err(AppError::InsufficientPayment { total, paid });
            }
            SaleStatus::Cancelled => {
                let restored = self.product_repo.restore_stock_for_sale(&mut *tx, sale_id).await?;
                tracing::info!(sale_id = %sale_id, products = restored, "Estoque devolvido");
            }
            _ => {}
        }

        let change = (paid - total).max(Decimal::ZERO);
        self.sale_repo.update_status(&mut *tx, sale_id, next, change).await?;

        let detail = self.fetch_detail(&mut tx, sale_id).await?;
        tx.commit().await?;

        tracing::info!(sale_id = %sale_id, from = current.as_str(), to = next.as_str(), "Status da venda alterado");
        Ok(detail)
    }

    async fn fetch_detail(&self, conn: &mut PgConnection, sale_id: Uuid) -> Result<SaleDetail, AppError> {
        let sale = self
            .sale_repo
            .find_by_id(&mut *conn, sale_id)
            .await?
            .ok_or(AppError::NotFound("Sale"))?;
        let items = self.sale_repo.list_items(&mut *conn, &[sale_id]).await?;
        Ok(SaleDetail { sale, items })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn line_total_multiplies_and_rounds() {
        assert_eq!(line_total(3, dec("2.50")), Some(dec("7.50")));
        assert_eq!(line_total(1, dec("0")), Some(dec("0")));
        assert_eq!(line_total(3, dec("0.333")), Some(dec("1.00")));
    }

    #[test]
    fn line_total_overflow_is_none() {
        assert_eq!(line_total(2, Decimal::MAX), None);
    }

    #[test]
    fn accumulate_rejects_totals_beyond_the_column() {
        assert_eq!(accumulate(dec("10"), Some(dec("5.50"))).unwrap(), dec("15.50"));
        assert_eq!(accumulate(Decimal::ZERO, Some(MAX_MONEY)).unwrap(), MAX_MONEY);

        let err = accumulate(Decimal::ZERO, line_total(3, dec("5000000000"))).unwrap_err();
        assert!(matches!(err, AppError::AmountOutOfRange { ref field } if field == "total_amount"));

        let err = accumulate(MAX_MONEY, Some(dec("0.01"))).unwrap_err();
        assert!(matches!(err, AppError::AmountOutOfRange { .. }));

        let err = accumulate(Decimal::ZERO, line_total(2, Decimal::MAX)).unwrap_err();
        assert!(matches!(err, AppError::AmountOutOfRange { .. }));
    }

    #[test]
    fn settle_defaults_paid_to_total() {
        let (paid, change) = settle(dec("25.00"), None, SaleStatus::Completed, None).unwrap();
        assert_eq!(paid, dec("25.00"));
        assert_eq!(change, Decimal::ZERO);
    }

    #[test]
    fn settle_computes_change() {
        let (paid, change) =
            settle(dec("25.00"), Some(dec("30")), SaleStatus::Completed, Some(dec("25.0"))).unwrap();
        assert_eq!(paid, dec("30"));
        assert_eq!(change, dec("5.00"));
    }

    #[test]
    fn settle_rejects_client_total_mismatch() {
        let err = settle(dec("25.00"), None, SaleStatus::Completed, Some(dec("24.99"))).unwrap_err();
        assert!(matches!(err, AppError::TotalMismatch { .. }));
    }

    #[test]
    fn settle_rejects_underpaid_completed_sale() {
        let err = settle(dec("25.00"), Some(dec("20")), SaleStatus::Completed, None).unwrap_err();
        assert!(matches!(err, AppError::InsufficientPayment { .. }));
    }

    #[test]
    fn pending_sale_may_be_underpaid() {
        let (paid, change) = settle(dec("25.00"), Some(dec("0")), SaleStatus::Pending, None).unwrap();
        assert_eq!(paid, Decimal::ZERO);
        assert_eq!(change, Decimal::ZERO);
    }

    #[test]
    fn reference_number_format() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 14, 30, 0).unwrap();
        let reference = generate_reference_no(now);

        assert!(reference.starts_with("SALE-20261019-"));
        let suffix = &reference["SALE-20261019-".len()..];
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        assert_ne!(reference, generate_reference_no(now));
    }

    #[test]
    fn page_window_defaults_and_caps() {
        assert_eq!(page_window(None, None).unwrap(), (10, 0));
        assert_eq!(page_window(Some(3), Some(20)).unwrap(), (20, 40));
        assert_eq!(page_window(Some(2), Some(1000)).unwrap(), (100, 100));
    }

    #[test]
    fn page_window_rejects_non_positive_values() {
        assert!(matches!(page_window(Some(0), None), Err(AppError::BadRequest(_))));
        assert!(matches!(page_window(None, Some(0)), Err(AppError::BadRequest(_))));
        assert!(matches!(page_window(Some(i64::MAX), Some(100)), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn date_filter_requires_both_ends() {
        let day = chrono::NaiveDate::from_ymd_opt(2026, 10, 1).unwrap();

        let only_start = SaleListQuery { start_date: Some(day), ..Default::default() };
        let filter = sale_filter(&only_start);
        assert!(filter.start_date.is_none() && filter.end_date.is_none());

        let both = SaleListQuery { start_date: Some(day), end_date: Some(day), ..Default::default() };
        let filter = sale_filter(&both);
        assert_eq!(filter.start_date, Some(day));
        assert_eq!(filter.end_date, Some(day));
    }
}
