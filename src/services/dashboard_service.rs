// src/services/dashboard_service.rs

use chrono::{Datelike, Duration, Months, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    db::DashboardRepository,
    models::{
        catalog::LOW_STOCK_THRESHOLD,
        dashboard::{DailySalesEntry, DailyTotal, DashboardStats, MonthlySalesEntry, WeeklySalesEntry},
    },
};

const TOP_PRODUCTS_LIMIT: i64 = 5;
const DAILY_DAYS: i64 = 7;
const WEEKLY_WEEKS: i64 = 4;
const MONTHLY_MONTHS: u32 = 6;

// ---
// Agrupamento (funções puras sobre as linhas diárias)
// ---

fn sum_between(rows: &[DailyTotal], from: NaiveDate, to: NaiveDate) -> (Decimal, i64) {
    rows.iter()
        .filter(|r| r.day >= from && r.day <= to)
        .fold((Decimal::ZERO, 0), |(amount, count), r| (amount + r.amount, count + r.count))
}

/// Primeiro dia do mês `back` meses antes do mês de `today`.
fn month_start(today: NaiveDate, back: u32) -> Result<NaiveDate, AppError> {
    today
        .with_day(1)
        .and_then(|first| first.checked_sub_months(Months::new(back)))
        .ok_or_else(|| anyhow::anyhow!("Data fora do intervalo suportado: {}", today).into())
}

/// Últimos 7 dias, do mais antigo para hoje. Dias sem venda entram zerados.
pub fn daily_buckets(today: NaiveDate, rows: &[DailyTotal]) -> Vec<DailySalesEntry> {
    (0..DAILY_DAYS)
        .rev()
        .map(|back| {
            let day = today - Duration::days(back);
            let (amount, count) = sum_between(rows, day, day);
            DailySalesEntry {
                date: day.format("%Y-%m-%d").to_string(),
                day: day.format("%a").to_string(),
                amount,
                count,
            }
        })
        .collect()
}

/// 4 blocos consecutivos de 7 dias; o último termina hoje.
pub fn weekly_buckets(today: NaiveDate, rows: &[DailyTotal]) -> Vec<WeeklySalesEntry> {
    let first_start = today - Duration::days(WEEKLY_WEEKS * 7 - 1);
    (0..WEEKLY_WEEKS)
        .map(|week| {
            let start = first_start + Duration::days(week * 7);
            let end = start + Duration::days(6);
            let (amount, count) = sum_between(rows, start, end);
            WeeklySalesEntry {
                week: format!("Week {}", week + 1),
                start_date: start.format("%Y-%m-%d").to_string(),
                end_date: end.format("%Y-%m-%d").to_string(),
                amount,
                count,
            }
        })
        .collect()
}

/// 6 meses de calendário, o mês corrente por último.
pub fn monthly_buckets(today: NaiveDate, rows: &[DailyTotal]) -> Result<Vec<MonthlySalesEntry>, AppError> {
    (0..MONTHLY_MONTHS)
        .rev()
        .map(|back| -> Result<MonthlySalesEntry, AppError> {
            let start = month_start(today, back)?;
            let (amount, count) = rows
                .iter()
                .filter(|r| r.day.year() == start.year() && r.day.month() == start.month())
                .fold((Decimal::ZERO, 0), |(amount, count), r| (amount + r.amount, count + r.count));
            Ok(MonthlySalesEntry {
                month: start.format("%B %Y").to_string(),
                amount,
                count,
            })
        })
        .collect()
}

// ---
// Serviço
// ---

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository) -> Self {
        Self { repo }
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    pub async fn stats(&self) -> Result<DashboardStats, AppError> {
        let today = Self::today();

        let (today_sales_amount, today_sales_count) =
            sum_between(&self.repo.daily_totals(today, today).await?, today, today);
        let counts = self.repo.catalog_counts(LOW_STOCK_THRESHOLD).await?;
        let top_products = self.repo.top_products(TOP_PRODUCTS_LIMIT).await?;

        Ok(DashboardStats {
            today_sales_count,
            today_sales_amount,
            total_products: counts.total_products,
            total_categories: counts.total_categories,
            total_customers: counts.total_customers,
            low_stock: counts.low_stock,
            top_products,
        })
    }

    pub async fn daily_sales(&self) -> Result<Vec<DailySalesEntry>, AppError> {
        let today = Self::today();
        let rows = self
            .repo
            .daily_totals(today - Duration::days(DAILY_DAYS - 1), today)
            .await?;
        Ok(daily_buckets(today, &rows))
    }

    pub async fn weekly_sales(&self) -> Result<Vec<WeeklySalesEntry>, AppError> {
        let today = Self::today();
        let rows = self
            .repo
            .daily_totals(today - Duration::days(WEEKLY_WEEKS * 7 - 1), today)
            .await?;
        Ok(weekly_buckets(today, &rows))
    }

    pub async fn monthly_sales(&self) -> Result<Vec<MonthlySalesEntry>, AppError> {
        let today = Self::today();
        let from = month_start(today, MONTHLY_MONTHS - 1)?;
        let rows = self.repo.daily_totals(from, today).await?;
        monthly_buckets(today, &rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(day: NaiveDate, count: i64, amount: &str) -> DailyTotal {
        DailyTotal { day, count, amount: amount.parse().unwrap() }
    }

    #[test]
    fn daily_has_seven_ascending_entries_ending_today() {
        let today = date(2026, 10, 19);
        let rows = vec![row(date(2026, 10, 19), 2, "30.00"), row(date(2026, 10, 13), 1, "5.50")];

        let daily = daily_buckets(today, &rows);

        assert_eq!(daily.len(), 7);
        assert_eq!(daily[0].date, "2026-10-13");
        assert_eq!(daily[6].date, "2026-10-19");
        assert_eq!(daily[6].day, "Mon");
        assert_eq!(daily[6].count, 2);
        assert_eq!(daily[0].amount, "5.50".parse::<Decimal>().unwrap());
        assert!(daily[1..6].iter().all(|d| d.count == 0 && d.amount.is_zero()));
    }

    #[test]
    fn weekly_blocks_are_contiguous_and_end_today() {
        let today = date(2026, 10, 19);
        let rows = vec![
            row(date(2026, 9, 22), 1, "10.00"), // primeiro dia do primeiro bloco
            row(date(2026, 9, 21), 9, "99.00"), // fora da janela
            row(date(2026, 10, 13), 1, "1.00"),
            row(date(2026, 10, 19), 3, "2.00"),
        ];

        let weekly = weekly_buckets(today, &rows);

        assert_eq!(weekly.len(), 4);
        assert_eq!(weekly[0].week, "Week 1");
        assert_eq!(weekly[0].start_date, "2026-09-22");
        assert_eq!(weekly[0].count, 1);
        assert_eq!(weekly[3].week, "Week 4");
        assert_eq!(weekly[3].start_date, "2026-10-13");
        assert_eq!(weekly[3].end_date, "2026-10-19");
        assert_eq!(weekly[3].count, 4);
        assert_eq!(weekly[3].amount, "3.00".parse::<Decimal>().unwrap());
        for pair in weekly.windows(2) {
            let end = NaiveDate::parse_from_str(&pair[0].end_date, "%Y-%m-%d").unwrap();
            let next = NaiveDate::parse_from_str(&pair[1].start_date, "%Y-%m-%d").unwrap();
            assert_eq!(end + Duration::days(1), next);
        }
    }

    #[test]
    fn monthly_has_six_months_current_last() {
        let today = date(2026, 2, 10);
        let rows = vec![
            row(date(2025, 9, 1), 1, "4.00"),
            row(date(2025, 9, 30), 1, "6.00"),
            row(date(2026, 2, 10), 2, "8.00"),
        ];

        let monthly = monthly_buckets(today, &rows).unwrap();
        let labels: Vec<&str> = monthly.iter().map(|m| m.month.as_str()).collect();

        assert_eq!(
            labels,
            vec![
                "September 2025",
                "October 2025",
                "November 2025",
                "December 2025",
                "January 2026",
                "February 2026"
            ]
        );
        assert_eq!(monthly[0].count, 2);
        assert_eq!(monthly[0].amount, "10.00".parse::<Decimal>().unwrap());
        assert_eq!(monthly[5].count, 2);
        assert_eq!(monthly[3].count, 0);
    }

    #[test]
    fn month_start_crosses_year_boundary() {
        assert_eq!(month_start(date(2026, 1, 31), 1).unwrap(), date(2025, 12, 1));
        assert_eq!(month_start(date(2026, 3, 15), 0).unwrap(), date(2026, 3, 1));
    }
}
