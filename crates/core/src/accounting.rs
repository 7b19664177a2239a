//! Cashier daily-limit accounting.
//!
//! Usage is always computed live from transactions, never cached: changing
//! an account's limit has no retroactive effect, and two reads with no
//! intervening writes return identical results. The module reports against
//! the limit; it never blocks an over-limit assignment.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::cashier::{CashierAccount, CashierTransaction};

/// Per-account usage for one calendar day in the operating timezone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyUsage {
    pub used_today: Decimal,
    pub daily_limit: Decimal,
    /// May go negative when the soft cap is exceeded.
    pub remaining_limit: Decimal,
    /// Raw ratio; may exceed 100 to signal over-limit. Clamping is a
    /// display decision left to callers.
    pub percentage_used: Decimal,
    pub transaction_count: u64,
}

/// Half-open UTC window [start, end) covering one calendar day at the given
/// offset from UTC, in minutes (e.g. -240 for UTC-4).
pub fn day_bounds(date: NaiveDate, utc_offset_minutes: i32) -> (DateTime<Utc>, DateTime<Utc>) {
    let offset = FixedOffset::east_opt(utc_offset_minutes * 60)
        .unwrap_or_else(|| FixedOffset::east_opt(0).expect("zero offset is always valid"));
    let local_midnight = date.and_hms_opt(0, 0, 0).expect("midnight exists for every date");
    let start = offset
        .from_local_datetime(&local_midnight)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&local_midnight));
    (start, start + Duration::days(1))
}

/// Calendar date at the operating offset for a UTC instant.
pub fn local_date(at: DateTime<Utc>, utc_offset_minutes: i32) -> NaiveDate {
    let offset = FixedOffset::east_opt(utc_offset_minutes * 60)
        .unwrap_or_else(|| FixedOffset::east_opt(0).expect("zero offset is always valid"));
    at.with_timezone(&offset).date_naive()
}

/// Sums `assigned_amount_bs` over the account's transactions whose
/// `assigned_at` falls inside the day window.
pub fn compute_daily_usage(
    account: &CashierAccount,
    transactions: &[CashierTransaction],
    date: NaiveDate,
    utc_offset_minutes: i32,
) -> DailyUsage {
    let (start, end) = day_bounds(date, utc_offset_minutes);

    let in_window = transactions.iter().filter(|transaction| {
        transaction.account_id == account.id
            && transaction.assigned_at >= start
            && transaction.assigned_at < end
    });

    let mut used_today = Decimal::ZERO;
    let mut transaction_count = 0u64;
    for transaction in in_window {
        used_today += transaction.assigned_amount_bs;
        transaction_count += 1;
    }

    usage_from_totals(account.daily_limit_bs, used_today, transaction_count)
}

/// Builds the usage report from pre-aggregated totals (the SQL path sums in
/// the database and only needs the arithmetic).
pub fn usage_from_totals(
    daily_limit: Decimal,
    used_today: Decimal,
    transaction_count: u64,
) -> DailyUsage {
    let percentage_used = if daily_limit.is_zero() {
        Decimal::ZERO
    } else {
        used_today * Decimal::ONE_HUNDRED / daily_limit
    };

    DailyUsage {
        used_today,
        daily_limit,
        remaining_limit: daily_limit - used_today,
        percentage_used,
        transaction_count,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;

    use crate::domain::cashier::{
        CashierAccount, CashierAccountId, CashierTransaction, CashierTransactionId,
        CashierTransactionStatus,
    };
    use crate::domain::quotation::QuotationId;

    use super::{compute_daily_usage, day_bounds, local_date};

    const CARACAS_OFFSET_MINUTES: i32 = -240;

    fn account(limit: Decimal) -> CashierAccount {
        let now = Utc::now();
        CashierAccount {
            id: CashierAccountId("ACC-1".to_string()),
            cashier_id: "cashier-1".to_string(),
            name: "Banco Mercantil corriente".to_string(),
            daily_limit_bs: limit,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn transaction(
        id: &str,
        account_id: &str,
        amount: Decimal,
        assigned_at: chrono::DateTime<Utc>,
    ) -> CashierTransaction {
        CashierTransaction {
            id: CashierTransactionId(id.to_string()),
            account_id: CashierAccountId(account_id.to_string()),
            cashier_id: "cashier-1".to_string(),
            quotation_id: QuotationId("QT-1".to_string()),
            assigned_amount_bs: amount,
            suggested_exchange_rate: Decimal::new(36_50, 2),
            expected_usdt: Decimal::new(100_00, 2),
            delivered_usdt: None,
            status: CashierTransactionStatus::Pending,
            assigned_at,
            completed_at: None,
        }
    }

    #[test]
    fn two_transactions_totaling_600_against_a_1000_limit() {
        // Scenario C.
        let date = NaiveDate::from_ymd_opt(2026, 8, 24).expect("valid date");
        let (start, _) = day_bounds(date, CARACAS_OFFSET_MINUTES);
        let account = account(Decimal::new(1000, 0));
        let transactions = [
            transaction("TX-1", "ACC-1", Decimal::new(250, 0), start + Duration::hours(9)),
            transaction("TX-2", "ACC-1", Decimal::new(350, 0), start + Duration::hours(14)),
        ];

        let usage = compute_daily_usage(&account, &transactions, date, CARACAS_OFFSET_MINUTES);

        assert_eq!(usage.used_today, Decimal::new(600, 0));
        assert_eq!(usage.remaining_limit, Decimal::new(400, 0));
        assert_eq!(usage.percentage_used, Decimal::new(60, 0));
        assert_eq!(usage.transaction_count, 2);
    }

    #[test]
    fn usage_over_the_limit_reports_rather_than_clamps() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 24).expect("valid date");
        let (start, _) = day_bounds(date, CARACAS_OFFSET_MINUTES);
        let account = account(Decimal::new(1000, 0));
        let transactions =
            [transaction("TX-1", "ACC-1", Decimal::new(1500, 0), start + Duration::hours(8))];

        let usage = compute_daily_usage(&account, &transactions, date, CARACAS_OFFSET_MINUTES);

        assert_eq!(usage.remaining_limit, Decimal::new(-500, 0));
        assert_eq!(usage.percentage_used, Decimal::new(150, 0));
    }

    #[test]
    fn transactions_outside_the_day_window_are_excluded() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 24).expect("valid date");
        let (start, end) = day_bounds(date, CARACAS_OFFSET_MINUTES);
        let account = account(Decimal::new(1000, 0));
        let transactions = [
            transaction("TX-1", "ACC-1", Decimal::new(100, 0), start - Duration::seconds(1)),
            transaction("TX-2", "ACC-1", Decimal::new(200, 0), start),
            transaction("TX-3", "ACC-1", Decimal::new(300, 0), end - Duration::seconds(1)),
            transaction("TX-4", "ACC-1", Decimal::new(400, 0), end),
            transaction("TX-5", "ACC-2", Decimal::new(500, 0), start + Duration::hours(1)),
        ];

        let usage = compute_daily_usage(&account, &transactions, date, CARACAS_OFFSET_MINUTES);

        assert_eq!(usage.used_today, Decimal::new(500, 0));
        assert_eq!(usage.transaction_count, 2);
    }

    #[test]
    fn computation_is_idempotent_without_intervening_writes() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 24).expect("valid date");
        let (start, _) = day_bounds(date, CARACAS_OFFSET_MINUTES);
        let account = account(Decimal::new(2500, 0));
        let transactions =
            [transaction("TX-1", "ACC-1", Decimal::new(900, 0), start + Duration::hours(3))];

        let first = compute_daily_usage(&account, &transactions, date, CARACAS_OFFSET_MINUTES);
        let second = compute_daily_usage(&account, &transactions, date, CARACAS_OFFSET_MINUTES);
        assert_eq!(first, second);
    }

    #[test]
    fn zero_limit_reports_zero_percentage() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 24).expect("valid date");
        let account = account(Decimal::ZERO);
        let usage = compute_daily_usage(&account, &[], date, CARACAS_OFFSET_MINUTES);
        assert_eq!(usage.percentage_used, Decimal::ZERO);
    }

    #[test]
    fn local_date_respects_the_operating_offset() {
        // 02:00 UTC is still the previous evening at UTC-4.
        let instant = Utc.with_ymd_and_hms(2026, 8, 25, 2, 0, 0).single().expect("valid instant");
        let date = local_date(instant, CARACAS_OFFSET_MINUTES);
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 8, 24).expect("valid date"));
    }
}
