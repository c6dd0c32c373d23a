//! Commission totals over calendar windows.

use backend_client::CommissionRow;
use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Commission earned per calendar window, in UTC. Weeks start on Monday.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommissionSummary {
    pub today: Decimal,
    pub yesterday: Decimal,
    pub this_week: Decimal,
    pub this_month: Decimal,
    pub total: Decimal,
}

impl CommissionSummary {
    /// Sum `records` into windows relative to `now`.
    ///
    /// Records dated after `now` only count toward `total`.
    pub fn from_records<'a>(
        records: impl IntoIterator<Item = &'a CommissionRow>,
        now: DateTime<Utc>,
    ) -> Self {
        let today = now.date_naive();
        let yesterday = today.checked_sub_days(Days::new(1));
        let week_start = today
            .checked_sub_days(Days::new(u64::from(today.weekday().num_days_from_monday())))
            .unwrap_or(today);
        let month_start = today.with_day(1).unwrap_or(today);

        let mut summary = Self::default();
        for record in records {
            let day = record.created_at.date_naive();
            summary.total += record.amount;

            if day > today {
                continue;
            }
            if day == today {
                summary.today += record.amount;
            }
            if Some(day) == yesterday {
                summary.yesterday += record.amount;
            }
            if in_window(day, week_start, today) {
                summary.this_week += record.amount;
            }
            if in_window(day, month_start, today) {
                summary.this_month += record.amount;
            }
        }

        summary
    }
}

fn in_window(day: NaiveDate, start: NaiveDate, end: NaiveDate) -> bool {
    day >= start && day <= end
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(amount: i64, scale: u32, y: i32, m: u32, d: u32, h: u32) -> CommissionRow {
        CommissionRow {
            order_id: format!("o-{}-{}-{}-{}", y, m, d, h),
            amount: Decimal::new(amount, scale),
            created_at: Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_windows() {
        // Thursday 2026-10-15
        let now = Utc.with_ymd_and_hms(2026, 10, 15, 12, 0, 0).unwrap();
        let records = vec![
            row(150, 2, 2026, 10, 15, 0),  // today, 1.50
            row(200, 2, 2026, 10, 14, 23), // yesterday, 2.00
            row(300, 2, 2026, 10, 12, 8),  // Monday, 3.00
            row(400, 2, 2026, 10, 11, 8),  // previous Sunday, 4.00
            row(500, 2, 2026, 9, 30, 8),   // last month, 5.00
        ];

        let summary = CommissionSummary::from_records(&records, now);

        assert_eq!(summary.today, Decimal::new(150, 2));
        assert_eq!(summary.yesterday, Decimal::new(200, 2));
        assert_eq!(summary.this_week, Decimal::new(650, 2));
        assert_eq!(summary.this_month, Decimal::new(1050, 2));
        assert_eq!(summary.total, Decimal::new(1550, 2));
    }

    #[test]
    fn test_yesterday_crosses_month_boundary() {
        let now = Utc.with_ymd_and_hms(2026, 11, 1, 9, 0, 0).unwrap();
        let records = vec![row(100, 0, 2026, 10, 31, 22)];

        let summary = CommissionSummary::from_records(&records, now);

        assert_eq!(summary.yesterday, Decimal::new(100, 0));
        assert_eq!(summary.this_month, Decimal::ZERO);
    }

    #[test]
    fn test_future_records_only_count_in_total() {
        let now = Utc.with_ymd_and_hms(2026, 10, 15, 12, 0, 0).unwrap();
        let records = vec![row(100, 0, 2026, 10, 16, 1)];

        let summary = CommissionSummary::from_records(&records, now);

        assert_eq!(summary.today, Decimal::ZERO);
        assert_eq!(summary.this_week, Decimal::ZERO);
        assert_eq!(summary.total, Decimal::new(100, 0));
    }

    #[test]
    fn test_empty() {
        let now = Utc::now();
        assert_eq!(
            CommissionSummary::from_records(&Vec::new(), now),
            CommissionSummary::default()
        );
    }
}
