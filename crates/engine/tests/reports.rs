mod common;

use common::{date, desk, engine_with_db, standard_fees};
use quarry_engine::{
    DateRange, EngineError, LineType, Money, NewBanking, NewExpense, NewFuelUsage, NewPrepayment,
    NewSale, PaymentStatus, Quantity, ReportKind,
};
use uuid::Uuid;

#[tokio::test]
async fn gravel_sale_costs_more_than_it_earns() {
    let desk = desk().await;
    desk.engine.record_sale(desk.paid_sale(2, 100)).await.unwrap();

    let report = desk
        .engine
        .build_manager_report(Some(desk.site), DateRange::day(date(2)), None)
        .await
        .unwrap();

    assert_eq!(report.kind, ReportKind::Manager);
    assert_eq!(report.site_name, "North Pit");
    assert!(report.land_rate_visible);
    assert_eq!(report.total_sales, Money::major(2_000));
    assert_eq!(report.total_quantity, Quantity::units(100));
    assert_eq!(report.unpaid, Money::ZERO);
    assert_eq!(report.expense_totals.commission, Money::major(200));
    assert_eq!(report.expense_totals.loaders_fee, Money::major(5_000));
    assert_eq!(report.expense_totals.land_rate_fee, Money::major(3_000));
    assert_eq!(report.total_expenses(), Money::major(8_200));
    assert_eq!(report.earnings, Money::major(-6_200));
    assert_eq!(report.cash_in_hand, Money::major(-6_200));
    assert_eq!(report.sales.len(), 1);
    assert_eq!(report.sales[0].product_name, "Gravel");
    assert_eq!(report.sales[0].operator_name, "Wanjiku");
}

#[tokio::test]
async fn closing_balance_carries_into_the_next_day() {
    let desk = desk().await;
    desk.engine
        .upsert_closing_balance(desk.site, date(1), Money::major(500))
        .await
        .unwrap();

    let report = desk
        .engine
        .build_clerk_report(desk.site, desk.clerk, DateRange::day(date(2)))
        .await
        .unwrap();

    assert_eq!(report.actual_opening_balance, Money::major(500));
    assert_eq!(report.cash_in_hand_carry_forward, Money::major(500));
    assert_eq!(report.cash_in_hand, Money::major(500));
    assert_eq!(
        desk.engine.closing_balance(desk.site, date(2)).await.unwrap(),
        Some(Money::major(500))
    );
    assert_eq!(
        desk.engine.opening_balance(desk.site, date(3)).await.unwrap(),
        Money::major(500)
    );
}

#[tokio::test]
async fn opening_balance_defaults_to_zero() {
    let desk = desk().await;

    let opening = desk.engine.opening_balance(desk.site, date(10)).await.unwrap();

    assert_eq!(opening, Money::ZERO);
    assert_eq!(
        desk.engine.closing_balance(desk.site, date(9)).await.unwrap(),
        None
    );
}

#[tokio::test]
async fn regenerating_a_day_is_idempotent() {
    let desk = desk().await;
    desk.engine.record_sale(desk.paid_sale(2, 10)).await.unwrap();
    desk.engine
        .record_banking(NewBanking {
            date: date(2),
            site_id: desk.site,
            operator_id: desk.clerk,
            item: "Deposit".to_string(),
            amount_banked: Money::major(50),
            reference: Some("SLIP-1".to_string()),
        })
        .await
        .unwrap();

    let first = desk
        .engine
        .build_clerk_report(desk.site, desk.clerk, DateRange::day(date(2)))
        .await
        .unwrap();
    let stored = desk.engine.closing_balance(desk.site, date(2)).await.unwrap();
    let second = desk
        .engine
        .build_clerk_report(desk.site, desk.clerk, DateRange::day(date(2)))
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(stored, Some(first.cash_in_hand));
    assert_eq!(
        desk.engine.closing_balance(desk.site, date(2)).await.unwrap(),
        stored
    );
}

async fn record_two_clerks(desk: &common::Desk) {
    desk.engine.record_sale(desk.paid_sale(2, 10)).await.unwrap();
    let mut other = desk.paid_sale(2, 1);
    other.operator_id = desk.other_clerk;
    desk.engine.record_sale(other).await.unwrap();
}

#[tokio::test]
async fn clerk_reports_store_the_site_closing_balance() {
    for clerk_first in [true, false] {
        let desk = desk().await;
        record_two_clerks(&desk).await;
        let day = DateRange::day(date(2));

        let order = if clerk_first {
            [desk.clerk, desk.other_clerk]
        } else {
            [desk.other_clerk, desk.clerk]
        };
        let mut reports = Vec::new();
        for operator in order {
            let report = desk
                .engine
                .build_clerk_report(desk.site, operator, day)
                .await
                .unwrap();
            reports.push((operator, report.cash_in_hand));
            assert_eq!(
                desk.engine.closing_balance(desk.site, date(2)).await.unwrap(),
                Some(Money::major(-682))
            );
        }

        for (operator, cash_in_hand) in reports {
            let expected = if operator == desk.clerk {
                Money::major(-620)
            } else {
                Money::major(-62)
            };
            assert_eq!(cash_in_hand, expected);
        }
        assert_eq!(
            desk.engine.opening_balance(desk.site, date(3)).await.unwrap(),
            Money::major(-682)
        );
    }
}

#[tokio::test]
async fn manager_report_for_one_operator_stores_the_site_closing_balance() {
    let desk = desk().await;
    record_two_clerks(&desk).await;

    let report = desk
        .engine
        .build_manager_report(Some(desk.site), DateRange::day(date(2)), Some(desk.other_clerk))
        .await
        .unwrap();

    assert_eq!(report.operator_name.as_deref(), Some("Kamau"));
    assert_eq!(report.cash_in_hand, Money::major(-62));
    assert_eq!(
        desk.engine.opening_balance(desk.site, date(3)).await.unwrap(),
        Money::major(-682)
    );
}

#[tokio::test]
async fn concurrent_single_day_builds_converge() {
    let desk = desk().await;
    record_two_clerks(&desk).await;
    let day = DateRange::day(date(2));

    let (a, b) = tokio::join!(
        desk.engine.build_manager_report(Some(desk.site), day, None),
        desk.engine.build_manager_report(Some(desk.site), day, None),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(a, b);
    assert_eq!(a.cash_in_hand, Money::major(-682));
    assert_eq!(
        desk.engine.closing_balance(desk.site, date(2)).await.unwrap(),
        Some(a.cash_in_hand)
    );
}

#[tokio::test]
async fn cash_in_hand_reconciles_every_source() {
    let desk = desk().await;
    let engine = &desk.engine;
    engine
        .upsert_closing_balance(desk.site, date(4), Money::major(1_000))
        .await
        .unwrap();

    engine.record_sale(desk.paid_sale(5, 10)).await.unwrap();
    let mut unpaid = desk.paid_sale(5, 5);
    unpaid.payment_status = PaymentStatus::Unpaid;
    unpaid.product_id = Some(desk.hardcore);
    unpaid.include_land_rate = false;
    engine.record_sale(unpaid).await.unwrap();

    let earlier = engine.record_sale(desk.paid_sale(2, 3)).await.unwrap();
    engine.mark_sale_paid(earlier, date(5)).await.unwrap();

    engine
        .record_expense(NewExpense {
            date: date(5),
            site_id: desk.site,
            operator_id: desk.clerk,
            item: "Casual labour".to_string(),
            amount: Money::major(120),
        })
        .await
        .unwrap();
    engine
        .record_prepayment(NewPrepayment {
            date: date(5),
            site_id: desk.site,
            operator_id: desk.clerk,
            client: "Baraka Builders".to_string(),
            vehicle_registration: None,
            product_id: None,
            amount_paid: Money::major(400),
            reference: None,
        })
        .await
        .unwrap();
    engine
        .record_banking(NewBanking {
            date: date(5),
            site_id: desk.site,
            operator_id: desk.clerk,
            item: "Deposit".to_string(),
            amount_banked: Money::major(300),
            reference: None,
        })
        .await
        .unwrap();

    let report = engine
        .build_manager_report(Some(desk.site), DateRange::day(date(5)), None)
        .await
        .unwrap();

    // 10 gravel at 20 paid, 5 hardcore at 20 unpaid.
    assert_eq!(report.total_sales, Money::major(300));
    assert_eq!(report.unpaid, Money::major(100));
    assert_eq!(report.total_collections, Money::major(60));
    assert_eq!(report.total_prepayments, Money::major(400));
    assert_eq!(report.total_banked, Money::major(300));
    assert_eq!(report.expense_totals.user, Money::major(120));
    assert_eq!(report.expense_totals.commission, Money::major(30));
    assert_eq!(report.expense_totals.loaders_fee, Money::major(500));
    assert_eq!(report.expense_totals.land_rate_fee, Money::major(300));
    assert_eq!(report.prepayments[0].product_name, "Not Specified");

    let expected = (report.total_sales - report.total_expenses()
        + report.cash_in_hand_carry_forward
        + report.total_collections
        + report.total_prepayments)
        - report.unpaid
        - report.total_banked;
    assert_eq!(report.cash_in_hand, expected);
    assert_eq!(report.cash_in_hand, Money::major(410));
    assert_eq!(
        engine.closing_balance(desk.site, date(5)).await.unwrap(),
        Some(Money::major(410))
    );
}

#[tokio::test]
async fn late_payment_is_a_collection_not_a_sale() {
    let desk = desk().await;
    let mut sale = desk.paid_sale(7, 4);
    sale.payment_status = PaymentStatus::Unpaid;
    sale.client = Some("Mwangi Hardware".to_string());
    let sale_id = desk.engine.record_sale(sale).await.unwrap();
    desk.engine.mark_sale_paid(sale_id, date(11)).await.unwrap();

    let range = DateRange::new(date(10), date(12)).unwrap();
    let report = desk
        .engine
        .build_manager_report(Some(desk.site), range, None)
        .await
        .unwrap();

    assert!(report.sales.is_empty());
    assert_eq!(report.total_sales, Money::ZERO);
    assert_eq!(report.collections.len(), 1);
    let row = &report.collections[0];
    assert_eq!(row.sale_date, date(7));
    assert_eq!(row.payment_received_on, date(11));
    assert_eq!(row.amount, Money::major(80));
    assert_eq!(row.client, "Mwangi Hardware");
    assert_eq!(row.product_name, "Gravel");
    assert_eq!(report.total_collections, Money::major(80));

    let collections = desk
        .engine
        .collections(desk.site, range, Some(desk.clerk))
        .await
        .unwrap();
    assert_eq!(collections.rows, report.collections);
}

#[tokio::test]
async fn multi_day_reports_read_two_balances_and_never_write() {
    let desk = desk().await;
    let engine = &desk.engine;
    engine
        .upsert_closing_balance(desk.site, date(1), Money::major(100))
        .await
        .unwrap();
    engine
        .upsert_closing_balance(desk.site, date(3), Money::major(300))
        .await
        .unwrap();

    let report = engine
        .build_manager_report(
            Some(desk.site),
            DateRange::new(date(2), date(4)).unwrap(),
            None,
        )
        .await
        .unwrap();

    assert_eq!(report.actual_opening_balance, Money::major(100));
    assert_eq!(report.cash_in_hand_carry_forward, Money::major(300));
    assert_eq!(report.cash_in_hand, Money::major(300));
    assert_eq!(engine.closing_balance(desk.site, date(4)).await.unwrap(), None);
    assert_eq!(
        engine.closing_balance(desk.site, date(3)).await.unwrap(),
        Some(Money::major(300))
    );
}

#[tokio::test]
async fn inverted_range_is_rejected() {
    let desk = desk().await;
    let err = DateRange::new(date(5), date(1)).unwrap_err();
    assert!(matches!(err, EngineError::InvalidRange(_)));

    let inverted: DateRange =
        serde_json::from_str(r#"{"from":"2026-03-05","to":"2026-03-01"}"#).unwrap();
    let err = desk
        .engine
        .build_manager_report(Some(desk.site), inverted, None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidRange(_)));

    let err = desk
        .engine
        .build_multi_site_history(&[desk.site], inverted)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidRange(_)));
}

#[tokio::test]
async fn missing_site_yields_an_empty_report() {
    let desk = desk().await;
    let ghost = Uuid::new_v4();

    let report = desk
        .engine
        .build_clerk_report(ghost, desk.clerk, DateRange::day(date(2)))
        .await
        .unwrap();

    assert_eq!(report.site_name, "Unknown");
    assert_eq!(report.cash_in_hand, Money::ZERO);
    assert!(report.sales.is_empty());
    assert_eq!(desk.engine.closing_balance(ghost, date(2)).await.unwrap(), None);

    let err = desk.engine.site_fees(ghost).await.unwrap_err();
    assert_eq!(err, EngineError::SiteNotFound(ghost.to_string()));
}

#[tokio::test]
async fn clerk_report_only_sees_its_operator() {
    let desk = desk().await;
    let engine = &desk.engine;
    engine.record_sale(desk.paid_sale(2, 10)).await.unwrap();
    let mut other = desk.paid_sale(2, 7);
    other.operator_id = desk.other_clerk;
    engine.record_sale(other).await.unwrap();
    engine
        .record_expense(NewExpense {
            date: date(2),
            site_id: desk.site,
            operator_id: desk.other_clerk,
            item: "Tea".to_string(),
            amount: Money::major(15),
        })
        .await
        .unwrap();
    engine
        .record_fuel_usage(NewFuelUsage {
            date: date(2),
            site_id: desk.site,
            old_stock: Quantity::units(200),
            new_stock: Quantity::units(180),
            machine_consumption: Quantity::units(30),
            loader_consumption: Quantity::from_milli(12_500),
        })
        .await
        .unwrap();

    let report = engine
        .build_clerk_report(desk.site, desk.clerk, DateRange::day(date(2)))
        .await
        .unwrap();

    assert_eq!(report.kind, ReportKind::Clerk);
    assert_eq!(report.operator_name.as_deref(), Some("Wanjiku"));
    assert_eq!(report.sales.len(), 1);
    assert_eq!(report.total_quantity, Quantity::units(10));
    assert_eq!(report.expense_totals.user, Money::ZERO);
    assert_eq!(report.fuel_usages.len(), 1);
    assert_eq!(report.fuel_usages[0].balance, Quantity::from_milli(137_500));
    assert!(report.product_breakdown.is_empty());
    assert!(report.clerk_breakdown.is_empty());
}

#[tokio::test]
async fn expense_items_keep_generation_order_within_a_day() {
    let desk = desk().await;
    let engine = &desk.engine;
    let mut brokered = desk.paid_sale(3, 10);
    brokered.broker_id = Some(desk.broker);
    engine.record_sale(brokered).await.unwrap();
    let mut hardcore = desk.paid_sale(2, 4);
    hardcore.product_id = Some(desk.hardcore);
    engine.record_sale(hardcore).await.unwrap();

    let breakdown = engine
        .expense_items(desk.site, DateRange::new(date(1), date(3)).unwrap(), None)
        .await
        .unwrap();

    let types: Vec<LineType> = breakdown.lines.iter().map(|line| line.line_type).collect();
    assert_eq!(
        types,
        vec![
            LineType::CommissionExpense,
            LineType::LandRateFeeExpense,
            LineType::CommissionExpense,
            LineType::LoadersFeeExpense,
            LineType::LandRateFeeExpense,
        ]
    );
    assert_eq!(
        breakdown.lines[2].description,
        "Commission: KBX 123A - Gravel (10 units) - Broker: Otieno"
    );
    assert_eq!(breakdown.totals.total(), Money::major(8 + 120 + 20 + 500 + 300));
}

#[tokio::test]
async fn deactivated_rows_disappear() {
    let desk = desk().await;
    let engine = &desk.engine;
    let sale = engine.record_sale(desk.paid_sale(2, 10)).await.unwrap();
    let expense = engine
        .record_expense(NewExpense {
            date: date(2),
            site_id: desk.site,
            operator_id: desk.clerk,
            item: "Casual labour".to_string(),
            amount: Money::major(100),
        })
        .await
        .unwrap();

    engine.deactivate_sale(sale).await.unwrap();
    engine.deactivate_expense(expense).await.unwrap();

    let report = engine
        .build_manager_report(Some(desk.site), DateRange::day(date(2)), None)
        .await
        .unwrap();
    assert!(report.sales.is_empty());
    assert!(report.expenses.is_empty());
    assert_eq!(report.cash_in_hand, Money::ZERO);
}

#[tokio::test]
async fn concurrent_read_only_reports_agree() {
    let desk = desk().await;
    for day in 1..=6 {
        desk.engine.record_sale(desk.paid_sale(day, day as i64)).await.unwrap();
    }
    let wide = DateRange::new(date(1), date(6)).unwrap();
    let narrow = DateRange::new(date(3), date(6)).unwrap();

    let (a, b, c) = tokio::join!(
        desk.engine.build_manager_report(Some(desk.site), wide, None),
        desk.engine.build_manager_report(Some(desk.site), narrow, None),
        desk.engine.build_manager_report(Some(desk.site), wide, None),
    );
    let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());

    assert_eq!(a, c);
    assert_eq!(a.total_quantity, Quantity::units(21));
    assert_eq!(b.total_quantity, Quantity::units(18));
    let a_from_3: Money = a
        .daily_summaries
        .iter()
        .filter(|summary| summary.date >= date(3))
        .map(|summary| summary.revenue)
        .sum();
    assert_eq!(a_from_3, b.total_sales);
    assert_eq!(desk.engine.closing_balance(desk.site, date(6)).await.unwrap(), None);
}

#[tokio::test]
async fn multi_site_history_merges_and_groups_by_identifier() {
    let desk = desk().await;
    let engine = &desk.engine;
    let south = engine.new_site("South Pit", standard_fees()).await.unwrap();
    let other_gravel = engine.new_product("Gravel").await.unwrap();

    engine.record_sale(desk.paid_sale(2, 10)).await.unwrap();
    engine
        .record_sale(NewSale {
            site_id: south,
            product_id: Some(other_gravel),
            ..desk.paid_sale(2, 5)
        })
        .await
        .unwrap();

    let history = engine
        .build_multi_site_history(&[desk.site, south, Uuid::new_v4(), desk.site], DateRange::day(date(2)))
        .await
        .unwrap();

    assert_eq!(history.kind, ReportKind::MultiSite);
    assert_eq!(history.site_name, "North Pit, South Pit");
    assert_eq!(history.total_sales, Money::major(300));
    assert_eq!(history.sales.len(), 2);
    assert_eq!(history.daily_summaries.len(), 1);
    assert_eq!(history.daily_summaries[0].sales_count, 2);
    assert_eq!(history.product_breakdown.len(), 2);
    assert_eq!(history.product_breakdown[0].product_id, Some(desk.gravel));
    assert_eq!(history.product_breakdown[0].revenue, Money::major(200));
    assert_eq!(history.clerk_breakdown.len(), 1);
    assert_eq!(history.clerk_breakdown[0].revenue, Money::major(300));
    assert_eq!(engine.closing_balance(desk.site, date(2)).await.unwrap(), None);
    assert_eq!(engine.closing_balance(south, date(2)).await.unwrap(), None);
}

#[tokio::test]
async fn all_sites_manager_report_is_read_only() {
    let desk = desk().await;
    let engine = &desk.engine;
    let south = engine.new_site("South Pit", Default::default()).await.unwrap();
    engine.record_sale(desk.paid_sale(2, 10)).await.unwrap();
    engine
        .record_sale(NewSale {
            site_id: south,
            operator_id: desk.other_clerk,
            ..desk.paid_sale(2, 1)
        })
        .await
        .unwrap();

    let report = engine
        .build_manager_report(None, DateRange::day(date(2)), Some(desk.clerk))
        .await
        .unwrap();

    assert_eq!(report.site_name, "All Sites");
    assert_eq!(report.operator_name.as_deref(), Some("Wanjiku"));
    assert_eq!(report.total_sales, Money::major(200));
    assert_eq!(report.clerk_breakdown.len(), 1);
    assert_eq!(engine.closing_balance(desk.site, date(2)).await.unwrap(), None);
}

#[tokio::test]
async fn empty_database_reports_nothing() {
    let (engine, _db) = engine_with_db().await;

    let report = engine
        .build_manager_report(None, DateRange::day(date(2)), None)
        .await
        .unwrap();

    assert_eq!(report.site_name, "All Sites");
    assert_eq!(report.cash_in_hand, Money::ZERO);
    assert!(report.daily_summaries.is_empty());
}
