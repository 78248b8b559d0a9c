mod common;

use common::{date, desk, engine_with_db};
use quarry_engine::{
    DateRange, EngineError, Money, NewExpense, NewPrepayment, NewSale, PaymentStatus, Quantity,
    SiteFees,
};
use sea_orm::{ConnectionTrait, Statement};
use uuid::Uuid;

#[tokio::test]
async fn site_names_and_fees_are_validated() {
    let (engine, _db) = engine_with_db().await;

    let err = engine.new_site("   ", SiteFees::default()).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidName("site name must not be empty".to_string())
    );

    let negative = SiteFees {
        loader_fee: Some(Money::new(-100)),
        ..SiteFees::default()
    };
    let err = engine.new_site("East Pit", negative).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let oversized = SiteFees {
        land_rate_fee: Some(Money::new(i64::MAX)),
        ..SiteFees::default()
    };
    let err = engine.new_site("East Pit", oversized).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let site = engine.new_site("  East Pit ", SiteFees::default()).await.unwrap();
    assert_eq!(engine.site(site).await.unwrap().name, "East Pit");
}

#[tokio::test]
async fn fee_changes_apply_to_the_next_report() {
    let desk = desk().await;
    let engine = &desk.engine;
    engine.record_sale(desk.paid_sale(2, 10)).await.unwrap();

    let fees = SiteFees {
        loader_fee: None,
        land_rate_fee: Some(Money::ZERO),
        rejects_fee: Some(Money::major(5)),
    };
    engine.set_site_fees(desk.site, fees).await.unwrap();
    assert_eq!(engine.site_fees(desk.site).await.unwrap(), fees);

    let report = engine
        .build_manager_report(Some(desk.site), DateRange::day(date(2)), None)
        .await
        .unwrap();
    assert!(!report.land_rate_visible);
    assert_eq!(report.expense_totals.loaders_fee, Money::ZERO);
    assert_eq!(report.expense_totals.land_rate_fee, Money::ZERO);
    assert_eq!(report.total_expenses(), Money::major(20));

    let err = engine
        .set_site_fees(Uuid::new_v4(), SiteFees::default())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::SiteNotFound(_)));
}

#[tokio::test]
async fn paid_sale_without_date_is_paid_on_the_sale_day() {
    let desk = desk().await;
    let sale = desk.engine.record_sale(desk.paid_sale(3, 1)).await.unwrap();

    // Paid on the sale day: never a collection of the following days.
    let later = desk
        .engine
        .collections(desk.site, DateRange::new(date(4), date(9)).unwrap(), None)
        .await
        .unwrap();
    assert!(later.rows.is_empty());

    let err = desk.engine.mark_sale_paid(sale, date(2)).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidRange(_)));
}

#[tokio::test]
async fn sales_are_validated_before_writing() {
    let desk = desk().await;
    let engine = &desk.engine;

    let err = engine
        .record_sale(NewSale {
            quantity: Quantity::from_milli(-1),
            ..desk.paid_sale(2, 1)
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidQuantity(_)));

    let err = engine
        .record_sale(NewSale {
            price_per_unit: Money::new(-1),
            ..desk.paid_sale(2, 1)
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .record_sale(NewSale {
            price_per_unit: Money::new(i64::MAX / 1000),
            quantity: Quantity::units(2000),
            ..desk.paid_sale(2, 1)
        })
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidAmount("price per unit must not exceed 10000000.00".to_string())
    );

    let err = engine
        .record_sale(NewSale {
            quantity: Quantity::units(5_000_000),
            ..desk.paid_sale(2, 1)
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidQuantity(_)));

    let err = engine
        .record_sale(NewSale {
            operator_id: Uuid::new_v4(),
            ..desk.paid_sale(2, 1)
        })
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("operator not exists".to_string())
    );

    let err = engine
        .record_sale(NewSale {
            site_id: Uuid::new_v4(),
            ..desk.paid_sale(2, 1)
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::SiteNotFound(_)));

    let err = engine
        .record_sale(NewSale {
            payment_status: PaymentStatus::Paid,
            payment_received_on: Some(date(1)),
            ..desk.paid_sale(2, 1)
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidRange(_)));

    let report = engine
        .build_manager_report(Some(desk.site), DateRange::day(date(2)), None)
        .await
        .unwrap();
    assert!(report.sales.is_empty());
}

#[tokio::test]
async fn expenses_and_prepayments_need_a_positive_amount() {
    let desk = desk().await;
    let engine = &desk.engine;

    let err = engine
        .record_expense(NewExpense {
            date: date(2),
            site_id: desk.site,
            operator_id: desk.clerk,
            item: "Tea".to_string(),
            amount: Money::ZERO,
        })
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidAmount("expense must be greater than zero".to_string())
    );

    let err = engine
        .record_prepayment(NewPrepayment {
            date: date(2),
            site_id: desk.site,
            operator_id: desk.clerk,
            client: "Baraka Builders".to_string(),
            vehicle_registration: Some("KCB 900X".to_string()),
            product_id: Some(desk.gravel),
            amount_paid: Money::new(-5),
            reference: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine.deactivate_expense(Uuid::new_v4()).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("expense not exists".to_string())
    );
}

#[tokio::test]
async fn unreadable_payment_status_fails_the_report() {
    let desk = desk().await;
    let sale = desk.engine.record_sale(desk.paid_sale(2, 1)).await.unwrap();
    desk.db
        .execute(Statement::from_sql_and_values(
            desk.db.get_database_backend(),
            "UPDATE sales SET payment_status = ? WHERE id = ?",
            vec!["partial".into(), sale.into()],
        ))
        .await
        .unwrap();

    let err = desk
        .engine
        .build_manager_report(Some(desk.site), DateRange::day(date(2)), None)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidData("invalid payment status: partial".to_string())
    );
    assert_eq!(desk.engine.closing_balance(desk.site, date(2)).await.unwrap(), None);
}
