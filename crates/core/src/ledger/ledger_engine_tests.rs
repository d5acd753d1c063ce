#[cfg(test)]
mod tests {
    use crate::assets::{AssetRepositoryTrait, NewAsset};
    use crate::errors::{Error, Result};
    use crate::events::{DomainEvent, LedgerOperation, MockDomainEventSink};
    use crate::holdings::{Holding, HoldingRepositoryTrait};
    use crate::ledger::*;
    use crate::memory::InMemoryStore;
    use crate::portfolios::{NewPortfolio, PortfolioRepositoryTrait};
    use crate::prices::{NewPrice, PriceRepositoryTrait};
    use chrono::NaiveDate;
    use futures::future::join_all;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    const PORTFOLIO: &str = "p1";

    struct Fixture {
        store: InMemoryStore,
        sink: MockDomainEventSink,
        engine: Arc<LedgerEngine<InMemoryStore>>,
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    async fn fixture(assets: &[&str]) -> Fixture {
        let store = InMemoryStore::new();
        let shared = Arc::new(store.clone());
        let sink = MockDomainEventSink::new();
        let engine = LedgerEngine::new(
            store.clone(),
            shared.clone(),
            shared.clone(),
            shared.clone(),
            shared.clone(),
            shared,
            Arc::new(sink.clone()),
        );

        PortfolioRepositoryTrait::create(
            &store,
            NewPortfolio {
                id: Some(PORTFOLIO.to_string()),
                name: "Main".to_string(),
                description: String::new(),
            },
        )
        .await
        .unwrap();
        for asset_id in assets {
            AssetRepositoryTrait::create(
                &store,
                NewAsset {
                    id: Some(asset_id.to_string()),
                    name: asset_id.to_uppercase(),
                },
            )
            .await
            .unwrap();
        }

        Fixture {
            store,
            sink,
            engine: Arc::new(engine),
        }
    }

    impl Fixture {
        async fn price(&self, asset_id: &str, date: NaiveDate, price: Decimal) {
            self.store
                .upsert_price(NewPrice {
                    asset_id: asset_id.to_string(),
                    date,
                    price,
                })
                .await
                .unwrap();
        }

        async fn weights(&self, weights: &[(&str, Decimal)]) -> Result<Vec<Holding>> {
            let weights = weights
                .iter()
                .map(|(asset_id, weight)| WeightAssignment {
                    asset_id: asset_id.to_string(),
                    weight: *weight,
                })
                .collect();
            self.engine.set_target_weights(PORTFOLIO, weights).await
        }

        async fn deposit(&self, amount: Decimal, date: NaiveDate) -> Result<DepositReceipt> {
            self.engine
                .create_deposit(DepositRequest {
                    portfolio_id: PORTFOLIO.to_string(),
                    amount,
                    date,
                })
                .await
        }

        async fn trade(
            &self,
            asset_id: &str,
            transaction_type: TransactionType,
            value: Decimal,
            date: NaiveDate,
        ) -> Result<TransactionReceipt> {
            self.engine
                .create_transaction(TransactionRequest {
                    portfolio_id: PORTFOLIO.to_string(),
                    asset_id: asset_id.to_string(),
                    date,
                    transaction_type,
                    value,
                })
                .await
        }

        fn holding(&self, asset_id: &str) -> Option<Holding> {
            self.store.get_holding(PORTFOLIO, asset_id).unwrap()
        }

        fn quantity(&self, asset_id: &str) -> Decimal {
            self.holding(asset_id)
                .map(|h| h.quantity)
                .unwrap_or(Decimal::ZERO)
        }
    }

    #[tokio::test]
    async fn deposit_splits_amount_by_weight() {
        let fx = fixture(&["a1", "a2"]).await;
        fx.price("a1", day(2), dec!(10)).await;
        fx.price("a2", day(2), dec!(5)).await;
        fx.weights(&[("a1", dec!(0.6)), ("a2", dec!(0.4))])
            .await
            .unwrap();

        let receipt = fx.deposit(dec!(1000), day(2)).await.unwrap();

        assert_eq!(fx.quantity("a1"), dec!(60));
        assert_eq!(fx.quantity("a2"), dec!(80));
        let assets: Vec<&str> = receipt.changes.iter().map(|c| c.asset_id.as_str()).collect();
        assert_eq!(assets, vec!["a1", "a2"]);
        assert_eq!(receipt.changes[1].delta(), dec!(80));

        let invested = dec!(60) * dec!(10) + dec!(80) * dec!(5);
        assert_eq!(invested, receipt.deposit.amount);

        let deposits = fx.engine.list_deposits(PORTFOLIO).unwrap();
        assert_eq!(deposits, vec![receipt.deposit.clone()]);
        assert!(fx.sink.events().contains(&DomainEvent::deposit_distributed(
            PORTFOLIO.to_string(),
            receipt.deposit.id.clone(),
            dec!(1000),
            day(2),
            vec!["a1".to_string(), "a2".to_string()],
        )));
    }

    #[tokio::test]
    async fn deposit_quantities_round_half_even_to_eight_digits() {
        let fx = fixture(&["a1"]).await;
        fx.price("a1", day(1), dec!(3)).await;
        fx.weights(&[("a1", dec!(1))]).await.unwrap();

        fx.deposit(dec!(100), day(1)).await.unwrap();

        assert_eq!(fx.quantity("a1"), dec!(33.33333333));
    }

    #[tokio::test]
    async fn deposit_rejected_when_weights_do_not_sum_to_one() {
        let fx = fixture(&["a1", "a2"]).await;
        fx.price("a1", day(1), dec!(10)).await;
        fx.price("a2", day(1), dec!(10)).await;
        fx.weights(&[("a1", dec!(0.5)), ("a2", dec!(0.3))])
            .await
            .unwrap();

        let err = fx.deposit(dec!(500), day(1)).await.unwrap_err();

        match err {
            Error::Ledger(LedgerError::WeightsNotFullyAllocated { total, .. }) => {
                assert_eq!(total, dec!(0.8))
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(fx.quantity("a1"), Decimal::ZERO);
        assert_eq!(fx.quantity("a2"), Decimal::ZERO);
        assert!(fx.engine.list_deposits(PORTFOLIO).unwrap().is_empty());
    }

    #[tokio::test]
    async fn deposit_into_empty_portfolio_is_rejected() {
        let fx = fixture(&[]).await;

        let err = fx.deposit(dec!(100), day(1)).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Ledger(LedgerError::WeightsNotFullyAllocated { .. })
        ));
    }

    #[tokio::test]
    async fn missing_price_rolls_back_whole_deposit() {
        let fx = fixture(&["a1", "a2"]).await;
        fx.price("a1", day(1), dec!(10)).await;
        fx.weights(&[("a1", dec!(0.5)), ("a2", dec!(0.5))])
            .await
            .unwrap();

        let err = fx.deposit(dec!(100), day(1)).await.unwrap_err();

        match err {
            Error::Ledger(LedgerError::MissingPrice { asset_id, date }) => {
                assert_eq!(asset_id, "a2");
                assert_eq!(date, day(1));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // a1 sorts first and was allocated before a2 failed.
        assert_eq!(fx.quantity("a1"), Decimal::ZERO);
        assert!(fx.engine.list_deposits(PORTFOLIO).unwrap().is_empty());

        let rejected = fx.sink.events_for(PORTFOLIO).pop().unwrap();
        assert!(matches!(
            rejected,
            DomainEvent::LedgerOperationRejected {
                operation: LedgerOperation::Deposit,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn zero_weight_holdings_need_no_price() {
        let fx = fixture(&["a1", "a2"]).await;
        fx.price("a2", day(1), dec!(4)).await;
        fx.weights(&[("a2", dec!(1))]).await.unwrap();
        fx.trade("a2", TransactionType::Buy, dec!(40), day(1))
            .await
            .unwrap();
        fx.weights(&[("a1", dec!(1)), ("a2", dec!(0))])
            .await
            .unwrap();
        fx.price("a1", day(2), dec!(20)).await;

        let receipt = fx.deposit(dec!(200), day(2)).await.unwrap();

        assert_eq!(receipt.changes.len(), 1);
        assert_eq!(fx.quantity("a1"), dec!(10));
        assert_eq!(fx.quantity("a2"), dec!(10));
    }

    #[tokio::test]
    async fn deposit_amount_must_be_positive_after_rounding() {
        let fx = fixture(&["a1"]).await;
        fx.weights(&[("a1", dec!(1))]).await.unwrap();

        for amount in [dec!(0), dec!(-5), dec!(0.004)] {
            let err = fx.deposit(amount, day(1)).await.unwrap_err();
            assert!(matches!(
                err,
                Error::Ledger(LedgerError::NonPositiveAmount {
                    field: "amount",
                    ..
                })
            ));
        }
    }

    #[test]
    fn build_deposit_rounds_amount_half_even() {
        let deposit = build_deposit(DepositRequest {
            portfolio_id: " p1 ".to_string(),
            amount: dec!(10.005),
            date: day(1),
        })
        .unwrap();

        assert_eq!(deposit.portfolio_id, "p1");
        assert_eq!(deposit.amount, dec!(10.00));
    }

    #[tokio::test]
    async fn deposit_for_unknown_portfolio_is_not_found() {
        let fx = fixture(&[]).await;

        let err = fx
            .engine
            .create_deposit(DepositRequest {
                portfolio_id: "missing".to_string(),
                amount: dec!(10),
                date: day(1),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NotFound { entity: "Portfolio", .. }));
    }

    #[tokio::test]
    async fn buy_records_transaction_with_price_and_quantity() {
        let fx = fixture(&["a1"]).await;
        fx.price("a1", day(1), dec!(8)).await;

        let receipt = fx
            .trade("a1", TransactionType::Buy, dec!(100), day(1))
            .await
            .unwrap();

        assert_eq!(receipt.transaction.price, dec!(8));
        assert_eq!(receipt.transaction.quantity, dec!(12.5));
        assert_eq!(receipt.change.previous_quantity, Decimal::ZERO);
        assert_eq!(fx.quantity("a1"), dec!(12.5));
        assert_eq!(
            fx.engine.list_transactions(PORTFOLIO).unwrap(),
            vec![receipt.transaction]
        );
    }

    #[tokio::test]
    async fn oversell_is_rejected_and_quantity_kept() {
        let fx = fixture(&["a1"]).await;
        fx.price("a1", day(1), dec!(10)).await;
        fx.trade("a1", TransactionType::Buy, dec!(50), day(1))
            .await
            .unwrap();

        let err = fx
            .trade("a1", TransactionType::Sell, dec!(60), day(1))
            .await
            .unwrap_err();

        match err {
            Error::Ledger(LedgerError::InsufficientQuantity {
                held, requested, ..
            }) => {
                assert_eq!(held, dec!(5));
                assert_eq!(requested, dec!(6));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(fx.quantity("a1"), dec!(5));
        assert_eq!(fx.engine.list_transactions(PORTFOLIO).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn selling_an_asset_never_held_leaves_no_holding() {
        let fx = fixture(&["a1"]).await;
        fx.price("a1", day(1), dec!(10)).await;

        let err = fx
            .trade("a1", TransactionType::Sell, dec!(10), day(1))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Ledger(LedgerError::InsufficientQuantity { .. })
        ));
        assert!(fx.holding("a1").is_none());
    }

    #[tokio::test]
    async fn transaction_without_price_creates_nothing() {
        let fx = fixture(&["a1"]).await;

        let err = fx
            .trade("a1", TransactionType::Buy, dec!(10), day(3))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Ledger(LedgerError::MissingPrice { .. })
        ));
        assert!(fx.holding("a1").is_none());
        assert!(fx.engine.list_transactions(PORTFOLIO).unwrap().is_empty());
    }

    #[tokio::test]
    async fn buy_then_equal_sell_restores_quantity() {
        let fx = fixture(&["a1"]).await;
        fx.price("a1", day(1), dec!(7)).await;
        fx.weights(&[("a1", dec!(1))]).await.unwrap();
        fx.trade("a1", TransactionType::Buy, dec!(35), day(1))
            .await
            .unwrap();
        let before = fx.quantity("a1");

        fx.trade("a1", TransactionType::Buy, dec!(21), day(1))
            .await
            .unwrap();
        fx.trade("a1", TransactionType::Sell, dec!(21), day(1))
            .await
            .unwrap();

        assert_eq!(fx.quantity("a1"), before);
    }

    #[tokio::test]
    async fn emptied_holding_without_weight_is_removed() {
        let fx = fixture(&["a1"]).await;
        fx.price("a1", day(1), dec!(10)).await;
        fx.trade("a1", TransactionType::Buy, dec!(30), day(1))
            .await
            .unwrap();

        let receipt = fx
            .trade("a1", TransactionType::Sell, dec!(30), day(1))
            .await
            .unwrap();

        assert!(receipt.change.removed);
        assert!(fx.holding("a1").is_none());
        assert!(fx.sink.events().contains(&DomainEvent::holding_removed(
            PORTFOLIO.to_string(),
            "a1".to_string()
        )));
    }

    #[tokio::test]
    async fn emptied_holding_with_weight_is_kept() {
        let fx = fixture(&["a1"]).await;
        fx.price("a1", day(1), dec!(10)).await;
        fx.weights(&[("a1", dec!(1))]).await.unwrap();
        fx.trade("a1", TransactionType::Buy, dec!(30), day(1))
            .await
            .unwrap();

        let receipt = fx
            .trade("a1", TransactionType::Sell, dec!(30), day(1))
            .await
            .unwrap();

        assert!(!receipt.change.removed);
        let holding = fx.holding("a1").unwrap();
        assert!(holding.quantity.is_zero());
        assert_eq!(holding.weight, dec!(1));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_buys_are_all_applied() {
        let fx = fixture(&["a1"]).await;
        fx.price("a1", day(1), dec!(4)).await;

        let buys = (0..25).map(|_| {
            let engine = fx.engine.clone();
            tokio::spawn(async move {
                engine
                    .create_transaction(TransactionRequest {
                        portfolio_id: PORTFOLIO.to_string(),
                        asset_id: "a1".to_string(),
                        date: day(1),
                        transaction_type: TransactionType::Buy,
                        value: dec!(10),
                    })
                    .await
            })
        });
        for result in join_all(buys).await {
            result.unwrap().unwrap();
        }

        assert_eq!(fx.quantity("a1"), dec!(62.5));
        assert_eq!(fx.engine.list_transactions(PORTFOLIO).unwrap().len(), 25);
    }

    #[tokio::test]
    async fn weights_are_validated() {
        let fx = fixture(&["a1", "a2"]).await;

        let out_of_range = fx.weights(&[("a1", dec!(1.5))]).await.unwrap_err();
        assert!(matches!(
            out_of_range,
            Error::Ledger(LedgerError::WeightOutOfRange { .. })
        ));

        let negative = fx.weights(&[("a1", dec!(-0.1))]).await.unwrap_err();
        assert!(matches!(
            negative,
            Error::Ledger(LedgerError::WeightOutOfRange { .. })
        ));

        let duplicate = fx
            .weights(&[("a1", dec!(0.5)), ("a1", dec!(0.5))])
            .await
            .unwrap_err();
        assert!(matches!(
            duplicate,
            Error::Ledger(LedgerError::DuplicateAsset { .. })
        ));

        let unknown = fx.weights(&[("zz", dec!(0.5))]).await.unwrap_err();
        assert!(matches!(unknown, Error::NotFound { entity: "Asset", .. }));

        assert!(fx.store.list_by_portfolio(PORTFOLIO).unwrap().is_empty());
    }

    #[tokio::test]
    async fn weights_round_to_four_digits_and_keep_unlisted_holdings() {
        let fx = fixture(&["a1", "a2"]).await;
        fx.weights(&[("a1", dec!(0.5)), ("a2", dec!(0.5))])
            .await
            .unwrap();

        let holdings = fx.weights(&[("a1", dec!(0.33335))]).await.unwrap();

        assert_eq!(holdings.len(), 2);
        assert_eq!(fx.holding("a1").unwrap().weight, dec!(0.3334));
        assert_eq!(fx.holding("a2").unwrap().weight, dec!(0.5));
    }

    #[tokio::test]
    async fn clearing_weight_of_empty_holding_deletes_it() {
        let fx = fixture(&["a1"]).await;
        fx.weights(&[("a1", dec!(0.25))]).await.unwrap();
        assert!(fx.holding("a1").is_some());

        let holdings = fx.weights(&[("a1", dec!(0))]).await.unwrap();

        assert!(holdings.is_empty());
        assert!(fx.holding("a1").is_none());
    }

    #[tokio::test]
    async fn oversized_buy_is_rejected_and_later_writes_still_work() {
        let fx = fixture(&["a1"]).await;
        fx.price("a1", day(2), dec!(0.5)).await;

        let huge = Decimal::from_str_exact("70000000000000000000000000000").unwrap();
        let err = fx
            .trade("a1", TransactionType::Buy, huge, day(2))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Ledger(LedgerError::AmountOutOfRange { .. })
        ));
        assert!(fx.holding("a1").is_none());

        fx.trade("a1", TransactionType::Buy, dec!(1), day(2))
            .await
            .unwrap();
        assert_eq!(fx.quantity("a1"), dec!(2));
    }

    #[tokio::test]
    async fn oversized_deposit_is_rejected_and_later_deposits_still_work() {
        let fx = fixture(&["a1"]).await;
        fx.price("a1", day(2), dec!(0.5)).await;
        fx.weights(&[("a1", dec!(1))]).await.unwrap();

        let huge = Decimal::from_str_exact("70000000000000000000000000000").unwrap();
        let err = fx.deposit(huge, day(2)).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Ledger(LedgerError::AmountOutOfRange { .. })
        ));
        assert!(fx.quantity("a1").is_zero());

        fx.deposit(dec!(10), day(2)).await.unwrap();
        assert_eq!(fx.quantity("a1"), dec!(20));
        assert_eq!(fx.engine.list_deposits(PORTFOLIO).unwrap().len(), 1);
    }
}
