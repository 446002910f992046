#![cfg(feature = "storage-rocksdb")]

mod common;

use balance_relay::application::pipeline::{RunOutcome, TransactionPipeline};
use balance_relay::config::PipelineConfig;
use balance_relay::domain::account::AccountType;
use balance_relay::domain::ports::BalanceStore;
use balance_relay::domain::subscriber::SubscriberClass;
use balance_relay::infrastructure::local_bus::LocalBus;
use balance_relay::infrastructure::rocksdb::RocksDBStore;
use common::*;
use std::sync::Arc;
use tempfile::tempdir;

#[tokio::test]
async fn test_balance_and_subscribers_survive_restart() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    // 1. First run: register a subscriber and process a debit
    {
        let store = Arc::new(RocksDBStore::open(&db_path).unwrap());
        store
            .add_subscriber_uri(SubscriberClass::Raw, "http://raw.test/hook")
            .await
            .unwrap();

        let sender = Arc::new(RecordingSender::default());
        let pipeline = TransactionPipeline::new(
            Arc::new(StaticBankingApi::new(
                account(AccountType::Transactional),
                transaction("-500"),
            )),
            store,
            Arc::new(LocalBus::new()),
            sender.clone(),
            PipelineConfig::default(),
        );
        let outcome = pipeline
            .process(&push_body("TRANSACTION_CREATED", Some(TRANSACTION_ID)))
            .await
            .unwrap();
        assert!(matches!(outcome, RunOutcome::Completed(report) if report.balance_persisted));
        assert_eq!(sender.count().await, 1);
    }

    // 2. Second run: reopen the same path
    let store = RocksDBStore::open(&db_path).unwrap();
    assert_eq!(store.get_balance().await.unwrap(), BALANCE);
    assert_eq!(
        store
            .list_subscriber_uris(SubscriberClass::Raw)
            .await
            .unwrap(),
        vec!["http://raw.test/hook".to_string()]
    );
}
