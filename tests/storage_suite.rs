mod common;

use std::fs;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use site_ledger::{
    config::Config,
    domain::{categories, AttendanceRecord, EntityRef, LedgerEntry, PaymentMethod, Worker},
    ledger::LedgerStore,
};

use common::{setup_store, temp_dir};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn header_of(path: &std::path::Path) -> String {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .next()
        .unwrap_or_default()
        .to_string()
}

#[test]
fn missing_files_are_created_with_headers() {
    let (store, dir) = setup_store();
    let report = store.check_tables().unwrap();
    assert!(report.is_clean(), "{report:?}");
    assert_eq!(
        header_of(&dir.join("ledger.csv")),
        "Date,Category,Description,Amount,Entity,PaymentMethod,Id"
    );
    assert_eq!(header_of(&dir.join("contract.csv")), "TotalContractValue");
    assert_eq!(store.cash_balance().unwrap(), Decimal::ZERO);
}

#[test]
fn missing_numeric_column_heals_to_zero() {
    let dir = temp_dir();
    fs::write(
        dir.join("ledger.csv"),
        "Date,Category,Description\n2024-02-01,Fuel,diesel\n2024-02-02,Feed,corn\n",
    )
    .unwrap();
    let store = LedgerStore::open(&dir, b',', true).unwrap();

    let report = store.check_tables().unwrap();
    let migration = report
        .migrations
        .iter()
        .find(|migration| migration.table == "ledger")
        .expect("ledger migration");
    assert!(migration.added_columns.contains(&"Amount".to_string()));
    assert!(migration.added_columns.contains(&"Entity".to_string()));
    assert!(migration.rewritten);

    let entries = store.entries().unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|entry| entry.amount == Decimal::ZERO));
    assert!(entries.iter().all(|entry| entry.entity.is_general()));
    assert_eq!(store.cash_balance().unwrap(), Decimal::ZERO);
    assert_eq!(
        header_of(&dir.join("ledger.csv")),
        "Date,Category,Description,Amount,Entity,PaymentMethod,Id"
    );
}

#[test]
fn legacy_headers_are_aliased_and_unknown_columns_kept() {
    let dir = temp_dir();
    fs::write(
        dir.join("ledger.csv"),
        "Data,Tipo,Categoria,Descricao,Valor,Responsavel\n\
         2024-01-05,Saida,Fuel,Diesel,-200.0,Hilux\n\
         2024-01-06 10:00:00,Entrada,Revenue,Parcela,1500,Geral\n",
    )
    .unwrap();
    let store = LedgerStore::open(&dir, b',', true).unwrap();

    let entries = store.entries().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].amount, Decimal::new(-200, 0));
    assert_eq!(entries[0].entity, EntityRef::named("Hilux"));
    assert_eq!(entries[1].date, date(2024, 1, 6));
    assert!(entries[1].entity.is_general());
    assert_eq!(store.cash_balance().unwrap(), Decimal::new(1300, 0));

    let rewritten = fs::read_to_string(dir.join("ledger.csv")).unwrap();
    assert_eq!(
        rewritten.lines().next().unwrap(),
        "Date,Category,Description,Amount,Entity,PaymentMethod,Id,Tipo"
    );
    assert!(rewritten.lines().nth(1).unwrap().ends_with(",Saida"));

    // Ids were written back, so they stay the same from now on.
    let again = store.entries().unwrap();
    assert_eq!(entries[0].id, again[0].id);
    assert!(store.check_tables().unwrap().is_clean());

    store
        .append(&LedgerEntry::new(date(2024, 1, 7), categories::FUEL, "gasoline", Decimal::new(-30, 0)))
        .unwrap();
    let appended = fs::read_to_string(dir.join("ledger.csv")).unwrap();
    let lines: Vec<&str> = appended.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[1].ends_with(",Saida"));
    assert!(lines[2].ends_with(",Entrada"));
    assert!(lines[3].ends_with(','), "{}", lines[3]);
}

#[test]
fn first_layout_labor_rows_count_as_labor() {
    let dir = temp_dir();
    fs::write(
        dir.join("ledger.csv"),
        "Data,Tipo,Categoria,Descricao,Valor,Responsavel\n\
         2024-01-08 17:30:00.123456,Mão de Obra,Equipe,Vale (Adiantamento) - João (Pedreiro),-100.0,João (Pedreiro)\n\
         2024-01-08 18:00:00,Despesa,Combustível,diesel,-40.0,Geral\n",
    )
    .unwrap();
    let store = LedgerStore::open(&dir, b',', true).unwrap();

    let report = store.check_tables().unwrap();
    let migration = report
        .migrations
        .iter()
        .find(|migration| migration.table == "ledger")
        .expect("ledger migration");
    assert_eq!(migration.relabeled_values, 1);

    let worker = Worker::new("João (Pedreiro)", "Mason", Decimal::new(150, 0), date(2024, 1, 1));
    store.append_worker(&worker).unwrap();
    store
        .append_attendance(&AttendanceRecord::new(date(2024, 1, 8), "João (Pedreiro)", Decimal::ONE))
        .unwrap();
    assert_eq!(store.worker_balance(&worker).unwrap(), Decimal::new(50, 0));

    let rewritten = fs::read_to_string(dir.join("ledger.csv")).unwrap();
    let labor = rewritten.lines().nth(1).unwrap();
    assert!(labor.starts_with("2024-01-08,Labor,Vale (Adiantamento) - João (Pedreiro),-100,João (Pedreiro),"));
    assert!(labor.ends_with(",Mão de Obra"), "{labor}");
    assert!(rewritten.lines().nth(2).unwrap().contains(",Combustível,"));

    let reopened = LedgerStore::open(&dir, b',', true).unwrap();
    assert!(reopened.check_tables().unwrap().is_clean());
    assert_eq!(reopened.worker_balance(&worker).unwrap(), Decimal::new(50, 0));
}

#[test]
fn healed_table_is_left_alone_when_rewrite_is_off() {
    let dir = temp_dir();
    let original = "Date,Category,Amount\n2024-03-01,Fuel,-10\n";
    fs::write(dir.join("ledger.csv"), original).unwrap();
    let store = LedgerStore::open(&dir, b',', false).unwrap();

    let first = store.entries().unwrap();
    let second = store.entries().unwrap();
    assert_eq!(fs::read_to_string(dir.join("ledger.csv")).unwrap(), original);
    assert_eq!(first[0].amount, Decimal::new(-10, 0));
    assert_eq!(first[0].id, second[0].id, "derived ids must be stable");

    let report = store.check_tables().unwrap();
    assert!(!report.migrations[0].rewritten);
    assert_eq!(report.migrations[0].assigned_ids, 1);
}

#[test]
fn unreadable_table_is_set_aside_and_recreated() {
    let dir = temp_dir();
    fs::write(dir.join("ledger.csv"), [0xff, 0xfe, b',', 0xc3, b'\n', b'1']).unwrap();
    let store = LedgerStore::open(&dir, b',', true).unwrap();

    let report = store.check_tables().unwrap();
    assert_eq!(report.recovered_tables, vec!["ledger".to_string()]);
    assert!(!report.warnings.is_empty());
    assert!(store.entries().unwrap().is_empty());

    let copies: Vec<_> = fs::read_dir(&dir)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry
                .file_name()
                .to_string_lossy()
                .starts_with("ledger.csv.corrupt-")
        })
        .collect();
    assert_eq!(copies.len(), 1);
    assert_eq!(
        fs::read(copies[0].path()).unwrap(),
        vec![0xff, 0xfe, b',', 0xc3, b'\n', b'1']
    );
}

#[test]
fn non_numeric_amount_is_coerced_with_a_warning() {
    let dir = temp_dir();
    fs::write(
        dir.join("ledger.csv"),
        "Date,Category,Description,Amount,Entity,PaymentMethod,Id\n\
         2024-04-01,Fuel,diesel,lots,General,,\n\
         2024-04-02,Fuel,diesel,\"-12,5\",General,Card,\n",
    )
    .unwrap();
    let store = LedgerStore::open(&dir, b',', true).unwrap();

    let report = store.check_tables().unwrap();
    assert!(report.warnings.iter().any(|w| w.contains("lots")), "{report:?}");
    let entries = store.entries().unwrap();
    assert_eq!(entries[0].amount, Decimal::ZERO);
    assert_eq!(entries[1].amount, Decimal::new(-125, 1));
    assert_eq!(entries[1].payment_method, Some(PaymentMethod::Card));
}

#[test]
fn collections_survive_reopening() {
    let (store, dir) = setup_store();
    let entry = LedgerEntry::new(date(2024, 5, 1), categories::MATERIALS, "sand, gravel", Decimal::new(-12_550, 2))
        .with_entity(EntityRef::named("Ana"))
        .with_payment_method(Some(PaymentMethod::Pix));
    store.append(&entry).unwrap();
    let mut worker = Worker::new("Ana", "Mason", Decimal::new(1505, 1), date(2024, 4, 1));
    worker.payment_details.pix_key = Some("ana@example.com".into());
    store.append_worker(&worker).unwrap();
    drop(store);

    let reopened = LedgerStore::open(&dir, b',', true).unwrap();
    assert_eq!(reopened.entries().unwrap(), vec![entry]);
    assert_eq!(reopened.workers().unwrap(), vec![worker]);
    assert!(reopened.check_tables().unwrap().is_clean());
}

#[test]
fn config_controls_delimiter_and_location() {
    let home = temp_dir();
    let config = Config {
        delimiter: ';',
        data_dir: Some(home.join("books")),
        ..Config::default()
    };
    let store = LedgerStore::from_config(&config, &home).unwrap();
    store
        .append(&LedgerEntry::new(date(2024, 6, 1), categories::FEED, "corn", Decimal::new(-40, 0)))
        .unwrap();
    let text = fs::read_to_string(home.join("books").join("ledger.csv")).unwrap();
    assert!(text.starts_with("Date;Category;Description;Amount;Entity;PaymentMethod;Id"));
    assert!(text.contains(";corn;-40;General;"));
}
