//! Transactions desk over a session store: search, sort, paging, statistics
//! and chart series.

use banktech_core::{
    charts,
    error::SuiteError,
    store::SuiteStore,
    table::CsvTable,
    transactions::{transaction_stats, SearchField, SortKey, TransactionsDesk, TxnQuery},
};

const HEADER: &str = "Transaction_ID,Customer_ID,Name,Age,Income,Credit_Score,\
Transaction_Date,Transaction_Amount,Transaction_Type,Description,Transaction_Location\n";

const SMALL: &str = "\
Transaction_ID,Customer_ID,Name,Age,Income,Credit_Score,Transaction_Date,Transaction_Amount,Transaction_Type,Description,Transaction_Location
101,1,Asha Rao,34,52000,710,2025-02-03,1500.00,Credit,Salary credit,Mumbai
102,1,Asha Rao,34,52000,710,2025-01-15,200.50,Debit,Groceries,Pune
103,2,Vikram Singh,51,91000,640,2025-01-20,9000.00,Debit,Rent payment,Mumbai
104,1,Asha Rao,34,52000,710,2025-01-02,300.00,Debit,Fuel,Mumbai
105,3,ASHOK Menon,45,30000,590,2025-03-01,200.50,Credit,Refund,Delhi
";

fn desk_with(csv: &str) -> (TransactionsDesk, SuiteStore) {
    let mut store = SuiteStore::open_session().unwrap();
    let mut desk = TransactionsDesk::default();
    let table = CsvTable::from_csv_str("Transaction data", csv).unwrap();
    desk.load(&mut store, &table).unwrap();
    (desk, store)
}

fn many_rows(n: usize) -> String {
    let mut csv = HEADER.to_string();
    for i in 0..n {
        csv.push_str(&format!(
            "{},{},Customer {},30,40000,700,2025-01-01,{}.00,Debit,,Kochi\n",
            1000 + i,
            i % 7,
            i % 7,
            i
        ));
    }
    csv
}

// ─────────────────────────────────────────────────────────────────────────────
// Search and sort
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn customer_id_search_matches_exactly() {
    let (mut desk, store) = desk_with(SMALL);
    desk.set_query(TxnQuery {
        term: "1".into(),
        field: SearchField::CustomerId,
        sort: SortKey::TransactionAmount,
    })
    .unwrap();
    let page = desk.current_page(&store, 100).unwrap();
    let ids: Vec<i64> = page.rows.iter().map(|r| r.transaction_id).collect();
    // Ascending amount: 200.50, 300.00, 1500.00
    assert_eq!(ids, vec![102, 104, 101]);

    let summary = desk.customer_summary(&store).unwrap().unwrap();
    assert_eq!(summary.name, "Asha Rao");
    assert_eq!(summary.age, 34);
}

#[test]
fn name_search_is_case_insensitive_substring() {
    let (mut desk, store) = desk_with(SMALL);
    desk.set_query(TxnQuery {
        term: "ash".into(),
        field: SearchField::Name,
        sort: SortKey::TransactionDate,
    })
    .unwrap();
    let page = desk.current_page(&store, 100).unwrap();
    let ids: Vec<i64> = page.rows.iter().map(|r| r.transaction_id).collect();
    assert_eq!(ids, vec![104, 102, 101, 105]);
}

#[test]
fn equal_sort_keys_keep_upload_order() {
    let (mut desk, store) = desk_with(SMALL);
    desk.set_query(TxnQuery::default()).unwrap();
    let page = desk.current_page(&store, 100).unwrap();
    // 102 and 105 share 200.50
    assert_eq!(page.rows[0].transaction_id, 102);
    assert_eq!(page.rows[1].transaction_id, 105);
}

#[test]
fn non_numeric_id_search_is_rejected_and_previous_query_stays() {
    let (mut desk, store) = desk_with(SMALL);
    desk.set_query(TxnQuery {
        term: "2".into(),
        ..Default::default()
    })
    .unwrap();
    let err = desk
        .set_query(TxnQuery {
            term: "abc".into(),
            field: SearchField::TransactionId,
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, SuiteError::InvalidSearchTerm { .. }));
    assert_eq!(desk.current_page(&store, 100).unwrap().total_records, 1);
}

#[test]
fn queries_before_upload_fail() {
    let store = SuiteStore::open_session().unwrap();
    let mut desk = TransactionsDesk::default();
    assert!(matches!(
        desk.current_page(&store, 100),
        Err(SuiteError::NotLoaded { .. })
    ));
}

// ─────────────────────────────────────────────────────────────────────────────
// Paging
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn pages_hold_one_hundred_rows_and_clamp() {
    let (mut desk, store) = desk_with(&many_rows(250));
    let first = desk.current_page(&store, 100).unwrap();
    assert_eq!(first.total_pages, 3);
    assert_eq!(first.rows.len(), 100);

    desk.next_page(&store, 100).unwrap();
    let last = desk.next_page(&store, 100).unwrap();
    assert_eq!(last.page, 3);
    assert_eq!(last.rows.len(), 50);
    assert_eq!(desk.next_page(&store, 100).unwrap().page, 3);

    desk.previous_page(&store, 100).unwrap();
    desk.previous_page(&store, 100).unwrap();
    assert_eq!(desk.previous_page(&store, 100).unwrap().page, 1);
}

#[test]
fn narrowing_the_search_snaps_the_cursor_back() {
    let (mut desk, store) = desk_with(&many_rows(250));
    desk.next_page(&store, 100).unwrap();
    desk.next_page(&store, 100).unwrap();
    assert_eq!(desk.page, 3);

    desk.set_query(TxnQuery {
        term: "3".into(),
        ..Default::default()
    })
    .unwrap();
    let page = desk.current_page(&store, 100).unwrap();
    assert_eq!(page.page, 1);
    assert_eq!(page.total_pages, 1);
}

#[test]
fn empty_result_still_has_one_page() {
    let (mut desk, store) = desk_with(SMALL);
    desk.set_query(TxnQuery {
        term: "999".into(),
        ..Default::default()
    })
    .unwrap();
    let page = desk.current_page(&store, 100).unwrap();
    assert_eq!(page.total_pages, 1);
    assert!(page.rows.is_empty());
    assert!(desk.customer_summary(&store).unwrap().is_none());
}

// ─────────────────────────────────────────────────────────────────────────────
// Statistics and charts
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn statistics_split_credit_and_debit() {
    let (mut desk, store) = desk_with(SMALL);
    desk.set_query(TxnQuery {
        term: "1".into(),
        ..Default::default()
    })
    .unwrap();
    let rows = desk.filtered(&store).unwrap();
    let stats = transaction_stats(&rows);
    assert_eq!(stats.total_transactions, 3);
    assert_eq!(stats.total_amount, 2000.5);
    assert_eq!(stats.max_transaction, 1500.0);
    assert_eq!(stats.credit_count, 1);
    assert_eq!(stats.debit_count, 2);
    assert_eq!(stats.net_balance, 1500.0 - 500.5);
    assert_eq!(
        stats.locations,
        vec![("Mumbai".to_string(), 2), ("Pune".to_string(), 1)]
    );
}

#[test]
fn location_chart_folds_the_tail_into_other() {
    let mut csv = HEADER.to_string();
    for (i, city) in ["A", "A", "B", "C", "D", "E", "F", "G", "H"].iter().enumerate() {
        csv.push_str(&format!(
            "{i},1,X,30,1,700,2025-01-0{},10,Credit,,{city}\n",
            i % 9 + 1
        ));
    }
    let (desk, store) = desk_with(&csv);
    let rows = desk.filtered(&store).unwrap();

    let slices = charts::locations(&rows, 6);
    assert_eq!(slices.len(), 7);
    assert_eq!(slices[0].label, "A");
    assert_eq!(slices[0].count, 2);
    assert_eq!(slices[6].label, "Other");
    assert_eq!(slices[6].count, 2);

    let by_date = charts::amount_by_date(&rows);
    assert!(by_date.windows(2).all(|w| w[0].date <= w[1].date));
}
