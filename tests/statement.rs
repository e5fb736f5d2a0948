//! Statement execution and row fetching against a loopback mock node

mod common;

use common::{
    MockNode, close_response, columns_meta_response, command, execute_response, failure,
    fetch_response, fetch_response_raw, request_query_id, result_set, tables_meta_response,
};
use ignite_odbc::constant::{CommandByte, WireType};
use ignite_odbc::meta::{ColumnMeta, TableMeta};
use ignite_odbc::protocol::binary::{BinaryReader, WireValue, write_i32};
use ignite_odbc::{ApplicationDataBuffer, BindingType, Connection, SqlResult, SqlType};
use pretty_assertions::assert_eq;

fn connect(node: &MockNode) -> Connection {
    let mut conn = Connection::new();
    assert_eq!(conn.establish("127.0.0.1", node.port(), "Person"), SqlResult::Success);
    conn
}

fn person_columns() -> Vec<ColumnMeta> {
    vec![
        ColumnMeta::new("PUBLIC", "PERSON", "ID", "java.lang.Integer", WireType::Int as u8),
        ColumnMeta::new("PUBLIC", "PERSON", "NAME", "java.lang.String", WireType::String as u8),
    ]
}

fn person(id: i32, name: &str) -> Vec<WireValue> {
    vec![WireValue::Int(id), WireValue::String(name.to_string())]
}

fn commands(requests: &[Vec<u8>]) -> Vec<CommandByte> {
    requests.iter().filter_map(|r| command(r)).collect()
}

// ============================================================================
// Data queries
// ============================================================================

#[test]
fn fetch_rows_across_pages() {
    let node = MockNode::spawn(result_set(
        7,
        person_columns(),
        vec![vec![person(1, "one"), person(2, "two")], vec![person(3, "three")]],
    ));
    let mut conn = connect(&node);

    let mut id = [0u8; 4];
    let mut id_len = 0i64;
    let mut name = [0u8; 16];
    let mut name_len = 0i64;
    {
        let mut stmt = conn.create_statement();
        assert_eq!(
            stmt.bind_column(1, ApplicationDataBuffer::new(BindingType::SignedLong, Some(&mut id[..]), Some(&mut id_len))),
            SqlResult::Success
        );
        assert_eq!(
            stmt.bind_column(2, ApplicationDataBuffer::new(BindingType::Char, Some(&mut name[..]), Some(&mut name_len))),
            SqlResult::Success
        );

        assert_eq!(stmt.execute_sql_query("SELECT id, name FROM Person"), SqlResult::Success);
        assert_eq!(stmt.get_meta().map(<[ColumnMeta]>::len), Some(2));

        let mut fetched = Vec::new();
        while stmt.fetch_row() == SqlResult::Success {
            let id = stmt.column_binding(1).expect("id binding").get_i32();
            let name = stmt.column_binding(2).expect("name binding").get_string(64);
            fetched.push((id, name));
        }
        assert_eq!(stmt.diagnostics().operation_result(), SqlResult::NoData);
        assert_eq!(stmt.diagnostics().status_records_number(), 0);
        assert_eq!(
            fetched,
            vec![(1, "one".to_string()), (2, "two".to_string()), (3, "three".to_string())]
        );

        // Stays past the end
        assert_eq!(stmt.fetch_row(), SqlResult::NoData);
    }
    assert_eq!(name_len, 5);
    assert_eq!(conn.release(), SqlResult::Success);

    assert_eq!(
        commands(&node.join()),
        vec![
            CommandByte::ExecuteSqlQuery,
            CommandByte::FetchSqlQuery,
            CommandByte::FetchSqlQuery,
            CommandByte::CloseSqlQuery,
        ]
    );
}

#[test]
fn truncated_column_reports_warning() {
    let node = MockNode::spawn(result_set(1, person_columns(), vec![vec![person(1, "three")]]));
    let mut conn = connect(&node);

    let mut name = [0u8; 4];
    let mut name_len = 0i64;
    {
        let mut stmt = conn.create_statement();
        stmt.bind_column(2, ApplicationDataBuffer::new(BindingType::Char, Some(&mut name[..]), Some(&mut name_len)));
        assert_eq!(stmt.execute_sql_query("SELECT id, name FROM Person"), SqlResult::Success);

        assert_eq!(stmt.fetch_row(), SqlResult::SuccessWithInfo);
        let diag = stmt.diagnostics();
        assert_eq!(diag.status_records_number(), 1);
        let record = diag.status_record(2).expect("truncation record");
        assert_eq!(record.sql_state(), "01004");
        assert_eq!(record.row_number(), 1);
        assert_eq!(record.column_number(), 2);
        assert_eq!(stmt.column_binding(2).expect("binding").get_string(64), "thr");

        assert_eq!(stmt.fetch_row(), SqlResult::NoData);
        assert_eq!(stmt.diagnostics().status_records_number(), 0);
    }
    assert_eq!(name_len, 5);
    assert_eq!(name, *b"thr\0");
    drop(conn);
    node.join();
}

#[test]
fn parameters_are_sent_in_order() {
    let node = MockNode::spawn(result_set(3, Vec::new(), vec![Vec::new()]));
    let mut conn = connect(&node);

    let mut id = 42i32.to_ne_bytes();
    let mut name = *b"Ann\0";
    let mut name_len = ignite_odbc::constant::SQL_NTS;
    {
        let mut stmt = conn.create_statement();
        assert_eq!(
            stmt.bind_parameter(
                2,
                ApplicationDataBuffer::new(BindingType::Char, Some(&mut name[..]), Some(&mut name_len)),
                SqlType::Varchar,
            ),
            SqlResult::Success
        );

        // Parameter 1 is missing
        assert_eq!(stmt.execute_sql_query("SELECT * FROM Person WHERE id = ? AND name = ?"), SqlResult::Error);
        assert_eq!(stmt.diagnostics().status_record(2).expect("record").sql_state(), "HY000");

        assert_eq!(
            stmt.bind_parameter(
                1,
                ApplicationDataBuffer::new(BindingType::SignedLong, Some(&mut id[..]), None),
                SqlType::Integer,
            ),
            SqlResult::Success
        );
        assert_eq!(stmt.execute(), SqlResult::Success);
        assert_eq!(stmt.fetch_row(), SqlResult::NoData);
    }
    drop(conn);

    let requests = node.join();
    let execute = requests
        .iter()
        .find(|r| command(r) == Some(CommandByte::ExecuteSqlQuery))
        .expect("execute request");
    let mut reader = BinaryReader::new(execute);
    assert_eq!(reader.read_u8().expect("command"), CommandByte::ExecuteSqlQuery as u8);
    assert!(!reader.read_bool().expect("distributed joins"));
    assert_eq!(
        reader.read_string().expect("sql"),
        Some("SELECT * FROM Person WHERE id = ? AND name = ?")
    );
    assert_eq!(reader.read_i32().expect("page size"), 1024);
    assert_eq!(reader.read_i32().expect("argc"), 2);
    assert_eq!(reader.read_column_header().expect("tag"), WireType::Int as u8);
    assert_eq!(reader.read_i32().expect("arg 1"), 42);
    assert_eq!(reader.read_string().expect("arg 2"), Some("Ann"));
    assert!(reader.is_empty());
}

#[test]
fn server_error_text_is_surfaced() {
    let node = MockNode::spawn(|_| failure("Failed to parse query: SELEC"));
    let mut conn = connect(&node);
    {
        let mut stmt = conn.create_statement();
        assert_eq!(stmt.execute_sql_query("SELEC 1"), SqlResult::Error);
        let diag = stmt.diagnostics();
        assert_eq!(diag.status_records_number(), 1);
        let record = diag.status_record(2).expect("record");
        assert_eq!(record.sql_state(), "HY000");
        assert_eq!(record.message(), "Failed to parse query: SELEC");
    }
    // A failed response leaves the connection usable
    assert!(conn.is_connected());
    assert_eq!(conn.release(), SqlResult::Success);
    assert_eq!(node.join().len(), 1);
}

#[test]
fn fetch_without_query() {
    let node = MockNode::spawn(|_| failure("unused"));
    let mut conn = connect(&node);
    {
        let mut stmt = conn.create_statement();
        assert_eq!(stmt.fetch_row(), SqlResult::Error);
        assert_eq!(stmt.execute(), SqlResult::Error);
        assert!(stmt.get_meta().is_none());
    }
    drop(conn);
    assert!(node.join().is_empty());
}

fn product_columns() -> Vec<ColumnMeta> {
    vec![
        ColumnMeta::new("PUBLIC", "PRODUCT", "ID", "java.lang.Integer", WireType::Int as u8),
        ColumnMeta::new("PUBLIC", "PRODUCT", "PRICE", "java.math.BigDecimal", WireType::Decimal as u8),
    ]
}

/// Two rows whose second column is a DECIMAL, which rows cannot decode
fn product_node() -> MockNode {
    let mut page = Vec::new();
    for id in 1..=2 {
        write_i32(&mut page, 2);
        WireValue::Int(id).write(&mut page).expect("encode id");
        page.push(WireType::Decimal as u8);
        page.extend_from_slice(&[0, 0, 0, 0, 1, 0, 0, 0, 5]);
    }
    MockNode::spawn(move |request| match command(request) {
        Some(CommandByte::ExecuteSqlQuery) => execute_response(9, &product_columns()),
        Some(CommandByte::FetchSqlQuery) => fetch_response_raw(9, true, 2, &page),
        Some(CommandByte::CloseSqlQuery) => close_response(9),
        _ => failure("Unexpected request"),
    })
}

fn assert_column_retrieval_error(diag: &ignite_odbc::HeaderDiagnosticRecord) {
    assert_eq!(diag.operation_result(), SqlResult::Error);
    assert_eq!(diag.status_records_number(), 1);
    let record = diag.status_record(2).expect("retrieval record");
    assert_eq!(record.sql_state(), "HY000");
    assert_eq!(record.message(), "Can not retrieve row column.");
    assert_eq!(record.row_number(), 1);
    assert_eq!(record.column_number(), 2);
}

#[test]
fn unsupported_bound_column_fails_fetch() {
    let node = product_node();
    let mut conn = connect(&node);

    let mut id = [0u8; 4];
    let mut price = [0u8; 32];
    let mut price_len = 0i64;
    {
        let mut stmt = conn.create_statement();
        stmt.bind_column(1, ApplicationDataBuffer::new(BindingType::SignedLong, Some(&mut id[..]), None));
        stmt.bind_column(2, ApplicationDataBuffer::new(BindingType::Char, Some(&mut price[..]), Some(&mut price_len)));
        assert_eq!(stmt.execute_sql_query("SELECT id, price FROM Product"), SqlResult::Success);

        assert_eq!(stmt.fetch_row(), SqlResult::Error);
        assert_column_retrieval_error(stmt.diagnostics());
        assert_eq!(stmt.diagnostics().status_record(2).expect("record").server_name(), format!("127.0.0.1:{}", node.port()));
        assert!(!stmt.data_available());

        // The cursor stays on the bad column instead of moving to row 2
        assert_eq!(stmt.fetch_row(), SqlResult::Error);
        assert_column_retrieval_error(stmt.diagnostics());
    }
    drop(conn);

    assert_eq!(
        commands(&node.join()),
        vec![CommandByte::ExecuteSqlQuery, CommandByte::FetchSqlQuery, CommandByte::CloseSqlQuery]
    );
}

#[test]
fn unsupported_unbound_column_fails_fetch() {
    let node = product_node();
    let mut conn = connect(&node);

    let mut id = [0u8; 4];
    {
        let mut stmt = conn.create_statement();
        stmt.bind_column(1, ApplicationDataBuffer::new(BindingType::SignedLong, Some(&mut id[..]), None));
        assert_eq!(stmt.execute_sql_query("SELECT id, price FROM Product"), SqlResult::Success);

        assert_eq!(stmt.fetch_row(), SqlResult::Error);
        assert_column_retrieval_error(stmt.diagnostics());
        assert_eq!(stmt.fetch_row(), SqlResult::Error);
        assert_column_retrieval_error(stmt.diagnostics());
    }
    drop(conn);
    node.join();
}

#[test]
fn reexecute_closes_open_cursor_first() {
    let mut next_id = 0i64;
    let node = MockNode::spawn(move |request| match command(request) {
        Some(CommandByte::ExecuteSqlQuery) => {
            next_id += 1;
            execute_response(next_id, &person_columns())
        }
        Some(CommandByte::FetchSqlQuery) => {
            let query_id = request_query_id(request);
            fetch_response(query_id, false, &[person(query_id as i32, "row")])
        }
        Some(CommandByte::CloseSqlQuery) => close_response(request_query_id(request)),
        _ => failure("Unexpected request"),
    });
    let mut conn = connect(&node);

    let mut id = [0u8; 4];
    {
        let mut stmt = conn.create_statement();
        stmt.bind_column(1, ApplicationDataBuffer::new(BindingType::SignedLong, Some(&mut id[..]), None));

        assert_eq!(stmt.execute_sql_query("SELECT id, name FROM Person"), SqlResult::Success);
        assert_eq!(stmt.fetch_row(), SqlResult::Success);
        assert_eq!(stmt.column_binding(1).expect("id").get_i32(), 1);
        assert!(stmt.data_available());

        // Same statement again while query 1 still has rows
        assert_eq!(stmt.execute(), SqlResult::Success);
        assert_eq!(stmt.fetch_row(), SqlResult::Success);
        assert_eq!(stmt.column_binding(1).expect("id").get_i32(), 2);

        // A new statement text replaces query 2
        assert_eq!(stmt.execute_sql_query("SELECT id, name FROM Person WHERE id > 2"), SqlResult::Success);
    }
    drop(conn);

    let requests = node.join();
    assert_eq!(
        commands(&requests),
        vec![
            CommandByte::ExecuteSqlQuery,
            CommandByte::FetchSqlQuery,
            CommandByte::CloseSqlQuery,
            CommandByte::ExecuteSqlQuery,
            CommandByte::FetchSqlQuery,
            CommandByte::CloseSqlQuery,
            CommandByte::ExecuteSqlQuery,
            CommandByte::CloseSqlQuery,
        ]
    );
    let ids: Vec<i64> = requests
        .iter()
        .filter(|r| command(r) != Some(CommandByte::ExecuteSqlQuery))
        .map(|r| request_query_id(r))
        .collect();
    assert_eq!(ids, vec![1, 1, 2, 2, 3]);
}

#[test]
fn fetch_for_another_query_is_rejected() {
    let node = MockNode::spawn(|request| match command(request) {
        Some(CommandByte::ExecuteSqlQuery) => execute_response(5, &person_columns()),
        Some(CommandByte::FetchSqlQuery) => fetch_response(6, true, &[person(1, "one")]),
        Some(CommandByte::CloseSqlQuery) => close_response(5),
        _ => failure("Unexpected request"),
    });
    let mut conn = connect(&node);
    {
        let mut stmt = conn.create_statement();
        assert_eq!(stmt.execute_sql_query("SELECT id, name FROM Person"), SqlResult::Success);

        assert_eq!(stmt.fetch_row(), SqlResult::Error);
        let diag = stmt.diagnostics();
        assert_eq!(diag.status_records_number(), 1);
        let record = diag.status_record(2).expect("record");
        assert_eq!(record.sql_state(), "HY000");
        assert_eq!(record.message(), "Invalid packet");
    }
    // A malformed page is not an I/O failure
    assert!(conn.is_connected());
    drop(conn);

    let requests = node.join();
    assert_eq!(
        commands(&requests),
        vec![CommandByte::ExecuteSqlQuery, CommandByte::FetchSqlQuery, CommandByte::CloseSqlQuery]
    );
    assert_eq!(request_query_id(&requests[2]), 5);
}

// ============================================================================
// Catalog queries
// ============================================================================

#[test]
fn columns_metadata_rows() {
    let node = MockNode::spawn(|request| match command(request) {
        Some(CommandByte::GetColumnsMeta) => columns_meta_response(&person_columns()),
        _ => failure("Unexpected request"),
    });
    let mut conn = connect(&node);

    let mut column_name = [0u8; 32];
    let mut column_name_len = 0i64;
    let mut data_type = [0u8; 2];
    let mut data_type_len = 0i64;
    {
        let mut stmt = conn.create_statement();
        stmt.bind_column(4, ApplicationDataBuffer::new(BindingType::Char, Some(&mut column_name[..]), Some(&mut column_name_len)));
        stmt.bind_column(5, ApplicationDataBuffer::new(BindingType::SignedShort, Some(&mut data_type[..]), Some(&mut data_type_len)));

        assert_eq!(stmt.execute_get_columns_meta_query("PUBLIC", "PERSON", "%"), SqlResult::Success);
        assert_eq!(stmt.get_meta().map(<[ColumnMeta]>::len), Some(12));
        assert!(stmt.data_available());

        assert_eq!(stmt.fetch_row(), SqlResult::Success);
        assert_eq!(stmt.column_binding(4).expect("name").get_string(32), "ID");
        assert_eq!(stmt.column_binding(5).expect("type").get_i16(), SqlType::Integer as i16);

        assert_eq!(stmt.fetch_row(), SqlResult::Success);
        assert_eq!(stmt.column_binding(4).expect("name").get_string(32), "NAME");
        assert_eq!(stmt.column_binding(5).expect("type").get_i16(), SqlType::Varchar as i16);

        assert_eq!(stmt.fetch_row(), SqlResult::NoData);
        assert!(!stmt.data_available());
    }
    drop(conn);

    let requests = node.join();
    assert_eq!(commands(&requests), vec![CommandByte::GetColumnsMeta]);
    let mut reader = BinaryReader::new(&requests[0][1..]);
    assert_eq!(reader.read_string().expect("schema"), Some("PUBLIC"));
    assert_eq!(reader.read_string().expect("table"), Some("PERSON"));
    assert_eq!(reader.read_string().expect("column"), Some("%"));
}

#[test]
fn tables_metadata_rows() {
    let node = MockNode::spawn(|request| match command(request) {
        Some(CommandByte::GetTablesMeta) => tables_meta_response(&[
            TableMeta::new("", "PUBLIC", "PERSON", "TABLE"),
            TableMeta::new("", "PUBLIC", "ORGANIZATION", "TABLE"),
        ]),
        _ => failure("Unexpected request"),
    });
    let mut conn = connect(&node);

    let mut table_name = [0u8; 32];
    let mut table_name_len = 0i64;
    {
        let mut stmt = conn.create_statement();
        stmt.bind_column(3, ApplicationDataBuffer::new(BindingType::Char, Some(&mut table_name[..]), Some(&mut table_name_len)));
        assert_eq!(stmt.execute_get_tables_meta_query("", "PUBLIC", "%", "TABLE"), SqlResult::Success);
        assert_eq!(stmt.get_meta().map(<[ColumnMeta]>::len), Some(5));

        let mut names = Vec::new();
        while stmt.fetch_row() == SqlResult::Success {
            names.push(stmt.column_binding(3).expect("binding").get_string(32));
        }
        assert_eq!(names, vec!["PERSON".to_string(), "ORGANIZATION".to_string()]);
    }
    drop(conn);
    assert_eq!(commands(&node.join()), vec![CommandByte::GetTablesMeta]);
}

#[test]
fn foreign_keys_are_always_empty() {
    let node = MockNode::spawn(|_| failure("unused"));
    let mut conn = connect(&node);
    {
        let mut stmt = conn.create_statement();
        assert_eq!(
            stmt.execute_get_foreign_keys_query("", "PUBLIC", "PERSON", "", "PUBLIC", "ORGANIZATION"),
            SqlResult::Success
        );
        assert_eq!(stmt.get_meta().map(<[ColumnMeta]>::len), Some(14));
        assert_eq!(stmt.fetch_row(), SqlResult::NoData);
    }
    drop(conn);
    assert!(node.join().is_empty());
}
