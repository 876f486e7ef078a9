//! Fetch/yield execution shapes against an in-memory connection.

use std::future::Future;
use std::sync::Mutex;

use futures_util::StreamExt;
use quarry::{
    delete, insert, select, update, values, Connection, Fetched, FromRow, Query, QueryError,
    QueryResult, Row, RowStream, StreamingConnection, Value, Yielded,
};

/// Records every statement it receives and replays canned rows.
struct MockConnection {
    rows: Vec<Row>,
    affected: u64,
    calls: Mutex<Vec<(String, Vec<(String, Value)>)>>,
}

impl MockConnection {
    fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            affected: 0,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn with_affected(affected: u64) -> Self {
        Self {
            rows: Vec::new(),
            affected,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, statement: &str, bind_values: &[(String, Value)]) {
        self.calls
            .lock()
            .unwrap()
            .push((statement.to_string(), bind_values.to_vec()));
    }

    fn calls(&self) -> Vec<(String, Vec<(String, Value)>)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Connection for MockConnection {
    fn execute(
        &self,
        statement: &str,
        bind_values: &[(String, Value)],
    ) -> impl Future<Output = QueryResult<u64>> + Send {
        self.record(statement, bind_values);
        async move { Ok(self.affected) }
    }

    fn query(
        &self,
        statement: &str,
        bind_values: &[(String, Value)],
    ) -> impl Future<Output = QueryResult<Vec<Row>>> + Send {
        self.record(statement, bind_values);
        async move { Ok(self.rows.clone()) }
    }

    fn last_insert_id(
        &self,
        sequence: Option<&str>,
    ) -> impl Future<Output = QueryResult<String>> + Send {
        let id = match sequence {
            Some(name) => format!("{name}:77"),
            None => "77".to_string(),
        };
        async move { Ok(id) }
    }
}

impl StreamingConnection for MockConnection {
    fn stream(
        &self,
        statement: &str,
        bind_values: &[(String, Value)],
    ) -> impl Future<Output = QueryResult<RowStream>> + Send {
        self.record(statement, bind_values);
        let rows = self.rows.clone();
        async move { Ok(RowStream::new(futures_util::stream::iter(rows.into_iter().map(Ok)))) }
    }
}

fn people() -> Vec<Row> {
    vec![
        Row::from_pairs([("id", Value::Int(1)), ("name", Value::from("ann")), ("dept", Value::from("eng"))]),
        Row::from_pairs([("id", Value::Int(2)), ("name", Value::from("bea")), ("dept", Value::from("eng"))]),
        Row::from_pairs([("id", Value::Int(3)), ("name", Value::from("cal")), ("dept", Value::from("ops"))]),
    ]
}

#[derive(Debug, PartialEq)]
struct Person {
    id: i64,
    name: String,
}

impl FromRow for Person {
    fn from_row(row: &Row) -> QueryResult<Self> {
        Ok(Person {
            id: row.try_get("id")?.as_i64().unwrap_or_default(),
            name: row.try_get("name")?.to_string(),
        })
    }
}

#[tokio::test]
async fn perform_forwards_statement_and_binds() {
    let conn = MockConnection::with_affected(3);
    let del = delete().from("t").where_("a = ?", values![1]);
    assert_eq!(del.perform(&conn).await.unwrap(), 3);
    let calls = conn.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "DELETE FROM t WHERE a = :p1");
    assert_eq!(calls[0].1, vec![("p1".to_string(), Value::Int(1))]);
}

#[tokio::test]
async fn eager_fetch_shapes() {
    let conn = MockConnection::new(people());
    let sel = select().from("people");

    let rows = sel.fetch_all(&conn).await.unwrap();
    assert_eq!(rows.len(), 3);

    let first = sel.fetch_one(&conn).await.unwrap().unwrap();
    assert_eq!(first.get_named("name"), Some(&Value::Text("ann".to_string())));

    let ids = sel.fetch_column(&conn, 0).await.unwrap();
    assert_eq!(ids, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);

    let scalar = sel.fetch_value(&conn, 1).await.unwrap();
    assert_eq!(scalar, Some(Value::Text("ann".to_string())));

    let pairs = sel.fetch_key_pair(&conn).await.unwrap();
    assert_eq!(
        pairs,
        vec![
            ("1".to_string(), Value::Text("ann".to_string())),
            ("2".to_string(), Value::Text("bea".to_string())),
            ("3".to_string(), Value::Text("cal".to_string())),
        ]
    );
}

#[tokio::test]
async fn fetch_one_on_empty_result() {
    let conn = MockConnection::new(Vec::new());
    let sel = select().from("people");
    assert!(sel.fetch_one(&conn).await.unwrap().is_none());
    assert!(sel.fetch_value(&conn, 0).await.unwrap().is_none());
}

#[tokio::test]
async fn fetch_unique_splits_the_key_column() {
    let conn = MockConnection::new(people());
    let keyed = select().from("people").fetch_unique(&conn).await.unwrap();
    assert_eq!(keyed.len(), 3);
    let (key, row) = &keyed[0];
    assert_eq!(key, "1");
    assert_eq!(row.columns(), &["name".to_string(), "dept".to_string()]);
}

#[tokio::test]
async fn fetch_group_buckets_by_first_column_keeping_rows() {
    let rows = vec![
        Row::from_pairs([("dept", Value::from("eng")), ("name", Value::from("ann"))]),
        Row::from_pairs([("dept", Value::from("ops")), ("name", Value::from("cal"))]),
        Row::from_pairs([("dept", Value::from("eng")), ("name", Value::from("bea"))]),
    ];
    let conn = MockConnection::new(rows);
    let groups = select().from("people").fetch_group(&conn).await.unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].0, "eng");
    assert_eq!(groups[0].1.len(), 2);
    // grouped rows keep all their columns, key included
    assert_eq!(groups[0].1[0].columns(), &["dept".to_string(), "name".to_string()]);
    assert_eq!(groups[1].0, "ops");
}

#[tokio::test]
async fn fetch_objects_map_through_from_row() {
    let conn = MockConnection::new(people());
    let sel = select().from("people");

    let one: Option<Person> = sel.fetch_object(&conn).await.unwrap();
    assert_eq!(one, Some(Person { id: 1, name: "ann".to_string() }));

    let all: Vec<Person> = sel.fetch_objects(&conn).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[2].name, "cal");
}

#[tokio::test]
async fn lazy_yield_shapes() {
    let conn = MockConnection::new(people());
    let sel = select().from("people");

    let rows: Vec<_> = sel.yield_all(&conn).await.unwrap().collect().await;
    assert_eq!(rows.len(), 3);

    let names: Vec<_> = sel
        .yield_column(&conn, 1)
        .await
        .unwrap()
        .map(Result::unwrap)
        .collect()
        .await;
    assert_eq!(
        names,
        vec![
            Value::Text("ann".to_string()),
            Value::Text("bea".to_string()),
            Value::Text("cal".to_string()),
        ]
    );

    let pairs: Vec<_> = sel
        .yield_key_pair(&conn)
        .await
        .unwrap()
        .map(Result::unwrap)
        .collect()
        .await;
    assert_eq!(pairs[0], ("1".to_string(), Value::Text("ann".to_string())));

    let keyed: Vec<_> = sel
        .yield_unique(&conn)
        .await
        .unwrap()
        .map(Result::unwrap)
        .collect()
        .await;
    assert_eq!(keyed[2].0, "3");
    assert_eq!(keyed[2].1.columns(), &["name".to_string(), "dept".to_string()]);

    let objects: Vec<Person> = sel
        .yield_objects::<Person>(&conn)
        .await
        .unwrap()
        .map(Result::unwrap)
        .collect()
        .await;
    assert_eq!(objects[1], Person { id: 2, name: "bea".to_string() });
}

#[tokio::test]
async fn named_dispatch_reaches_every_shape() {
    let conn = MockConnection::new(people());
    let sel = select().from("people");

    match sel.fetch_named("fetch_all", &conn).await.unwrap() {
        Fetched::Rows(rows) => assert_eq!(rows.len(), 3),
        other => panic!("wrong shape: {other:?}"),
    }
    match sel.fetch_named("fetch_one", &conn).await.unwrap() {
        Fetched::Row(Some(row)) => assert_eq!(row.get(0), Some(&Value::Int(1))),
        other => panic!("wrong shape: {other:?}"),
    }
    match sel.fetch_named("fetch_value", &conn).await.unwrap() {
        Fetched::Value(Some(Value::Int(1))) => {}
        other => panic!("wrong shape: {other:?}"),
    }
    match sel.fetch_named("fetch_column", &conn).await.unwrap() {
        Fetched::Column(col) => assert_eq!(col.len(), 3),
        other => panic!("wrong shape: {other:?}"),
    }
    match sel.fetch_named("fetch_key_pair", &conn).await.unwrap() {
        Fetched::KeyPairs(pairs) => assert_eq!(pairs.len(), 3),
        other => panic!("wrong shape: {other:?}"),
    }
    match sel.fetch_named("fetch_unique", &conn).await.unwrap() {
        Fetched::Keyed(keyed) => assert_eq!(keyed.len(), 3),
        other => panic!("wrong shape: {other:?}"),
    }
    // the first column (id) is unique, so every row lands in its own group
    match sel.fetch_named("fetch_group", &conn).await.unwrap() {
        Fetched::Groups(groups) => assert_eq!(groups.len(), 3),
        other => panic!("wrong shape: {other:?}"),
    }
    // dynamic object fetches fall back to the row shapes
    match sel.fetch_named("fetch_objects", &conn).await.unwrap() {
        Fetched::Rows(rows) => assert_eq!(rows.len(), 3),
        other => panic!("wrong shape: {other:?}"),
    }

    match sel.yield_named("yield_column", &conn).await.unwrap() {
        Yielded::Column(stream) => {
            let col: Vec<_> = stream.map(Result::unwrap).collect().await;
            assert_eq!(col[0], Value::Int(1));
        }
        _ => panic!("wrong shape"),
    }
}

#[tokio::test]
async fn unknown_operation_names_are_rejected() {
    let conn = MockConnection::new(Vec::new());
    let sel = select().from("t");

    let err = sel.fetch_named("explode", &conn).await.unwrap_err();
    assert!(matches!(err, QueryError::UnsupportedOperation(name) if name == "explode"));

    let err = sel.yield_named("explode", &conn).await.unwrap_err();
    assert!(err.is_unsupported());
}

#[tokio::test]
async fn fetch_unlimited_count_strips_projection_and_window() {
    let count_row = vec![Row::from_pairs([("count", Value::Int(42))])];
    let conn = MockConnection::new(count_row);
    let sel = select()
        .column("id")
        .column("name")
        .from("people")
        .where_("dept = ?", values!["eng"])
        .limit(2)
        .offset(4);

    let n = sel.fetch_unlimited_count(&conn, "id").await.unwrap();
    assert_eq!(n, 42);

    let calls = conn.calls();
    assert_eq!(
        calls[0].0,
        "SELECT COUNT(id) FROM people WHERE dept = :p1"
    );
    // the original query is untouched
    assert_eq!(
        sel.get_statement(),
        "SELECT id, name FROM people WHERE dept = :p1 LIMIT 2 OFFSET 4"
    );
}

#[tokio::test]
async fn last_insert_id_delegates_to_the_connection() {
    let conn = MockConnection::with_affected(1);
    let ins = insert().into("users").column("name", "Ann");
    ins.perform(&conn).await.unwrap();

    assert_eq!(ins.last_insert_id(&conn, None).await.unwrap(), "77");
    assert_eq!(
        ins.last_insert_id(&conn, Some("users_id_seq")).await.unwrap(),
        "users_id_seq:77"
    );
}

#[tokio::test]
async fn update_perform_reports_affected_rows() {
    let conn = MockConnection::with_affected(2);
    let upd = update().table("t").column("a", 1).where_("b = ?", values![2]);
    assert_eq!(upd.fetch_affected(&conn).await.unwrap(), 2);
    assert_eq!(conn.calls()[0].0, "UPDATE t SET a = :p1 WHERE b = :p2");
}
