// Query Pipeline Integration Tests
//
// 종단 간 통합 테스트: 릴레이션 파일 → 연산자 트리 → 결과 검증

use qex_core::{ExecutorConfig, logging};
use qex_core::error::{QexError, QexResult};
use qex_core::sql::executor::dump;
use qex_core::sql::{
    CartesianOperator, DistinctOperator, Expr, ExternalSortOperator, FilterOperator,
    GroupByOperator, HavingOperator, PhysicalOperator, ProjectionOperator, RowEvaluator,
    SelectItem, SortKey, SortOperator, TableScanOperator, collect_all,
};
use qex_core::storage::RelationWriter;
use qex_core::types::{Schema, Tuple, TypeTag, Value};
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

// ─── Helpers ────────────────────────────────────────────

fn write_relation(dir: &Path, name: &str, schema: &Schema, rows: Vec<Vec<Value>>) {
    logging::init_test();
    let mut writer = RelationWriter::create(dir.join(name), schema).unwrap();
    for row in rows {
        writer.append_values(row).unwrap();
    }
    writer.finish().unwrap();
}

fn setup_sailors_boats(dir: &Path) {
    let sailors = Schema::from_pairs(&[
        ("Sailors.A", TypeTag::Integer),
        ("Sailors.B", TypeTag::Text),
    ])
    .unwrap();
    write_relation(
        dir,
        "Sailors",
        &sailors,
        vec![
            vec![Value::Integer(1), Value::from("Anna")],
            vec![Value::Integer(2), Value::from("Bo")],
            vec![Value::Integer(3), Value::from("Cy")],
        ],
    );
    let boats = Schema::from_pairs(&[("Boats.D", TypeTag::Integer)]).unwrap();
    write_relation(
        dir,
        "Boats",
        &boats,
        vec![vec![Value::Integer(101)], vec![Value::Integer(102)]],
    );
}

fn scan(config: &ExecutorConfig, name: &str) -> Box<dyn PhysicalOperator> {
    Box::new(TableScanOperator::from_config(config, name).unwrap())
}

fn value<'a>(op: &dyn PhysicalOperator, row: &'a Tuple, name: &str) -> &'a Value {
    let pos = op.schema().position(name).unwrap();
    row.value(pos).unwrap()
}

// ─── Scenarios ──────────────────────────────────────────

#[test]
fn group_by_scenario() -> QexResult<()> {
    let dir = tempdir()?;
    let config = ExecutorConfig::new(dir.path()).with_buffer_pages(10);
    let schema = Schema::from_pairs(&[("T.a", TypeTag::Integer), ("T.b", TypeTag::Float)])?;
    write_relation(
        dir.path(),
        "T",
        &schema,
        vec![
            vec![Value::Integer(1), Value::Float(1.0)],
            vec![Value::Integer(1), Value::Float(2.0)],
            vec![Value::Integer(2), Value::Float(3.0)],
        ],
    );

    let sorted = SortOperator::new(
        scan(&config, "T"),
        vec![SortKey::asc(Expr::col("T.a"))],
        Arc::new(RowEvaluator),
    );
    let mut group = GroupByOperator::new(
        Box::new(sorted),
        vec!["T.a".to_string()],
        Arc::new(RowEvaluator),
        &config,
    )?;
    let rows = collect_all(&mut group)?;
    assert_eq!(rows.len(), 2);

    let g1 = &rows[0];
    assert_eq!(value(&group, g1, "T.a"), &Value::Integer(1));
    assert_eq!(value(&group, g1, "COUNT(*)"), &Value::Integer(2));
    assert_eq!(value(&group, g1, "SUM(T.b)"), &Value::Float(3.0));
    assert_eq!(value(&group, g1, "AVG(T.b)"), &Value::Float(1.5));
    assert_eq!(value(&group, g1, "MAX(T.b)"), &Value::Float(2.0));
    assert_eq!(value(&group, g1, "MIN(T.b)"), &Value::Float(1.0));

    let g2 = &rows[1];
    assert_eq!(value(&group, g2, "T.a"), &Value::Integer(2));
    assert_eq!(value(&group, g2, "COUNT(*)"), &Value::Integer(1));
    assert_eq!(value(&group, g2, "SUM(T.b)"), &Value::Float(3.0));
    assert_eq!(value(&group, g2, "AVG(T.b)"), &Value::Float(3.0));
    Ok(())
}

#[test]
fn cartesian_scenario() -> QexResult<()> {
    let dir = tempdir()?;
    let config = ExecutorConfig::new(dir.path());
    setup_sailors_boats(dir.path());

    let mut product = CartesianOperator::new(vec![
        ("S".to_string(), scan(&config, "Sailors")),
        ("B".to_string(), scan(&config, "Boats")),
    ])?;
    assert_eq!(product.table_count(), 2);
    let rows = collect_all(&mut product)?;
    assert_eq!(rows.len(), 6);
    for row in &rows {
        assert_eq!(row.source_ids().len(), 2);
        assert_eq!(row.len(), 3);
    }
    // operands wrap: the boat cycles under each sailor
    assert_eq!(rows[0].source_ids(), &[1, 1]);
    assert_eq!(rows[1].source_ids(), &[1, 2]);
    assert_eq!(rows[2].source_ids(), &[2, 1]);
    Ok(())
}

#[test]
fn join_filter_project_pipeline() -> QexResult<()> {
    let dir = tempdir()?;
    let config = ExecutorConfig::new(dir.path());
    setup_sailors_boats(dir.path());

    // SELECT S.B, B.D FROM Sailors S, Boats B WHERE S.A >= 2 AND B.D = 102
    let product = CartesianOperator::new(vec![
        ("S".to_string(), scan(&config, "Sailors")),
        ("B".to_string(), scan(&config, "Boats")),
    ])?;
    let predicate = Expr::binary(
        Expr::col("S.A"),
        qex_core::sql::BinaryOperator::GtEq,
        Expr::lit(2i64),
    )
    .and(Expr::col("B.D").equals(Expr::lit(102i64)));
    let filter = FilterOperator::new(Box::new(product), Some(predicate), Arc::new(RowEvaluator));
    let mut project = ProjectionOperator::new(
        Box::new(filter),
        vec![
            SelectItem::new(Expr::col("S.B")),
            SelectItem::aliased(Expr::col("B.D"), "boat"),
        ],
        Arc::new(RowEvaluator),
    )?;

    let rows = collect_all(&mut project)?;
    let got: Vec<_> = rows.iter().map(|t| t.values().to_vec()).collect();
    assert_eq!(
        got,
        vec![
            vec![Value::from("Bo"), Value::Integer(102)],
            vec![Value::from("Cy"), Value::Integer(102)],
        ]
    );
    assert_eq!(rows[1].source_ids(), &[2]);
    Ok(())
}

#[test]
fn distinct_over_external_sort() -> QexResult<()> {
    let dir = tempdir()?;
    let config = ExecutorConfig::new(dir.path()).with_buffer_pages(2);
    let schema = Schema::from_pairs(&[("R.k", TypeTag::Integer), ("R.pad", TypeTag::Text)])?;
    let pad = "x".repeat(200);
    let rows = (0..3000)
        .map(|i| vec![Value::Integer(i % 50), Value::from(pad.as_str())])
        .collect();
    write_relation(dir.path(), "R", &schema, rows);

    let project = ProjectionOperator::new(
        scan(&config, "R"),
        vec![SelectItem::new(Expr::col("R.k"))],
        Arc::new(RowEvaluator),
    )?;
    let sorted = ExternalSortOperator::new(
        Box::new(project),
        vec![SortKey::asc(Expr::col("R.k"))],
        Arc::new(RowEvaluator),
        &config,
    );
    let mut distinct = DistinctOperator::new(Box::new(sorted));
    let keys: Vec<_> = collect_all(&mut distinct)?
        .into_iter()
        .map(|t| t.values()[0].clone())
        .collect();
    assert_eq!(keys, (0..50).map(Value::Integer).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn having_filters_groups() -> QexResult<()> {
    let dir = tempdir()?;
    let config = ExecutorConfig::new(dir.path());
    let schema = Schema::from_pairs(&[("E.dept", TypeTag::Text), ("E.salary", TypeTag::Integer)])?;
    write_relation(
        dir.path(),
        "E",
        &schema,
        vec![
            vec![Value::from("ops"), Value::Integer(10)],
            vec![Value::from("dev"), Value::Integer(30)],
            vec![Value::from("ops"), Value::Integer(20)],
            vec![Value::from("dev"), Value::Integer(50)],
            vec![Value::from("hr"), Value::Integer(5)],
        ],
    );

    let group = GroupByOperator::new(
        scan(&config, "E"),
        vec!["E.dept".to_string()],
        Arc::new(RowEvaluator),
        &config,
    )?;
    let having = Expr::col("SUM(E.salary)").gt(Expr::lit(25i64));
    let mut op = HavingOperator::new(Box::new(group), Some(having), Arc::new(RowEvaluator));
    let rows = collect_all(&mut op)?;
    let depts: Vec<_> = rows.iter().map(|t| t.values()[0].clone()).collect();
    assert_eq!(depts, vec![Value::from("dev"), Value::from("ops")]);
    assert_eq!(value(&op, &rows[0], "SUM(E.salary)"), &Value::Integer(80));
    assert_eq!(value(&op, &rows[1], "AVG(E.salary)"), &Value::Float(15.0));
    Ok(())
}

#[test]
fn dump_query_result() -> QexResult<()> {
    let dir = tempdir()?;
    let config = ExecutorConfig::new(dir.path());
    setup_sailors_boats(dir.path());

    let mut op = SortOperator::new(
        scan(&config, "Sailors"),
        vec![SortKey::desc(Expr::col("Sailors.A"))],
        Arc::new(RowEvaluator),
    );
    let path = dump::dump_to_file(&mut op, &config, 1)?;
    let text = std::fs::read_to_string(path)?;
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines[0], "id | Sailors.A | Sailors.B");
    assert!(lines[2].starts_with("3  | 3"));
    assert!(lines[4].ends_with("Anna"));
    Ok(())
}

#[test]
fn run_files_do_not_outlive_the_plan() -> QexResult<()> {
    let data = tempdir()?;
    let temp = tempdir()?;
    let config = ExecutorConfig::new(data.path())
        .with_temp_dir(temp.path())
        .with_buffer_pages(2);
    let schema = Schema::from_pairs(&[("R.k", TypeTag::Integer), ("R.pad", TypeTag::Text)])?;
    let pad = "y".repeat(250);
    let rows = (0..2000)
        .map(|i| vec![Value::Integer((i * 31) % 2000), Value::from(pad.as_str())])
        .collect();
    write_relation(data.path(), "R", &schema, rows);

    let mut sorted = ExternalSortOperator::new(
        scan(&config, "R"),
        vec![SortKey::asc(Expr::col("R.k"))],
        Arc::new(RowEvaluator),
        &config,
    );
    // abort after a few tuples
    for _ in 0..3 {
        sorted.next()?;
    }
    assert_eq!(std::fs::read_dir(temp.path())?.count(), 1);
    drop(sorted);
    assert_eq!(std::fs::read_dir(temp.path())?.count(), 0);
    Ok(())
}

#[test]
fn corrupt_relation_is_reported() {
    let dir = tempdir().unwrap();
    let config = ExecutorConfig::new(dir.path());
    setup_sailors_boats(dir.path());
    let path = config.relation_path("Boats");
    let mut bytes = std::fs::read(&path).unwrap();
    // first record's status byte lives right after the data page's tuple count
    bytes[16_384 + 4] = 9;
    std::fs::write(&path, bytes).unwrap();

    let mut op = TableScanOperator::open(&path).unwrap();
    assert!(matches!(op.next(), Err(QexError::CorruptPage(_))));
}
