mod common;

use common::*;
use csvlang::Value;

const PEOPLE: &str = "name,age\nAlice,30\nBob,25\n";

#[test]
fn test_load_builds_a_table() {
    let dir = scratch_dir("load");
    let data = write_file(&dir, "data.csv", PEOPLE);

    let value = run(&format!(r#"load "{}""#, data.display()));
    let Value::Csv(table) = &value else {
        panic!("expected CSV, got {:?}", value);
    };
    assert_eq!(table.headers, vec!["name", "age"]);
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0]["name"], "Alice");
    assert_eq!(table.rows[1]["age"], "25");
    // kinds come from the first data row
    assert_eq!(table.column_types[0].kind.to_string(), "STRING");
    assert_eq!(table.column_types[1].kind.to_string(), "INTEGER");
}

#[test]
fn test_read_single_row() {
    let dir = scratch_dir("read_row");
    let data = write_file(&dir, "data.csv", PEOPLE);

    let value = run(&format!(r#"load "{}"; read row 1"#, data.display()));
    let Value::Csv(table) = &value else {
        panic!("expected CSV, got {:?}", value);
    };
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0]["name"], "Bob");
    assert_eq!(table.rows[0]["age"], "25");
}

#[test]
fn test_read_out_of_range_row_is_empty() {
    let dir = scratch_dir("read_oob");
    let data = write_file(&dir, "data.csv", PEOPLE);

    let value = run(&format!(
        r#"load "{}"; let r = read row 9; count(r)"#,
        data.display()
    ));
    assert_integer(&value, 0);
}

#[test]
fn test_filtered_read_saved_as_json() {
    let dir = scratch_dir("save_json");
    let data = write_file(&dir, "data.csv", PEOPLE);
    let out = dir.join("output.json");

    run(&format!(
        r#"load "{}"; let v = read row * where age > 27; save v as "{}""#,
        data.display(),
        out.display()
    ));

    let written = std::fs::read_to_string(&out).expect("output.json should exist");
    let document: serde_json::Value = serde_json::from_str(&written).unwrap();
    let expected: serde_json::Value = serde_json::from_str(
        r#"{"headers":["name","age"],"rows":[{"name":"Alice","age":"30"}]}"#,
    )
    .unwrap();
    assert_eq!(document, expected);
}

#[test]
fn test_projection_with_string_filter() {
    let dir = scratch_dir("projection");
    let data = write_file(&dir, "data.csv", PEOPLE);

    let value = run(&format!(
        r#"load "{}"; let c = read row * col name where name == "Alice"; c"#,
        data.display()
    ));
    let Value::Array(elements) = &value else {
        panic!("expected ARRAY, got {:?}", value);
    };
    let elements = elements.borrow();
    assert_eq!(elements.len(), 1);
    assert_string(&elements[0], "Alice");
}

#[test]
fn test_projection_coerces_integer_cells() {
    let dir = scratch_dir("projection_int");
    let data = write_file(&dir, "data.csv", PEOPLE);

    let value = run(&format!(
        r#"load "{}"; let ages = read row * col age; sum(ages)"#,
        data.display()
    ));
    assert_integer(&value, 55);
    let value = run(&format!(
        r#"load "{}"; let ages = read row * col age; avg(ages)"#,
        data.display()
    ));
    assert_integer(&value, 27);
}

#[test]
fn test_filter_comparisons() {
    let dir = scratch_dir("filters");
    let data = write_file(&dir, "data.csv", PEOPLE);

    let cases = [
        ("read row * where age > 27", 1),
        ("read row * where age < 30", 1),
        ("read row * where age == 25", 1),
        ("read row * where age != 25", 1),
        ("read row * where age > 99", 0),
        (r#"read row * where name == "Bob""#, 1),
        (r#"read row * where name != "Bob""#, 1),
    ];
    for (clause, expected_rows) in cases {
        let value = run(&format!(
            r#"load "{}"; let r = {}; count(r)"#,
            data.display(),
            clause
        ));
        assert_integer(&value, expected_rows);
    }
}

#[test]
fn test_filtered_row_contents() {
    let dir = scratch_dir("filter_rows");
    let data = write_file(&dir, "data.csv", PEOPLE);

    let value = run(&format!(
        r#"load "{}"; read row * where age == 25"#,
        data.display()
    ));
    let Value::Csv(table) = &value else {
        panic!("expected CSV, got {:?}", value);
    };
    assert_eq!(table.headers, vec!["name", "age"]);
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0]["name"], "Bob");
}

#[test]
fn test_unparseable_cells_fail_integer_filters() {
    let dir = scratch_dir("filter_unparseable");
    let data = write_file(&dir, "data.csv", "name,age\nAlice,thirty\nBob,25\n");

    let value = run(&format!(
        r#"load "{}"; let r = read row * where age > 0; count(r)"#,
        data.display()
    ));
    assert_integer(&value, 1);
}

#[test]
fn test_save_csv_with_named_source() {
    let dir = scratch_dir("save_csv_source");
    let data = write_file(&dir, "data.csv", PEOPLE);
    let out = dir.join("output.csv");

    run(&format!(
        r#"load "{}"; let val = read row 0; save val as "{}""#,
        data.display(),
        out.display()
    ));
    assert_eq!(
        std::fs::read_to_string(&out).unwrap(),
        "name,age\nAlice,30\n"
    );
}

#[test]
fn test_unique_deduplicates_rows() {
    let dir = scratch_dir("unique");
    let data = write_file(&dir, "data.csv", "name,age\nAlice,30\nAlice,30\nBob,25\n");

    let value = run(&format!(
        r#"load "{}"; let rows = read row *; let u = unique(rows); count(u)"#,
        data.display()
    ));
    assert_integer(&value, 2);
}

#[test]
fn test_unique_on_2d_array_without_active_table() {
    let value = run("count(unique([[1, 2], [1, 2], [3, 4]]))");
    assert_integer(&value, 2);
}

#[test]
fn test_fill_empty_pipeline() {
    let dir = scratch_dir("fill_empty");
    let data = write_file(&dir, "data.csv", "name,age\nAlice,\n,25\n");
    let out = dir.join("out.json");

    run(&format!(
        r#"load "{}"; let r = read row *; let r2 = fill_empty(r, "name", "john"); let r3 = fill_empty(r2, "age", 18); save r3 as "{}""#,
        data.display(),
        out.display()
    ));

    let written = std::fs::read_to_string(&out).expect("out.json should exist");
    let document: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(
        document["rows"],
        serde_json::from_str::<serde_json::Value>(
            r#"[{"name":"Alice","age":"18"},{"name":"john","age":"25"}]"#
        )
        .unwrap()
    );
}

#[test]
fn test_save_csv_round_trips_through_load() {
    let dir = scratch_dir("roundtrip");
    let data = write_file(&dir, "data.csv", PEOPLE);
    let copy = dir.join("copy.csv");

    run(&format!(
        r#"load "{}"; save as "{}""#,
        data.display(),
        copy.display()
    ));
    assert_eq!(std::fs::read_to_string(&copy).unwrap(), PEOPLE);

    let value = run(&format!(
        r#"load "{}"; let r = read row *; count(r)"#,
        copy.display()
    ));
    assert_integer(&value, 2);
}

#[test]
fn test_push_row_onto_table() {
    let dir = scratch_dir("push_row");
    let data = write_file(&dir, "data.csv", PEOPLE);

    let value = run(&format!(
        r#"load "{}"; let t = read row *; let t2 = push(t, ["Carol", 28]); count(t2)"#,
        data.display()
    ));
    assert_integer(&value, 3);
}

#[test]
fn test_push_incompatible_row_is_refused() {
    let dir = scratch_dir("push_bad");
    let data = write_file(&dir, "data.csv", PEOPLE);

    let message = run_err(&format!(
        r#"load "{}"; let t = read row *; push(t, ["Carol"])"#,
        data.display()
    ));
    assert_eq!(message, "column count mismatch: expected 2, got 1");
}

#[test]
fn test_pop_drops_last_row() {
    let dir = scratch_dir("pop_row");
    let data = write_file(&dir, "data.csv", PEOPLE);

    let value = run(&format!(
        r#"load "{}"; let t = read row *; count(pop(t))"#,
        data.display()
    ));
    assert_integer(&value, 1);
}

#[test]
fn test_read_does_not_replace_active_table() {
    let dir = scratch_dir("read_no_clobber");
    let data = write_file(&dir, "data.csv", PEOPLE);

    // a filtered read narrows its own result, not the `csv` binding
    let value = run(&format!(
        r#"load "{}"; read row * where age > 27; let r = read row *; count(r)"#,
        data.display()
    ));
    assert_integer(&value, 2);
}

#[test]
fn test_filename_binding_tracks_loaded_path() {
    let dir = scratch_dir("filename");
    let data = write_file(&dir, "data.csv", PEOPLE);

    let value = run(&format!(r#"load "{}"; filename"#, data.display()));
    assert_string(&value, &data.display().to_string());
}

#[test]
fn test_loop_over_projected_column() {
    let dir = scratch_dir("loop_column");
    let data = write_file(&dir, "data.csv", PEOPLE);

    let value = run(&format!(
        r#"load "{}"; let ages = read row * col age; let total = 0; for i, a in ages {{ total = total + a }}; total"#,
        data.display()
    ));
    assert_integer(&value, 55);
}
