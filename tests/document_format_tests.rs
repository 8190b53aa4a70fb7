//! Tests pinning the text layout: headings, bullets, blocks and list elements.

use serde::{Deserialize, Serialize};
use serde_mdcodec::{
    decode_value, encode_value, from_str, record, to_string, Error, FieldDescriptor, Kind,
    Options, RecordMap, RecordSchema, Value,
};
use std::sync::OnceLock;

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Leaf {
    label: String,
    weight: f64,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Branch {
    name: String,
    leaf: Leaf,
    scores: Vec<i64>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Trunk {
    branch: Branch,
    notes: Vec<String>,
    done: bool,
}

record! {
    Leaf {
        #[title]
        label: String,
        #[rename = "Weight"]
        weight: f64,
    }
}

record! {
    Branch {
        #[rename = "Name"]
        name: String,
        #[rename = "Leaf"]
        leaf: Leaf,
        #[rename = "Scores"]
        scores: Vec<i64>,
    }
}

record! {
    Trunk {
        #[rename = "Branch"]
        branch: Branch,
        #[rename = "Notes"]
        notes: Vec<String>,
        #[rename = "Done"]
        done: bool,
    }
}

fn trunk() -> Trunk {
    Trunk {
        branch: Branch {
            name: "north".to_string(),
            leaf: Leaf {
                label: "oak".to_string(),
                weight: 1.25,
            },
            scores: vec![3, -1],
        },
        notes: vec![],
        done: true,
    }
}

const TRUNK: &str = "# Trunk\n\n- **Branch**:\n  - **Name**: north\n  - **Leaf**:\n    # oak (Leaf)\n    - **Weight**: 1.25\n  - **Scores**:\n    - 3\n    - -1\n- **Notes**:\n- **Done**: true\n";

#[test]
fn test_three_levels_of_nesting() {
    assert_eq!(to_string(&trunk()).unwrap(), TRUNK);
    assert_eq!(from_str::<Trunk>(TRUNK).unwrap(), trunk());
}

#[test]
fn test_heading_without_title() {
    let doc = to_string(&trunk()).unwrap();
    assert!(doc.starts_with("# Trunk\n\n"));
}

#[test]
fn test_tab_and_wide_indentation() {
    let doc = "# Trunk\n- **Branch**:\n\t- **Name**: north\n\t- **Leaf**:\n\t\t# oak (Leaf)\n\t\t- **Weight**: 1.25\n- **Done**: true\n";
    let trunk: Trunk = from_str(doc).unwrap();
    assert_eq!(trunk.branch.name, "north");
    assert_eq!(trunk.branch.leaf.label, "oak");
    assert!(trunk.done);

    let doc = "# Trunk\n- **Branch**:\n      - **Name**: wide\n      - **Leaf**:\n          - **Weight**: 2\n";
    let trunk: Trunk = from_str(doc).unwrap();
    assert_eq!(trunk.branch.name, "wide");
    assert_eq!(trunk.branch.leaf.weight, 2.0);
}

#[test]
fn test_crlf_line_endings() {
    let doc = TRUNK.replace('\n', "\r\n");
    assert_eq!(from_str::<Trunk>(&doc).unwrap(), trunk());
}

#[test]
fn test_incidental_text_is_ignored() {
    let doc = "Intro paragraph.\n# Trunk\n\n## Details\n\nSome prose here.\n- **Done**: true\n";
    let trunk: Trunk = from_str(doc).unwrap();
    assert!(trunk.done);
}

#[test]
fn test_string_values_keep_their_spacing() {
    let doc = "# Trunk\n- **Branch**:\n  - **Name**:   padded  \n  - **Leaf**:\n    - **Weight**: 0\n";
    let trunk: Trunk = from_str(doc).unwrap();
    assert_eq!(trunk.branch.name, "  padded  ");
}

#[test]
fn test_inline_value_on_nested_field_is_malformed() {
    let err = from_str::<Trunk>("# Trunk\n- **Branch**: north\n").unwrap_err();
    assert!(matches!(err, Error::MalformedDocument { line: 2, .. }));
}

#[test]
fn test_missing_block_for_nested_record_is_malformed() {
    let err = from_str::<Trunk>("# Trunk\n\n- **Branch**:\n- **Done**: true\n").unwrap_err();
    assert!(matches!(err, Error::MalformedDocument { line: 3, .. }));
}

#[test]
fn test_foreign_heading_inside_block_is_type_mismatch() {
    let doc = "# Trunk\n- **Branch**:\n  - **Leaf**:\n    # oak (Trunk)\n    - **Weight**: 1\n";
    let err = from_str::<Trunk>(doc).unwrap_err();
    assert!(matches!(
        err,
        Error::TypeMismatch { line: 4, ref expected, ref found } if expected == "Leaf" && found == "Trunk"
    ));
}

#[test]
fn test_foreign_outer_heading_ends_document() {
    let trunk: Trunk = from_str("# Other\n- **Done**: true\n").unwrap();
    assert!(!trunk.done);
}

#[test]
fn test_unknown_field_in_nested_block() {
    let doc = "# Trunk\n- **Branch**:\n  - **Bark**: rough\n";
    let err = from_str::<Trunk>(doc).unwrap_err();
    assert!(matches!(err, Error::UnknownField { line: 3, ref name } if name == "Bark"));
}

#[test]
fn test_scalar_list_rejects_bullet_fields() {
    let doc = "# Trunk\n- **Notes**:\n  - first\n  text without marker\n";
    let err = from_str::<Trunk>(doc).unwrap_err();
    assert!(matches!(err, Error::MalformedDocument { line: 4, .. }));
}

#[test]
fn test_scalar_list_item_keeps_bold_text() {
    let doc = "# Trunk\n- **Notes**:\n  - **bold**: still text\n  -\n";
    let trunk: Trunk = from_str(doc).unwrap();
    assert_eq!(trunk.notes, vec!["**bold**: still text".to_string(), String::new()]);
}

fn city() -> &'static RecordSchema {
    static SCHEMA: OnceLock<RecordSchema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        RecordSchema::new("City")
            .field(FieldDescriptor::new("name", Kind::String).title())
            .field(FieldDescriptor::new("population", Kind::Integer).rename("Population"))
    })
}

fn atlas() -> RecordSchema {
    RecordSchema::new("Atlas")
        .field(FieldDescriptor::new("cities", Kind::List(Box::new(Kind::Record(city)))).rename("Cities"))
}

fn city_value(name: &str, population: i64) -> Value {
    let mut fields = RecordMap::new();
    fields.insert("name".to_string(), Value::from(name));
    fields.insert("population".to_string(), Value::Integer(population));
    Value::Record(fields)
}

#[test]
fn test_dynamic_schema_round_trip() {
    let mut fields = RecordMap::new();
    fields.insert(
        "cities".to_string(),
        Value::List(vec![city_value("Oslo", 709_000), city_value("Bergen", 291_000)]),
    );
    let value = Value::Record(fields);

    let doc = encode_value(&value, &atlas(), Options::default()).unwrap();
    assert_eq!(
        doc,
        "# Atlas\n\n- **Cities**:\n  - **City**:\n    # Oslo (City)\n    - **Population**: 709000\n  - **City**:\n    # Bergen (City)\n    - **Population**: 291000\n"
    );
    assert_eq!(decode_value(&doc, &atlas()).unwrap(), value);
}

#[test]
fn test_list_element_must_name_element_type() {
    let doc = "# Atlas\n- **Cities**:\n  - **Town**:\n    # Oslo (City)\n";
    let err = decode_value(doc, &atlas()).unwrap_err();
    assert!(matches!(
        err,
        Error::TypeMismatch { line: 3, ref expected, ref found } if expected == "City" && found == "Town"
    ));
}

#[test]
fn test_list_elements_separated_by_blank_lines() {
    let doc = "# Atlas\n- **Cities**:\n\n  - **City**:\n    # Oslo (City)\n\n    - **Population**: 1\n\n  - **City**:\n    # Bergen (City)\n";
    let value = decode_value(doc, &atlas()).unwrap();
    let cities = value
        .as_record()
        .and_then(|r| r.get("cities"))
        .and_then(Value::as_list)
        .unwrap();
    assert_eq!(cities, &vec![city_value("Oslo", 1), city_value("Bergen", 0)]);
}

#[test]
fn test_empty_title_round_trips() {
    let doc = encode_value(&city_value("", 5), city(), Options::default()).unwrap();
    assert_eq!(doc, "#  (City)\n\n- **Population**: 5\n");
    assert_eq!(decode_value(&doc, city()).unwrap(), city_value("", 5));
}

#[test]
fn test_title_with_parentheses() {
    let value = city_value("Paris (France)", 2);
    let doc = encode_value(&value, city(), Options::default()).unwrap();
    assert!(doc.starts_with("# Paris (France) (City)\n"));
    assert_eq!(decode_value(&doc, city()).unwrap(), value);
}

#[test]
fn test_nested_lists_are_unsupported() {
    let schema = RecordSchema::new("Grid")
        .field(FieldDescriptor::new("rows", Kind::List(Box::new(Kind::List(Box::new(Kind::Integer))))));
    assert!(matches!(
        decode_value("# Grid\n", &schema),
        Err(Error::UnsupportedType(_))
    ));
}

#[test]
fn test_duplicate_display_names_are_invalid() {
    let schema = RecordSchema::new("Twice")
        .field(FieldDescriptor::new("a", Kind::String).rename("Same"))
        .field(FieldDescriptor::new("b", Kind::String).rename("Same"));
    assert!(matches!(
        decode_value("# Twice\n", &schema),
        Err(Error::InvalidArgument(_))
    ));
}
