use serde::{Deserialize, Serialize};
use serde_lpc::{
    dump, from_document, from_str, from_value, load, to_document, to_string, to_value, Error,
    Number, Record, Value,
};

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct User {
    id: u32,
    name: String,
    active: bool,
    tags: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Item {
    sku: String,
    price: f64,
    quantity: u32,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Order {
    order_id: u32,
    customer: User,
    items: Vec<Item>,
    note: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Coordinates(i32, i32, i32);

#[derive(Serialize, Deserialize, Debug, PartialEq)]
enum Status {
    Idle,
    Fighting(String),
    Travelling { from: String, to: String },
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Living {
    name: String,
    position: Coordinates,
    status: Status,
}

fn alice() -> User {
    User {
        id: 123,
        name: "Alice".to_string(),
        active: true,
        tags: vec!["admin".to_string(), "developer".to_string()],
    }
}

#[test]
fn test_simple_struct_text() {
    let text = to_string(&alice()).unwrap();
    assert_eq!(
        text,
        "#3:2\nid 123\nname \"Alice\"\nactive 1\ntags ({\"admin\",\"developer\",})\n"
    );

    let back: User = from_str(&text).unwrap();
    assert_eq!(back, alice());
}

#[test]
fn test_nested_struct() {
    let order = Order {
        order_id: 12345,
        customer: alice(),
        items: vec![
            Item {
                sku: "WIDGET-001".to_string(),
                price: 29.99,
                quantity: 2,
            },
            Item {
                sku: "GADGET-002".to_string(),
                price: 10.0,
                quantity: 1,
            },
        ],
        note: None,
    };

    let text = to_string(&order).unwrap();
    assert!(text.contains("customer ([\"id\":123,"));
    assert!(text.contains("\"price\":10.0,"));
    assert!(text.contains("note 0\n"));

    let back: Order = from_str(&text).unwrap();
    assert_eq!(back, order);
}

#[test]
fn test_tuple_structs_become_lpc_structs() {
    let living = Living {
        name: "orc".to_string(),
        position: Coordinates(1, -2, 3),
        status: Status::Travelling {
            from: "cave".to_string(),
            to: "village".to_string(),
        },
    };

    let doc = to_document(&living).unwrap();
    assert_eq!(
        doc.get("position"),
        Some(&Value::Struct(Record::new(
            "Coordinates",
            vec![Value::from(1), Value::from(-2), Value::from(3)]
        )))
    );

    let text = dump(&doc).unwrap();
    assert!(text.contains("position (<\"Coordinates\",1,-2,3,>)\n"));
    let back: Living = from_str(&text).unwrap();
    assert_eq!(back, living);
}

#[test]
fn test_enum_variants() {
    for status in [
        Status::Idle,
        Status::Fighting("dragon".to_string()),
        Status::Travelling {
            from: "a".to_string(),
            to: "b".to_string(),
        },
    ] {
        let value = to_value(&status).unwrap();
        let back: Status = from_value(value).unwrap();
        assert_eq!(back, status);
    }
    assert_eq!(to_value(&Status::Idle).unwrap(), Value::from("Idle"));
}

#[test]
fn test_positional_struct_from_save_file() {
    #[derive(Deserialize, Debug, PartialEq)]
    struct Weapon {
        name: String,
        damage: i32,
    }

    #[derive(Deserialize)]
    struct Save {
        weapon: Weapon,
        spare: Weapon,
    }

    let text = "#3:2\nweapon (*\"/std/weapon\",\"axe\",7,*)\nspare (<\"weapon\",\"knife\",2,>)\n";
    let save: Save = from_str(text).unwrap();
    assert_eq!(
        save.weapon,
        Weapon {
            name: "axe".to_string(),
            damage: 7
        }
    );
    assert_eq!(save.spare.damage, 2);
}

#[test]
fn test_references_deserialize_as_their_targets() {
    #[derive(Deserialize)]
    struct Save {
        owner: Vec<String>,
        pet_owner: Vec<String>,
    }

    let doc = load("#3:2\nowner <1>=({\"bob\",})\npet_owner <1>\n").unwrap();
    let save: Save = from_document(&doc).unwrap();
    assert_eq!(save.owner, save.pet_owner);
}

#[test]
fn test_wide_integers() {
    let doc = to_document(&std::collections::BTreeMap::from([("max", u64::MAX)])).unwrap();
    let text = dump(&doc).unwrap();
    assert_eq!(text, "#3:2\nmax 18446744073709551615\n");

    let loaded = load(&text).unwrap();
    assert!(matches!(
        loaded.get("max"),
        Some(Value::Number(Number::BigInt(_)))
    ));
    let back: std::collections::BTreeMap<String, u64> = from_document(&loaded).unwrap();
    assert_eq!(back["max"], u64::MAX);
}

#[test]
fn test_top_level_must_be_a_map() {
    assert!(matches!(to_string(&42), Err(Error::Custom(_))));
    assert!(matches!(
        to_string(&vec!["a", "b"]),
        Err(Error::Custom(_))
    ));
}

#[test]
fn test_type_mismatch_is_reported() {
    let result: Result<User, _> = from_str("#3:2\nid \"abc\"\nname \"x\"\nactive 1\ntags ({})\n");
    assert!(result.is_err());
}

#[test]
fn test_json_export() {
    let doc = load("#3:2\nname \"simple\"\narr ({1,2.5,})\nm ([\"k\":1;2,])\n").unwrap();
    let json = serde_json::to_value(&doc).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "name": "simple",
            "arr": [1, 2.5],
            "m": { "k": [1, 2] }
        })
    );
}

#[test]
fn test_json_export_expands_references() {
    let doc = load("#3:2\na <1>=({1,2,})\nb <1>\n").unwrap();
    let json = serde_json::to_value(&doc).unwrap();
    assert_eq!(json, serde_json::json!({ "a": [1, 2], "b": [1, 2] }));
}

#[test]
fn test_json_export_of_cycle_fails() {
    let doc = load("#3:2\nnode <1>=(<\"node\",\"root\",<1>,>)\n").unwrap();
    let err = serde_json::to_string(&doc).unwrap_err();
    assert!(err.to_string().contains("Cyclic reference: <1>"), "{}", err);

    let err = to_value(&doc).unwrap_err();
    assert!(matches!(err, Error::Custom(ref msg) if msg.contains("<1>")), "{:?}", err);
}

#[test]
fn test_value_from_json() {
    let value: Value = serde_json::from_str(r#"{"a": [1, "x", null], "b": true}"#).unwrap();
    let mapping = value.as_mapping().unwrap();
    assert_eq!(
        mapping.get_first(&Value::from("a")),
        Some(&Value::Array(vec![
            Value::from(1),
            Value::from("x"),
            Value::from(0)
        ]))
    );
    assert_eq!(mapping.get_first(&Value::from("b")), Some(&Value::from(1)));
}
