//! Integration tests for the function registry.
//!
//! Each test drives the registry by name the way a templating engine would:
//! data arrives as decoded JSON, fields are looked up from it, and pipeline
//! stages pass the previous result as the last argument.

use serde_json::json;
use tplsub_core::settings::{Settings, TimeZoneSetting};
use tplsub_core::ErrorKind;
use tplsub_template::registry::{FunctionRegistry, RegistryBuilder};
use tplsub_template::value::Value;

/// Decodes a JSON document into a value the way the CLI does.
fn data(json: serde_json::Value) -> Value {
    Value::from(json)
}

/// Looks up a top-level field, yielding `Null` when it is missing.
fn field(data: &Value, name: &str) -> Value {
    data.as_map()
        .and_then(|m| m.get(name))
        .cloned()
        .unwrap_or(Value::Null)
}

/// Calls `name` with `args` followed by the piped-in value.
fn pipe(registry: &FunctionRegistry, piped: Value, name: &str, args: &[Value]) -> Value {
    let mut all = args.to_vec();
    all.push(piped);
    registry.call(name, &all).unwrap()
}

fn call(registry: &FunctionRegistry, name: &str, args: &[Value]) -> Value {
    registry.call(name, args).unwrap()
}

fn render(v: &Value) -> String {
    v.to_string()
}

// ═════════════════════════════════════════════════════════════════════
// 1. String pipelines
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_len_of_upper_name() {
    let r = FunctionRegistry::builtin();
    let d = data(json!({"name": "john"}));
    let upper = call(&r, "upper", &[field(&d, "name")]);
    assert_eq!(upper, Value::from("JOHN"));
    assert_eq!(call(&r, "len", &[upper]), Value::Int(4));
}

#[test]
fn test_lower_in_pipeline() {
    let r = FunctionRegistry::builtin();
    let d = data(json!({"FirstName": "John", "LastName": "Doe"}));
    let out = format!(
        "Param tpl: {} {}",
        render(&field(&d, "FirstName")),
        render(&pipe(&r, field(&d, "LastName"), "lower", &[]))
    );
    assert_eq!(out, "Param tpl: John doe");
}

#[test]
fn test_replace_and_trim() {
    let r = FunctionRegistry::builtin();
    let text = Value::from("Hello World");
    let replaced = pipe(&r, text, "replace", &[Value::from("World"), Value::from("Gopher")]);
    assert_eq!(render(&replaced), "Hello Gopher");
    assert_eq!(render(&pipe(&r, Value::from("  hello  "), "trim", &[])), "hello");
}

#[test]
fn test_split_renders_as_list() {
    let r = FunctionRegistry::builtin();
    let parts = call(&r, "split", &[Value::from(","), Value::from("hello,world,test")]);
    assert_eq!(render(&parts), "[hello, world, test]");
    assert_eq!(call(&r, "len", &[parts]), Value::Int(3));
}

#[test]
fn test_to_strings_then_join() {
    let r = FunctionRegistry::builtin();
    let d = data(json!({"items": ["a", "b", "c"]}));
    let strings = pipe(&r, field(&d, "items"), "toStrings", &[]);
    let joined = pipe(&r, strings, "join", &[Value::from("-")]);
    assert_eq!(joined, Value::from("a-b-c"));
}

#[test]
fn test_repeat_in_pipeline() {
    let r = FunctionRegistry::builtin();
    let john = pipe(&r, Value::from("John"), "repeat", &[Value::Int(3)]);
    let doe = pipe(&r, Value::from("Doe"), "repeat", &[Value::Int(2)]);
    assert_eq!(format!("{john} {doe}"), "JohnJohnJohn DoeDoe");
}

#[test]
fn test_contains_renders_bool() {
    let r = FunctionRegistry::builtin();
    let v = call(&r, "contains", &[Value::from("world"), Value::from("hello world")]);
    assert_eq!(render(&v), "true");
}

// ═════════════════════════════════════════════════════════════════════
// 2. Math on decoded JSON numbers
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_integer_math_on_json() {
    let r = FunctionRegistry::builtin();
    let d = data(json!({"a": 10, "b": 3}));
    let (a, b) = (field(&d, "a"), field(&d, "b"));
    let results: Vec<String> = ["add", "sub", "mul", "div", "mod"]
        .iter()
        .map(|f| render(&call(&r, f, &[a.clone(), b.clone()])))
        .collect();
    assert_eq!(results, vec!["13", "7", "30", "3", "1"]);
}

#[test]
fn test_float_math_on_json() {
    let r = FunctionRegistry::builtin();
    let d = data(json!({"a": 10.5, "b": 3.2}));
    let (a, b) = (field(&d, "a"), field(&d, "b"));
    let results: Vec<String> = ["addf", "subf", "mulf", "divf"]
        .iter()
        .map(|f| render(&call(&r, f, &[a.clone(), b.clone()])))
        .collect();
    assert_eq!(results, vec!["13.7", "7.3", "33.6", "3.28125"]);
}

#[test]
fn test_mixed_text_and_int_float_math() {
    let r = FunctionRegistry::builtin();
    let d = data(json!({"a": "15.75", "b": 4}));
    let sum = call(&r, "addf", &[field(&d, "a"), field(&d, "b")]);
    assert_eq!(render(&sum), "19.75");
}

#[test]
fn test_precise_and_integer_division() {
    let r = FunctionRegistry::builtin();
    let args = [Value::Int(22), Value::Int(7)];
    assert_eq!(render(&call(&r, "divf", &args)), "3.142857142857143");
    assert_eq!(render(&call(&r, "div", &args)), "3");
}

#[test]
fn test_to_float_renders_without_fraction() {
    let r = FunctionRegistry::builtin();
    assert_eq!(render(&call(&r, "toFloat", &[Value::Int(42)])), "42");
}

#[test]
fn test_add_mul_examples() {
    let r = FunctionRegistry::builtin();
    assert_eq!(call(&r, "add", &[Value::Int(5), Value::Int(3)]), Value::Int(8));
    let product = call(&r, "mulf", &[Value::Float(2.5), Value::Float(4.0)]);
    assert!(matches!(product, Value::Float(f) if (f - 10.0).abs() < f64::EPSILON));
    assert!(matches!(call(&r, "toFloat", &[Value::Int(42)]), Value::Float(_)));
}

#[test]
fn test_math_errors() {
    let r = FunctionRegistry::builtin();
    let err = r.call("add", &[Value::from("invalid"), Value::Int(3)]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conversion);
    let err = r.call("div", &[Value::Int(1), Value::Int(0)]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DivisionByZero);
    let err = r.call("mod", &[Value::Int(1), Value::Int(0)]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DivisionByZero);
    let err = r.call("divf", &[Value::Float(1.0), Value::Float(0.0)]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DivisionByZero);
}

// ═════════════════════════════════════════════════════════════════════
// 3. Dates
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_parse_date_year_with_zone_abbreviation() {
    let r = FunctionRegistry::builtin();
    let d = data(json!({"time": "2025-07-20 17:17:00 CEST"}));
    let ts = pipe(&r, field(&d, "time"), "parseDate", &[Value::from("2006-01-02 15:04:05 MST")]);
    assert_eq!(pipe(&r, ts, "year", &[]), Value::Int(2025));
}

#[test]
fn test_symbolic_layout_round_trip() {
    let r = FunctionRegistry::builtin();
    let layout = Value::from("YYYY-MM-DD");
    let ts = call(&r, "parseDate", &[layout.clone(), Value::from("2023-12-25")]);
    assert_eq!(call(&r, "year", &[ts.clone()]), Value::Int(2023));
    assert_eq!(call(&r, "month", &[ts.clone()]), Value::Int(12));
    assert_eq!(call(&r, "day", &[ts.clone()]), Value::Int(25));
    assert_eq!(call(&r, "formatDate", &[layout, ts]), Value::from("2023-12-25"));
}

#[test]
fn test_timestamp_of_parsed_date() {
    let r = FunctionRegistry::builtin();
    let ts = call(
        &r,
        "parseDate",
        &[Value::from("2006-01-02 15:04:05"), Value::from("2023-01-01 00:00:00")],
    );
    assert_eq!(call(&r, "timestamp", &[ts]), Value::Int(1_672_531_200));
}

#[test]
fn test_rfc3339_layout_with_utc_suffix() {
    let r = FunctionRegistry::builtin();
    let layout = Value::from("2006-01-02T15:04:05Z07:00");
    let ts = call(&r, "parseDate", &[layout.clone(), Value::from("2024-03-01T08:15:30Z")]);
    assert_eq!(call(&r, "timestamp", &[ts.clone()]), Value::Int(1_709_280_930));
    assert_eq!(
        call(&r, "formatDate", &[layout, ts.clone()]),
        Value::from("2024-03-01T08:15:30Z")
    );
    assert_eq!(
        call(&r, "formatDate", &[Value::from("15:04 MST"), ts]),
        Value::from("08:15 UTC")
    );
}

#[test]
fn test_repeat_too_long_fails_cleanly() {
    let r = FunctionRegistry::builtin();
    let err = r
        .call("repeat", &[Value::Int(1i64 << 62), Value::from("ab")])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_format_now() {
    let settings = Settings {
        time_zone: TimeZoneSetting::Utc,
        ..Settings::default()
    };
    let r = RegistryBuilder::new(&settings).build();
    let now = call(&r, "now", &[]);
    let year = call(&r, "formatDate", &[Value::from("2006"), now]);
    assert_eq!(year.as_str().map(str::len), Some(4));
}

// ═════════════════════════════════════════════════════════════════════
// 4. Collections and conditionals
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_collection_access() {
    let r = FunctionRegistry::builtin();
    let d = data(json!({"items": ["first", "second", "third"]}));
    let items = field(&d, "items");
    assert_eq!(render(&call(&r, "len", &[items.clone()])), "3");
    assert_eq!(render(&call(&r, "first", &[items.clone()])), "first");
    assert_eq!(render(&call(&r, "last", &[items.clone()])), "third");
    let middle = call(&r, "slice", &[Value::Int(1), Value::Int(2), items.clone()]);
    assert_eq!(middle, Value::List(vec![Value::from("second")]));
    let clamped = call(&r, "slice", &[Value::Int(0), Value::Int(10), items]);
    assert_eq!(clamped, Value::List(vec![]));
}

#[test]
fn test_default_and_empty() {
    let r = FunctionRegistry::builtin();
    let anon = Value::from("Anonymous");
    for (name, expected) in [(json!(""), "Anonymous"), (json!("John"), "John"), (json!(null), "Anonymous")] {
        let d = data(json!({ "name": name }));
        let v = call(&r, "default", &[anon.clone(), field(&d, "name")]);
        assert_eq!(render(&v), expected);
    }

    let d = data(json!({"name": ""}));
    assert_eq!(call(&r, "empty", &[field(&d, "name")]), Value::Bool(true));
    assert_eq!(call(&r, "empty", &[field(&d, "missing")]), Value::Bool(true));
    assert_eq!(call(&r, "empty", &[Value::Int(0)]), Value::Bool(false));
}

#[test]
fn test_seq_both_directions() {
    let r = FunctionRegistry::builtin();
    let up = call(&r, "seq", &[Value::Int(1), Value::Int(3)]);
    let down = call(&r, "seq", &[Value::Int(3), Value::Int(1)]);
    assert_eq!(render(&up), "[1, 2, 3]");
    assert_eq!(render(&down), "[3, 2, 1]");
}

// ═════════════════════════════════════════════════════════════════════
// 5. Paths
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_path_functions() {
    let r = FunctionRegistry::builtin();
    let p = Value::from("/home/user/document.txt");
    assert_eq!(render(&call(&r, "basename", &[p.clone()])), "document.txt");
    assert_eq!(render(&call(&r, "dirname", &[p.clone()])), "/home/user");
    assert_eq!(render(&call(&r, "ext", &[p])), ".txt");

    let d = data(json!({"dir": "/home", "subdir": "user", "file": "doc.txt"}));
    let joined = call(
        &r,
        "pathjoin",
        &[field(&d, "dir"), field(&d, "subdir"), field(&d, "file")],
    );
    assert_eq!(render(&joined), "/home/user/doc.txt");
}

// ═════════════════════════════════════════════════════════════════════
// 6. Digests, encoding, and JSON
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_digests_of_names() {
    let r = FunctionRegistry::builtin();
    assert_eq!(
        render(&call(&r, "md5", &[Value::from("John")])),
        "61409aa1fd47d4a5332de23cbf59a36f"
    );
    assert_eq!(
        render(&call(&r, "md5", &[Value::from("Doe")])),
        "ad695f53ae7569fb981fc95598e27e67"
    );
    assert_eq!(
        render(&call(&r, "sha1", &[Value::from("hello world")])),
        "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed"
    );
    assert_eq!(
        render(&call(&r, "sha256", &[Value::from("hello world")])),
        "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
    );
}

#[test]
fn test_base64_round_trip() {
    let r = FunctionRegistry::builtin();
    let encoded = call(&r, "base64Encode", &[Value::from("hello world")]);
    assert_eq!(encoded, Value::from("aGVsbG8gd29ybGQ="));
    assert_eq!(call(&r, "base64Decode", &[encoded]), Value::from("hello world"));

    let err = r.call("base64Decode", &[Value::from("invalid!")]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Encoding);
}

#[test]
fn test_pretty_json_of_whole_document() {
    let r = FunctionRegistry::builtin();
    let d = data(json!({"FirstName": "John", "LastName": "Doe"}));
    let out = call(&r, "toPrettyJSON", &[d]);
    assert_eq!(
        render(&out),
        "{\n  \"FirstName\": \"John\",\n  \"LastName\": \"Doe\"\n}"
    );
}

#[test]
fn test_json_round_trips_through_decoder() {
    let r = FunctionRegistry::builtin();
    let doc = json!({"list": [1, 2.5, "x", true, null], "nested": {"k": "v"}});
    let encoded = call(&r, "toJSON", &[data(doc.clone())]);
    let decoded: serde_json::Value = serde_json::from_str(encoded.as_str().unwrap()).unwrap();
    assert_eq!(decoded, doc);
}

// ═════════════════════════════════════════════════════════════════════
// 7. Registry boundary
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_unknown_function() {
    let r = FunctionRegistry::builtin();
    let err = r.call("invalidFunc", &[Value::from("hello")]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownFunction);
    assert!(err.to_string().contains("invalidFunc"));
}

#[test]
fn test_arity_mismatch() {
    let r = FunctionRegistry::builtin();
    let err = r.call("upper", &[]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ArityMismatch);
    let err = r
        .call("replace", &[Value::from("a"), Value::from("b")])
        .unwrap_err();
    assert_eq!(err.to_string(), "Function 'replace' expects 3 argument(s), got 2");
}

#[test]
fn test_env_can_be_disabled() {
    let settings = Settings {
        disabled_functions: vec!["env".to_string()],
        ..Settings::default()
    };
    let r = RegistryBuilder::new(&settings).build();
    let err = r.call("env", &[Value::from("HOME")]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownFunction);
    assert_eq!(r.len(), FunctionRegistry::builtin().len() - 1);
}

#[test]
fn test_concurrent_renders_use_separate_registries() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || {
                let r = FunctionRegistry::builtin();
                r.call("add", &[Value::Int(i), Value::Int(1)]).unwrap()
            })
        })
        .collect();
    let results: Vec<Value> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results, (1..=4).map(Value::Int).collect::<Vec<_>>());
}
