use proptest::prelude::*;

use medialog::{
    command::{ALL_COMMANDS, ArgKind, CommandId},
    core::log::OperationLog,
    op::{Arg, Operation},
    wire::{self, WireError},
};

fn log_of(ops: Vec<Operation>) -> OperationLog {
    let mut log = OperationLog::new();
    for op in ops {
        log.append(op).expect("append");
    }
    log
}

#[test]
fn single_negate_serializes_exactly() {
    let log = log_of(vec![Operation::new(CommandId::Negate)]);
    assert_eq!(wire::to_json(&log).expect("json"), r#"[{"name":"negate","args":[]}]"#);
}

#[test]
fn empty_log_is_an_empty_array() {
    let log = OperationLog::new();
    assert_eq!(wire::to_json(&log).expect("json"), "[]");
    assert!(wire::from_json("[]", 4).expect("parse").is_empty());
}

#[test]
fn crop_round_trips_with_integer_args() {
    let json = r#"[{"name":"crop","args":[100,100,523,750]}]"#;
    let log = wire::from_json(json, 8).expect("parse");
    let op = log.get(0).expect("one op");
    assert_eq!(op.command(), CommandId::Crop);
    assert_eq!(op.args(), &[Arg::Uint(100), Arg::Uint(100), Arg::Uint(523), Arg::Uint(750)]);
    assert_eq!(wire::to_json(&log).expect("json"), json);
}

#[test]
fn mixed_kinds_keep_their_schema_types() {
    let json = r##"[
        {"name":"Rotate","args":[45,"#ffffff"]},
        {"name":"roll","args":[-3,7.0]},
        {"name":"tint","args":["red",0.25]}
    ]"##;
    let log = wire::from_json(json, 8).expect("parse");
    assert_eq!(log.len(), 3);
    assert_eq!(log.get(0).expect("rotate").args()[0], Arg::Double(45.0));
    assert_eq!(log.get(1).expect("roll").args(), &[Arg::Int(-3), Arg::Int(7)]);
    assert_eq!(log.get(2).expect("tint").text(0).expect("colour"), "red");

    let out = wire::to_json(&log).expect("json");
    assert!(out.starts_with(r##"[{"name":"rotate","args":[45.0,"#ffffff"]}"##));
}

#[test]
fn unknown_name_rejects_the_whole_document() {
    let json = r#"[{"name":"negate","args":[]},{"name":"sepia","args":[]}]"#;
    match wire::from_json(json, 8) {
        Err(WireError::UnknownCommand { index, name }) => {
            assert_eq!(index, 1);
            assert_eq!(name, "sepia");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn arity_and_kind_mismatches_are_reported() {
    let arity = wire::from_json(r#"[{"name":"crop","args":[1,2,3]}]"#, 8);
    assert!(matches!(
        arity,
        Err(WireError::Arity {
            expected: 4,
            found: 3,
            ..
        })
    ));

    let kind = wire::from_json(r#"[{"name":"crop","args":[1,2,"3",4]}]"#, 8);
    assert!(matches!(
        kind,
        Err(WireError::ArgKind {
            arg: 2,
            expected: ArgKind::Uint,
            ..
        })
    ));

    let negative = wire::from_json(r#"[{"name":"resize","args":[-1,4]}]"#, 8);
    assert!(matches!(negative, Err(WireError::ArgKind { arg: 0, .. })));

    let fraction = wire::from_json(r#"[{"name":"roll","args":[1.5,0]}]"#, 8);
    assert!(matches!(fraction, Err(WireError::ArgKind { arg: 0, .. })));
}

#[test]
fn malformed_shapes_are_json_errors() {
    for json in [
        "{}",
        r#"[{"name":"negate"}]"#,
        r#"[{"name":"negate","args":[],"extra":1}]"#,
        r#"[{"name":"negate","args":[]}"#,
    ] {
        assert!(matches!(wire::from_json(json, 8), Err(WireError::Json(_))), "{json}");
    }
}

#[test]
fn deserializing_into_a_small_log_fails() {
    let json = r#"[{"name":"negate","args":[]},{"name":"negate","args":[]},{"name":"negate","args":[]}]"#;
    assert!(matches!(wire::from_json(json, 2), Err(WireError::Capacity(_))));
}

#[test]
fn non_finite_doubles_do_not_serialize() {
    let op = Operation::with_args(CommandId::Gamma, [Arg::Double(f64::NAN)]).expect("op");
    let log = log_of(vec![op]);
    assert!(matches!(
        wire::to_json(&log),
        Err(WireError::NonFinite { index: 0, arg: 0, .. })
    ));
}

#[test]
fn pretty_and_value_forms_agree() {
    let log = log_of(vec![
        Operation::with_args(CommandId::Border, [Arg::Uint(2), Arg::Uint(3), Arg::from("blue")])
            .expect("op"),
        Operation::new(CommandId::Stroke),
    ]);
    let pretty = wire::to_json_pretty(&log).expect("pretty");
    let value = wire::to_value(&log).expect("value");
    assert_eq!(wire::from_json(&pretty, 8).expect("parse"), log);
    assert_eq!(wire::from_value(value, 8).expect("parse"), log);
}

#[test]
fn doubles_survive_the_round_trip_bit_for_bit() {
    for value in [
        -30.334330365026858,
        1.0715660391465826e-75,
        0.1 + 0.2,
        f64::MIN_POSITIVE,
        f64::MAX,
    ] {
        let op = Operation::with_args(CommandId::Gamma, [Arg::Double(value)]).expect("op");
        let json = wire::to_json(&log_of(vec![op])).expect("json");
        let back = wire::from_json(&json, 1).expect("parse");
        let Arg::Double(decoded) = back.get(0).expect("op").args()[0] else {
            panic!("decoded a non-double");
        };
        assert_eq!(decoded.to_bits(), value.to_bits(), "{value:e} via {json}");
    }
}

fn arg_for(kind: ArgKind) -> BoxedStrategy<Arg> {
    match kind {
        ArgKind::Uint => any::<u32>().prop_map(Arg::Uint).boxed(),
        ArgKind::Int => any::<i32>().prop_map(Arg::Int).boxed(),
        ArgKind::Double => any::<f64>()
            .prop_filter("finite", |v| v.is_finite())
            .prop_map(Arg::Double)
            .boxed(),
        ArgKind::Text => "[#a-z0-9 ]{0,12}".prop_map(Arg::Text).boxed(),
    }
}

fn operation() -> impl Strategy<Value = Operation> {
    prop::sample::select(ALL_COMMANDS).prop_flat_map(|command| {
        let args: Vec<_> = command.schema().iter().map(|kind| arg_for(*kind)).collect();
        args.prop_map(move |args| Operation::with_args(command, args).expect("within MAX_ARGS"))
    })
}

proptest! {
    #[test]
    fn json_round_trip_is_lossless(ops in prop::collection::vec(operation(), 0..32)) {
        let log = log_of(ops);
        let json = wire::to_json(&log).expect("json");
        let back = wire::from_json(&json, log.len().max(1)).expect("parse");
        prop_assert_eq!(back, log);
    }
}
