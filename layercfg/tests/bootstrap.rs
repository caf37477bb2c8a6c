//! Integration tests for generating missing base files and reading them
//! back, including enum and duration literals.

mod common;

use std::collections::BTreeSet;
use std::time::Duration;

use common::Workspace;
use layercfg::{
    config_enum, ConfigFile, ConfigSlot, Converter, DynamicSlot, GroupMarker, MainConverter,
    Namespace, SchemaEntry, TypeDescriptor, Value, ValueOrigin,
};

config_enum! {
    /// Game difficulty.
    pub enum Difficulty { Easy, Normal, Hard }
}

struct Slots {
    difficulty: ConfigSlot<Difficulty>,
    modes: ConfigSlot<BTreeSet<Difficulty>>,
    tick: ConfigSlot<Duration>,
    hosts: ConfigSlot<Vec<String>>,
    debug: ConfigSlot<bool>,
}

impl Slots {
    fn new() -> Self {
        Self {
            difficulty: ConfigSlot::new(),
            modes: ConfigSlot::new(),
            tick: ConfigSlot::new(),
            hosts: ConfigSlot::new(),
            debug: ConfigSlot::new(),
        }
    }

    fn namespace(&self) -> Namespace {
        Namespace::builder("game.rules")
            .file(
                ConfigFile::builder("game_rules")
                    .comment(["Gameplay rules"])
                    .entry(
                        SchemaEntry::bind("Difficulty", "Normal", &self.difficulty)
                            .with_comment(["Starting difficulty"])
                            .with_group_start(GroupMarker::new("Modes")),
                    )
                    .entry(
                        SchemaEntry::bind("AllowedModes", "*", &self.modes)
                            .with_group_end(GroupMarker::new("Modes")),
                    )
                    .entry(SchemaEntry::comment_only(["Timing"]))
                    .entry(SchemaEntry::bind("Tick", "1hour30min20sec", &self.tick))
                    .entry(SchemaEntry::bind("Hosts", "a.example, b.example", &self.hosts))
                    .entry(SchemaEntry::bind("Debug", "off", &self.debug))
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap()
    }
}

#[test]
fn test_generated_file_reproduces_defaults() {
    let ws = Workspace::new();
    let first = Slots::new();
    let manager = ws.manager();
    manager.register(first.namespace()).unwrap();
    let report = manager.load("game.rules").unwrap();
    assert_eq!(report.generated, vec![ws.path("config/game_rules.properties")]);
    assert!(report
        .resolved
        .iter()
        .all(|p| p.origin == ValueOrigin::Base));

    let text = ws.read("config/game_rules.properties");
    assert!(text.contains("## game rules Settings"));
    assert!(text.contains("## Section BEGIN: Modes"));
    assert!(text.contains("# Available: Easy|Normal|Hard\nDifficulty = Normal\n"));
    assert!(text.contains("# Available: Easy,Normal,Hard\nAllowedModes = *\n"));
    assert!(text.contains("# Timing\n"));
    assert!(!text.contains('\r'));

    // A fresh manager over the generated file sees the same values
    let second = Slots::new();
    let manager = ws.manager();
    manager.register(second.namespace()).unwrap();
    let report = manager.load("game.rules").unwrap();
    assert!(report.generated.is_empty());
    assert!(!report.has_warnings());

    assert_eq!(second.difficulty.get(), first.difficulty.get());
    assert_eq!(second.modes.get(), first.modes.get());
    assert_eq!(second.tick.get(), first.tick.get());
    assert_eq!(second.hosts.get(), first.hosts.get());
    assert_eq!(second.debug.get(), Some(false));
}

#[test]
fn test_enum_wildcard_selects_every_constant() {
    let ws = Workspace::new();
    let slots = Slots::new();
    let manager = ws.manager();
    manager.register(slots.namespace()).unwrap();
    let report = manager.load("game.rules").unwrap();

    let all: BTreeSet<Difficulty> = Difficulty::ALL.iter().copied().collect();
    assert_eq!(slots.modes.get(), Some(all));
    assert_eq!(report.get("AllowedModes").unwrap().literal, "*");

    ws.write(
        "config/game_rules.properties",
        "AllowedModes = Hard, Easy, Hard\n",
    );
    let report = manager.load("game.rules").unwrap();
    assert_eq!(
        slots.modes.get(),
        Some(BTreeSet::from([Difficulty::Easy, Difficulty::Hard]))
    );
    assert_eq!(report.get("AllowedModes").unwrap().literal, "Easy,Hard");

    ws.write(
        "config/game_rules.properties",
        "AllowedModes = Normal,Hard,Easy\n",
    );
    let report = manager.load("game.rules").unwrap();
    assert_eq!(report.get("AllowedModes").unwrap().literal, "*");
}

#[test]
fn test_composite_durations() {
    let ws = Workspace::new();
    let slots = Slots::new();
    let manager = ws.manager();
    manager.register(slots.namespace()).unwrap();

    manager.load("game.rules").unwrap();
    assert_eq!(slots.tick.get(), Some(Duration::from_secs(5420)));

    ws.write(
        "config/game_rules.properties",
        "Tick = 10hours20mins30secs500millis200micros100nanos\n",
    );
    let report = manager.load("game.rules").unwrap();
    let expected = Duration::from_secs(10 * 3600 + 20 * 60 + 30)
        + Duration::from_millis(500)
        + Duration::from_micros(200)
        + Duration::from_nanos(100);
    assert_eq!(slots.tick.get(), Some(expected));
    assert_eq!(
        report.get("Tick").unwrap().literal,
        "10hours20mins30secs500millis200micros100nanos"
    );

    ws.write("config/game_rules.properties", "Tick = 10hourss\n");
    let report = manager.load("game.rules").unwrap();
    assert_eq!(slots.tick.get(), Some(Duration::from_secs(5420)));
    assert!(report.warnings.iter().any(|w| matches!(
        w,
        layercfg::ConfigEvent::InvalidValue { key, supplied, .. }
            if key == "Tick" && supplied == "10hourss"
    )));
}

#[test]
fn test_regenerate_restores_defaults() {
    let ws = Workspace::new();
    let slots = Slots::new();
    let manager = ws.manager();
    manager.register(slots.namespace()).unwrap();
    manager.load("game.rules").unwrap();
    let generated = ws.read("config/game_rules.properties");

    ws.write("config/game_rules.properties", "Debug = yes\n");
    manager.load("game.rules").unwrap();
    assert_eq!(slots.debug.get(), Some(true));

    let written = manager.generate("game.rules").unwrap();
    assert_eq!(written, vec![ws.path("config/game_rules.properties")]);
    assert_eq!(ws.read("config/game_rules.properties"), generated);
}

#[test]
fn test_generated_file_reproduces_escaped_defaults() {
    let defaults = [
        ("Digits", TypeDescriptor::Pattern, r"^\d+$"),
        ("Temp", TypeDescriptor::Path, r"C:\temp\new"),
        ("Share", TypeDescriptor::String, "\\\\host\\share\\"),
        ("Greeting", TypeDescriptor::String, "  welcome aboard"),
        ("Masks", TypeDescriptor::List(Box::new(TypeDescriptor::String)), r"a\b, c\d"),
    ];
    let slots: Vec<DynamicSlot> = defaults
        .iter()
        .map(|(_, ty, _)| DynamicSlot::new(ty.clone()))
        .collect();

    let mut file = ConfigFile::builder("paths");
    for ((key, _, default), slot) in defaults.iter().zip(&slots) {
        file = file.entry(SchemaEntry::dynamic(*key, *default, slot));
    }
    let namespace = Namespace::builder("game.paths")
        .file(file.build().unwrap())
        .build()
        .unwrap();

    let ws = Workspace::new();
    let manager = ws.manager();
    manager.register(namespace).unwrap();
    let report = manager.load("game.paths").unwrap();
    assert_eq!(report.generated, vec![ws.path("config/paths.properties")]);
    assert!(!report.has_warnings(), "{:?}", report.warnings);

    let converter = MainConverter::default();
    for ((key, ty, default), slot) in defaults.iter().zip(&slots) {
        assert_eq!(report.get(key).unwrap().origin, ValueOrigin::Base);
        let expected = converter.from_literal(ty, default).unwrap();
        assert_eq!(slot.get(), Some(expected), "{key}");
    }

    match slots[0].get() {
        Some(Value::Pattern(regex)) => assert_eq!(regex.as_str(), r"^\d+$"),
        other => panic!("unexpected value {other:?}"),
    }
}
