//! Integration tests for layer precedence.
//!
//! A value is taken from the first layer that holds it: environment
//! variables, process properties, the override file, the base file, and
//! finally the declared default.
//!
//! Tests that touch the real process environment are marked `#[serial]`.

mod common;

use common::{EnvGuard, Workspace};
use layercfg::{
    ConfigEvent, ConfigFile, ConfigManager, ConfigSlot, MapEnvironment, Namespace, SchemaEntry,
    SystemEnvironment, ValueOrigin,
};
use serial_test::serial;

fn server(rate: &ConfigSlot<f64>) -> Namespace {
    Namespace::builder("game.server")
        .file(
            ConfigFile::builder("server")
                .entry(SchemaEntry::bind("Rate", "1.0", rate))
                .build()
                .unwrap(),
        )
        .build()
        .unwrap()
}

/// Peels the layers off one at a time and checks the next one down shows.
#[test]
fn test_each_layer_shadows_the_ones_below() {
    let ws = Workspace::new();
    ws.write("config/server.properties", "Rate = 2.0\n");
    ws.write("config/override.properties", "Rate = 3.0\n");

    let with_everything = |env: MapEnvironment| {
        let manager = ws
            .builder()
            .with_environment(env)
            .with_process_property("server.Rate", "4.0")
            .build();
        let rate = ConfigSlot::new();
        manager.register(server(&rate)).unwrap();
        let report = manager.load("game.server").unwrap();
        (rate.get(), report.get("Rate").unwrap().origin.clone())
    };

    let (value, origin) = with_everything(MapEnvironment::new().with_var("SERVER_RATE", "5.0"));
    assert_eq!(value, Some(5.0));
    assert_eq!(origin, ValueOrigin::Environment("SERVER_RATE".to_string()));

    let (value, origin) = with_everything(MapEnvironment::new());
    assert_eq!(value, Some(4.0));
    assert_eq!(origin, ValueOrigin::ProcessProperty("server.Rate".to_string()));

    let rate = ConfigSlot::new();
    let manager = ws.manager();
    manager.register(server(&rate)).unwrap();
    let report = manager.load("game.server").unwrap();
    assert_eq!(rate.get(), Some(3.0));
    assert_eq!(report.get("Rate").unwrap().origin, ValueOrigin::Override);

    manager.set_override_enabled(false);
    let report = manager.load("game.server").unwrap();
    assert_eq!(rate.get(), Some(2.0));
    assert_eq!(report.get("Rate").unwrap().origin, ValueOrigin::Base);

    ws.write("config/server.properties", "# emptied\n");
    let report = manager.load("game.server").unwrap();
    assert_eq!(rate.get(), Some(1.0));
    assert_eq!(report.get("Rate").unwrap().origin, ValueOrigin::Default);
}

#[test]
fn test_override_file_is_shared_across_namespaces() {
    let ws = Workspace::new();
    ws.write("config/override.properties", "Rate = 9.5\n");
    let manager = ws.manager();

    let game = ConfigSlot::new();
    manager.register(server(&game)).unwrap();
    let login = ConfigSlot::<f64>::new();
    manager
        .register(
            Namespace::builder("login")
                .file(
                    ConfigFile::builder("login")
                        .entry(SchemaEntry::bind("Rate", "0.5", &login))
                        .build()
                        .unwrap(),
                )
                .build()
                .unwrap(),
        )
        .unwrap();

    manager.load("game.server").unwrap();
    manager.load("login").unwrap();
    assert_eq!(game.get(), Some(9.5));
    assert_eq!(login.get(), Some(9.5));
}

#[test]
fn test_custom_override_file_relative_to_root() {
    let ws = Workspace::new();
    ws.write("local/dev.properties", "Rate = 7.25\n");
    let manager = ws.builder().with_override_file("local/dev.properties").build();
    let rate = ConfigSlot::new();
    manager.register(server(&rate)).unwrap();

    manager.load("game.server").unwrap();
    assert_eq!(rate.get(), Some(7.25));
    assert!(!ws.path("config/override.properties").exists());
}

#[test]
fn test_override_file_picked_up_on_reload() {
    let ws = Workspace::new();
    let manager = ws.manager();
    let rate = ConfigSlot::new();
    manager.register(server(&rate)).unwrap();
    manager.load("game.server").unwrap();
    assert_eq!(rate.get(), Some(1.0));

    ws.write("config/override.properties", "Rate = 6.0\n");
    manager.reload("game.server").unwrap();
    assert_eq!(rate.get(), Some(6.0));
}

#[test]
fn test_environment_value_is_trimmed() {
    let ws = Workspace::new();
    let manager = ws
        .builder()
        .with_environment(MapEnvironment::new().with_var("SERVER_RATE", "  8.5 \n"))
        .build();
    let rate = ConfigSlot::new();
    manager.register(server(&rate)).unwrap();
    manager.load("game.server").unwrap();
    assert_eq!(rate.get(), Some(8.5));
}

#[test]
fn test_bad_environment_value_falls_back_to_default() {
    let ws = Workspace::new();
    ws.write("config/server.properties", "Rate = 2.0\n");
    let manager = ws
        .builder()
        .with_environment(MapEnvironment::new().with_var("SERVER_RATE", "fast"))
        .build();
    let rate = ConfigSlot::new();
    manager.register(server(&rate)).unwrap();

    let report = manager.load("game.server").unwrap();
    assert_eq!(rate.get(), Some(1.0));
    let warning = report
        .warnings
        .iter()
        .find_map(|w| match w {
            ConfigEvent::InvalidValue { supplied, default, .. } => Some((supplied, default)),
            _ => None,
        })
        .unwrap();
    assert_eq!(warning, (&"fast".to_string(), &"1.0".to_string()));
}

#[test]
#[serial]
fn test_system_environment_binding() {
    let _guard = EnvGuard::new("SERVER_RATE", "12.5");
    let ws = Workspace::new();
    let manager = ws.builder().with_environment(SystemEnvironment).build();
    let rate = ConfigSlot::new();
    manager.register(server(&rate)).unwrap();

    manager.load("game.server").unwrap();
    assert_eq!(rate.get(), Some(12.5));
}

#[test]
#[serial]
fn test_system_environment_absent_variable() {
    let _guard = EnvGuard::remove("SERVER_RATE");
    let ws = Workspace::new();
    let manager = ConfigManager::builder()
        .with_root(ws.root())
        .with_sink(ws.sink.clone())
        .build();
    let rate = ConfigSlot::new();
    manager.register(server(&rate)).unwrap();

    let report = manager.load("game.server").unwrap();
    assert_eq!(rate.get(), Some(1.0));
    assert_eq!(report.get("Rate").unwrap().origin, ValueOrigin::Base);
}
