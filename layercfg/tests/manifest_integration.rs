//! Integration tests for manifest-declared schemas and custom components.

mod common;

use std::sync::Arc;

use common::Workspace;
use layercfg::{
    ConfigEvent, Converter, Error, LoadScope, Manifest, SchemaEntry, Supplied, TypeDescriptor,
    Value, ValueOrigin, ValueSupplier,
};

const MANIFEST: &str = r#"
enums:
  Region: [EU, NA, ASIA]
namespaces:
  - name: game.login
    files:
      - file_name: login
        comment: ["Login server"]
        entries:
          - key: Port
            type: int
            default: 2106
            reloadable: false
          - key: Regions
            type: set<enum:Region>
            default: "*"
          - key: Banner
            type: string
            default: ""
            supplier: build-banner
      - file_name: network
        path: [config, net]
        entries:
          - key: Timeout
            type: duration
            default: PT30S
          - key: Trusted
            type: list<string>
            default: ["127.0.0.1", "::1"]
"#;

/// Supplies a fixed banner without consulting any layer.
struct BuildBanner;

impl ValueSupplier for BuildBanner {
    fn supply(
        &self,
        _scope: &LoadScope<'_>,
        _entry: &SchemaEntry,
        _converter: &dyn Converter,
    ) -> layercfg::Result<Supplied> {
        Ok(Supplied {
            value: Value::String("build 42".to_string()),
            origin: ValueOrigin::Supplier("build-banner".to_string()),
        })
    }
}

fn manager(ws: &Workspace) -> layercfg::ConfigManager {
    let manager = ws.manager();
    manager
        .components()
        .suppliers
        .register_instance("build-banner", Arc::new(BuildBanner));
    for namespace in Manifest::from_yaml(MANIFEST)
        .unwrap()
        .build_namespaces()
        .unwrap()
    {
        manager.register(namespace).unwrap();
    }
    manager
}

#[test]
fn test_manifest_namespace_loads() {
    let ws = Workspace::new();
    let manager = manager(&ws);
    assert_eq!(manager.namespace_names(), vec!["game.login"]);

    let report = manager.load("game.login").unwrap();
    assert_eq!(
        report.files,
        vec![
            ws.path("config/login.properties"),
            ws.path("config/net/network.properties"),
        ]
    );
    assert_eq!(report.generated.len(), 2);
    assert_eq!(report.get("Port").unwrap().literal, "2106");
    assert_eq!(report.get("Regions").unwrap().literal, "*");
    assert_eq!(report.get("Timeout").unwrap().literal, "30secs");
    assert_eq!(report.get("Trusted").unwrap().literal, "127.0.0.1,::1");
    assert_eq!(report.get("Trusted").unwrap().env_var, "LOGIN_TRUSTED");

    let banner = report.get("Banner").unwrap();
    assert_eq!(banner.literal, "build 42");
    assert_eq!(banner.origin.to_string(), "supplier:build-banner");

    let namespace = manager.namespace("game.login").unwrap();
    let port = namespace.files()[0].entry("Port").unwrap();
    assert_eq!(port.current_value(), Some(Value::Int(2106)));
}

#[test]
fn test_manifest_values_follow_layers() {
    let ws = Workspace::new();
    ws.write(
        "config/override.properties",
        "Regions = ASIA, EU\nTimeout = 2min\n",
    );
    let manager = manager(&ws);
    manager.set_process_property("login.Port", "3000");

    let report = manager.load("game.login").unwrap();
    assert_eq!(report.get("Port").unwrap().literal, "3000");
    assert_eq!(report.get("Regions").unwrap().literal, "EU,ASIA");
    assert_eq!(report.get("Timeout").unwrap().literal, "2mins");
    assert_eq!(report.get("Timeout").unwrap().origin, ValueOrigin::Override);
}

#[test]
fn test_unregistered_supplier_fails_the_pass() {
    let ws = Workspace::new();
    let manager = ws.manager();
    for namespace in Manifest::from_yaml(MANIFEST)
        .unwrap()
        .build_namespaces()
        .unwrap()
    {
        manager.register(namespace).unwrap();
    }

    let err = manager.load("game.login").unwrap_err();
    assert!(matches!(
        err,
        Error::UnknownComponent { kind: "supplier", ref id } if id == "build-banner"
    ));
}

#[test]
fn test_unknown_enum_constant_is_reported() {
    let ws = Workspace::new();
    ws.write("config/login.properties", "Regions = EU, MARS\n");
    let manager = manager(&ws);

    let report = manager.load("game.login").unwrap();
    assert_eq!(report.get("Regions").unwrap().literal, "*");
    assert!(report.warnings.iter().any(|w| matches!(
        w,
        ConfigEvent::InvalidValue { key, supplied, .. } if key == "Regions" && supplied == "EU, MARS"
    )));
}

#[test]
fn test_manifest_entries_use_dynamic_slots() {
    let manifest = Manifest::from_yaml(MANIFEST).unwrap();
    let namespaces = manifest.build_namespaces().unwrap();
    let timeout = namespaces[0].files()[1].entry("Timeout").unwrap();
    assert_eq!(timeout.declared_type(), &TypeDescriptor::Duration);
    assert!(timeout.binding().is_some());
    assert_eq!(timeout.current_value(), None);
}
