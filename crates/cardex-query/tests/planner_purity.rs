// SPDX-License-Identifier: Apache-2.0

#[test]
fn compile_path_modules_are_pure_and_db_free() {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let pure_modules = [
        "src/planner/mod.rs",
        "src/registry.rs",
        "src/normalize.rs",
        "src/tristate.rs",
        "src/text.rs",
        "src/controls.rs",
        "src/limits.rs",
        "src/compiler/mod.rs",
        "src/compiler/range.rs",
        "src/compiler/prune.rs",
        "src/compiler/sort.rs",
    ];
    let forbidden = ["rusqlite", "Connection", "std::fs", "tokio", "std::process"];

    for module in pure_modules {
        let text = std::fs::read_to_string(root.join(module)).expect("read pure module");
        for needle in forbidden {
            assert!(
                !text.contains(needle),
                "forbidden import `{}` in {}",
                needle,
                module
            );
        }
    }
}

#[test]
fn query_crate_cargo_has_no_async_or_cli_dependency() {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let cargo_toml = std::fs::read_to_string(root.join("Cargo.toml")).expect("read Cargo.toml");
    for forbidden in ["tokio", "clap", "cardex-browse"] {
        assert!(
            !cargo_toml.contains(forbidden),
            "forbidden dependency in query crate: {forbidden}"
        );
    }
}
