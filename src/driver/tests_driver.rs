use crate::c_ast::CDeclKind;
use crate::c_ast::build::AstBuilder;
use crate::driver::{self, Cli};

#[test]
fn json_dump_to_zig_file_round_trip() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut b = AstBuilder::new();
    let int_qt = b.int();
    b.top_decl(CDeclKind::Typedef {
        name: "my_int".into(),
        typ: int_qt,
    });
    b.define_macro("MODE", "MODE 0755");
    let ast = b.finish();

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("unit.json");
    let output = dir.path().join("out.zig");
    std::fs::write(&input, serde_json::to_string(&ast).unwrap()).unwrap();

    let cli = Cli {
        input: input.clone(),
        output: Some(output.clone()),
        verbose: false,
    };
    driver::run(&cli).unwrap();

    let rendered = std::fs::read_to_string(&output).unwrap();
    assert!(rendered.starts_with("pub usingnamespace @import(\"builtins\");"));
    assert!(rendered.contains("pub const my_int = c_int;"));
    assert!(rendered.contains("pub const MODE = 0o755;"));

    // Same input twice, byte-identical output.
    driver::run(&cli).unwrap();
    assert_eq!(std::fs::read_to_string(&output).unwrap(), rendered);
}

#[test]
fn bad_dump_reports_a_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.json");
    std::fs::write(&input, "{ not json").unwrap();
    let cli = Cli {
        input,
        output: None,
        verbose: false,
    };
    let err = driver::run(&cli).unwrap_err();
    assert!(matches!(err, crate::error::Error::Decode(_)));
}
