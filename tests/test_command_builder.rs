use webber_tools::e_command_builder::{SwiftCommand, SwiftCommandBuilder, TargetTriple};

#[test]
fn integration_test_builder() {
    let command = SwiftCommand::Build {
        release: true,
        product_name: "App".to_string(),
        triple: TargetTriple::Wasm,
    };

    let args = SwiftCommandBuilder::new()
        .with_command(&command)
        .with_extra_args(&vec!["-Xswiftc".to_string(), "-g".to_string()])
        .build();

    assert_eq!(args[0], "build");
    assert!(args.contains(&"release".to_string()));
    assert!(args.contains(&"wasm32-unknown-wasi".to_string()));
    assert_eq!(args[args.len() - 3..].to_vec(), vec!["--stack-first", "-Xswiftc", "-g"]);
}

#[test]
fn integration_test_default_triple_is_wasm() {
    assert_eq!(TargetTriple::default(), TargetTriple::Wasm);
}
