/* Loader tests
 *
 * These tests run the bundled WebGPU grammar profile over small IDL documents
 * shaped like the upstream sources, then parse them into declarations.
 */

use idl_loader::{
    load_declarations, load_documents, GrammarError, GrammarProfile, LoadError, ParseErrorKind,
};
use idl_types::Declaration;
use std::fs;
use tempfile::TempDir;

const COMMON_IDL: &str = r#"
interface mixin GPUObjectBase {
    attribute USVString label;
};

dictionary GPUObjectDescriptorBase {
    USVString label = "";
};

enum GPUPowerPreference {
    "low-power",
    "high-performance",
};
"#;

const WEBGPU_IDL: &str = r#"
[
    Exposed=(Window, DedicatedWorker)
]
interface GPU {
    Promise<GPUAdapter?> requestAdapter(optional GPURequestAdapterOptions options = {});
};

[Exposed=(Window, DedicatedWorker), SecureContext]
interface GPUAdapter {
    readonly attribute FrozenArray<GPUCompilationMessage> messages;
};

dictionary GPUDeviceDescriptor : GPUObjectDescriptorBase {
    record<DOMString, GPUSize32> nonGuaranteedLimits = {};
};

dictionary GPUSamplerDescriptor : GPUObjectDescriptorBase {
    float lodMinClamp = 0;
    float lodMaxClamp = 0xffffffff;
};

GPUAdapter includes GPUObjectBase;

typedef [EnforceRange] unsigned long GPUSize32;

enum GPUTextureFormat {
    // 8-bit formats
    "r8unorm",
    "rgba8unorm-srgb"
};

interface GPUDevice : EventTarget {
    attribute EventHandler onuncapturederror;
};
"#;

fn write_idl_dir(common: &str, webgpu: &str) -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("common.idl"), common).unwrap();
    fs::write(dir.path().join("webgpu.idl"), webgpu).unwrap();
    dir
}

#[test]
fn bundled_profile_parses_upstream_shaped_documents() {
    let dir = write_idl_dir(COMMON_IDL, WEBGPU_IDL);
    let profile = GrammarProfile::webgpu().unwrap();

    let decls = load_declarations(dir.path(), &profile).expect("load and parse");

    let enums: Vec<_> = decls.iter().filter_map(Declaration::as_enum).collect();
    assert_eq!(enums.len(), 2);
    assert_eq!(enums[0].name, "GPUPowerPreference");
    assert_eq!(enums[1].name, "GPUTextureFormat");
    assert_eq!(enums[1].values, vec!["r8unorm", "rgba8unorm-srgb"]);

    /* Prelude stubs land between the two documents */
    let names: Vec<_> = decls.iter().map(|d| d.name()).collect();
    let event_target = names.iter().position(|n| *n == "EventTarget").unwrap();
    let power = names.iter().position(|n| *n == "GPUPowerPreference").unwrap();
    let gpu = names.iter().position(|n| *n == "GPU").unwrap();
    assert!(power < event_target && event_target < gpu);
}

#[test]
fn fixups_remove_every_listed_construct() {
    let dir = write_idl_dir(COMMON_IDL, WEBGPU_IDL);
    let profile = GrammarProfile::webgpu().unwrap();

    let docs = load_documents(dir.path(), &profile).unwrap();
    let webgpu = &docs[1];
    assert_eq!(webgpu.filename, "webgpu.idl");
    assert!(!webgpu.text.contains("Exposed"));
    assert!(!webgpu.text.contains("FrozenArray"));
    assert!(!webgpu.text.contains("lodMaxClamp"));
    assert!(!webgpu.text.contains("nonGuaranteedLimits"));
    assert!(!webgpu.text.contains("EnforceRange"));
    assert!(webgpu.text.contains("lodMinClamp"));
    assert!(docs[0].prelude.is_none());
    assert!(webgpu.prelude.is_some());
}

#[test]
fn crlf_checkout_loads_like_lf() {
    let lf_dir = write_idl_dir(COMMON_IDL, WEBGPU_IDL);
    let crlf_dir = write_idl_dir(
        &COMMON_IDL.replace('\n', "\r\n"),
        &WEBGPU_IDL.replace('\n', "\r\n"),
    );
    let profile = GrammarProfile::webgpu().unwrap();

    let lf = load_declarations(lf_dir.path(), &profile).expect("LF documents load");
    let crlf = load_declarations(crlf_dir.path(), &profile).expect("CRLF documents load");
    assert_eq!(crlf, lf);

    let docs = load_documents(crlf_dir.path(), &profile).unwrap();
    assert!(docs.iter().all(|doc| !doc.text.contains('\r')));
    assert!(!docs[1].text.contains("Exposed"));
}

#[test]
fn stale_required_exception_aborts_load() {
    /* Upstream dropped the lodMaxClamp default: the profile must be revisited */
    let webgpu = WEBGPU_IDL.replace("    float lodMaxClamp = 0xffffffff;\n", "");
    let dir = write_idl_dir(COMMON_IDL, &webgpu);
    let profile = GrammarProfile::webgpu().unwrap();

    let err = load_documents(dir.path(), &profile).unwrap_err();
    match err {
        LoadError::Grammar(GrammarError::StaleException { name }) => {
            assert_eq!(name, "lod-max-clamp-default")
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn parse_error_names_the_offending_file() {
    let profile = GrammarProfile::from_yaml(
        "version: 1\ndocuments:\n  - path: common.idl\n  - path: webgpu.idl\n",
    )
    .unwrap();
    let dir = write_idl_dir(COMMON_IDL, "enum GPUBroken { \"a\" \"b\" };\n");

    let err = load_declarations(dir.path(), &profile).unwrap_err();
    match err {
        LoadError::Parse(parse) => {
            assert_eq!(parse.filename, "webgpu.idl");
            assert_eq!(parse.line, 1);
            assert!(matches!(parse.kind, ParseErrorKind::UnexpectedToken { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_document_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let profile = GrammarProfile::webgpu().unwrap();
    let err = load_documents(dir.path(), &profile).unwrap_err();
    assert!(matches!(err, LoadError::Io { ref path, .. } if path.ends_with("common.idl")));
}
