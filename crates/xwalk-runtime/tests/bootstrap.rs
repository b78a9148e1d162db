//! End-to-end tests for the one-time bootstrap sequence.
//!
//! Drives `initialize` against an in-memory host, a recording engine
//! binding, and a fake engine whose extraction step actually pulls
//! every staged resource through the installed router, the same
//! contract the real extraction subsystem follows.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use xwalk_host::{HostContext, MemoryHost, PlatformAbi};
use xwalk_loader::{EngineBinding, LoaderError};
use xwalk_runtime::{
    initialize, BootContext, DeploymentMode, EngineError, EngineRuntime, InitError, ResourceEntry,
    ResourceSourceRouter, COMMAND_LINE_FILE, PRIVATE_DATA_SUFFIX,
};

struct FakePlatform {
    abis: Vec<String>,
}

impl FakePlatform {
    fn arm() -> Self {
        Self {
            abis: vec!["arm64-v8a".into(), "armeabi-v7a".into()],
        }
    }

    fn x86() -> Self {
        Self {
            abis: vec!["x86_64".into(), "x86".into()],
        }
    }
}

impl PlatformAbi for FakePlatform {
    fn supported_abis(&self) -> Option<Vec<String>> {
        Some(self.abis.clone())
    }

    fn cpu_abi_query(&self) -> io::Result<String> {
        Err(io::Error::new(io::ErrorKind::NotFound, "unused in tests"))
    }

    fn legacy_cpu_abi(&self) -> Option<String> {
        None
    }
}

#[derive(Default)]
struct FakeBinding {
    named_loads: Vec<String>,
    dir_loads: Vec<(PathBuf, String)>,
    fail_loads: bool,
    built_for_ia: bool,
}

impl EngineBinding for FakeBinding {
    fn load_named(&mut self, library: &str) -> Result<(), LoaderError> {
        if self.fail_loads {
            return Err(LoaderError::Open {
                library: library.to_string(),
                reason: "cannot find library".to_string(),
            });
        }
        self.named_loads.push(library.to_string());
        Ok(())
    }

    fn load_from_dir(&mut self, dir: &Path, library: &str) -> Result<(), LoaderError> {
        self.dir_loads.push((dir.to_path_buf(), library.to_string()));
        Ok(())
    }

    fn load_declared(&mut self) -> Result<(), LoaderError> {
        Ok(())
    }

    fn built_for_ia(&self) -> Result<bool, LoaderError> {
        Ok(self.built_for_ia)
    }
}

#[derive(Default)]
struct FakeEngine {
    calls: Vec<&'static str>,
    private_data_suffix: Option<String>,
    command_line_preset: bool,
    command_line: Option<Vec<String>>,
    staged: Option<(Vec<ResourceEntry>, ResourceSourceRouter)>,
    fail_startup: bool,
    startups: usize,
}

impl EngineRuntime for FakeEngine {
    fn command_line_initialized(&self) -> bool {
        self.command_line_preset || self.command_line.is_some()
    }

    fn init_command_line(&mut self, args: Vec<String>) {
        self.calls.push("init_command_line");
        self.command_line = Some(args);
    }

    fn set_private_data_suffix(&mut self, suffix: &str) {
        self.calls.push("set_private_data_suffix");
        self.private_data_suffix = Some(suffix.to_string());
    }

    fn remap_resource_ids(&mut self, _host: &dyn HostContext) {
        self.calls.push("remap_resource_ids");
    }

    fn stage_resources(&mut self, entries: Vec<ResourceEntry>, router: ResourceSourceRouter) {
        self.calls.push("stage_resources");
        self.staged = Some((entries, router));
    }

    fn extract_resources(&mut self, host: &dyn HostContext) -> Result<(), EngineError> {
        self.calls.push("extract_resources");
        let (entries, router) = self
            .staged
            .as_ref()
            .ok_or_else(|| EngineError("nothing staged".to_string()))?;
        // The real extractor only consults the router for resources it
        // owns, and reads each one exactly once.
        for entry in entries {
            if !router.should_handle(&entry.name) {
                continue;
            }
            let mut reader = router
                .open(host, &entry.name)
                .map_err(|err| EngineError(err.to_string()))?;
            let mut sink = Vec::new();
            reader
                .read_to_end(&mut sink)
                .map_err(|err| EngineError(err.to_string()))?;
        }
        Ok(())
    }

    fn start_browser_process(&mut self, _host: &dyn HostContext) -> Result<(), EngineError> {
        self.calls.push("start_browser_process");
        self.startups += 1;
        if self.fail_startup {
            return Err(EngineError("browser process died".to_string()));
        }
        Ok(())
    }
}

/// Embedded-mode host whose raw resources back the mandatory set.
fn embedded_host() -> MemoryHost {
    let mut host = MemoryHost::new("com.example.app", "com.example.app");
    for base in ["xwalk", "icudtl", "xwalk_100_percent"] {
        host.resources_mut()
            .insert_raw("com.example.app", base, format!("raw {base}").into_bytes());
    }
    host
}

#[test]
fn test_embedded_init_runs_every_step_in_order() {
    let mut ctx = BootContext::new();
    let host = embedded_host();
    let mut binding = FakeBinding::default();
    let mut engine = FakeEngine::default();

    initialize(
        &mut ctx,
        &host,
        &FakePlatform::arm(),
        &mut binding,
        &mut engine,
    )
    .unwrap();

    assert!(ctx.is_initialized());
    assert!(ctx.load_state().is_loaded());
    assert_eq!(binding.named_loads, vec!["xwalkcore"]);
    assert_eq!(
        engine.calls,
        vec![
            "set_private_data_suffix",
            "remap_resource_ids",
            "init_command_line",
            "stage_resources",
            "extract_resources",
            "start_browser_process",
        ]
    );
    assert_eq!(engine.private_data_suffix.as_deref(), Some(PRIVATE_DATA_SUFFIX));

    let (entries, router) = engine.staged.as_ref().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(router.mode(), DeploymentMode::Embedded);
}

#[test]
fn test_second_init_is_a_no_op() {
    let mut ctx = BootContext::new();
    let host = embedded_host();
    let mut binding = FakeBinding::default();
    let mut engine = FakeEngine::default();
    let platform = FakePlatform::arm();

    initialize(&mut ctx, &host, &platform, &mut binding, &mut engine).unwrap();
    let calls_after_first = engine.calls.len();
    initialize(&mut ctx, &host, &platform, &mut binding, &mut engine).unwrap();

    assert_eq!(engine.calls.len(), calls_after_first);
    assert_eq!(engine.startups, 1);
    assert_eq!(binding.named_loads.len(), 1);
}

#[test]
fn test_library_load_failure_aborts_before_any_engine_call() {
    let mut ctx = BootContext::new();
    let host = embedded_host();
    let mut binding = FakeBinding {
        fail_loads: true,
        ..FakeBinding::default()
    };
    let mut engine = FakeEngine::default();

    let err = initialize(
        &mut ctx,
        &host,
        &FakePlatform::arm(),
        &mut binding,
        &mut engine,
    )
    .unwrap_err();

    assert!(matches!(err, InitError::Load(_)));
    assert!(engine.calls.is_empty());
    assert!(!ctx.is_initialized());
}

#[test]
fn test_emulated_library_aborts_with_typed_error() {
    let mut ctx = BootContext::new();
    let host = embedded_host();
    let mut binding = FakeBinding::default(); // ARM-built binary
    let mut engine = FakeEngine::default();

    let err = initialize(
        &mut ctx,
        &host,
        &FakePlatform::x86(),
        &mut binding,
        &mut engine,
    )
    .unwrap_err();

    assert!(matches!(err, InitError::EmulatedLibrary));
    assert!(ctx.load_state().via_emulation());
    assert!(!ctx.load_state().is_loaded());
    assert!(engine.calls.is_empty());
}

#[test]
fn test_ia_binary_on_x86_device_initializes() {
    let mut ctx = BootContext::new();
    let host = embedded_host();
    let mut binding = FakeBinding {
        built_for_ia: true,
        ..FakeBinding::default()
    };
    let mut engine = FakeEngine::default();

    initialize(
        &mut ctx,
        &host,
        &FakePlatform::x86(),
        &mut binding,
        &mut engine,
    )
    .unwrap();
    assert!(ctx.is_initialized());
}

#[test]
fn test_command_line_seeded_from_packaged_file() {
    let mut ctx = BootContext::new();
    let mut host = embedded_host();
    host.assets_mut()
        .insert(COMMAND_LINE_FILE, b"xwalk --enable-logging".to_vec());
    let mut binding = FakeBinding::default();
    let mut engine = FakeEngine::default();

    initialize(
        &mut ctx,
        &host,
        &FakePlatform::arm(),
        &mut binding,
        &mut engine,
    )
    .unwrap();

    assert_eq!(
        engine.command_line.as_deref(),
        Some(&["xwalk".to_string(), "--enable-logging".to_string()][..])
    );
}

#[test]
fn test_command_line_untouched_when_already_initialized() {
    let mut ctx = BootContext::new();
    let host = embedded_host();
    let mut binding = FakeBinding::default();
    let mut engine = FakeEngine {
        command_line_preset: true,
        ..FakeEngine::default()
    };

    initialize(
        &mut ctx,
        &host,
        &FakePlatform::arm(),
        &mut binding,
        &mut engine,
    )
    .unwrap();

    assert!(engine.command_line.is_none());
    assert!(!engine.calls.contains(&"init_command_line"));
}

#[test]
fn test_startup_failure_leaves_context_uninitialized() {
    let mut ctx = BootContext::new();
    let host = embedded_host();
    let mut binding = FakeBinding::default();
    let mut engine = FakeEngine {
        fail_startup: true,
        ..FakeEngine::default()
    };

    let err = initialize(
        &mut ctx,
        &host,
        &FakePlatform::arm(),
        &mut binding,
        &mut engine,
    )
    .unwrap_err();

    assert!(matches!(err, InitError::Startup(_)));
    assert!(!ctx.is_initialized());
    // Libraries stay loaded; a later retry skips straight past them.
    assert!(ctx.load_state().is_loaded());
}

#[test]
fn test_missing_packaged_resource_fails_extraction_loudly() {
    let mut ctx = BootContext::new();
    // No raw resources registered: every embedded-mode open must miss.
    let host = MemoryHost::new("com.example.app", "com.example.app");
    let mut binding = FakeBinding::default();
    let mut engine = FakeEngine::default();

    let err = initialize(
        &mut ctx,
        &host,
        &FakePlatform::arm(),
        &mut binding,
        &mut engine,
    )
    .unwrap_err();

    match err {
        InitError::Extraction(EngineError(message)) => {
            assert!(message.contains("missing from"), "got: {message}");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!ctx.is_initialized());
}

#[test]
fn test_shared_runtime_provisions_from_library_dir_then_initializes() {
    let mut ctx = BootContext::new();
    let mut host = MemoryHost::new("com.xwalk.runtime", "com.example.app");
    for name in ["xwalk.pak", "icudtl.dat", "xwalk_100_percent.pak"] {
        host.assets_mut()
            .insert(name, format!("shared {name}").into_bytes());
    }
    let mut binding = FakeBinding::default();
    let mut engine = FakeEngine::default();
    let platform = FakePlatform::arm();

    // Shared-runtime embedders load from the library package's
    // directory before running the full sequence.
    let lib_dir = PathBuf::from("/data/app/com.xwalk.runtime/lib/arm64");
    assert!(ctx
        .provision(&platform, &mut binding, Some(&lib_dir))
        .unwrap());

    initialize(&mut ctx, &host, &platform, &mut binding, &mut engine).unwrap();

    assert_eq!(binding.dir_loads, vec![(lib_dir, "xwalkcore".to_string())]);
    assert!(binding.named_loads.is_empty());

    let (_, router) = engine.staged.as_ref().unwrap();
    assert_eq!(router.mode(), DeploymentMode::Shared);
}

#[test]
fn test_test_bundle_serves_resources_from_assets() {
    let mut ctx = BootContext::new();
    let mut host = MemoryHost::new("com.example.shell", "com.example.shell");
    for name in ["xwalk.pak", "icudtl.dat", "xwalk_100_percent.pak"] {
        host.assets_mut()
            .insert(name, format!("bundle {name}").into_bytes());
    }
    let mut binding = FakeBinding::default();
    let mut engine = FakeEngine::default();

    initialize(
        &mut ctx,
        &host,
        &FakePlatform::arm(),
        &mut binding,
        &mut engine,
    )
    .unwrap();

    let (_, router) = engine.staged.as_ref().unwrap();
    assert_eq!(router.mode(), DeploymentMode::TestBundle);
}

#[test]
fn test_download_mode_serves_resources_from_cache() {
    let temp = tempfile::tempdir().unwrap();
    let mut ctx = BootContext::new();
    let mut host = MemoryHost::new("com.example.app", "com.example.app");
    host.set_data_root(temp.path().to_path_buf());
    host.set_metadata("xwalk_enable_download_mode", "Enable");

    let cache = host.private_dir("extracted_xwalkcore").unwrap();
    for name in ["xwalk.pak", "icudtl.dat", "xwalk_100_percent.pak"] {
        std::fs::write(cache.join(name), b"downloaded").unwrap();
    }

    let mut binding = FakeBinding::default();
    let mut engine = FakeEngine::default();

    initialize(
        &mut ctx,
        &host,
        &FakePlatform::arm(),
        &mut binding,
        &mut engine,
    )
    .unwrap();

    let (_, router) = engine.staged.as_ref().unwrap();
    assert_eq!(router.mode(), DeploymentMode::Download);
}
