//! Shared test helpers and utilities

use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Header line defining the default version macro
pub(crate) const VERSION_HEADER: &str = "#ifndef LIB_JSONNET_H\n#define LIB_JSONNET_VERSION \"v0.20.0\"\n#endif\n";

/// Driver script that creates every target it is given
#[allow(dead_code)]
pub(crate) const TOUCH_DRIVER: &str = r#"[build]
driver = "sh"
args = ["-c", "for t in \"$@\"; do mkdir -p \"$(dirname \"$t\")\" && : > \"$t\"; done", "driver"]
objects = ["core/engine.o", "core/vm.o"]
"#;

/// Extension settings that link to `.so` without querying a runtime config tool
#[allow(dead_code)]
pub(crate) const PLAIN_EXTENSION: &str = r#"[extension]
suffix = ".so"
runtime_config = ""
"#;

/// Command for the extbind binary with toolchain variables cleared
pub(crate) fn extbind_command(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_extbind"));
    cmd.current_dir(dir);
    for var in [
        "MAKE",
        "CC",
        "CXX",
        "CFLAGS",
        "CXXFLAGS",
        "LDFLAGS",
        "EXTBIND_MANIFEST",
        "EXTBIND_DEBUG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// Create a project with `core/libjsonnet.h` and an `extbind.toml`
pub(crate) fn create_project(header: &str, manifest: &str) -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let core = temp_dir.path().join("core");
    fs::create_dir_all(&core).expect("Failed to create core dir");
    fs::write(core.join("libjsonnet.h"), header).expect("Failed to write header");
    fs::write(temp_dir.path().join("extbind.toml"), manifest).expect("Failed to write manifest");
    temp_dir
}

/// Write an executable fake compiler that creates whatever `-o` names
///
/// Every invocation's arguments are appended to `fake-cc.log` next to it.
#[cfg(unix)]
#[allow(dead_code)]
pub(crate) fn create_fake_compiler(dir: &Path) -> std::path::PathBuf {
    let script = r#"#!/bin/sh
echo "$@" >> "$(dirname "$0")/fake-cc.log"
out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-o" ]; then out="$2"; fi
  shift
done
mkdir -p "$(dirname "$out")"
: > "$out"
"#;
    write_script(&dir.join("fake-cc"), script)
}

/// Write an executable compiler that reports an error and exits 1
#[cfg(unix)]
#[allow(dead_code)]
pub(crate) fn create_failing_compiler(dir: &Path) -> std::path::PathBuf {
    let script = r#"#!/bin/sh
echo "_jsonnet.c:1:10: fatal error: Python.h: No such file or directory" >&2
exit 1
"#;
    write_script(&dir.join("failing-cc"), script)
}

/// Write an executable runtime config tool reporting `include` and `suffix`
#[cfg(unix)]
#[allow(dead_code)]
pub(crate) fn create_runtime_config(dir: &Path, include: &str, suffix: &str) -> std::path::PathBuf {
    let script = format!(
        r#"#!/bin/sh
case "$1" in
  --includes) echo "-I{include}" ;;
  --extension-suffix) echo "{suffix}" ;;
  *) exit 1 ;;
esac
"#
    );
    write_script(&dir.join("fake-config"), &script)
}

#[cfg(unix)]
#[allow(dead_code)]
fn write_script(path: &Path, script: &str) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    fs::write(path, script).expect("Failed to write script");
    let mut perms = fs::metadata(path).expect("Failed to stat script").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).expect("Failed to chmod script");
    path.to_path_buf()
}
