//! Shared test utilities for extbind tests
//!
//! Fabricated project trees and stand-ins for the build driver and linker,
//! so the pipeline can be exercised without a real toolchain.

#[cfg(test)]
pub mod fixtures {
    use crate::config::Config;
    use crate::extensions::linker::module_file_name;
    use crate::extensions::{
        ArtifactManifest, BuildDriver, BuildResult, ExtensionDescriptor, GlueSpec, LinkLanguage,
        Linker,
    };
    use crate::package::PackagingError;
    use std::cell::{Cell, RefCell};
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::time::Duration;
    use tempfile::TempDir;

    /// Glue settings matching the default Jsonnet binding
    pub fn jsonnet_glue() -> GlueSpec {
        GlueSpec {
            name: "_jsonnet".to_string(),
            sources: vec![PathBuf::from("python/_jsonnet.c")],
            language: LinkLanguage::Cxx,
            include_dirs: Vec::new(),
            extra_compile_args: Vec::new(),
            extra_link_args: Vec::new(),
            suffix: ".so".to_string(),
        }
    }

    /// Create a project root with `core/libjsonnet.h` holding `header`
    ///
    /// The config links to `.so` and does not query a runtime config tool.
    pub fn create_project(header: &str) -> (TempDir, Config) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let core = temp_dir.path().join("core");
        fs::create_dir_all(&core).expect("Failed to create core dir");
        fs::write(core.join("libjsonnet.h"), header).expect("Failed to write header");

        let mut config = Config::default();
        config.extension.runtime_config = None;
        config.extension.suffix = Some(".so".to_string());
        (temp_dir, config)
    }

    /// Build driver that records calls instead of running a process
    #[derive(Debug, Default)]
    pub struct FakeDriver {
        /// Exit code to report (0 = success)
        exit_code: i32,
        /// Write every requested artifact on success
        write_artifacts: bool,
        calls: Cell<usize>,
        last_root: RefCell<Option<PathBuf>>,
    }

    impl FakeDriver {
        pub fn succeeding(write_artifacts: bool) -> Self {
            Self {
                write_artifacts,
                ..Self::default()
            }
        }

        pub fn failing(exit_code: i32) -> Self {
            Self {
                exit_code,
                ..Self::default()
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.get()
        }

        pub fn last_root(&self) -> Option<PathBuf> {
            self.last_root.borrow().clone()
        }
    }

    impl BuildDriver for FakeDriver {
        fn build(&self, root: &Path, manifest: &ArtifactManifest) -> BuildResult {
            self.calls.set(self.calls.get() + 1);
            *self.last_root.borrow_mut() = Some(root.to_path_buf());
            let artifacts = manifest.objects().to_vec();

            if self.exit_code != 0 {
                return BuildResult::failure(
                    artifacts,
                    Some(self.exit_code),
                    Duration::from_millis(1),
                    format!("fake failed with exit code: {}", self.exit_code),
                    "vm.cpp:1:1: error: expected unqualified-id\n".to_string(),
                );
            }

            if self.write_artifacts {
                for object in manifest.resolve(root) {
                    if let Some(parent) = object.parent() {
                        fs::create_dir_all(parent).expect("Failed to create object dir");
                    }
                    fs::write(&object, b"\x7fELF").expect("Failed to write object");
                }
            }

            BuildResult::success(artifacts, Some(0), Duration::from_millis(1), String::new())
        }

        fn describe(&self, manifest: &ArtifactManifest) -> String {
            format!("fake {}", manifest.display_list())
        }
    }

    /// Linker that records descriptors and reports the module path
    #[derive(Debug, Default)]
    pub struct RecordingLinker {
        linked: RefCell<Vec<ExtensionDescriptor>>,
    }

    impl RecordingLinker {
        pub fn descriptors(&self) -> Vec<ExtensionDescriptor> {
            self.linked.borrow().clone()
        }
    }

    impl Linker for RecordingLinker {
        fn link(
            &self,
            descriptor: &ExtensionDescriptor,
            root: &Path,
            out_dir: &Path,
        ) -> Result<PathBuf, PackagingError> {
            self.linked.borrow_mut().push(descriptor.clone());
            Ok(root
                .join(out_dir)
                .join(module_file_name(&descriptor.name, &descriptor.suffix)))
        }
    }
}
