//! Glue compilation and final link
//!
//! Compiles each glue source to an object, then links those objects with
//! the prebuilt engine objects into one loadable module:
//! ```bash
//! cc -fPIC -c python/_jsonnet.c -o build/temp/python/_jsonnet.o
//! c++ -shared build/temp/python/_jsonnet.o core/*.o -o build/_jsonnet.so
//! ```

use super::types::{ExtensionDescriptor, LinkLanguage, exit_code_text};
use crate::package::PackagingError;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::process::Command;

/// Sources with these extensions are compiled as C++; everything else as C
const CXX_SOURCE_EXTENSIONS: [&str; 4] = ["cc", "cpp", "cxx", "C"];

/// Something that turns a descriptor into a loadable module
pub trait Linker {
    /// Compile and link `descriptor`, writing the module into `out_dir`.
    ///
    /// Relative paths in the descriptor are resolved against `root`.
    /// Returns the path of the produced module.
    fn link(
        &self,
        descriptor: &ExtensionDescriptor,
        root: &Path,
        out_dir: &Path,
    ) -> Result<PathBuf, PackagingError>;
}

/// Platform default suffix for loadable modules
#[must_use]
pub fn default_suffix() -> &'static str {
    if cfg!(target_os = "windows") {
        ".pyd"
    } else {
        ".so"
    }
}

/// Output file name for a module (`_jsonnet` + `.so`)
#[must_use]
pub fn module_file_name(name: &str, suffix: &str) -> String {
    format!("{name}{suffix}")
}

/// Linker that shells out to the system C/C++ compiler drivers
#[derive(Debug, Clone, Copy)]
pub struct SystemLinker {
    /// Echo compiler command lines
    verbose: bool,
}

impl SystemLinker {
    #[must_use]
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Language used to compile a single glue source
    fn source_language(source: &Path) -> LinkLanguage {
        let is_cxx = source
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| CXX_SOURCE_EXTENSIONS.contains(&e));
        if is_cxx {
            LinkLanguage::Cxx
        } else {
            LinkLanguage::C
        }
    }

    /// Build the compile command for one glue source
    fn compile_command(
        descriptor: &ExtensionDescriptor,
        root: &Path,
        source: &Path,
        object: &Path,
    ) -> Command {
        let language = Self::source_language(source);
        let mut cmd = Command::new(language.driver());
        cmd.current_dir(root);
        cmd.arg("-fPIC");
        cmd.args(language.env_flags());
        for dir in &descriptor.include_dirs {
            cmd.arg(format!("-I{}", dir.display()));
        }
        cmd.args(&descriptor.extra_compile_args);
        cmd.arg("-c").arg(source).arg("-o").arg(object);
        cmd
    }

    /// Build the final link command
    fn link_command(
        descriptor: &ExtensionDescriptor,
        root: &Path,
        glue_objects: &[PathBuf],
        output: &Path,
    ) -> Command {
        let mut cmd = Command::new(descriptor.language.driver());
        cmd.current_dir(root);
        if cfg!(target_os = "macos") {
            cmd.args(["-bundle", "-undefined", "dynamic_lookup"]);
        } else {
            cmd.arg("-shared");
        }
        cmd.args(glue_objects);
        cmd.args(&descriptor.extra_objects);
        cmd.args(&descriptor.extra_link_args);
        if let Some(ldflags) = crate::env_vars::ldflags() {
            cmd.args(crate::env_vars::split_flags(&ldflags));
        }
        cmd.arg("-o").arg(output);
        cmd
    }

    /// Run one toolchain command, turning failure into a link error
    fn run(self, mut cmd: Command, what: &str) -> Result<(), PackagingError> {
        let rendered = render_command(&cmd);
        crate::debug!("Running: {rendered}");
        if self.verbose {
            println!("  Running: {rendered}");
        }

        let output = cmd.output().map_err(|e| PackagingError::Link {
            message: format!("Failed to run {}: {e}", cmd.get_program().to_string_lossy()),
            output: String::new(),
        })?;

        if output.status.success() {
            return Ok(());
        }

        let mut captured = String::new();
        captured.push_str(&String::from_utf8_lossy(&output.stdout));
        captured.push_str(&String::from_utf8_lossy(&output.stderr));

        Err(PackagingError::Link {
            message: format!(
                "{what} failed with exit code: {}",
                exit_code_text(output.status.code())
            ),
            output: captured,
        })
    }
}

impl Linker for SystemLinker {
    fn link(
        &self,
        descriptor: &ExtensionDescriptor,
        root: &Path,
        out_dir: &Path,
    ) -> Result<PathBuf, PackagingError> {
        let out_dir = root.join(out_dir);
        let temp_dir = out_dir.join("temp");

        let mut glue_objects = Vec::with_capacity(descriptor.sources.len());
        for source in &descriptor.sources {
            let object = glue_object_path(&temp_dir, source)?;
            if let Some(parent) = object.parent() {
                create_dir(parent)?;
            }
            let cmd = Self::compile_command(descriptor, root, source, &object);
            self.run(cmd, &format!("Compiling {}", source.display()))?;
            glue_objects.push(object);
        }

        create_dir(&out_dir)?;
        let output = out_dir.join(module_file_name(&descriptor.name, &descriptor.suffix));
        let cmd = Self::link_command(descriptor, root, &glue_objects, &output);
        self.run(cmd, &format!("Linking {}", descriptor.name))?;

        Ok(output)
    }
}

/// Object path for a glue source (`python/_jsonnet.c` -> `<temp>/python/_jsonnet.o`)
///
/// The source's directories are mirrored under `temp_dir`, so sources that
/// share a file name in different directories get distinct objects. Root
/// and prefix components are dropped and `..` becomes `_parent`, keeping
/// every object inside `temp_dir`.
fn glue_object_path(temp_dir: &Path, source: &Path) -> Result<PathBuf, PackagingError> {
    if source.file_stem().is_none() {
        return Err(PackagingError::Link {
            message: format!("Glue source has no file name: {}", source.display()),
            output: String::new(),
        });
    }

    let mut object = temp_dir.to_path_buf();
    for component in source.with_extension("o").components() {
        match component {
            Component::Normal(part) => object.push(part),
            Component::ParentDir => object.push("_parent"),
            Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
        }
    }
    Ok(object)
}

fn create_dir(dir: &Path) -> Result<(), PackagingError> {
    fs::create_dir_all(dir).map_err(|e| PackagingError::Link {
        message: format!("Failed to create build directory {}: {e}", dir.display()),
        output: String::new(),
    })
}

/// Render a command line for logs
fn render_command(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|a| a.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> ExtensionDescriptor {
        ExtensionDescriptor {
            name: "_jsonnet".to_string(),
            sources: vec![PathBuf::from("python/_jsonnet.c")],
            extra_objects: vec![PathBuf::from("core/lexer.o"), PathBuf::from("core/vm.o")],
            language: LinkLanguage::Cxx,
            include_dirs: vec![PathBuf::from("include")],
            extra_compile_args: vec!["-O2".to_string()],
            extra_link_args: vec!["-lm".to_string()],
            suffix: ".so".to_string(),
        }
    }

    fn args(cmd: &Command) -> Vec<String> {
        cmd.get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn module_name_uses_suffix() {
        assert_eq!(module_file_name("_jsonnet", ".so"), "_jsonnet.so");
        assert_eq!(
            module_file_name("_jsonnet", ".cpython-312-x86_64-linux-gnu.so"),
            "_jsonnet.cpython-312-x86_64-linux-gnu.so"
        );
        assert!(default_suffix().starts_with('.'));
    }

    #[test]
    fn source_language_follows_extension() {
        assert_eq!(
            SystemLinker::source_language(Path::new("python/_jsonnet.c")),
            LinkLanguage::C
        );
        assert_eq!(
            SystemLinker::source_language(Path::new("glue/module.cpp")),
            LinkLanguage::Cxx
        );
    }

    #[test]
    fn glue_object_goes_to_temp_dir() {
        let object = glue_object_path(Path::new("build/temp"), Path::new("python/_jsonnet.c"))
            .unwrap();
        assert_eq!(object, PathBuf::from("build/temp/python/_jsonnet.o"));
    }

    #[test]
    fn same_named_glue_sources_get_distinct_objects() {
        let temp = Path::new("build/temp");
        let python = glue_object_path(temp, Path::new("python/glue.c")).unwrap();
        let ruby = glue_object_path(temp, Path::new("ruby/glue.c")).unwrap();
        assert_ne!(python, ruby);
        assert_eq!(ruby, PathBuf::from("build/temp/ruby/glue.o"));
    }

    #[test]
    fn glue_objects_stay_inside_temp_dir() {
        let temp = Path::new("build/temp");
        assert_eq!(
            glue_object_path(temp, Path::new("./glue.c")).unwrap(),
            PathBuf::from("build/temp/glue.o")
        );
        assert_eq!(
            glue_object_path(temp, Path::new("../shared/glue.cpp")).unwrap(),
            PathBuf::from("build/temp/_parent/shared/glue.o")
        );
        #[cfg(unix)]
        assert_eq!(
            glue_object_path(temp, Path::new("/src/glue.c")).unwrap(),
            PathBuf::from("build/temp/src/glue.o")
        );
    }

    #[test]
    fn compile_command_includes_flags_and_source() {
        let cmd = SystemLinker::compile_command(
            &descriptor(),
            Path::new("/project"),
            Path::new("python/_jsonnet.c"),
            Path::new("build/temp/_jsonnet.o"),
        );
        let args = args(&cmd);
        assert!(args.contains(&"-fPIC".to_string()));
        assert!(args.contains(&"-Iinclude".to_string()));
        assert!(args.contains(&"-O2".to_string()));
        assert!(args.ends_with(&[
            "-c".to_string(),
            "python/_jsonnet.c".to_string(),
            "-o".to_string(),
            "build/temp/_jsonnet.o".to_string(),
        ]));
    }

    #[test]
    fn link_command_keeps_declared_objects_in_order() {
        let cmd = SystemLinker::link_command(
            &descriptor(),
            Path::new("/project"),
            &[PathBuf::from("build/temp/_jsonnet.o")],
            Path::new("build/_jsonnet.so"),
        );
        let args = args(&cmd);
        let glue = args.iter().position(|a| a == "build/temp/_jsonnet.o").unwrap();
        let lexer = args.iter().position(|a| a == "core/lexer.o").unwrap();
        let vm = args.iter().position(|a| a == "core/vm.o").unwrap();
        assert!(glue < lexer && lexer < vm);
        assert!(args.contains(&"-lm".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("build/_jsonnet.so"));
    }

    #[test]
    fn missing_compiler_is_link_failure() {
        let linker = SystemLinker::new(false);
        let cmd = Command::new("extbind-no-such-compiler");
        let err = linker.run(cmd, "Compiling").unwrap_err();
        assert!(matches!(err, PackagingError::Link { .. }));
    }
}
