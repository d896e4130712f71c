//! Directory skeletons and starter project files per kind.
use std::io;
use std::path::Path;

use super::kind::Kind;

/// Write `contents` to `root/relative`, creating parents.
fn write(root: &Path, relative: &str, contents: &str) -> io::Result<()> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)
}

fn mkdirs(root: &Path, dirs: &[&str]) -> io::Result<()> {
    dirs.iter()
        .try_for_each(|dir| std::fs::create_dir_all(root.join(dir)))
}

/// Python package name for environment `name`.
fn package_name(name: &str) -> String {
    name.replace('-', "_").to_ascii_lowercase()
}

/// Create the directory layout every environment of `kind` starts with.
///
/// # Errors
///
/// Returns an error if a directory or file cannot be written.
pub fn skeleton(kind: Kind, name: &str, root: &Path, python_version: &str) -> io::Result<()> {
    match kind {
        Kind::Python => {
            mkdirs(root, &["venv/bin"])?;
            write(root, ".python-version", &format!("{python_version}\n"))
        }
        Kind::Node => {
            mkdirs(root, &["node_modules/.bin"])?;
            let manifest = serde_json::json!({
                "name": name,
                "version": "0.1.0",
                "private": true,
            });
            let text = serde_json::to_string_pretty(&manifest).map_err(io::Error::other)?;
            write(root, "package.json", &format!("{text}\n"))
        }
        Kind::Cpp => {
            mkdirs(root, &["src", "include", "build", "bin"])?;
            write(
                root,
                "CMakeLists.txt",
                &format!(
                    "cmake_minimum_required(VERSION 3.16)\n\
                     project({name} CXX)\n\
                     \n\
                     set(CMAKE_CXX_STANDARD 17)\n\
                     set(CMAKE_RUNTIME_OUTPUT_DIRECTORY ${{CMAKE_SOURCE_DIR}}/bin)\n\
                     \n\
                     file(GLOB SOURCES ${{CMAKE_SOURCE_DIR}}/src/*.cpp)\n\
                     add_executable(${{PROJECT_NAME}} ${{SOURCES}})\n\
                     target_include_directories(${{PROJECT_NAME}} PRIVATE include)\n"
                ),
            )
        }
        Kind::Generic => mkdirs(root, &["bin"]),
    }
}

/// Drop starter project files on top of a skeleton. Existing files are
/// left alone.
///
/// # Errors
///
/// Returns an error if a file cannot be written.
pub fn starter_files(kind: Kind, name: &str, root: &Path) -> io::Result<Vec<String>> {
    let package = package_name(name);
    let files: Vec<(String, String)> = match kind {
        Kind::Python => vec![
            (
                "pyproject.toml".to_string(),
                format!(
                    "[project]\n\
                     name = \"{name}\"\n\
                     version = \"0.1.0\"\n\
                     requires-python = \">=3.9\"\n\
                     \n\
                     [build-system]\n\
                     requires = [\"setuptools>=68\"]\n\
                     build-backend = \"setuptools.build_meta\"\n"
                ),
            ),
            (format!("src/{package}/__init__.py"), String::new()),
            ("tests/__init__.py".to_string(), String::new()),
        ],
        Kind::Node => vec![(
            "index.js".to_string(),
            format!("console.log(\"hello from {name}\");\n"),
        )],
        Kind::Cpp => vec![(
            "src/main.cpp".to_string(),
            format!(
                "#include <iostream>\n\
                 \n\
                 int main() {{\n    \
                 std::cout << \"hello from {name}\" << std::endl;\n    \
                 return 0;\n\
                 }}\n"
            ),
        )],
        Kind::Generic => vec![("README.md".to_string(), format!("# {name}\n"))],
    };

    let mut written = Vec::new();
    for (relative, contents) in files {
        if root.join(&relative).exists() {
            continue;
        }
        write(root, &relative, &contents)?;
        written.push(relative);
    }
    Ok(written)
}
